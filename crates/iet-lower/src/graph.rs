//! The unit of work threaded through a rewrite pipeline.

use std::collections::BTreeSet;
use std::time::Duration;

use iet_core::Node;

/// One ledger entry: a pass execution and how long it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingEntry {
    /// Unique label within the run.
    pub label: String,
    /// Name of the pass that ran.
    pub pass: String,
    /// Wall-clock time spent in the pass.
    pub elapsed: Duration,
}

/// Append-only, insertion-ordered timing ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timings {
    entries: Vec<TimingEntry>,
}

impl Timings {
    /// Record a pass execution. A pass name already present in the ledger
    /// gets a numeric suffix so that labels stay unique; the label used is
    /// returned.
    pub(crate) fn record(&mut self, pass: &str, elapsed: Duration) -> &str {
        let mut label = pass.to_string();
        let mut n = self.entries.iter().filter(|e| e.pass == pass).count();
        while self.get(&label).is_some() {
            label = format!("{pass}{n}");
            n += 1;
        }
        self.entries.push(TimingEntry {
            label,
            pass: pass.to_string(),
            elapsed,
        });
        &self.entries[self.entries.len() - 1].label
    }

    /// Entries in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &TimingEntry> {
        self.entries.iter()
    }

    /// Number of recorded passes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no pass has run.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Elapsed time recorded under `label`.
    pub fn get(&self, label: &str) -> Option<Duration> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.elapsed)
    }

    /// Labels in execution order.
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }

    /// Sum of all recorded elapsed times.
    pub fn total(&self) -> Duration {
        self.entries.iter().map(|e| e.elapsed).sum()
    }
}

/// An IET being lowered, plus what the pipeline has recorded about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    root: Node,
    timings: Timings,
    includes: BTreeSet<String>,
}

impl Graph {
    /// Wrap `root` with an empty timing ledger and no includes.
    pub fn new(root: Node) -> Self {
        Self {
            root,
            timings: Timings::default(),
            includes: BTreeSet::new(),
        }
    }

    /// The tree being lowered.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Mutable access to the tree, for passes.
    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    /// Give up the ledger and keep the tree.
    pub fn into_root(self) -> Node {
        self.root
    }

    /// Per-pass timings recorded so far.
    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    pub(crate) fn timings_mut(&mut self) -> &mut Timings {
        &mut self.timings
    }

    /// Headers the generated code will need.
    pub fn includes(&self) -> &BTreeSet<String> {
        &self.includes
    }

    /// Record a header the generated code must include.
    pub fn add_include(&mut self, header: impl Into<String>) {
        self.includes.insert(header.into());
    }
}
