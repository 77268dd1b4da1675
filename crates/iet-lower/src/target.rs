//! Rewriters: a platform and an option set bound to an ordered pass pipeline.

use std::sync::Arc;
use std::time::Instant;

use iet_core::Node;
use iet_targets::Platform;
use tracing::debug;

use crate::error::{LowerError, Result};
use crate::graph::Graph;
use crate::options::Options;
use crate::pass::{Pass, PassContext, PassLibrary};

/// Builds the rewriter for a named or parallel mode.
pub type RewriterFactory = Arc<dyn Fn(Options, &Platform) -> Result<Target> + Send + Sync>;

/// Builds the rewriter for an explicit pass sequence.
pub type CustomFactory =
    Arc<dyn Fn(Vec<String>, Options, &Platform) -> Result<Target> + Send + Sync>;

/// Specializes an IET for one platform with one resolved option set.
#[derive(Debug)]
pub struct Target {
    options: Options,
    platform: Platform,
    passes: Vec<Arc<dyn Pass>>,
}

impl Target {
    /// A rewriter running `passes` in order for `platform`.
    pub fn new(options: Options, platform: &Platform, passes: Vec<Arc<dyn Pass>>) -> Self {
        Self {
            options,
            platform: platform.clone(),
            passes,
        }
    }

    /// The identity rewriter: an empty pipeline.
    pub fn noop(options: Options, platform: &Platform) -> Self {
        Self::new(options, platform, Vec::new())
    }

    /// A rewriter running exactly `sequence`, resolved against `library`.
    pub fn custom(
        sequence: &[String],
        options: Options,
        platform: &Platform,
        library: &PassLibrary,
    ) -> Result<Self> {
        let passes = library.resolve(sequence, platform)?;
        Ok(Self::new(options, platform, passes))
    }

    /// Options the rewriter was built with.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Platform the rewriter targets.
    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Pipeline pass names in execution order.
    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Run the pipeline over `iet`.
    ///
    /// Passes run strictly in order, each on the graph the previous one
    /// left behind. The first failure aborts the run and the partially
    /// rewritten graph is dropped.
    pub fn process(&self, iet: Node) -> Result<Graph> {
        let mut graph = Graph::new(iet);
        let ctx = PassContext {
            options: &self.options,
            platform: &self.platform,
        };

        for pass in &self.passes {
            let start = Instant::now();
            pass.run(&mut graph, &ctx)
                .map_err(|source| LowerError::PassExecutionFailure {
                    pass: pass.name().to_string(),
                    source,
                })?;
            let elapsed = start.elapsed();
            let label = graph.timings_mut().record(pass.name(), elapsed);
            debug!(pass = label, elapsed_s = elapsed.as_secs_f64(), "pass complete");
        }

        Ok(graph)
    }
}
