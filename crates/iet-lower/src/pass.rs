//! Pass interface and pass libraries.

use std::fmt;
use std::sync::Arc;

use iet_targets::Platform;

use crate::error::{LowerError, PassError, Result};
use crate::graph::Graph;
use crate::options::Options;

/// What a pass may read besides the graph itself.
#[derive(Debug, Clone, Copy)]
pub struct PassContext<'a> {
    pub options: &'a Options,
    pub platform: &'a Platform,
}

/// A named rewrite step over a [`Graph`].
///
/// Object-safe so passes can be shared as `Arc<dyn Pass>` between the
/// rewriters a backend builds.
pub trait Pass: fmt::Debug + Send + Sync {
    /// Identifier used in pipelines, custom sequences, and the timing ledger.
    fn name(&self) -> &str;

    /// Rewrite the graph in place.
    fn run(&self, graph: &mut Graph, ctx: &PassContext<'_>) -> std::result::Result<(), PassError>;
}

/// A pass backed by a closure.
pub struct FnPass<F> {
    name: String,
    f: F,
}

impl<F> FnPass<F>
where
    F: Fn(&mut Graph, &PassContext<'_>) -> std::result::Result<(), PassError> + Send + Sync,
{
    /// Wrap `f` as a pass called `name`.
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> fmt::Debug for FnPass<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPass").field("name", &self.name).finish()
    }
}

impl<F> Pass for FnPass<F>
where
    F: Fn(&mut Graph, &PassContext<'_>) -> std::result::Result<(), PassError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, graph: &mut Graph, ctx: &PassContext<'_>) -> std::result::Result<(), PassError> {
        (self.f)(graph, ctx)
    }
}

/// Shorthand for an `Arc`-wrapped [`FnPass`].
pub fn pass_fn<F>(name: impl Into<String>, f: F) -> Arc<dyn Pass>
where
    F: Fn(&mut Graph, &PassContext<'_>) -> std::result::Result<(), PassError>
        + Send
        + Sync
        + 'static,
{
    Arc::new(FnPass::new(name, f))
}

/// The passes a backend can run, addressable by name.
#[derive(Debug, Clone, Default)]
pub struct PassLibrary {
    passes: Vec<Arc<dyn Pass>>,
}

impl PassLibrary {
    /// An empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pass. A pass with the same name replaces the earlier one.
    pub fn register(&mut self, pass: Arc<dyn Pass>) -> &mut Self {
        match self.passes.iter_mut().find(|p| p.name() == pass.name()) {
            Some(slot) => *slot = pass,
            None => self.passes.push(pass),
        }
        self
    }

    /// Look up a pass by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Pass>> {
        self.passes.iter().find(|p| p.name() == name).cloned()
    }

    /// Registered pass names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Look up every name in `sequence`, preserving order and repetitions.
    pub fn resolve(&self, sequence: &[String], platform: &Platform) -> Result<Vec<Arc<dyn Pass>>> {
        sequence
            .iter()
            .map(|name| {
                self.get(name).ok_or_else(|| LowerError::UnknownPass {
                    name: name.clone(),
                    platform: platform.name.clone(),
                })
            })
            .collect()
    }
}
