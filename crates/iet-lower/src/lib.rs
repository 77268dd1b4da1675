//! Target specialization of IETs.
//!
//! A [`Lowerer`] takes an IET, a [`Platform`](iet_targets::Platform), an
//! optional mode and raw option overrides, and picks the rewriter that
//! governs the platform from a sealed [`TargetRegistry`]. The rewriter runs
//! its pass pipeline over the tree, timing every pass, and the resulting
//! ledger is reported once through a [`ProfileSink`].
//!
//! Backends populate a [`RegistryBuilder`] at startup; the reference CPU
//! backend lives in [`backend`].

pub mod backend;
pub mod config;
pub mod error;
pub mod graph;
pub mod lower;
pub mod mode;
pub mod options;
pub mod pass;
pub mod profiling;
pub mod registry;
pub mod target;

pub use backend::default_registry;
pub use config::{load_config, parse_config, Configuration, DleDefaults, ProfilingLevel};
pub use error::{LowerError, PassError, RegistrationError, Result};
pub use graph::{Graph, TimingEntry, Timings};
pub use lower::{Lowerer, LoweringOutput};
pub use mode::{resolve_mode, Mode, ModeKey, ModeRequest, Parallelism, ADVANCED, NOOP};
pub use options::{
    resolve_options, OptionOverrides, OptionValue, Options, ResolvedOptions, UnsupportedOption,
};
pub use pass::{pass_fn, FnPass, Pass, PassContext, PassLibrary};
pub use profiling::{format_profile, report, ProfileSink, TracingSink};
pub use registry::{ModeMap, RegistryBuilder, TargetEntry, TargetRegistry};
pub use target::{CustomFactory, RewriterFactory, Target};
