//! Rewrite modes and mode resolution.

use std::fmt;

use crate::options::Options;

/// Do nothing beyond honoring explicitly requested parallelism.
pub const NOOP: &str = "noop";
/// Full platform-specific optimization pipeline.
pub const ADVANCED: &str = "advanced";
/// Modes every registered platform must provide.
pub const REQUIRED_MODES: [&str; 2] = [NOOP, ADVANCED];

/// A mode as requested by the caller, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeRequest {
    /// A mode name, e.g. `advanced`; may also be a comma-separated pass list.
    Name(String),
    /// An explicit ordered list of pass identifiers.
    Passes(Vec<String>),
}

impl From<&str> for ModeRequest {
    fn from(name: &str) -> Self {
        ModeRequest::Name(name.to_string())
    }
}

impl From<Vec<String>> for ModeRequest {
    fn from(passes: Vec<String>) -> Self {
        ModeRequest::Passes(passes)
    }
}

/// Parallelism kinds that survive a `noop` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Parallelism {
    pub mpi: bool,
    pub openmp: bool,
}

impl Parallelism {
    pub const MPI: Parallelism = Parallelism { mpi: true, openmp: false };
    pub const OPENMP: Parallelism = Parallelism { mpi: false, openmp: true };
    pub const BOTH: Parallelism = Parallelism { mpi: true, openmp: true };

    /// Parallelism enabled by `options`.
    pub fn from_options(options: &Options) -> Self {
        Self {
            mpi: options.mpi,
            openmp: options.openmp,
        }
    }

    /// Whether neither OpenMP nor MPI is enabled.
    pub fn is_empty(self) -> bool {
        !self.mpi && !self.openmp
    }

    /// Enabled kinds, always `mpi` before `openmp`.
    pub fn flags(self) -> Vec<&'static str> {
        [("mpi", self.mpi), ("openmp", self.openmp)]
            .into_iter()
            .filter_map(|(name, on)| on.then_some(name))
            .collect()
    }
}

impl fmt::Display for Parallelism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.flags().join(","))
    }
}

/// Registry key under which a standard rewriter factory is filed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModeKey {
    Named(String),
    Parallel(Parallelism),
}

impl From<&str> for ModeKey {
    fn from(name: &str) -> Self {
        ModeKey::Named(name.to_string())
    }
}

impl From<Parallelism> for ModeKey {
    fn from(p: Parallelism) -> Self {
        ModeKey::Parallel(p)
    }
}

impl fmt::Display for ModeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeKey::Named(name) => write!(f, "{name}"),
            ModeKey::Parallel(p) => write!(f, "{p}"),
        }
    }
}

/// The effective mode of one lowering call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// A named pipeline variant.
    Known(String),
    /// Optimizations suppressed, but the listed parallelism still applied.
    Parallel(Parallelism),
    /// An explicit pass sequence, run verbatim by the platform's custom rewriter.
    Custom(Vec<String>),
}

impl Mode {
    /// Registry key to try first. Custom sequences go straight to the
    /// platform's custom factory.
    pub fn key(&self) -> Option<ModeKey> {
        match self {
            Mode::Known(name) => Some(ModeKey::Named(name.clone())),
            Mode::Parallel(p) => Some(ModeKey::Parallel(*p)),
            Mode::Custom(_) => None,
        }
    }

    /// Reinterpret this mode as an ordered pass sequence.
    pub fn to_passes(&self) -> Vec<String> {
        match self {
            Mode::Known(name) => name
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            Mode::Parallel(p) => p.flags().into_iter().map(str::to_string).collect(),
            Mode::Custom(passes) => passes.clone(),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Known(name) => write!(f, "{name}"),
            Mode::Parallel(p) => write!(f, "{p}"),
            Mode::Custom(passes) => write!(f, "[{}]", passes.join(",")),
        }
    }
}

/// Turn a mode request into the effective mode.
///
/// An absent request means `noop`. A `noop` request keeps whatever
/// parallelism the options explicitly enable. Anything else is taken as is.
pub fn resolve_mode(request: Option<&ModeRequest>, options: &Options) -> Mode {
    match request {
        None => Mode::Known(NOOP.to_string()),
        Some(ModeRequest::Name(name)) if name == NOOP => {
            let parallelism = Parallelism::from_options(options);
            if parallelism.is_empty() {
                Mode::Known(NOOP.to_string())
            } else {
                Mode::Parallel(parallelism)
            }
        }
        Some(ModeRequest::Name(name)) => Mode::Known(name.clone()),
        Some(ModeRequest::Passes(passes)) => Mode::Custom(passes.clone()),
    }
}
