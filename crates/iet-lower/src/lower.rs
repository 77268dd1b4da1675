//! The lowering entry point.
//!
//! [`Lowerer::lower`] resolves options and mode, asks the registry for a
//! rewriter (falling back to the platform's custom factory when the mode is
//! not registered), runs it, and reports the timing ledger exactly once.

use std::sync::Arc;

use iet_core::{hash_hex, Node};
use iet_targets::Platform;
use tracing::{debug, info_span};
use uuid::Uuid;

use crate::config::Configuration;
use crate::error::{LowerError, Result};
use crate::graph::Graph;
use crate::mode::{resolve_mode, Mode, ModeRequest};
use crate::options::{resolve_options, OptionOverrides, Options, UnsupportedOption};
use crate::profiling::{report, ProfileSink, TracingSink};
use crate::registry::TargetRegistry;
use crate::target::Target;

/// What one lowering call produced.
#[derive(Debug)]
pub struct LoweringOutput {
    /// The lowered IET and its timing ledger.
    pub graph: Graph,
    /// The effective mode after resolution.
    pub mode: Mode,
    /// The option set the rewriter ran with.
    pub options: Options,
    /// Option keys that were dropped.
    pub ignored: Vec<UnsupportedOption>,
    /// The profiling message that was emitted.
    pub profile: String,
}

/// Lowers IETs against a sealed registry.
pub struct Lowerer<'r> {
    registry: &'r TargetRegistry,
    config: Configuration,
    sink: Arc<dyn ProfileSink>,
}

impl<'r> Lowerer<'r> {
    /// A lowerer reporting profiles through [`TracingSink`].
    pub fn new(registry: &'r TargetRegistry, config: Configuration) -> Self {
        Self::with_sink(registry, config, Arc::new(TracingSink))
    }

    /// A lowerer reporting profiles to `sink`.
    pub fn with_sink(
        registry: &'r TargetRegistry,
        config: Configuration,
        sink: Arc<dyn ProfileSink>,
    ) -> Self {
        Self {
            registry,
            config,
            sink,
        }
    }

    /// The configuration this lowerer reads its defaults from.
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Specialize `iet` for `platform`.
    pub fn lower(
        &self,
        iet: Node,
        platform: &Platform,
        mode: Option<&ModeRequest>,
        overrides: &OptionOverrides,
    ) -> Result<LoweringOutput> {
        let resolved = resolve_options(Options::from_config(&self.config), overrides)?;
        let options = resolved.options;
        let mode = resolve_mode(mode, &options);

        let run_id = Uuid::new_v4();
        let span = info_span!("lower", run = %run_id, platform = %platform.name, mode = %mode);
        let _guard = span.enter();

        let target = self.build_target(&mode, options, platform)?;
        debug!(passes = ?target.pass_names(), "rewriter ready");
        if let Ok(hash) = iet.structural_hash() {
            debug!(hash = %hash_hex(&hash), "input");
        }

        let graph = target.process(iet)?;
        if let Ok(hash) = graph.root().structural_hash() {
            debug!(hash = %hash_hex(&hash), "output");
        }

        let profile = report(graph.timings(), self.config.profiling, self.sink.as_ref());
        Ok(LoweringOutput {
            graph,
            mode,
            options,
            ignored: resolved.ignored,
            profile,
        })
    }

    fn build_target(&self, mode: &Mode, options: Options, platform: &Platform) -> Result<Target> {
        if let Some(key) = mode.key() {
            match self.registry.fetch(platform, &key) {
                Ok(factory) => return factory(options, platform),
                Err(LowerError::TargetNotFound { .. }) => {
                    debug!(mode = %key, "mode not registered; trying it as a custom pass sequence");
                }
                Err(e) => return Err(e),
            }
        }
        let factory = self.registry.fetch_custom(platform)?;
        factory(mode.to_passes(), options, platform)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use iet_targets::classes;

    use super::*;
    use crate::config::ProfilingLevel;
    use crate::error::PassError;
    use crate::mode::{Parallelism, ADVANCED, NOOP};
    use crate::options::OptionValue;
    use crate::pass::{pass_fn, Pass, PassLibrary};
    use crate::profiling::tests::RecordingSink;
    use crate::registry::{ModeMap, RegistryBuilder};
    use crate::target::{CustomFactory, RewriterFactory};

    type Log = Arc<Mutex<Vec<String>>>;

    fn logging_pass(name: &'static str, log: &Log) -> Arc<dyn Pass> {
        let log = log.clone();
        pass_fn(name, move |_, _| {
            log.lock().unwrap().push(name.to_string());
            Ok(())
        })
    }

    fn pipeline(names: &'static [&'static str], log: &Log) -> RewriterFactory {
        let log = log.clone();
        Arc::new(move |options, platform| {
            let passes = names.iter().map(|n| logging_pass(*n, &log)).collect();
            Ok(Target::new(options, platform, passes))
        })
    }

    /// A custom factory that records the sequence it was built with.
    fn recording_custom(log: &Log, seen: &Arc<Mutex<Vec<Vec<String>>>>) -> CustomFactory {
        let mut lib = PassLibrary::new();
        for name in ["passA", "passB", "mpi", "openmp"] {
            lib.register(logging_pass(name, log));
        }
        let seen = seen.clone();
        Arc::new(move |seq, options, platform| {
            seen.lock().unwrap().push(seq.clone());
            Target::custom(&seq, options, platform, &lib)
        })
    }

    fn iet() -> Node {
        Node::callable("kernel", vec![Node::iteration("x", vec![Node::expression("a = 1")])])
    }

    #[test]
    fn unregistered_mode_falls_back_to_custom_sequence() {
        let log = Log::default();
        let seen = Arc::default();
        let mut b = RegistryBuilder::new();
        b.add(
            classes::cpu64(),
            ModeMap::new()
                .with(NOOP, pipeline(&[], &log))
                .with(ADVANCED, pipeline(&["adv"], &log))
                .with_custom(recording_custom(&log, &seen)),
        )
        .unwrap();
        let registry = b.seal();
        let lowerer = Lowerer::with_sink(
            &registry,
            Configuration::default(),
            Arc::new(RecordingSink::default()),
        );

        let request = ModeRequest::from(vec!["passA".to_string(), "passB".to_string()]);
        let out = lowerer
            .lower(iet(), &Platform::skx(), Some(&request), &OptionOverrides::new())
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![vec!["passA", "passB"]]);
        assert_eq!(*log.lock().unwrap(), vec!["passA", "passB"]);
        assert_eq!(out.graph.timings().labels(), vec!["passA", "passB"]);

        // A comma-separated mode name is reinterpreted the same way.
        log.lock().unwrap().clear();
        let request = ModeRequest::from("passB,passA");
        lowerer
            .lower(iet(), &Platform::skx(), Some(&request), &OptionOverrides::new())
            .unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["passB", "passA"]);
    }

    #[test]
    fn missing_custom_factory_is_fatal() {
        let log = Log::default();
        let mut b = RegistryBuilder::new();
        b.add(
            classes::cpu64(),
            ModeMap::new()
                .with(NOOP, pipeline(&[], &log))
                .with(ADVANCED, pipeline(&[], &log)),
        )
        .unwrap();
        let registry = b.seal();
        let sink = Arc::new(RecordingSink::default());
        let lowerer = Lowerer::with_sink(&registry, Configuration::default(), sink.clone());

        let request = ModeRequest::from("turbo");
        let err = lowerer
            .lower(iet(), &Platform::cpu64(), Some(&request), &OptionOverrides::new())
            .unwrap_err();
        assert!(matches!(err, LowerError::TargetNotFound { ref mode, .. } if mode == "custom"));
        assert!(sink.messages.lock().unwrap().is_empty());
    }

    #[test]
    fn one_profile_message_per_call() {
        let log = Log::default();
        let mut b = RegistryBuilder::new();
        b.add(
            classes::cpu64(),
            ModeMap::new()
                .with(NOOP, pipeline(&[], &log))
                .with(ADVANCED, pipeline(&["a", "b"], &log)),
        )
        .unwrap();
        let registry = b.seal();
        let sink = Arc::new(RecordingSink::default());
        let config = Configuration {
            profiling: ProfilingLevel::Basic,
            ..Default::default()
        };
        let lowerer = Lowerer::with_sink(&registry, config, sink.clone());

        let advanced = ModeRequest::from(ADVANCED);
        for n in 1..=3 {
            let out = lowerer
                .lower(iet(), &Platform::arm(), Some(&advanced), &OptionOverrides::new())
                .unwrap();
            let messages = sink.messages.lock().unwrap();
            assert_eq!(messages.len(), n);
            assert_eq!(messages[n - 1], out.profile);
            assert!(out.profile.contains("[Total elapsed:"));
        }
    }

    #[test]
    fn noop_with_mpi_uses_parallel_rewriter() {
        let log = Log::default();
        let mut b = RegistryBuilder::new();
        b.add(
            classes::cpu64(),
            ModeMap::new()
                .with(NOOP, pipeline(&[], &log))
                .with(ADVANCED, pipeline(&["adv"], &log))
                .with(Parallelism::MPI, pipeline(&["mpi"], &log)),
        )
        .unwrap();
        let registry = b.seal();
        let lowerer = Lowerer::with_sink(
            &registry,
            Configuration::default(),
            Arc::new(RecordingSink::default()),
        );

        let overrides = OptionOverrides::new().with("mpi", OptionValue::Bool(true));
        let noop = ModeRequest::from(NOOP);
        let out = lowerer
            .lower(iet(), &Platform::cpu64(), Some(&noop), &overrides)
            .unwrap();
        assert_eq!(out.mode, Mode::Parallel(Parallelism::MPI));
        assert_eq!(*log.lock().unwrap(), vec!["mpi"]);

        // No mode at all stays a plain noop.
        log.lock().unwrap().clear();
        let out = lowerer
            .lower(iet(), &Platform::cpu64(), None, &overrides)
            .unwrap();
        assert_eq!(out.mode, Mode::Known(NOOP.into()));
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(out.graph.root(), &iet());
    }

    #[test]
    fn unknown_option_is_reported_and_dropped() {
        let log = Log::default();
        let mut b = RegistryBuilder::new();
        b.add(
            classes::cpu64(),
            ModeMap::new()
                .with(NOOP, pipeline(&[], &log))
                .with(ADVANCED, pipeline(&[], &log)),
        )
        .unwrap();
        let registry = b.seal();
        let lowerer = Lowerer::with_sink(
            &registry,
            Configuration::default(),
            Arc::new(RecordingSink::default()),
        );

        let overrides = OptionOverrides::new().with("foobar", OptionValue::Int(1));
        let out = lowerer
            .lower(iet(), &Platform::cpu64(), Some(&ModeRequest::from(ADVANCED)), &overrides)
            .unwrap();
        assert_eq!(out.ignored.len(), 1);
        assert!(!out.options.blockinner);
    }

    #[test]
    fn failing_pass_propagates_without_profile() {
        let failing: RewriterFactory = Arc::new(|options, platform| {
            Ok(Target::new(
                options,
                platform,
                vec![pass_fn("broken", |_, _| Err(PassError::new("bad loop nest")))],
            ))
        });
        let log = Log::default();
        let mut b = RegistryBuilder::new();
        b.add(
            classes::cpu64(),
            ModeMap::new().with(NOOP, pipeline(&[], &log)).with(ADVANCED, failing),
        )
        .unwrap();
        let registry = b.seal();
        let sink = Arc::new(RecordingSink::default());
        let lowerer = Lowerer::with_sink(&registry, Configuration::default(), sink.clone());

        let err = lowerer
            .lower(iet(), &Platform::cpu64(), Some(&ModeRequest::from(ADVANCED)), &OptionOverrides::new())
            .unwrap_err();
        assert!(matches!(err, LowerError::PassExecutionFailure { ref pass, .. } if pass == "broken"));
        assert!(sink.messages.lock().unwrap().is_empty());
    }

    #[test]
    fn configuration_defaults_reach_passes() {
        let inspect: RewriterFactory = Arc::new(|options, platform| {
            Ok(Target::new(
                options,
                platform,
                vec![pass_fn("inspect", |_, ctx| {
                    if ctx.options.openmp && ctx.options.blocklevels == Some(2) {
                        Ok(())
                    } else {
                        Err(PassError::new("defaults not applied"))
                    }
                })],
            ))
        });
        let log = Log::default();
        let mut b = RegistryBuilder::new();
        b.add(
            classes::cpu64(),
            ModeMap::new().with(NOOP, pipeline(&[], &log)).with(ADVANCED, inspect),
        )
        .unwrap();
        let registry = b.seal();
        let mut config = Configuration {
            openmp: true,
            ..Default::default()
        };
        config.dle_options.blocklevels = Some(2);
        let lowerer = Lowerer::with_sink(&registry, config, Arc::new(RecordingSink::default()));
        assert!(lowerer.config().openmp);
        assert!(lowerer
            .lower(iet(), &Platform::cpu64(), Some(&ModeRequest::from(ADVANCED)), &OptionOverrides::new())
            .is_ok());
    }
}
