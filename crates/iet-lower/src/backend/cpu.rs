//! Reference CPU backend: registrations for `cpu64` and `intel64-knl`.

use std::sync::Arc;

use iet_targets::classes;

use super::passes::{
    Blocking, Denormals, Mpi, OpenMp, Simd, BLOCKING, DENORMALS, MPI, OPENMP, OPENMP_NESTED, SIMD,
};
use crate::error::RegistrationError;
use crate::mode::{Parallelism, ADVANCED, NOOP};
use crate::options::Options;
use crate::pass::PassLibrary;
use crate::registry::{ModeMap, RegistryBuilder};
use crate::target::{CustomFactory, RewriterFactory, Target};

/// Every pass the CPU backend can run, addressable by name.
pub fn cpu_pass_library() -> PassLibrary {
    let mut lib = PassLibrary::new();
    lib.register(Arc::new(Denormals))
        .register(Arc::new(Simd))
        .register(Arc::new(Blocking))
        .register(Arc::new(OpenMp { nested: false }))
        .register(Arc::new(OpenMp { nested: true }))
        .register(Arc::new(Mpi));
    lib
}

/// The `advanced` pipeline for the given options.
fn advanced_pipeline(options: &Options, openmp_pass: &str) -> Vec<String> {
    let mut passes = vec![DENORMALS, SIMD, BLOCKING];
    if options.openmp {
        passes.push(openmp_pass);
    }
    if options.mpi {
        passes.push(MPI);
    }
    passes.into_iter().map(str::to_string).collect()
}

/// A factory that runs a pipeline computed from the options.
fn pipeline_factory<F>(lib: &Arc<PassLibrary>, pipeline: F) -> RewriterFactory
where
    F: Fn(&Options) -> Vec<String> + Send + Sync + 'static,
{
    let lib = Arc::clone(lib);
    Arc::new(move |options, platform| Target::custom(&pipeline(&options), options, platform, &lib))
}

fn fixed(lib: &Arc<PassLibrary>, passes: &'static [&'static str]) -> RewriterFactory {
    pipeline_factory(lib, move |_| passes.iter().map(|p| p.to_string()).collect())
}

fn custom_factory(lib: &Arc<PassLibrary>) -> CustomFactory {
    let lib = Arc::clone(lib);
    Arc::new(move |sequence, options, platform| Target::custom(&sequence, options, platform, &lib))
}

fn mode_map(lib: &Arc<PassLibrary>, openmp_pass: &'static str) -> ModeMap {
    ModeMap::new()
        .with(NOOP, Arc::new(|options, platform| Ok(Target::noop(options, platform))))
        .with(
            ADVANCED,
            pipeline_factory(lib, move |o| advanced_pipeline(o, openmp_pass)),
        )
        .with(Parallelism::MPI, fixed(lib, &[MPI]))
        .with(Parallelism::OPENMP, fixed(lib, &[OPENMP]))
        .with(Parallelism::BOTH, fixed(lib, &[MPI, OPENMP]))
        .with_custom(custom_factory(lib))
}

/// Register the CPU rewriters.
///
/// `cpu64` covers every CPU platform; `intel64-knl` overrides it with
/// nested OpenMP in the `advanced` pipeline to use the extra hardware threads.
pub fn register_cpu_backend(builder: &mut RegistryBuilder) -> Result<(), RegistrationError> {
    let lib = Arc::new(cpu_pass_library());
    builder
        .add(classes::cpu64(), mode_map(&lib, OPENMP))?
        .add(classes::intel64_knl(), mode_map(&lib, OPENMP_NESTED))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use iet_core::{Node, Property};
    use iet_targets::Platform;

    use super::*;
    use crate::mode::ModeKey;
    use crate::registry::TargetRegistry;

    fn registry() -> TargetRegistry {
        let mut b = RegistryBuilder::new();
        register_cpu_backend(&mut b).unwrap();
        b.seal()
    }

    fn build(registry: &TargetRegistry, platform: &Platform, key: ModeKey, options: Options) -> Target {
        let factory = registry.fetch(platform, &key).unwrap();
        factory(options, platform).unwrap()
    }

    fn nest() -> Node {
        Node::callable(
            "kernel",
            vec![Node::iteration(
                "x",
                vec![Node::iteration("y", vec![Node::expression("u = 2*u")])],
            )],
        )
    }

    #[test]
    fn library_names() {
        assert_eq!(
            cpu_pass_library().names(),
            vec![DENORMALS, SIMD, BLOCKING, OPENMP, OPENMP_NESTED, MPI]
        );
    }

    #[test]
    fn noop_is_empty() {
        let r = registry();
        let t = build(&r, &Platform::skx(), ModeKey::from(NOOP), Options::default());
        assert!(t.pass_names().is_empty());
    }

    #[test]
    fn advanced_follows_options() {
        let r = registry();
        let key = ModeKey::from(ADVANCED);
        let t = build(&r, &Platform::skx(), key.clone(), Options::default());
        assert_eq!(t.pass_names(), vec![DENORMALS, SIMD, BLOCKING]);

        let both = Options {
            openmp: true,
            mpi: true,
            ..Default::default()
        };
        let t = build(&r, &Platform::skx(), key.clone(), both);
        assert_eq!(t.pass_names(), vec![DENORMALS, SIMD, BLOCKING, OPENMP, MPI]);

        let t = build(&r, &Platform::knl(), key, both);
        assert_eq!(t.pass_names(), vec![DENORMALS, SIMD, BLOCKING, OPENMP_NESTED, MPI]);
    }

    #[test]
    fn parallel_keys() {
        let r = registry();
        let p = Platform::power9();
        let names = |k: Parallelism| {
            build(&r, &p, ModeKey::from(k), Options::default())
                .pass_names()
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>()
        };
        assert_eq!(names(Parallelism::MPI), vec![MPI]);
        assert_eq!(names(Parallelism::OPENMP), vec![OPENMP]);
        assert_eq!(names(Parallelism::BOTH), vec![MPI, OPENMP]);
    }

    #[test]
    fn advanced_annotates_the_tree() {
        let r = registry();
        let options = Options {
            openmp: true,
            ..Default::default()
        };
        let graph = build(&r, &Platform::skx(), ModeKey::from(ADVANCED), options)
            .process(nest())
            .unwrap();
        let root = graph.root();
        assert!(root.has_property(Property::FlushDenormals));
        let x = &root.children[0];
        assert!(x.has_property(Property::Parallel));
        assert!(x.has_property(Property::Blocked(1)));
        let y = &x.children[0];
        assert!(y.has_property(Property::Vectorized));
        assert!(!y.has_property(Property::Blocked(1)));
        assert_eq!(graph.timings().labels(), vec![DENORMALS, SIMD, BLOCKING, OPENMP]);
        assert!(graph.includes().contains("omp.h"));
    }

    #[test]
    fn advanced_with_mpi_accepts_loop_free_kernel() {
        let r = registry();
        let options = Options {
            mpi: true,
            ..Default::default()
        };
        let kernel = Node::callable("init", vec![Node::expression("a = 0")]);
        let graph = build(&r, &Platform::cpu64(), ModeKey::from(ADVANCED), options)
            .process(kernel)
            .unwrap();
        assert_eq!(graph.timings().labels(), vec![DENORMALS, SIMD, BLOCKING, MPI]);
        assert!(!graph.includes().contains("mpi.h"));
    }

    #[test]
    fn devices_are_not_served() {
        let r = registry();
        assert!(r.fetch(&Platform::nvidia_x(), &ModeKey::from(NOOP)).is_err());
        assert!(r.fetch_custom(&Platform::nvidia_x()).is_err());
    }

    #[test]
    fn custom_sequence_runs_verbatim() {
        let r = registry();
        let p = Platform::arm();
        let factory = r.fetch_custom(&p).unwrap();
        let seq = vec![SIMD.to_string(), SIMD.to_string(), MPI.to_string()];
        let graph = factory(seq, Options::default(), &p)
            .unwrap()
            .process(nest())
            .unwrap();
        assert_eq!(graph.timings().labels(), vec!["simd", "simd1", "mpi"]);
    }
}
