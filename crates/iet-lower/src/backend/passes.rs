//! Annotation passes of the reference CPU backend.
//!
//! These passes do not restructure the tree. They mark nodes with the
//! [`Property`] a code generator would act on and record the headers the
//! generated code needs.

use iet_core::{Node, NodeKind, Property};

use crate::error::PassError;
use crate::graph::Graph;
use crate::pass::{Pass, PassContext};

pub const DENORMALS: &str = "denormals";
pub const SIMD: &str = "simd";
pub const BLOCKING: &str = "blocking";
pub const OPENMP: &str = "openmp";
pub const OPENMP_NESTED: &str = "openmp-nested";
pub const MPI: &str = "mpi";

/// Deepest blocking hierarchy the backend will annotate.
pub const MAX_BLOCK_LEVELS: u32 = 4;

fn is_innermost(node: &Node) -> bool {
    !node.children.iter().any(Node::contains_iteration)
}

fn parallelizable(node: &Node) -> bool {
    node.is_iteration() && !node.has_property(Property::Sequential)
}

/// Flush denormal numbers to zero at the start of every callable.
#[derive(Debug)]
pub struct Denormals;

impl Pass for Denormals {
    fn name(&self) -> &str {
        DENORMALS
    }

    fn run(&self, graph: &mut Graph, _ctx: &PassContext<'_>) -> Result<(), PassError> {
        let mut touched = false;
        graph.root_mut().walk_mut(&mut |n| {
            if matches!(n.kind, NodeKind::Callable { .. }) {
                n.properties.insert(Property::FlushDenormals);
                touched = true;
            }
        });
        if touched {
            graph.add_include("xmmintrin.h");
            graph.add_include("pmmintrin.h");
        }
        Ok(())
    }
}

/// Mark innermost loops for vectorization.
#[derive(Debug)]
pub struct Simd;

impl Pass for Simd {
    fn name(&self) -> &str {
        SIMD
    }

    fn run(&self, graph: &mut Graph, ctx: &PassContext<'_>) -> Result<(), PassError> {
        if ctx.platform.simd_reg_bytes == 0 {
            return Ok(());
        }
        graph.root_mut().innermost_iterations_mut(&mut |n| {
            if parallelizable(n) {
                n.properties.insert(Property::Vectorized);
            }
        });
        Ok(())
    }
}

/// Loop blocking. Innermost loops are left alone unless `blockinner` is set.
#[derive(Debug)]
pub struct Blocking;

impl Pass for Blocking {
    fn name(&self) -> &str {
        BLOCKING
    }

    fn run(&self, graph: &mut Graph, ctx: &PassContext<'_>) -> Result<(), PassError> {
        let levels = ctx
            .options
            .blocklevels
            .unwrap_or(ctx.platform.default_block_levels);
        if levels > MAX_BLOCK_LEVELS {
            return Err(PassError::new(format!(
                "{levels} blocking levels requested, at most {MAX_BLOCK_LEVELS} supported"
            )));
        }
        if levels == 0 {
            return Ok(());
        }
        let blockinner = ctx.options.blockinner;
        graph.root_mut().walk_mut(&mut |n| {
            if parallelizable(n) && (blockinner || !is_innermost(n)) {
                n.properties.insert(Property::Blocked(levels));
            }
        });
        Ok(())
    }
}

/// Shared-memory parallelism over the outermost parallel loops.
///
/// The nested variant also marks the loops directly below them, for
/// many-core platforms with several hardware threads per core.
#[derive(Debug)]
pub struct OpenMp {
    pub nested: bool,
}

impl Pass for OpenMp {
    fn name(&self) -> &str {
        if self.nested {
            OPENMP_NESTED
        } else {
            OPENMP
        }
    }

    fn run(&self, graph: &mut Graph, _ctx: &PassContext<'_>) -> Result<(), PassError> {
        let marked = mark_parallel(graph.root_mut(), self.nested);
        if marked > 0 {
            graph.add_include("omp.h");
        }
        Ok(())
    }
}

/// Mark the outermost parallelizable loops below `node`, looking through
/// sequential loops. Returns how many loops were marked `Parallel`.
fn mark_parallel(node: &mut Node, nested: bool) -> usize {
    if !parallelizable(node) {
        return node
            .children
            .iter_mut()
            .map(|child| mark_parallel(child, nested))
            .sum();
    }
    node.properties.insert(Property::Parallel);
    if nested {
        for child in &mut node.children {
            child.outermost_iterations_mut(&mut |inner| {
                if parallelizable(inner) {
                    inner.properties.insert(Property::ParallelNested);
                }
            });
        }
    }
    1
}

/// Domain decomposition over the outermost loops.
#[derive(Debug)]
pub struct Mpi;

impl Pass for Mpi {
    fn name(&self) -> &str {
        MPI
    }

    fn run(&self, graph: &mut Graph, _ctx: &PassContext<'_>) -> Result<(), PassError> {
        let mut distributed = 0usize;
        graph.root_mut().outermost_iterations_mut(&mut |n| {
            n.properties.insert(Property::Distributed);
            distributed += 1;
        });
        if distributed > 0 {
            graph.add_include("mpi.h");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use iet_targets::Platform;

    use super::*;
    use crate::options::Options;

    /// `t { x { y { expr } } ; s(seq) { expr } }`
    fn stencil() -> Node {
        Node::callable(
            "kernel",
            vec![
                Node::iteration(
                    "t",
                    vec![Node::iteration(
                        "x",
                        vec![Node::iteration("y", vec![Node::expression("u = u + 1")])],
                    )],
                ),
                Node::iteration("s", vec![Node::expression("r = r + u")])
                    .with_property(Property::Sequential),
            ],
        )
    }

    fn run(pass: &dyn Pass, options: Options, platform: &Platform) -> Result<Graph, PassError> {
        let mut graph = Graph::new(stencil());
        pass.run(&mut graph, &PassContext { options: &options, platform })?;
        Ok(graph)
    }

    fn props(graph: &Graph, dim: &str) -> Vec<Property> {
        let mut found = Vec::new();
        graph.root().walk(&mut |n| {
            if n.dim() == Some(dim) {
                found = n.properties.iter().copied().collect();
            }
        });
        found
    }

    #[test]
    fn denormals_marks_callables() {
        let g = run(&Denormals, Options::default(), &Platform::cpu64()).unwrap();
        assert!(g.root().has_property(Property::FlushDenormals));
        assert!(g.includes().contains("pmmintrin.h"));
    }

    #[test]
    fn simd_marks_innermost_parallel_loops() {
        let g = run(&Simd, Options::default(), &Platform::skx()).unwrap();
        assert_eq!(props(&g, "y"), vec![Property::Vectorized]);
        assert!(props(&g, "x").is_empty());
        assert_eq!(props(&g, "s"), vec![Property::Sequential]);
    }

    #[test]
    fn simd_needs_vector_registers() {
        let mut scalar = Platform::cpu64();
        scalar.simd_reg_bytes = 0;
        let g = run(&Simd, Options::default(), &scalar).unwrap();
        assert_eq!(g.root(), &stencil());
    }

    #[test]
    fn blocking_respects_blockinner() {
        let options = Options {
            blocklevels: Some(2),
            ..Default::default()
        };
        let g = run(&Blocking, options, &Platform::cpu64()).unwrap();
        assert_eq!(props(&g, "t"), vec![Property::Blocked(2)]);
        assert_eq!(props(&g, "x"), vec![Property::Blocked(2)]);
        assert!(props(&g, "y").is_empty());

        let options = Options {
            blockinner: true,
            blocklevels: Some(1),
            ..Default::default()
        };
        let g = run(&Blocking, options, &Platform::cpu64()).unwrap();
        assert_eq!(props(&g, "y"), vec![Property::Blocked(1)]);
    }

    #[test]
    fn blocking_defaults_to_platform_levels() {
        let g = run(&Blocking, Options::default(), &Platform::knl()).unwrap();
        assert_eq!(
            props(&g, "t"),
            vec![Property::Blocked(Platform::knl().default_block_levels)]
        );
    }

    #[test]
    fn blocking_rejects_deep_hierarchies() {
        let options = Options {
            blocklevels: Some(MAX_BLOCK_LEVELS + 1),
            ..Default::default()
        };
        assert!(run(&Blocking, options, &Platform::cpu64()).is_err());
    }

    #[test]
    fn openmp_marks_outermost() {
        let g = run(&OpenMp { nested: false }, Options::default(), &Platform::cpu64()).unwrap();
        assert_eq!(props(&g, "t"), vec![Property::Parallel]);
        assert!(props(&g, "x").is_empty());
        assert_eq!(props(&g, "s"), vec![Property::Sequential]);
        assert!(g.includes().contains("omp.h"));
    }

    #[test]
    fn openmp_looks_through_sequential_time_loop() {
        let iet = Node::callable(
            "kernel",
            vec![Node::iteration(
                "time",
                vec![Node::iteration(
                    "x",
                    vec![Node::iteration("y", vec![Node::expression("u = u + 1")])],
                )],
            )
            .with_property(Property::Sequential)],
        );
        let mut graph = Graph::new(iet);
        let options = Options::default();
        let ctx = PassContext {
            options: &options,
            platform: &Platform::cpu64(),
        };
        OpenMp { nested: false }.run(&mut graph, &ctx).unwrap();
        assert_eq!(props(&graph, "time"), vec![Property::Sequential]);
        assert_eq!(props(&graph, "x"), vec![Property::Parallel]);
        assert!(props(&graph, "y").is_empty());
        assert!(graph.includes().contains("omp.h"));
    }

    #[test]
    fn nested_openmp_marks_next_level() {
        let pass = OpenMp { nested: true };
        assert_eq!(pass.name(), OPENMP_NESTED);
        let g = run(&pass, Options::default(), &Platform::knl()).unwrap();
        assert_eq!(props(&g, "t"), vec![Property::Parallel]);
        assert_eq!(props(&g, "x"), vec![Property::ParallelNested]);
        assert!(props(&g, "y").is_empty());
    }

    #[test]
    fn mpi_distributes_outermost() {
        let g = run(&Mpi, Options::default(), &Platform::cpu64()).unwrap();
        assert_eq!(props(&g, "t"), vec![Property::Distributed]);
        assert!(g.includes().contains("mpi.h"));
    }

    #[test]
    fn mpi_leaves_loop_free_kernels_alone() {
        let kernel = Node::callable("k", vec![Node::expression("a = 1")]);
        let mut graph = Graph::new(kernel.clone());
        let options = Options::default();
        let ctx = PassContext {
            options: &options,
            platform: &Platform::cpu64(),
        };
        Mpi.run(&mut graph, &ctx).unwrap();
        assert_eq!(graph.root(), &kernel);
        assert!(graph.includes().is_empty());
    }
}
