//! Node types and the Node struct.
//!
//! An IET is a tree: callables contain sections, sections contain
//! iterations, iterations nest and eventually hold expressions.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of construct a node represents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum NodeKind {
    /// A generated function (the usual root of an IET).
    Callable { name: String },
    /// A named region of the callable, e.g. the main time loop.
    Section { name: String },
    /// A loop over a dimension.
    Iteration {
        dim: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        extent: Option<u64>,
    },
    /// A leaf statement.
    Expression { expr: String },
    /// An ordered list of statements with no semantics of its own.
    List,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Callable { name } => write!(f, "Callable({name})"),
            NodeKind::Section { name } => write!(f, "Section({name})"),
            NodeKind::Iteration { dim, extent: Some(n) } => write!(f, "Iteration({dim}, {n})"),
            NodeKind::Iteration { dim, extent: None } => write!(f, "Iteration({dim})"),
            NodeKind::Expression { expr } => write!(f, "Expression({expr})"),
            NodeKind::List => write!(f, "List"),
        }
    }
}

/// Annotations attached to nodes by the frontend or by lowering passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Property {
    /// Carries a dependence; must never be parallelized.
    Sequential,
    /// Iterations are independent.
    Parallel,
    /// Parallel loop nested inside another parallel loop.
    ParallelNested,
    /// Innermost loop marked for SIMD execution.
    Vectorized,
    /// Loop tiled at the given hierarchical level (1 = blocks, 2 = sub-blocks, ...).
    Blocked(u32),
    /// Loop whose domain is decomposed across MPI ranks.
    Distributed,
    /// Callable flushes denormal floats to zero on entry.
    FlushDenormals,
}

/// A node in an Iteration/Expression Tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Node {
    /// What this node is.
    pub kind: NodeKind,
    /// Annotations, kept sorted for deterministic output and hashing.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub properties: BTreeSet<Property>,
    /// Child nodes in program order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    /// Create a node of the given kind with no properties or children.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            properties: BTreeSet::new(),
            children: Vec::new(),
        }
    }

    /// A callable named `name` whose body is `body`.
    pub fn callable(name: impl Into<String>, body: Vec<Node>) -> Self {
        Self::new(NodeKind::Callable { name: name.into() }).with_children(body)
    }

    /// A loop over `dim` with unknown trip count.
    pub fn iteration(dim: impl Into<String>, body: Vec<Node>) -> Self {
        Self::new(NodeKind::Iteration {
            dim: dim.into(),
            extent: None,
        })
        .with_children(body)
    }

    /// A leaf statement.
    pub fn expression(expr: impl Into<String>) -> Self {
        Self::new(NodeKind::Expression { expr: expr.into() })
    }

    /// An ordered list of statements.
    pub fn list(body: Vec<Node>) -> Self {
        Self::new(NodeKind::List).with_children(body)
    }

    /// Builder: replace the children.
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Builder: add a property.
    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.insert(property);
        self
    }

    /// Builder: set the trip count of an iteration. No effect on other kinds.
    pub fn with_extent(mut self, n: u64) -> Self {
        if let NodeKind::Iteration { extent, .. } = &mut self.kind {
            *extent = Some(n);
        }
        self
    }

    /// Whether this node is a loop.
    pub fn is_iteration(&self) -> bool {
        matches!(self.kind, NodeKind::Iteration { .. })
    }

    /// Whether `property` is attached to this node.
    pub fn has_property(&self, property: Property) -> bool {
        self.properties.contains(&property)
    }

    /// Dimension name if this node is an iteration.
    pub fn dim(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Iteration { dim, .. } => Some(dim),
            _ => None,
        }
    }
}
