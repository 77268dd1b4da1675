//! Tree traversal helpers used by lowering passes.

use crate::node::Node;

impl Node {
    /// Pre-order walk over the subtree rooted at `self`.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }

    /// Pre-order mutable walk over the subtree rooted at `self`.
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Node)) {
        f(self);
        for child in &mut self.children {
            child.walk_mut(f);
        }
    }

    /// Apply `f` to every iteration that has no iteration ancestor.
    pub fn outermost_iterations_mut(&mut self, f: &mut impl FnMut(&mut Node)) {
        if self.is_iteration() {
            f(self);
            return;
        }
        for child in &mut self.children {
            child.outermost_iterations_mut(f);
        }
    }

    /// Apply `f` to every iteration that has no iteration descendant.
    pub fn innermost_iterations_mut(&mut self, f: &mut impl FnMut(&mut Node)) {
        for child in &mut self.children {
            child.innermost_iterations_mut(f);
        }
        if self.is_iteration() && !self.children.iter().any(Node::contains_iteration) {
            f(self);
        }
    }

    /// Whether this subtree contains at least one iteration (including `self`).
    pub fn contains_iteration(&self) -> bool {
        self.is_iteration() || self.children.iter().any(Node::contains_iteration)
    }
}
