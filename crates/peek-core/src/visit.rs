//! Cancellable depth-first traversal over syntax trees.
//!
//! The walker is iterative: it keeps an explicit worklist instead of
//! recursing, so deeply nested sources cannot overflow the stack and the
//! cancel token can be checked at every single step.
//!
//! # Order
//!
//! Pre-order. Children are visited in the order [`Walkable::children`]
//! returns them (source order for the PHP frontend), and a node's whole
//! subtree is finished before its next sibling is entered. "First match wins"
//! lookups rely on this order being stable across runs.
//!
//! # Example
//!
//! ```
//! use peek_core::CancelToken;
//! use peek_core::visit::{Children, WalkFlow, Walkable, walk};
//!
//! struct Call {
//!     nested: Vec<Call>,
//! }
//!
//! impl Walkable for Call {
//!     fn children(&self) -> Children<'_, Self> {
//!         self.nested.iter().collect()
//!     }
//! }
//!
//! let root = Call {
//!     nested: vec![Call { nested: vec![] }, Call { nested: vec![] }],
//! };
//! let mut calls = 0;
//! let outcome = walk(&root, &CancelToken::new(), |_ctx, _node| {
//!     calls += 1;
//!     WalkFlow::Continue
//! });
//! assert_eq!(calls, 3);
//! assert_eq!(outcome.visited(), 3);
//! ```

use smallvec::SmallVec;

use crate::cancel::CancelToken;

/// Child list returned by [`Walkable::children`]; most nodes have few children.
pub type Children<'t, N> = SmallVec<[&'t N; 4]>;

/// A tree node whose nested nodes can be enumerated.
///
/// Implementations match on their node kind and list every child field
/// explicitly. Absent optional fields are simply not returned.
pub trait Walkable: Sized {
    fn children(&self) -> Children<'_, Self>;
}

/// Signal returned by a visitor after inspecting a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkFlow {
    Continue,
    Stop,
}

/// How a walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkOutcome {
    /// Every reachable node was visited.
    Completed { visited: usize },
    /// The visitor returned [`WalkFlow::Stop`].
    Stopped { visited: usize },
    /// The cancel token fired before the walk finished.
    Cancelled { visited: usize },
}

impl WalkOutcome {
    pub fn visited(&self) -> usize {
        match *self {
            WalkOutcome::Completed { visited }
            | WalkOutcome::Stopped { visited }
            | WalkOutcome::Cancelled { visited } => visited,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, WalkOutcome::Cancelled { .. })
    }
}

/// Position of the node currently being visited.
pub struct WalkCtx<'a, 't, N> {
    ancestors: &'a [&'t N],
}

impl<'a, 't, N> WalkCtx<'a, 't, N> {
    /// Ancestors from the root down to the direct parent.
    pub fn ancestors(&self) -> &'a [&'t N] {
        self.ancestors
    }

    pub fn parent(&self) -> Option<&'t N> {
        self.ancestors.last().copied()
    }

    pub fn depth(&self) -> usize {
        self.ancestors.len()
    }

    /// Nearest ancestor satisfying `predicate`, innermost first.
    pub fn find_ancestor<F>(&self, predicate: F) -> Option<&'t N>
    where
        F: Fn(&N) -> bool,
    {
        self.ancestors
            .iter()
            .rev()
            .copied()
            .find(|node| predicate(node))
    }
}

/// Walk `root` in pre-order, calling `visit` for every node until it asks to
/// stop, the tree is exhausted, or `token` is cancelled.
///
/// The token is checked before each visit; once it fires no further `visit`
/// calls are made.
pub fn walk<'t, N, F>(root: &'t N, token: &CancelToken, mut visit: F) -> WalkOutcome
where
    N: Walkable,
    F: FnMut(&WalkCtx<'_, 't, N>, &'t N) -> WalkFlow,
{
    let mut stack: Vec<(&'t N, usize)> = vec![(root, 0)];
    let mut path: Vec<&'t N> = Vec::new();
    let mut visited = 0usize;

    while let Some((node, depth)) = stack.pop() {
        if token.is_cancelled() {
            return WalkOutcome::Cancelled { visited };
        }

        path.truncate(depth);
        visited += 1;
        let flow = visit(&WalkCtx { ancestors: &path }, node);
        if flow == WalkFlow::Stop {
            return WalkOutcome::Stopped { visited };
        }

        path.push(node);
        let children = node.children();
        stack.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
    }

    WalkOutcome::Completed { visited }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[derive(Debug)]
    struct TestNode {
        name: &'static str,
        kids: Vec<TestNode>,
    }

    impl TestNode {
        fn leaf(name: &'static str) -> Self {
            Self {
                name,
                kids: Vec::new(),
            }
        }

        fn with(name: &'static str, kids: Vec<TestNode>) -> Self {
            Self { name, kids }
        }
    }

    impl Walkable for TestNode {
        fn children(&self) -> Children<'_, Self> {
            let mut out: Children<'_, Self> = smallvec![];
            out.extend(self.kids.iter());
            out
        }
    }

    fn sample() -> TestNode {
        TestNode::with(
            "root",
            vec![
                TestNode::with("a", vec![TestNode::leaf("a1"), TestNode::leaf("a2")]),
                TestNode::with("b", vec![TestNode::leaf("b1")]),
            ],
        )
    }

    #[test]
    fn visits_in_pre_order() {
        let tree = sample();
        let mut seen = Vec::new();
        let outcome = walk(&tree, &CancelToken::new(), |_, node| {
            seen.push(node.name);
            WalkFlow::Continue
        });
        assert_eq!(seen, vec!["root", "a", "a1", "a2", "b", "b1"]);
        assert_eq!(outcome, WalkOutcome::Completed { visited: 6 });
    }

    #[test]
    fn stop_ends_walk_immediately() {
        let tree = sample();
        let mut seen = Vec::new();
        let outcome = walk(&tree, &CancelToken::new(), |_, node| {
            seen.push(node.name);
            if node.name == "a1" {
                WalkFlow::Stop
            } else {
                WalkFlow::Continue
            }
        });
        assert_eq!(seen, vec!["root", "a", "a1"]);
        assert_eq!(outcome, WalkOutcome::Stopped { visited: 3 });
    }

    #[test]
    fn pre_cancelled_token_visits_nothing() {
        let tree = sample();
        let token = CancelToken::new();
        token.cancel();
        let mut calls = 0;
        let outcome = walk(&tree, &token, |_, _| {
            calls += 1;
            WalkFlow::Continue
        });
        assert_eq!(calls, 0);
        assert!(outcome.is_cancelled());
        assert_eq!(outcome.visited(), 0);
    }

    #[test]
    fn cancel_mid_walk_stops_before_next_node() {
        let tree = sample();
        let token = CancelToken::new();
        let mut seen = Vec::new();
        let outcome = walk(&tree, &token, |_, node| {
            seen.push(node.name);
            if node.name == "a" {
                token.cancel();
            }
            WalkFlow::Continue
        });
        assert_eq!(seen, vec!["root", "a"]);
        assert_eq!(outcome, WalkOutcome::Cancelled { visited: 2 });
    }

    #[test]
    fn ancestors_track_the_current_path() {
        let tree = sample();
        let mut paths = Vec::new();
        walk(&tree, &CancelToken::new(), |ctx, node| {
            let chain: Vec<&str> = ctx.ancestors().iter().map(|n| n.name).collect();
            paths.push((node.name, chain));
            WalkFlow::Continue
        });
        assert_eq!(paths[3], ("a2", vec!["root", "a"]));
        assert_eq!(paths[4], ("b", vec!["root"]));
        assert_eq!(paths[5], ("b1", vec!["root", "b"]));
    }
}
