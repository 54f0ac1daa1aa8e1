//! Bundle dependency graph with three-color traversal.
//!
//! Nodes are bundle identities, edges point from a bundle to the bundles it
//! depends on. [`DependencyGraph::order_from`] returns the dependency-first
//! order of everything reachable from a root:
//!
//! ```text
//! app ──▶ jquery ──▶ level3        order: level3, jquery, app
//! ```
//!
//! # Invariants
//! - A node is `Visiting` exactly while it is on the traversal stack
//! - Reaching a `Visiting` node is a cycle, reported with its full path
//! - Children are visited in declared order, so output is deterministic

use rustc_hash::FxHashMap;

use crate::bundle::BundleId;
use crate::error::ConfigurationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Identity-keyed adjacency lists.
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    edges: FxHashMap<BundleId, Vec<BundleId>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with its outgoing edges. Replaces existing edges.
    pub fn add(&mut self, id: BundleId, depends: Vec<BundleId>) {
        self.edges.insert(id, depends);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.edges.contains_key(id)
    }

    pub fn depends(&self, id: &str) -> Option<&[BundleId]> {
        self.edges.get(id).map(Vec::as_slice)
    }

    /// Dependency-first order of all nodes reachable from `root`.
    ///
    /// Nodes for which `skip` returns true are neither visited nor returned;
    /// their own dependencies are assumed to be handled already.
    pub fn order_from(
        &self,
        root: &BundleId,
        skip: impl Fn(&BundleId) -> bool,
    ) -> Result<Vec<BundleId>, ConfigurationError> {
        if !self.contains(root.as_str()) {
            return Err(ConfigurationError::UnknownRoot(root.clone()));
        }
        if skip(root) {
            return Ok(Vec::new());
        }

        let mut marks: FxHashMap<&BundleId, Mark> = FxHashMap::default();
        let mut order = Vec::new();
        // (node, index of next child to visit)
        let mut stack: Vec<(&BundleId, usize)> = vec![(root, 0)];
        marks.insert(root, Mark::Visiting);

        while let Some(top) = stack.last_mut() {
            let node = top.0;
            let next = top.1;
            top.1 += 1;

            let Some(child) = self.edges[node].get(next) else {
                marks.insert(node, Mark::Done);
                order.push(node.clone());
                stack.pop();
                continue;
            };

            if skip(child) {
                continue;
            }
            let Some((child, _)) = self.edges.get_key_value(child.as_str()) else {
                return Err(ConfigurationError::UnknownBundle {
                    missing: child.clone(),
                    required_by: node.clone(),
                });
            };

            match marks.get(child) {
                Some(Mark::Done) => {}
                Some(Mark::Visiting) => return Err(cycle_error(&stack, child)),
                None => {
                    marks.insert(child, Mark::Visiting);
                    stack.push((child, 0));
                }
            }
        }

        Ok(order)
    }

    /// Find any cycle in the whole graph (used by `check`).
    pub fn find_cycle(&self) -> Option<ConfigurationError> {
        let mut ids: Vec<_> = self.edges.keys().collect();
        ids.sort();
        ids.into_iter()
            .find_map(|id| match self.order_from(id, |_| false) {
                Err(e @ ConfigurationError::Cycle(_)) => Some(e),
                _ => None,
            })
    }
}

/// Build the cycle path from the stack slice starting at `repeated`.
fn cycle_error(stack: &[(&BundleId, usize)], repeated: &BundleId) -> ConfigurationError {
    let start = stack
        .iter()
        .position(|(id, _)| *id == repeated)
        .unwrap_or(0);
    let mut path: Vec<BundleId> = stack[start..].iter().map(|(id, _)| (*id).clone()).collect();
    path.push(repeated.clone());
    ConfigurationError::Cycle(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, &[&str])]) -> DependencyGraph {
        let mut g = DependencyGraph::new();
        for (id, deps) in edges {
            g.add((*id).into(), deps.iter().map(|d| (*d).into()).collect());
        }
        g
    }

    fn ids(order: &[BundleId]) -> Vec<&str> {
        order.iter().map(BundleId::as_str).collect()
    }

    #[test]
    fn test_chain_order() {
        let g = graph(&[("app", &["jquery"]), ("jquery", &["level3"]), ("level3", &[])]);
        let order = g.order_from(&"app".into(), |_| false).unwrap();
        assert_eq!(ids(&order), vec!["level3", "jquery", "app"]);
    }

    #[test]
    fn test_diamond_visits_shared_once() {
        let g = graph(&[
            ("app", &["left", "right"]),
            ("left", &["base"]),
            ("right", &["base"]),
            ("base", &[]),
        ]);
        let order = g.order_from(&"app".into(), |_| false).unwrap();
        assert_eq!(ids(&order), vec!["base", "left", "right", "app"]);
    }

    #[test]
    fn test_declared_order_is_kept() {
        let g = graph(&[("app", &["b", "a"]), ("a", &[]), ("b", &[])]);
        let order = g.order_from(&"app".into(), |_| false).unwrap();
        assert_eq!(ids(&order), vec!["b", "a", "app"]);
    }

    #[test]
    fn test_skip_registered() {
        let g = graph(&[("app", &["jquery"]), ("jquery", &["level3"]), ("level3", &[])]);
        let order = g
            .order_from(&"app".into(), |id| id.as_str() == "jquery")
            .unwrap();
        assert_eq!(ids(&order), vec!["app"]);

        let none = g.order_from(&"app".into(), |_| true).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_two_node_cycle() {
        let g = graph(&[("a", &["b"]), ("b", &["a"])]);
        let err = g.order_from(&"a".into(), |_| false).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::Cycle(vec!["a".into(), "b".into(), "a".into()])
        );
    }

    #[test]
    fn test_cycle_below_root() {
        let g = graph(&[("app", &["x"]), ("x", &["y"]), ("y", &["z"]), ("z", &["x"])]);
        let err = g.order_from(&"app".into(), |_| false).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::Cycle(vec!["x".into(), "y".into(), "z".into(), "x".into()])
        );
    }

    #[test]
    fn test_self_cycle() {
        let g = graph(&[("a", &["a"])]);
        let err = g.order_from(&"a".into(), |_| false).unwrap_err();
        assert_eq!(err, ConfigurationError::Cycle(vec!["a".into(), "a".into()]));
    }

    #[test]
    fn test_unknown_dependency() {
        let g = graph(&[("app", &["ghost"])]);
        let err = g.order_from(&"app".into(), |_| false).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownBundle {
                missing: "ghost".into(),
                required_by: "app".into(),
            }
        );

        let err = g.order_from(&"nope".into(), |_| false).unwrap_err();
        assert_eq!(err, ConfigurationError::UnknownRoot("nope".into()));
    }

    #[test]
    fn test_find_cycle() {
        let acyclic = graph(&[("a", &["b"]), ("b", &[])]);
        assert!(acyclic.find_cycle().is_none());

        let cyclic = graph(&[("a", &[]), ("b", &["c"]), ("c", &["b"])]);
        assert!(matches!(
            cyclic.find_cycle(),
            Some(ConfigurationError::Cycle(_))
        ));
    }
}
