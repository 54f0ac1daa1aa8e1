//! Dependency resolution.
//!
//! Given a requested bundle, computes which bundles must be registered and in
//! which order, and validates render positions before anything touches disk:
//!
//! ```text
//! resolve("app")
//!   ├── graph walk     → [level3, jquery, app]   (cycles / unknown ids fail)
//!   └── position walk  → inherited positions      (conflicts fail)
//! ```
//!
//! The resolver never mutates the registry or the session; the caller
//! finalizes each returned identity in order.

mod graph;
mod position;

pub use graph::DependencyGraph;
pub use position::PositionPlan;

use indexmap::IndexSet;
use std::sync::Arc;

use crate::bundle::{AssetKind, BundleId, BundleRegistry, BundleSpec, Position};
use crate::error::ConfigurationError;

// ============================================================================
// Seams
// ============================================================================

/// Source of effective bundle specs (registry, or registry plus overrides).
pub trait SpecLookup {
    fn lookup(&self, id: &str) -> Option<Arc<BundleSpec>>;
}

impl SpecLookup for BundleRegistry {
    fn lookup(&self, id: &str) -> Option<Arc<BundleSpec>> {
        self.get(id).cloned()
    }
}

/// What the current session has already registered.
pub trait RegistrationState {
    fn is_registered(&self, id: &str) -> bool;

    /// Effective position of a registered bundle, if it has one.
    fn position(&self, id: &str, kind: AssetKind) -> Option<Position>;
}

/// A plain ordered set of registered ids; positions come from the specs.
impl RegistrationState for IndexSet<BundleId> {
    fn is_registered(&self, id: &str) -> bool {
        self.contains(id)
    }

    fn position(&self, _id: &str, _kind: AssetKind) -> Option<Position> {
        None
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Result of resolving one root bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Bundles to register, dependencies first. Excludes registered ones.
    pub order: Vec<BundleId>,
    /// Positions inherited by new or registered bundles.
    pub positions: PositionPlan,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.order.is_empty() && self.positions.is_empty()
    }
}

/// Resolve `root` against `lookup`, skipping what `state` already holds.
pub fn resolve<L, S>(
    root: &BundleId,
    lookup: &L,
    state: &S,
) -> Result<Resolution, ConfigurationError>
where
    L: SpecLookup + ?Sized,
    S: RegistrationState + ?Sized,
{
    let graph = reachable_graph(root, lookup, state);
    let order = graph.order_from(root, |id| state.is_registered(id.as_str()))?;
    let positions = position::plan(root, lookup, state)?;

    crate::debug!("resolve"; "{}: {}", root, order.iter().map(BundleId::as_str).collect::<Vec<_>>().join(", "));
    Ok(Resolution { order, positions })
}

/// Collect the unregistered part of the graph reachable from `root`.
///
/// Unknown ids are left out so the graph walk can report who required them.
fn reachable_graph<L, S>(root: &BundleId, lookup: &L, state: &S) -> DependencyGraph
where
    L: SpecLookup + ?Sized,
    S: RegistrationState + ?Sized,
{
    let mut graph = DependencyGraph::new();
    let mut pending = vec![root.clone()];

    while let Some(id) = pending.pop() {
        if graph.contains(id.as_str()) {
            continue;
        }
        let Some(spec) = lookup.lookup(id.as_str()) else {
            continue;
        };
        for dep in &spec.depends {
            if !state.is_registered(dep.as_str()) {
                pending.push(dep.clone());
            }
        }
        graph.add(id, spec.depends.clone());
    }
    graph
}

/// Build the full graph of a registry (for `check`).
pub fn registry_graph(registry: &BundleRegistry) -> DependencyGraph {
    let mut graph = DependencyGraph::new();
    for id in registry.ids() {
        if let Some(spec) = registry.get(id.as_str()) {
            graph.add(id.clone(), spec.depends.clone());
        }
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> BundleRegistry {
        BundleRegistry::new()
            .with(
                "app",
                BundleSpec::new().with_js(["app.js"]).with_depends(["jquery"]),
            )
            .with(
                "jquery",
                BundleSpec::new().with_js(["jquery.js"]).with_depends(["level3"]),
            )
            .with("level3", BundleSpec::new())
            .with("circle-a", BundleSpec::new().with_depends(["circle-b"]))
            .with("circle-b", BundleSpec::new().with_depends(["circle-a"]))
    }

    fn none() -> IndexSet<BundleId> {
        IndexSet::new()
    }

    fn order(res: &Resolution) -> Vec<&str> {
        res.order.iter().map(BundleId::as_str).collect()
    }

    #[test]
    fn test_resolve_dependency_first() {
        let res = resolve(&"app".into(), &registry(), &none()).unwrap();
        assert_eq!(order(&res), vec!["level3", "jquery", "app"]);
        assert!(res.positions.is_empty());
    }

    #[test]
    fn test_resolve_skips_registered() {
        let mut state = none();
        state.insert(BundleId::from("level3"));
        state.insert(BundleId::from("jquery"));
        let res = resolve(&"app".into(), &registry(), &state).unwrap();
        assert_eq!(order(&res), vec!["app"]);

        state.insert(BundleId::from("app"));
        let res = resolve(&"app".into(), &registry(), &state).unwrap();
        assert!(res.is_empty());
    }

    #[test]
    fn test_resolve_cycle() {
        let err = resolve(&"circle-a".into(), &registry(), &none()).unwrap_err();
        assert!(matches!(err, ConfigurationError::Cycle(ref path) if path.len() == 3));
    }

    #[test]
    fn test_resolve_unknown() {
        let reg = registry().with("broken", BundleSpec::new().with_depends(["ghost"]));
        let err = resolve(&"broken".into(), &reg, &none()).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownBundle {
                missing: "ghost".into(),
                required_by: "broken".into(),
            }
        );
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let reg = registry();
        let first = resolve(&"app".into(), &reg, &none()).unwrap();
        for _ in 0..10 {
            assert_eq!(resolve(&"app".into(), &reg, &none()).unwrap(), first);
        }
    }

    #[test]
    fn test_registry_graph_finds_cycle() {
        let graph = registry_graph(&registry());
        assert!(graph.find_cycle().is_some());
    }
}
