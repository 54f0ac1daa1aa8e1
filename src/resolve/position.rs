//! Render-position propagation and conflict detection.
//!
//! A dependency must render no later than the bundles that depend on it.
//! Positions flow down the dependency edges:
//!
//! - a dependency without a position inherits the dependent's (first one wins)
//! - a dependency placed later than its dependent is a conflict
//!
//! Already-registered bundles take part with their effective positions, so a
//! conflict is caught even when the dependency was registered first.

use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

use super::{RegistrationState, SpecLookup};
use crate::bundle::{AssetKind, BundleId, BundleSpec, Position};
use crate::error::ConfigurationError;

/// Position carried down an edge, with the bundle that set it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Incoming {
    position: Position,
    origin: BundleId,
}

/// Positions inherited during one resolution, to be written into records.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PositionPlan {
    assigned: Vec<(BundleId, AssetKind, Position)>,
}

impl PositionPlan {
    pub fn assigned(&self) -> &[(BundleId, AssetKind, Position)] {
        &self.assigned
    }

    pub fn get(&self, id: &str, kind: AssetKind) -> Option<Position> {
        self.assigned
            .iter()
            .find(|(i, k, _)| i.as_str() == id && *k == kind)
            .map(|(_, _, p)| *p)
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}

/// Walk the dependency edges below `root` for both asset kinds.
pub(super) fn plan<L, S>(
    root: &BundleId,
    lookup: &L,
    state: &S,
) -> Result<PositionPlan, ConfigurationError>
where
    L: SpecLookup + ?Sized,
    S: RegistrationState + ?Sized,
{
    let mut plan = PositionPlan::default();
    for kind in AssetKind::ALL {
        let mut walker = Walker {
            kind,
            lookup,
            state,
            current: FxHashMap::default(),
            seen: FxHashSet::default(),
            plan: &mut plan,
        };
        walker.visit(root, None)?;
    }
    Ok(plan)
}

struct Walker<'a, L: ?Sized, S: ?Sized> {
    kind: AssetKind,
    lookup: &'a L,
    state: &'a S,
    /// Positions known so far in this walk (explicit, registered or inherited).
    current: FxHashMap<BundleId, Option<Incoming>>,
    /// (bundle, incoming) pairs already processed.
    seen: FxHashSet<(BundleId, Option<Incoming>)>,
    plan: &'a mut PositionPlan,
}

impl<L, S> Walker<'_, L, S>
where
    L: SpecLookup + ?Sized,
    S: RegistrationState + ?Sized,
{
    fn visit(&mut self, id: &BundleId, incoming: Option<Incoming>) -> Result<(), ConfigurationError> {
        if !self.seen.insert((id.clone(), incoming.clone())) {
            return Ok(());
        }
        // Unknown ids were already reported by the graph walk.
        let Some(spec) = self.lookup.lookup(id.as_str()) else {
            return Ok(());
        };

        let mut own = self.position_of(id, &spec);
        if let Some(inc) = &incoming {
            match &own {
                None => {
                    self.plan.assigned.push((id.clone(), self.kind, inc.position));
                    own = Some(inc.clone());
                    self.current.insert(id.clone(), own.clone());
                }
                Some(existing) if existing.position > inc.position => {
                    return Err(ConfigurationError::PositionConflict {
                        dependent: inc.origin.clone(),
                        dependent_position: inc.position,
                        dependency: id.clone(),
                        dependency_position: existing.position,
                        kind: self.kind,
                    });
                }
                Some(_) => {}
            }
        }

        // Registered bundles already pushed their own position downwards;
        // only an incoming position can add information.
        if incoming.is_none() && self.state.is_registered(id.as_str()) {
            return Ok(());
        }

        for dep in &spec.depends {
            self.visit(dep, own.clone())?;
        }
        Ok(())
    }

    fn position_of(&mut self, id: &BundleId, spec: &Arc<BundleSpec>) -> Option<Incoming> {
        if let Some(known) = self.current.get(id) {
            return known.clone();
        }
        let position = self
            .state
            .position(id.as_str(), self.kind)
            .or_else(|| spec.position(self.kind));
        let known = position.map(|position| Incoming {
            position,
            origin: id.clone(),
        });
        self.current.insert(id.clone(), known.clone());
        known
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{AssetOptions, BundleRegistry};
    use indexmap::IndexSet;

    fn js_at(position: Position) -> AssetOptions {
        AssetOptions::default().with_position(position)
    }

    /// app → jquery → level3, with optional js positions.
    fn registry(app: Option<Position>, jquery: Option<Position>) -> BundleRegistry {
        let mut app_spec = BundleSpec::new().with_js(["app.js"]).with_depends(["jquery"]);
        if let Some(p) = app {
            app_spec = app_spec.with_options(AssetKind::Js, js_at(p));
        }
        let mut jq_spec = BundleSpec::new().with_js(["jquery.js"]).with_depends(["level3"]);
        if let Some(p) = jquery {
            jq_spec = jq_spec.with_options(AssetKind::Js, js_at(p));
        }
        BundleRegistry::new()
            .with("app", app_spec)
            .with("jquery", jq_spec)
            .with("level3", BundleSpec::new())
    }

    #[test]
    fn test_inherits_position_transitively() {
        let reg = registry(Some(Position::Head), None);
        let state: IndexSet<BundleId> = IndexSet::new();
        let plan = plan(&"app".into(), &reg, &state).unwrap();
        assert_eq!(plan.get("jquery", AssetKind::Js), Some(Position::Head));
        assert_eq!(plan.get("level3", AssetKind::Js), Some(Position::Head));
        assert_eq!(plan.get("jquery", AssetKind::Css), None);
    }

    #[test]
    fn test_no_positions_no_plan() {
        let reg = registry(None, None);
        let state: IndexSet<BundleId> = IndexSet::new();
        assert!(plan(&"app".into(), &reg, &state).unwrap().is_empty());
    }

    #[test]
    fn test_dependency_later_than_dependent_conflicts() {
        let reg = registry(Some(Position::Begin), Some(Position::End));
        let state: IndexSet<BundleId> = IndexSet::new();
        let err = plan(&"app".into(), &reg, &state).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::PositionConflict {
                dependent: "app".into(),
                dependent_position: Position::Begin,
                dependency: "jquery".into(),
                dependency_position: Position::End,
                kind: AssetKind::Js,
            }
        );
    }

    #[test]
    fn test_equal_or_earlier_dependency_is_fine() {
        let state: IndexSet<BundleId> = IndexSet::new();
        let reg = registry(Some(Position::End), Some(Position::End));
        assert!(plan(&"app".into(), &reg, &state).is_ok());

        let reg = registry(Some(Position::End), Some(Position::Head));
        let plan = plan(&"app".into(), &reg, &state).unwrap();
        // level3 follows jquery, not app
        assert_eq!(plan.get("level3", AssetKind::Js), Some(Position::Head));
    }

    #[test]
    fn test_inherited_position_names_origin() {
        // app(head) → jquery(none) → level3(end)
        let reg = BundleRegistry::new()
            .with(
                "app",
                BundleSpec::new()
                    .with_depends(["jquery"])
                    .with_options(AssetKind::Js, js_at(Position::Head)),
            )
            .with("jquery", BundleSpec::new().with_depends(["level3"]))
            .with(
                "level3",
                BundleSpec::new().with_options(AssetKind::Js, js_at(Position::End)),
            );
        let state: IndexSet<BundleId> = IndexSet::new();
        let err = plan(&"app".into(), &reg, &state).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::PositionConflict { ref dependent, ref dependency, .. }
                if dependent.as_str() == "app" && dependency.as_str() == "level3"
        ));
    }
}
