//! Plinth (toe-kick) heights.
//!
//! A stored non-negative catalog value always wins; otherwise only
//! floor-standing base cabinets get the standard 10cm plinth.

use serde::{Deserialize, Serialize};

use crate::{is_wall_cabinet_id, ComponentType, ResolutionSource};

pub const STANDARD_PLINTH_CM: f64 = 10.0;

/// Resolved plinth height with its provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plinth {
    pub height: f64,
    pub source: ResolutionSource,
    pub reason: String,
}

impl Plinth {
    fn rule(height: f64, reason: &str) -> Self {
        Self {
            height,
            source: ResolutionSource::TypeRule,
            reason: reason.to_string(),
        }
    }
}

pub fn resolve_plinth(
    component_type: ComponentType,
    component_id: &str,
    database_plinth: Option<f64>,
    default_z: Option<f64>,
) -> Plinth {
    if let Some(height) = database_plinth.filter(|h| *h >= 0.0) {
        return Plinth {
            height,
            source: ResolutionSource::Database,
            reason: format!("Database value: {}cm", height),
        };
    }

    if default_z.is_some_and(|z| z > 0.0) {
        return Plinth::rule(0.0, "Wall-mounted component (no plinth)");
    }

    match component_type {
        ComponentType::Cabinet if is_wall_cabinet_id(component_id) => {
            Plinth::rule(0.0, "Wall cabinet (no plinth)")
        }
        ComponentType::Cabinet => {
            Plinth::rule(STANDARD_PLINTH_CM, "Base cabinet standard plinth (10cm)")
        }
        ComponentType::Appliance => {
            Plinth::rule(0.0, "Appliance (integrated or freestanding, no plinth)")
        }
        ComponentType::Cornice
        | ComponentType::Pelmet
        | ComponentType::Window
        | ComponentType::EndPanel
        | ComponentType::WallUnitEndPanel => {
            Plinth::rule(0.0, "Wall-mounted component (no plinth)")
        }
        ComponentType::CounterTop => {
            Plinth::rule(0.0, "Counter-top (sits on cabinets, no own plinth)")
        }
        ComponentType::Sink => Plinth::rule(0.0, "Sink (integrated, no own plinth)"),
        ComponentType::Door
        | ComponentType::Flooring
        | ComponentType::ToeKick
        | ComponentType::Wall
        | ComponentType::Other => Plinth {
            height: 0.0,
            source: ResolutionSource::Default,
            reason: "Default: no plinth for this component type".to_string(),
        },
    }
}

pub fn plinth_height_value(
    component_type: ComponentType,
    component_id: &str,
    database_plinth: Option<f64>,
    default_z: Option<f64>,
) -> f64 {
    resolve_plinth(component_type, component_id, database_plinth, default_z).height
}

pub fn plinth_height_to_meters(height_cm: f64) -> f64 {
    height_cm / 100.0
}

/// Whether a component should be drawn with a plinth.
///
/// Only looks at the type and z; a `wall-cabinet` id at floor level still
/// answers true here while [`resolve_plinth`] gives it 0.
pub fn should_have_plinth(component_type: ComponentType, default_z: Option<f64>) -> bool {
    if default_z.is_some_and(|z| z > 0.0) {
        return false;
    }
    component_type == ComponentType::Cabinet
}
