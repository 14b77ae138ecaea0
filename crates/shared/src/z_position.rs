//! Default height off the floor for newly placed components.
//!
//! Priority: a stored catalog value, then the per-type table, then the
//! wall-cabinet id rule, then floor level.

use serde::{Deserialize, Serialize};

use crate::{is_wall_cabinet_id, ComponentType, ResolutionSource};

/// Catalog `default_z_position` column, split into its three meaningful states
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "kebab-case")]
pub enum StoredZ {
    /// Column is NULL
    Unset,
    /// Column holds exactly 0
    Zero,
    /// Column holds a non-zero height in cm
    Explicit(f64),
}

impl StoredZ {
    pub fn from_column(value: Option<f64>) -> Self {
        match value {
            None => StoredZ::Unset,
            Some(v) if v == 0.0 => StoredZ::Zero,
            Some(v) => StoredZ::Explicit(v),
        }
    }
}

/// How a stored zero is read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ZeroZPolicy {
    /// Zero means "not specified" and falls through to the type rules
    #[default]
    FallThrough,
    /// Zero is an explicit floor position
    FloorMounted,
}

/// Resolved z with its provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZPosition {
    pub z: f64,
    pub source: ResolutionSource,
    pub reason: String,
}

impl ZPosition {
    fn rule(z: f64, reason: &str) -> Self {
        Self {
            z,
            source: ResolutionSource::TypeRule,
            reason: reason.to_string(),
        }
    }
}

/// Fixed mounting heights per component type (cm)
fn type_rule(component_type: ComponentType) -> Option<(f64, &'static str)> {
    match component_type {
        ComponentType::Cornice => Some((200.0, "Cornice: top of wall units at 200cm")),
        ComponentType::Pelmet => Some((140.0, "Pelmet: bottom of wall units at 140cm")),
        ComponentType::CounterTop => Some((90.0, "Counter-top: standard height 90cm")),
        ComponentType::WallUnitEndPanel => {
            Some((200.0, "Wall unit end panel: top of wall units at 200cm"))
        }
        ComponentType::Window => Some((90.0, "Window: typical sill height 90cm")),
        ComponentType::Cabinet
        | ComponentType::Appliance
        | ComponentType::EndPanel
        | ComponentType::Door
        | ComponentType::Flooring
        | ComponentType::ToeKick
        | ComponentType::Sink
        | ComponentType::Wall
        | ComponentType::Other => None,
    }
}

/// Resolve the default z with the legacy reading of a stored zero.
pub fn resolve_z_position(
    component_type: ComponentType,
    component_id: &str,
    database_z: Option<f64>,
) -> ZPosition {
    resolve_z_position_with_policy(
        component_type,
        component_id,
        StoredZ::from_column(database_z),
        ZeroZPolicy::FallThrough,
    )
}

pub fn resolve_z_position_with_policy(
    component_type: ComponentType,
    component_id: &str,
    stored: StoredZ,
    policy: ZeroZPolicy,
) -> ZPosition {
    match (stored, policy) {
        (StoredZ::Explicit(z), _) => {
            return ZPosition {
                z,
                source: ResolutionSource::Database,
                reason: format!("Database value: {}cm", z),
            }
        }
        (StoredZ::Zero, ZeroZPolicy::FloorMounted) => {
            return ZPosition {
                z: 0.0,
                source: ResolutionSource::Database,
                reason: "Database value: explicitly floor-mounted".to_string(),
            }
        }
        (StoredZ::Zero, ZeroZPolicy::FallThrough) | (StoredZ::Unset, _) => {}
    }

    if let Some((z, reason)) = type_rule(component_type) {
        return ZPosition::rule(z, reason);
    }

    if component_type == ComponentType::Cabinet && is_wall_cabinet_id(component_id) {
        return ZPosition::rule(140.0, "Wall cabinet: mounted at 140cm above floor");
    }

    ZPosition {
        z: 0.0,
        source: ResolutionSource::Default,
        reason: "Floor-mounted component (default)".to_string(),
    }
}

/// Shorthand returning only the height
pub fn default_z(component_type: ComponentType, component_id: &str, database_z: Option<f64>) -> f64 {
    resolve_z_position(component_type, component_id, database_z).z
}
