//! Placement and geometry rules for the room planner.
//!
//! Everything in this crate is a pure function over plain records fetched
//! from the catalog database: default heights, plinths, 2D drawing
//! descriptions, coordinate transforms, collision decisions and formula-driven
//! 3D parts. Plan and elevation geometry is in centimetres, model space in
//! metres.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod collision;
pub mod context;
pub mod coordinates;
pub mod corner;
pub mod error;
pub mod fixtures;
pub mod formula;
pub mod geometry;
pub mod plinth;
pub mod position;
pub mod render2d;
pub mod room;
pub mod settings;
pub mod z_position;

pub use context::PlannerContext;
pub use error::{FormulaError, PlannerError};
pub use settings::PlannerSettings;

/// Identifier of a placed element inside a design
pub type ElementId = String;

/// Closed set of component categories known to the placement rules.
///
/// Tags that the catalog may grow later deserialize to [`ComponentType::Other`]
/// and take the floor-mounted / no-plinth defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentType {
    Cabinet,
    Appliance,
    CounterTop,
    EndPanel,
    Window,
    Door,
    Flooring,
    ToeKick,
    Cornice,
    Pelmet,
    WallUnitEndPanel,
    Sink,
    Wall,
    #[serde(other)]
    Other,
}

impl ComponentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Cabinet => "cabinet",
            ComponentType::Appliance => "appliance",
            ComponentType::CounterTop => "counter-top",
            ComponentType::EndPanel => "end-panel",
            ComponentType::Window => "window",
            ComponentType::Door => "door",
            ComponentType::Flooring => "flooring",
            ComponentType::ToeKick => "toe-kick",
            ComponentType::Cornice => "cornice",
            ComponentType::Pelmet => "pelmet",
            ComponentType::WallUnitEndPanel => "wall-unit-end-panel",
            ComponentType::Sink => "sink",
            ComponentType::Wall => "wall",
            ComponentType::Other => "other",
        }
    }

    /// Parse a catalog tag; unknown tags map to `Other`.
    pub fn parse(tag: &str) -> Self {
        match tag {
            "cabinet" => ComponentType::Cabinet,
            "appliance" => ComponentType::Appliance,
            "counter-top" => ComponentType::CounterTop,
            "end-panel" => ComponentType::EndPanel,
            "window" => ComponentType::Window,
            "door" => ComponentType::Door,
            "flooring" => ComponentType::Flooring,
            "toe-kick" => ComponentType::ToeKick,
            "cornice" => ComponentType::Cornice,
            "pelmet" => ComponentType::Pelmet,
            "wall-unit-end-panel" => ComponentType::WallUnitEndPanel,
            "sink" => ComponentType::Sink,
            "wall" => ComponentType::Wall,
            _ => ComponentType::Other,
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True when a catalog id names a wall-hung cabinet (`wall-cabinet-60`,
/// `corner-wall-cabinet`, ...).
pub fn is_wall_cabinet_id(component_id: &str) -> bool {
    component_id.contains("wall-cabinet")
}

/// Where a resolved value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionSource {
    Database,
    TypeRule,
    Default,
}

/// Point on the plan (cm from the left wall / front wall)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct PlanPoint {
    pub x: f64,
    pub y: f64,
}

impl PlanPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &PlanPoint) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Inner room dimensions in cm.
///
/// Older designs store the front-to-back depth under `height`; it is accepted
/// as an alias.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomDimensions {
    pub width: f64,
    #[serde(alias = "height")]
    pub depth: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ceiling_height: Option<f64>,
}

impl RoomDimensions {
    pub const DEFAULT_CEILING_HEIGHT: f64 = 240.0;

    pub fn new(width: f64, depth: f64) -> Self {
        Self {
            width,
            depth,
            ceiling_height: None,
        }
    }

    pub fn with_ceiling(mut self, ceiling_height: f64) -> Self {
        self.ceiling_height = Some(ceiling_height);
        self
    }

    pub fn ceiling(&self) -> f64 {
        self.ceiling_height.unwrap_or(Self::DEFAULT_CEILING_HEIGHT)
    }
}

/// Manual door side override stored on corner cabinets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DoorSetting {
    Left,
    Right,
    #[default]
    Auto,
}

/// Catalog entry for a component (`components` table). Read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDefinition {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    #[serde(default)]
    pub category: Option<String>,
    pub width: f64,
    pub depth: f64,
    pub height: f64,
    #[serde(default)]
    pub default_z_position: Option<f64>,
    #[serde(default)]
    pub plinth_height: Option<f64>,
    #[serde(default)]
    pub room_types: Vec<String>,
}

impl ComponentDefinition {
    /// Resolve the height off the floor for a new instance of this component.
    pub fn resolve_z(&self, policy: z_position::ZeroZPolicy) -> z_position::ZPosition {
        z_position::resolve_z_position_with_policy(
            self.component_type,
            &self.id,
            z_position::StoredZ::from_column(self.default_z_position),
            policy,
        )
    }

    /// Resolve the toe-kick height, using the resolved z to detect wall-hung units.
    pub fn resolve_plinth(&self, policy: z_position::ZeroZPolicy) -> plinth::Plinth {
        let z = self.resolve_z(policy).z;
        plinth::resolve_plinth(self.component_type, &self.id, self.plinth_height, Some(z))
    }

    /// Create a design element for a drop at `(x, y)` with the resolved default z.
    pub fn place(
        &self,
        element_id: impl Into<ElementId>,
        x: f64,
        y: f64,
        policy: z_position::ZeroZPolicy,
    ) -> DesignElement {
        DesignElement {
            id: element_id.into(),
            component_id: self.id.clone(),
            name: Some(self.name.clone()).filter(|n| !n.is_empty()),
            component_type: self.component_type,
            x,
            y,
            z: Some(self.resolve_z(policy).z),
            width: self.width,
            depth: self.depth,
            height: self.height,
            rotation: 0.0,
            z_index: 0,
            hidden_views: Vec::new(),
            corner_door_side: None,
        }
    }
}

/// Instance of a component placed in a design
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignElement {
    pub id: ElementId,
    pub component_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    pub x: f64,
    pub y: f64,
    /// Height of the element's base above the floor; `None` when never set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    pub width: f64,
    pub depth: f64,
    pub height: f64,
    /// Rotation around the vertical axis, degrees
    #[serde(default)]
    pub rotation: f64,
    #[serde(default, alias = "zIndex")]
    pub z_index: i32,
    /// Elevation view ids this element is hidden from
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hidden_views: Vec<String>,
    #[serde(default, alias = "cornerDoorSide", skip_serializing_if = "Option::is_none")]
    pub corner_door_side: Option<DoorSetting>,
}

impl DesignElement {
    /// z with a missing value read as floor level
    pub fn z_or_floor(&self) -> f64 {
        self.z.unwrap_or(0.0)
    }

    /// Plan footprint `(width, depth)`; quarter turns swap the two.
    pub fn footprint(&self) -> (f64, f64) {
        let quarter = (self.rotation / 90.0).round();
        let is_quarter_turn = (self.rotation - quarter * 90.0).abs() < 1e-6;
        if is_quarter_turn && (quarter as i64).rem_euclid(2) == 1 {
            (self.depth, self.width)
        } else {
            (self.width, self.depth)
        }
    }

    /// Axis-aligned plan rectangle the element covers once turned about its
    /// centre, the same pivot the plan view draws with.
    pub fn plan_rect(&self) -> corner::PlanRect {
        let (width, depth) = self.footprint();
        let quarter = (self.rotation / 90.0).round();
        let (width, depth) = if (self.rotation - quarter * 90.0).abs() < 1e-6 {
            (width, depth)
        } else {
            let (sin, cos) = self.rotation.to_radians().sin_cos();
            (
                self.width * cos.abs() + self.depth * sin.abs(),
                self.width * sin.abs() + self.depth * cos.abs(),
            )
        };
        let cx = self.x + self.width / 2.0;
        let cy = self.y + self.depth / 2.0;
        corner::PlanRect {
            x: cx - width / 2.0,
            y: cy - depth / 2.0,
            width,
            depth,
        }
    }

    /// Vertical extent `[z, z + height)` in cm
    pub fn vertical_range(&self) -> (f64, f64) {
        let z = self.z_or_floor();
        (z, z + self.height)
    }

    pub fn position(&self) -> PlanPoint {
        PlanPoint::new(self.x, self.y)
    }

    /// Copy of this element moved to `point`.
    pub fn moved_to(&self, point: PlanPoint) -> DesignElement {
        DesignElement {
            x: point.x,
            y: point.y,
            ..self.clone()
        }
    }

    pub fn is_visible_in(&self, view_id: &str) -> bool {
        !self.hidden_views.iter().any(|v| v == view_id)
    }

    /// Toggle visibility in one elevation view
    pub fn toggle_visibility(&mut self, view_id: &str) {
        if let Some(pos) = self.hidden_views.iter().position(|v| v == view_id) {
            self.hidden_views.remove(pos);
        } else {
            self.hidden_views.push(view_id.to_string());
        }
    }
}
