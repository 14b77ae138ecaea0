//! Factory functions for creating test data.
//!
//! Catalog rows, placed elements and rooms used across the unit tests,
//! the integration tests and the server handlers' tests.

use crate::collision::{ComponentCatalog, ComponentMetadata};
use crate::render2d::{ElevationViewType, PlanViewType, Render2DDefinition};
use crate::{ComponentDefinition, ComponentType, DesignElement, RoomDimensions};

// ── Elements ────────────────────────────────────────────────────

fn element(id: &str, component_id: &str, component_type: ComponentType, x: f64, y: f64) -> DesignElement {
    DesignElement {
        id: id.to_string(),
        component_id: component_id.to_string(),
        name: None,
        component_type,
        x,
        y,
        z: Some(0.0),
        width: 60.0,
        depth: 60.0,
        height: 90.0,
        rotation: 0.0,
        z_index: 0,
        hidden_views: Vec::new(),
        corner_door_side: None,
    }
}

/// 60×60×90 floor unit (`base-cabinet-60`)
pub fn base_cabinet(id: &str, x: f64, y: f64) -> DesignElement {
    element(id, "base-cabinet-60", ComponentType::Cabinet, x, y)
}

/// 60×60×70 wall unit hung at 140cm (`wall-cabinet-60`)
pub fn wall_cabinet(id: &str, x: f64, y: f64) -> DesignElement {
    DesignElement {
        z: Some(140.0),
        height: 70.0,
        ..element(id, "wall-cabinet-60", ComponentType::Cabinet, x, y)
    }
}

/// 30cm cornice strip at 200cm (`cornice-60`)
pub fn cornice(id: &str, x: f64, y: f64) -> DesignElement {
    DesignElement {
        z: Some(200.0),
        height: 30.0,
        ..element(id, "cornice-60", ComponentType::Cornice, x, y)
    }
}

// ── Catalog rows ────────────────────────────────────────────────

fn metadata(id: &str, component_type: ComponentType, layer: &str, band: (f64, f64), overlaps: &[&str]) -> ComponentMetadata {
    ComponentMetadata {
        component_id: id.to_string(),
        component_name: id.to_string(),
        component_type,
        category: None,
        layer_type: Some(layer.to_string()),
        min_height_cm: Some(band.0),
        max_height_cm: Some(band.1),
        can_overlap_layers: Some(overlaps.iter().map(|l| l.to_string()).collect()),
    }
}

pub fn base_metadata(id: &str) -> ComponentMetadata {
    metadata(id, ComponentType::Cabinet, "base", (0.0, 90.0), &[])
}

pub fn wall_metadata(id: &str) -> ComponentMetadata {
    metadata(id, ComponentType::Cabinet, "wall", (140.0, 210.0), &[])
}

pub fn tall_metadata(id: &str) -> ComponentMetadata {
    metadata(id, ComponentType::Cabinet, "tall", (0.0, 210.0), &[])
}

pub fn cornice_metadata(id: &str) -> ComponentMetadata {
    metadata(id, ComponentType::Cornice, "cornice", (200.0, 230.0), &["wall"])
}

/// One entry per layer for the fixture elements above
pub fn metadata_catalog_entries() -> Vec<ComponentMetadata> {
    vec![
        base_metadata("base-cabinet-60"),
        wall_metadata("wall-cabinet-60"),
        tall_metadata("tall-larder-60"),
        cornice_metadata("cornice-60"),
    ]
}

pub fn metadata_catalog() -> ComponentCatalog {
    ComponentCatalog::new(metadata_catalog_entries()).unwrap_or_default()
}

fn definition(id: &str, component_type: ComponentType, height: f64) -> ComponentDefinition {
    ComponentDefinition {
        id: id.to_string(),
        name: id.to_string(),
        component_type,
        category: None,
        width: 60.0,
        depth: 60.0,
        height,
        default_z_position: None,
        plinth_height: None,
        room_types: vec!["kitchen".to_string()],
    }
}

pub fn base_cabinet_definition() -> ComponentDefinition {
    definition("base-cabinet-60", ComponentType::Cabinet, 90.0)
}

pub fn wall_cabinet_definition() -> ComponentDefinition {
    definition("wall-cabinet-60", ComponentType::Cabinet, 70.0)
}

pub fn cornice_definition() -> ComponentDefinition {
    definition("cornice-60", ComponentType::Cornice, 30.0)
}

/// Plain rectangle in plan, default cabinet front on every wall
pub fn rectangle_render_definition(component_id: &str) -> Render2DDefinition {
    Render2DDefinition {
        component_id: component_id.to_string(),
        plan_view_type: PlanViewType::Rectangle,
        plan_view_data: serde_json::Value::Null,
        plan_view_svg: None,
        elevation_type: ElevationViewType::StandardCabinet,
        elevation_data: serde_json::Value::Null,
        elevation_svg_front: None,
        elevation_svg_back: None,
        side_elevation_type: ElevationViewType::StandardCabinet,
        side_elevation_data: serde_json::Value::Null,
        elevation_svg_left: None,
        elevation_svg_right: None,
        fill_color: "#8b4513".to_string(),
        stroke_color: "#000000".to_string(),
        stroke_width: None,
    }
}

// ── Rooms ───────────────────────────────────────────────────────

/// 600×400 kitchen with the default ceiling
pub fn kitchen_room() -> RoomDimensions {
    RoomDimensions::new(600.0, 400.0)
}
