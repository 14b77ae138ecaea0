//! Browser bindings for the placement rules.
//!
//! Every export takes and returns JSON strings. The `*_json` functions hold
//! the logic so they can be tested natively; the exports only map errors to
//! `JsError`.

use serde::Serialize;
use thiserror::Error;
use wasm_bindgen::prelude::*;

use shared::collision::ComponentCatalog;
use shared::coordinates::ElevationWall;
use shared::geometry::{BuildContext, GeometryBuilder, GeometryPart, MaterialDefinition};
use shared::render2d::{Frame, Render2DDefinition};
use shared::room::RoomGeometry;
use shared::{ComponentDefinition, DesignElement, PlanPoint, PlannerContext, PlannerError, PlannerSettings, RoomDimensions};

#[derive(Error, Debug)]
pub enum BindingError {
    #[error(transparent)]
    Planner(#[from] PlannerError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown elevation view '{0}'")]
    UnknownView(String),
    #[error("Zoom must be a positive number, got {0}")]
    BadZoom(f64),
}

type Result<T> = std::result::Result<T, BindingError>;

fn to_js(err: BindingError) -> JsError {
    JsError::new(&err.to_string())
}

/// Empty input means "use the defaults"
fn parse_settings(settings_json: &str) -> Result<PlannerSettings> {
    if settings_json.trim().is_empty() {
        Ok(PlannerSettings::default())
    } else {
        Ok(PlannerSettings::from_json_str(settings_json)?)
    }
}

/// Empty input means "not given"
fn parse_optional<T: serde::de::DeserializeOwned>(json: &str) -> Result<Option<T>> {
    if json.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(serde_json::from_str(json)?))
    }
}

/// Render context carrying the caller's settings; drawing needs no catalog
fn render_context(settings_json: &str) -> Result<PlannerContext> {
    Ok(PlannerContext::init(parse_settings(settings_json)?, ComponentCatalog::default()))
}

fn check_zoom(zoom: f64) -> Result<()> {
    if zoom.is_finite() && zoom > 0.0 {
        Ok(())
    } else {
        Err(BindingError::BadZoom(zoom))
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

pub fn resolve_z_position_json(component_json: &str, settings_json: &str) -> Result<String> {
    let component: ComponentDefinition = serde_json::from_str(component_json)?;
    let settings = parse_settings(settings_json)?;
    to_json(&component.resolve_z(settings.zero_z_policy))
}

pub fn resolve_plinth_json(component_json: &str, settings_json: &str) -> Result<String> {
    let component: ComponentDefinition = serde_json::from_str(component_json)?;
    let settings = parse_settings(settings_json)?;
    to_json(&component.resolve_plinth(settings.zero_z_policy))
}

pub fn render_plan_view_json(
    element_json: &str,
    definition_json: &str,
    zoom: f64,
    settings_json: &str,
) -> Result<String> {
    check_zoom(zoom)?;
    let element: DesignElement = serde_json::from_str(element_json)?;
    let definition: Render2DDefinition = serde_json::from_str(definition_json)?;
    to_json(&render_context(settings_json)?.render_plan(&element, &definition, zoom))
}

pub fn render_elevation_view_json(
    element_json: &str,
    definition_json: &str,
    view: &str,
    frame_json: &str,
    zoom: f64,
    room_json: &str,
    settings_json: &str,
) -> Result<String> {
    check_zoom(zoom)?;
    let wall = ElevationWall::from_view(view).ok_or_else(|| BindingError::UnknownView(view.to_string()))?;
    let element: DesignElement = serde_json::from_str(element_json)?;
    let definition: Render2DDefinition = serde_json::from_str(definition_json)?;
    let frame: Frame = serde_json::from_str(frame_json)?;
    let room: Option<RoomDimensions> = parse_optional(room_json)?;
    to_json(&render_context(settings_json)?.render_elevation(
        &element,
        &definition,
        wall,
        frame,
        zoom,
        room.as_ref(),
    ))
}

/// `original_position_json` is the `{ x, y }` the element was dragged from,
/// or empty for a fresh drop
pub fn validate_placement_json(
    element_json: &str,
    existing_json: &str,
    catalog_json: &str,
    original_position_json: &str,
    settings_json: &str,
) -> Result<String> {
    let element: DesignElement = serde_json::from_str(element_json)?;
    let existing: Vec<DesignElement> = serde_json::from_str(existing_json)?;
    let catalog = ComponentCatalog::from_json_str(catalog_json)?;
    let original: Option<PlanPoint> = parse_optional(original_position_json)?;
    let context = PlannerContext::init(parse_settings(settings_json)?, catalog);
    to_json(&context.validate_placement(&element, &existing, original))
}

pub fn validate_room_geometry_json(geometry_json: &str) -> Result<String> {
    let geometry: RoomGeometry = serde_json::from_str(geometry_json)?;
    to_json(&shared::room::validate_room_geometry(&geometry))
}

pub fn build_geometry_json(parts_json: &str, materials_json: &str, context_json: &str) -> Result<String> {
    let parts: Vec<GeometryPart> = serde_json::from_str(parts_json)?;
    let materials: Vec<MaterialDefinition> = parse_optional(materials_json)?.unwrap_or_default();
    let context: BuildContext = serde_json::from_str(context_json)?;
    to_json(&GeometryBuilder::new(parts, materials).build(&context))
}

/// Default z for a catalog component, as `{ z, source, reason }`
#[wasm_bindgen]
pub fn resolve_z_position(component_json: &str, settings_json: &str) -> std::result::Result<String, JsError> {
    resolve_z_position_json(component_json, settings_json).map_err(to_js)
}

/// Plinth height for a catalog component, as `{ height, source, reason }`
#[wasm_bindgen]
pub fn resolve_plinth(component_json: &str, settings_json: &str) -> std::result::Result<String, JsError> {
    resolve_plinth_json(component_json, settings_json).map_err(to_js)
}

#[wasm_bindgen]
pub fn render_plan_view(
    element_json: &str,
    definition_json: &str,
    zoom: f64,
    settings_json: &str,
) -> std::result::Result<String, JsError> {
    render_plan_view_json(element_json, definition_json, zoom, settings_json).map_err(to_js)
}

/// `room_json` and `settings_json` may be empty
#[wasm_bindgen]
pub fn render_elevation_view(
    element_json: &str,
    definition_json: &str,
    view: &str,
    frame_json: &str,
    zoom: f64,
    room_json: &str,
    settings_json: &str,
) -> std::result::Result<String, JsError> {
    render_elevation_view_json(element_json, definition_json, view, frame_json, zoom, room_json, settings_json)
        .map_err(to_js)
}

#[wasm_bindgen]
pub fn validate_placement(
    element_json: &str,
    existing_json: &str,
    catalog_json: &str,
    original_position_json: &str,
    settings_json: &str,
) -> std::result::Result<String, JsError> {
    validate_placement_json(element_json, existing_json, catalog_json, original_position_json, settings_json)
        .map_err(to_js)
}

#[wasm_bindgen]
pub fn validate_room_geometry(geometry_json: &str) -> std::result::Result<String, JsError> {
    validate_room_geometry_json(geometry_json).map_err(to_js)
}

#[wasm_bindgen]
pub fn build_geometry(
    parts_json: &str,
    materials_json: &str,
    context_json: &str,
) -> std::result::Result<String, JsError> {
    build_geometry_json(parts_json, materials_json, context_json).map_err(to_js)
}
