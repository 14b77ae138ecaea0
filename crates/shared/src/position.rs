//! Element placement on elevation canvases and sanity checks on stored z.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::coordinates::{CoordinateTransformEngine, ElevationWall, PlanPosition};
use crate::z_position::resolve_z_position;
use crate::{is_wall_cabinet_id, ComponentType, DesignElement, ElementId, PlanPoint, RoomDimensions};

const FALLBACK_FOOTPRINT: f64 = 60.0;
const FALLBACK_HEIGHT: f64 = 90.0;
const TOP_MARGIN: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomPosition {
    pub inner_x: f64,
    pub inner_y: f64,
    pub outer_x: f64,
    pub outer_y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevationPosition {
    pub x_pos: f64,
    pub element_width: f64,
}

fn or_fallback(value: f64, fallback: f64) -> f64 {
    if value == 0.0 {
        fallback
    } else {
        value
    }
}

/// Horizontal position and width of an element on an elevation canvas.
///
/// `view` may be `plan`, a wall name, or a duplicated view id such as
/// `front-dup1`. Elevation extents default to the room size times `zoom`.
pub fn calculate_elevation_position(
    element: &DesignElement,
    room: &RoomDimensions,
    room_position: &RoomPosition,
    view: &str,
    zoom: f64,
    elevation_width: Option<f64>,
    elevation_depth: Option<f64>,
) -> ElevationPosition {
    let width = or_fallback(element.width, FALLBACK_FOOTPRINT);
    let elevation_width = elevation_width
        .filter(|w| *w != 0.0)
        .unwrap_or(room.width * zoom);
    let elevation_depth = elevation_depth
        .filter(|d| *d != 0.0)
        .unwrap_or(room.depth * zoom);

    match ElevationWall::from_view(view).filter(ElevationWall::is_side) {
        None => ElevationPosition {
            x_pos: room_position.inner_x + element.x / room.width * elevation_width,
            element_width: width / room.width * elevation_width,
        },
        Some(wall) => {
            let engine = CoordinateTransformEngine::new(RoomDimensions::new(room.width, room.depth));
            let plan = PlanPosition {
                x: element.x,
                y: element.y,
                z: element.z_or_floor(),
            };
            let elevation = engine.plan_to_elevation(
                plan,
                wall,
                elevation_depth,
                600.0,
                or_fallback(element.height, FALLBACK_HEIGHT),
                zoom,
            );

            let span = if element.component_type == ComponentType::CounterTop {
                element.depth
            } else {
                width
            };

            ElevationPosition {
                x_pos: room_position.inner_x + elevation.canvas_x,
                element_width: span / room.depth * elevation_depth,
            }
        }
    }
}

/// Inner/outer room origin on the canvas for a view.
///
/// Side views lay the room depth across the canvas.
pub fn calculate_room_position(
    view: &str,
    room: &RoomDimensions,
    inner_bounds_width: f64,
    zoom: f64,
    pan: PlanPoint,
    wall_thickness: f64,
    canvas_width: f64,
) -> RoomPosition {
    let inner_room_width = match view {
        "left" | "right" => room.depth,
        _ => inner_bounds_width,
    };

    let inner_x = canvas_width / 2.0 - inner_room_width * zoom / 2.0 + pan.x;
    let inner_y = TOP_MARGIN + pan.y;
    let wall_px = wall_thickness * zoom;

    RoomPosition {
        inner_x,
        inner_y,
        outer_x: inner_x - wall_px,
        outer_y: inner_y - wall_px,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub suspicious_cases: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub with_warnings: usize,
    pub with_suspicious_cases: usize,
}

pub fn validate_z_position(element: &DesignElement, room: &RoomDimensions) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut suspicious = Vec::new();

    let ceiling = room.ceiling();
    let z = element.z_or_floor();
    let height = element.height;

    if z < 0.0 {
        errors.push(format!("Z position is negative: {}cm (must be >= 0)", z));
    }
    if z > ceiling {
        errors.push(format!("Z position ({}cm) exceeds ceiling height ({}cm)", z, ceiling));
    }
    if z + height > ceiling {
        errors.push(format!(
            "Component extends beyond ceiling: Z({}cm) + height({}cm) = {}cm > {}cm",
            z,
            height,
            z + height,
            ceiling
        ));
    }

    if z == height && z > 0.0 {
        suspicious.push(format!(
            "Z position equals height ({}cm) - possible copy-paste error? Z is position, height is dimension.",
            z
        ));
    }

    if element.z.is_none() {
        let default_z = resolve_z_position(element.component_type, &element.component_id, None).z;
        warnings.push(format!(
            "Z position not specified, using type default ({}cm). Set Z explicitly.",
            default_z
        ));
    }

    let wall_cabinet = is_wall_cabinet_id(&element.component_id);
    if wall_cabinet && z == 0.0 {
        suspicious.push(
            "Wall cabinet at Z=0 (floor level) - should typically be at Z=140cm".to_string(),
        );
    }
    if element.component_type == ComponentType::Cabinet && !wall_cabinet && z > 100.0 {
        suspicious.push(format!(
            "Base cabinet at Z={}cm (wall height) - should typically be at Z=0cm (floor level)",
            z
        ));
    }

    ValidationResult {
        valid: errors.is_empty(),
        errors,
        warnings,
        suspicious_cases: suspicious,
    }
}

/// Fill a missing z from the type defaults. Existing values are kept, even suspicious ones.
pub fn ensure_valid_z(element: &mut DesignElement) {
    if element.z.is_none() {
        element.z = Some(resolve_z_position(element.component_type, &element.component_id, None).z);
    }
}

pub fn validate_all(elements: &[DesignElement], room: &RoomDimensions) -> BTreeMap<ElementId, ValidationResult> {
    elements
        .iter()
        .map(|e| (e.id.clone(), validate_z_position(e, room)))
        .collect()
}

pub fn validation_summary(results: &BTreeMap<ElementId, ValidationResult>) -> ValidationSummary {
    let mut summary = ValidationSummary {
        total: results.len(),
        ..Default::default()
    };
    for result in results.values() {
        if result.valid {
            summary.valid += 1;
        } else {
            summary.invalid += 1;
        }
        if !result.warnings.is_empty() {
            summary.with_warnings += 1;
        }
        if !result.suspicious_cases.is_empty() {
            summary.with_suspicious_cases += 1;
        }
    }
    summary
}
