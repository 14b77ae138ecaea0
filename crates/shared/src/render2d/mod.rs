//! Database-driven 2D drawing for plan and elevation canvases.
//!
//! Each component carries a [`Render2DDefinition`] whose tags select one
//! handler per view. Handlers are pure: they take the element geometry and
//! typed handler data and return a [`Drawing`] that the canvas layer replays.

pub mod elevation;
pub mod plan;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::coordinates::ElevationWall;
use crate::corner::DEFAULT_CORNER_TOLERANCE;
use crate::{DesignElement, RoomDimensions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlanViewType {
    Rectangle,
    CornerSquare,
    SinkSingle,
    SinkDouble,
    SinkCorner,
    CustomSvg,
    #[serde(other)]
    Unsupported,
}

impl PlanViewType {
    pub const SUPPORTED: [PlanViewType; 6] = [
        PlanViewType::Rectangle,
        PlanViewType::CornerSquare,
        PlanViewType::SinkSingle,
        PlanViewType::SinkDouble,
        PlanViewType::SinkCorner,
        PlanViewType::CustomSvg,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElevationViewType {
    StandardCabinet,
    Appliance,
    Sink,
    OpenShelf,
    CustomSvg,
    #[serde(other)]
    Unsupported,
}

impl ElevationViewType {
    pub const SUPPORTED: [ElevationViewType; 5] = [
        ElevationViewType::StandardCabinet,
        ElevationViewType::Appliance,
        ElevationViewType::Sink,
        ElevationViewType::OpenShelf,
        ElevationViewType::CustomSvg,
    ];
}

pub fn supported_plan_view_types() -> &'static [PlanViewType] {
    &PlanViewType::SUPPORTED
}

pub fn supported_elevation_view_types() -> &'static [ElevationViewType] {
    &ElevationViewType::SUPPORTED
}

fn default_fill() -> String {
    "#8b4513".to_string()
}

fn default_stroke() -> String {
    "#000000".to_string()
}

/// One row of the `component_2d_renders` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Render2DDefinition {
    #[serde(default)]
    pub component_id: String,
    pub plan_view_type: PlanViewType,
    #[serde(default)]
    pub plan_view_data: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_view_svg: Option<String>,
    pub elevation_type: ElevationViewType,
    #[serde(default)]
    pub elevation_data: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_svg_front: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_svg_back: Option<String>,
    pub side_elevation_type: ElevationViewType,
    #[serde(default)]
    pub side_elevation_data: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_svg_left: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_svg_right: Option<String>,
    #[serde(default = "default_fill")]
    pub fill_color: String,
    #[serde(default = "default_stroke")]
    pub stroke_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
}

impl Render2DDefinition {
    /// Handler tag and data for an elevation wall; side walls use the side definition.
    pub fn elevation_for(&self, wall: ElevationWall) -> (ElevationViewType, &serde_json::Value) {
        if wall.is_side() {
            (self.side_elevation_type, &self.side_elevation_data)
        } else {
            (self.elevation_type, &self.elevation_data)
        }
    }

    fn elevation_svg(&self, wall: ElevationWall) -> Option<&str> {
        match wall {
            ElevationWall::Front => self.elevation_svg_front.as_deref(),
            ElevationWall::Back => self.elevation_svg_back.as_deref(),
            ElevationWall::Left => self.elevation_svg_left.as_deref(),
            ElevationWall::Right => self.elevation_svg_right.as_deref(),
        }
    }
}

/// Single canvas drawing operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    FillRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: String,
    },
    StrokeRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: String,
        line_width: f64,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        dash: Vec<f64>,
    },
    FillEllipse {
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
        color: String,
    },
    FillCircle {
        cx: f64,
        cy: f64,
        radius: f64,
        color: String,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: String,
        line_width: f64,
    },
    FillPath {
        d: String,
        offset_x: f64,
        offset_y: f64,
        color: String,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        color: String,
        font: String,
    },
}

/// Placement of a drawing on the canvas; rotation is in degrees about the pivot
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub rotation: f64,
    pub pivot_x: f64,
    pub pivot_y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    pub transform: Transform,
    pub commands: Vec<DrawCommand>,
}

impl Drawing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: &str) {
        self.commands.push(DrawCommand::FillRect {
            x,
            y,
            width,
            height,
            color: color.to_string(),
        });
    }

    pub fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: &str, line_width: f64) {
        self.commands.push(DrawCommand::StrokeRect {
            x,
            y,
            width,
            height,
            color: color.to_string(),
            line_width,
            dash: Vec::new(),
        });
    }

    pub fn fill_ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, color: &str) {
        self.commands.push(DrawCommand::FillEllipse {
            cx,
            cy,
            rx,
            ry,
            color: color.to_string(),
        });
    }

    pub fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: &str) {
        self.commands.push(DrawCommand::FillCircle {
            cx,
            cy,
            radius,
            color: color.to_string(),
        });
    }

    pub fn line(&mut self, from: (f64, f64), to: (f64, f64), color: &str, line_width: f64) {
        self.commands.push(DrawCommand::Line {
            x1: from.0,
            y1: from.1,
            x2: to.0,
            y2: to.1,
            color: color.to_string(),
            line_width,
        });
    }

    pub fn fill_path(&mut self, d: &str, offset_x: f64, offset_y: f64, color: &str) {
        self.commands.push(DrawCommand::FillPath {
            d: d.to_string(),
            offset_x,
            offset_y,
            color: color.to_string(),
        });
    }

    /// Dashed magenta outline plus the handler tag
    pub fn with_debug_overlay(mut self, label: &str, bounds: Frame) -> Self {
        let Frame { x, y, width, height } = bounds;
        self.commands.push(DrawCommand::StrokeRect {
            x,
            y,
            width,
            height,
            color: "#ff00ff".to_string(),
            line_width: 2.0,
            dash: vec![5.0, 5.0],
        });
        self.commands.push(DrawCommand::Text {
            x: x + 5.0,
            y: y + 15.0,
            text: label.to_string(),
            color: "rgba(255, 0, 255, 0.8)".to_string(),
            font: "10px monospace".to_string(),
        });
        self
    }
}

/// Screen rectangle an elevation handler draws into (px)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Why a handler could not draw with the stored definition
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RenderFallback {
    UnsupportedType(&'static str),
    BadData(String),
    BadSvg,
}

impl std::fmt::Display for RenderFallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderFallback::UnsupportedType(tag) => write!(f, "unsupported {}", tag),
            RenderFallback::BadData(msg) => write!(f, "invalid handler data: {}", msg),
            RenderFallback::BadSvg => write!(f, "missing or malformed SVG path"),
        }
    }
}

/// Decode handler data; `null` and `{}` give the handler defaults.
pub(crate) fn decode<T: DeserializeOwned + Default>(data: &serde_json::Value) -> Result<T, RenderFallback> {
    if data.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(data.clone()).map_err(|e| RenderFallback::BadData(e.to_string()))
}

/// Loose check of SVG path data: starts with a move-to and only uses path syntax.
pub fn is_valid_svg_path(d: &str) -> bool {
    let trimmed = d.trim_start();
    if !trimmed.starts_with(['M', 'm']) {
        return false;
    }
    trimmed.chars().all(|c| {
        c.is_ascii_digit()
            || c.is_whitespace()
            || matches!(c, ',' | '.' | '-' | '+' | 'e' | 'E')
            || "MmLlHhVvCcSsQqTtAaZz".contains(c)
    })
}

fn svg_from_data(data: &serde_json::Value) -> Option<&str> {
    data.get("svg_path").and_then(|v| v.as_str())
}

/// Draw an element in plan view. Coordinates are local to the element and
/// placed by the drawing transform (translation plus rotation about the centre).
pub fn render_plan_view(element: &DesignElement, definition: &Render2DDefinition, zoom: f64) -> Drawing {
    let drawn = match definition.plan_view_type {
        PlanViewType::Rectangle => Ok(plan::rectangle(element, &definition.fill_color, zoom)),
        PlanViewType::CornerSquare => Ok(plan::corner_square(element, &definition.fill_color, zoom)),
        PlanViewType::SinkSingle => {
            decode(&definition.plan_view_data).map(|data| plan::sink_single(element, &data, zoom))
        }
        PlanViewType::SinkDouble => {
            decode(&definition.plan_view_data).map(|data| plan::sink_double(element, &data, zoom))
        }
        PlanViewType::SinkCorner => {
            decode(&definition.plan_view_data).map(|data| plan::sink_corner(element, &data, zoom))
        }
        PlanViewType::CustomSvg => definition
            .plan_view_svg
            .as_deref()
            .or_else(|| svg_from_data(&definition.plan_view_data))
            .filter(|d| is_valid_svg_path(d))
            .map(|d| plan::custom_svg(d, &definition.fill_color))
            .ok_or(RenderFallback::BadSvg),
        PlanViewType::Unsupported => Err(RenderFallback::UnsupportedType("plan_view_type")),
    };

    let mut drawing = drawn.unwrap_or_else(|reason| {
        warn!("Plan view fallback for '{}': {}", element.component_id, reason);
        plan::rectangle(element, &definition.fill_color, zoom)
    });

    let (width, depth) = plan::plan_size(element, zoom);
    drawing.transform = Transform {
        translate_x: element.x * zoom,
        translate_y: element.y * zoom,
        rotation: element.rotation,
        pivot_x: width / 2.0,
        pivot_y: depth / 2.0,
    };
    drawing
}

/// Draw an element on an elevation wall inside `frame`.
///
/// `room` is needed for corner cabinets to find their corner.
pub fn render_elevation_view(
    element: &DesignElement,
    definition: &Render2DDefinition,
    wall: ElevationWall,
    frame: Frame,
    zoom: f64,
    room: Option<&RoomDimensions>,
) -> Drawing {
    render_elevation_view_with_tolerance(element, definition, wall, frame, zoom, room, DEFAULT_CORNER_TOLERANCE)
}

/// [`render_elevation_view`] with an explicit corner detection tolerance (cm)
pub fn render_elevation_view_with_tolerance(
    element: &DesignElement,
    definition: &Render2DDefinition,
    wall: ElevationWall,
    frame: Frame,
    zoom: f64,
    room: Option<&RoomDimensions>,
    corner_tolerance: f64,
) -> Drawing {
    let (elevation_type, data) = definition.elevation_for(wall);

    let drawn = match elevation_type {
        ElevationViewType::StandardCabinet => decode(data)
            .map(|d| elevation::standard_cabinet(element, &d, frame, zoom, room, corner_tolerance, wall)),
        ElevationViewType::Appliance => decode(data).map(|d| elevation::appliance(&d, frame, zoom)),
        ElevationViewType::Sink => decode(data).map(|d| elevation::sink(element, &d, frame, zoom)),
        ElevationViewType::OpenShelf => decode(data).map(|d| elevation::open_shelf(&d, frame, zoom)),
        ElevationViewType::CustomSvg => definition
            .elevation_svg(wall)
            .or_else(|| svg_from_data(data))
            .filter(|d| is_valid_svg_path(d))
            .map(|d| elevation::custom_svg(d, frame, &definition.fill_color))
            .ok_or(RenderFallback::BadSvg),
        ElevationViewType::Unsupported => Err(RenderFallback::UnsupportedType(if wall.is_side() {
            "side_elevation_type"
        } else {
            "elevation_type"
        })),
    };

    drawn.unwrap_or_else(|reason| {
        warn!("Elevation view fallback for '{}': {}", element.component_id, reason);
        elevation::standard_cabinet(element, &Default::default(), frame, zoom, room, corner_tolerance, wall)
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefinitionValidation {
    pub valid: bool,
    pub errors: Vec<String>,
}

fn is_hex_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}

pub fn validate_render_definition(definition: &Render2DDefinition) -> DefinitionValidation {
    let mut errors = Vec::new();

    if definition.plan_view_type == PlanViewType::Unsupported {
        errors.push("Invalid plan_view_type".to_string());
    }
    if definition.elevation_type == ElevationViewType::Unsupported {
        errors.push("Invalid elevation_type".to_string());
    }
    if definition.side_elevation_type == ElevationViewType::Unsupported {
        errors.push("Invalid side_elevation_type".to_string());
    }
    if !definition.fill_color.is_empty() && !is_hex_color(&definition.fill_color) {
        errors.push(format!(
            "Invalid fill_color format: \"{}\" (expected #RRGGBB)",
            definition.fill_color
        ));
    }
    if !definition.stroke_color.is_empty() && !is_hex_color(&definition.stroke_color) {
        errors.push(format!(
            "Invalid stroke_color format: \"{}\" (expected #RRGGBB)",
            definition.stroke_color
        ));
    }

    DefinitionValidation {
        valid: errors.is_empty(),
        errors,
    }
}
