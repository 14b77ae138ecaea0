//! Elevation view handlers. Coordinates are absolute canvas pixels inside the frame.

use serde::{Deserialize, Serialize};

use super::{Drawing, Frame};
use crate::coordinates::ElevationWall;
use crate::corner::{
    detect_corner_position, transform_door_side_for_view, DoorSide, PlanRect, DEFAULT_CORNER_TOLERANCE,
};
use crate::{DesignElement, DoorSetting, RoomDimensions};

const CABINET_COLOR: &str = "#8b4513";
const DOOR_COLOR: &str = "#d2b48c";
const HANDLE_COLOR: &str = "#808080";
const TOE_KICK_COLOR: &str = "#1a1a1a";
const SIDE_PANEL_COLOR: &str = "#c9b896";
const SHAKER_COLOR: &str = "#a0826d";
const GLASS_COLOR: &str = "rgba(173, 216, 230, 0.3)";

/// Elements mounted higher than this never get a toe-kick
const WALL_MOUNT_Z: f64 = 100.0;

/// Upper bound on doors and on drawers drawn per cabinet front
pub const MAX_FRONTS: u32 = 8;
pub const MAX_SHELVES: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoorStyle {
    #[default]
    Flat,
    Shaker,
    Glass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleStyle {
    #[default]
    Bar,
    Knob,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlePosition {
    Top,
    #[default]
    Center,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StandardCabinetData {
    pub door_count: u32,
    pub door_style: DoorStyle,
    pub handle_style: HandleStyle,
    pub handle_position: HandlePosition,
    pub has_toe_kick: bool,
    /// cm
    pub toe_kick_height: f64,
    pub drawer_count: u32,
    /// cm, per drawer from the top
    pub drawer_heights: Vec<f64>,
    pub is_corner: Option<bool>,
    pub corner_door_side: Option<DoorSetting>,
}

impl Default for StandardCabinetData {
    fn default() -> Self {
        Self {
            door_count: 2,
            door_style: DoorStyle::Flat,
            handle_style: HandleStyle::Bar,
            handle_position: HandlePosition::Center,
            has_toe_kick: false,
            toe_kick_height: 10.0,
            drawer_count: 0,
            drawer_heights: Vec::new(),
            is_corner: None,
            corner_door_side: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelStyle {
    #[default]
    Integrated,
    Standalone,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplianceData {
    pub panel_style: PanelStyle,
    pub has_display: bool,
    pub has_handle: bool,
}

impl Default for ApplianceData {
    fn default() -> Self {
        Self {
            panel_style: PanelStyle::Integrated,
            has_display: false,
            has_handle: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SinkPanelStyle {
    Exposed,
    #[default]
    UnderMount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkElevationData {
    pub has_front_panel: bool,
    /// cm
    pub panel_height: f64,
    pub panel_style: SinkPanelStyle,
}

impl Default for SinkElevationData {
    fn default() -> Self {
        Self {
            has_front_panel: false,
            panel_height: 10.0,
            panel_style: SinkPanelStyle::UnderMount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShelfSpacing {
    #[default]
    Equal,
    Varied,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenShelfData {
    pub shelf_count: u32,
    pub shelf_spacing: ShelfSpacing,
}

impl Default for OpenShelfData {
    fn default() -> Self {
        Self {
            shelf_count: 3,
            shelf_spacing: ShelfSpacing::Equal,
        }
    }
}

/// Door, drawer and handle metrics in px
struct Metrics {
    inset: f64,
    gap: f64,
    handle_width: f64,
    handle_height: f64,
}

impl Metrics {
    fn new(zoom: f64) -> Self {
        Self {
            inset: 2.0 * zoom,
            gap: 2.0 * zoom,
            handle_width: 2.0 * zoom,
            handle_height: 10.0 * zoom,
        }
    }
}

fn handle(d: &mut Drawing, style: HandleStyle, x: f64, y: f64, m: &Metrics) {
    match style {
        HandleStyle::Bar => d.fill_rect(x, y, m.handle_width, m.handle_height, HANDLE_COLOR),
        HandleStyle::Knob => d.fill_circle(
            x + m.handle_width / 2.0,
            y + m.handle_height / 2.0,
            m.handle_width,
            HANDLE_COLOR,
        ),
        HandleStyle::None => {}
    }
}

fn is_corner_unit(element: &DesignElement, data: &StandardCabinetData) -> bool {
    data.is_corner
        .unwrap_or_else(|| element.component_id.contains("corner"))
}

pub fn standard_cabinet(
    element: &DesignElement,
    data: &StandardCabinetData,
    frame: Frame,
    zoom: f64,
    room: Option<&RoomDimensions>,
    corner_tolerance: f64,
    wall: ElevationWall,
) -> Drawing {
    let wall_mounted = element.z.is_some_and(|z| z > WALL_MOUNT_Z);
    let has_toe_kick = !wall_mounted && data.has_toe_kick;
    let toe_kick = data.toe_kick_height * zoom;

    if let Some(room) = room.filter(|_| is_corner_unit(element, data)) {
        return corner_cabinet(element, data, frame, zoom, room, corner_tolerance, wall, has_toe_kick, toe_kick);
    }

    let Frame { x, y, width, height } = frame;
    let m = Metrics::new(zoom);
    let mut d = Drawing::new();

    d.fill_rect(x, y, width, height, CABINET_COLOR);
    if has_toe_kick && toe_kick > 0.0 {
        d.fill_rect(x, y + height - toe_kick, width, toe_kick, TOE_KICK_COLOR);
    }

    let drawable = if has_toe_kick { height - toe_kick } else { height };
    let doors = data.door_count.min(MAX_FRONTS);
    let drawers = data.drawer_count.min(MAX_FRONTS);
    let row_share = drawable / (f64::from(drawers) + f64::from(doors)).max(1.0);

    let mut current_y = y + m.inset;
    for i in 0..drawers as usize {
        let drawer_height = data
            .drawer_heights
            .get(i)
            .filter(|h| **h > 0.0)
            .map_or(row_share - m.inset, |h| h * zoom);

        d.fill_rect(x + m.inset, current_y, width - m.inset * 2.0, drawer_height, DOOR_COLOR);
        if data.handle_style != HandleStyle::None {
            // drawer pulls are always bars
            d.fill_rect(
                x + width / 2.0 - m.handle_width / 2.0,
                current_y + drawer_height / 2.0 - m.handle_height / 2.0,
                m.handle_width,
                m.handle_height,
                HANDLE_COLOR,
            );
        }
        current_y += drawer_height + m.gap;
    }

    let door_start = y + m.inset + f64::from(drawers) * row_share;
    let door_area = drawable - (door_start - y) - m.inset;

    if doors > 0 {
        let n = f64::from(doors);
        let door_width = (width - m.inset * 2.0 - m.gap * (n - 1.0)) / n;

        for i in 0..doors {
            let door_x = x + m.inset + f64::from(i) * (door_width + m.gap);
            d.fill_rect(door_x, door_start, door_width, door_area, DOOR_COLOR);

            let handle_y = match data.handle_position {
                HandlePosition::Top => door_start + m.handle_height,
                HandlePosition::Bottom => door_start + door_area - m.handle_height * 2.0,
                HandlePosition::Center => door_start + door_area / 2.0 - m.handle_height / 2.0,
            };
            // first door is hinged left, the rest right
            let handle_x = if i == 0 {
                door_x + door_width - m.handle_width - 2.0
            } else {
                door_x + 2.0
            };
            handle(&mut d, data.handle_style, handle_x, handle_y, &m);

            match data.door_style {
                DoorStyle::Shaker => {
                    d.stroke_rect(door_x + 3.0, door_start + 3.0, door_width - 6.0, door_area - 6.0, SHAKER_COLOR, 1.0)
                }
                DoorStyle::Glass => {
                    d.fill_rect(door_x + 4.0, door_start + 4.0, door_width - 8.0, door_area - 8.0, GLASS_COLOR)
                }
                DoorStyle::Flat => {}
            }
        }
    }

    d
}

/// Door side of a corner unit as seen from `wall`.
///
/// A manual setting on the element wins over the handler data; otherwise the
/// corner matrix decides and units outside any corner open right.
pub fn corner_door_side(
    element: &DesignElement,
    data: &StandardCabinetData,
    room: &RoomDimensions,
    corner_tolerance: f64,
    wall: ElevationWall,
) -> DoorSide {
    match element.corner_door_side.or(data.corner_door_side) {
        Some(DoorSetting::Left) => DoorSide::Left,
        Some(DoorSetting::Right) => DoorSide::Right,
        Some(DoorSetting::Auto) | None => {
            let corner = detect_corner_position(PlanRect::from(element), room, corner_tolerance);
            let physical = corner.map_or(DoorSide::Right, |c| c.door_side());
            transform_door_side_for_view(physical, corner, Some(wall.as_str()))
        }
    }
}

/// One door and one blank side panel
#[allow(clippy::too_many_arguments)]
fn corner_cabinet(
    element: &DesignElement,
    data: &StandardCabinetData,
    frame: Frame,
    zoom: f64,
    room: &RoomDimensions,
    corner_tolerance: f64,
    wall: ElevationWall,
    has_toe_kick: bool,
    toe_kick: f64,
) -> Drawing {
    let Frame { x, y, width, height } = frame;
    let m = Metrics::new(zoom);
    let mut d = Drawing::new();

    d.fill_rect(x, y, width, height, CABINET_COLOR);
    if has_toe_kick && toe_kick > 0.0 {
        d.fill_rect(x, y + height - toe_kick, width, toe_kick, TOE_KICK_COLOR);
    }

    let drawable = if has_toe_kick { height - toe_kick } else { height };
    let leaf_width = (width - m.inset * 2.0 - m.gap) / 2.0;
    let leaf_y = y + m.inset;
    let leaf_height = drawable - m.inset * 2.0;
    let handle_y = y + drawable / 2.0 - m.handle_height / 2.0;

    let side = corner_door_side(element, data, room, corner_tolerance, wall);
    let (door_x, panel_x, handle_x) = match side {
        DoorSide::Left => {
            let door_x = x + m.inset;
            (door_x, door_x + leaf_width + m.gap, door_x + leaf_width - m.handle_width - 2.0)
        }
        DoorSide::Right => {
            let panel_x = x + m.inset;
            let door_x = panel_x + leaf_width + m.gap;
            (door_x, panel_x, door_x + 2.0)
        }
    };

    d.fill_rect(panel_x, leaf_y, leaf_width, leaf_height, SIDE_PANEL_COLOR);
    d.fill_rect(door_x, leaf_y, leaf_width, leaf_height, DOOR_COLOR);
    handle(&mut d, data.handle_style, handle_x, handle_y, &m);

    if data.door_style == DoorStyle::Shaker {
        d.stroke_rect(door_x + 3.0, leaf_y + 3.0, leaf_width - 6.0, leaf_height - 6.0, SHAKER_COLOR, 1.0);
    }

    d
}

pub fn appliance(data: &ApplianceData, frame: Frame, zoom: f64) -> Drawing {
    let Frame { x, y, width, height } = frame;
    let mut d = Drawing::new();

    d.fill_rect(x, y, width, height, "#808080");

    if data.panel_style == PanelStyle::Integrated {
        let inset = 2.0 * zoom;
        d.fill_rect(x + inset, y + inset, width - inset * 2.0, height - inset * 2.0, DOOR_COLOR);
    }

    if data.has_handle {
        d.fill_rect(x + width - 4.0 * zoom, y + height * 0.3, 2.0 * zoom, height * 0.4, "#404040");
    }

    if data.has_display {
        let (dx, dy) = (x + width * 0.2, y + height * 0.1);
        let (dw, dh) = (width * 0.6, height * 0.1);
        d.fill_rect(dx, dy, dw, dh, "#1a1a1a");
        d.fill_rect(dx + 2.0, dy + 2.0, dw * 0.3, dh - 4.0, "#00ff00");
    }

    d
}

pub fn sink(element: &DesignElement, data: &SinkElevationData, frame: Frame, zoom: f64) -> Drawing {
    let Frame { x, y, width, height } = frame;
    let mut d = Drawing::new();

    let ceramic = element.component_id.contains("butler") || element.component_id.contains("ceramic");

    if data.panel_style == SinkPanelStyle::Exposed && data.has_front_panel {
        let panel = data.panel_height * zoom;
        let top = y + height - panel;
        d.fill_rect(x, top, width, panel, if ceramic { "#FFFFFF" } else { "#C0C0C0" });

        let line_color = if ceramic { "#E0E0E0" } else { "#B0B0B0" };
        for i in 1..4 {
            let line_y = top + panel / 4.0 * f64::from(i);
            d.line((x, line_y), (x + width, line_y), line_color, 1.0);
        }
    } else {
        d.fill_rect(x, y, width, height, CABINET_COLOR);
        let toe_kick = 10.0 * zoom;
        d.fill_rect(x, y + height - toe_kick, width, toe_kick, TOE_KICK_COLOR);
    }

    d
}

pub fn open_shelf(data: &OpenShelfData, frame: Frame, zoom: f64) -> Drawing {
    const SHELF: &str = "#8b4513";
    const FRAME: &str = "#6b4513";
    const SHADOW: &str = "#5b3513";

    let Frame { x, y, width, height } = frame;
    let mut d = Drawing::new();

    let frame_width = 2.0 * zoom;
    d.fill_rect(x, y, frame_width, height, FRAME);
    d.fill_rect(x + width - frame_width, y, frame_width, height, FRAME);
    d.fill_rect(x + frame_width, y, width - frame_width * 2.0, height, "rgba(139, 69, 19, 0.3)");

    let thickness = 2.0 * zoom;
    let shelf_width = width - frame_width * 2.0;
    let count = data.shelf_count.min(MAX_SHELVES);

    let shelf = |d: &mut Drawing, shelf_y: f64| {
        d.fill_rect(x + frame_width, shelf_y, shelf_width, thickness, SHELF);
        d.fill_rect(x + frame_width, shelf_y + thickness, shelf_width, 1.0, SHADOW);
    };

    match data.shelf_spacing {
        ShelfSpacing::Equal => {
            let spacing = height / (f64::from(count) + 1.0);
            for i in 1..=count {
                shelf(&mut d, y + spacing * f64::from(i) - thickness / 2.0);
            }
        }
        ShelfSpacing::Varied => {
            // gaps grow towards the bottom
            let total = height - f64::from(count) * thickness;
            let mut current = y;
            for i in 0..count {
                let ratio = (f64::from(i) + 1.0) / (f64::from(count) + 1.0);
                current += total * ratio / f64::from(count);
                shelf(&mut d, current);
                current += thickness;
            }
        }
    }

    d.stroke_rect(x, y, width, height, FRAME, 1.0);
    d
}

pub fn custom_svg(path: &str, frame: Frame, fill: &str) -> Drawing {
    let mut d = Drawing::new();
    d.fill_path(path, frame.x, frame.y, fill);
    d
}
