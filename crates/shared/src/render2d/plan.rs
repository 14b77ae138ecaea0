//! Plan view handlers. All coordinates are local to the element's top-left corner.

use serde::{Deserialize, Serialize};

use super::Drawing;
use crate::DesignElement;

const DRAIN_COLOR: &str = "#2F2F2F";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BowlStyle {
    Ceramic,
    #[default]
    Stainless,
}

impl BowlStyle {
    fn bowl(&self) -> &'static str {
        match self {
            BowlStyle::Ceramic => "#FFFFFF",
            BowlStyle::Stainless => "#C0C0C0",
        }
    }

    fn rim(&self) -> &'static str {
        match self {
            BowlStyle::Ceramic => "#F8F8F8",
            BowlStyle::Stainless => "#B0B0B0",
        }
    }

    fn highlight(&self) -> &'static str {
        match self {
            BowlStyle::Ceramic => "#FFFFFF",
            BowlStyle::Stainless => "#E0E0E0",
        }
    }

    fn inner(&self) -> &'static str {
        match self {
            BowlStyle::Ceramic => "#F0F0F0",
            BowlStyle::Stainless => "#D0D0D0",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkSingleData {
    pub bowl_inset_ratio: f64,
    pub bowl_depth_ratio: f64,
    pub bowl_style: BowlStyle,
    pub has_drain: bool,
    pub has_faucet_hole: bool,
    pub faucet_hole_position: f64,
    pub has_draining_board: bool,
}

impl Default for SinkSingleData {
    fn default() -> Self {
        Self {
            bowl_inset_ratio: 0.15,
            bowl_depth_ratio: 0.8,
            bowl_style: BowlStyle::Stainless,
            has_drain: true,
            has_faucet_hole: true,
            faucet_hole_position: 0.2,
            has_draining_board: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkDoubleData {
    pub bowl_inset_ratio: f64,
    pub bowl_width_ratio: f64,
    /// cm
    pub center_divider_width: f64,
    pub bowl_style: BowlStyle,
    pub has_drain: bool,
    pub has_faucet_hole: bool,
}

impl Default for SinkDoubleData {
    fn default() -> Self {
        Self {
            bowl_inset_ratio: 0.1,
            bowl_width_ratio: 0.4,
            center_divider_width: 5.0,
            bowl_style: BowlStyle::Stainless,
            has_drain: true,
            has_faucet_hole: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkCornerData {
    pub bowl_size_ratio: f64,
    pub bowl_style: BowlStyle,
    pub has_drain: bool,
}

impl Default for SinkCornerData {
    fn default() -> Self {
        Self {
            bowl_size_ratio: 0.6,
            bowl_style: BowlStyle::Stainless,
            has_drain: true,
        }
    }
}

/// Width and depth on the canvas; a zero depth falls back to the height.
pub fn plan_size(element: &DesignElement, zoom: f64) -> (f64, f64) {
    let depth = if element.depth != 0.0 {
        element.depth
    } else {
        element.height
    };
    (element.width * zoom, depth * zoom)
}

pub fn rectangle(element: &DesignElement, fill: &str, zoom: f64) -> Drawing {
    let (width, depth) = plan_size(element, zoom);
    let mut d = Drawing::new();
    d.fill_rect(0.0, 0.0, width, depth, fill);
    d
}

pub fn corner_square(element: &DesignElement, fill: &str, zoom: f64) -> Drawing {
    let (width, depth) = plan_size(element, zoom);
    let size = width.min(depth);
    let mut d = Drawing::new();
    d.fill_rect(0.0, 0.0, size, size, fill);
    d
}

/// Rim with top and left highlights shared by every sink
fn sink_rim(d: &mut Drawing, width: f64, depth: f64, style: BowlStyle) {
    d.fill_rect(0.0, 0.0, width, depth, style.rim());
    d.fill_rect(0.0, 0.0, width, depth * 0.1, style.highlight());
    d.fill_rect(0.0, 0.0, width * 0.1, depth, style.highlight());
}

/// Outer bowl plus the shallower inner ellipse
fn bowl(d: &mut Drawing, x: f64, y: f64, width: f64, depth: f64, style: BowlStyle) {
    let (cx, cy) = (x + width / 2.0, y + depth / 2.0);
    d.fill_ellipse(cx, cy, width / 2.0 * 0.9, depth / 2.0 * 0.95, style.bowl());
    d.fill_ellipse(cx, cy - depth * 0.1, width / 2.0 * 0.7, depth / 2.0 * 0.3, style.inner());
}

pub fn sink_single(element: &DesignElement, data: &SinkSingleData, zoom: f64) -> Drawing {
    let (width, depth) = plan_size(element, zoom);
    let style = data.bowl_style;
    let mut d = Drawing::new();

    sink_rim(&mut d, width, depth, style);

    let inset = data.bowl_inset_ratio;
    bowl(
        &mut d,
        width * inset,
        depth * inset,
        width * (1.0 - 2.0 * inset),
        depth * data.bowl_depth_ratio,
        style,
    );

    let small = width.min(depth);
    if data.has_drain {
        d.fill_circle(width / 2.0, depth / 2.0, small * 0.1 / 2.0, DRAIN_COLOR);
    }
    if data.has_faucet_hole {
        d.fill_circle(width * 0.5, depth * data.faucet_hole_position, small * 0.03 / 2.0, DRAIN_COLOR);
    }

    if data.has_draining_board {
        let (board_x, board_y) = (width * 0.05, depth * 0.65);
        let board_w = width * 0.9;
        d.fill_rect(board_x, board_y, board_w, depth * 0.3, style.rim());
        let top = match style {
            BowlStyle::Ceramic => "#FFFFFF",
            BowlStyle::Stainless => "#E8E8E8",
        };
        d.fill_rect(board_x, board_y, board_w, depth * 0.05, top);

        let (groove, shadow) = match style {
            BowlStyle::Ceramic => ("#E0E0E0", "#D0D0D0"),
            BowlStyle::Stainless => ("#D0D0D0", "#C0C0C0"),
        };
        for i in 0..10 {
            let x = board_x + (i as f64 + 0.5) * board_w / 10.0;
            d.line((x, depth * 0.65), (x, depth * 0.95), groove, 1.0);
            d.line((x + 0.5, depth * 0.65), (x + 0.5, depth * 0.95), shadow, 1.0);
        }
    }

    d
}

pub fn sink_double(element: &DesignElement, data: &SinkDoubleData, zoom: f64) -> Drawing {
    let (width, depth) = plan_size(element, zoom);
    let style = data.bowl_style;
    let mut d = Drawing::new();

    sink_rim(&mut d, width, depth, style);

    let bowl_width = width * data.bowl_width_ratio;
    let bowl_depth = depth * 0.8;
    let left_x = width * data.bowl_inset_ratio;
    let right_x = width * 0.5;
    let bowl_y = depth * data.bowl_inset_ratio;

    bowl(&mut d, left_x, bowl_y, bowl_width, bowl_depth, style);
    bowl(&mut d, right_x, bowl_y, bowl_width, bowl_depth, style);
    d.fill_rect(width * 0.45, bowl_y, data.center_divider_width * zoom, bowl_depth, style.rim());

    let small = width.min(depth);
    if data.has_drain {
        for x in [left_x, right_x] {
            d.fill_circle(x + bowl_width / 2.0, bowl_y + bowl_depth / 2.0, small * 0.1 / 2.0, DRAIN_COLOR);
        }
    }
    if data.has_faucet_hole {
        for x in [width * 0.25, width * 0.75] {
            d.fill_circle(x, depth * 0.2, small * 0.03 / 2.0, DRAIN_COLOR);
        }
    }

    d
}

pub fn sink_corner(element: &DesignElement, data: &SinkCornerData, zoom: f64) -> Drawing {
    let (width, depth) = plan_size(element, zoom);
    let style = data.bowl_style;
    let mut d = Drawing::new();

    sink_rim(&mut d, width, depth, style);

    let bowl_width = width * data.bowl_size_ratio;
    let bowl_depth = depth * data.bowl_size_ratio;
    let (bowl_x, bowl_y) = (width * 0.2, depth * 0.2);
    bowl(&mut d, bowl_x, bowl_y, bowl_width, bowl_depth, style);

    // secondary bowl tucked into the corner of the main one
    let (corner_x, corner_y) = (bowl_x + bowl_width * 0.7, bowl_y + bowl_depth * 0.7);
    let (corner_w, corner_d) = (width * 0.3, depth * 0.3);
    d.fill_rect(corner_x, corner_y, corner_w, corner_d, style.bowl());
    d.fill_rect(corner_x, corner_y, corner_w * 0.8, corner_d * 0.8, style.inner());

    if data.has_drain {
        d.fill_circle(
            bowl_x + bowl_width / 2.0,
            bowl_y + bowl_depth / 2.0,
            width.min(depth) * 0.1 / 2.0,
            DRAIN_COLOR,
        );
    }

    d
}

pub fn custom_svg(path: &str, fill: &str) -> Drawing {
    let mut d = Drawing::new();
    d.fill_path(path, 0.0, 0.0, fill);
    d
}
