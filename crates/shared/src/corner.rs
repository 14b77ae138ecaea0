//! Corner cabinet door orientation.
//!
//! The door of a corner unit always opens away from the side wall. The four
//! corner rules below are the only place that decides it; elevation views
//! derive their visual side from the physical one.

use serde::{Deserialize, Serialize};

use crate::coordinates::ElevationWall;
use crate::{DesignElement, DoorSetting, RoomDimensions};

pub const DEFAULT_CORNER_TOLERANCE: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CornerPosition {
    FrontLeft,
    FrontRight,
    BackLeft,
    BackRight,
}

impl CornerPosition {
    /// Physical door side for this corner
    pub fn door_side(&self) -> DoorSide {
        match self {
            CornerPosition::FrontLeft | CornerPosition::BackLeft => DoorSide::Right,
            CornerPosition::FrontRight | CornerPosition::BackRight => DoorSide::Left,
        }
    }

    /// The two walls whose elevations show a unit in this corner
    pub fn adjacent_walls(&self) -> [ElevationWall; 2] {
        match self {
            CornerPosition::FrontLeft => [ElevationWall::Front, ElevationWall::Left],
            CornerPosition::FrontRight => [ElevationWall::Front, ElevationWall::Right],
            CornerPosition::BackLeft => [ElevationWall::Back, ElevationWall::Left],
            CornerPosition::BackRight => [ElevationWall::Back, ElevationWall::Right],
        }
    }

    pub fn primary_wall(&self) -> ElevationWall {
        match self {
            CornerPosition::FrontLeft | CornerPosition::FrontRight => ElevationWall::Front,
            CornerPosition::BackLeft | CornerPosition::BackRight => ElevationWall::Back,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoorSide {
    Left,
    Right,
}

impl DoorSide {
    pub fn flipped(self) -> Self {
        match self {
            DoorSide::Left => DoorSide::Right,
            DoorSide::Right => DoorSide::Left,
        }
    }
}

/// Plan rectangle used for corner detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub depth: f64,
}

impl From<&DesignElement> for PlanRect {
    fn from(element: &DesignElement) -> Self {
        Self {
            x: element.x,
            y: element.y,
            width: element.width,
            depth: element.depth,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornerDoor {
    pub door_side: DoorSide,
    pub corner_position: Option<CornerPosition>,
}

pub fn detect_corner_position(
    rect: PlanRect,
    room: &RoomDimensions,
    tolerance: f64,
) -> Option<CornerPosition> {
    let left = rect.x < tolerance;
    let right = rect.x + rect.width > room.width - tolerance;
    let front = rect.y < tolerance;
    let back = rect.y + rect.depth > room.depth - tolerance;

    if front && left {
        Some(CornerPosition::FrontLeft)
    } else if front && right {
        Some(CornerPosition::FrontRight)
    } else if back && left {
        Some(CornerPosition::BackLeft)
    } else if back && right {
        Some(CornerPosition::BackRight)
    } else {
        None
    }
}

/// Door side for a corner, honouring a manual left/right override.
pub fn door_side(corner: CornerPosition, setting: Option<DoorSetting>) -> DoorSide {
    match setting {
        Some(DoorSetting::Left) => DoorSide::Left,
        Some(DoorSetting::Right) => DoorSide::Right,
        Some(DoorSetting::Auto) | None => corner.door_side(),
    }
}

pub fn determine_corner_door_side(element: &DesignElement, room: &RoomDimensions) -> CornerDoor {
    determine_corner_door_side_with_tolerance(element, room, DEFAULT_CORNER_TOLERANCE)
}

pub fn determine_corner_door_side_with_tolerance(
    element: &DesignElement,
    room: &RoomDimensions,
    tolerance: f64,
) -> CornerDoor {
    match detect_corner_position(PlanRect::from(element), room, tolerance) {
        Some(corner) => CornerDoor {
            door_side: door_side(corner, element.corner_door_side),
            corner_position: Some(corner),
        },
        None => CornerDoor {
            door_side: DoorSide::Right,
            corner_position: None,
        },
    }
}

/// Visual door side when the unit is seen from `view`.
pub fn transform_door_side_for_view(
    door_side: DoorSide,
    corner: Option<CornerPosition>,
    view: Option<&str>,
) -> DoorSide {
    let (Some(corner), Some(view)) = (corner, view) else {
        return door_side;
    };

    match (ElevationWall::from_view(view), corner) {
        (Some(ElevationWall::Left), CornerPosition::BackLeft)
        | (Some(ElevationWall::Right), CornerPosition::FrontRight) => door_side.flipped(),
        _ => door_side,
    }
}

/// Catalog ids of L-shaped corner units
pub fn is_corner_component(component_id: &str) -> bool {
    const PATTERNS: [&str; 9] = [
        "corner-counter-top",
        "counter-top-corner",
        "corner-wall-cabinet",
        "corner-base-cabinet",
        "l-shaped-test-cabinet",
        "corner-tall-unit",
        "corner-larder",
        "corner-pantry",
        "corner-sink",
    ];
    let id = component_id.to_lowercase();
    PATTERNS.iter().any(|p| id.contains(p))
}

pub fn is_corner_visible_in_view(
    element: &DesignElement,
    room: &RoomDimensions,
    wall: ElevationWall,
    tolerance: f64,
) -> bool {
    detect_corner_position(PlanRect::from(element), room, tolerance)
        .is_some_and(|corner| corner.adjacent_walls().contains(&wall))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;

    fn room() -> RoomDimensions {
        RoomDimensions::new(600.0, 400.0)
    }

    fn rect(x: f64, y: f64) -> PlanRect {
        PlanRect { x, y, width: 90.0, depth: 90.0 }
    }

    #[test]
    fn test_detect_corners() {
        let r = room();
        assert_eq!(detect_corner_position(rect(0.0, 0.0), &r, 30.0), Some(CornerPosition::FrontLeft));
        assert_eq!(detect_corner_position(rect(510.0, 0.0), &r, 30.0), Some(CornerPosition::FrontRight));
        assert_eq!(detect_corner_position(rect(0.0, 310.0), &r, 30.0), Some(CornerPosition::BackLeft));
        assert_eq!(detect_corner_position(rect(510.0, 310.0), &r, 30.0), Some(CornerPosition::BackRight));
        assert_eq!(detect_corner_position(rect(200.0, 0.0), &r, 30.0), None);
        assert_eq!(detect_corner_position(rect(200.0, 150.0), &r, 30.0), None);
    }

    #[test]
    fn test_matrix() {
        assert_eq!(door_side(CornerPosition::FrontLeft, None), DoorSide::Right);
        assert_eq!(door_side(CornerPosition::FrontRight, None), DoorSide::Left);
        assert_eq!(door_side(CornerPosition::BackLeft, Some(DoorSetting::Auto)), DoorSide::Right);
        assert_eq!(door_side(CornerPosition::BackRight, None), DoorSide::Left);
        assert_eq!(door_side(CornerPosition::BackRight, Some(DoorSetting::Right)), DoorSide::Right);
    }

    #[test]
    fn test_not_in_corner_defaults_right() {
        let el = base_cabinet("c", 250.0, 150.0);
        let result = determine_corner_door_side(&el, &room());
        assert_eq!(result.door_side, DoorSide::Right);
        assert_eq!(result.corner_position, None);
    }

    #[test]
    fn test_manual_override() {
        let mut el = base_cabinet("c", 0.0, 0.0);
        el.corner_door_side = Some(DoorSetting::Left);
        let result = determine_corner_door_side(&el, &room());
        assert_eq!(result.corner_position, Some(CornerPosition::FrontLeft));
        assert_eq!(result.door_side, DoorSide::Left);
    }

    #[test]
    fn test_view_transform() {
        let t = transform_door_side_for_view;
        assert_eq!(t(DoorSide::Right, Some(CornerPosition::BackLeft), Some("left")), DoorSide::Left);
        assert_eq!(t(DoorSide::Left, Some(CornerPosition::FrontRight), Some("right-dup1")), DoorSide::Right);
        assert_eq!(t(DoorSide::Right, Some(CornerPosition::FrontLeft), Some("left")), DoorSide::Right);
        assert_eq!(t(DoorSide::Right, Some(CornerPosition::BackLeft), Some("front")), DoorSide::Right);
        assert_eq!(t(DoorSide::Right, None, Some("left")), DoorSide::Right);
        assert_eq!(t(DoorSide::Left, Some(CornerPosition::BackLeft), None), DoorSide::Left);
    }

    #[test]
    fn test_corner_component_ids() {
        assert!(is_corner_component("corner-base-cabinet-90"));
        assert!(is_corner_component("New-Corner-Wall-Cabinet-60"));
        assert!(is_corner_component("l-shaped-test-cabinet"));
        assert!(!is_corner_component("base-cabinet-60"));
    }

    #[test]
    fn test_corner_visibility() {
        let el = base_cabinet("c", 0.0, 320.0);
        let r = room();
        assert!(is_corner_visible_in_view(&el, &r, ElevationWall::Back, 30.0));
        assert!(is_corner_visible_in_view(&el, &r, ElevationWall::Left, 30.0));
        assert!(!is_corner_visible_in_view(&el, &r, ElevationWall::Front, 30.0));
        assert_eq!(CornerPosition::BackLeft.primary_wall(), ElevationWall::Back);
    }
}
