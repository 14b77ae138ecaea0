//! Conversions between plan, canvas, elevation and 3D world coordinates.
//!
//! Plan: cm from the inner left wall (x) and inner front wall (y), z above
//! the floor. World: metres, origin at the room centre, y up.

use serde::{Deserialize, Serialize};

use crate::{PlanPoint, RoomDimensions};

/// Wall an elevation view looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElevationWall {
    Front,
    Back,
    Left,
    Right,
}

impl ElevationWall {
    pub const ALL: [ElevationWall; 4] = [
        ElevationWall::Front,
        ElevationWall::Back,
        ElevationWall::Left,
        ElevationWall::Right,
    ];

    /// Parse a view id such as `front`, `front-default` or `left-dup2`.
    pub fn from_view(view: &str) -> Option<Self> {
        let base = view.split('-').next().unwrap_or(view);
        match base {
            "front" => Some(ElevationWall::Front),
            "back" => Some(ElevationWall::Back),
            "left" => Some(ElevationWall::Left),
            "right" => Some(ElevationWall::Right),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ElevationWall::Front => "front",
            ElevationWall::Back => "back",
            ElevationWall::Left => "left",
            ElevationWall::Right => "right",
        }
    }

    /// Side walls run along the room depth
    pub fn is_side(&self) -> bool {
        matches!(self, ElevationWall::Left | ElevationWall::Right)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevationCoordinates {
    pub canvas_x: f64,
    pub canvas_y: f64,
    /// Left-wall views are mirrored when drawn
    pub should_mirror: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Plan point with its height above the floor (cm)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransformEngine {
    room: RoomDimensions,
}

impl CoordinateTransformEngine {
    pub fn new(room: RoomDimensions) -> Self {
        Self { room }
    }

    pub fn room(&self) -> RoomDimensions {
        self.room
    }

    pub fn with_dimensions(&self, room: RoomDimensions) -> Self {
        Self::new(room)
    }

    pub fn plan_to_canvas(&self, plan: PlanPoint, zoom: f64) -> CanvasPoint {
        CanvasPoint {
            x: plan.x * zoom,
            y: plan.y * zoom,
        }
    }

    pub fn canvas_to_plan(&self, canvas: CanvasPoint, zoom: f64) -> PlanPoint {
        PlanPoint::new(canvas.x / zoom, canvas.y / zoom)
    }

    /// Position of an element on an elevation canvas of `canvas_width` px.
    ///
    /// Front/back walls map plan x across the room width; side walls map
    /// plan y across the room depth.
    pub fn plan_to_elevation(
        &self,
        plan: PlanPosition,
        wall: ElevationWall,
        canvas_width: f64,
        _canvas_height: f64,
        element_height: f64,
        zoom: f64,
    ) -> ElevationCoordinates {
        let canvas_x = match wall {
            ElevationWall::Front | ElevationWall::Back => plan.x / self.room.width * canvas_width,
            ElevationWall::Left | ElevationWall::Right => plan.y / self.room.depth * canvas_width,
        };

        ElevationCoordinates {
            canvas_x,
            canvas_y: (self.room.ceiling() - plan.z - element_height) * zoom,
            should_mirror: wall == ElevationWall::Left,
        }
    }

    /// Element base position to the centre of its 3D mesh
    pub fn plan_to_world(&self, plan: PlanPosition, element_height: f64) -> WorldPosition {
        let left = -self.room.width / 200.0;
        let back = -self.room.depth / 200.0;
        WorldPosition {
            x: left + plan.x / 100.0,
            y: plan.z / 100.0 + element_height / 200.0,
            z: back + plan.y / 100.0,
        }
    }

    pub fn world_to_plan(&self, world: WorldPosition, element_height: f64) -> PlanPosition {
        let left = -self.room.width / 200.0;
        let back = -self.room.depth / 200.0;
        PlanPosition {
            x: (world.x - left) * 100.0,
            y: (world.z - back) * 100.0,
            z: (world.y - element_height / 200.0) * 100.0,
        }
    }

    /// Distance (cm) between `plan` and its plan -> world -> plan round trip
    pub fn validate_consistency(&self, plan: PlanPosition, element_height: f64) -> f64 {
        let back = self.world_to_plan(self.plan_to_world(plan, element_height), element_height);
        let (dx, dy, dz) = (back.x - plan.x, back.y - plan.y, back.z - plan.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> CoordinateTransformEngine {
        CoordinateTransformEngine::new(RoomDimensions::new(600.0, 400.0))
    }

    #[test]
    fn test_view_parsing() {
        assert_eq!(ElevationWall::from_view("front"), Some(ElevationWall::Front));
        assert_eq!(ElevationWall::from_view("left-dup2"), Some(ElevationWall::Left));
        assert_eq!(ElevationWall::from_view("right-default"), Some(ElevationWall::Right));
        assert_eq!(ElevationWall::from_view("plan"), None);
    }

    #[test]
    fn test_canvas_round_trip() {
        let e = engine();
        let c = e.plan_to_canvas(PlanPoint::new(100.0, 50.0), 1.5);
        assert_eq!(c, CanvasPoint { x: 150.0, y: 75.0 });
        assert_eq!(e.canvas_to_plan(c, 1.5), PlanPoint::new(100.0, 50.0));
    }

    #[test]
    fn test_plan_to_elevation() {
        let e = engine();
        let p = PlanPosition { x: 300.0, y: 100.0, z: 0.0 };

        let front = e.plan_to_elevation(p, ElevationWall::Front, 800.0, 400.0, 90.0, 1.0);
        assert_eq!(front.canvas_x, 400.0);
        assert_eq!(front.canvas_y, 150.0);
        assert!(!front.should_mirror);

        let left = e.plan_to_elevation(p, ElevationWall::Left, 800.0, 400.0, 90.0, 1.0);
        assert_eq!(left.canvas_x, 200.0);
        assert!(left.should_mirror);

        let right = e.plan_to_elevation(p, ElevationWall::Right, 800.0, 400.0, 90.0, 2.0);
        assert_eq!(right.canvas_x, 200.0);
        assert_eq!(right.canvas_y, 300.0);
        assert!(!right.should_mirror);
    }

    #[test]
    fn test_plan_to_world() {
        let e = engine();
        let w = e.plan_to_world(PlanPosition { x: 0.0, y: 0.0, z: 0.0 }, 90.0);
        assert!((w.x + 3.0).abs() < 1e-12);
        assert!((w.y - 0.45).abs() < 1e-12);
        assert!((w.z + 2.0).abs() < 1e-12);

        let centre = e.plan_to_world(PlanPosition { x: 300.0, y: 200.0, z: 140.0 }, 70.0);
        assert!(centre.x.abs() < 1e-12);
        assert!(centre.z.abs() < 1e-12);
        assert!((centre.y - 1.75).abs() < 1e-12);
    }

    #[test]
    fn test_round_trip_consistency() {
        let e = engine();
        for (x, y, z) in [(0.0, 0.0, 0.0), (123.4, 56.7, 140.0), (600.0, 400.0, 200.0)] {
            let err = e.validate_consistency(PlanPosition { x, y, z }, 72.0);
            assert!(err < 0.1, "round-trip error {err}");
        }
    }

    #[test]
    fn test_with_dimensions_uses_custom_ceiling() {
        let e = engine().with_dimensions(RoomDimensions::new(600.0, 400.0).with_ceiling(300.0));
        let p = PlanPosition { x: 0.0, y: 0.0, z: 0.0 };
        assert_eq!(e.plan_to_elevation(p, ElevationWall::Back, 600.0, 300.0, 90.0, 1.0).canvas_y, 210.0);
    }
}
