//! Room shapes beyond the simple rectangle: floor polygon, wall segments,
//! ceiling zones, plus the 2D helpers and validation that go with them.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::coordinates::ElevationWall;
use crate::corner::PlanRect;
use crate::{DesignElement, RoomDimensions};

/// `[x, y]` in cm
pub type Point2D = [f64; 2];

/// Elements within this distance of a wall line show on its elevation
pub const DEFAULT_WALL_TOLERANCE: f64 = 20.0;
const PERIMETER_TOLERANCE: f64 = 5.0;
const CONNECTION_GAP: f64 = 0.1;
const MAX_POLYGON_VERTICES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoomShapeType {
    #[default]
    Rectangle,
    LShape,
    UShape,
    TShape,
    #[serde(other)]
    Custom,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Zero box for an empty vertex list
    pub fn from_vertices(vertices: &[Point2D]) -> Self {
        let Some(first) = vertices.first() else {
            return Self::default();
        };
        vertices.iter().fold(
            Self {
                min_x: first[0],
                min_y: first[1],
                max_x: first[0],
                max_y: first[1],
            },
            |b, [x, y]| Self {
                min_x: b.min_x.min(*x),
                min_y: b.min_y.min(*y),
                max_x: b.max_x.max(*x),
                max_y: b.max_y.max(*y),
            },
        )
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn depth(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn contains(&self, [x, y]: Point2D) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorGeometry {
    /// Clockwise
    pub vertices: Vec<Point2D>,
    #[serde(default)]
    pub elevation: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallKind {
    #[default]
    Solid,
    Door,
    Window,
    Opening,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallSegment {
    pub id: String,
    pub start: Point2D,
    pub end: Point2D,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,
    #[serde(rename = "type", default)]
    pub kind: WallKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    /// `front`, `back`, `left`, `right`, `interior-return`, ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_view: Option<String>,
}

impl WallSegment {
    pub fn length(&self) -> f64 {
        line_length(self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CeilingKind {
    #[default]
    Flat,
    Vaulted,
    Sloped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CeilingStyle {
    #[default]
    Flat,
    Vaulted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CeilingZone {
    pub vertices: Vec<Point2D>,
    pub height: f64,
    #[serde(default)]
    pub style: CeilingStyle,
    /// Degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slope: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apex_height: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CeilingGeometry {
    #[serde(rename = "type", default)]
    pub kind: CeilingKind,
    #[serde(default)]
    pub zones: Vec<CeilingZone>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSection {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub vertices: Vec<Point2D>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomMetadata {
    /// cm²
    pub total_floor_area: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_wall_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usable_floor_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_perimeter: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_wall_length: Option<f64>,
}

/// Complex room definition (`room_geometry_templates.geometry_definition`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomGeometry {
    #[serde(default)]
    pub shape_type: RoomShapeType,
    pub bounding_box: BoundingBox,
    pub floor: FloorGeometry,
    pub walls: Vec<WallSegment>,
    pub ceiling: CeilingGeometry,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<RoomSection>,
    pub metadata: RoomMetadata,
}

impl RoomGeometry {
    /// Plain rectangular room with the four walls tagged by elevation.
    pub fn rectangle(room: &RoomDimensions) -> Self {
        let (w, d, h) = (room.width, room.depth, room.ceiling());
        let vertices: Vec<Point2D> = vec![[0.0, 0.0], [w, 0.0], [w, d], [0.0, d]];
        let wall = |id: &str, start: Point2D, end: Point2D, view: ElevationWall| WallSegment {
            id: id.to_string(),
            start,
            end,
            height: h,
            thickness: Some(10.0),
            kind: WallKind::Solid,
            material: None,
            elevation_view: Some(view.as_str().to_string()),
        };

        Self {
            shape_type: RoomShapeType::Rectangle,
            bounding_box: BoundingBox::from_vertices(&vertices),
            walls: vec![
                wall("wall_front", [0.0, 0.0], [w, 0.0], ElevationWall::Front),
                wall("wall_right", [w, 0.0], [w, d], ElevationWall::Right),
                wall("wall_back", [w, d], [0.0, d], ElevationWall::Back),
                wall("wall_left", [0.0, d], [0.0, 0.0], ElevationWall::Left),
            ],
            ceiling: CeilingGeometry {
                kind: CeilingKind::Flat,
                zones: vec![CeilingZone {
                    vertices: vertices.clone(),
                    height: h,
                    style: CeilingStyle::Flat,
                    slope: None,
                    apex_height: None,
                }],
            },
            sections: Vec::new(),
            metadata: RoomMetadata {
                total_floor_area: w * d,
                total_perimeter: Some(polygon_perimeter(&vertices)),
                ..Default::default()
            },
            floor: FloorGeometry {
                vertices,
                elevation: 0.0,
                material: None,
            },
        }
    }

    /// Bounding rectangle as simple dimensions, using the lowest ceiling zone.
    pub fn dimensions(&self) -> RoomDimensions {
        let dims = RoomDimensions::new(self.bounding_box.width(), self.bounding_box.depth());
        match self
            .ceiling
            .zones
            .iter()
            .map(|z| z.height)
            .min_by(f64::total_cmp)
        {
            Some(ceiling) => dims.with_ceiling(ceiling),
            None => dims,
        }
    }
}

// Plane helpers

/// Ray casting; points on an edge may land either side.
pub fn point_in_polygon([x, y]: Point2D, vertices: &[Point2D]) -> bool {
    let mut inside = false;
    let n = vertices.len();
    for i in 0..n {
        let [xi, yi] = vertices[i];
        let [xj, yj] = vertices[(i + n - 1) % n];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
    }
    inside
}

pub fn closest_point_on_segment([px, py]: Point2D, start: Point2D, end: Point2D) -> Point2D {
    let [x1, y1] = start;
    let (dx, dy) = (end[0] - x1, end[1] - y1);
    if dx == 0.0 && dy == 0.0 {
        return start;
    }
    let t = (((px - x1) * dx + (py - y1) * dy) / (dx * dx + dy * dy)).clamp(0.0, 1.0);
    [x1 + t * dx, y1 + t * dy]
}

pub fn point_to_segment_distance(point: Point2D, start: Point2D, end: Point2D) -> f64 {
    line_length(point, closest_point_on_segment(point, start, end))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestWall {
    pub wall_id: String,
    pub distance: f64,
    pub closest_point: Point2D,
}

pub fn nearest_wall(point: Point2D, walls: &[WallSegment]) -> Option<NearestWall> {
    walls
        .iter()
        .map(|wall| NearestWall {
            wall_id: wall.id.clone(),
            distance: point_to_segment_distance(point, wall.start, wall.end),
            closest_point: closest_point_on_segment(point, wall.start, wall.end),
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

/// Shoelace area in cm²
pub fn polygon_area(vertices: &[Point2D]) -> f64 {
    let n = vertices.len();
    let twice: f64 = (0..n)
        .map(|i| {
            let [x1, y1] = vertices[i];
            let [x2, y2] = vertices[(i + 1) % n];
            x1 * y2 - x2 * y1
        })
        .sum();
    twice.abs() / 2.0
}

/// Vertex average
pub fn polygon_centroid(vertices: &[Point2D]) -> Option<Point2D> {
    if vertices.is_empty() {
        return None;
    }
    let n = vertices.len() as f64;
    let (sx, sy) = vertices
        .iter()
        .fold((0.0_f64, 0.0_f64), |(sx, sy), [x, y]| (sx + x, sy + y));
    Some([sx / n, sy / n])
}

pub fn polygon_perimeter(vertices: &[Point2D]) -> f64 {
    let n = vertices.len();
    (0..n)
        .map(|i| line_length(vertices[i], vertices[(i + 1) % n]))
        .sum()
}

pub fn line_length(start: Point2D, end: Point2D) -> f64 {
    (end[0] - start[0]).hypot(end[1] - start[1])
}

/// Degrees from the +x axis
pub fn line_angle(start: Point2D, end: Point2D) -> f64 {
    (end[1] - start[1]).atan2(end[0] - start[0]).to_degrees()
}

fn rect_corners(rect: &PlanRect) -> [Point2D; 4] {
    [
        [rect.x, rect.y],
        [rect.x + rect.width, rect.y],
        [rect.x + rect.width, rect.y + rect.depth],
        [rect.x, rect.y + rect.depth],
    ]
}

pub fn rectangle_in_polygon(rect: &PlanRect, vertices: &[Point2D]) -> bool {
    rect_corners(rect).iter().all(|c| point_in_polygon(*c, vertices))
}

/// True when any rectangle corner is inside or any polygon vertex is inside the rectangle
pub fn rectangle_intersects_polygon(rect: &PlanRect, vertices: &[Point2D]) -> bool {
    if rect_corners(rect).iter().any(|c| point_in_polygon(*c, vertices)) {
        return true;
    }
    let bbox = BoundingBox {
        min_x: rect.x,
        min_y: rect.y,
        max_x: rect.x + rect.width,
        max_y: rect.y + rect.depth,
    };
    vertices.iter().any(|v| bbox.contains(*v))
}

// Walls and elevations

/// Elements whose origin lies within `tolerance` of the wall line.
pub fn elements_for_wall<'a>(
    wall_id: &str,
    elements: &'a [DesignElement],
    geometry: &RoomGeometry,
    tolerance: f64,
) -> Vec<&'a DesignElement> {
    let Some(wall) = geometry.walls.iter().find(|w| w.id == wall_id) else {
        warn!("Wall {} not found in room geometry", wall_id);
        return Vec::new();
    };
    elements
        .iter()
        .filter(|el| point_to_segment_distance([el.x, el.y], wall.start, wall.end) <= tolerance)
        .collect()
}

/// Both endpoints sit on the bounding box edges
pub fn is_wall_on_perimeter(wall: &WallSegment, bbox: &BoundingBox) -> bool {
    let on_edge = |[x, y]: Point2D| {
        (x - bbox.min_x).abs() < PERIMETER_TOLERANCE
            || (x - bbox.max_x).abs() < PERIMETER_TOLERANCE
            || (y - bbox.min_y).abs() < PERIMETER_TOLERANCE
            || (y - bbox.max_y).abs() < PERIMETER_TOLERANCE
    };
    on_edge(wall.start) && on_edge(wall.end)
}

/// `Wall 2 (300cm) - Perimeter`
pub fn wall_label(wall: &WallSegment, index: usize, bbox: &BoundingBox) -> String {
    let kind = if is_wall_on_perimeter(wall, bbox) {
        "Perimeter"
    } else {
        "Interior"
    };
    format!("Wall {} ({}cm) - {}", index + 1, wall.length().round(), kind)
}

pub fn walls_for_elevation_view<'a>(view: &str, geometry: &'a RoomGeometry) -> Vec<&'a WallSegment> {
    geometry
        .walls
        .iter()
        .filter(|w| w.elevation_view.as_deref() == Some(view))
        .collect()
}

/// Distinct elevation tags in wall order
pub fn available_elevation_views(geometry: &RoomGeometry) -> Vec<String> {
    let mut views: Vec<String> = Vec::new();
    for view in geometry.walls.iter().filter_map(|w| w.elevation_view.as_ref()) {
        if !views.contains(view) {
            views.push(view.clone());
        }
    }
    views
}

/// Elevation a wall faces, from its orientation and the side of the room it is on.
///
/// Mostly-horizontal walls are front or back, mostly-vertical ones left or right.
pub fn infer_elevation_view(wall: &WallSegment, bbox: &BoundingBox) -> ElevationWall {
    let (dx, dy) = (wall.end[0] - wall.start[0], wall.end[1] - wall.start[1]);
    let mid_x = (wall.start[0] + wall.end[0]) / 2.0;
    let mid_y = (wall.start[1] + wall.end[1]) / 2.0;

    if dx.abs() >= dy.abs() {
        if mid_y - bbox.min_y <= bbox.max_y - mid_y {
            ElevationWall::Front
        } else {
            ElevationWall::Back
        }
    } else if mid_x - bbox.min_x <= bbox.max_x - mid_x {
        ElevationWall::Left
    } else {
        ElevationWall::Right
    }
}

/// Stored elevation tag, or the inferred wall name when the tag is missing
pub fn wall_elevation_view(wall: &WallSegment, bbox: &BoundingBox) -> String {
    wall.elevation_view
        .clone()
        .unwrap_or_else(|| infer_elevation_view(wall, bbox).as_str().to_string())
}

// Validation

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometryValidation {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Default)]
struct Report {
    errors: Vec<String>,
    warnings: Vec<String>,
}

fn edges_cross(p1: Point2D, p2: Point2D, p3: Point2D, p4: Point2D) -> bool {
    let ccw = |a: Point2D, b: Point2D, c: Point2D| (c[1] - a[1]) * (b[0] - a[0]) > (b[1] - a[1]) * (c[0] - a[0]);
    ccw(p1, p3, p4) != ccw(p2, p3, p4) && ccw(p1, p2, p3) != ccw(p1, p2, p4)
}

fn has_self_intersection(vertices: &[Point2D]) -> bool {
    let n = vertices.len();
    for i in 0..n {
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            if edges_cross(vertices[i], vertices[(i + 1) % n], vertices[j], vertices[(j + 1) % n]) {
                return true;
            }
        }
    }
    false
}

fn check_polygon(vertices: &[Point2D], label: &str, report: &mut Report) {
    let n = vertices.len();
    if n < 3 {
        report
            .errors
            .push(format!("{}: Polygon must have at least 3 vertices (has {})", label, n));
        return;
    }
    if n > MAX_POLYGON_VERTICES {
        report
            .warnings
            .push(format!("{}: Polygon has {} vertices (>100 may impact performance)", label, n));
    }

    for i in 0..n {
        let next = (i + 1) % n;
        if vertices[i] == vertices[next] {
            report
                .warnings
                .push(format!("{}: Duplicate consecutive vertices at index {} and {}", label, i, next));
        }
        let edge = line_length(vertices[i], vertices[next]);
        if edge > 0.0 && edge < 1.0 {
            report.warnings.push(format!(
                "{}: Very small edge ({:.2}cm) between vertices {} and {}",
                label, edge, i, next
            ));
        }
    }

    if has_self_intersection(vertices) {
        report.errors.push(format!("{}: Polygon has self-intersecting edges", label));
    }
}

fn check_walls(walls: &[WallSegment], report: &mut Report) {
    if walls.len() < 3 {
        report
            .errors
            .push(format!("Must have at least 3 walls (has {})", walls.len()));
        return;
    }

    for wall in walls {
        if wall.height <= 0.0 {
            report
                .errors
                .push(format!("Wall {}: height must be positive (has {})", wall.id, wall.height));
        } else if wall.height > 500.0 {
            report
                .warnings
                .push(format!("Wall {}: height {}cm is unusually tall (>5m)", wall.id, wall.height));
        }
        if wall.length() < 1.0 {
            report
                .warnings
                .push(format!("Wall {}: very short wall ({:.2}cm)", wall.id, wall.length()));
        }
        match wall.thickness {
            Some(t) if t <= 0.0 => report.errors.push(format!("Wall {}: thickness must be positive", wall.id)),
            Some(t) if t > 50.0 => report
                .warnings
                .push(format!("Wall {}: unusually thick wall ({}cm)", wall.id, t)),
            _ => {}
        }
    }

    for (i, wall) in walls.iter().enumerate() {
        let next = &walls[(i + 1) % walls.len()];
        let gap = line_length(wall.end, next.start);
        if gap > CONNECTION_GAP {
            report.warnings.push(format!(
                "Wall {} end does not connect to wall {} start (gap: {:.2}cm)",
                wall.id, next.id, gap
            ));
        }
    }
}

fn check_ceiling(ceiling: &CeilingGeometry, report: &mut Report) {
    if ceiling.zones.is_empty() {
        report.errors.push("Ceiling must have at least one zone".to_string());
        return;
    }

    for (i, zone) in ceiling.zones.iter().enumerate() {
        if zone.vertices.len() < 3 {
            report
                .errors
                .push(format!("Ceiling zone {}: must have at least 3 vertices", i));
        }
        if zone.height <= 0.0 {
            report
                .errors
                .push(format!("Ceiling zone {}: height must be positive (has {})", i, zone.height));
        }
        if zone.height < 200.0 {
            report
                .warnings
                .push(format!("Ceiling zone {}: unusually low ceiling ({}cm < 2m)", i, zone.height));
        }
        if zone.height > 600.0 {
            report
                .warnings
                .push(format!("Ceiling zone {}: unusually high ceiling ({}cm > 6m)", i, zone.height));
        }

        if zone.style == CeilingStyle::Vaulted {
            match zone.apex_height {
                None => report
                    .warnings
                    .push(format!("Ceiling zone {}: vaulted ceiling missing apex_height", i)),
                Some(apex) if apex <= zone.height => report.warnings.push(format!(
                    "Ceiling zone {}: vaulted apex_height should be greater than base height",
                    i
                )),
                _ => {}
            }
        }
        if ceiling.kind == CeilingKind::Sloped {
            match zone.slope {
                None => report
                    .warnings
                    .push(format!("Ceiling zone {}: sloped ceiling missing slope angle", i)),
                Some(slope) if !(0.0..=45.0).contains(&slope) => report
                    .warnings
                    .push(format!("Ceiling zone {}: unusual slope angle ({}°)", i, slope)),
                _ => {}
            }
        }
    }
}

pub fn validate_room_geometry(geometry: &RoomGeometry) -> GeometryValidation {
    let mut report = Report::default();

    check_polygon(&geometry.floor.vertices, "floor", &mut report);
    check_walls(&geometry.walls, &mut report);
    check_ceiling(&geometry.ceiling, &mut report);

    let b = &geometry.bounding_box;
    for (i, [x, y]) in geometry.floor.vertices.iter().enumerate() {
        if *x < b.min_x - 0.1 || *x > b.max_x + 0.1 || *y < b.min_y - 0.1 || *y > b.max_y + 0.1 {
            report.errors.push(format!(
                "Vertex {} [{}, {}] is outside bounding box [{}, {}, {}, {}]",
                i, x, y, b.min_x, b.min_y, b.max_x, b.max_y
            ));
        }
    }

    let area = polygon_area(&geometry.floor.vertices);
    let stated = geometry.metadata.total_floor_area;
    let diff = (area - stated).abs();
    if diff > area * 0.01 {
        report.warnings.push(format!(
            "Metadata floor area ({:.0}cm²) differs from calculated area ({:.0}cm²) by {:.0}cm²",
            stated, area, diff
        ));
    }

    GeometryValidation {
        valid: report.errors.is_empty(),
        errors: report.errors,
        warnings: report.warnings,
    }
}
