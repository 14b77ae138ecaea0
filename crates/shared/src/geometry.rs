//! Formula-driven 3D part assembly.
//!
//! The catalog stores each 3D model as a list of parts whose positions and
//! sizes are formulas over the element's dimensions. [`GeometryBuilder`]
//! evaluates them into renderer-agnostic primitives.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::FormulaError;
use crate::formula::{evaluate_condition, standard_variables, Formula, FormulaEvaluator, VariableOptions, Variables};

const DEFAULT_COLOR: &str = "#8B7355";
const DEFAULT_DIMENSION: f64 = 0.1;

/// One row of the `geometry_parts` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryPart {
    pub part_name: String,
    pub part_type: String,
    #[serde(default)]
    pub render_order: i32,
    #[serde(default)]
    pub position_x: Option<Formula>,
    #[serde(default)]
    pub position_y: Option<Formula>,
    #[serde(default)]
    pub position_z: Option<Formula>,
    #[serde(default)]
    pub dimension_width: Option<Formula>,
    #[serde(default)]
    pub dimension_height: Option<Formula>,
    #[serde(default)]
    pub dimension_depth: Option<Formula>,
    #[serde(default)]
    pub material_name: Option<String>,
    #[serde(default)]
    pub color_override: Option<String>,
    #[serde(default)]
    pub metalness: Option<f64>,
    #[serde(default)]
    pub roughness: Option<f64>,
    #[serde(default)]
    pub opacity: Option<f64>,
    #[serde(default)]
    pub render_condition: Option<String>,
}

/// One row of the `material_definitions` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialDefinition {
    pub material_name: String,
    #[serde(default = "default_material_type")]
    pub material_type: String,
    #[serde(default)]
    pub default_color: Option<String>,
    #[serde(default)]
    pub roughness: Option<f64>,
    #[serde(default)]
    pub metalness: Option<f64>,
    #[serde(default)]
    pub opacity: Option<f64>,
}

fn default_material_type() -> String {
    "standard".to_string()
}

/// Element state the formulas are evaluated against (dimensions in cm)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildContext {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    pub is_selected: bool,
    pub is_wall_cabinet: bool,
    /// metres
    pub leg_length: Option<f64>,
    /// metres
    pub corner_depth: Option<f64>,
    pub custom_variables: Variables,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Primitive {
    Box { width: f64, height: f64, depth: f64 },
    Cylinder { radius: f64, height: f64, radial_segments: u32 },
    Sphere { radius: f64, width_segments: u32, height_segments: u32 },
}

impl Primitive {
    fn from_part_type(part_type: &str, size: Vec3) -> Option<Self> {
        match part_type.to_lowercase().as_str() {
            "box" => Some(Primitive::Box {
                width: size.x,
                height: size.y,
                depth: size.z,
            }),
            // width = radius, height = height, depth = segment count
            "cylinder" => Some(Primitive::Cylinder {
                radius: size.x,
                height: size.y,
                radial_segments: segments(size.z, 8),
            }),
            // width = radius, height/depth = segment counts
            "sphere" => Some(Primitive::Sphere {
                radius: size.x,
                width_segments: segments(size.y, 8),
                height_segments: segments(size.z, 6),
            }),
            _ => None,
        }
    }

    /// Half extents around the centre
    fn half_extents(&self) -> Vec3 {
        match *self {
            Primitive::Box { width, height, depth } => Vec3::new(width / 2.0, height / 2.0, depth / 2.0),
            Primitive::Cylinder { radius, height, .. } => Vec3::new(radius, height / 2.0, radius),
            Primitive::Sphere { radius, .. } => Vec3::new(radius, radius, radius),
        }
    }
}

fn segments(value: f64, min: u32) -> u32 {
    let floor = value.floor();
    if floor.is_finite() && floor > min as f64 {
        floor as u32
    } else {
        min
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialKind {
    Standard,
    Lambert,
    Phong,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMaterial {
    pub kind: MaterialKind,
    pub color: String,
    pub roughness: f64,
    pub metalness: f64,
    pub opacity: f64,
    pub transparent: bool,
    /// Phong shininess, derived from roughness
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shininess: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuiltPart {
    pub name: String,
    pub primitive: Primitive,
    pub position: Vec3,
    pub material: ResolvedMaterial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedPart {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuiltModel {
    pub parts: Vec<BuiltPart>,
    /// Parts dropped by a false render condition
    pub hidden: Vec<String>,
    /// Parts that failed to evaluate or had an unknown type
    pub skipped: Vec<SkippedPart>,
}

impl BuiltModel {
    /// Axis-aligned bounds `(min, max)` of all parts, `None` when empty
    pub fn bounding_box(&self) -> Option<(Vec3, Vec3)> {
        let mut parts = self.parts.iter();
        let first = parts.next()?;
        let extent = |p: &BuiltPart| {
            let h = p.primitive.half_extents();
            (
                Vec3::new(p.position.x - h.x, p.position.y - h.y, p.position.z - h.z),
                Vec3::new(p.position.x + h.x, p.position.y + h.y, p.position.z + h.z),
            )
        };
        let (mut min, mut max) = extent(first);
        for part in parts {
            let (lo, hi) = extent(part);
            min = Vec3::new(min.x.min(lo.x), min.y.min(lo.y), min.z.min(lo.z));
            max = Vec3::new(max.x.max(hi.x), max.y.max(hi.y), max.z.max(hi.z));
        }
        Some((min, max))
    }
}

pub struct GeometryBuilder {
    parts: Vec<GeometryPart>,
    materials: HashMap<String, MaterialDefinition>,
}

impl GeometryBuilder {
    pub fn new(mut parts: Vec<GeometryPart>, materials: Vec<MaterialDefinition>) -> Self {
        parts.sort_by_key(|p| p.render_order);
        let materials = materials
            .into_iter()
            .map(|m| (m.material_name.clone(), m))
            .collect();
        Self { parts, materials }
    }

    pub fn variables(context: &BuildContext) -> Variables {
        let options = VariableOptions {
            leg_length: context.leg_length,
            corner_depth: context.corner_depth,
            is_wall_cabinet: context.is_wall_cabinet,
            ..Default::default()
        };
        let mut vars = standard_variables(context.width, context.height, Some(context.depth), &options);
        vars.extend(context.custom_variables.iter().map(|(k, v)| (k.clone(), *v)));
        vars.insert("isSelected".into(), if context.is_selected { 1.0 } else { 0.0 });
        vars
    }

    pub fn build(&self, context: &BuildContext) -> BuiltModel {
        let variables = Self::variables(context);
        let evaluator = FormulaEvaluator::new(variables.clone());
        let mut model = BuiltModel::default();

        for part in &self.parts {
            if let Some(condition) = part.render_condition.as_deref() {
                if !evaluate_condition(condition, &variables) {
                    debug!("Skipping part {} due to condition: {}", part.part_name, condition);
                    model.hidden.push(part.part_name.clone());
                    continue;
                }
            }

            match self.build_part(part, &evaluator, context) {
                Ok(Some(built)) => model.parts.push(built),
                Ok(None) => {
                    warn!("Unsupported geometry type '{}' for part {}", part.part_type, part.part_name);
                    model.skipped.push(SkippedPart {
                        name: part.part_name.clone(),
                        reason: format!("Unsupported geometry type: {}", part.part_type),
                    });
                }
                Err(e) => {
                    warn!("Error building part {}: {}", part.part_name, e);
                    model.skipped.push(SkippedPart {
                        name: part.part_name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        debug!("Built {} geometry parts", model.parts.len());
        model
    }

    fn build_part(
        &self,
        part: &GeometryPart,
        evaluator: &FormulaEvaluator,
        context: &BuildContext,
    ) -> Result<Option<BuiltPart>, FormulaError> {
        let eval = |f: &Option<Formula>, default: f64| match f {
            Some(formula) => evaluator.evaluate(formula),
            None => Ok(default),
        };

        let position = Vec3::new(
            eval(&part.position_x, 0.0)?,
            eval(&part.position_y, 0.0)?,
            eval(&part.position_z, 0.0)?,
        );
        let size = Vec3::new(
            eval(&part.dimension_width, DEFAULT_DIMENSION)?,
            eval(&part.dimension_height, DEFAULT_DIMENSION)?,
            eval(&part.dimension_depth, DEFAULT_DIMENSION)?,
        );

        let Some(primitive) = Primitive::from_part_type(&part.part_type, size) else {
            return Ok(None);
        };

        Ok(Some(BuiltPart {
            name: part.part_name.clone(),
            primitive,
            position,
            material: self.resolve_material(part, context),
        }))
    }

    fn resolve_material(&self, part: &GeometryPart, context: &BuildContext) -> ResolvedMaterial {
        let definition = part
            .material_name
            .as_deref()
            .and_then(|name| self.materials.get(name));

        let color = match (&part.color_override, definition.and_then(|d| d.default_color.as_ref())) {
            (Some(color_override), _) => resolve_color_override(color_override, context.is_selected),
            (None, Some(color)) => color.clone(),
            (None, None) => DEFAULT_COLOR.to_string(),
        };

        let roughness = part.roughness.or(definition.and_then(|d| d.roughness)).unwrap_or(0.7);
        let metalness = part.metalness.or(definition.and_then(|d| d.metalness)).unwrap_or(0.1);
        let opacity = part.opacity.or(definition.and_then(|d| d.opacity)).unwrap_or(1.0);

        let kind = match definition.map(|d| d.material_type.to_lowercase()).as_deref() {
            Some("lambert") => MaterialKind::Lambert,
            Some("phong") => MaterialKind::Phong,
            _ => MaterialKind::Standard,
        };

        ResolvedMaterial {
            kind,
            color,
            roughness,
            metalness,
            opacity,
            transparent: opacity < 1.0,
            shininess: (kind == MaterialKind::Phong).then(|| (1.0 - roughness) * 100.0),
        }
    }
}

/// Map a named colour slot (`selectedColor`, `doorColor`, ...) or a hex literal to a colour.
pub fn resolve_color_override(color_override: &str, is_selected: bool) -> String {
    let color = match color_override.to_lowercase().as_str() {
        "selectedcolor" if is_selected => "#FFD700",
        "selectedcolor" | "cabinetmaterial" => DEFAULT_COLOR,
        "doorcolor" => "#654321",
        "handlecolor" => "#C0C0C0",
        "plinthcolor" => "#5a4a3a",
        "worktopcolor" => "#E8E8E8",
        _ if color_override.starts_with('#') => color_override,
        _ => DEFAULT_COLOR,
    };
    color.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(name: &str, part_type: &str) -> GeometryPart {
        GeometryPart {
            part_name: name.to_string(),
            part_type: part_type.to_string(),
            render_order: 0,
            position_x: None,
            position_y: None,
            position_z: None,
            dimension_width: None,
            dimension_height: None,
            dimension_depth: None,
            material_name: None,
            color_override: None,
            metalness: None,
            roughness: None,
            opacity: None,
            render_condition: None,
        }
    }

    fn base_context() -> BuildContext {
        BuildContext {
            width: 60.0,
            height: 90.0,
            depth: 60.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_box_part_from_formulas() {
        let mut plinth = part("plinth", "box");
        plinth.position_y = Some("plinthHeight/2".into());
        plinth.dimension_width = Some("width".into());
        plinth.dimension_height = Some("plinthHeight".into());
        plinth.dimension_depth = Some("depth - 0.05".into());
        plinth.color_override = Some("plinthColor".into());

        let model = GeometryBuilder::new(vec![plinth], vec![]).build(&base_context());
        assert_eq!(model.parts.len(), 1);
        let built = &model.parts[0];
        assert!((built.position.y - 0.05).abs() < 1e-9);
        match built.primitive {
            Primitive::Box { width, height, depth } => {
                assert!((width - 0.6).abs() < 1e-9);
                assert!((height - 0.1).abs() < 1e-9);
                assert!((depth - 0.55).abs() < 1e-9);
            }
            other => panic!("expected box, got {:?}", other),
        }
        assert_eq!(built.material.color, "#5a4a3a");
        assert_eq!(built.material.kind, MaterialKind::Standard);
    }

    #[test]
    fn test_defaults_for_missing_formulas() {
        let model = GeometryBuilder::new(vec![part("p", "box")], vec![]).build(&base_context());
        let built = &model.parts[0];
        assert_eq!(built.position, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(built.primitive, Primitive::Box { width: 0.1, height: 0.1, depth: 0.1 });
        assert_eq!(built.material.color, DEFAULT_COLOR);
        assert_eq!(built.material.roughness, 0.7);
        assert_eq!(built.material.metalness, 0.1);
        assert!(!built.material.transparent);
    }

    #[test]
    fn test_render_condition_hides_part() {
        let mut plinth = part("plinth", "box");
        plinth.render_condition = Some("!isWallCabinet".into());
        let builder = GeometryBuilder::new(vec![plinth], vec![]);

        assert_eq!(builder.build(&base_context()).parts.len(), 1);

        let wall = BuildContext {
            is_wall_cabinet: true,
            ..base_context()
        };
        let model = builder.build(&wall);
        assert!(model.parts.is_empty());
        assert_eq!(model.hidden, vec!["plinth".to_string()]);
    }

    #[test]
    fn test_failing_part_is_skipped() {
        let mut bad = part("bad", "box");
        bad.dimension_width = Some("nope * 2".into());
        let good = part("good", "box");
        let model = GeometryBuilder::new(vec![bad, good], vec![]).build(&base_context());
        assert_eq!(model.parts.len(), 1);
        assert_eq!(model.parts[0].name, "good");
        assert_eq!(model.skipped.len(), 1);
        assert_eq!(model.skipped[0].name, "bad");
    }

    #[test]
    fn test_unknown_part_type_is_skipped() {
        let model = GeometryBuilder::new(vec![part("torus", "torus")], vec![]).build(&base_context());
        assert!(model.parts.is_empty());
        assert_eq!(model.skipped.len(), 1);
    }

    #[test]
    fn test_cylinder_and_sphere_segments() {
        let mut handle = part("handle", "Cylinder");
        handle.dimension_width = Some(Formula::Number(0.01));
        handle.dimension_height = Some(Formula::Number(0.12));
        handle.dimension_depth = Some(Formula::Number(3.0));
        let mut knob = part("knob", "sphere");
        knob.dimension_height = Some(Formula::Number(16.7));
        let model = GeometryBuilder::new(vec![handle, knob], vec![]).build(&base_context());

        assert_eq!(
            model.parts[0].primitive,
            Primitive::Cylinder { radius: 0.01, height: 0.12, radial_segments: 8 }
        );
        assert_eq!(
            model.parts[1].primitive,
            Primitive::Sphere { radius: 0.1, width_segments: 16, height_segments: 6 }
        );
    }

    #[test]
    fn test_material_precedence() {
        let material = MaterialDefinition {
            material_name: "oak".into(),
            material_type: "phong".into(),
            default_color: Some("#AA8844".into()),
            roughness: Some(0.5),
            metalness: None,
            opacity: Some(0.8),
        };
        let mut door = part("door", "box");
        door.material_name = Some("oak".into());
        door.roughness = Some(0.2);

        let model = GeometryBuilder::new(vec![door], vec![material]).build(&base_context());
        let m = &model.parts[0].material;
        assert_eq!(m.kind, MaterialKind::Phong);
        assert_eq!(m.color, "#AA8844");
        assert_eq!(m.roughness, 0.2);
        assert_eq!(m.metalness, 0.1);
        assert_eq!(m.opacity, 0.8);
        assert!(m.transparent);
        assert!((m.shininess.unwrap() - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_color_overrides() {
        assert_eq!(resolve_color_override("selectedColor", true), "#FFD700");
        assert_eq!(resolve_color_override("selectedColor", false), "#8B7355");
        assert_eq!(resolve_color_override("doorColor", false), "#654321");
        assert_eq!(resolve_color_override("#123456", false), "#123456");
        assert_eq!(resolve_color_override("mystery", false), "#8B7355");
    }

    #[test]
    fn test_parts_follow_render_order() {
        let mut a = part("a", "box");
        a.render_order = 2;
        let mut b = part("b", "box");
        b.render_order = 1;
        let model = GeometryBuilder::new(vec![a, b], vec![]).build(&base_context());
        let names: Vec<_> = model.parts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_bounding_box() {
        let mut top = part("top", "box");
        top.position_y = Some(Formula::Number(1.0));
        let model = GeometryBuilder::new(vec![part("p", "box"), top], vec![]).build(&base_context());
        let (min, max) = model.bounding_box().unwrap();
        assert!((min.y + 0.05).abs() < 1e-9);
        assert!((max.y - 1.05).abs() < 1e-9);
        assert!(BuiltModel::default().bounding_box().is_none());
    }
}
