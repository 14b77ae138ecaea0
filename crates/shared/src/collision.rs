//! Layer-aware collision detection for drag and drop placement.
//!
//! Two elements collide when their plan footprints overlap, their vertical
//! ranges overlap, and neither lists the other's layer in
//! `can_overlap_layers`. Rejected drops get a suggested position: a magnetic
//! snap to a neighbour of a compatible layer, else the first free spot on an
//! expanding ring search, else the position the drag started from.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::PlannerError;
use crate::{ComponentType, DesignElement, ElementId, PlanPoint};

pub const SNAP_THRESHOLD_CM: f64 = 10.0;
pub const MAX_SEARCH_RADIUS_CM: f64 = 100.0;
const SEARCH_STEP_CM: f64 = 10.0;
/// Search radii from settings are clamped to this
pub const SEARCH_RADIUS_LIMIT_CM: f64 = 1000.0;

/// Collision fields of a catalog entry (`component_3d_models` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentMetadata {
    pub component_id: String,
    #[serde(default)]
    pub component_name: String,
    #[serde(default = "other_type")]
    pub component_type: ComponentType,
    #[serde(default)]
    pub category: Option<String>,
    /// `base`, `wall`, `tall`, `worktop`, `pelmet`, `cornice`, ...
    #[serde(default)]
    pub layer_type: Option<String>,
    #[serde(default)]
    pub min_height_cm: Option<f64>,
    #[serde(default)]
    pub max_height_cm: Option<f64>,
    #[serde(default)]
    pub can_overlap_layers: Option<Vec<String>>,
}

fn other_type() -> ComponentType {
    ComponentType::Other
}

impl ComponentMetadata {
    pub fn can_overlap(&self, layer: &str) -> bool {
        self.can_overlap_layers
            .as_ref()
            .is_some_and(|layers| layers.iter().any(|l| l == layer))
    }
}

/// In-memory catalog of collision metadata keyed by component id
#[derive(Debug, Clone, Default)]
pub struct ComponentCatalog {
    entries: HashMap<String, ComponentMetadata>,
}

impl ComponentCatalog {
    pub fn new(entries: Vec<ComponentMetadata>) -> Result<Self, PlannerError> {
        let mut map = HashMap::with_capacity(entries.len());
        for entry in entries {
            if map.contains_key(&entry.component_id) {
                return Err(PlannerError::DuplicateComponent(entry.component_id));
            }
            map.insert(entry.component_id.clone(), entry);
        }
        Ok(Self { entries: map })
    }

    pub fn from_json_str(json: &str) -> Result<Self, PlannerError> {
        Self::new(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PlannerError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookup by id. Directional variants (`-ns`, `-ew`) share the base entry.
    pub fn get(&self, component_id: &str) -> Option<&ComponentMetadata> {
        self.entries.get(component_id).or_else(|| {
            let base = component_id
                .strip_suffix("-ns")
                .or_else(|| component_id.strip_suffix("-ew"))?;
            let found = self.entries.get(base);
            if found.is_some() {
                debug!("Using metadata of '{}' for variant '{}'", base, component_id);
            }
            found
        })
    }

    fn for_element(&self, element: &DesignElement) -> Option<&ComponentMetadata> {
        if element.component_id.is_empty() {
            self.get(&element.id)
        } else {
            self.get(&element.component_id)
        }
    }

    pub fn by_layer(&self, layer: &str) -> Vec<&ComponentMetadata> {
        let mut found: Vec<_> = self
            .entries
            .values()
            .filter(|m| m.layer_type.as_deref() == Some(layer))
            .collect();
        found.sort_by(|a, b| a.component_id.cmp(&b.component_id));
        found
    }

    /// Layer whitelist check for two catalog ids; unknown ids may overlap.
    pub fn can_components_overlap(&self, first: &str, second: &str) -> bool {
        match (self.get(first), self.get(second)) {
            (Some(a), Some(b)) => layers_may_overlap(a, b),
            _ => {
                warn!("Missing metadata for overlap check: {} or {}", first, second);
                true
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionOptions {
    pub snap_threshold_cm: f64,
    pub max_search_radius_cm: f64,
}

impl Default for CollisionOptions {
    fn default() -> Self {
        Self {
            snap_threshold_cm: SNAP_THRESHOLD_CM,
            max_search_radius_cm: MAX_SEARCH_RADIUS_CM,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollisionResult {
    pub is_valid: bool,
    pub colliding_ids: Vec<ElementId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_position: Option<PlanPoint>,
}

impl CollisionResult {
    fn valid() -> Self {
        Self {
            is_valid: true,
            ..Default::default()
        }
    }
}

fn footprints_overlap(a: &DesignElement, b: &DesignElement) -> bool {
    let a = a.plan_rect();
    let b = b.plan_rect();
    a.x < b.x + b.width && a.x + a.width > b.x && a.y < b.y + b.depth && a.y + a.depth > b.y
}

/// Catalog height band, with the element's own extent filling missing bounds.
///
/// The web planner read a missing bound as 0cm (min) or 300cm (max); here
/// it comes from the element's `z..z+height` instead.
fn vertical_range(meta: &ComponentMetadata, element: &DesignElement) -> (f64, f64) {
    let (z_min, z_max) = element.vertical_range();
    (meta.min_height_cm.unwrap_or(z_min), meta.max_height_cm.unwrap_or(z_max))
}

fn ranges_overlap((min1, max1): (f64, f64), (min2, max2): (f64, f64)) -> bool {
    min1 < max2 && max1 > min2
}

fn layers_may_overlap(a: &ComponentMetadata, b: &ComponentMetadata) -> bool {
    match (a.layer_type.as_deref(), b.layer_type.as_deref()) {
        (Some(la), Some(lb)) => a.can_overlap(lb) || b.can_overlap(la),
        _ => true,
    }
}

struct Collisions {
    ids: Vec<ElementId>,
    reason: Option<String>,
}

fn find_collisions(
    element: &DesignElement,
    meta: &ComponentMetadata,
    existing: &[DesignElement],
    catalog: &ComponentCatalog,
) -> Collisions {
    let mut ids = Vec::new();
    let mut reason = None;
    let range = vertical_range(meta, element);

    for other in existing {
        if other.id == element.id {
            continue;
        }
        let Some(other_meta) = catalog.for_element(other) else {
            continue;
        };
        if !footprints_overlap(element, other)
            || !ranges_overlap(range, vertical_range(other_meta, other))
            || layers_may_overlap(meta, other_meta)
        {
            continue;
        }

        ids.push(other.id.clone());
        reason.get_or_insert_with(|| {
            format!(
                "{} cannot overlap {}",
                meta.layer_type.as_deref().unwrap_or("Component"),
                other_meta.layer_type.as_deref().unwrap_or("component"),
            )
        });
    }

    Collisions { ids, reason }
}

/// Placement check that never suggests; used to test candidate spots.
fn is_clear(
    element: &DesignElement,
    meta: &ComponentMetadata,
    existing: &[DesignElement],
    catalog: &ComponentCatalog,
) -> bool {
    find_collisions(element, meta, existing, catalog).ids.is_empty()
}

fn snaps_to(layer: Option<&str>, target: Option<&str>) -> bool {
    matches!(
        (layer, target),
        (Some("wall"), Some("wall"))
            | (Some("base"), Some("base"))
            | (Some("tall"), Some("base" | "wall"))
    )
}

/// Closest free edge-to-edge position against a compatible neighbour
fn magnetic_snap(
    element: &DesignElement,
    meta: &ComponentMetadata,
    existing: &[DesignElement],
    catalog: &ComponentCatalog,
    threshold: f64,
) -> Option<PlanPoint> {
    let proposed = element.position();
    let own = element.plan_rect();
    // candidates are worked out on the drawn rectangle, then shifted back to the anchor
    let (ox, oy) = (own.x - element.x, own.y - element.y);
    let mut best: Option<(f64, PlanPoint)> = None;

    let targets = existing.iter().filter(|other| {
        other.id != element.id
            && catalog
                .for_element(other)
                .is_some_and(|m| snaps_to(meta.layer_type.as_deref(), m.layer_type.as_deref()))
    });

    for target in targets {
        let t = target.plan_rect();
        let candidates = [
            PlanPoint::new(t.x - own.width - ox, t.y - oy),
            PlanPoint::new(t.x + t.width - ox, t.y - oy),
            PlanPoint::new(t.x - ox, t.y - own.depth - oy),
            PlanPoint::new(t.x - ox, t.y + t.depth - oy),
        ];

        for candidate in candidates {
            let distance = candidate.distance_to(&proposed);
            if distance > threshold || best.is_some_and(|(d, _)| distance >= d) {
                continue;
            }
            if is_clear(&element.moved_to(candidate), meta, existing, catalog) {
                best = Some((distance, candidate));
            }
        }
    }

    best.map(|(_, point)| point)
}

/// First free position on rings of growing radius, clockwise from north
fn ring_search(
    element: &DesignElement,
    meta: &ComponentMetadata,
    existing: &[DesignElement],
    catalog: &ComponentCatalog,
    max_radius: f64,
) -> Option<PlanPoint> {
    const DIRECTIONS: [(f64, f64); 8] = [
        (0.0, -1.0),
        (1.0, -1.0),
        (1.0, 0.0),
        (1.0, 1.0),
        (0.0, 1.0),
        (-1.0, 1.0),
        (-1.0, 0.0),
        (-1.0, -1.0),
    ];

    // NaN casts to zero rings
    let rings = (max_radius.clamp(0.0, SEARCH_RADIUS_LIMIT_CM) / SEARCH_STEP_CM).floor() as u32;
    (1..=rings).find_map(|ring| {
        let radius = f64::from(ring) * SEARCH_STEP_CM;
        DIRECTIONS.iter().find_map(|(dx, dy)| {
            let candidate = PlanPoint::new(element.x + dx * radius, element.y + dy * radius);
            is_clear(&element.moved_to(candidate), meta, existing, catalog).then_some(candidate)
        })
    })
}

pub fn validate_placement(
    element: &DesignElement,
    existing: &[DesignElement],
    catalog: &ComponentCatalog,
    original_position: Option<PlanPoint>,
) -> CollisionResult {
    validate_placement_with(element, existing, catalog, original_position, &CollisionOptions::default())
}

/// Accept or reject a drop of `element` among `existing`.
///
/// Elements without catalog metadata are always accepted, and existing
/// elements without metadata are ignored.
pub fn validate_placement_with(
    element: &DesignElement,
    existing: &[DesignElement],
    catalog: &ComponentCatalog,
    original_position: Option<PlanPoint>,
    options: &CollisionOptions,
) -> CollisionResult {
    let Some(meta) = catalog.for_element(element) else {
        warn!("No collision metadata for component: {}", element.component_id);
        return CollisionResult::valid();
    };

    let Collisions { ids, reason } = find_collisions(element, meta, existing, catalog);
    if ids.is_empty() {
        return CollisionResult::valid();
    }

    let suggested_position = magnetic_snap(element, meta, existing, catalog, options.snap_threshold_cm)
        .inspect(|p| debug!("Snapped '{}' to ({}, {})", element.id, p.x, p.y))
        .or_else(|| ring_search(element, meta, existing, catalog, options.max_search_radius_cm))
        .or(original_position);

    CollisionResult {
        is_valid: false,
        colliding_ids: ids,
        reason,
        suggested_position,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;

    #[test]
    fn test_catalog_rejects_duplicates() {
        let err = ComponentCatalog::new(vec![
            base_metadata("base-cabinet-60"),
            base_metadata("base-cabinet-60"),
        ])
        .unwrap_err();
        assert!(matches!(err, PlannerError::DuplicateComponent(id) if id == "base-cabinet-60"));
    }

    #[test]
    fn test_directional_variant_lookup() {
        let catalog = metadata_catalog();
        assert!(catalog.get("base-cabinet-60-ns").is_some());
        assert!(catalog.get("base-cabinet-60-ew").is_some());
        assert!(catalog.get("base-cabinet-60-xy").is_none());
        assert_eq!(catalog.by_layer("wall").len(), 1);
    }

    #[test]
    fn test_catalog_from_json_accepts_nulls() {
        let json = r#"[{ "component_id": "pelmet-60", "component_type": "pelmet",
            "layer_type": null, "min_height_cm": null, "max_height_cm": null,
            "can_overlap_layers": null }]"#;
        let catalog = ComponentCatalog::from_json_str(json).unwrap();
        let meta = catalog.get("pelmet-60").unwrap();
        assert_eq!(meta.component_type, ComponentType::Pelmet);
        assert!(!meta.can_overlap("wall"));
    }

    #[test]
    fn test_no_metadata_is_permissive() {
        let catalog = metadata_catalog();
        let mut el = base_cabinet("new", 0.0, 0.0);
        el.component_id = "mystery-unit".into();
        let result = validate_placement(&el, &[base_cabinet("a", 0.0, 0.0)], &catalog, None);
        assert!(result.is_valid);
        assert!(result.colliding_ids.is_empty());
    }

    #[test]
    fn test_existing_without_metadata_is_ignored() {
        let catalog = metadata_catalog();
        let mut other = base_cabinet("a", 0.0, 0.0);
        other.component_id = "mystery-unit".into();
        let result = validate_placement(&base_cabinet("new", 0.0, 0.0), &[other], &catalog, None);
        assert!(result.is_valid);
    }

    #[test]
    fn test_self_is_skipped() {
        let catalog = metadata_catalog();
        let el = base_cabinet("a", 0.0, 0.0);
        assert!(validate_placement(&el, &[el.clone()], &catalog, None).is_valid);
    }

    #[test]
    fn test_stacked_layers_do_not_collide() {
        let catalog = metadata_catalog();
        let result = validate_placement(
            &wall_cabinet("w", 0.0, 0.0),
            &[base_cabinet("b", 0.0, 0.0)],
            &catalog,
            None,
        );
        assert!(result.is_valid);
    }

    #[test]
    fn test_whitelisted_layer_may_overlap() {
        let catalog = metadata_catalog();
        // cornice band reaches into the wall cabinet band but lists "wall"
        let result = validate_placement(
            &cornice("c", 0.0, 0.0),
            &[wall_cabinet("w", 0.0, 0.0)],
            &catalog,
            None,
        );
        assert!(result.is_valid);

        let mut strict = metadata_catalog_entries();
        for m in strict.iter_mut() {
            m.can_overlap_layers = None;
        }
        let strict = ComponentCatalog::new(strict).unwrap();
        let result = validate_placement(&cornice("c", 0.0, 0.0), &[wall_cabinet("w", 0.0, 0.0)], &strict, None);
        assert!(!result.is_valid);
        assert_eq!(result.reason.as_deref(), Some("cornice cannot overlap wall"));
    }

    #[test]
    fn test_collision_snaps_to_neighbour() {
        let catalog = metadata_catalog();
        let existing = vec![base_cabinet("a", 0.0, 0.0)];
        let result = validate_placement(&base_cabinet("new", 55.0, 0.0), &existing, &catalog, None);
        assert!(!result.is_valid);
        assert_eq!(result.colliding_ids, vec!["a".to_string()]);
        assert_eq!(result.reason.as_deref(), Some("base cannot overlap base"));
        assert_eq!(result.suggested_position, Some(PlanPoint::new(60.0, 0.0)));
    }

    #[test]
    fn test_ring_search_when_no_snap_in_range() {
        let catalog = metadata_catalog();
        let existing = vec![base_cabinet("a", 0.0, 0.0)];
        let result = validate_placement(&base_cabinet("new", 30.0, 0.0), &existing, &catalog, None);
        assert!(!result.is_valid);
        // rings of 10 and 20 still overlap; north-east at 30 clears
        assert_eq!(result.suggested_position, Some(PlanPoint::new(60.0, -30.0)));
    }

    #[test]
    fn test_falls_back_to_original_position() {
        let catalog = metadata_catalog();
        let existing = vec![base_cabinet("a", 0.0, 0.0)];
        let options = CollisionOptions {
            snap_threshold_cm: 10.0,
            max_search_radius_cm: 5.0,
        };
        let original = PlanPoint::new(200.0, 200.0);
        let result = validate_placement_with(
            &base_cabinet("new", 30.0, 0.0),
            &existing,
            &catalog,
            Some(original),
            &options,
        );
        assert_eq!(result.suggested_position, Some(original));
    }

    #[test]
    fn test_search_radius_is_clamped() {
        let catalog = metadata_catalog();
        let mut slab = base_cabinet("slab", -50_000.0, -50_000.0);
        slab.width = 100_000.0;
        slab.depth = 100_000.0;
        let original = PlanPoint::new(0.0, 0.0);
        for radius in [f64::MAX, f64::INFINITY, f64::NAN] {
            let options = CollisionOptions {
                snap_threshold_cm: 10.0,
                max_search_radius_cm: radius,
            };
            let result = validate_placement_with(
                &base_cabinet("new", 30.0, 0.0),
                &[slab.clone()],
                &catalog,
                Some(original),
                &options,
            );
            assert!(!result.is_valid);
            assert_eq!(result.suggested_position, Some(original));
        }
    }

    #[test]
    fn test_rotation_changes_footprint() {
        let catalog = metadata_catalog();
        let existing = vec![base_cabinet("a", 0.0, 0.0)];
        let mut panel = base_cabinet("p", 65.0, 0.0);
        panel.width = 100.0;
        panel.depth = 20.0;
        panel.x = 45.0;
        assert!(!validate_placement(&panel, &existing, &catalog, None).is_valid);

        panel.x = 65.0;
        panel.rotation = 90.0;
        assert!(validate_placement(&panel, &existing, &catalog, None).is_valid);
    }

    #[test]
    fn test_turned_element_collides_where_it_is_drawn() {
        let catalog = metadata_catalog();
        let mut panel = base_cabinet("p", 0.0, 0.0);
        panel.width = 100.0;
        panel.depth = 20.0;
        panel.rotation = 90.0;
        let existing = vec![panel];

        // drawn rectangle is x 40..60, y -40..60
        let mut unit = base_cabinet("u", 40.0, -30.0);
        unit.width = 20.0;
        unit.depth = 20.0;
        let result = validate_placement(&unit, &existing, &catalog, None);
        assert!(!result.is_valid);
        assert_eq!(result.colliding_ids, vec!["p".to_string()]);

        unit.x = 0.0;
        unit.y = 70.0;
        assert!(validate_placement(&unit, &existing, &catalog, None).is_valid);
    }

    #[test]
    fn test_snap_beside_turned_neighbour() {
        let catalog = metadata_catalog();
        let mut panel = base_cabinet("p", 0.0, 0.0);
        panel.width = 100.0;
        panel.depth = 20.0;
        panel.rotation = 90.0;

        let mut unit = base_cabinet("u", 58.0, -38.0);
        unit.width = 20.0;
        unit.depth = 20.0;
        let result = validate_placement(&unit, &[panel], &catalog, None);
        assert!(!result.is_valid);
        assert_eq!(result.suggested_position, Some(PlanPoint::new(60.0, -40.0)));
    }

    #[test]
    fn test_undefined_layer_is_permissive() {
        let mut entries = metadata_catalog_entries();
        for m in entries.iter_mut() {
            m.layer_type = None;
        }
        let catalog = ComponentCatalog::new(entries).unwrap();
        let result = validate_placement(
            &base_cabinet("new", 0.0, 0.0),
            &[base_cabinet("a", 0.0, 0.0)],
            &catalog,
            None,
        );
        assert!(result.is_valid);
        assert!(catalog.can_components_overlap("base-cabinet-60", "wall-cabinet-60"));
    }

    #[test]
    fn test_missing_height_band_uses_element_extent() {
        let mut entries = metadata_catalog_entries();
        for m in entries.iter_mut() {
            m.min_height_cm = None;
            m.max_height_cm = None;
        }
        let catalog = ComponentCatalog::new(entries).unwrap();
        let mut low = base_cabinet("low", 0.0, 0.0);
        low.height = 40.0;
        let mut high = base_cabinet("high", 0.0, 0.0);
        high.z = Some(50.0);
        high.height = 40.0;
        assert!(validate_placement(&high, &[low.clone()], &catalog, None).is_valid);

        high.z = Some(30.0);
        assert!(!validate_placement(&high, &[low], &catalog, None).is_valid);
    }

    #[test]
    fn test_tall_units_snap_to_base_and_wall() {
        assert!(snaps_to(Some("tall"), Some("base")));
        assert!(snaps_to(Some("tall"), Some("wall")));
        assert!(!snaps_to(Some("base"), Some("wall")));
        assert!(!snaps_to(None, Some("base")));
    }
}
