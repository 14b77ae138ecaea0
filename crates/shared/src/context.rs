//! Application context owning the settings and catalog.
//!
//! Created once with [`PlannerContext::init`] and passed to whatever needs it;
//! [`PlannerContext::dispose`] ends its life. Nothing here is global.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::collision::{validate_placement_with, CollisionResult, ComponentCatalog};
use crate::coordinates::ElevationWall;
use crate::corner::{determine_corner_door_side_with_tolerance, CornerDoor};
use crate::plinth::Plinth;
use crate::position::{validate_all, ValidationResult};
use crate::render2d::{self, plan, Drawing, Frame, Render2DDefinition};
use crate::room::{elements_for_wall, RoomGeometry};
use crate::z_position::ZPosition;
use crate::{ComponentDefinition, DesignElement, ElementId, PlanPoint, PlannerSettings, RoomDimensions};

#[derive(Debug, Clone)]
pub struct PlannerContext {
    settings: PlannerSettings,
    catalog: ComponentCatalog,
}

impl PlannerContext {
    pub fn init(settings: PlannerSettings, catalog: ComponentCatalog) -> Self {
        info!(
            "Planner context ready: {} catalog entries, zero z policy {:?}",
            catalog.len(),
            settings.zero_z_policy
        );
        Self { settings, catalog }
    }

    /// Consume the context, handing back what it owned.
    pub fn dispose(self) -> (PlannerSettings, ComponentCatalog) {
        debug!("Planner context disposed");
        (self.settings, self.catalog)
    }

    pub fn settings(&self) -> &PlannerSettings {
        &self.settings
    }

    pub fn catalog(&self) -> &ComponentCatalog {
        &self.catalog
    }

    pub fn resolve_z(&self, component: &ComponentDefinition) -> ZPosition {
        component.resolve_z(self.settings.zero_z_policy)
    }

    pub fn resolve_plinth(&self, component: &ComponentDefinition) -> Plinth {
        component.resolve_plinth(self.settings.zero_z_policy)
    }

    /// New element for a drop of `component` at `(x, y)`
    pub fn place(
        &self,
        component: &ComponentDefinition,
        element_id: impl Into<ElementId>,
        x: f64,
        y: f64,
    ) -> DesignElement {
        component.place(element_id, x, y, self.settings.zero_z_policy)
    }

    pub fn validate_placement(
        &self,
        element: &DesignElement,
        existing: &[DesignElement],
        original_position: Option<PlanPoint>,
    ) -> CollisionResult {
        validate_placement_with(
            element,
            existing,
            &self.catalog,
            original_position,
            &self.settings.collision_options(),
        )
    }

    pub fn corner_door(&self, element: &DesignElement, room: &RoomDimensions) -> CornerDoor {
        determine_corner_door_side_with_tolerance(element, room, self.settings.corner_tolerance)
    }

    pub fn validate_positions(
        &self,
        elements: &[DesignElement],
        room: RoomDimensions,
    ) -> BTreeMap<ElementId, ValidationResult> {
        validate_all(elements, &self.settings.room(room))
    }

    pub fn elements_for_wall<'a>(
        &self,
        wall_id: &str,
        elements: &'a [DesignElement],
        geometry: &RoomGeometry,
    ) -> Vec<&'a DesignElement> {
        elements_for_wall(wall_id, elements, geometry, self.settings.wall_tolerance)
    }

    pub fn render_plan(&self, element: &DesignElement, definition: &Render2DDefinition, zoom: f64) -> Drawing {
        let drawing = render2d::render_plan_view(element, definition, zoom);
        if !self.settings.debug_overlay {
            return drawing;
        }
        let (width, height) = plan::plan_size(element, zoom);
        drawing.with_debug_overlay(&element.component_id, Frame { x: 0.0, y: 0.0, width, height })
    }

    pub fn render_elevation(
        &self,
        element: &DesignElement,
        definition: &Render2DDefinition,
        wall: ElevationWall,
        frame: Frame,
        zoom: f64,
        room: Option<&RoomDimensions>,
    ) -> Drawing {
        let drawing = render2d::render_elevation_view_with_tolerance(
            element,
            definition,
            wall,
            frame,
            zoom,
            room,
            self.settings.corner_tolerance,
        );
        if self.settings.debug_overlay {
            drawing.with_debug_overlay(&element.component_id, frame)
        } else {
            drawing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;
    use crate::render2d::DrawCommand;
    use crate::z_position::ZeroZPolicy;
    use crate::ResolutionSource;

    fn context(settings: PlannerSettings) -> PlannerContext {
        PlannerContext::init(settings, metadata_catalog())
    }

    #[test]
    fn test_init_and_dispose() {
        let ctx = context(PlannerSettings::default());
        assert_eq!(ctx.catalog().len(), metadata_catalog().len());
        let (settings, catalog) = ctx.dispose();
        assert_eq!(settings, PlannerSettings::default());
        assert!(!catalog.is_empty());
    }

    #[test]
    fn test_zero_z_policy_comes_from_settings() {
        let mut cornice = cornice_definition();
        cornice.default_z_position = Some(0.0);

        let fall_through = context(PlannerSettings::default());
        assert_eq!(fall_through.resolve_z(&cornice).z, 200.0);

        let floor = context(PlannerSettings {
            zero_z_policy: ZeroZPolicy::FloorMounted,
            ..Default::default()
        });
        let z = floor.resolve_z(&cornice);
        assert_eq!(z.z, 0.0);
        assert_eq!(z.source, ResolutionSource::Database);
    }

    #[test]
    fn test_place_uses_resolved_z() {
        let ctx = context(PlannerSettings::default());
        let el = ctx.place(&wall_cabinet_definition(), "w1", 10.0, 0.0);
        assert_eq!(el.z, Some(140.0));
        assert_eq!(ctx.resolve_plinth(&wall_cabinet_definition()).height, 0.0);
    }

    #[test]
    fn test_collision_options_come_from_settings() {
        let ctx = context(PlannerSettings {
            snap_threshold: 0.0,
            max_search_radius: 0.0,
            ..Default::default()
        });
        let original = PlanPoint::new(300.0, 0.0);
        let result = ctx.validate_placement(
            &base_cabinet("new", 55.0, 0.0),
            &[base_cabinet("a", 0.0, 0.0)],
            Some(original),
        );
        assert!(!result.is_valid);
        assert_eq!(result.suggested_position, Some(original));
    }

    #[test]
    fn test_corner_tolerance_from_settings() {
        let room = RoomDimensions::new(600.0, 400.0);
        let el = base_cabinet("c", 40.0, 40.0);
        assert_eq!(context(PlannerSettings::default()).corner_door(&el, &room).corner_position, None);

        let wide = context(PlannerSettings {
            corner_tolerance: 50.0,
            ..Default::default()
        });
        assert!(wide.corner_door(&el, &room).corner_position.is_some());
    }

    #[test]
    fn test_positions_use_settings_ceiling() {
        let ctx = context(PlannerSettings {
            ceiling_height: 300.0,
            ..Default::default()
        });
        let mut tall = wall_cabinet("w", 0.0, 0.0);
        tall.z = Some(200.0);
        let results = ctx.validate_positions(&[tall.clone()], RoomDimensions::new(600.0, 400.0));
        assert!(results["w"].valid);

        let strict = context(PlannerSettings::default());
        let results = strict.validate_positions(&[tall], RoomDimensions::new(600.0, 400.0));
        assert!(!results["w"].valid);
    }

    #[test]
    fn test_debug_overlay_flag() {
        let def = rectangle_render_definition("base-cabinet-60");
        let el = base_cabinet("b", 0.0, 0.0);

        let plain = context(PlannerSettings::default()).render_plan(&el, &def, 1.0);
        assert_eq!(plain.commands.len(), 1);

        let debug = context(PlannerSettings {
            debug_overlay: true,
            ..Default::default()
        });
        let drawing = debug.render_plan(&el, &def, 1.0);
        assert_eq!(drawing.commands.len(), 3);

        let frame = Frame { x: 100.0, y: 50.0, width: 60.0, height: 90.0 };
        let elevation = debug.render_elevation(&el, &def, ElevationWall::Front, frame, 1.0, None);
        assert!(matches!(
            elevation.commands.last(),
            Some(DrawCommand::Text { x, y, .. }) if *x == 105.0 && *y == 65.0
        ));
    }

    #[test]
    fn test_elevation_uses_corner_tolerance() {
        let room = RoomDimensions::new(600.0, 400.0);
        let def = rectangle_render_definition("corner-base-cabinet-90");
        let mut el = base_cabinet("c", 0.0, 300.0);
        el.component_id = "corner-base-cabinet-90".into();
        let frame = Frame { x: 10.0, y: 0.0, width: 60.0, height: 90.0 };

        let panel_x = |ctx: &PlannerContext| {
            ctx.render_elevation(&el, &def, ElevationWall::Left, frame, 1.0, Some(&room))
                .commands
                .iter()
                .find_map(|c| match c {
                    DrawCommand::FillRect { x, color, .. } if color == "#c9b896" => Some(*x),
                    _ => None,
                })
        };

        // not a corner at 30cm: door right, panel first
        assert_eq!(panel_x(&context(PlannerSettings::default())), Some(12.0));
        let wide = context(PlannerSettings {
            corner_tolerance: 50.0,
            ..Default::default()
        });
        assert!(panel_x(&wide).is_some_and(|x| x > 12.0));
    }

    #[test]
    fn test_wall_tolerance_from_settings() {
        let geometry = RoomGeometry::rectangle(&RoomDimensions::new(600.0, 400.0));
        let elements = vec![base_cabinet("a", 100.0, 30.0)];
        assert!(context(PlannerSettings::default())
            .elements_for_wall("wall_front", &elements, &geometry)
            .is_empty());

        let loose = context(PlannerSettings {
            wall_tolerance: 40.0,
            ..Default::default()
        });
        assert_eq!(loose.elements_for_wall("wall_front", &elements, &geometry).len(), 1);
    }
}
