//! Planner settings

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::collision::{CollisionOptions, MAX_SEARCH_RADIUS_CM, SNAP_THRESHOLD_CM};
use crate::corner::DEFAULT_CORNER_TOLERANCE;
use crate::error::PlannerError;
use crate::room::DEFAULT_WALL_TOLERANCE;
use crate::z_position::ZeroZPolicy;
use crate::RoomDimensions;

/// Tunables shared by the resolvers, validators and renderers.
///
/// Every field has a default, so a partial JSON file is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSettings {
    /// Used when a room does not carry its own ceiling height (cm)
    pub ceiling_height: f64,
    /// Distance from two walls at which a unit counts as in the corner (cm)
    pub corner_tolerance: f64,
    /// Distance from a wall line at which a unit shows on its elevation (cm)
    pub wall_tolerance: f64,
    pub snap_threshold: f64,
    pub max_search_radius: f64,
    /// How a stored z of exactly zero is read
    pub zero_z_policy: ZeroZPolicy,
    /// Draw element labels and bounds over 2D views
    pub debug_overlay: bool,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            ceiling_height: RoomDimensions::DEFAULT_CEILING_HEIGHT,
            corner_tolerance: DEFAULT_CORNER_TOLERANCE,
            wall_tolerance: DEFAULT_WALL_TOLERANCE,
            snap_threshold: SNAP_THRESHOLD_CM,
            max_search_radius: MAX_SEARCH_RADIUS_CM,
            zero_z_policy: ZeroZPolicy::default(),
            debug_overlay: false,
        }
    }
}

impl PlannerSettings {
    pub fn from_json_str(json: &str) -> Result<Self, PlannerError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PlannerError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Save settings to a JSON file
    pub fn save_json_file(&self, path: impl AsRef<Path>) -> Result<(), PlannerError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn collision_options(&self) -> CollisionOptions {
        CollisionOptions {
            snap_threshold_cm: self.snap_threshold,
            max_search_radius_cm: self.max_search_radius,
        }
    }

    /// Room dimensions with this ceiling filled in when the room has none
    pub fn room(&self, room: RoomDimensions) -> RoomDimensions {
        match room.ceiling_height {
            Some(_) => room,
            None => room.with_ceiling(self.ceiling_height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = PlannerSettings::default();
        assert_eq!(s.ceiling_height, 240.0);
        assert_eq!(s.corner_tolerance, 30.0);
        assert_eq!(s.wall_tolerance, 20.0);
        assert_eq!(s.collision_options(), CollisionOptions::default());
        assert_eq!(s.zero_z_policy, ZeroZPolicy::FallThrough);
        assert!(!s.debug_overlay);
    }

    #[test]
    fn test_partial_json() {
        let s = PlannerSettings::from_json_str(r#"{ "ceiling_height": 270, "zero_z_policy": "floor-mounted" }"#).unwrap();
        assert_eq!(s.ceiling_height, 270.0);
        assert_eq!(s.zero_z_policy, ZeroZPolicy::FloorMounted);
        assert_eq!(s.snap_threshold, 10.0);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(matches!(
            PlannerSettings::from_json_str("{ ceiling_height: }"),
            Err(PlannerError::Json(_))
        ));
        assert!(matches!(
            PlannerSettings::from_json_file("/nonexistent/planner-settings.json"),
            Err(PlannerError::Io(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("planner-settings-{}.json", std::process::id()));
        let s = PlannerSettings {
            debug_overlay: true,
            max_search_radius: 50.0,
            ..Default::default()
        };
        s.save_json_file(&path).unwrap();
        assert_eq!(PlannerSettings::from_json_file(&path).unwrap(), s);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_room_ceiling_fallback() {
        let s = PlannerSettings {
            ceiling_height: 260.0,
            ..Default::default()
        };
        assert_eq!(s.room(RoomDimensions::new(400.0, 300.0)).ceiling(), 260.0);
        assert_eq!(s.room(RoomDimensions::new(400.0, 300.0).with_ceiling(230.0)).ceiling(), 230.0);
    }
}
