//! Aggregate tunables for the controller.
//!
//! Every field has a serde default, so a catalog only lists what it overrides:
//!
//! ```toml
//! [settings.movement]
//! speed = 0.15
//!
//! [settings.camera]
//! max_distance = 8.0
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    animation::AnimationSettings, camera::CameraSettings, collision::ProbeSettings,
    error::ControllerError, movement::MovementSettings, proximity::ProximitySettings,
};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerSettings {
    pub movement: MovementSettings,
    pub camera: CameraSettings,
    pub probe: ProbeSettings,
    pub proximity: ProximitySettings,
    pub animation: AnimationSettings,
}

impl ControllerSettings {
    /// Parse settings from a standalone TOML document and validate them.
    pub fn from_toml_str(source: &str) -> Result<Self, ControllerError> {
        let settings: Self = toml::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ControllerError> {
        self.movement.validate()?;
        self.camera.validate()?;
        self.probe.validate()?;
        self.proximity.validate()?;
        self.animation.validate()?;

        // Queries only search the 3x3 cells around a ray's origin, so no horizontal
        // ray may reach further than one cell.
        let reach = self
            .camera
            .max_distance
            .max(self.movement.wall_probe_distance);
        if self.probe.cell_size < reach {
            return Err(ControllerError::invalid(
                "probe.cell_size",
                format!("must be at least the longest horizontal probe ({reach} m)"),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let settings = ControllerSettings::from_toml_str("").expect("empty is valid");
        assert_eq!(settings, ControllerSettings::default());
    }

    #[test]
    fn partial_tables_override_single_fields() {
        let settings = ControllerSettings::from_toml_str(
            r#"
            [movement]
            speed = 0.2

            [camera]
            max_distance = 6.0
            "#,
        )
        .expect("valid settings");

        assert_eq!(settings.movement.speed, 0.2);
        assert_eq!(settings.movement.sprint_multiplier, 2.0);
        assert_eq!(settings.camera.max_distance, 6.0);
        assert_eq!(settings.camera.min_distance, 1.5);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = ControllerSettings::from_toml_str("[camera]\nmin_distance = 20.0\n").unwrap_err();
        assert!(matches!(
            err,
            ControllerError::InvalidSetting {
                name: "camera.min_distance",
                ..
            }
        ));
    }

    #[test]
    fn cells_smaller_than_camera_reach_are_rejected() {
        let err = ControllerSettings::from_toml_str("[probe]\ncell_size = 2.0\n").unwrap_err();
        assert!(matches!(
            err,
            ControllerError::InvalidSetting {
                name: "probe.cell_size",
                ..
            }
        ));

        // Shrinking the zoom range brings small cells back within reach.
        let settings = ControllerSettings::from_toml_str(
            "[probe]\ncell_size = 2.0\n[camera]\nmin_distance = 1.0\nmax_distance = 2.0\ndistance = 1.5\n",
        )
        .expect("camera fits inside one cell");
        assert_eq!(settings.probe.cell_size, 2.0);
    }

    #[test]
    fn full_zoom_camera_ray_finds_wall_in_next_cell() {
        use crate::collision::{CollisionMesh, CollisionProbe, CollisionScene, Vec3};

        let settings = ControllerSettings::default();
        settings.validate().expect("defaults are valid");
        assert_eq!(settings.probe.cell_size, settings.camera.max_distance);

        // Look-at point in cell 0, wall in cell 1, camera a full zoom away.
        let mut scene = CollisionScene::new(settings.probe.clone());
        scene.build(vec![
            CollisionMesh::cuboid(Vec3::new(10.35, 1.5, 0.3), Vec3::new(0.15, 1.5, 5.0)).unwrap(),
        ]);
        let origin = Vec3::new(1.0, 1.2, 0.3);
        let ideal = origin + Vec3::x() * settings.camera.max_distance;
        let camera = scene.camera_occlusion(origin, ideal);
        assert!(camera.x < 10.2);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = ControllerSettings::from_toml_str("[movement\nspeed = ").unwrap_err();
        assert!(matches!(err, ControllerError::Toml(_)));
    }
}
