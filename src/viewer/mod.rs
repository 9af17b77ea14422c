pub mod camera;
pub mod config;
pub mod render;

use bevy::prelude::*;

use config::ViewerConfig;

/// Streams terrain chunks around an orbiting viewer.
pub struct ViewerPlugin {
    pub config_path: String,
}

impl Default for ViewerPlugin {
    fn default() -> Self {
        Self {
            config_path: config::CONFIG_PATH.to_string(),
        }
    }
}

impl Plugin for ViewerPlugin {
    fn build(&self, app: &mut App) {
        let config = ViewerConfig::load_or_default(&self.config_path);
        let (r, g, b) = config.clear_color_srgb;

        app.insert_resource(ClearColor(Color::srgb(r, g, b)))
            .insert_resource(config)
            .insert_resource(camera::OrbitCameraSettings::default())
            .add_systems(
                Startup,
                (camera::setup_viewer, render::setup_terrain_renderer).chain(),
            )
            .add_systems(
                Update,
                (
                    camera::orbit_camera_input,
                    camera::update_orbit_camera,
                    render::stream_chunks,
                )
                    .chain(),
            );
    }
}
