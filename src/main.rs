use bevy::prelude::*;

mod viewer;

use viewer::ViewerPlugin;

fn main() {
    App::new()
        .insert_resource(AmbientLight {
            color: Color::WHITE,
            brightness: 30.0,
            affects_lightmapped_meshes: false,
        })
        .add_plugins(DefaultPlugins)
        .add_plugins(ViewerPlugin::default())
        .run();
}
