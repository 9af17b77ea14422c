use std::collections::HashMap;

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use glam::{IVec2, Vec2};
use terrain::heightfield::HeightField;
use terrain::mesh::Mesh as TerrainMesh;
use terrain::{ChunkData, ChunkEvent, ChunkManager, FrameContext};

use super::camera::Viewer;
use super::config::ViewerConfig;

#[derive(Component)]
pub struct Chunk {
    pub coord: IVec2,
}

/// Chunk origin in world xz, for shaders that sample the height texture.
#[derive(Component, Clone, Copy, Debug)]
pub struct ChunkOrigin(pub Vec2);

/// `R32Float` image of the chunk's heightfield, `nx` by `nz` texels.
#[derive(Component, Clone, Debug)]
pub struct ChunkHeightTexture(pub Handle<Image>);

#[derive(Resource)]
pub struct ChunkManagerRes(pub ChunkManager);

#[derive(Resource)]
pub struct TerrainMaterial {
    material: Handle<StandardMaterial>,
}

struct LoadedChunk {
    entity: Entity,
    meshes: Vec<Handle<Mesh>>,
    height_texture: Handle<Image>,
}

#[derive(Resource, Default)]
pub struct LoadedChunks {
    chunks: HashMap<IVec2, LoadedChunk>,
}

impl LoadedChunks {
    pub fn len(&self) -> usize {
        self.chunks.len()
    }
}

pub fn setup_terrain_renderer(
    mut commands: Commands,
    config: Res<ViewerConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut images: ResMut<Assets<Image>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let material = materials.add(StandardMaterial {
        base_color: Color::WHITE,
        perceptual_roughness: 1.0,
        ..default()
    });
    let surface_material = TerrainMaterial { material };

    let mut manager = ChunkManager::new(config.terrain.clone());
    let center = config.terrain.chunk_of_world(Vec2::splat(config.terrain.chunk_size * 0.5));
    let events = manager.regenerate(center, config.terrain.view_distance_chunks);

    let mut loaded = LoadedChunks::default();
    apply_chunk_events(
        &mut commands,
        &mut meshes,
        &mut images,
        &surface_material,
        &mut loaded,
        events,
    );
    info!("initial terrain ready: {} chunks", loaded.len());

    commands.insert_resource(ChunkManagerRes(manager));
    commands.insert_resource(loaded);
    commands.insert_resource(surface_material);
}

pub fn stream_chunks(
    mut commands: Commands,
    time: Res<Time>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut images: ResMut<Assets<Image>>,
    surface_material: Res<TerrainMaterial>,
    mut manager: ResMut<ChunkManagerRes>,
    mut loaded: ResMut<LoadedChunks>,
    q_viewer: Query<&Transform, With<Viewer>>,
) {
    let Ok(viewer) = q_viewer.single() else {
        return;
    };

    let frame = FrameContext {
        viewer_world_xz: Vec2::new(viewer.translation.x, viewer.translation.z),
        delta_seconds: time.delta_secs(),
    };
    let events = manager.0.update(&frame);

    apply_chunk_events(
        &mut commands,
        &mut meshes,
        &mut images,
        &surface_material,
        &mut loaded,
        events,
    );
}

fn apply_chunk_events(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    images: &mut Assets<Image>,
    surface_material: &TerrainMaterial,
    loaded: &mut LoadedChunks,
    events: Vec<ChunkEvent>,
) {
    for event in events {
        match event {
            ChunkEvent::Unloaded(coord) => {
                if let Some(chunk) = loaded.chunks.remove(&coord) {
                    commands.entity(chunk.entity).despawn();
                    for mesh in chunk.meshes {
                        meshes.remove(mesh.id());
                    }
                    images.remove(chunk.height_texture.id());
                }
            }
            ChunkEvent::Loaded(chunk) => {
                if loaded.chunks.contains_key(&chunk.coord) {
                    continue;
                }
                let entry = spawn_chunk(commands, meshes, images, surface_material, &chunk);
                loaded.chunks.insert(chunk.coord, entry);
            }
        }
    }
}

fn spawn_chunk(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    images: &mut Assets<Image>,
    surface_material: &TerrainMaterial,
    chunk: &ChunkData,
) -> LoadedChunk {
    let surface = meshes.add(mesh_from_terrain_mesh(&chunk.local_mesh()));
    let height_texture = images.add(height_image(&chunk.heightfield));
    let mut handles = vec![surface.clone()];

    let mut entity = commands.spawn((
        Chunk { coord: chunk.coord },
        ChunkOrigin(chunk.origin),
        ChunkHeightTexture(height_texture.clone()),
        Mesh3d(surface),
        MeshMaterial3d(surface_material.material.clone()),
        Transform::from_translation(chunk.model_translation()),
    ));

    if !chunk.decorations.is_empty() {
        let decorations = meshes.add(mesh_from_terrain_mesh(&chunk.local_decorations()));
        handles.push(decorations.clone());
        entity.with_children(|parent| {
            parent.spawn((
                Mesh3d(decorations),
                MeshMaterial3d(surface_material.material.clone()),
                Transform::IDENTITY,
            ));
        });
    }

    LoadedChunk {
        entity: entity.id(),
        meshes: handles,
        height_texture,
    }
}

fn mesh_from_terrain_mesh(data: &TerrainMesh) -> Mesh {
    let positions: Vec<[f32; 3]> = data.vertices.iter().map(|v| v.position.to_array()).collect();
    let normals: Vec<[f32; 3]> = data.vertices.iter().map(|v| v.normal.to_array()).collect();
    let colors: Vec<[f32; 4]> = data
        .vertices
        .iter()
        .map(|v| v.color.extend(1.0).to_array())
        .collect();

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, colors);
    mesh.insert_indices(Indices::U32(data.indices.clone()));
    mesh
}

fn height_image(field: &HeightField) -> Image {
    let data: Vec<u8> = bytemuck::cast_slice(&field.heights).to_vec();
    let mut image = Image::new(
        Extent3d {
            width: field.nx as u32,
            height: field.nz as u32,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        data,
        TextureFormat::R32Float,
        RenderAssetUsages::default(),
    );
    image.sampler = bevy::image::ImageSampler::nearest();
    image
}
