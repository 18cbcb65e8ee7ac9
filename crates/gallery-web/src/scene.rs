//! 3D scene management: the room, the hung artworks and the walking camera

use bevy::asset::LoadState;
use bevy::input::mouse::AccumulatedMouseMotion;
use bevy::prelude::*;
use bevy_egui::EguiContexts;
use gallery_core::glam;
use gallery_core::{
    layout_frames, pick_frame, ArtworkId, FirstPersonController, FramePlacement, FrameSpec,
    LookAngles, MoveDirection, MovementKeys, RoomSpec, WalkSettings,
};

use crate::app::{in_gallery, ActiveView, ArtworkActivated, ArtworkRegistry};

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GalleryRoom>()
            .init_resource::<HoveredFrame>()
            .init_resource::<ClickTracker>()
            .add_systems(Startup, setup_scene)
            .add_systems(Update, (
                spawn_frames,
                apply_texture_fallback,
                (look_around, walk, update_hover, handle_click)
                    .chain()
                    .run_if(in_gallery),
                update_frame_highlight,
                reset_on_view_change,
            ));
    }
}

/// Radians of turn per pixel of drag
const LOOK_SENSITIVITY: f32 = 0.003;

/// Keys bound to each movement direction
const KEY_BINDINGS: [(MoveDirection, [KeyCode; 2]); 4] = [
    (MoveDirection::Forward, [KeyCode::KeyW, KeyCode::ArrowUp]),
    (MoveDirection::Backward, [KeyCode::KeyS, KeyCode::ArrowDown]),
    (MoveDirection::Left, [KeyCode::KeyA, KeyCode::ArrowLeft]),
    (MoveDirection::Right, [KeyCode::KeyD, KeyCode::ArrowRight]),
];

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// First-person state carried by the camera
#[derive(Component, Default)]
pub struct Walker {
    pub controller: FirstPersonController,
    pub look: LookAngles,
}

/// A hung artwork; the entity is placed at the frame center
#[derive(Component)]
pub struct ArtFrame {
    pub index: usize,
    pub artwork: ArtworkId,
    /// Material of the border, recolored on hover
    pub border: Handle<StandardMaterial>,
}

/// The picture surface inside a frame
#[derive(Component)]
pub struct Canvas {
    pub image: Handle<Image>,
    pub url: String,
    /// Loading finished one way or the other
    pub settled: bool,
}

/// Walls, floor and ceiling
#[derive(Component)]
pub struct RoomSurface;

/// Room geometry and the frames currently on the walls
#[derive(Resource, Default)]
pub struct GalleryRoom {
    pub room: RoomSpec,
    pub frame: FrameSpec,
    pub placements: Vec<FramePlacement>,
    /// Artwork hung at each placement
    pub artworks: Vec<ArtworkId>,
}

/// Index of the frame under the pointer
#[derive(Resource, Default, PartialEq, Eq)]
pub struct HoveredFrame(pub Option<usize>);

/// Tells a click apart from a drag-to-look
#[derive(Resource, Default)]
pub struct ClickTracker {
    start: Option<Vec2>,
    dragged: bool,
}

impl ClickTracker {
    /// Pointer travel in pixels beyond which a press becomes a drag
    const DRAG_THRESHOLD: f32 = 5.0;

    pub fn start(&mut self, position: Vec2) {
        self.start = Some(position);
        self.dragged = false;
    }

    pub fn track(&mut self, position: Vec2) {
        if let Some(start) = self.start {
            if start.distance(position) > Self::DRAG_THRESHOLD {
                self.dragged = true;
            }
        }
    }

    /// End the gesture. Returns the press position if it was a click.
    pub fn finish(&mut self) -> Option<Vec2> {
        let start = self.start.take();
        let dragged = std::mem::take(&mut self.dragged);
        start.filter(|_| !dragged)
    }
}

fn to_core(v: Vec3) -> glam::Vec3 {
    glam::Vec3::from_array(v.to_array())
}

fn from_core(v: glam::Vec3) -> Vec3 {
    Vec3::from_array(v.to_array())
}

fn frame_material(hovered: bool) -> StandardMaterial {
    if hovered {
        StandardMaterial {
            base_color: Color::srgb(1.0, 0.84, 0.0),
            emissive: LinearRgba::rgb(0.25, 0.2, 0.0),
            metallic: 0.6,
            perceptual_roughness: 0.3,
            ..default()
        }
    } else {
        StandardMaterial {
            base_color: Color::srgb(0.13, 0.13, 0.13),
            perceptual_roughness: 0.5,
            ..default()
        }
    }
}

fn placeholder_material() -> StandardMaterial {
    StandardMaterial {
        base_color: Color::srgb(0.8, 0.8, 0.8),
        unlit: true,
        ..default()
    }
}

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    gallery: Res<GalleryRoom>,
) {
    let room = gallery.room;
    let settings = WalkSettings {
        bounds: room.walk_bounds(),
        ..default()
    };
    let start = settings
        .bounds
        .clamp(glam::Vec3::new(0.0, settings.eye_height, 5.0));

    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: 75.0_f32.to_radians(),
            near: 0.05,
            far: 200.0,
            ..default()
        }),
        Transform::from_translation(from_core(start)),
        MainCamera,
        Walker {
            controller: FirstPersonController::new(settings),
            look: LookAngles::default(),
        },
    ));

    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 400.0,
        ..default()
    });

    commands.spawn((
        DirectionalLight {
            illuminance: 3000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(5.0, room.height, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Warm fill from the ceiling
    commands.spawn((
        PointLight {
            intensity: 2_000_000.0,
            range: room.width.max(room.depth),
            color: Color::srgb(1.0, 0.95, 0.88),
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(0.0, room.height - 1.0, 0.0),
    ));

    let wall_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.96, 0.96, 0.94),
        perceptual_roughness: 0.9,
        ..default()
    });
    for wall in room.walls() {
        commands.spawn((
            Mesh3d(meshes.add(Cuboid::new(wall.size.x, wall.size.y, wall.size.z))),
            MeshMaterial3d(wall_material.clone()),
            Transform::from_translation(from_core(wall.center))
                .with_rotation(Quat::from_rotation_y(wall.yaw)),
            RoomSurface,
        ));
    }

    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(room.width, room.depth))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.36, 0.27, 0.2),
            perceptual_roughness: 0.7,
            ..default()
        })),
        Transform::default(),
        RoomSurface,
    ));

    commands.spawn((
        Mesh3d(meshes.add(Plane3d::new(Vec3::NEG_Y, Vec2::splat(0.5)).mesh().size(room.width, room.depth))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.9, 0.9, 0.9),
            ..default()
        })),
        Transform::from_xyz(0.0, room.height, 0.0),
        RoomSurface,
    ));
}

/// (Re)hang the artworks whenever the registry changes
fn spawn_frames(
    mut commands: Commands,
    registry: Res<ArtworkRegistry>,
    mut gallery: ResMut<GalleryRoom>,
    existing: Query<Entity, With<ArtFrame>>,
    asset_server: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if !registry.is_changed() || !registry.loaded {
        return;
    }

    for entity in &existing {
        commands.entity(entity).despawn();
    }

    let frame = gallery.frame;
    let placements = layout_frames(&gallery.room, &frame, registry.artworks.len());
    if placements.len() < registry.artworks.len() {
        tracing::info!(
            "Room holds {} frames, {} artworks left off the walls",
            placements.len(),
            registry.artworks.len() - placements.len()
        );
    }

    let border_mesh = meshes.add(Cuboid::new(frame.width, frame.height, frame.depth));
    let mut hung = Vec::with_capacity(placements.len());

    for (placement, artwork) in placements.iter().zip(&registry.artworks) {
        let (canvas_width, canvas_height) = frame.canvas_size(artwork.parsed_dimensions().as_ref());
        let canvas_mesh = meshes.add(Rectangle::new(canvas_width, canvas_height));
        let image: Handle<Image> = asset_server.load(artwork.image_url.clone());
        let canvas_material = materials.add(StandardMaterial {
            base_color_texture: Some(image.clone()),
            perceptual_roughness: 0.8,
            ..default()
        });
        let border = materials.add(frame_material(false));

        commands
            .spawn((
                ArtFrame {
                    index: placement.index,
                    artwork: artwork.id.clone(),
                    border: border.clone(),
                },
                Transform::from_translation(from_core(placement.position))
                    .with_rotation(Quat::from_array(placement.rotation().to_array())),
                Visibility::default(),
            ))
            .with_children(|parent| {
                parent.spawn((
                    Mesh3d(border_mesh.clone()),
                    MeshMaterial3d(border),
                    Transform::default(),
                ));
                parent.spawn((
                    Mesh3d(canvas_mesh),
                    MeshMaterial3d(canvas_material),
                    Transform::from_xyz(0.0, 0.0, frame.depth / 2.0 + 0.01),
                    Canvas {
                        image,
                        url: artwork.image_url.clone(),
                        settled: false,
                    },
                ));
            });

        hung.push(artwork.id.clone());
    }

    gallery.placements = placements;
    gallery.artworks = hung;
}

/// Swap in a flat placeholder when an artwork image fails to load
fn apply_texture_fallback(
    asset_server: Res<AssetServer>,
    mut canvases: Query<(&mut Canvas, &MeshMaterial3d<StandardMaterial>)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (mut canvas, material) in &mut canvases {
        if canvas.settled {
            continue;
        }
        match asset_server.get_load_state(canvas.image.id()) {
            Some(LoadState::Loaded) => canvas.settled = true,
            Some(LoadState::Failed(err)) => {
                tracing::warn!("Could not load artwork image {}: {}", canvas.url, err);
                if let Some(existing) = materials.get_mut(&material.0) {
                    *existing = placeholder_material();
                }
                canvas.settled = true;
            }
            _ => {}
        }
    }
}

fn egui_wants_pointer(contexts: &mut EguiContexts) -> bool {
    contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input() || ctx.is_pointer_over_area())
        .unwrap_or(false)
}

fn egui_wants_keyboard(contexts: &mut EguiContexts) -> bool {
    contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_keyboard_input())
        .unwrap_or(false)
}

/// Movement keys currently held (WASD or arrows)
pub fn movement_keys(keyboard: &ButtonInput<KeyCode>) -> MovementKeys {
    let mut keys = MovementKeys::default();
    for (direction, codes) in KEY_BINDINGS {
        keys.set(direction, codes.iter().any(|code| keyboard.pressed(*code)));
    }
    keys
}

/// Camera orientation for the given look angles
pub fn look_rotation(look: &LookAngles) -> Quat {
    Quat::from_euler(EulerRot::YXZ, look.yaw, look.pitch, 0.0)
}

/// Drag with the left button (or one finger) to look around
fn look_around(
    mouse_button: Res<ButtonInput<MouseButton>>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    touches: Res<Touches>,
    mut contexts: EguiContexts,
    mut walkers: Query<&mut Walker, With<MainCamera>>,
) {
    if egui_wants_pointer(&mut contexts) {
        return;
    }
    let Ok(mut walker) = walkers.single_mut() else { return };

    let mut delta = Vec2::ZERO;
    if mouse_button.pressed(MouseButton::Left) {
        delta += mouse_motion.delta;
    }
    if touches.iter().count() == 1 {
        for touch in touches.iter() {
            delta += touch.delta();
        }
    }

    if delta != Vec2::ZERO {
        walker.look.apply_delta(delta.x, delta.y, LOOK_SENSITIVITY);
    }
}

fn walk(
    time: Res<Time>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut contexts: EguiContexts,
    mut cameras: Query<(&mut Transform, &mut Walker), With<MainCamera>>,
) {
    let Ok((mut transform, mut walker)) = cameras.single_mut() else { return };

    let keys = if egui_wants_keyboard(&mut contexts) {
        MovementKeys::default()
    } else {
        movement_keys(&keyboard)
    };

    let Walker { controller, look } = &mut *walker;
    let next = controller.step(to_core(transform.translation), look.facing(), &keys, time.delta_secs());
    transform.translation = from_core(next);
    transform.rotation = look_rotation(look);
}

/// Index of the frame under a screen position
fn frame_at(
    screen_position: Vec2,
    camera: &Camera,
    camera_transform: &GlobalTransform,
    gallery: &GalleryRoom,
) -> Option<usize> {
    let ray = camera.viewport_to_world(camera_transform, screen_position).ok()?;
    pick_frame(
        &gallery.placements,
        to_core(ray.origin),
        to_core(*ray.direction),
        &gallery.frame,
    )
}

fn update_hover(
    windows: Query<&Window>,
    cameras: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    gallery: Res<GalleryRoom>,
    mut hovered: ResMut<HoveredFrame>,
    mut contexts: EguiContexts,
) {
    let over_ui = egui_wants_pointer(&mut contexts);
    let hit = match (windows.single(), cameras.single()) {
        (Ok(window), Ok((camera, camera_transform))) if !over_ui => window
            .cursor_position()
            .and_then(|cursor| frame_at(cursor, camera, camera_transform, &gallery)),
        _ => None,
    };
    hovered.set_if_neq(HoveredFrame(hit));
}

/// A press and release without dragging activates the frame under it
fn handle_click(
    mouse_button: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    windows: Query<&Window>,
    cameras: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    gallery: Res<GalleryRoom>,
    mut tracker: ResMut<ClickTracker>,
    mut contexts: EguiContexts,
    mut activated: MessageWriter<ArtworkActivated>,
) {
    let over_ui = egui_wants_pointer(&mut contexts);
    let Ok(window) = windows.single() else { return };
    let cursor = window.cursor_position();
    let mut clicked_at = None;

    if mouse_button.just_pressed(MouseButton::Left) && !over_ui {
        if let Some(position) = cursor {
            tracker.start(position);
        }
    }
    if let Some(position) = cursor {
        if mouse_button.pressed(MouseButton::Left) || mouse_button.just_released(MouseButton::Left) {
            tracker.track(position);
        }
    }
    if mouse_button.just_released(MouseButton::Left) {
        clicked_at = tracker.finish();
    }

    for touch in touches.iter_just_pressed() {
        if !over_ui {
            tracker.start(touch.position());
        }
    }
    for touch in touches.iter() {
        tracker.track(touch.position());
    }
    for touch in touches.iter_just_released() {
        tracker.track(touch.position());
        clicked_at = clicked_at.or(tracker.finish());
    }

    let Some(position) = clicked_at else { return };
    let Ok((camera, camera_transform)) = cameras.single() else { return };

    if let Some(index) = frame_at(position, camera, camera_transform, &gallery) {
        if let Some(id) = gallery.artworks.get(index) {
            tracing::debug!("Frame {} clicked ({})", index, id);
            activated.write(ArtworkActivated(id.clone()));
        }
    }
}

fn update_frame_highlight(
    hovered: Res<HoveredFrame>,
    frames: Query<&ArtFrame>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if !hovered.is_changed() {
        return;
    }
    for frame in &frames {
        if let Some(material) = materials.get_mut(&frame.border) {
            *material = frame_material(hovered.0 == Some(frame.index));
        }
    }
}

/// Leaving the 3D view drops residual motion, hover and any half-finished click
fn reset_on_view_change(
    view: Res<ActiveView>,
    mut walkers: Query<&mut Walker>,
    mut hovered: ResMut<HoveredFrame>,
    mut tracker: ResMut<ClickTracker>,
) {
    if !view.is_changed() || *view == ActiveView::Gallery {
        return;
    }
    for mut walker in &mut walkers {
        walker.controller.stop();
    }
    hovered.set_if_neq(HoveredFrame(None));
    *tracker = ClickTracker::default();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_vs_drag() {
        let mut tracker = ClickTracker::default();
        tracker.start(Vec2::new(100.0, 100.0));
        tracker.track(Vec2::new(102.0, 101.0));
        assert_eq!(tracker.finish(), Some(Vec2::new(100.0, 100.0)));

        tracker.start(Vec2::new(100.0, 100.0));
        tracker.track(Vec2::new(140.0, 100.0));
        // Coming back to the start does not undo the drag
        tracker.track(Vec2::new(100.0, 100.0));
        assert_eq!(tracker.finish(), None);

        // Release without a press
        assert_eq!(tracker.finish(), None);
    }

    #[test]
    fn test_movement_key_bindings() {
        let mut keyboard = ButtonInput::<KeyCode>::default();
        assert!(!movement_keys(&keyboard).any());

        keyboard.press(KeyCode::KeyW);
        keyboard.press(KeyCode::ArrowRight);
        let keys = movement_keys(&keyboard);
        assert!(keys.forward && keys.right);
        assert!(!keys.backward && !keys.left);

        keyboard.release(KeyCode::KeyW);
        keyboard.press(KeyCode::ArrowDown);
        let keys = movement_keys(&keyboard);
        assert!(keys.backward && !keys.forward);
    }

    #[test]
    fn test_camera_rotation_matches_facing() {
        let samples = [(0.0, 0.0), (0.7, 0.2), (-2.0, -0.9), (3.0, 1.4)];
        for (yaw, pitch) in samples {
            let look = LookAngles { yaw, pitch };
            let view = look_rotation(&look) * Vec3::NEG_Z;
            assert!((view - from_core(look.facing())).length() < 1e-5, "yaw {} pitch {}", yaw, pitch);
        }
    }

    #[test]
    fn test_room_defaults_match_walk_bounds() {
        let gallery = GalleryRoom::default();
        let bounds = gallery.room.walk_bounds();
        // The camera keeps clear of every hung frame
        for placement in layout_frames(&gallery.room, &gallery.frame, 5) {
            assert!(!bounds.contains(placement.position));
        }
    }
}
