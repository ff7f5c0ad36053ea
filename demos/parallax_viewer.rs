//! A stand-in memory viewer. Each scene is a few primitives instead of a splat.
//!
//! Move the mouse for parallax, `+`/`-` or the wheel to dolly, `←`/`→` to change scenes, and `X`
//! to toggle edit mode. In edit mode, drag to orbit, right drag to pan, `R` resets, and `L` logs
//! the camera as a scene configuration fragment.

use bevy::prelude::*;
use splat_memories_cam::prelude::*;

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins,
            DefaultSplatCamPlugins.set(ScenePlugin::from_path(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/demos/config.json"
            ))),
        ))
        .add_systems(Startup, setup)
        .add_systems(Update, (show_scene_title, dismiss_hint, report_export))
        .run();
}

#[derive(Component)]
struct Hint;

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Camera3d::default(),
        ParallaxCam::default(),
        OrbitControls::default(),
    ));

    let mut rng_like = 0.3_f32;
    for x in -2..=2 {
        for z in -2..=2 {
            rng_like = (rng_like * 7.31 + 0.17).fract();
            commands.spawn((
                Mesh3d(meshes.add(Cuboid::new(0.3, 0.3 + rng_like, 0.3))),
                MeshMaterial3d(materials.add(Color::hsl(rng_like * 360.0, 0.5, 0.6))),
                Transform::from_xyz(x as f32 * 0.6, 0.0, z as f32 * 0.6),
            ));
        }
    }
    commands.spawn((
        DirectionalLight::default(),
        Transform::from_xyz(3.0, 5.0, 2.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        Hint,
        Text::new("move the mouse"),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(12.0),
            left: Val::Px(12.0),
            ..default()
        },
    ));
}

fn show_scene_title(
    mut changed: EventReader<SceneChanged>,
    scenes: Res<Scenes>,
    mut windows: Query<&mut Window>,
) {
    for SceneChanged { index } in changed.read() {
        let Some(splat) = scenes.splats.get(*index) else {
            continue;
        };
        for mut window in &mut windows {
            window.title = match splat.coordinates_label() {
                Some(coordinates) => format!("{} ({coordinates})", splat.title),
                None => splat.title.clone(),
            };
        }
    }
}

fn dismiss_hint(
    mut moved: EventReader<ParallaxPointerMoved>,
    hints: Query<Entity, With<Hint>>,
    mut commands: Commands,
) {
    if moved.read().next().is_some() {
        for hint in &hints {
            commands.entity(hint).despawn();
        }
    }
}

fn report_export(mut exported: EventReader<CameraExported>) {
    for CameraExported { json } in exported.read() {
        println!("{json}");
    }
}
