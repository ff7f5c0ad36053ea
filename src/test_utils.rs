//! A headless app for exercising the plugins end to end.

use std::time::Duration;

use bevy_app::prelude::*;
use bevy_ecs::prelude::*;
use bevy_input::{
    keyboard::{Key, KeyboardInput},
    mouse::{MouseMotion, MouseScrollUnit, MouseWheel},
    prelude::*,
    ButtonState, InputPlugin,
};
use bevy_math::prelude::*;
use bevy_render::camera::{PerspectiveProjection, Projection};
use bevy_state::{app::StatesPlugin, prelude::*};
use bevy_time::{TimePlugin, TimeUpdateStrategy};
use bevy_transform::prelude::*;
use bevy_window::{CursorMoved, Window, WindowResolution};

use crate::{
    controller::{component::ParallaxCam, ParallaxCamPlugin},
    controls::{OrbitControls, OrbitControlsPlugin},
    mode::{ModeControllerPlugin, ViewMode},
    scene::{ScenePlugin, ViewerConfig},
};

/// Frame time used by [`TestApp`].
pub const FRAME: Duration = Duration::from_millis(16);

pub struct TestApp {
    pub app: App,
    pub camera: Entity,
    /// An 800 x 600 window the cursor moves over.
    pub window: Entity,
}

impl TestApp {
    /// An app with every plugin, one window, and one camera, showing `config`.
    pub fn new(config: ViewerConfig) -> Self {
        let mut app = App::new();
        app.add_plugins((TimePlugin, StatesPlugin, InputPlugin))
            .insert_resource(TimeUpdateStrategy::ManualDuration(FRAME))
            .add_plugins((
                ParallaxCamPlugin,
                OrbitControlsPlugin,
                ModeControllerPlugin,
                ScenePlugin::from_config(config),
            ));
        let window = app
            .world_mut()
            .spawn(Window {
                resolution: WindowResolution::new(800.0, 600.0),
                ..Default::default()
            })
            .id();
        let camera = app
            .world_mut()
            .spawn((
                ParallaxCam::default(),
                OrbitControls::default(),
                Transform::default(),
                Projection::Perspective(PerspectiveProjection::default()),
            ))
            .id();
        Self {
            app,
            camera,
            window,
        }
    }

    /// Two scenes: one at the default pose, one offset with a narrow zoom range.
    pub fn with_two_scenes() -> Self {
        let config = ViewerConfig::from_json_str(
            r#"{
                "settings": { "fov": 50 },
                "splats": [
                    { "splatFile": "first.spz", "title": "First",
                      "cameraPosition": [0, 0, 3], "focusPoint": [0, 0, 0] },
                    { "splatFile": "second.spz", "title": "Second", "fov": 40,
                      "cameraPosition": [1, 0.5, 4], "focusPoint": [1, 0.5, 0],
                      "parallaxAmount": { "yaw": 5, "pitch": 2 }, "zoomRange": [0.8, 1.2] }
                ]
            }"#,
        )
        .unwrap();
        Self::new(config)
    }

    pub fn update(&mut self) {
        self.app.update();
    }

    pub fn run(&mut self, frames: usize) {
        for _ in 0..frames {
            self.app.update();
        }
    }

    pub fn send<E: Event>(&mut self, event: E) {
        self.app.world_mut().send_event(event);
    }

    /// Press and release a key over one frame.
    pub fn tap(&mut self, key_code: KeyCode) {
        self.key(key_code, ButtonState::Pressed);
        self.update();
        self.key(key_code, ButtonState::Released);
    }

    fn key(&mut self, key_code: KeyCode, state: ButtonState) {
        self.send(KeyboardInput {
            key_code,
            logical_key: Key::Unidentified(bevy_input::keyboard::NativeKey::Unidentified),
            state,
            text: None,
            repeat: false,
            window: Entity::PLACEHOLDER,
        });
    }

    /// Move the cursor to `position`, in logical pixels of the test window.
    pub fn move_cursor(&mut self, position: Vec2) {
        let window = self.window;
        self.send(CursorMoved {
            window,
            position,
            delta: None,
        });
    }

    /// Drag the mouse by `delta` pixels and scroll by `scroll` lines over the next frame.
    pub fn mouse(&mut self, delta: Vec2, scroll: f32) {
        let window = self.window;
        if delta != Vec2::ZERO {
            self.send(MouseMotion { delta });
        }
        if scroll != 0.0 {
            self.send(MouseWheel {
                unit: MouseScrollUnit::Line,
                x: 0.0,
                y: scroll,
                window,
            });
        }
    }

    /// Hold `button` down until [`Self::release`].
    pub fn hold(&mut self, button: MouseButton) {
        self.app
            .world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .press(button);
    }

    pub fn release(&mut self, button: MouseButton) {
        self.app
            .world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .release(button);
    }

    /// Hold `key` down without a keyboard event, for modifiers.
    pub fn hold_key(&mut self, key: KeyCode) {
        self.app
            .world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(key);
    }

    pub fn mode(&self) -> ViewMode {
        *self.app.world().resource::<State<ViewMode>>().get()
    }

    pub fn cam(&self) -> &ParallaxCam {
        self.app.world().get::<ParallaxCam>(self.camera).unwrap()
    }

    pub fn controls(&self) -> &OrbitControls {
        self.app.world().get::<OrbitControls>(self.camera).unwrap()
    }

    pub fn controls_mut(&mut self) -> Mut<'_, OrbitControls> {
        self.app
            .world_mut()
            .get_mut::<OrbitControls>(self.camera)
            .unwrap()
    }

    pub fn transform(&self) -> Transform {
        *self.app.world().get::<Transform>(self.camera).unwrap()
    }

    pub fn fov_degrees(&self) -> f32 {
        match self.app.world().get::<Projection>(self.camera).unwrap() {
            Projection::Perspective(perspective) => perspective.fov.to_degrees(),
            _ => panic!("expected a perspective projection"),
        }
    }

    pub fn resource<R: Resource>(&self) -> &R {
        self.app.world().resource::<R>()
    }

    /// Drain and return all events of type `E` sent so far.
    pub fn drain<E: Event>(&mut self) -> Vec<E> {
        self.app
            .world_mut()
            .resource_mut::<Events<E>>()
            .drain()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        controller::{inputs::ParallaxPointerMoved, motion::AmbientMotion},
        controls::{PoseWriter, PositionAxis},
        mode::{
            overrides::{CameraNudge, ModeOverrides, ParallaxAxis},
            readback::{CameraExported, ExportCamera, LivePose},
            SetViewMode, ToggleEditMode,
        },
        scene::{ActiveScene, NavigateScene, ResetCamera, SceneChanged},
    };

    const EPS: f32 = 1e-4;

    fn settled() -> TestApp {
        let mut test = TestApp::with_two_scenes();
        test.run(300);
        test
    }

    fn editing() -> TestApp {
        let mut test = settled();
        test.send(SetViewMode(ViewMode::Edit));
        test.run(2);
        assert_eq!(test.mode(), ViewMode::Edit);
        test
    }

    #[test]
    fn starts_ambient_with_intro() {
        let mut test = TestApp::with_two_scenes();
        test.update();
        assert_eq!(test.mode(), ViewMode::Ambient);
        assert!(test.cam().is_active());
        assert!(test.cam().motion().is_intro());
        assert!(!test.controls().enabled);
        assert_eq!(test.controls().writer(), PoseWriter::Animator);
        assert!(test.transform().translation.z < 3.0);
    }

    #[test]
    fn ambient_settles_at_rest_and_mirrors_pose() {
        let test = settled();
        let transform = test.transform();
        assert!(transform.translation.abs_diff_eq(Vec3::new(0.0, 0.0, 3.0), 1e-3));
        assert!(test.controls().pose().position.abs_diff_eq(transform.translation, EPS));
        assert!(test.controls().focus().abs_diff_eq(Vec3::ZERO, 1e-3));
        assert_eq!(test.cam().motion(), AmbientMotion::Tracking);
    }

    #[test]
    fn entering_edit_hands_over_without_jump() {
        let mut test = settled();
        let before = test.transform();
        test.send(SetViewMode(ViewMode::Edit));
        test.run(2);

        assert_eq!(test.mode(), ViewMode::Edit);
        assert!(!test.cam().enabled);
        assert!(!test.cam().is_active());
        assert!(test.controls().enabled);
        assert_eq!(test.controls().writer(), PoseWriter::Controls);
        assert_eq!(test.controls().rotate_speed, OrbitControls::EDIT_ROTATE_SPEED);

        let after = test.transform();
        assert!(after.translation.abs_diff_eq(before.translation, EPS));
        assert!(after.rotation.abs_diff_eq(before.rotation, EPS));
    }

    #[test]
    fn entering_edit_twice_changes_nothing() {
        let mut test = editing();
        let pose = *test.controls().pose();
        let pitch_range = test.controls().pitch_range;

        test.send(SetViewMode(ViewMode::Edit));
        test.run(2);

        assert_eq!(test.mode(), ViewMode::Edit);
        assert_eq!(*test.controls().pose(), pose);
        assert_eq!(test.controls().pitch_range, pitch_range);
    }

    #[test]
    fn leaving_edit_resumes_from_controls() {
        let mut test = editing();
        assert!(test.controls_mut().orbit(Vec2::new(200.0, 0.0)));
        test.run(300);
        let edited = test.transform().translation;
        assert!(edited.x < -1.0);

        test.send(ToggleEditMode);
        test.run(2);

        assert_eq!(test.mode(), ViewMode::Ambient);
        assert!(!test.controls().enabled);
        assert_eq!(test.controls().writer(), PoseWriter::Animator);
        assert_eq!(test.cam().motion(), AmbientMotion::Tracking);
        // Resumed near -60 degrees of yaw rather than replaying the intro.
        assert!(test.cam().offset().x < -45.0);

        test.run(600);
        assert!(test.transform().translation.abs_diff_eq(Vec3::new(0.0, 0.0, 3.0), 1e-3));
    }

    #[test]
    fn live_pose_only_in_edit() {
        let mut test = settled();
        assert_eq!(test.resource::<LivePose>().get(), None);

        test.send(ToggleEditMode);
        test.run(2);
        let live = *test.resource::<LivePose>().get().unwrap();
        assert_eq!(live.fov, 50.0);
        assert_eq!(live.camera_position, [0.0, 0.0, 3.0]);
        assert_eq!(live.focus_point, [0.0, 0.0, 0.0]);
        assert_eq!(live.distance, 3.0);

        test.controls_mut().nudge_position(PositionAxis::X, 0.5);
        test.run(10);
        assert_eq!(test.resource::<LivePose>().get().unwrap().camera_position[0], 0.5);

        test.send(ToggleEditMode);
        test.run(2);
        assert_eq!(test.resource::<LivePose>().get(), None);
    }

    #[test]
    fn nudges_apply_in_edit_mode() {
        let mut test = editing();
        let position = test.controls().pose().position;
        let distance = test.controls().pose().distance;

        test.send(CameraNudge::FieldOfView(CameraNudge::FOV_STEP));
        test.send(CameraNudge::Parallax(ParallaxAxis::Yaw, CameraNudge::PARALLAX_STEP));
        test.send(CameraNudge::Position(PositionAxis::Y, CameraNudge::POSITION_STEP));
        test.send(CameraNudge::Distance(CameraNudge::DISTANCE_STEP));
        test.update();

        let overrides = *test.resource::<ModeOverrides>();
        assert_eq!(overrides.active_fov, Some(51.0));
        assert_eq!(overrides.active_parallax.unwrap().yaw, 8.5);
        assert!((test.fov_degrees() - 51.0).abs() < 1e-3);
        assert_eq!(test.cam().parallax.yaw, 8.5);

        let pose = test.controls().pose();
        assert!((pose.position.y - (position.y + 0.05)).abs() < EPS);
        assert!((pose.distance - (distance + 0.1)).abs() < EPS);
    }

    #[test]
    fn nudges_are_ignored_in_ambient_mode() {
        let mut test = settled();
        test.send(CameraNudge::FieldOfView(5.0));
        test.update();
        assert!(test.resource::<ModeOverrides>().is_empty());

        // An old nudge must not leak into the next edit session.
        test.send(ToggleEditMode);
        test.run(2);
        assert!(test.resource::<ModeOverrides>().is_empty());
    }

    #[test]
    fn navigation_forces_ambient_and_clears_overrides() {
        let mut test = editing();
        test.send(CameraNudge::FieldOfView(-15.0));
        test.update();
        assert!((test.fov_degrees() - 35.0).abs() < 1e-3);

        test.send(NavigateScene::Next);
        test.run(2);

        assert_eq!(test.mode(), ViewMode::Ambient);
        assert_eq!(test.resource::<ActiveScene>().index(), 1);
        assert!(test.resource::<ModeOverrides>().is_empty());
        assert_eq!(test.drain::<SceneChanged>(), vec![SceneChanged { index: 1 }]);

        let cam = test.cam();
        assert_eq!(cam.rest_position(), Vec3::new(1.0, 0.5, 4.0));
        assert_eq!(cam.parallax.yaw, 5.0);
        assert!(cam.motion().is_intro());
        assert!((test.fov_degrees() - 40.0).abs() < 1e-3);

        test.run(600);
        assert!(test.transform().translation.abs_diff_eq(Vec3::new(1.0, 0.5, 4.0), 1e-3));
    }

    #[test]
    fn navigation_wraps_around() {
        let mut test = settled();
        test.send(NavigateScene::Previous);
        test.update();
        assert_eq!(test.resource::<ActiveScene>().index(), 1);
        test.send(NavigateScene::Next);
        test.update();
        assert_eq!(test.resource::<ActiveScene>().index(), 0);
    }

    #[test]
    fn scene_zoom_range_limits_dolly() {
        let mut test = settled();
        test.send(NavigateScene::Index(1));
        test.run(2);
        for _ in 0..10 {
            test.send(MouseWheel {
                unit: MouseScrollUnit::Line,
                x: 0.0,
                y: 1.0,
                window: Entity::PLACEHOLDER,
            });
        }
        test.update();
        assert!((test.cam().target_distance() - 4.0 * 0.8).abs() < EPS);
    }

    #[test]
    fn keyboard_dolly_in_ambient() {
        let mut test = settled();
        test.tap(KeyCode::Equal);
        assert!((test.cam().target_distance() - 3.3).abs() < EPS);
        test.update();
        test.tap(KeyCode::Minus);
        assert!((test.cam().target_distance() - 3.0).abs() < EPS);
    }

    #[test]
    fn reset_in_ambient_replays_intro() {
        let mut test = settled();
        test.send(ResetCamera);
        test.update();
        assert!(test.cam().motion().is_intro());
        assert_eq!(test.mode(), ViewMode::Ambient);
    }

    #[test]
    fn reset_in_edit_restores_initial_pose() {
        let mut test = editing();
        test.controls_mut().orbit(Vec2::new(150.0, 60.0));
        test.run(10);
        test.send(ResetCamera);
        test.update();
        assert_eq!(test.mode(), ViewMode::Edit);
        assert!(test.transform().translation.abs_diff_eq(Vec3::new(0.0, 0.0, 3.0), EPS));
        assert_eq!(test.controls().writer(), PoseWriter::Controls);
    }

    #[test]
    fn export_produces_scene_fragment() {
        let mut test = editing();
        test.send(ExportCamera);
        test.update();
        let exported = test.drain::<CameraExported>();
        assert_eq!(exported.len(), 1);
        let value: serde_json::Value = serde_json::from_str(&exported[0].json).unwrap();
        assert_eq!(value["fov"], 50.0);
        assert_eq!(value["cameraPosition"], serde_json::json!([0.0, 0.0, 3.0]));
        assert_eq!(value["focusPoint"], serde_json::json!([0.0, 0.0, 0.0]));
        assert_eq!(value["parallaxAmount"], serde_json::json!({ "yaw": 8.0, "pitch": 4.0 }));
    }

    #[test]
    fn keybindings_drive_the_viewer() {
        let mut test = settled();
        test.tap(KeyCode::KeyX);
        test.update();
        assert_eq!(test.mode(), ViewMode::Edit);

        test.tap(KeyCode::KeyL);
        assert_eq!(test.drain::<CameraExported>().len(), 1);

        test.tap(KeyCode::ArrowRight);
        test.update();
        assert_eq!(test.mode(), ViewMode::Ambient);
        assert_eq!(test.resource::<ActiveScene>().index(), 1);
    }

    #[test]
    fn export_key_is_ignored_in_ambient() {
        let mut test = settled();
        test.tap(KeyCode::KeyL);
        assert!(test.drain::<CameraExported>().is_empty());
    }


    #[test]
    fn pointer_follows_cursor_in_ambient_only() {
        let mut test = settled();
        test.move_cursor(Vec2::new(800.0, 300.0));
        test.update();
        assert_eq!(test.cam().pointer(), Vec2::new(1.0, 0.0));
        let moved = test.drain::<ParallaxPointerMoved>();
        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0].camera, test.camera);
        assert_eq!(moved[0].pointer, Vec2::new(1.0, 0.0));

        test.send(ToggleEditMode);
        test.run(2);
        assert_eq!(test.mode(), ViewMode::Edit);
        assert_eq!(test.cam().pointer(), Vec2::ZERO);

        test.move_cursor(Vec2::new(0.0, 0.0));
        test.update();
        assert!(test.drain::<ParallaxPointerMoved>().is_empty());
        assert_eq!(test.cam().pointer(), Vec2::ZERO);

        // The cursor move made in edit mode is gone by the time ambient resumes.
        test.send(ToggleEditMode);
        test.run(3);
        assert_eq!(test.mode(), ViewMode::Ambient);
        assert_eq!(test.cam().pointer(), Vec2::ZERO);
        assert!(test.drain::<ParallaxPointerMoved>().is_empty());
    }

    #[test]
    fn cursor_at_edge_swings_camera_by_parallax_amount() {
        let mut test = settled();
        test.move_cursor(Vec2::new(800.0, 300.0));
        test.run(600);
        assert!((test.cam().offset().x - 8.0).abs() < 1e-2);
        assert!(test.cam().offset().y.abs() < 1e-2);
        assert!(test.transform().translation.x.abs() > 0.3);
    }

    #[test]
    fn drag_orbits_in_edit_mode() {
        let mut test = editing();
        let before = *test.controls().pose();

        test.hold(MouseButton::Left);
        test.mouse(Vec2::new(100.0, 0.0), 0.0);
        test.update();
        let orbited = *test.controls().pose();
        let turned = 100.0 * OrbitControls::EDIT_ROTATE_SPEED;
        assert!((orbited.angles.y - (before.angles.y - turned)).abs() < 1e-3);
        assert!((orbited.angles.x - before.angles.x).abs() < 1e-3);
        assert!(test.controls().focus().abs_diff_eq(Vec3::ZERO, 1e-3));
        test.release(MouseButton::Left);

        test.hold(MouseButton::Right);
        test.mouse(Vec2::new(0.0, 50.0), 0.0);
        test.update();
        let panned = *test.controls().pose();
        assert_eq!(panned.angles, orbited.angles);
        assert!((panned.distance - orbited.distance).abs() < EPS);
        assert!(!panned.position.abs_diff_eq(orbited.position, 1e-3));
        test.release(MouseButton::Right);

        test.mouse(Vec2::ZERO, 1.0);
        test.update();
        let zoomed = *test.controls().pose();
        assert!((zoomed.distance - panned.distance * 0.9).abs() < 1e-3);
        assert_eq!(test.controls().writer(), PoseWriter::Controls);
    }

    #[test]
    fn shift_drag_pans_in_edit_mode() {
        let mut test = editing();
        let before = *test.controls().pose();
        test.hold_key(KeyCode::ShiftLeft);
        test.hold(MouseButton::Left);
        test.mouse(Vec2::new(40.0, 0.0), 0.0);
        test.update();
        let after = *test.controls().pose();
        assert_eq!(after.angles, before.angles);
        assert!(after.position.x < before.position.x - 1e-3);
    }

    #[test]
    fn drag_does_not_orbit_in_ambient() {
        let mut test = settled();
        let before = test.transform();
        test.hold(MouseButton::Left);
        test.mouse(Vec2::new(100.0, 40.0), 0.0);
        test.run(2);

        assert_eq!(test.controls().writer(), PoseWriter::Animator);
        assert!(test.controls().pose().angles.abs_diff_eq(Vec2::ZERO, 1e-3));
        assert!(test.transform().translation.abs_diff_eq(before.translation, 1e-3));
    }
    #[test]
    fn no_scenes_is_not_fatal() {
        let mut test = TestApp::new(ViewerConfig::default());
        test.run(10);
        test.send(NavigateScene::Next);
        test.send(ToggleEditMode);
        test.run(3);
        assert_eq!(test.mode(), ViewMode::Edit);
        assert!(test.resource::<ActiveScene>().camera().is_none());
        assert!(test.transform().translation.is_finite());
    }
}
