//! Default keyboard shortcuts of the viewer.

use bevy_ecs::prelude::*;
use bevy_input::prelude::*;
use bevy_reflect::prelude::*;
use bevy_state::prelude::*;

use super::{readback::ExportCamera, ToggleEditMode, ViewMode};
use crate::scene::{NavigateScene, ResetCamera};

/// Keys for mode switching, navigation, and the edit mode actions.
#[derive(Resource, Debug, Clone, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct ViewerKeybindings {
    /// Set to `false` to drive the viewer entirely through events.
    pub enabled: bool,
    /// Switches between ambient and edit mode.
    pub toggle_edit: KeyCode,
    /// Shows the next scene, wrapping around.
    pub next_scene: KeyCode,
    /// Shows the previous scene, wrapping around.
    pub previous_scene: KeyCode,
    /// Edit mode only.
    pub reset_camera: KeyCode,
    /// Edit mode only.
    pub export_camera: KeyCode,
}

impl Default for ViewerKeybindings {
    fn default() -> Self {
        Self {
            enabled: true,
            toggle_edit: KeyCode::KeyX,
            next_scene: KeyCode::ArrowRight,
            previous_scene: KeyCode::ArrowLeft,
            reset_camera: KeyCode::KeyR,
            export_camera: KeyCode::KeyL,
        }
    }
}

/// Turn key presses into viewer requests.
pub fn handle_viewer_keys(
    keys: Res<ButtonInput<KeyCode>>,
    bindings: Res<ViewerKeybindings>,
    mode: Res<State<ViewMode>>,
    mut toggle: EventWriter<ToggleEditMode>,
    mut navigate: EventWriter<NavigateScene>,
    mut reset: EventWriter<ResetCamera>,
    mut export: EventWriter<ExportCamera>,
) {
    if !bindings.enabled {
        return;
    }

    if keys.just_pressed(bindings.next_scene) {
        navigate.write(NavigateScene::Next);
    } else if keys.just_pressed(bindings.previous_scene) {
        navigate.write(NavigateScene::Previous);
    } else if keys.just_pressed(bindings.toggle_edit) {
        toggle.write(ToggleEditMode);
    } else if *mode.get() == ViewMode::Edit {
        if keys.just_pressed(bindings.export_camera) {
            export.write(ExportCamera);
        } else if keys.just_pressed(bindings.reset_camera) {
            reset.write(ResetCamera);
        }
    }
}
