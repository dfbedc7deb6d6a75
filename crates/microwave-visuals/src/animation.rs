//! Parameters for animated visuals.

use std::time::Duration;

use winit::keyboard::KeyCode;

use super::{camera::Camera, color_map, pipelines::Painter};

/// An animated, interactive visualization of some application state.
///
/// To display the animation in a window,
/// use [`RenderWindow::run_animation`][crate::RenderWindow::run_animation].
///
/// The window calls the three functions from its event loop thread:
/// `step` once per loop iteration with the time elapsed since the window opened,
/// `draw` once per frame right after it,
/// and `on_input` whenever a key is pressed, the mouse clicked
/// or the window resized.
/// Nothing runs concurrently, so the state needs no synchronization.
pub struct Animation<State, StepFn, DrawFn, InputFn>
where
    StepFn: FnMut(&mut State, Duration),
    DrawFn: FnMut(&State, &mut Painter),
    InputFn: FnMut(Input, &mut State),
{
    #[allow(missing_docs)]
    pub params: AnimationParams,
    /// Application state, owned by the window while it runs.
    pub state: State,
    /// Advance the state to the given time since the window opened.
    pub step: StepFn,
    /// Draw the current state.
    pub draw: DrawFn,
    /// React to a key press, click or resize.
    pub on_input: InputFn,
}

/// Settings an [`Animation`] starts with.
#[derive(Clone, Debug)]
pub struct AnimationParams {
    /// Color maps to cycle through with `F2`, the first one active at start.
    /// Default: [`all_builtins`][color_map::builtin_color_maps::all_builtins].
    pub color_maps: Vec<color_map::ColorMap>,
    /// Viewpoint of everything drawn in 3D. Default: [`Camera::default`].
    pub camera: Camera,
}

impl Default for AnimationParams {
    fn default() -> Self {
        Self {
            color_maps: color_map::builtin_color_maps::all_builtins(),
            camera: Camera::default(),
        }
    }
}

/// User input delivered to [`Animation::on_input`].
#[derive(Clone, Debug, PartialEq)]
pub enum Input {
    /// A key was pressed.
    Key {
        /// Physical location of the key.
        code: KeyCode,
        /// Text the key press produced with the current keyboard layout, if any.
        text: Option<String>,
    },
    /// The left mouse button was pressed
    /// at the given position in window pixels.
    Click {
        #[allow(missing_docs)]
        x: f32,
        #[allow(missing_docs)]
        y: f32,
    },
    /// The window was created or changed size, given in physical pixels.
    Resized {
        #[allow(missing_docs)]
        width: u32,
        #[allow(missing_docs)]
        height: u32,
    },
}
