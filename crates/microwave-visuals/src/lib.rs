//! Windowed, GPU-rendered visuals for the `microwave` oven simulator.
//!
//! A [`RenderWindow`] plays an [`Animation`]:
//! the animation's `step` advances application state,
//! `draw` describes the frame through a [`Painter`]
//! (panels, text, a field surface with 3D axes),
//! and `on_input` receives keys, clicks and resizes.

#![warn(missing_docs)]

mod animation;
#[doc(inline)]
pub use animation::{Animation, AnimationParams, Input};

mod camera;
#[doc(inline)]
pub use camera::Camera;

mod color_map;
#[doc(inline)]
pub use color_map::{builtin_color_maps, Color, ColorMap};

pub(crate) mod pipelines;
#[doc(inline)]
pub use pipelines::{
    axes::AxesParams,
    lines::LineParams,
    text::{TextAnchor, TextColor, TextParams, TextPosition},
    Painter,
};

mod rect;
#[doc(inline)]
pub use rect::Rect;

mod render_window;
#[doc(inline)]
pub use render_window::{RenderWindow, WindowParams};

pub use glyphon;
pub use palette;
pub use winit::keyboard::KeyCode;
