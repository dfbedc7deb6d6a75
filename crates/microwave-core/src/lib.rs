//! This is the core crate containing most of `microwave`'s functionality
//! (specifically, everything except the visuals).
//! See the `microwave` crate's documentation for an overview.

#![warn(missing_docs)]

pub mod field;
#[doc(inline)]
pub use field::{FieldFrame, FieldParams, Grid, ParamError};

pub mod animator;
#[doc(inline)]
pub use animator::{AnimationHandle, AnimatorParams, FieldAnimator};

pub mod scheduler;
#[doc(inline)]
pub use scheduler::{Scheduler, TimerHandle};

pub mod session;
#[doc(inline)]
pub use session::{
    CookSession, Controller, ControllerParams, DisplayState, Food, InvalidInput, SessionEvent,
    SessionState,
};

pub use nalgebra as na;
/// A point in the XY plane of the oven, in meters.
pub type Vec2 = na::Vector2<f64>;
