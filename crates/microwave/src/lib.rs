//! A toy microwave oven: type a cook time, pick a food and press start.
//! A countdown runs on the oven door
//! while a 3D plot animates a standing wave pattern inside it.
//!
//! The simulation logic lives in [`microwave-core`][microwave_core]
//! and is re-exported at the top level of this crate.
//! With the `visuals` feature (on by default)
//! the window and renderer are available as [`visuals`],
//! along with the [`ui`] model of the control form.
//! The `microwave` binary puts it all together.

#![warn(missing_docs)]

#[doc(inline)]
pub use microwave_core::*;

#[cfg(feature = "visuals")]
#[doc(inline)]
pub use microwave_visuals as visuals;

#[cfg(feature = "visuals")]
pub mod ui;
