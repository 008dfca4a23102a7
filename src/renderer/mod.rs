//! Rendering module
//!
//! The scene is painted onto a [`Surface`]. On the web the surface is a
//! [`ShapeBatch`] that [`RenderState`] uploads to WebGPU (or WebGL2).

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod surface;

pub use pipeline::RenderState;
pub use scene::{Palette, RenderOptions, draw};
pub use shapes::ShapeBatch;
pub use surface::{Color, CommandRecorder, DrawCommand, Surface};
