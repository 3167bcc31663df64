//! Layered PBR texture painting
//!
//! This crate holds the painting core of the material painter:
//! - [`session`] - The paint session state machine and command dispatch
//! - [`sampler`] - Screen position to UV hit, with screen-space brush sizing
//! - [`canvas`] - One parameter raster per (layer, semantic)
//! - [`layer`] / [`stack`] - Material layers and their composition
//! - [`tiles`] - Tiled rasters with dirty tracking and stamp application
//! - [`mask`] - Procedural falloff and imported brush masks
//! - [`material`] - Shader property discovery
//! - [`export`] - Baking canvases to images and a new material

pub mod brush;
pub mod canvas;
pub mod channel;
pub mod color;
pub mod constants;
pub mod error;
pub mod export;
pub mod image_io;
pub mod layer;
pub mod mask;
pub mod material;
pub mod raycast;
pub mod sampler;
pub mod sampling;
pub mod session;
pub mod stack;
pub mod surface;
pub mod tiles;
pub mod types;
pub mod validation;

pub use brush::*;
pub use canvas::*;
pub use channel::*;
pub use constants::*;
pub use error::*;
pub use export::*;
pub use layer::*;
pub use mask::*;
pub use material::*;
pub use sampler::*;
pub use session::*;
pub use stack::*;
pub use surface::*;
pub use tiles::*;
pub use types::*;
pub use validation::*;
