//! Toolkit for the asset container formats of Indiana Jones and the
//! Infernal Machine: the binary CND level container, its textual NDY
//! counterpart and the GOB archive.
//!
//! ```no_run
//! use cnd::stream::Stream;
//!
//! # fn main() -> cnd::Result<()> {
//! let mut stream = Stream::open("00_cyn.cnd")?;
//! let materials = cnd::cnd::materials::read(&mut stream)?;
//! for mat in &materials {
//!     println!("{} {}x{}", mat.name, mat.width, mat.height);
//! }
//! # Ok(())
//! # }
//! ```

pub mod animation;
pub mod audio;
pub mod cnd;
pub mod cog;
mod error;
pub mod gob;
pub mod key;
pub mod material;
pub mod ndy;
mod shared;
pub mod stream;
pub mod thing;
pub mod world;

pub use error::{CndError, Result, StringError};
pub use shared::{
    idx_from_raw, idx_to_raw, Box3, ColorRgb, FixedString, GradientColor, LinearColor,
    ResourceName, Rotator, Vector2, Vector3,
};
