//! Draw command model for the Scrim overlay layer
//!
//! This crate is the producer side of the overlay: the value types scripts
//! emit each tick (commands, the mutex-guarded command list) and the shared
//! resources those commands reference (fonts with their shaped-text caches,
//! decoded images).

pub mod command;
pub mod font;
pub mod image;
pub mod list;
pub mod lru;

pub use command::{Command, EPSILON};
pub use font::{Font, TextLayout};
pub use image::Image;
pub use list::{DrawList, DrawScope};
pub use lru::LruCache;
