//! Steganographic carrier support: hiding framed horcrux bytes inside
//! innocent-looking images.

pub mod image;

pub use image::{embed, extract, load_from_bytes, to_png_bytes, StegoError};
