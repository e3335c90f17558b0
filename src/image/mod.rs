//! Image types and the base64 encoder.

pub mod encoder;
mod types;

pub use types::{is_image_media_type, EncodedImage, GeneratedImage, ImageFormat, ImageSource};
