#![warn(missing_docs)]
//! scenegen - compose a reference image into a generated scene.
//!
//! The user selects an image; it is validated, previewed, and encoded as
//! base64. Triggering generation sends the image together with a fixed
//! scene-composition prompt to a multimodal model and displays the first
//! image part of the reply.
//!
//! # Quick Start
//!
//! ```no_run
//! use scenegen::{GeminiProvider, SceneRequest, SceneService, encoder};
//! use scenegen::image::ImageSource;
//!
//! #[tokio::main]
//! async fn main() -> scenegen::Result<()> {
//!     let provider = GeminiProvider::builder().build()?;
//!     let source = ImageSource::Path("cat.png".into());
//!     let encoded = encoder::encode(&source, "image/png").await?;
//!     let image = provider.compose(&SceneRequest::new(encoded)).await?;
//!     image.save("scene.png")?;
//!     Ok(())
//! }
//! ```
//!
//! Interactive front ends implement [`View`] and drive a [`PageController`],
//! which owns the session state and reports failures through the view.
//!
//! # Features
//!
//! - `gemini`: Gemini (Google) image models over HTTP
//! - `cli`: the `scenegen` command-line front end

pub mod config;
mod error;
pub mod image;
pub mod page;
pub mod scene;

pub use config::SceneConfig;
pub use error::{ErrorKind, Result, SceneError};
pub use image::{encoder, EncodedImage, GeneratedImage, ImageFormat, ImageSource};
pub use page::{
    BorderState, Completion, PageController, PreviewHandle, UploadCandidate, View,
};
pub use scene::{SceneRequest, SceneService, DEFAULT_SCENE_PROMPT};

#[cfg(feature = "gemini")]
pub use scene::providers::{GeminiModel, GeminiProvider, GeminiProviderBuilder};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{Result, SceneError};
    pub use crate::page::{PageController, UploadCandidate, View};
    pub use crate::scene::{SceneRequest, SceneService};

    #[cfg(feature = "gemini")]
    pub use crate::scene::providers::GeminiProvider;
}
