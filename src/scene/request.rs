//! The composed scene request.

use crate::image::EncodedImage;

/// Built-in instruction sent alongside every reference image.
pub const DEFAULT_SCENE_PROMPT: &str = "Take the main subject of this image and place it \
into a new, photorealistic scene that suits it. Keep the subject's appearance, colours and \
proportions exactly as they are. Match lighting, shadows and perspective so the subject looks \
naturally part of the environment, and return the finished image.";

/// A single generation request: one inline image followed by one instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneRequest {
    /// The encoded reference image.
    pub image: EncodedImage,
    /// The scene-composition instruction.
    pub prompt: String,
}

impl SceneRequest {
    /// Creates a request using [`DEFAULT_SCENE_PROMPT`].
    pub fn new(image: EncodedImage) -> Self {
        Self {
            image,
            prompt: DEFAULT_SCENE_PROMPT.to_string(),
        }
    }

    /// Replaces the instruction text.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }
}
