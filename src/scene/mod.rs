//! Scene request client: the prompt, the service seam, and its providers.

mod provider;
pub mod providers;
mod request;

pub use provider::SceneService;
pub use request::{SceneRequest, DEFAULT_SCENE_PROMPT};
