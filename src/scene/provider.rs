//! Scene service trait.

use crate::error::Result;
use crate::image::GeneratedImage;
use crate::scene::request::SceneRequest;
use async_trait::async_trait;

/// A remote service that composes a reference image into a new scene.
#[async_trait]
pub trait SceneService: Send + Sync {
    /// Sends `request` and returns the first image the service produced.
    async fn compose(&self, request: &SceneRequest) -> Result<GeneratedImage>;

    /// Returns the name of this service for display.
    fn name(&self) -> &str;

    /// Checks if the service is reachable and authenticated.
    async fn health_check(&self) -> Result<()>;
}
