//! Scene composition example - places the subject of an image into a new scene.
//!
//! Run with: `cargo run --example compose_scene -- <input_image.png>`
//!
//! Requires `GOOGLE_API_KEY` environment variable.

use scenegen::{encoder, GeminiProvider, SceneRequest, SceneService, UploadCandidate};

#[tokio::main]
async fn main() -> scenegen::Result<()> {
    let input_path = std::env::args()
        .nth(1)
        .expect("Usage: compose_scene <input_image.png>");

    let candidate = UploadCandidate::from_path(&input_path);
    let encoded = encoder::encode(&candidate.source, &candidate.media_type).await?;

    let provider = GeminiProvider::builder().build()?;
    let image = provider.compose(&SceneRequest::new(encoded)).await?;

    image.save("scene.png")?;
    println!("Scene saved to scene.png ({} bytes)", image.size());

    Ok(())
}
