//! Session configuration: prompt text, trigger labels and model.

use crate::error::{Result, SceneError};
#[cfg(feature = "gemini")]
use crate::scene::providers::GeminiModel;
use crate::scene::DEFAULT_SCENE_PROMPT;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable that overrides the built-in scene prompt.
pub const PROMPT_ENV_VAR: &str = "SCENEGEN_PROMPT";

/// Static configuration for a scene session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Instruction sent with every reference image.
    pub prompt: String,
    /// Trigger label while idle.
    pub trigger_label: String,
    /// Trigger label while a request is in flight.
    pub working_label: String,
    /// Gemini model used for generation.
    #[cfg(feature = "gemini")]
    pub model: GeminiModel,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_SCENE_PROMPT.to_string(),
            trigger_label: "Generate Scene".to_string(),
            working_label: "Generating...".to_string(),
            #[cfg(feature = "gemini")]
            model: GeminiModel::default(),
        }
    }
}

impl SceneConfig {
    /// Defaults, with the prompt taken from `SCENEGEN_PROMPT` when set.
    pub fn from_env() -> Self {
        let config = Self::default();
        match std::env::var(PROMPT_ENV_VAR) {
            Ok(prompt) if !prompt.trim().is_empty() => config.with_prompt(prompt),
            _ => config,
        }
    }

    /// Loads a JSON configuration file; missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = read_config_text(path.as_ref())?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Replaces the prompt.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Reads the prompt from a text file.
    pub fn with_prompt_file(self, path: impl AsRef<Path>) -> Result<Self> {
        let prompt = read_config_text(path.as_ref())?;
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(SceneError::InvalidRequest("prompt file is empty".into()));
        }
        Ok(self.with_prompt(prompt))
    }

    /// Sets the idle and working trigger labels.
    pub fn with_labels(mut self, idle: impl Into<String>, working: impl Into<String>) -> Self {
        self.trigger_label = idle.into();
        self.working_label = working.into();
        self
    }

    /// Selects the Gemini model.
    #[cfg(feature = "gemini")]
    pub fn with_model(mut self, model: GeminiModel) -> Self {
        self.model = model;
        self
    }
}

fn read_config_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| SceneError::Config {
        path: path.to_path_buf(),
        source,
    })
}
