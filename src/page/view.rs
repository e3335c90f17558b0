//! The view surface and the Idle/Loading state helper.

use crate::config::SceneConfig;
use crate::image::{GeneratedImage, ImageSource};

/// Border style of the upload region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BorderState {
    /// Resting style.
    #[default]
    Default,
    /// A file is being dragged over the region.
    Highlighted,
}

/// A transient handle used to render the upload preview.
///
/// Each accepted selection gets a fresh handle; the previous one is revoked
/// through [`View::revoke_preview`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewHandle {
    /// Selection this preview belongs to.
    pub id: u64,
    /// Display name of the selected file.
    pub name: String,
    /// Where the preview bytes come from.
    pub source: ImageSource,
}

/// Everything the page controller can change on screen.
pub trait View {
    /// Shows a blocking, user-facing message.
    fn alert(&mut self, message: &str);

    /// Renders the upload preview.
    fn show_preview(&mut self, preview: &PreviewHandle);

    /// Releases a preview handle that is no longer displayed.
    fn revoke_preview(&mut self, preview: &PreviewHandle);

    /// Shows or hides the "drop an image here" prompt.
    fn set_placeholder_prompt_visible(&mut self, visible: bool);

    /// Updates the generation trigger.
    fn set_trigger(&mut self, enabled: bool, label: &str);

    /// Shows or hides the progress indicator.
    fn set_progress_visible(&mut self, visible: bool);

    /// Displays a generated image in the result region.
    fn show_result(&mut self, image: &GeneratedImage);

    /// Reverts the result region to its empty placeholder.
    fn show_result_placeholder(&mut self);

    /// Changes the upload region border.
    fn set_border(&mut self, border: BorderState);
}

/// Idle/Loading flag with its two transitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadingState {
    loading: bool,
}

impl LoadingState {
    /// Returns true while a request is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Shows progress and disables the trigger with the working label.
    pub fn enter<V: View + ?Sized>(&mut self, view: &mut V, config: &SceneConfig) {
        self.loading = true;
        view.set_progress_visible(true);
        view.set_trigger(false, &config.working_label);
    }

    /// Hides progress and restores the trigger.
    pub fn leave<V: View + ?Sized>(&mut self, view: &mut V, config: &SceneConfig) {
        self.loading = false;
        view.set_progress_visible(false);
        view.set_trigger(true, &config.trigger_label);
    }
}
