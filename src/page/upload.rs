//! Upload handling: validation, preview, and encoding hand-off.

use crate::config::SceneConfig;
use crate::error::{Result, SceneError};
use crate::image::{is_image_media_type, EncodedImage, ImageSource};
use crate::page::state::{SelectedImage, SessionState};
use crate::page::view::{BorderState, PreviewHandle, View};
use std::path::Path;

/// Message shown when a non-image file is offered.
pub const NOT_AN_IMAGE_MESSAGE: &str = "Please upload an image file.";

/// A file offered by the picker or a drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCandidate {
    /// Display name.
    pub name: String,
    /// Declared media type.
    pub media_type: String,
    /// Where the bytes come from.
    pub source: ImageSource,
}

impl UploadCandidate {
    /// Creates a candidate from in-memory bytes.
    pub fn from_bytes(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            source: ImageSource::Bytes(bytes),
        }
    }

    /// Creates a candidate for a file on disk, declaring its media type from
    /// the extension.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let media_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_string();

        Self {
            name,
            media_type,
            source: ImageSource::Path(path.to_path_buf()),
        }
    }
}

/// An accepted selection whose encoding has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "finish the encode to make the selection usable"]
pub struct PendingEncode {
    /// Selection the encoding belongs to.
    pub selection: u64,
    /// Declared media type.
    pub media_type: String,
    /// Bytes to encode.
    pub source: ImageSource,
}

/// Validates `candidate` and, if it is an image, makes it the current selection.
pub(crate) fn accept<V: View + ?Sized>(
    state: &mut SessionState,
    view: &mut V,
    config: &SceneConfig,
    candidate: UploadCandidate,
) -> Result<PendingEncode> {
    if !is_image_media_type(&candidate.media_type) {
        tracing::warn!(
            name = %candidate.name,
            media_type = %candidate.media_type,
            "rejected non-image upload"
        );
        view.alert(NOT_AN_IMAGE_MESSAGE);
        return Err(SceneError::Validation(NOT_AN_IMAGE_MESSAGE.into()));
    }

    let id = state.next_selection_id();
    let preview = PreviewHandle {
        id,
        name: candidate.name.clone(),
        source: candidate.source.clone(),
    };
    if let Some(old) = state.preview.replace(preview.clone()) {
        view.revoke_preview(&old);
    }
    view.show_preview(&preview);
    view.set_placeholder_prompt_visible(false);
    if !state.loading.is_loading() {
        view.set_trigger(true, &config.trigger_label);
    }

    tracing::debug!(id, name = %candidate.name, "accepted upload");

    state.selected = Some(SelectedImage {
        id,
        name: candidate.name,
        media_type: candidate.media_type.clone(),
        source: candidate.source.clone(),
    });

    Ok(PendingEncode {
        selection: id,
        media_type: candidate.media_type,
        source: candidate.source,
    })
}

/// Stores a finished encoding if its selection is still current.
///
/// Returns `Ok(false)` when a newer selection superseded this one; the
/// outcome is dropped whether it succeeded or not.
pub(crate) fn finish_encode(
    state: &mut SessionState,
    pending: PendingEncode,
    result: Result<EncodedImage>,
) -> Result<bool> {
    if state.selected.as_ref().map(|s| s.id) != Some(pending.selection) {
        tracing::debug!(
            selection = pending.selection,
            failed = result.is_err(),
            "dropping superseded encoding"
        );
        return Ok(false);
    }

    state.encoded = Some((pending.selection, result?));
    Ok(true)
}

/// Highlights the upload region while a file is dragged over it.
pub(crate) fn drag_over<V: View + ?Sized>(state: &mut SessionState, view: &mut V) {
    set_border(state, view, BorderState::Highlighted);
}

/// Restores the upload region border.
pub(crate) fn drag_leave<V: View + ?Sized>(state: &mut SessionState, view: &mut V) {
    set_border(state, view, BorderState::Default);
}

fn set_border<V: View + ?Sized>(state: &mut SessionState, view: &mut V, border: BorderState) {
    if state.border != border {
        state.border = border;
        view.set_border(border);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::testing::RecordingView;

    fn png(name: &str) -> UploadCandidate {
        UploadCandidate::from_bytes(name, "image/png", vec![0x89, b'P', b'N', b'G'])
    }

    #[test]
    fn test_from_path_guesses_media_type() {
        let candidate = UploadCandidate::from_path("/tmp/photos/cat.png");
        assert_eq!(candidate.name, "cat.png");
        assert_eq!(candidate.media_type, "image/png");

        let candidate = UploadCandidate::from_path("notes.txt");
        assert_eq!(candidate.media_type, "text/plain");

        let candidate = UploadCandidate::from_path("blob");
        assert_eq!(candidate.media_type, "application/octet-stream");
    }

    #[test]
    fn test_rejects_non_image() {
        let config = SceneConfig::default();
        let mut state = SessionState::default();
        let mut view = RecordingView::default();

        let candidate = UploadCandidate::from_bytes("doc.pdf", "application/pdf", vec![1]);
        let err = accept(&mut state, &mut view, &config, candidate).unwrap_err();

        assert!(matches!(err, SceneError::Validation(_)));
        assert!(state.selected().is_none());
        assert!(!view.trigger_enabled);
        assert_eq!(view.alerts, vec![NOT_AN_IMAGE_MESSAGE.to_string()]);
    }

    #[test]
    fn test_rejection_keeps_prior_selection() {
        let config = SceneConfig::default();
        let mut state = SessionState::default();
        let mut view = RecordingView::default();

        let _ = accept(&mut state, &mut view, &config, png("cat.png")).unwrap();
        let candidate = UploadCandidate::from_bytes("a.txt", "text/plain", vec![1]);
        assert!(accept(&mut state, &mut view, &config, candidate).is_err());

        assert_eq!(state.selected().unwrap().name, "cat.png");
        assert!(view.trigger_enabled);
    }

    #[test]
    fn test_new_selection_revokes_old_preview() {
        let config = SceneConfig::default();
        let mut state = SessionState::default();
        let mut view = RecordingView::default();

        let _ = accept(&mut state, &mut view, &config, png("one.png")).unwrap();
        let _ = accept(&mut state, &mut view, &config, png("two.png")).unwrap();

        assert_eq!(view.revoked.len(), 1);
        assert_eq!(view.revoked[0].name, "one.png");
        assert_eq!(view.preview.as_ref().unwrap().name, "two.png");
        assert!(!view.placeholder_prompt_visible);
    }

    #[test]
    fn test_superseded_encoding_is_dropped() {
        let config = SceneConfig::default();
        let mut state = SessionState::default();
        let mut view = RecordingView::default();
        let encoded = |payload: &str| EncodedImage {
            media_type: "image/png".into(),
            payload: payload.into(),
        };

        let first = accept(&mut state, &mut view, &config, png("one.png")).unwrap();
        let second = accept(&mut state, &mut view, &config, png("two.png")).unwrap();

        assert!(finish_encode(&mut state, second, Ok(encoded("two"))).unwrap());
        assert!(!finish_encode(&mut state, first, Ok(encoded("one"))).unwrap());
        assert_eq!(state.encoded().unwrap().payload, "two");
    }

    #[test]
    fn test_superseded_read_failure_is_dropped() {
        let config = SceneConfig::default();
        let mut state = SessionState::default();
        let mut view = RecordingView::default();
        let old = UploadCandidate::from_path("/nope/old.png");

        let first = accept(&mut state, &mut view, &config, old).unwrap();
        let second = accept(&mut state, &mut view, &config, png("new.png")).unwrap();
        let encoded = EncodedImage {
            media_type: "image/png".into(),
            payload: "bmV3".into(),
        };
        assert!(finish_encode(&mut state, second, Ok(encoded)).unwrap());

        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let stale = finish_encode(&mut state, first, Err(SceneError::Read(missing)));

        assert!(matches!(stale, Ok(false)));
        assert_eq!(state.encoded().unwrap().payload, "bmV3");
        assert!(view.alerts.is_empty());
    }

    #[test]
    fn test_current_read_failure_is_returned() {
        let config = SceneConfig::default();
        let mut state = SessionState::default();
        let mut view = RecordingView::default();

        let pending = accept(&mut state, &mut view, &config, png("cat.png")).unwrap();
        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let result = finish_encode(&mut state, pending, Err(SceneError::Read(missing)));

        assert!(matches!(result, Err(SceneError::Read(_))));
        assert!(state.encoded().is_none());
    }

    #[test]
    fn test_drag_border_transitions() {
        let mut state = SessionState::default();
        let mut view = RecordingView::default();

        drag_over(&mut state, &mut view);
        drag_over(&mut state, &mut view);
        assert_eq!(state.border(), BorderState::Highlighted);
        assert_eq!(view.border, BorderState::Highlighted);

        drag_leave(&mut state, &mut view);
        assert_eq!(view.border, BorderState::Default);
        assert_eq!(view.border_changes, 2);
    }
}
