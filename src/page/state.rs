//! Per-session state owned by the page controller.

use crate::image::{EncodedImage, GeneratedImage, ImageSource};
use crate::page::view::{BorderState, LoadingState, PreviewHandle};

/// Identifies one issued generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    /// Sequence number of this request.
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// The image the user currently has selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedImage {
    /// Selection sequence number.
    pub id: u64,
    /// Display name of the file.
    pub name: String,
    /// Declared media type; always `image/*`.
    pub media_type: String,
    /// Where the bytes come from.
    pub source: ImageSource,
}

/// Mutable session data. Lives for one session; nothing is persisted.
#[derive(Debug, Default)]
pub struct SessionState {
    pub(crate) selected: Option<SelectedImage>,
    pub(crate) encoded: Option<(u64, EncodedImage)>,
    pub(crate) result: Option<GeneratedImage>,
    pub(crate) preview: Option<PreviewHandle>,
    pub(crate) loading: LoadingState,
    pub(crate) border: BorderState,
    selections_issued: u64,
    requests_issued: u64,
}

impl SessionState {
    /// The current selection, if any.
    pub fn selected(&self) -> Option<&SelectedImage> {
        self.selected.as_ref()
    }

    /// Encoding of the current selection, once it has finished.
    pub fn encoded(&self) -> Option<&EncodedImage> {
        let current = self.selected.as_ref()?.id;
        match &self.encoded {
            Some((id, encoded)) if *id == current => Some(encoded),
            _ => None,
        }
    }

    /// The most recent generated image, if it is still displayed.
    pub fn result(&self) -> Option<&GeneratedImage> {
        self.result.as_ref()
    }

    /// The preview currently on screen.
    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.preview.as_ref()
    }

    /// Returns true while a generation request is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    /// Current upload border style.
    pub fn border(&self) -> BorderState {
        self.border
    }

    pub(crate) fn next_selection_id(&mut self) -> u64 {
        self.selections_issued += 1;
        self.selections_issued
    }

    pub(crate) fn issue_request(&mut self) -> RequestTicket {
        self.requests_issued += 1;
        RequestTicket(self.requests_issued)
    }

    pub(crate) fn is_latest(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.requests_issued
    }
}
