//! Upload/preview/result workflow driven against an abstract view.

mod controller;
mod state;
pub mod upload;
mod view;

pub use controller::{Completion, PageController, PendingGeneration};
pub use state::{RequestTicket, SelectedImage, SessionState};
pub use upload::{PendingEncode, UploadCandidate};
pub use view::{BorderState, LoadingState, PreviewHandle, View};
