//! Top-level page controller.

use crate::config::SceneConfig;
use crate::error::{Result, SceneError};
use crate::image::{encoder, EncodedImage, GeneratedImage};
use crate::page::state::{RequestTicket, SessionState};
use crate::page::upload::{self, PendingEncode, UploadCandidate};
use crate::page::view::{BorderState, View};
use crate::scene::{SceneRequest, SceneService};

/// A generation request that has been issued but not yet completed.
#[derive(Debug, Clone)]
#[must_use = "pass the outcome back through `complete_generation`"]
pub struct PendingGeneration {
    /// Ticket identifying this request.
    pub ticket: RequestTicket,
    /// Request to send to the service.
    pub request: SceneRequest,
}

/// What happened to a completed generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The result image is now displayed.
    Displayed,
    /// A newer request was issued; this outcome was discarded.
    Superseded,
}

/// Owns the session state and drives a [`View`] from user actions.
pub struct PageController<S, V> {
    service: S,
    view: V,
    config: SceneConfig,
    state: SessionState,
}

impl<S: SceneService, V: View> PageController<S, V> {
    /// Creates a controller and puts the view in its initial state.
    pub fn new(service: S, mut view: V, config: SceneConfig) -> Self {
        view.set_placeholder_prompt_visible(true);
        view.set_trigger(false, &config.trigger_label);
        view.set_progress_visible(false);
        view.show_result_placeholder();
        view.set_border(BorderState::Default);

        Self {
            service,
            view,
            config,
            state: SessionState::default(),
        }
    }

    /// Session state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The view being driven.
    pub fn view(&self) -> &V {
        &self.view
    }

    /// Mutable access to the view.
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Active configuration.
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// The scene service.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Handles a file chosen in the picker: validate, preview, encode.
    pub async fn select_file(&mut self, candidate: UploadCandidate) -> Result<()> {
        let pending = self.accept(candidate)?;
        let encoded = encoder::encode(&pending.source, &pending.media_type).await;
        self.finish_encode(pending, encoded)
    }

    /// Handles a file dropped on the upload region.
    pub async fn drop_file(&mut self, candidate: UploadCandidate) -> Result<()> {
        upload::drag_leave(&mut self.state, &mut self.view);
        self.select_file(candidate).await
    }

    /// A file is being dragged over the upload region.
    pub fn drag_over(&mut self) {
        upload::drag_over(&mut self.state, &mut self.view);
    }

    /// The drag left the upload region.
    pub fn drag_leave(&mut self) {
        upload::drag_leave(&mut self.state, &mut self.view);
    }

    /// First half of a selection: validate and show the preview.
    ///
    /// The returned [`PendingEncode`] must be encoded and handed back via
    /// [`finish_encode`](Self::finish_encode).
    pub fn accept(&mut self, candidate: UploadCandidate) -> Result<PendingEncode> {
        upload::accept(&mut self.state, &mut self.view, &self.config, candidate)
    }

    /// Second half of a selection: store the encoding if still current.
    pub fn finish_encode(
        &mut self,
        pending: PendingEncode,
        encoded: Result<EncodedImage>,
    ) -> Result<()> {
        match upload::finish_encode(&mut self.state, pending, encoded) {
            Ok(_) => Ok(()),
            Err(e) => {
                tracing::warn!("failed to encode selected image: {e}");
                self.view.alert(&e.to_string());
                Err(e)
            }
        }
    }

    /// Runs one generation: issue, await the service, apply the outcome.
    ///
    /// Failures are alerted on the view before being returned.
    pub async fn generate(&mut self) -> Result<Completion> {
        let pending = self.begin_generation()?;
        let outcome = self.service.compose(&pending.request).await;
        self.complete_generation(pending.ticket, outcome)
    }

    /// Issues a request from the current selection and enters Loading.
    pub fn begin_generation(&mut self) -> Result<PendingGeneration> {
        let Some(encoded) = self.state.encoded().cloned() else {
            let err = SceneError::MissingImage;
            self.view.alert(&err.to_string());
            return Err(err);
        };

        let ticket = self.state.issue_request();
        self.state.result = None;
        self.view.show_result_placeholder();
        self.state.loading.enter(&mut self.view, &self.config);

        tracing::debug!(
            ticket = ticket.get(),
            service = self.service.name(),
            "issued scene request"
        );

        Ok(PendingGeneration {
            ticket,
            request: SceneRequest::new(encoded).with_prompt(self.config.prompt.clone()),
        })
    }

    /// Applies the outcome of `ticket` unless a newer request was issued.
    pub fn complete_generation(
        &mut self,
        ticket: RequestTicket,
        outcome: Result<GeneratedImage>,
    ) -> Result<Completion> {
        if !self.state.is_latest(ticket) {
            tracing::debug!(ticket = ticket.get(), "discarding superseded scene result");
            return Ok(Completion::Superseded);
        }

        self.state.loading.leave(&mut self.view, &self.config);

        match outcome {
            Ok(image) => {
                self.view.show_result(&image);
                self.state.result = Some(image);
                Ok(Completion::Displayed)
            }
            Err(e) => {
                tracing::warn!(ticket = ticket.get(), "scene generation failed: {e}");
                self.state.result = None;
                self.view.alert(&e.to_string());
                self.view.show_result_placeholder();
                Err(e)
            }
        }
    }
}
