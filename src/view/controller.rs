//! The generation view: state plus the client it submits to.

use crate::image::{AspectRatio, GenerationRequest, ImageClient};
use crate::view::render::Frame;
use crate::view::state::{Settled, Submission, Ticket, ViewState};
use std::future::Future;

/// A request captured by [`GenerationView::begin`] that has not been sent
/// yet.
#[derive(Debug)]
pub struct PendingGeneration {
    ticket: Ticket,
    request: GenerationRequest,
    client: ImageClient,
}

impl PendingGeneration {
    /// Tag identifying this submission.
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// Payload that will be sent.
    pub fn request(&self) -> &GenerationRequest {
        &self.request
    }

    /// Issues the call. Owns everything it needs, so it can be spawned.
    pub fn run(self) -> impl Future<Output = Settled> + Send + 'static {
        async move { Settled::from(self.client.generate_request(&self.request).await) }
    }

    /// Runs the call on its own task so that a panic inside the provider
    /// settles as [`Settled::Unrecognized`] instead of unwinding the view.
    pub async fn run_isolated(self) -> Settled {
        settle_join(tokio::spawn(self.run()).await)
    }
}

/// Maps a joined generation task onto its outcome.
pub fn settle_join(joined: Result<Settled, tokio::task::JoinError>) -> Settled {
    match joined {
        Ok(settled) => settled,
        Err(e) => {
            if e.is_panic() {
                tracing::error!("generation task panicked");
            } else {
                tracing::debug!("generation task cancelled");
            }
            Settled::Unrecognized
        }
    }
}

/// Owns the view state and drives it through submissions.
#[derive(Debug)]
pub struct GenerationView {
    state: ViewState,
    client: ImageClient,
}

impl GenerationView {
    /// Creates an idle view submitting to `client`.
    pub fn new(client: ImageClient) -> Self {
        Self {
            state: ViewState::new(),
            client,
        }
    }

    /// Current state.
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Renders the current state.
    pub fn frame(&self) -> Frame {
        Frame::render(&self.state)
    }

    /// Replaces the prompt.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.state.set_prompt(prompt);
    }

    /// Selects an aspect ratio.
    pub fn select_aspect_ratio(&mut self, ratio: AspectRatio) {
        self.state.select_aspect_ratio(ratio);
    }

    /// Presses submit. Returns the request to run, or `None` when local
    /// validation rejected the prompt.
    pub fn begin(&mut self) -> Option<PendingGeneration> {
        match self.state.submit() {
            Submission::Rejected => {
                tracing::debug!("submission rejected: empty prompt");
                None
            }
            Submission::Started { ticket, request } => Some(PendingGeneration {
                ticket,
                request,
                client: self.client.clone(),
            }),
        }
    }

    /// Applies a finished request. Returns `false` if it was stale.
    pub fn settle(&mut self, ticket: Ticket, settled: Settled) -> bool {
        self.state.settle(ticket, settled)
    }

    /// Presses submit and waits for the request to settle.
    pub async fn submit(&mut self) -> &ViewState {
        if let Some(pending) = self.begin() {
            let ticket = pending.ticket();
            let settled = pending.run_isolated().await;
            self.settle(ticket, settled);
        }
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WeaverError;
    use crate::image::testing::{Reply, ScriptedProvider};
    use crate::view::render::Canvas;
    use crate::view::state::{EMPTY_PROMPT_MESSAGE, UNKNOWN_ERROR_MESSAGE};

    fn view_with(replies: Vec<Reply>) -> (GenerationView, std::sync::Arc<ScriptedProvider>) {
        let provider = ScriptedProvider::new(replies);
        (GenerationView::new(ImageClient::new(provider.clone())), provider)
    }

    #[tokio::test]
    async fn test_red_fox_scenario() {
        let (mut view, provider) = view_with(vec![Reply::Image("QQ==")]);
        view.set_prompt("a red fox in snow");
        view.select_aspect_ratio(AspectRatio::Landscape);

        let state = view.submit().await;
        assert!(!state.is_loading());
        assert!(state.error().is_none());

        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].prompt, "a red fox in snow");
        assert_eq!(calls[0].aspect_ratio.as_str(), "16:9");

        match view.frame().canvas {
            Canvas::Image { src, .. } => assert_eq!(src, "data:image/jpeg;base64,QQ=="),
            other => panic!("expected image, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_blank_prompt_makes_no_call() {
        let (mut view, provider) = view_with(vec![]);
        for prompt in ["", "   ", "\n\t"] {
            view.set_prompt(prompt);
            let state = view.submit().await;
            assert_eq!(state.error(), Some(EMPTY_PROMPT_MESSAGE));
        }
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_one_call_per_ratio() {
        let (mut view, provider) = view_with(vec![]);
        view.set_prompt("lighthouse at dusk");
        for ratio in AspectRatio::ALL {
            view.select_aspect_ratio(ratio);
            view.submit().await;
        }

        let ratios: Vec<AspectRatio> = provider.calls().iter().map(|r| r.aspect_ratio).collect();
        assert_eq!(ratios, AspectRatio::ALL.to_vec());
        assert!(provider.calls().iter().all(|r| r.prompt == "lighthouse at dusk"));
    }

    #[tokio::test]
    async fn test_quota_scenario() {
        let (mut view, _) = view_with(vec![Reply::Fail(WeaverError::Service(
            "quota exceeded".into(),
        ))]);
        view.set_prompt("a cat");

        let state = view.submit().await;
        assert_eq!(state.error(), Some("Failed to generate image: quota exceeded"));
        assert!(state.image().is_none());
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn test_empty_result_scenario() {
        let (mut view, _) = view_with(vec![Reply::Empty]);
        view.set_prompt("a cat");

        let state = view.submit().await;
        assert_eq!(
            state.error(),
            Some("Image generation failed: No image data received from the API.")
        );
    }

    #[tokio::test]
    async fn test_provider_panic_uses_fallback() {
        let (mut view, _) = view_with(vec![Reply::Panic]);
        view.set_prompt("a cat");

        let state = view.submit().await;
        assert_eq!(state.error(), Some(UNKNOWN_ERROR_MESSAGE));
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn test_begin_disables_submit_until_settled() {
        let (mut view, _) = view_with(vec![]);
        view.set_prompt("a cat");

        let pending = view.begin().unwrap();
        assert!(view.frame().submit.disabled);

        let ticket = pending.ticket();
        let settled = pending.run().await;
        assert!(view.settle(ticket, settled));
        assert!(!view.frame().submit.disabled);
    }
}
