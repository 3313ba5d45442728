//! View state and its transitions.

use crate::error::GenerationError;
use crate::image::{AspectRatio, GeneratedImage, GenerationRequest};

/// Shown when a submission has nothing but whitespace to send.
pub const EMPTY_PROMPT_MESSAGE: &str = "Please enter a description for the image.";

/// Shown when a generation ended without a recognised error value.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred.";

/// Identifies one submission. Results carrying an older ticket are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    /// The request generation this ticket was issued for.
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Where the view currently is in its request cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing generated yet and no error to show.
    Idle,
    /// A request is in flight.
    Loading,
    /// The last request produced an image.
    Success,
    /// The last submission or request failed.
    Failed,
}

/// Result of pressing submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Local validation failed; no request should be made.
    Rejected,
    /// A request should be made with exactly this payload.
    Started {
        /// Tag to hand back with the result.
        ticket: Ticket,
        /// Prompt and ratio captured at submit time.
        request: GenerationRequest,
    },
}

/// How an in-flight request ended.
#[derive(Debug)]
pub enum Settled {
    /// The client returned an image.
    Succeeded(GeneratedImage),
    /// The client returned a classified error.
    Failed(GenerationError),
    /// The request ended without a recognised error value (the task
    /// panicked or was aborted).
    Unrecognized,
}

impl From<Result<GeneratedImage, GenerationError>> for Settled {
    fn from(result: Result<GeneratedImage, GenerationError>) -> Self {
        match result {
            Ok(image) => Self::Succeeded(image),
            Err(e) => Self::Failed(e),
        }
    }
}

/// Everything the view shows. Mutated only by user input and by settling
/// the current request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    prompt: String,
    aspect_ratio: AspectRatio,
    image: Option<GeneratedImage>,
    is_loading: bool,
    error: Option<String>,
    generation: u64,
}

impl ViewState {
    /// Creates an idle view with an empty prompt and the default ratio.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current prompt text, as typed.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Currently selected ratio.
    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    /// Last generated image, if any.
    pub fn image(&self) -> Option<&GeneratedImage> {
        self.image.as_ref()
    }

    /// Whether a request is in flight.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Message of the last failure, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Number of submissions that reached the client so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Derived phase.
    pub fn phase(&self) -> Phase {
        if self.is_loading {
            Phase::Loading
        } else if self.image.is_some() {
            Phase::Success
        } else if self.error.is_some() {
            Phase::Failed
        } else {
            Phase::Idle
        }
    }

    /// Replaces the prompt. Allowed at any time, including mid-flight.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    /// Selects a ratio. Allowed at any time, including mid-flight.
    pub fn select_aspect_ratio(&mut self, ratio: AspectRatio) {
        self.aspect_ratio = ratio;
    }

    /// Handles the submit action.
    ///
    /// The emptiness check looks at the trimmed prompt, but the request
    /// carries the prompt exactly as typed.
    pub fn submit(&mut self) -> Submission {
        if self.prompt.trim().is_empty() {
            // Failed shows no image, so a rejected submit drops the old one.
            self.image = None;
            self.error = Some(EMPTY_PROMPT_MESSAGE.to_string());
            return Submission::Rejected;
        }

        self.is_loading = true;
        self.error = None;
        self.image = None;
        self.generation += 1;

        Submission::Started {
            ticket: Ticket(self.generation),
            request: GenerationRequest::new(self.prompt.clone())
                .with_aspect_ratio(self.aspect_ratio),
        }
    }

    /// Applies the outcome of the request identified by `ticket`.
    ///
    /// Returns `false` and leaves the state untouched when the ticket is
    /// not the latest one issued.
    pub fn settle(&mut self, ticket: Ticket, settled: Settled) -> bool {
        if ticket.0 != self.generation {
            tracing::debug!(
                stale = ticket.0,
                current = self.generation,
                "dropping stale generation result"
            );
            return false;
        }

        match settled {
            Settled::Succeeded(image) => {
                self.image = Some(image);
                self.error = None;
            }
            Settled::Failed(e) => {
                self.image = None;
                self.error = Some(e.message().to_string());
            }
            Settled::Unrecognized => {
                self.image = None;
                self.error = Some(UNKNOWN_ERROR_MESSAGE.to_string());
            }
        }
        self.is_loading = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WeaverError;

    fn started(state: &mut ViewState) -> (Ticket, GenerationRequest) {
        match state.submit() {
            Submission::Started { ticket, request } => (ticket, request),
            Submission::Rejected => panic!("expected submission to start"),
        }
    }

    #[test]
    fn test_initial_state() {
        let state = ViewState::new();
        assert_eq!(state.prompt(), "");
        assert_eq!(state.aspect_ratio(), AspectRatio::Square);
        assert!(!state.is_loading());
        assert!(state.image().is_none());
        assert!(state.error().is_none());
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn test_blank_prompts_are_rejected() {
        for prompt in ["", " ", "   ", "\t\n", " \r\n  "] {
            let mut state = ViewState::new();
            state.set_prompt(prompt);
            assert_eq!(state.submit(), Submission::Rejected);
            assert_eq!(state.error(), Some(EMPTY_PROMPT_MESSAGE));
            assert!(!state.is_loading());
            assert_eq!(state.generation(), 0);
            assert_eq!(state.phase(), Phase::Failed);
        }
    }

    #[test]
    fn test_submit_captures_untrimmed_prompt_and_ratio() {
        for ratio in AspectRatio::ALL {
            let mut state = ViewState::new();
            state.set_prompt("  a red fox in snow ");
            state.select_aspect_ratio(ratio);

            let (_, request) = started(&mut state);
            assert_eq!(request.prompt, "  a red fox in snow ");
            assert_eq!(request.aspect_ratio, ratio);
            assert!(state.is_loading());
            assert_eq!(state.phase(), Phase::Loading);
        }
    }

    #[test]
    fn test_submit_clears_previous_outcome() {
        let mut state = ViewState::new();
        state.set_prompt("a cat");
        let (ticket, _) = started(&mut state);
        state.settle(ticket, Settled::Succeeded(GeneratedImage::from_base64("QQ==")));
        assert!(state.image().is_some());

        started(&mut state);
        assert!(state.image().is_none());
        assert!(state.error().is_none());
    }

    #[test]
    fn test_success_sets_image() {
        let mut state = ViewState::new();
        state.set_prompt("a cat");
        let (ticket, _) = started(&mut state);

        assert!(state.settle(ticket, Settled::Succeeded(GeneratedImage::from_base64("QQ=="))));
        assert_eq!(state.image().map(|i| i.base64()), Some("QQ=="));
        assert!(state.error().is_none());
        assert!(!state.is_loading());
        assert_eq!(state.phase(), Phase::Success);
    }

    #[test]
    fn test_failure_sets_message() {
        let mut state = ViewState::new();
        state.set_prompt("a cat");
        let (ticket, _) = started(&mut state);

        let err = GenerationError::from(WeaverError::Service("quota exceeded".into()));
        assert!(state.settle(ticket, Settled::Failed(err)));
        assert_eq!(state.error(), Some("Failed to generate image: quota exceeded"));
        assert!(state.image().is_none());
        assert!(!state.is_loading());
    }

    #[test]
    fn test_unrecognized_failure_uses_fallback() {
        let mut state = ViewState::new();
        state.set_prompt("a cat");
        let (ticket, _) = started(&mut state);

        state.settle(ticket, Settled::Unrecognized);
        assert_eq!(state.error(), Some(UNKNOWN_ERROR_MESSAGE));
        assert!(!state.is_loading());
    }

    #[test]
    fn test_edits_while_loading_do_not_touch_request() {
        let mut state = ViewState::new();
        state.set_prompt("first");
        let (ticket, request) = started(&mut state);

        state.set_prompt("second");
        state.select_aspect_ratio(AspectRatio::Portrait);
        assert!(state.is_loading());
        assert_eq!(request.prompt, "first");
        assert_eq!(request.aspect_ratio, AspectRatio::Square);

        state.settle(ticket, Settled::Succeeded(GeneratedImage::from_base64("QQ==")));
        assert_eq!(state.prompt(), "second");
    }

    #[test]
    fn test_stale_result_is_dropped() {
        let mut state = ViewState::new();
        state.set_prompt("slow");
        let (old, _) = started(&mut state);
        state.set_prompt("fast");
        let (new, _) = started(&mut state);
        assert!(new > old);

        assert!(state.settle(new, Settled::Succeeded(GeneratedImage::from_base64("TkVX"))));
        let err = GenerationError::from(WeaverError::NoImageData);
        assert!(!state.settle(old, Settled::Failed(err)));

        assert_eq!(state.image().map(|i| i.base64()), Some("TkVX"));
        assert!(state.error().is_none());
    }

    #[test]
    fn test_rejected_submit_drops_previous_image() {
        let mut state = ViewState::new();
        state.set_prompt("a cat");
        let (t, _) = started(&mut state);
        state.settle(t, Settled::Succeeded(GeneratedImage::from_base64("QQ==")));

        state.set_prompt("  ");
        assert_eq!(state.submit(), Submission::Rejected);
        assert!(state.image().is_none());
        assert_eq!(state.phase(), Phase::Failed);
    }

    #[test]
    fn test_image_and_error_exclusive_when_idle() {
        let mut state = ViewState::new();
        state.set_prompt("a cat");

        let (t, _) = started(&mut state);
        state.settle(t, Settled::Succeeded(GeneratedImage::from_base64("QQ==")));
        assert!(!(state.image().is_some() && state.error().is_some()));

        let (t, _) = started(&mut state);
        state.settle(t, Settled::Unrecognized);
        assert!(!(state.image().is_some() && state.error().is_some()));
    }
}
