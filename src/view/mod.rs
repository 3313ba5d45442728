//! The generation view: state machine, rendering and the controller that
//! ties them to an [`ImageClient`](crate::image::ImageClient).

mod controller;
mod render;
mod state;

pub use controller::{settle_join, GenerationView, PendingGeneration};
pub use render::{
    Canvas, Frame, RatioToggle, SubmitControl, SUBMIT_BUSY_LABEL, SUBMIT_READY_LABEL, TITLE,
};
pub use state::{
    Phase, Settled, Submission, Ticket, ViewState, EMPTY_PROMPT_MESSAGE, UNKNOWN_ERROR_MESSAGE,
};
