//! login
//!
//! Embedded-browser login orchestration: open the hosted sign-in page, watch
//! navigation events for the post-login redirect, extract tokens, and verify
//! the session with a readiness check before declaring success.

mod flow;

pub use flow::{BrowserEvent, FlowOutcome, LoginFlow, LoginPhase, PageMessage};
