//! api
//!
//! Client layer for the instance REST contract.
//!
//! The Dify HTTP API is a fixed external contract, not designed here. This
//! module attaches session credentials, normalizes historically inconsistent
//! payload shapes, and hands typed results to callers:
//!
//! - [`ApiClient`] - bearer-authenticated endpoint wrappers
//! - [`types`] - wire and persisted data models
//! - [`apps`] - apps-list shape migration

pub mod apps;
mod client;
pub mod types;

pub use client::{fetch_apps, ApiClient};
pub use types::{App, AppParameters, ChatMessageRequest, ChatMessageResponse, Conversation};
