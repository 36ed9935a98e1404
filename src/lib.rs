//! dify-chat - a terminal client for Dify chat instances
//!
//! dify-chat signs in to a Dify deployment (cloud or self-hosted) through its
//! hosted login page, keeps the session alive across restarts, and talks to
//! the instance's REST API for apps, conversations, and chat messages.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to handlers)
//! - [`session`] - Session lifecycle: token storage, validation, refresh, logout
//! - [`login`] - Embedded-browser login state machine
//! - [`gate`] - Auth-gated navigation between sign-in and the main surface
//! - [`instance`] - Cloud/self-hosted instance resolution
//! - [`api`] - Typed client for the instance REST contract
//! - [`store`] - Credential storage abstraction
//! - [`ui`] - User interaction utilities
//!
//! # Correctness Invariants
//!
//! 1. A session is authenticated only while both an access token and session
//!    cookies are present; every credential mutation re-derives the flag
//! 2. All credential persistence flows through the session manager
//! 3. Credential values never appear in logs, errors, or Debug output
//! 4. Logout always resets local state, even when the store misbehaves

pub mod api;
pub mod cli;
pub mod gate;
pub mod instance;
pub mod login;
pub mod session;
pub mod store;
pub mod ui;
