//! craving — a chat-style client for a food suggestion service.
//!
//! DESIGN
//! ======
//! The crate is split by concern so the terminal front end in `main.rs`
//! only wires pieces together:
//!
//! - `credentials`: provider/API-key storage behind an injectable key-value
//!   backend.
//! - `suggest`: the HTTP client for the remote suggestion service.
//! - `conversation`: the turn log and its `Idle`/`Pending` state machine.
//! - `view`: plain-text rendering of turns and settings.

pub mod config;
pub mod conversation;
pub mod credentials;
pub mod suggest;
pub mod view;
