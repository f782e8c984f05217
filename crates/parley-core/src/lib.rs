//! # parley-core
//!
//! Foundation types for the Parley chat session client.
//!
//! This crate provides the shared vocabulary the protocol and client crates
//! depend on:
//!
//! - **Branded IDs**: `SessionId`, `MessageId` as newtypes for type safety
//! - **Messages**: `ChatMessage` with sender, content type, and pending flag
//! - **Constants**: wire sentinels and the fixed turn-failure text
//! - **Reconnect policy**: exponential backoff math and budget checks
//! - **Errors**: `ClientError` hierarchy via `thiserror`

#![deny(unsafe_code)]

pub mod constants;
pub mod errors;
pub mod ids;
pub mod messages;
pub mod retry;

pub use errors::ClientError;
pub use ids::{MessageId, SessionId};
pub use messages::{ChatMessage, ContentType, Sender};
pub use retry::ReconnectPolicy;
