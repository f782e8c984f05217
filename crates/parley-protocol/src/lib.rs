//! # parley-protocol
//!
//! Pure wire codec for the Parley chat protocol. No side effects, no I/O:
//! every function here is deterministic over its inputs so the connection
//! controller and turn aggregator can be tested against it in isolation.
//!
//! - **URL building**: [`build_connection_url`], [`can_connect`]
//! - **Outbound**: [`OutboundEnvelope`] with absent-not-empty optional fields
//! - **Inbound**: [`decode_frame`] into [`InboundFrame`] tagged variants;
//!   decoding never panics — malformed and unrecognized input are distinct
//!   [`DecodeOutcome`] values

#![deny(unsafe_code)]

pub mod envelope;
pub mod frame;
pub mod url;

pub use envelope::{OutboundAction, OutboundEnvelope};
pub use frame::{
    BackendError, ChunkPayload, DecodeOutcome, InboundFrame, ToolStatus, ToolUpdate, TurnDone,
    decode_frame,
};
pub use url::{build_connection_url, can_connect};
