//! Web-facing chat front-end for a locally running LM Studio server, with
//! per-session conversation persistence and full-history context replay.

// Strict ban on unsafe or non-idiomatic practices
#![deny(unsafe_code)] // Unsafe code is forbidden
#![deny(missing_docs)] // Every public item must be documented
#![deny(unused_must_use)] // Results and Options must be handled explicitly
#![forbid(unsafe_op_in_unsafe_fn)]
// Clippy for strict discipline
#![deny(clippy::all)]
#![deny(clippy::unwrap_used)] // unwrap() is forbidden outside tests
#![deny(clippy::expect_used)] // expect() is forbidden outside tests
#![deny(clippy::panic)] // panic!() is forbidden outside tests
#![deny(clippy::print_stdout)] // println!() is forbidden in production code
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::field_reassign_with_default
    )
)]

/// Chat core: sessions, storage, context assembly, turn orchestration.
pub mod chat;
/// Intent analysis for inbound user messages.
pub mod intent;
/// Inference client for the local LM Studio server.
pub mod llm;
/// HTTP server and API routes.
#[allow(clippy::unused_async)]
pub mod server;
/// Entry helpers to start the chat server.
pub mod start_offline_chat;
