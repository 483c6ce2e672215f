//! Binary entrypoint for the offline chat server.

use std::process::ExitCode;

use offline_chat::start_offline_chat;

/// Start the chat server in front of a locally running LM Studio instance.
fn main() -> ExitCode {
    start_offline_chat::run()
}
