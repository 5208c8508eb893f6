//! Gemini chat server binary.
//! Run with: cargo run --bin gemini-chat

use std::process::ExitCode;

use gemini_chat::start_gemini_chat;

fn main() -> ExitCode {
    start_gemini_chat::run()
}
