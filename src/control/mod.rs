//! Operator control plane: framed TCP command channel.
//!
//! A plaintext operator tool, not a security boundary: length-prefixed
//! frames ([`framing`]) carry single-line text commands ([`command`])
//! between a [`ControlClient`] and the [`ControlServer`] embedded in the
//! gateway process.

pub mod client;
pub mod command;
pub mod framing;
pub mod server;

pub use client::ControlClient;
pub use command::{CommandHandler, ControlState};
pub use framing::{encode, ControlFramer, MAX_CONTROL_FRAME};
pub use server::ControlServer;
