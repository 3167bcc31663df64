//! IPC message protocol for the material painter
//!
//! Defines the discrete intents a presentation layer sends into the painting
//! state machine ([`PainterCommand`]) and what comes back ([`PainterEvent`]).
//! Nothing in here touches pixels; drawing code only ever reads state and
//! forwards these messages.

mod commands;
mod error;
mod messages;

pub use commands::*;
pub use error::IpcError;
pub use messages::*;

/// Serialize any protocol message to JSON.
pub fn to_json<T: serde::Serialize>(message: &T) -> Result<String, IpcError> {
    Ok(serde_json::to_string(message)?)
}

/// Parse a command sent by the UI.
pub fn parse_command(json: &str) -> Result<PainterCommand, IpcError> {
    if json.trim().is_empty() {
        return Err(IpcError::InvalidFormat("empty message".to_string()));
    }
    Ok(serde_json::from_str(json)?)
}
