//! Mock implementations for integration tests
//!
//! This module provides a transport that records outbound messages
//! instead of sending them to Telegram.

pub mod recording_transport;

pub use recording_transport::{RecordingTransport, SentKind, SentMessage};
