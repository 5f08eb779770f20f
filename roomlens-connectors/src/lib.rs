//! Output Connectors for Room Lens
//!
//! ## Overview
//!
//! The mapping engine produces one [`AxisPayload`] per frame and performs
//! no I/O. This crate moves payloads and frames out of the process:
//!
//! - **OSC** (`osc` feature): axis values as one OSC 1.0 message per frame,
//!   sent over UDP to a synth such as SuperCollider.
//! - **Capture** (`capture` feature): JSON-lines frames persisted as CSV,
//!   only after explicit confirmation.
//! - **Replay** (`replay` feature): recorded JSON-lines frames read back for
//!   rehearsal without hardware, once or on a loop.
//!
//! ## OSC Message Layout
//!
//! ```text
//! address   /roomlens
//! args      axis, value, axis, value, ...   (sorted by axis name)
//! types     ,sfsf...
//! ```
//!
//! Sorting keeps the argument list deterministic for hosts and tests.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use roomlens_connectors::osc::{OscEmitter, UdpOscClient, DEFAULT_OSC_ADDRESS};
//! use roomlens_core::demo::demo_frame;
//! use roomlens_core::{MappingPipeline, MappingSpec};
//!
//! let spec = MappingSpec::from_json_str(r#"{"sensors": {"mic": {"enabled": true,
//!     "features": {"rms": {"map_to": {"axis": "grain_density"}}}}}}"#)?;
//! let pipeline = MappingPipeline::new(spec)?;
//!
//! let mut emitter = OscEmitter::new(DEFAULT_OSC_ADDRESS);
//! emitter.bind(UdpOscClient::connect("127.0.0.1:57120")?);
//!
//! let payload = pipeline.process_frame(&demo_frame(1.0))?;
//! emitter.emit(&payload)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use roomlens_core::AxisPayload;

// Macros for optional logging
#[cfg(feature = "log")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "osc")]
pub mod osc;

#[cfg(feature = "capture")]
pub mod capture;

#[cfg(feature = "replay")]
pub mod replay;

// Re-export common types
#[cfg(feature = "osc")]
pub use osc::{prepare_osc_message, OscArg, OscClient, OscEmitter, OscMessage, UdpOscClient};

#[cfg(feature = "capture")]
pub use capture::{capture_stream, capture_to_file, CaptureStats};

#[cfg(feature = "replay")]
pub use replay::{load_recording, load_recording_file, Recording, ReplayError, ReplayFrames};

use thiserror::Error;

/// Common connector errors
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encoding error: {0}")]
    Encoding(String),
}

/// Trait for transports that carry encoded packets
pub trait Connector {
    type Error;

    /// Send one encoded packet
    fn send(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Check if connected
    fn is_connected(&self) -> bool;

    /// Transfer statistics so far
    fn stats(&self) -> ConnectionStats;
}

/// Connection statistics common to all connectors
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConnectionStats {
    /// Total messages sent successfully
    pub messages_sent: u64,
    /// Total messages failed to send
    pub messages_failed: u64,
    /// Total bytes sent
    pub bytes_sent: u64,
    /// Last error message
    pub last_error: Option<String>,
}
