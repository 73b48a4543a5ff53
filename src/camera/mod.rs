//! Camera access
//!
//! Devices are enumerated and opened through a `CameraBackend`; the
//! [`StreamManager`] owns the single active stream and serializes start and
//! switch requests.

mod gst;
mod manager;
mod types;

pub use gst::GstCameraBackend;
pub use manager::{AcquireOutcome, Attach, StreamManager, acquire};
pub use types::CameraError;
