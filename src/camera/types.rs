//! Camera device and stream types shared by all backends

use std::sync::Arc;

use image::RgbaImage;

/// Which way a camera points, when the platform reports it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    Front,
    Back,
    External,
    #[default]
    Unknown,
}

impl Facing {
    /// Parse a location property such as libcamera's `api.libcamera.location`
    pub fn from_location(location: &str) -> Self {
        match location.to_ascii_lowercase().as_str() {
            "front" | "user" => Facing::Front,
            "back" | "rear" | "environment" => Facing::Back,
            "external" => Facing::External,
            _ => Facing::Unknown,
        }
    }
}

/// An enumerated video input device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    /// Stable identity used for exact acquisition
    pub id: String,
    /// Human-readable name
    pub label: String,
    /// Device class reported by the platform (e.g. `Video/Source`)
    pub kind: String,
    pub facing: Facing,
}

/// What an acquisition asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraints {
    /// Ideal facing: a matching device wins, any device is acceptable
    PreferFacing(Facing),
    /// First available device
    Any,
    /// Exactly this device id, nothing else
    Exact(String),
}

impl Constraints {
    /// Pick the device satisfying these constraints
    pub fn select<'a>(&self, devices: &'a [CameraDevice]) -> Option<&'a CameraDevice> {
        match self {
            Constraints::PreferFacing(facing) => devices
                .iter()
                .find(|d| d.facing == *facing)
                .or_else(|| devices.first()),
            Constraints::Any => devices.first(),
            Constraints::Exact(id) => devices.iter().find(|d| &d.id == id),
        }
    }
}

/// Camera failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CameraError {
    #[error("camera backend failed to initialize: {0}")]
    Init(String),
    #[error("could not list cameras: {0}")]
    Enumeration(String),
    #[error("no camera available")]
    NoDevice,
    #[error("could not open camera {device}: {reason}")]
    Acquisition { device: String, reason: String },
}

/// A running camera stream
pub trait CameraStream: Send + Sync {
    fn device(&self) -> &CameraDevice;

    /// Copy of the most recent decoded frame, if one arrived yet
    fn latest_frame(&self) -> Option<RgbaImage>;

    /// Stop capturing and release the device. Idempotent.
    fn stop(&self);
}

/// Shared handle to a stream; cloning does not duplicate the capture
pub type StreamHandle = Arc<dyn CameraStream>;

/// Platform camera capability
pub trait CameraBackend: Send + Sync {
    fn enumerate(&self) -> Result<Vec<CameraDevice>, CameraError>;

    fn acquire(&self, constraints: &Constraints) -> Result<StreamHandle, CameraError>;
}
