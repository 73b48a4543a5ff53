//! GStreamer camera backend
//!
//! Devices come from a `DeviceMonitor` filtered to `Video/Source`. Each
//! stream is a `source ! videoconvert ! appsink` pipeline that keeps only the
//! most recent RGBA frame.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app as gst_app;
use gstreamer_video as gst_video;
use image::RgbaImage;

use super::types::{
    CameraBackend, CameraDevice, CameraError, CameraStream, Constraints, Facing, StreamHandle,
};

/// Device class reported by video capture devices
const VIDEO_SOURCE_CLASS: &str = "Video/Source";

/// Properties tried, in order, for a stable device identity
const ID_PROPERTIES: &[&str] = &[
    "object.path",
    "api.v4l2.path",
    "device.path",
    "api.libcamera.path",
];

/// Properties tried for the camera location
const LOCATION_PROPERTIES: &[&str] = &["api.libcamera.location", "camera.location"];

/// How long to wait for a pipeline to start playing
const START_TIMEOUT_SECS: u64 = 5;

/// Camera backend built on the GStreamer device monitor
#[derive(Debug)]
pub struct GstCameraBackend;

impl GstCameraBackend {
    pub fn new() -> Result<Self, CameraError> {
        gst::init().map_err(|e| CameraError::Init(e.to_string()))?;
        Ok(Self)
    }

    fn monitor_devices(&self) -> Result<Vec<(CameraDevice, gst::Device)>, CameraError> {
        let monitor = gst::DeviceMonitor::new();
        monitor.add_filter(Some(VIDEO_SOURCE_CLASS), None);
        monitor
            .start()
            .map_err(|e| CameraError::Enumeration(e.to_string()))?;
        let devices: Vec<_> = monitor
            .devices()
            .into_iter()
            .map(|device| (describe(&device), device))
            .collect();
        monitor.stop();

        log::debug!(
            "Enumerated cameras: {:?}",
            devices
                .iter()
                .map(|(d, _)| format!("{} [{}]", d.label, d.kind))
                .collect::<Vec<_>>()
        );
        Ok(devices)
    }
}

fn property(props: Option<&gst::StructureRef>, keys: &[&str]) -> Option<String> {
    let props = props?;
    keys.iter()
        .find_map(|key| props.get::<String>(*key).ok())
        .filter(|value| !value.is_empty())
}

fn describe(device: &gst::Device) -> CameraDevice {
    let props = device.properties();
    let label = device.display_name().to_string();
    let id = property(props.as_deref(), ID_PROPERTIES).unwrap_or_else(|| label.clone());
    let facing = property(props.as_deref(), LOCATION_PROPERTIES)
        .map(|loc| Facing::from_location(&loc))
        .unwrap_or_default();

    CameraDevice {
        id,
        label,
        kind: device.device_class().to_string(),
        facing,
    }
}

impl CameraBackend for GstCameraBackend {
    fn enumerate(&self) -> Result<Vec<CameraDevice>, CameraError> {
        Ok(self
            .monitor_devices()?
            .into_iter()
            .map(|(desc, _)| desc)
            .collect())
    }

    fn acquire(&self, constraints: &Constraints) -> Result<StreamHandle, CameraError> {
        let devices = self.monitor_devices()?;
        let descriptions: Vec<CameraDevice> = devices.iter().map(|(d, _)| d.clone()).collect();

        let chosen = constraints.select(&descriptions).ok_or_else(|| match constraints {
            Constraints::Exact(id) => CameraError::Acquisition {
                device: id.clone(),
                reason: "device not found".to_string(),
            },
            _ => CameraError::NoDevice,
        })?;
        let (desc, device) = devices
            .iter()
            .find(|(d, _)| d.id == chosen.id)
            .ok_or(CameraError::NoDevice)?;

        log::info!("Opening camera {} ({})", desc.label, desc.id);
        let stream = GstStream::open(desc.clone(), device)?;
        Ok(Arc::new(stream))
    }
}

/// Running capture pipeline for one device
pub struct GstStream {
    device: CameraDevice,
    pipeline: gst::Pipeline,
    latest: Arc<Mutex<Option<RgbaImage>>>,
    stopped: AtomicBool,
}

impl GstStream {
    fn open(desc: CameraDevice, device: &gst::Device) -> Result<Self, CameraError> {
        let fail = |reason: String| CameraError::Acquisition {
            device: desc.label.clone(),
            reason,
        };

        let pipeline = gst::Pipeline::new();

        let source = device
            .create_element(Some("camera-source"))
            .map_err(|e| fail(format!("failed to create source element: {e}")))?;

        let videoconvert = gst::ElementFactory::make("videoconvert")
            .build()
            .map_err(|e| fail(format!("failed to create videoconvert element: {e}")))?;

        let caps = gst::Caps::builder("video/x-raw")
            .field("format", "RGBA")
            .build();
        let appsink = gst_app::AppSink::builder()
            .name("camera-sink")
            .caps(&caps)
            .max_buffers(1)
            .drop(true)
            .build();

        pipeline
            .add_many([&source, &videoconvert, appsink.upcast_ref()])
            .map_err(|e| fail(e.to_string()))?;
        gst::Element::link_many([&source, &videoconvert, appsink.upcast_ref()])
            .map_err(|e| fail(e.to_string()))?;

        let latest = Arc::new(Mutex::new(None));
        let sink_latest = Arc::clone(&latest);
        appsink.set_callbacks(
            gst_app::AppSinkCallbacks::builder()
                .new_sample(move |sink| {
                    let sample = sink.pull_sample().map_err(|_| gst::FlowError::Eos)?;
                    let frame = sample_to_rgba(&sample).ok_or(gst::FlowError::Error)?;
                    if let Ok(mut slot) = sink_latest.lock() {
                        *slot = Some(frame);
                    }
                    Ok(gst::FlowSuccess::Ok)
                })
                .build(),
        );

        if let Err(err) = pipeline.set_state(gst::State::Playing) {
            let reason = pipeline_error(&pipeline).unwrap_or_else(|| err.to_string());
            let _ = pipeline.set_state(gst::State::Null);
            return Err(fail(reason));
        }

        let (result, _, _) = pipeline.state(gst::ClockTime::from_seconds(START_TIMEOUT_SECS));
        if let Err(err) = result {
            let reason = pipeline_error(&pipeline).unwrap_or_else(|| err.to_string());
            let _ = pipeline.set_state(gst::State::Null);
            return Err(fail(reason));
        }

        Ok(Self {
            device: desc,
            pipeline,
            latest,
            stopped: AtomicBool::new(false),
        })
    }
}

/// First error message posted on the pipeline bus, if any
fn pipeline_error(pipeline: &gst::Pipeline) -> Option<String> {
    let bus = pipeline.bus()?;
    while let Some(msg) = bus.pop_filtered(&[gst::MessageType::Error]) {
        if let gst::MessageView::Error(err) = msg.view() {
            return Some(format!(
                "{} ({})",
                err.error(),
                err.debug().unwrap_or_default()
            ));
        }
    }
    None
}

/// Copy an RGBA sample into a tightly packed image, dropping row padding
fn sample_to_rgba(sample: &gst::Sample) -> Option<RgbaImage> {
    let caps = sample.caps()?;
    let info = gst_video::VideoInfo::from_caps(caps).ok()?;
    let buffer = sample.buffer()?;
    let map = buffer.map_readable().ok()?;

    let (width, height) = (info.width(), info.height());
    let stride = usize::try_from(*info.stride().first()?).ok()?;
    let row = width as usize * 4;

    let mut data = Vec::with_capacity(row * height as usize);
    for y in 0..height as usize {
        let start = y * stride;
        data.extend_from_slice(map.get(start..start + row)?);
    }
    RgbaImage::from_raw(width, height, data)
}

impl CameraStream for GstStream {
    fn device(&self) -> &CameraDevice {
        &self.device
    }

    fn latest_frame(&self) -> Option<RgbaImage> {
        self.latest.lock().ok()?.clone()
    }

    fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        log::info!("Stopping camera {}", self.device.label);
        if let Err(err) = self.pipeline.set_state(gst::State::Null) {
            log::error!("Failed to stop camera pipeline: {}", err);
        }
    }
}

impl Drop for GstStream {
    fn drop(&mut self) {
        self.stop();
    }
}
