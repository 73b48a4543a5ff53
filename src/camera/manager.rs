//! Camera stream lifecycle
//!
//! Every start or switch request gets a new generation number. Acquisition
//! runs off the UI thread; when its outcome comes back, [`StreamManager::finish`]
//! attaches it only if no newer request was issued in the meantime.

use std::fmt;
use std::sync::Arc;

use image::RgbaImage;

use super::types::{
    CameraBackend, CameraDevice, CameraError, Constraints, Facing, StreamHandle,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Plan {
    /// Initial start, optionally preferring a facing
    Start { prefer: Option<Facing> },
    /// Advance to the device after `from_index`
    Switch {
        from_index: usize,
        prefer: Option<Facing>,
    },
}

/// A pending acquisition, to be resolved with [`acquire`] or [`resolve`]
pub struct AcquireRequest {
    pub generation: u64,
    plan: Plan,
    /// Stream held when the request was made, released before opening a new one
    previous: Option<StreamHandle>,
}

enum Acquired {
    Stream {
        stream: StreamHandle,
        index: Option<usize>,
    },
    /// Switch found nothing to switch to
    NoDevices,
}

/// Result of running an [`AcquireRequest`]
#[derive(Clone)]
pub struct AcquireOutcome {
    pub generation: u64,
    devices: Option<Vec<CameraDevice>>,
    released_previous: bool,
    result: Result<Arc<Acquired>, CameraError>,
}

impl fmt::Debug for AcquireOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = match &self.result {
            Ok(acquired) => match acquired.as_ref() {
                Acquired::Stream { stream, .. } => format!("Stream({})", stream.device().label),
                Acquired::NoDevices => "NoDevices".to_string(),
            },
            Err(err) => format!("Err({err})"),
        };
        f.debug_struct("AcquireOutcome")
            .field("generation", &self.generation)
            .field("result", &result)
            .finish()
    }
}

/// What [`StreamManager::finish`] did with an outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attach {
    /// The new stream is now active
    Attached(CameraDevice),
    /// Nothing changed (switch with no devices)
    Unchanged,
    /// A newer request superseded this one; its stream was stopped
    Stale,
}

/// Owns the active camera stream and the device list
pub struct StreamManager {
    backend: Arc<dyn CameraBackend>,
    prefer: Option<Facing>,
    devices: Vec<CameraDevice>,
    device_index: usize,
    /// Device the newest in-flight switch is heading to
    pending_index: Option<usize>,
    active: Option<StreamHandle>,
    generation: u64,
}

impl StreamManager {
    pub fn new(backend: Arc<dyn CameraBackend>, prefer_rear: bool) -> Self {
        Self {
            backend,
            prefer: prefer_rear.then_some(Facing::Back),
            devices: Vec::new(),
            device_index: 0,
            pending_index: None,
            active: None,
            generation: 0,
        }
    }

    pub fn backend(&self) -> Arc<dyn CameraBackend> {
        Arc::clone(&self.backend)
    }

    fn next_request(&mut self, plan: Plan) -> AcquireRequest {
        self.generation += 1;
        AcquireRequest {
            generation: self.generation,
            plan,
            previous: self.active.clone(),
        }
    }

    /// Request the initial stream
    pub fn begin_start(&mut self) -> AcquireRequest {
        self.pending_index = None;
        self.next_request(Plan::Start {
            prefer: self.prefer,
        })
    }

    /// Request a switch to the next enumerated device
    ///
    /// Repeated switches before the first one resolves advance from the
    /// pending target, so each press moves one device further.
    pub fn begin_switch(&mut self) -> AcquireRequest {
        let from_index = self.pending_index.unwrap_or(self.device_index);
        let target = match self.devices.len() {
            0 => from_index + 1,
            len => (from_index + 1) % len,
        };
        self.pending_index = Some(target);
        self.next_request(Plan::Switch {
            from_index,
            prefer: self.prefer,
        })
    }

    /// Apply a resolved acquisition
    ///
    /// Outcomes from superseded requests are discarded. A successful outcome
    /// replaces the active stream, stopping the old one, so at most one stream
    /// is ever attached.
    pub fn finish(&mut self, outcome: AcquireOutcome) -> Result<Attach, CameraError> {
        if outcome.generation != self.generation {
            log::debug!(
                "Discarding stale camera request #{} (latest #{})",
                outcome.generation,
                self.generation
            );
            if let Ok(acquired) = &outcome.result
                && let Acquired::Stream { stream, .. } = acquired.as_ref()
                && !self.is_active(stream)
            {
                stream.stop();
            }
            return Ok(Attach::Stale);
        }

        self.pending_index = None;
        if let Some(devices) = outcome.devices {
            self.devices = devices;
        }

        match outcome.result {
            Ok(acquired) => match acquired.as_ref() {
                Acquired::Stream { stream, index } => {
                    if let Some(index) = index {
                        self.device_index = *index;
                    }
                    let stream = Arc::clone(stream);
                    if let Some(old) = self.active.replace(Arc::clone(&stream))
                        && !Arc::ptr_eq(&old, &stream)
                    {
                        old.stop();
                    }
                    log::info!("Camera attached: {}", stream.device().label);
                    Ok(Attach::Attached(stream.device().clone()))
                }
                Acquired::NoDevices => Ok(Attach::Unchanged),
            },
            Err(err) => {
                if outcome.released_previous
                    && let Some(old) = self.active.take()
                {
                    old.stop();
                }
                Err(err)
            }
        }
    }

    fn is_active(&self, stream: &StreamHandle) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| Arc::ptr_eq(active, stream))
    }

    pub fn active(&self) -> Option<&StreamHandle> {
        self.active.as_ref()
    }

    /// Copy of the newest frame from the active stream
    pub fn latest_frame(&self) -> Option<RgbaImage> {
        self.active.as_ref()?.latest_frame()
    }

    pub fn devices(&self) -> &[CameraDevice] {
        &self.devices
    }

    pub fn device_index(&self) -> usize {
        self.device_index
    }

    /// Stop the active stream and invalidate pending requests
    pub fn shutdown(&mut self) {
        self.generation += 1;
        self.pending_index = None;
        if let Some(stream) = self.active.take() {
            stream.stop();
        }
    }
}

fn enumerate_or_empty(backend: &dyn CameraBackend) -> Vec<CameraDevice> {
    backend.enumerate().unwrap_or_else(|err| {
        log::warn!("Camera enumeration failed: {}", err);
        Vec::new()
    })
}

fn release(previous: Option<&StreamHandle>) -> bool {
    match previous {
        Some(stream) => {
            stream.stop();
            true
        }
        None => false,
    }
}

/// Try the preferred facing first, then any camera
fn acquire_preferring(
    backend: &dyn CameraBackend,
    prefer: Option<Facing>,
) -> Result<StreamHandle, CameraError> {
    if let Some(facing) = prefer {
        match backend.acquire(&Constraints::PreferFacing(facing)) {
            Ok(stream) => return Ok(stream),
            Err(err) => log::info!("Preferred camera unavailable ({}), trying any camera", err),
        }
    }
    backend.acquire(&Constraints::Any)
}

fn index_of(devices: &[CameraDevice], stream: &StreamHandle) -> Option<usize> {
    devices.iter().position(|d| d.id == stream.device().id)
}

/// Run a request to completion on the current thread
pub fn resolve(backend: &dyn CameraBackend, request: AcquireRequest) -> AcquireOutcome {
    let AcquireRequest {
        generation,
        plan,
        previous,
    } = request;

    let (devices, released_previous, result) = match plan {
        Plan::Start { prefer } => {
            let released = release(previous.as_ref());
            let result = acquire_preferring(backend, prefer);
            let devices = enumerate_or_empty(backend);
            let result = result.map(|stream| {
                let index = index_of(&devices, &stream);
                Acquired::Stream { stream, index }
            });
            (devices, released, result)
        }
        Plan::Switch { from_index, prefer } => {
            let devices = enumerate_or_empty(backend);
            if devices.is_empty() {
                log::info!("No cameras to switch to");
                (devices, false, Ok(Acquired::NoDevices))
            } else {
                let next = (from_index + 1) % devices.len();
                let released = release(previous.as_ref());
                let result = match backend.acquire(&Constraints::Exact(devices[next].id.clone())) {
                    Ok(stream) => Ok(Acquired::Stream {
                        stream,
                        index: Some(next),
                    }),
                    Err(err) => {
                        log::warn!(
                            "Could not open {} ({}), falling back",
                            devices[next].label,
                            err
                        );
                        acquire_preferring(backend, prefer).map(|stream| {
                            let index = index_of(&devices, &stream).or(Some(next));
                            Acquired::Stream { stream, index }
                        })
                    }
                };
                (devices, released, result)
            }
        }
    };

    AcquireOutcome {
        generation,
        devices: Some(devices),
        released_previous,
        result: result.map(Arc::new),
    }
}

/// Resolve a request on the blocking thread pool
pub async fn acquire(backend: Arc<dyn CameraBackend>, request: AcquireRequest) -> AcquireOutcome {
    let generation = request.generation;
    match tokio::task::spawn_blocking(move || resolve(backend.as_ref(), request)).await {
        Ok(outcome) => outcome,
        Err(err) => {
            log::error!("Camera acquisition task failed: {}", err);
            AcquireOutcome {
                generation,
                devices: None,
                released_previous: true,
                result: Err(CameraError::Acquisition {
                    device: String::new(),
                    reason: err.to_string(),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::types::CameraStream;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct FakeStream {
        device: CameraDevice,
        stopped: AtomicBool,
    }

    impl CameraStream for FakeStream {
        fn device(&self) -> &CameraDevice {
            &self.device
        }

        fn latest_frame(&self) -> Option<RgbaImage> {
            Some(RgbaImage::new(2, 2))
        }

        fn stop(&self) {
            self.stopped.store(true, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct FakeBackend {
        devices: Vec<CameraDevice>,
        enumerate_fails: bool,
        /// Device ids that refuse to open
        broken: Vec<String>,
        /// Refuse a device while an unstopped stream still holds it
        exclusive: bool,
        /// Every acquisition attempt, in order
        attempts: Mutex<Vec<Constraints>>,
        opened: Mutex<Vec<Arc<FakeStream>>>,
    }

    impl FakeBackend {
        fn with_devices(devices: Vec<CameraDevice>) -> Self {
            Self {
                devices,
                ..Default::default()
            }
        }

        fn attempts(&self) -> Vec<Constraints> {
            self.attempts.lock().unwrap().clone()
        }

        fn opened(&self) -> Vec<Arc<FakeStream>> {
            self.opened.lock().unwrap().clone()
        }
    }

    impl CameraBackend for FakeBackend {
        fn enumerate(&self) -> Result<Vec<CameraDevice>, CameraError> {
            if self.enumerate_fails {
                return Err(CameraError::Enumeration("denied".into()));
            }
            Ok(self.devices.clone())
        }

        fn acquire(&self, constraints: &Constraints) -> Result<StreamHandle, CameraError> {
            self.attempts.lock().unwrap().push(constraints.clone());
            let device = constraints
                .select(&self.devices)
                .ok_or(CameraError::NoDevice)?;
            let held = self.exclusive
                && self
                    .opened
                    .lock()
                    .unwrap()
                    .iter()
                    .any(|s| s.device.id == device.id && !s.stopped.load(Ordering::SeqCst));
            if held || self.broken.contains(&device.id) {
                return Err(CameraError::Acquisition {
                    device: device.label.clone(),
                    reason: "busy".into(),
                });
            }
            let stream = Arc::new(FakeStream {
                device: device.clone(),
                stopped: AtomicBool::new(false),
            });
            self.opened.lock().unwrap().push(Arc::clone(&stream));
            Ok(stream)
        }
    }

    fn device(id: &str, facing: Facing) -> CameraDevice {
        CameraDevice {
            id: id.into(),
            label: format!("Camera {id}"),
            kind: "Video/Source".into(),
            facing,
        }
    }

    fn run(
        backend: &Arc<FakeBackend>,
        manager: &mut StreamManager,
        request: AcquireRequest,
    ) -> Result<Attach, CameraError> {
        let outcome = resolve(backend.as_ref(), request);
        manager.finish(outcome)
    }

    fn setup(backend: FakeBackend) -> (Arc<FakeBackend>, StreamManager) {
        let backend = Arc::new(backend);
        let manager = StreamManager::new(backend.clone(), true);
        (backend, manager)
    }

    #[test]
    fn test_start_prefers_rear_camera() {
        let (backend, mut manager) = setup(FakeBackend::with_devices(vec![
            device("front", Facing::Front),
            device("rear", Facing::Back),
        ]));

        let req = manager.begin_start();
        let attach = run(&backend, &mut manager, req).unwrap();

        assert_eq!(attach, Attach::Attached(device("rear", Facing::Back)));
        assert_eq!(manager.device_index(), 1);
        assert_eq!(manager.devices().len(), 2);
        assert_eq!(
            backend.attempts(),
            vec![Constraints::PreferFacing(Facing::Back)]
        );
    }

    #[test]
    fn test_start_falls_back_to_any_camera() {
        let (backend, mut manager) = setup(FakeBackend {
            devices: vec![device("usb", Facing::Unknown), device("rear", Facing::Back)],
            broken: vec!["rear".into()],
            ..Default::default()
        });

        let req = manager.begin_start();
        let attach = run(&backend, &mut manager, req).unwrap();

        assert_eq!(attach, Attach::Attached(device("usb", Facing::Unknown)));
        assert_eq!(
            backend.attempts(),
            vec![Constraints::PreferFacing(Facing::Back), Constraints::Any]
        );
    }

    #[test]
    fn test_start_without_cameras_reports_error() {
        let (backend, mut manager) = setup(FakeBackend::default());

        let req = manager.begin_start();
        let err = run(&backend, &mut manager, req).unwrap_err();

        assert_eq!(err, CameraError::NoDevice);
        assert!(manager.active().is_none());
        assert!(manager.latest_frame().is_none());
    }

    #[test]
    fn test_switch_with_single_device_reopens_it() {
        let (backend, mut manager) =
            setup(FakeBackend::with_devices(vec![device("only", Facing::Front)]));

        let req = manager.begin_start();
        run(&backend, &mut manager, req).unwrap();
        assert_eq!(manager.device_index(), 0);

        let req = manager.begin_switch();
        let attach = run(&backend, &mut manager, req).unwrap();

        assert_eq!(attach, Attach::Attached(device("only", Facing::Front)));
        assert_eq!(manager.device_index(), 0);
        assert_eq!(
            backend.attempts().last(),
            Some(&Constraints::Exact("only".into()))
        );

        let opened = backend.opened();
        assert_eq!(opened.len(), 2);
        assert!(opened[0].stopped.load(Ordering::SeqCst));
        assert!(!opened[1].stopped.load(Ordering::SeqCst));
    }

    #[test]
    fn test_switch_cycles_through_devices() {
        let (backend, mut manager) = setup(FakeBackend::with_devices(vec![
            device("a", Facing::Back),
            device("b", Facing::Front),
            device("c", Facing::External),
        ]));

        let req = manager.begin_start();
        run(&backend, &mut manager, req).unwrap();

        let mut seen = Vec::new();
        for _ in 0..3 {
            let req = manager.begin_switch();
            run(&backend, &mut manager, req).unwrap();
            seen.push(manager.active().unwrap().device().id.clone());
        }
        assert_eq!(seen, ["b", "c", "a"]);

        // Only the last opened stream is still running
        let opened = backend.opened();
        let running = opened
            .iter()
            .filter(|s| !s.stopped.load(Ordering::SeqCst))
            .count();
        assert_eq!(running, 1);
    }

    #[test]
    fn test_switch_failure_falls_back_to_rear() {
        let (backend, mut manager) = setup(FakeBackend {
            devices: vec![device("rear", Facing::Back), device("broken", Facing::Front)],
            broken: vec!["broken".into()],
            ..Default::default()
        });

        let req = manager.begin_start();
        run(&backend, &mut manager, req).unwrap();

        let req = manager.begin_switch();
        let attach = run(&backend, &mut manager, req).unwrap();

        assert_eq!(attach, Attach::Attached(device("rear", Facing::Back)));
        assert_eq!(manager.device_index(), 0);
        let attempts = backend.attempts();
        assert_eq!(
            &attempts[1..],
            &[
                Constraints::Exact("broken".into()),
                Constraints::PreferFacing(Facing::Back)
            ]
        );
    }

    #[test]
    fn test_switch_without_devices_is_noop() {
        let (backend, mut manager) =
            setup(FakeBackend::with_devices(vec![device("a", Facing::Back)]));
        let req = manager.begin_start();
        run(&backend, &mut manager, req).unwrap();

        let failing = Arc::new(FakeBackend {
            enumerate_fails: true,
            ..Default::default()
        });
        let req = manager.begin_switch();
        let outcome = resolve(failing.as_ref(), req);
        let attach = manager.finish(outcome).unwrap();

        assert_eq!(attach, Attach::Unchanged);
        assert!(failing.attempts().is_empty());
        let active = manager.active().unwrap();
        assert_eq!(active.device().id, "a");
        assert!(!backend.opened()[0].stopped.load(Ordering::SeqCst));
    }

    #[test]
    fn test_stale_outcome_is_discarded() {
        let (backend, mut manager) = setup(FakeBackend::with_devices(vec![
            device("a", Facing::Back),
            device("b", Facing::Front),
        ]));

        let first = manager.begin_start();
        let second = manager.begin_switch();

        let late = resolve(backend.as_ref(), first);
        let fresh = resolve(backend.as_ref(), second);

        assert!(matches!(manager.finish(fresh), Ok(Attach::Attached(_))));
        assert_eq!(manager.finish(late), Ok(Attach::Stale));

        let opened = backend.opened();
        assert_eq!(opened.len(), 2);
        // The stale stream was stopped, the fresh one kept
        assert!(opened[0].stopped.load(Ordering::SeqCst));
        assert!(!opened[1].stopped.load(Ordering::SeqCst));
        assert_eq!(manager.active().unwrap().device().id, "b");
    }

    #[test]
    fn test_quick_switches_advance_past_pending_target() {
        let (backend, mut manager) = setup(FakeBackend {
            devices: vec![
                device("a", Facing::Back),
                device("b", Facing::Front),
                device("c", Facing::External),
            ],
            exclusive: true,
            ..Default::default()
        });
        let req = manager.begin_start();
        run(&backend, &mut manager, req).unwrap();
        assert_eq!(manager.active().unwrap().device().id, "a");

        // Two presses before either acquisition comes back
        let first = manager.begin_switch();
        let second = manager.begin_switch();
        let first = resolve(backend.as_ref(), first);
        let second = resolve(backend.as_ref(), second);

        let attach = manager.finish(second).unwrap();
        assert_eq!(attach, Attach::Attached(device("c", Facing::External)));
        assert_eq!(manager.finish(first), Ok(Attach::Stale));

        assert_eq!(manager.active().unwrap().device().id, "c");
        assert_eq!(manager.device_index(), 2);
        let running: Vec<_> = backend
            .opened()
            .iter()
            .filter(|s| !s.stopped.load(Ordering::SeqCst))
            .map(|s| s.device.id.clone())
            .collect();
        assert_eq!(running, ["c"]);

        // The next switch starts from the attached device again
        let req = manager.begin_switch();
        run(&backend, &mut manager, req).unwrap();
        assert_eq!(manager.active().unwrap().device().id, "a");
    }

    #[test]
    fn test_shutdown_stops_stream() {
        let (backend, mut manager) =
            setup(FakeBackend::with_devices(vec![device("a", Facing::Back)]));
        let req = manager.begin_start();
        run(&backend, &mut manager, req).unwrap();

        manager.shutdown();
        assert!(manager.active().is_none());
        assert!(backend.opened()[0].stopped.load(Ordering::SeqCst));
    }
}
