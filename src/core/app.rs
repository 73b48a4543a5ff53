use std::sync::Arc;
use std::time::Duration;

use cosmic::Task;
use cosmic::iced::{ContentFit, Length, Size};
use cosmic::iced_widget::{column, stack};
use cosmic::widget::image;
use cosmic::{
    app,
    iced::window,
    iced_futures::{Subscription, event::listen_with},
};

use crate::camera::{self, Attach, CameraError, GstCameraBackend, StreamManager};
use crate::capture::export;
use crate::capture::image::CameraFrame;
use crate::config::LayoutLensConfig;
use crate::fl;
use crate::session::handlers::{Effect, dispatch};
use crate::session::messages::{CameraMsg, CaptureMsg, Event, Msg, WindowMsg};
use crate::session::shortcuts::handle_key_event;
use crate::session::state::Session;
use crate::widget::export_preview::build_export_preview;
use crate::widget::overlay_canvas::OverlayCanvas;
use crate::widget::toolbar::build_toolbar;

/// Window size before the first resize event arrives
const INITIAL_SIZE: Size = Size::new(1000.0, 800.0);

/// Preview refresh interval (~30 fps)
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

pub(crate) fn run() -> cosmic::iced::Result {
    let settings = cosmic::app::Settings::default()
        .size(INITIAL_SIZE)
        .exit_on_close(true);
    cosmic::app::run::<App>(settings, ())
}

/// A saved export being shown to the user
#[derive(Debug, Clone)]
pub struct ExportPreview {
    pub handle: image::Handle,
    pub path: String,
}

pub struct App {
    pub core: app::Core,
    pub config: LayoutLensConfig,
    pub session: Session,
    /// `None` when no camera backend could be initialized
    pub camera: Option<StreamManager>,
    /// Latest frame shown beneath the overlay
    pub video: Option<CameraFrame>,
    pub export: Option<ExportPreview>,
    /// Last error or notice shown under the toolbar
    pub status: Option<String>,
}

impl App {
    fn camera_error(&mut self, err: &CameraError) {
        log::error!("Camera error: {}", err);
        self.status = Some(fl!("camera-error", reason = err.to_string()));
    }

    fn request_camera(&mut self, switch: bool) -> Task<cosmic::Action<Msg>> {
        let Some(manager) = self.camera.as_mut() else {
            return Task::none();
        };
        let request = if switch {
            manager.begin_switch()
        } else {
            manager.begin_start()
        };
        log::debug!("Camera request #{} (switch: {})", request.generation, switch);
        cosmic::Task::perform(
            camera::acquire(manager.backend(), request),
            Msg::camera_acquired,
        )
        .map(cosmic::Action::App)
    }

    fn handle(&mut self, message: Msg) -> Task<cosmic::Action<Msg>> {
        match message {
            Msg::Key(key, modifiers) => {
                match handle_key_event(&self.session, self.export.is_some(), key, modifiers) {
                    Some(msg) => self.handle(msg),
                    None => Task::none(),
                }
            }
            // The preview is modal, annotations wait until it is closed
            Msg::Session(Event::PointerDown { .. }) if self.export.is_some() => Task::none(),
            Msg::Session(event) => self.handle_session(event),
            Msg::Camera(msg) => self.handle_camera(msg),
            Msg::Capture(msg) => self.handle_capture(msg),
            Msg::Window(msg) => self.handle_window(msg),
        }
    }

    fn handle_window(&mut self, msg: WindowMsg) -> Task<cosmic::Action<Msg>> {
        let Some(id) = self.core.main_window_id() else {
            return Task::none();
        };
        match msg {
            WindowMsg::Drag => window::drag(id),
            WindowMsg::Close => window::close(id),
        }
    }

    /// Press handler for the overlay canvas, absent while the preview is up
    fn overlay_press<'a>(&self) -> Option<Box<dyn Fn(f32, f32) -> Msg + 'a>> {
        if self.export.is_some() {
            return None;
        }
        Some(Box::new(Msg::pointer_down))
    }

    fn handle_session(&mut self, event: Event) -> Task<cosmic::Action<Msg>> {
        let ratio_event = matches!(event, Event::RatioSelected(_));
        match dispatch(&mut self.session, event) {
            Effect::None | Effect::Redraw => {
                if ratio_event && self.config.set_default_ratio(self.session.ratio()) {
                    self.config.save();
                }
                Task::none()
            }
            Effect::Export => self.start_export(),
            Effect::SwitchCamera => self.request_camera(true),
        }
    }

    /// Flatten the view now and save it in the background
    fn start_export(&mut self) -> Task<cosmic::Action<Msg>> {
        // Copy the pixels at request time; the stream keeps moving
        let snapshot = self
            .camera
            .as_ref()
            .and_then(StreamManager::latest_frame)
            .or_else(|| self.video.as_ref().map(|v| v.rgba.clone()));
        if snapshot.is_none() {
            log::warn!("No camera frame available, exporting overlay on black");
        }
        if self.session.store.is_empty() {
            log::debug!("Exporting without annotations");
        }

        match export::flatten(&self.session, snapshot.as_ref(), &self.config.style) {
            Ok(image) => cosmic::Task::perform(
                export::save(image, self.config.save_location),
                Msg::export_saved,
            )
            .map(cosmic::Action::App),
            Err(err) => {
                log::error!("Export failed: {:#}", err);
                self.status = Some(fl!("export-failed", reason = format!("{err:#}")));
                Task::none()
            }
        }
    }

    fn handle_camera(&mut self, msg: CameraMsg) -> Task<cosmic::Action<Msg>> {
        let Some(manager) = self.camera.as_mut() else {
            return Task::none();
        };
        match msg {
            CameraMsg::Acquired(outcome) => match manager.finish(outcome) {
                Ok(Attach::Attached(device)) => {
                    log::info!(
                        "Using camera {} ({:?}), {} of {}",
                        device.label,
                        device.facing,
                        manager.device_index() + 1,
                        manager.devices().len()
                    );
                    self.status = None;
                    self.video = None;
                }
                Ok(Attach::Unchanged) => {
                    self.status = Some(fl!("no-other-camera"));
                }
                Ok(Attach::Stale) => {}
                Err(err) => {
                    if manager.active().is_none() {
                        self.video = None;
                    }
                    self.camera_error(&err);
                }
            },
            CameraMsg::Tick => {
                if let Some(frame) = manager.latest_frame() {
                    self.video = Some(CameraFrame::new(frame));
                }
            }
        }
        Task::none()
    }

    fn handle_capture(&mut self, msg: CaptureMsg) -> Task<cosmic::Action<Msg>> {
        match msg {
            CaptureMsg::Saved(Ok(saved)) => {
                let path = saved.path.display().to_string();
                let (width, height) = saved.image.dimensions();
                self.export = Some(ExportPreview {
                    handle: image::Handle::from_rgba(width, height, saved.image.into_raw()),
                    path: path.clone(),
                });
                self.status = Some(fl!("saved-to", path = path));
            }
            CaptureMsg::Saved(Err(reason)) => {
                self.status = Some(fl!("export-failed", reason = reason));
            }
            CaptureMsg::DismissPreview => {
                self.export = None;
            }
        }
        Task::none()
    }
}

impl cosmic::Application for App {
    type Executor = cosmic::executor::Default;

    type Flags = ();

    type Message = Msg;

    const APP_ID: &'static str = "io.github.layoutlens";

    fn core(&self) -> &app::Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut app::Core {
        &mut self.core
    }

    fn init(
        mut core: app::Core,
        _flags: Self::Flags,
    ) -> (Self, cosmic::iced::Task<cosmic::Action<Self::Message>>) {
        // The overlay canvas must cover the whole window so that pointer
        // coordinates and the viewport size agree. The toolbar moves and
        // closes the window instead.
        core.window.show_headerbar = false;

        let config = LayoutLensConfig::load();
        let mut session = Session::new(config.ratios(), config.initial_ratio());
        session.set_viewport(INITIAL_SIZE.width, INITIAL_SIZE.height);

        let (camera, status) = match GstCameraBackend::new() {
            Ok(backend) => (
                Some(StreamManager::new(
                    Arc::new(backend),
                    config.prefer_rear_camera,
                )),
                None,
            ),
            Err(err) => {
                log::error!("Camera backend unavailable: {}", err);
                (None, Some(fl!("camera-error", reason = err.to_string())))
            }
        };

        let mut app = Self {
            core,
            config,
            session,
            camera,
            video: None,
            export: None,
            status,
        };
        let task = app.request_camera(false);
        (app, task)
    }

    fn view(&self) -> cosmic::Element<'_, Self::Message> {
        let theme = self.core.system_theme().cosmic();
        let space_s = theme.spacing.space_s;
        let space_xs = theme.spacing.space_xs;

        let video_layer: cosmic::Element<'_, Msg> = match &self.video {
            // Stretched like the export, so preview and export line up
            Some(frame) => image::Image::new(frame.handle.clone())
                .content_fit(ContentFit::Fill)
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            None => cosmic::widget::container(cosmic::widget::horizontal_space())
                .width(Length::Fill)
                .height(Length::Fill)
                .class(cosmic::theme::Container::Custom(Box::new(|_| {
                    cosmic::iced_widget::container::Style {
                        background: Some(cosmic::iced::Color::BLACK.into()),
                        ..Default::default()
                    }
                })))
                .into(),
        };

        let canvas_layer: cosmic::Element<'_, Msg> = cosmic::iced_widget::canvas::Canvas::new(
            OverlayCanvas {
                frame: self.session.frame(),
                store: &self.session.store,
                style: &self.config.style,
                on_press: self.overlay_press(),
            },
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .into();

        let toolbar = build_toolbar(
            self.session.mode,
            self.session.ratios(),
            self.session.ratio(),
            self.session.ratio_label(),
            self.status.as_deref(),
            Msg::select_mode,
            Msg::select_ratio,
            Msg::capture(),
            Msg::switch_camera(),
            Msg::drag_window(),
            Msg::close_window(),
            space_s,
            space_xs,
        );
        // Toolbar pinned to the top, the rest of the layer lets clicks through
        let toolbar_layer = column![toolbar, cosmic::widget::vertical_space()]
            .width(Length::Fill)
            .height(Length::Fill);

        if let Some(preview) = &self.export {
            let preview_layer = build_export_preview(
                preview.handle.clone(),
                preview.path.clone(),
                Msg::dismiss_preview(),
                Msg::drag_window(),
                space_s,
            );
            stack![video_layer, canvas_layer, toolbar_layer, preview_layer]
                .width(Length::Fill)
                .height(Length::Fill)
                .into()
        } else {
            stack![video_layer, canvas_layer, toolbar_layer]
                .width(Length::Fill)
                .height(Length::Fill)
                .into()
        }
    }

    fn update(
        &mut self,
        message: Self::Message,
    ) -> cosmic::iced::Task<cosmic::Action<Self::Message>> {
        self.handle(message)
    }

    fn subscription(&self) -> cosmic::iced_futures::Subscription<Self::Message> {
        let mut subscriptions = vec![listen_with(|e, _, _| match e {
            cosmic::iced_core::Event::Window(window::Event::Resized(size))
            | cosmic::iced_core::Event::Window(window::Event::Opened { size, .. }) => {
                Some(Msg::resized(size.width, size.height))
            }
            cosmic::iced_core::Event::Keyboard(cosmic::iced::keyboard::Event::KeyPressed {
                key,
                modifiers,
                ..
            }) => Some(Msg::Key(key, modifiers)),
            _ => None,
        })];

        // Only poll frames while a stream is attached
        if self
            .camera
            .as_ref()
            .is_some_and(|manager| manager.active().is_some())
        {
            subscriptions.push(cosmic::iced::time::every(FRAME_INTERVAL).map(|_| Msg::tick()));
        }

        Subscription::batch(subscriptions)
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Some(manager) = self.camera.as_mut() {
            manager.shutdown();
        }
    }
}
