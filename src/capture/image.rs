//! Camera frame snapshot with a display handle

use image::RgbaImage;

/// A camera frame with both raw RGBA data and a display handle
#[derive(Clone, Debug)]
pub struct CameraFrame {
    pub rgba: RgbaImage,
    pub handle: cosmic::widget::image::Handle,
}

impl CameraFrame {
    pub fn new(rgba: RgbaImage) -> Self {
        let handle = cosmic::widget::image::Handle::from_rgba(
            rgba.width(),
            rgba.height(),
            rgba.clone().into_vec(),
        );
        Self { rgba, handle }
    }
}
