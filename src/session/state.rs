//! Explicit session state owned by the app
//!
//! Everything the input controller mutates lives here; nothing is global.

use crate::domain::{AnnotationStore, AspectRatio, Frame, Mode, compute_frame};

#[derive(Clone, Debug)]
pub struct Session {
    viewport: (f32, f32),
    ratio: AspectRatio,
    frame: Frame,
    pub mode: Mode,
    pub store: AnnotationStore,
    /// Ratio presets offered in the toolbar and on number keys
    ratios: Vec<AspectRatio>,
}

impl Session {
    pub fn new(ratios: Vec<AspectRatio>, ratio: AspectRatio) -> Self {
        Self {
            viewport: (0.0, 0.0),
            ratio,
            frame: compute_frame(ratio.value(), 0.0, 0.0),
            mode: Mode::default(),
            store: AnnotationStore::default(),
            ratios,
        }
    }

    pub fn viewport(&self) -> (f32, f32) {
        self.viewport
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn ratio(&self) -> AspectRatio {
        self.ratio
    }

    pub fn ratios(&self) -> &[AspectRatio] {
        &self.ratios
    }

    /// Ratio preset at a zero-based position, for number-key selection
    pub fn ratio_at(&self, index: usize) -> Option<AspectRatio> {
        self.ratios.get(index).copied()
    }

    /// Text shown next to the ratio buttons
    pub fn ratio_label(&self) -> String {
        self.ratio.to_string()
    }

    pub fn set_ratio(&mut self, ratio: AspectRatio) {
        self.ratio = ratio;
        self.recompute();
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = (width.max(0.0), height.max(0.0));
        self.recompute();
    }

    fn recompute(&mut self) {
        let (w, h) = self.viewport;
        self.frame = compute_frame(self.ratio.value(), w, h);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_follows_viewport_and_ratio() {
        let mut session = Session::new(vec![AspectRatio::SQUARE], AspectRatio::SQUARE);
        assert!(session.frame().is_empty());

        session.set_viewport(1000.0, 800.0);
        let frame = session.frame();
        assert_eq!((frame.x, frame.y, frame.w, frame.h), (132.0, 32.0, 736.0, 736.0));

        let wide = AspectRatio::parse("16/9").unwrap();
        session.set_ratio(wide);
        let frame = session.frame();
        assert_eq!(frame.ratio, wide.value());
        assert_eq!(frame.w, 920.0);
        assert_eq!(session.ratio_label(), "1.778");
    }

    #[test]
    fn test_ratio_at() {
        let ratios = vec![AspectRatio::SQUARE, AspectRatio::parse("4/5").unwrap()];
        let session = Session::new(ratios, AspectRatio::SQUARE);
        assert_eq!(session.ratio_at(1).map(AspectRatio::value), Some(0.8));
        assert!(session.ratio_at(2).is_none());
    }
}
