//! Annotation types placed over the camera preview
//!
//! All annotation types store coordinates in viewport pixels.

/// Reference point placed by the user
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dot {
    pub x: f32,
    pub y: f32,
}

/// Axis-aligned guide line spanning the whole guide rectangle
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Line {
    /// Vertical guide at `x`, spanning the frame height
    Vertical { x: f32 },
    /// Horizontal guide at `y`, spanning the frame width
    Horizontal { y: f32 },
}

/// Append-only store of dots and guide lines
///
/// Append order is drawing order. The selected line is always the most
/// recently created one.
#[derive(Clone, Debug, Default)]
pub struct AnnotationStore {
    dots: Vec<Dot>,
    lines: Vec<Line>,
    selected: Option<usize>,
}

impl AnnotationStore {
    pub fn add_dot(&mut self, x: f32, y: f32) {
        self.dots.push(Dot { x, y });
    }

    /// Append a vertical line and select it
    pub fn add_vertical_line(&mut self, x: f32) -> usize {
        self.push_line(Line::Vertical { x })
    }

    /// Append a horizontal line and select it
    pub fn add_horizontal_line(&mut self, y: f32) -> usize {
        self.push_line(Line::Horizontal { y })
    }

    fn push_line(&mut self, line: Line) -> usize {
        self.lines.push(line);
        let index = self.lines.len() - 1;
        self.selected = Some(index);
        index
    }

    pub fn dots(&self) -> &[Dot] {
        &self.dots
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Index of the selected line, if any line exists
    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_empty(&self) -> bool {
        self.dots.is_empty() && self.lines.is_empty()
    }
}
