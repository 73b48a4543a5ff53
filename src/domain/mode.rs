//! Annotation tool modes and aspect ratios

use std::fmt;

/// Active annotation tool, deciding what the next pointer-down places
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Dot,
    Vertical,
    Horizontal,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Dot, Mode::Vertical, Mode::Horizontal];
}

/// Ratio treated as the golden ratio for labelling
pub const GOLDEN_RATIO: f32 = 1.618;

/// Width / height ratio of the guide rectangle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AspectRatio(f32);

impl AspectRatio {
    pub const SQUARE: AspectRatio = AspectRatio(1.0);

    /// Create a ratio, rejecting non-positive and non-finite values
    pub fn new(value: f32) -> Option<Self> {
        (value.is_finite() && value > 0.0).then_some(Self(value))
    }

    /// Parse `"a/b"` or a plain decimal such as `"1.618"`
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let value = match raw.split_once('/') {
            Some((num, den)) => {
                let num: f32 = num.trim().parse().ok()?;
                let den: f32 = den.trim().parse().ok()?;
                num / den
            }
            None => raw.parse().ok()?,
        };
        Self::new(value)
    }

    pub fn value(self) -> f32 {
        self.0
    }

    pub fn is_golden(self) -> bool {
        self.0 == GOLDEN_RATIO
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::SQUARE
    }
}

/// "Golden" for φ, otherwise the ratio rounded to three decimals
impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_golden() {
            return f.write_str("Golden");
        }
        let rounded = (self.0 * 1000.0).round() / 1000.0;
        write!(f, "{rounded}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fraction_and_decimal() {
        assert_eq!(AspectRatio::parse("16/9").map(AspectRatio::value), Some(16.0 / 9.0));
        assert_eq!(AspectRatio::parse(" 4 / 5 ").map(AspectRatio::value), Some(0.8));
        assert_eq!(AspectRatio::parse("1.618").map(AspectRatio::value), Some(1.618));
        assert_eq!(AspectRatio::parse("1").map(AspectRatio::value), Some(1.0));
    }

    #[test]
    fn test_parse_rejects_invalid() {
        assert!(AspectRatio::parse("").is_none());
        assert!(AspectRatio::parse("abc").is_none());
        assert!(AspectRatio::parse("1/0").is_none());
        assert!(AspectRatio::parse("-3/2").is_none());
        assert!(AspectRatio::parse("0").is_none());
    }

    #[test]
    fn test_label() {
        assert_eq!(AspectRatio::parse("1.618").unwrap().to_string(), "Golden");
        assert_eq!(AspectRatio::parse("16/9").unwrap().to_string(), "1.778");
        assert_eq!(AspectRatio::parse("2/3").unwrap().to_string(), "0.667");
        assert_eq!(AspectRatio::parse("4/5").unwrap().to_string(), "0.8");
        assert_eq!(AspectRatio::SQUARE.to_string(), "1");
    }
}
