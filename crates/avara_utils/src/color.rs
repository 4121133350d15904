use std::fmt::{self, Display};

/// A raw QuickDraw `RGBColor`, with 16 bits per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rgb16 {
    pub r: u16,
    pub g: u16,
    pub b: u16,
}

impl Rgb16 {
    pub const fn new(r: u16, g: u16, b: u16) -> Self {
        Self { r, g, b }
    }
}

/// Normalized color, every channel is in the `[0, 1]` range.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{0}` is not a color, expected `#rrggbb` or three 16-bit channels")]
pub struct ColorParseError(pub String);

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parses a hex triplet, with either a `#` or a `0x` prefix.
    ///
    /// ## Example
    /// ```
    /// # use avara_utils::Color;
    /// let c = Color::from_hex("#ff0000").unwrap();
    /// assert_eq!(c, Color::new(1.0, 0.0, 0.0));
    /// assert!(Color::from_hex("ff00").is_err());
    /// ```
    pub fn from_hex(s: &str) -> Result<Self, ColorParseError> {
        let error = || ColorParseError(s.to_string());

        let digits = s
            .strip_prefix('#')
            .or_else(|| s.strip_prefix("0x"))
            .unwrap_or(s);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(error());
        }

        let channel = |i: usize| -> Result<f32, ColorParseError> {
            let value = u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| error())?;
            Ok(value as f32 / 255.0)
        };

        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Parses either a hex triplet, or three comma separated 16-bit channels (`65535,0,0`).
    pub fn parse(s: &str) -> Result<Self, ColorParseError> {
        if !s.contains(',') {
            return Self::from_hex(s);
        }

        let channels = s
            .split(',')
            .map(|part| part.trim().parse::<u16>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ColorParseError(s.to_string()))?;

        match channels[..] {
            [r, g, b] => Ok(Rgb16::new(r, g, b).into()),
            _ => Err(ColorParseError(s.to_string())),
        }
    }
}

impl From<Rgb16> for Color {
    #[inline]
    fn from(value: Rgb16) -> Self {
        Color {
            r: value.r as f32 / 65535.0,
            g: value.g as f32 / 65535.0,
            b: value.b as f32 / 65535.0,
        }
    }
}

/// Writes the channels as `r,g,b`, each with at most three decimal places.
///
/// ```
/// # use avara_utils::color::{Color, Rgb16};
/// assert_eq!(Color::from(Rgb16::new(65535, 32768, 0)).to_string(), "1,0.5,0");
/// ```
impl Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{}",
            channel_string(self.r),
            channel_string(self.g),
            channel_string(self.b)
        )
    }
}

fn channel_string(value: f32) -> String {
    let formatted = format!("{value:.3}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "" | "-0" => "0".to_string(),
        t => t.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{Color, Rgb16};

    #[test]
    fn rgb16_is_normalized() {
        let c: Color = Rgb16::new(0, 65535, 13107).into();
        assert_eq!(c.r, 0.0);
        assert_eq!(c.g, 1.0);
        assert!((c.b - 0.2).abs() < 1e-6);
    }

    #[test]
    fn parse_accepts_both_notations() {
        assert_eq!(Color::parse("0x00ff00").unwrap(), Color::new(0.0, 1.0, 0.0));
        assert_eq!(Color::parse("0,0,65535").unwrap(), Color::new(0.0, 0.0, 1.0));
        assert!(Color::parse("1,2").is_err());
        assert!(Color::parse("#gg0000").is_err());
    }

    #[test]
    fn display_trims_zeros() {
        assert_eq!(Color::WHITE.to_string(), "1,1,1");
        assert_eq!(Color::new(0.25, 0.1234, 0.0).to_string(), "0.25,0.123,0");
    }
}
