//! RGBA colors and color-string parsing for configuration files.

/// Linear RGBA color with components in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const CLEAR: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Build a color from 8-bit channels.
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    /// Same color with a different alpha.
    #[inline]
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Component-wise linear interpolation.
    pub fn lerp(self, to: Color, t: f32) -> Color {
        Color {
            r: self.r + (to.r - self.r) * t,
            g: self.g + (to.g - self.g) * t,
            b: self.b + (to.b - self.b) * t,
            a: self.a + (to.a - self.a) * t,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// Parse a color string.
///
/// Supports:
/// - Named colors: black, white, clear, red, green, blue, yellow, cyan,
///   magenta, gray/grey, orange, purple, pink, brown
/// - Hex: `#RGB` (expanded to `#RRGGBB`), `#RRGGBB`, `#RRGGBBAA`
/// - Case-insensitive, trims whitespace
pub fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if s.starts_with('#') {
        parse_hex(s)
    } else {
        parse_named(s)
    }
}

fn parse_hex(s: &str) -> Option<Color> {
    let hex = s.strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let byte = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    match hex.len() {
        3 => {
            let r = byte(0..1)?;
            let g = byte(1..2)?;
            let b = byte(2..3)?;
            Some(Color::from_rgba8(r * 17, g * 17, b * 17, 255))
        }
        6 => Some(Color::from_rgba8(byte(0..2)?, byte(2..4)?, byte(4..6)?, 255)),
        8 => Some(Color::from_rgba8(
            byte(0..2)?,
            byte(2..4)?,
            byte(4..6)?,
            byte(6..8)?,
        )),
        _ => None,
    }
}

fn parse_named(s: &str) -> Option<Color> {
    let (r, g, b, a) = match s.to_lowercase().as_str() {
        "black"         => (0, 0, 0, 255),
        "white"         => (255, 255, 255, 255),
        "clear"         => (0, 0, 0, 0),
        "red"           => (255, 0, 0, 255),
        "green"         => (0, 128, 0, 255),
        "blue"          => (0, 0, 255, 255),
        "yellow"        => (255, 255, 0, 255),
        "cyan"          => (0, 255, 255, 255),
        "magenta"       => (255, 0, 255, 255),
        "gray" | "grey" => (128, 128, 128, 255),
        "orange"        => (255, 165, 0, 255),
        "purple"        => (128, 0, 128, 255),
        "pink"          => (255, 192, 203, 255),
        "brown"         => (139, 69, 19, 255),
        _               => return None,
    };
    Some(Color::from_rgba8(r, g, b, a))
}
