//! Color identifier resolution.

use peniko::Color;
use peniko::color::{Srgb, parse_color};

/// Color used when an identifier cannot be parsed.
pub const FALLBACK_COLOR: Color = Color::BLACK;

/// Resolve a color identifier: CSS names in any case (`"Red"`, `"white"`),
/// hex (`"#ff0000"`) or functional notation. Unknown identifiers fall back
/// to black.
pub fn resolve_color(name: &str) -> Color {
    match parse_color(&name.trim().to_ascii_lowercase()) {
        Ok(color) => color.to_alpha_color::<Srgb>(),
        Err(e) => {
            log::warn!("Unknown color {:?} ({}), using black", name, e);
            FALLBACK_COLOR
        }
    }
}

/// Resolve to 8-bit RGBA.
pub fn resolve_rgba8(name: &str) -> [u8; 4] {
    let rgba = resolve_color(name).to_rgba8();
    [rgba.r, rgba.g, rgba.b, rgba.a]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_colors_any_case() {
        assert_eq!(resolve_rgba8("Red"), [255, 0, 0, 255]);
        assert_eq!(resolve_rgba8("white"), [255, 255, 255, 255]);
        assert_eq!(resolve_rgba8("BLACK"), [0, 0, 0, 255]);
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(resolve_rgba8("#00ff00"), [0, 255, 0, 255]);
    }

    #[test]
    fn test_unknown_falls_back_to_black() {
        assert_eq!(resolve_rgba8("not-a-color"), [0, 0, 0, 255]);
    }
}
