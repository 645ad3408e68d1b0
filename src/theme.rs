use ratatui::style::Color;

// Color palette structure
#[allow(dead_code)]
#[derive(Clone, Debug)]
pub struct Base16Palette {
    pub base_00: Color, // Background
    pub base_01: Color, // Lighter background
    pub base_02: Color, // Selection background
    pub base_03: Color, // Comments, invisibles
    pub base_04: Color, // Dark foreground
    pub base_05: Color, // Default foreground
    pub base_06: Color, // Light foreground
    pub base_07: Color, // Light background
    pub base_08: Color, // Red
    pub base_09: Color, // Orange
    pub base_0a: Color, // Yellow
    pub base_0b: Color, // Green
    pub base_0c: Color, // Cyan
    pub base_0d: Color, // Blue
    pub base_0e: Color, // Purple
    pub base_0f: Color, // Brown
}

// Oceanic Next theme
pub const OCEANIC_NEXT: Base16Palette = Base16Palette {
    base_00: Color::Rgb(0x1B, 0x2B, 0x34),
    base_01: Color::Rgb(0x34, 0x3D, 0x46),
    base_02: Color::Rgb(0x4F, 0x5B, 0x66),
    base_03: Color::Rgb(0x65, 0x73, 0x7E),
    base_04: Color::Rgb(0xA7, 0xAD, 0xBA),
    base_05: Color::Rgb(0xC0, 0xC5, 0xCE),
    base_06: Color::Rgb(0xCD, 0xD3, 0xDE),
    base_07: Color::Rgb(0xD8, 0xDE, 0xE9),
    base_08: Color::Rgb(0xEC, 0x5F, 0x67),
    base_09: Color::Rgb(0xF9, 0x91, 0x57),
    base_0a: Color::Rgb(0xFA, 0xC8, 0x63),
    base_0b: Color::Rgb(0x99, 0xC7, 0x94),
    base_0c: Color::Rgb(0x5F, 0xB3, 0xB3),
    base_0d: Color::Rgb(0x66, 0x99, 0xCC),
    base_0e: Color::Rgb(0xC5, 0x94, 0xC5),
    base_0f: Color::Rgb(0xAB, 0x79, 0x67),
};

pub fn current_theme() -> &'static Base16Palette {
    &OCEANIC_NEXT
}

/// Mix `over` onto `under` with the given opacity.
///
/// Only RGB colours can be mixed; anything else returns `over` unchanged.
pub fn blend(under: Color, over: Color, opacity: f32) -> Color {
    match (under, over) {
        (Color::Rgb(ur, ug, ub), Color::Rgb(or, og, ob)) => {
            let a = opacity.clamp(0.0, 1.0);
            let mix = |u: u8, o: u8| -> u8 {
                (f32::from(u) * (1.0 - a) + f32::from(o) * a).round() as u8
            };
            Color::Rgb(mix(ur, or), mix(ug, og), mix(ub, ob))
        }
        _ => over,
    }
}
