use crossterm::style::{Color, Stylize, StyledContent};

// ─── Color Palette ───────────────────────────────────────────────────────────
pub const PRIMARY:    Color = Color::Rgb { r: 155, g: 93,  b: 229 }; // electric violet
pub const ACCENT:     Color = Color::Rgb { r: 0,   g: 245, b: 255 }; // neon cyan
pub const HOT_PINK:   Color = Color::Rgb { r: 241, g: 91,  b: 181 };
pub const GOLD:       Color = Color::Rgb { r: 255, g: 210, b: 63 };

pub const TEXT:       Color = Color::Rgb { r: 220, g: 220, b: 235 };
pub const TEXT_DIM:   Color = Color::Rgb { r: 140, g: 140, b: 160 };
pub const TEXT_MUTED: Color = Color::Rgb { r: 80,  g: 80,  b: 100 };

pub const ERROR:      Color = Color::Rgb { r: 255, g: 90,  b: 90 };

// ─── Styles ──────────────────────────────────────────────────────────────────
pub fn title(text: &str) -> StyledContent<String> {
    text.to_string().with(PRIMARY).bold()
}

pub fn emotion(text: &str) -> StyledContent<String> {
    text.to_string().with(HOT_PINK).bold()
}

pub fn song(text: &str) -> StyledContent<String> {
    text.to_string().with(TEXT)
}

pub fn artist(text: &str) -> StyledContent<String> {
    text.to_string().with(ACCENT)
}

pub fn language(text: &str) -> StyledContent<String> {
    text.to_string().with(GOLD)
}

pub fn dim(text: &str) -> StyledContent<String> {
    text.to_string().with(TEXT_DIM)
}

pub fn muted(text: &str) -> StyledContent<String> {
    text.to_string().with(TEXT_MUTED)
}

pub fn error(text: &str) -> StyledContent<String> {
    text.to_string().with(ERROR).bold()
}
