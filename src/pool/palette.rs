//! Worker display colors
//!
//! Ordinal only picks a color; it has no effect on scheduling.

use console::{Color, Style};

/// One entry of the worker color palette
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteColor {
    pub color: Color,
    pub bright: bool,
}

impl PaletteColor {
    const fn new(color: Color, bright: bool) -> Self {
        Self { color, bright }
    }

    /// Console style for this entry
    pub fn style(&self) -> Style {
        let style = Style::new().fg(self.color);
        if self.bright {
            style.bright()
        } else {
            style
        }
    }
}

/// Fixed worker palette, indexed by `ordinal % PALETTE.len()`
pub const PALETTE: [PaletteColor; 14] = [
    PaletteColor::new(Color::Green, true),
    PaletteColor::new(Color::Yellow, true),
    PaletteColor::new(Color::Blue, true),
    PaletteColor::new(Color::Magenta, true),
    PaletteColor::new(Color::Cyan, true),
    PaletteColor::new(Color::White, true),
    PaletteColor::new(Color::Red, false),
    PaletteColor::new(Color::Green, false),
    PaletteColor::new(Color::Yellow, false),
    PaletteColor::new(Color::Blue, false),
    PaletteColor::new(Color::Magenta, false),
    PaletteColor::new(Color::Cyan, false),
    PaletteColor::new(Color::White, false),
    // Dark gray
    PaletteColor::new(Color::Black, true),
];

/// Palette entry for a worker ordinal
pub fn color_for(ordinal: usize) -> PaletteColor {
    PALETTE[ordinal % PALETTE.len()]
}
