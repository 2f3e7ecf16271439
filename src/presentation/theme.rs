//! Color palettes and the accent override stored in settings.

use rand::Rng;

use crate::domain::{Settings, ThemeColor};

/// Default accent of both palettes.
pub const ACCENT: ThemeColor = ThemeColor::rgb(0xEC, 0xEA, 0x0E);

/// Below this relative luminance a color counts as dark.
const DARK_LUMINANCE: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppThemeColors {
    pub main_color: ThemeColor,
    pub background: ThemeColor,
    pub surface: ThemeColor,
    pub text: ThemeColor,
    pub secondary_text: ThemeColor,
}

pub fn base_palette() -> AppThemeColors {
    AppThemeColors {
        main_color: ACCENT,
        background: ThemeColor::rgb(0xFA, 0xFA, 0xFA),
        surface: ThemeColor::WHITE,
        text: ThemeColor::rgb(0x1C, 0x1B, 0x1F),
        secondary_text: ThemeColor::rgb(0x6F, 0x6F, 0x6F),
    }
}

pub fn base_dark_palette() -> AppThemeColors {
    AppThemeColors {
        main_color: ACCENT,
        background: ThemeColor::rgb(0x12, 0x12, 0x12),
        surface: ThemeColor::rgb(0x1E, 0x1E, 0x1E),
        text: ThemeColor::rgb(0xE6, 0xE1, 0xE5),
        secondary_text: ThemeColor::rgb(0xA0, 0xA0, 0xA0),
    }
}

/// Base palette for the theme with the user's accent applied, if any.
pub fn palette(settings: &Settings, is_dark: bool) -> AppThemeColors {
    let base = if is_dark {
        base_dark_palette()
    } else {
        base_palette()
    };
    match settings.main_color_for_theme(is_dark) {
        Some(main_color) => AppThemeColors { main_color, ..base },
        None => base,
    }
}

fn linear(channel: u8) -> f64 {
    let c = f64::from(channel) / 255.0;
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// WCAG relative luminance in `0.0..=1.0`.
pub fn luminance(color: ThemeColor) -> f64 {
    0.2126 * linear(color.red) + 0.7152 * linear(color.green) + 0.0722 * linear(color.blue)
}

pub fn is_dark(color: ThemeColor) -> bool {
    luminance(color) < DARK_LUMINANCE
}

/// Readable content color on top of `background`.
pub fn suitable_color(background: ThemeColor) -> ThemeColor {
    if is_dark(background) {
        ThemeColor::WHITE
    } else {
        ThemeColor::BLACK
    }
}

pub fn random_color() -> ThemeColor {
    let mut rng = rand::rng();
    ThemeColor::rgb(rng.random(), rng.random(), rng.random())
}
