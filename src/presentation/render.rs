//! Plain-text rendering of screen states for the terminal.

use std::fmt::Write;

use super::theme::{self, AppThemeColors};
use crate::domain::{Character, LifeStatus, Settings, ThemeColor};

/// Terminal output style; `color` is off when stdout is not a terminal.
#[derive(Debug, Clone, Copy)]
pub struct Style {
    pub colors: AppThemeColors,
    pub color: bool,
}

impl Style {
    pub fn new(settings: &Settings, is_dark: bool, color: bool) -> Self {
        Self {
            colors: theme::palette(settings, is_dark),
            color,
        }
    }

    pub fn plain() -> Self {
        Self {
            colors: theme::base_palette(),
            color: false,
        }
    }

    /// Text on the accent color, like a highlighted chip.
    pub fn accent(&self, text: &str) -> String {
        if !self.color {
            return format!("[{text}]");
        }
        let bg = self.colors.main_color;
        let fg = theme::suitable_color(bg);
        format!(
            "\x1b[48;2;{};{};{}m\x1b[38;2;{};{};{}m {text} \x1b[0m",
            bg.red, bg.green, bg.blue, fg.red, fg.green, fg.blue
        )
    }
}

pub fn status_marker(status: LifeStatus) -> &'static str {
    match status {
        LifeStatus::Alive => "●",
        LifeStatus::Dead => "✕",
        LifeStatus::Unknown => "?",
    }
}

/// One list line: id, name, status and species, plus favourite/mine marks.
pub fn character_row(c: &Character, is_favourite: bool, is_mine: bool, style: &Style) -> String {
    let mut row = format!(
        "{:>4}  {} {} - {} {}",
        c.id,
        status_marker(c.life_status),
        c.name,
        c.life_status,
        c.species
    );
    if is_favourite {
        row.push_str(" ★");
    }
    if is_mine {
        row.push(' ');
        row.push_str(&style.accent("me"));
    }
    row
}

pub fn character_detail(c: &Character, style: &Style) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", style.accent(&c.name));
    let _ = writeln!(out, "  Status:    {} {}", status_marker(c.life_status), c.life_status);
    let _ = writeln!(out, "  Species:   {}", c.species);
    if let Some(subtype) = &c.subtype {
        let _ = writeln!(out, "  Type:      {subtype}");
    }
    let _ = writeln!(out, "  Gender:    {}", c.gender);
    let _ = writeln!(out, "  Origin:    {}", c.origin.name);
    let _ = writeln!(out, "  Location:  {}", c.current_location.name);
    let _ = writeln!(out, "  Episodes:  {}", c.episode_ids.len());
    let _ = writeln!(out, "  Image:     {}", c.image_url);
    let _ = write!(out, "  Created:   {}", c.created_at.format("%Y-%m-%d"));
    out
}

pub fn settings_summary(settings: &Settings) -> String {
    let color = |c: Option<ThemeColor>| {
        c.map_or_else(|| format!("default ({})", theme::ACCENT), |c| c.to_hex())
    };
    let mut out = String::new();
    let _ = writeln!(
        out,
        "my character: {}",
        settings
            .your_character_id
            .map_or_else(|| "none".to_string(), |id| id.to_string())
    );
    let _ = writeln!(out, "light accent: {}", color(settings.light_theme_color));
    let _ = write!(out, "dark accent:  {}", color(settings.dark_theme_color));
    out
}
