use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CatalogError;

pub type CharacterId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifeStatus {
    Alive,
    Dead,
    Unknown,
}

impl LifeStatus {
    /// Text stored in the cache and returned by the API.
    pub fn as_str(self) -> &'static str {
        match self {
            LifeStatus::Alive => "Alive",
            LifeStatus::Dead => "Dead",
            LifeStatus::Unknown => "unknown",
        }
    }

    /// Value accepted by the `status` query parameter.
    pub fn as_query(self) -> &'static str {
        match self {
            LifeStatus::Alive => "alive",
            LifeStatus::Dead => "dead",
            LifeStatus::Unknown => "unknown",
        }
    }

    /// Lenient parse used when reading stored rows; anything unrecognised is `Unknown`.
    pub fn from_stored(s: &str) -> Self {
        s.parse().unwrap_or(LifeStatus::Unknown)
    }
}

impl FromStr for LifeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alive" => Ok(LifeStatus::Alive),
            "dead" => Ok(LifeStatus::Dead),
            "unknown" => Ok(LifeStatus::Unknown),
            other => Err(format!("unknown life status `{other}`")),
        }
    }
}

impl fmt::Display for LifeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Female,
    Male,
    Genderless,
    Unknown,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Female => "Female",
            Gender::Male => "Male",
            Gender::Genderless => "Genderless",
            Gender::Unknown => "unknown",
        }
    }

    pub fn as_query(self) -> &'static str {
        match self {
            Gender::Female => "female",
            Gender::Male => "male",
            Gender::Genderless => "genderless",
            Gender::Unknown => "unknown",
        }
    }

    pub fn from_stored(s: &str) -> Self {
        s.parse().unwrap_or(Gender::Unknown)
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "female" => Ok(Gender::Female),
            "male" => Ok(Gender::Male),
            "genderless" => Ok(Gender::Genderless),
            "unknown" => Ok(Gender::Unknown),
            other => Err(format!("unknown gender `{other}`")),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub location_id: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub life_status: LifeStatus,
    pub species: String,
    pub subtype: Option<String>,
    pub gender: Gender,
    pub origin: Location,
    pub current_location: Location,
    pub image_url: String,
    pub episode_ids: Vec<u32>,
    pub api_url: String,
    pub created_at: DateTime<Utc>,
    /// Remote page that followed this record's page when it was fetched.
    pub next_key: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub total_count: u32,
    pub total_pages: u32,
    pub next_page: Option<u32>,
    pub prev_page: Option<u32>,
}

impl PaginationInfo {
    /// Zero counts and no cursors; what a "nothing matched" answer looks like.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// 24-bit RGB accent color, serialized as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ThemeColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl ThemeColor {
    pub const WHITE: ThemeColor = ThemeColor::rgb(0xFF, 0xFF, 0xFF);
    pub const BLACK: ThemeColor = ThemeColor::rgb(0x00, 0x00, 0x00);

    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

impl FromStr for ThemeColor {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return Err(CatalogError::InvalidColor(s.to_string()));
        }
        // Accept ARGB too; alpha is dropped.
        let hex = match hex.len() {
            6 => hex,
            8 => &hex[2..],
            _ => return Err(CatalogError::InvalidColor(s.to_string())),
        };
        let value =
            u32::from_str_radix(hex, 16).map_err(|_| CatalogError::InvalidColor(s.to_string()))?;
        Ok(ThemeColor::rgb(
            ((value >> 16) & 0xFF) as u8,
            ((value >> 8) & 0xFF) as u8,
            (value & 0xFF) as u8,
        ))
    }
}

impl TryFrom<String> for ThemeColor {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ThemeColor> for String {
    fn from(c: ThemeColor) -> Self {
        c.to_hex()
    }
}

impl fmt::Display for ThemeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub your_character_id: Option<CharacterId>,
    pub light_theme_color: Option<ThemeColor>,
    pub dark_theme_color: Option<ThemeColor>,
}

impl Settings {
    pub fn main_color_for_theme(&self, is_dark: bool) -> Option<ThemeColor> {
        if is_dark {
            self.dark_theme_color
        } else {
            self.light_theme_color
        }
    }
}
