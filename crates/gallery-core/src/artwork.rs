//! Artwork and artist types as stored in the hosted catalog

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Unique identifier for an artwork, as assigned by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtworkId(pub String);

impl ArtworkId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ArtworkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ArtworkId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// An artist, joined onto artworks for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub bio: Option<String>,
    pub slug: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// One sellable piece
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artwork {
    /// Catalog identifier, also the cart de-duplication key
    pub id: ArtworkId,
    pub title: String,
    /// Owning artist (nullable in the catalog)
    #[serde(default)]
    pub artist_id: Option<String>,
    /// Listed price; `None` means "inquire"
    #[serde(default)]
    pub price: Option<f64>,
    pub image_url: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Free text such as "24x36" or "24 by 36"
    #[serde(default)]
    pub dimensions: Option<String>,
    #[serde(default)]
    pub is_sold: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Joined from the artists table
    #[serde(default, rename = "artists")]
    pub artist: Option<Artist>,
}

impl Artwork {
    /// Create an artwork with only the required fields set
    pub fn new(id: impl Into<String>, title: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            id: ArtworkId::new(id),
            title: title.into(),
            artist_id: None,
            price: None,
            image_url: image_url.into(),
            description: None,
            dimensions: None,
            is_sold: false,
            created_at: None,
            artist: None,
        }
    }

    pub fn with_price(mut self, price: Option<f64>) -> Self {
        self.price = price;
        self
    }

    pub fn with_artist(mut self, artist: Artist) -> Self {
        self.artist_id = Some(artist.id.clone());
        self.artist = Some(artist);
        self
    }

    /// Sold pieces are shown but cannot be added to the cart from the UI
    pub fn is_purchasable(&self) -> bool {
        !self.is_sold
    }

    pub fn artist_name(&self) -> Option<&str> {
        self.artist.as_ref().map(|a| a.name.as_str())
    }

    /// Display label for the price ("$1,250" or "Inquire")
    pub fn price_label(&self) -> String {
        match self.price {
            Some(price) => format!("${}", format_price(price)),
            None => "Inquire".to_string(),
        }
    }

    pub fn parsed_dimensions(&self) -> Option<Dimensions> {
        self.dimensions.as_deref().and_then(|d| d.parse().ok())
    }
}

/// Format a price with thousands separators.
///
/// Whole amounts have no decimals, anything else gets two.
pub fn format_price(price: f64) -> String {
    let negative = price < 0.0;
    let price = price.abs();
    let whole = price.trunc() as u64;
    let cents = ((price - price.trunc()) * 100.0).round() as u64;
    // 99.999 rounds up into the next whole unit
    let (whole, cents) = if cents >= 100 { (whole + 1, 0) } else { (whole, cents) };

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if negative { "-" } else { "" };
    if cents == 0 {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{:02}", sign, grouped, cents)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DimensionsError {
    #[error("no separator between width and height: {0}")]
    MissingSeparator(String),
    #[error("invalid number in dimensions: {0}")]
    InvalidNumber(String),
}

/// Width and height parsed from a loosely formatted dimensions string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
    /// Unit suffix if one was given ("in", "cm", ...)
    pub unit: Option<String>,
}

impl Dimensions {
    /// Width over height
    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }
}

impl FromStr for Dimensions {
    type Err = DimensionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();

        let (width, rest) = split_width(&lowered).ok_or_else(|| {
            if [" by ", "x", "×"].iter().any(|sep| lowered.contains(sep)) {
                DimensionsError::InvalidNumber(s.to_string())
            } else {
                DimensionsError::MissingSeparator(s.to_string())
            }
        })?;

        // Height is the leading number; a unit may follow, then free text
        let rest = rest.trim();
        let split = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (h, tail) = rest.split_at(split);
        let height = parse_length(h).ok_or_else(|| DimensionsError::InvalidNumber(h.to_string()))?;

        let unit = match tail.split_whitespace().next().map(|u| u.trim_end_matches(['.', ','])) {
            None | Some("") => None,
            Some("\"" | "in" | "inch" | "inches") => Some("in".to_string()),
            Some(other) if other.chars().all(char::is_alphabetic) => Some(other.to_string()),
            Some(_) => None,
        };

        Ok(Self { width, height, unit })
    }
}

/// Width and remainder, split at the first separator preceded by a valid width
fn split_width(s: &str) -> Option<(f32, &str)> {
    s.char_indices().find_map(|(i, c)| {
        let sep_len = if s[i..].starts_with(" by ") {
            4
        } else if c == 'x' || c == '×' {
            c.len_utf8()
        } else {
            return None;
        };
        parse_length(&s[..i]).map(|width| (width, &s[i + sep_len..]))
    })
}

fn parse_length(s: &str) -> Option<f32> {
    let s = s.trim().trim_end_matches(|c: char| c == '"' || c.is_alphabetic()).trim();
    let value: f32 = s.parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}
