//! Canonical property model shared by every renderer.
//!
//! Values in this module are produced by the normalizer and are immutable afterwards;
//! nothing here is cached or persisted.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// A fully-formed image with an absolute URL.
///
/// Only constructible through [`ResolvedImage::new`], which refuses empty or relative URLs,
/// so holding one always means there is something renderable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedImage {
    url: String,
    pub alt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focal_point: Option<FocalPoint>,
}

/// Hotspot center in relative coordinates (0.0..=1.0 on both axes).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FocalPoint {
    pub x: f64,
    pub y: f64,
}

impl ResolvedImage {
    pub fn new(url: impl Into<String>, alt: impl Into<String>) -> Option<Self> {
        let url = url.into();
        if !is_absolute_url(&url) {
            return None;
        }
        Some(Self {
            url,
            alt: alt.into(),
            width: None,
            height: None,
            aspect_ratio: None,
            focal_point: None,
        })
    }

    /// Attach intrinsic dimensions; the aspect ratio follows from them.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self.aspect_ratio = if height > 0 {
            Some(width as f64 / height as f64)
        } else {
            None
        };
        self
    }

    pub fn with_focal_point(mut self, focal_point: Option<FocalPoint>) -> Self {
        self.focal_point = focal_point;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// `http(s)://` followed by at least a host character.
pub fn is_absolute_url(candidate: &str) -> bool {
    let rest = candidate
        .strip_prefix("https://")
        .or_else(|| candidate.strip_prefix("http://"));
    matches!(rest, Some(r) if !r.trim().is_empty() && !r.starts_with('/'))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Sale,
    Rent,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Sale => "sale",
            PropertyType::Rent => "rent",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyStatus {
    #[default]
    Available,
    Reserved,
    Sold,
    Rented,
}

impl PropertyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyStatus::Available => "available",
            PropertyStatus::Reserved => "reserved",
            PropertyStatus::Sold => "sold",
            PropertyStatus::Rented => "rented",
        }
    }
}

impl fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flags computed from other listing fields. Read-only outside the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingFlags {
    is_highlight: bool,
    is_premium: bool,
    is_new: bool,
}

impl ListingFlags {
    pub(crate) fn derived(is_highlight: bool, is_premium: bool, is_new: bool) -> Self {
        Self {
            is_highlight,
            is_premium,
            is_new,
        }
    }

    pub fn is_highlight(&self) -> bool {
        self.is_highlight
    }

    pub fn is_premium(&self) -> bool {
        self.is_premium
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }
}

/// The single normalized listing consumed by every renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalProperty {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub location: String,
    pub city: Option<String>,
    pub neighborhood: Option<String>,

    pub price: f64,
    pub property_type: PropertyType,

    pub area: Option<f64>,
    pub total_area: Option<f64>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub parking_spots: Option<u32>,

    pub main_image: Option<ResolvedImage>,
    pub gallery: Vec<ResolvedImage>,

    #[serde(flatten)]
    pub flags: ListingFlags,
    pub status: PropertyStatus,

    pub description: Option<String>,
    pub features: Vec<String>,
    pub published_date: Option<DateTime<Utc>>,

    pub address: Option<String>,
    pub state: Option<String>,
    pub category: Option<String>,
    pub code: Option<String>,
    pub accepts_financing: Option<bool>,
    pub video_tour_url: Option<String>,
    pub condo_fee: Option<f64>,
    pub property_tax: Option<f64>,
}

impl CanonicalProperty {
    pub fn is_highlight(&self) -> bool {
        self.flags.is_highlight()
    }

    pub fn is_premium(&self) -> bool {
        self.flags.is_premium()
    }

    pub fn is_new(&self) -> bool {
        self.flags.is_new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_image_requires_absolute_url() {
        assert!(ResolvedImage::new("", "alt").is_none());
        assert!(ResolvedImage::new("/images/x.jpg", "alt").is_none());
        assert!(ResolvedImage::new("https://", "alt").is_none());
        assert!(ResolvedImage::new("ftp://cdn/x.jpg", "alt").is_none());

        let image = ResolvedImage::new("https://cdn/x.jpg", "Casa").unwrap();
        assert_eq!(image.url(), "https://cdn/x.jpg");
        assert_eq!(image.alt, "Casa");
    }

    #[test]
    fn test_dimensions_set_aspect_ratio() {
        let image = ResolvedImage::new("https://cdn/x.jpg", "")
            .unwrap()
            .with_dimensions(1600, 900);
        assert_eq!(image.width, Some(1600));
        assert_eq!(image.height, Some(900));
        assert!((image.aspect_ratio.unwrap() - 16.0 / 9.0).abs() < f64::EPSILON);

        let flat = ResolvedImage::new("https://cdn/x.jpg", "")
            .unwrap()
            .with_dimensions(10, 0);
        assert_eq!(flat.aspect_ratio, None);
    }

    #[test]
    fn test_enums_serialize_lowercase() {
        assert_eq!(serde_json::to_value(PropertyType::Sale).unwrap(), "sale");
        assert_eq!(serde_json::to_value(PropertyStatus::Rented).unwrap(), "rented");
        assert_eq!(PropertyStatus::default(), PropertyStatus::Available);
    }
}
