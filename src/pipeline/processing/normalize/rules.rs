use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

use crate::constants::SALE_PURPOSE_SYNONYMS;
use crate::domain::{PropertyStatus, PropertyType};

/// Field-level rules shared by the property normalizer.
///
/// Each rule is a pure function of already-parsed raw values and never fails; bad input
/// degrades to the documented default.
pub struct FieldRules;

impl FieldRules {
    /// Direct slug when present, otherwise the identity value.
    pub fn slug(slug: Option<&str>, id: &str) -> String {
        slug.map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(id)
            .to_string()
    }

    /// "Neighborhood, City", either part alone, or the placeholder when both are missing.
    pub fn location(neighborhood: Option<&str>, city: Option<&str>, placeholder: &str) -> String {
        let parts: Vec<&str> = [neighborhood, city]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        if parts.is_empty() {
            placeholder.to_string()
        } else {
            parts.join(", ")
        }
    }

    pub fn property_type(purpose: Option<&str>) -> PropertyType {
        match purpose.map(str::trim) {
            Some(p) if SALE_PURPOSE_SYNONYMS.iter().any(|s| p.eq_ignore_ascii_case(s)) => PropertyType::Sale,
            _ => PropertyType::Rent,
        }
    }

    pub fn status(status: Option<&str>) -> PropertyStatus {
        let Some(status) = status.map(|s| s.trim().to_lowercase()) else {
            return PropertyStatus::Available;
        };
        match status.as_str() {
            "reservado" | "reserved" => PropertyStatus::Reserved,
            "vendido" | "sold" => PropertyStatus::Sold,
            "alugado" | "rented" => PropertyStatus::Rented,
            _ => PropertyStatus::Available,
        }
    }

    /// Price is always rendered, so anything unusable becomes 0.
    pub fn price(price: Option<f64>) -> f64 {
        price.filter(|p| p.is_finite() && *p >= 0.0).unwrap_or(0.0)
    }

    /// Room and parking counts: non-negative whole numbers only.
    pub fn count(value: Option<f64>) -> Option<u32> {
        value
            .filter(|v| v.is_finite() && *v >= 0.0 && v.fract() == 0.0 && *v <= u32::MAX as f64)
            .map(|v| v as u32)
    }

    /// Areas and monetary side amounts: any finite non-negative number.
    pub fn measure(value: Option<f64>) -> Option<f64> {
        value.filter(|v| v.is_finite() && *v >= 0.0)
    }

    /// RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS` (read as UTC), or plain dates at midnight UTC.
    pub fn published_date(value: Option<&str>) -> Option<DateTime<Utc>> {
        let value = value?.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(naive.and_utc());
        }
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    /// Strictly newer than `now - window_days`. A window that leaves chrono's range is never new.
    pub fn is_new(published: Option<DateTime<Utc>>, now: DateTime<Utc>, window_days: i64) -> bool {
        let Some(cutoff) = Duration::try_days(window_days).and_then(|window| now.checked_sub_signed(window))
        else {
            return false;
        };
        published.is_some_and(|date| date > cutoff)
    }

    pub fn is_premium(trending: Option<bool>, property_type: PropertyType, price: f64, threshold: f64) -> bool {
        trending.unwrap_or(false) || (property_type == PropertyType::Sale && price >= threshold)
    }
}
