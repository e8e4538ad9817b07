//! Renderer-facing projections of [`CanonicalProperty`].
//!
//! Every renderer gets its DTO from the same [`ViewProjector`], driven by a static
//! [`ViewSpec`] table that lists target keys, the canonical field each one reads and what
//! to emit when that field is absent. Projections only reshape; flags such as `isNew` are
//! copied, never recomputed.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::config::{PipelineConfig, ViewConfig};
use crate::domain::{CanonicalProperty, PropertyType, ResolvedImage};

pub mod consumers;

pub use consumers::{
    to_carousel_item_props, to_legacy_listing_card_props, to_mobile_card_props, to_property_card_props,
    to_property_hero_props, Consumer,
};

/// A canonical field a view can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    Title,
    Slug,
    Location,
    City,
    Neighborhood,
    State,
    Address,
    Price,
    PropertyType,
    /// Purpose label in the CMS's own wording ("Venda" / "Aluguel")
    PurposeLabel,
    Area,
    TotalArea,
    Bedrooms,
    Bathrooms,
    ParkingSpots,
    /// Main image as an `{url, alt, ...}` object
    MainImage,
    MainImageUrl,
    Gallery,
    IsHighlight,
    IsPremium,
    IsNew,
    Status,
    Description,
    Features,
    PublishedDate,
    Code,
}

/// What to emit when the source field is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Leave the key out of the DTO
    Omit,
    Zero,
    False,
    EmptyText,
    Text(&'static str),
    EmptyList,
    /// The configured placeholder image path as a string
    PlaceholderUrl,
    /// `{ "url": <placeholder>, "alt": <title> }`
    PlaceholderImage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub target: &'static str,
    pub source: Field,
    pub fallback: Fallback,
}

impl FieldRule {
    pub const fn new(target: &'static str, source: Field, fallback: Fallback) -> Self {
        Self {
            target,
            source,
            fallback,
        }
    }

    /// Copy the field as-is; absent values leave the key out.
    pub const fn direct(target: &'static str, source: Field) -> Self {
        Self::new(target, source, Fallback::Omit)
    }
}

/// Field table for one renderer.
#[derive(Debug, Clone, Copy)]
pub struct ViewSpec {
    pub name: &'static str,
    pub fields: &'static [FieldRule],
}

/// A projected, serializable DTO.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ViewDto(Map<String, Value>);

impl ViewDto {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Applies [`ViewSpec`] tables to canonical properties.
#[derive(Debug, Clone)]
pub struct ViewProjector {
    placeholder_image: String,
}

impl Default for ViewProjector {
    fn default() -> Self {
        Self::new(&ViewConfig::default())
    }
}

impl ViewProjector {
    pub fn new(config: &ViewConfig) -> Self {
        Self {
            placeholder_image: config.placeholder_image.clone(),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(&config.views)
    }

    pub fn placeholder_image(&self) -> &str {
        &self.placeholder_image
    }

    pub fn project(&self, spec: &ViewSpec, property: &CanonicalProperty) -> ViewDto {
        let mut out = Map::new();
        for rule in spec.fields {
            let value = source_value(rule.source, property).or_else(|| self.fallback(rule.fallback, property));
            if let Some(value) = value {
                out.insert(rule.target.to_string(), value);
            }
        }
        ViewDto(out)
    }

    pub fn project_all(&self, spec: &ViewSpec, properties: &[CanonicalProperty]) -> Vec<ViewDto> {
        properties.iter().map(|p| self.project(spec, p)).collect()
    }

    fn fallback(&self, fallback: Fallback, property: &CanonicalProperty) -> Option<Value> {
        match fallback {
            Fallback::Omit => None,
            Fallback::Zero => Some(json!(0)),
            Fallback::False => Some(Value::Bool(false)),
            Fallback::EmptyText => Some(Value::String(String::new())),
            Fallback::Text(text) => Some(Value::String(text.to_string())),
            Fallback::EmptyList => Some(Value::Array(Vec::new())),
            Fallback::PlaceholderUrl => Some(Value::String(self.placeholder_image.clone())),
            Fallback::PlaceholderImage => Some(json!({
                "url": self.placeholder_image,
                "alt": property.title,
            })),
        }
    }
}

/// Read one canonical field. `None` means absent, which the rule's fallback then covers.
fn source_value(field: Field, p: &CanonicalProperty) -> Option<Value> {
    match field {
        Field::Id => Some(p.id.clone().into()),
        Field::Title => Some(p.title.clone().into()),
        Field::Slug => Some(p.slug.clone().into()),
        Field::Location => Some(p.location.clone().into()),
        Field::City => p.city.clone().map(Value::from),
        Field::Neighborhood => p.neighborhood.clone().map(Value::from),
        Field::State => p.state.clone().map(Value::from),
        Field::Address => p.address.clone().map(Value::from),
        Field::Price => Some(number(p.price)),
        Field::PropertyType => Some(p.property_type.as_str().into()),
        Field::PurposeLabel => Some(
            match p.property_type {
                PropertyType::Sale => "Venda",
                PropertyType::Rent => "Aluguel",
            }
            .into(),
        ),
        Field::Area => p.area.map(number),
        Field::TotalArea => p.total_area.map(number),
        Field::Bedrooms => p.bedrooms.map(Value::from),
        Field::Bathrooms => p.bathrooms.map(Value::from),
        Field::ParkingSpots => p.parking_spots.map(Value::from),
        Field::MainImage => p.main_image.as_ref().map(image_value),
        Field::MainImageUrl => p.main_image.as_ref().map(|image| image.url().into()),
        // An empty gallery counts as absent so EmptyList and Omit both behave
        Field::Gallery => (!p.gallery.is_empty()).then(|| p.gallery.iter().map(image_value).collect()),
        Field::IsHighlight => Some(p.is_highlight().into()),
        Field::IsPremium => Some(p.is_premium().into()),
        Field::IsNew => Some(p.is_new().into()),
        Field::Status => Some(p.status.as_str().into()),
        Field::Description => p.description.clone().map(Value::from),
        Field::Features => (!p.features.is_empty()).then(|| p.features.clone().into()),
        Field::PublishedDate => p.published_date.map(|d| d.to_rfc3339().into()),
        Field::Code => p.code.clone().map(Value::from),
    }
}

/// Whole numbers render as integers so `450000.0` stays `450000` in JSON.
fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}

fn image_value(image: &ResolvedImage) -> Value {
    let mut obj = Map::new();
    obj.insert("url".to_string(), image.url().into());
    obj.insert("alt".to_string(), image.alt.clone().into());
    if let (Some(width), Some(height)) = (image.width, image.height) {
        obj.insert("width".to_string(), width.into());
        obj.insert("height".to_string(), height.into());
    }
    Value::Object(obj)
}
