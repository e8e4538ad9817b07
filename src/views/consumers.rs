use std::fmt;
use std::str::FromStr;

use super::{Fallback, Field, FieldRule, ViewDto, ViewProjector, ViewSpec};
use crate::domain::CanonicalProperty;
use crate::error::PipelineError;

/// Grid card on listing and home pages.
pub const PROPERTY_CARD: ViewSpec = ViewSpec {
    name: "property_card",
    fields: &[
        FieldRule::direct("id", Field::Id),
        FieldRule::direct("title", Field::Title),
        FieldRule::direct("slug", Field::Slug),
        FieldRule::direct("location", Field::Location),
        FieldRule::direct("city", Field::City),
        FieldRule::direct("price", Field::Price),
        FieldRule::direct("propertyType", Field::PropertyType),
        FieldRule::direct("area", Field::Area),
        FieldRule::direct("bedrooms", Field::Bedrooms),
        FieldRule::direct("bathrooms", Field::Bathrooms),
        FieldRule::direct("parkingSpots", Field::ParkingSpots),
        FieldRule::new("mainImage", Field::MainImage, Fallback::PlaceholderImage),
        FieldRule::direct("isHighlight", Field::IsHighlight),
        FieldRule::direct("isPremium", Field::IsPremium),
        FieldRule::direct("isNew", Field::IsNew),
        FieldRule::direct("status", Field::Status),
    ],
};

/// Compact card used by the mobile listing.
pub const MOBILE_CARD: ViewSpec = ViewSpec {
    name: "mobile_card",
    fields: &[
        FieldRule::direct("id", Field::Id),
        FieldRule::direct("title", Field::Title),
        FieldRule::direct("price", Field::Price),
        FieldRule::direct("address", Field::Address),
        FieldRule::direct("location", Field::Location),
        FieldRule::new("images", Field::Gallery, Fallback::EmptyList),
        FieldRule::new("mainImage", Field::MainImage, Fallback::PlaceholderImage),
        FieldRule::new("bedrooms", Field::Bedrooms, Fallback::Zero),
        FieldRule::new("bathrooms", Field::Bathrooms, Fallback::Zero),
        FieldRule::new("area", Field::Area, Fallback::Zero),
        FieldRule::new("parkingSpots", Field::ParkingSpots, Fallback::Zero),
        FieldRule::direct("type", Field::PropertyType),
        FieldRule::direct("featured", Field::IsHighlight),
        FieldRule::direct("isNew", Field::IsNew),
        FieldRule::direct("isPremium", Field::IsPremium),
    ],
};

/// Slide in the home page carousels.
pub const CAROUSEL_ITEM: ViewSpec = ViewSpec {
    name: "carousel_item",
    fields: &[
        FieldRule::direct("id", Field::Id),
        FieldRule::direct("title", Field::Title),
        FieldRule::direct("slug", Field::Slug),
        FieldRule::direct("location", Field::Location),
        FieldRule::direct("price", Field::Price),
        FieldRule::direct("propertyType", Field::PropertyType),
        FieldRule::new("imageUrl", Field::MainImageUrl, Fallback::PlaceholderUrl),
        FieldRule::direct("isHighlight", Field::IsHighlight),
        FieldRule::direct("isNew", Field::IsNew),
    ],
};

/// Header block of the property detail page.
pub const PROPERTY_HERO: ViewSpec = ViewSpec {
    name: "property_hero",
    fields: &[
        FieldRule::direct("title", Field::Title),
        FieldRule::direct("location", Field::Location),
        FieldRule::direct("city", Field::City),
        FieldRule::direct("state", Field::State),
        FieldRule::direct("price", Field::Price),
        FieldRule::direct("propertyType", Field::PropertyType),
        FieldRule::new("mainImage", Field::MainImage, Fallback::PlaceholderImage),
        FieldRule::new("images", Field::Gallery, Fallback::EmptyList),
        FieldRule::direct("referenceCode", Field::Code),
        FieldRule::direct("status", Field::Status),
        FieldRule::new("description", Field::Description, Fallback::EmptyText),
        FieldRule::direct("totalArea", Field::TotalArea),
    ],
};

/// Older listing card that still reads the CMS's Portuguese keys.
pub const LEGACY_LISTING_CARD: ViewSpec = ViewSpec {
    name: "legacy_listing_card",
    fields: &[
        FieldRule::direct("_id", Field::Id),
        FieldRule::direct("titulo", Field::Title),
        FieldRule::direct("slug", Field::Slug),
        FieldRule::direct("bairro", Field::Neighborhood),
        FieldRule::direct("cidade", Field::City),
        FieldRule::direct("preco", Field::Price),
        FieldRule::new("areaUtil", Field::Area, Fallback::Zero),
        FieldRule::new("dormitorios", Field::Bedrooms, Fallback::Zero),
        FieldRule::new("banheiros", Field::Bathrooms, Fallback::Zero),
        FieldRule::new("vagas", Field::ParkingSpots, Fallback::Zero),
        FieldRule::new("imagem", Field::MainImageUrl, Fallback::PlaceholderUrl),
        FieldRule::direct("finalidade", Field::PurposeLabel),
        FieldRule::direct("destaque", Field::IsHighlight),
        FieldRule::new("caracteristicas", Field::Features, Fallback::EmptyList),
        FieldRule::direct("dataPublicacao", Field::PublishedDate),
    ],
};

/// Every renderer that consumes canonical properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consumer {
    PropertyCard,
    MobileCard,
    CarouselItem,
    PropertyHero,
    LegacyListingCard,
}

impl Consumer {
    pub const ALL: [Consumer; 5] = [
        Consumer::PropertyCard,
        Consumer::MobileCard,
        Consumer::CarouselItem,
        Consumer::PropertyHero,
        Consumer::LegacyListingCard,
    ];

    pub fn spec(&self) -> &'static ViewSpec {
        match self {
            Consumer::PropertyCard => &PROPERTY_CARD,
            Consumer::MobileCard => &MOBILE_CARD,
            Consumer::CarouselItem => &CAROUSEL_ITEM,
            Consumer::PropertyHero => &PROPERTY_HERO,
            Consumer::LegacyListingCard => &LEGACY_LISTING_CARD,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.spec().name
    }
}

impl fmt::Display for Consumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Consumer {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_").to_lowercase();
        Consumer::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| PipelineError::UnknownView(s.to_string()))
    }
}

pub fn to_property_card_props(projector: &ViewProjector, property: &CanonicalProperty) -> ViewDto {
    projector.project(&PROPERTY_CARD, property)
}

pub fn to_mobile_card_props(projector: &ViewProjector, property: &CanonicalProperty) -> ViewDto {
    projector.project(&MOBILE_CARD, property)
}

pub fn to_carousel_item_props(projector: &ViewProjector, property: &CanonicalProperty) -> ViewDto {
    projector.project(&CAROUSEL_ITEM, property)
}

pub fn to_property_hero_props(projector: &ViewProjector, property: &CanonicalProperty) -> ViewDto {
    projector.project(&PROPERTY_HERO, property)
}

pub fn to_legacy_listing_card_props(projector: &ViewProjector, property: &CanonicalProperty) -> ViewDto {
    projector.project(&LEGACY_LISTING_CARD, property)
}
