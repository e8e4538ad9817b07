use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::config::{NormalizeConfig, PipelineConfig};
use crate::domain::{CanonicalProperty, ListingFlags, ResolvedImage};
use crate::error::{PipelineError, Result};
use crate::observability::metrics;
use crate::pipeline::processing::images::{ImageResolver, ResolveOptions};
use crate::pipeline::processing::parser::RawRecord;

pub mod diagnostics;
pub mod rules;

pub use diagnostics::{DiagnosticsCollector, DiagnosticsSink, NoopDiagnostics, NormalizationTrace};
pub use rules::FieldRules;

/// Trait for turning one raw record into one canonical property
pub trait Normalizer {
    /// Fails only with [`PipelineError::MissingIdentity`]; every other field degrades.
    fn normalize(&self, raw: &RawRecord) -> Result<CanonicalProperty>;
}

/// Default normalizer for CMS property documents
#[derive(Debug, Clone, Default)]
pub struct PropertyNormalizer {
    resolver: ImageResolver,
    settings: NormalizeConfig,
}

impl PropertyNormalizer {
    pub fn new(resolver: ImageResolver, settings: NormalizeConfig) -> Self {
        Self { resolver, settings }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(ImageResolver::from_config(config), config.normalize.clone())
    }

    pub fn resolver(&self) -> &ImageResolver {
        &self.resolver
    }

    /// Parse and normalize an untyped JSON value in one step.
    pub fn normalize_value(&self, value: &Value) -> Result<CanonicalProperty> {
        let raw = RawRecord::from_value(value)?;
        self.normalize(&raw)
    }

    /// Normalize against an explicit clock, reporting to `diagnostics`.
    pub fn normalize_at(
        &self,
        raw: &RawRecord,
        now: DateTime<Utc>,
        diagnostics: &mut dyn DiagnosticsSink,
    ) -> Result<CanonicalProperty> {
        let id = raw
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(PipelineError::MissingIdentity)?
            .to_string();

        let title = raw
            .title
            .clone()
            .unwrap_or_else(|| self.settings.default_title.clone());
        let slug = FieldRules::slug(raw.slug.as_deref(), &id);
        let location = FieldRules::location(
            raw.neighborhood.as_deref(),
            raw.city.as_deref(),
            &self.settings.location_placeholder,
        );

        let property_type = FieldRules::property_type(raw.purpose.as_deref());
        let price = FieldRules::price(raw.price);

        let options = ResolveOptions::with_alt(&title);
        let main_image = [raw.image.as_ref(), raw.image_url.as_ref()]
            .into_iter()
            .flatten()
            .find_map(|reference| self.resolver.resolve(Some(reference), &options));

        // Each entry stands alone; a broken one is dropped without touching its neighbors
        let gallery: Vec<ResolvedImage> = raw
            .gallery
            .iter()
            .filter_map(|entry| self.resolver.resolve(Some(entry), &options))
            .collect();
        let gallery_dropped = raw.gallery.len() - gallery.len();
        metrics::normalize::gallery_dropped(gallery_dropped);

        let published_date = FieldRules::published_date(raw.published.as_deref());
        let flags = ListingFlags::derived(
            raw.highlight.unwrap_or(false),
            FieldRules::is_premium(
                raw.trending,
                property_type,
                price,
                self.settings.premium_price_threshold,
            ),
            FieldRules::is_new(published_date, now, self.settings.new_listing_window_days),
        );

        let property = CanonicalProperty {
            id,
            title,
            slug,
            location,
            city: raw.city.clone(),
            neighborhood: raw.neighborhood.clone(),
            price,
            property_type,
            area: FieldRules::measure(raw.area),
            total_area: FieldRules::measure(raw.total_area),
            bedrooms: FieldRules::count(raw.bedrooms),
            bathrooms: FieldRules::count(raw.bathrooms),
            parking_spots: FieldRules::count(raw.parking_spots),
            main_image,
            gallery,
            flags,
            status: FieldRules::status(raw.status.as_deref()),
            description: raw.description.clone(),
            features: raw.features.clone(),
            published_date,
            address: raw.address.clone(),
            state: raw.state.clone(),
            category: raw.category.clone(),
            code: raw.code.clone(),
            accepts_financing: raw.accepts_financing,
            video_tour_url: raw.video_tour_url.clone(),
            condo_fee: FieldRules::measure(raw.condo_fee),
            property_tax: FieldRules::measure(raw.property_tax),
        };

        if diagnostics.enabled() {
            diagnostics.record(NormalizationTrace {
                id: property.id.clone(),
                title: property.title.clone(),
                has_description: property.description.is_some(),
                main_image_resolved: property.main_image.is_some(),
                gallery_resolved: property.gallery.len(),
                gallery_dropped,
                location_placeholder: property.location == self.settings.location_placeholder,
            });
        }

        tracing::trace!(
            id = %property.id,
            property_type = %property.property_type,
            gallery = property.gallery.len(),
            gallery_dropped,
            "Normalized property"
        );
        metrics::normalize::record_normalized();

        Ok(property)
    }
}

impl Normalizer for PropertyNormalizer {
    fn normalize(&self, raw: &RawRecord) -> Result<CanonicalProperty> {
        self.normalize_at(raw, Utc::now(), &mut NoopDiagnostics)
    }
}
