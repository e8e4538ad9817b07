use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::constants::*;
use crate::error::{PipelineError, Result};

/// Top-level pipeline configuration. Every section is optional in the TOML file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub cdn: CdnConfig,
    pub images: ImageConfig,
    pub normalize: NormalizeConfig,
    pub views: ViewConfig,
    pub diagnostics: DiagnosticsConfig,
}

/// Where the content service stores binary assets.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CdnConfig {
    pub host: String,
    pub project_id: String,
    pub dataset: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImageConfig {
    /// Quality the CDN uses when the `q` parameter is omitted
    pub default_quality: u8,
    pub responsive_widths: Vec<u32>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct NormalizeConfig {
    pub location_placeholder: String,
    pub default_title: String,
    pub new_listing_window_days: i64,
    pub premium_price_threshold: f64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewConfig {
    pub placeholder_image: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Collect per-record traces during batch runs (development aid)
    pub enabled: bool,
}

impl Default for CdnConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_CDN_HOST.to_string(),
            project_id: DEFAULT_PROJECT_ID.to_string(),
            dataset: DEFAULT_DATASET.to_string(),
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            default_quality: DEFAULT_IMAGE_QUALITY,
            responsive_widths: DEFAULT_RESPONSIVE_WIDTHS.to_vec(),
        }
    }
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            location_placeholder: DEFAULT_LOCATION_PLACEHOLDER.to_string(),
            default_title: DEFAULT_TITLE.to_string(),
            new_listing_window_days: DEFAULT_NEW_LISTING_WINDOW_DAYS,
            premium_price_threshold: DEFAULT_PREMIUM_PRICE_THRESHOLD,
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            placeholder_image: DEFAULT_PLACEHOLDER_IMAGE.to_string(),
        }
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enabled: cfg!(debug_assertions),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from `$PROPERTY_PIPELINE_CONFIG` or `pipeline.toml`.
    /// A missing default file is not an error; built-in defaults are used instead.
    pub fn load() -> Result<Self> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_path(&path),
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::from_path(DEFAULT_CONFIG_PATH),
            Err(_) => {
                tracing::debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cdn.host.trim().is_empty()
            || self.cdn.project_id.trim().is_empty()
            || self.cdn.dataset.trim().is_empty()
        {
            return Err(PipelineError::Config(
                "cdn.host, cdn.project_id and cdn.dataset must not be empty".to_string(),
            ));
        }
        if !(1..=100).contains(&self.images.default_quality) {
            return Err(PipelineError::Config(format!(
                "images.default_quality must be within 1..=100, got {}",
                self.images.default_quality
            )));
        }
        if self.normalize.location_placeholder.trim().is_empty() {
            return Err(PipelineError::Config(
                "normalize.location_placeholder must not be empty".to_string(),
            ));
        }
        if self.normalize.default_title.trim().is_empty() {
            return Err(PipelineError::Config(
                "normalize.default_title must not be empty".to_string(),
            ));
        }
        if !(1..=MAX_NEW_LISTING_WINDOW_DAYS).contains(&self.normalize.new_listing_window_days) {
            return Err(PipelineError::Config(format!(
                "normalize.new_listing_window_days must be within 1..={}, got {}",
                MAX_NEW_LISTING_WINDOW_DAYS, self.normalize.new_listing_window_days
            )));
        }
        if self.views.placeholder_image.trim().is_empty() {
            return Err(PipelineError::Config(
                "views.placeholder_image must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
