//! Defaults shared by the configuration layer and the pipeline stages.
//! Every value here can be overridden through `PipelineConfig`.

// Media CDN of the content service
pub const DEFAULT_CDN_HOST: &str = "cdn.sanity.io";
pub const DEFAULT_PROJECT_ID: &str = "0nks58lj";
pub const DEFAULT_DATASET: &str = "production";

/// Quality the CDN applies when no `q` parameter is sent.
pub const DEFAULT_IMAGE_QUALITY: u8 = 75;

/// Widths used for responsive `srcset` variants.
pub const DEFAULT_RESPONSIVE_WIDTHS: [u32; 7] = [640, 750, 828, 1080, 1200, 1920, 2048];

// Normalization fallbacks
pub const DEFAULT_LOCATION_PLACEHOLDER: &str = "Localização não informada";
pub const DEFAULT_TITLE: &str = "Imóvel";
pub const DEFAULT_NEW_LISTING_WINDOW_DAYS: i64 = 30;
/// Upper bound accepted for the new-listing window (one hundred years).
pub const MAX_NEW_LISTING_WINDOW_DAYS: i64 = 36_500;
pub const DEFAULT_PREMIUM_PRICE_THRESHOLD: f64 = 1_000_000.0;

/// Purpose values that mean the listing is for sale (compared case-insensitively).
pub const SALE_PURPOSE_SYNONYMS: [&str; 2] = ["venda", "sale"];

// Views
pub const DEFAULT_PLACEHOLDER_IMAGE: &str = "/images/property-placeholder.jpg";

/// Environment variable pointing at the TOML configuration file.
pub const CONFIG_PATH_ENV: &str = "PROPERTY_PIPELINE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "pipeline.toml";
