pub mod app;
pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod logging;
pub mod observability;
pub mod pipeline;
pub mod views;

pub use app::normalize_use_case::{BatchItemFailure, BatchReport, NormalizeUseCase};
pub use config::PipelineConfig;
pub use domain::{CanonicalProperty, FocalPoint, ListingFlags, PropertyStatus, PropertyType, ResolvedImage};
pub use error::{PipelineError, Result};
pub use pipeline::processing::images::ImageResolver;
pub use pipeline::processing::normalize::{Normalizer, PropertyNormalizer};
pub use pipeline::processing::parser::{ImageReference, RawRecord};
pub use views::{Consumer, ViewDto, ViewProjector};
