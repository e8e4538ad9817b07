// Property pipeline: raw CMS records in, canonical properties out

pub mod processing;

// Re-export key types and functions from each stage
pub use processing::images::{ImageParams, ImageResolver, ResolveOptions};
pub use processing::normalize::{Normalizer, PropertyNormalizer};
pub use processing::parser::{self, RawRecord};
