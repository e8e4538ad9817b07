//! Image reference resolution.
//!
//! Turns whatever the CMS stored for an image into an absolute CDN URL, or into `None`.
//! Nothing here touches the network; URLs are built from the reference alone.
//!
//! Source priority, first match wins:
//! 1. a pre-resolved absolute URL on the reference itself
//! 2. the nested asset's resolved URL
//! 3. a URL constructed from the opaque asset token
//!
//! Constructed URLs follow the CDN layout
//! `https://<host>/images/<project>/<dataset>/<hash>-<w>x<h>.<ext>` and only carry query
//! parameters that differ from the CDN's own defaults.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::config::{CdnConfig, ImageConfig, PipelineConfig};
use crate::domain::{is_absolute_url, FocalPoint, ResolvedImage};
use crate::observability::metrics;
use crate::pipeline::processing::parser::{ImageObject, ImageReference};

/// `image-<hash>-<width>x<height>-<ext>`
static ASSET_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^image-([A-Za-z0-9]+)-(\d+)x(\d+)-([A-Za-z0-9]+)$").expect("valid asset token pattern")
});

/// Dimensions embedded in a CDN file name: `.../<hash>-<w>x<h>.<ext>`
static CDN_FILE_DIMENSIONS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"-(\d+)x(\d+)\.[A-Za-z0-9]+$").expect("valid CDN file name pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpg,
    Pjpg,
    Png,
    Webp,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Jpg => "jpg",
            ImageFormat::Pjpg => "pjpg",
            ImageFormat::Png => "png",
            ImageFormat::Webp => "webp",
        }
    }
}

/// Resize behavior understood by the CDN. `Clip` is what it does when `fit` is omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitMode {
    #[default]
    Clip,
    Crop,
    Fill,
    FillMax,
    Max,
    Scale,
    Min,
}

impl FitMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FitMode::Clip => "clip",
            FitMode::Crop => "crop",
            FitMode::Fill => "fill",
            FitMode::FillMax => "fillmax",
            FitMode::Max => "max",
            FitMode::Scale => "scale",
            FitMode::Min => "min",
        }
    }
}

/// Transformation parameters requested by a caller. `None` means "CDN default".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageParams {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub quality: Option<u8>,
    pub format: Option<ImageFormat>,
    pub fit: Option<FitMode>,
}

impl ImageParams {
    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn format(mut self, format: ImageFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn fit(mut self, fit: FitMode) -> Self {
        self.fit = Some(fit);
        self
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions<'a> {
    /// Alt text used when the reference carries neither `alt` nor a caption
    pub alt_fallback: Option<&'a str>,
    pub params: ImageParams,
}

impl<'a> ResolveOptions<'a> {
    pub fn with_alt(alt: &'a str) -> Self {
        Self {
            alt_fallback: Some(alt),
            params: ImageParams::default(),
        }
    }

    pub fn params(mut self, params: ImageParams) -> Self {
        self.params = params;
        self
    }
}

/// Parsed form of an opaque asset token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetToken<'a> {
    pub hash: &'a str,
    pub width: u32,
    pub height: u32,
    pub extension: &'a str,
}

impl<'a> AssetToken<'a> {
    pub fn parse(token: &'a str) -> Option<Self> {
        let caps = ASSET_TOKEN.captures(token)?;
        Some(Self {
            hash: caps.get(1)?.as_str(),
            width: caps.get(2)?.as_str().parse().ok()?,
            height: caps.get(3)?.as_str().parse().ok()?,
            extension: caps.get(4)?.as_str(),
        })
    }

    /// File name on the CDN: the token without its prefix, extension turned into a suffix.
    pub fn file_name(&self) -> String {
        format!("{}-{}x{}.{}", self.hash, self.width, self.height, self.extension)
    }
}

impl fmt::Display for AssetToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "image-{}-{}x{}-{}",
            self.hash, self.width, self.height, self.extension
        )
    }
}

/// Which step of the priority chain produced an image.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ImageSource<'a> {
    Direct(&'a str),
    AssetUrl(&'a str),
    Token(AssetToken<'a>),
}

impl ImageSource<'_> {
    fn label(&self) -> &'static str {
        match self {
            ImageSource::Direct(_) => "direct_url",
            ImageSource::AssetUrl(_) => "asset_url",
            ImageSource::Token(_) => "asset_token",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImageResolver {
    /// `https://<host>/images/`, used to recognize URLs we may parameterize
    cdn_prefix: String,
    /// `https://<host>/images/<project>/<dataset>/`
    asset_base: String,
    default_quality: u8,
    responsive_widths: Vec<u32>,
}

impl Default for ImageResolver {
    fn default() -> Self {
        Self::new(&CdnConfig::default(), &ImageConfig::default())
    }
}

impl ImageResolver {
    pub fn new(cdn: &CdnConfig, images: &ImageConfig) -> Self {
        let host = cdn.host.trim().trim_end_matches('/');
        let cdn_prefix = format!("https://{}/images/", host);
        let asset_base = format!(
            "{}{}/{}/",
            cdn_prefix,
            cdn.project_id.trim(),
            cdn.dataset.trim()
        );
        Self {
            cdn_prefix,
            asset_base,
            default_quality: images.default_quality,
            responsive_widths: images.responsive_widths.clone(),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(&config.cdn, &config.images)
    }

    /// Resolve a reference into an image. `None` is the normal "no image" outcome.
    pub fn resolve(
        &self,
        reference: Option<&ImageReference>,
        options: &ResolveOptions<'_>,
    ) -> Option<ResolvedImage> {
        let resolved = reference.and_then(|r| self.build(r, options));
        if resolved.is_none() {
            metrics::images::unresolved();
        }
        resolved
    }

    /// Whether [`resolve`](Self::resolve) would produce an image for this reference.
    pub fn is_valid(&self, reference: Option<&ImageReference>) -> bool {
        reference.and_then(|r| self.select_source(r)).is_some()
    }

    /// CDN URL for an asset token, or `None` if the token does not follow the asset pattern.
    pub fn asset_url(&self, token: &str, params: &ImageParams) -> Option<String> {
        let token = AssetToken::parse(token)?;
        Some(self.with_query(format!("{}{}", self.asset_base, token.file_name()), params))
    }

    /// Width-keyed variants for a `srcset`. Only CDN-hosted images can be resized, so
    /// anything else yields an empty list and renderers keep the plain URL.
    pub fn srcset(&self, reference: Option<&ImageReference>, params: &ImageParams) -> Vec<(u32, String)> {
        let Some(source) = reference.and_then(|r| self.select_source(r)) else {
            return Vec::new();
        };
        let base = match source {
            ImageSource::Direct(url) | ImageSource::AssetUrl(url) if self.is_parameterizable(url) => {
                url.to_string()
            }
            ImageSource::Token(token) => format!("{}{}", self.asset_base, token.file_name()),
            _ => return Vec::new(),
        };

        self.responsive_widths
            .iter()
            .map(|&width| {
                let variant = ImageParams {
                    width: Some(width),
                    ..*params
                };
                (width, self.with_query(base.clone(), &variant))
            })
            .collect()
    }

    fn build(&self, reference: &ImageReference, options: &ResolveOptions<'_>) -> Option<ResolvedImage> {
        let source = self.select_source(reference)?;
        let object = match reference {
            ImageReference::Object(obj) => Some(obj),
            _ => None,
        };
        let alt = alt_text(object, options.alt_fallback);

        let image = match source {
            ImageSource::Direct(raw) | ImageSource::AssetUrl(raw) => {
                let url = if self.is_parameterizable(raw) {
                    self.with_query(raw.to_string(), &options.params)
                } else {
                    raw.to_string()
                };
                let image = ResolvedImage::new(url, alt)?;
                match dimensions_from_cdn_url(raw).filter(|_| raw.starts_with(&self.cdn_prefix)) {
                    Some((w, h)) => image.with_dimensions(w, h),
                    None => image,
                }
            }
            ImageSource::Token(token) => {
                let url = self.with_query(
                    format!("{}{}", self.asset_base, token.file_name()),
                    &options.params,
                );
                ResolvedImage::new(url, alt)?.with_dimensions(token.width, token.height)
            }
        };

        metrics::images::resolved(source.label());
        Some(image.with_focal_point(object.and_then(focal_point)))
    }

    fn select_source<'a>(&self, reference: &'a ImageReference) -> Option<ImageSource<'a>> {
        match reference {
            ImageReference::Url(value) => {
                if is_absolute_url(value) {
                    Some(ImageSource::Direct(value))
                } else {
                    AssetToken::parse(value).map(ImageSource::Token)
                }
            }
            ImageReference::Object(obj) => {
                let asset = obj.asset.as_ref();
                obj.url
                    .as_deref()
                    .filter(|u| is_absolute_url(u))
                    .map(ImageSource::Direct)
                    .or_else(|| {
                        asset
                            .and_then(|a| a.url.as_deref())
                            .filter(|u| is_absolute_url(u))
                            .map(ImageSource::AssetUrl)
                    })
                    .or_else(|| {
                        asset
                            .and_then(|a| a.token.as_deref())
                            .and_then(AssetToken::parse)
                            .map(ImageSource::Token)
                    })
            }
            ImageReference::Unrecognized => None,
        }
    }

    fn is_parameterizable(&self, url: &str) -> bool {
        url.starts_with(&self.cdn_prefix) && !url.contains('?')
    }

    fn with_query(&self, mut url: String, params: &ImageParams) -> String {
        if let Some(query) = self.query_string(params) {
            url.push('?');
            url.push_str(&query);
        }
        url
    }

    /// `w`, `h`, `q`, `fm`, `fit` in that order, skipping anything equal to the CDN default.
    fn query_string(&self, params: &ImageParams) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(width) = params.width.filter(|w| *w > 0) {
            parts.push(format!("w={}", width));
        }
        if let Some(height) = params.height.filter(|h| *h > 0) {
            parts.push(format!("h={}", height));
        }
        if let Some(quality) = params.quality.filter(|q| *q != self.default_quality) {
            parts.push(format!("q={}", quality));
        }
        if let Some(format) = params.format {
            parts.push(format!("fm={}", format.as_str()));
        }
        if let Some(fit) = params.fit.filter(|f| *f != FitMode::default()) {
            parts.push(format!("fit={}", fit.as_str()));
        }

        (!parts.is_empty()).then(|| parts.join("&"))
    }
}

fn alt_text(object: Option<&ImageObject>, fallback: Option<&str>) -> String {
    object
        .and_then(|o| o.alt.as_deref().or(o.caption.as_deref()))
        .or(fallback)
        .unwrap_or_default()
        .to_string()
}

fn focal_point(object: &ImageObject) -> Option<FocalPoint> {
    let hotspot = object.hotspot?;
    if !hotspot.x.is_finite() || !hotspot.y.is_finite() {
        return None;
    }
    Some(FocalPoint {
        x: hotspot.x.clamp(0.0, 1.0),
        y: hotspot.y.clamp(0.0, 1.0),
    })
}

fn dimensions_from_cdn_url(url: &str) -> Option<(u32, u32)> {
    let caps = CDN_FILE_DIMENSIONS.captures(url)?;
    Some((caps.get(1)?.as_str().parse().ok()?, caps.get(2)?.as_str().parse().ok()?))
}
