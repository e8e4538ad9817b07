//! Parsing boundary between the content service's loosely-typed JSON and the pipeline.
//!
//! The CMS has carried several field-naming conventions over time (English keys, Portuguese
//! keys, `_id` vs `id`, ...). All alias probing happens here, once; the normalizer only ever
//! sees a [`RawRecord`] with typed, optional fields.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{PipelineError, Result};
use crate::observability::metrics;

/// Key aliases, in precedence order. The first key holding a usable value wins.
mod keys {
    pub const ID: &[&str] = &["_id", "id"];
    pub const TITLE: &[&str] = &["title", "titulo"];
    pub const SLUG: &[&str] = &["slug"];
    pub const NEIGHBORHOOD: &[&str] = &["neighborhood", "bairro"];
    pub const CITY: &[&str] = &["city", "cidade"];
    pub const PRICE: &[&str] = &["price", "preco"];
    pub const PURPOSE: &[&str] = &["purpose", "finalidade"];
    pub const BEDROOMS: &[&str] = &["bedrooms", "dormitorios", "quartos"];
    pub const BATHROOMS: &[&str] = &["bathrooms", "banheiros"];
    pub const PARKING: &[&str] = &["parkingSpots", "vagas"];
    pub const AREA: &[&str] = &["area", "areaUtil"];
    pub const TOTAL_AREA: &[&str] = &["totalArea", "areaTotal"];
    pub const IMAGE: &[&str] = &["image", "mainImage", "imagem"];
    pub const IMAGE_URL: &[&str] = &["imageUrl", "imagemUrl"];
    pub const GALLERY: &[&str] = &["gallery", "galeria", "images"];
    pub const HIGHLIGHT: &[&str] = &["featured", "destaque"];
    pub const TRENDING: &[&str] = &["trending", "emAlta"];
    pub const STATUS: &[&str] = &["status"];
    pub const DESCRIPTION: &[&str] = &["description", "descricao"];
    pub const FEATURES: &[&str] = &["features", "caracteristicas"];
    pub const PUBLISHED: &[&str] = &["publishedAt", "publishedDate", "dataPublicacao", "_createdAt"];
    pub const ADDRESS: &[&str] = &["address", "endereco"];
    pub const STATE: &[&str] = &["state", "estado"];
    pub const CATEGORY: &[&str] = &["category", "tipoImovel"];
    pub const CODE: &[&str] = &["code", "codigoInterno", "codigo"];
    pub const FINANCING: &[&str] = &["acceptsFinancing", "aceitaFinanciamento"];
    pub const VIDEO_TOUR: &[&str] = &["videoTour", "videoTourUrl"];
    pub const CONDO_FEE: &[&str] = &["condoFee", "valorCondominio"];
    pub const PROPERTY_TAX: &[&str] = &["propertyTax", "iptu"];

    // Inside image objects
    pub const IMAGE_DIRECT_URL: &[&str] = &["url", "imagemUrl", "imageUrl"];
    pub const IMAGE_ALT: &[&str] = &["alt"];
    pub const IMAGE_CAPTION: &[&str] = &["caption", "titulo", "title"];
    pub const ASSET_URL: &[&str] = &["url"];
    pub const ASSET_TOKEN: &[&str] = &["_ref", "_id"];
}

/// A content-service record after alias resolution. Every field is optional; nothing here
/// has been validated against business rules yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub id: Option<String>,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub price: Option<f64>,
    pub purpose: Option<String>,
    pub bedrooms: Option<f64>,
    pub bathrooms: Option<f64>,
    pub parking_spots: Option<f64>,
    pub area: Option<f64>,
    pub total_area: Option<f64>,
    pub image: Option<ImageReference>,
    pub image_url: Option<ImageReference>,
    pub gallery: Vec<ImageReference>,
    pub highlight: Option<bool>,
    pub trending: Option<bool>,
    pub status: Option<String>,
    pub description: Option<String>,
    pub features: Vec<String>,
    pub published: Option<String>,
    pub address: Option<String>,
    pub state: Option<String>,
    pub category: Option<String>,
    pub code: Option<String>,
    pub accepts_financing: Option<bool>,
    pub video_tour_url: Option<String>,
    pub condo_fee: Option<f64>,
    pub property_tax: Option<f64>,
}

/// The encodings the CMS uses to point at an image.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageReference {
    /// A bare string: an absolute URL, or occasionally an asset token
    Url(String),
    Object(ImageObject),
    /// Anything else (numbers, arrays, empty strings); never resolves
    Unrecognized,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageObject {
    /// Pre-resolved URL stored on the image object itself
    pub url: Option<String>,
    pub asset: Option<AssetRef>,
    pub alt: Option<String>,
    pub caption: Option<String>,
    pub hotspot: Option<Hotspot>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetRef {
    /// URL dereferenced by the CMS query (`asset->{url}`)
    pub url: Option<String>,
    /// Opaque token, e.g. `image-<hash>-1200x800-jpg`
    pub token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Hotspot {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

impl RawRecord {
    /// Convert one untyped JSON value into a `RawRecord`.
    ///
    /// Only a non-object value is rejected; missing or mistyped fields simply stay `None`.
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value.as_object().ok_or_else(|| {
            metrics::parser::record_rejected();
            PipelineError::InvalidRecord {
                reason: format!("expected a JSON object, found {}", json_kind(value)),
            }
        })?;

        Ok(Self {
            id: identity(obj),
            title: text(obj, keys::TITLE),
            slug: slug(obj),
            neighborhood: text(obj, keys::NEIGHBORHOOD),
            city: text(obj, keys::CITY),
            price: number(obj, keys::PRICE, non_negative),
            purpose: text(obj, keys::PURPOSE),
            bedrooms: number(obj, keys::BEDROOMS, whole_count),
            bathrooms: number(obj, keys::BATHROOMS, whole_count),
            parking_spots: number(obj, keys::PARKING, whole_count),
            area: number(obj, keys::AREA, non_negative),
            total_area: number(obj, keys::TOTAL_AREA, non_negative),
            image: first_present(obj, keys::IMAGE).map(ImageReference::from_value),
            image_url: text(obj, keys::IMAGE_URL).map(ImageReference::Url),
            gallery: first_present(obj, keys::GALLERY)
                .and_then(Value::as_array)
                .map(|entries| entries.iter().map(ImageReference::from_value).collect())
                .unwrap_or_default(),
            highlight: flag(obj, keys::HIGHLIGHT),
            trending: flag(obj, keys::TRENDING),
            status: text(obj, keys::STATUS),
            description: text(obj, keys::DESCRIPTION),
            features: string_list(obj, keys::FEATURES),
            published: text(obj, keys::PUBLISHED),
            address: text(obj, keys::ADDRESS),
            state: text(obj, keys::STATE),
            category: text(obj, keys::CATEGORY),
            code: text(obj, keys::CODE),
            accepts_financing: flag(obj, keys::FINANCING),
            video_tour_url: text(obj, keys::VIDEO_TOUR),
            condo_fee: number(obj, keys::CONDO_FEE, non_negative),
            property_tax: number(obj, keys::PROPERTY_TAX, non_negative),
        })
    }

    /// Best-effort identity of a value that may not even be a record, for log lines.
    pub fn identity_hint(value: &Value) -> Option<String> {
        value.as_object().and_then(identity)
    }
}

impl ImageReference {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) if !s.trim().is_empty() => ImageReference::Url(s.trim().to_string()),
            Value::Object(obj) => ImageReference::Object(ImageObject::from_map(obj)),
            _ => ImageReference::Unrecognized,
        }
    }
}

impl ImageObject {
    fn from_map(obj: &Map<String, Value>) -> Self {
        let asset = obj.get("asset").and_then(|asset| match asset {
            Value::Object(a) => Some(AssetRef {
                url: text(a, keys::ASSET_URL),
                token: text(a, keys::ASSET_TOKEN),
            }),
            // Some legacy documents store the token or URL directly under `asset`
            Value::String(s) if s.starts_with("image-") => Some(AssetRef {
                url: None,
                token: Some(s.clone()),
            }),
            Value::String(s) if !s.trim().is_empty() => Some(AssetRef {
                url: Some(s.trim().to_string()),
                token: None,
            }),
            _ => None,
        });

        Self {
            url: text(obj, keys::IMAGE_DIRECT_URL),
            asset,
            alt: text(obj, keys::IMAGE_ALT),
            caption: text(obj, keys::IMAGE_CAPTION),
            hotspot: obj
                .get("hotspot")
                .and_then(|v| serde_json::from_value(v.clone()).ok()),
        }
    }
}

/// Split a CMS response into its records: either a bare array or a `{ "result": [...] }`
/// query envelope.
pub fn record_list(payload: &Value) -> Result<&[Value]> {
    match payload {
        Value::Array(items) => Ok(items),
        Value::Object(obj) => match obj.get("result") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(PipelineError::InvalidRecord {
                reason: "object payload has no `result` array".to_string(),
            }),
        },
        other => Err(PipelineError::InvalidRecord {
            reason: format!("expected an array of records, found {}", json_kind(other)),
        }),
    }
}

fn identity(obj: &Map<String, Value>) -> Option<String> {
    keys::ID.iter().find_map(|key| match obj.get(*key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn slug(obj: &Map<String, Value>) -> Option<String> {
    match first_present(obj, keys::SLUG)? {
        Value::String(s) => non_empty(s),
        Value::Object(nested) => nested.get("current").and_then(Value::as_str).and_then(non_empty),
        _ => None,
    }
}

fn first_present<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find(|value| !value.is_null())
}

fn text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| obj.get(*key).and_then(Value::as_str))
        .find_map(non_empty)
}

/// First alias holding a number that passes `usable`; an unusable value falls through to the next key.
fn number(obj: &Map<String, Value>, keys: &[&str], usable: fn(f64) -> bool) -> Option<f64> {
    keys.iter()
        .filter_map(|key| obj.get(*key).and_then(Value::as_f64))
        .find(|n| usable(*n))
}

fn non_negative(n: f64) -> bool {
    n.is_finite() && n >= 0.0
}

fn whole_count(n: f64) -> bool {
    non_negative(n) && n.fract() == 0.0 && n <= u32::MAX as f64
}

fn flag(obj: &Map<String, Value>, keys: &[&str]) -> Option<bool> {
    keys.iter().find_map(|key| match obj.get(*key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        Value::Number(n) => n.as_f64().map(|n| n != 0.0),
        _ => None,
    })
}

fn string_list(obj: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    first_present(obj, keys)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).filter_map(non_empty).collect())
        .unwrap_or_default()
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_portuguese_and_english_aliases() {
        let pt = RawRecord::from_value(&json!({
            "_id": "p1",
            "titulo": "Casa no Centro",
            "bairro": "Centro",
            "cidade": "Guararema",
            "preco": 450000,
            "finalidade": "Venda",
            "dormitorios": 3
        }))
        .unwrap();
        let en = RawRecord::from_value(&json!({
            "id": "p1",
            "title": "Casa no Centro",
            "neighborhood": "Centro",
            "city": "Guararema",
            "price": 450000,
            "purpose": "Venda",
            "bedrooms": 3
        }))
        .unwrap();

        assert_eq!(pt, en);
        assert_eq!(pt.title.as_deref(), Some("Casa no Centro"));
        assert_eq!(pt.bedrooms, Some(3.0));
    }

    #[test]
    fn test_first_usable_alias_wins() {
        let record = RawRecord::from_value(&json!({
            "_id": "  ",
            "id": "fallback-id",
            "title": "",
            "titulo": "Título",
            "price": "abc",
            "preco": 1200
        }))
        .unwrap();

        assert_eq!(record.id.as_deref(), Some("fallback-id"));
        assert_eq!(record.title.as_deref(), Some("Título"));
        assert_eq!(record.price, Some(1200.0));
    }

    #[test]
    fn test_unusable_number_falls_through_to_next_alias() {
        let record = RawRecord::from_value(&json!({
            "id": "a",
            "price": -10,
            "preco": 500,
            "bedrooms": 2.5,
            "dormitorios": 3,
            "area": -1,
            "areaUtil": 72.5,
            "parkingSpots": -2
        }))
        .unwrap();

        assert_eq!(record.price, Some(500.0));
        assert_eq!(record.bedrooms, Some(3.0));
        assert_eq!(record.area, Some(72.5));
        assert_eq!(record.parking_spots, None);
    }

    #[test]
    fn test_crop_metadata_is_tolerated() {
        let record = RawRecord::from_value(&json!({
            "id": "a",
            "imagem": {
                "asset": { "_ref": "image-abc-800x600-jpg" },
                "crop": { "top": 0.1, "bottom": 0.0, "left": 0.2, "right": 0.0 },
                "hotspot": { "x": 0.5, "y": 0.5 }
            }
        }))
        .unwrap();

        match record.image {
            Some(ImageReference::Object(obj)) => {
                assert!(obj.asset.is_some());
                assert_eq!(obj.hotspot.map(|h| (h.x, h.y)), Some((0.5, 0.5)));
            }
            other => panic!("unexpected image reference: {:?}", other),
        }
    }

    #[test]
    fn test_numeric_identity_is_stringified() {
        let record = RawRecord::from_value(&json!({ "id": 42 })).unwrap();
        assert_eq!(record.id.as_deref(), Some("42"));
    }

    #[test]
    fn test_non_object_is_rejected() {
        let err = RawRecord::from_value(&json!(["not", "a", "record"])).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidRecord { .. }));
        assert!(RawRecord::identity_hint(&json!("x")).is_none());
    }

    #[test]
    fn test_slug_shapes() {
        let direct = RawRecord::from_value(&json!({ "id": "a", "slug": "casa-x" })).unwrap();
        let nested = RawRecord::from_value(&json!({ "id": "a", "slug": { "current": "casa-y" } })).unwrap();
        let broken = RawRecord::from_value(&json!({ "id": "a", "slug": { "current": "" } })).unwrap();

        assert_eq!(direct.slug.as_deref(), Some("casa-x"));
        assert_eq!(nested.slug.as_deref(), Some("casa-y"));
        assert_eq!(broken.slug, None);
    }

    #[test]
    fn test_flags_are_lenient() {
        let record = RawRecord::from_value(&json!({
            "id": "a",
            "destaque": "true",
            "emAlta": 0,
            "aceitaFinanciamento": "yes"
        }))
        .unwrap();

        assert_eq!(record.highlight, Some(true));
        assert_eq!(record.trending, Some(false));
        assert_eq!(record.accepts_financing, None);
    }

    #[test]
    fn test_image_reference_shapes() {
        let record = RawRecord::from_value(&json!({
            "id": "a",
            "imagem": {
                "asset": { "_ref": "image-abc-800x600-jpg" },
                "alt": "Fachada",
                "hotspot": { "x": 0.3, "y": 0.6 }
            },
            "galeria": [
                "https://cdn/x.jpg",
                42,
                { "asset": { "_id": "image-def-10x10-png", "url": "https://cdn/def.png" }, "titulo": "Sala" }
            ]
        }))
        .unwrap();

        match record.image {
            Some(ImageReference::Object(ref obj)) => {
                assert_eq!(obj.alt.as_deref(), Some("Fachada"));
                assert_eq!(
                    obj.asset.as_ref().and_then(|a| a.token.as_deref()),
                    Some("image-abc-800x600-jpg")
                );
                assert_eq!(obj.hotspot.map(|h| h.x), Some(0.3));
            }
            ref other => panic!("unexpected image reference: {:?}", other),
        }

        assert_eq!(record.gallery.len(), 3);
        assert_eq!(record.gallery[0], ImageReference::Url("https://cdn/x.jpg".to_string()));
        assert_eq!(record.gallery[1], ImageReference::Unrecognized);
        match &record.gallery[2] {
            ImageReference::Object(obj) => assert_eq!(obj.caption.as_deref(), Some("Sala")),
            other => panic!("unexpected gallery entry: {:?}", other),
        }
    }

    #[test]
    fn test_features_keep_only_strings() {
        let record = RawRecord::from_value(&json!({
            "id": "a",
            "caracteristicas": ["Piscina", "", 3, " Churrasqueira "]
        }))
        .unwrap();
        assert_eq!(record.features, vec!["Piscina", "Churrasqueira"]);
    }

    #[test]
    fn test_record_list_shapes() {
        let array = json!([{ "id": "a" }, { "id": "b" }]);
        let envelope = json!({ "result": [{ "id": "a" }], "ms": 12 });

        assert_eq!(record_list(&array).unwrap().len(), 2);
        assert_eq!(record_list(&envelope).unwrap().len(), 1);
        assert!(record_list(&json!({ "items": [] })).is_err());
        assert!(record_list(&json!("nope")).is_err());
    }
}
