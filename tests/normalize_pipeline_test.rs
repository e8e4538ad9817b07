use chrono::{DateTime, Duration, TimeZone, Utc};
use property_pipeline::pipeline::parser::record_list;
use property_pipeline::pipeline::processing::normalize::NoopDiagnostics;
use property_pipeline::{
    ImageReference, NormalizeUseCase, Normalizer, PipelineError, PropertyNormalizer, PropertyStatus,
    PropertyType, RawRecord,
};
use serde_json::{json, Value};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn fixture() -> Value {
    serde_json::from_str(include_str!("resources/cms_properties.json")).unwrap()
}

fn normalize(value: Value) -> property_pipeline::Result<property_pipeline::CanonicalProperty> {
    PropertyNormalizer::default().normalize(&RawRecord::from_value(&value)?)
}

#[test]
fn reference_listing_normalizes_as_documented() {
    let property = normalize(json!({
        "id": "abc123",
        "title": "Casa X",
        "neighborhood": "Centro",
        "city": "Guararema",
        "price": 450000,
        "purpose": "Venda",
        "image": { "url": "https://cdn/x.jpg" }
    }))
    .unwrap();

    assert_eq!(property.id, "abc123");
    assert_eq!(property.title, "Casa X");
    assert_eq!(property.slug, "abc123");
    assert_eq!(property.location, "Centro, Guararema");
    assert_eq!(property.price, 450000.0);
    assert_eq!(property.property_type, PropertyType::Sale);
    let image = property.main_image.unwrap();
    assert_eq!(image.url(), "https://cdn/x.jpg");
    assert_eq!(image.alt, "Casa X");
}

#[test]
fn record_without_identity_fails() {
    let err = normalize(json!({ "title": "Casa", "price": 1 })).unwrap_err();
    assert!(matches!(err, PipelineError::MissingIdentity));
}

#[test]
fn purpose_mapping() {
    let sale = normalize(json!({ "_id": "a", "purpose": "Venda" })).unwrap();
    let rent = normalize(json!({ "_id": "b", "purpose": "aluguel" })).unwrap();
    let absent = normalize(json!({ "_id": "c" })).unwrap();

    assert_eq!(sale.property_type, PropertyType::Sale);
    assert_eq!(rent.property_type, PropertyType::Rent);
    assert_eq!(absent.property_type, PropertyType::Rent);
}

#[test]
fn unusable_first_alias_does_not_shadow_later_ones() {
    let property = normalize(json!({
        "_id": "n",
        "price": -10,
        "preco": 500,
        "bedrooms": 2.5,
        "dormitorios": 3
    }))
    .unwrap();
    assert_eq!(property.price, 500.0);
    assert_eq!(property.bedrooms, Some(3));
}

#[test]
fn is_new_window_boundary() {
    let normalizer = PropertyNormalizer::default();
    let published = |days: i64| {
        RawRecord::from_value(&json!({
            "_id": format!("d{}", days),
            "publishedAt": (now() - Duration::days(days)).to_rfc3339()
        }))
        .unwrap()
    };

    let recent = normalizer.normalize_at(&published(29), now(), &mut NoopDiagnostics).unwrap();
    let old = normalizer.normalize_at(&published(31), now(), &mut NoopDiagnostics).unwrap();
    assert!(recent.is_new());
    assert!(!old.is_new());
}

#[test]
fn gallery_with_unresolvable_entries() {
    let payload = fixture();
    let records = record_list(&payload).unwrap();
    let raw = RawRecord::from_value(&records[0]).unwrap();
    assert_eq!(raw.gallery.len(), 5);

    let property = PropertyNormalizer::default()
        .normalize_at(&raw, now(), &mut NoopDiagnostics)
        .unwrap();

    let gallery: Vec<(&str, &str)> = property
        .gallery
        .iter()
        .map(|image| (image.url(), image.alt.as_str()))
        .collect();
    assert_eq!(
        gallery,
        vec![
            ("https://cdn.sanity.io/images/0nks58lj/production/f00d-1600x900.webp", "Sala"),
            ("https://example.com/cozinha.jpg", "Casa X"),
            ("https://cdn.sanity.io/images/0nks58lj/production/beef-800x600.png", "Casa X"),
        ]
    );
    assert_eq!(property.gallery[0].width, Some(1600));
    assert_eq!(property.gallery[2].height, Some(600));
}

#[test]
fn main_image_from_asset_token() {
    let payload = fixture();
    let records = record_list(&payload).unwrap();
    let property = normalize(records[0].clone()).unwrap();

    let image = property.main_image.unwrap();
    assert_eq!(
        image.url(),
        "https://cdn.sanity.io/images/0nks58lj/production/a1b2c3d4e5-1200x800.jpg"
    );
    assert_eq!(image.alt, "Fachada da Casa X");
    assert_eq!((image.width, image.height), (Some(1200), Some(800)));
    assert!((image.aspect_ratio.unwrap() - 1.5).abs() < 1e-9);
    let focal = image.focal_point.unwrap();
    assert_eq!((focal.x, focal.y), (0.5, 0.4));
}

#[test]
fn main_image_priority_prefers_direct_url() {
    let property = normalize(json!({
        "_id": "p",
        "image": {
            "url": "https://example.com/direct.jpg",
            "asset": { "url": "https://example.com/asset.jpg", "_ref": "image-abc-10x10-jpg" }
        }
    }))
    .unwrap();
    assert_eq!(property.main_image.unwrap().url(), "https://example.com/direct.jpg");

    let property = normalize(json!({
        "_id": "p",
        "image": { "asset": { "url": "https://example.com/asset.jpg", "_ref": "image-abc-10x10-jpg" } }
    }))
    .unwrap();
    assert_eq!(property.main_image.unwrap().url(), "https://example.com/asset.jpg");
}

#[test]
fn no_resolvable_image_means_no_main_image() {
    for image in [json!(null), json!({}), json!({ "asset": { "_ref": "not-a-token" } }), json!(""), json!(7)] {
        let property = normalize(json!({ "_id": "x", "image": image })).unwrap();
        assert!(property.main_image.is_none(), "resolved {:?}", property.main_image);
    }
}

#[test]
fn batch_skips_broken_record_and_keeps_order() {
    let payload = fixture();
    let records = record_list(&payload).unwrap();
    assert_eq!(records.len(), 10);

    let report = NormalizeUseCase::with_default_normalizer().normalize_batch_at(records, now());

    assert_eq!(report.properties.len(), 9);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index, 3);
    assert_eq!(report.failures[0].id, None);

    let ids: Vec<&str> = report.properties.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "abc123",
            "rent-1",
            "no-purpose",
            "luxury",
            "trending-rent",
            "old-listing",
            "numbers-as-text",
            "nested-url",
            "last",
        ]
    );
}

#[test]
fn batch_fields_across_fixture() {
    let payload = fixture();
    let records = record_list(&payload).unwrap();
    let properties = NormalizeUseCase::with_default_normalizer().normalize_all_at(records, now());
    let by_id = |id: &str| properties.iter().find(|p| p.id == id).unwrap();

    let casa = by_id("abc123");
    assert_eq!(casa.slug, "casa-x-centro");
    assert_eq!(casa.location, "Centro, Guararema");
    assert_eq!((casa.bedrooms, casa.bathrooms, casa.parking_spots), (Some(3), Some(2), Some(2)));
    assert_eq!(casa.area, Some(180.5));
    assert!(casa.is_highlight());
    assert!(casa.is_new());
    assert!(!casa.is_premium());
    assert_eq!(casa.features, vec!["Piscina", "Churrasqueira"]);

    let rent = by_id("rent-1");
    assert_eq!(rent.property_type, PropertyType::Rent);
    assert_eq!(rent.location, "Parque Agrinco");
    assert!(rent.main_image.is_none());

    assert_eq!(by_id("no-purpose").location, "Guararema");

    let luxury = by_id("luxury");
    assert!(luxury.is_premium());
    assert_eq!(
        luxury.main_image.as_ref().unwrap().url(),
        "https://cdn.sanity.io/images/0nks58lj/production/cafe-2048x1365.jpg"
    );
    assert_eq!(luxury.location, "Localização não informada");

    let trending = by_id("trending-rent");
    assert!(trending.is_premium());
    assert_eq!(trending.status, PropertyStatus::Reserved);

    assert!(!by_id("old-listing").is_new());

    let garbage = by_id("numbers-as-text");
    assert_eq!(garbage.price, 0.0);
    assert_eq!(garbage.bedrooms, None);
    assert_eq!(garbage.area, None);

    assert_eq!(
        by_id("nested-url").main_image.as_ref().unwrap().url(),
        "https://example.com/direct.jpg"
    );

    let last = by_id("last");
    assert_eq!(last.property_type, PropertyType::Sale);
    assert!(last.is_premium());
}

#[test]
fn batch_never_escapes_errors() {
    let records = vec![json!(null), json!([1, 2]), json!("abc"), json!({}), json!({ "id": "" })];
    let report = NormalizeUseCase::with_default_normalizer().normalize_batch(&records);
    assert!(report.properties.is_empty());
    assert_eq!(report.failures.len(), 5);
}

#[test]
fn canonical_json_uses_camel_case() {
    let property = normalize(json!({
        "_id": "j",
        "vagas": 1,
        "destaque": true,
        "imagemUrl": "https://example.com/a.jpg"
    }))
    .unwrap();
    let value = serde_json::to_value(&property).unwrap();

    assert_eq!(value["parkingSpots"], json!(1));
    assert_eq!(value["isHighlight"], json!(true));
    assert_eq!(value["isNew"], json!(false));
    assert_eq!(value["propertyType"], json!("rent"));
    assert_eq!(value["mainImage"]["url"], json!("https://example.com/a.jpg"));
}

#[test]
fn image_reference_is_valid_matches_resolution() {
    let normalizer = PropertyNormalizer::default();
    let resolver = normalizer.resolver();
    let references = [
        ImageReference::Url("https://example.com/a.jpg".to_string()),
        ImageReference::Url("image-abc-10x20-png".to_string()),
        ImageReference::Url("relative/path.jpg".to_string()),
        ImageReference::Unrecognized,
    ];
    for reference in &references {
        let resolved = resolver.resolve(Some(reference), &Default::default());
        assert_eq!(resolver.is_valid(Some(reference)), resolved.is_some(), "{:?}", reference);
    }
}
