use crate::helper::*;
use blue_steps::{
    api::HOURLY_VARIABLES,
    catalog::{OceanReferencePoint, ReferenceCatalog},
    models::{Coordinate, MarineReading},
};
use serde_json::json;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, ResponseTemplate,
};

#[tokio::test]
async fn test_ocean_coordinate_is_not_adjusted() {
    let helper = TestHelper::new().await;
    helper.respond_always(ocean()).await;

    let data = helper
        .resolver(ReferenceCatalog::builtin())
        .fetch(0.0, 0.0)
        .await
        .unwrap();

    assert_eq!(
        data.reading,
        MarineReading {
            wave_height: Some(1.5),
            sea_surface_temperature: Some(26.1),
            wind_speed: Some(14.2),
        }
    );
    let info = data.location_info;
    assert!(!info.adjusted);
    assert_eq!(info.distance_km, 0.0);
    assert_eq!(info.original_location, Coordinate::new(0.0, 0.0));
    assert_eq!(info.ocean_location, info.original_location);
    assert_eq!(info.ocean_name, "Current location");
    assert_eq!(helper.requested_coordinates().await.len(), 1);
}

#[tokio::test]
async fn test_request_carries_expected_query() {
    let helper = TestHelper::new().await;
    Mock::given(method("GET"))
        .and(path(MARINE_PATH))
        .and(query_param("hourly", HOURLY_VARIABLES))
        .and(query_param("timezone", "auto"))
        .and(query_param("forecast_days", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ocean()))
        .expect(1)
        .mount(&helper.mock_server)
        .await;

    let data = helper.resolver(ReferenceCatalog::builtin()).fetch(36.8, -122.0).await;
    assert!(data.is_some());
    assert_eq!(helper.requested_coordinates().await, vec![Coordinate::new(36.8, -122.0)]);
}

#[tokio::test]
async fn test_land_coordinate_falls_back_to_nearest_reference_point() {
    let helper = TestHelper::new().await;
    helper.respond_once(land()).await;
    helper.respond_always(ocean()).await;

    // Denver
    let data = helper
        .resolver(ReferenceCatalog::builtin())
        .fetch(39.0, -105.0)
        .await
        .unwrap();

    let requests = helper.requested_coordinates().await;
    assert_eq!(
        requests,
        vec![Coordinate::new(39.0, -105.0), Coordinate::new(33.75, -119.05)]
    );

    let info = &data.location_info;
    assert!(info.adjusted);
    assert_eq!(info.ocean_name, "Pacific Ocean - Santa Monica Basin");
    assert_eq!(info.distance_km, 1384.7);
    assert_eq!(info.original_location, Coordinate::new(39.0, -105.0));
    assert_eq!(info.ocean_location, Coordinate::new(33.75, -119.05));
    assert_eq!(data.reading.wave_height, Some(1.5));
}

#[tokio::test]
async fn test_leading_nulls_are_skipped_and_not_land() {
    let helper = TestHelper::new().await;
    helper
        .respond_always(hourly(
            json!([null, 1.2, 0.9]),
            json!([null, null, null]),
            json!([null, null, null]),
        ))
        .await;

    let resolver = helper.resolver(ReferenceCatalog::builtin());
    let value = resolver.fetch_json(10.0, -30.0).await;

    assert_eq!(helper.requested_coordinates().await.len(), 1);
    assert_eq!(value["wave_height"], json!(1.2));
    assert!(value.get("sea_surface_temperature").is_none());
    assert!(value.get("wind_speed").is_none());
    assert_eq!(value["location_info"]["adjusted"], json!(false));
    assert_eq!(value["location_info"]["distance_km"], json!(0.0));
}

#[tokio::test]
async fn test_empty_arrays_count_as_land() {
    let helper = TestHelper::new().await;
    helper.respond_once(hourly(json!([]), json!([]), json!([]))).await;
    helper.respond_always(ocean()).await;

    let data = helper
        .resolver(ReferenceCatalog::builtin())
        .fetch(48.86, 2.35)
        .await
        .unwrap();

    assert_eq!(helper.requested_coordinates().await.len(), 2);
    assert!(data.location_info.adjusted);
    assert!(data.location_info.distance_km > 0.0);
}

#[tokio::test]
async fn test_missing_arrays_are_treated_as_all_null() {
    let helper = TestHelper::new().await;
    helper
        .respond_once(json!({ "hourly": { "wave_height": [null, null] } }))
        .await;
    helper.respond_always(ocean()).await;

    let catalog = ReferenceCatalog::new(vec![OceanReferencePoint::new(36.8, -122.0, "Monterey Bay")]);
    let data = helper.resolver(catalog).fetch(37.77, -121.0).await.unwrap();

    assert_eq!(helper.requested_coordinates().await.len(), 2);
    assert_eq!(data.location_info.ocean_name, "Monterey Bay");
}

#[tokio::test]
async fn test_missing_array_does_not_hide_values_elsewhere() {
    let helper = TestHelper::new().await;
    helper
        .respond_always(json!({ "hourly": { "sea_surface_temperature": [null, 19.5] } }))
        .await;

    let data = helper
        .resolver(ReferenceCatalog::builtin())
        .fetch(36.0, -123.0)
        .await
        .unwrap();

    assert_eq!(helper.requested_coordinates().await.len(), 1);
    assert!(!data.location_info.adjusted);
    assert_eq!(
        data.reading,
        MarineReading {
            sea_surface_temperature: Some(19.5),
            ..MarineReading::default()
        }
    );
}

#[tokio::test]
async fn test_missing_hourly_section_returns_empty_result() {
    let helper = TestHelper::new().await;
    helper.respond_always(json!({ "latitude": 0.0, "longitude": 0.0 })).await;

    let resolver = helper.resolver(ReferenceCatalog::builtin());
    assert!(resolver.fetch(0.0, 0.0).await.is_none());
    assert_eq!(resolver.fetch_json(0.0, 0.0).await, json!({}));
}

#[tokio::test]
async fn test_unparseable_body_returns_empty_result() {
    let helper = TestHelper::new().await;
    helper
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .await;

    assert!(helper
        .resolver(ReferenceCatalog::builtin())
        .fetch(0.0, 0.0)
        .await
        .is_none());
}

#[tokio::test]
async fn test_http_error_returns_empty_result_without_retry() {
    let helper = TestHelper::new().await;
    helper
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": true,
            "reason": "Latitude must be in range of -90 to 90°."
        })))
        .await;

    let resolver = helper.resolver(ReferenceCatalog::builtin());
    assert_eq!(resolver.fetch_json(95.0, 0.0).await, json!({}));
    assert_eq!(helper.requested_coordinates().await.len(), 1);
}

#[tokio::test]
async fn test_failed_fallback_request_returns_empty_result() {
    let helper = TestHelper::new().await;
    helper.respond_once(land()).await;
    helper.respond_with(ResponseTemplate::new(503)).await;

    let data = helper
        .resolver(ReferenceCatalog::builtin())
        .fetch(39.0, -105.0)
        .await;

    assert!(data.is_none());
    assert_eq!(helper.requested_coordinates().await.len(), 2);
}

#[tokio::test]
async fn test_fallback_response_without_hourly_returns_empty_result() {
    let helper = TestHelper::new().await;
    helper.respond_once(land()).await;
    helper.respond_always(json!({ "generationtime_ms": 0.1 })).await;

    assert!(helper
        .resolver(ReferenceCatalog::builtin())
        .fetch(39.0, -105.0)
        .await
        .is_none());
}

#[tokio::test]
async fn test_empty_catalog_on_land_returns_empty_result() {
    let helper = TestHelper::new().await;
    helper.respond_always(land()).await;

    let resolver = helper.resolver(ReferenceCatalog::new(Vec::new()));
    assert_eq!(resolver.fetch_json(39.0, -105.0).await, json!({}));
    // No fallback target, so no second request.
    assert_eq!(helper.requested_coordinates().await.len(), 1);
}

#[tokio::test]
async fn test_empty_catalog_does_not_matter_for_ocean_points() {
    let helper = TestHelper::new().await;
    helper.respond_always(ocean()).await;

    let resolver = helper.resolver(ReferenceCatalog::new(Vec::new()));
    assert!(resolver.fetch(0.0, 0.0).await.is_some());
}

#[tokio::test]
async fn test_synthetic_catalog_tie_goes_to_first_entry() {
    let helper = TestHelper::new().await;
    helper.respond_once(land()).await;
    helper.respond_always(ocean()).await;

    let catalog = ReferenceCatalog::new(vec![
        OceanReferencePoint::new(0.0, 1.0, "East"),
        OceanReferencePoint::new(0.0, -1.0, "West"),
    ]);
    let data = helper.resolver(catalog).fetch(0.0, 0.0).await.unwrap();

    assert_eq!(data.location_info.ocean_name, "East");
    assert_eq!(data.location_info.distance_km, 111.2);
    assert_eq!(
        helper.requested_coordinates().await[1],
        Coordinate::new(0.0, 1.0)
    );
}

#[tokio::test]
async fn test_substitute_a_few_metres_away_reports_a_nonzero_distance() {
    let helper = TestHelper::new().await;
    helper.respond_once(land()).await;
    helper.respond_always(ocean()).await;

    let catalog = ReferenceCatalog::new(vec![OceanReferencePoint::new(10.0, 10.0, "Dock")]);
    let data = helper.resolver(catalog).fetch(10.0, 10.0002).await.unwrap();

    let info = data.location_info;
    assert!(info.adjusted);
    assert_eq!(info.ocean_name, "Dock");
    assert_ne!(info.ocean_location, info.original_location);
    assert_eq!(info.distance_km, 0.1);
    assert_eq!(helper.requested_coordinates().await.len(), 2);
}

#[tokio::test]
async fn test_repeated_fetch_is_idempotent() {
    let helper = TestHelper::new().await;
    helper.respond_always(ocean()).await;

    let resolver = helper.resolver(ReferenceCatalog::builtin());
    let first = resolver.fetch(0.0, 0.0).await;
    let second = resolver.fetch(0.0, 0.0).await;

    assert!(first.is_some());
    assert_eq!(first, second);
    assert_eq!(helper.requested_coordinates().await.len(), 2);
}

#[tokio::test]
async fn test_timeout_is_a_transport_failure() {
    let helper = TestHelper::new().await;
    helper.respond_with(slow(ocean())).await;

    assert!(helper
        .resolver(ReferenceCatalog::builtin())
        .fetch(0.0, 0.0)
        .await
        .is_none());
}

#[tokio::test]
async fn test_unreachable_provider_returns_empty_result() {
    let helper = TestHelper::new().await;
    let mut config = helper.marine_config();
    config.base_url = "http://127.0.0.1:9/v1/marine".to_string();

    let resolver = blue_steps::api::MarineResolver::new(
        blue_steps::api::MarineProvider::new(&config).unwrap(),
        ReferenceCatalog::builtin(),
    );
    assert!(resolver.fetch(0.0, 0.0).await.is_none());
}
