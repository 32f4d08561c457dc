use blue_steps::{
    api::{MarineProvider, MarineResolver},
    catalog::ReferenceCatalog,
    config::MarineConfig,
    models::Coordinate,
};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

pub const MARINE_PATH: &str = "/v1/marine";

pub struct TestHelper {
    pub mock_server: MockServer,
}

impl TestHelper {
    pub async fn new() -> TestHelper {
        TestHelper {
            mock_server: MockServer::start().await,
        }
    }

    pub fn marine_config(&self) -> MarineConfig {
        MarineConfig {
            base_url: format!("{}{}", self.mock_server.uri(), MARINE_PATH),
            timeout_seconds: 1,
            forecast_days: 1,
        }
    }

    pub fn resolver(&self, catalog: ReferenceCatalog) -> MarineResolver {
        MarineResolver::new(MarineProvider::new(&self.marine_config()).unwrap(), catalog)
    }

    /// Serves `body` for the next request only; later mounts take over after.
    pub async fn respond_once(&self, body: Value) {
        Mock::given(method("GET"))
            .and(path(MARINE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .up_to_n_times(1)
            .mount(&self.mock_server)
            .await;
    }

    pub async fn respond_always(&self, body: Value) {
        self.respond_with(ResponseTemplate::new(200).set_body_json(body)).await;
    }

    pub async fn respond_with(&self, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(MARINE_PATH))
            .respond_with(template)
            .mount(&self.mock_server)
            .await;
    }

    /// Coordinates of every request the provider has received, in order.
    pub async fn requested_coordinates(&self) -> Vec<Coordinate> {
        self.mock_server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|req| {
                let param = |name: &str| -> f64 {
                    req.url
                        .query_pairs()
                        .find(|(k, _)| k == name)
                        .map(|(_, v)| v.parse().unwrap())
                        .unwrap()
                };
                Coordinate::new(param("latitude"), param("longitude"))
            })
            .collect()
    }
}

pub fn slow(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_json(body)
        .set_delay(Duration::from_secs(3))
}

pub fn hourly(wave: Value, sst: Value, wind: Value) -> Value {
    json!({
        "latitude": 0.0,
        "longitude": 0.0,
        "hourly": {
            "time": ["2026-10-16T00:00", "2026-10-16T01:00", "2026-10-16T02:00"],
            "wave_height": wave,
            "sea_surface_temperature": sst,
            "wind_speed_10m": wind,
        }
    })
}

pub fn land() -> Value {
    hourly(json!([null, null, null]), json!([null, null, null]), json!([null, null, null]))
}

pub fn ocean() -> Value {
    hourly(json!([1.5, 1.4, 1.3]), json!([26.1, 26.0, 26.0]), json!([null, 14.2, 15.0]))
}
