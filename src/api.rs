//! Marine provider client and the land-aware resolver built on top of it.
//!
//! [`MarineProvider`] talks to the Open-Meteo marine endpoint. [`MarineResolver`]
//! turns a caller's coordinate into a [`ResolvedMarineData`], substituting the
//! nearest known ocean point when the coordinate turns out to be on land.

use crate::catalog::ReferenceCatalog;
use crate::config::MarineConfig;
use crate::error::{Error, FailedRequestSnafu, MalformedResponseSnafu, Result, TransportSnafu};
use crate::geo::find_nearest;
use crate::models::{Coordinate, HourlyResponse, HourlySeries, LocationInfo, MarineReading, ResolvedMarineData};
use reqwest::Client;
use serde_json::Value;
use snafu::{OptionExt, ResultExt};
use std::time::Duration;
use tracing::{error, info, warn};

pub const HOURLY_VARIABLES: &str = "wave_height,sea_surface_temperature,wind_speed_10m";

#[derive(Debug, Clone)]
pub struct MarineProvider {
    client: Client,
    base_url: String,
    forecast_days: u32,
}

impl MarineProvider {
    pub fn new(config: &MarineConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context(TransportSnafu)?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            forecast_days: config.forecast_days,
        })
    }

    /// Requests one forecast day of hourly marine variables at `at`.
    ///
    /// Timeouts and connection failures are [`Error::Transport`], non-2xx
    /// statuses [`Error::FailedRequest`], and an unparseable body or a body
    /// without an `hourly` section [`Error::MalformedResponse`].
    pub async fn hourly(&self, at: Coordinate) -> Result<HourlySeries> {
        let res = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", at.lat.to_string()),
                ("longitude", at.lon.to_string()),
                ("hourly", HOURLY_VARIABLES.to_string()),
                ("timezone", "auto".to_string()),
                ("forecast_days", self.forecast_days.to_string()),
            ])
            .send()
            .await
            .context(TransportSnafu)?;

        let status = res.status();
        let url = res.url().to_string();
        let body = res.text().await.context(TransportSnafu)?;

        if !status.is_success() {
            return FailedRequestSnafu { status, url, body }.fail();
        }

        let parsed: HourlyResponse = serde_json::from_str(&body).map_err(|e| Error::MalformedResponse {
            reason: e.to_string(),
        })?;

        parsed.hourly.context(MalformedResponseSnafu {
            reason: "response has no 'hourly' section",
        })
    }
}

/// Marine conditions lookup with land fallback.
///
/// Holds no mutable state; clones share the HTTP client and the catalog.
#[derive(Debug, Clone)]
pub struct MarineResolver {
    provider: MarineProvider,
    catalog: ReferenceCatalog,
}

impl MarineResolver {
    pub fn new(provider: MarineProvider, catalog: ReferenceCatalog) -> Self {
        Self { provider, catalog }
    }

    /// Marine conditions at `(lat, lon)`, or `None` when nothing usable could
    /// be fetched.
    ///
    /// When every series the provider returned is null the coordinate is
    /// treated as land and the nearest catalog point is queried instead. At
    /// most two requests are made, one after the other. Provider failures
    /// are logged and end in `None`; they are never returned to the caller.
    pub async fn fetch(&self, lat: f64, lon: f64) -> Option<ResolvedMarineData> {
        let original = Coordinate::new(lat, lon);
        let hourly = self.hourly_logged(original).await?;

        if !hourly.is_land() {
            return Some(ResolvedMarineData {
                reading: MarineReading::from(&hourly),
                location_info: LocationInfo::unadjusted(original),
            });
        }

        let (point, distance_km) = match find_nearest(original, self.catalog.points()) {
            Ok(nearest) => nearest,
            Err(e) => {
                error!(lat, lon, "Cannot substitute land coordinate: {}", e);
                return None;
            }
        };

        info!(
            lat,
            lon,
            ocean = %point.name,
            distance_km,
            "Coordinate is on land, using nearest ocean reference point"
        );

        let ocean = point.coordinate();
        let hourly = self.hourly_logged(ocean).await?;

        Some(ResolvedMarineData {
            reading: MarineReading::from(&hourly),
            location_info: LocationInfo::adjusted(original, ocean, &point.name, distance_km),
        })
    }

    /// [`fetch`](Self::fetch) rendered as JSON, `{}` when it yields nothing.
    pub async fn fetch_json(&self, lat: f64, lon: f64) -> Value {
        marine_json(self.fetch(lat, lon).await.as_ref())
    }

    async fn hourly_logged(&self, at: Coordinate) -> Option<HourlySeries> {
        match self.provider.hourly(at).await {
            Ok(hourly) => Some(hourly),
            Err(e @ Error::MalformedResponse { .. }) => {
                warn!(lat = at.lat, lon = at.lon, "Discarding marine response: {}", e);
                None
            }
            Err(e) => {
                error!(lat = at.lat, lon = at.lon, "Marine provider unavailable: {}", e);
                None
            }
        }
    }
}

/// JSON for a possibly missing marine result; the empty object stands for
/// "no data".
pub fn marine_json(data: Option<&ResolvedMarineData>) -> Value {
    data.and_then(|d| serde_json::to_value(d).ok())
        .unwrap_or_else(|| Value::Object(Default::default()))
}
