//! Default coordinates for ocean-condition queries that carry none.
//!
//! Check-ins without a position and the Ocean view both fall back to
//! [`default_coordinates`]. With `auto_geolocate` enabled the machine's public
//! IP is looked up first and then geolocated (IpApi); otherwise, or when
//! either step fails, the configured default is used.

use crate::config::LocationConfig;
use crate::error::{Error, FailedRequestSnafu, Result, TransportSnafu};
use crate::models::Coordinate;
use ipgeolocate::{Locator, Service};
use reqwest::Client;
use snafu::ResultExt;
use std::net::IpAddr;
use std::time::Duration;
use tracing::{error, info};

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolves the coordinates used when a caller supplies none.
///
/// # Panics
///
/// Does not panic. Service errors and unparseable latitude/longitude strings
/// both fall back to the configured default.
pub async fn default_coordinates(config: &LocationConfig) -> Coordinate {
    let fallback = config.default_coordinate();
    if !config.auto_geolocate {
        return fallback;
    }

    let ip = match public_ip(&config.public_ip_url).await {
        Ok(ip) => ip,
        Err(e) => {
            error!(
                "Could not determine public IP: {}. Using configured default ({}, {}).",
                e, fallback.lat, fallback.lon
            );
            return fallback;
        }
    };

    match Locator::get(&ip.to_string(), Service::IpApi).await {
        Ok(loc) => {
            let lat = loc.latitude.parse::<f64>().unwrap_or(fallback.lat);
            let lon = loc.longitude.parse::<f64>().unwrap_or(fallback.lon);
            info!(%ip, "Geolocation successful - ({}, {})", lat, lon);
            Coordinate::new(lat, lon)
        }
        Err(e) => {
            error!(
                "Error using geolocation service: {}. Using configured default ({}, {}).",
                e, fallback.lat, fallback.lon
            );
            fallback
        }
    }
}

/// Asks a plain-text echo service which address this machine is seen from.
pub async fn public_ip(url: &str) -> Result<IpAddr> {
    let client = Client::builder()
        .timeout(LOOKUP_TIMEOUT)
        .build()
        .context(TransportSnafu)?;
    let res = client.get(url).send().await.context(TransportSnafu)?;

    let status = res.status();
    let url = res.url().to_string();
    let body = res.text().await.context(TransportSnafu)?;

    if !status.is_success() {
        return FailedRequestSnafu { status, url, body }.fail();
    }

    body.trim().parse().map_err(|_| Error::MalformedResponse {
        reason: format!("'{}' is not an IP address", body.trim()),
    })
}
