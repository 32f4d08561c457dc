use crate::error::Error;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// A latitude/longitude pair in decimal degrees (WGS84).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Marine provider payload. Only the `hourly` section is consumed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HourlyResponse {
    pub hourly: Option<HourlySeries>,
}

/// Index-aligned hourly series. A variable the provider did not return is
/// `None`, which is different from a returned array full of nulls.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HourlySeries {
    pub wave_height: Option<Vec<Option<f64>>>,
    pub sea_surface_temperature: Option<Vec<Option<f64>>>,
    #[serde(rename = "wind_speed_10m")]
    pub wind_speed: Option<Vec<Option<f64>>>,
}

impl HourlySeries {
    fn series(&self) -> [Option<&Vec<Option<f64>>>; 3] {
        [
            self.wave_height.as_ref(),
            self.sea_surface_temperature.as_ref(),
            self.wind_speed.as_ref(),
        ]
    }

    /// True when no returned series holds a single value.
    ///
    /// Empty arrays count as all-null and missing arrays are skipped, so a
    /// payload that only carries `wave_height: [null]` is land.
    pub fn is_land(&self) -> bool {
        self.series()
            .into_iter()
            .flatten()
            .all(|values| values.iter().all(Option::is_none))
    }
}

fn first_value(series: &Option<Vec<Option<f64>>>) -> Option<f64> {
    series.as_ref()?.iter().flatten().copied().next()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarineReading {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wave_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sea_surface_temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,
}

// First non-null value of each series, independently.
impl From<&HourlySeries> for MarineReading {
    fn from(hourly: &HourlySeries) -> Self {
        Self {
            wave_height: first_value(&hourly.wave_height),
            sea_surface_temperature: first_value(&hourly.sea_surface_temperature),
            wind_speed: first_value(&hourly.wind_speed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub original_location: Coordinate,
    pub ocean_location: Coordinate,
    pub ocean_name: String,
    pub distance_km: f64,
    pub adjusted: bool,
}

impl LocationInfo {
    pub const CURRENT_LOCATION: &'static str = "Current location";

    pub fn unadjusted(original: Coordinate) -> Self {
        Self {
            original_location: original,
            ocean_location: original,
            ocean_name: Self::CURRENT_LOCATION.to_string(),
            distance_km: 0.0,
            adjusted: false,
        }
    }

    /// Info for a substituted reading. `distance_km` is rounded to a tenth,
    /// but never down to zero while the two locations differ.
    pub fn adjusted(original: Coordinate, ocean: Coordinate, name: &str, distance_km: f64) -> Self {
        let mut distance_km = round_to_tenth(distance_km);
        if original != ocean {
            distance_km = distance_km.max(0.1);
        }

        Self {
            original_location: original,
            ocean_location: ocean,
            ocean_name: name.to_string(),
            distance_km,
            adjusted: true,
        }
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Marine reading plus the location it was actually read at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMarineData {
    #[serde(flatten)]
    pub reading: MarineReading,
    pub location_info: LocationInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub created_at: NaiveDateTime,
}

/// Kind of conservation action a habit tracks. Each check-in earns the
/// type's [`impact_points`](Self::impact_points).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    #[default]
    BeachCleanup,
    PlasticReduction,
    SustainableSeafood,
    WaterConservation,
    WildlifeProtection,
    OceanEducation,
}

impl ActivityType {
    pub const ALL: [ActivityType; 6] = [
        ActivityType::BeachCleanup,
        ActivityType::PlasticReduction,
        ActivityType::SustainableSeafood,
        ActivityType::WaterConservation,
        ActivityType::WildlifeProtection,
        ActivityType::OceanEducation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityType::BeachCleanup => "beach_cleanup",
            ActivityType::PlasticReduction => "plastic_reduction",
            ActivityType::SustainableSeafood => "sustainable_seafood",
            ActivityType::WaterConservation => "water_conservation",
            ActivityType::WildlifeProtection => "wildlife_protection",
            ActivityType::OceanEducation => "ocean_education",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ActivityType::BeachCleanup => "Beach Cleanup",
            ActivityType::PlasticReduction => "Plastic Reduction",
            ActivityType::SustainableSeafood => "Sustainable Seafood",
            ActivityType::WaterConservation => "Water Conservation",
            ActivityType::WildlifeProtection => "Wildlife Protection",
            ActivityType::OceanEducation => "Ocean Education",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            ActivityType::BeachCleanup => "🏖",
            ActivityType::PlasticReduction => "♻",
            ActivityType::SustainableSeafood => "🐟",
            ActivityType::WaterConservation => "💧",
            ActivityType::WildlifeProtection => "🐢",
            ActivityType::OceanEducation => "📚",
        }
    }

    /// Impact score earned by a single check-in.
    pub fn impact_points(self) -> i64 {
        match self {
            ActivityType::BeachCleanup => 10,
            ActivityType::WildlifeProtection => 8,
            ActivityType::PlasticReduction => 5,
            ActivityType::SustainableSeafood => 5,
            ActivityType::WaterConservation => 3,
            ActivityType::OceanEducation => 2,
        }
    }

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|a| *a == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}

impl FromStr for ActivityType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| Error::InvalidInput {
                reason: format!("unknown activity type '{}'", s),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Habit {
    pub id: i64,
    pub owner_id: i64,
    pub description: String,
    pub activity_type: ActivityType,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckIn {
    pub id: i64,
    pub habit_id: i64,
    pub date: NaiveDate,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub impact_score: i64,
    /// JSON of a [`ResolvedMarineData`], `{}` when enrichment failed, or
    /// `None` while enrichment is still pending.
    pub marine_data: Option<String>,
}

impl CheckIn {
    pub fn coordinate(&self) -> Option<Coordinate> {
        Some(Coordinate::new(self.latitude?, self.longitude?))
    }

    pub fn marine(&self) -> Option<ResolvedMarineData> {
        serde_json::from_str(self.marine_data.as_deref()?).ok()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommunityStats {
    pub total_users: i64,
    pub total_habits: i64,
    pub total_checkins: i64,
    pub recent_weekly_checkins: i64,
    pub total_impact_score: i64,
    /// Check-ins per activity type; types nobody checked in on are absent.
    pub activity_breakdown: BTreeMap<ActivityType, i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub name: String,
    pub total_checkins: i64,
    pub impact_score: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentActivity {
    pub checkin_id: i64,
    pub user_name: String,
    pub description: String,
    pub activity_type: ActivityType,
    pub impact_score: i64,
    pub date: NaiveDate,
    pub has_location: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Week,
    #[default]
    Month,
    Year,
    All,
}

impl Timeframe {
    /// First day (inclusive) counted by this timeframe, `None` for all time.
    pub fn since(self, today: NaiveDate) -> Option<NaiveDate> {
        let days = match self {
            Timeframe::Week => 7,
            Timeframe::Month => 30,
            Timeframe::Year => 365,
            Timeframe::All => return None,
        };
        Some(today - Duration::days(days - 1))
    }

    pub fn next(self) -> Self {
        match self {
            Timeframe::Week => Timeframe::Month,
            Timeframe::Month => Timeframe::Year,
            Timeframe::Year => Timeframe::All,
            Timeframe::All => Timeframe::Week,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Timeframe::Week => "This Week",
            Timeframe::Month => "This Month",
            Timeframe::Year => "This Year",
            Timeframe::All => "All Time",
        }
    }
}
