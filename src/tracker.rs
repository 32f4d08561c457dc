//! Check-in flow: the check-in is committed first, marine enrichment follows.
//!
//! Enrichment is best effort. A provider outage leaves the check-in in place
//! with `{}` as its marine data.

use crate::api::{marine_json, MarineResolver};
use crate::db::Store;
use crate::error::Result;
use crate::models::{CheckIn, Coordinate, ResolvedMarineData};
use chrono::NaiveDate;
use tracing::{info, warn};

pub struct Tracker {
    store: Store,
    resolver: MarineResolver,
    default_location: Coordinate,
}

impl Tracker {
    pub fn new(store: Store, resolver: MarineResolver, default_location: Coordinate) -> Self {
        Self {
            store,
            resolver,
            default_location,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn resolver(&self) -> &MarineResolver {
        &self.resolver
    }

    pub fn default_location(&self) -> Coordinate {
        self.default_location
    }

    pub fn set_default_location(&mut self, at: Coordinate) {
        self.default_location = at;
    }

    /// Commits a check-in without marine data.
    pub fn record_checkin(
        &self,
        owner_id: i64,
        habit_id: i64,
        date: NaiveDate,
        at: Option<Coordinate>,
    ) -> Result<CheckIn> {
        let checkin = self.store.insert_checkin(owner_id, habit_id, date, at)?;
        info!(checkin_id = checkin.id, habit_id, "Check-in recorded");
        Ok(checkin)
    }

    /// Where marine conditions for `checkin` should be looked up.
    pub fn enrichment_target(&self, checkin: &CheckIn) -> Coordinate {
        checkin.coordinate().unwrap_or(self.default_location)
    }

    /// Stores the enrichment result; `None` is stored as `{}`.
    pub fn finish_checkin(&self, checkin_id: i64, marine: Option<&ResolvedMarineData>) -> Result<()> {
        if marine.is_none() {
            warn!(checkin_id, "No marine data for check-in");
        }
        self.store
            .attach_marine_data(checkin_id, &marine_json(marine).to_string())
    }

    /// Records a check-in and enriches it in one go.
    pub async fn check_in(
        &self,
        owner_id: i64,
        habit_id: i64,
        date: NaiveDate,
        at: Option<Coordinate>,
    ) -> Result<(CheckIn, Option<ResolvedMarineData>)> {
        let mut checkin = self.record_checkin(owner_id, habit_id, date, at)?;

        let target = self.enrichment_target(&checkin);
        let marine = self.resolver.fetch(target.lat, target.lon).await;
        self.finish_checkin(checkin.id, marine.as_ref())?;

        checkin.marine_data = Some(marine_json(marine.as_ref()).to_string());
        Ok((checkin, marine))
    }

    /// Current ocean conditions at `at`, or at the default location.
    pub async fn ocean_conditions(&self, at: Option<Coordinate>) -> Option<ResolvedMarineData> {
        let at = at.unwrap_or(self.default_location);
        self.resolver.fetch(at.lat, at.lon).await
    }
}
