use crate::helper::*;
use blue_steps::{
    catalog::ReferenceCatalog,
    db::Store,
    error::Error,
    models::{ActivityType, Coordinate},
    tracker::Tracker,
};
use chrono::NaiveDate;
use wiremock::ResponseTemplate;

const HAWAII: Coordinate = Coordinate::new(20.0, -157.0);

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

async fn tracker(helper: &TestHelper) -> (Tracker, i64, i64) {
    let store = Store::open_in_memory().unwrap();
    let user = store.create_user("ana@example.com", "Ana").unwrap();
    let habit = store.create_habit(user.id, "Beach cleanup", ActivityType::BeachCleanup).unwrap();
    let tracker = Tracker::new(store, helper.resolver(ReferenceCatalog::builtin()), HAWAII);
    (tracker, user.id, habit.id)
}

#[tokio::test]
async fn test_checkin_is_enriched_with_marine_data() {
    let helper = TestHelper::new().await;
    helper.respond_always(ocean()).await;
    let (tracker, user_id, habit_id) = tracker(&helper).await;

    let (checkin, marine) = tracker
        .check_in(user_id, habit_id, today(), Some(Coordinate::new(36.8, -122.0)))
        .await
        .unwrap();

    let marine = marine.unwrap();
    assert_eq!(marine.reading.wave_height, Some(1.5));

    let stored = tracker.store().checkin(checkin.id).unwrap();
    assert_eq!(stored.marine(), Some(marine));
    assert_eq!(stored.impact_score, 10);
    assert_eq!(
        helper.requested_coordinates().await,
        vec![Coordinate::new(36.8, -122.0)]
    );
}

#[tokio::test]
async fn test_checkin_without_coordinates_uses_default_location() {
    let helper = TestHelper::new().await;
    helper.respond_always(ocean()).await;
    let (tracker, user_id, habit_id) = tracker(&helper).await;

    let (checkin, _) = tracker.check_in(user_id, habit_id, today(), None).await.unwrap();

    assert_eq!(checkin.coordinate(), None);
    assert_eq!(helper.requested_coordinates().await, vec![HAWAII]);
}

#[tokio::test]
async fn test_checkin_survives_provider_outage() {
    let helper = TestHelper::new().await;
    helper.respond_with(ResponseTemplate::new(500)).await;
    let (tracker, user_id, habit_id) = tracker(&helper).await;

    let (checkin, marine) = tracker
        .check_in(user_id, habit_id, today(), Some(Coordinate::new(39.0, -105.0)))
        .await
        .unwrap();

    assert!(marine.is_none());
    let stored = tracker.store().checkin(checkin.id).unwrap();
    assert_eq!(stored.marine_data.as_deref(), Some("{}"));
    assert_eq!(tracker.store().checkins_for_user(user_id).unwrap().len(), 1);
}

#[tokio::test]
async fn test_checkin_on_land_stores_adjustment() {
    let helper = TestHelper::new().await;
    helper.respond_once(land()).await;
    helper.respond_always(ocean()).await;
    let (tracker, user_id, habit_id) = tracker(&helper).await;

    let (checkin, _) = tracker
        .check_in(user_id, habit_id, today(), Some(Coordinate::new(39.0, -105.0)))
        .await
        .unwrap();

    let info = tracker.store().checkin(checkin.id).unwrap().marine().unwrap().location_info;
    assert!(info.adjusted);
    assert_eq!(info.ocean_name, "Pacific Ocean - Santa Monica Basin");
}

#[tokio::test]
async fn test_checkin_on_unknown_habit_makes_no_request() {
    let helper = TestHelper::new().await;
    helper.respond_always(ocean()).await;
    let (tracker, user_id, _) = tracker(&helper).await;

    let err = tracker.check_in(user_id, 999, today(), None).await.unwrap_err();
    assert!(matches!(err, Error::NotFound { id: 999, .. }));
    assert!(helper.requested_coordinates().await.is_empty());
}

#[tokio::test]
async fn test_ocean_conditions_default_to_configured_location() {
    let helper = TestHelper::new().await;
    helper.respond_always(ocean()).await;
    let (mut tracker, _, _) = tracker(&helper).await;

    let data = tracker.ocean_conditions(None).await.unwrap();
    assert_eq!(data.location_info.original_location, HAWAII);

    let elsewhere = Coordinate::new(-18.0, 152.0);
    tracker.set_default_location(elsewhere);
    tracker.ocean_conditions(None).await.unwrap();
    tracker.ocean_conditions(Some(HAWAII)).await.unwrap();

    assert_eq!(
        helper.requested_coordinates().await,
        vec![HAWAII, elsewhere, HAWAII]
    );
}

#[tokio::test]
async fn test_record_then_finish_checkin() {
    let helper = TestHelper::new().await;
    let (tracker, user_id, habit_id) = tracker(&helper).await;

    let checkin = tracker.record_checkin(user_id, habit_id, today(), None).unwrap();
    assert_eq!(tracker.enrichment_target(&checkin), HAWAII);
    assert_eq!(tracker.store().checkin(checkin.id).unwrap().marine_data, None);

    tracker.finish_checkin(checkin.id, None).unwrap();
    assert_eq!(
        tracker.store().checkin(checkin.id).unwrap().marine_data.as_deref(),
        Some("{}")
    );
}
