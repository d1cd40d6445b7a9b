//! End-to-end journal flow: create, reject edit, add place, set transport,
//! delete with cascade.

use tripjournal_core::db::open_db_in_memory;
use tripjournal_core::{
    find_recommendation, PlaceRepository, PlaceService, SqlitePlaceRepository,
    SqliteTripRepository, TransportType, TripDraft, TripListQuery, TripService, TripServiceError,
};

const JUNE_1_2024: i64 = 1_717_200_000_000;
const DAY: i64 = 86_400_000;

fn june(day: i64) -> i64 {
    JUNE_1_2024 + (day - 1) * DAY
}

#[test]
fn lublin_trip_lifecycle() {
    let conn = open_db_in_memory().unwrap();
    let trips = TripService::new(SqliteTripRepository::try_new(&conn).unwrap());
    let places = PlaceService::new(SqlitePlaceRepository::try_new(&conn).unwrap());

    let input = TripDraft::new("Poland", "Lublin", "", june(1), june(5));
    let trip = trips.create_trip(&input).unwrap();
    assert_eq!(trip.country, "Poland");
    assert_eq!(trip.city, "Lublin");
    assert_eq!(trip.date_from, june(1));
    assert_eq!(trip.date_to, june(5));
    assert_eq!(trip.notes, "");

    let mut edit = trip.to_draft();
    edit.date_to = june(1) - 2 * DAY;
    let rejected = trips.update_trip(trip.uuid, &edit).unwrap_err();
    match rejected {
        TripServiceError::Validation(errors) => {
            let dates = errors.dates.expect("date range error");
            assert_eq!(dates.to_string(), "End date must be after start date");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(trips.get_trip(trip.uuid).unwrap(), Some(trip.clone()));

    let castle = places.create_place(trip.uuid, "Castle", june(2)).unwrap();
    assert_eq!(castle.route.transport_type, Some(TransportType::None));

    let route = places
        .set_transport_type(castle.route.uuid, Some(TransportType::Bike))
        .unwrap();
    assert_eq!(route.transport_type, Some(TransportType::Bike));
    let reloaded = places.get_place(castle.place.uuid).unwrap().unwrap();
    assert_eq!(reloaded.place.name, "Castle");
    assert_eq!(reloaded.place.date, june(2));

    trips.delete_trip(trip.uuid).unwrap();
    let repo = SqlitePlaceRepository::try_new(&conn).unwrap();
    assert!(repo.list_places(trip.uuid).unwrap().is_empty());
    assert!(repo.get_route(castle.route.uuid).unwrap().is_none());
    assert!(trips.get_trip(trip.uuid).unwrap().is_none());
}

#[test]
fn recommendation_draft_becomes_trip() {
    let conn = open_db_in_memory().unwrap();
    let trips = TripService::new(SqliteTripRepository::try_new(&conn).unwrap());

    let stockholm = find_recommendation("stockholm").unwrap();
    let mut draft = stockholm.to_draft(june(10));
    draft.notes = "archipelago".to_string();

    let trip = trips.create_from_recommendation(stockholm, &draft).unwrap();
    assert_eq!(trip.city, "Stockholm");
    assert_eq!(trip.country, "Sweden");
    assert_eq!(trip.date_to, june(13));

    let listed = trips.list_trips(&TripListQuery::default()).unwrap();
    assert_eq!(listed, vec![trip]);
}
