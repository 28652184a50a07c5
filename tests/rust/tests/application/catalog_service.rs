//! CatalogService tests

use pretty_assertions::assert_eq;
use stayhub_core::{PageRequest, PropertyChanges, PropertyFilter, ServiceError, UserRepository};
use tests::fixtures::{
    booking_request, caller_for, days_from_now, stay, test_admin, test_listing, test_review,
    test_room, test_user,
};
use tests::services::ServiceHarness;
use tests::{MockRepositories, NewBooking};

#[tokio::test]
async fn test_create_links_known_amenities_and_rooms() {
    let h = ServiceHarness::new();
    let host = test_user("host@example.com");
    h.repos.users.create(&host).await.unwrap();

    let mut listing = test_listing("Harbour Flat", "Lisbon", 90.0);
    listing.amenities = vec!["Kitchen".into(), "Moat".into(), "WiFi".into()];
    listing.images = vec!["a.jpg".into(), "b.jpg".into()];
    listing.rooms = vec![test_room("Twin", 45.0, 2), test_room("Suite", 80.0, 3)];

    let property = h.catalog.create(&caller_for(&host), listing).await.unwrap();
    assert_eq!(property.host_id, host.id);
    assert_eq!(property.rating, 0.0);
    assert_eq!(property.amenities, vec!["WiFi".to_string(), "Kitchen".to_string()]);

    let detail = h.catalog.get_detail(&property.id).await.unwrap();
    assert_eq!(detail.property.images, vec!["a.jpg".to_string(), "b.jpg".to_string()]);
    let rooms: Vec<_> = detail.rooms.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(rooms, vec!["Twin", "Suite"]);
}

#[tokio::test]
async fn test_create_validates_listing() {
    let h = ServiceHarness::new();
    let host = caller_for(&test_user("host@example.com"));

    let mut no_name = test_listing("", "Oslo", 50.0);
    no_name.name = "   ".into();
    let free = test_listing("Free", "Oslo", 0.0);
    let mut nobody = test_listing("Tiny", "Oslo", 50.0);
    nobody.max_guests = 0;
    let mut bad_room = test_listing("Rooms", "Oslo", 50.0);
    bad_room.rooms = vec![test_room("Broken", -1.0, 2)];

    for listing in [no_name, free, nobody, bad_room] {
        let result = h.catalog.create(&host, listing).await;
        assert!(matches!(result, Err(ServiceError::InvalidRequest(_))), "got {:?}", result);
    }
}

#[tokio::test]
async fn test_list_filters_and_paginates() {
    let h = ServiceHarness::new();
    let host = caller_for(&test_admin("host@example.com"));
    for (name, city, price) in [
        ("Cheap", "Oslo", 40.0),
        ("Middle", "Bergen", 100.0),
        ("Pricey", "Oslo", 300.0),
        ("Villa", "Tromso", 150.0),
        ("Studio", "Oslo", 70.0),
    ] {
        h.catalog.create(&host, test_listing(name, city, price)).await.unwrap();
    }

    let oslo = PropertyFilter {
        destination: Some("oSLo".into()),
        ..Default::default()
    };
    let page = h.catalog.list(&oslo, PageRequest::new(Some(1), Some(2))).await.unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.pages(), 2);

    let second = h.catalog.list(&oslo, PageRequest::new(Some(2), Some(2))).await.unwrap();
    assert_eq!(second.items.len(), 1);

    let past_end = h.catalog.list(&oslo, PageRequest::new(Some(9), Some(2))).await.unwrap();
    assert!(past_end.items.is_empty());
    assert_eq!(past_end.total, 3);

    let band = PropertyFilter {
        min_price: Some(70.0),
        max_price: Some(150.0),
        ..Default::default()
    };
    let mut names: Vec<_> = h
        .catalog
        .list(&band, PageRequest::default())
        .await
        .unwrap()
        .items
        .into_iter()
        .map(|p| p.name)
        .collect();
    names.sort();
    assert_eq!(names, vec!["Middle", "Studio", "Villa"]);
}

#[tokio::test]
async fn test_list_order_is_newest_first() {
    let h = ServiceHarness::new();
    let host = caller_for(&test_admin("host@example.com"));
    let first = h.catalog.create(&host, test_listing("First", "Oslo", 50.0)).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = h.catalog.create(&host, test_listing("Second", "Oslo", 50.0)).await.unwrap();

    let ids: Vec<_> = h
        .catalog
        .list(&PropertyFilter::default(), PageRequest::default())
        .await
        .unwrap()
        .items
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test]
async fn test_availability_filter() {
    let h = ServiceHarness::new();
    let host = test_admin("host@example.com");
    let guest = test_user("guest@example.com");
    let booked = h
        .catalog
        .create(&caller_for(&host), test_listing("Booked", "Oslo", 50.0))
        .await
        .unwrap();
    let free = h
        .catalog
        .create(&caller_for(&host), test_listing("Free", "Oslo", 50.0))
        .await
        .unwrap();
    h.bookings
        .create(&caller_for(&guest), booking_request(&booked.id, "2024-06-01", "2024-06-05", 1))
        .await
        .unwrap();

    let filter = PropertyFilter {
        available: Some(stay("2024-06-05", "2024-06-07")),
        ..Default::default()
    };
    let ids: Vec<_> = h
        .catalog
        .list(&filter, PageRequest::default())
        .await
        .unwrap()
        .items
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec![free.id]);
}

#[tokio::test]
async fn test_detail_includes_reviews_and_unknown_is_not_found() {
    let repos = MockRepositories::new();
    let h = ServiceHarness::with_repos(repos.clone());
    let host = test_admin("host@example.com");
    let reviewer = test_user("rita@example.com");
    let property = h
        .catalog
        .create(&caller_for(&host), test_listing("Reviewed", "Oslo", 50.0))
        .await
        .unwrap();
    let _ = repos.with_review(test_review(&property.id, &reviewer, 4.5, "Lovely"));

    let detail = h.catalog.get_detail(&property.id).await.unwrap();
    assert_eq!(detail.reviews.len(), 1);
    assert_eq!(detail.reviews[0].reviewer_first_name, reviewer.first_name);

    assert!(matches!(
        h.catalog.get_detail("missing").await,
        Err(ServiceError::NotFound(_))
    ));
    assert!(matches!(
        h.catalog.property_exists("missing").await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_update_requires_host_or_admin() {
    let h = ServiceHarness::new();
    let host = test_user("host@example.com");
    let stranger = test_user("stranger@example.com");
    let admin = test_admin("admin@example.com");
    let property = h
        .catalog
        .create(&caller_for(&host), test_listing("Mine", "Oslo", 50.0))
        .await
        .unwrap();

    let changes = || PropertyChanges {
        price_per_night: Some(75.0),
        ..Default::default()
    };

    assert!(matches!(
        h.catalog.update(&caller_for(&stranger), &property.id, changes()).await,
        Err(ServiceError::Forbidden(_))
    ));
    assert!(matches!(
        h.catalog.update(&caller_for(&host), "missing", changes()).await,
        Err(ServiceError::NotFound(_))
    ));
    assert!(matches!(
        h.catalog
            .update(
                &caller_for(&host),
                &property.id,
                PropertyChanges {
                    price_per_night: Some(-5.0),
                    ..Default::default()
                }
            )
            .await,
        Err(ServiceError::InvalidRequest(_))
    ));

    let updated = h.catalog.update(&caller_for(&host), &property.id, changes()).await.unwrap();
    assert_eq!(updated.price_per_night, 75.0);
    assert_eq!(updated.images, property.images);

    let by_admin = h
        .catalog
        .update(
            &caller_for(&admin),
            &property.id,
            PropertyChanges {
                name: Some("Renamed".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(by_admin.name, "Renamed");
    assert_eq!(by_admin.price_per_night, 75.0);
}

#[tokio::test]
async fn test_delete_refused_with_upcoming_bookings() {
    let h = ServiceHarness::new();
    let host = test_user("host@example.com");
    let guest = test_user("guest@example.com");
    let property = h
        .catalog
        .create(&caller_for(&host), test_listing("Busy", "Oslo", 50.0))
        .await
        .unwrap();

    let upcoming = h
        .bookings
        .create(
            &caller_for(&guest),
            NewBooking {
                property_id: property.id.clone(),
                room_id: None,
                check_in: days_from_now(10),
                check_out: days_from_now(12),
                guests: 1,
                total_price: None,
            },
        )
        .await
        .unwrap();

    assert!(matches!(
        h.catalog.delete(&caller_for(&guest), &property.id).await,
        Err(ServiceError::Forbidden(_))
    ));
    assert!(matches!(
        h.catalog.delete(&caller_for(&host), &property.id).await,
        Err(ServiceError::Conflict(_))
    ));

    h.bookings.cancel(&caller_for(&guest), &upcoming.id).await.unwrap();
    h.catalog.delete(&caller_for(&host), &property.id).await.unwrap();

    assert!(matches!(
        h.catalog.get_detail(&property.id).await,
        Err(ServiceError::NotFound(_))
    ));
    assert_eq!(h.repos.booking_count(), 0);
    assert!(matches!(
        h.catalog.delete(&caller_for(&host), &property.id).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_past_bookings_do_not_block_delete() {
    let h = ServiceHarness::new();
    let host = test_user("host@example.com");
    let property = h
        .catalog
        .create(&caller_for(&host), test_listing("Old", "Oslo", 50.0))
        .await
        .unwrap();
    h.bookings
        .create(&caller_for(&host), booking_request(&property.id, "2020-01-01", "2020-01-03", 1))
        .await
        .unwrap();

    h.catalog.delete(&caller_for(&host), &property.id).await.unwrap();
}
