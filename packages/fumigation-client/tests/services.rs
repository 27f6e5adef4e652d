//! Resource services over a scripted backend.

use chrono::{NaiveDate, NaiveTime};
use fumigation_client::services::NewUser;
use fumigation_client::testing::{mock_client, MockTransport};
use fumigation_client::{
    filter_by_bucket, ClientError, CreateApplication, EntityId, FormMode, Listing, Lot, LotStatus,
    NewLot, PageRequest, ReportForm, Signature, SignatureKind, StatusBucket,
};
use reqwest::Method;
use serde_json::json;

#[tokio::test]
async fn paged_applications_are_listed_and_bucketed() {
    let page = json!({
        "content": [
            {"id": 1, "estado": "PENDIENTE", "empresa": "Cacao SA"},
            {"id": 2, "status": "APPROVED", "lots": [{"id": 10, "status": "COMPLETED"}]},
            {"id": 3, "status": "APPROVED", "lots": [{"id": 11, "status": "IN_SERVICE"}]}
        ],
        "totalElements": 3,
        "totalPages": 1,
        "number": 0,
        "size": 20,
        "first": true,
        "last": true
    });
    let transport =
        MockTransport::new().with_json(Method::GET, "/fumigation-applications", 200, page);
    let client = mock_client(&transport);

    let listing = client
        .applications()
        .list(PageRequest::default())
        .await
        .unwrap()
        .into_data()
        .unwrap();

    assert!(matches!(listing, Listing::Paged(_)));
    assert_eq!(listing.total(), 3);
    assert!(!listing.has_next());
    let items = listing.items();
    assert_eq!(filter_by_bucket(items, StatusBucket::Pending).len(), 1);
    assert_eq!(filter_by_bucket(items, StatusBucket::Finished)[0].id, EntityId::from(2));
    assert_eq!(filter_by_bucket(items, StatusBucket::InProgress)[0].id, EntityId::from(3));

    let query = &transport.calls()[0].query;
    assert!(query.contains(&("page".to_string(), "0".to_string())));
    assert!(query.contains(&("size".to_string(), "20".to_string())));
}

#[tokio::test]
async fn plain_arrays_are_accepted() {
    let transport = MockTransport::new().with_json(
        Method::GET,
        "/fumigation-applications/mine",
        200,
        json!([{"id": 5, "status": "PENDING"}]),
    );
    let client = mock_client(&transport);

    let mine = client.applications().mine().await.unwrap().into_data().unwrap();

    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, EntityId::from(5));
}

#[tokio::test]
async fn rejection_needs_a_reason() {
    let transport = MockTransport::new().with_json(
        Method::PUT,
        "/fumigation-applications/4/reject",
        200,
        json!({"id": 4, "status": "REJECTED", "rejectionReason": "incomplete"}),
    );
    let client = mock_client(&transport);
    let id = EntityId::from(4);

    let blank = client.applications().reject(&id, "   ").await;
    assert!(matches!(blank, Err(ClientError::Validation(_))));
    assert!(transport.calls().is_empty());

    let rejected = client
        .applications()
        .reject(&id, "incomplete")
        .await
        .unwrap()
        .into_data()
        .unwrap();
    assert_eq!(rejected.rejection_reason.as_deref(), Some("incomplete"));
    assert_eq!(transport.calls()[0].body, Some(json!({"reason": "incomplete"})));
}

#[tokio::test]
async fn application_needs_lots() {
    let client = mock_client(&MockTransport::new());
    let empty = CreateApplication {
        company_id: None,
        location: "Port".to_string(),
        lots: vec![],
    };
    assert!(matches!(
        client.applications().create(&empty).await,
        Err(ClientError::Validation(_))
    ));

    let weightless = CreateApplication {
        lots: vec![NewLot {
            code: "L-1".to_string(),
            tons: 0.0,
            scheduled_date: None,
        }],
        ..empty
    };
    assert!(client.applications().create(&weightless).await.is_err());
}

#[tokio::test]
async fn lot_status_only_moves_forward() {
    let transport = MockTransport::new().with_json(
        Method::PUT,
        "/fumigations/7/status",
        200,
        json!({"id": 7, "status": "COMPLETED"}),
    );
    let client = mock_client(&transport);
    let lot: Lot = serde_json::from_value(json!({"id": 7, "estado": "EN_SERVICIO"})).unwrap();

    let backwards = client.lots().update_status(&lot, LotStatus::Pending).await;
    assert!(matches!(backwards, Err(ClientError::Validation(_))));
    assert!(transport.calls().is_empty());

    let done = client
        .lots()
        .update_status(&lot, LotStatus::Completed)
        .await
        .unwrap()
        .into_data()
        .unwrap();
    assert_eq!(done.status, LotStatus::Completed);
    assert_eq!(transport.calls()[0].body, Some(json!({"status": "COMPLETED"})));

    assert!(client
        .lots()
        .update_status(&done, LotStatus::InService)
        .await
        .is_err());
}

#[tokio::test]
async fn users_are_filtered_by_canonical_role() {
    let transport = MockTransport::new().with_json(
        Method::GET,
        "/users",
        200,
        json!([{"id": 2, "email": "t@x.com", "roles": [{"name": "TECNICO"}]}]),
    );
    let client = mock_client(&transport);

    let users = client
        .users()
        .list(PageRequest::new(1, 10), Some("tecnico"))
        .await
        .unwrap()
        .into_data()
        .unwrap();

    assert_eq!(users.len(), 1);
    assert_eq!(users.items()[0].roles[0].name, "ROLE_TECHNICIAN");
    let query = &transport.calls()[0].query;
    assert!(query.contains(&("role".to_string(), "ROLE_TECHNICIAN".to_string())));
    assert!(query.contains(&("page".to_string(), "1".to_string())));
}

#[tokio::test]
async fn user_creation_sends_canonical_roles() {
    let transport = MockTransport::new().with_json(
        Method::POST,
        "/users",
        201,
        json!({"id": 9, "email": "new@x.com", "roles": ["ROLE_CLIENT"]}),
    );
    let client = mock_client(&transport);
    let new_user = NewUser {
        first_name: "Luz".into(),
        last_name: "Vega".into(),
        email: " new@x.com ".into(),
        password: "pw".into(),
        roles: vec!["cliente".into()],
    };

    let created = client.users().create(&new_user).await.unwrap().into_data().unwrap();

    assert_eq!(created.id, Some(EntityId::from(9)));
    let body = transport.calls()[0].body.clone().unwrap();
    assert_eq!(body["email"], "new@x.com");
    assert_eq!(body["roles"], json!(["ROLE_CLIENT"]));
}

#[tokio::test]
async fn invalid_reports_are_not_sent() {
    let client_transport = MockTransport::new().with_json(
        Method::POST,
        "/reports/fumigation",
        201,
        json!({
            "id": 3, "lotId": 7, "date": "2024-03-10", "startTime": "08:00:00",
            "endTime": "10:00:00", "location": "Silo 2"
        }),
    );
    let client = mock_client(&client_transport);

    let mut form = ReportForm::new(FormMode::Admin);
    form.lot_id = Some(EntityId::from(7));
    form.date = NaiveDate::from_ymd_opt(2024, 3, 10);
    form.start_time = NaiveTime::from_hms_opt(8, 0, 0);
    form.end_time = NaiveTime::from_hms_opt(10, 0, 0);
    form.location = "Silo 2".to_string();
    let report = form
        .into_fumigation_on(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap())
        .unwrap();

    let mut broken = report.clone();
    broken.end_time = NaiveTime::from_hms_opt(7, 0, 0).unwrap();
    assert!(client.reports().submit_fumigation(&broken).await.is_err());
    assert!(client_transport.calls().is_empty());

    let saved = client
        .reports()
        .submit_fumigation(&report)
        .await
        .unwrap()
        .into_data()
        .unwrap();
    assert_eq!(saved.id, Some(EntityId::from(3)));
}

#[tokio::test]
async fn signatures_round_trip_png_bytes() {
    let png = [0x89u8, b'P', b'N', b'G'];
    let signature = Signature::from_png(EntityId::from(3), SignatureKind::Client, "Ana", &png);
    let transport = MockTransport::new().with_json(
        Method::GET,
        "/signatures/report/3",
        200,
        json!([signature]),
    );
    let client = mock_client(&transport);

    let mut blank = signature.clone();
    blank.signer_name = " ".into();
    assert!(client.reports().sign(&blank).await.is_err());

    let listed = client
        .reports()
        .signatures(&EntityId::from(3))
        .await
        .unwrap()
        .into_data()
        .unwrap();
    assert_eq!(listed[0].png_bytes().unwrap(), png.to_vec());
}

#[tokio::test]
async fn dashboard_reports_first_failure() {
    let transport = MockTransport::new()
        .with_json(Method::GET, "/fumigation-applications", 200, json!([]))
        .with_json(Method::GET, "/fumigations", 200, json!([]))
        .with_response(Method::GET, "/users", 500, "boom");
    let client = mock_client(&transport);

    let summary = client.dashboard().summary().await.unwrap();

    assert_eq!(summary.failure().and_then(|f| f.status), Some(500));
}

#[tokio::test]
async fn dashboard_counts_everything() {
    let transport = MockTransport::new()
        .with_json(
            Method::GET,
            "/fumigation-applications",
            200,
            json!([{"id": 1, "status": "PENDING"}, {"id": 2, "status": "REJECTED"}]),
        )
        .with_json(Method::GET, "/fumigations", 200, json!([{"id": 1, "status": "PENDING"}]))
        .with_json(
            Method::GET,
            "/users",
            200,
            json!({"content": [{"id": 1, "email": "a@x.com", "roles": ["ROLE_ADMIN"]}], "totalElements": 1}),
        );
    let client = mock_client(&transport);

    let summary = client.dashboard().summary().await.unwrap().into_data().unwrap();

    assert_eq!(summary.applications.pending, 1);
    assert_eq!(summary.applications.finished, 1);
    assert_eq!(summary.lots_by_status.get("PENDING"), Some(&1));
    assert_eq!(summary.users_by_role.get("ROLE_ADMIN"), Some(&1));
}
