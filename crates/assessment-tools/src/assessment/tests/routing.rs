use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::assessment::extract::ApiQuery;
use crate::assessment::router;
use crate::assessment::AssessmentService;

async fn send(router: &axum::Router, request: Request<Body>) -> Response {
    router.clone().oneshot(request).await.expect("route executes")
}

fn post_json(uri: &str, payload: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

fn patch(uri: &str) -> Request<Body> {
    Request::patch(uri).body(Body::empty()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn create_event_route_returns_created() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = send(
        &router,
        post_json(
            "/api/v1/events",
            json!({ "name": "Autumn demo day", "event_date": "2026-10-30" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["name"], "Autumn demo day");
    assert_eq!(payload["status"], "draft");
    assert_eq!(payload["event_date"], "2026-10-30");
}

#[tokio::test]
async fn blank_event_name_is_a_bad_request() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = send(&router, post_json("/api/v1/events", json!({ "name": "" }))).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert_eq!(payload["code"], "validation_error");
}

#[tokio::test]
async fn rating_route_distinguishes_create_and_replace() {
    let fixture = fixture();
    let router = router_with_service(fixture.service.clone());
    let body = json!({
        "event_id": fixture.event.id,
        "expert_id": fixture.alice.id,
        "entity_id": fixture.team_one.id,
        "items": [
            { "criterion_name": "Working solution", "score": 5 },
            { "criterion_name": "Technological complexity", "score": 3 }
        ]
    });

    let first = send(&router, post_json("/api/v1/ratings", body.clone())).await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let created = read_json_body(first).await;
    assert_eq!(created["total_score"], 8);

    let second = send(&router, post_json("/api/v1/ratings", body)).await;
    assert_eq!(second.status(), StatusCode::OK);
    let replaced = read_json_body(second).await;
    assert_eq!(replaced["id"], created["id"]);

    let listed = send(
        &router,
        get(&format!("/api/v1/experts/{}/ratings", fixture.alice.id)),
    )
    .await;
    assert_eq!(listed.status(), StatusCode::OK);
    let ratings = read_json_body(listed).await;
    assert_eq!(ratings.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn invalid_score_names_the_criterion() {
    let fixture = fixture();
    let router = router_with_service(fixture.service.clone());

    let response = send(
        &router,
        post_json(
            "/api/v1/ratings",
            json!({
                "event_id": fixture.event.id,
                "expert_id": fixture.alice.id,
                "entity_id": fixture.team_one.id,
                "items": [{ "criterion_name": "Working solution", "score": 6 }]
            }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["code"], "invalid_score");
    assert_eq!(payload["criterion"], "Working solution");
}

#[tokio::test]
async fn negative_score_is_an_invalid_score_for_its_criterion() {
    let fixture = fixture();
    let router = router_with_service(fixture.service.clone());

    let response = send(
        &router,
        post_json(
            "/api/v1/ratings",
            json!({
                "event_id": fixture.event.id,
                "expert_id": fixture.alice.id,
                "entity_id": fixture.team_one.id,
                "items": [{ "criterion_name": "Working solution", "score": -1 }]
            }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["code"], "invalid_score");
    assert_eq!(payload["criterion"], "Working solution");
    assert!(fixture
        .service
        .ratings(&Default::default())
        .expect("listed")
        .is_empty());
}

#[tokio::test]
async fn malformed_bodies_use_the_error_contract() {
    let fixture = fixture();
    let router = router_with_service(fixture.service.clone());

    let wrong_type = send(
        &router,
        post_json(
            "/api/v1/ratings",
            json!({
                "event_id": fixture.event.id,
                "expert_id": fixture.alice.id,
                "entity_id": fixture.team_one.id,
                "items": [{ "criterion_name": "Working solution", "score": "five" }]
            }),
        ),
    )
    .await;
    assert_eq!(wrong_type.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(wrong_type).await;
    assert_eq!(payload["code"], "validation_error");
    assert!(payload["error"].is_string());

    let not_json = send(
        &router,
        Request::post("/api/v1/events")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{ name"))
            .unwrap(),
    )
    .await;
    assert_eq!(not_json.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json_body(not_json).await["code"], "validation_error");
}

#[tokio::test]
async fn malformed_queries_use_the_error_contract() {
    let fixture = fixture();
    let router = router_with_service(fixture.service.clone());

    for query in ["kind=squad", "n=2", "kind=team&n=abc"] {
        let response = send(
            &router,
            get(&format!(
                "/api/v1/events/{}/top?{query}",
                fixture.event.id
            )),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "query {query}");
        let payload = read_json_body(response).await;
        assert_eq!(payload["code"], "validation_error", "query {query}");
    }

    let listing = send(
        &router,
        get(&format!(
            "/api/v1/events/{}/entities?kind=squad",
            fixture.event.id
        )),
    )
    .await;
    assert_eq!(listing.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json_body(listing).await["code"], "validation_error");
}

#[tokio::test]
async fn voting_routes_drive_the_hand_over() {
    let fixture = fixture();
    let router = router_with_service(fixture.service.clone());

    let idle = send(
        &router,
        get(&format!("/api/v1/events/{}/active-entity", fixture.event.id)),
    )
    .await;
    assert_eq!(idle.status(), StatusCode::OK);
    assert_eq!(read_json_body(idle).await, Value::Null);

    for entity in [&fixture.team_one, &fixture.team_two] {
        let response = send(
            &router,
            patch(&format!(
                "/api/v1/entities/{}/activate-for-voting",
                entity.id
            )),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let active = send(
        &router,
        get(&format!("/api/v1/events/{}/active-entity", fixture.event.id)),
    )
    .await;
    let payload = read_json_body(active).await;
    assert_eq!(payload["id"], fixture.team_two.id.as_str());
    assert_eq!(payload["voting_status"], "evaluating");

    let stopped = send(
        &router,
        patch(&format!(
            "/api/v1/events/{}/stop-all-voting",
            fixture.event.id
        )),
    )
    .await;
    assert_eq!(stopped.status(), StatusCode::OK);
    assert_eq!(
        read_json_body(stopped).await,
        json!({ "modified_count": 1 })
    );
}

#[tokio::test]
async fn activating_a_disabled_entity_conflicts() {
    let fixture = fixture();
    let router = router_with_service(fixture.service.clone());

    let toggled = send(
        &router,
        patch(&format!(
            "/api/v1/entities/{}/toggle-active",
            fixture.team_one.id
        )),
    )
    .await;
    assert_eq!(read_json_body(toggled).await["is_active"], false);

    let response = send(
        &router,
        patch(&format!(
            "/api/v1/entities/{}/activate-for-voting",
            fixture.team_one.id
        )),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(read_json_body(response).await["code"], "inactive_entity");
}

#[tokio::test]
async fn unknown_entities_are_not_found() {
    let fixture = fixture();
    let router = router_with_service(fixture.service.clone());

    let response = send(
        &router,
        patch("/api/v1/entities/team-missing/stop-voting"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert_eq!(payload["code"], "not_found");
    assert!(payload["error"]
        .as_str()
        .is_some_and(|message| message.contains("team-missing")));
}

#[tokio::test]
async fn top_route_applies_kind_and_size() {
    let fixture = fixture();
    fixture.rate(&fixture.alice, &fixture.team_one, vec![item("Working solution", 4)]);
    fixture.rate(&fixture.bob, &fixture.team_two, vec![item("Working solution", 5)]);
    let router = router_with_service(fixture.service.clone());

    let response = send(
        &router,
        get(&format!(
            "/api/v1/events/{}/top?kind=team&n=1",
            fixture.event.id
        )),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let entries = payload.as_array().expect("array payload");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["entity"]["id"], fixture.team_two.id.as_str());
    assert_eq!(entries[0]["total_score"], 5.0);

    let empty = send(
        &router,
        get(&format!(
            "/api/v1/events/{}/top?kind=team&n=0",
            fixture.event.id
        )),
    )
    .await;
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

    let board = send(
        &router,
        get(&format!("/api/v1/events/{}/leaderboard", fixture.event.id)),
    )
    .await;
    let payload = read_json_body(board).await;
    assert_eq!(payload["teams"].as_array().map(Vec::len), Some(2));
    assert_eq!(payload["participants"], json!([]));
}

#[tokio::test]
async fn session_routes_resolve_tokens() {
    let fixture = fixture();
    fixture
        .service
        .activate_for_voting(&fixture.team_one.id)
        .expect("opened");
    let router = router_with_service(fixture.service.clone());

    let session = send(
        &router,
        get(&format!("/api/v1/sessions/{}", fixture.bob.token.as_str())),
    )
    .await;
    assert_eq!(session.status(), StatusCode::OK);
    let payload = read_json_body(session).await;
    assert_eq!(payload["expert"]["full_name"], "Bob Jury");
    assert_eq!(payload["active_entity"]["id"], fixture.team_one.id.as_str());
    assert_eq!(payload["existing_rating"], Value::Null);

    let submitted = send(
        &router,
        post_json(
            &format!("/api/v1/sessions/{}/ratings", fixture.bob.token.as_str()),
            json!({
                "entity_id": fixture.team_one.id,
                "items": [{ "criterion_name": "Quality of information delivery", "score": 5 }]
            }),
        ),
    )
    .await;
    assert_eq!(submitted.status(), StatusCode::CREATED);

    let unknown = send(&router, get("/api/v1/sessions/not-a-token")).await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn statistics_handler_reports_store_outage() {
    let service = Arc::new(AssessmentService::new(Arc::new(UnavailableStore), config()));

    let result = router::statistics::<UnavailableStore>(
        State(service),
        Path("event-1".to_string()),
        ApiQuery(router::KindQuery::default()),
    )
    .await;

    let response = match result {
        Ok(_) => panic!("store outage must fail"),
        Err(err) => axum::response::IntoResponse::into_response(err),
    };
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(read_json_body(response).await["code"], "store_unavailable");
}

#[tokio::test]
async fn default_criteria_route_loads_the_rubric() {
    let fixture = fixture();
    let router = router_with_service(fixture.service.clone());

    let response = send(
        &router,
        Request::post(format!(
            "/api/v1/events/{}/criteria/default",
            fixture.event.id
        ))
        .body(Body::empty())
        .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let listed = send(
        &router,
        get(&format!(
            "/api/v1/events/{}/criteria?kind=participant",
            fixture.event.id
        )),
    )
    .await;
    let payload = read_json_body(listed).await;
    let blocks = payload.as_array().expect("array payload");
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0]["applies_to"], "participant");
}
