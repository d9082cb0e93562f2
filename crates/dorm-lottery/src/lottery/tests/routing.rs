use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::lottery::domain::{LotteryScope, StudentStatus};
use crate::lottery::{lottery_router, LotteryFrontDesk, SESSION_HEADER};

fn router_with(pre_data: MemoryLotteryService, realtime: MemoryLotteryService) -> Router {
    let (pre_data, _) = desk_for(LotteryScope::PreData, pre_data);
    let (realtime, _) = desk_for(LotteryScope::Realtime, realtime);
    lottery_router(pre_data, realtime)
}

fn registration(session: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::post("/api/v1/realtime/registrations")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(session) = session {
        builder = builder.header(SESSION_HEADER, session);
    }
    builder
        .body(Body::from(serde_json::to_vec(&body).expect("json body")))
        .expect("request builds")
}

async fn json_body(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn registration_route_admits_and_returns_created() {
    let router = router_with(MemoryLotteryService::default(), MemoryLotteryService::default());

    let response = router
        .oneshot(registration(
            Some("tab-1"),
            json!({ "name": "Avery", "gpa": "3.40", "status": "disabled" }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["student"]["name"], "Avery");
    assert_eq!(body["student"]["disabled"], true);
}

#[tokio::test]
async fn registration_route_accepts_numeric_gpa() {
    let router = router_with(MemoryLotteryService::default(), MemoryLotteryService::default());

    let response = router
        .oneshot(registration(None, json!({ "name": "Sam", "gpa": 4.5 })))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn registration_route_reports_first_rejection_reason() {
    let roster = vec![student("stu-001", "Drew", 2.0, StudentStatus::Disabled)];
    let router = router_with(
        MemoryLotteryService::default(),
        MemoryLotteryService::with_students(roster),
    );

    let response = router
        .oneshot(registration(
            Some("tab-9"),
            json!({ "name": "A", "gpa": "3.0", "status": "disabled" }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = json_body(response).await;
    assert_eq!(body["reason"], "disabled_cap_reached");
}

#[tokio::test]
async fn registration_route_maps_invalid_gpa_to_unprocessable() {
    let router = router_with(MemoryLotteryService::default(), MemoryLotteryService::default());

    let response = router
        .oneshot(registration(None, json!({ "name": "A", "gpa": "abc" })))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json_body(response).await["reason"], "invalid_gpa");
}

#[tokio::test]
async fn same_session_header_is_rejected_on_second_attempt() {
    let (realtime, _) = desk_for(LotteryScope::Realtime, MemoryLotteryService::default());
    let (pre_data, _) = desk_for(LotteryScope::PreData, MemoryLotteryService::default());
    let router = lottery_router(pre_data, realtime);

    let first = router
        .clone()
        .oneshot(registration(Some("tab-1"), json!({ "name": "A", "gpa": "3" })))
        .await
        .expect("router responds");
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = router
        .oneshot(registration(Some("tab-1"), json!({ "name": "B", "gpa": "3" })))
        .await
        .expect("router responds");
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(second).await["reason"], "already_registered");
}

#[tokio::test]
async fn pre_data_route_accepts_repeat_adds_from_one_session() {
    let router = router_with(
        MemoryLotteryService::default().uncapped(),
        MemoryLotteryService::default(),
    );

    for name in ["Avery", "Blake"] {
        let request = Request::post("/api/v1/pre-data/registrations")
            .header(header::CONTENT_TYPE, "application/json")
            .header(SESSION_HEADER, "admin")
            .body(Body::from(
                serde_json::to_vec(&json!({ "name": name, "gpa": "3.0", "status": "disabled" }))
                    .expect("json body"),
            ))
            .expect("request builds");

        let response = router.clone().oneshot(request).await.expect("router responds");
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}

#[tokio::test]
async fn unreachable_roster_returns_service_unavailable() {
    let (realtime, _) = desk_for(LotteryScope::Realtime, UnreachableService);
    let (pre_data, _) = desk_for(LotteryScope::PreData, UnreachableService);
    let router = lottery_router(pre_data, realtime);

    let response = router
        .oneshot(registration(
            Some("tab-1"),
            json!({ "name": "A", "gpa": "3", "status": "corrupt" }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(response).await["reason"], "roster_unavailable");
}

#[tokio::test]
async fn results_route_returns_priority_order_for_realtime() {
    let router = router_with(
        MemoryLotteryService::with_assignments(realtime_board()),
        MemoryLotteryService::with_assignments(realtime_board()),
    );

    let response = router
        .oneshot(
            Request::get("/api/v1/realtime/results")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["policy"], "priority");
    assert_eq!(body["total_students"], 10);
    assert_eq!(body["entries"][0]["room_number"], 2);
    assert_eq!(body["entries"][3]["badge"], "Corrupt Premium");
}

#[tokio::test]
async fn results_route_returns_room_order_for_pre_data() {
    let router = router_with(
        MemoryLotteryService::with_assignments(realtime_board()),
        MemoryLotteryService::default(),
    );

    let response = router
        .oneshot(
            Request::get("/api/v1/pre-data/results")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    let body = json_body(response).await;
    assert_eq!(body["policy"], "room_order");
    assert_eq!(body["entries"][0]["room_number"], 1);
}

#[tokio::test]
async fn delete_route_maps_missing_student_to_not_found() {
    let router = router_with(MemoryLotteryService::default(), MemoryLotteryService::default());

    let response = router
        .oneshot(
            Request::delete("/api/v1/pre-data/students/stu-404")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unreachable_backend_maps_to_bad_gateway() {
    let desk = Arc::new(LotteryFrontDesk::new(
        LotteryScope::PreData,
        Arc::new(UnreachableService),
    ));
    let router = lottery_router(desk.clone(), desk);

    let response = router
        .oneshot(
            Request::get("/api/v1/pre-data/students")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn roster_route_lists_flagged_students_first() {
    let roster = vec![
        student("stu-001", "Ada", 3.0, StudentStatus::Regular),
        student("stu-002", "Ben", 2.0, StudentStatus::Disabled),
        student("stu-003", "Cy", 1.0, StudentStatus::Corrupt),
    ];
    let router = router_with(
        MemoryLotteryService::default(),
        MemoryLotteryService::with_students(roster),
    );

    let response = router
        .oneshot(
            Request::get("/api/v1/realtime/students")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    let body = json_body(response).await;
    assert_eq!(body["count"], 3);
    assert_eq!(body["students"][0]["id"], "stu-003");
    assert_eq!(body["students"][1]["id"], "stu-002");
    assert_eq!(body["students"][2]["id"], "stu-001");
}
