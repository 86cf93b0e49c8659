use axum::body::Body;
use axum::http::{Request, StatusCode};
use library_loans::api::handlers::AppState;
use library_loans::api::router::create_router;
use library_loans::api::types::*;
use library_loans::domain::*;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

mod common;

use common::InMemoryLibrary;

// ============================================================================
// APIテスト用のヘルパー関数
// ============================================================================

fn setup_app(library: &InMemoryLibrary) -> axum::Router {
    let app_state = Arc::new(AppState {
        service_deps: library.deps(),
        default_loan_days: LoanDays::DEFAULT,
    });

    create_router(app_state)
}

/// リクエストを送り、ステータスとJSONボディを返す
async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}

// ============================================================================
// 正常系フロー
// ============================================================================

#[tokio::test]
async fn test_full_loan_flow() {
    let library = InMemoryLibrary::new();
    let book_id = library.add_book("Tenggelamnya Kapal", 1);
    let member_id = library.add_active_member("Alice");
    let app = setup_app(&library);

    // Step 1: 貸出作成（POST /loans）
    let (status, body) = send(
        &app,
        "POST",
        "/loans",
        Some(json!({
            "book_id": book_id.value(),
            "member_id": member_id.value(),
            "staff_id": StaffId::new().value(),
            "notes": "hardcover",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let created: LoanResponse = serde_json::from_value(body).unwrap();
    assert_eq!(created.status, "active");
    assert_eq!(created.book_id, book_id.value());
    assert_eq!(created.member_id, member_id.value());
    assert_eq!(created.due_date, created.borrow_date + chrono::Duration::days(7));
    assert_eq!(library.available(book_id), 0);

    // Step 2: 貸出詳細取得（GET /loans/:id）
    let (status, body) = send(&app, "GET", &format!("/loans/{}", created.loan_id), None).await;
    assert_eq!(status, StatusCode::OK);
    let fetched: LoanResponse = serde_json::from_value(body).unwrap();
    assert_eq!(fetched.loan_id, created.loan_id);
    assert_eq!(fetched.notes, "hardcover");

    // Step 3: 返却（POST /loans/:id/return、ボディなし）
    let (status, body) = send(
        &app,
        "POST",
        &format!("/loans/{}/return", created.loan_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let returned: LoanResponse = serde_json::from_value(body).unwrap();
    assert_eq!(returned.status, "returned");
    assert!(returned.return_date.is_some());
    assert!(returned.fine.is_zero());
    assert_eq!(library.available(book_id), 1);

    // Step 4: 2回目の返却は409
    let (status, body) = send(
        &app,
        "POST",
        &format!("/loans/{}/return", created.loan_id),
        Some(json!({ "notes": "again" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "ALREADY_RETURNED");
    assert_eq!(body["message"], "Loan has already been returned");
}

#[tokio::test]
async fn test_create_loan_with_custom_days() {
    let library = InMemoryLibrary::new();
    let book_id = library.add_book("Sang Pemimpi", 2);
    let member_id = library.add_active_member("Alice");
    let app = setup_app(&library);

    let (status, body) = send(
        &app,
        "POST",
        "/loans",
        Some(json!({
            "book_id": book_id.value(),
            "member_id": member_id.value(),
            "loan_days": 14,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let created: LoanResponse = serde_json::from_value(body).unwrap();
    assert_eq!(created.due_date, created.borrow_date + chrono::Duration::days(14));
    assert_eq!(created.staff_id, None);

    // 0以下は既定値
    let (_, body) = send(
        &app,
        "POST",
        "/loans",
        Some(json!({
            "book_id": book_id.value(),
            "member_id": member_id.value(),
            "loan_days": 0,
        })),
    )
    .await;
    let created: LoanResponse = serde_json::from_value(body).unwrap();
    assert_eq!(created.due_date, created.borrow_date + chrono::Duration::days(7));
}

// ============================================================================
// エラーレスポンス
// ============================================================================

#[tokio::test]
async fn test_create_loan_error_statuses() {
    let library = InMemoryLibrary::new();
    let book_id = library.add_book("Atheis", 1);
    let empty_book = library.add_book("Out of print", 0);
    let member_id = library.add_active_member("Alice");
    let inactive_id = library.add_inactive_member("Dormant");
    let app = setup_app(&library);

    let cases = [
        (book_id.value(), inactive_id.value(), StatusCode::CONFLICT, "MEMBER_INACTIVE"),
        (book_id.value(), MemberId::new().value(), StatusCode::NOT_FOUND, "MEMBER_NOT_FOUND"),
        (BookId::new().value(), member_id.value(), StatusCode::NOT_FOUND, "BOOK_NOT_FOUND"),
        (empty_book.value(), member_id.value(), StatusCode::CONFLICT, "BOOK_UNAVAILABLE"),
    ];

    for (book, member, expected_status, expected_code) in cases {
        let (status, body) = send(
            &app,
            "POST",
            "/loans",
            Some(json!({ "book_id": book, "member_id": member })),
        )
        .await;

        assert_eq!(status, expected_status);
        assert_eq!(body["error"], expected_code);
    }

    assert_eq!(library.available(book_id), 1);
}

#[tokio::test]
async fn test_unknown_loan_returns_not_found() {
    let library = InMemoryLibrary::new();
    let app = setup_app(&library);

    let (status, body) = send(&app, "GET", &format!("/loans/{}", LoanId::new()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "LOAN_NOT_FOUND");

    let (status, _) = send(
        &app,
        "POST",
        &format!("/loans/{}/return", LoanId::new()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_status_filter_is_bad_request() {
    let library = InMemoryLibrary::new();
    let app = setup_app(&library);

    let (status, body) = send(&app, "GET", "/loans?status=lost", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

// ============================================================================
// 一覧・集計・延滞検出
// ============================================================================

#[tokio::test]
async fn test_list_and_stats_endpoints() {
    let library = InMemoryLibrary::new();
    let book_id = library.add_book("Max Havelaar", 3);
    let alice = library.add_active_member("Alice");
    let bob = library.add_active_member("Bob");
    let app = setup_app(&library);

    for member in [alice, alice, bob] {
        let (status, _) = send(
            &app,
            "POST",
            "/loans",
            Some(json!({ "book_id": book_id.value(), "member_id": member.value() })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, "GET", &format!("/members/{}/loans", alice), None).await;
    assert_eq!(status, StatusCode::OK);
    let loans: Vec<LoanResponse> = serde_json::from_value(body).unwrap();
    assert_eq!(loans.len(), 2);
    assert!(loans.iter().all(|l| l.member_id == alice.value()));

    let (status, body) = send(
        &app,
        "GET",
        &format!("/loans?member_id={}&status=active", bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let loans: Vec<LoanResponse> = serde_json::from_value(body).unwrap();
    assert_eq!(loans.len(), 1);

    let (status, body) = send(&app, "GET", "/stats/loans", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "active": 3, "overdue": 0 }));

    // 期限内なので通知は作られない
    let (status, body) = send(&app, "POST", "/overdue/check", None).await;
    assert_eq!(status, StatusCode::OK);
    let check: OverdueCheckResponse = serde_json::from_value(body).unwrap();
    assert_eq!(check.notifications_created, 0);
}

#[tokio::test]
async fn test_health_check() {
    let library = InMemoryLibrary::new();
    let app = setup_app(&library);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

// ============================================================================
// 返却ボディの検証
// ============================================================================

/// 生のボディでリクエストを送る
async fn send_raw(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: &'static str,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_malformed_return_body_is_rejected() {
    let library = InMemoryLibrary::new();
    let book_id = library.add_book("Bumi Manusia", 1);
    let member_id = library.add_active_member("Alice");
    let app = setup_app(&library);

    let (_, body) = send(
        &app,
        "POST",
        "/loans",
        Some(json!({ "book_id": book_id.value(), "member_id": member_id.value() })),
    )
    .await;
    let created: LoanResponse = serde_json::from_value(body).unwrap();
    let uri = format!("/loans/{}/return", created.loan_id);

    for malformed in [r#"{"notes": 5}"#, r#"{"notes": "#, "not json"] {
        let (status, body) = send_raw(&app, "POST", &uri, malformed).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", malformed);
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }

    // 拒否されたリクエストでは返却されない
    let (_, body) = send(&app, "GET", &format!("/loans/{}", created.loan_id), None).await;
    assert_eq!(body["status"], "active");
    assert_eq!(library.available(book_id), 0);

    // 空白だけのボディは省略と同じ
    let (status, body) = send_raw(&app, "POST", &uri, "  \n").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "returned");
    assert_eq!(library.available(book_id), 1);
}

#[tokio::test]
async fn test_return_body_notes_are_appended() {
    let library = InMemoryLibrary::new();
    let book_id = library.add_book("Cantik Itu Luka", 1);
    let member_id = library.add_active_member("Alice");
    let app = setup_app(&library);

    let (_, body) = send(
        &app,
        "POST",
        "/loans",
        Some(json!({
            "book_id": book_id.value(),
            "member_id": member_id.value(),
            "notes": "cover torn",
        })),
    )
    .await;
    let created: LoanResponse = serde_json::from_value(body).unwrap();

    let (status, body) = send_raw(
        &app,
        "POST",
        &format!("/loans/{}/return", created.loan_id),
        r#"{"notes": "returned at desk"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let returned: LoanResponse = serde_json::from_value(body).unwrap();
    assert!(returned.notes.contains("cover torn"));
    assert!(returned.notes.contains("returned at desk"));
}

// ============================================================================
// 取引レポートと会員通知
// ============================================================================

/// 過去の日時で貸出を作る（APIは現在時刻で記録するため）
async fn seed_loan(
    library: &InMemoryLibrary,
    book_id: BookId,
    member_id: MemberId,
    borrowed_at: chrono::DateTime<chrono::Utc>,
) -> LoanId {
    use library_loans::application::loan::create_loan;
    use library_loans::domain::commands::CreateLoan;

    let cmd = CreateLoan {
        member_id,
        book_id,
        loan_days: LoanDays::DEFAULT,
        recorded_by: None,
        notes: String::new(),
        borrowed_at,
    };
    create_loan(&library.deps(), cmd).await.unwrap()
}

#[tokio::test]
async fn test_loan_report_endpoint() {
    use chrono::{TimeZone, Utc};

    let library = InMemoryLibrary::new();
    let book_id = library.add_book("Ronggeng Dukuh Paruk", 3);
    let member_id = library.add_active_member("Alice");
    let app = setup_app(&library);

    seed_loan(
        &library,
        book_id,
        member_id,
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
    )
    .await;
    seed_loan(
        &library,
        book_id,
        member_id,
        Utc.with_ymd_and_hms(2024, 3, 2, 9, 0, 0).unwrap(),
    )
    .await;
    seed_loan(
        &library,
        book_id,
        member_id,
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
    )
    .await;

    let (status, body) = send(
        &app,
        "GET",
        "/reports/loans?from=2024-03-01T00:00:00Z&to=2024-03-31T23:59:59Z",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let report: LoanReportResponse = serde_json::from_value(body).unwrap();
    assert_eq!(report.total, 2);
    assert_eq!(report.active, 2);
    assert_eq!(report.returned, 0);
    assert!(report.total_fine.is_zero());
    assert_eq!(report.loans.len(), 2);
    assert!(report.from.is_some());

    let (status, body) = send(&app, "GET", "/reports/loans", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);

    let (status, body) = send(
        &app,
        "GET",
        "/reports/loans?from=2024-04-01T00:00:00Z&to=2024-03-01T00:00:00Z",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_member_notification_endpoints() {
    use chrono::{TimeZone, Utc};

    let library = InMemoryLibrary::new();
    let book_id = library.add_book("Saman", 3);
    let alice = library.add_active_member("Alice");
    let bob = library.add_active_member("Bob");
    let app = setup_app(&library);

    let long_ago = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
    seed_loan(&library, book_id, alice, long_ago).await;
    seed_loan(&library, book_id, alice, long_ago + chrono::Duration::hours(1)).await;
    seed_loan(&library, book_id, bob, long_ago).await;

    let (status, body) = send(&app, "POST", "/overdue/check", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notifications_created"], 3);

    let uri = format!("/members/{}/notifications", alice);
    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let inbox: MemberNotificationsResponse = serde_json::from_value(body).unwrap();
    assert_eq!(inbox.unread, 2);
    assert_eq!(inbox.notifications.len(), 2);
    assert!(inbox.notifications.iter().all(|n| n.kind == "overdue"));
    assert!(inbox.notifications.iter().all(|n| n.member_id == alice.value()));

    let (_, body) = send(&app, "GET", &format!("{}?limit=1", uri), None).await;
    assert_eq!(body["notifications"].as_array().unwrap().len(), 1);
    assert_eq!(body["unread"], 2);

    // 1件を既読にする
    let first = inbox.notifications[0].notification_id;
    let (status, _) = send(&app, "POST", &format!("{}/{}/read", uri, first), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(body["unread"], 1);

    // 他の会員の通知は見つからない
    let bob_uri = format!("/members/{}/notifications", bob);
    let (status, body) = send(&app, "POST", &format!("{}/{}/read", bob_uri, first), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOTIFICATION_NOT_FOUND");
    let (status, _) = send(&app, "DELETE", &format!("{}/{}", bob_uri, first), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // 一括既読
    let (status, body) = send(&app, "PATCH", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let marked: MarkAllReadResponse = serde_json::from_value(body).unwrap();
    assert_eq!(marked.updated, 1);

    // 削除
    let (status, _) = send(&app, "DELETE", &format!("{}/{}", uri, first), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = send(&app, "DELETE", &format!("{}/{}", uri, first), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOTIFICATION_NOT_FOUND");

    let (_, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(body["unread"], 0);
    assert_eq!(body["notifications"].as_array().unwrap().len(), 1);

    // Bobの通知は未読のまま
    let (_, body) = send(&app, "GET", &bob_uri, None).await;
    assert_eq!(body["unread"], 1);
}
