use anyhow::Result;
use httpmock::prelude::*;
use member_import::config::import_config::{StoreConfig, StoreKind};
use member_import::core::parser::{parse_sheet, SheetFormat};
use member_import::domain::model::{
    MembershipStatus, MembershipType, NewMembership, PaymentMethod, PaymentStatus,
};
use member_import::domain::ports::MembershipStore;
use member_import::{BulkImportProcessor, HttpMembershipStore, ProcessorSettings, StoreError};
use chrono::{TimeZone, Utc};
use serde_json::json;
use std::collections::HashMap;

fn record_json(id: &str, email: &str) -> serde_json::Value {
    json!({
        "membershipId": id,
        "name": "John Doe",
        "email": email,
        "mobile": "9876543210",
        "designation": "JE",
        "division": "Bhusawal",
        "department": "Mechanical",
        "type": "ordinary",
        "place": "Not specified",
        "unit": "Not specified",
        "paymentMethod": "upi",
        "paymentAmount": 500.0,
        "purchaseDate": "2024-01-15T00:00:00Z",
        "validFrom": "2024-01-15T00:00:00Z",
        "validUntil": "2025-01-15T00:00:00Z",
        "paymentStatus": "pending",
        "status": "pending"
    })
}

fn new_membership(email: &str) -> NewMembership {
    let purchase = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
    NewMembership {
        name: "John Doe".to_string(),
        email: email.to_string(),
        mobile: "9876543210".to_string(),
        designation: "JE".to_string(),
        division: "Bhusawal".to_string(),
        department: "Mechanical".to_string(),
        membership_type: MembershipType::Ordinary,
        place: "Not specified".to_string(),
        unit: "Not specified".to_string(),
        payment_method: PaymentMethod::Upi,
        payment_amount: 500.0,
        purchase_date: purchase,
        valid_from: purchase,
        valid_until: Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap(),
        payment_status: PaymentStatus::Pending,
        status: MembershipStatus::Pending,
    }
}

#[tokio::test]
async fn test_find_by_email_empty_array_is_none() -> Result<()> {
    let server = MockServer::start();
    let lookup = server.mock(|when, then| {
        when.method(GET)
            .path("/api/memberships")
            .query_param("email", "john@x.com");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!([]));
    });

    let store = HttpMembershipStore::new(server.url("/api"));
    assert!(store.find_by_email("john@x.com").await?.is_none());

    lookup.assert();
    Ok(())
}

#[tokio::test]
async fn test_find_by_email_returns_first_record() -> Result<()> {
    let server = MockServer::start();
    let lookup = server.mock(|when, then| {
        when.method(GET)
            .path("/api/memberships")
            .query_param("email", "john@x.com");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!([record_json("MEM-2024-00001", "john@x.com")]));
    });

    // 結尾的斜線不影響 URL 組合
    let store = HttpMembershipStore::new(format!("{}/", server.url("/api")));
    let record = store.find_by_email("john@x.com").await?.unwrap();

    assert_eq!(record.membership_id, "MEM-2024-00001");
    assert_eq!(record.details.membership_type, MembershipType::Ordinary);
    lookup.assert();
    Ok(())
}

/// 服務端忽略 email 條件時，只認 email 相符的紀錄
#[tokio::test]
async fn test_find_by_email_ignores_unrelated_records() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/memberships");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!([
                record_json("MEM-2024-00001", "someone@x.com"),
                record_json("MEM-2024-00002", "John@X.com")
            ]));
    });

    let store = HttpMembershipStore::new(server.url("/api"));
    let record = store.find_by_email("john@x.com").await?.unwrap();
    assert_eq!(record.membership_id, "MEM-2024-00002");
    assert!(store.find_by_email("nobody@x.com").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_insert_conflict_maps_to_duplicate() -> Result<()> {
    let server = MockServer::start();
    let create = server.mock(|when, then| {
        when.method(POST).path("/api/memberships");
        then.status(409)
            .header("content-type", "application/json")
            .json_body(json!({ "message": "Email already registered" }));
    });

    let store = HttpMembershipStore::new(server.url("/api"));
    let err = store.insert(new_membership("john@x.com")).await.unwrap_err();

    assert!(matches!(err, StoreError::Duplicate { ref email } if email == "john@x.com"));
    create.assert();
    Ok(())
}

#[tokio::test]
async fn test_server_error_carries_message() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/memberships");
        then.status(500)
            .header("content-type", "application/json")
            .json_body(json!({ "message": "database unavailable" }));
    });

    let store = HttpMembershipStore::new(server.url("/api"));
    let err = store.insert(new_membership("john@x.com")).await.unwrap_err();

    match err {
        StoreError::Rejected { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "database unavailable");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    Ok(())
}

/// 設定檔中的 token 與自訂 header 都要送出
#[tokio::test]
async fn test_configured_token_and_headers_are_sent() -> Result<()> {
    let server = MockServer::start();
    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/api/memberships")
            .header("authorization", "Bearer secret-token")
            .header("x-division", "Bhusawal")
            .body_contains("\"email\":\"john@x.com\"");
        then.status(201)
            .header("content-type", "application/json")
            .json_body(record_json("MEM-2024-00007", "john@x.com"));
    });

    let config = StoreConfig {
        r#type: StoreKind::Http,
        endpoint: Some(server.url("/api")),
        token: Some("secret-token".to_string()),
        timeout_seconds: Some(5),
        headers: Some(HashMap::from([(
            "X-Division".to_string(),
            "Bhusawal".to_string(),
        )])),
    };
    let store = HttpMembershipStore::from_config(&config)?;
    let record = store.insert(new_membership("john@x.com")).await?;

    assert_eq!(record.membership_id, "MEM-2024-00007");
    create.assert();
    Ok(())
}

#[test]
fn test_from_config_requires_endpoint() {
    let config = StoreConfig {
        r#type: StoreKind::Http,
        ..StoreConfig::default()
    };
    assert!(HttpMembershipStore::from_config(&config).is_err());
}

/// 儲存端回 409 時只有該列失敗，其他列照常匯入
#[tokio::test]
async fn test_processor_reports_store_conflict_as_row_failure() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/memberships");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!([]));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/api/memberships")
            .body_contains("\"email\":\"taken@x.com\"");
        then.status(409)
            .json_body(json!({ "message": "Email already registered" }));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/api/memberships")
            .body_contains("\"email\":\"john@x.com\"");
        then.status(201)
            .header("content-type", "application/json")
            .json_body(record_json("MEM-2024-00002", "john@x.com"));
    });

    let csv = "\
name,email,mobile,designation,division,department,type,purchaseDate
Taken User,taken@x.com,9876543200,JE,Bhusawal,Mechanical,ordinary,2024-01-15
John Doe,john@x.com,9876543210,JE,Bhusawal,Mechanical,ordinary,2024-01-15
";
    let rows = parse_sheet(csv.as_bytes(), SheetFormat::Csv)?;

    let processor = BulkImportProcessor::new(
        HttpMembershipStore::new(server.url("/api")),
        ProcessorSettings::default(),
    );
    let outcome = processor.process(rows).await;

    assert_eq!(outcome.total, 2);
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].row, 1);
    assert!(outcome.failed[0].error.contains("Duplicate email"));
    assert_eq!(outcome.success[0].membership_id, "MEM-2024-00002");
    Ok(())
}
