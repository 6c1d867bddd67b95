//! End-to-end HTTP tests against a server with offline providers and on-disk stores.

mod common;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::json;

use common::harness::{TestServerConfig, spawn_test_server};
use common::http_client::TestClient;

const LEAK_PHOTO: &[u8] = b"\xFF\xD8\xFF\xE0leaking-sink-photo";
const DOOR_PHOTO: &[u8] = b"\x89PNG\r\n\x1a\nbroken-door-photo";

fn profile(id: i64, birth_year: i32) -> serde_json::Value {
    json!({
        "id": id,
        "name": format!("student-{}", id),
        "gender": "F",
        "birthYear": birth_year,
        "smoker": false,
        "snoring": false,
        "bugKiller": true,
        "sleepTime": 24.0,
        "wakeTime": 8.0,
        "cleaningCycle": "EVERY_TWO_DAYS",
        "drinkingStyle": "RARELY"
    })
}

fn repair_request(photo: &[u8], room: Option<&str>, existing: &[u64]) -> serde_json::Value {
    json!({
        "imageBase64": BASE64.encode(photo),
        "building": "Dorm A",
        "floor": 4,
        "room_number": room,
        "existingReportIds": existing
    })
}

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    let server = spawn_test_server(TestServerConfig::default())
        .await
        .expect("Server should start");

    let client = TestClient::new(server.url());
    let health = client.health().await.expect("Health check should succeed");

    assert_eq!(health.status, "ok");
}

#[tokio::test]
async fn test_profile_vectors_feed_matching() {
    let server = spawn_test_server(TestServerConfig::default())
        .await
        .expect("Server should start");
    let client = TestClient::new(server.url());

    let wish = "Someone who keeps the room quiet after midnight";

    let seeker = client
        .post(
            "/api/users/vector",
            &json!({"userId": 1, "selfDescription": "Night owl", "roommateDescription": wish}),
        )
        .await
        .unwrap();
    assert_eq!(seeker.status, 200);
    assert_eq!(seeker.body["details"]["criteria_vector"], "Saved");

    // The offline embedder maps equal text to equal vectors, so candidate 3's
    // self-description is a perfect match for the seeker's criteria.
    for (user_id, text) in [(2, "I play drums at night"), (3, wish)] {
        let resp = client
            .post(
                "/api/users/vector",
                &json!({"userId": user_id, "selfDescription": text}),
            )
            .await
            .unwrap();
        assert_eq!(resp.body["details"]["self_vector"], "Saved");
        assert_eq!(resp.body["details"]["criteria_vector"], "Skipped");
    }

    let ranked = client
        .post(
            "/api/matching/match",
            &json!({
                "myProfile": profile(1, 2002),
                "preferences": {"preferGoodAtBugs": true},
                "candidates": [profile(2, 2002), profile(3, 2002), profile(4, 2002)]
            }),
        )
        .await
        .unwrap();

    assert_eq!(ranked.status, 200);
    let results = ranked.body.as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["userId"], 3);
    assert_eq!(results[0]["totalScore"], 100.0);
    assert_eq!(results[0]["rank"], 1);
    assert_eq!(results[2]["rank"], 3);
}

#[tokio::test]
async fn test_match_caps_results() {
    let server = spawn_test_server(TestServerConfig::default())
        .await
        .expect("Server should start");
    let client = TestClient::new(server.url());

    let candidates: Vec<_> = (2..27).map(|id| profile(id, 1995 + (id as i32 % 10))).collect();
    let ranked = client
        .post(
            "/api/matching/match",
            &json!({"myProfile": profile(1, 2000), "candidates": candidates}),
        )
        .await
        .unwrap();

    let results = ranked.body.as_array().unwrap();
    assert_eq!(results.len(), 20);
    for (idx, result) in results.iter().enumerate() {
        assert_eq!(result["rank"], idx + 1);
    }
}

#[tokio::test]
async fn test_repair_duplicate_flow() {
    let server = spawn_test_server(TestServerConfig::default())
        .await
        .expect("Server should start");
    let client = TestClient::new(server.url());

    let first = client
        .post("/api/repair/analyze", &repair_request(LEAK_PHOTO, Some("402"), &[]))
        .await
        .unwrap();
    assert_eq!(first.status, 200);
    assert_eq!(first.body["is_new"], true);
    assert_eq!(first.body["report_id"], 1);
    assert!(first.body["analysis"].is_object());

    let again = client
        .post("/api/repair/analyze", &repair_request(LEAK_PHOTO, Some("402"), &[1]))
        .await
        .unwrap();
    assert_eq!(again.body["is_new"], false);
    assert_eq!(again.body["report_id"], serde_json::Value::Null);
    assert_eq!(again.body["duplicates"][0]["reportId"], 1);
    assert_eq!(again.body["duplicates"][0]["location"], "Dorm A 4F 402");
    assert!(
        again.body["duplicates"][0]["image_url"]
            .as_str()
            .unwrap()
            .ends_with(".jpg")
    );

    // Same photo, different room: not a duplicate.
    let other_room = client
        .post("/api/repair/analyze", &repair_request(LEAK_PHOTO, Some("403"), &[1]))
        .await
        .unwrap();
    assert_eq!(other_room.body["is_new"], true);
    assert_eq!(other_room.body["report_id"], 2);

    let different = client
        .post("/api/repair/analyze", &repair_request(DOOR_PHOTO, Some("402"), &[1, 2]))
        .await
        .unwrap();
    assert_eq!(different.body["is_new"], true);
    assert_eq!(different.body["report_id"], 3);

    let images = std::fs::read_dir(server.storage_path.join("images"))
        .unwrap()
        .count();
    assert_eq!(images, 2);
}

#[tokio::test]
async fn test_reports_survive_restart() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let config = TestServerConfig {
        storage_path: Some(temp_dir.path().to_path_buf()),
        ..Default::default()
    };

    let server = spawn_test_server(config.clone()).await.unwrap();
    let client = TestClient::new(server.url());
    let created = client
        .post("/api/repair/analyze", &repair_request(DOOR_PHOTO, None, &[]))
        .await
        .unwrap();
    assert_eq!(created.body["report_id"], 1);
    drop(client);
    server.shutdown().await;

    let server = spawn_test_server(config).await.unwrap();
    let client = TestClient::new(server.url());

    let duplicate = client
        .post("/api/repair/analyze", &repair_request(DOOR_PHOTO, None, &[1]))
        .await
        .unwrap();
    assert_eq!(duplicate.body["is_new"], false);
    assert_eq!(duplicate.body["duplicates"][0]["location"], "Dorm A 4F (common area)");

    let next = client
        .post("/api/repair/analyze", &repair_request(LEAK_PHOTO, None, &[1]))
        .await
        .unwrap();
    assert_eq!(next.body["report_id"], 2);
}

#[tokio::test]
async fn test_repair_errors() {
    let server = spawn_test_server(TestServerConfig::default())
        .await
        .expect("Server should start");
    let client = TestClient::new(server.url());

    let missing_image = client
        .post("/api/repair/analyze", &json!({"building": "Dorm A", "floor": 1}))
        .await
        .unwrap();
    assert_eq!(missing_image.status, 400);
    assert_eq!(missing_image.roomfix_status.as_deref(), Some("invalid_request"));
    assert_eq!(missing_image.body["code"], 400);

    let bad_path = client
        .post(
            "/api/repair/analyze",
            &json!({"imagePath": "/definitely/not/here.jpg", "building": "Dorm A", "floor": 1}),
        )
        .await
        .unwrap();
    assert_eq!(bad_path.status, 422);
    assert_eq!(bad_path.roomfix_status.as_deref(), Some("unresolvable_input"));
}
