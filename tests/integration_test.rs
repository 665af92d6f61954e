//! End-to-end tests against a running homepointsd

mod common;

use common::HomepointsTest;
use serde_json::json;
use tempfile::TempDir;

const ALICE: &str = "2b7e1516-28ae-4d2a-a6d2-000000000001";
const BOB: &str = "2b7e1516-28ae-4d2a-a6d2-000000000002";

#[tokio::test]
async fn test_health_and_root() {
    let hp = HomepointsTest::start().await.expect("Failed to start server");

    let body = hp.json("/health").await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["owners"], 0);
    assert_eq!(body["unsaved_changes"], false);

    let body = hp.json("/").await.unwrap();
    assert_eq!(body["name"], "homepointsd");
}

#[tokio::test]
async fn test_set_teleport_and_delete_home() {
    let hp = HomepointsTest::start().await.unwrap();

    let resp = hp.set_home(ALICE, "base", 10).await.unwrap();
    assert_eq!(resp.status(), 201);
    let resp = hp.set_home(ALICE, "base", 20).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["outcome"], "updated");

    let home = hp
        .json(&format!("/players/{}/homes/base", ALICE))
        .await
        .unwrap();
    assert_eq!(home["position"]["x"], 20);
    assert_eq!(home["owner"], ALICE);

    let listing = hp.json(&format!("/players/{}/homes", ALICE)).await.unwrap();
    assert_eq!(listing["count"], 1);
    assert_eq!(listing["max"], 100);

    let resp = hp
        .delete(&format!("/players/{}/homes/base", ALICE))
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let resp = hp.get(&format!("/players/{}/homes/base", ALICE)).await.unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_invalid_home_name_rejected() {
    let hp = HomepointsTest::start().await.unwrap();

    let resp = hp.set_home(ALICE, "my-base", 0).await.unwrap();
    assert_eq!(resp.status(), 400);

    let listing = hp.json(&format!("/players/{}/homes", ALICE)).await.unwrap();
    assert_eq!(listing["count"], 0);
}

#[tokio::test]
async fn test_public_home_ownership() {
    let hp = HomepointsTest::start().await.unwrap();
    let spot = json!({ "world": "minecraft:the_nether", "x": 1, "y": 70, "z": 1 });

    let resp = hp
        .put(&format!("/players/{}/public/spawn", ALICE), &spot)
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    // Someone else can see it but not take it over
    let resp = hp
        .put(&format!("/players/{}/public/spawn", BOB), &spot)
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    let resp = hp
        .delete(&format!("/players/{}/public/spawn", BOB))
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let home = hp.json("/public/spawn").await.unwrap();
    assert_eq!(home["owner"], ALICE);
    assert_eq!(home["world"], "minecraft:the_nether");

    let all = hp.json("/public").await.unwrap();
    assert_eq!(all.as_array().unwrap().len(), 1);

    let resp = hp
        .delete(&format!("/players/{}/public/spawn", ALICE))
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);
    let resp = hp.get("/public/spawn").await.unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_share_and_accept() {
    let hp = HomepointsTest::start().await.unwrap();
    hp.join(ALICE, "Alice").await.unwrap();
    hp.join(BOB, "Bob").await.unwrap();
    hp.set_home(ALICE, "farm", 300).await.unwrap();

    let resp = hp
        .post(
            &format!("/players/{}/shares", ALICE),
            &json!({ "home": "farm", "target": "bob" }),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let offer: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(offer["to"], BOB);

    let health = hp.json("/health").await.unwrap();
    assert_eq!(health["pending_shares"], 1);

    let resp = hp
        .post(
            &format!("/players/{}/shares/accept", BOB),
            &json!({ "from": "Alice", "home": "farm" }),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let copy: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(copy["owner"], BOB);
    assert_eq!(copy["position"]["x"], 300);

    // The offer is used up
    let resp = hp
        .post(
            &format!("/players/{}/shares/accept", BOB),
            &json!({ "from": "Alice", "home": "farm" }),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    // Alice keeps her original
    let home = hp
        .json(&format!("/players/{}/homes/farm", ALICE))
        .await
        .unwrap();
    assert_eq!(home["owner"], ALICE);
}

#[tokio::test]
async fn test_share_with_offline_player() {
    let hp = HomepointsTest::start().await.unwrap();
    hp.join(ALICE, "Alice").await.unwrap();
    hp.set_home(ALICE, "farm", 0).await.unwrap();

    let resp = hp
        .post(
            &format!("/players/{}/shares", ALICE),
            &json!({ "home": "farm", "target": "Bob" }),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    hp.join(BOB, "Bob").await.unwrap();
    let resp = hp.delete(&format!("/sessions/{}", BOB)).await.unwrap();
    assert_eq!(resp.status(), 204);
    let resp = hp.delete(&format!("/sessions/{}", BOB)).await.unwrap();
    assert_eq!(resp.status(), 404);

    let online = hp.json("/sessions").await.unwrap();
    assert_eq!(online.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_homes_survive_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("homes.json");

    let hp = HomepointsTest::start_persistent(&path).await.unwrap();
    hp.set_home(ALICE, "base", 7).await.unwrap();
    hp.put(
        &format!("/players/{}/public/market", BOB),
        &json!({ "world": "minecraft:overworld", "x": 0, "y": 64, "z": 0 }),
    )
    .await
    .unwrap();
    hp.stop().await.unwrap();

    assert!(path.exists());

    let hp = HomepointsTest::start_persistent(&path).await.unwrap();
    assert!(hp.server().load_error().is_none());

    let home = hp
        .json(&format!("/players/{}/homes/base", ALICE))
        .await
        .unwrap();
    assert_eq!(home["position"]["x"], 7);

    let market = hp.json("/public/market").await.unwrap();
    assert_eq!(market["owner"], BOB);
    hp.stop().await.unwrap();
}

#[tokio::test]
async fn test_corrupt_data_file_is_set_aside() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("homes.json");
    std::fs::write(&path, b"not json at all").unwrap();

    let hp = HomepointsTest::start_persistent(&path).await.unwrap();
    assert!(hp.server().load_error().unwrap().is_corrupt());

    let listing = hp.json(&format!("/players/{}/homes", ALICE)).await.unwrap();
    assert_eq!(listing["count"], 0);
    hp.stop().await.unwrap();

    let quarantined = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().contains(".corrupt-"))
        .count();
    assert_eq!(quarantined, 1);
}

#[tokio::test]
async fn test_parallel_servers_are_isolated() {
    let hp1 = HomepointsTest::start().await.unwrap();
    let hp2 = HomepointsTest::start().await.unwrap();
    assert_ne!(hp1.addr, hp2.addr);

    hp1.set_home(ALICE, "base", 1).await.unwrap();

    let resp = hp2.get(&format!("/players/{}/homes/base", ALICE)).await.unwrap();
    assert_eq!(resp.status(), 404);
}
