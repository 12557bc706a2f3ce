//! Expiring link resolution through `/download/{token}`.
//!
//! Run with: `cargo test -p pictier-api --test download_test`

mod helpers;

use std::collections::HashSet;

use chrono::{Duration, TimeZone, Utc};
use helpers::{bearer, fixtures, setup_test_app, ALICE_KEY, BOB_KEY, MEDIA_BASE_URL};
use pictier_core::{LinkMode, LinkResult};
use serde_json::Value;

fn token_from(link: &str) -> String {
    link.rsplit('/').next().unwrap().to_string()
}

#[tokio::test]
async fn fresh_token_redirects_to_the_thumbnail() {
    let app = setup_test_app().await;
    app.seed_photo("alice", "cat", fixtures::create_test_png(300, 300))
        .await;

    let body: Value = app
        .client()
        .get("/photos/generateExpired")
        .add_header("Authorization", bearer(ALICE_KEY))
        .await
        .json();
    let token = token_from(body[0]["thumbnail_links"]["small"].as_str().unwrap());

    let response = app
        .client()
        .get(&format!("/download/{}", token))
        .add_header("Authorization", bearer(ALICE_KEY))
        .await;

    assert_eq!(response.status_code(), 302);
    assert_eq!(
        response.header("location"),
        format!("{}/user_alice/cat_small.png", MEDIA_BASE_URL)
    );
}

#[tokio::test]
async fn tampered_or_garbage_tokens_read_as_expired() {
    let app = setup_test_app().await;
    app.seed_photo("alice", "cat", fixtures::create_test_png(300, 300))
        .await;

    let body: Value = app
        .client()
        .get("/photos/generateExpired")
        .add_header("Authorization", bearer(ALICE_KEY))
        .await
        .json();
    let token = token_from(body[0]["thumbnail_links"]["small"].as_str().unwrap());
    let mut tampered = token.into_bytes();
    let last = tampered.len() - 1;
    tampered[last] = if tampered[last] == b'A' { b'B' } else { b'A' };
    let tampered = String::from_utf8(tampered).unwrap();

    for token in [tampered.as_str(), "garbage"] {
        let response = app
            .client()
            .get(&format!("/download/{}", token))
            .add_header("Authorization", bearer(ALICE_KEY))
            .await;
        assert_eq!(response.status_code(), 404);
        let body: Value = response.json();
        assert_eq!(body["reason"], "Token has expired");
        assert!(body.get("details").is_none());
    }
}

#[tokio::test]
async fn tier_without_expiration_cannot_resolve_tokens() {
    let app = setup_test_app().await;
    app.seed_photo("alice", "cat", fixtures::create_test_png(300, 300))
        .await;

    let body: Value = app
        .client()
        .get("/photos/generateExpired")
        .add_header("Authorization", bearer(ALICE_KEY))
        .await
        .json();
    let token = token_from(body[0]["thumbnail_links"]["small"].as_str().unwrap());

    let response = app
        .client()
        .get(&format!("/download/{}", token))
        .add_header("Authorization", bearer(BOB_KEY))
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn issued_tokens_expire_after_the_tier_window() {
    let app = setup_test_app().await;
    let photo = app
        .seed_photo("alice", "cat", fixtures::create_test_png(400, 200))
        .await;
    let tier = fixtures::tier("Enterprise", true, true, Some(300));
    let specs = vec![fixtures::spec(&tier, "small", 100, 100)];
    let issued_at = Utc.timestamp_opt(1000, 0).unwrap();

    let links = app
        .state
        .link_issuer
        .issue_links(
            &photo,
            &tier,
            &specs,
            LinkMode::Expiring,
            &HashSet::from([photo.storage_path.clone()]),
            issued_at,
        )
        .await;
    let token = match &links.thumbnail_links["small"] {
        LinkResult::TokenUrl(url) => token_from(url),
        other => panic!("expected a token url, got {:?}", other),
    };

    let resolver = &app.state.download_resolver;
    assert_eq!(
        resolver
            .resolve(&token, &tier, issued_at + Duration::seconds(299))
            .unwrap(),
        "user_alice/cat_small.png"
    );
    assert!(resolver
        .resolve(&token, &tier, issued_at + Duration::seconds(300))
        .is_err());
    assert!(resolver
        .resolve(&token, &tier, issued_at + Duration::seconds(301))
        .is_err());
}
