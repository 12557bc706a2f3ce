//! Photo upload through `/photos/add`.
//!
//! Run with: `cargo test -p pictier-api --test upload_test`

mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use helpers::{bearer, fixtures, setup_test_app, ALICE_KEY, BOB_KEY, CAROL_KEY, MEDIA_BASE_URL};
use pictier_core::EXPIRING_LINKS_DENIED;
use serde_json::Value;

fn image_part(data: Vec<u8>, file_name: &str, mime: &str) -> Part {
    Part::bytes(data).file_name(file_name).mime_type(mime)
}

/// Request path of a public media link on the test server.
fn media_path(link: &str) -> String {
    let relative = link.strip_prefix(MEDIA_BASE_URL).unwrap();
    format!("/media{}", relative)
}

async fn upload(app: &helpers::TestApp, name: &str, file_name: &str, data: Vec<u8>) -> Value {
    let form = MultipartForm::new()
        .add_text("name", name)
        .add_part("image", image_part(data, file_name, "image/png"));
    let response = app
        .client()
        .post("/photos/add")
        .add_header("Authorization", bearer(ALICE_KEY))
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), 201);
    response.json::<Value>()[0].clone()
}

#[tokio::test]
async fn valid_upload_is_stored_and_returns_links() {
    let app = setup_test_app().await;
    let form = MultipartForm::new()
        .add_text("name", "holiday")
        .add_part(
            "image",
            image_part(fixtures::create_test_png(800, 400), "beach.png", "image/png"),
        );

    let response = app
        .client()
        .post("/photos/add")
        .add_header("Authorization", bearer(ALICE_KEY))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["name"], "holiday");
    assert_eq!(
        entries[0]["original_link"],
        format!("{}/user_alice/beach.png", MEDIA_BASE_URL)
    );
    assert_eq!(
        entries[0]["thumbnail_links"]["small"],
        format!("{}/user_alice/holiday_small.png", MEDIA_BASE_URL)
    );

    let media_root = &app.state.config.media_root;
    assert!(media_root.join("user_alice/beach.png").exists());
    assert!(media_root.join("user_alice/holiday_large.png").exists());
}

#[tokio::test]
async fn expiring_flag_selects_the_link_mode() {
    let app = setup_test_app().await;
    let form = MultipartForm::new()
        .add_text("name", "snap")
        .add_text("expiring_links", "true")
        .add_part(
            "image",
            image_part(fixtures::create_test_jpeg(120, 90), "snap.jpg", "image/jpeg"),
        );

    let response = app
        .client()
        .post("/photos/add")
        .add_header("Authorization", bearer(BOB_KEY))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    assert_eq!(body[0]["thumbnail_links"]["small"], EXPIRING_LINKS_DENIED);
}

#[tokio::test]
async fn missing_fields_and_bad_extension_are_reported_together() {
    let app = setup_test_app().await;
    let form = MultipartForm::new().add_part(
        "image",
        image_part(b"GIF89a".to_vec(), "anim.gif", "image/gif"),
    );

    let response = app
        .client()
        .post("/photos/add")
        .add_header("Authorization", bearer(ALICE_KEY))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["name"][0], "This field is required.");
    assert_eq!(body["image"][0], "Only JPG and PNG files are allowed.");
}

#[tokio::test]
async fn undecodable_images_and_long_names_are_rejected() {
    let app = setup_test_app().await;
    let form = MultipartForm::new()
        .add_text("name", "x".repeat(51))
        .add_part(
            "image",
            image_part(fixtures::create_corrupt_png(), "broken.png", "image/png"),
        );

    let response = app
        .client()
        .post("/photos/add")
        .add_header("Authorization", bearer(ALICE_KEY))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(
        body["image"][0],
        "Upload a valid image. The file you uploaded was either not an image or a corrupted image."
    );
    assert_eq!(
        body["name"][0],
        "Ensure this field has no more than 50 characters."
    );
    assert!(!app.state.config.media_root.join("user_alice").join("broken.png").exists());
}

#[tokio::test]
async fn reused_file_names_do_not_overwrite_earlier_uploads() {
    let app = setup_test_app().await;
    for name in ["first", "second"] {
        let form = MultipartForm::new().add_text("name", name).add_part(
            "image",
            image_part(fixtures::create_test_png(20, 20), "same.png", "image/png"),
        );
        let response = app
            .client()
            .post("/photos/add")
            .add_header("Authorization", bearer(ALICE_KEY))
            .multipart(form)
            .await;
        assert_eq!(response.status_code(), 201);
    }

    let listing: Value = app
        .client()
        .get("/photos/")
        .add_header("Authorization", bearer(ALICE_KEY))
        .await
        .json();
    assert_eq!(listing.as_array().unwrap().len(), 2);

    let entries = std::fs::read_dir(app.state.config.media_root.join("user_alice"))
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with("same"))
        .count();
    assert_eq!(entries, 2);
}

#[tokio::test]
async fn uploads_require_a_tier() {
    let app = setup_test_app().await;
    let form = MultipartForm::new().add_text("name", "cat").add_part(
        "image",
        image_part(fixtures::create_test_png(20, 20), "cat.png", "image/png"),
    );

    let response = app
        .client()
        .post("/photos/add")
        .add_header("Authorization", bearer(CAROL_KEY))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 403);
}

#[tokio::test]
async fn sources_named_like_thumbnails_survive_other_uploads_and_deletes() {
    let app = setup_test_app().await;
    let x = upload(&app, "x", "dog_small.png", fixtures::create_test_png(1000, 800)).await;
    let x_original = x["original_link"].as_str().unwrap().to_string();
    assert_ne!(
        x_original,
        format!("{}/user_alice/dog_small.png", MEDIA_BASE_URL)
    );

    let dog = upload(&app, "dog", "dog.png", fixtures::create_test_png(300, 300)).await;
    assert_eq!(
        dog["thumbnail_links"]["small"],
        format!("{}/user_alice/dog_small.png", MEDIA_BASE_URL)
    );

    let served = app.client().get(&media_path(&x_original)).await;
    assert_eq!(served.status_code(), 200);
    let source = image::load_from_memory(served.as_bytes()).unwrap();
    assert_eq!((source.width(), source.height()), (1000, 800));

    let deleted = app
        .client()
        .delete(&format!("/photos/delete/{}", dog["id"].as_str().unwrap()))
        .add_header("Authorization", bearer(ALICE_KEY))
        .await;
    assert_eq!(deleted.status_code(), 204);
    assert_eq!(
        app.client().get(&media_path(&x_original)).await.status_code(),
        200
    );
}

#[tokio::test]
async fn links_for_names_with_reserved_url_characters_can_be_fetched() {
    let app = setup_test_app().await;
    let photo = upload(&app, "a#b c", "a#b.png", fixtures::create_test_png(300, 150)).await;

    let small = photo["thumbnail_links"]["small"].as_str().unwrap();
    assert_eq!(
        small,
        format!("{}/user_alice/a%23b%20c_small.png", MEDIA_BASE_URL)
    );
    let served = app.client().get(&media_path(small)).await;
    assert_eq!(served.status_code(), 200);
    let thumb = image::load_from_memory(served.as_bytes()).unwrap();
    assert_eq!((thumb.width(), thumb.height()), (200, 100));

    let original = photo["original_link"].as_str().unwrap();
    assert!(!original.contains('#'));
    assert_eq!(app.client().get(&media_path(original)).await.status_code(), 200);
}
