//! Product API integration tests.
//!
//! Run with: `cargo test -p vendora-api --test products_test`

mod helpers;

use axum_test::multipart::MultipartForm;
use serde_json::{json, Value};
use uuid::Uuid;

use helpers::auth::{token_for, vendor_bearer};
use helpers::fixtures::{gif, image_part, jpeg, png, product_form};
use helpers::{api_path, setup_test_app, TestApp};

async fn create_with_images(app: &TestApp, vendor: Uuid, form: MultipartForm) -> Value {
    let response = app
        .client()
        .post(&api_path("/products"))
        .add_header("Authorization", vendor_bearer(vendor))
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), 201, "{}", response.text());
    response.json()
}

fn image_urls(images: &Value) -> Vec<String> {
    images
        .as_array()
        .expect("images should be an array")
        .iter()
        .map(|img| img["url"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = setup_test_app().await;

    let response = app.client().get(&api_path("/products")).await;

    assert_eq!(response.status_code(), 401);
    let body: Value = response.json();
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_invalid_token_is_unauthorized() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get(&api_path("/products"))
        .add_header("Authorization", "Bearer not-a-jwt")
        .await;

    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_non_vendor_role_is_forbidden() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get(&api_path("/products"))
        .add_header(
            "Authorization",
            format!("Bearer {}", token_for(Uuid::new_v4(), "customer")),
        )
        .await;

    assert_eq!(response.status_code(), 403);
    let body: Value = response.json();
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_create_keeps_good_images_and_warns_about_the_bad_one() {
    let app = setup_test_app().await;
    let vendor = Uuid::new_v4();

    let form = product_form("Desk Lamp")
        .add_part("images", image_part(jpeg(640, 480), "front.jpg", "image/jpeg"))
        .add_part("images", image_part(png(320, 320), "side.png", "image/png"))
        .add_part("images", image_part(gif(200, 200), "spinner.gif", "image/gif"))
        .add_part("images", image_part(jpeg(800, 600), "back.jpg", "image/jpeg"))
        .add_part("images", image_part(png(400, 300), "top.png", "image/png"));
    let body = create_with_images(&app, vendor, form).await;

    assert_eq!(body["message"], "Product created successfully");
    let product = &body["product"];
    assert_eq!(product["name"], "Desk Lamp");
    assert_eq!(product["vendorId"], vendor.to_string());
    assert_eq!(product["status"], "draft");
    assert_eq!(product["tags"], json!(["desk", "lamp", "led"]));
    assert_eq!(product["dimensions"]["height"], 45.0);

    let images = product["images"].as_array().unwrap();
    assert_eq!(images.len(), 4);
    let orders: Vec<u64> = images.iter().map(|i| i["order"].as_u64().unwrap()).collect();
    assert_eq!(orders, vec![0, 1, 2, 3]);
    for image in images {
        let url = image["url"].as_str().unwrap();
        assert!(url.starts_with("/uploads/products/"));
        assert!(url.contains("-compressed."));
        assert_eq!(image["altText"], "Desk Lamp");
    }

    let warnings = &body["warnings"];
    assert_eq!(warnings["errors"].as_array().unwrap().len(), 1);
    assert_eq!(warnings["errors"][0]["filename"], "spinner.gif");

    assert_eq!(app.files_in(app.image_dir()).len(), 4);
    assert_eq!(app.store.len().await, 1);
}

#[tokio::test]
async fn test_all_images_failing_creates_nothing() {
    let app = setup_test_app().await;

    let form = product_form("Desk Lamp")
        .add_part("images", image_part(gif(200, 200), "a.gif", "image/gif"))
        .add_part("images", image_part(jpeg(20, 20), "tiny.jpg", "image/jpeg"))
        .add_part(
            "images",
            image_part(b"not an image".to_vec(), "fake.png", "image/png"),
        );
    let response = app
        .client()
        .post(&api_path("/products"))
        .add_header("Authorization", vendor_bearer(Uuid::new_v4()))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["code"], "ALL_IMAGES_FAILED");
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 3);
    assert_eq!(errors[1]["filename"], "tiny.jpg");

    assert!(app.store.is_empty().await);
    assert!(app.files_in(app.image_dir()).is_empty());
}

#[tokio::test]
async fn test_create_without_images() {
    let app = setup_test_app().await;

    let body = create_with_images(&app, Uuid::new_v4(), product_form("Plain Lamp")).await;

    assert!(body.get("warnings").is_none());
    assert_eq!(body["product"]["images"], json!([]));
}

#[tokio::test]
async fn test_too_many_images_is_rejected() {
    let app = setup_test_app().await;
    let mut form = product_form("Desk Lamp");
    for i in 0..6 {
        form = form.add_part("images", image_part(png(120, 120), &format!("{i}.png"), "image/png"));
    }

    let response = app
        .client()
        .post(&api_path("/products"))
        .add_header("Authorization", vendor_bearer(Uuid::new_v4()))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 400);
    assert!(app.files_in(app.image_dir()).is_empty());
}

#[tokio::test]
async fn test_invalid_price_is_rejected() {
    let app = setup_test_app().await;
    let form = MultipartForm::new()
        .add_text("name", "Desk Lamp")
        .add_text("description", "Lamp")
        .add_text("price", "cheap")
        .add_text("category", "Lighting")
        .add_part("images", image_part(png(200, 200), "a.png", "image/png"));

    let response = app
        .client()
        .post(&api_path("/products"))
        .add_header("Authorization", vendor_bearer(Uuid::new_v4()))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
    assert!(body["error"].as_str().unwrap().contains("price"));
    assert!(app.files_in(app.image_dir()).is_empty());
}

#[tokio::test]
async fn test_list_filters_by_status_and_vendor() {
    let app = setup_test_app().await;
    let vendor = Uuid::new_v4();

    create_with_images(&app, vendor, product_form("Draft Lamp")).await;
    create_with_images(
        &app,
        vendor,
        product_form("Live Lamp").add_text("status", "published"),
    )
    .await;
    create_with_images(&app, Uuid::new_v4(), product_form("Other Vendor Lamp")).await;

    let response = app
        .client()
        .get(&api_path("/products"))
        .add_header("Authorization", vendor_bearer(vendor))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["pagination"]["total"], 2);
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["pages"], 1);

    let response = app
        .client()
        .get(&api_path("/products"))
        .add_query_param("status", "published")
        .add_header("Authorization", vendor_bearer(vendor))
        .await;
    let body: Value = response.json();
    let products = body["products"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["name"], "Live Lamp");

    let response = app
        .client()
        .get(&api_path("/products"))
        .add_query_param("limit", "1")
        .add_query_param("page", "2")
        .add_header("Authorization", vendor_bearer(vendor))
        .await;
    let body: Value = response.json();
    assert_eq!(body["products"].as_array().unwrap().len(), 1);
    assert_eq!(body["pagination"]["pages"], 2);

    let response = app
        .client()
        .get(&api_path("/products"))
        .add_query_param("status", "archived")
        .add_header("Authorization", vendor_bearer(vendor))
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_update_appends_images_after_existing_ones() {
    let app = setup_test_app().await;
    let vendor = Uuid::new_v4();
    let created = create_with_images(
        &app,
        vendor,
        product_form("Desk Lamp")
            .add_text("status", "published")
            .add_part("images", image_part(png(300, 300), "a.png", "image/png")),
    )
    .await;
    let id = created["product"]["id"].as_str().unwrap().to_string();

    let form = product_form("Desk Lamp v2")
        .add_part("images", image_part(jpeg(300, 300), "b.jpg", "image/jpeg"))
        .add_part("images", image_part(jpeg(300, 300), "c.jpg", "image/jpeg"));
    let response = app
        .client()
        .put(&api_path(&format!("/products/{}", id)))
        .add_header("Authorization", vendor_bearer(vendor))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 200, "{}", response.text());
    let body: Value = response.json();
    assert_eq!(body["message"], "Product updated successfully");
    let product = &body["product"];
    assert_eq!(product["name"], "Desk Lamp v2");
    // Status is kept when the form does not send one.
    assert_eq!(product["status"], "published");
    let orders: Vec<u64> = product["images"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["order"].as_u64().unwrap())
        .collect();
    assert_eq!(orders, vec![0, 1, 2]);
    assert_eq!(product["images"][1]["altText"], "Desk Lamp v2");
}

#[tokio::test]
async fn test_update_of_another_vendors_product_is_not_found() {
    let app = setup_test_app().await;
    let created = create_with_images(&app, Uuid::new_v4(), product_form("Desk Lamp")).await;
    let id = created["product"]["id"].as_str().unwrap().to_string();

    let response = app
        .client()
        .put(&api_path(&format!("/products/{}", id)))
        .add_header("Authorization", vendor_bearer(Uuid::new_v4()))
        .multipart(
            product_form("Hijacked")
                .add_part("images", image_part(png(200, 200), "a.png", "image/png")),
        )
        .await;

    assert_eq!(response.status_code(), 404);
    // Only the files of the original product's images remain (none here).
    assert!(app.files_in(app.image_dir()).is_empty());
}

#[tokio::test]
async fn test_reorder_images() {
    let app = setup_test_app().await;
    let vendor = Uuid::new_v4();
    let created = create_with_images(
        &app,
        vendor,
        product_form("Desk Lamp")
            .add_part("images", image_part(png(200, 200), "a.png", "image/png"))
            .add_part("images", image_part(png(210, 210), "b.png", "image/png"))
            .add_part("images", image_part(png(220, 220), "c.png", "image/png")),
    )
    .await;
    let id = created["product"]["id"].as_str().unwrap().to_string();
    let before = image_urls(&created["product"]["images"]);

    let response = app
        .client()
        .put(&api_path(&format!("/products/{}/images/reorder", id)))
        .add_header("Authorization", vendor_bearer(vendor))
        .json(&json!({ "newOrder": [2, 0, 1] }))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["message"], "Images reordered successfully");
    let after = image_urls(&body["images"]);
    assert_eq!(after, vec![before[2].clone(), before[0].clone(), before[1].clone()]);
    let orders: Vec<u64> = body["images"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["order"].as_u64().unwrap())
        .collect();
    assert_eq!(orders, vec![0, 1, 2]);

    for bad in [json!([0, 0, 1]), json!([0, 1]), json!([0, 1, 3])] {
        let response = app
            .client()
            .put(&api_path(&format!("/products/{}/images/reorder", id)))
            .add_header("Authorization", vendor_bearer(vendor))
            .json(&json!({ "newOrder": bad }))
            .await;
        assert_eq!(response.status_code(), 400);
    }
}

#[tokio::test]
async fn test_delete_image_by_index() {
    let app = setup_test_app().await;
    let vendor = Uuid::new_v4();
    let created = create_with_images(
        &app,
        vendor,
        product_form("Desk Lamp")
            .add_part("images", image_part(png(200, 200), "a.png", "image/png"))
            .add_part("images", image_part(png(200, 200), "b.png", "image/png")),
    )
    .await;
    let id = created["product"]["id"].as_str().unwrap().to_string();
    let urls = image_urls(&created["product"]["images"]);

    let response = app
        .client()
        .delete(&api_path(&format!("/products/{}/images/5", id)))
        .add_header("Authorization", vendor_bearer(vendor))
        .await;
    assert_eq!(response.status_code(), 400);

    let response = app
        .client()
        .delete(&api_path(&format!("/products/{}/images/0", id)))
        .add_header("Authorization", vendor_bearer(vendor))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["message"], "Image deleted successfully");
    assert_eq!(image_urls(&body["images"]), vec![urls[1].clone()]);
    assert_eq!(body["images"][0]["order"], 0);
    assert_eq!(app.files_in(app.image_dir()).len(), 1);
}

#[tokio::test]
async fn test_delete_product_removes_image_files() {
    let app = setup_test_app().await;
    let vendor = Uuid::new_v4();
    let created = create_with_images(
        &app,
        vendor,
        product_form("Desk Lamp")
            .add_part("images", image_part(jpeg(300, 200), "a.jpg", "image/jpeg")),
    )
    .await;
    let id = created["product"]["id"].as_str().unwrap().to_string();
    assert_eq!(app.files_in(app.image_dir()).len(), 1);

    let response = app
        .client()
        .delete(&api_path(&format!("/products/{}", id)))
        .add_header("Authorization", vendor_bearer(vendor))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["message"], "Product deleted successfully");
    assert!(app.files_in(app.image_dir()).is_empty());

    let response = app
        .client()
        .delete(&api_path(&format!("/products/{}", id)))
        .add_header("Authorization", vendor_bearer(vendor))
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_stored_images_are_served() {
    let app = setup_test_app().await;
    let created = create_with_images(
        &app,
        Uuid::new_v4(),
        product_form("Desk Lamp")
            .add_part("images", image_part(png(150, 150), "a.png", "image/png")),
    )
    .await;
    let url = created["product"]["images"][0]["url"].as_str().unwrap().to_string();

    let response = app.client().get(&url).await;

    assert_eq!(response.status_code(), 200);
    assert!(response.as_bytes().starts_with(&[0x89, b'P', b'N', b'G']));
}

#[tokio::test]
async fn test_health() {
    let app = setup_test_app().await;

    let response = app.client().get("/health").await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}
