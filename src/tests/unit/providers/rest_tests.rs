//! REST Catalog Provider Unit Tests
//!
//! Tests for the PostgREST-backed catalog provider including:
//! - Item and category parsing
//! - Auth headers on every call
//! - Error mapping for non-success statuses
//! - Insert requests for new items

use std::time::Duration;

use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::core::catalog::{
    CatalogError, CatalogProvider, ItemDraft, ItemType, RestCatalogProvider,
};

const KEY: &str = "anon-key";

fn provider(server: &MockServer) -> RestCatalogProvider {
    RestCatalogProvider::new(server.uri(), KEY, Duration::from_secs(5)).unwrap()
}

fn item_rows() -> serde_json::Value {
    json!([
        {
            "id": "item-1",
            "name": "Widget",
            "description": "Standard steel widget",
            "type": "product",
            "category_id": "c-parts",
            "category": { "id": "c-parts", "name": "Parts" },
            "enable_sale_info": true,
            "sale_price": 12.5
        },
        {
            "id": "item-2",
            "name": "Consulting Hour",
            "description": null,
            "type": "service",
            "category_id": null,
            "category": null,
            "enable_sale_info": false,
            "sale_price": null
        }
    ])
}

// =============================================================================
// Fetch Tests
// =============================================================================

#[tokio::test]
async fn test_get_items_parses_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(item_rows()))
        .mount(&server)
        .await;

    let items = provider(&server).get_items().await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].name, "Widget");
    assert_eq!(items[0].kind, ItemType::Product);
    assert_eq!(items[0].category_name(), Some("Parts"));
    assert_eq!(items[0].display_price(), Some(Decimal::new(125, 1)));
    assert_eq!(items[1].kind, ItemType::Service);
    assert_eq!(items[1].description, None);
    assert_eq!(items[1].display_price(), None);
}

#[tokio::test]
async fn test_get_items_embeds_category() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/items"))
        .and(query_param("select", "*,category:item_categories(id,name)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let items = provider(&server).get_items().await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_requests_carry_api_key_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/item_categories"))
        .and(header("apikey", KEY))
        .and(header("Authorization", "Bearer anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "c-labour", "name": "Labour" },
            { "id": "c-parts", "name": "Parts" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let categories = provider(&server).get_categories().await.unwrap();

    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].name, "Labour");
    assert_eq!(categories[1].id, "c-parts");
}

#[tokio::test]
async fn test_categories_ordered_by_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/item_categories"))
        .and(query_param("order", "name.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    provider(&server).get_categories().await.unwrap();
}

// =============================================================================
// Error Handling Tests
// =============================================================================

#[tokio::test]
async fn test_server_error_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/items"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let err = provider(&server).get_items().await.unwrap_err();

    match &err {
        CatalogError::Api { status, message } => {
            assert_eq!(*status, 500);
            assert_eq!(message, "upstream down");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert_eq!(err.user_message(), "Failed to load items.");
}

#[tokio::test]
async fn test_unauthorized_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/items"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
        .mount(&server)
        .await;

    let err = provider(&server).get_items().await.unwrap_err();
    assert!(matches!(err, CatalogError::Api { status: 401, .. }));
}

#[tokio::test]
async fn test_malformed_body_maps_to_json_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/items"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = provider(&server).get_items().await.unwrap_err();
    assert!(matches!(err, CatalogError::Json(_)));
}

#[tokio::test]
async fn test_unreachable_backend_maps_to_http_error() {
    // Nothing listens on port 1
    let provider =
        RestCatalogProvider::new("http://127.0.0.1:1", KEY, Duration::from_secs(2)).unwrap();
    let err = provider.get_items().await.unwrap_err();
    assert!(matches!(err, CatalogError::Http(_)));
}

// =============================================================================
// Create Tests
// =============================================================================

#[tokio::test]
async fn test_create_item_posts_draft() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/items"))
        .and(header("Prefer", "return=representation"))
        .and(header("apikey", KEY))
        .and(body_partial_json(json!({
            "name": "Drill Bit",
            "type": "product",
            "category_id": "c-parts",
            "enable_sale_info": true
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": "item-9",
            "name": "Drill Bit",
            "type": "product",
            "category_id": "c-parts",
            "category": { "id": "c-parts", "name": "Parts" },
            "enable_sale_info": true,
            "sale_price": 4.25
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let mut draft = ItemDraft::new("  Drill Bit ", ItemType::Product);
    draft.category_id = Some("c-parts".into());
    draft.sale_price_enabled = true;
    draft.sale_price = Some(Decimal::new(425, 2));

    let created = provider(&server).create_item(draft).await.unwrap();

    assert_eq!(created.id, "item-9");
    assert_eq!(created.category_name(), Some("Parts"));
    assert_eq!(created.display_price(), Some(Decimal::new(425, 2)));
}

#[tokio::test]
async fn test_create_item_validates_before_sending() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let err = provider(&server)
        .create_item(ItemDraft::new("   ", ItemType::Service))
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::Validation(_)));
    assert_eq!(err.user_message(), "name is required");
}

#[tokio::test]
async fn test_create_item_empty_response_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/items"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = provider(&server)
        .create_item(ItemDraft::new("Gasket", ItemType::Product))
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::Unavailable(_)));
}

// =============================================================================
// Update Tests
// =============================================================================

#[tokio::test]
async fn test_update_item_patches_by_id() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/items"))
        .and(query_param("id", "eq.item-1"))
        .and(header("Prefer", "return=representation"))
        .and(header("apikey", KEY))
        .and(body_partial_json(json!({
            "name": "Widget, large",
            "type": "product"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "item-1",
            "name": "Widget, large",
            "type": "product",
            "category_id": "c-parts",
            "category": { "id": "c-parts", "name": "Parts" },
            "enable_sale_info": true,
            "sale_price": 24.5
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let mut draft = ItemDraft::new("Widget, large", ItemType::Product);
    draft.category_id = Some("c-parts".into());
    draft.sale_price_enabled = true;
    draft.sale_price = Some(Decimal::new(245, 1));

    let updated = provider(&server)
        .update_item("item-1", draft)
        .await
        .unwrap();

    assert_eq!(updated.id, "item-1");
    assert_eq!(updated.name, "Widget, large");
    assert_eq!(updated.display_price(), Some(Decimal::new(245, 1)));
}

#[tokio::test]
async fn test_update_missing_item_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = provider(&server)
        .update_item("gone", ItemDraft::new("Ghost", ItemType::Service))
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::NotFound(_)));
    assert_eq!(err.user_message(), "Item no longer exists.");
}

// =============================================================================
// Category Tests
// =============================================================================

#[tokio::test]
async fn test_create_category_posts_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/item_categories"))
        .and(header("Prefer", "return=representation"))
        .and(header("Authorization", "Bearer anon-key"))
        .and(body_partial_json(json!({ "name": "Freight" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            { "id": "c-freight", "name": "Freight" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let category = provider(&server)
        .create_category("  Freight ")
        .await
        .unwrap();

    assert_eq!(category.id, "c-freight");
    assert_eq!(category.name, "Freight");
}

#[tokio::test]
async fn test_create_category_conflict_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/item_categories"))
        .respond_with(ResponseTemplate::new(409).set_body_string("duplicate key"))
        .mount(&server)
        .await;

    let err = provider(&server)
        .create_category("Parts")
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Api { status: 409, .. }));
}

#[tokio::test]
async fn test_blank_category_never_hits_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let err = provider(&server).create_category("  ").await.unwrap_err();
    assert!(matches!(err, CatalogError::Validation(_)));
}
