//! Integration tests for Plateful.
//!
//! The tests in `tests/` drive the storefront library against [`Backend`], an
//! in-process fake of the ordering service built on axum. It keeps menu,
//! orders and reviews in memory and records what it was sent, so tests can
//! assert on the exact requests.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p plateful-integration-tests
//! ```

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path as UrlPath, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use plateful_core::CurrencyCode;
use plateful_storefront::config::ApiConfig;
use plateful_storefront::notify::{ChannelNotifier, Notification};
use plateful_storefront::{AppContext, StorefrontConfig, StorefrontError};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::mpsc::UnboundedReceiver;
use url::Url;

/// Timestamp the fake stamps on everything it creates.
pub const CREATED_AT: &str = "2026-03-01T18:30:00Z";

/// Fake ordering backend state. Clones share the same data.
#[derive(Clone, Default)]
pub struct Backend {
    inner: Arc<Mutex<BackendData>>,
}

#[derive(Default)]
struct BackendData {
    menu: Vec<Value>,
    orders: Vec<Value>,
    reviews: Vec<Value>,
    next_id: u64,
    menu_requests: usize,
    fail_orders: bool,
    authorization: Option<String>,
}

impl Backend {
    /// A backend serving `menu`.
    #[must_use]
    pub fn with_menu(menu: Vec<Value>) -> Self {
        let backend = Self::default();
        backend.data().menu = menu;
        backend
    }

    /// Make `POST /orders` answer 503.
    pub fn fail_orders(&self, fail: bool) {
        self.data().fail_orders = fail;
    }

    /// Orders received so far, oldest first.
    #[must_use]
    pub fn orders(&self) -> Vec<Value> {
        self.data().orders.clone()
    }

    /// Reviews currently stored.
    #[must_use]
    pub fn reviews(&self) -> Vec<Value> {
        self.data().reviews.clone()
    }

    /// How many menu requests reached the backend.
    #[must_use]
    pub fn menu_requests(&self) -> usize {
        self.data().menu_requests
    }

    /// `Authorization` header of the last menu request.
    #[must_use]
    pub fn last_authorization(&self) -> Option<String> {
        self.data().authorization.clone()
    }

    /// Serve the backend on an ephemeral local port and return its base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn spawn(&self) -> std::io::Result<Url> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = router(self.clone());
        tokio::spawn(async move { axum::serve(listener, app).await });
        Url::parse(&format!("http://{addr}/")).map_err(std::io::Error::other)
    }

    fn data(&self) -> MutexGuard<'_, BackendData> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BackendData {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn menu_item(&self, item_id: &str) -> Option<&Value> {
        self.menu.iter().find(|item| item["itemId"] == item_id)
    }
}

/// A small menu: two dishes on offer, one sold out.
#[must_use]
pub fn sample_menu() -> Vec<Value> {
    vec![
        json!({
            "itemId": "ramen",
            "displayName": "Tonkotsu Ramen",
            "description": "Pork broth, chashu, soft egg",
            "unitPrice": 12.5,
            "imageRef": "https://img.plateful.test/ramen.jpg",
            "category": "noodles",
            "spiceLevel": 2
        }),
        json!({
            "itemId": "gyoza",
            "displayName": "Gyoza",
            "unitPrice": 6,
            "category": "sides"
        }),
        json!({
            "itemId": "matcha-cake",
            "displayName": "Matcha Cake",
            "unitPrice": 7.25,
            "category": "desserts",
            "available": false
        }),
    ]
}

/// Configuration pointing at `base_url` and persisting under `data_dir`.
#[must_use]
pub fn config(base_url: Url, data_dir: &Path) -> StorefrontConfig {
    StorefrontConfig {
        api: ApiConfig::new(base_url),
        data_dir: data_dir.to_path_buf(),
        currency: CurrencyCode::USD,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// Build an application context that persists to files under
/// `config.data_dir` and forwards notifications to the returned receiver.
///
/// # Errors
///
/// Returns an error if the context cannot be built.
pub async fn context(
    config: StorefrontConfig,
) -> Result<(AppContext, UnboundedReceiver<Notification>), StorefrontError> {
    let (notifier, rx) = ChannelNotifier::new();
    let ctx = AppContext::with_notifier(config, Arc::new(notifier)).await?;
    Ok((ctx, rx))
}

/// Everything currently waiting in a notification receiver.
pub fn drain(rx: &mut UnboundedReceiver<Notification>) -> Vec<Notification> {
    let mut out = Vec::new();
    while let Ok(notification) = rx.try_recv() {
        out.push(notification);
    }
    out
}

// ============================================================================
// Routes
// ============================================================================

fn router(backend: Backend) -> Router {
    Router::new()
        .route("/menu", get(list_menu))
        .route("/menu/{id}", get(get_menu_item))
        .route("/menu/{id}/reviews", get(list_reviews))
        .route("/orders", post(create_order).get(list_orders))
        .route("/orders/{id}", get(get_order))
        .route("/reviews", post(create_review))
        .route("/reviews/{id}", put(update_review).delete(delete_review))
        .route("/admin/orders", get(list_all_orders))
        .route("/admin/orders/{id}", patch(update_order_status))
        .with_state(backend)
}

#[derive(Deserialize)]
struct MenuQuery {
    category: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrdersQuery {
    user_id: Option<String>,
}

#[derive(Deserialize)]
struct StatusQuery {
    status: Option<String>,
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "not found").into_response()
}

fn unprocessable(message: &str) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, message.to_string()).into_response()
}

fn valid_rating(body: &Value) -> bool {
    body["rating"].as_i64().is_some_and(|r| (1..=5).contains(&r))
}

async fn list_menu(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Query(query): Query<MenuQuery>,
) -> Json<Vec<Value>> {
    let mut data = backend.data();
    data.menu_requests += 1;
    data.authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let items = data
        .menu
        .iter()
        .filter(|item| {
            query
                .category
                .as_deref()
                .is_none_or(|c| item["category"] == c)
        })
        .cloned()
        .collect();
    Json(items)
}

async fn get_menu_item(State(backend): State<Backend>, UrlPath(id): UrlPath<String>) -> Response {
    let mut data = backend.data();
    data.menu_requests += 1;
    match data.menu_item(&id) {
        Some(item) => Json(item.clone()).into_response(),
        None => not_found(),
    }
}

async fn list_reviews(State(backend): State<Backend>, UrlPath(id): UrlPath<String>) -> Response {
    let data = backend.data();
    if data.menu_item(&id).is_none() {
        return not_found();
    }
    let reviews: Vec<Value> = data
        .reviews
        .iter()
        .filter(|review| review["itemId"] == id.as_str())
        .cloned()
        .collect();
    Json(reviews).into_response()
}

async fn create_order(State(backend): State<Backend>, Json(body): Json<Value>) -> Response {
    let mut data = backend.data();
    if data.fail_orders {
        return (StatusCode::SERVICE_UNAVAILABLE, "kitchen closed").into_response();
    }
    let Some(items) = body["items"].as_array().filter(|items| !items.is_empty()) else {
        return unprocessable("order has no items");
    };

    let items: Vec<Value> = items
        .iter()
        .map(|item| {
            let mut item = item.clone();
            let name = item["itemId"]
                .as_str()
                .and_then(|id| data.menu_item(id))
                .map(|menu_item| menu_item["displayName"].clone());
            if let (Some(name), Some(fields)) = (name, item.as_object_mut()) {
                fields.insert("displayName".to_string(), name);
            }
            item
        })
        .collect();

    let order = json!({
        "orderId": data.next_id("o"),
        "userId": body["userId"],
        "items": items,
        "totalAmount": body["totalAmount"],
        "status": "pending",
        "createdAt": CREATED_AT,
    });
    data.orders.push(order.clone());
    (StatusCode::CREATED, Json(order)).into_response()
}

async fn list_orders(
    State(backend): State<Backend>,
    Query(query): Query<OrdersQuery>,
) -> Json<Vec<Value>> {
    let data = backend.data();
    let orders = data
        .orders
        .iter()
        .rev()
        .filter(|order| {
            query
                .user_id
                .as_deref()
                .is_none_or(|user| order["userId"] == user)
        })
        .cloned()
        .collect();
    Json(orders)
}

async fn get_order(State(backend): State<Backend>, UrlPath(id): UrlPath<String>) -> Response {
    let data = backend.data();
    data.orders
        .iter()
        .find(|order| order["orderId"] == id.as_str())
        .map_or_else(not_found, |order| Json(order.clone()).into_response())
}

async fn create_review(State(backend): State<Backend>, Json(body): Json<Value>) -> Response {
    if !valid_rating(&body) {
        return unprocessable("rating must be between 1 and 5");
    }
    let mut data = backend.data();
    let Some(item_id) = body["itemId"].as_str() else {
        return unprocessable("itemId is required");
    };
    if data.menu_item(item_id).is_none() {
        return not_found();
    }

    let mut review = json!({
        "reviewId": data.next_id("r"),
        "itemId": item_id,
        "userId": body["userId"],
        "rating": body["rating"],
        "createdAt": CREATED_AT,
    });
    if let (Some(comment), Some(fields)) = (body.get("comment"), review.as_object_mut()) {
        fields.insert("comment".to_string(), comment.clone());
    }
    data.reviews.push(review.clone());
    (StatusCode::CREATED, Json(review)).into_response()
}

async fn update_review(
    State(backend): State<Backend>,
    UrlPath(id): UrlPath<String>,
    Json(body): Json<Value>,
) -> Response {
    if !valid_rating(&body) {
        return unprocessable("rating must be between 1 and 5");
    }
    let mut data = backend.data();
    let Some(review) = data
        .reviews
        .iter_mut()
        .find(|review| review["reviewId"] == id.as_str())
    else {
        return not_found();
    };

    review["rating"] = body["rating"].clone();
    review["comment"] = body.get("comment").cloned().unwrap_or(Value::Null);
    review["updatedAt"] = Value::from(CREATED_AT);
    Json(review.clone()).into_response()
}

async fn delete_review(State(backend): State<Backend>, UrlPath(id): UrlPath<String>) -> Response {
    let mut data = backend.data();
    let before = data.reviews.len();
    data.reviews.retain(|review| review["reviewId"] != id.as_str());
    if data.reviews.len() == before {
        return not_found();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn list_all_orders(
    State(backend): State<Backend>,
    Query(query): Query<StatusQuery>,
) -> Json<Vec<Value>> {
    let data = backend.data();
    let orders = data
        .orders
        .iter()
        .rev()
        .filter(|order| {
            query
                .status
                .as_deref()
                .is_none_or(|status| order["status"] == status)
        })
        .cloned()
        .collect();
    Json(orders)
}

async fn update_order_status(
    State(backend): State<Backend>,
    UrlPath(id): UrlPath<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut data = backend.data();
    let Some(order) = data
        .orders
        .iter_mut()
        .find(|order| order["orderId"] == id.as_str())
    else {
        return not_found();
    };
    order["status"] = body["status"].clone();
    Json(order.clone()).into_response()
}
