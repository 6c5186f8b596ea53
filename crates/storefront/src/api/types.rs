//! Request and response bodies of the ordering backend.
//!
//! Field names are camelCase on the wire. Money amounts are JSON numbers and
//! decoded into [`Decimal`]; unknown menu attributes are preserved.

use chrono::{DateTime, Utc};
use plateful_core::{CartLine, ItemId, OrderId, OrderStatus, Product, Rating, ReviewId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// Menu
// =============================================================================

/// A dish on the menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub item_id: ItemId,
    pub display_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    #[serde(default)]
    pub image_ref: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Whether the kitchen currently offers the dish.
    #[serde(default = "default_available")]
    pub available: bool,
    /// Any other catalog attributes.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

const fn default_available() -> bool {
    true
}

impl MenuItem {
    /// The product descriptor added to the cart for this dish.
    ///
    /// Category and extra attributes ride along on the cart line.
    #[must_use]
    pub fn to_product(&self) -> Product {
        let mut attributes = self.attributes.clone();
        if let Some(category) = &self.category {
            attributes.insert("category".to_string(), Value::String(category.clone()));
        }
        Product {
            item_id: self.item_id.clone(),
            display_name: self.display_name.clone(),
            unit_price: self.unit_price,
            image_ref: self.image_ref.clone(),
            attributes,
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

/// One line of an order submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub item_id: ItemId,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
}

impl From<&CartLine> for OrderItemRequest {
    fn from(line: &CartLine) -> Self {
        Self {
            item_id: line.item_id.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
        }
    }
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub user_id: UserId,
    pub items: Vec<OrderItemRequest>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
}

impl OrderRequest {
    /// Build the submission for a set of cart lines.
    #[must_use]
    pub fn from_lines(user_id: UserId, lines: &[CartLine]) -> Self {
        Self {
            user_id,
            items: lines.iter().map(OrderItemRequest::from).collect(),
            total_amount: lines.iter().map(CartLine::line_total).sum(),
        }
    }
}

/// One line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub item_id: ItemId,
    #[serde(default)]
    pub display_name: Option<String>,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    #[serde(default)]
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

/// Body of `PATCH /admin/orders/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

// =============================================================================
// Reviews
// =============================================================================

/// A review left on a dish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub review_id: ReviewId,
    pub item_id: ItemId,
    pub user_id: UserId,
    pub rating: Rating,
    #[serde(default)]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of `POST /reviews`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub item_id: ItemId,
    pub user_id: UserId,
    pub rating: Rating,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Body of `PUT /reviews/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewUpdate {
    pub rating: Rating,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_item_defaults_and_passthrough() {
        let item: MenuItem = serde_json::from_str(
            r#"{"itemId":"ramen","displayName":"Tonkotsu Ramen","unitPrice":13.5,
                "category":"noodles","spiceLevel":2}"#,
        )
        .unwrap();
        assert!(item.available);
        assert_eq!(item.unit_price, Decimal::new(135, 1));
        assert_eq!(item.attributes.get("spiceLevel"), Some(&Value::from(2)));

        let product = item.to_product();
        assert_eq!(product.item_id, ItemId::new("ramen"));
        assert_eq!(product.attributes.get("category"), Some(&Value::from("noodles")));
        assert_eq!(product.attributes.get("spiceLevel"), Some(&Value::from(2)));
    }

    #[test]
    fn test_order_request_shape() {
        let lines: Vec<CartLine> = serde_json::from_str(
            r#"[{"itemId":"A","displayName":"Ramen","unitPrice":12.5,"quantity":2},
                {"itemId":"B","displayName":"Gyoza","unitPrice":6,"quantity":1}]"#,
        )
        .unwrap();
        let request = OrderRequest::from_lines(UserId::new("u1"), &lines);
        assert_eq!(request.total_amount, Decimal::new(31, 0));

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "userId": "u1",
                "items": [
                    {"itemId": "A", "quantity": 2, "unitPrice": 12.5},
                    {"itemId": "B", "quantity": 1, "unitPrice": 6.0}
                ],
                "totalAmount": 31.0
            })
        );
    }

    #[test]
    fn test_order_decodes() {
        let order: Order = serde_json::from_str(
            r#"{"orderId":"o1","userId":"u1","status":"out_for_delivery",
                "createdAt":"2026-03-01T18:30:00Z","totalAmount":25,
                "items":[{"itemId":"A","quantity":2,"unitPrice":12.5}]}"#,
        )
        .unwrap();
        assert_eq!(order.status, OrderStatus::OutForDelivery);
        assert_eq!(order.item_count(), 2);
        assert_eq!(order.total_amount, Decimal::new(25, 0));
    }

    #[test]
    fn test_review_rejects_bad_rating() {
        let raw = r#"{"reviewId":"r1","itemId":"A","userId":"u1","rating":7,
                      "createdAt":"2026-03-01T18:30:00Z"}"#;
        assert!(serde_json::from_str::<Review>(raw).is_err());
    }
}
