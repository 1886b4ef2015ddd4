use super::money::Money;
use super::product::ProductId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque, randomly generated order reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Generates a fresh identifier. Random (v4) so it carries no sequence information.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for OrderId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for OrderId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub address: String,
}

impl Customer {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            address: address.into(),
        }
    }

    /// Trims every field; returns the name of the first empty one.
    pub fn normalized(&self) -> Result<Self, &'static str> {
        let field = |value: &str, name: &'static str| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Err(name)
            } else {
                Ok(trimmed.to_owned())
            }
        };
        Ok(Self {
            name: field(&self.name, "name")?,
            email: field(&self.email, "email")?,
            address: field(&self.address, "address")?,
        })
    }
}

/// One requested `(product, quantity)` pair as submitted by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRequest {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl LineRequest {
    pub fn new(product_id: ProductId, quantity: i64) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub customer: Customer,
    pub items: Vec<LineRequest>,
}

/// A line priced against the catalog at validation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedLineItem {
    pub product_id: ProductId,
    pub name: String,
    #[serde(alias = "price")]
    pub unit_price: Money,
    pub quantity: u64,
    pub line_total: Money,
}

impl PricedLineItem {
    /// Prices `quantity` units. `None` if the line total is out of range.
    pub fn try_new(
        product_id: ProductId,
        name: String,
        unit_price: Money,
        quantity: u64,
    ) -> Option<Self> {
        Some(Self {
            product_id,
            name,
            unit_price,
            quantity,
            line_total: unit_price.checked_times(quantity)?,
        })
    }
}

/// A committed ledger record. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub customer: Customer,
    pub items: Vec<PricedLineItem>,
    pub total: Money,
}

impl Order {
    /// Checks that every line total and the order total follow the rounding rule.
    pub fn is_consistent(&self) -> bool {
        !self.items.is_empty()
            && self
                .items
                .iter()
                .all(|it| it.unit_price.checked_times(it.quantity) == Some(it.line_total))
            && Money::checked_sum(self.items.iter().map(|it| &it.line_total)) == Some(self.total)
    }
}

/// What the caller gets back for a confirmed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    pub total: Money,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_order_ids_are_unique() {
        let ids: std::collections::HashSet<_> = (0..1000).map(|_| OrderId::generate()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_customer_normalization() {
        let customer = Customer::new("  Ada ", "ada@example.com", " 1 Main St ");
        let normalized = customer.normalized().unwrap();
        assert_eq!(normalized.name, "Ada");
        assert_eq!(normalized.address, "1 Main St");

        let missing = Customer::new("Ada", "   ", "1 Main St");
        assert_eq!(missing.normalized(), Err("email"));
    }

    #[test]
    fn test_line_request_uses_camel_case() {
        let line: LineRequest = serde_json::from_str(r#"{"productId": 4, "quantity": 2}"#).unwrap();
        assert_eq!(line, LineRequest::new(4, 2));
    }

    #[test]
    fn test_order_consistency_check() {
        let price = Money::try_new(dec!(9.99)).unwrap();
        let item = PricedLineItem::try_new(1, "Mug".into(), price, 2).unwrap();
        let mut order = Order {
            id: OrderId::generate(),
            created_at: Utc::now(),
            customer: Customer::new("Ada", "ada@example.com", "1 Main St"),
            items: vec![item],
            total: Money::try_new(dec!(19.98)).unwrap(),
        };
        assert!(order.is_consistent());

        order.total = Money::try_new(dec!(19.99)).unwrap();
        assert!(!order.is_consistent());
    }

    #[test]
    fn test_line_item_accepts_legacy_price_key() {
        let json = r#"{"productId": 1, "name": "Mug", "price": 9.99, "quantity": 2, "lineTotal": 19.98}"#;
        let item: PricedLineItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.unit_price.value(), dec!(9.99));
        assert_eq!(item.line_total.value(), dec!(19.98));

        let written = serde_json::to_value(&item).unwrap();
        assert_eq!(written["unitPrice"], "9.99");
    }
}
