use crate::domain::money::Money;
use crate::domain::order::{Customer, LineRequest, OrderRequest, PricedLineItem};
use crate::domain::product::{CatalogSnapshot, Decrements, ProductId};
use crate::error::ValidationError;

/// A request that passed validation against a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedOrder {
    pub customer: Customer,
    /// One line per distinct product, in first-appearance order.
    pub items: Vec<PricedLineItem>,
    pub total: Money,
}

impl ValidatedOrder {
    /// Stock the order needs, re-derived from the priced items.
    pub fn decrements(&self) -> Decrements {
        let mut decrements = Decrements::new();
        for item in &self.items {
            let quantity = decrements.entry(item.product_id).or_insert(0);
            *quantity = quantity.saturating_add(item.quantity);
        }
        decrements
    }
}

/// Checks `request` against `snapshot` and prices it. Pure; the first failing rule wins.
///
/// Rules are applied across the whole request one at a time: customer fields, at
/// least one item, every product exists, every quantity is positive, then stock per
/// product with duplicate lines merged.
pub fn validate(
    snapshot: &CatalogSnapshot,
    request: &OrderRequest,
) -> Result<ValidatedOrder, ValidationError> {
    let customer = request
        .customer
        .normalized()
        .map_err(ValidationError::MissingCustomerField)?;

    if request.items.is_empty() {
        return Err(ValidationError::EmptyOrder);
    }

    if let Some(line) = request
        .items
        .iter()
        .find(|line| line.product_id <= 0 || snapshot.get(line.product_id).is_none())
    {
        return Err(ValidationError::ProductNotFound(line.product_id));
    }

    if let Some(line) = request.items.iter().find(|line| line.quantity <= 0) {
        return Err(ValidationError::InvalidQuantity(line.product_id));
    }

    let mut items = Vec::new();
    for (product_id, quantity) in merge_lines(&request.items) {
        let Some(product) = snapshot.get(product_id) else {
            return Err(ValidationError::ProductNotFound(product_id));
        };
        if product.stock < quantity {
            return Err(ValidationError::InsufficientStock {
                id: product_id,
                name: product.name.clone(),
                requested: quantity,
                available: product.stock,
            });
        }
        let item =
            PricedLineItem::try_new(product_id, product.name.clone(), product.price, quantity)
                .ok_or(ValidationError::AmountOutOfRange)?;
        items.push(item);
    }

    let total = Money::checked_sum(items.iter().map(|item| &item.line_total))
        .ok_or(ValidationError::AmountOutOfRange)?;
    Ok(ValidatedOrder {
        customer,
        items,
        total,
    })
}

/// Sums quantities of repeated products, keeping the order products first appear in.
fn merge_lines(lines: &[LineRequest]) -> Vec<(ProductId, u64)> {
    let mut merged: Vec<(ProductId, u64)> = Vec::with_capacity(lines.len());
    for line in lines {
        let quantity = line.quantity.unsigned_abs();
        match merged.iter_mut().find(|(id, _)| *id == line.product_id) {
            Some((_, total)) => *total = total.saturating_add(quantity),
            None => merged.push((line.product_id, quantity)),
        }
    }
    merged
}
