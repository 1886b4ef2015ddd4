use crate::domain::order::LineRequest;
use crate::domain::product::ProductId;
use crate::error::{OrderError, Result};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct CartRow {
    product_id: ProductId,
    quantity: i64,
}

/// Reads cart lines (`product_id,quantity`) from a CSV source.
///
/// Wraps `csv::Reader`, trimming whitespace around fields. Values are passed through
/// as-is; zero or negative quantities are left for order validation to reject.
pub struct CartReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CartReader<R> {
    /// Creates a new `CartReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes cart lines.
    pub fn lines(self) -> impl Iterator<Item = Result<LineRequest>> {
        self.reader.into_deserialize().map(|row| {
            row.map(|CartRow { product_id, quantity }| LineRequest::new(product_id, quantity))
                .map_err(OrderError::from)
        })
    }

    /// Reads the whole cart, stopping at the first malformed row.
    pub fn read_all(self) -> Result<Vec<LineRequest>> {
        self.lines().collect()
    }
}
