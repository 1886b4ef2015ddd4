//! Domain layer: value objects, entities and the store ports the engine depends on.

pub mod money;
pub mod order;
pub mod ports;
pub mod product;
