//! Domain Layer
//!
//! Entities, value objects, ports and the pure locale policy.

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use value_objects::{Catalog, Environment};
