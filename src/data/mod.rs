//! Data layer: schema, loading, and filtering.
//!
//! Architecture:
//! ```text
//!  .json (nested) / .csv / .parquet (flat, dotted columns)
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  flatten → FlatRecord → coerce → Passenger
//!   └──────────┘
//!        │
//!        ▼
//!   ┌────────────────┐
//!   │ PassengerTable │  Vec<Passenger>, read-only after load
//!   └────────────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  FilterSelection → conjunctive RowPredicate
//!   └──────────┘
//! ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod schema;
