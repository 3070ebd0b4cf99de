//! Filtered-aggregate statistics over airline passenger satisfaction surveys.
//!
//! The entry point loads a [`PassengerTable`] once and hands it by reference
//! to the [`stats`] functions or to a [`Dashboard`].

pub mod dashboard;
pub mod data;
pub mod error;
pub mod report;
pub mod stats;

pub use dashboard::Dashboard;
pub use data::filter::FilterSelection;
pub use data::loader::load_file;
pub use data::model::PassengerTable;
pub use error::{LoadError, SelectionError};
