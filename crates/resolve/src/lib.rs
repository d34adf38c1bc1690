//! `nugget-resolve` - golden-record entity resolution engine.
//!
//! Pure engine crate: receives a typed, canonicalized table, discovers key
//! fields, groups duplicate records and merges each group into one golden
//! record. No CLI or file IO.

pub mod config;
pub mod engine;
pub mod error;
pub mod group;
pub mod merge;
pub mod model;
pub mod quality;
pub mod sanitize;
pub mod select;

pub use config::{MergePolicy, ResolveConfig, Schema};
pub use engine::run;
pub use error::ResolveError;
pub use model::{Cell, ResolveResult, Table, Value};
pub use quality::FieldScore;
