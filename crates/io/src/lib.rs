// File I/O adapters around the resolve engine

pub mod csv;
pub mod naming;
pub mod normalize;

pub use crate::csv::{read_table, write_table, ReadOptions};
pub use naming::output_filename;
pub use normalize::canonicalize_text;
