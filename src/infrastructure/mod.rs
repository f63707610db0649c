pub mod csv_codec;
pub mod duckdb_storage;
pub mod filesystem;
pub mod hooks;
pub mod plugins;
pub mod repository;

#[cfg(test)]
pub mod test_utils;

pub use csv_codec::*;
pub use duckdb_storage::*;
pub use filesystem::*;
pub use hooks::*;
pub use plugins::*;
pub use repository::*;
