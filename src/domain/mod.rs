pub mod entry;
pub mod store;
pub mod summary;

pub use entry::*;
pub use store::*;
pub use summary::*;
