mod columns;
pub mod errors;
pub mod model;
mod reader;
pub mod schema;

pub use errors::LoaderError;
pub use model::{ColumnKind, ColumnSchema, LoadedTable, TableSchema};
pub use reader::{load_listings, parse_listings, LoadOptions};
