pub mod arrow;
pub mod derive;
pub mod encode;
pub mod types;

pub use arrow::{build_arrow_schema, table_to_record_batch};
pub use encode::encode_column_names;
pub use types::{Battery, ColumnLayout, ColumnMapping, ColumnNameMap};
