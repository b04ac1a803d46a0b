pub mod types;
pub mod filter;
pub mod filter_where;
pub mod filter_match;
pub mod error;

pub use types::*;
pub use error::ValidationError;
pub use filter::FilterBuilder;
pub use filter_match::FilterTarget;
pub use filter_where::FilterWhere;
