pub mod create;
pub mod list;
pub mod query;
pub mod record;
pub mod utils;

// Re-export handler functions for use in routing
pub use create::create;
pub use list::list;
pub use query::{query, quick_query};
pub use record::{delete, get, update};
