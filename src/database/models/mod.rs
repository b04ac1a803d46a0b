pub mod lead;
pub mod user;

pub use lead::{Lead, LeadChanges, LeadSource, LeadStatus, NewLead};
pub use user::{NewUser, User, UserRole};
