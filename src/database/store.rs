use async_trait::async_trait;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{Lead, LeadChanges, NewLead, NewUser, User};
use crate::filter::CompiledFilter;

/// Offset pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u64,
}

impl Page {
    /// `page` is 1-based
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            limit,
            offset: u64::from(page.saturating_sub(1)) * u64::from(limit),
        }
    }
}

#[async_trait]
pub trait LeadStore: Send + Sync {
    async fn create(&self, lead: NewLead) -> Result<Lead, DatabaseError>;

    /// Any lead that already uses this email or phone number
    async fn find_by_email_or_phone(&self, email: &str, phone: &str) -> Result<Option<Lead>, DatabaseError>;

    async fn get(&self, id: Uuid) -> Result<Option<Lead>, DatabaseError>;

    /// Oldest first
    async fn list(&self, page: Page) -> Result<Vec<Lead>, DatabaseError>;

    async fn count(&self) -> Result<i64, DatabaseError>;

    /// Newest first, at most `filter.limit()` records
    async fn find(&self, filter: &CompiledFilter) -> Result<Vec<Lead>, DatabaseError>;

    async fn update(&self, id: Uuid, changes: LeadChanges) -> Result<Option<Lead>, DatabaseError>;

    /// Returns false when no lead had this id
    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User, DatabaseError>;

    async fn get(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    async fn set_refresh_token_hash(&self, id: Uuid, hash: Option<String>) -> Result<(), DatabaseError>;
}
