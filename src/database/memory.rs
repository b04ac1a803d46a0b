//! In-process store for local development and tests.
//!
//! Evaluates [`CompiledFilter`] directly against the stored leads instead of
//! going through SQL, with the same ordering and uniqueness rules as the
//! Postgres store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{Lead, LeadChanges, NewLead, NewUser, User};
use super::store::{LeadStore, Page, UserStore};
use crate::filter::CompiledFilter;

#[derive(Default)]
pub struct MemoryStore {
    leads: RwLock<Vec<Lead>>,
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeadStore for MemoryStore {
    async fn create(&self, lead: NewLead) -> Result<Lead, DatabaseError> {
        let mut leads = self.leads.write().await;
        if leads.iter().any(|l| l.email == lead.email || l.phone == lead.phone) {
            return Err(DatabaseError::Conflict("Lead with this email or phone already exists".to_string()));
        }
        let lead = lead.into_lead(Uuid::new_v4(), Utc::now());
        leads.push(lead.clone());
        Ok(lead)
    }

    async fn find_by_email_or_phone(&self, email: &str, phone: &str) -> Result<Option<Lead>, DatabaseError> {
        let leads = self.leads.read().await;
        Ok(leads.iter().find(|l| l.email == email || l.phone == phone).cloned())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Lead>, DatabaseError> {
        let leads = self.leads.read().await;
        Ok(leads.iter().find(|l| l.id == id).cloned())
    }

    async fn list(&self, page: Page) -> Result<Vec<Lead>, DatabaseError> {
        let leads = self.leads.read().await;
        let offset = usize::try_from(page.offset).unwrap_or(usize::MAX);
        Ok(leads.iter().skip(offset).take(page.limit as usize).cloned().collect())
    }

    async fn count(&self) -> Result<i64, DatabaseError> {
        Ok(self.leads.read().await.len() as i64)
    }

    async fn find(&self, filter: &CompiledFilter) -> Result<Vec<Lead>, DatabaseError> {
        let leads = self.leads.read().await;
        // Insertion order is creation order, so newest first is a reverse walk
        Ok(leads
            .iter()
            .rev()
            .filter(|lead| filter.matches(*lead))
            .take(filter.limit() as usize)
            .cloned()
            .collect())
    }

    async fn update(&self, id: Uuid, changes: LeadChanges) -> Result<Option<Lead>, DatabaseError> {
        let mut leads = self.leads.write().await;

        if let Some(phone) = changes.phone.as_deref() {
            if leads.iter().any(|l| l.id != id && l.phone == phone) {
                return Err(DatabaseError::Conflict("Lead with this phone already exists".to_string()));
            }
        }

        let Some(lead) = leads.iter_mut().find(|l| l.id == id) else {
            return Ok(None);
        };
        changes.apply(lead, Utc::now());
        Ok(Some(lead.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut leads = self.leads.write().await;
        let before = leads.len();
        leads.retain(|l| l.id != id);
        Ok(leads.len() != before)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(DatabaseError::Conflict("Email is taken".to_string()));
        }
        let user = user.into_user(Uuid::new_v4(), Utc::now());
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.read().await.values().find(|u| u.email == email).cloned())
    }

    async fn set_refresh_token_hash(&self, id: Uuid, hash: Option<String>) -> Result<(), DatabaseError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound(format!("user {}", id)))?;
        user.refresh_token_hash = hash;
        user.updated_at = Utc::now();
        Ok(())
    }
}
