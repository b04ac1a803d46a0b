use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgArguments, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::manager::{DatabaseError, DatabaseManager};
use super::models::{Lead, LeadChanges, NewLead, NewUser, User};
use super::store::{LeadStore, Page, UserStore};
use crate::filter::{CompiledFilter, FilterWhere, SqlParam};

const LEADS_TABLE: &str = "leads";

/// Postgres-backed implementation of both stores
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, Postgres, O, PgArguments>,
    v: &SqlParam,
) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments> {
    match v {
        SqlParam::Text(s) => q.bind(s.clone()),
        SqlParam::Number(n) => q.bind(*n),
        SqlParam::Bool(b) => q.bind(*b),
        SqlParam::Timestamp(t) => q.bind(*t),
    }
}

/// Writes `, <column> = ` ahead of the bind that follows it
fn push_assignment(qb: &mut QueryBuilder<'_, Postgres>, column: &str) {
    qb.push(", ");
    qb.push(column);
    qb.push(" = ");
}

#[async_trait]
impl LeadStore for PgStore {
    async fn create(&self, lead: NewLead) -> Result<Lead, DatabaseError> {
        let lead = lead.into_lead(Uuid::new_v4(), Utc::now());
        sqlx::query_as::<_, Lead>(
            r#"
            INSERT INTO leads (
                id, first_name, last_name, email, phone, company, city, state, source, status,
                score, lead_value, last_activity_at, is_qualified, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING *
            "#,
        )
        .bind(lead.id)
        .bind(&lead.first_name)
        .bind(&lead.last_name)
        .bind(&lead.email)
        .bind(&lead.phone)
        .bind(&lead.company)
        .bind(&lead.city)
        .bind(&lead.state)
        .bind(&lead.source)
        .bind(&lead.status)
        .bind(lead.score)
        .bind(lead.lead_value)
        .bind(lead.last_activity_at)
        .bind(lead.is_qualified)
        .bind(lead.created_at)
        .bind(lead.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_unique(e, "Lead with this email or phone already exists"))
    }

    async fn find_by_email_or_phone(&self, email: &str, phone: &str) -> Result<Option<Lead>, DatabaseError> {
        let lead = sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE email = $1 OR phone = $2 LIMIT 1")
            .bind(email)
            .bind(phone)
            .fetch_optional(&self.pool)
            .await?;
        Ok(lead)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Lead>, DatabaseError> {
        let lead = sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(lead)
    }

    async fn list(&self, page: Page) -> Result<Vec<Lead>, DatabaseError> {
        let leads = sqlx::query_as::<_, Lead>("SELECT * FROM leads ORDER BY created_at ASC, id ASC LIMIT $1 OFFSET $2")
            .bind(i64::from(page.limit))
            .bind(i64::try_from(page.offset).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;
        Ok(leads)
    }

    async fn count(&self) -> Result<i64, DatabaseError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM leads").fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn find(&self, filter: &CompiledFilter) -> Result<Vec<Lead>, DatabaseError> {
        let sql_result = FilterWhere::select(LEADS_TABLE, filter);
        tracing::debug!(query = %sql_result.query, params = sql_result.params.len(), "lead find");

        let mut q = sqlx::query_as::<_, Lead>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let leads = q.fetch_all(&self.pool).await?;
        Ok(leads)
    }

    async fn update(&self, id: Uuid, changes: LeadChanges) -> Result<Option<Lead>, DatabaseError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE leads SET updated_at = ");
        qb.push_bind(Utc::now());

        let LeadChanges {
            first_name,
            last_name,
            phone,
            company,
            city,
            state,
            source,
            status,
            score,
            lead_value,
            last_activity_at,
            is_qualified,
        } = changes;

        if let Some(v) = first_name { push_assignment(&mut qb, "first_name"); qb.push_bind(v); }
        if let Some(v) = last_name { push_assignment(&mut qb, "last_name"); qb.push_bind(v); }
        if let Some(v) = phone { push_assignment(&mut qb, "phone"); qb.push_bind(v); }
        if let Some(v) = company { push_assignment(&mut qb, "company"); qb.push_bind(v); }
        if let Some(v) = city { push_assignment(&mut qb, "city"); qb.push_bind(v); }
        if let Some(v) = state { push_assignment(&mut qb, "state"); qb.push_bind(v); }
        if let Some(v) = source { push_assignment(&mut qb, "source"); qb.push_bind(v.as_str()); }
        if let Some(v) = status { push_assignment(&mut qb, "status"); qb.push_bind(v.as_str()); }
        if let Some(v) = score { push_assignment(&mut qb, "score"); qb.push_bind(v); }
        if let Some(v) = lead_value { push_assignment(&mut qb, "lead_value"); qb.push_bind(v); }
        if let Some(v) = last_activity_at { push_assignment(&mut qb, "last_activity_at"); qb.push_bind(v); }
        if let Some(v) = is_qualified { push_assignment(&mut qb, "is_qualified"); qb.push_bind(v); }

        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(" RETURNING *");

        qb.build_query_as::<Lead>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_unique(e, "Lead with this phone already exists"))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM leads WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create(&self, user: NewUser) -> Result<User, DatabaseError> {
        let user = user.into_user(Uuid::new_v4(), Utc::now());
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, full_name, email, password_hash, role, refresh_token_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NULL, $6, $7)
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_unique(e, "Email is taken"))
    }

    async fn get(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn set_refresh_token_hash(&self, id: Uuid, hash: Option<String>) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE users SET refresh_token_hash = $1, updated_at = now() WHERE id = $2")
            .bind(hash)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("user {}", id)));
        }
        Ok(())
    }
}
