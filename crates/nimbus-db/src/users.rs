//! User account repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};

use nimbus_core::{
    Error, PlanTier, Result, UserAccount, UserRepository, VerifiedIdentity,
};

/// PostgreSQL implementation of UserRepository.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

impl PgUserRepository {
    /// Create a new PgUserRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_row(row: sqlx::postgres::PgRow) -> UserAccount {
    let plan: String = row.get("plan");
    let pro_activated_at: Option<DateTime<Utc>> = row.get("pro_activated_at");
    UserAccount {
        user_id: row.get("user_id"),
        email: row.get("email"),
        name: row.get("name"),
        picture: row.get("picture"),
        plan: PlanTier::from_str_loose(&plan),
        created_at: row.get("created_at"),
        last_login_at: row.get("last_login_at"),
        pro_activated_at,
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn upsert_login(&self, identity: &VerifiedIdentity) -> Result<UserAccount> {
        let now = Utc::now();
        let row = sqlx::query(
            r#"
            INSERT INTO app_user (user_id, email, name, picture, plan, created_at, last_login_at)
            VALUES ($1, $2, $3, $4, 'free', $5, $5)
            ON CONFLICT (user_id) DO UPDATE SET
                email = EXCLUDED.email,
                name = EXCLUDED.name,
                picture = EXCLUDED.picture,
                last_login_at = EXCLUDED.last_login_at
            RETURNING user_id, email, name, picture, plan,
                      created_at, last_login_at, pro_activated_at
            "#,
        )
        .bind(&identity.subject)
        .bind(&identity.email)
        .bind(&identity.name)
        .bind(&identity.picture)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(map_row(row))
    }

    async fn get(&self, user_id: &str) -> Result<Option<UserAccount>> {
        let row = sqlx::query(
            r#"
            SELECT user_id, email, name, picture, plan,
                   created_at, last_login_at, pro_activated_at
            FROM app_user
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(map_row))
    }

    async fn plan_for(&self, user_id: &str) -> Result<PlanTier> {
        let plan: Option<String> =
            sqlx::query_scalar("SELECT plan FROM app_user WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(Error::Database)?;

        // Subjects with no account row yet are on the free plan.
        Ok(plan
            .map(|p| PlanTier::from_str_loose(&p))
            .unwrap_or(PlanTier::Free))
    }

    async fn upgrade_to_pro(&self, user_id: &str) -> Result<UserAccount> {
        let row = sqlx::query(
            r#"
            UPDATE app_user
            SET plan = 'pro',
                pro_activated_at = COALESCE(pro_activated_at, $2)
            WHERE user_id = $1
            RETURNING user_id, email, name, picture, plan,
                      created_at, last_login_at, pro_activated_at
            "#,
        )
        .bind(user_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(map_row)
            .ok_or_else(|| Error::NotFound(format!("User {} not found", user_id)))
    }
}
