use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{PgConnection, PgExecutor, PgPool};
use std::collections::BTreeMap;

use crate::common::{BusinessId, UserId};

/// Business - a listing that collects reviews and can be claimed by an owner
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Business {
    pub id: BusinessId,
    pub name: String,

    // Written only by the aggregation engine
    pub aggregate_rating: f64,
    pub micro_metrics_aggregates: Json<BTreeMap<String, f64>>,

    // Written only by the claim resolver
    pub claim_status: String, // 'unclaimed', 'pending', 'approved'
    pub owner_id: Option<UserId>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Projection of a business's claims
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BusinessClaimStatus {
    Unclaimed,
    Pending,
    Approved,
}

impl std::fmt::Display for BusinessClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BusinessClaimStatus::Unclaimed => write!(f, "unclaimed"),
            BusinessClaimStatus::Pending => write!(f, "pending"),
            BusinessClaimStatus::Approved => write!(f, "approved"),
        }
    }
}

impl std::str::FromStr for BusinessClaimStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "unclaimed" => Ok(BusinessClaimStatus::Unclaimed),
            "pending" => Ok(BusinessClaimStatus::Pending),
            "approved" => Ok(BusinessClaimStatus::Approved),
            _ => Err(anyhow::anyhow!("Invalid business claim status: {}", s)),
        }
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Business {
    pub async fn find_by_id<'e>(
        id: BusinessId,
        executor: impl PgExecutor<'e>,
    ) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM businesses WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Lock the business row for the rest of the transaction.
    ///
    /// Aggregate recomputation and claim resolution both serialize here.
    pub async fn lock(id: BusinessId, conn: &mut PgConnection) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM businesses WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    pub async fn create(name: &str, pool: &PgPool) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Self>("INSERT INTO businesses (id, name) VALUES ($1, $2) RETURNING *")
            .bind(BusinessId::new())
            .bind(name)
            .fetch_one(pool)
            .await
    }

    pub async fn find_all_ids(pool: &PgPool) -> sqlx::Result<Vec<BusinessId>> {
        sqlx::query_scalar::<_, BusinessId>("SELECT id FROM businesses ORDER BY created_at")
            .fetch_all(pool)
            .await
    }

    /// Overwrite both aggregate fields in one statement
    pub async fn update_aggregates(
        id: BusinessId,
        aggregate_rating: f64,
        micro_metrics_aggregates: &BTreeMap<String, f64>,
        conn: &mut PgConnection,
    ) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            UPDATE businesses
            SET
                aggregate_rating = $2,
                micro_metrics_aggregates = $3,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(aggregate_rating)
        .bind(Json(micro_metrics_aggregates))
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Assign the owner, guarded so an approved business is never re-approved.
    ///
    /// Returns false when the guard rejected the update.
    pub async fn assign_owner(
        id: BusinessId,
        owner_id: UserId,
        conn: &mut PgConnection,
    ) -> sqlx::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE businesses
            SET
                owner_id = $2,
                claim_status = 'approved',
                updated_at = NOW()
            WHERE id = $1
              AND claim_status <> 'approved'
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// `unclaimed -> pending`; other states are left alone
    pub async fn mark_claim_pending(id: BusinessId, conn: &mut PgConnection) -> sqlx::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE businesses
            SET claim_status = 'pending', updated_at = NOW()
            WHERE id = $1 AND claim_status = 'unclaimed'
            "#,
        )
        .bind(id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// `pending -> unclaimed`; an approved business never regresses
    pub async fn reset_pending_to_unclaimed(
        id: BusinessId,
        conn: &mut PgConnection,
    ) -> sqlx::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE businesses
            SET claim_status = 'unclaimed', updated_at = NOW()
            WHERE id = $1 AND claim_status = 'pending'
            "#,
        )
        .bind(id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub fn claim_status(&self) -> anyhow::Result<BusinessClaimStatus> {
        self.claim_status.parse()
    }
}
