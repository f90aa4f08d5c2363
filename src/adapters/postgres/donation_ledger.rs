//! PostgreSQL implementation of the donation ledger ports.
//!
//! Every write runs in one transaction that first lazily creates the campaign
//! row (`INSERT ... ON CONFLICT DO NOTHING`) and then locks it with
//! `SELECT ... FOR UPDATE`. The campaign row is therefore the single
//! serialization point: concurrent deliveries of the same reference queue on
//! it, and only the first sees the donation as new. The donation insert uses
//! `ON CONFLICT (reference) DO NOTHING` as a second guard.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::domain::donation::{
    ApplyOutcome, AuditAction, AuditLogEntry, CampaignAggregate, CampaignStats, DonationEvent,
    DonationProvider, DonationRecord, DonationStatus, DonationUpdates, LedgerError,
    ManualDonation, PublicDonationView, ReceiptToken,
};
use crate::domain::foundation::{AuditEntryId, Currency, DonationReference, MinorUnits, Timestamp};
use crate::ports::{AdminLedger, DonationLedger};

use super::retry::{classify, run_with_retry, AttemptError, RetryPolicy};

/// PostgreSQL implementation of [`DonationLedger`] and [`AdminLedger`].
pub struct PostgresDonationLedger {
    pool: PgPool,
    campaign_id: String,
    goal: MinorUnits,
    retry: RetryPolicy,
}

impl PostgresDonationLedger {
    pub fn new(pool: PgPool, campaign_id: impl Into<String>, goal: MinorUnits) -> Self {
        Self {
            pool,
            campaign_id: campaign_id.into(),
            goal,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Rows
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, sqlx::FromRow)]
struct CampaignRow {
    id: String,
    total_minor_units: i64,
    donation_count: i64,
    goal_minor_units: i64,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CampaignRow> for CampaignAggregate {
    type Error = LedgerError;

    fn try_from(row: CampaignRow) -> Result<Self, Self::Error> {
        Ok(CampaignAggregate {
            id: row.id,
            total_minor_units: MinorUnits::new(to_u64("total_minor_units", row.total_minor_units)?),
            donation_count: to_u64("donation_count", row.donation_count)?,
            goal_minor_units: MinorUnits::new(to_u64("goal_minor_units", row.goal_minor_units)?),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DonationRow {
    reference: String,
    provider: String,
    amount_minor_units: i64,
    currency: String,
    donor_name: String,
    donor_email: Option<String>,
    status: String,
    receipt_token: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DonationRow> for DonationRecord {
    type Error = LedgerError;

    fn try_from(row: DonationRow) -> Result<Self, Self::Error> {
        Ok(DonationRecord {
            reference: DonationReference::new(row.reference).map_err(corrupt)?,
            provider: DonationProvider::parse(&row.provider).map_err(corrupt)?,
            amount_minor_units: MinorUnits::new(to_u64("amount_minor_units", row.amount_minor_units)?),
            currency: Currency::parse(&row.currency).map_err(corrupt)?,
            donor_name: row.donor_name,
            donor_email: row.donor_email,
            status: DonationStatus::parse(&row.status).map_err(corrupt)?,
            receipt_token: row.receipt_token.map(ReceiptToken::from_stored),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PublicDonationRow {
    reference: String,
    provider: String,
    amount_minor_units: i64,
    currency: String,
    donor_name: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PublicDonationRow> for PublicDonationView {
    type Error = LedgerError;

    fn try_from(row: PublicDonationRow) -> Result<Self, Self::Error> {
        Ok(PublicDonationView {
            reference: DonationReference::new(row.reference).map_err(corrupt)?,
            provider: DonationProvider::parse(&row.provider).map_err(corrupt)?,
            amount_minor_units: MinorUnits::new(to_u64("amount_minor_units", row.amount_minor_units)?),
            currency: Currency::parse(&row.currency).map_err(corrupt)?,
            donor_name: row.donor_name,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AuditRow {
    id: Uuid,
    action: String,
    donation_reference: String,
    before_state: Option<serde_json::Value>,
    after_state: Option<serde_json::Value>,
    actor_id: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AuditRow> for AuditLogEntry {
    type Error = LedgerError;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        Ok(AuditLogEntry {
            id: AuditEntryId::from_uuid(row.id),
            action: AuditAction::parse(&row.action).map_err(corrupt)?,
            donation_reference: DonationReference::new(row.donation_reference).map_err(corrupt)?,
            before: row.before_state,
            after: row.after_state,
            actor_id: row.actor_id,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

fn corrupt(err: impl std::fmt::Display) -> LedgerError {
    LedgerError::storage(format!("Invalid stored value: {}", err))
}

fn to_u64(field: &str, value: i64) -> Result<u64, LedgerError> {
    u64::try_from(value)
        .map_err(|_| LedgerError::storage(format!("Negative {} in storage: {}", field, value)))
}

fn to_i64(field: &str, value: u64) -> Result<i64, LedgerError> {
    i64::try_from(value)
        .map_err(|_| LedgerError::storage(format!("{} exceeds storage range: {}", field, value)))
}

// ════════════════════════════════════════════════════════════════════════════
// Statements
// ════════════════════════════════════════════════════════════════════════════

const SELECT_DONATION: &str = r#"
    SELECT reference, provider, amount_minor_units, currency, donor_name, donor_email,
           status, receipt_token, created_at, updated_at
    FROM donations
    WHERE reference = $1
"#;

async fn ensure_campaign(
    conn: &mut PgConnection,
    campaign_id: &str,
    goal: MinorUnits,
) -> Result<(), AttemptError> {
    sqlx::query(
        r#"
        INSERT INTO campaigns (id, goal_minor_units)
        VALUES ($1, $2)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(campaign_id)
    .bind(to_i64("goal_minor_units", goal.value())?)
    .execute(&mut *conn)
    .await
    .map_err(|e| classify("Failed to initialise campaign", e))?;
    Ok(())
}

async fn lock_campaign(
    conn: &mut PgConnection,
    campaign_id: &str,
    goal: MinorUnits,
) -> Result<CampaignAggregate, AttemptError> {
    ensure_campaign(conn, campaign_id, goal).await?;

    let row: Option<CampaignRow> = sqlx::query_as(
        r#"
        SELECT id, total_minor_units, donation_count, goal_minor_units, updated_at
        FROM campaigns
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(campaign_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| classify("Failed to lock campaign", e))?;

    let row = row.ok_or_else(|| LedgerError::CampaignMissing(campaign_id.to_string()))?;
    Ok(CampaignAggregate::try_from(row)?)
}

async fn save_campaign(
    conn: &mut PgConnection,
    campaign: &CampaignAggregate,
) -> Result<(), AttemptError> {
    sqlx::query(
        r#"
        UPDATE campaigns
        SET total_minor_units = $2, donation_count = $3, updated_at = $4
        WHERE id = $1
        "#,
    )
    .bind(&campaign.id)
    .bind(to_i64("total_minor_units", campaign.total_minor_units.value())?)
    .bind(to_i64("donation_count", campaign.donation_count)?)
    .bind(campaign.updated_at.as_datetime())
    .execute(&mut *conn)
    .await
    .map_err(|e| classify("Failed to update campaign", e))?;
    Ok(())
}

async fn fetch_donation(
    conn: &mut PgConnection,
    reference: &DonationReference,
) -> Result<Option<DonationRecord>, AttemptError> {
    let row: Option<DonationRow> = sqlx::query_as(SELECT_DONATION)
        .bind(reference.as_str())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| classify("Failed to read donation", e))?;

    Ok(row.map(DonationRecord::try_from).transpose()?)
}

/// Returns false when the reference already existed.
async fn insert_donation(
    conn: &mut PgConnection,
    campaign_id: &str,
    record: &DonationRecord,
) -> Result<bool, AttemptError> {
    let result = sqlx::query(
        r#"
        INSERT INTO donations (
            reference, campaign_id, provider, amount_minor_units, currency, donor_name,
            donor_email, status, receipt_token, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (reference) DO NOTHING
        "#,
    )
    .bind(record.reference.as_str())
    .bind(campaign_id)
    .bind(record.provider.as_str())
    .bind(to_i64("amount_minor_units", record.amount_minor_units.value())?)
    .bind(record.currency.as_str())
    .bind(&record.donor_name)
    .bind(&record.donor_email)
    .bind(record.status.as_str())
    .bind(record.receipt_token.as_ref().map(ReceiptToken::as_str))
    .bind(record.created_at.as_datetime())
    .bind(record.updated_at.as_datetime())
    .execute(&mut *conn)
    .await
    .map_err(|e| classify("Failed to insert donation", e))?;

    Ok(result.rows_affected() == 1)
}

async fn update_donation(conn: &mut PgConnection, record: &DonationRecord) -> Result<(), AttemptError> {
    sqlx::query(
        r#"
        UPDATE donations SET
            amount_minor_units = $2,
            currency = $3,
            donor_name = $4,
            donor_email = $5,
            receipt_token = COALESCE(receipt_token, $6),
            updated_at = $7
        WHERE reference = $1
        "#,
    )
    .bind(record.reference.as_str())
    .bind(to_i64("amount_minor_units", record.amount_minor_units.value())?)
    .bind(record.currency.as_str())
    .bind(&record.donor_name)
    .bind(&record.donor_email)
    .bind(record.receipt_token.as_ref().map(ReceiptToken::as_str))
    .bind(record.updated_at.as_datetime())
    .execute(&mut *conn)
    .await
    .map_err(|e| classify("Failed to update donation", e))?;
    Ok(())
}

async fn upsert_public(
    conn: &mut PgConnection,
    campaign_id: &str,
    record: &DonationRecord,
) -> Result<(), AttemptError> {
    let view = record.public_view();
    sqlx::query(
        r#"
        INSERT INTO public_donations (
            reference, campaign_id, provider, amount_minor_units, currency, donor_name, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (reference) DO UPDATE SET
            amount_minor_units = EXCLUDED.amount_minor_units,
            currency = EXCLUDED.currency,
            donor_name = EXCLUDED.donor_name
        "#,
    )
    .bind(view.reference.as_str())
    .bind(campaign_id)
    .bind(view.provider.as_str())
    .bind(to_i64("amount_minor_units", view.amount_minor_units.value())?)
    .bind(view.currency.as_str())
    .bind(&view.donor_name)
    .bind(view.created_at.as_datetime())
    .execute(&mut *conn)
    .await
    .map_err(|e| classify("Failed to write public donation", e))?;
    Ok(())
}

async fn insert_audit(conn: &mut PgConnection, entry: &AuditLogEntry) -> Result<(), AttemptError> {
    sqlx::query(
        r#"
        INSERT INTO donation_audit_log (
            id, action, donation_reference, before_state, after_state, actor_id, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(entry.id.as_uuid())
    .bind(entry.action.as_str())
    .bind(entry.donation_reference.as_str())
    .bind(&entry.before)
    .bind(&entry.after)
    .bind(&entry.actor_id)
    .bind(entry.created_at.as_datetime())
    .execute(&mut *conn)
    .await
    .map_err(|e| classify("Failed to write audit entry", e))?;
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Transaction bodies
// ════════════════════════════════════════════════════════════════════════════

impl PostgresDonationLedger {
    async fn try_apply(&self, event: &DonationEvent) -> Result<ApplyOutcome, AttemptError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| classify("Failed to start transaction", e))?;
        let now = Timestamp::now();

        let mut campaign = lock_campaign(&mut tx, &self.campaign_id, self.goal).await?;
        let existing = fetch_donation(&mut tx, &event.reference).await?;

        let outcome = match existing {
            Some(mut record) => {
                if record.provider != event.provider {
                    tracing::warn!(
                        reference = %event.reference,
                        stored_provider = %record.provider,
                        incoming_provider = %event.provider,
                        "Reference collision across providers; merging contact fields only"
                    );
                }

                let (receipt_token, token_issued) = match &record.receipt_token {
                    Some(token) => (token.clone(), false),
                    None => {
                        let token = ReceiptToken::issue();
                        record.receipt_token = Some(token.clone());
                        (token, true)
                    }
                };

                if record.merge_contact(event, now) || token_issued {
                    update_donation(&mut tx, &record).await?;
                    upsert_public(&mut tx, &self.campaign_id, &record).await?;
                }

                ApplyOutcome {
                    applied: false,
                    receipt_token,
                    record,
                }
            }
            None => {
                let receipt_token = ReceiptToken::issue();
                let record = DonationRecord::from_event(event, receipt_token.clone(), now);

                if !insert_donation(&mut tx, &self.campaign_id, &record).await? {
                    return Err(AttemptError::Conflict(format!(
                        "donation {} inserted concurrently",
                        record.reference
                    )));
                }
                campaign.record_donation(record.amount_minor_units, now);
                save_campaign(&mut tx, &campaign).await?;
                upsert_public(&mut tx, &self.campaign_id, &record).await?;

                ApplyOutcome {
                    applied: true,
                    receipt_token,
                    record,
                }
            }
        };

        tx.commit()
            .await
            .map_err(|e| classify("Failed to commit transaction", e))?;
        Ok(outcome)
    }

    async fn try_edit(
        &self,
        reference: &DonationReference,
        updates: &DonationUpdates,
        actor_id: &str,
    ) -> Result<DonationRecord, AttemptError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| classify("Failed to start transaction", e))?;
        let now = Timestamp::now();

        let mut campaign = lock_campaign(&mut tx, &self.campaign_id, self.goal).await?;
        let before = fetch_donation(&mut tx, reference)
            .await?
            .ok_or_else(|| LedgerError::NotFound(reference.clone()))?;

        let mut after = before.clone();
        updates.apply_to(&mut after, now).map_err(LedgerError::from)?;

        if before.is_counted() && before.amount_minor_units != after.amount_minor_units {
            campaign.adjust_amount(before.amount_minor_units, after.amount_minor_units, now);
            save_campaign(&mut tx, &campaign).await?;
        }
        update_donation(&mut tx, &after).await?;
        upsert_public(&mut tx, &self.campaign_id, &after).await?;
        insert_audit(
            &mut tx,
            &AuditLogEntry::new(AuditAction::Edit, reference.clone(), Some(&before), Some(&after), actor_id, now),
        )
        .await?;

        tx.commit()
            .await
            .map_err(|e| classify("Failed to commit transaction", e))?;
        Ok(after)
    }

    async fn try_delete(&self, reference: &DonationReference, actor_id: &str) -> Result<(), AttemptError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| classify("Failed to start transaction", e))?;
        let now = Timestamp::now();

        let mut campaign = lock_campaign(&mut tx, &self.campaign_id, self.goal).await?;
        let before = fetch_donation(&mut tx, reference)
            .await?
            .ok_or_else(|| LedgerError::NotFound(reference.clone()))?;

        sqlx::query("DELETE FROM donations WHERE reference = $1")
            .bind(reference.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| classify("Failed to delete donation", e))?;

        if before.is_counted() {
            campaign.remove_donation(before.amount_minor_units, now);
            save_campaign(&mut tx, &campaign).await?;
        }
        insert_audit(
            &mut tx,
            &AuditLogEntry::new(AuditAction::Delete, reference.clone(), Some(&before), None, actor_id, now),
        )
        .await?;

        tx.commit()
            .await
            .map_err(|e| classify("Failed to commit transaction", e))?;
        Ok(())
    }

    async fn try_manual_add(&self, record: &DonationRecord, actor_id: &str) -> Result<(), AttemptError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| classify("Failed to start transaction", e))?;

        let mut campaign = lock_campaign(&mut tx, &self.campaign_id, self.goal).await?;
        if !insert_donation(&mut tx, &self.campaign_id, record).await? {
            return Err(LedgerError::storage(format!(
                "Generated reference {} already exists",
                record.reference
            ))
            .into());
        }
        campaign.record_donation(record.amount_minor_units, record.created_at);
        save_campaign(&mut tx, &campaign).await?;
        upsert_public(&mut tx, &self.campaign_id, record).await?;
        insert_audit(
            &mut tx,
            &AuditLogEntry::new(
                AuditAction::ManualAdd,
                record.reference.clone(),
                None,
                Some(record),
                actor_id,
                record.created_at,
            ),
        )
        .await?;

        tx.commit()
            .await
            .map_err(|e| classify("Failed to commit transaction", e))?;
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Ports
// ════════════════════════════════════════════════════════════════════════════

#[async_trait]
impl DonationLedger for PostgresDonationLedger {
    async fn apply(&self, event: &DonationEvent) -> Result<ApplyOutcome, LedgerError> {
        run_with_retry(self.retry, "apply", move || self.try_apply(event)).await
    }

    async fn find_by_reference(
        &self,
        reference: &DonationReference,
    ) -> Result<Option<DonationRecord>, LedgerError> {
        let row: Option<DonationRow> = sqlx::query_as(SELECT_DONATION)
            .bind(reference.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| LedgerError::storage(format!("Failed to read donation: {}", e)))?;

        row.map(DonationRecord::try_from).transpose()
    }

    async fn campaign_stats(&self) -> Result<CampaignStats, LedgerError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| LedgerError::storage(format!("Failed to acquire connection: {}", e)))?;

        match ensure_campaign(&mut conn, &self.campaign_id, self.goal).await {
            Ok(()) => {}
            Err(AttemptError::Fatal(err)) => return Err(err),
            Err(AttemptError::Conflict(reason)) => return Err(LedgerError::storage(reason)),
        }

        let row: Option<CampaignRow> = sqlx::query_as(
            r#"
            SELECT id, total_minor_units, donation_count, goal_minor_units, updated_at
            FROM campaigns
            WHERE id = $1
            "#,
        )
        .bind(&self.campaign_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| LedgerError::storage(format!("Failed to read campaign: {}", e)))?;

        let campaign = CampaignAggregate::try_from(
            row.ok_or_else(|| LedgerError::CampaignMissing(self.campaign_id.clone()))?,
        )?;
        Ok(CampaignStats::from(&campaign))
    }

    async fn recent_donations(&self, limit: usize) -> Result<Vec<PublicDonationView>, LedgerError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<PublicDonationRow> = sqlx::query_as(
            r#"
            SELECT reference, provider, amount_minor_units, currency, donor_name, created_at
            FROM public_donations
            WHERE campaign_id = $1
            ORDER BY created_at DESC, reference DESC
            LIMIT $2
            "#,
        )
        .bind(&self.campaign_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| LedgerError::storage(format!("Failed to list donations: {}", e)))?;

        rows.into_iter().map(PublicDonationView::try_from).collect()
    }
}

#[async_trait]
impl AdminLedger for PostgresDonationLedger {
    async fn edit(
        &self,
        reference: &DonationReference,
        updates: &DonationUpdates,
        actor_id: &str,
    ) -> Result<DonationRecord, LedgerError> {
        run_with_retry(self.retry, "edit", move || {
            self.try_edit(reference, updates, actor_id)
        })
        .await
    }

    async fn delete(&self, reference: &DonationReference, actor_id: &str) -> Result<(), LedgerError> {
        run_with_retry(self.retry, "delete", move || self.try_delete(reference, actor_id)).await
    }

    async fn manual_add(
        &self,
        donation: ManualDonation,
        actor_id: &str,
    ) -> Result<DonationRecord, LedgerError> {
        let record = donation.into_record(ReceiptToken::issue(), Timestamp::now())?;
        let pending = &record;
        run_with_retry(self.retry, "manual_add", move || {
            self.try_manual_add(pending, actor_id)
        })
        .await?;
        Ok(record)
    }

    async fn audit_log(
        &self,
        reference: &DonationReference,
    ) -> Result<Vec<AuditLogEntry>, LedgerError> {
        let rows: Vec<AuditRow> = sqlx::query_as(
            r#"
            SELECT id, action, donation_reference, before_state, after_state, actor_id, created_at
            FROM donation_audit_log
            WHERE donation_reference = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(reference.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| LedgerError::storage(format!("Failed to read audit log: {}", e)))?;

        rows.into_iter().map(AuditLogEntry::try_from).collect()
    }
}
