//! In-memory donation ledger.
//!
//! Useful for:
//! - Development without a database
//! - Handler and HTTP integration tests
//!
//! A single `tokio::sync::Mutex` around the whole store makes every ledger
//! operation one atomic unit, matching the transactional guarantees of the
//! PostgreSQL adapter. Nothing persists across restarts.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use crate::domain::donation::{
    ApplyOutcome, AuditAction, AuditLogEntry, CampaignAggregate, CampaignStats, DonationEvent,
    DonationRecord, DonationUpdates, LedgerError, ManualDonation, PublicDonationView,
    ReceiptToken, DEFAULT_CAMPAIGN_ID, DEFAULT_GOAL_MINOR_UNITS,
};
use crate::domain::foundation::{DonationReference, MinorUnits, Timestamp};
use crate::ports::{AdminLedger, DonationLedger};

#[derive(Default)]
struct LedgerState {
    campaign: Option<CampaignAggregate>,
    records: HashMap<DonationReference, DonationRecord>,
    /// Public views keyed by reference, with an insertion sequence for stable ordering.
    public: HashMap<DonationReference, (u64, PublicDonationView)>,
    audit: Vec<AuditLogEntry>,
    next_sequence: u64,
}

impl LedgerState {
    fn campaign_mut(&mut self, id: &str, goal: MinorUnits) -> &mut CampaignAggregate {
        self.campaign
            .get_or_insert_with(|| CampaignAggregate::new(id, goal, Timestamp::now()))
    }

    fn put_public(&mut self, record: &DonationRecord) {
        let sequence = match self.public.get(&record.reference) {
            Some((sequence, _)) => *sequence,
            None => {
                self.next_sequence += 1;
                self.next_sequence
            }
        };
        self.public
            .insert(record.reference.clone(), (sequence, record.public_view()));
    }
}

/// In-memory implementation of the ledger ports.
pub struct InMemoryDonationLedger {
    campaign_id: String,
    goal: MinorUnits,
    state: Mutex<LedgerState>,
    unavailable: AtomicBool,
}

impl Default for InMemoryDonationLedger {
    fn default() -> Self {
        Self::new(DEFAULT_CAMPAIGN_ID, MinorUnits::new(DEFAULT_GOAL_MINOR_UNITS))
    }
}

impl InMemoryDonationLedger {
    pub fn new(campaign_id: impl Into<String>, goal: MinorUnits) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            goal,
            state: Mutex::new(LedgerState::default()),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent write fail with a storage error.
    ///
    /// Useful for testing how callers handle an unreachable store.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of donation records held.
    pub async fn len(&self) -> usize {
        self.state.lock().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_available(&self) -> Result<(), LedgerError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(LedgerError::storage("in-memory ledger marked unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl DonationLedger for InMemoryDonationLedger {
    async fn apply(&self, event: &DonationEvent) -> Result<ApplyOutcome, LedgerError> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        let now = Timestamp::now();
        state.campaign_mut(&self.campaign_id, self.goal);

        if let Some(existing) = state.records.get(&event.reference).cloned() {
            if existing.provider != event.provider {
                tracing::warn!(
                    reference = %event.reference,
                    stored_provider = %existing.provider,
                    incoming_provider = %event.provider,
                    "Reference collision across providers; merging contact fields only"
                );
            }

            let mut record = existing;
            let receipt_token = match &record.receipt_token {
                Some(token) => token.clone(),
                None => {
                    let token = ReceiptToken::issue();
                    record.receipt_token = Some(token.clone());
                    token
                }
            };
            record.merge_contact(event, now);
            state.records.insert(record.reference.clone(), record.clone());
            state.put_public(&record);

            return Ok(ApplyOutcome {
                applied: false,
                receipt_token,
                record,
            });
        }

        let receipt_token = ReceiptToken::issue();
        let record = DonationRecord::from_event(event, receipt_token.clone(), now);

        state
            .campaign_mut(&self.campaign_id, self.goal)
            .record_donation(record.amount_minor_units, now);
        state.records.insert(record.reference.clone(), record.clone());
        state.put_public(&record);

        Ok(ApplyOutcome {
            applied: true,
            receipt_token,
            record,
        })
    }

    async fn find_by_reference(
        &self,
        reference: &DonationReference,
    ) -> Result<Option<DonationRecord>, LedgerError> {
        let state = self.state.lock().await;
        Ok(state.records.get(reference).cloned())
    }

    async fn campaign_stats(&self) -> Result<CampaignStats, LedgerError> {
        let mut state = self.state.lock().await;
        let campaign = state.campaign_mut(&self.campaign_id, self.goal);
        Ok(CampaignStats::from(&*campaign))
    }

    async fn recent_donations(&self, limit: usize) -> Result<Vec<PublicDonationView>, LedgerError> {
        let state = self.state.lock().await;
        let mut views: Vec<&(u64, PublicDonationView)> = state.public.values().collect();
        views.sort_by(|(seq_a, a), (seq_b, b)| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| seq_b.cmp(seq_a))
        });
        Ok(views
            .into_iter()
            .take(limit)
            .map(|(_, view)| view.clone())
            .collect())
    }
}

#[async_trait]
impl AdminLedger for InMemoryDonationLedger {
    async fn edit(
        &self,
        reference: &DonationReference,
        updates: &DonationUpdates,
        actor_id: &str,
    ) -> Result<DonationRecord, LedgerError> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        let now = Timestamp::now();

        let before = state
            .records
            .get(reference)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(reference.clone()))?;
        let mut after = before.clone();
        updates.apply_to(&mut after, now)?;

        if before.is_counted() {
            state.campaign_mut(&self.campaign_id, self.goal).adjust_amount(
                before.amount_minor_units,
                after.amount_minor_units,
                now,
            );
        }
        state.records.insert(reference.clone(), after.clone());
        state.put_public(&after);
        state.audit.push(AuditLogEntry::new(
            AuditAction::Edit,
            reference.clone(),
            Some(&before),
            Some(&after),
            actor_id,
            now,
        ));

        Ok(after)
    }

    async fn delete(&self, reference: &DonationReference, actor_id: &str) -> Result<(), LedgerError> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        let now = Timestamp::now();

        let before = state
            .records
            .remove(reference)
            .ok_or_else(|| LedgerError::NotFound(reference.clone()))?;
        state.public.remove(reference);

        if before.is_counted() {
            state
                .campaign_mut(&self.campaign_id, self.goal)
                .remove_donation(before.amount_minor_units, now);
        }
        state.audit.push(AuditLogEntry::new(
            AuditAction::Delete,
            reference.clone(),
            Some(&before),
            None,
            actor_id,
            now,
        ));

        Ok(())
    }

    async fn manual_add(
        &self,
        donation: ManualDonation,
        actor_id: &str,
    ) -> Result<DonationRecord, LedgerError> {
        self.check_available()?;
        let now = Timestamp::now();
        let record = donation.into_record(ReceiptToken::issue(), now)?;

        let mut state = self.state.lock().await;
        state
            .campaign_mut(&self.campaign_id, self.goal)
            .record_donation(record.amount_minor_units, now);
        state.records.insert(record.reference.clone(), record.clone());
        state.put_public(&record);
        state.audit.push(AuditLogEntry::new(
            AuditAction::ManualAdd,
            record.reference.clone(),
            None,
            Some(&record),
            actor_id,
            now,
        ));

        Ok(record)
    }

    async fn audit_log(
        &self,
        reference: &DonationReference,
    ) -> Result<Vec<AuditLogEntry>, LedgerError> {
        let state = self.state.lock().await;
        Ok(state
            .audit
            .iter()
            .filter(|entry| &entry.donation_reference == reference)
            .cloned()
            .collect())
    }
}
