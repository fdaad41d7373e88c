use std::{
    collections::{BTreeMap, btree_map::Entry},
    fmt,
};

use rust_decimal::Decimal;
use thiserror::Error;

use crate::account::AccountId;

pub type TransactionId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    Success,
    Failed,
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferStatus::Success => f.write_str("success"),
            TransferStatus::Failed => f.write_str("failed"),
        }
    }
}

/// Audit record of one transfer attempt. Never mutated once recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: TransactionId,
    pub from: AccountId,
    pub to: AccountId,
    pub amount: Decimal,
    pub status: TransferStatus,
    /// Why the attempt failed, `None` on success.
    pub reason: Option<String>,
}

impl HistoryEntry {
    pub fn success(id: TransactionId, from: &str, to: &str, amount: Decimal) -> Self {
        Self {
            id,
            from: from.to_owned(),
            to: to.to_owned(),
            amount,
            status: TransferStatus::Success,
            reason: None,
        }
    }

    pub fn failure(
        id: TransactionId,
        from: &str,
        to: &str,
        amount: Decimal,
        reason: String,
    ) -> Self {
        Self {
            reason: Some(reason),
            status: TransferStatus::Failed,
            ..Self::success(id, from, to, amount)
        }
    }
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transaction ID: txn-{}, From: {}, To: {}, Amount: {:.2}, Status: {}",
            self.id, self.from, self.to, self.amount, self.status
        )?;
        if let Some(reason) = &self.reason {
            write!(f, ", Reason: {reason}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HistoryError {
    #[error("Transaction txn-{id} is already recorded")]
    DuplicateTransaction { id: TransactionId },
}

/// Append-only log of transfer attempts keyed by transaction id.
#[derive(Debug, Default)]
pub struct TransactionHistory {
    entries: BTreeMap<TransactionId, HistoryEntry>,
}

impl TransactionHistory {
    pub fn record(&mut self, entry: HistoryEntry) -> Result<(), HistoryError> {
        match self.entries.entry(entry.id) {
            Entry::Occupied(occupied) => Err(HistoryError::DuplicateTransaction {
                id: *occupied.key(),
            }),
            Entry::Vacant(vacant) => {
                vacant.insert(entry);
                Ok(())
            }
        }
    }

    pub fn get(&self, id: TransactionId) -> Option<&HistoryEntry> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.values()
    }
}
