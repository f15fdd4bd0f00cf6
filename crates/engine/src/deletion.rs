//! Two step deletion.
//!
//! Deleting an entry goes through `Idle → Selecting → Confirming → {Deleted |
//! Cancelled}`. Nothing is kept in memory between steps: every step after the
//! first is driven by a [`DeleteToken`] that the transport hands back to the
//! caller (an inline button payload) and that carries the transaction id.
//! Every step checks the caller's [`Capability`]; callers without the admin
//! capability get [`DeletionStep::Ignored`] and nothing else.

use core::{fmt, str::FromStr};

use crate::{EngineError, Transaction};

const TOKEN_PREFIX: &str = "del";

/// What the caller is allowed to do with the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    Admin,
    Member,
}

impl Capability {
    /// Only the configured admin principal holds [`Capability::Admin`].
    pub fn of(caller_id: u64, admin_id: u64) -> Self {
        if caller_id == admin_id {
            Self::Admin
        } else {
            Self::Member
        }
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Intent carried by a deletion button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteToken {
    /// Pick a candidate and ask for confirmation.
    Select(i64),
    Confirm(i64),
    Cancel(i64),
}

impl DeleteToken {
    pub fn transaction_id(self) -> i64 {
        match self {
            Self::Select(id) | Self::Confirm(id) | Self::Cancel(id) => id,
        }
    }

    /// Whether a callback payload belongs to the deletion workflow.
    pub fn matches(raw: &str) -> bool {
        raw.split(':').next() == Some(TOKEN_PREFIX)
    }
}

impl fmt::Display for DeleteToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select(id) => write!(f, "{TOKEN_PREFIX}:sel:{id}"),
            Self::Confirm(id) => write!(f, "{TOKEN_PREFIX}:ok:{id}"),
            Self::Cancel(id) => write!(f, "{TOKEN_PREFIX}:no:{id}"),
        }
    }
}

impl FromStr for DeleteToken {
    type Err = EngineError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidFormat(format!("invalid delete token: {raw}"));

        let mut parts = raw.split(':');
        if parts.next() != Some(TOKEN_PREFIX) {
            return Err(invalid());
        }
        let (Some(action), Some(id), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid());
        };
        let id = id.parse::<i64>().map_err(|_| invalid())?;

        match action {
            "sel" => Ok(Self::Select(id)),
            "ok" => Ok(Self::Confirm(id)),
            "no" => Ok(Self::Cancel(id)),
            _ => Err(invalid()),
        }
    }
}

/// Outcome of one deletion step, rendered by the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeletionStep {
    /// The caller lacks the admin capability. Nothing changed and nothing
    /// should be shown.
    Ignored,
    /// The conversation has no transactions to offer.
    Nothing,
    /// Candidates to choose from, newest first.
    Selecting(Vec<Transaction>),
    /// The chosen transaction, waiting for confirm or cancel.
    Confirming(Transaction),
    /// The selected transaction no longer exists.
    Gone(i64),
    /// Reported whether or not a row was actually removed.
    Deleted(i64),
    Cancelled(i64),
}

impl DeletionStep {
    /// Terminal steps close the workflow; the transport drops the buttons.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Deleted(_) | Self::Cancelled(_) | Self::Gone(_))
    }
}
