//! Transaction primitives.
//!
//! A `Transaction` is a single signed entry recorded in a conversation's
//! ledger. Positive amounts are credits, negative amounts are debits. Rows are
//! append-only: they are read or physically deleted, never edited.

use core::fmt;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

/// Label stored when an entry is recorded without a description.
pub const DEFAULT_DESCRIPTION: &str = "No description";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub conversation_key: String,
    pub timestamp: DateTime<Utc>,
    pub amount: i64,
    pub description: String,
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.amount,
            self.description
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub conversation_key: String,
    pub timestamp: DateTimeUtc,
    pub amount: i64,
    pub description: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    /// Build an insertable row. The id is left to the database.
    pub(crate) fn new_entry(
        conversation_key: &str,
        timestamp: DateTime<Utc>,
        amount: i64,
        description: String,
    ) -> Self {
        Self {
            id: ActiveValue::NotSet,
            conversation_key: ActiveValue::Set(conversation_key.to_string()),
            timestamp: ActiveValue::Set(timestamp),
            amount: ActiveValue::Set(amount),
            description: ActiveValue::Set(description),
        }
    }
}

impl From<Model> for Transaction {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            conversation_key: model.conversation_key,
            timestamp: model.timestamp,
            amount: model.amount,
            description: model.description,
        }
    }
}

/// Replace a missing or blank description with [`DEFAULT_DESCRIPTION`].
pub(crate) fn normalize_description(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map_or_else(|| DEFAULT_DESCRIPTION.to_string(), ToString::to_string)
}
