use chrono::{DateTime, SubsecRound, Utc};
use chrono_tz::Tz;
use sea_orm::DatabaseConnection;

use crate::ResultEngine;

mod deletion;
mod history;
mod ledger;
mod pages;
mod summary;

pub use history::History;
pub use ledger::{ListOrder, Turnover};
pub use summary::DaySummary;

/// Handle over the ledger database.
///
/// Every operation issues single statements against the shared connection
/// pool; there is no in-memory state besides the configured time zone.
#[derive(Debug, Clone)]
pub struct Engine {
    database: DatabaseConnection,
    timezone: Tz,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Time zone used to decide calendar days.
    pub fn timezone(&self) -> Tz {
        self.timezone
    }
}

/// Stored timestamps have second resolution so that text comparisons in
/// SQLite order them correctly.
fn truncate_to_second(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    timestamp.trunc_subsecs(0)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    timezone: Option<Tz>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Time zone for calendar days. Defaults to UTC.
    pub fn timezone(mut self, timezone: Tz) -> EngineBuilder {
        self.timezone = Some(timezone);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let timezone = self.timezone.unwrap_or(Tz::UTC);
        tracing::debug!("ledger engine ready (timezone: {timezone})");
        Ok(Engine {
            database: self.database,
            timezone,
        })
    }
}
