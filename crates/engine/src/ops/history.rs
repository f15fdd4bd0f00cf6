use chrono::{DateTime, Utc};
use sea_orm::{QueryFilter, QueryOrder, QuerySelect, prelude::*, sea_query::Expr};

use crate::{HistoryRange, ResultEngine, TimeWindow, Transaction, transactions};

use super::{Engine, ledger::in_conversation, truncate_to_second};

/// Transactions of a conversation within a history window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct History {
    pub range: HistoryRange,
    pub window: TimeWindow,
    /// Newest first.
    pub transactions: Vec<Transaction>,
    /// Net sum of the listed amounts, computed by the database so that an
    /// overflowing sum is an error instead of a wrapped value.
    pub net: i64,
}

impl History {
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

pub(super) trait ApplyWindow: QueryFilter + Sized {
    fn within(self, window: &TimeWindow) -> Self;
}

impl<T> ApplyWindow for T
where
    T: QueryFilter + Sized,
{
    fn within(self, window: &TimeWindow) -> Self {
        let query = self.filter(transactions::Column::Timestamp.gte(window.from));
        if window.inclusive_end {
            query.filter(transactions::Column::Timestamp.lte(window.to))
        } else {
            query.filter(transactions::Column::Timestamp.lt(window.to))
        }
    }
}

impl Engine {
    /// Transactions of the conversation that fall within `range`, resolved
    /// against `now` in the engine time zone.
    ///
    /// Read only: an invalid range (e.g. `29/02` in a common year) fails
    /// before any query runs.
    pub async fn history(
        &self,
        conversation_key: &str,
        range: HistoryRange,
        now: DateTime<Utc>,
    ) -> ResultEngine<History> {
        let window = range.window(truncate_to_second(now), self.timezone)?;

        let transactions: Vec<Transaction> = transactions::Entity::find()
            .filter(in_conversation(conversation_key))
            .within(&window)
            .order_by_desc(transactions::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Transaction::from)
            .collect();

        let net = transactions::Entity::find()
            .select_only()
            .column_as(Expr::cust("COALESCE(SUM(amount), 0)"), "net")
            .filter(in_conversation(conversation_key))
            .within(&window)
            .into_tuple::<i64>()
            .one(&self.database)
            .await?
            .unwrap_or_default();

        Ok(History {
            range,
            window,
            transactions,
            net,
        })
    }
}
