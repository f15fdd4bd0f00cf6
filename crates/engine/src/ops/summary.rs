use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, QuerySelect, prelude::*, sea_query::Expr};

use crate::{HistoryRange, ResultEngine, transactions};

use super::{Engine, history::ApplyWindow, truncate_to_second};

/// Activity of one conversation during the current local day.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DaySummary {
    pub conversation_key: String,
    pub count: u64,
    /// Sum of positive amounts.
    pub credits: i64,
    /// Sum of negative amounts, as a negative number.
    pub debits: i64,
}

impl DaySummary {
    pub fn net(&self) -> i64 {
        // Opposite signs, cannot overflow.
        self.credits + self.debits
    }
}

impl Engine {
    /// Per conversation totals for the calendar day containing `now`.
    ///
    /// Conversations without activity that day are omitted; the result is
    /// ordered by conversation key. Totals are summed by SQLite, which
    /// reports an overflow as a database error.
    pub async fn daily_summary(&self, now: DateTime<Utc>) -> ResultEngine<Vec<DaySummary>> {
        let window = HistoryRange::Today.window(truncate_to_second(now), self.timezone)?;
        let rows = transactions::Entity::find()
            .select_only()
            .column(transactions::Column::ConversationKey)
            .column_as(Expr::cust("COUNT(*)"), "count")
            .column_as(
                Expr::cust("COALESCE(SUM(CASE WHEN amount > 0 THEN amount ELSE 0 END), 0)"),
                "credits",
            )
            .column_as(
                Expr::cust("COALESCE(SUM(CASE WHEN amount < 0 THEN amount ELSE 0 END), 0)"),
                "debits",
            )
            .within(&window)
            .group_by(transactions::Column::ConversationKey)
            .order_by_asc(transactions::Column::ConversationKey)
            .into_tuple::<(String, i64, i64, i64)>()
            .all(&self.database)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(conversation_key, count, credits, debits)| DaySummary {
                conversation_key,
                count: u64::try_from(count).unwrap_or_default(),
                credits,
                debits,
            })
            .collect())
    }
}
