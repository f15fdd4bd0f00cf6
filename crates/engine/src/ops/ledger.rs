use chrono::{DateTime, Utc};
use sea_orm::{
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    prelude::*,
    sea_query::{Expr, SimpleExpr},
};
use serde::{Deserialize, Serialize};

use crate::{
    ResultEngine, Transaction,
    transactions::{self, normalize_description},
};

use super::{Engine, truncate_to_second};

/// Ordering of listed transactions, by id.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListOrder {
    /// Most recent first, used for listings.
    #[default]
    Newest,
    /// Oldest first, used for exports.
    Oldest,
}

/// Volume of activity in a conversation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turnover {
    pub count: u64,
    /// Sum of absolute amounts.
    pub volume: i64,
}

pub(super) fn in_conversation(conversation_key: &str) -> SimpleExpr {
    transactions::Column::ConversationKey.eq(conversation_key)
}

impl Engine {
    /// Records a new entry and returns its id.
    ///
    /// Zero amounts are accepted. A missing or blank description is stored
    /// as [`DEFAULT_DESCRIPTION`](crate::DEFAULT_DESCRIPTION).
    pub async fn append(
        &self,
        conversation_key: &str,
        timestamp: DateTime<Utc>,
        amount: i64,
        description: Option<&str>,
    ) -> ResultEngine<i64> {
        let model = transactions::ActiveModel::new_entry(
            conversation_key,
            truncate_to_second(timestamp),
            amount,
            normalize_description(description),
        );
        let inserted = transactions::Entity::insert(model)
            .exec(&self.database)
            .await?;

        tracing::debug!(
            "recorded transaction {} in {conversation_key}: {amount}",
            inserted.last_insert_id
        );
        Ok(inserted.last_insert_id)
    }

    /// Removes a transaction of the conversation.
    ///
    /// Returns whether a row was removed; a missing id is not an error.
    pub async fn delete(&self, conversation_key: &str, id: i64) -> ResultEngine<bool> {
        let result = transactions::Entity::delete_many()
            .filter(transactions::Column::Id.eq(id))
            .filter(in_conversation(conversation_key))
            .exec(&self.database)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Looks up a single transaction of the conversation.
    pub async fn transaction(
        &self,
        conversation_key: &str,
        id: i64,
    ) -> ResultEngine<Option<Transaction>> {
        let model = transactions::Entity::find_by_id(id)
            .filter(in_conversation(conversation_key))
            .one(&self.database)
            .await?;

        Ok(model.map(Transaction::from))
    }

    /// Net sum of every amount in the conversation, `0` when empty.
    pub async fn balance(&self, conversation_key: &str) -> ResultEngine<i64> {
        let balance = transactions::Entity::find()
            .select_only()
            .column_as(Expr::cust("COALESCE(SUM(amount), 0)"), "balance")
            .filter(in_conversation(conversation_key))
            .into_tuple::<i64>()
            .one(&self.database)
            .await?;

        Ok(balance.unwrap_or_default())
    }

    /// Number of transactions in the conversation.
    pub async fn count(&self, conversation_key: &str) -> ResultEngine<u64> {
        let count = transactions::Entity::find()
            .filter(in_conversation(conversation_key))
            .count(&self.database)
            .await?;

        Ok(count)
    }

    /// Count and absolute volume of every transaction in the conversation.
    pub async fn turnover(&self, conversation_key: &str) -> ResultEngine<Turnover> {
        let row = transactions::Entity::find()
            .select_only()
            .column_as(Expr::cust("COUNT(*)"), "count")
            .column_as(Expr::cust("COALESCE(SUM(ABS(amount)), 0)"), "volume")
            .filter(in_conversation(conversation_key))
            .into_tuple::<(i64, i64)>()
            .one(&self.database)
            .await?;

        Ok(row
            .map(|(count, volume)| Turnover {
                count: u64::try_from(count).unwrap_or_default(),
                volume,
            })
            .unwrap_or_default())
    }

    /// Lists the transactions of a conversation.
    ///
    /// Without `limit` and `offset` the full set is returned.
    pub async fn list(
        &self,
        conversation_key: &str,
        order: ListOrder,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> ResultEngine<Vec<Transaction>> {
        let query = transactions::Entity::find().filter(in_conversation(conversation_key));
        let query = match order {
            ListOrder::Newest => query.order_by_desc(transactions::Column::Id),
            ListOrder::Oldest => query.order_by_asc(transactions::Column::Id),
        };

        let models = query
            .limit(limit)
            .offset(offset)
            .all(&self.database)
            .await?;

        Ok(models.into_iter().map(Transaction::from).collect())
    }

    /// Every transaction of the conversation in recording order, for
    /// exports.
    pub async fn export(&self, conversation_key: &str) -> ResultEngine<Vec<Transaction>> {
        self.list(conversation_key, ListOrder::Oldest, None, None)
            .await
    }
}
