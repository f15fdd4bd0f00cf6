use crate::{
    PAGE_SIZE, Page, ResultEngine,
    page::{normalize_page, page_offset},
};

use super::{Engine, ListOrder};

impl Engine {
    /// Returns a 1-based page of the conversation, newest first.
    ///
    /// Pages past the end are empty with `has_next == false`.
    pub async fn page(&self, conversation_key: &str, number: u64) -> ResultEngine<Page> {
        let number = normalize_page(number);
        let total = self.count(conversation_key).await?;
        let offset = page_offset(number);
        // SQLite offsets are signed; nothing lies past the last row anyway.
        if offset >= total {
            return Ok(Page::new(number, Vec::new(), total));
        }

        let transactions = self
            .list(
                conversation_key,
                ListOrder::Newest,
                Some(PAGE_SIZE),
                Some(offset),
            )
            .await?;

        Ok(Page::new(number, transactions, total))
    }
}
