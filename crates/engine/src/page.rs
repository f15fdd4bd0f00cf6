//! Offset based pagination over a conversation's ledger, newest first.

use serde::{Deserialize, Serialize};

use crate::Transaction;

/// Number of transactions shown per page.
pub const PAGE_SIZE: u64 = 10;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number.
    pub number: u64,
    pub transactions: Vec<Transaction>,
    /// Rows in the whole conversation, independent of the page.
    pub total: u64,
    pub has_previous: bool,
    pub has_next: bool,
}

impl Page {
    pub(crate) fn new(number: u64, transactions: Vec<Transaction>, total: u64) -> Self {
        let number = normalize_page(number);
        Self {
            number,
            transactions,
            total,
            has_previous: number > 1,
            has_next: page_offset(number).saturating_add(PAGE_SIZE) < total,
        }
    }

    /// A first page without rows means the ledger itself is empty, which is
    /// reported differently from running past the last page.
    pub fn is_empty_ledger(&self) -> bool {
        self.number == 1 && self.transactions.is_empty()
    }
}

/// Page 0 is read as page 1.
pub(crate) fn normalize_page(page: u64) -> u64 {
    page.max(1)
}

pub(crate) fn page_offset(page: u64) -> u64 {
    (normalize_page(page) - 1).saturating_mul(PAGE_SIZE)
}
