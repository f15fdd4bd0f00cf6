//! Conversation scoped ledger.
//!
//! The [`Engine`] owns the database handle and exposes every ledger
//! operation: recording entries, balance and turnover aggregates, history
//! windows, pagination, the two step deletion workflow, exports and the
//! daily summary. Every operation is scoped by a conversation key.

pub use deletion::{Capability, DeleteToken, DeletionStep};
pub use error::EngineError;
pub use history::{HistoryRange, TimeWindow};
pub use ops::{DaySummary, Engine, EngineBuilder, History, ListOrder, Turnover};
pub use page::{PAGE_SIZE, Page};
pub use transactions::{DEFAULT_DESCRIPTION, Transaction};

mod deletion;
mod error;
mod history;
mod ops;
mod page;
mod transactions;

type ResultEngine<T> = Result<T, EngineError>;
