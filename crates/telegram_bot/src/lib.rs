//! Telegram bot.
//!
//! The bot is the transport of the ledger: it turns chat messages and inline
//! button presses into [`engine::Engine`] calls and renders the results back
//! into the conversation. Each chat has its own ledger, keyed by chat id.

use std::sync::Arc;

use chrono::NaiveTime;
use engine::{Capability, Engine, EngineError};
use teloxide::{prelude::*, types::User};

mod commands;
mod digest;
pub mod export;
mod handlers;
mod parsing;
mod ui;

pub use digest::{AdminChat, Digest, NotificationSink};

/// Errors raised while setting up or running the bot outside of a single
/// update.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("telegram token is missing")]
    MissingToken,
    #[error("admin id is missing")]
    MissingAdmin,
    #[error("ledger engine is missing")]
    MissingEngine,
    #[error("export failed: {0}")]
    Export(String),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Request(#[from] teloxide::RequestError),
}

#[derive(Clone)]
pub struct ConfigParameters {
    admin_id: UserId,
    engine: Arc<Engine>,
}

impl ConfigParameters {
    /// Capability of the sender of an update. Unknown senders are members.
    fn capability(&self, from: Option<&User>) -> Capability {
        match from {
            Some(user) => Capability::of(user.id.0, self.admin_id.0),
            None => Capability::Member,
        }
    }
}

pub struct Bot {
    token: String,
    admin_id: UserId,
    engine: Arc<Engine>,
    digest_at: Option<NaiveTime>,
}

impl Bot {
    pub fn new(
        token: &str,
        admin_id: UserId,
        engine: Arc<Engine>,
        digest_at: Option<NaiveTime>,
    ) -> Result<Self, BotError> {
        if token.trim().is_empty() {
            return Err(BotError::MissingToken);
        }

        Ok(Self {
            token: token.to_string(),
            admin_id,
            engine,
            digest_at,
        })
    }

    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    /// Daily summary task sending to the admin's private chat, if a digest
    /// time is configured.
    pub fn digest(&self) -> Option<Digest<AdminChat>> {
        let at = self.digest_at?;
        let sink = AdminChat::new(teloxide::Bot::new(&self.token), self.admin_id);
        Some(Digest::new(self.engine.clone(), sink, at))
    }

    pub async fn run(&self) {
        tracing::info!("Starting telegram bot...");

        let bot = teloxide::Bot::new(&self.token);

        let parameters = ConfigParameters {
            admin_id: self.admin_id,
            engine: self.engine.clone(),
        };

        let handler = dptree::entry()
            .branch(
                Update::filter_message()
                    .filter_command::<commands::LedgerCommand>()
                    .endpoint(handlers::handle_command),
            )
            .branch(Update::filter_message().endpoint(handlers::handle_message))
            .branch(Update::filter_callback_query().endpoint(handlers::handle_callback));

        Dispatcher::builder(bot, handler)
            .dependencies(dptree::deps![parameters])
            .default_handler(|upd| async move {
                tracing::warn!("Unhandled update: {:?}", upd);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }
}

#[derive(Default)]
pub struct BotBuilder {
    token: String,
    admin_id: Option<UserId>,
    engine: Option<Arc<Engine>>,
    digest_at: Option<NaiveTime>,
}

impl BotBuilder {
    pub fn token(mut self, token: &str) -> BotBuilder {
        self.token = token.to_string();
        self
    }

    /// The only user allowed to add, delete and export entries.
    pub fn admin(mut self, admin_id: u64) -> BotBuilder {
        self.admin_id = Some(UserId(admin_id));
        self
    }

    pub fn engine(mut self, engine: Arc<Engine>) -> BotBuilder {
        self.engine = Some(engine);
        self
    }

    /// Local time of the daily summary. Without it no digest is sent.
    pub fn digest_at(mut self, at: Option<NaiveTime>) -> BotBuilder {
        self.digest_at = at;
        self
    }

    pub fn build(self) -> Result<Bot, BotError> {
        tracing::info!("Initializing telegram bot...");
        let admin_id = self.admin_id.ok_or(BotError::MissingAdmin)?;
        let engine = self.engine.ok_or(BotError::MissingEngine)?;
        Bot::new(&self.token, admin_id, engine, self.digest_at)
    }
}
