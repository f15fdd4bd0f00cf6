//! Daily summary.
//!
//! Once a day, at a configured local time, the activity of every chat is
//! summarised and delivered through a [`NotificationSink`].

use std::{future::Future, sync::Arc, time::Duration};

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use engine::Engine;
use teloxide::prelude::*;

use crate::{BotError, ui};

/// Fallback wait when no upcoming local time can be resolved.
const ONE_DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Where the digest goes.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, text: String) -> impl Future<Output = Result<(), BotError>> + Send;
}

/// Sends to the private chat of the admin.
pub struct AdminChat {
    bot: Bot,
    chat: ChatId,
}

impl AdminChat {
    pub fn new(bot: Bot, admin_id: UserId) -> Self {
        Self {
            bot,
            chat: ChatId::from(admin_id),
        }
    }
}

impl NotificationSink for AdminChat {
    async fn notify(&self, text: String) -> Result<(), BotError> {
        self.bot.send_message(self.chat, text).await?;
        Ok(())
    }
}

pub struct Digest<S> {
    engine: Arc<Engine>,
    sink: S,
    at: NaiveTime,
}

impl<S: NotificationSink> Digest<S> {
    pub fn new(engine: Arc<Engine>, sink: S, at: NaiveTime) -> Self {
        Self { engine, sink, at }
    }

    /// Runs forever. A failed delivery is logged and retried the next day.
    pub async fn run(self) {
        tracing::info!("Daily summary scheduled at {}", self.at);
        loop {
            let wait = until_next(Utc::now(), self.at, self.engine.timezone());
            tracing::debug!("next daily summary in {}s", wait.as_secs());
            tokio::time::sleep(wait).await;

            if let Err(err) = self.tick(Utc::now()).await {
                tracing::error!("daily summary failed: {err}");
            }
        }
    }

    /// Summarises the local day containing `now` and delivers it.
    pub async fn tick(&self, now: DateTime<Utc>) -> Result<(), BotError> {
        let summaries = self.engine.daily_summary(now).await?;
        self.sink.notify(ui::render_digest(&summaries)).await?;
        tracing::info!("daily summary sent ({} chats)", summaries.len());
        Ok(())
    }
}

/// Time left until the next occurrence of `at` in `tz`, strictly after `now`.
///
/// Days on which `at` does not exist (DST gap) are skipped.
pub fn until_next(now: DateTime<Utc>, at: NaiveTime, tz: Tz) -> Duration {
    let mut date = now.with_timezone(&tz).date_naive();
    for _ in 0..3 {
        if let Some(candidate) = tz.from_local_datetime(&date.and_time(at)).earliest() {
            let candidate = candidate.with_timezone(&Utc);
            if candidate > now {
                return (candidate - now).to_std().unwrap_or(ONE_DAY);
            }
        }
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }
    ONE_DAY
}
