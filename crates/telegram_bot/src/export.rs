//! CSV export of a conversation's ledger.

use chrono_tz::Tz;
use csv::Writer;
use engine::Transaction;
use serde::Serialize;
use teloxide::{prelude::*, types::InputFile};

use crate::{BotError, ConfigParameters, ui};

const FILE_NAME: &str = "ledger_report.csv";

#[derive(Serialize)]
struct ExportRow<'a> {
    id: i64,
    timestamp: String,
    amount: i64,
    description: &'a str,
}

/// Renders rows in the given order, with a header line and local timestamps.
pub fn render_csv(transactions: &[Transaction], tz: Tz) -> Result<Vec<u8>, BotError> {
    let mut writer = Writer::from_writer(vec![]);
    for tx in transactions {
        writer
            .serialize(ExportRow {
                id: tx.id,
                timestamp: ui::format_timestamp(tx.timestamp, tz),
                amount: tx.amount,
                description: &tx.description,
            })
            .map_err(|err| BotError::Export(err.to_string()))?;
    }
    // An empty export still carries the header.
    if transactions.is_empty() {
        writer
            .write_record(["id", "timestamp", "amount", "description"])
            .map_err(|err| BotError::Export(err.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|err| BotError::Export(err.to_string()))
}

pub(crate) async fn send_export(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
) -> ResponseResult<()> {
    let key = chat_id.0.to_string();
    let transactions = match cfg.engine.export(&key).await {
        Ok(transactions) => transactions,
        Err(err) => {
            tracing::error!("failed to read export of chat {chat_id}: {err}");
            bot.send_message(chat_id, ui::STORAGE_ERROR).await?;
            return Ok(());
        }
    };

    let data = match render_csv(&transactions, cfg.engine.timezone()) {
        Ok(data) => data,
        Err(err) => {
            tracing::error!("{err}");
            bot.send_message(chat_id, "Error while exporting.").await?;
            return Ok(());
        }
    };

    tracing::info!("exporting {} transactions of chat {chat_id}", transactions.len());
    bot.send_document(chat_id, InputFile::memory(data).file_name(FILE_NAME))
        .await?;
    Ok(())
}
