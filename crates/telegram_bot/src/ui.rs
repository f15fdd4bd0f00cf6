use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use engine::{DaySummary, DeleteToken, History, Page, Transaction, Turnover};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

/// Telegram rejects messages above 4096 characters.
const MAX_MESSAGE_CHARS: usize = 4000;

pub(crate) const ADD_USAGE: &str = "Use: +200 bank OR -100 cash";
pub(crate) const HISTORY_USAGE: &str = "Use: /history, /history 3d OR /history 19/02";
pub(crate) const STORAGE_ERROR: &str = "⚠️ Storage error, please try again later.";

pub(crate) fn format_timestamp(timestamp: DateTime<Utc>, tz: Tz) -> String {
    timestamp
        .with_timezone(&tz)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

fn signed(amount: i64) -> String {
    format!("{amount:+}")
}

fn entry_line(tx: &Transaction, tz: Tz) -> String {
    format!(
        "#{} {} | {} | {}",
        tx.id,
        format_timestamp(tx.timestamp, tz),
        signed(tx.amount),
        tx.description
    )
}

/// Cuts `text` at a char boundary so it fits in one message.
fn truncate(mut text: String) -> String {
    if let Some((idx, _)) = text.char_indices().nth(MAX_MESSAGE_CHARS) {
        text.truncate(idx);
        text.push('…');
    }
    text
}

pub(crate) fn render_recorded(tx: &Transaction, tz: Tz) -> String {
    format!(
        "✅ Transaction Recorded\n\n📅 {}\n💰 Amount: {}\n📝 Description: {}",
        format_timestamp(tx.timestamp, tz),
        signed(tx.amount),
        tx.description
    )
}

pub(crate) fn render_balance(balance: i64) -> String {
    format!("💼 Balance: {balance}")
}

pub(crate) fn render_turnover(turnover: &Turnover) -> String {
    format!(
        "📈 Total Transactions: {}\n💰 Total Turnover: {}",
        turnover.count, turnover.volume
    )
}

pub(crate) fn render_history(history: &History, tz: Tz) -> String {
    if history.is_empty() {
        return format!("No transactions for {}.", history.range);
    }

    let mut text = format!("🧾 History ({})\n", history.range);
    for tx in &history.transactions {
        text.push('\n');
        text.push_str(&entry_line(tx, tz));
    }
    text.push_str(&format!("\n\nNet: {}", signed(history.net)));
    truncate(text)
}

pub(crate) fn page_callback(number: u64) -> String {
    format!("page:{number}")
}

/// Page number carried by a navigation button.
pub(crate) fn parse_page_callback(raw: &str) -> Option<u64> {
    raw.strip_prefix("page:")?.parse().ok()
}

pub(crate) fn render_page(page: &Page, tz: Tz) -> (String, InlineKeyboardMarkup) {
    if page.is_empty_ledger() {
        return (
            "No transactions found.".to_string(),
            InlineKeyboardMarkup::new(Vec::<Vec<InlineKeyboardButton>>::new()),
        );
    }

    let mut text = format!("🧾 Transactions, page {}\n", page.number);
    if page.transactions.is_empty() {
        text.push_str("\nNo more transactions.");
    }
    for tx in &page.transactions {
        text.push('\n');
        text.push_str(&entry_line(tx, tz));
    }

    let mut nav_row: Vec<InlineKeyboardButton> = Vec::new();
    if page.has_previous {
        nav_row.push(InlineKeyboardButton::callback(
            "⬅️ Prev",
            page_callback(page.number - 1),
        ));
    }
    if page.has_next {
        nav_row.push(InlineKeyboardButton::callback(
            "Next ➡️",
            page_callback(page.number.saturating_add(1)),
        ));
    }

    let rows = if nav_row.is_empty() {
        Vec::new()
    } else {
        vec![nav_row]
    };
    (truncate(text), InlineKeyboardMarkup::new(rows))
}

pub(crate) fn render_delete_menu(candidates: &[Transaction]) -> (String, InlineKeyboardMarkup) {
    let rows: Vec<Vec<InlineKeyboardButton>> = candidates
        .iter()
        .map(|tx| {
            vec![InlineKeyboardButton::callback(
                format!("{} | {}", tx.id, signed(tx.amount)),
                DeleteToken::Select(tx.id).to_string(),
            )]
        })
        .collect();

    (
        "Select transaction to delete:".to_string(),
        InlineKeyboardMarkup::new(rows),
    )
}

pub(crate) fn render_delete_confirm(tx: &Transaction, tz: Tz) -> (String, InlineKeyboardMarkup) {
    let text = format!(
        "Delete this transaction?\n\n🆔 {}\n📅 {}\n💰 Amount: {}\n📝 Description: {}",
        tx.id,
        format_timestamp(tx.timestamp, tz),
        signed(tx.amount),
        tx.description
    );
    let kb = InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("✅ Confirm", DeleteToken::Confirm(tx.id).to_string()),
        InlineKeyboardButton::callback("❌ Cancel", DeleteToken::Cancel(tx.id).to_string()),
    ]]);
    (text, kb)
}

pub(crate) fn render_nothing_to_delete() -> String {
    "No transactions to delete.".to_string()
}

pub(crate) fn render_deleted(id: i64) -> String {
    format!("❌ Transaction Deleted (#{id})")
}

pub(crate) fn render_cancelled(id: i64) -> String {
    format!("Deletion of #{id} cancelled.")
}

pub(crate) fn render_gone(id: i64) -> String {
    format!("Transaction #{id} no longer exists.")
}

pub(crate) fn render_digest(summaries: &[DaySummary]) -> String {
    if summaries.is_empty() {
        return "No transactions today.".to_string();
    }

    let mut text = String::from("📊 Daily summary\n");
    for summary in summaries {
        text.push_str(&format!(
            "\nChat {}: {} transactions, in {}, out {}, net {}",
            summary.conversation_key,
            summary.count,
            summary.credits,
            summary.debits,
            signed(summary.net())
        ));
    }
    truncate(text)
}
