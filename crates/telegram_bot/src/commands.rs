//! Command structs

use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Ledger commands:")]
pub enum LedgerCommand {
    #[command(description = "show this message.")]
    Help,
    #[command(hide)]
    Start,
    #[command(description = "record an entry, e.g. /add -100 cash (or just send +200 bank).")]
    Add(String),
    #[command(description = "net balance of this chat.")]
    Balance,
    #[command(description = "number of entries and total volume.")]
    Turnover,
    #[command(hide)]
    Trns,
    #[command(description = "entries of today, of the last N days (3d) or of a date (19/02).")]
    History(String),
    #[command(description = "latest entries, 10 per page.")]
    List,
    #[command(description = "delete one of the latest entries.")]
    Remove,
    #[command(description = "download every entry as CSV.")]
    Export,
}
