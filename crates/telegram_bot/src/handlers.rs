use chrono::Utc;
use chrono_tz::Tz;
use engine::{DeleteToken, DeletionStep, EngineError, HistoryRange};
use teloxide::{
    prelude::*,
    types::{CallbackQuery, ChatId, InlineKeyboardMarkup, MessageId},
    utils::command::BotCommands,
};

use crate::{
    ConfigParameters,
    commands::LedgerCommand,
    export,
    parsing::{looks_like_quick_add, parse_quick_add},
    ui,
};

/// Every chat keeps its own ledger.
fn conversation_key(chat_id: ChatId) -> String {
    chat_id.0.to_string()
}

pub(crate) async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: LedgerCommand,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id;
    let key = conversation_key(chat_id);

    match cmd {
        LedgerCommand::Help | LedgerCommand::Start => {
            bot.send_message(chat_id, LedgerCommand::descriptions().to_string())
                .await?;
        }
        LedgerCommand::Add(args) => {
            if !cfg.capability(msg.from.as_ref()).is_admin() {
                return Ok(());
            }
            quick_add(&bot, chat_id, &cfg, &args).await?;
        }
        LedgerCommand::Balance => match cfg.engine.balance(&key).await {
            Ok(balance) => {
                bot.send_message(chat_id, ui::render_balance(balance))
                    .await?;
            }
            Err(err) => reply_engine_error(&bot, chat_id, err, ui::STORAGE_ERROR).await?,
        },
        LedgerCommand::Turnover | LedgerCommand::Trns => match cfg.engine.turnover(&key).await {
            Ok(turnover) => {
                bot.send_message(chat_id, ui::render_turnover(&turnover))
                    .await?;
            }
            Err(err) => reply_engine_error(&bot, chat_id, err, ui::STORAGE_ERROR).await?,
        },
        LedgerCommand::History(args) => {
            let history = match HistoryRange::parse(Some(args.as_str())) {
                Ok(range) => cfg.engine.history(&key, range, Utc::now()).await,
                Err(err) => Err(err),
            };
            match history {
                Ok(history) => {
                    let text = ui::render_history(&history, cfg.engine.timezone());
                    bot.send_message(chat_id, text).await?;
                }
                Err(err) => reply_engine_error(&bot, chat_id, err, ui::HISTORY_USAGE).await?,
            }
        }
        LedgerCommand::List => match cfg.engine.page(&key, 1).await {
            Ok(page) => {
                let (text, kb) = ui::render_page(&page, cfg.engine.timezone());
                bot.send_message(chat_id, text).reply_markup(kb).await?;
            }
            Err(err) => reply_engine_error(&bot, chat_id, err, ui::STORAGE_ERROR).await?,
        },
        LedgerCommand::Remove => {
            let capability = cfg.capability(msg.from.as_ref());
            match cfg.engine.delete_menu(&key, capability).await {
                Ok(step) => send_deletion_step(&bot, chat_id, &cfg, step).await?,
                Err(err) => reply_engine_error(&bot, chat_id, err, ui::STORAGE_ERROR).await?,
            }
        }
        LedgerCommand::Export => {
            if !cfg.capability(msg.from.as_ref()).is_admin() {
                return Ok(());
            }
            export::send_export(&bot, chat_id, &cfg).await?;
        }
    }

    Ok(())
}

/// Plain messages: only signed amounts from the admin are entries, the rest
/// of the chat is left alone.
pub(crate) async fn handle_message(
    bot: Bot,
    msg: Message,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    if !looks_like_quick_add(text) || !cfg.capability(msg.from.as_ref()).is_admin() {
        return Ok(());
    }

    quick_add(&bot, msg.chat.id, &cfg, text).await
}

async fn quick_add(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    text: &str,
) -> ResponseResult<()> {
    let entry = match parse_quick_add(text) {
        Ok(entry) => entry,
        Err(err) => {
            tracing::debug!("rejected entry {text:?}: {err}");
            bot.send_message(chat_id, ui::ADD_USAGE).await?;
            return Ok(());
        }
    };

    let key = conversation_key(chat_id);
    let recorded = match cfg
        .engine
        .append(&key, Utc::now(), entry.amount, entry.description.as_deref())
        .await
    {
        Ok(id) => cfg.engine.transaction(&key, id).await,
        Err(err) => Err(err),
    };

    match recorded {
        Ok(Some(tx)) => {
            bot.send_message(chat_id, ui::render_recorded(&tx, cfg.engine.timezone()))
                .await?;
        }
        // Removed between insert and read back.
        Ok(None) => {}
        Err(err) => reply_engine_error(bot, chat_id, err, ui::ADD_USAGE).await?,
    }
    Ok(())
}

pub(crate) async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    let Some(message) = q.message.as_ref() else {
        return Ok(());
    };
    let chat_id = message.chat().id;
    let message_id = message.id();

    let _ = bot.answer_callback_query(q.id.clone()).await;

    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };
    let key = conversation_key(chat_id);

    if let Some(number) = ui::parse_page_callback(data) {
        match cfg.engine.page(&key, number).await {
            Ok(page) => {
                let (text, kb) = ui::render_page(&page, cfg.engine.timezone());
                bot.edit_message_text(chat_id, message_id, text)
                    .reply_markup(kb)
                    .await?;
            }
            Err(err) => reply_engine_error(&bot, chat_id, err, ui::STORAGE_ERROR).await?,
        }
    } else if DeleteToken::matches(data) {
        let capability = cfg.capability(Some(&q.from));
        let token = match data.parse::<DeleteToken>() {
            Ok(token) => token,
            Err(err) => {
                tracing::warn!("ignoring callback: {err}");
                return Ok(());
            }
        };
        match cfg.engine.delete_step(&key, capability, token).await {
            Ok(step) => edit_deletion_step(&bot, chat_id, message_id, &cfg, step).await?,
            Err(err) => reply_engine_error(&bot, chat_id, err, ui::STORAGE_ERROR).await?,
        }
    } else {
        tracing::warn!("unknown callback data: {data}");
    }

    Ok(())
}

/// Text and buttons of a deletion step; `None` when nothing is shown.
/// Terminal steps never carry buttons.
fn render_deletion_step(
    step: DeletionStep,
    tz: Tz,
) -> Option<(String, Option<InlineKeyboardMarkup>)> {
    let terminal = step.is_terminal();
    let (text, kb) = match step {
        DeletionStep::Ignored => return None,
        DeletionStep::Nothing => (ui::render_nothing_to_delete(), None),
        DeletionStep::Selecting(candidates) => {
            let (text, kb) = ui::render_delete_menu(&candidates);
            (text, Some(kb))
        }
        DeletionStep::Confirming(tx) => {
            let (text, kb) = ui::render_delete_confirm(&tx, tz);
            (text, Some(kb))
        }
        DeletionStep::Gone(id) => (ui::render_gone(id), None),
        DeletionStep::Deleted(id) => (ui::render_deleted(id), None),
        DeletionStep::Cancelled(id) => (ui::render_cancelled(id), None),
    };
    Some((text, kb.filter(|_| !terminal)))
}

async fn send_deletion_step(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    step: DeletionStep,
) -> ResponseResult<()> {
    match render_deletion_step(step, cfg.engine.timezone()) {
        Some((text, Some(kb))) => {
            bot.send_message(chat_id, text).reply_markup(kb).await?;
        }
        Some((text, None)) => {
            bot.send_message(chat_id, text).await?;
        }
        None => {}
    }
    Ok(())
}

/// Deletion steps replace the message holding the pressed button. Editing
/// without a keyboard drops the buttons of a finished workflow.
async fn edit_deletion_step(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    cfg: &ConfigParameters,
    step: DeletionStep,
) -> ResponseResult<()> {
    let Some((text, kb)) = render_deletion_step(step, cfg.engine.timezone()) else {
        return Ok(());
    };

    let edit = bot.edit_message_text(chat_id, message_id, text);
    match kb {
        Some(kb) => edit.reply_markup(kb).await?,
        None => edit.await?,
    };
    Ok(())
}

async fn reply_engine_error(
    bot: &Bot,
    chat_id: ChatId,
    err: EngineError,
    usage: &str,
) -> ResponseResult<()> {
    match err {
        EngineError::InvalidFormat(detail) => {
            tracing::debug!("invalid input in chat {chat_id}: {detail}");
            bot.send_message(chat_id, usage).await?;
        }
        EngineError::Database(err) => {
            tracing::error!("ledger storage failed in chat {chat_id}: {err}");
            bot.send_message(chat_id, ui::STORAGE_ERROR).await?;
        }
    }
    Ok(())
}
