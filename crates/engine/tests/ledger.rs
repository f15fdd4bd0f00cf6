use chrono::{DateTime, Duration, Utc};
use sea_orm::{Database, DatabaseConnection};

use engine::{
    Capability, DEFAULT_DESCRIPTION, DeleteToken, DeletionStep, Engine, EngineError, HistoryRange,
    ListOrder, PAGE_SIZE, Turnover,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn at(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
}

async fn add_many(engine: &Engine, conversation: &str, amounts: &[i64]) -> Vec<i64> {
    let mut ids = Vec::with_capacity(amounts.len());
    for (idx, amount) in amounts.iter().enumerate() {
        let description = format!("entry {idx}");
        let id = engine
            .append(conversation, Utc::now(), *amount, Some(&description))
            .await
            .unwrap();
        ids.push(id);
    }
    ids
}

#[tokio::test]
async fn balance_and_turnover_of_bank_and_cash() {
    let (engine, _db) = engine_with_db().await;

    engine
        .append("A", Utc::now(), 200, Some("bank"))
        .await
        .unwrap();
    engine
        .append("A", Utc::now(), -50, Some("cash"))
        .await
        .unwrap();

    assert_eq!(engine.balance("A").await.unwrap(), 150);
    assert_eq!(
        engine.turnover("A").await.unwrap(),
        Turnover {
            count: 2,
            volume: 250
        }
    );
}

#[tokio::test]
async fn turnover_ignores_sign() {
    let (engine, _db) = engine_with_db().await;
    add_many(&engine, "A", &[200, -200]).await;

    assert_eq!(engine.balance("A").await.unwrap(), 0);
    let turnover = engine.turnover("A").await.unwrap();
    assert_eq!(turnover.count, 2);
    assert_eq!(turnover.volume, 400);
}

#[tokio::test]
async fn balances_are_scoped_by_conversation() {
    let (engine, _db) = engine_with_db().await;
    add_many(&engine, "A", &[10, -3, 7, 0, -100]).await;
    add_many(&engine, "B", &[1_000, 2_000]).await;

    assert_eq!(engine.balance("A").await.unwrap(), -86);
    assert_eq!(engine.balance("B").await.unwrap(), 3_000);
    assert_eq!(engine.count("A").await.unwrap(), 5);
    assert_eq!(engine.count("B").await.unwrap(), 2);
}

#[tokio::test]
async fn empty_conversation_has_zero_aggregates() {
    let (engine, _db) = engine_with_db().await;

    assert_eq!(engine.balance("nobody").await.unwrap(), 0);
    assert_eq!(engine.count("nobody").await.unwrap(), 0);
    assert_eq!(engine.turnover("nobody").await.unwrap(), Turnover::default());
    assert!(engine.export("nobody").await.unwrap().is_empty());
}

#[tokio::test]
async fn ids_increase_and_description_defaults() {
    let (engine, _db) = engine_with_db().await;

    let first = engine.append("A", Utc::now(), 0, None).await.unwrap();
    let second = engine
        .append("A", Utc::now(), 5, Some("   "))
        .await
        .unwrap();
    assert!(second > first);

    let rows = engine.export("A").await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|tx| tx.description == DEFAULT_DESCRIPTION));
    assert_eq!(rows[0].amount, 0);
}

#[tokio::test]
async fn delete_is_idempotent() {
    let (engine, _db) = engine_with_db().await;
    let ids = add_many(&engine, "A", &[100, 200, 300]).await;

    assert!(engine.delete("A", ids[1]).await.unwrap());
    assert!(!engine.delete("A", ids[1]).await.unwrap());

    assert_eq!(engine.balance("A").await.unwrap(), 400);
    assert_eq!(engine.count("A").await.unwrap(), 2);
}

#[tokio::test]
async fn delete_does_not_cross_conversations() {
    let (engine, _db) = engine_with_db().await;
    let ids = add_many(&engine, "A", &[100]).await;

    assert!(!engine.delete("B", ids[0]).await.unwrap());
    assert_eq!(engine.count("A").await.unwrap(), 1);
    assert!(engine.transaction("B", ids[0]).await.unwrap().is_none());
    assert!(engine.transaction("A", ids[0]).await.unwrap().is_some());
}

#[tokio::test]
async fn list_orders_by_id() {
    let (engine, _db) = engine_with_db().await;
    let ids = add_many(&engine, "A", &[1, 2, 3, 4]).await;

    let newest: Vec<i64> = engine
        .list("A", ListOrder::Newest, None, None)
        .await
        .unwrap()
        .into_iter()
        .map(|tx| tx.id)
        .collect();
    let mut expected = ids.clone();
    expected.reverse();
    assert_eq!(newest, expected);

    let exported: Vec<i64> = engine
        .export("A")
        .await
        .unwrap()
        .into_iter()
        .map(|tx| tx.id)
        .collect();
    assert_eq!(exported, ids);

    let window: Vec<i64> = engine
        .list("A", ListOrder::Newest, Some(2), Some(1))
        .await
        .unwrap()
        .into_iter()
        .map(|tx| tx.id)
        .collect();
    assert_eq!(window, vec![ids[2], ids[1]]);
}

#[tokio::test]
async fn eleven_entries_span_two_pages() {
    let (engine, _db) = engine_with_db().await;
    let ids = add_many(&engine, "B", &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]).await;

    let first = engine.page("B", 1).await.unwrap();
    assert_eq!(first.transactions.len(), 10);
    assert!(first.has_next);
    assert!(!first.has_previous);
    let first_ids: Vec<i64> = first.transactions.iter().map(|tx| tx.id).collect();
    let mut expected: Vec<i64> = ids[1..].to_vec();
    expected.reverse();
    assert_eq!(first_ids, expected);

    let second = engine.page("B", 2).await.unwrap();
    assert_eq!(second.transactions.len(), 1);
    assert_eq!(second.transactions[0].id, ids[0]);
    assert!(!second.has_next);
    assert!(second.has_previous);

    let beyond = engine.page("B", 5).await.unwrap();
    assert!(beyond.transactions.is_empty());
    assert!(!beyond.has_next);
    assert!(!beyond.is_empty_ledger());
}

#[tokio::test]
async fn page_sizes_follow_total() {
    for total in [0_u64, 1, 9, 10, 11, 20, 21] {
        let (engine, _db) = engine_with_db().await;
        let amounts: Vec<i64> = (0..total as i64).collect();
        add_many(&engine, "C", &amounts).await;

        for page in 1..=4_u64 {
            let result = engine.page("C", page).await.unwrap();
            let skipped = (page - 1) * PAGE_SIZE;
            let expected = PAGE_SIZE.min(total.saturating_sub(skipped));
            assert_eq!(result.transactions.len() as u64, expected, "T={total} p={page}");
            assert_eq!(result.has_next, page * PAGE_SIZE < total, "T={total} p={page}");
            assert_eq!(result.has_previous, page > 1);
            assert_eq!(result.total, total);
        }
    }
}

#[tokio::test]
async fn empty_ledger_first_page() {
    let (engine, _db) = engine_with_db().await;
    let page = engine.page("empty", 1).await.unwrap();
    assert!(page.is_empty_ledger());
    assert!(!page.has_next);
    assert!(!page.has_previous);
}

#[tokio::test]
async fn history_today_uses_calendar_day() {
    let (engine, _db) = engine_with_db().await;
    let now = at("2026-05-20T12:00:00Z");

    engine
        .append("A", at("2026-05-19T23:59:59Z"), 1, Some("yesterday"))
        .await
        .unwrap();
    let morning = engine
        .append("A", at("2026-05-20T00:00:00Z"), 2, Some("midnight"))
        .await
        .unwrap();
    let evening = engine
        .append("A", at("2026-05-20T23:59:59Z"), 4, Some("late"))
        .await
        .unwrap();
    engine
        .append("A", at("2026-05-21T00:00:00Z"), 8, Some("tomorrow"))
        .await
        .unwrap();
    engine
        .append("B", at("2026-05-20T10:00:00Z"), 16, Some("elsewhere"))
        .await
        .unwrap();

    let history = engine.history("A", HistoryRange::Today, now).await.unwrap();
    let ids: Vec<i64> = history.transactions.iter().map(|tx| tx.id).collect();
    assert_eq!(ids, vec![evening, morning]);
    assert_eq!(history.net, 6);
}

#[tokio::test]
async fn history_today_respects_engine_timezone() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db)
        .timezone(chrono_tz::Asia::Kolkata)
        .build()
        .await
        .unwrap();

    // 20 May in Kolkata (UTC+5:30) runs from 19 May 18:30 UTC.
    let now = at("2026-05-20T06:00:00Z");
    let early = engine
        .append("A", at("2026-05-19T19:00:00Z"), 1, None)
        .await
        .unwrap();
    engine
        .append("A", at("2026-05-19T18:00:00Z"), 2, None)
        .await
        .unwrap();

    let history = engine.history("A", HistoryRange::Today, now).await.unwrap();
    assert_eq!(history.transactions.len(), 1);
    assert_eq!(history.transactions[0].id, early);
}

#[tokio::test]
async fn history_last_days_is_closed_interval() {
    let (engine, _db) = engine_with_db().await;
    let now = at("2026-05-20T12:00:00Z");

    engine
        .append("A", now - Duration::days(3) - Duration::seconds(1), 1, None)
        .await
        .unwrap();
    engine
        .append("A", now - Duration::days(3), 2, None)
        .await
        .unwrap();
    engine.append("A", now, 4, None).await.unwrap();
    engine
        .append("A", now + Duration::minutes(1), 8, None)
        .await
        .unwrap();

    let history = engine
        .history("A", HistoryRange::LastNDays(3), now)
        .await
        .unwrap();
    assert_eq!(history.net, 6);
}

#[tokio::test]
async fn history_on_date_of_current_year() {
    let (engine, _db) = engine_with_db().await;
    let now = at("2026-05-20T12:00:00Z");

    engine
        .append("A", at("2026-02-19T08:00:00Z"), 5, None)
        .await
        .unwrap();
    engine
        .append("A", at("2025-02-19T08:00:00Z"), 50, None)
        .await
        .unwrap();

    let range = HistoryRange::parse(Some("19/02")).unwrap();
    let history = engine.history("A", range, now).await.unwrap();
    assert_eq!(history.net, 5);

    let empty = engine
        .history("A", HistoryRange::parse(Some("20/02")).unwrap(), now)
        .await
        .unwrap();
    assert!(empty.is_empty());
}

#[tokio::test]
async fn history_rejects_impossible_dates() {
    let (engine, _db) = engine_with_db().await;
    assert!(matches!(
        HistoryRange::parse(Some("30/02")),
        Err(EngineError::InvalidFormat(_))
    ));

    let err = engine
        .history(
            "A",
            HistoryRange::OnDate { day: 29, month: 2 },
            at("2026-05-20T12:00:00Z"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidFormat(_)));
}

#[tokio::test]
async fn admin_deletes_through_confirmation() {
    let (engine, _db) = engine_with_db().await;
    let ids = add_many(&engine, "A", &[10, 20, 30, 40, 50, 60]).await;
    let target = ids[4];

    let menu = engine.delete_menu("A", Capability::Admin).await.unwrap();
    let DeletionStep::Selecting(candidates) = menu else {
        panic!("expected candidates, got {menu:?}");
    };
    assert_eq!(candidates.len(), ids.len());
    assert!(candidates.iter().any(|tx| tx.id == target));

    let step = engine
        .delete_step("A", Capability::Admin, DeleteToken::Select(target))
        .await
        .unwrap();
    let DeletionStep::Confirming(chosen) = step else {
        panic!("expected confirmation, got {step:?}");
    };
    assert_eq!(chosen.id, target);
    assert_eq!(chosen.amount, 50);

    let step = engine
        .delete_step("A", Capability::Admin, DeleteToken::Confirm(target))
        .await
        .unwrap();
    assert_eq!(step, DeletionStep::Deleted(target));
    assert!(step.is_terminal());

    let page = engine.page("A", 1).await.unwrap();
    assert!(page.transactions.iter().all(|tx| tx.id != target));
    assert_eq!(engine.balance("A").await.unwrap(), 160);
}

#[tokio::test]
async fn non_admin_cannot_delete() {
    let (engine, _db) = engine_with_db().await;
    let ids = add_many(&engine, "A", &[10, 20, 30, 40, 50]).await;
    let target = ids[4];

    let steps = [
        engine.delete_menu("A", Capability::Member).await.unwrap(),
        engine
            .delete_step("A", Capability::Member, DeleteToken::Select(target))
            .await
            .unwrap(),
        engine
            .delete_step("A", Capability::Member, DeleteToken::Confirm(target))
            .await
            .unwrap(),
    ];
    assert!(steps.iter().all(|step| *step == DeletionStep::Ignored));
    assert_eq!(engine.count("A").await.unwrap(), 5);
    assert!(engine.transaction("A", target).await.unwrap().is_some());
}

#[tokio::test]
async fn cancel_and_stale_tokens() {
    let (engine, _db) = engine_with_db().await;
    let ids = add_many(&engine, "A", &[10]).await;

    let step = engine
        .delete_step("A", Capability::Admin, DeleteToken::Cancel(ids[0]))
        .await
        .unwrap();
    assert_eq!(step, DeletionStep::Cancelled(ids[0]));
    assert_eq!(engine.count("A").await.unwrap(), 1);

    engine.delete("A", ids[0]).await.unwrap();

    let step = engine
        .delete_step("A", Capability::Admin, DeleteToken::Select(ids[0]))
        .await
        .unwrap();
    assert_eq!(step, DeletionStep::Gone(ids[0]));

    let step = engine
        .delete_step("A", Capability::Admin, DeleteToken::Confirm(ids[0]))
        .await
        .unwrap();
    assert_eq!(step, DeletionStep::Deleted(ids[0]));

    let menu = engine.delete_menu("A", Capability::Admin).await.unwrap();
    assert_eq!(menu, DeletionStep::Nothing);
}

#[tokio::test]
async fn delete_menu_offers_only_first_page() {
    let (engine, _db) = engine_with_db().await;
    let amounts: Vec<i64> = (1..=15).collect();
    let ids = add_many(&engine, "A", &amounts).await;

    let DeletionStep::Selecting(candidates) =
        engine.delete_menu("A", Capability::Admin).await.unwrap()
    else {
        panic!("expected candidates");
    };
    assert_eq!(candidates.len() as u64, PAGE_SIZE);
    assert_eq!(candidates[0].id, ids[14]);
}

#[tokio::test]
async fn daily_summary_groups_conversations() {
    let (engine, _db) = engine_with_db().await;
    let now = at("2026-05-20T21:00:00Z");

    engine
        .append("A", at("2026-05-20T08:00:00Z"), 200, None)
        .await
        .unwrap();
    engine
        .append("A", at("2026-05-20T09:00:00Z"), -50, None)
        .await
        .unwrap();
    engine
        .append("B", at("2026-05-20T10:00:00Z"), -30, None)
        .await
        .unwrap();
    engine
        .append("C", at("2026-05-19T10:00:00Z"), 999, None)
        .await
        .unwrap();

    let summary = engine.daily_summary(now).await.unwrap();
    assert_eq!(summary.len(), 2);

    assert_eq!(summary[0].conversation_key, "A");
    assert_eq!(summary[0].count, 2);
    assert_eq!(summary[0].credits, 200);
    assert_eq!(summary[0].debits, -50);
    assert_eq!(summary[0].net(), 150);

    assert_eq!(summary[1].conversation_key, "B");
    assert_eq!(summary[1].net(), -30);
}

#[tokio::test]
async fn far_page_is_empty_without_error() {
    let (engine, _db) = engine_with_db().await;
    add_many(&engine, "A", &[1, 2, 3]).await;

    let page = engine.page("A", u64::MAX).await.unwrap();
    assert!(page.transactions.is_empty());
    assert_eq!(page.total, 3);
    assert!(page.has_previous);
    assert!(!page.has_next);
    assert!(!page.is_empty_ledger());

    let page = engine.page("A", 2).await.unwrap();
    assert!(page.transactions.is_empty());
    assert!(!page.has_next);
}

#[tokio::test]
async fn overflowing_sums_are_errors() {
    let (engine, _db) = engine_with_db().await;
    let now = at("2026-05-20T21:00:00Z");

    engine
        .append("A", at("2026-05-20T08:00:00Z"), i64::MAX, None)
        .await
        .unwrap();
    engine
        .append("A", at("2026-05-20T09:00:00Z"), 1, None)
        .await
        .unwrap();

    let err = engine
        .history("A", HistoryRange::Today, now)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Database(_)));

    let err = engine.daily_summary(now).await.unwrap_err();
    assert!(matches!(err, EngineError::Database(_)));
}

#[tokio::test]
async fn extreme_amounts_that_fit_are_summed() {
    let (engine, _db) = engine_with_db().await;
    let now = at("2026-05-20T21:00:00Z");

    engine
        .append("A", at("2026-05-20T08:00:00Z"), i64::MAX, None)
        .await
        .unwrap();
    engine
        .append("A", at("2026-05-20T09:00:00Z"), -1, None)
        .await
        .unwrap();

    let history = engine
        .history("A", HistoryRange::Today, now)
        .await
        .unwrap();
    assert_eq!(history.net, i64::MAX - 1);

    let summary = engine.daily_summary(now).await.unwrap();
    assert_eq!(summary[0].credits, i64::MAX);
    assert_eq!(summary[0].debits, -1);
    assert_eq!(summary[0].net(), i64::MAX - 1);
}
