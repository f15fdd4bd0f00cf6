use std::sync::Arc;

use chrono::NaiveTime;
use chrono_tz::Tz;
use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "ledgerbot={level},telegram_bot={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let timezone: Tz = settings
        .app
        .timezone
        .parse()
        .map_err(|err| format!("invalid timezone {:?}: {err}", settings.app.timezone))?;
    let digest_at = if settings.digest.enabled {
        Some(
            NaiveTime::parse_from_str(&settings.digest.at, "%H:%M")
                .map_err(|err| format!("invalid digest time {:?}: {err}", settings.digest.at))?,
        )
    } else {
        None
    };

    let db = parse_database(&settings.database).await?;
    let engine = Arc::new(
        engine::Engine::builder()
            .database(db)
            .timezone(timezone)
            .build()
            .await?,
    );

    let Some(telegram) = settings.telegram else {
        tracing::warn!("No telegram settings found, nothing to run");
        return Ok(());
    };

    tracing::info!("Found telegram settings...");
    let bot = telegram_bot::Bot::builder()
        .token(&telegram.token)
        .admin(telegram.admin_id)
        .engine(engine)
        .digest_at(digest_at)
        .build()?;

    if let Some(digest) = bot.digest() {
        tasks.spawn(digest.run());
    }
    tasks.spawn(async move { bot.run().await });

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
