use chrono::Local;
use day_ledger::{
    config,
    core::{DayRecordStore, ShoppingListStore, ThemeStore, YearMonth},
    errors::Result,
    store::SqliteStore,
};
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load config.toml (defaults when absent)
    let app_config = config::app::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    let week_start = app_config.calendar.week_start()?;

    // 4. Open the database and make sure the table exists
    let db = config::database::create_connection(&app_config.database_url())
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    config::database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))?;
    let store = SqliteStore::new(db);

    // 5. Load every store from the shared key-value table
    let theme = ThemeStore::new(&store).load().await?;
    let mut days = DayRecordStore::new(&store);
    days.load_all().await?;
    let mut shopping = ShoppingListStore::new(&store);
    shopping.load_items().await?;

    // 6. Summarize the current month
    let month = YearMonth::from_date(Local::now().date_naive());
    info!(
        month = %month,
        days = month.length(),
        grid_offset = month.grid_offset(week_start),
        profit = days.monthly_profit(month),
        shopping_items = shopping.items().len(),
        theme = %theme,
        "Ledger summary"
    );

    Ok(())
}
