use anyhow::Context;
use gramstay::{AppState, DashboardSummary};
use gramstay_store::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load config")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log.filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let state = AppState::from_config(&config).context("Failed to open storage")?;
    let summary = DashboardSummary::collect(&state);

    tracing::info!(
        "Loaded {} saved items, {} bookings, {} reviews",
        summary.saved.total,
        summary.bookings.total,
        summary.reviews.count
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
