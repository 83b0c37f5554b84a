use pet_companion::{
    device::DeviceClient,
    fitness::GoogleFitClient,
    ledger::Ledger,
    load_data, poller, router,
    storage::persist_data,
    AppState, Config,
};
use chrono::Local;
use std::{net::SocketAddr, sync::Arc};
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;
    if let Some(parent) = config.data_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let mut ledger = Ledger::new(load_data(&config.data_path).await, config.steps_per_treat);
    let today = Local::now().date_naive();
    if ledger.check_and_rollover_day(today) {
        info!(%today, "new day, converted steps reset");
        if let Err(err) = persist_data(&config.data_path, ledger.state()).await {
            warn!("could not save ledger after rollover: {}", err.message);
        }
    }

    let fitness = GoogleFitClient::new(config.fitness_api_base.clone(), config.http_timeout)?;
    let device = DeviceClient::new(config.device_url.clone(), config.http_timeout)?;
    let state = AppState::new(&config, ledger, Arc::new(fitness), Arc::new(device));

    if let Some(period) = config.hunger_poll_interval {
        let _poller = poller::spawn_hunger_poller(state.clone(), period);
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(
        device = %config.device_url,
        steps_per_treat = config.steps_per_treat,
        rollover = config.rollover_policy.as_str(),
        "listening on http://{addr}"
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}
