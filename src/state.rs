use crate::config::{Config, RolloverPolicy};
use crate::device::{ControlMode, DeviceRelay, HungerReport};
use crate::fitness::FitnessSource;
use crate::ledger::Ledger;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::{Mutex, RwLock};

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub rollover_policy: RolloverPolicy,
    pub step_sources: Arc<Vec<String>>,
    pub ledger: Arc<Mutex<Ledger>>,
    pub fitness: Arc<dyn FitnessSource>,
    pub device: Arc<dyn DeviceRelay>,
    pub access_token: Arc<RwLock<Option<String>>>,
    pub hunger: Arc<RwLock<Option<HungerReport>>>,
    pub mode: Arc<Mutex<ControlMode>>,
    /// Serializes feeds so the ledger lock is free during the device call.
    pub feeding: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(
        config: &Config,
        ledger: Ledger,
        fitness: Arc<dyn FitnessSource>,
        device: Arc<dyn DeviceRelay>,
    ) -> Self {
        Self {
            data_path: config.data_path.clone(),
            rollover_policy: config.rollover_policy,
            step_sources: Arc::new(
                crate::fitness::DEFAULT_STEP_SOURCES
                    .iter()
                    .map(|id| id.to_string())
                    .collect(),
            ),
            ledger: Arc::new(Mutex::new(ledger)),
            fitness,
            device,
            access_token: Arc::new(RwLock::new(config.fitness_access_token.clone())),
            hunger: Arc::new(RwLock::new(None)),
            mode: Arc::new(Mutex::new(ControlMode::default())),
            feeding: Arc::new(Mutex::new(())),
        }
    }
}
