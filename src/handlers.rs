use crate::config::RolloverPolicy;
use crate::device::{ControlMode, Emotion, HungerReport, policy};
use crate::errors::AppError;
use crate::fitness::{DayWindow, fetch_steps_today};
use crate::ledger::Ledger;
use crate::models::{
    CommandResponse, ConvertResponse, EmotionRequest, FeedResponse, LedgerResponse,
    StepsResponse, TokenRequest,
};
use crate::state::AppState;
use crate::storage::persist_data;
use crate::ui::render_index;
use axum::{extract::State, http::StatusCode, response::Html, Json};
use chrono::{Local, NaiveDate};
use tracing::{info, warn};

const MANUAL_REFUSED: &str = "pet is sad and starving, feed it before taking manual control";

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let ledger = state.ledger.lock().await;
    Html(render_index(&to_response(today(), &ledger)))
}

pub async fn get_ledger(State(state): State<AppState>) -> Result<Json<LedgerResponse>, AppError> {
    let ledger = state.ledger.lock().await;
    Ok(Json(to_response(today(), &ledger)))
}

pub async fn set_token(
    State(state): State<AppState>,
    Json(payload): Json<TokenRequest>,
) -> Result<StatusCode, AppError> {
    let token = payload.access_token.trim();
    if token.is_empty() {
        return Err(AppError::bad_request("access_token must not be empty"));
    }

    *state.access_token.write().await = Some(token.to_string());
    info!("fitness access token updated");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn refresh_steps(State(state): State<AppState>) -> Result<Json<StepsResponse>, AppError> {
    let token = state
        .access_token
        .read()
        .await
        .clone()
        .ok_or_else(|| AppError::unauthorized("connect a fitness account first"))?;

    let date = today();
    if state.rollover_policy == RolloverPolicy::OnRefresh {
        rollover_if_needed(&state, date).await?;
    }

    let window = DayWindow::for_local_day(date);
    let raw_total =
        fetch_steps_today(state.fitness.as_ref(), &token, &state.step_sources, window).await;

    let mut ledger = state.ledger.lock().await;
    let summary = ledger.refresh_steps_today(raw_total);

    Ok(Json(StepsResponse {
        date: date.to_string(),
        total_steps: summary.total_steps,
        available_steps: summary.available_steps,
        available_treats: summary.available_treats,
        total_treats: ledger.state().total_treats,
    }))
}

pub async fn convert(State(state): State<AppState>) -> Result<Json<ConvertResponse>, AppError> {
    let mut ledger = state.ledger.lock().await;
    let mut next = ledger.clone();
    let converted = next.convert();

    if let Some(conversion) = converted {
        commit(&state, &mut ledger, next).await?;
        info!(
            treats = conversion.treats_minted,
            steps = conversion.steps_converted,
            "converted steps into treats"
        );
    }

    Ok(Json(ConvertResponse {
        converted,
        available_steps: ledger.last_summary().map_or(0, |s| s.available_steps),
        total_treats: ledger.state().total_treats,
    }))
}

pub async fn feed(State(state): State<AppState>) -> Result<Json<FeedResponse>, AppError> {
    // Only feeds spend treats, so one feed at a time keeps the check below valid.
    let _feeding = state.feeding.lock().await;
    if state.ledger.lock().await.state().total_treats == 0 {
        return Err(AppError::conflict("no treats left, convert some steps first"));
    }

    let message = state.device.feed().await?;

    let mut ledger = state.ledger.lock().await;
    let mut next = ledger.clone();
    next.consume_treat();
    commit(&state, &mut ledger, next).await?;
    info!(remaining = ledger.state().total_treats, "pet fed");

    Ok(Json(FeedResponse {
        message,
        total_treats: ledger.state().total_treats,
    }))
}

pub async fn emotion(
    State(state): State<AppState>,
    Json(payload): Json<EmotionRequest>,
) -> Result<Json<CommandResponse>, AppError> {
    let emotion = Emotion::try_from(payload.state)
        .map_err(|value| AppError::bad_request(format!("state must be 0-9, got {value}")))?;

    let hunger = *state.hunger.read().await;
    if !policy::emotion_permitted(hunger.as_ref(), emotion) {
        return Err(AppError::conflict(
            "pet is critically hungry, only the sad expression is available",
        ));
    }

    let message = state.device.set_emotion(emotion).await?;
    info!(?emotion, "emotion set");

    Ok(Json(CommandResponse {
        message,
        state: Some(emotion.code().to_string()),
    }))
}

pub async fn light(State(state): State<AppState>) -> Result<Json<CommandResponse>, AppError> {
    let light = state.device.toggle_reading_light().await?;
    info!(state = light.as_str(), "reading light toggled");

    Ok(Json(CommandResponse {
        message: format!("Reading light turned {}", light.as_str().to_uppercase()),
        state: Some(light.as_str().to_string()),
    }))
}

pub async fn manual(State(state): State<AppState>) -> Result<Json<CommandResponse>, AppError> {
    let mut mode = state.mode.lock().await;

    // The cached mode goes stale when the device reboots, so always ask.
    let status = state.device.status().await?;
    let permitted = policy::manual_switch_permitted(&status);
    if !permitted && *mode == ControlMode::Auto {
        warn!(?status, "manual mode refused");
        return Err(AppError::conflict(MANUAL_REFUSED));
    }

    *mode = state.device.toggle_manual().await?;
    if !permitted && *mode == ControlMode::Manual {
        warn!(?status, "device entered manual mode while starving, reverting");
        *mode = state.device.toggle_manual().await?;
        return Err(AppError::conflict(MANUAL_REFUSED));
    }
    info!(mode = mode.as_str(), "control mode toggled");

    let message = match *mode {
        ControlMode::Manual => "Manual mode enabled",
        ControlMode::Auto => "Auto mode enabled",
    };
    Ok(Json(CommandResponse {
        message: message.to_string(),
        state: Some(mode.as_str().to_string()),
    }))
}

pub async fn get_hunger(State(state): State<AppState>) -> Json<Option<HungerReport>> {
    Json(*state.hunger.read().await)
}

async fn rollover_if_needed(state: &AppState, date: NaiveDate) -> Result<(), AppError> {
    let mut ledger = state.ledger.lock().await;
    let mut next = ledger.clone();
    if next.check_and_rollover_day(date) {
        commit(state, &mut ledger, next).await?;
        info!(%date, "new day, converted steps reset");
    }
    Ok(())
}

/// Writes `next` to disk and only then replaces the in-memory ledger.
async fn commit(state: &AppState, current: &mut Ledger, next: Ledger) -> Result<(), AppError> {
    persist_data(&state.data_path, next.state()).await?;
    *current = next;
    Ok(())
}

fn to_response(date: NaiveDate, ledger: &Ledger) -> LedgerResponse {
    let data = ledger.state();
    LedgerResponse {
        date: date.to_string(),
        converted_steps: data.converted_steps,
        total_treats: data.total_treats,
        last_update_date: data.last_update_date,
        steps_per_treat: ledger.steps_per_treat(),
        summary: ledger.last_summary(),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::device::{DeviceError, DeviceRelay, DeviceStatus, LightState};
    use crate::fitness::{FitnessError, FitnessSource};
    use crate::models::LedgerState;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex as StdMutex};
    use std::time::Duration;

    struct NoSteps;

    #[async_trait]
    impl FitnessSource for NoSteps {
        async fn aggregate_steps(
            &self,
            _access_token: &str,
            _data_source_id: &str,
            _window: DayWindow,
        ) -> Result<u64, FitnessError> {
            Ok(0)
        }
    }

    struct FakeDevice {
        status: DeviceStatus,
        manual_on: StdMutex<bool>,
        feed_delay: Duration,
        feeds: StdMutex<u32>,
    }

    impl FakeDevice {
        fn new(eye: i64, hunger: u8, manual_on: bool) -> Self {
            Self {
                status: DeviceStatus {
                    current_eye_state: eye,
                    hunger_level: hunger,
                },
                manual_on: StdMutex::new(manual_on),
                feed_delay: Duration::ZERO,
                feeds: StdMutex::new(0),
            }
        }
    }

    #[async_trait]
    impl DeviceRelay for FakeDevice {
        async fn set_emotion(&self, emotion: Emotion) -> Result<String, DeviceError> {
            Ok(format!("Emotion set to {}", emotion.code()))
        }
        async fn toggle_reading_light(&self) -> Result<LightState, DeviceError> {
            Ok(LightState::On)
        }
        async fn toggle_manual(&self) -> Result<ControlMode, DeviceError> {
            let mut on = self.manual_on.lock().unwrap();
            *on = !*on;
            Ok(if *on { ControlMode::Manual } else { ControlMode::Auto })
        }
        async fn feed(&self) -> Result<String, DeviceError> {
            tokio::time::sleep(self.feed_delay).await;
            *self.feeds.lock().unwrap() += 1;
            Ok("Pet fed! Happy eyes activated".to_string())
        }
        async fn hunger(&self) -> Result<HungerReport, DeviceError> {
            Ok(HungerReport {
                hunger: self.status.hunger_level,
                critical: self.status.hunger_level == 0,
            })
        }
        async fn status(&self) -> Result<DeviceStatus, DeviceError> {
            Ok(self.status)
        }
    }

    fn temp_file(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("pet_companion_{name}_{}_{nanos}.json", std::process::id()))
    }

    fn app_state(data_path: PathBuf, ledger: LedgerState, device: Arc<FakeDevice>) -> AppState {
        let config = Config {
            data_path,
            ..Config::default()
        };
        AppState::new(&config, Ledger::new(ledger, 100), Arc::new(NoSteps), device)
    }

    fn with_treats(total_treats: u64) -> LedgerState {
        LedgerState {
            converted_steps: 0,
            total_treats,
            last_update_date: Some(today()),
        }
    }

    #[tokio::test]
    async fn manual_rechecks_status_when_cached_mode_is_stale() {
        let device = Arc::new(FakeDevice::new(3, 0, false));
        let state = app_state(temp_file("stale_mode"), with_treats(0), Arc::clone(&device));
        *state.mode.lock().await = ControlMode::Manual;

        let err = manual(State(state.clone())).await.err().expect("switch refused");
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert!(!*device.manual_on.lock().unwrap());
        assert_eq!(*state.mode.lock().await, ControlMode::Auto);
    }

    #[tokio::test]
    async fn manual_resyncs_cached_mode_from_device() {
        let device = Arc::new(FakeDevice::new(0, 80, true));
        let state = app_state(temp_file("resync_mode"), with_treats(0), Arc::clone(&device));

        let Json(resp) = manual(State(state.clone())).await.unwrap();
        assert_eq!(resp.state.as_deref(), Some("auto"));
        assert_eq!(*state.mode.lock().await, ControlMode::Auto);
    }

    #[tokio::test]
    async fn ledger_stays_readable_during_slow_feed() {
        let path = temp_file("slow_feed");
        let mut device = FakeDevice::new(0, 50, false);
        device.feed_delay = Duration::from_millis(400);
        let state = app_state(path.clone(), with_treats(1), Arc::new(device));

        let feeding = tokio::spawn(feed(State(state.clone())));
        tokio::time::sleep(Duration::from_millis(50)).await;

        let read = tokio::time::timeout(Duration::from_millis(150), get_ledger(State(state.clone())))
            .await
            .expect("ledger blocked by feed");
        assert_eq!(read.unwrap().0.total_treats, 1);

        let Json(fed) = feeding.await.unwrap().unwrap();
        assert_eq!(fed.total_treats, 0);
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn failed_write_leaves_conversion_uncommitted() {
        let device = Arc::new(FakeDevice::new(0, 50, false));
        let state = app_state(std::env::temp_dir(), with_treats(0), device);
        state.ledger.lock().await.refresh_steps_today(350);
        let before = state.ledger.lock().await.state().clone();

        let err = convert(State(state.clone())).await.err().expect("write fails");
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);

        let ledger = state.ledger.lock().await;
        assert_eq!(ledger.state(), &before);
        assert_eq!(ledger.last_summary().map(|s| s.available_treats), Some(3));
    }

    #[tokio::test]
    async fn failed_write_leaves_feed_uncommitted() {
        let device = Arc::new(FakeDevice::new(0, 50, false));
        let state = app_state(std::env::temp_dir(), with_treats(2), Arc::clone(&device));

        let err = feed(State(state.clone())).await.err().expect("write fails");
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(*device.feeds.lock().unwrap(), 1);
        assert_eq!(state.ledger.lock().await.state().total_treats, 2);
    }
}
