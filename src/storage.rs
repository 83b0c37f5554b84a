use crate::errors::AppError;
use crate::models::LedgerState;
use std::path::Path;
use tokio::fs;
use tracing::error;

pub async fn load_data(path: &Path) -> LedgerState {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse ledger file {}: {err}", path.display());
                LedgerState::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => LedgerState::default(),
        Err(err) => {
            error!("failed to read ledger file {}: {err}", path.display());
            LedgerState::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &LedgerState) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(|err| {
        error!("failed to write ledger file {}: {err}", path.display());
        AppError::internal(err)
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("pet_companion_{name}_{}_{nanos}.json", std::process::id()))
    }

    #[tokio::test]
    async fn persist_then_load_round_trips() {
        let path = temp_path("round_trip");
        let state = LedgerState {
            converted_steps: 1_200,
            total_treats: 7,
            last_update_date: NaiveDate::from_ymd_opt(2026, 10, 19),
        };

        persist_data(&path, &state).await.unwrap();
        let loaded = load_data(&path).await;
        assert_eq!(loaded, state);

        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn missing_file_loads_defaults() {
        let loaded = load_data(&temp_path("missing")).await;
        assert_eq!(loaded, LedgerState::default());
    }

    #[tokio::test]
    async fn corrupt_file_loads_defaults() {
        let path = temp_path("corrupt");
        fs::write(&path, b"{not json").await.unwrap();
        assert_eq!(load_data(&path).await, LedgerState::default());
        let _ = fs::remove_file(&path).await;
    }
}
