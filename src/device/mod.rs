//! HTTP relay to the wearable's on-board web server.
//!
//! Every command is a single GET with no retry. Non-success statuses come back
//! as [`DeviceError::Status`] carrying the device's text body.

pub mod policy;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("device returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("unreadable response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Expressions the device accepts on `/emotion`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Emotion {
    Neutral = 0,
    Angry = 1,
    Surprised = 2,
    Sad = 3,
    Suspicious = 4,
    Left = 5,
    Right = 6,
    Up = 7,
    Down = 8,
    Sleepy = 9,
}

impl Emotion {
    pub const ALL: [Emotion; 10] = [
        Emotion::Neutral,
        Emotion::Angry,
        Emotion::Surprised,
        Emotion::Sad,
        Emotion::Suspicious,
        Emotion::Left,
        Emotion::Right,
        Emotion::Up,
        Emotion::Down,
        Emotion::Sleepy,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<i64> for Emotion {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        usize::try_from(value)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
            .ok_or(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightState {
    On,
    Off,
}

impl LightState {
    pub fn as_str(self) -> &'static str {
        match self {
            LightState::On => "on",
            LightState::Off => "off",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlMode {
    #[default]
    Auto,
    Manual,
}

impl ControlMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ControlMode::Auto => "auto",
            ControlMode::Manual => "manual",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HungerReport {
    pub hunger: u8,
    pub critical: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatus {
    pub current_eye_state: i64,
    pub hunger_level: u8,
}

#[async_trait]
pub trait DeviceRelay: Send + Sync {
    async fn set_emotion(&self, emotion: Emotion) -> Result<String, DeviceError>;
    async fn toggle_reading_light(&self) -> Result<LightState, DeviceError>;
    async fn toggle_manual(&self) -> Result<ControlMode, DeviceError>;
    async fn feed(&self) -> Result<String, DeviceError>;
    async fn hunger(&self) -> Result<HungerReport, DeviceError>;
    async fn status(&self) -> Result<DeviceStatus, DeviceError>;
}

#[derive(Clone)]
pub struct DeviceClient {
    client: Client,
    base_url: String,
}

impl DeviceClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DeviceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(DeviceError::Transport)?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<reqwest::Response, DeviceError> {
        let resp = self
            .client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(|err| {
                warn!("GET {path} failed: {err}");
                DeviceError::Transport(err)
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            warn!("GET {path} returned {status}: {body}");
            return Err(DeviceError::Status { status, body });
        }
        Ok(resp)
    }

    async fn get_text(&self, path: &str, query: &[(&str, String)]) -> Result<String, DeviceError> {
        let text = self
            .get(path, query)
            .await?
            .text()
            .await
            .map_err(DeviceError::Decode)?;
        debug!("GET {path} -> {text}");
        Ok(text)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, DeviceError> {
        self.get(path, &[]).await?.json().await.map_err(DeviceError::Decode)
    }
}

#[async_trait]
impl DeviceRelay for DeviceClient {
    async fn set_emotion(&self, emotion: Emotion) -> Result<String, DeviceError> {
        self.get_text("/emotion", &[("state", emotion.code().to_string())]).await
    }

    async fn toggle_reading_light(&self) -> Result<LightState, DeviceError> {
        let text = self.get_text("/readinglight", &[]).await?;
        Ok(parse_light(&text))
    }

    async fn toggle_manual(&self) -> Result<ControlMode, DeviceError> {
        let text = self.get_text("/manual", &[]).await?;
        Ok(parse_mode(&text))
    }

    async fn feed(&self) -> Result<String, DeviceError> {
        self.get_text("/feed", &[]).await
    }

    async fn hunger(&self) -> Result<HungerReport, DeviceError> {
        self.get_json("/hunger").await
    }

    async fn status(&self) -> Result<DeviceStatus, DeviceError> {
        self.get_json("/status").await
    }
}

pub fn parse_light(text: &str) -> LightState {
    if text.contains("ON") {
        LightState::On
    } else {
        LightState::Off
    }
}

pub fn parse_mode(text: &str) -> ControlMode {
    if text.contains("ON") {
        ControlMode::Manual
    } else {
        ControlMode::Auto
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emotion_codes_cover_zero_to_nine() {
        for code in 0i64..=9 {
            let emotion = Emotion::try_from(code).unwrap();
            assert_eq!(i64::from(emotion.code()), code);
        }
        assert_eq!(Emotion::try_from(3i64), Ok(Emotion::Sad));
        assert_eq!(Emotion::try_from(10i64), Err(10));
        assert_eq!(Emotion::try_from(-1i64), Err(-1));
    }

    #[test]
    fn toggle_responses_parse() {
        assert_eq!(parse_light("Reading light ON"), LightState::On);
        assert_eq!(parse_light("Reading light OFF"), LightState::Off);
        assert_eq!(parse_mode("Manual mode ON"), ControlMode::Manual);
        assert_eq!(parse_mode("Manual mode OFF"), ControlMode::Auto);
    }

    #[test]
    fn status_uses_camel_case() {
        let status: DeviceStatus =
            serde_json::from_str(r#"{"currentEyeState":3,"hungerLevel":0}"#).unwrap();
        assert_eq!(status.current_eye_state, 3);
        assert_eq!(status.hunger_level, 0);
    }
}
