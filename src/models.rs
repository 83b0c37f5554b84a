use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The persisted ledger record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LedgerState {
    #[serde(default)]
    pub converted_steps: u64,
    #[serde(default)]
    pub total_treats: u64,
    #[serde(default)]
    pub last_update_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSummary {
    pub total_steps: u64,
    pub available_steps: u64,
    pub available_treats: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversion {
    pub treats_minted: u64,
    pub steps_converted: u64,
    pub remaining_steps: u64,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
pub struct EmotionRequest {
    pub state: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LedgerResponse {
    pub date: String,
    pub converted_steps: u64,
    pub total_treats: u64,
    pub last_update_date: Option<NaiveDate>,
    pub steps_per_treat: u64,
    pub summary: Option<StepSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StepsResponse {
    pub date: String,
    pub total_steps: u64,
    pub available_steps: u64,
    pub available_treats: u64,
    pub total_treats: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConvertResponse {
    pub converted: Option<Conversion>,
    pub available_steps: u64,
    pub total_treats: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeedResponse {
    pub message: String,
    pub total_treats: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}
