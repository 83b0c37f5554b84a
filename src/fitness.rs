//! Daily step totals from the fitness provider.

use async_trait::async_trait;
use chrono::{Local, NaiveDate, NaiveTime, TimeZone};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub const STEP_DATA_TYPE: &str = "com.google.step_count.delta";

pub const DEFAULT_STEP_SOURCES: [&str; 2] = [
    "derived:com.google.step_count.delta:com.google.android.gms:estimated_steps",
    "derived:com.google.step_count.delta:com.google.android.gms:merge_step_deltas",
];

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Error)]
pub enum FitnessError {
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("provider returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("unreadable response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// A local calendar day as epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start_millis: i64,
    pub end_millis: i64,
}

impl DayWindow {
    pub fn for_local_day(date: NaiveDate) -> Self {
        let midnight = date.and_time(NaiveTime::default());
        let start_millis = Local
            .from_local_datetime(&midnight)
            .earliest()
            .map(|start| start.timestamp_millis())
            .unwrap_or_else(|| midnight.and_utc().timestamp_millis());
        Self {
            start_millis,
            end_millis: start_millis + DAY_MILLIS,
        }
    }
}

#[async_trait]
pub trait FitnessSource: Send + Sync {
    /// Step total for one data source over `window`.
    async fn aggregate_steps(
        &self,
        access_token: &str,
        data_source_id: &str,
        window: DayWindow,
    ) -> Result<u64, FitnessError>;
}

/// Queries every data source and keeps the largest total.
///
/// Sources overlap (they are different views of the same sensors), so totals
/// are never added together. Failing sources count as zero.
pub async fn fetch_steps_today(
    source: &dyn FitnessSource,
    access_token: &str,
    data_source_ids: &[String],
    window: DayWindow,
) -> u64 {
    let mut best = 0u64;
    for id in data_source_ids {
        match source.aggregate_steps(access_token, id, window).await {
            Ok(steps) => {
                debug!(data_source = %id, steps, "step source answered");
                best = best.max(steps);
            }
            Err(err) => warn!(data_source = %id, "step source failed: {err}"),
        }
    }
    best
}

#[derive(Clone)]
pub struct GoogleFitClient {
    client: Client,
    base_url: String,
}

impl GoogleFitClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FitnessError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FitnessError::Transport)?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl FitnessSource for GoogleFitClient {
    async fn aggregate_steps(
        &self,
        access_token: &str,
        data_source_id: &str,
        window: DayWindow,
    ) -> Result<u64, FitnessError> {
        let request = AggregateRequest {
            aggregate_by: vec![AggregateBy {
                data_type_name: STEP_DATA_TYPE,
                data_source_id,
            }],
            bucket_by_time: BucketByTime {
                duration_millis: DAY_MILLIS,
            },
            start_time_millis: window.start_millis,
            end_time_millis: window.end_millis,
        };

        let resp = self
            .client
            .post(self.url("/users/me/dataset:aggregate"))
            .bearer_auth(access_token)
            .json(&request)
            .send()
            .await
            .map_err(FitnessError::Transport)?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(FitnessError::Status { status, body });
        }

        let body: AggregateResponse = resp.json().await.map_err(FitnessError::Decode)?;
        Ok(body.first_day_steps())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AggregateRequest<'a> {
    aggregate_by: Vec<AggregateBy<'a>>,
    bucket_by_time: BucketByTime,
    start_time_millis: i64,
    end_time_millis: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AggregateBy<'a> {
    data_type_name: &'a str,
    data_source_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BucketByTime {
    duration_millis: i64,
}

#[derive(Debug, Default, Deserialize)]
struct AggregateResponse {
    #[serde(default)]
    bucket: Vec<Bucket>,
}

#[derive(Debug, Deserialize)]
struct Bucket {
    #[serde(default)]
    dataset: Vec<Dataset>,
}

#[derive(Debug, Deserialize)]
struct Dataset {
    #[serde(default)]
    point: Vec<DataPoint>,
}

#[derive(Debug, Deserialize)]
struct DataPoint {
    #[serde(default)]
    value: Vec<PointValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PointValue {
    #[serde(default)]
    int_val: Option<i64>,
}

impl AggregateResponse {
    /// Sum of the first value of every point in the first bucket's first dataset.
    fn first_day_steps(&self) -> u64 {
        let Some(dataset) = self.bucket.first().and_then(|b| b.dataset.first()) else {
            return 0;
        };
        dataset
            .point
            .iter()
            .filter_map(|point| point.value.first().and_then(|v| v.int_val))
            .map(|steps| steps.max(0) as u64)
            .fold(0u64, u64::saturating_add)
    }
}
