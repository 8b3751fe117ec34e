use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};

use crate::fortune::TarotCard;

#[derive(Serialize)]
pub struct SignSummary {
    pub name: String,
    pub slug: String,
    pub emoji: String,
    pub label: String,
}

#[derive(Serialize)]
pub struct HoroscopeResponse {
    pub sign: String,
    pub emoji: String,
    pub title: String,
    pub horoscope: String,
    pub date: NaiveDate,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct TarotQuery {
    pub count: Option<usize>,
}

#[derive(Serialize)]
pub struct TarotResponse {
    pub cards: Vec<TarotCard>,
    pub reading: String,
}

#[derive(Serialize)]
pub struct MagicBallResponse {
    pub answer: String,
}

#[derive(Deserialize)]
pub struct FortuneRequest {
    pub user_id: u64,
    pub topic: String,
}

#[derive(Serialize)]
pub struct FortuneResponse {
    pub reply: String,
}

#[derive(Serialize)]
pub struct DebugResponse {
    pub available_sites: Vec<String>,
    pub checked: usize,
    pub sample_sign: String,
    pub sample_length: usize,
}
