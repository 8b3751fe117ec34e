use axum::{
    routing::{get, post},
    Router,
    extract::{Json, Path, Query, State},
    response::IntoResponse,
};
use tower_http::cors::{CorsLayer, Any};
use chrono::Utc;
use tracing::info;

use crate::error::{AppError, Result};
use crate::api::models::{
    DebugResponse, FortuneRequest, FortuneResponse, HoroscopeResponse, MagicBallResponse,
    SignSummary, TarotQuery, TarotResponse,
};
use crate::api::response;
use crate::fortune::{draw_tarot_cards, magic_ball, single_card_reading, three_card_reading};
use crate::horoscope::Provider;
use crate::AppState;

/// Sign resolved by the diagnostics endpoint.
const DEBUG_SIGN: &str = "овен";

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/signs", get(signs_handler))
        .route("/api/horoscope/:sign", get(horoscope_handler))
        .route("/api/tarot", get(tarot_handler))
        .route("/api/magic-ball", get(magic_ball_handler))
        .route("/api/fortune", post(fortune_handler))
        .route("/api/debug", get(debug_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn signs_handler(State(state): State<AppState>) -> impl IntoResponse {
    let signs: Vec<SignSummary> = state
        .horoscope
        .catalog()
        .iter()
        .map(|sign| SignSummary {
            name: sign.name().to_string(),
            slug: sign.slug().to_string(),
            emoji: sign.emoji().to_string(),
            label: sign.label(),
        })
        .collect();
    response::success(signs)
}

async fn horoscope_handler(
    State(state): State<AppState>,
    Path(sign): Path<String>,
) -> impl IntoResponse {
    info!(sign = %sign, "horoscope requested");
    let start_time = std::time::Instant::now();

    let horoscope = state.horoscope.get_daily_horoscope(&sign).await;
    info!(sign = %sign, elapsed = ?start_time.elapsed(), "horoscope resolved");

    let (name, emoji, title) = match state.horoscope.catalog().get(&sign) {
        Some(known) => (
            known.name().to_string(),
            known.emoji().to_string(),
            format!("Гороскоп для {} на сегодня", known.display_name()),
        ),
        None => (sign.clone(), String::new(), "Гороскоп".to_string()),
    };

    response::success(HoroscopeResponse {
        sign: name,
        emoji,
        title,
        horoscope,
        date: state.horoscope.today(),
        fetched_at: Utc::now(),
    })
}

async fn tarot_handler(
    Query(query): Query<TarotQuery>,
) -> impl IntoResponse {
    response::from_result(tarot_spread(query.count.unwrap_or(1)))
}

fn tarot_spread(count: usize) -> Result<TarotResponse> {
    let reading = match count {
        1 => {
            let cards = draw_tarot_cards(1)?;
            let reading = single_card_reading(&cards[0]);
            TarotResponse { cards, reading }
        }
        3 => {
            let cards = draw_tarot_cards(3)?;
            let reading = three_card_reading(&cards[0], &cards[1], &cards[2]);
            TarotResponse { cards, reading }
        }
        other => {
            return Err(AppError::InvalidRequest(format!(
                "tarot spreads use 1 or 3 cards, got {}",
                other
            )))
        }
    };
    Ok(reading)
}

async fn magic_ball_handler() -> impl IntoResponse {
    response::success(MagicBallResponse { answer: magic_ball() })
}

async fn fortune_handler(
    State(state): State<AppState>,
    Json(req): Json<FortuneRequest>,
) -> impl IntoResponse {
    response::from_result(process_fortune_request(&state, &req).await)
}

async fn process_fortune_request(state: &AppState, req: &FortuneRequest) -> Result<FortuneResponse> {
    let topic = req.topic.trim();
    if topic.is_empty() {
        return Err(AppError::InvalidRequest("topic must not be empty".to_string()));
    }

    info!(user_id = req.user_id, "fortune requested");
    let reply = state.fortune.tell(req.user_id, topic).await?;
    Ok(FortuneResponse { reply })
}

async fn debug_handler(State(state): State<AppState>) -> impl IntoResponse {
    let available_sites = state.horoscope.check_site_availability().await;
    info!(available = available_sites.len(), "provider availability checked");

    let sample = state.horoscope.get_daily_horoscope(DEBUG_SIGN).await;

    response::success(DebugResponse {
        available_sites,
        checked: Provider::ALL.len(),
        sample_sign: DEBUG_SIGN.to_string(),
        sample_length: sample.chars().count(),
    })
}
