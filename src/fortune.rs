use rand::seq::SliceRandom;
use reqwest::Client;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{error, info};

use crate::config::LlmSettings;
use crate::error::{AppError, Result};
use crate::llm::call_openrouter;

/// Turns sent to the model per request.
pub const MAX_HISTORY: usize = 15;
/// Turns kept per user between requests.
pub const KEPT_HISTORY: usize = MAX_HISTORY * 2;

pub const APOLOGY: &str = "Упс! Мои магические кристаллы затуманились...";

const FORTUNE_PROMPT: &str = "Сгенерируй загадочное и немного шутливое предсказание на тему, \
    которую назовёт пользователь. Всегда выдавай один большой вариант ответа \
    (старайся давать ответы до 1000 символов, но использовать их все). \
    Избегай фраз вроде 'вот, держи' и им подобных. Сразу выдавай пользователю предсказание.";

const MAGIC_BALL: [&str; 7] = [
    "Знаки говорят — да! ✅",
    "Мои кристаллы показывают — нет ❌",
    "Шансы невелики... но все возможно 🌙",
    "Определенно да! 🌟",
    "Лучше не стоит 🚫",
    "Да, но будь осторожен ⚠️",
    "Нет, и это к лучшему 💫",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TarotCard {
    pub name: &'static str,
    pub meaning: &'static str,
    pub symbol: &'static str,
}

const fn card(name: &'static str, meaning: &'static str, symbol: &'static str) -> TarotCard {
    TarotCard { name, meaning, symbol }
}

pub const MAJOR_ARCANA: [TarotCard; 22] = [
    card("Шут", "Начало чего-то нового. Не бойся рисковать!", "🃏"),
    card("Маг", "У тебя есть все необходимое для успеха. Действуй!", "🪄"),
    card("Верховная Жрица", "Доверяй своей интуиции. Твой внутренний голос знает ответ.", "🌙"),
    card("Императрица", "Плодородие и изобилие. Твои усилия принесут результаты.", "👑"),
    card("Император", "Стабильность и контроль. Пора принимать важные решения.", "⚜️"),
    card("Иерофант", "Ищи мудрых советников. Обучение и традиции помогут тебе.", "📖"),
    card("Влюбленные", "Перед тобой важный выбор. Слушай свое сердце.", "💑"),
    card("Колесница", "Двигайся вперед к своей цели. Успех в путешествиях.", "🛡️"),
    card("Сила", "Ты сильнее, чем думаешь. Смелость победит любые страхи.", "🦁"),
    card("Отшельник", "Время для размышлений. Побыть одному - это хорошо.", "🧙"),
    card("Колесо Фортуны", "Удача на твоей стороне. Жди приятных сюрпризов.", "🎡"),
    card("Справедливость", "Все будет по справедливости. Правда восторжествует.", "⚖️"),
    card("Повешенный", "Взгляни на ситуацию по-новому. Иногда нужно просто отпустить.", "🙃"),
    card("Смерть", "Конец одного и начало другого. Перемены - это хорошо.", "💀"),
    card("Умеренность", "Соблюдай баланс во всем. Не торопись.", "⚗️"),
    card("Дьявол", "Осторожнее с вредными привычками. Не попадись в ловушку.", "😈"),
    card("Башня", "Неожиданные изменения. Старое должно уйти, чтобы пришло новое.", "🏰"),
    card("Звезда", "Надежда и вера в лучшее. Твои мечты сбудутся.", "⭐"),
    card("Луна", "Не все так, как кажется. Доверяй своим чувствам.", "🌕"),
    card("Солнце", "Радость и успех. Все будет хорошо!", "☀️"),
    card("Суд", "Время подвести итоги. Пришло время для новых начинаний.", "👼"),
    card("Мир", "Гармония и завершение. Ты на правильном пути.", "🌍"),
];

const SINGLE_CARD_CLOSINGS: [&str; 5] = [
    "Эта карта указывает на важные энергии в твоей жизни сейчас. Прислушайся к интуиции!",
    "Аркан приносит тебе послание свыше. Задумайся над его значением.",
    "Карта показывает ключевую тему твоего нынешнего пути.",
    "Этот аркан раскрывает тайны твоей судьбы в данный момент.",
    "Мудрость карты поможет тебе найти верное направление.",
];

/// Draw `count` distinct cards.
pub fn draw_tarot_cards(count: usize) -> Result<Vec<TarotCard>> {
    if count == 0 || count > MAJOR_ARCANA.len() {
        return Err(AppError::InvalidRequest(format!("cannot draw {} tarot cards", count)));
    }
    let mut rng = rand::thread_rng();
    Ok(MAJOR_ARCANA.choose_multiple(&mut rng, count).copied().collect())
}

pub fn single_card_reading(card: &TarotCard) -> String {
    let closing = SINGLE_CARD_CLOSINGS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(SINGLE_CARD_CLOSINGS[0]);
    format!("{} **{}**\n\n{}\n\n{}", card.symbol, card.name, card.meaning, closing)
}

pub fn three_card_reading(past: &TarotCard, present: &TarotCard, future: &TarotCard) -> String {
    format!(
        "📜 **Расклад на три карты**\n\n\
         🕰 **Прошлое:** {} {}\n{}\n\n\
         ⚡ **Настоящее:** {} {}\n{}\n\n\
         🔮 **Будущее:** {} {}\n{}",
        past.symbol, past.name, past.meaning,
        present.symbol, present.name, present.meaning,
        future.symbol, future.name, future.meaning,
    )
}

pub fn magic_ball() -> String {
    let answer = MAGIC_BALL
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(MAGIC_BALL[0]);
    format!("🎱 {}", answer)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub parts: Vec<String>,
}

impl Turn {
    pub fn user(parts: Vec<String>) -> Self {
        Self { role: Role::User, parts }
    }

    pub fn model(text: String) -> Self {
        Self { role: Role::Model, parts: vec![text] }
    }
}

/// Per-user conversation history.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<u64, Vec<Turn>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the user's turn and return the window to send to the model.
    pub fn begin(&self, user_id: u64, turn: Turn) -> Result<Vec<Turn>> {
        let mut sessions = self.lock()?;
        let history = sessions.entry(user_id).or_default();
        history.push(turn);
        let start = history.len().saturating_sub(MAX_HISTORY);
        Ok(history[start..].to_vec())
    }

    /// Record the model's reply, if any, and trim the history.
    pub fn finish(&self, user_id: u64, reply: Option<String>) -> Result<()> {
        let mut sessions = self.lock()?;
        let history = sessions.entry(user_id).or_default();
        if let Some(reply) = reply {
            history.push(Turn::model(reply));
        }
        if history.len() > KEPT_HISTORY {
            history.drain(..history.len() - KEPT_HISTORY);
        }
        Ok(())
    }

    pub fn history(&self, user_id: u64) -> Vec<Turn> {
        self.lock()
            .map(|sessions| sessions.get(&user_id).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<u64, Vec<Turn>>>> {
        self.sessions
            .lock()
            .map_err(|_| AppError::LlmError("session store lock poisoned".to_string()))
    }
}

/// AI fortunes with per-user memory.
pub struct FortuneTeller {
    client: Client,
    settings: LlmSettings,
    sessions: SessionStore,
}

impl FortuneTeller {
    pub fn new(settings: LlmSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build LLM client: {}", e)))?;
        Ok(Self {
            client,
            settings,
            sessions: SessionStore::new(),
        })
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// A fortune on `topic`. Model failures yield the apology text.
    pub async fn tell(&self, user_id: u64, topic: &str) -> Result<String> {
        let turn = Turn::user(vec![FORTUNE_PROMPT.to_string(), topic.to_string()]);
        let window = self.sessions.begin(user_id, turn)?;

        info!(user_id, turns = window.len(), "requesting fortune");
        let reply = match call_openrouter(&self.client, &self.settings, &window).await {
            Ok(reply) => Some(reply),
            Err(err) => {
                error!(user_id, error = %err, "fortune generation failed");
                None
            }
        };

        self.sessions.finish(user_id, reply.clone())?;
        Ok(reply.unwrap_or_else(|| APOLOGY.to_string()))
    }
}
