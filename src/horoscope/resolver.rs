use std::sync::Arc;
use tracing::{error, info, warn};

use super::cache::{Clock, DailyCache};
use super::fetch::Fetch;
use super::parsers::{char_len, SourceOutcome};
use super::router::{parse_source, Provider};
use super::signs::{SignCatalog, ZodiacSign};
use crate::error::ResolveError;

pub const UNKNOWN_SIGN: &str = "Неизвестный знак зодиака";
pub const UNAVAILABLE: &str = "К сожалению, не удалось получить актуальный гороскоп. \
                               Сайты могут быть временно недоступны. Попробуйте позже.";
pub const INTERNAL_ERROR: &str = "Произошла ошибка при получении гороскопа.";

/// Shortest text accepted from any source.
pub const MIN_ACCEPTED_CHARS: usize = 50;

impl ResolveError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ResolveError::UnknownSign(_) => UNKNOWN_SIGN,
            ResolveError::Exhausted { .. } => UNAVAILABLE,
            ResolveError::CachePoisoned => INTERNAL_ERROR,
        }
    }
}

/// Resolves a sign to today's horoscope text.
///
/// Sources are tried one at a time in the order the sign lists them; the
/// first acceptable text wins and is cached for the rest of the day.
/// Failures are never cached.
pub struct HoroscopeService {
    catalog: SignCatalog,
    fetcher: Arc<dyn Fetch>,
    clock: Arc<dyn Clock>,
    cache: DailyCache,
}

impl HoroscopeService {
    pub fn new(catalog: SignCatalog, fetcher: Arc<dyn Fetch>, clock: Arc<dyn Clock>) -> Self {
        Self {
            catalog,
            fetcher,
            clock,
            cache: DailyCache::new(),
        }
    }

    pub fn catalog(&self) -> &SignCatalog {
        &self.catalog
    }

    pub fn cache(&self) -> &DailyCache {
        &self.cache
    }

    pub fn today(&self) -> chrono::NaiveDate {
        self.clock.today()
    }

    /// Display-ready horoscope for `sign`. Always returns a string.
    pub async fn get_daily_horoscope(&self, sign: &str) -> String {
        match self.resolve(sign).await {
            Ok(text) => text,
            Err(err) => {
                match &err {
                    ResolveError::UnknownSign(key) => warn!(sign = %key, "unknown zodiac sign"),
                    ResolveError::Exhausted { sign, sources } => {
                        error!(sign = %sign, sources, "all horoscope sources unavailable")
                    }
                    ResolveError::CachePoisoned => error!(error = %err, sign, "horoscope resolution failed"),
                }
                err.user_message().to_string()
            }
        }
    }

    pub async fn resolve(&self, key: &str) -> Result<String, ResolveError> {
        let sign = self
            .catalog
            .get(key)
            .ok_or_else(|| ResolveError::UnknownSign(key.to_string()))?;

        let today = self.clock.today();
        let found = self
            .cache
            .get_or_fetch(today, sign.name(), || self.fetch_from_sources(sign))
            .await?;

        found.ok_or_else(|| ResolveError::Exhausted {
            sign: sign.name().to_string(),
            sources: sign.sources().len(),
        })
    }

    async fn fetch_from_sources(&self, sign: &ZodiacSign) -> Option<String> {
        let sources = sign.sources();
        info!(sign = sign.name(), sources = sources.len(), "fetching horoscope");

        for (i, url) in sources.iter().enumerate() {
            let source = i + 1;
            match parse_source(self.fetcher.as_ref(), url).await {
                SourceOutcome::Found(text) if char_len(&text) > MIN_ACCEPTED_CHARS => {
                    info!(sign = sign.name(), source, url = %url, "horoscope fetched");
                    return Some(text);
                }
                SourceOutcome::Found(text) => {
                    warn!(sign = sign.name(), source, url = %url, chars = char_len(&text), "horoscope text too short");
                }
                SourceOutcome::Empty => {
                    warn!(sign = sign.name(), source, url = %url, "no horoscope text on page");
                }
                SourceOutcome::Failed(err) => {
                    warn!(sign = sign.name(), source, url = %url, error = %err, "horoscope source failed");
                }
            }
        }

        None
    }

    /// Provider roots that answer a HEAD request with 200.
    pub async fn check_site_availability(&self) -> Vec<String> {
        let mut available = Vec::new();

        for provider in Provider::ALL {
            let url = provider.root_url();
            match self.fetcher.head_status(url).await {
                Ok(200) => available.push(url.to_string()),
                Ok(status) => info!(url, status, "provider responded without 200"),
                Err(err) => info!(url, error = %err, "provider unreachable"),
            }
        }

        available
    }
}
