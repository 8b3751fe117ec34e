pub mod api;
pub mod config;
pub mod error;
pub mod fortune;
pub mod horoscope;
pub mod llm;

use std::sync::Arc;
use config::Config;
use error::Result;
use fortune::FortuneTeller;
use horoscope::{HoroscopeService, HttpFetcher, SignCatalog, SystemClock};

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub horoscope: Arc<HoroscopeService>,
    pub fortune: Arc<FortuneTeller>,
}

impl AppState {
    /// Build the production services. Fails on an invalid sign catalog or
    /// HTTP client setup.
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(config.fetch_timeout, config.head_timeout)?;
        let horoscope = HoroscopeService::new(
            SignCatalog::zodiac()?,
            Arc::new(fetcher),
            Arc::new(SystemClock),
        );
        let fortune = FortuneTeller::new(config.llm.clone())?;

        Ok(AppState {
            horoscope: Arc::new(horoscope),
            fortune: Arc::new(fortune),
        })
    }
}
