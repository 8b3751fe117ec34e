use std::fmt;
use tracing::warn;

use super::fetch::Fetch;
use super::parsers::{self, SourceOutcome};

/// Upstream horoscope providers, recognised by domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    HoroMail,
    Rambler,
    Ignio,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::HoroMail, Provider::Rambler, Provider::Ignio];

    pub fn domain(self) -> &'static str {
        match self {
            Provider::HoroMail => "horo.mail.ru",
            Provider::Rambler => "rambler.ru",
            Provider::Ignio => "ignio.com",
        }
    }

    /// Site root used by the availability check.
    pub fn root_url(self) -> &'static str {
        match self {
            Provider::HoroMail => "https://horo.mail.ru",
            Provider::Rambler => "https://horoscopes.rambler.ru",
            Provider::Ignio => "https://ignio.com",
        }
    }

    pub fn extract(self, body: &str) -> Option<String> {
        match self {
            Provider::HoroMail => parsers::extract_mail(body),
            Provider::Rambler => parsers::extract_rambler(body),
            Provider::Ignio => parsers::extract_feed(body),
        }
    }

    /// Fetch `url` and extract today's text. Never fails past this point.
    pub async fn scrape(self, fetcher: &dyn Fetch, url: &str) -> SourceOutcome {
        match fetcher.get_text(url).await {
            Ok(body) => self.extract(&body).into(),
            Err(err) => SourceOutcome::Failed(err),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.domain())
    }
}

pub fn route(url: &str) -> Option<Provider> {
    Provider::ALL.into_iter().find(|provider| url.contains(provider.domain()))
}

/// Route `url` to its provider and scrape it. Unrecognised URLs are never
/// fetched and yield `Empty`.
pub async fn parse_source(fetcher: &dyn Fetch, url: &str) -> SourceOutcome {
    match route(url) {
        Some(provider) => provider.scrape(fetcher, url).await,
        None => {
            warn!(url, "no parser for source");
            SourceOutcome::Empty
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::horoscope::testing::{FakeFetcher, FakeReply};

    #[test]
    fn test_route_by_domain() {
        assert_eq!(route("https://horo.mail.ru/prediction/leo/today/"), Some(Provider::HoroMail));
        assert_eq!(route("https://horoscopes.rambler.ru/leo/"), Some(Provider::Rambler));
        assert_eq!(
            route("https://ignio.com/r/export/utf/xml/daily/leo.xml"),
            Some(Provider::Ignio)
        );
        assert_eq!(route("https://www.goroskop.ru/leo"), None);
    }

    #[tokio::test]
    async fn test_unknown_url_is_no_result_without_fetching() {
        let fetcher = FakeFetcher::new();
        let outcome = parse_source(&fetcher, "https://example.com/leo").await;
        assert!(matches!(outcome, SourceOutcome::Empty));
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_scrape_maps_failures() {
        let url = "https://ignio.com/r/export/utf/xml/daily/leo.xml";
        let fetcher = FakeFetcher::new().with(url, FakeReply::Timeout);
        let outcome = Provider::Ignio.scrape(&fetcher, url).await;
        assert!(matches!(outcome, SourceOutcome::Failed(SourceError::Timeout)));

        let fetcher = FakeFetcher::new().with(url, FakeReply::Body("<horo/>".into()));
        let outcome = Provider::Ignio.scrape(&fetcher, url).await;
        assert!(matches!(outcome, SourceOutcome::Empty));
    }

    #[tokio::test]
    async fn test_parse_source_dispatches_to_feed_parser() {
        let url = "https://ignio.com/r/export/utf/xml/daily/leo.xml";
        let forecast = "Львов ждёт внимание окружающих, день подходит для творчества.";
        let body = format!("<horo><leo><today>\n{forecast}\n</today></leo></horo>");
        let fetcher = FakeFetcher::new().with(url, FakeReply::Body(body));
        let outcome = parse_source(&fetcher, url).await;
        assert!(matches!(outcome, SourceOutcome::Found(text) if text == forecast));
    }
}
