use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

use crate::error::SourceError;

/// Minimum length of an HTML forecast block.
pub const MIN_HTML_CHARS: usize = 100;
/// Minimum length of a feed forecast.
pub const MIN_FEED_CHARS: usize = 50;

const MAIL_SELECTORS: &[&str] = &[
    ".article__text",
    ".p-prediction__text",
    ".article__item__text",
    ".prediction__text",
    "[class*=\"article\"]",
    "[class*=\"prediction\"]",
];

const RAMBLER_SELECTORS: &[&str] = &[
    ".mvh__description",
    "[data-cy=\"horoscope-description\"]",
    ".xN_sL",
    ".h7qoQ",
    "[class*=\"description\"]",
    "[class*=\"text\"]",
];

// The mail.ru layout wraps navigation and promo blocks in the same classes
// as the forecast, so a block must also mention the day.
const MAIL_KEYWORDS: &[&str] = &[
    "сегодня", "гороскоп", "день", "неделя", "today", "horoscope", "day", "week",
];

static MAIL: Lazy<Vec<Selector>> = Lazy::new(|| compile(MAIL_SELECTORS));
static RAMBLER: Lazy<Vec<Selector>> = Lazy::new(|| compile(RAMBLER_SELECTORS));

static FEED_TODAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<today>(.*?)</today>").expect("Failed to compile <today> pattern")
});
static FEED_PREDICTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<prediction>(.*?)</prediction>").expect("Failed to compile <prediction> pattern")
});
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("Failed to compile tag pattern"));

fn compile(selectors: &[&str]) -> Vec<Selector> {
    selectors
        .iter()
        .map(|s| Selector::parse(s).expect("Failed to parse provider selector"))
        .collect()
}

/// What one source yielded.
#[derive(Debug)]
pub enum SourceOutcome {
    Found(String),
    Empty,
    Failed(SourceError),
}

impl From<Option<String>> for SourceOutcome {
    fn from(text: Option<String>) -> Self {
        text.map_or(SourceOutcome::Empty, SourceOutcome::Found)
    }
}

/// Collapse every run of whitespace into a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for word in text.split_whitespace() {
        if !result.is_empty() {
            result.push(' ');
        }
        result.push_str(word);
    }

    result
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// horo.mail.ru: first selector match that is long enough and on topic.
pub fn extract_mail(html: &str) -> Option<String> {
    first_block(html, &MAIL, |text| {
        let lower = text.to_lowercase();
        MAIL_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
    })
}

/// horoscopes.rambler.ru: first selector match that is long enough.
pub fn extract_rambler(html: &str) -> Option<String> {
    first_block(html, &RAMBLER, |_| true)
}

fn first_block<P>(html: &str, selectors: &[Selector], accept: P) -> Option<String>
where
    P: Fn(&str) -> bool,
{
    let document = Html::parse_document(html);

    for selector in selectors {
        for element in document.select(selector) {
            let raw: String = element.text().collect();
            let text = collapse_whitespace(&raw);
            if char_len(&text) > MIN_HTML_CHARS && accept(&text) {
                return Some(text);
            }
        }
    }

    None
}

/// ignio.com XML: cleaned `<today>` text, or `<prediction>` when absent.
/// No length floor is applied here.
pub fn feed_fragment(body: &str) -> Option<String> {
    let captured = FEED_TODAY
        .captures(body)
        .or_else(|| FEED_PREDICTION.captures(body))?
        .get(1)?
        .as_str();

    let text = collapse_whitespace(&TAG.replace_all(captured, ""));
    (!text.is_empty()).then_some(text)
}

pub fn extract_feed(body: &str) -> Option<String> {
    feed_fragment(body).filter(|text| char_len(text) > MIN_FEED_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(class: &str, text: &str) -> String {
        format!(
            "<html><body><nav class=\"menu\">Главная</nav>\
             <div class=\"{class}\"><p>{text}</p></div></body></html>"
        )
    }

    fn text_of_len(prefix: &str, len: usize) -> String {
        let mut text = prefix.to_string();
        while char_len(&text) < len {
            text.push('a');
        }
        text
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b   c "), "a b c");
        assert_eq!(collapse_whitespace("   "), "");
    }

    #[test]
    fn test_mail_accepts_long_text_with_keyword() {
        let text = text_of_len("today ", 151);
        let html = page("article__text", &text.replace(' ', "   \n "));
        assert_eq!(extract_mail(&html), Some(text));
    }

    #[test]
    fn test_mail_rejects_short_text() {
        let html = page("article__text", &text_of_len("today ", 99));
        assert_eq!(extract_mail(&html), None);
    }

    #[test]
    fn test_mail_requires_keyword() {
        let html = page("article__text", &text_of_len("advert ", 180));
        assert_eq!(extract_mail(&html), None);
    }

    #[test]
    fn test_mail_keyword_match_is_case_insensitive() {
        let text = text_of_len("Сегодня звёзды благосклонны ", 140);
        let html = page("p-prediction__text", &text);
        assert_eq!(extract_mail(&html), Some(text));
    }

    #[test]
    fn test_mail_falls_through_to_wildcard_selectors() {
        let text = text_of_len("Гороскоп на день: ", 130);
        let html = page("some-prediction-block", &text);
        assert_eq!(extract_mail(&html), Some(text));
    }

    #[test]
    fn test_rambler_needs_length_only() {
        let text = text_of_len("Forecast ", 120);
        let html = page("mvh__description", &text);
        assert_eq!(extract_rambler(&html), Some(text));

        let html = page("mvh__description", &text_of_len("Forecast ", 100));
        assert_eq!(extract_rambler(&html), None);
    }

    #[test]
    fn test_rambler_data_attribute_selector() {
        let text = text_of_len("x", 101);
        let html = format!(
            "<html><body><section data-cy=\"horoscope-description\">{text}</section></body></html>"
        );
        assert_eq!(extract_rambler(&html), Some(text));
    }

    #[test]
    fn test_feed_fragment_strips_and_collapses() {
        let body = "<root><today>  Hello   world </today></root>";
        assert_eq!(feed_fragment(body), Some("Hello world".to_string()));
    }

    #[test]
    fn test_feed_short_today_is_rejected() {
        let body = format!("<root><today>{}</today></root>", "b".repeat(40));
        assert_eq!(extract_feed(&body), None);
    }

    #[test]
    fn test_feed_prefers_today_over_prediction() {
        let today = text_of_len("Today: ", 60);
        let body = format!(
            "<horo><aries>\n<prediction>{}</prediction>\n<today>\n<p>{today}</p>\n</today></aries></horo>",
            text_of_len("Old: ", 70)
        );
        assert_eq!(extract_feed(&body), Some(today));
    }

    #[test]
    fn test_feed_falls_back_to_prediction() {
        let text = text_of_len("Prediction ", 70);
        let body = format!("<horo><prediction>\n{text}\n</prediction></horo>");
        assert_eq!(extract_feed(&body), Some(text));
    }

    #[test]
    fn test_feed_without_elements() {
        assert_eq!(feed_fragment("<horo></horo>"), None);
        assert_eq!(feed_fragment("<today>   </today>"), None);
    }
}
