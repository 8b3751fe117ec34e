use std::collections::HashSet;

use super::router::route;
use crate::error::{AppError, Result};

// (name, slug, emoji) in zodiac order.
const SIGNS: [(&str, &str, &str); 12] = [
    ("овен", "aries", "♈"),
    ("телец", "taurus", "♉"),
    ("близнецы", "gemini", "♊"),
    ("рак", "cancer", "♋"),
    ("лев", "leo", "♌"),
    ("дева", "virgo", "♍"),
    ("весы", "libra", "♎"),
    ("скорпион", "scorpio", "♏"),
    ("стрелец", "sagittarius", "♐"),
    ("козерог", "capricorn", "♑"),
    ("водолей", "aquarius", "♒"),
    ("рыбы", "pisces", "♓"),
];

#[derive(Debug, Clone)]
pub struct ZodiacSign {
    name: String,
    slug: String,
    emoji: String,
    sources: Vec<String>,
}

impl ZodiacSign {
    pub fn new(name: &str, slug: &str, emoji: &str, sources: Vec<String>) -> Self {
        Self {
            name: name.to_lowercase(),
            slug: slug.to_lowercase(),
            emoji: emoji.to_string(),
            sources,
        }
    }

    /// Sign with the default provider order: mail.ru, rambler, ignio.
    pub fn with_default_sources(name: &str, slug: &str, emoji: &str) -> Self {
        let sources = vec![
            format!("https://horo.mail.ru/prediction/{slug}/today/"),
            format!("https://horoscopes.rambler.ru/{slug}/"),
            format!("https://ignio.com/r/export/utf/xml/daily/{slug}.xml"),
        ];
        Self::new(name, slug, emoji, sources)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn emoji(&self) -> &str {
        &self.emoji
    }

    /// Source URLs in priority order.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Name with the first letter capitalised, e.g. "Близнецы".
    pub fn display_name(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Button-style label, e.g. "♊ Близнецы".
    pub fn label(&self) -> String {
        format!("{} {}", self.emoji, self.display_name())
    }
}

/// The validated set of signs the resolver serves.
#[derive(Debug, Clone)]
pub struct SignCatalog {
    signs: Vec<ZodiacSign>,
}

impl SignCatalog {
    /// Rejects an empty catalog, empty source lists, sources no provider
    /// can parse and duplicate names or slugs.
    pub fn new(signs: Vec<ZodiacSign>) -> Result<Self> {
        validate(&signs)?;
        let catalog = Self { signs };
        if catalog.is_empty() {
            return Err(AppError::ConfigError("sign catalog is empty".to_string()));
        }
        Ok(catalog)
    }

    /// The twelve signs with their default sources.
    pub fn zodiac() -> Result<Self> {
        Self::new(
            SIGNS
                .iter()
                .map(|(name, slug, emoji)| ZodiacSign::with_default_sources(name, slug, emoji))
                .collect(),
        )
    }

    /// Look a sign up by name or slug, ignoring case and surrounding space.
    pub fn get(&self, key: &str) -> Option<&ZodiacSign> {
        let key = key.trim().to_lowercase();
        self.signs.iter().find(|sign| sign.name == key || sign.slug == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ZodiacSign> {
        self.signs.iter()
    }

    pub fn len(&self) -> usize {
        self.signs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signs.is_empty()
    }
}

fn validate(signs: &[ZodiacSign]) -> Result<()> {
    let mut keys = HashSet::new();

    for sign in signs {
        if sign.sources.is_empty() {
            return Err(AppError::ConfigError(format!("sign {} has no sources", sign.name)));
        }
        if let Some(url) = sign.sources.iter().find(|url| route(url).is_none()) {
            return Err(AppError::ConfigError(format!(
                "sign {} has a source with no parser: {}",
                sign.name, url
            )));
        }
        for key in [&sign.name, &sign.slug] {
            if !keys.insert(key.as_str()) {
                return Err(AppError::ConfigError(format!("duplicate sign key: {}", key)));
            }
        }
    }

    Ok(())
}
