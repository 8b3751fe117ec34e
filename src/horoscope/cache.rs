use chrono::{Local, NaiveDate};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

use crate::error::ResolveError;

/// Source of "today" for the daily cache.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Default)]
struct DayEntries {
    date: Option<NaiveDate>,
    entries: HashMap<String, String>,
}

impl DayEntries {
    /// Drop everything recorded on another day.
    fn expire(&mut self, today: NaiveDate) {
        if self.date != Some(today) {
            debug!(previous = ?self.date, %today, "horoscope cache rolled over");
            self.date = Some(today);
            self.entries.clear();
        }
    }
}

/// Horoscope texts fetched today, keyed by sign name.
///
/// The whole map is discarded the first time it is touched on a new date,
/// so entries never outlive the day they were fetched on.
#[derive(Default)]
pub struct DailyCache {
    inner: Mutex<DayEntries>,
}

impl DailyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, today: NaiveDate, sign: &str) -> Result<Option<String>, ResolveError> {
        let mut day = self.inner.lock().map_err(|_| ResolveError::CachePoisoned)?;
        day.expire(today);
        Ok(day.entries.get(sign).cloned())
    }

    /// Store `text` as fetched on `fetched_on`. A result that finishes after
    /// the cache has already moved to a later day is dropped.
    pub fn insert(&self, fetched_on: NaiveDate, sign: &str, text: String) -> Result<(), ResolveError> {
        let mut day = self.inner.lock().map_err(|_| ResolveError::CachePoisoned)?;
        if day.date.is_some_and(|date| date > fetched_on) {
            return Ok(());
        }
        day.expire(fetched_on);
        day.entries.insert(sign.to_string(), text);
        Ok(())
    }

    /// Return today's entry for `sign`, or run `fetch` and cache a `Some`
    /// result. `None` is passed through uncached.
    ///
    /// The lock is not held while `fetch` runs, so two concurrent misses for
    /// the same sign both fetch and the later write wins.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        today: NaiveDate,
        sign: &str,
        fetch: F,
    ) -> Result<Option<String>, ResolveError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<String>>,
    {
        if let Some(text) = self.get(today, sign)? {
            debug!(sign, "horoscope cache hit");
            return Ok(Some(text));
        }

        let fetched = fetch().await;
        if let Some(text) = &fetched {
            self.insert(today, sign, text.clone())?;
        }
        Ok(fetched)
    }

    /// Number of cached entries. Still readable after a panic poisoned the lock.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Poison the lock by panicking while holding it.
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        std::thread::scope(|scope| {
            let _ = scope
                .spawn(|| {
                    let _guard = self.inner.lock();
                    panic!("horoscope cache writer panicked");
                })
                .join();
        });
    }
}
