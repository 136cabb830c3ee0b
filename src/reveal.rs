use crate::calendar;
use crate::db::{Database, REVEAL_KEY};
use crate::errors::{AppError, AppResult};
use crate::models::{Entry, RevealState};
use chrono::{DateTime, Utc};
use std::sync::Arc;

const REVEALED_VALUE: &str = "true";

pub fn days_since_first_entry(entries: &[Entry], now: DateTime<Utc>) -> i64 {
    entries
        .iter()
        .map(|entry| entry.created_at)
        .min()
        .map(|first| calendar::elapsed_days_ceil(&first, &now))
        .unwrap_or(0)
}

#[derive(Debug, Clone)]
pub struct ProgressiveReveal {
    db: Arc<Database>,
    threshold_days: u32,
}

impl ProgressiveReveal {
    pub fn new(db: Arc<Database>, threshold_days: u32) -> Self {
        Self { db, threshold_days }
    }

    pub fn threshold_days(&self) -> u32 {
        self.threshold_days
    }

    // Anything other than the literal "true" reads as hidden.
    pub fn state(&self) -> AppResult<RevealState> {
        let state = match self.db.get(REVEAL_KEY)?.as_deref() {
            Some(REVEALED_VALUE) => RevealState::Revealed,
            _ => RevealState::Hidden,
        };
        Ok(state)
    }

    pub fn is_eligible(&self, entries: &[Entry], now: DateTime<Utc>) -> bool {
        days_since_first_entry(entries, now) >= i64::from(self.threshold_days)
    }

    // Eligible journals show names before any acknowledgement is recorded.
    pub fn should_show_dimension_names(&self, entries: &[Entry], now: DateTime<Utc>) -> AppResult<bool> {
        if self.state()? == RevealState::Revealed {
            return Ok(true);
        }
        Ok(self.is_eligible(entries, now))
    }

    pub fn needs_acknowledgement(&self, entries: &[Entry], now: DateTime<Utc>) -> AppResult<bool> {
        Ok(self.state()? == RevealState::Hidden && self.is_eligible(entries, now))
    }

    pub fn acknowledge(&self, entries: &[Entry], now: DateTime<Utc>) -> AppResult<RevealState> {
        if self.state()? == RevealState::Revealed {
            return Ok(RevealState::Revealed);
        }
        if !self.is_eligible(entries, now) {
            return Err(AppError::Validation(format!(
                "dimension names unlock after {} days of journaling",
                self.threshold_days
            )));
        }

        self.db
            .set(REVEAL_KEY, REVEALED_VALUE)
            .map_err(|error| AppError::PersistenceWrite(error.to_string()))?;
        tracing::info!(
            days = days_since_first_entry(entries, now),
            "dimension names revealed"
        );
        Ok(RevealState::Revealed)
    }
}
