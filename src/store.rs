use crate::calendar;
use crate::db::{Database, ENTRIES_KEY};
use crate::dimensions::classify;
use crate::errors::{AppError, AppResult};
use crate::mirror::MirrorHandle;
use crate::models::{DimensionId, Entry, StoredEntry};
use crate::text::count_words;
use chrono::{Local, NaiveDate, TimeZone, Utc};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Migration {
    pub entries: Vec<Entry>,
    pub migrated: usize,
}

pub fn migrate<Tz: TimeZone>(stored: Vec<StoredEntry>, tz: &Tz) -> Migration {
    let mut migrated = 0usize;
    let entries = stored
        .into_iter()
        .map(|record| {
            let projected = calendar::local_day_in(&record.created_at, tz);
            if record.date != calendar::format_day(projected) {
                tracing::debug!(
                    entry_id = %record.id,
                    stored_date = %record.date,
                    local_date = %projected,
                    "migrating entry date to local calendar day"
                );
                migrated += 1;
            }
            record.into_entry(projected)
        })
        .collect();
    Migration { entries, migrated }
}

pub fn sort_canonical(entries: &mut [Entry]) {
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[derive(Debug)]
pub struct EntryStore {
    db: Arc<Database>,
    mirror: Option<MirrorHandle>,
    entries: Vec<Entry>,
}

impl EntryStore {
    pub fn load(db: Arc<Database>, mirror: Option<MirrorHandle>) -> AppResult<Self> {
        let raw = db
            .get(ENTRIES_KEY)
            .map_err(|error| AppError::PersistenceRead(error.to_string()))?;

        let mut entries = match raw {
            None => {
                tracing::info!("no stored entries, starting with an empty journal");
                Vec::new()
            }
            Some(raw) => match parse_stored(&raw) {
                Ok(stored) => {
                    let migration = migrate(stored, &Local);
                    if migration.migrated > 0 {
                        match persist(&db, &migration.entries) {
                            Ok(()) => tracing::info!(
                                count = migration.migrated,
                                "migrated entry dates to local calendar days"
                            ),
                            Err(error) => tracing::warn!(
                                error = %error,
                                count = migration.migrated,
                                "failed to write back migrated entries"
                            ),
                        }
                    }
                    dedupe_ids(migration.entries)
                }
                Err(error) => {
                    tracing::warn!(error = %error, "stored entries unreadable, starting with an empty journal");
                    Vec::new()
                }
            },
        };

        sort_canonical(&mut entries);
        tracing::info!(count = entries.len(), "entries loaded");

        Ok(Self { db, mirror, entries })
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn create(&mut self, content: &str, date: Option<NaiveDate>) -> AppResult<Entry> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::Validation("entry content cannot be empty".to_string()));
        }

        let now = Utc::now();
        let entry = Entry {
            id: self.next_id(),
            date: date.unwrap_or_else(|| calendar::local_day(&now)),
            content: content.to_string(),
            word_count: count_words(content),
            created_at: now,
            dimensions: classify(content),
        };

        let mut next = Vec::with_capacity(self.entries.len() + 1);
        next.push(entry.clone());
        next.extend(self.entries.iter().cloned());
        self.commit(next)?;

        tracing::info!(
            entry_id = %entry.id,
            date = %entry.date,
            dimensions = entry.dimensions.len(),
            "entry created"
        );
        Ok(entry)
    }

    // Hand-set dimensions are discarded on edit.
    pub fn update(&mut self, id: &str, content: &str) -> AppResult<Option<Entry>> {
        let content = content.trim();
        if content.is_empty() {
            tracing::debug!(entry_id = %id, "ignoring update with empty content");
            return Ok(None);
        }
        let Some(index) = self.position(id) else {
            tracing::debug!(entry_id = %id, "ignoring update of unknown entry");
            return Ok(None);
        };

        let mut next = self.entries.clone();
        let entry = &mut next[index];
        entry.content = content.to_string();
        entry.word_count = count_words(content);
        entry.dimensions = classify(content);
        let updated = entry.clone();

        self.commit(next)?;
        tracing::info!(entry_id = %id, dimensions = updated.dimensions.len(), "entry updated");
        Ok(Some(updated))
    }

    pub fn set_dimensions(&mut self, id: &str, dimensions: &[DimensionId]) -> AppResult<Option<Entry>> {
        let Some(index) = self.position(id) else {
            return Ok(None);
        };

        let mut deduped = Vec::with_capacity(dimensions.len());
        for dimension in dimensions {
            if !deduped.contains(dimension) {
                deduped.push(*dimension);
            }
        }

        let mut next = self.entries.clone();
        next[index].dimensions = deduped;
        let updated = next[index].clone();

        self.commit(next)?;
        tracing::info!(entry_id = %id, dimensions = updated.dimensions.len(), "entry dimensions overridden");
        Ok(Some(updated))
    }

    pub fn delete(&mut self, id: &str) -> AppResult<bool> {
        if self.position(id).is_none() {
            return Ok(false);
        }
        let next = self
            .entries
            .iter()
            .filter(|entry| entry.id != id)
            .cloned()
            .collect();
        self.commit(next)?;
        tracing::info!(entry_id = %id, "entry deleted");
        Ok(true)
    }

    pub fn clear_all(&mut self) -> AppResult<()> {
        self.db
            .remove(ENTRIES_KEY)
            .map_err(|error| AppError::PersistenceWrite(error.to_string()))?;
        let removed = self.entries.len();
        self.entries.clear();
        if let Some(mirror) = &self.mirror {
            mirror.clear();
        }
        tracing::info!(count = removed, "all entries cleared");
        Ok(())
    }

    pub fn replace_all(&mut self, entries: Vec<Entry>) -> AppResult<usize> {
        let next = dedupe_ids(entries);
        let count = next.len();
        self.commit(next)?;
        tracing::info!(count, "entry collection replaced");
        Ok(count)
    }

    fn commit(&mut self, mut next: Vec<Entry>) -> AppResult<()> {
        sort_canonical(&mut next);
        persist(&self.db, &next)?;
        self.entries = next;
        if let Some(mirror) = &self.mirror {
            mirror.replace(self.entries.clone());
        }
        Ok(())
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    fn next_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.position(&id).is_none() {
                return id;
            }
        }
    }
}

fn parse_stored(raw: &str) -> AppResult<Vec<StoredEntry>> {
    let records: Vec<Value> =
        serde_json::from_str(raw).map_err(|error| AppError::PersistenceRead(error.to_string()))?;

    // A bad record is dropped on its own; the rest of the journal still loads.
    let mut stored = Vec::with_capacity(records.len());
    let mut skipped = 0usize;
    for record in records {
        match serde_json::from_value::<StoredEntry>(record) {
            Ok(entry) => stored.push(entry),
            Err(error) => {
                skipped += 1;
                tracing::warn!(error = %error, "skipping unreadable stored entry");
            }
        }
    }
    if skipped > 0 {
        tracing::warn!(skipped, kept = stored.len(), "stored entries partially unreadable");
    }
    Ok(stored)
}

fn persist(db: &Database, entries: &[Entry]) -> AppResult<()> {
    let payload = serde_json::to_string(entries)?;
    db.set(ENTRIES_KEY, &payload)
        .map_err(|error| AppError::PersistenceWrite(error.to_string()))
}

fn dedupe_ids(entries: Vec<Entry>) -> Vec<Entry> {
    let mut seen = HashSet::new();
    let mut result = Vec::with_capacity(entries.len());
    for entry in entries {
        if seen.insert(entry.id.clone()) {
            result.push(entry);
        } else {
            tracing::warn!(entry_id = %entry.id, "dropping entry with duplicate id");
        }
    }
    result
}
