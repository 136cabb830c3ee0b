use crate::analytics;
use crate::calendar;
use crate::db::Database;
use crate::errors::{AppError, AppResult};
use crate::mirror::MirrorHandle;
use crate::models::{
    AppSettings, DayBucket, DimensionId, DimensionStats, Entry, ExportDocument, RevealState, TotalStats,
    WeekReview,
};
use crate::reveal::{self, ProgressiveReveal};
use crate::store::EntryStore;
use crate::transfer;
use chrono::{DateTime, NaiveDate, Utc};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

const PRIMARY_DB_FILE: &str = "journal.sqlite";
const MIRROR_DB_FILE: &str = "backup.sqlite";

#[derive(Debug)]
pub struct JournalCore {
    db: Arc<Database>,
    store: Mutex<EntryStore>,
    mirror: Option<MirrorHandle>,
    data_dir: PathBuf,
}

impl JournalCore {
    pub fn new(data_dir: PathBuf) -> AppResult<Arc<Self>> {
        let db = Arc::new(Database::new(&data_dir.join(PRIMARY_DB_FILE))?);
        let settings = db.get_settings()?;

        let mirror = if settings.backup_mirror_enabled {
            match MirrorHandle::spawn(&data_dir.join(MIRROR_DB_FILE)) {
                Ok(mirror) => Some(mirror),
                Err(error) => {
                    tracing::warn!(error = %error, "backup mirror unavailable, continuing without it");
                    None
                }
            }
        } else {
            tracing::info!("backup mirror disabled in settings");
            None
        };

        let store = EntryStore::load(db.clone(), mirror.clone())?;

        Ok(Arc::new(Self {
            db,
            store: Mutex::new(store),
            mirror,
            data_dir,
        }))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn has_backup_mirror(&self) -> bool {
        self.mirror.is_some()
    }

    // ─── Entries ────────────────────────────────────────────────────────────

    pub fn entries(&self) -> AppResult<Vec<Entry>> {
        Ok(self.store()?.entries().to_vec())
    }

    pub fn get_entry(&self, id: &str) -> AppResult<Option<Entry>> {
        Ok(self.store()?.get(id).cloned())
    }

    pub fn create_entry(&self, content: &str, date: Option<NaiveDate>) -> AppResult<Entry> {
        self.store()?.create(content, date)
    }

    pub fn update_entry(&self, id: &str, content: &str) -> AppResult<Option<Entry>> {
        self.store()?.update(id, content)
    }

    pub fn set_entry_dimensions(&self, id: &str, dimensions: &[DimensionId]) -> AppResult<Option<Entry>> {
        self.store()?.set_dimensions(id, dimensions)
    }

    pub fn delete_entry(&self, id: &str) -> AppResult<bool> {
        self.store()?.delete(id)
    }

    pub fn clear_all(&self) -> AppResult<()> {
        self.store()?.clear_all()
    }

    // ─── Analytics ──────────────────────────────────────────────────────────

    pub fn entries_by_day(&self) -> AppResult<Vec<DayBucket>> {
        Ok(analytics::group_by_day(self.store()?.entries()))
    }

    pub fn today_entries(&self) -> AppResult<Vec<Entry>> {
        Ok(analytics::today_entries(self.store()?.entries(), calendar::today()))
    }

    pub fn weekly_entries_by_day(&self) -> AppResult<Vec<DayBucket>> {
        Ok(analytics::weekly_entries_by_day(self.store()?.entries(), calendar::today()))
    }

    pub fn dimension_stats(&self, days: Option<u32>) -> AppResult<DimensionStats> {
        let days = match days {
            Some(days) => days,
            None => self.db.get_settings()?.stats_window_days,
        };
        Ok(analytics::stats_for_window(self.store()?.entries(), days, calendar::today()))
    }

    pub fn dimension_stats_for_range(&self, start: NaiveDate, end: NaiveDate) -> AppResult<DimensionStats> {
        if start > end {
            return Err(AppError::Validation(format!(
                "range start {} is after end {}",
                start, end
            )));
        }
        Ok(analytics::stats_for_range(self.store()?.entries(), start, end))
    }

    pub fn week_review(&self, offset: i32) -> AppResult<WeekReview> {
        let today = calendar::today();
        let range = calendar::week_range(today, offset);
        let stats = analytics::stats_for_range(self.store()?.entries(), range.start, range.end);
        Ok(WeekReview {
            range,
            stats,
            complete: analytics::is_week_complete(&range, today),
        })
    }

    pub fn total_stats(&self) -> AppResult<TotalStats> {
        Ok(analytics::total_stats(self.store()?.entries()))
    }

    // ─── Progressive reveal ─────────────────────────────────────────────────

    pub fn days_since_first_entry(&self) -> AppResult<i64> {
        Ok(reveal::days_since_first_entry(self.store()?.entries(), Utc::now()))
    }

    pub fn reveal_state(&self) -> AppResult<RevealState> {
        self.reveal()?.state()
    }

    pub fn should_show_dimension_names(&self) -> AppResult<bool> {
        let gate = self.reveal()?;
        gate.should_show_dimension_names(self.store()?.entries(), Utc::now())
    }

    pub fn needs_reveal_acknowledgement(&self) -> AppResult<bool> {
        let gate = self.reveal()?;
        gate.needs_acknowledgement(self.store()?.entries(), Utc::now())
    }

    pub fn acknowledge_reveal(&self) -> AppResult<RevealState> {
        let gate = self.reveal()?;
        gate.acknowledge(self.store()?.entries(), Utc::now())
    }

    // ─── Import / export ────────────────────────────────────────────────────

    pub fn export_document(&self) -> AppResult<ExportDocument> {
        Ok(transfer::build_export(self.store()?.entries(), Utc::now()))
    }

    pub fn export_to_dir(&self) -> AppResult<PathBuf> {
        let document = self.export_document()?;
        let export_dir = self.data_dir.join("exports");
        std::fs::create_dir_all(&export_dir)?;

        let output_path = export_dir.join(transfer::export_filename(calendar::local_day(&document.export_date)));
        let contents = transfer::render_export(&document)?;
        std::fs::write(&output_path, contents)?;

        tracing::info!(
            path = %output_path.display(),
            count = document.entries.len(),
            "entries exported"
        );
        Ok(output_path)
    }

    pub fn import_document(&self, raw: &str) -> AppResult<usize> {
        let entries = transfer::parse_import(raw)?;
        let count = self.store()?.replace_all(entries)?;
        tracing::info!(count, "entries imported");
        Ok(count)
    }

    pub fn import_from_path(&self, path: &Path) -> AppResult<usize> {
        let raw = std::fs::read_to_string(path)
            .map_err(|error| AppError::Io(format!("reading {}: {}", path.display(), error)))?;
        self.import_document(&raw)
    }

    // ─── Backup mirror ──────────────────────────────────────────────────────

    // Explicit recovery only; never part of startup.
    pub async fn restore_from_mirror(&self) -> AppResult<usize> {
        let mirror = self.require_mirror()?;
        let entries = mirror.read_all().await?;
        if entries.is_empty() {
            return Err(AppError::NotFound("backup mirror holds no entries".to_string()));
        }
        let count = self.store()?.replace_all(entries)?;
        tracing::warn!(count, "primary journal restored from backup mirror");
        Ok(count)
    }

    pub async fn last_backup_time(&self) -> AppResult<Option<DateTime<Utc>>> {
        self.require_mirror()?.last_backup_time().await
    }

    pub async fn flush_backups(&self) {
        if let Some(mirror) = &self.mirror {
            mirror.flush().await;
        }
    }

    // ─── Settings ───────────────────────────────────────────────────────────

    pub fn get_settings(&self) -> AppResult<AppSettings> {
        self.db.get_settings()
    }

    pub fn update_settings(&self, update: serde_json::Value) -> AppResult<AppSettings> {
        let settings = self.db.update_settings(update)?;
        tracing::info!(
            stats_window_days = settings.stats_window_days,
            reveal_after_days = settings.reveal_after_days,
            backup_mirror_enabled = settings.backup_mirror_enabled,
            "settings updated"
        );
        Ok(settings)
    }

    fn store(&self) -> AppResult<MutexGuard<'_, EntryStore>> {
        self.store
            .lock()
            .map_err(|_| AppError::Internal("entry store mutex poisoned".to_string()))
    }

    fn reveal(&self) -> AppResult<ProgressiveReveal> {
        let settings = self.db.get_settings()?;
        Ok(ProgressiveReveal::new(self.db.clone(), settings.reveal_after_days))
    }

    fn require_mirror(&self) -> AppResult<&MirrorHandle> {
        self.mirror
            .as_ref()
            .ok_or_else(|| AppError::Mirror("backup mirror is not running".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::JournalCore;
    use crate::errors::AppError;
    use crate::models::{DimensionId, RevealState};

    #[test]
    fn runs_without_a_mirror_outside_a_runtime() {
        let dir = tempfile::tempdir().expect("tempdir");
        let journal = JournalCore::new(dir.path().to_path_buf()).expect("journal");

        assert!(!journal.has_backup_mirror());
        let entry = journal.create_entry("开会到中午", None).expect("create");
        assert_eq!(journal.entries().expect("entries"), vec![entry]);
    }

    #[test]
    fn settings_drive_window_and_reveal_threshold() {
        let dir = tempfile::tempdir().expect("tempdir");
        let journal = JournalCore::new(dir.path().to_path_buf()).expect("journal");
        journal.create_entry("加班", None).expect("create");

        assert!(!journal.should_show_dimension_names().expect("gate"));
        journal
            .update_settings(serde_json::json!({ "revealAfterDays": 0 }))
            .expect("settings");
        assert!(journal.should_show_dimension_names().expect("gate"));
        assert_eq!(journal.acknowledge_reveal().expect("ack"), RevealState::Revealed);

        let stats = journal.dimension_stats(None).expect("stats");
        assert_eq!(stats.count(DimensionId::Career), 1);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let journal = JournalCore::new(dir.path().to_path_buf()).expect("journal");
        let start = chrono::NaiveDate::from_ymd_opt(2024, 6, 10).expect("date");
        let end = chrono::NaiveDate::from_ymd_opt(2024, 6, 1).expect("date");

        assert!(matches!(
            journal.dimension_stats_for_range(start, end),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn failed_import_leaves_the_journal_alone() {
        let dir = tempfile::tempdir().expect("tempdir");
        let journal = JournalCore::new(dir.path().to_path_buf()).expect("journal");
        let entry = journal.create_entry("跑步", None).expect("create");

        let error = journal
            .import_document(r#"{"entries": [{"id": "x"}]}"#)
            .expect_err("nothing usable");
        assert!(error.is_import_rejection());
        assert_eq!(journal.entries().expect("entries"), vec![entry]);
    }

    #[tokio::test]
    async fn restore_requires_a_running_mirror() {
        let dir = tempfile::tempdir().expect("tempdir");
        let journal = JournalCore::new(dir.path().to_path_buf()).expect("journal");
        journal
            .update_settings(serde_json::json!({ "backupMirrorEnabled": false }))
            .expect("settings");
        drop(journal);

        let journal = JournalCore::new(dir.path().to_path_buf()).expect("reopen");
        assert!(!journal.has_backup_mirror());
        assert!(matches!(journal.restore_from_mirror().await, Err(AppError::Mirror(_))));
    }
}
