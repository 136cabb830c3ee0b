use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionId {
    Career,
    Finance,
    Health,
    Leisure,
    Family,
    Social,
    Growth,
    Fulfillment,
}

impl DimensionId {
    pub const ALL: [DimensionId; 8] = [
        Self::Career,
        Self::Finance,
        Self::Health,
        Self::Leisure,
        Self::Family,
        Self::Social,
        Self::Growth,
        Self::Fulfillment,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Career => "career",
            Self::Finance => "finance",
            Self::Health => "health",
            Self::Leisure => "leisure",
            Self::Family => "family",
            Self::Social => "social",
            Self::Growth => "growth",
            Self::Fulfillment => "fulfillment",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    pub date: NaiveDate,
    pub content: String,
    pub word_count: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub dimensions: Vec<DimensionId>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEntry {
    #[serde(deserialize_with = "id_from_scalar")]
    pub id: String,
    pub date: String,
    pub content: String,
    #[serde(default)]
    pub word_count: Option<u32>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub dimensions: Option<Vec<String>>,
}

impl StoredEntry {
    pub fn known_dimensions(&self) -> Vec<DimensionId> {
        let mut result = Vec::new();
        for raw in self.dimensions.iter().flatten() {
            if let Some(id) = DimensionId::parse(raw) {
                if !result.contains(&id) {
                    result.push(id);
                }
            }
        }
        result
    }

    pub fn into_entry(self, date: NaiveDate) -> Entry {
        let dimensions = self.known_dimensions();
        let word_count = self
            .word_count
            .unwrap_or_else(|| crate::text::count_words(&self.content));
        Entry {
            id: self.id,
            date,
            content: self.content,
            word_count,
            created_at: self.created_at,
            dimensions,
        }
    }
}

// Older exports sometimes carry numeric ids.
fn id_from_scalar<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(id) => Ok(id),
        serde_json::Value::Number(id) => Ok(id.to_string()),
        other => Err(serde::de::Error::custom(format!("entry id must be a string or number, found {}", other))),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBucket {
    pub date: NaiveDate,
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionStats {
    pub counts: BTreeMap<DimensionId, u32>,
    pub activity: BTreeMap<DimensionId, f64>,
    pub total_entries: usize,
}

impl DimensionStats {
    pub fn count(&self, id: DimensionId) -> u32 {
        self.counts.get(&id).copied().unwrap_or(0)
    }

    pub fn activity(&self, id: DimensionId) -> f64 {
        self.activity.get(&id).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalStats {
    pub total_days: usize,
    pub total_entries: usize,
    pub total_words: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: String,
    pub export_date: DateTime<Utc>,
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RevealState {
    Hidden,
    Revealed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub stats_window_days: u32,
    pub reveal_after_days: u32,
    pub backup_mirror_enabled: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            stats_window_days: 30,
            reveal_after_days: 7,
            backup_mirror_enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekReview {
    pub range: WeekRange,
    pub stats: DimensionStats,
    pub complete: bool,
}
