use crate::calendar;
use crate::models::{DayBucket, DimensionId, DimensionStats, Entry, TotalStats, WeekRange};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};

pub fn group_by_day(entries: &[Entry]) -> Vec<DayBucket> {
    let mut grouped: BTreeMap<NaiveDate, Vec<Entry>> = BTreeMap::new();
    for entry in entries {
        grouped.entry(entry.date).or_default().push(entry.clone());
    }

    grouped
        .into_iter()
        .rev()
        .map(|(date, mut entries)| {
            entries.sort_by(|a, b| a.created_at.cmp(&b.created_at));
            DayBucket { date, entries }
        })
        .collect()
}

pub fn today_entries(entries: &[Entry], today: NaiveDate) -> Vec<Entry> {
    entries
        .iter()
        .filter(|entry| entry.date == today)
        .cloned()
        .collect()
}

// [today - days, today], both ends inclusive.
pub fn stats_for_window(entries: &[Entry], days: u32, today: NaiveDate) -> DimensionStats {
    stats_for_range(entries, calendar::days_before(today, days), today)
}

pub fn stats_for_range(entries: &[Entry], start: NaiveDate, end: NaiveDate) -> DimensionStats {
    let in_range: Vec<&Entry> = entries
        .iter()
        .filter(|entry| entry.date >= start && entry.date <= end)
        .collect();
    count_dimensions(&in_range)
}

pub fn stats_for_week(entries: &[Entry], today: NaiveDate, offset: i32) -> DimensionStats {
    let range = calendar::week_range(today, offset);
    stats_for_range(entries, range.start, range.end)
}

pub fn weekly_entries_by_day(entries: &[Entry], today: NaiveDate) -> Vec<DayBucket> {
    let range = calendar::week_range(today, 0);
    let in_week: Vec<Entry> = entries
        .iter()
        .filter(|entry| range.contains(entry.date))
        .cloned()
        .collect();
    group_by_day(&in_week)
}

pub fn is_week_complete(range: &WeekRange, today: NaiveDate) -> bool {
    today > range.end
}

pub fn total_stats(entries: &[Entry]) -> TotalStats {
    let days: HashSet<NaiveDate> = entries.iter().map(|entry| entry.date).collect();
    TotalStats {
        total_days: days.len(),
        total_entries: entries.len(),
        total_words: entries.iter().map(|entry| u64::from(entry.word_count)).sum(),
    }
}

fn count_dimensions(entries: &[&Entry]) -> DimensionStats {
    let mut counts: BTreeMap<DimensionId, u32> = DimensionId::ALL.iter().map(|id| (*id, 0)).collect();
    for entry in entries {
        for id in DimensionId::ALL {
            // At most one unit per entry per dimension.
            if entry.dimensions.contains(&id) {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
    }

    let max_count = counts.values().copied().max().unwrap_or(0).max(1);
    let activity = counts
        .iter()
        .map(|(id, count)| (*id, f64::from(*count) / f64::from(max_count)))
        .collect();

    DimensionStats {
        counts,
        activity,
        total_entries: entries.len(),
    }
}
