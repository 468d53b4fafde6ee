// Per-room-type, per-date calendar storage
// The pricing engine only ever reads through `CalendarLookup`; writes belong
// to the merchant side and are exposed here for loading and tests.

use crate::model::{CalendarEntry, DayRate};
use chrono::NaiveDate;
use dashmap::DashMap;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

// Read access to calendar rows keyed by (room type, date)
pub trait CalendarLookup {
    fn day_rate(&self, room_type_id: &str, date: NaiveDate) -> Option<DayRate>;
}

impl<T: CalendarLookup + ?Sized> CalendarLookup for &T {
    fn day_rate(&self, room_type_id: &str, date: NaiveDate) -> Option<DayRate> {
        (**self).day_rate(room_type_id, date)
    }
}

// Live counters for the store
#[derive(Debug, Default)]
pub struct CalendarStats {
    pub rows_count: AtomicUsize,
    pub hit_count: AtomicUsize,
    pub miss_count: AtomicUsize,
    pub total_lookups: AtomicUsize,
    pub invalidated_count: AtomicUsize,
}

// Point-in-time copy of `CalendarStats`
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CalendarStatsReport {
    pub rows_count: usize,
    pub hit_count: usize,
    pub miss_count: usize,
    pub total_lookups: usize,
    pub invalidated_count: usize,
}

/// Concurrent in-memory calendar.
///
/// Rows are sharded by room type in a `DashMap`; each room type keeps its days
/// in a `BTreeMap` so that window reads are range scans.
#[derive(Debug, Default)]
pub struct InMemoryCalendarStore {
    rows: DashMap<String, BTreeMap<NaiveDate, DayRate>>,
    stats: CalendarStats,
}

impl InMemoryCalendarStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = CalendarEntry>) -> Self {
        let store = Self::new();
        store.load(entries);
        store
    }

    // Insert or replace one row; returns true if the row is new
    pub fn upsert(&self, entry: CalendarEntry) -> bool {
        let rate = entry.day_rate();
        let replaced = self
            .rows
            .entry(entry.room_type_id)
            .or_default()
            .insert(entry.date, rate)
            .is_some();
        if !replaced {
            self.stats.rows_count.fetch_add(1, Ordering::SeqCst);
        }
        !replaced
    }

    pub fn load(&self, entries: impl IntoIterator<Item = CalendarEntry>) -> usize {
        entries
            .into_iter()
            .map(|entry| self.upsert(entry))
            .filter(|inserted| *inserted)
            .count()
    }

    // Bulk removal; `None` matches everything on that axis
    pub fn invalidate(&self, room_type_id: Option<&str>, date: Option<NaiveDate>) -> usize {
        let mut removed = 0;
        for mut shard in self.rows.iter_mut() {
            if room_type_id.map_or(false, |id| shard.key() != id) {
                continue;
            }
            let days = shard.value_mut();
            match date {
                Some(date) => {
                    if days.remove(&date).is_some() {
                        removed += 1;
                    }
                }
                None => {
                    removed += days.len();
                    days.clear();
                }
            }
        }
        self.rows.retain(|_, days| !days.is_empty());

        self.stats.rows_count.fetch_sub(removed, Ordering::SeqCst);
        self.stats
            .invalidated_count
            .fetch_add(removed, Ordering::SeqCst);
        removed
    }

    /// Copy every row of the given room types inside `[from, to)` into an
    /// immutable snapshot, so a single request prices against one consistent
    /// view even while merchants keep editing stock.
    pub fn snapshot<'a>(
        &self,
        room_type_ids: impl IntoIterator<Item = &'a str>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> CalendarSnapshot {
        let mut snapshot = CalendarSnapshot::default();
        if from >= to {
            return snapshot;
        }
        for id in room_type_ids {
            if let Some(days) = self.rows.get(id) {
                let copied: HashMap<NaiveDate, DayRate> =
                    days.range(from..to).map(|(date, rate)| (*date, *rate)).collect();
                if !copied.is_empty() {
                    snapshot.rows.insert(id.to_string(), copied);
                }
            }
        }
        snapshot
    }

    pub fn entries_between(&self, room_type_ids: &[String], from: NaiveDate, to: NaiveDate) -> Vec<CalendarEntry> {
        if from >= to {
            return Vec::new();
        }
        room_type_ids
            .iter()
            .filter_map(|id| self.rows.get(id.as_str()).map(|days| (id, days)))
            .flat_map(|(id, days)| {
                days.range(from..to)
                    .map(|(date, rate)| CalendarEntry {
                        room_type_id: id.clone(),
                        date: *date,
                        price: rate.price,
                        stock: rate.stock,
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    pub fn stats(&self) -> CalendarStatsReport {
        CalendarStatsReport {
            rows_count: self.stats.rows_count.load(Ordering::SeqCst),
            hit_count: self.stats.hit_count.load(Ordering::SeqCst),
            miss_count: self.stats.miss_count.load(Ordering::SeqCst),
            total_lookups: self.stats.total_lookups.load(Ordering::SeqCst),
            invalidated_count: self.stats.invalidated_count.load(Ordering::SeqCst),
        }
    }
}

impl CalendarLookup for InMemoryCalendarStore {
    fn day_rate(&self, room_type_id: &str, date: NaiveDate) -> Option<DayRate> {
        self.stats.total_lookups.fetch_add(1, Ordering::SeqCst);
        let found = self
            .rows
            .get(room_type_id)
            .and_then(|days| days.get(&date).copied());
        match found {
            Some(_) => self.stats.hit_count.fetch_add(1, Ordering::SeqCst),
            None => self.stats.miss_count.fetch_add(1, Ordering::SeqCst),
        };
        found
    }
}

// Immutable per-request copy of the calendar rows a computation needs
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CalendarSnapshot {
    rows: HashMap<String, HashMap<NaiveDate, DayRate>>,
}

impl CalendarSnapshot {
    pub fn len(&self) -> usize {
        self.rows.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<CalendarEntry> for CalendarSnapshot {
    // Later rows for the same key win, matching upsert semantics
    fn from_iter<I: IntoIterator<Item = CalendarEntry>>(iter: I) -> Self {
        let mut snapshot = Self::default();
        for entry in iter {
            let rate = entry.day_rate();
            snapshot
                .rows
                .entry(entry.room_type_id)
                .or_default()
                .insert(entry.date, rate);
        }
        snapshot
    }
}

impl CalendarLookup for CalendarSnapshot {
    fn day_rate(&self, room_type_id: &str, date: NaiveDate) -> Option<DayRate> {
        self.rows
            .get(room_type_id)
            .and_then(|days| days.get(&date))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{date, entry};
    use std::sync::Arc;
    use std::thread;

    fn seeded_store() -> InMemoryCalendarStore {
        InMemoryCalendarStore::from_entries(vec![
            entry("rt-1", "2025-06-01", 300, 2),
            entry("rt-1", "2025-06-02", 320, 0),
            entry("rt-1", "2025-06-03", 310, 4),
            entry("rt-2", "2025-06-01", 500, 1),
        ])
    }

    #[test]
    fn test_lookup_hits_and_misses() {
        let store = seeded_store();
        assert_eq!(
            store.day_rate("rt-1", date("2025-06-02")),
            Some(DayRate { price: 320, stock: 0 })
        );
        assert!(store.day_rate("rt-1", date("2025-06-04")).is_none());
        assert!(store.day_rate("rt-9", date("2025-06-01")).is_none());

        let stats = store.stats();
        assert_eq!(stats.rows_count, 4);
        assert_eq!(stats.total_lookups, 3);
        assert_eq!(stats.hit_count, 1);
        assert_eq!(stats.miss_count, 2);
    }

    #[test]
    fn test_upsert_replaces_existing_row() {
        let store = seeded_store();
        assert!(!store.upsert(entry("rt-1", "2025-06-02", 330, 3)));
        assert_eq!(store.stats().rows_count, 4);
        assert_eq!(
            store.day_rate("rt-1", date("2025-06-02")),
            Some(DayRate { price: 330, stock: 3 })
        );
    }

    #[test]
    fn test_load_counts_only_new_rows() {
        let store = seeded_store();
        let added = store.load(vec![
            entry("rt-1", "2025-06-01", 305, 2),
            entry("rt-2", "2025-06-02", 510, 1),
            entry("rt-3", "2025-06-01", 200, 6),
        ]);
        assert_eq!(added, 2);
        assert_eq!(store.stats().rows_count, 6);
        assert_eq!(
            store.day_rate("rt-1", date("2025-06-01")),
            Some(DayRate { price: 305, stock: 2 })
        );
    }

    #[test]
    fn test_invalidate_by_room_type_and_date() {
        let store = seeded_store();
        assert_eq!(store.invalidate(Some("rt-1"), Some(date("2025-06-01"))), 1);
        assert_eq!(store.invalidate(Some("rt-1"), None), 2);
        assert!(store.day_rate("rt-1", date("2025-06-03")).is_none());
        assert!(store.day_rate("rt-2", date("2025-06-01")).is_some());

        assert_eq!(store.invalidate(None, None), 1);
        let stats = store.stats();
        assert_eq!(stats.rows_count, 0);
        assert_eq!(stats.invalidated_count, 4);
    }

    #[test]
    fn test_snapshot_is_half_open_and_detached() {
        let store = seeded_store();
        let snapshot = store.snapshot(["rt-1", "rt-2"], date("2025-06-01"), date("2025-06-03"));
        assert_eq!(snapshot.len(), 3);
        assert!(snapshot.day_rate("rt-1", date("2025-06-03")).is_none());

        // Later writes do not leak into an existing snapshot
        store.upsert(entry("rt-2", "2025-06-02", 480, 6));
        assert!(snapshot.day_rate("rt-2", date("2025-06-02")).is_none());
    }

    #[test]
    fn test_entries_between_round_trips_into_snapshot() {
        let store = seeded_store();
        let ids = vec!["rt-1".to_string()];
        let rows = store.entries_between(&ids, date("2025-06-02"), date("2025-06-10"));
        assert_eq!(rows.len(), 2);
        let snapshot: CalendarSnapshot = rows.into_iter().collect();
        assert_eq!(
            snapshot.day_rate("rt-1", date("2025-06-03")),
            Some(DayRate { price: 310, stock: 4 })
        );
    }

    #[test]
    fn test_concurrent_readers_and_writers() {
        let store = Arc::new(seeded_store());
        let mut handles = vec![];
        for i in 0..8 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                for j in 0..200 {
                    let day = date("2025-07-01") + chrono::Duration::days(j % 30);
                    if j % 5 == 0 {
                        store.upsert(CalendarEntry {
                            room_type_id: format!("rt-{}", i % 3),
                            date: day,
                            price: 100 + j,
                            stock: (j % 4) as i32,
                        });
                    } else {
                        let _ = store.day_rate("rt-1", day);
                    }
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let stats = store.stats();
        assert_eq!(stats.total_lookups, 8 * 160);
        assert_eq!(stats.hit_count + stats.miss_count, stats.total_lookups);
    }
}
