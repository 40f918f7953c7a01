//! In-memory projection of the entry store, kept newest-first.
//!
//! The store stays authoritative; `Feed` only mirrors confirmed mutations so
//! the list can be redrawn without a full reload.

use crate::diary_entry::DiaryEntry;
use chrono::NaiveDate;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct Feed {
    entries: Vec<DiaryEntry>,
}

impl Feed {
    pub fn new() -> Self {
        Feed::default()
    }

    /// Builds the feed from an arbitrarily ordered batch. Duplicate ids keep
    /// the last occurrence; entries on the same date keep their input order.
    pub fn load<I, E>(records: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<DiaryEntry>,
    {
        let mut entries: Vec<DiaryEntry> = Vec::new();
        let mut slots: HashMap<Uuid, usize> = HashMap::new();

        for entry in records.into_iter().map(Into::into) {
            match slots.get(&entry.id) {
                Some(&slot) => {
                    log::warn!(
                        "duplicate diary id {} in load, keeping the last one",
                        entry.id
                    );
                    entries[slot] = entry;
                }
                None => {
                    slots.insert(entry.id, entries.len());
                    entries.push(entry);
                }
            }
        }

        entries.sort_by(|a, b| b.date.cmp(&a.date));
        Feed { entries }
    }

    /// Places `entry` before the first strictly older entry, or at the end.
    ///
    /// Ids already present are routed through [`Feed::update`] so the feed
    /// never holds two entries with one id.
    pub fn insert(&mut self, entry: DiaryEntry) {
        if self.position(entry.id).is_some() {
            log::warn!("insert of existing diary {}, treating as update", entry.id);
            let id = entry.id;
            self.update(id, entry);
            return;
        }
        self.place(entry);
    }

    /// Replaces the entry stored under `id` and repositions it by its
    /// (possibly changed) date. Unknown ids are ignored.
    pub fn update(&mut self, id: Uuid, entry: DiaryEntry) {
        let Some(index) = self.position(id) else {
            log::debug!("update of unknown diary {} ignored", id);
            return;
        };
        self.entries.remove(index);
        if entry.id != id {
            // The replacement must not collide with another entry either.
            self.entries.retain(|e| e.id != entry.id);
        }
        self.place(entry);
    }

    /// Drops the entry with `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: Uuid) -> bool {
        match self.position(id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn entries(&self) -> &[DiaryEntry] {
        &self.entries
    }

    #[cfg(test)]
    pub fn get(&self, id: Uuid) -> Option<&DiaryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_written_today(&self, today: NaiveDate) -> bool {
        self.entries.iter().any(|e| e.is_written_on(today))
    }

    fn position(&self, id: Uuid) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    fn place(&mut self, entry: DiaryEntry) {
        match self.entries.iter().position(|e| e.date < entry.date) {
            Some(index) => self.entries.insert(index, entry),
            None => self.entries.push(entry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diary_entry::DiaryRecord;
    use crate::mood::Mood;
    use std::collections::HashSet;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn entry(date: &str) -> DiaryEntry {
        DiaryEntry::new(day(date), Mood::Happy, None, format!("on {}", date))
    }

    fn dates(feed: &Feed) -> Vec<String> {
        feed.entries()
            .iter()
            .map(|e| e.date.format("%Y-%m-%d").to_string())
            .collect()
    }

    fn assert_invariants(feed: &Feed) {
        for pair in feed.entries().windows(2) {
            assert!(
                pair[0].date >= pair[1].date,
                "feed out of order: {:?}",
                dates(feed)
            );
        }
        let ids: HashSet<Uuid> = feed.entries().iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), feed.len(), "duplicate ids in feed");
    }

    #[test]
    fn test_load_sorts_newest_first() {
        let feed = Feed::load(vec![
            entry("2024-01-05"),
            entry("2024-03-01"),
            entry("2023-12-31"),
        ]);
        assert_eq!(
            dates(&feed),
            vec!["2024-03-01", "2024-01-05", "2023-12-31"]
        );
    }

    #[test]
    fn test_load_empty() {
        let feed = Feed::load(Vec::<DiaryEntry>::new());
        assert!(feed.is_empty());
    }

    #[test]
    fn test_load_deduplicates_last_wins() {
        let first = entry("2024-01-01");
        let mut second = first.clone();
        second.content = "rewritten".into();
        second.date = day("2024-02-01");

        let feed = Feed::load(vec![first, entry("2024-01-15"), second.clone()]);

        assert_eq!(feed.len(), 2);
        assert_eq!(feed.get(second.id).unwrap().content, "rewritten");
        assert_eq!(dates(&feed), vec!["2024-02-01", "2024-01-15"]);
    }

    #[test]
    fn test_load_normalizes_missing_mood() {
        let record = DiaryRecord {
            id: Uuid::new_v4(),
            date: day("2024-04-04"),
            mood: None,
            photo: None,
            content: Some("no mood".into()),
        };
        let feed = Feed::load(vec![record]);
        assert_eq!(feed.entries()[0].mood, Mood::Lucky);
    }

    #[test]
    fn test_insert_between() {
        let mut feed = Feed::load(vec![entry("2024-03-10"), entry("2024-02-01")]);
        feed.insert(entry("2024-02-15"));
        assert_eq!(
            dates(&feed),
            vec!["2024-03-10", "2024-02-15", "2024-02-01"]
        );
    }

    #[test]
    fn test_insert_oldest_appends() {
        let mut feed = Feed::load(vec![entry("2023-07-09")]);
        feed.insert(entry("2023-07-06"));
        assert_eq!(dates(&feed), vec!["2023-07-09", "2023-07-06"]);
    }

    #[test]
    fn test_insert_equal_date_goes_after_existing() {
        let existing = entry("2024-01-01");
        let mut feed = Feed::load(vec![existing.clone()]);
        let newcomer = entry("2024-01-01");
        feed.insert(newcomer.clone());

        assert_eq!(feed.entries()[0].id, existing.id);
        assert_eq!(feed.entries()[1].id, newcomer.id);
    }

    #[test]
    fn test_insert_duplicate_id_does_not_duplicate() {
        let original = entry("2024-01-01");
        let mut feed = Feed::load(vec![original.clone()]);
        let mut again = original.clone();
        again.date = day("2024-06-01");
        feed.insert(again);

        assert_eq!(feed.len(), 1);
        assert_eq!(feed.entries()[0].date, day("2024-06-01"));
    }

    #[test]
    fn test_update_repositions_on_date_change() {
        let moving = entry("2024-01-01");
        let mut feed = Feed::load(vec![
            entry("2024-03-01"),
            moving.clone(),
            entry("2024-06-01"),
        ]);

        let mut edited = moving.clone();
        edited.date = day("2024-05-01");
        feed.update(moving.id, edited);

        assert_eq!(
            dates(&feed),
            vec!["2024-06-01", "2024-05-01", "2024-03-01"]
        );
        assert_eq!(feed.len(), 3);
        assert_eq!(feed.entries()[1].id, moving.id);
    }

    #[test]
    fn test_update_with_other_id_keeps_ids_unique() {
        let replaced = entry("2024-01-01");
        let survivor = entry("2024-03-01");
        let mut feed = Feed::load(vec![replaced.clone(), survivor.clone()]);

        let mut incoming = survivor.clone();
        incoming.date = day("2024-02-01");
        incoming.content = "moved under another id".into();
        feed.update(replaced.id, incoming);

        assert_invariants(&feed);
        assert_eq!(feed.len(), 1);
        assert!(feed.get(replaced.id).is_none());
        let kept = feed.get(survivor.id).unwrap();
        assert_eq!(kept.date, day("2024-02-01"));
        assert_eq!(kept.content, "moved under another id");
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut feed = Feed::load(vec![entry("2024-03-01")]);
        let before = feed.entries().to_vec();
        let stranger = entry("2024-09-09");
        feed.update(stranger.id, stranger);
        assert_eq!(feed.entries(), before.as_slice());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut feed = Feed::load(vec![entry("2024-03-01"), entry("2024-02-01")]);
        let before = feed.entries().to_vec();
        let missing = Uuid::new_v4();

        assert!(!feed.remove(missing));
        assert_eq!(feed.entries(), before.as_slice());
        assert!(!feed.remove(missing));
        assert_eq!(feed.entries(), before.as_slice());
    }

    #[test]
    fn test_remove_existing() {
        let gone = entry("2024-02-01");
        let mut feed = Feed::load(vec![entry("2024-03-01"), gone.clone()]);
        assert!(feed.remove(gone.id));
        assert!(feed.get(gone.id).is_none());
        assert_eq!(feed.len(), 1);
    }

    #[test]
    fn test_invariants_hold_over_mixed_operations() {
        let mut feed = Feed::new();
        let mut alive: Vec<DiaryEntry> = Vec::new();
        let dates = [
            "2024-05-03", "2023-11-20", "2024-05-03", "2024-01-01", "2022-02-28", "2024-12-24",
            "2024-07-07", "2023-01-15",
        ];

        for (step, date) in dates.iter().enumerate() {
            let e = entry(date);
            feed.insert(e.clone());
            alive.push(e);
            assert_invariants(&feed);

            if step % 3 == 2 {
                let mut target = alive[step / 2].clone();
                target.date = day("2021-06-06") + chrono::Days::new(step as u64 * 40);
                feed.update(target.id, target.clone());
                alive[step / 2] = target;
                assert_invariants(&feed);
            }
            if step % 4 == 3 {
                let victim = alive.remove(0);
                feed.remove(victim.id);
                assert_invariants(&feed);
            }
        }

        assert_eq!(feed.len(), alive.len());
    }

    #[test]
    fn test_is_written_today() {
        let feed = Feed::load(vec![entry("2024-03-01")]);
        assert!(feed.is_written_today(day("2024-03-01")));
        assert!(!feed.is_written_today(day("2024-03-02")));
        assert!(!Feed::new().is_written_today(day("2024-03-02")));
    }
}
