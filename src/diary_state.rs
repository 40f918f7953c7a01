use crate::clovers::{group_by_month, MonthBucket};
use crate::diary_entry::DiaryEntry;
use crate::error::AppError;
use crate::feed::Feed;
use crate::store::{EntryStore, StoreError};
use chrono::NaiveDate;
use uuid::Uuid;

/// Which store confirmation the controller is waiting for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pending {
    Idle,
    AwaitingCreate(DiaryEntry),
    AwaitingUpdate(DiaryEntry),
    AwaitingDelete(Uuid),
}

impl Pending {
    fn label(&self) -> &'static str {
        match self {
            Pending::Idle => "idle",
            Pending::AwaitingCreate(_) => "create",
            Pending::AwaitingUpdate(_) => "update",
            Pending::AwaitingDelete(_) => "delete",
        }
    }
}

/// Owns the feed and decides when the reconciler runs. Every mutation goes
/// to the store first; the feed only changes once the store has confirmed.
pub struct DiaryState {
    store: Box<dyn EntryStore>,
    feed: Feed,
    pending: Pending,
}

impl DiaryState {
    pub fn open(store: Box<dyn EntryStore>) -> Result<Self, AppError> {
        let mut state = DiaryState {
            store,
            feed: Feed::new(),
            pending: Pending::Idle,
        };
        state.reload()?;
        Ok(state)
    }

    /// Rebuilds the feed from the store, discarding the in-memory view.
    pub fn reload(&mut self) -> Result<(), AppError> {
        let records = self.store.load()?;
        self.feed = Feed::load(records);
        self.pending = Pending::Idle;
        log::debug!("feed loaded with {} diaries", self.feed.len());
        Ok(())
    }

    pub fn add_entry(&mut self, entry: DiaryEntry) -> Result<(), AppError> {
        self.begin(Pending::AwaitingCreate(entry))?;
        let result = self.dispatch();
        self.settle(result)
    }

    pub fn update_entry(&mut self, entry: DiaryEntry) -> Result<(), AppError> {
        self.begin(Pending::AwaitingUpdate(entry))?;
        let result = self.dispatch();
        self.settle(result)
    }

    pub fn delete_entry(&mut self, id: Uuid) -> Result<(), AppError> {
        self.begin(Pending::AwaitingDelete(id))?;
        let result = self.dispatch();
        self.settle(result)
    }

    #[cfg(test)]
    pub fn pending(&self) -> &Pending {
        &self.pending
    }

    pub fn get_entries(&self) -> &[DiaryEntry] {
        self.feed.entries()
    }

    #[cfg(test)]
    pub fn get_entry(&self, id: Uuid) -> Option<&DiaryEntry> {
        self.feed.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.feed.is_empty()
    }

    pub fn is_written_today(&self, today: NaiveDate) -> bool {
        self.feed.is_written_today(today)
    }

    /// Month summary of the current feed, computed fresh on every call.
    pub fn clovers(&self) -> Vec<MonthBucket> {
        group_by_month(self.feed.entries())
    }

    fn begin(&mut self, next: Pending) -> Result<(), AppError> {
        if self.pending != Pending::Idle {
            log::warn!(
                "{} requested while {} is outstanding",
                next.label(),
                self.pending.label()
            );
            return Err(AppError::MutationInFlight(self.pending.label()));
        }
        self.pending = next;
        Ok(())
    }

    fn dispatch(&mut self) -> Result<(), StoreError> {
        match &self.pending {
            Pending::Idle => Ok(()),
            Pending::AwaitingCreate(entry) => self.store.create(entry),
            Pending::AwaitingUpdate(entry) => self.store.edit(entry),
            Pending::AwaitingDelete(id) => self.store.delete(*id),
        }
    }

    /// Applies the store's answer to the outstanding mutation.
    fn settle(&mut self, result: Result<(), StoreError>) -> Result<(), AppError> {
        let pending = std::mem::replace(&mut self.pending, Pending::Idle);
        if let Err(e) = result {
            log::error!("store rejected {}: {}", pending.label(), e);
            return Err(e.into());
        }

        match pending {
            Pending::Idle => {}
            Pending::AwaitingCreate(entry) => self.feed.insert(entry),
            Pending::AwaitingUpdate(entry) => {
                let id = entry.id;
                self.feed.update(id, entry);
            }
            Pending::AwaitingDelete(id) => {
                self.feed.remove(id);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diary_entry::DiaryRecord;
    use crate::mood::Mood;
    use crate::store::{JsonFileStore, MemoryStore};
    use tempfile::TempDir;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn entry(date: &str) -> DiaryEntry {
        DiaryEntry::new(
            day(date),
            Mood::Happy,
            Some(vec![1]),
            format!("diary of {}", date),
        )
    }

    /// Store whose every mutation fails.
    struct BrokenStore;

    impl EntryStore for BrokenStore {
        fn load(&self) -> Result<Vec<DiaryRecord>, StoreError> {
            Ok(Vec::new())
        }
        fn create(&mut self, _: &DiaryEntry) -> Result<(), StoreError> {
            Err(std::io::Error::other("disk full").into())
        }
        fn edit(&mut self, entry: &DiaryEntry) -> Result<(), StoreError> {
            Err(StoreError::NotFound(entry.id))
        }
        fn delete(&mut self, id: Uuid) -> Result<(), StoreError> {
            Err(StoreError::NotFound(id))
        }
    }

    #[test]
    fn test_open_loads_sorted_feed() {
        let records = vec![
            DiaryRecord::from(&entry("2024-01-01")),
            DiaryRecord::from(&entry("2024-03-01")),
        ];
        let state = DiaryState::open(Box::new(MemoryStore::with_records(records))).unwrap();
        let dates: Vec<NaiveDate> = state.get_entries().iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![day("2024-03-01"), day("2024-01-01")]);
        assert_eq!(state.pending(), &Pending::Idle);
    }

    #[test]
    fn test_create_edit_delete_flow() {
        let mut state = DiaryState::open(Box::new(MemoryStore::new())).unwrap();
        let march = entry("2024-03-10");
        let feb = entry("2024-02-01");
        state.add_entry(march.clone()).unwrap();
        state.add_entry(feb.clone()).unwrap();
        state.add_entry(entry("2024-02-15")).unwrap();

        let mut moved = feb.clone();
        moved.date = day("2024-05-01");
        state.update_entry(moved).unwrap();
        assert_eq!(state.get_entries()[0].id, feb.id);

        state.delete_entry(march.id).unwrap();
        assert!(state.get_entry(march.id).is_none());
        assert_eq!(state.get_entries().len(), 2);
        assert_eq!(state.pending(), &Pending::Idle);
    }

    #[test]
    fn test_failed_store_leaves_feed_untouched() {
        let mut state = DiaryState::open(Box::new(BrokenStore)).unwrap();
        let e = entry("2024-03-10");

        assert!(matches!(
            state.add_entry(e.clone()),
            Err(AppError::Store(StoreError::Io(_)))
        ));
        assert!(state.get_entries().is_empty());
        assert_eq!(state.pending(), &Pending::Idle);

        assert!(state.update_entry(e.clone()).is_err());
        assert!(state.delete_entry(e.id).is_err());
        assert!(state.get_entries().is_empty());
    }

    #[test]
    fn test_mutation_rejected_while_pending() {
        let mut state = DiaryState::open(Box::new(MemoryStore::new())).unwrap();
        let waiting = entry("2024-01-01");
        state.pending = Pending::AwaitingCreate(waiting);

        let result = state.add_entry(entry("2024-01-02"));
        assert!(matches!(result, Err(AppError::MutationInFlight("create"))));
        assert!(state.get_entries().is_empty());
    }

    #[test]
    fn test_delete_of_missing_id_reports_not_found() {
        let mut state = DiaryState::open(Box::new(MemoryStore::new())).unwrap();
        let missing = Uuid::new_v4();
        assert!(matches!(
            state.delete_entry(missing),
            Err(AppError::Store(StoreError::NotFound(id))) if id == missing
        ));
    }

    #[test]
    fn test_clovers_follow_mutations() {
        let mut state = DiaryState::open(Box::new(MemoryStore::new())).unwrap();
        let jan = entry("2024-01-05");
        state.add_entry(jan.clone()).unwrap();
        state.add_entry(entry("2024-01-20")).unwrap();
        state.add_entry(entry("2024-02-01")).unwrap();
        assert_eq!(
            state.clovers().iter().map(|b| b.count).collect::<Vec<_>>(),
            vec![1, 2]
        );

        state.delete_entry(jan.id).unwrap();
        assert_eq!(
            state.clovers().iter().map(|b| b.count).collect::<Vec<_>>(),
            vec![1, 1]
        );
    }

    #[test]
    fn test_reload_matches_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("diaries.json");
        let mut state = DiaryState::open(Box::new(JsonFileStore::new(&path))).unwrap();
        state.add_entry(entry("2024-04-04")).unwrap();
        state.add_entry(entry("2024-04-05")).unwrap();

        let reopened = DiaryState::open(Box::new(JsonFileStore::new(&path))).unwrap();
        assert_eq!(reopened.get_entries(), state.get_entries());

        state.reload().unwrap();
        assert_eq!(reopened.get_entries(), state.get_entries());
        assert!(state.is_written_today(day("2024-04-05")));
    }
}
