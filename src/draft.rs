use crate::diary_entry::DiaryEntry;
use crate::mood::Mood;
use chrono::NaiveDate;
use uuid::Uuid;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("pick a mood first")]
    MissingMood,
    #[error("a photo is required")]
    MissingPhoto,
    #[error("write something before saving")]
    EmptyContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSelection {
    Accepted,
    /// The requested day lies in the future; the draft now points at today.
    ClampedToToday,
}

/// Entry being written or edited. Turns into a [`DiaryEntry`] once mood,
/// photo and some content are all present.
#[derive(Debug, Clone)]
pub struct DiaryDraft {
    existing_id: Option<Uuid>,
    pub date: NaiveDate,
    pub mood: Option<Mood>,
    pub photo: Option<Vec<u8>>,
    pub content: String,
}

impl DiaryDraft {
    pub fn new(today: NaiveDate) -> Self {
        DiaryDraft {
            existing_id: None,
            date: today,
            mood: None,
            photo: None,
            content: String::new(),
        }
    }

    pub fn from_entry(entry: &DiaryEntry) -> Self {
        DiaryDraft {
            existing_id: Some(entry.id),
            date: entry.date,
            mood: Some(entry.mood),
            photo: entry.photo.clone(),
            content: entry.content.clone(),
        }
    }

    pub fn editing(&self) -> Option<Uuid> {
        self.existing_id
    }

    pub fn select_date(&mut self, date: NaiveDate, today: NaiveDate) -> DateSelection {
        if date > today {
            log::debug!("future date {} rejected, using {}", date, today);
            self.date = today;
            DateSelection::ClampedToToday
        } else {
            self.date = date;
            DateSelection::Accepted
        }
    }

    pub fn can_save(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn finish(self) -> Result<DiaryEntry, DraftError> {
        self.validate()?;
        let mood = self.mood.ok_or(DraftError::MissingMood)?;
        let photo = self.photo.ok_or(DraftError::MissingPhoto)?;

        let mut entry = DiaryEntry::new(self.date, mood, Some(photo), self.content);
        if let Some(id) = self.existing_id {
            entry.id = id;
        }
        Ok(entry)
    }

    fn validate(&self) -> Result<(), DraftError> {
        if self.mood.is_none() {
            return Err(DraftError::MissingMood);
        }
        if self.photo.is_none() {
            return Err(DraftError::MissingPhoto);
        }
        if self.content.trim().is_empty() {
            return Err(DraftError::EmptyContent);
        }
        Ok(())
    }
}
