use crate::mood::Mood;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single day's record as the feed sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiaryEntry {
    pub id: Uuid,
    pub date: NaiveDate,
    pub mood: Mood,
    pub photo: Option<Vec<u8>>,
    pub content: String,
}

impl DiaryEntry {
    pub fn new(date: NaiveDate, mood: Mood, photo: Option<Vec<u8>>, content: String) -> Self {
        DiaryEntry {
            id: Uuid::new_v4(),
            date,
            mood,
            photo,
            content,
        }
    }

    pub fn preview(&self) -> &str {
        self.content.lines().next().unwrap_or("")
    }

    pub fn is_written_on(&self, day: NaiveDate) -> bool {
        self.date == day
    }
}

/// Persisted shape of an entry. Everything except `id` and `date` may be
/// missing in older files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryRecord {
    pub id: Uuid,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl From<DiaryRecord> for DiaryEntry {
    fn from(record: DiaryRecord) -> Self {
        let photo = record.photo.and_then(|encoded| match STANDARD.decode(&encoded) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                log::warn!("dropping undecodable photo of diary {}: {}", record.id, e);
                None
            }
        });

        DiaryEntry {
            id: record.id,
            date: record.date,
            mood: Mood::decode(record.mood.as_deref()),
            photo,
            content: record.content.unwrap_or_default(),
        }
    }
}

impl From<&DiaryEntry> for DiaryRecord {
    fn from(entry: &DiaryEntry) -> Self {
        DiaryRecord {
            id: entry.id,
            date: entry.date,
            mood: Some(entry.mood.as_str().to_string()),
            photo: entry.photo.as_ref().map(|bytes| STANDARD.encode(bytes)),
            content: Some(entry.content.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_record_without_mood_gets_default() {
        let json = r#"{"id":"6f1c2a0e-8f4b-4d36-9d5a-2f6a1f1b9c11","date":"2024-03-10"}"#;
        let record: DiaryRecord = serde_json::from_str(json).unwrap();
        let entry = DiaryEntry::from(record);

        assert_eq!(entry.mood, Mood::Lucky);
        assert_eq!(entry.content, "");
        assert!(entry.photo.is_none());
        assert_eq!(entry.date, day(2024, 3, 10));
    }

    #[test]
    fn test_bad_photo_is_dropped_not_fatal() {
        let record = DiaryRecord {
            id: Uuid::new_v4(),
            date: day(2024, 1, 1),
            mood: Some("sad".into()),
            photo: Some("!!! not base64 !!!".into()),
            content: Some("rainy".into()),
        };
        let entry = DiaryEntry::from(record);

        assert!(entry.photo.is_none());
        assert_eq!(entry.mood, Mood::Sad);
        assert_eq!(entry.content, "rainy");
    }

    #[test]
    fn test_record_keeps_photo_bytes() {
        let entry = DiaryEntry::new(
            day(2024, 5, 1),
            Mood::Happy,
            Some(vec![0xff, 0xd8, 0x00]),
            "walk".into(),
        );
        let restored = DiaryEntry::from(DiaryRecord::from(&entry));

        assert_eq!(restored, entry);
    }

    #[test]
    fn test_preview_is_first_line() {
        let entry = DiaryEntry::new(day(2024, 5, 1), Mood::Soso, None, "title\nbody".into());
        assert_eq!(entry.preview(), "title");
        assert!(entry.is_written_on(day(2024, 5, 1)));
        assert!(!entry.is_written_on(day(2024, 5, 2)));
    }
}
