use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

pub const NICKNAME_MAX_CHARS: usize = 8;
pub const PASSCODE_LEN: usize = 4;

#[derive(Debug, thiserror::Error)]
pub enum PreferencesError {
    #[error("nickname must be 1-8 letters or digits")]
    InvalidNickname,
    #[error("passcode must be 4 digits")]
    InvalidPasscode,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt preferences: {0}")]
    Format(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub nickname: Option<String>,
    pub passcode_hash: Option<String>,
    #[serde(default)]
    pub onboarding_finished: bool,
}

/// First screen after launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchRoute {
    Onboarding,
    Locked,
    Feed,
}

/// Hangul syllables and jamo, ASCII letters and digits, at most eight of them.
pub fn validate_nickname(nickname: &str) -> bool {
    let count = nickname.chars().count();
    count > 0
        && count <= NICKNAME_MAX_CHARS
        && nickname.chars().all(|c| {
            c.is_ascii_alphanumeric()
                || ('가'..='힣').contains(&c)
                || ('ㄱ'..='ㅎ').contains(&c)
                || ('ㅏ'..='ㅣ').contains(&c)
        })
}

pub fn validate_passcode(passcode: &str) -> bool {
    passcode.len() == PASSCODE_LEN && passcode.chars().all(|c| c.is_ascii_digit())
}

fn hash_passcode(passcode: &str) -> String {
    format!("{:x}", Sha256::digest(passcode.as_bytes()))
}

pub struct PreferencesStore {
    path: PathBuf,
    data: Preferences,
}

impl PreferencesStore {
    /// Opens the preference file. A missing file means first launch; any
    /// other read or parse failure is returned and the file is left alone.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PreferencesError> {
        let path = path.into();
        let data = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                log::error!("cannot parse preferences {}: {}", path.display(), e);
                e
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => Preferences::default(),
            Err(e) => {
                log::error!("cannot read preferences {}: {}", path.display(), e);
                return Err(e.into());
            }
        };
        Ok(PreferencesStore { path, data })
    }

    pub fn nickname(&self) -> Option<&str> {
        self.data.nickname.as_deref()
    }

    pub fn launch_route(&self) -> LaunchRoute {
        if !self.data.onboarding_finished || self.data.nickname.is_none() {
            LaunchRoute::Onboarding
        } else if self.is_locked() {
            LaunchRoute::Locked
        } else {
            LaunchRoute::Feed
        }
    }

    pub fn set_nickname(&mut self, nickname: &str) -> Result<(), PreferencesError> {
        let nickname = nickname.trim();
        if !validate_nickname(nickname) {
            return Err(PreferencesError::InvalidNickname);
        }
        let mut next = self.data.clone();
        next.nickname = Some(nickname.to_string());
        next.onboarding_finished = true;
        self.commit(next)
    }

    pub fn is_locked(&self) -> bool {
        self.data.passcode_hash.is_some()
    }

    pub fn set_passcode(&mut self, passcode: &str) -> Result<(), PreferencesError> {
        if !validate_passcode(passcode) {
            return Err(PreferencesError::InvalidPasscode);
        }
        let mut next = self.data.clone();
        next.passcode_hash = Some(hash_passcode(passcode));
        self.commit(next)?;
        log::info!("passcode lock enabled");
        Ok(())
    }

    pub fn clear_passcode(&mut self) -> Result<(), PreferencesError> {
        let mut next = self.data.clone();
        next.passcode_hash = None;
        self.commit(next)?;
        log::info!("passcode lock disabled");
        Ok(())
    }

    /// Always true when no passcode is set.
    pub fn verify_passcode(&self, attempt: &str) -> bool {
        match &self.data.passcode_hash {
            Some(hash) => *hash == hash_passcode(attempt),
            None => true,
        }
    }

    /// Writes `next` to disk and only then makes it the in-memory state.
    fn commit(&mut self, next: Preferences) -> Result<(), PreferencesError> {
        self.persist(&next)?;
        self.data = next;
        Ok(())
    }

    fn persist(&self, data: &Preferences) -> Result<(), PreferencesError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized).map_err(|e| {
            log::error!("cannot write preferences {}: {}", self.path.display(), e);
            e
        })?;
        Ok(())
    }
}
