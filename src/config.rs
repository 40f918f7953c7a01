use std::env;
use std::path::PathBuf;

/// Where dayroom keeps its files. Read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub log_file: PathBuf,
}

impl Config {
    /// `DAYROOM_DATA_DIR` (default `.dayroom`) and `DAYROOM_LOG_FILE`
    /// (default `<data dir>/dayroom.log`).
    pub fn from_env() -> Self {
        let data_dir = env::var_os("DAYROOM_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".dayroom"));
        let log_file = env::var_os("DAYROOM_LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("dayroom.log"));

        Config { data_dir, log_file }
    }

    pub fn diary_path(&self) -> PathBuf {
        self.data_dir.join("diaries.json")
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.data_dir.join("preferences.json")
    }
}
