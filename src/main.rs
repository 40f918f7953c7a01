mod clovers;
mod config;
mod diary_entry;
mod diary_state;
mod draft;
mod error;
mod feed;
mod mood;
mod preferences;
mod store;
mod ui;

use chrono::Local;
use color_eyre::eyre::{eyre, Result, WrapErr};
use config::Config;
use diary_state::DiaryState;
use draft::DiaryDraft;
use error::AppError;
use preferences::{LaunchRoute, PreferencesStore};
use std::fs::{self, OpenOptions};
use store::JsonFileStore;
use ui::{Action, UI};

fn init_logging(config: &Config) -> Result<()> {
    if let Some(parent) = config.log_file.parent() {
        fs::create_dir_all(parent)?;
    }
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .wrap_err_with(|| format!("Failed to open log file {}", config.log_file.display()))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();
    Ok(())
}

fn report(ui: &mut UI, result: Result<(), AppError>) {
    if let Err(e) = result {
        log::error!("{}", e);
        ui.set_status(e.user_message());
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let config = Config::from_env();
    fs::create_dir_all(&config.data_dir)
        .wrap_err_with(|| format!("Failed to create {}", config.data_dir.display()))?;
    init_logging(&config)?;
    log::info!("starting with data dir {}", config.data_dir.display());

    let preferences_path = config.preferences_path();
    let mut preferences = PreferencesStore::open(&preferences_path)
        .wrap_err_with(|| format!("Failed to load preferences {}", preferences_path.display()))?;
    let store = JsonFileStore::new(config.diary_path());
    let mut diary_state = DiaryState::open(Box::new(store))
        .map_err(|e| eyre!("Failed to load diary: {}", e))?;

    let mut ui = UI::new()?;

    let admitted = match preferences.launch_route() {
        LaunchRoute::Onboarding => ui.onboarding(&mut preferences)?,
        LaunchRoute::Locked => ui.unlock(&preferences)?,
        LaunchRoute::Feed => true,
    };
    if !admitted {
        return Ok(());
    }

    loop {
        let today = Local::now().date_naive();
        ui.display(&diary_state, &preferences, today)?;

        if let Some(action) = ui.handle_input(&diary_state)? {
            match action {
                Action::Write => {
                    if let Some(entry) = ui.write_entry(DiaryDraft::new(today), today)? {
                        let result = diary_state.add_entry(entry);
                        report(&mut ui, result);
                    }
                }
                Action::View => {
                    ui.view_entries(&diary_state)?;
                }
                Action::Edit => {
                    let selected =
                        ui.select_entry("Select Entry to Edit", diary_state.get_entries())?;
                    if let Some(index) = selected {
                        let draft = DiaryDraft::from_entry(&diary_state.get_entries()[index]);
                        if let Some(updated_entry) = ui.write_entry(draft, today)? {
                            let result = diary_state.update_entry(updated_entry);
                            report(&mut ui, result);
                        }
                    }
                }
                Action::Delete => {
                    let selected =
                        ui.select_entry("Select Entry to Delete", diary_state.get_entries())?;
                    if let Some(index) = selected {
                        let entry = &diary_state.get_entries()[index];
                        let (id, date) = (entry.id, entry.date);
                        if ui.confirm(&format!("Delete the diary from {}?", date))? {
                            let result = diary_state.delete_entry(id);
                            report(&mut ui, result);
                        }
                    }
                }
                Action::Clovers => {
                    ui.view_clovers(&diary_state.clovers())?;
                }
                Action::Settings => {
                    ui.settings(&mut preferences)?;
                }
                Action::Reload => {
                    let result = diary_state.reload();
                    report(&mut ui, result);
                }
                Action::Quit => break,
            }
        }
    }

    Ok(())
}
