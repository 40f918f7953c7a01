use crate::clovers::MonthBucket;
use crate::diary_entry::DiaryEntry;
use crate::diary_state::DiaryState;
use crate::draft::{DateSelection, DiaryDraft};
use crate::mood::Mood;
use crate::preferences::{validate_passcode, PreferencesStore};
use chrono::NaiveDate;
use color_eyre::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Terminal,
};
use std::{
    fs,
    io::{stdout, Stdout},
    rc::Rc,
    time::{Duration, Instant},
};
use unicode_width::UnicodeWidthChar;

const CLOVER: &str = "♣";
const CLOVERS_PER_ROW: usize = 5;
const PREVIEW_WIDTH: usize = 48;

pub enum Action {
    Write,
    View,
    Edit,
    Delete,
    Clovers,
    Settings,
    Reload,
    Quit,
}

pub struct UI {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    cursor_position: usize,
    cursor_visible: bool,
    last_cursor_update: Instant,
    status: Option<String>,
}

fn chunks(area: Rect, constraints: &[Constraint]) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(constraints.to_vec())
        .split(area)
}

fn title(text: impl Into<String>) -> Paragraph<'static> {
    Paragraph::new(text.into())
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
}

fn instructions(text: impl Into<String>) -> Paragraph<'static> {
    Paragraph::new(text.into())
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
}

fn truncate_to_width(text: &str, max: usize) -> String {
    let mut width = 0;
    let mut out = String::new();
    for c in text.chars() {
        width += c.width().unwrap_or(0);
        if width > max {
            out.push('…');
            break;
        }
        out.push(c);
    }
    out
}

fn entry_item(entry: &DiaryEntry) -> ListItem<'static> {
    ListItem::new(Line::from(vec![
        Span::raw(format!("[{}] ", entry.date.format("%Y-%m-%d"))),
        Span::styled(
            format!("{:<6}", entry.mood.title()),
            Style::default().fg(entry.mood.color()),
        ),
        Span::raw(truncate_to_width(entry.preview(), PREVIEW_WIDTH)),
    ]))
}

fn clover_color(opacity: f32) -> Color {
    Color::Rgb(0, (255.0 * opacity) as u8, (80.0 * opacity) as u8)
}

fn byte_index(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

fn read_key() -> Result<Option<KeyCode>> {
    if let Event::Key(key) = event::read()? {
        if key.kind == KeyEventKind::Press {
            return Ok(Some(key.code));
        }
    }
    Ok(None)
}

impl UI {
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        Ok(UI {
            terminal,
            cursor_position: 0,
            cursor_visible: true,
            last_cursor_update: Instant::now(),
            status: None,
        })
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    pub fn display(
        &mut self,
        diary_state: &DiaryState,
        preferences: &PreferencesStore,
        today: NaiveDate,
    ) -> Result<()> {
        let status = self.status.take();
        let greeting = match preferences.nickname() {
            Some(name) => format!("DayRoom · {}", name),
            None => "DayRoom".to_string(),
        };
        let written_today = diary_state.is_written_today(today);
        let entries = diary_state.get_entries();

        self.terminal.draw(|f| {
            let chunks = chunks(
                f.area(),
                &[
                    Constraint::Length(3),
                    Constraint::Length(1),
                    Constraint::Min(0),
                    Constraint::Length(1),
                    Constraint::Length(3),
                ],
            );

            f.render_widget(title(greeting), chunks[0]);

            let today_line = if written_today {
                Paragraph::new("Today's diary is written.")
                    .style(Style::default().fg(Color::Green))
            } else {
                Paragraph::new(format!("No diary for {} yet. Press w to write one.", today))
                    .style(Style::default().fg(Color::Magenta))
            };
            f.render_widget(today_line.alignment(Alignment::Center), chunks[1]);

            let items: Vec<ListItem> = entries.iter().map(entry_item).collect();
            let entries_list =
                List::new(items).block(Block::default().borders(Borders::ALL).title("Feed"));
            f.render_widget(entries_list, chunks[2]);

            if let Some(message) = status {
                f.render_widget(
                    Paragraph::new(message)
                        .style(Style::default().fg(Color::Red))
                        .alignment(Alignment::Center),
                    chunks[3],
                );
            }

            let mut keys = vec![Span::raw("Press ")];
            let bindings: &[(&str, &str)] = if entries.is_empty() {
                &[
                    ("w", "write"),
                    ("s", "settings"),
                    ("r", "reload"),
                    ("q", "quit"),
                ]
            } else {
                &[
                    ("w", "write"),
                    ("v", "view"),
                    ("e", "edit"),
                    ("d", "delete"),
                    ("m", "months"),
                    ("s", "settings"),
                    ("r", "reload"),
                    ("q", "quit"),
                ]
            };
            for (i, (key, label)) in bindings.iter().enumerate() {
                if i > 0 {
                    keys.push(Span::raw(", "));
                }
                keys.push(Span::styled(
                    key.to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                ));
                keys.push(Span::raw(format!(" {}", label)));
            }
            f.render_widget(
                Paragraph::new(Line::from(keys))
                    .style(Style::default().fg(Color::Yellow))
                    .alignment(Alignment::Center),
                chunks[4],
            );
        })?;

        Ok(())
    }

    pub fn handle_input(&self, diary_state: &DiaryState) -> Result<Option<Action>> {
        let has_entries = !diary_state.is_empty();
        Ok(match read_key()? {
            Some(KeyCode::Char('w')) => Some(Action::Write),
            Some(KeyCode::Char('s')) => Some(Action::Settings),
            Some(KeyCode::Char('r')) => Some(Action::Reload),
            Some(KeyCode::Char('q')) => Some(Action::Quit),
            Some(KeyCode::Char('v')) if has_entries => Some(Action::View),
            Some(KeyCode::Char('e')) if has_entries => Some(Action::Edit),
            Some(KeyCode::Char('d')) if has_entries => Some(Action::Delete),
            Some(KeyCode::Char('m')) if has_entries => Some(Action::Clovers),
            _ => None,
        })
    }

    /// Single-line prompt. `None` when the user backs out with Esc.
    fn prompt(
        &mut self,
        heading: &str,
        label: &str,
        initial: &str,
        masked: bool,
        hint: Option<&str>,
    ) -> Result<Option<String>> {
        let mut value = initial.to_string();

        loop {
            self.terminal.draw(|f| {
                let chunks = chunks(
                    f.area(),
                    &[
                        Constraint::Length(3),
                        Constraint::Length(3),
                        Constraint::Length(2),
                        Constraint::Min(1),
                    ],
                );
                f.render_widget(title(heading), chunks[0]);

                let shown = if masked {
                    "*".repeat(value.chars().count())
                } else {
                    value.clone()
                };
                let input = Paragraph::new(shown)
                    .block(Block::default().borders(Borders::ALL).title(label));
                f.render_widget(input, chunks[1]);

                if let Some(hint) = hint {
                    f.render_widget(
                        Paragraph::new(hint)
                            .style(Style::default().fg(Color::Red))
                            .alignment(Alignment::Center),
                        chunks[2],
                    );
                }
                f.render_widget(instructions("Enter: Submit, Esc: Cancel"), chunks[3]);
            })?;

            match read_key()? {
                Some(KeyCode::Enter) => return Ok(Some(value)),
                Some(KeyCode::Esc) => return Ok(None),
                Some(KeyCode::Char(c)) => value.push(c),
                Some(KeyCode::Backspace) => {
                    value.pop();
                }
                _ => {}
            }
        }
    }

    /// Asks for a nickname until a valid one is given. `false` means the user quit.
    pub fn onboarding(&mut self, preferences: &mut PreferencesStore) -> Result<bool> {
        let mut hint: Option<String> = None;
        loop {
            let Some(nickname) = self.prompt(
                "Welcome to DayRoom",
                "What should we call you? (up to 8 letters or digits)",
                "",
                false,
                hint.as_deref(),
            )?
            else {
                return Ok(false);
            };
            match preferences.set_nickname(&nickname) {
                Ok(()) => return Ok(true),
                Err(e) => hint = Some(e.to_string()),
            }
        }
    }

    /// Passcode lock screen. `false` means the user quit instead of unlocking.
    pub fn unlock(&mut self, preferences: &PreferencesStore) -> Result<bool> {
        let mut hint: Option<&str> = None;
        loop {
            let Some(attempt) = self.prompt("Locked", "Passcode", "", true, hint)? else {
                return Ok(false);
            };
            if preferences.verify_passcode(&attempt) {
                return Ok(true);
            }
            log::info!("wrong passcode entered");
            hint = Some("Wrong passcode, try again.");
        }
    }

    fn pick_mood(&mut self, current: Option<Mood>) -> Result<Option<Mood>> {
        let mut selected_index = current
            .and_then(|m| Mood::ALL.iter().position(|&x| x == m))
            .unwrap_or(0);

        loop {
            self.terminal.draw(|f| {
                let chunks = chunks(
                    f.area(),
                    &[
                        Constraint::Length(3),
                        Constraint::Min(7),
                        Constraint::Length(3),
                    ],
                );
                f.render_widget(title("How was your day?"), chunks[0]);

                let items: Vec<ListItem> = Mood::ALL
                    .iter()
                    .map(|m| {
                        ListItem::new(Span::styled(m.title(), Style::default().fg(m.color())))
                    })
                    .collect();
                let moods = List::new(items)
                    .block(Block::default().borders(Borders::ALL).title("Mood"))
                    .highlight_style(Style::default().add_modifier(Modifier::BOLD))
                    .highlight_symbol("> ");
                f.render_stateful_widget(
                    moods,
                    chunks[1],
                    &mut ListState::default().with_selected(Some(selected_index)),
                );
                f.render_widget(
                    instructions("Up/Down: Navigate, Enter: Select, Esc: Cancel"),
                    chunks[2],
                );
            })?;

            match read_key()? {
                Some(KeyCode::Up) => selected_index = selected_index.saturating_sub(1),
                Some(KeyCode::Down) => {
                    if selected_index < Mood::ALL.len() - 1 {
                        selected_index += 1;
                    }
                }
                Some(KeyCode::Enter) => return Ok(Some(Mood::ALL[selected_index])),
                Some(KeyCode::Esc) => return Ok(None),
                _ => {}
            }
        }
    }

    fn edit_content(&mut self, initial: &str) -> Result<String> {
        let mut content = initial.to_string();
        self.cursor_position = content.chars().count();
        let mut last_content_update = Instant::now();
        let mut first_frame = true;

        loop {
            let now = Instant::now();
            let should_update_cursor =
                now.duration_since(self.last_cursor_update) >= Duration::from_millis(500);
            let should_redraw = first_frame
                || should_update_cursor
                || now.duration_since(last_content_update) < Duration::from_millis(50);

            if should_redraw {
                first_frame = false;
                let shown = if self.cursor_visible {
                    let mut with_cursor = content.clone();
                    with_cursor.insert(byte_index(&content, self.cursor_position), '|');
                    with_cursor
                } else {
                    content.clone()
                };

                self.terminal.draw(|f| {
                    let chunks = chunks(
                        f.area(),
                        &[
                            Constraint::Length(3),
                            Constraint::Min(10),
                            Constraint::Length(3),
                        ],
                    );
                    f.render_widget(title("Write about your day"), chunks[0]);
                    let input = Paragraph::new(shown)
                        .wrap(Wrap { trim: false })
                        .block(Block::default().borders(Borders::ALL).title("Content"));
                    f.render_widget(input, chunks[1]);
                    f.render_widget(instructions("Press Esc to finish"), chunks[2]);
                })?;

                if should_update_cursor {
                    self.cursor_visible = !self.cursor_visible;
                    self.last_cursor_update = now;
                }
            }

            if event::poll(Duration::from_millis(50))? {
                let Some(code) = read_key()? else { continue };
                let length = content.chars().count();
                match code {
                    KeyCode::Esc => break,
                    KeyCode::Char(c) => {
                        content.insert(byte_index(&content, self.cursor_position), c);
                        self.cursor_position += 1;
                    }
                    KeyCode::Enter => {
                        content.insert(byte_index(&content, self.cursor_position), '\n');
                        self.cursor_position += 1;
                    }
                    KeyCode::Backspace if self.cursor_position > 0 => {
                        self.cursor_position -= 1;
                        content.remove(byte_index(&content, self.cursor_position));
                    }
                    KeyCode::Delete if self.cursor_position < length => {
                        content.remove(byte_index(&content, self.cursor_position));
                    }
                    KeyCode::Left => self.cursor_position = self.cursor_position.saturating_sub(1),
                    KeyCode::Right if self.cursor_position < length => self.cursor_position += 1,
                    KeyCode::Home => self.cursor_position = 0,
                    KeyCode::End => self.cursor_position = length,
                    _ => continue,
                }
                last_content_update = Instant::now();
            }
        }

        Ok(content)
    }

    /// Create/edit screen. Opens on the mood picker when no mood is set yet
    /// and closes without saving if the picker is dismissed.
    pub fn write_entry(
        &mut self,
        mut draft: DiaryDraft,
        today: NaiveDate,
    ) -> Result<Option<DiaryEntry>> {
        if draft.mood.is_none() {
            match self.pick_mood(None)? {
                Some(mood) => draft.mood = Some(mood),
                None => return Ok(None),
            }
        }

        let heading = if draft.editing().is_some() {
            "Edit Diary"
        } else {
            "New Diary"
        };
        let mut notice: Option<String> = None;

        loop {
            let can_save = draft.can_save();
            let mut summary = vec![
                Line::from(format!("Date:  {}", draft.date.format("%Y-%m-%d"))),
                Line::from(vec![
                    Span::raw("Mood:  "),
                    match draft.mood {
                        Some(m) => Span::styled(m.title(), Style::default().fg(m.color())),
                        None => Span::raw("-"),
                    },
                ]),
                Line::from(match &draft.photo {
                    Some(bytes) => format!("Photo: {} bytes", bytes.len()),
                    None => "Photo: none".to_string(),
                }),
                Line::from(""),
            ];
            summary.extend(draft.content.lines().map(|l| Line::from(l.to_string())));
            let shown_notice = notice.take();

            self.terminal.draw(|f| {
                let chunks = chunks(
                    f.area(),
                    &[
                        Constraint::Length(3),
                        Constraint::Min(8),
                        Constraint::Length(1),
                        Constraint::Length(3),
                    ],
                );
                f.render_widget(title(heading), chunks[0]);
                f.render_widget(
                    Paragraph::new(summary)
                        .wrap(Wrap { trim: false })
                        .block(Block::default().borders(Borders::ALL).title("Diary")),
                    chunks[1],
                );
                if let Some(message) = shown_notice {
                    f.render_widget(
                        Paragraph::new(message)
                            .style(Style::default().fg(Color::Magenta))
                            .alignment(Alignment::Center),
                        chunks[2],
                    );
                }
                let keys = if can_save {
                    "m: Mood, t: Date, p: Photo, c: Content, Enter: Save, Esc: Discard"
                } else {
                    "m: Mood, t: Date, p: Photo, c: Content, Esc: Discard"
                };
                f.render_widget(instructions(keys), chunks[3]);
            })?;

            match read_key()? {
                Some(KeyCode::Char('m')) => {
                    if let Some(mood) = self.pick_mood(draft.mood)? {
                        draft.mood = Some(mood);
                    }
                }
                Some(KeyCode::Char('t')) => {
                    let current = draft.date.format("%Y-%m-%d").to_string();
                    if let Some(input) =
                        self.prompt("Pick a date", "Date (YYYY-MM-DD)", &current, false, None)?
                    {
                        match NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d") {
                            Ok(date) => {
                                if draft.select_date(date, today) == DateSelection::ClampedToToday {
                                    notice = Some(
                                        "Future dates can't be picked; the diary is set to today."
                                            .to_string(),
                                    );
                                } else {
                                    notice = Some("Date changed.".to_string());
                                }
                            }
                            Err(_) => notice = Some(format!("'{}' is not a date", input.trim())),
                        }
                    }
                }
                Some(KeyCode::Char('p')) => {
                    let path = self.prompt("Attach a photo", "Image file path", "", false, None)?;
                    if let Some(path) = path {
                        match fs::read(path.trim()) {
                            Ok(bytes) if !bytes.is_empty() => draft.photo = Some(bytes),
                            Ok(_) => notice = Some("That file is empty.".to_string()),
                            Err(e) => {
                                log::warn!("could not read photo {}: {}", path.trim(), e);
                                notice = Some(format!("Could not read photo: {}", e));
                            }
                        }
                    }
                }
                Some(KeyCode::Char('c')) => {
                    let content = self.edit_content(&draft.content)?;
                    draft.content = content;
                }
                Some(KeyCode::Enter) => match draft.clone().finish() {
                    Ok(entry) => return Ok(Some(entry)),
                    Err(e) => notice = Some(e.to_string()),
                },
                Some(KeyCode::Esc) => return Ok(None),
                _ => {}
            }
        }
    }

    /// Shared list picker for view/edit/delete.
    pub fn select_entry(&mut self, heading: &str, entries: &[DiaryEntry]) -> Result<Option<usize>> {
        if entries.is_empty() {
            return Ok(None);
        }
        let mut selected_index = 0;

        loop {
            self.terminal.draw(|f| {
                let chunks = chunks(
                    f.area(),
                    &[
                        Constraint::Length(3),
                        Constraint::Min(10),
                        Constraint::Length(3),
                    ],
                );
                f.render_widget(title(heading), chunks[0]);

                let items: Vec<ListItem> = entries.iter().map(entry_item).collect();
                let entries_list = List::new(items)
                    .block(Block::default().borders(Borders::ALL).title("Entries"))
                    .highlight_style(Style::default().add_modifier(Modifier::BOLD))
                    .highlight_symbol("> ");
                f.render_stateful_widget(
                    entries_list,
                    chunks[1],
                    &mut ListState::default().with_selected(Some(selected_index)),
                );
                f.render_widget(
                    instructions("Up/Down: Navigate, Enter: Select, Esc: Back"),
                    chunks[2],
                );
            })?;

            match read_key()? {
                Some(KeyCode::Up) => selected_index = selected_index.saturating_sub(1),
                Some(KeyCode::Down) => {
                    if selected_index < entries.len() - 1 {
                        selected_index += 1;
                    }
                }
                Some(KeyCode::Enter) => return Ok(Some(selected_index)),
                Some(KeyCode::Esc) => return Ok(None),
                _ => {}
            }
        }
    }

    pub fn view_entries(&mut self, diary_state: &DiaryState) -> Result<()> {
        let entries = diary_state.get_entries();
        while let Some(index) = self.select_entry("View Entries", entries)? {
            self.view_full_entry(&entries[index])?;
        }
        Ok(())
    }

    fn view_full_entry(&mut self, entry: &DiaryEntry) -> Result<()> {
        self.terminal.draw(|f| {
            let chunks = chunks(
                f.area(),
                &[
                    Constraint::Length(3),
                    Constraint::Length(1),
                    Constraint::Min(10),
                    Constraint::Length(3),
                ],
            );
            f.render_widget(
                title(format!("Entry from {}", entry.date.format("%Y-%m-%d"))),
                chunks[0],
            );

            let photo = match &entry.photo {
                Some(bytes) => format!("photo attached ({} bytes)", bytes.len()),
                None => "no photo".to_string(),
            };
            f.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::styled(entry.mood.title(), Style::default().fg(entry.mood.color())),
                    Span::raw(format!(" · {}", photo)),
                ]))
                .alignment(Alignment::Center),
                chunks[1],
            );

            let content = Paragraph::new(entry.content.clone())
                .wrap(Wrap { trim: false })
                .block(Block::default().borders(Borders::ALL).title("Content"));
            f.render_widget(content, chunks[2]);
            f.render_widget(instructions("Any key: Back"), chunks[3]);
        })?;

        while read_key()?.is_none() {}
        Ok(())
    }

    pub fn confirm(&mut self, question: &str) -> Result<bool> {
        self.terminal.draw(|f| {
            let chunks = chunks(
                f.area(),
                &[
                    Constraint::Length(3),
                    Constraint::Length(3),
                    Constraint::Min(1),
                ],
            );
            f.render_widget(title("Are you sure?"), chunks[0]);
            f.render_widget(
                Paragraph::new(question)
                    .alignment(Alignment::Center)
                    .block(Block::default().borders(Borders::ALL)),
                chunks[1],
            );
            f.render_widget(instructions("y: Yes, n/Esc: No"), chunks[2]);
        })?;

        loop {
            match read_key()? {
                Some(KeyCode::Char('y')) => return Ok(true),
                Some(KeyCode::Char('n')) | Some(KeyCode::Esc) => return Ok(false),
                _ => {}
            }
        }
    }

    /// One card per month, newest first; Left/Right flips between cards.
    pub fn view_clovers(&mut self, buckets: &[MonthBucket]) -> Result<()> {
        if buckets.is_empty() {
            return Ok(());
        }
        let mut page = 0;

        loop {
            let bucket = buckets[page];
            let color = clover_color(bucket.opacity());
            let rows: Vec<Line> = (0..bucket.tokens())
                .collect::<Vec<_>>()
                .chunks(CLOVERS_PER_ROW)
                .map(|row| {
                    Line::from(Span::styled(
                        vec![CLOVER; row.len()].join("  "),
                        Style::default().fg(color),
                    ))
                })
                .collect();

            self.terminal.draw(|f| {
                let chunks = chunks(
                    f.area(),
                    &[
                        Constraint::Length(3),
                        Constraint::Length(1),
                        Constraint::Min(8),
                        Constraint::Length(3),
                    ],
                );
                f.render_widget(title("My Clovers"), chunks[0]);
                f.render_widget(
                    Paragraph::new(format!("{} / {}", page + 1, buckets.len()))
                        .alignment(Alignment::Center),
                    chunks[1],
                );
                let card = Paragraph::new(rows)
                    .alignment(Alignment::Center)
                    .block(Block::default().borders(Borders::ALL).title(format!(
                        "{}  ({})",
                        bucket.year_month.label(),
                        bucket.count
                    )));
                f.render_widget(card, chunks[2]);
                f.render_widget(instructions("Left/Right: Month, Esc: Back"), chunks[3]);
            })?;

            match read_key()? {
                Some(KeyCode::Left) => page = page.saturating_sub(1),
                Some(KeyCode::Right) => {
                    if page < buckets.len() - 1 {
                        page += 1;
                    }
                }
                Some(KeyCode::Esc) => return Ok(()),
                _ => {}
            }
        }
    }

    fn new_passcode(&mut self) -> Result<Option<String>> {
        let mut hint: Option<&str> = None;
        loop {
            let first = self.prompt("Set Passcode", "New passcode (4 digits)", "", true, hint)?;
            let Some(first) = first else {
                return Ok(None);
            };
            if !validate_passcode(&first) {
                hint = Some("Use exactly 4 digits.");
                continue;
            }
            let second = self.prompt("Set Passcode", "Repeat passcode", "", true, None)?;
            let Some(second) = second else {
                return Ok(None);
            };
            if first == second {
                return Ok(Some(first));
            }
            hint = Some("Passcodes did not match.");
        }
    }

    pub fn settings(&mut self, preferences: &mut PreferencesStore) -> Result<()> {
        let mut notice: Option<String> = None;

        loop {
            let nickname = preferences.nickname().unwrap_or("-").to_string();
            let locked = preferences.is_locked();
            let shown_notice = notice.take();

            self.terminal.draw(|f| {
                let chunks = chunks(
                    f.area(),
                    &[
                        Constraint::Length(3),
                        Constraint::Min(4),
                        Constraint::Length(1),
                        Constraint::Length(3),
                    ],
                );
                f.render_widget(title("Settings"), chunks[0]);
                let body = vec![
                    Line::from(format!("Nickname: {}", nickname)),
                    Line::from(format!(
                        "Passcode lock: {}",
                        if locked { "on" } else { "off" }
                    )),
                    Line::from(format!("Version: {}", env!("CARGO_PKG_VERSION"))),
                ];
                f.render_widget(
                    Paragraph::new(body).block(Block::default().borders(Borders::ALL)),
                    chunks[1],
                );
                if let Some(message) = shown_notice {
                    f.render_widget(
                        Paragraph::new(message)
                            .style(Style::default().fg(Color::Magenta))
                            .alignment(Alignment::Center),
                        chunks[2],
                    );
                }
                let keys = if locked {
                    "n: Nickname, p: Turn lock off, c: Change passcode, Esc: Back"
                } else {
                    "n: Nickname, p: Turn lock on, Esc: Back"
                };
                f.render_widget(instructions(keys), chunks[3]);
            })?;

            match read_key()? {
                Some(KeyCode::Char('n')) => {
                    let current = preferences.nickname().unwrap_or("").to_string();
                    if let Some(name) =
                        self.prompt("Change Nickname", "Nickname", &current, false, None)?
                    {
                        notice = Some(match preferences.set_nickname(&name) {
                            Ok(()) => "Nickname saved.".to_string(),
                            Err(e) => e.to_string(),
                        });
                    }
                }
                Some(KeyCode::Char('p')) if locked => {
                    notice = Some(match preferences.clear_passcode() {
                        Ok(()) => "Passcode lock turned off.".to_string(),
                        Err(e) => e.to_string(),
                    });
                }
                Some(KeyCode::Char('p')) | Some(KeyCode::Char('c')) => {
                    if let Some(code) = self.new_passcode()? {
                        notice = Some(match preferences.set_passcode(&code) {
                            Ok(()) => "Passcode saved.".to_string(),
                            Err(e) => e.to_string(),
                        });
                    }
                }
                Some(KeyCode::Esc) => return Ok(()),
                _ => {}
            }
        }
    }
}

impl Drop for UI {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            log::error!("failed to leave raw mode: {}", e);
        }
        if let Err(e) = stdout().execute(LeaveAlternateScreen) {
            log::error!("failed to leave alternate screen: {}", e);
        }
    }
}
