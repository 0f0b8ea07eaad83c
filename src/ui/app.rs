use std::mem;
use std::path::PathBuf;

use anyhow::Result;
use crossterm::event::KeyCode;
use open::that as open_path;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use rusqlite::Connection;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::db::{
    create_songbook, delete_songbook, fetch_songbooks, fetch_songs_for_artist,
    fetch_tracks_for_song, update_songbook,
};
use crate::export::export_tracks;
use crate::models::Songbook;

use super::forms::{ConfirmSongbookDelete, SongbookField, SongbookForm};
use super::helpers::{centered_rect, move_index, surface_error};
use super::screens::{page_caption, ArtistSearchScreen, SongSearchScreen, SongbookScreen};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows skipped by PageUp/PageDown in the songbook detail.
const PAGE_JUMP: isize = 10;

/// High-level navigation states.
enum Screen {
    Songbooks,
    Songbook(SongbookScreen),
    Songs(SongSearchScreen),
    Artists(ArtistSearchScreen),
}

/// Fine-grained modes scoped to the current screen.
enum Mode {
    Normal,
    AddingSongbook(SongbookForm),
    EditingSongbook { id: i64, form: SongbookForm },
    ConfirmSongbookDelete(ConfirmSongbookDelete),
    Searching(SearchState),
}

/// Which filter the inline search edits.
#[derive(Copy, Clone, PartialEq, Eq)]
enum SearchTarget {
    SongTitle,
    SongArtist,
    ArtistName,
}

impl SearchTarget {
    fn prompt(self) -> &'static str {
        match self {
            SearchTarget::SongTitle => "Title: ",
            SearchTarget::SongArtist => "Artist: ",
            SearchTarget::ArtistName => "Name: ",
        }
    }
}

/// State for an active inline search.
struct SearchState {
    target: SearchTarget,
    query: String,
}

/// Outcome of a keystroke inside a modal form.
enum FormAction {
    Cancel,
    Submit,
    Continue,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    conn: Connection,
    export_dir: PathBuf,
    songbooks: Vec<Songbook>,
    selected: usize,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
    last_export: Option<PathBuf>,
}

impl App {
    pub fn new(conn: Connection, config: &AppConfig, songbooks: Vec<Songbook>) -> Self {
        Self {
            conn,
            export_dir: config.export_dir.clone(),
            songbooks,
            selected: 0,
            screen: Screen::Songbooks,
            mode: Mode::Normal,
            status: None,
            last_export: None,
        }
    }

    /// Feed one key press through the state machine. Returns `true` once the
    /// user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingSongbook(form) => self.handle_add_songbook(code, form)?,
            Mode::EditingSongbook { id, form } => self.handle_edit_songbook(code, id, form)?,
            Mode::ConfirmSongbookDelete(confirm) => {
                self.handle_confirm_songbook_delete(code, confirm)?
            }
            Mode::Searching(state) => self.handle_search(code, state)?,
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match self.screen {
            Screen::Songbooks => self.handle_songbooks_key(code, exit),
            Screen::Songbook(_) => self.handle_songbook_key(code, exit),
            Screen::Songs(_) => self.handle_songs_key(code, exit),
            Screen::Artists(_) => self.handle_artists_key(code, exit),
        }
    }

    fn handle_songbooks_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => *exit = true,
            KeyCode::Up => self.selected = move_index(self.selected, self.songbooks.len(), -1),
            KeyCode::Down => self.selected = move_index(self.selected, self.songbooks.len(), 1),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = self.songbooks.len().saturating_sub(1),
            KeyCode::Enter => {
                if let Some(songbook) = self.current_songbook().cloned() {
                    self.open_songbook(songbook)?;
                }
            }
            KeyCode::Char('+') => {
                self.clear_status();
                return Ok(Mode::AddingSongbook(SongbookForm::default()));
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                if let Some(songbook) = self.current_songbook() {
                    return Ok(Mode::EditingSongbook {
                        id: songbook.id,
                        form: SongbookForm::from_songbook(songbook),
                    });
                }
                self.set_status("No songbook selected to edit.", StatusKind::Error);
            }
            KeyCode::Char('-') => {
                if let Some(songbook) = self.current_songbook().cloned() {
                    return Ok(Mode::ConfirmSongbookDelete(songbook.into()));
                }
                self.set_status("No songbook selected to remove.", StatusKind::Error);
            }
            KeyCode::Char('x') | KeyCode::Char('X') => {
                if let Some(id) = self.current_songbook().map(|songbook| songbook.id) {
                    self.export_songbooks(&[id]);
                }
            }
            KeyCode::Char('A') => {
                let ids: Vec<i64> = self.songbooks.iter().map(|songbook| songbook.id).collect();
                self.export_songbooks(&ids);
            }
            KeyCode::Char('o') | KeyCode::Char('O') => self.open_last_export(),
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.clear_status();
                self.screen = Screen::Songs(SongSearchScreen::load(&self.conn)?);
            }
            KeyCode::Char('a') => {
                self.clear_status();
                self.screen = Screen::Artists(ArtistSearchScreen::load(&self.conn)?);
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_songbook_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        let mut back = false;
        let mut export = None;
        let mut open = false;
        let mut reload = None;

        if let Screen::Songbook(ref mut detail) = self.screen {
            match code {
                KeyCode::Char('q') => *exit = true,
                KeyCode::Esc | KeyCode::Backspace => back = true,
                KeyCode::Tab | KeyCode::BackTab => detail.cycle_view(),
                KeyCode::Up => detail.move_selection(-1),
                KeyCode::Down => detail.move_selection(1),
                KeyCode::PageUp => detail.move_selection(-PAGE_JUMP),
                KeyCode::PageDown => detail.move_selection(PAGE_JUMP),
                KeyCode::Home => detail.select_first(),
                KeyCode::End => detail.select_last(),
                KeyCode::Char('x') | KeyCode::Char('X') => export = Some(detail.songbook.id),
                KeyCode::Char('o') | KeyCode::Char('O') => open = true,
                KeyCode::Char('r') | KeyCode::Char('R') => {
                    reload = Some((detail.songbook.clone(), detail.view))
                }
                _ => {}
            }
        }

        if back {
            self.clear_status();
            self.screen = Screen::Songbooks;
        } else if let Some(id) = export {
            self.export_songbooks(&[id]);
        } else if open {
            self.open_last_export();
        } else if let Some((songbook, view)) = reload {
            let mut detail = SongbookScreen::load(&self.conn, songbook)?;
            while detail.view != view {
                detail.cycle_view();
            }
            self.screen = Screen::Songbook(detail);
            self.set_status("Reloaded songbook.", StatusKind::Info);
        }

        Ok(Mode::Normal)
    }

    fn handle_songs_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        let mut back = false;
        let mut status_to_set = None;

        if let Screen::Songs(ref mut songs) = self.screen {
            match code {
                KeyCode::Char('q') => *exit = true,
                KeyCode::Esc => back = true,
                KeyCode::Up => songs.move_selection(-1),
                KeyCode::Down => songs.move_selection(1),
                KeyCode::Right | KeyCode::Char('n') | KeyCode::PageDown => {
                    if !songs.next_page(&self.conn)? {
                        status_to_set = Some(("Already on the last page.".to_string(), StatusKind::Info));
                    }
                }
                KeyCode::Left | KeyCode::Char('p') | KeyCode::PageUp => {
                    if !songs.prev_page(&self.conn)? {
                        status_to_set = Some(("Already on the first page.".to_string(), StatusKind::Info));
                    }
                }
                KeyCode::Char('f') | KeyCode::Char('/') => {
                    return Ok(Mode::Searching(SearchState {
                        target: SearchTarget::SongTitle,
                        query: songs.filter.title_contains.clone(),
                    }));
                }
                KeyCode::Char('a') => {
                    return Ok(Mode::Searching(SearchState {
                        target: SearchTarget::SongArtist,
                        query: songs.filter.artist_contains.clone(),
                    }));
                }
                KeyCode::Enter => {
                    if let Some(entry) = songs.current() {
                        let tracks = fetch_tracks_for_song(&self.conn, entry.song.id)?;
                        status_to_set = Some((
                            format!("{} appears on {} track(s).", entry.label(), tracks.len()),
                            StatusKind::Info,
                        ));
                    }
                }
                _ => {}
            }
        }

        if back {
            self.clear_status();
            self.screen = Screen::Songbooks;
        } else if let Some((text, kind)) = status_to_set {
            self.set_status(text, kind);
        }
        Ok(Mode::Normal)
    }

    fn handle_artists_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        let mut back = false;
        let mut status_to_set = None;

        if let Screen::Artists(ref mut artists) = self.screen {
            match code {
                KeyCode::Char('q') => *exit = true,
                KeyCode::Esc => back = true,
                KeyCode::Up => artists.move_selection(-1),
                KeyCode::Down => artists.move_selection(1),
                KeyCode::Right | KeyCode::Char('n') | KeyCode::PageDown => {
                    if !artists.next_page(&self.conn)? {
                        status_to_set = Some(("Already on the last page.".to_string(), StatusKind::Info));
                    }
                }
                KeyCode::Left | KeyCode::Char('p') | KeyCode::PageUp => {
                    if !artists.prev_page(&self.conn)? {
                        status_to_set = Some(("Already on the first page.".to_string(), StatusKind::Info));
                    }
                }
                KeyCode::Char('f') | KeyCode::Char('/') => {
                    return Ok(Mode::Searching(SearchState {
                        target: SearchTarget::ArtistName,
                        query: artists.query.clone(),
                    }));
                }
                KeyCode::Enter => {
                    if let Some(artist) = artists.page.items.get(artists.selected) {
                        let songs = fetch_songs_for_artist(&self.conn, artist.id)?;
                        status_to_set = Some((
                            format!("{} has {} song(s).", artist.full_name(), songs.len()),
                            StatusKind::Info,
                        ));
                    }
                }
                _ => {}
            }
        }

        if back {
            self.clear_status();
            self.screen = Screen::Songbooks;
        } else if let Some((text, kind)) = status_to_set {
            self.set_status(text, kind);
        }
        Ok(Mode::Normal)
    }

    fn handle_add_songbook(&mut self, code: KeyCode, mut form: SongbookForm) -> Result<Mode> {
        match edit_form(code, &mut form) {
            FormAction::Cancel => {
                self.set_status("Add songbook cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            FormAction::Submit => match self.save_new_songbook(&form) {
                Ok(()) => Ok(Mode::Normal),
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                    Ok(Mode::AddingSongbook(form))
                }
            },
            FormAction::Continue => Ok(Mode::AddingSongbook(form)),
        }
    }

    fn handle_edit_songbook(
        &mut self,
        code: KeyCode,
        id: i64,
        mut form: SongbookForm,
    ) -> Result<Mode> {
        match edit_form(code, &mut form) {
            FormAction::Cancel => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            FormAction::Submit => match self.save_existing_songbook(id, &form) {
                Ok(()) => Ok(Mode::Normal),
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                    Ok(Mode::EditingSongbook { id, form })
                }
            },
            FormAction::Continue => Ok(Mode::EditingSongbook { id, form }),
        }
    }

    fn handle_confirm_songbook_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmSongbookDelete,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                if let Err(err) = self.perform_delete(&confirm) {
                    self.set_status(surface_error(&err), StatusKind::Error);
                }
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmSongbookDelete(confirm)),
        }
    }

    /// Filters apply as the user types; Enter keeps them, Esc clears them.
    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                state.query.clear();
                self.apply_search(&state)?;
                return Ok(Mode::Normal);
            }
            KeyCode::Enter => return Ok(Mode::Normal),
            KeyCode::Backspace => {
                state.query.pop();
            }
            KeyCode::Char(ch) if !ch.is_control() => state.query.push(ch),
            _ => return Ok(Mode::Searching(state)),
        }
        self.apply_search(&state)?;
        Ok(Mode::Searching(state))
    }

    fn apply_search(&mut self, state: &SearchState) -> Result<()> {
        let query = state.query.trim();
        match (&mut self.screen, state.target) {
            (Screen::Songs(songs), SearchTarget::SongTitle) => {
                songs.set_title_filter(&self.conn, query)
            }
            (Screen::Songs(songs), SearchTarget::SongArtist) => {
                songs.set_artist_filter(&self.conn, query)
            }
            (Screen::Artists(artists), SearchTarget::ArtistName) => {
                artists.set_query(&self.conn, query)
            }
            _ => Ok(()),
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Songbooks => self.draw_songbook_list(frame, content_area),
            Screen::Songbook(detail) => self.draw_songbook_detail(frame, content_area, detail),
            Screen::Songs(songs) => self.draw_song_search(frame, content_area, songs),
            Screen::Artists(artists) => self.draw_artist_search(frame, content_area, artists),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::AddingSongbook(form) => self.draw_songbook_form(frame, area, "Add Songbook", form),
            Mode::EditingSongbook { form, .. } => {
                self.draw_songbook_form(frame, area, "Edit Songbook", form)
            }
            Mode::ConfirmSongbookDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Searching(state) => self.draw_search_bar(frame, area, state),
            Mode::Normal => {}
        }
    }

    fn draw_songbook_list(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Songbooks ({})", self.songbooks.len()));

        if self.songbooks.is_empty() {
            let message = Paragraph::new("No songbooks yet. Press '+' to add one.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = self
            .songbooks
            .iter()
            .map(|songbook| {
                let mut spans = vec![Span::raw(songbook.name.clone())];
                if let Some(description) = &songbook.description {
                    spans.push(Span::styled(
                        format!("  {description}"),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");
        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_songbook_detail(&self, frame: &mut Frame, area: Rect, detail: &SongbookScreen) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0)])
            .split(area);

        let mut header = vec![Line::from(Span::styled(
            detail.songbook.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        if let Some(description) = &detail.songbook.description {
            header.push(Line::from(Span::styled(
                description.clone(),
                Style::default().fg(Color::Gray),
            )));
        }
        header.push(Line::from(format!("{} distinct song(s)", detail.song_count())));
        let header = Paragraph::new(header)
            .block(Block::default().borders(Borders::BOTTOM))
            .wrap(Wrap { trim: true });
        frame.render_widget(header, chunks[0]);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(detail.view.title());
        let inner = block.inner(chunks[1]);
        frame.render_widget(block, chunks[1]);

        let lines = detail.display_lines();
        if lines.is_empty() {
            let message = Paragraph::new("This songbook has no tracks yet.")
                .alignment(Alignment::Center);
            frame.render_widget(message, inner);
            return;
        }

        let height = inner.height as usize;
        let offset = detail.scroll_offset(height);
        let visible: Vec<Line> = lines
            .into_iter()
            .enumerate()
            .skip(offset)
            .take(height)
            .map(|(idx, line)| {
                if idx == detail.selected {
                    Line::from(Span::styled(line, Style::default().fg(Color::Yellow)))
                } else {
                    Line::from(line)
                }
            })
            .collect();
        frame.render_widget(Paragraph::new(visible), inner);
    }

    fn draw_song_search(&self, frame: &mut Frame, area: Rect, songs: &SongSearchScreen) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let filters = Line::from(vec![
            Span::raw("Title: "),
            filter_span(&songs.filter.title_contains),
            Span::raw("   Artist: "),
            filter_span(&songs.filter.artist_contains),
            Span::styled(
                format!("   {}", page_caption(&songs.page)),
                Style::default().fg(Color::Gray),
            ),
        ]);
        let header = Paragraph::new(filters)
            .block(Block::default().borders(Borders::ALL).title("Song Search"));
        frame.render_widget(header, chunks[0]);

        let items: Vec<ListItem> = songs
            .page
            .items
            .iter()
            .map(|entry| ListItem::new(entry.label()))
            .collect();
        self.render_results(frame, chunks[1], items, songs.selected, "No songs match.");
    }

    fn draw_artist_search(&self, frame: &mut Frame, area: Rect, artists: &ArtistSearchScreen) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let filters = Line::from(vec![
            Span::raw("Name: "),
            filter_span(&artists.query),
            Span::styled(
                format!("   {}", page_caption(&artists.page)),
                Style::default().fg(Color::Gray),
            ),
        ]);
        let header = Paragraph::new(filters)
            .block(Block::default().borders(Borders::ALL).title("Artist Search"));
        frame.render_widget(header, chunks[0]);

        let items: Vec<ListItem> = artists
            .page
            .items
            .iter()
            .map(|artist| ListItem::new(artist.rev_name()))
            .collect();
        self.render_results(frame, chunks[1], items, artists.selected, "No artists match.");
    }

    fn render_results(
        &self,
        frame: &mut Frame,
        area: Rect,
        items: Vec<ListItem>,
        selected: usize,
        empty: &str,
    ) {
        let block = Block::default().borders(Borders::ALL);
        if items.is_empty() {
            let message = Paragraph::new(empty.to_string())
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("▶ ");
        let mut state = ListState::default();
        state.select(Some(selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let prompt = state.target.prompt();
        let block = Block::default().borders(Borders::ALL).title("Search");
        let paragraph = Paragraph::new(Span::raw(format!("{prompt}{}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + prompt.len() as u16 + state.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let keys: &[(&str, &str)] = match (&self.screen, &self.mode) {
            (_, Mode::Searching(_)) => &[
                ("[Type]", " Filter   "),
                ("[Enter]", " Keep   "),
                ("[Esc]", " Clear"),
            ],
            (Screen::Songbook(_), _) => &[
                ("[Tab]", " Switch View   "),
                ("[↑↓]", " Navigate   "),
                ("[PgUp/PgDn]", " Page   "),
                ("[x]", " Export   "),
                ("[o]", " Open Export   "),
                ("[r]", " Reload   "),
                ("[Esc]", " Back   "),
                ("[q]", " Quit"),
            ],
            (Screen::Songs(_), _) => &[
                ("[↑↓]", " Select   "),
                ("[←→]", " Page   "),
                ("[f]", " Title   "),
                ("[a]", " Artist   "),
                ("[Enter]", " Tracks   "),
                ("[Esc]", " Back   "),
                ("[q]", " Quit"),
            ],
            (Screen::Artists(_), _) => &[
                ("[↑↓]", " Select   "),
                ("[←→]", " Page   "),
                ("[f]", " Name   "),
                ("[Enter]", " Songs   "),
                ("[Esc]", " Back   "),
                ("[q]", " Quit"),
            ],
            (Screen::Songbooks, _) => &[
                ("[↑↓]", " Move   "),
                ("[Enter]", " Open   "),
                ("[+]", " Add   "),
                ("[-]", " Remove   "),
                ("[e]", " Edit   "),
                ("[x/A]", " Export One/All   "),
                ("[o]", " Open Export   "),
                ("[s]", " Songs   "),
                ("[a]", " Artists   "),
                ("[q]", " Quit"),
            ],
        };

        Line::from(
            keys.iter()
                .flat_map(|(key, label)| {
                    [
                        Span::styled(*key, key_style),
                        Span::raw(*label),
                    ]
                })
                .collect::<Vec<_>>(),
        )
    }

    fn draw_songbook_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &SongbookForm) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let name_line = form.build_line("Name", SongbookField::Name);
        let description_line = form.build_line("Description", SongbookField::Description);

        let mut lines = vec![name_line, description_line, Line::from("")];

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let (cursor_x, cursor_y) = match form.active {
            SongbookField::Name => (
                inner.x + "Name: ".len() as u16 + form.name.chars().count() as u16,
                inner.y,
            ),
            SongbookField::Description => (
                inner.x + "Description: ".len() as u16 + form.description.chars().count() as u16,
                inner.y + 1,
            ),
        };
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmSongbookDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Removal")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Remove songbook \"{}\"?", confirm.name)),
            Line::from("Songbooks that still hold albums cannot be removed."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    fn current_songbook(&self) -> Option<&Songbook> {
        self.songbooks.get(self.selected)
    }

    fn open_songbook(&mut self, songbook: Songbook) -> Result<()> {
        self.clear_status();
        self.screen = Screen::Songbook(SongbookScreen::load(&self.conn, songbook)?);
        Ok(())
    }

    fn save_new_songbook(&mut self, form: &SongbookForm) -> Result<()> {
        let (name, description) = form.parse_inputs()?;
        let songbook = create_songbook(&self.conn, &name, description.as_deref())?;
        self.reload_songbooks(Some(songbook.id))?;
        self.set_status(format!("Added songbook {}.", songbook.name), StatusKind::Info);
        Ok(())
    }

    fn save_existing_songbook(&mut self, id: i64, form: &SongbookForm) -> Result<()> {
        let (name, description) = form.parse_inputs()?;
        update_songbook(&self.conn, id, &name, description.as_deref())?;
        self.reload_songbooks(Some(id))?;
        self.set_status(format!("Updated songbook {name}."), StatusKind::Info);
        Ok(())
    }

    fn perform_delete(&mut self, confirm: &ConfirmSongbookDelete) -> Result<()> {
        delete_songbook(&self.conn, confirm.id)?;
        self.reload_songbooks(None)?;
        self.set_status(format!("Deleted songbook {}.", confirm.name), StatusKind::Info);
        Ok(())
    }

    fn reload_songbooks(&mut self, focus_id: Option<i64>) -> Result<()> {
        self.songbooks = fetch_songbooks(&self.conn)?;
        if let Some(idx) = focus_id
            .and_then(|id| self.songbooks.iter().position(|songbook| songbook.id == id))
        {
            self.selected = idx;
        } else {
            self.selected = move_index(self.selected, self.songbooks.len(), 0);
        }
        Ok(())
    }

    /// Export the given songbooks into the export directory and report where
    /// the file landed.
    fn export_songbooks(&mut self, ids: &[i64]) {
        let result = export_tracks(&self.conn, ids).and_then(|mut export| {
            let rows = export.row_count();
            export.write_into(&self.export_dir).map(|path| (path, rows))
        });

        match result {
            Ok((path, rows)) => {
                self.set_status(
                    format!("Exported {rows} track(s) to {}.", path.display()),
                    StatusKind::Info,
                );
                self.last_export = Some(path);
            }
            Err(err) => {
                warn!(error = %err, "export failed");
                self.set_status(format!("Export failed: {}", surface_error(&err)), StatusKind::Error);
            }
        }
    }

    fn open_last_export(&mut self) {
        let Some(path) = self.last_export.clone() else {
            self.set_status("Nothing exported yet. Press 'x' first.", StatusKind::Error);
            return;
        };
        match open_path(&path) {
            Ok(()) => {
                info!(path = %path.display(), "opened export");
                self.set_status(format!("Opened {}.", path.display()), StatusKind::Info);
            }
            Err(err) => self.set_status(
                format!("Failed to open {}: {err}", path.display()),
                StatusKind::Error,
            ),
        }
    }
}

/// Shared keystroke handling for the add and edit songbook forms.
fn edit_form(code: KeyCode, form: &mut SongbookForm) -> FormAction {
    match code {
        KeyCode::Esc => return FormAction::Cancel,
        KeyCode::Enter => return FormAction::Submit,
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => form.toggle_field(),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(ch) => {
            if form.push_char(ch) {
                form.error = None;
            }
        }
        _ => {}
    }
    FormAction::Continue
}

fn filter_span(value: &str) -> Span<'static> {
    if value.is_empty() {
        Span::styled("<any>", Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(value.to_string(), Style::default().fg(Color::Yellow))
    }
}
