use std::mem;
use std::rc::Rc;

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::catalog::{Catalog, RemoveOutcome};
use crate::models::Book;
use crate::users::{RecoveryAction, RecoveryStep, Registration, UserDirectory};

use super::forms::{
    BookField, BookForm, ConfirmBookRemove, FindUserPrompt, RecoveryDialog, UserField, UserForm,
};
use super::helpers::{book_row, centered_rect, surface_error};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;

/// Fine-grained modes layered over the ranked list.
enum Mode {
    Normal,
    AddingBook(BookForm),
    ConfirmRemove(ConfirmBookRemove),
    RegisteringUser(UserForm),
    Recovering(RecoveryDialog),
    FindingUser(FindUserPrompt),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
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
    catalog: Catalog,
    users: UserDirectory,
    /// Snapshot of the ranking, refreshed after every catalog mutation.
    books: Vec<Rc<Book>>,
    selected: usize,
    show_top: bool,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(catalog: Catalog, users: UserDirectory) -> Self {
        let books = catalog.list_all_descending();
        Self {
            catalog,
            users,
            books,
            selected: 0,
            show_top: true,
            mode: Mode::Normal,
            status: None,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn users(&self) -> &UserDirectory {
        &self.users
    }

    /// Feed one key press through the active mode. Returns `true` when the
    /// user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::AddingBook(form) => self.handle_add_book(code, form)?,
            Mode::ConfirmRemove(confirm) => self.handle_confirm_remove(code, confirm)?,
            Mode::RegisteringUser(form) => self.handle_register_user(code, form),
            Mode::Recovering(dialog) => self.handle_recovery(code, dialog),
            Mode::FindingUser(prompt) => self.handle_find_user(code, prompt),
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => *exit = true,
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-10),
            KeyCode::PageDown => self.move_selection(10),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = self.books.len().saturating_sub(1),
            KeyCode::Char('t') | KeyCode::Char('T') => self.show_top = !self.show_top,
            KeyCode::Char('+') | KeyCode::Char('a') => {
                self.clear_status();
                return Mode::AddingBook(BookForm::default());
            }
            KeyCode::Char('-') | KeyCode::Char('d') => {
                if let Some(book) = self.current_book().cloned() {
                    self.clear_status();
                    return Mode::ConfirmRemove(ConfirmBookRemove { book });
                }
                self.set_status("No book selected to remove.", StatusKind::Error);
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.clear_status();
                return Mode::RegisteringUser(UserForm::default());
            }
            KeyCode::Char('f') | KeyCode::Char('F') => {
                self.clear_status();
                return Mode::FindingUser(FindUserPrompt::default());
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_add_book(&mut self, code: KeyCode, mut form: BookForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Add book cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_new_book(&form) {
                Ok(()) => return Ok(Mode::Normal),
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Ok(Mode::AddingBook(form))
    }

    fn handle_confirm_remove(&mut self, code: KeyCode, confirm: ConfirmBookRemove) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Removal cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.perform_remove(&confirm.book)?;
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmRemove(confirm)),
        }
    }

    fn handle_register_user(&mut self, code: KeyCode, mut form: UserForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Registration cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                match self
                    .users
                    .register_user(form.name.trim(), form.favorite.trim(), &self.catalog)
                {
                    Ok(Registration::Registered(user)) => {
                        self.set_status(format!("Registered {user}."), StatusKind::Info);
                        return Mode::Normal;
                    }
                    Ok(Registration::NeedsRecovery(recovery)) => {
                        self.set_status(
                            format!("'{}' is not in the catalog.", recovery.requested),
                            StatusKind::Error,
                        );
                        return Mode::Recovering(RecoveryDialog::new(recovery));
                    }
                    Err(err) => {
                        let message = err.to_string();
                        form.error = Some(message.clone());
                        self.set_status(message, StatusKind::Error);
                    }
                }
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::RegisteringUser(form)
    }

    fn handle_recovery(&mut self, code: KeyCode, mut dialog: RecoveryDialog) -> Mode {
        let action = match code {
            KeyCode::Esc => RecoveryAction::Cancel,
            KeyCode::Enter => RecoveryAction::Choose(dialog.input.clone()),
            KeyCode::Up => {
                dialog.move_highlight(-1);
                return Mode::Recovering(dialog);
            }
            KeyCode::Down => {
                dialog.move_highlight(1);
                return Mode::Recovering(dialog);
            }
            KeyCode::Backspace => {
                dialog.backspace();
                return Mode::Recovering(dialog);
            }
            KeyCode::Char(ch) => {
                if dialog.push_char(ch) {
                    dialog.error = None;
                }
                return Mode::Recovering(dialog);
            }
            _ => return Mode::Recovering(dialog),
        };

        let RecoveryDialog {
            recovery,
            input,
            highlighted,
            ..
        } = dialog;
        match self.users.resolve(recovery, action, &self.catalog) {
            RecoveryStep::Registered(user) => {
                self.set_status(format!("Registered {user}."), StatusKind::Info);
                Mode::Normal
            }
            RecoveryStep::Cancelled => {
                self.set_status("Registration cancelled.", StatusKind::Info);
                Mode::Normal
            }
            RecoveryStep::Retry { recovery, reason } => {
                let message = format!("{reason}. Try again.");
                self.set_status(message.clone(), StatusKind::Error);
                Mode::Recovering(RecoveryDialog {
                    recovery,
                    input,
                    highlighted,
                    error: Some(message),
                })
            }
        }
    }

    fn handle_find_user(&mut self, code: KeyCode, mut prompt: FindUserPrompt) -> Mode {
        match code {
            KeyCode::Esc => return Mode::Normal,
            KeyCode::Backspace => {
                prompt.query.pop();
                prompt.result = None;
            }
            KeyCode::Enter => {
                let name = prompt.query.trim();
                prompt.result = Some(match self.users.find_user(name) {
                    Some(user) => format!("User: {}, favorite book: {}", user.name, user.favorite_title),
                    None => format!("User '{name}' not found."),
                });
            }
            KeyCode::Char(ch) if !ch.is_control() => {
                prompt.query.push(ch);
                prompt.result = None;
            }
            _ => {}
        }
        Mode::FindingUser(prompt)
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

        if self.show_top {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
                .split(content_area);
            self.draw_ranking(frame, columns[0]);
            self.draw_recommended(frame, columns[1]);
        } else {
            self.draw_ranking(frame, content_area);
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::AddingBook(form) => self.draw_book_form(frame, area, form),
            Mode::ConfirmRemove(confirm) => self.draw_confirm_remove(frame, area, confirm),
            Mode::RegisteringUser(form) => self.draw_user_form(frame, area, form),
            Mode::Recovering(dialog) => self.draw_recovery(frame, area, dialog),
            Mode::FindingUser(prompt) => self.draw_find_user(frame, area, prompt),
            Mode::Normal => {}
        }
    }

    fn draw_ranking(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(format!("Books by rating ({})", self.books.len()))
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.books.is_empty() {
            let empty = Paragraph::new("The catalog is empty. Press + to add a book.")
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(empty, inner);
            return;
        }

        // Keep the selection visible by scrolling the window with it.
        let visible = inner.height.max(1) as usize;
        let first = self.selected.saturating_sub(visible - 1);
        let lines: Vec<Line> = self
            .books
            .iter()
            .enumerate()
            .skip(first)
            .take(visible)
            .map(|(idx, book)| book_row(idx + 1, book, idx == self.selected))
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn draw_recommended(&self, frame: &mut Frame, area: Rect) {
        let count = self.catalog.config().recommended;
        let block = Block::default()
            .title(format!("Top {count} recommended"))
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines: Vec<Line> = self
            .catalog
            .top_recommended(count)
            .iter()
            .enumerate()
            .map(|(idx, book)| book_row(idx + 1, book, false))
            .collect();
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
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

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let keys: &[(&str, &str)] = match &self.mode {
            Mode::Normal => &[
                ("[↑↓]", " Navigate   "),
                ("[+]", " Add   "),
                ("[-]", " Remove   "),
                ("[T]", " Top list   "),
                ("[R]", " Register user   "),
                ("[F]", " Find user   "),
                ("[Q]", " Quit"),
            ],
            Mode::ConfirmRemove(_) => &[("[Y]", " Remove   "), ("[N/Esc]", " Keep")],
            Mode::Recovering(_) => &[
                ("[↑↓]", " Pick   "),
                ("[Enter]", " Choose   "),
                ("[Esc]", " Cancel registration"),
            ],
            _ => &[("[Enter]", " Submit   "), ("[Esc]", " Close")],
        };

        let spans: Vec<Span> = keys
            .iter()
            .flat_map(|(key, label)| {
                [
                    Span::styled(key.to_string(), key_style),
                    Span::raw(label.to_string()),
                ]
            })
            .collect();
        Line::from(spans)
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, form: &BookForm) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Add Book").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let fields = [
            ("Title", BookField::Title),
            ("Author", BookField::Author),
            ("Rating", BookField::Rating),
            ("Reviews", BookField::Reviews),
        ];
        let mut lines: Vec<Line> = fields
            .iter()
            .map(|(name, field)| form.build_line(name, *field))
            .collect();
        lines.push(Line::from(""));
        lines.push(hint_or_error(
            form.error.as_deref(),
            "Enter to save • Tab to switch • Esc to cancel",
        ));
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        if let Some(row) = fields.iter().position(|(_, field)| *field == form.active) {
            let (name, field) = fields[row];
            let prefix = format!("{name}: ").len() as u16;
            frame.set_cursor_position((
                inner.x + prefix + form.value_len(field) as u16,
                inner.y + row as u16,
            ));
        }
    }

    fn draw_confirm_remove(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmBookRemove) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Confirm Removal").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!(
                "Remove '{}' by {} from the catalog?",
                confirm.book.title, confirm.book.author
            )),
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

    fn draw_user_form(&self, frame: &mut Frame, area: Rect, form: &UserForm) {
        let popup_area = centered_rect(60, 35, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Register User").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            form.build_line("Name", UserField::Name),
            form.build_line("Favorite book", UserField::Favorite),
            Line::from(""),
            hint_or_error(
                form.error.as_deref(),
                "Enter to register • Tab to switch • Esc to cancel",
            ),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let (prefix, row) = match form.active {
            UserField::Name => ("Name: ".len(), 0),
            UserField::Favorite => ("Favorite book: ".len(), 1),
        };
        frame.set_cursor_position((
            inner.x + (prefix + form.value_len(form.active)) as u16,
            inner.y + row,
        ));
    }

    fn draw_recovery(&self, frame: &mut Frame, area: Rect, dialog: &RecoveryDialog) {
        let popup_area = centered_rect(70, 60, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Favorite Book Not Found")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let recovery = &dialog.recovery;
        let mut lines = vec![
            Line::from(format!(
                "'{}' is not in the catalog. Pick one of our recommendations for {}:",
                recovery.requested, recovery.name
            )),
            Line::from(""),
        ];
        if recovery.recommendations.is_empty() {
            lines.push(Line::from(Span::styled(
                "No books available.",
                Style::default().fg(Color::DarkGray),
            )));
        }
        lines.extend(
            recovery
                .recommendations
                .iter()
                .enumerate()
                .map(|(idx, book)| book_row(idx + 1, book, dialog.highlighted == Some(idx))),
        );
        lines.push(Line::from(""));
        let input_row = lines.len() as u16;
        lines.push(Line::from(format!("Title: {}", dialog.input)));
        lines.push(hint_or_error(
            dialog.error.as_deref(),
            "Enter to choose • Esc to cancel registration",
        ));
        frame.render_widget(Paragraph::new(lines), inner);

        frame.set_cursor_position((
            inner.x + "Title: ".len() as u16 + dialog.input.chars().count() as u16,
            inner.y + input_row,
        ));
    }

    fn draw_find_user(&self, frame: &mut Frame, area: Rect, prompt: &FindUserPrompt) {
        let popup_area = centered_rect(60, 25, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Find User").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![Line::from(format!("Name: {}", prompt.query))];
        if let Some(result) = &prompt.result {
            lines.push(Line::from(""));
            lines.push(Line::from(result.clone()));
        }
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
        frame.set_cursor_position((
            inner.x + "Name: ".len() as u16 + prompt.query.chars().count() as u16,
            inner.y,
        ));
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

    fn save_new_book(&mut self, form: &BookForm) -> Result<()> {
        let (title, author, rating, reviews) = form.parse_inputs()?;
        let book = self
            .catalog
            .add_book(&title, &author, rating, reviews)
            .context("failed to add book")?;
        self.reload_books(Some(&book));
        self.set_status(format!("Added '{}'.", book.title), StatusKind::Info);
        Ok(())
    }

    /// Remove the highlighted record itself, not whichever record currently
    /// answers lookups for its title.
    fn perform_remove(&mut self, book: &Rc<Book>) -> Result<()> {
        let title = &book.title;
        match self.catalog.remove_record(book) {
            RemoveOutcome::Removed(_) => {
                self.reload_books(None);
                self.set_status(format!("Removed '{title}'."), StatusKind::Info);
            }
            RemoveOutcome::NotFound => {
                self.set_status(format!("Book '{title}' not found."), StatusKind::Error);
            }
        }
        self.catalog
            .check_consistency()
            .context("catalog diverged after removal")
    }

    fn reload_books(&mut self, focus: Option<&Rc<Book>>) {
        self.books = self.catalog.list_all_descending();
        if let Some(book) = focus {
            if let Some(idx) = self.books.iter().position(|b| Rc::ptr_eq(b, book)) {
                self.selected = idx;
                return;
            }
        }
        if self.selected >= self.books.len() {
            self.selected = self.books.len().saturating_sub(1);
        }
    }

    fn current_book(&self) -> Option<&Rc<Book>> {
        self.books.get(self.selected)
    }

    fn move_selection(&mut self, offset: isize) {
        if self.books.is_empty() {
            return;
        }
        let last = self.books.len() as isize - 1;
        self.selected = (self.selected as isize + offset).clamp(0, last) as usize;
    }
}

/// Either the form's validation error in red or the usage hint in gray.
fn hint_or_error(error: Option<&str>, hint: &'static str) -> Line<'static> {
    match error {
        Some(error) => Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )),
        None => Line::from(Span::styled(hint, Style::default().fg(Color::Gray))),
    }
}
