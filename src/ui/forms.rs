use std::rc::Rc;

use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::Book;
use crate::users::Recovery;

/// Internal representation of the "add book" form fields.
#[derive(Default, Clone)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) rating: String,
    pub(crate) reviews: String,
    pub(crate) active: BookField,
    pub(crate) error: Option<String>,
}

/// Fields available within the book form.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum BookField {
    #[default]
    Title,
    Author,
    Rating,
    Reviews,
}

impl BookForm {
    /// Cycle focus forward across the four fields.
    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            BookField::Title => BookField::Author,
            BookField::Author => BookField::Rating,
            BookField::Rating => BookField::Reviews,
            BookField::Reviews => BookField::Title,
        };
    }

    /// Cycle focus backward.
    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            BookField::Title => BookField::Reviews,
            BookField::Author => BookField::Title,
            BookField::Rating => BookField::Author,
            BookField::Reviews => BookField::Rating,
        };
    }

    /// Append a character to the active field, validating allowed input.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        match self.active {
            BookField::Title | BookField::Author => {
                if ch.is_control() {
                    return false;
                }
                self.field_mut(self.active).push(ch);
                true
            }
            BookField::Rating => {
                if ch.is_ascii_digit() || (ch == '.' && !self.rating.contains('.')) {
                    self.rating.push(ch);
                    true
                } else {
                    false
                }
            }
            BookField::Reviews => {
                if ch.is_ascii_digit() {
                    self.reviews.push(ch);
                    true
                } else {
                    false
                }
            }
        }
    }

    pub(crate) fn backspace(&mut self) {
        self.field_mut(self.active).pop();
    }

    /// Parse the numeric fields. Text limits and the rating range are checked
    /// by the catalog itself.
    pub(crate) fn parse_inputs(&self) -> Result<(String, String, f64, u32)> {
        let rating_raw = self.rating.trim();
        if rating_raw.is_empty() {
            return Err(anyhow!("Rating is required."));
        }
        let rating = rating_raw
            .parse::<f64>()
            .map_err(|_| anyhow!("Rating must be a number between 0 and 5."))?;

        let reviews_raw = self.reviews.trim();
        let reviews = if reviews_raw.is_empty() {
            0
        } else {
            reviews_raw
                .parse::<u32>()
                .map_err(|_| anyhow!("Review count must be a whole number."))?
        };

        Ok((
            self.title.trim().to_string(),
            self.author.trim().to_string(),
            rating,
            reviews,
        ))
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field_name: &str, field: BookField) -> Line<'static> {
        field_line(field_name, self.field(field), self.active == field, "<required>")
    }

    /// Character count of the requested field.
    pub(crate) fn value_len(&self, field: BookField) -> usize {
        self.field(field).chars().count()
    }

    fn field(&self, field: BookField) -> &String {
        match field {
            BookField::Title => &self.title,
            BookField::Author => &self.author,
            BookField::Rating => &self.rating,
            BookField::Reviews => &self.reviews,
        }
    }

    fn field_mut(&mut self, field: BookField) -> &mut String {
        match field {
            BookField::Title => &mut self.title,
            BookField::Author => &mut self.author,
            BookField::Rating => &mut self.rating,
            BookField::Reviews => &mut self.reviews,
        }
    }
}

/// Form state for registering a reader.
#[derive(Default, Clone)]
pub(crate) struct UserForm {
    pub(crate) name: String,
    pub(crate) favorite: String,
    pub(crate) active: UserField,
    pub(crate) error: Option<String>,
}

#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum UserField {
    #[default]
    Name,
    Favorite,
}

impl UserForm {
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            UserField::Name => UserField::Favorite,
            UserField::Favorite => UserField::Name,
        };
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            UserField::Name => self.name.push(ch),
            UserField::Favorite => self.favorite.push(ch),
        }
        true
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            UserField::Name => {
                self.name.pop();
            }
            UserField::Favorite => {
                self.favorite.pop();
            }
        }
    }

    pub(crate) fn build_line(&self, field_name: &str, field: UserField) -> Line<'static> {
        let value = match field {
            UserField::Name => &self.name,
            UserField::Favorite => &self.favorite,
        };
        field_line(field_name, value, self.active == field, "<required>")
    }

    pub(crate) fn value_len(&self, field: UserField) -> usize {
        match field {
            UserField::Name => self.name.chars().count(),
            UserField::Favorite => self.favorite.chars().count(),
        }
    }
}

/// State for the "favorite not found" dialog. The recommendations come from
/// the pending [`Recovery`]; the input may be typed or filled from the list.
pub(crate) struct RecoveryDialog {
    pub(crate) recovery: Recovery,
    pub(crate) input: String,
    pub(crate) highlighted: Option<usize>,
    pub(crate) error: Option<String>,
}

impl RecoveryDialog {
    pub(crate) fn new(recovery: Recovery) -> Self {
        Self {
            recovery,
            input: String::new(),
            highlighted: None,
            error: None,
        }
    }

    /// Move the highlight through the recommendations and copy the
    /// highlighted title into the input.
    pub(crate) fn move_highlight(&mut self, offset: isize) {
        let len = self.recovery.recommendations.len();
        if len == 0 {
            return;
        }
        let next = match self.highlighted {
            None if offset < 0 => len - 1,
            None => 0,
            Some(current) => (current as isize + offset).clamp(0, len as isize - 1) as usize,
        };
        self.highlighted = Some(next);
        self.input = self.recovery.recommendations[next].title.clone();
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.input.push(ch);
        self.highlighted = None;
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.input.pop();
        self.highlighted = None;
    }
}

/// State for the user lookup prompt.
#[derive(Default)]
pub(crate) struct FindUserPrompt {
    pub(crate) query: String,
    pub(crate) result: Option<String>,
}

/// Confirmation state for removing the selected book. Holds the record
/// itself so a shadowed duplicate title removes the right one.
pub(crate) struct ConfirmBookRemove {
    pub(crate) book: Rc<Book>,
}

fn field_line(field_name: &str, value: &str, is_active: bool, placeholder: &str) -> Line<'static> {
    let display = if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    };

    let style = if is_active {
        Style::default().fg(Color::Yellow)
    } else if value.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(format!("{field_name}: ")),
        Span::styled(display, style),
    ])
}
