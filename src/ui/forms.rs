use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::Songbook;

/// Internal representation of the songbook form fields.
#[derive(Default, Clone)]
pub(crate) struct SongbookForm {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) active: SongbookField,
    pub(crate) error: Option<String>,
}

/// Fields available within the songbook form.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum SongbookField {
    #[default]
    Name,
    Description,
}

impl SongbookForm {
    /// Populate the form from an existing songbook when editing.
    pub(crate) fn from_songbook(songbook: &Songbook) -> Self {
        Self {
            name: songbook.name.clone(),
            description: songbook.description.clone().unwrap_or_default(),
            active: SongbookField::Name,
            error: None,
        }
    }

    /// Swap focus between the name and description fields.
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            SongbookField::Name => SongbookField::Description,
            SongbookField::Description => SongbookField::Name,
        };
    }

    /// Append a character to the active field. Control characters are
    /// rejected.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            SongbookField::Name => self.name.push(ch),
            SongbookField::Description => self.description.push(ch),
        }
        true
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            SongbookField::Name => {
                self.name.pop();
            }
            SongbookField::Description => {
                self.description.pop();
            }
        }
    }

    /// Validate the inputs and return values ready for persistence.
    pub(crate) fn parse_inputs(&self) -> Result<(String, Option<String>)> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(anyhow!("Songbook name is required."));
        }
        let description = self.description.trim();
        let description = (!description.is_empty()).then(|| description.to_string());
        Ok((name.to_string(), description))
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field_name: &str, field: SongbookField) -> Line<'static> {
        let (value, placeholder) = match field {
            SongbookField::Name => (&self.name, "<required>"),
            SongbookField::Description => (&self.description, "<optional>"),
        };
        let is_active = self.active == field;

        let display = if value.is_empty() {
            placeholder.to_string()
        } else {
            value.clone()
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
}

/// Pending confirmation before a songbook is removed.
#[derive(Clone)]
pub(crate) struct ConfirmSongbookDelete {
    pub(crate) id: i64,
    pub(crate) name: String,
}

impl From<Songbook> for ConfirmSongbookDelete {
    fn from(songbook: Songbook) -> Self {
        Self {
            id: songbook.id,
            name: songbook.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_goes_to_the_active_field() {
        let mut form = SongbookForm::default();
        for ch in "Friday".chars() {
            form.push_char(ch);
        }
        form.toggle_field();
        form.push_char('x');
        form.backspace();
        form.push_char('!');

        assert_eq!(form.name, "Friday");
        assert_eq!(form.description, "!");
        assert!(!form.push_char('\u{7}'));
    }

    #[test]
    fn blank_name_is_rejected_and_blank_description_dropped() {
        let mut form = SongbookForm::default();
        assert!(form.parse_inputs().is_err());

        form.name = "  Friday ".to_string();
        form.description = "   ".to_string();
        assert_eq!(form.parse_inputs().unwrap(), ("Friday".to_string(), None));
    }
}
