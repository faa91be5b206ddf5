//! Single-line text field with a cursor and a placeholder.
//!
//! Cursor positions are byte offsets that always sit on a char boundary.

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::tui::theme;

#[derive(Debug, Clone, Default)]
pub struct SearchField {
    content: String,
    cursor: usize,
    placeholder: String,
}

impl SearchField {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            content: String::new(),
            cursor: 0,
            placeholder: placeholder.into(),
        }
    }

    pub fn insert_char(&mut self, c: char) {
        self.content.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Remove the char before the cursor. Returns `false` at the start.
    pub fn backspace(&mut self) -> bool {
        match self.prev_boundary() {
            Some(prev) => {
                self.content.drain(prev..self.cursor);
                self.cursor = prev;
                true
            }
            None => false,
        }
    }

    pub fn delete(&mut self) -> bool {
        match self.next_boundary() {
            Some(next) => {
                self.content.drain(self.cursor..next);
                true
            }
            None => false,
        }
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.cursor = prev;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.cursor = next;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.content.len();
    }

    /// Replace the whole text and park the cursor at the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.content = text.into();
        self.cursor = self.content.len();
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn text(&self) -> &str {
        &self.content
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.content[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.content[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
    }

    /// Render as a line: prompt, text with a block cursor when focused, or
    /// the placeholder when empty.
    pub fn to_line(&self, prompt: &str, focused: bool) -> Line<'static> {
        let mut spans = vec![Span::styled(prompt.to_string(), theme::key_hint())];

        if self.content.is_empty() {
            if focused {
                spans.push(Span::styled(" ", cursor_style()));
            }
            spans.push(Span::styled(self.placeholder.clone(), theme::dim()));
            return Line::from(spans);
        }

        if !focused {
            spans.push(Span::raw(self.content.clone()));
            return Line::from(spans);
        }

        let before = &self.content[..self.cursor];
        let (under, after) = match self.next_boundary() {
            Some(next) => (&self.content[self.cursor..next], &self.content[next..]),
            None => (" ", ""),
        };
        spans.push(Span::raw(before.to_string()));
        spans.push(Span::styled(under.to_string(), cursor_style()));
        spans.push(Span::raw(after.to_string()));
        Line::from(spans)
    }
}

fn cursor_style() -> Style {
    Style::default().add_modifier(Modifier::REVERSED)
}
