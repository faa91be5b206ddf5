//! Item form: modal for adding a product or service to the catalog, or
//! editing an existing one.
//!
//! `Tab` moves between fields, `Space`/`←`/`→` change the type and
//! category, `Enter` saves, `Esc` cancels. The last category entry,
//! "+ New", takes a name; `Enter` on it creates the category. Saving runs
//! on a tokio task and reports back as [`AppEvent::ItemCreated`],
//! [`AppEvent::ItemUpdated`] or [`AppEvent::ItemCreateFailed`].

use std::str::FromStr;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use rust_decimal::Decimal;

use crate::core::catalog::{CatalogItem, Category, ItemDraft, ItemType};
use crate::tui::events::AppEvent;
use crate::tui::layout::centered_rect;
use crate::tui::services::Services;
use crate::tui::theme;
use crate::tui::widgets::search_field::SearchField;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormField {
    Name,
    Description,
    Type,
    Category,
    Price,
}

const FORM_FIELDS: [FormField; 5] = [
    FormField::Name,
    FormField::Description,
    FormField::Type,
    FormField::Category,
    FormField::Price,
];

/// Category field value. Existing categories are held by id so a reload of
/// the category list can't shift the choice.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CategoryChoice {
    None,
    Existing(String),
    New,
}

impl CategoryChoice {
    /// Step through None, each category in order, then New, wrapping.
    fn cycle(&self, categories: &[Category], forward: bool) -> Self {
        let len = categories.len() + 2;
        let current = match self {
            Self::None => 0,
            Self::Existing(id) => categories
                .iter()
                .position(|c| &c.id == id)
                .map(|i| i + 1)
                .unwrap_or(0),
            Self::New => len - 1,
        };
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        match next {
            0 => Self::None,
            i if i == len - 1 => Self::New,
            i => Self::Existing(categories[i - 1].id.clone()),
        }
    }
}

pub struct NewItemForm {
    open: bool,
    focus: usize,
    name: SearchField,
    description: SearchField,
    kind: ItemType,
    category: CategoryChoice,
    /// Name typed for the "+ New" category entry.
    new_category: SearchField,
    price: SearchField,
    /// Id of the item being edited; `None` when creating.
    editing: Option<String>,
    error: Option<String>,
    saving: bool,
}

impl Default for NewItemForm {
    fn default() -> Self {
        Self::new()
    }
}

impl NewItemForm {
    pub fn new() -> Self {
        Self {
            open: false,
            focus: 0,
            name: SearchField::new("(required)"),
            description: SearchField::new("(optional)"),
            kind: ItemType::Product,
            category: CategoryChoice::None,
            new_category: SearchField::new("category name"),
            price: SearchField::new("(no sale price)"),
            editing: None,
            error: None,
            saving: false,
        }
    }

    pub fn open(&mut self) {
        *self = Self::new();
        self.open = true;
    }

    /// Open pre-filled with `item`; saving updates it in place.
    pub fn open_edit(&mut self, item: &CatalogItem) {
        self.open();
        self.editing = Some(item.id.clone());
        self.name.set_text(item.name.clone());
        if let Some(description) = &item.description {
            self.description.set_text(description.clone());
        }
        self.kind = item.kind;
        self.category = match &item.category_id {
            Some(id) => CategoryChoice::Existing(id.clone()),
            None => CategoryChoice::None,
        };
        if let Some(price) = item.display_price() {
            self.price.set_text(price.to_string());
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Select a category that was just created from this form.
    pub fn on_category_created(&mut self, category: &Category) {
        self.saving = false;
        if !self.open {
            return;
        }
        self.error = None;
        self.category = CategoryChoice::Existing(category.id.clone());
        self.new_category.clear();
    }

    pub fn close(&mut self) {
        self.open = false;
        self.saving = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The backend rejected the item; keep the form open for another try.
    pub fn on_save_failed(&mut self, message: String) {
        self.saving = false;
        self.error = Some(message);
    }

    /// Build a validated draft from the field contents.
    pub fn draft(&self, categories: &[Category]) -> Result<ItemDraft, String> {
        let price = match self.price.text().trim() {
            "" => None,
            text => Some(
                Decimal::from_str(text).map_err(|_| format!("Price must be a number, got '{text}'."))?,
            ),
        };

        let mut draft = ItemDraft::new(self.name.text(), self.kind);
        draft.description = Some(self.description.text().to_string());
        draft.category_id = match &self.category {
            CategoryChoice::None => None,
            CategoryChoice::Existing(id) => {
                if !categories.iter().any(|c| &c.id == id) {
                    log::warn!("Category {id} is not in the loaded list");
                }
                Some(id.clone())
            }
            CategoryChoice::New if self.new_category.text().trim().is_empty() => None,
            CategoryChoice::New => {
                return Err("Press Enter on Category to create it first.".to_string());
            }
        };
        draft.sale_price_enabled = price.is_some();
        draft.sale_price = price;

        draft.validate().map_err(|e| e.user_message())
    }

    // ── Input handling ─────────────────────────────────────────────────────

    pub fn handle_input(&mut self, event: &Event, services: &Services) -> bool {
        if !self.open {
            return false;
        }
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return true;
        };

        match (*modifiers, *code) {
            (KeyModifiers::NONE, KeyCode::Esc) => self.close(),
            (KeyModifiers::NONE, KeyCode::Enter)
                if FORM_FIELDS[self.focus] == FormField::Category
                    && self.category == CategoryChoice::New =>
            {
                self.create_category(services)
            }
            (KeyModifiers::NONE, KeyCode::Enter) => self.submit(services),
            (KeyModifiers::NONE, KeyCode::Tab) | (KeyModifiers::NONE, KeyCode::Down) => {
                self.focus = (self.focus + 1) % FORM_FIELDS.len();
            }
            (_, KeyCode::BackTab) | (KeyModifiers::NONE, KeyCode::Up) => {
                self.focus = (self.focus + FORM_FIELDS.len() - 1) % FORM_FIELDS.len();
            }
            _ => self.edit_focused(*code, *modifiers, &services.categories),
        }
        true
    }

    fn edit_focused(&mut self, code: KeyCode, modifiers: KeyModifiers, categories: &[Category]) {
        match FORM_FIELDS[self.focus] {
            FormField::Type => {
                if matches!(code, KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right) {
                    self.kind = self.kind.toggle();
                }
            }
            FormField::Category => match code {
                KeyCode::Right => self.category = self.category.cycle(categories, true),
                KeyCode::Left => self.category = self.category.cycle(categories, false),
                _ if self.category == CategoryChoice::New => {
                    route_text_input(&mut self.new_category, code, modifiers)
                }
                KeyCode::Char(' ') => self.category = self.category.cycle(categories, true),
                _ => {}
            },
            FormField::Name => route_text_input(&mut self.name, code, modifiers),
            FormField::Description => route_text_input(&mut self.description, code, modifiers),
            FormField::Price => route_text_input(&mut self.price, code, modifiers),
        }
    }

    fn submit(&mut self, services: &Services) {
        if self.saving {
            return;
        }
        let draft = match self.draft(&services.categories) {
            Ok(draft) => draft,
            Err(message) => {
                self.error = Some(message);
                return;
            }
        };

        self.error = None;
        self.saving = true;

        let catalog = services.catalog.clone();
        let tx = services.event_tx.clone();
        match self.editing.clone() {
            Some(id) => {
                log::info!("Updating catalog item {id}");
                tokio::spawn(async move {
                    match catalog.update_item(&id, draft).await {
                        Ok(item) => {
                            let _ = tx.send(AppEvent::ItemUpdated(item));
                        }
                        Err(e) => {
                            log::warn!("Failed to update item {id}: {e}");
                            let _ = tx.send(AppEvent::ItemCreateFailed(format!(
                                "Failed to save item: {e}"
                            )));
                        }
                    }
                });
            }
            None => {
                log::info!("Creating catalog item '{}'", draft.name);
                tokio::spawn(async move {
                    match catalog.create_item(draft).await {
                        Ok(item) => {
                            let _ = tx.send(AppEvent::ItemCreated(item));
                        }
                        Err(e) => {
                            log::warn!("Failed to create item: {e}");
                            let _ = tx.send(AppEvent::ItemCreateFailed(format!(
                                "Failed to save item: {e}"
                            )));
                        }
                    }
                });
            }
        }
    }

    /// Create the category typed into the "+ New" entry. The refreshed
    /// category list goes out as `CategoriesLoaded`, then `CategoryCreated`
    /// selects it here.
    fn create_category(&mut self, services: &Services) {
        if self.saving {
            return;
        }
        let name = self.new_category.text().trim().to_string();
        if name.is_empty() {
            self.error = Some("Enter a name for the new category.".to_string());
            return;
        }

        self.error = None;
        self.saving = true;
        log::info!("Creating category '{name}'");

        let catalog = services.catalog.clone();
        let tx = services.event_tx.clone();
        tokio::spawn(async move {
            match catalog.create_category(&name).await {
                Ok(category) => {
                    match catalog.get_categories().await {
                        Ok(categories) => {
                            let _ = tx.send(AppEvent::CategoriesLoaded(categories));
                        }
                        Err(e) => log::warn!("Failed to reload categories: {e}"),
                    }
                    let _ = tx.send(AppEvent::CategoryCreated(category));
                }
                Err(e) => {
                    log::warn!("Failed to create category '{name}': {e}");
                    let _ = tx.send(AppEvent::CategoryCreateFailed(format!(
                        "Failed to save category: {e}"
                    )));
                }
            }
        });
    }

    // ── Rendering ──────────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect, categories: &[Category]) {
        if !self.open {
            return;
        }
        let modal_area = centered_rect(60, 60, area);
        frame.render_widget(Clear, modal_area);

        let title = if self.is_editing() {
            " Edit Item "
        } else {
            " Create New Item "
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT));
        let inner = block.inner(modal_area);
        frame.render_widget(block, modal_area);

        let mut lines: Vec<Line<'static>> = vec![Line::raw("")];

        for (i, field) in FORM_FIELDS.iter().enumerate() {
            let focused = i == self.focus;
            let marker = if focused { "▸" } else { " " };
            let label_style = if focused {
                Style::default().fg(theme::ACCENT).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme::TEXT_MUTED)
            };

            let (label, value) = match field {
                FormField::Name => ("Name", self.name.to_line("", focused)),
                FormField::Description => ("Notes", self.description.to_line("", focused)),
                FormField::Type => (
                    "Type",
                    Line::raw(format!("‹ {} {} ›", self.kind.icon(), self.kind.label())),
                ),
                FormField::Category => {
                    let value = match &self.category {
                        CategoryChoice::None => Line::raw("‹ None ›"),
                        CategoryChoice::Existing(id) => {
                            let name = categories
                                .iter()
                                .find(|c| &c.id == id)
                                .map(|c| c.name.as_str())
                                .unwrap_or(id.as_str());
                            Line::raw(format!("‹ {name} ›"))
                        }
                        CategoryChoice::New => {
                            let mut spans = vec![Span::styled("‹ + New: ", theme::key_hint())];
                            spans.extend(self.new_category.to_line("", focused).spans);
                            spans.push(Span::raw(" ›"));
                            Line::from(spans)
                        }
                    };
                    ("Category", value)
                }
                FormField::Price => ("Price", self.price.to_line("", focused)),
            };

            let mut spans = vec![
                Span::raw(format!("  {marker} ")),
                Span::styled(format!("{:<10}", format!("{label}:")), label_style),
            ];
            spans.extend(value.spans);
            lines.push(Line::from(spans));
        }

        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", "─".repeat(inner.width.saturating_sub(4) as usize)),
            theme::muted(),
        )));
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled("Tab", theme::key_hint()),
            Span::raw(":field "),
            Span::styled("Space", theme::key_hint()),
            Span::raw(":change "),
            Span::styled("Enter", theme::key_hint()),
            Span::raw(":save "),
            Span::styled("Esc", theme::key_hint()),
            Span::raw(":cancel"),
        ]));

        if self.saving {
            lines.push(Line::from(Span::styled("  Saving...", theme::muted())));
        }
        if let Some(ref err) = self.error {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(format!("✗ {err}"), Style::default().fg(theme::ERROR)),
            ]));
        }

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

fn route_text_input(field: &mut SearchField, code: KeyCode, modifiers: KeyModifiers) {
    match (modifiers, code) {
        (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => field.insert_char(c),
        (_, KeyCode::Backspace) => {
            field.backspace();
        }
        (_, KeyCode::Delete) => {
            field.delete();
        }
        (_, KeyCode::Left) => field.move_left(),
        (_, KeyCode::Right) => field.move_right(),
        (_, KeyCode::Home) => field.move_home(),
        (_, KeyCode::End) => field.move_end(),
        (KeyModifiers::CONTROL, KeyCode::Char('u')) => field.clear(),
        _ => {}
    }
}
