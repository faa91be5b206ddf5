//! Invoice draft view: line table with totals, plus the item picker trigger.
//!
//! Press `i` to pick an item, `n` to create one, `e` to edit the selected
//! line's catalog item, `d` to remove a line, `+`/`-` to change quantity,
//! `r` to reload the catalog. `t`, `c` and `D` edit the tax rate, additional
//! charges and discount.

use std::str::FromStr;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use rust_decimal::Decimal;
use tokio::sync::mpsc;

use crate::core::catalog::{CatalogItem, Category};
use crate::core::format::format_currency;
use crate::core::invoice::InvoiceDraft;
use crate::tui::events::{Action, AppEvent};
use crate::tui::layout::ViewportClass;
use crate::tui::services::Services;
use crate::tui::theme;
use crate::tui::views::item_picker::{ItemPicker, TriggerStyle};
use crate::tui::widgets::search_field::SearchField;

/// Invoice-level amount edited through the totals prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    TaxRate,
    AdditionalCharges,
    Discount,
}

impl Adjustment {
    fn label(self) -> &'static str {
        match self {
            Self::TaxRate => "Tax rate (%)",
            Self::AdditionalCharges => "Additional charges",
            Self::Discount => "Discount",
        }
    }
}

/// Open amount prompt.
struct AdjustmentPrompt {
    target: Adjustment,
    field: SearchField,
    error: Option<String>,
}

/// Border row plus subtotal, tax, charges, discount and total.
const TOTALS_HEIGHT: u16 = 6;

pub struct InvoiceViewState {
    draft: InvoiceDraft,
    selected: usize,
    picker: ItemPicker,
    /// Bumped to make the picker reload its catalog.
    refetch_token: u64,
    prompt: Option<AdjustmentPrompt>,
    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl InvoiceViewState {
    pub fn new(services: &Services) -> Self {
        let select_tx = services.event_tx.clone();
        let create_tx = services.event_tx.clone();
        let picker = ItemPicker::new(
            services.catalog.clone(),
            services.categories.clone(),
            Box::new(move |item| {
                let _ = select_tx.send(AppEvent::Action(Action::AddLine(item)));
            }),
        )
        .with_create_new(Box::new(move || {
            let _ = create_tx.send(AppEvent::Action(Action::OpenNewItemForm));
        }));

        Self {
            draft: InvoiceDraft::new(services.currency.clone()).with_tax_rate(services.tax_rate),
            selected: 0,
            picker,
            refetch_token: 0,
            prompt: None,
            event_tx: services.event_tx.clone(),
        }
    }

    /// Start the first catalog fetch.
    pub fn load(&mut self) {
        self.picker.mount();
    }

    pub fn poll(&mut self) {
        self.picker.poll();
    }

    /// Reload the catalog, e.g. after an item was created.
    pub fn bump_refetch_token(&mut self) {
        self.refetch_token += 1;
        self.picker.set_refetch_token(self.refetch_token);
    }

    pub fn set_categories(&mut self, categories: Vec<Category>) {
        self.picker.set_categories(categories);
    }

    pub fn add_line(&mut self, item: &CatalogItem) {
        self.selected = self.draft.add_item(item);
        log::info!("Added '{}' to invoice", item.name);
    }

    pub fn draft(&self) -> &InvoiceDraft {
        &self.draft
    }

    pub fn picker(&self) -> &ItemPicker {
        &self.picker
    }

    pub fn picker_mut(&mut self) -> &mut ItemPicker {
        &mut self.picker
    }

    pub fn is_picker_open(&self) -> bool {
        self.picker.is_open()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn adjusting(&self) -> Option<Adjustment> {
        self.prompt.as_ref().map(|p| p.target)
    }

    /// Open the amount prompt, pre-filled with the current value.
    pub fn start_adjustment(&mut self, target: Adjustment) {
        let current = match target {
            Adjustment::TaxRate => self.draft.tax_rate(),
            Adjustment::AdditionalCharges => self.draft.additional_charges(),
            Adjustment::Discount => self.draft.discount(),
        };
        let mut field = SearchField::new("0");
        if !current.is_zero() {
            field.set_text(current.normalize().to_string());
        }
        self.prompt = Some(AdjustmentPrompt {
            target,
            field,
            error: None,
        });
    }

    /// Parse and apply the prompt. Blank means zero.
    fn apply_adjustment(&mut self) {
        let Some(prompt) = self.prompt.as_mut() else {
            return;
        };
        let text = prompt.field.text().trim();
        let value = if text.is_empty() {
            Ok(Decimal::ZERO)
        } else {
            Decimal::from_str(text)
        };
        let value = match value {
            Ok(v) if !v.is_sign_negative() || v.is_zero() => v,
            Ok(_) => {
                prompt.error = Some("Amount can't be negative.".into());
                return;
            }
            Err(_) => {
                prompt.error = Some(format!("Not a number: '{text}'"));
                return;
            }
        };
        match prompt.target {
            Adjustment::TaxRate => self.draft.set_tax_rate(value),
            Adjustment::AdditionalCharges => self.draft.set_additional_charges(value),
            Adjustment::Discount => self.draft.set_discount(value),
        }
        log::info!("{} set to {value}", prompt.target.label());
        self.prompt = None;
    }

    fn handle_prompt_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let Some(prompt) = self.prompt.as_mut() else {
            return;
        };
        match (modifiers, code) {
            (_, KeyCode::Esc) => self.prompt = None,
            (_, KeyCode::Enter) => self.apply_adjustment(),
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => {
                prompt.field.insert_char(c);
            }
            (_, KeyCode::Backspace) => {
                prompt.field.backspace();
            }
            (_, KeyCode::Delete) => {
                prompt.field.delete();
            }
            (_, KeyCode::Left) => prompt.field.move_left(),
            (_, KeyCode::Right) => prompt.field.move_right(),
            _ => {}
        }
    }

    /// Ask the app to open the edit form for the selected line's item.
    fn request_edit_selected(&self) {
        let Some(line) = self.draft.lines().get(self.selected) else {
            return;
        };
        match self
            .picker
            .cache()
            .items()
            .iter()
            .find(|item| item.id == line.item_id)
        {
            Some(item) => {
                let _ = self
                    .event_tx
                    .send(AppEvent::Action(Action::EditItem(item.clone())));
            }
            None => log::warn!("Item {} is no longer in the catalog", line.item_id),
        }
    }

    // ── Input handling ─────────────────────────────────────────────────────

    pub fn handle_input(&mut self, event: &Event) -> bool {
        if self.picker.is_open() {
            return self.picker.handle_input(event);
        }
        if self.picker.handle_trigger_input(event) {
            return true;
        }

        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return false;
        };

        if self.prompt.is_some() {
            self.handle_prompt_key(*code, *modifiers);
            return true;
        }

        match (*modifiers, *code) {
            (KeyModifiers::NONE, KeyCode::Char('i') | KeyCode::Enter) => {
                self.picker.open();
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('j') | KeyCode::Down) => {
                if !self.draft.is_empty() {
                    self.selected = (self.selected + 1).min(self.draft.lines().len() - 1);
                }
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('k') | KeyCode::Up) => {
                self.selected = self.selected.saturating_sub(1);
                true
            }
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char('+' | '=')) => {
                self.draft.increment(self.selected);
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('-')) => {
                self.draft.decrement(self.selected);
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('d') | KeyCode::Delete) => {
                if let Some(line) = self.draft.remove_line(self.selected) {
                    log::info!("Removed '{}' from invoice", line.name);
                }
                self.selected = self
                    .selected
                    .min(self.draft.lines().len().saturating_sub(1));
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('r')) => {
                // Same path as Ctrl+R: items and categories reload together
                let _ = self.event_tx.send(AppEvent::Action(Action::RefreshCatalog));
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('e')) => {
                self.request_edit_selected();
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('t')) => {
                self.start_adjustment(Adjustment::TaxRate);
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('c')) => {
                self.start_adjustment(Adjustment::AdditionalCharges);
                true
            }
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char('D')) => {
                self.start_adjustment(Adjustment::Discount);
                true
            }
            _ => false,
        }
    }

    // ── Rendering ──────────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect, viewport: ViewportClass) {
        let block = theme::block_focused("Invoice Draft");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [toolbar, table_area, totals] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(TOTALS_HEIGHT),
        ])
        .areas(inner);

        self.render_toolbar(frame, toolbar, viewport);
        self.render_lines(frame, table_area, viewport);
        self.render_totals(frame, totals);
    }

    /// Draw the picker surface over everything else.
    pub fn render_overlay(&self, frame: &mut Frame, area: Rect, viewport: ViewportClass) {
        self.picker.render(frame, area, viewport);
    }

    fn render_toolbar(&self, frame: &mut Frame, area: Rect, viewport: ViewportClass) {
        let trigger_style = if viewport.is_narrow() {
            TriggerStyle::IconOnly
        } else {
            TriggerStyle::Labeled
        };
        let [trigger, hint] =
            Layout::horizontal([Constraint::Length(18), Constraint::Min(1)]).areas(area);
        self.picker
            .render_trigger(frame, Rect { height: 1, ..trigger }, trigger_style);

        let status = if !self.picker.trigger_enabled() {
            Span::styled("Loading catalog...", theme::muted())
        } else if let Some(error) = self.picker.cache().error() {
            Span::styled(error.to_string(), Style::default().fg(theme::ERROR))
        } else {
            Span::styled(
                format!("{} items in catalog", self.picker.cache().items().len()),
                theme::dim(),
            )
        };
        frame.render_widget(Paragraph::new(Line::from(vec![Span::raw(" "), status])), hint);
    }

    fn render_lines(&self, frame: &mut Frame, area: Rect, viewport: ViewportClass) {
        if self.draft.is_empty() {
            let lines = vec![
                Line::raw(""),
                Line::from(vec![
                    Span::styled("  No lines yet. Press ", theme::muted()),
                    Span::styled("i", theme::key_hint()),
                    Span::styled(" to add an item.", theme::muted()),
                ]),
            ];
            frame.render_widget(Paragraph::new(lines), area);
            return;
        }

        let currency = self.draft.currency();
        let rows: Vec<Row> = self
            .draft
            .lines()
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let style = if i == self.selected {
                    theme::highlight()
                } else {
                    Style::default()
                };
                let mut cells = vec![Cell::from(format!("{} {}", line.kind.icon(), line.name))];
                if !viewport.is_narrow() {
                    cells.push(Cell::from(
                        line.description.clone().unwrap_or_default(),
                    ));
                }
                cells.push(Cell::from(line.quantity.to_string()));
                if !viewport.is_narrow() {
                    cells.push(Cell::from(format_currency(line.unit_price, currency)));
                }
                cells.push(Cell::from(format_currency(line.total(), currency)));
                Row::new(cells).style(style)
            })
            .collect();

        let (header, widths): (Vec<&str>, Vec<Constraint>) = if viewport.is_narrow() {
            (
                vec!["Item", "Qty", "Total"],
                vec![Constraint::Min(10), Constraint::Length(5), Constraint::Length(14)],
            )
        } else {
            (
                vec!["Item", "Description", "Qty", "Unit", "Total"],
                vec![
                    Constraint::Percentage(30),
                    Constraint::Min(10),
                    Constraint::Length(5),
                    Constraint::Length(14),
                    Constraint::Length(14),
                ],
            )
        };

        let table = Table::new(rows, widths)
            .header(Row::new(header).style(theme::heading()))
            .block(Block::default().borders(Borders::TOP).border_style(theme::border_default()));
        frame.render_widget(table, area);
    }

    fn render_totals(&self, frame: &mut Frame, area: Rect) {
        let currency = self.draft.currency();
        let amount = |label: String, value: String| {
            Line::from(vec![
                Span::styled(format!("{label} "), theme::muted()),
                Span::styled(format!("{value:>14}"), Style::default().fg(theme::TEXT)),
                Span::raw(" "),
            ])
            .right_aligned()
        };

        let mut lines = vec![
            amount("Subtotal".into(), format_currency(self.draft.subtotal(), currency)),
            amount(
                format!("Tax ({}%)", self.draft.tax_rate().normalize()),
                format_currency(self.draft.tax_amount(), currency),
            ),
            amount(
                "Additional charges".into(),
                format_currency(self.draft.additional_charges(), currency),
            ),
            amount(
                "Discount".into(),
                format!("-{}", format_currency(self.draft.discount(), currency)),
            ),
            Line::from(vec![
                Span::styled("Total ", theme::heading()),
                Span::styled(
                    format!("{:>14}", format_currency(self.draft.total(), currency)),
                    Style::default().fg(theme::ACCENT).add_modifier(Modifier::BOLD),
                ),
                Span::raw(" "),
            ])
            .right_aligned(),
        ];

        if let Some(prompt) = &self.prompt {
            let mut spans = vec![Span::styled(
                format!(" {}: ", prompt.target.label()),
                theme::key_hint(),
            )];
            spans.extend(prompt.field.to_line("", true).spans);
            if let Some(err) = &prompt.error {
                spans.push(Span::styled(format!("  ✗ {err}"), Style::default().fg(theme::ERROR)));
            }
            lines[0] = Line::from(spans);
        }

        frame.render_widget(
            Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(theme::border_default()),
            ),
            area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::core::catalog::{ItemType, StaticCatalog};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use rust_decimal::Decimal;
    use tokio::sync::mpsc;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    async fn view() -> (InvoiceViewState, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let services = Services::with_provider(Arc::new(StaticCatalog::demo()), "EUR", tx).await;
        let mut view = InvoiceViewState::new(&services);
        view.load();
        view.picker_mut().settle().await;
        (view, rx)
    }

    fn screen(view: &InvoiceViewState, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| {
                let viewport = ViewportClass::classify(width, 80);
                view.render(frame, frame.area(), viewport);
                view.render_overlay(frame, frame.area(), viewport);
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[tokio::test]
    async fn test_picker_selection_is_sent_as_add_line() {
        let (mut view, mut rx) = view().await;
        assert!(view.handle_input(&key(KeyCode::Char('i'))));
        assert!(view.is_picker_open());

        // First item in the demo catalog
        view.handle_input(&key(KeyCode::Enter));
        assert!(!view.is_picker_open());

        match rx.try_recv() {
            Ok(AppEvent::Action(Action::AddLine(item))) => {
                assert_eq!(item.name, "Consulting Hour");
                view.add_line(&item);
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(view.draft().lines().len(), 1);
    }

    #[tokio::test]
    async fn test_create_new_is_sent_as_action() {
        let (mut view, mut rx) = view().await;
        view.handle_input(&key(KeyCode::Char('i')));
        view.handle_input(&Event::Key(KeyEvent::new(
            KeyCode::Char('n'),
            KeyModifiers::CONTROL,
        )));
        assert!(!view.is_picker_open());
        assert!(matches!(
            rx.try_recv(),
            Ok(AppEvent::Action(Action::OpenNewItemForm))
        ));
    }

    #[tokio::test]
    async fn test_line_editing_keys() {
        let (mut view, _rx) = view().await;
        let widget = CatalogItem::new("w", "Widget", ItemType::Product)
            .with_sale_price(Decimal::new(1000, 2));
        view.add_line(&widget);
        view.add_line(&widget);
        assert_eq!(view.selected(), 1);

        view.handle_input(&key(KeyCode::Char('+')));
        view.handle_input(&key(KeyCode::Char('+')));
        assert_eq!(view.draft().lines()[1].quantity, 3);
        view.handle_input(&key(KeyCode::Char('-')));
        assert_eq!(view.draft().lines()[1].quantity, 2);

        view.handle_input(&key(KeyCode::Char('k')));
        view.handle_input(&key(KeyCode::Char('d')));
        assert_eq!(view.draft().lines().len(), 1);
        assert_eq!(view.draft().subtotal(), Decimal::new(2000, 2));
    }

    #[tokio::test]
    async fn test_refresh_key_goes_through_app_action() {
        let (mut view, mut rx) = view().await;
        assert!(view.handle_input(&key(KeyCode::Char('r'))));
        assert!(matches!(
            rx.try_recv(),
            Ok(AppEvent::Action(Action::RefreshCatalog))
        ));
        // The app owns the reload; the view doesn't refetch on its own
        assert!(view.picker().trigger_enabled());
    }

    #[tokio::test]
    async fn test_bump_refetch_token_disables_trigger_while_loading() {
        let (mut view, _rx) = view().await;
        view.bump_refetch_token();
        assert!(!view.picker().trigger_enabled());
        // Trigger is inert while loading
        view.handle_input(&key(KeyCode::Char('i')));
        assert!(!view.is_picker_open());
        view.picker_mut().settle().await;
        assert!(view.picker().trigger_enabled());
    }

    #[tokio::test]
    async fn test_adjustment_prompts_update_total() {
        let (mut view, _rx) = view().await;
        let hour = CatalogItem::new("h", "Hour", ItemType::Service)
            .with_sale_price(Decimal::new(10000, 2));
        view.add_line(&hour);

        view.handle_input(&key(KeyCode::Char('t')));
        assert_eq!(view.adjusting(), Some(Adjustment::TaxRate));
        for c in "10".chars() {
            view.handle_input(&key(KeyCode::Char(c)));
        }
        view.handle_input(&key(KeyCode::Enter));
        assert_eq!(view.adjusting(), None);

        view.handle_input(&key(KeyCode::Char('c')));
        for c in "5.50".chars() {
            view.handle_input(&key(KeyCode::Char(c)));
        }
        view.handle_input(&key(KeyCode::Enter));

        view.handle_input(&Event::Key(KeyEvent::new(KeyCode::Char('D'), KeyModifiers::SHIFT)));
        assert_eq!(view.adjusting(), Some(Adjustment::Discount));
        for c in "20".chars() {
            view.handle_input(&key(KeyCode::Char(c)));
        }
        view.handle_input(&key(KeyCode::Enter));

        let draft = view.draft();
        assert_eq!(draft.tax_rate(), Decimal::new(10, 0));
        assert_eq!(draft.additional_charges(), Decimal::new(550, 2));
        assert_eq!(draft.discount(), Decimal::new(20, 0));
        // 100 + 10 + 5.50 - 20
        assert_eq!(draft.total(), Decimal::new(9550, 2));
    }

    #[tokio::test]
    async fn test_adjustment_prompt_rejects_bad_input() {
        let (mut view, _rx) = view().await;
        view.handle_input(&key(KeyCode::Char('c')));
        for c in "abc".chars() {
            view.handle_input(&key(KeyCode::Char(c)));
        }
        view.handle_input(&key(KeyCode::Enter));
        assert_eq!(view.adjusting(), Some(Adjustment::AdditionalCharges));

        // Keys go to the prompt, not the line editor
        assert!(view.handle_input(&key(KeyCode::Char('i'))));
        assert!(!view.is_picker_open());

        view.handle_input(&key(KeyCode::Esc));
        assert_eq!(view.adjusting(), None);
        assert_eq!(view.draft().additional_charges(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_edit_key_requests_catalog_item() {
        let (mut view, mut rx) = view().await;
        let consulting = view.picker().cache().items()[0].clone();
        view.add_line(&consulting);

        view.handle_input(&key(KeyCode::Char('e')));
        match rx.try_recv() {
            Ok(AppEvent::Action(Action::EditItem(item))) => assert_eq!(item.id, consulting.id),
            other => panic!("unexpected event: {other:?}"),
        }

        // Lines whose item left the catalog can't be edited
        let gone = CatalogItem::new("gone", "Gone", ItemType::Product);
        view.add_line(&gone);
        view.handle_input(&key(KeyCode::Char('e')));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_render_totals_breakdown() {
        let (mut view, _rx) = view().await;
        let hour = CatalogItem::new("h", "Hour", ItemType::Service)
            .with_sale_price(Decimal::new(10000, 2));
        view.add_line(&hour);
        view.draft.set_tax_rate(Decimal::new(15, 0));
        view.draft.set_discount(Decimal::new(500, 2));

        let text = screen(&view, 120, 30);
        assert!(text.contains("Subtotal"));
        assert!(text.contains("Tax (15%)"));
        assert!(text.contains("€15.00"));
        assert!(text.contains("-€5.00"));
        assert!(text.contains("Total"));
        assert!(text.contains("€110.00"));
    }

    #[tokio::test]
    async fn test_render_uses_invoice_currency() {
        let (mut view, _rx) = view().await;
        let hour = CatalogItem::new("h", "Hour", ItemType::Service)
            .with_sale_price(Decimal::new(120000, 2));
        view.add_line(&hour);
        let text = screen(&view, 120, 30);
        assert!(text.contains("Invoice Draft"));
        assert!(text.contains("Select Item"));
        assert!(text.contains("€1,200.00"));
    }

    #[tokio::test]
    async fn test_empty_draft_hint() {
        let (view, _rx) = view().await;
        let text = screen(&view, 120, 30);
        assert!(text.contains("No lines yet."));
        assert!(text.contains("8 items in catalog"));
    }

    #[tokio::test]
    async fn test_narrow_trigger_is_icon_only() {
        let (view, _rx) = view().await;
        let text = screen(&view, 60, 30);
        assert!(!text.contains("Select Item"));
    }
}
