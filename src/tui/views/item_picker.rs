//! Item picker: searchable, filterable catalog selection surface.
//!
//! Owns a [`CatalogCache`] and the transient [`FilterState`]. The host
//! renders the trigger and forwards input; the picker reports choices
//! through the callbacks it was built with. Every state mutation ends in
//! `refilter()`, which recomputes the memoized visible set when one of its
//! inputs actually changed.

use std::cell::{Cell, RefCell};
use std::sync::Arc;

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::core::catalog::{
    CatalogCache, CatalogItem, CatalogProvider, Category, CategoryFacet, FilterState,
    FilteredView, ItemType, TypeFacet, ViewMode,
};
use crate::core::format::format_currency;
use crate::tui::layout::{overlay_rect, ViewportClass};
use crate::tui::theme;
use crate::tui::widgets::search_field::SearchField;

/// Catalog prices are always shown in USD, whatever the invoice currency.
const PRICE_CURRENCY: &str = "USD";
const GRID_COLUMNS: usize = 2;
const CARD_HEIGHT: u16 = 6;

pub type ItemSelectHandler = Box<dyn FnMut(CatalogItem) + Send>;
pub type CreateNewHandler = Box<dyn FnMut() + Send>;

/// Why the picker closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Esc.
    Cancel,
    /// Click outside the surface.
    OutsideDismiss,
    Selected,
    CreateNew,
}

/// How the trigger control is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TriggerStyle {
    #[default]
    Labeled,
    IconOnly,
}

/// Clickable regions recorded during the last render.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Hit {
    Item(usize),
    Type(TypeFacet),
    Category(CategoryFacet),
    Chip(String),
    ClearAll,
    ViewToggle,
    CreateNew,
}

pub struct ItemPicker {
    provider: Arc<dyn CatalogProvider>,
    categories: Vec<Category>,
    cache: CatalogCache,
    filter: FilterState,
    view: FilteredView,
    search: SearchField,
    /// Position in the visible set.
    highlighted: usize,
    open: bool,
    refetch_token: u64,
    last_close: Option<CloseReason>,

    on_item_select: ItemSelectHandler,
    on_create_new: Option<CreateNewHandler>,

    // Render-time geometry for mouse hit testing
    surface: Cell<Rect>,
    trigger_area: Cell<Option<Rect>>,
    hits: RefCell<Vec<(Rect, Hit)>>,
}

impl ItemPicker {
    pub fn new(
        provider: Arc<dyn CatalogProvider>,
        categories: Vec<Category>,
        on_item_select: ItemSelectHandler,
    ) -> Self {
        Self {
            provider,
            categories,
            cache: CatalogCache::new(),
            filter: FilterState::new(),
            view: FilteredView::new(),
            search: SearchField::new("Search items..."),
            highlighted: 0,
            open: false,
            refetch_token: 0,
            last_close: None,
            on_item_select,
            on_create_new: None,
            surface: Cell::new(Rect::default()),
            trigger_area: Cell::new(None),
            hits: RefCell::new(Vec::new()),
        }
    }

    /// Enable the "Create New Item" affordance.
    pub fn with_create_new(mut self, handler: CreateNewHandler) -> Self {
        self.on_create_new = Some(handler);
        self
    }

    // ── Data lifecycle ──────────────────────────────────────────────

    /// Initial fetch. Must run inside a tokio runtime.
    pub fn mount(&mut self) {
        self.cache.refresh(self.provider.clone());
        self.refilter();
    }

    /// Refetch when `token` differs from the last one seen.
    pub fn set_refetch_token(&mut self, token: u64) -> bool {
        if token == self.refetch_token {
            return false;
        }
        log::debug!("Refetch token {} -> {token}", self.refetch_token);
        self.refetch_token = token;
        self.cache.refresh(self.provider.clone());
        self.refilter();
        true
    }

    /// Apply finished fetches. Call on every tick.
    pub fn poll(&mut self) -> bool {
        let changed = self.cache.poll();
        if changed {
            self.refilter();
        }
        changed
    }

    /// Wait for the in-flight fetch to land (headless use and tests).
    pub async fn settle(&mut self) -> bool {
        let changed = self.cache.settle().await;
        self.refilter();
        changed
    }

    pub fn set_categories(&mut self, categories: Vec<Category>) {
        self.categories = categories;
    }

    // ── Open / close ────────────────────────────────────────────────

    /// The trigger is inert while a fetch is in flight.
    pub fn trigger_enabled(&self) -> bool {
        !self.cache.is_loading()
    }

    pub fn open(&mut self) -> bool {
        if self.open || !self.trigger_enabled() {
            return false;
        }
        self.open = true;
        self.highlighted = 0;
        // Search and chips set while closed don't carry into a session.
        self.filter.reset_on_close();
        self.search.clear();
        self.refilter();
        log::debug!("Item picker opened ({} items)", self.cache.items().len());
        true
    }

    /// Close, dropping the search text and chips. Category, type and view
    /// mode carry over to the next open.
    pub fn close(&mut self, reason: CloseReason) {
        if !self.open {
            return;
        }
        self.open = false;
        self.last_close = Some(reason);
        self.filter.reset_on_close();
        self.search.clear();
        self.refilter();
        log::debug!("Item picker closed: {reason:?}");
    }

    /// Report `item` to the host and close.
    pub fn select(&mut self, item: CatalogItem) -> bool {
        if !self.open {
            return false;
        }
        log::debug!("Item selected: {}", item.id);
        (self.on_item_select)(item);
        self.close(CloseReason::Selected);
        true
    }

    pub fn select_highlighted(&mut self) -> bool {
        match self.highlighted_item().cloned() {
            Some(item) => self.select(item),
            None => false,
        }
    }

    /// Invoke the create-new handler and close. No-op without a handler.
    pub fn request_create_new(&mut self) -> bool {
        if !self.open {
            return false;
        }
        let Some(handler) = self.on_create_new.as_mut() else {
            return false;
        };
        handler();
        self.close(CloseReason::CreateNew);
        true
    }

    // ── Filter mutations ────────────────────────────────────────────

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search.set_text(term);
        self.sync_search();
    }

    pub fn set_type(&mut self, facet: TypeFacet) {
        self.filter.selected_type = facet;
        self.refilter();
    }

    pub fn cycle_type(&mut self, forward: bool) {
        let facet = if forward {
            self.filter.selected_type.next()
        } else {
            self.filter.selected_type.prev()
        };
        self.set_type(facet);
    }

    pub fn set_category(&mut self, facet: CategoryFacet) {
        self.filter.selected_category = facet;
        self.refilter();
    }

    pub fn cycle_category(&mut self, forward: bool) {
        let facet = self.filter.selected_category.cycle(&self.categories, forward);
        self.set_category(facet);
    }

    pub fn toggle_filter(&mut self, label: &str) {
        self.filter.toggle_filter(label);
        self.refilter();
    }

    pub fn remove_filter(&mut self, label: &str) -> bool {
        let removed = self.filter.remove_filter(label);
        self.refilter();
        removed
    }

    /// Pin the current search text as a chip.
    pub fn pin_search(&mut self) -> bool {
        let label = self.filter.search_term.trim().to_string();
        if label.is_empty() || self.filter.active_filters.contains(&label) {
            return false;
        }
        self.toggle_filter(&label);
        true
    }

    pub fn clear_all(&mut self) {
        self.filter.clear_all();
        self.search.clear();
        self.refilter();
    }

    pub fn toggle_view_mode(&mut self) {
        self.filter.view_mode = self.filter.view_mode.toggle();
        self.refilter();
    }

    fn sync_search(&mut self) {
        self.filter.search_term = self.search.text().to_string();
        self.refilter();
    }

    fn refilter(&mut self) {
        let recomputed =
            self.view
                .refresh(self.cache.items(), self.cache.generation(), &self.filter);
        if recomputed || self.highlighted >= self.view.len() {
            self.highlighted = 0;
        }
    }

    // ── Highlight navigation ────────────────────────────────────────

    fn columns(&self) -> usize {
        match self.filter.view_mode {
            ViewMode::List => 1,
            ViewMode::Grid => GRID_COLUMNS,
        }
    }

    pub fn move_up(&mut self) {
        self.highlighted = self.highlighted.saturating_sub(self.columns());
    }

    pub fn move_down(&mut self) {
        let next = self.highlighted + self.columns();
        if next < self.view.len() {
            self.highlighted = next;
        }
    }

    /// Previous column in the current grid row.
    pub fn move_left(&mut self) {
        if self.highlighted % self.columns() > 0 {
            self.highlighted -= 1;
        }
    }

    /// Next column in the current grid row.
    pub fn move_right(&mut self) {
        let columns = self.columns();
        if self.highlighted % columns < columns - 1 && self.highlighted + 1 < self.view.len() {
            self.highlighted += 1;
        }
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn cache(&self) -> &CatalogCache {
        &self.cache
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn has_create_new(&self) -> bool {
        self.on_create_new.is_some()
    }

    pub fn last_close_reason(&self) -> Option<CloseReason> {
        self.last_close
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    pub fn highlighted_item(&self) -> Option<&CatalogItem> {
        self.view.get(self.cache.items(), self.highlighted)
    }

    /// Items currently passing the filter, in catalog order.
    pub fn visible_items(&self) -> Vec<&CatalogItem> {
        self.view
            .indices()
            .iter()
            .filter_map(|&i| self.cache.items().get(i))
            .collect()
    }

    // ── Input handling ──────────────────────────────────────────────

    /// Handle input while open. Returns `true` when consumed; the open
    /// surface is modal, so everything is consumed.
    pub fn handle_input(&mut self, event: &Event) -> bool {
        if !self.open {
            return false;
        }
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Paste(text) => {
                for c in text.chars().filter(|c| !c.is_control()) {
                    self.search.insert_char(c);
                }
                self.sync_search();
            }
            _ => {}
        }
        true
    }

    fn handle_key(&mut self, key: &KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        let grid = self.filter.view_mode == ViewMode::Grid;

        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Esc) => self.close(CloseReason::Cancel),
            (KeyModifiers::NONE, KeyCode::Enter) => {
                self.select_highlighted();
            }
            (KeyModifiers::NONE, KeyCode::Tab) => self.cycle_type(true),
            (_, KeyCode::BackTab) => self.cycle_type(false),
            (KeyModifiers::CONTROL, KeyCode::Right) => self.cycle_category(true),
            (KeyModifiers::CONTROL, KeyCode::Left) => self.cycle_category(false),
            (KeyModifiers::CONTROL, KeyCode::Char('v')) => self.toggle_view_mode(),
            (KeyModifiers::CONTROL, KeyCode::Char('f')) => {
                self.pin_search();
            }
            (KeyModifiers::CONTROL, KeyCode::Char('x')) => self.clear_all(),
            (KeyModifiers::CONTROL, KeyCode::Char('n')) => {
                self.request_create_new();
            }
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => {
                self.search.clear();
                self.sync_search();
            }
            (KeyModifiers::NONE, KeyCode::Up) => self.move_up(),
            (KeyModifiers::NONE, KeyCode::Down) => self.move_down(),
            (KeyModifiers::NONE, KeyCode::Left) if grid => self.move_left(),
            (KeyModifiers::NONE, KeyCode::Right) if grid => self.move_right(),
            (KeyModifiers::NONE, KeyCode::Left) => self.search.move_left(),
            (KeyModifiers::NONE, KeyCode::Right) => self.search.move_right(),
            (KeyModifiers::NONE, KeyCode::Home) => self.search.move_home(),
            (KeyModifiers::NONE, KeyCode::End) => self.search.move_end(),
            (KeyModifiers::NONE, KeyCode::Backspace) => {
                if self.search.is_empty() {
                    if let Some(last) = self.filter.active_filters.last().cloned() {
                        self.remove_filter(&last);
                    }
                } else {
                    self.search.backspace();
                    self.sync_search();
                }
            }
            (KeyModifiers::NONE, KeyCode::Delete) => {
                self.search.delete();
                self.sync_search();
            }
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => {
                self.search.insert_char(c);
                self.sync_search();
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent) {
        let pos = Position::new(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if !self.surface.get().contains(pos) {
                    self.close(CloseReason::OutsideDismiss);
                    return;
                }
                let hit = self
                    .hits
                    .borrow()
                    .iter()
                    .find(|(rect, _)| rect.contains(pos))
                    .map(|(_, hit)| hit.clone());
                if let Some(hit) = hit {
                    self.activate(hit);
                }
            }
            MouseEventKind::ScrollDown => self.move_down(),
            MouseEventKind::ScrollUp => self.move_up(),
            _ => {}
        }
    }

    fn activate(&mut self, hit: Hit) {
        match hit {
            Hit::Item(position) => {
                if let Some(item) = self.view.get(self.cache.items(), position).cloned() {
                    self.select(item);
                }
            }
            Hit::Type(facet) => self.set_type(facet),
            Hit::Category(facet) => self.set_category(facet),
            Hit::Chip(label) => {
                self.remove_filter(&label);
            }
            Hit::ClearAll => self.clear_all(),
            Hit::ViewToggle => self.toggle_view_mode(),
            Hit::CreateNew => {
                self.request_create_new();
            }
        }
    }

    /// Open on a left click inside the last rendered trigger.
    pub fn handle_trigger_input(&mut self, event: &Event) -> bool {
        let Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            ..
        }) = event
        else {
            return false;
        };
        match self.trigger_area.get() {
            Some(area) if area.contains(Position::new(*column, *row)) => self.open(),
            _ => false,
        }
    }

    // ── Rendering ───────────────────────────────────────────────────

    /// Draw the trigger control. Dimmed and inert while loading.
    pub fn render_trigger(&self, frame: &mut Frame, area: Rect, style: TriggerStyle) {
        let label = match style {
            TriggerStyle::Labeled => format!(" {} Select Item ", ItemType::Product.icon()),
            TriggerStyle::IconOnly => format!(" {} ", ItemType::Product.icon()),
        };
        let span_style = if self.trigger_enabled() {
            theme::brand_badge()
        } else {
            theme::dim().add_modifier(Modifier::DIM)
        };
        let span = Span::styled(label, span_style);
        let width = (span.width() as u16).min(area.width);
        self.trigger_area
            .set(Some(Rect::new(area.x, area.y, width, area.height.min(1))));
        frame.render_widget(Paragraph::new(Line::from(span)), area);
    }

    /// Draw the open surface: a centered dialog on wide viewports, a
    /// bottom drawer on narrow ones.
    pub fn render(&self, frame: &mut Frame, area: Rect, viewport: ViewportClass) {
        if !self.open {
            return;
        }
        let surface = overlay_rect(area, viewport);
        self.surface.set(surface);
        self.hits.borrow_mut().clear();

        frame.render_widget(Clear, surface);
        let borders = match viewport {
            ViewportClass::Wide => Borders::ALL,
            ViewportClass::Narrow => Borders::TOP,
        };
        let block = Block::default()
            .title(Span::styled(" Select an Item ", theme::title()))
            .title_alignment(Alignment::Center)
            .borders(borders)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(surface);
        frame.render_widget(block, surface);

        if inner.height < 6 || inner.width < 20 {
            return;
        }

        let has_chips = !self.filter.active_filters.is_empty();
        let has_create = self.on_create_new.is_some();

        let mut constraints = vec![
            Constraint::Length(1), // Description
            Constraint::Length(1), // Search + view toggle
            Constraint::Length(1), // Type facet
            Constraint::Length(1), // Category facet
        ];
        if has_chips {
            constraints.push(Constraint::Length(1));
        }
        constraints.push(Constraint::Min(1));
        if has_create {
            constraints.push(Constraint::Length(1));
        }
        constraints.push(Constraint::Length(1)); // Key hints

        let chunks = Layout::vertical(constraints).split(inner);
        let mut next = 0;
        let mut take = || {
            let rect = chunks[next];
            next += 1;
            rect
        };

        let description = take();
        frame.render_widget(
            Paragraph::new(Line::styled(
                " Search for an existing item or create a new one.",
                theme::muted(),
            )),
            description,
        );

        self.render_search_row(frame, take());
        self.render_type_row(frame, take());
        self.render_category_row(frame, take());
        if has_chips {
            self.render_chips_row(frame, take());
        }

        let results = take();
        self.render_results(frame, results);

        if has_create {
            let mut row = HitRow::new(take());
            row.button(
                Span::styled(" + Create New Item ", theme::title()),
                Hit::CreateNew,
            );
            row.text(Span::styled("(Ctrl+N)", theme::dim()));
            row.finish(frame, &self.hits);
        }

        let hints = Line::from(vec![
            Span::styled(" Enter", theme::key_hint()),
            Span::styled(" select  ", theme::dim()),
            Span::styled("Tab", theme::key_hint()),
            Span::styled(" type  ", theme::dim()),
            Span::styled("Ctrl+←/→", theme::key_hint()),
            Span::styled(" category  ", theme::dim()),
            Span::styled("Ctrl+F", theme::key_hint()),
            Span::styled(" pin  ", theme::dim()),
            Span::styled("Ctrl+V", theme::key_hint()),
            Span::styled(" view  ", theme::dim()),
            Span::styled("Esc", theme::key_hint()),
            Span::styled(" close", theme::dim()),
        ]);
        frame.render_widget(Paragraph::new(hints), take());
    }

    fn render_search_row(&self, frame: &mut Frame, area: Rect) {
        let toggle_label = match self.filter.view_mode {
            ViewMode::Grid => " ☰ List ",
            ViewMode::List => " ▦ Grid ",
        };
        let toggle_width = Span::raw(toggle_label).width() as u16;
        let [search_area, toggle_area] =
            Layout::horizontal([Constraint::Min(1), Constraint::Length(toggle_width)]).areas(area);

        frame.render_widget(
            Paragraph::new(self.search.to_line(" 🔍 ", true)),
            search_area,
        );

        let mut row = HitRow::new(toggle_area);
        row.button(Span::styled(toggle_label, theme::facet(false)), Hit::ViewToggle);
        row.finish(frame, &self.hits);
    }

    fn render_type_row(&self, frame: &mut Frame, area: Rect) {
        let mut row = HitRow::new(area);
        row.text(Span::raw(" "));
        for facet in TypeFacet::ALL {
            let label = match facet {
                TypeFacet::All => format!(" {} ", facet.label()),
                TypeFacet::Product => format!(" {} {} ", ItemType::Product.icon(), facet.label()),
                TypeFacet::Service => format!(" {} {} ", ItemType::Service.icon(), facet.label()),
            };
            let active = self.filter.selected_type == facet;
            row.button(Span::styled(label, theme::facet(active)), Hit::Type(facet));
            row.text(Span::raw(" "));
        }
        row.finish(frame, &self.hits);
    }

    fn render_category_row(&self, frame: &mut Frame, area: Rect) {
        let mut row = HitRow::new(area);
        row.text(Span::raw(" "));
        let facets = std::iter::once(CategoryFacet::All).chain(
            self.categories
                .iter()
                .map(|c| CategoryFacet::Id(c.id.clone())),
        );
        for facet in facets {
            let active = self.filter.selected_category == facet;
            let label = format!(" {} ", facet.label(&self.categories));
            row.button(Span::styled(label, theme::facet(active)), Hit::Category(facet));
            row.text(Span::raw(" "));
        }
        row.finish(frame, &self.hits);
    }

    fn render_chips_row(&self, frame: &mut Frame, area: Rect) {
        let mut row = HitRow::new(area);
        row.text(Span::styled(" ⧩ ", theme::muted()));
        for label in &self.filter.active_filters {
            row.button(
                Span::styled(format!(" {label} × "), theme::badge()),
                Hit::Chip(label.clone()),
            );
            row.text(Span::raw(" "));
        }
        row.button(Span::styled(" Clear all ", theme::key_hint()), Hit::ClearAll);
        row.finish(frame, &self.hits);
    }

    fn render_results(&self, frame: &mut Frame, area: Rect) {
        let notice = if self.cache.is_loading() {
            Some(Line::styled(" Loading items...", theme::muted()))
        } else if let Some(error) = self.cache.error() {
            Some(Line::styled(format!(" {error}"), Style::default().fg(theme::ERROR)))
        } else if self.view.is_empty() {
            Some(Line::styled(" No items found.", theme::dim()))
        } else {
            None
        };
        if let Some(line) = notice {
            frame.render_widget(Paragraph::new(line), area);
            return;
        }

        match self.filter.view_mode {
            ViewMode::List => self.render_list(frame, area),
            ViewMode::Grid => self.render_grid(frame, area),
        }
    }

    fn render_list(&self, frame: &mut Frame, area: Rect) {
        let visible_rows = area.height as usize;
        let first = first_visible(self.highlighted, visible_rows);
        let mut hits = self.hits.borrow_mut();

        for (row, position) in (first..self.view.len()).take(visible_rows).enumerate() {
            let Some(item) = self.view.get(self.cache.items(), position) else {
                continue;
            };
            let rect = Rect::new(area.x, area.y + row as u16, area.width, 1);
            let selected = position == self.highlighted;

            let mut spans = vec![
                Span::raw(if selected { " ▸ " } else { "   " }),
                Span::styled(item.kind.icon(), Style::default().fg(kind_color(item.kind))),
                Span::raw(" "),
                Span::styled(
                    item.name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ];
            if let Some(name) = item.category_name() {
                spans.push(Span::raw("  "));
                spans.push(Span::styled(format!(" {name} "), theme::badge()));
            }
            if let Some(price) = item.display_price() {
                spans.push(Span::raw("  "));
                spans.push(Span::styled(
                    format_currency(price, PRICE_CURRENCY),
                    theme::price(),
                ));
            }

            let mut line = Line::from(spans);
            if selected {
                line = line.style(theme::highlight());
            }
            frame.render_widget(Paragraph::new(line), rect);
            hits.push((rect, Hit::Item(position)));
        }
    }

    fn render_grid(&self, frame: &mut Frame, area: Rect) {
        let visible_rows = (area.height / CARD_HEIGHT).max(1) as usize;
        let first_row = first_visible(self.highlighted / GRID_COLUMNS, visible_rows);
        let column_width = area.width / GRID_COLUMNS as u16;

        for row in 0..visible_rows {
            for column in 0..GRID_COLUMNS {
                let position = (first_row + row) * GRID_COLUMNS + column;
                let Some(item) = self.view.get(self.cache.items(), position) else {
                    continue;
                };
                let y = area.y + row as u16 * CARD_HEIGHT;
                let height = CARD_HEIGHT.min(area.bottom().saturating_sub(y));
                let rect = Rect::new(
                    area.x + column as u16 * column_width,
                    y,
                    column_width,
                    height,
                );
                self.render_card(frame, rect, item, position == self.highlighted);
                self.hits.borrow_mut().push((rect, Hit::Item(position)));
            }
        }
    }

    fn render_card(&self, frame: &mut Frame, area: Rect, item: &CatalogItem, selected: bool) {
        let block = if selected {
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Thick)
                .border_style(Style::default().fg(theme::ACCENT))
        } else {
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(theme::border_default())
        };
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.height == 0 {
            return;
        }

        let name_style = if selected {
            theme::title()
        } else {
            Style::default().fg(theme::TEXT).add_modifier(Modifier::BOLD)
        };
        let mut lines = vec![Line::from(vec![
            Span::styled(item.kind.icon(), Style::default().fg(kind_color(item.kind))),
            Span::raw(" "),
            Span::styled(item.name.clone(), name_style),
        ])];

        let mut meta = Vec::new();
        if let Some(name) = item.category_name() {
            meta.push(Span::styled(format!(" {name} "), theme::badge()));
            meta.push(Span::raw(" "));
        }
        if let Some(price) = item.display_price() {
            meta.push(Span::styled(
                format_currency(price, PRICE_CURRENCY),
                theme::price(),
            ));
        }
        lines.push(Line::from(meta));
        frame.render_widget(Paragraph::new(lines), inner);

        if let Some(description) = &item.description {
            if inner.height > 2 {
                let desc_area = Rect::new(inner.x, inner.y + 2, inner.width, (inner.height - 2).min(2));
                frame.render_widget(
                    Paragraph::new(description.as_str())
                        .style(theme::muted())
                        .wrap(Wrap { trim: true }),
                    desc_area,
                );
            }
        }
    }
}

fn kind_color(kind: ItemType) -> ratatui::style::Color {
    match kind {
        ItemType::Product => theme::PRODUCT,
        ItemType::Service => theme::SERVICE,
    }
}

/// First row to draw so that `selected` stays in view.
fn first_visible(selected: usize, visible: usize) -> usize {
    if visible == 0 {
        0
    } else {
        selected.saturating_sub(visible - 1)
    }
}

/// Builds a one-line row of spans and records clickable spans.
struct HitRow {
    area: Rect,
    spans: Vec<Span<'static>>,
    offset: u16,
    hits: Vec<(Rect, Hit)>,
}

impl HitRow {
    fn new(area: Rect) -> Self {
        Self {
            area,
            spans: Vec::new(),
            offset: 0,
            hits: Vec::new(),
        }
    }

    fn text(&mut self, span: Span<'static>) {
        self.offset = self.offset.saturating_add(span.width() as u16);
        self.spans.push(span);
    }

    fn button(&mut self, span: Span<'static>, hit: Hit) {
        let width = span.width() as u16;
        if self.offset < self.area.width {
            let visible = width.min(self.area.width - self.offset);
            self.hits.push((
                Rect::new(self.area.x + self.offset, self.area.y, visible, 1),
                hit,
            ));
        }
        self.text(span);
    }

    fn finish(self, frame: &mut Frame, sink: &RefCell<Vec<(Rect, Hit)>>) {
        frame.render_widget(Paragraph::new(Line::from(self.spans)), self.area);
        sink.borrow_mut().extend(self.hits);
    }
}
