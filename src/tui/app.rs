use std::io;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use tokio::sync::mpsc;

use super::events::{Action, AppEvent, Notification, NotificationLevel};
use super::layout::{centered_rect, AppLayout, ViewportClass};
use super::services::Services;
use super::theme;
use super::views::invoice::InvoiceViewState;
use super::views::new_item::NewItemForm;

/// Maximum notifications shown at once.
const MAX_NOTIFICATIONS: usize = 3;

/// Central application state (Elm architecture).
pub struct AppState {
    /// Whether the app is still running.
    pub running: bool,
    /// Invoice draft view, hosting the item picker.
    pub invoice: InvoiceViewState,
    /// Create-item form (modal).
    pub new_item: NewItemForm,
    /// Active notifications (max 3 visible).
    pub notifications: Vec<Notification>,
    /// Monotonic counter for notification IDs.
    notification_counter: u64,
    /// Whether the help modal is open.
    pub show_help: bool,
    /// Receiver for backend events.
    event_rx: mpsc::UnboundedReceiver<AppEvent>,
    /// Sender handed to background tasks.
    event_tx: mpsc::UnboundedSender<AppEvent>,
    /// Backend services handle.
    services: Services,
}

impl AppState {
    pub fn new(
        event_rx: mpsc::UnboundedReceiver<AppEvent>,
        event_tx: mpsc::UnboundedSender<AppEvent>,
        services: Services,
    ) -> Self {
        Self {
            running: true,
            invoice: InvoiceViewState::new(&services),
            new_item: NewItemForm::new(),
            notifications: Vec::new(),
            notification_counter: 0,
            show_help: false,
            event_rx,
            event_tx,
            services,
        }
    }

    // ── Elm event loop ──────────────────────────────────────────────────

    /// Main event loop: render → select → update → loop.
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        tick_rate: Duration,
    ) -> io::Result<()> {
        let mut tick_interval = tokio::time::interval(tick_rate);
        let mut event_stream = EventStream::new();

        self.invoice.load();

        while self.running {
            terminal.draw(|frame| self.render(frame))?;

            tokio::select! {
                _ = tick_interval.tick() => {
                    self.on_tick();
                }
                Some(event) = self.event_rx.recv() => {
                    self.handle_event(event);
                }
                Some(Ok(crossterm_event)) = event_stream.next() => {
                    self.handle_event(AppEvent::Input(crossterm_event));
                }
            }
        }

        Ok(())
    }

    // ── Event handling ──────────────────────────────────────────────────

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Input(crossterm_event) => {
                // Priority 0: Ctrl+C always quits
                if is_force_quit(&crossterm_event) {
                    self.running = false;
                    return;
                }

                // Priority 1: Create-item form
                if self.new_item.handle_input(&crossterm_event, &self.services) {
                    return;
                }

                // Priority 2: Help modal
                if self.show_help {
                    if let Some(action) = self.map_help_input(&crossterm_event) {
                        self.handle_action(action);
                    }
                    return;
                }

                // Priority 3: Invoice view (picker consumes everything while open)
                if self.invoice.handle_input(&crossterm_event) {
                    return;
                }

                // Priority 4: Global keybindings
                if let Some(action) = self.map_input_to_action(&crossterm_event) {
                    self.handle_action(action);
                }
            }
            AppEvent::Action(action) => self.handle_action(action),
            AppEvent::Tick => self.on_tick(),
            AppEvent::ItemCreated(item) => {
                self.new_item.close();
                self.push_notification(
                    format!("Created '{}'", item.name),
                    NotificationLevel::Success,
                );
                self.invoice.bump_refetch_token();
            }
            AppEvent::ItemUpdated(item) => {
                self.new_item.close();
                self.push_notification(
                    format!("Updated '{}'", item.name),
                    NotificationLevel::Success,
                );
                self.invoice.bump_refetch_token();
            }
            AppEvent::ItemCreateFailed(message) | AppEvent::CategoryCreateFailed(message) => {
                self.new_item.on_save_failed(message.clone());
                self.push_notification(message, NotificationLevel::Error);
            }
            AppEvent::CategoryCreated(category) => {
                if !self.services.categories.contains(&category) {
                    self.services.categories.push(category.clone());
                    self.invoice.set_categories(self.services.categories.clone());
                }
                self.new_item.on_category_created(&category);
                self.push_notification(
                    format!("Created category '{}'", category.name),
                    NotificationLevel::Success,
                );
                self.invoice.bump_refetch_token();
            }
            AppEvent::CategoriesLoaded(categories) => {
                self.services.categories = categories.clone();
                self.invoice.set_categories(categories);
            }
            AppEvent::Notification(notification) => {
                self.push_notification(notification.message, notification.level);
            }
            AppEvent::Quit => {
                self.running = false;
            }
        }
    }

    /// Map help modal input to action.
    fn map_help_input(&self, event: &Event) -> Option<Action> {
        let Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return None;
        };
        match code {
            KeyCode::Esc | KeyCode::Char('?') => Some(Action::CloseHelp),
            _ => None,
        }
    }

    fn map_input_to_action(&self, event: &Event) -> Option<Action> {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return None;
        };

        match (*modifiers, *code) {
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char('q')) => Some(Action::Quit),
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char('?')) => {
                Some(Action::ShowHelp)
            }
            (KeyModifiers::NONE, KeyCode::Char('n')) => Some(Action::OpenNewItemForm),
            (KeyModifiers::CONTROL, KeyCode::Char('r')) => Some(Action::RefreshCatalog),
            _ => None,
        }
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::AddLine(item) => {
                self.invoice.add_line(&item);
                self.push_notification(format!("Added {}", item.name), NotificationLevel::Success);
            }
            Action::OpenNewItemForm => self.new_item.open(),
            Action::EditItem(item) => self.new_item.open_edit(&item),
            Action::CloseNewItemForm => self.new_item.close(),
            Action::RefreshCatalog => {
                self.invoice.bump_refetch_token();
                self.reload_categories();
            }
            Action::ShowHelp => self.show_help = true,
            Action::CloseHelp => self.show_help = false,
        }
    }

    fn reload_categories(&self) {
        let catalog = self.services.catalog.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            match catalog.get_categories().await {
                Ok(categories) => {
                    let _ = tx.send(AppEvent::CategoriesLoaded(categories));
                }
                Err(e) => {
                    log::warn!("Failed to reload categories: {e}");
                    let _ = tx.send(AppEvent::Notification(Notification::new(
                        "Failed to reload categories.",
                        NotificationLevel::Warning,
                    )));
                }
            }
        });
    }

    // ── Notifications ───────────────────────────────────────────────────

    /// Push a notification (dedup by message, max 3).
    pub fn push_notification(&mut self, message: String, level: NotificationLevel) {
        if self.notifications.iter().any(|n| n.message == message) {
            return;
        }

        self.notification_counter += 1;
        let mut notification = Notification::new(message, level);
        notification.id = self.notification_counter;
        self.notifications.push(notification);

        while self.notifications.len() > MAX_NOTIFICATIONS {
            self.notifications.remove(0);
        }
    }

    /// Tick: decrement notification TTLs, dismiss expired, poll async data.
    fn on_tick(&mut self) {
        for n in &mut self.notifications {
            n.ttl_ticks = n.ttl_ticks.saturating_sub(1);
        }
        self.notifications.retain(|n| n.ttl_ticks > 0);

        self.invoice.poll();
    }

    // ── Rendering ───────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let viewport = ViewportClass::classify(area.width, self.services.narrow_below);
        let layout = AppLayout::compute(area);

        self.render_header(frame, layout.header);
        self.invoice.render(frame, layout.main, viewport);
        self.render_status_bar(frame, layout.status, viewport);

        // Overlays
        self.invoice.render_overlay(frame, area, viewport);
        self.new_item.render(frame, area, &self.services.categories);
        self.render_notifications(frame, area);

        if self.show_help {
            self.render_help_modal(frame, area);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let header = Line::from(vec![
            Span::styled(" invoicer ", theme::brand_badge()),
            Span::raw(" "),
            Span::styled("New invoice", theme::heading()),
            Span::raw(" │ "),
            Span::styled(self.services.currency.clone(), theme::muted()),
        ]);
        frame.render_widget(Paragraph::new(header), area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect, viewport: ViewportClass) {
        let catalog_status = if !self.invoice.picker().trigger_enabled() {
            Span::styled("loading", Style::default().fg(theme::PRIMARY_LIGHT))
        } else if self.invoice.picker().cache().error().is_some() {
            Span::styled("error", Style::default().fg(theme::ERROR))
        } else {
            Span::styled("ready", theme::muted())
        };

        let mut spans = vec![
            Span::styled("Catalog:", theme::key_hint()),
            Span::raw(" "),
            catalog_status,
            Span::raw(" │ "),
            Span::styled("i", theme::key_hint()),
            Span::raw(":pick "),
            Span::styled("n", theme::key_hint()),
            Span::raw(":new item "),
        ];
        if !viewport.is_narrow() {
            spans.extend([
                Span::styled("+/-", theme::key_hint()),
                Span::raw(":qty "),
                Span::styled("d", theme::key_hint()),
                Span::raw(":remove "),
                Span::styled("r", theme::key_hint()),
                Span::raw(":reload "),
            ]);
        }
        spans.extend([
            Span::styled("?", theme::key_hint()),
            Span::raw(":help "),
            Span::styled("q", theme::key_hint()),
            Span::raw(":quit"),
        ]);

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_notifications(&self, frame: &mut Frame, area: Rect) {
        if self.notifications.is_empty() {
            return;
        }

        let max_width = area.width.saturating_sub(2).min(50);
        let height = (self.notifications.len() as u16).min(area.height);
        let x = area.width.saturating_sub(max_width + 1);
        let y = area.height.saturating_sub(height).min(1);
        let notification_area = Rect::new(x, y, max_width, height);

        let lines: Vec<Line> = self
            .notifications
            .iter()
            .map(|n| {
                let (prefix, color) = match n.level {
                    NotificationLevel::Info => ("ℹ", theme::INFO),
                    NotificationLevel::Success => ("✓", theme::SUCCESS),
                    NotificationLevel::Warning => ("⚠", theme::WARNING),
                    NotificationLevel::Error => ("✗", theme::ERROR),
                };
                Line::from(vec![
                    Span::styled(
                        format!(" {prefix} "),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(n.message.as_str()),
                ])
            })
            .collect();

        frame.render_widget(Clear, notification_area);
        frame.render_widget(Paragraph::new(lines), notification_area);
    }

    fn render_help_modal(&self, frame: &mut Frame, area: Rect) {
        let modal = centered_rect(60, 80, area);

        let keybindings = [
            ("Global:", ""),
            ("q", "Quit application"),
            ("?", "Toggle this help"),
            ("n", "Create a catalog item"),
            ("Ctrl+R", "Reload catalog and categories"),
            ("Ctrl+C", "Force quit"),
            ("", ""),
            ("Invoice:", ""),
            ("i / Enter", "Open item picker"),
            ("j/k", "Select line"),
            ("+ / -", "Change quantity"),
            ("d", "Remove line"),
            ("e", "Edit the line's catalog item"),
            ("t / c / D", "Set tax rate / charges / discount"),
            ("r", "Reload catalog and categories"),
            ("", ""),
            ("Item picker:", ""),
            ("type", "Search name, description, category"),
            ("Enter", "Add highlighted item"),
            ("Arrows", "Move highlight"),
            ("Tab / Shift+Tab", "Next / previous type"),
            ("Ctrl+← / Ctrl+→", "Previous / next category"),
            ("Ctrl+V", "Toggle grid / list"),
            ("Ctrl+F", "Pin search as a filter chip"),
            ("Backspace", "Remove last chip (empty search)"),
            ("Ctrl+X", "Clear all filters"),
            ("Ctrl+N", "Create new item"),
            ("Esc / click outside", "Close picker"),
        ];

        let mut lines = vec![
            Line::raw(""),
            Line::from(Span::styled(" Keybindings", theme::title())),
            Line::raw(""),
        ];

        for (key, desc) in &keybindings {
            if key.is_empty() {
                lines.push(Line::raw(""));
            } else if desc.is_empty() {
                lines.push(Line::from(Span::styled(format!("  {key}"), theme::title())));
            } else {
                lines.push(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(
                        format!("{:<22}", key),
                        theme::key_hint().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(*desc),
                ]));
            }
        }

        lines.push(Line::raw(""));
        lines.push(Line::from(vec![
            Span::raw("  Press "),
            Span::styled("?", theme::key_hint()),
            Span::raw(" or "),
            Span::styled("Esc", theme::key_hint()),
            Span::raw(" to close"),
        ]));

        let block = Block::default()
            .title(" Help ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT));

        frame.render_widget(Clear, modal);
        frame.render_widget(Paragraph::new(lines).block(block), modal);
    }
}

fn is_force_quit(event: &Event) -> bool {
    matches!(
        event,
        Event::Key(KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            ..
        })
    )
}
