use crate::core::catalog::{CatalogItem, Category};

/// Events flowing through the Elm-architecture event loop.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Periodic tick for notification TTLs and polling async data.
    Tick,
    /// Raw terminal input (keyboard/mouse).
    Input(crossterm::event::Event),
    /// A resolved action to execute.
    Action(Action),
    /// The create-item form finished saving.
    ItemCreated(CatalogItem),
    /// The edit form saved changes to an existing item.
    ItemUpdated(CatalogItem),
    /// The item form failed to save.
    ItemCreateFailed(String),
    /// A category was created from the item form.
    CategoryCreated(Category),
    /// Creating a category from the item form failed.
    CategoryCreateFailed(String),
    /// Categories re-fetched from the backend.
    CategoriesLoaded(Vec<Category>),
    /// Notification to display to the user.
    Notification(Notification),
    /// Request to quit the application.
    Quit,
}

/// High-level actions dispatched by input mapping or picker callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Item chosen in the picker; becomes a new invoice line.
    AddLine(CatalogItem),
    /// Open the create-item form (the picker's "create new" affordance).
    OpenNewItemForm,
    /// Open the item form pre-filled with an existing item.
    EditItem(CatalogItem),
    CloseNewItemForm,
    /// Change the picker's refetch token so it reloads the catalog.
    RefreshCatalog,

    ShowHelp,
    CloseHelp,

    Quit,
}

/// Notification level for the overlay system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A timed notification shown in the overlay.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub level: NotificationLevel,
    /// Ticks remaining before auto-dismiss.
    pub ttl_ticks: u32,
}

impl Notification {
    /// Build a notification; the id is assigned when it is pushed.
    pub fn new(message: impl Into<String>, level: NotificationLevel) -> Self {
        Self {
            id: 0,
            message: message.into(),
            level,
            ttl_ticks: 100,
        }
    }
}
