//! Filter engine: derives the visible subset of the catalog from the
//! search text, type facet and category facet.
//!
//! Filtering is a stable, pure projection. Items are never re-sorted or
//! modified, and the ad-hoc `active_filters` chips are display-only: they
//! do not take part in the predicate.

use super::{CatalogItem, Category, ItemType};

/// Category facet: everything, or exactly one category id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum CategoryFacet {
    #[default]
    All,
    Id(String),
}

impl CategoryFacet {
    pub fn matches(&self, item: &CatalogItem) -> bool {
        match self {
            Self::All => true,
            Self::Id(id) => item.category_id.as_deref() == Some(id.as_str()),
        }
    }

    /// Step through `All` followed by each category in order, wrapping.
    pub fn cycle(&self, categories: &[Category], forward: bool) -> Self {
        let current = match self {
            Self::All => 0,
            Self::Id(id) => categories
                .iter()
                .position(|c| &c.id == id)
                .map(|i| i + 1)
                .unwrap_or(0),
        };
        let len = categories.len() + 1;
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        match next {
            0 => Self::All,
            i => Self::Id(categories[i - 1].id.clone()),
        }
    }

    pub fn label<'a>(&'a self, categories: &'a [Category]) -> &'a str {
        match self {
            Self::All => "All Categories",
            Self::Id(id) => categories
                .iter()
                .find(|c| &c.id == id)
                .map(|c| c.name.as_str())
                .unwrap_or(id.as_str()),
        }
    }
}

/// Type facet: everything, products only, or services only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TypeFacet {
    #[default]
    All,
    Product,
    Service,
}

impl TypeFacet {
    pub const ALL: [TypeFacet; 3] = [TypeFacet::All, TypeFacet::Product, TypeFacet::Service];

    pub fn matches(self, item: &CatalogItem) -> bool {
        match self {
            Self::All => true,
            Self::Product => item.kind == ItemType::Product,
            Self::Service => item.kind == ItemType::Service,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Product => "Products",
            Self::Service => "Services",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&f| f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|&f| f == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl From<ItemType> for TypeFacet {
    fn from(kind: ItemType) -> Self {
        match kind {
            ItemType::Product => Self::Product,
            ItemType::Service => Self::Service,
        }
    }
}

/// How the picker lays out results. Rendering only, never a filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    List,
    #[default]
    Grid,
}

impl ViewMode {
    pub fn toggle(self) -> Self {
        match self {
            Self::List => Self::Grid,
            Self::Grid => Self::List,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::List => "List",
            Self::Grid => "Grid",
        }
    }
}

/// Transient picker filter state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub search_term: String,
    pub selected_category: CategoryFacet,
    pub selected_type: TypeFacet,
    /// Removable chip labels, insertion-ordered, no duplicates.
    pub active_filters: Vec<String>,
    pub view_mode: ViewMode,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the three structured facets let everything through.
    pub fn is_neutral(&self) -> bool {
        self.search_term.is_empty()
            && self.selected_category == CategoryFacet::All
            && self.selected_type == TypeFacet::All
    }

    /// Add `label` as a chip, or remove it if already present.
    pub fn toggle_filter(&mut self, label: &str) {
        if let Some(pos) = self.active_filters.iter().position(|f| f == label) {
            self.active_filters.remove(pos);
        } else {
            self.active_filters.push(label.to_string());
        }
    }

    /// Remove one chip. The structured facets are left alone.
    pub fn remove_filter(&mut self, label: &str) -> bool {
        let before = self.active_filters.len();
        self.active_filters.retain(|f| f != label);
        before != self.active_filters.len()
    }

    /// "Clear all": search, category, type and chips reset together.
    pub fn clear_all(&mut self) {
        self.search_term.clear();
        self.selected_category = CategoryFacet::All;
        self.selected_type = TypeFacet::All;
        self.active_filters.clear();
    }

    /// Reset applied whenever the picker closes, whatever the reason.
    pub fn reset_on_close(&mut self) {
        self.search_term.clear();
        self.active_filters.clear();
    }

    pub fn matches(&self, item: &CatalogItem) -> bool {
        let needle = self.search_term.to_lowercase();
        text_matches(item, &needle)
            && self.selected_category.matches(item)
            && self.selected_type.matches(item)
    }

    fn key(&self) -> FilterKey {
        FilterKey {
            needle: self.search_term.to_lowercase(),
            category: self.selected_category.clone(),
            kind: self.selected_type,
        }
    }
}

/// Case-insensitive substring match against name, description and
/// category name. `needle` must already be lowercased.
fn text_matches(item: &CatalogItem, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    item.name.to_lowercase().contains(needle)
        || item
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
        || item
            .category_name()
            .is_some_and(|n| n.to_lowercase().contains(needle))
}

/// Visible items for `filter`, preserving catalog order.
pub fn filter_items<'a>(items: &'a [CatalogItem], filter: &FilterState) -> Vec<&'a CatalogItem> {
    visible_indices(items, &filter.key())
        .into_iter()
        .map(|i| &items[i])
        .collect()
}

fn visible_indices(items: &[CatalogItem], key: &FilterKey) -> Vec<usize> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| {
            text_matches(item, &key.needle) && key.category.matches(item) && key.kind.matches(item)
        })
        .map(|(i, _)| i)
        .collect()
}

/// The inputs that determine the visible set.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FilterKey {
    needle: String,
    category: CategoryFacet,
    kind: TypeFacet,
}

/// Memoized visible index list over a catalog snapshot.
///
/// Recomputes only when the snapshot generation or one of the three
/// structured facets changes.
#[derive(Debug, Default)]
pub struct FilteredView {
    indices: Vec<usize>,
    computed_for: Option<(u64, FilterKey)>,
}

impl FilteredView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the view up to date. Returns `true` if it was recomputed.
    pub fn refresh(&mut self, items: &[CatalogItem], generation: u64, filter: &FilterState) -> bool {
        let key = filter.key();
        if let Some((cached_generation, cached_key)) = &self.computed_for {
            if *cached_generation == generation && *cached_key == key {
                return false;
            }
        }
        self.indices = visible_indices(items, &key);
        self.computed_for = Some((generation, key));
        true
    }

    /// Indices into the snapshot, in catalog order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn get<'a>(&self, items: &'a [CatalogItem], position: usize) -> Option<&'a CatalogItem> {
        self.indices.get(position).and_then(|&i| items.get(i))
    }
}
