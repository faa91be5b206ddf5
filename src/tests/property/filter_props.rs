//! Property-based tests for the filter engine
//!
//! Tests invariants:
//! - Visible items keep catalog order and come from the catalog
//! - An empty search with both facets on "All" shows everything
//! - Chips are display-only

use proptest::prelude::*;

use crate::core::catalog::{
    filter_items, CatalogItem, Category, CategoryFacet, FilterState, FilteredView, ItemType,
    TypeFacet,
};

// ============================================================================
// Strategies for generating test inputs
// ============================================================================

fn categories() -> Vec<Category> {
    vec![
        Category::new("c1", "Labour"),
        Category::new("c2", "Parts"),
        Category::new("c3", "Software"),
    ]
}

fn arb_item_type() -> impl Strategy<Value = ItemType> {
    prop_oneof![Just(ItemType::Product), Just(ItemType::Service)]
}

fn arb_item() -> impl Strategy<Value = CatalogItem> {
    (
        "[A-Za-z ]{1,16}",
        prop::option::of("[A-Za-z ]{0,24}"),
        arb_item_type(),
        prop::option::of(0usize..3),
    )
        .prop_map(|(name, description, kind, category)| {
            let mut item = CatalogItem::new(String::new(), name, kind);
            item.description = description;
            if let Some(i) = category {
                item = item.with_category(categories()[i].clone());
            }
            item
        })
}

/// Catalog with unique, positional ids so order can be checked.
fn arb_catalog() -> impl Strategy<Value = Vec<CatalogItem>> {
    prop::collection::vec(arb_item(), 0..24).prop_map(|items| {
        items
            .into_iter()
            .enumerate()
            .map(|(i, mut item)| {
                item.id = format!("item-{i:03}");
                item
            })
            .collect()
    })
}

fn arb_type_facet() -> impl Strategy<Value = TypeFacet> {
    prop_oneof![
        Just(TypeFacet::All),
        Just(TypeFacet::Product),
        Just(TypeFacet::Service),
    ]
}

fn arb_category_facet() -> impl Strategy<Value = CategoryFacet> {
    prop_oneof![
        Just(CategoryFacet::All),
        Just(CategoryFacet::Id("c1".into())),
        Just(CategoryFacet::Id("c2".into())),
        Just(CategoryFacet::Id("c3".into())),
        Just(CategoryFacet::Id("missing".into())),
    ]
}

fn arb_filter() -> impl Strategy<Value = FilterState> {
    (
        "[A-Za-z ]{0,4}",
        arb_category_facet(),
        arb_type_facet(),
        prop::collection::vec("[a-z]{1,6}", 0..4),
    )
        .prop_map(|(search_term, selected_category, selected_type, chips)| {
            let mut filter = FilterState {
                search_term,
                selected_category,
                selected_type,
                ..FilterState::default()
            };
            for chip in chips {
                if !filter.active_filters.contains(&chip) {
                    filter.toggle_filter(&chip);
                }
            }
            filter
        })
}

fn ids(items: &[&CatalogItem]) -> Vec<String> {
    items.iter().map(|i| i.id.clone()).collect()
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: the visible set is an order-preserving subsequence
    #[test]
    fn prop_result_is_ordered_subsequence(
        catalog in arb_catalog(),
        filter in arb_filter()
    ) {
        let visible = filter_items(&catalog, &filter);
        prop_assert!(visible.len() <= catalog.len());

        let mut cursor = catalog.iter();
        for item in &visible {
            prop_assert!(
                cursor.any(|c| c.id == item.id),
                "{} is out of order or not in the catalog",
                item.id
            );
        }
    }

    /// Property: every visible item satisfies all three facets
    #[test]
    fn prop_visible_items_match_predicate(
        catalog in arb_catalog(),
        filter in arb_filter()
    ) {
        for item in filter_items(&catalog, &filter) {
            prop_assert!(filter.matches(item));
            prop_assert!(filter.selected_type.matches(item));
            prop_assert!(filter.selected_category.matches(item));
        }
    }

    /// Property: hidden items fail at least one facet
    #[test]
    fn prop_hidden_items_fail_predicate(
        catalog in arb_catalog(),
        filter in arb_filter()
    ) {
        let visible: Vec<String> = ids(&filter_items(&catalog, &filter));
        for item in catalog.iter().filter(|i| !visible.contains(&i.id)) {
            prop_assert!(!filter.matches(item));
        }
    }

    /// Property: neutral filter state shows the whole catalog
    #[test]
    fn prop_neutral_filter_is_identity(catalog in arb_catalog()) {
        let filter = FilterState::new();
        prop_assert!(filter.is_neutral());

        let visible = filter_items(&catalog, &filter);
        let all: Vec<&CatalogItem> = catalog.iter().collect();
        prop_assert_eq!(ids(&visible), ids(&all));
    }

    /// Property: filtering the filtered set changes nothing
    #[test]
    fn prop_filter_is_idempotent(
        catalog in arb_catalog(),
        filter in arb_filter()
    ) {
        let once: Vec<CatalogItem> = filter_items(&catalog, &filter)
            .into_iter()
            .cloned()
            .collect();
        let twice = filter_items(&once, &filter);
        let once_refs: Vec<&CatalogItem> = once.iter().collect();
        prop_assert_eq!(ids(&twice), ids(&once_refs));
    }

    /// Property: search ignores letter case
    #[test]
    fn prop_search_is_case_insensitive(
        catalog in arb_catalog(),
        filter in arb_filter()
    ) {
        let mut upper = filter.clone();
        upper.search_term = filter.search_term.to_uppercase();
        let mut lower = filter.clone();
        lower.search_term = filter.search_term.to_lowercase();

        prop_assert_eq!(
            ids(&filter_items(&catalog, &upper)),
            ids(&filter_items(&catalog, &lower))
        );
    }

    /// Property: chips never affect the visible set
    #[test]
    fn prop_chips_are_display_only(
        catalog in arb_catalog(),
        filter in arb_filter(),
        extra in "[a-z]{1,8}"
    ) {
        let mut without = filter.clone();
        without.active_filters.clear();
        let mut with_extra = filter.clone();
        with_extra.toggle_filter(&extra);

        let expected = ids(&filter_items(&catalog, &without));
        prop_assert_eq!(ids(&filter_items(&catalog, &filter)), expected.clone());
        prop_assert_eq!(ids(&filter_items(&catalog, &with_extra)), expected);
    }

    /// Property: a narrower type facet never shows more than "All"
    #[test]
    fn prop_type_facet_narrows(
        catalog in arb_catalog(),
        filter in arb_filter(),
        facet in arb_type_facet()
    ) {
        let mut broad = filter.clone();
        broad.selected_type = TypeFacet::All;
        let mut narrow = filter.clone();
        narrow.selected_type = facet;

        let broad_ids = ids(&filter_items(&catalog, &broad));
        for id in ids(&filter_items(&catalog, &narrow)) {
            prop_assert!(broad_ids.contains(&id));
        }
    }

    /// Property: the memoized view agrees with the direct projection
    #[test]
    fn prop_filtered_view_matches_filter_items(
        catalog in arb_catalog(),
        first in arb_filter(),
        second in arb_filter()
    ) {
        let mut view = FilteredView::new();
        for filter in [&first, &second] {
            view.refresh(&catalog, 1, filter);
            let from_view: Vec<&CatalogItem> = (0..view.len())
                .filter_map(|pos| view.get(&catalog, pos))
                .collect();
            prop_assert_eq!(ids(&from_view), ids(&filter_items(&catalog, filter)));
        }
    }

    /// Property: clear_all always yields a neutral state without chips
    #[test]
    fn prop_clear_all_is_neutral(mut filter in arb_filter()) {
        let view_mode = filter.view_mode;
        filter.clear_all();
        prop_assert!(filter.is_neutral());
        prop_assert!(filter.active_filters.is_empty());
        prop_assert_eq!(filter.view_mode, view_mode);
    }
}
