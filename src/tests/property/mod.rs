//! Property-based tests for the catalog filter engine.
//!
//! Run them with:
//! ```sh
//! cargo test property
//! ```
//!
//! - `filter_props`: invariants of the visible-set projection
//!   - Result is an order-preserving subsequence of the catalog
//!   - Neutral filter state is the identity
//!   - Filtering twice equals filtering once
//!   - Search is case-insensitive
//!   - Chips never change the visible set
//!   - The memoized view agrees with the direct filter

mod filter_props;
