//! Invoice draft built up from picked catalog items.

use rust_decimal::Decimal;

use crate::core::catalog::{CatalogItem, ItemType};

/// One line on the invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceLine {
    pub item_id: String,
    pub name: String,
    pub description: Option<String>,
    pub kind: ItemType,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl InvoiceLine {
    pub fn total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Invoice under construction.
#[derive(Debug, Clone)]
pub struct InvoiceDraft {
    currency: String,
    lines: Vec<InvoiceLine>,
    /// Percentage applied to the subtotal, e.g. `15` for 15%.
    tax_rate: Decimal,
    additional_charges: Decimal,
    discount: Decimal,
}

impl InvoiceDraft {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            lines: Vec::new(),
            tax_rate: Decimal::ZERO,
            additional_charges: Decimal::ZERO,
            discount: Decimal::ZERO,
        }
    }

    pub fn with_tax_rate(mut self, rate: Decimal) -> Self {
        self.set_tax_rate(rate);
        self
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn lines(&self) -> &[InvoiceLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Append a line for `item`: quantity 1, priced at the item's sale
    /// price when sale info is enabled, otherwise zero.
    pub fn add_item(&mut self, item: &CatalogItem) -> usize {
        self.lines.push(InvoiceLine {
            item_id: item.id.clone(),
            name: item.name.clone(),
            description: item.description.clone(),
            kind: item.kind,
            quantity: 1,
            unit_price: item.display_price().unwrap_or(Decimal::ZERO),
        });
        self.lines.len() - 1
    }

    pub fn remove_line(&mut self, index: usize) -> Option<InvoiceLine> {
        (index < self.lines.len()).then(|| self.lines.remove(index))
    }

    /// Set a line's quantity. Quantities below 1 are clamped to 1.
    pub fn set_quantity(&mut self, index: usize, quantity: u32) -> bool {
        match self.lines.get_mut(index) {
            Some(line) => {
                line.quantity = quantity.max(1);
                true
            }
            None => false,
        }
    }

    pub fn increment(&mut self, index: usize) -> bool {
        let next = self.lines.get(index).map(|l| l.quantity.saturating_add(1));
        next.is_some_and(|q| self.set_quantity(index, q))
    }

    pub fn decrement(&mut self, index: usize) -> bool {
        let next = self.lines.get(index).map(|l| l.quantity.saturating_sub(1));
        next.is_some_and(|q| self.set_quantity(index, q))
    }

    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(InvoiceLine::total).sum()
    }

    // ── Adjustments ─────────────────────────────────────────────────────
    // Negative inputs are clamped to zero.

    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }

    pub fn set_tax_rate(&mut self, rate: Decimal) {
        self.tax_rate = rate.max(Decimal::ZERO);
    }

    pub fn additional_charges(&self) -> Decimal {
        self.additional_charges
    }

    pub fn set_additional_charges(&mut self, amount: Decimal) {
        self.additional_charges = amount.max(Decimal::ZERO);
    }

    pub fn discount(&self) -> Decimal {
        self.discount
    }

    pub fn set_discount(&mut self, amount: Decimal) {
        self.discount = amount.max(Decimal::ZERO);
    }

    /// Tax on the subtotal, rounded to cents (banker's rounding).
    pub fn tax_amount(&self) -> Decimal {
        (self.subtotal() * self.tax_rate / Decimal::ONE_HUNDRED).round_dp(2)
    }

    /// Subtotal plus tax and charges, less the discount. Never negative.
    pub fn total(&self) -> Decimal {
        let total = self.subtotal() + self.tax_amount() + self.additional_charges - self.discount;
        total.max(Decimal::ZERO)
    }
}
