// Property-based tests for quotation totals
//
// Properties tested:
// 1. line_total = quantity × unit_price rounded to two decimals
// 2. a draft's total equals the sum of its line totals
// 3. the total never depends on item order

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use quotely::quotations::models::{calculate_total, line_total, NewQuotationItem};
use quotely::quotations::QuotationDraft;

fn amount(cents: u64) -> Decimal {
    Decimal::new(cents as i64, 2)
}

fn date() -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(2025, 7, 21).unwrap()
}

proptest! {
    /// Property: line total equals the rounded product
    #[test]
    fn test_line_total_is_rounded_product(
        quantity_cents in 1u64..=99_999_999u64,
        price_cents in 1u64..=9_999_999_999u64,
    ) {
        let quantity = amount(quantity_cents);
        let unit_price = amount(price_cents);
        let total = line_total(quantity, unit_price);

        prop_assert_eq!(total.scale(), 2);
        let exact = quantity * unit_price;
        prop_assert!((total - exact).abs() <= dec!(0.005));
    }

    /// Property: total equals the sum of item line totals
    #[test]
    fn test_draft_total_matches_items(
        items in prop::collection::vec((1u64..=100_000u64, 1u64..=10_000_000u64), 1..20)
    ) {
        let items: Vec<NewQuotationItem> = items
            .into_iter()
            .enumerate()
            .map(|(i, (q, p))| NewQuotationItem::new(format!("Item {}", i), amount(q), amount(p)))
            .collect();
        let expected: Decimal = items.iter().map(|item| item.line_total).sum();

        let draft = QuotationDraft::new(1, date(), items);
        prop_assert_eq!(draft.total_amount(), expected);
    }

    /// Property: reordering items leaves the total unchanged
    #[test]
    fn test_total_independent_of_order(
        totals in prop::collection::vec(1u64..=1_000_000_000u64, 1..30)
    ) {
        let forward: Vec<Decimal> = totals.iter().copied().map(amount).collect();
        let mut reversed = forward.clone();
        reversed.reverse();

        prop_assert_eq!(calculate_total(forward), calculate_total(reversed));
    }
}

#[test]
fn test_known_quotation_total() {
    let items = vec![
        NewQuotationItem::new("Tokyo city tour", dec!(2), dec!(1500.00)),
        NewQuotationItem::new("Airport transfer", dec!(1.5), dec!(80)),
        NewQuotationItem::new("Guide", dec!(0.333), dec!(10)),
    ];

    // 3000.00 + 120.00 + 3.30 (quantity rounds to 0.33 first)
    let draft = QuotationDraft::new(1, date(), items);
    assert_eq!(draft.total_amount(), dec!(3123.30));
}

#[test]
fn test_half_cent_rounds_away_from_zero() {
    assert_eq!(line_total(dec!(0.5), dec!(0.01)), dec!(0.01));
    assert_eq!(line_total(dec!(1.5), dec!(0.03)), dec!(0.05));
}
