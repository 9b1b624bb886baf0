//! Money calculation utilities using rust_decimal for precision
//!
//! All arithmetic runs on `Decimal`; values are converted back to `f64`
//! (rounded to 2 decimal places, half away from zero) for storage.

use rust_decimal::prelude::*;
use shared::models::{DiscountKind, OrderTotals};

const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation (NaN / infinity become zero)
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round(value).to_f64().unwrap_or_default()
}

#[inline]
fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Snapshot price × quantity
pub fn line_total(unit_price: f64, quantity: i32) -> f64 {
    to_f64(to_decimal(unit_price) * Decimal::from(quantity))
}

/// Derive the order's monetary fields from its gross total
///
/// The discount is clamped into `0..=total`; tax applies to the
/// discounted amount.
pub fn compute_totals(total: f64, discount: f64, tax_rate: f64) -> OrderTotals {
    let total = round(to_decimal(total));
    let discount = round(to_decimal(discount)).clamp(Decimal::ZERO, total.max(Decimal::ZERO));
    let tax = round((total - discount) * to_decimal(tax_rate));
    finish(total, discount, tax)
}

/// Totals with an explicit tax amount (settlement overrides)
pub fn settle_totals(total: f64, discount: f64, tax: f64) -> OrderTotals {
    let total = round(to_decimal(total));
    let discount = round(to_decimal(discount)).clamp(Decimal::ZERO, total.max(Decimal::ZERO));
    let tax = round(to_decimal(tax)).max(Decimal::ZERO);
    finish(total, discount, tax)
}

fn finish(total: Decimal, discount: Decimal, tax: Decimal) -> OrderTotals {
    OrderTotals {
        total: to_f64(total),
        discount_amount: to_f64(discount),
        tax_amount: to_f64(tax),
        final_amount: to_f64(total - discount + tax),
    }
}

/// Whether the tendered amount covers the amount due, compared at cent precision
pub fn is_payment_sufficient(paid: f64, required: f64) -> bool {
    round(to_decimal(paid)) >= round(to_decimal(required))
}

/// Change owed to the customer, never negative
pub fn change_due(paid: f64, required: f64) -> f64 {
    to_f64((to_decimal(paid) - to_decimal(required)).max(Decimal::ZERO))
}

/// Even split of `amount`, each share rounded up to the cent
pub fn equal_shares(amount: f64, people: u32) -> Vec<f64> {
    if people == 0 {
        return Vec::new();
    }
    let share = (to_decimal(amount) / Decimal::from(people))
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::ToPositiveInfinity);
    vec![to_f64(share); people as usize]
}

/// Discount amount for a request against a gross total
///
/// Percentage must be within 0..=100 and fixed within 0..=total.
pub fn discount_amount(kind: DiscountKind, value: f64, total: f64) -> Result<f64, String> {
    if !value.is_finite() {
        return Err(format!("discount value must be a finite number, got {value}"));
    }
    let value = to_decimal(value);
    let total = to_decimal(total);
    match kind {
        DiscountKind::Percentage => {
            if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
                return Err(format!("percentage must be between 0 and 100, got {value}"));
            }
            Ok(to_f64(total * value / Decimal::ONE_HUNDRED))
        }
        DiscountKind::Fixed => {
            if value < Decimal::ZERO || value > total {
                return Err(format!("fixed discount must be between 0 and {total}, got {value}"));
            }
            Ok(to_f64(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_decimal_precision() {
        let sum_f64 = 0.1_f64 + 0.2_f64;
        assert_ne!(sum_f64, 0.3);

        let sum_dec = to_decimal(0.1) + to_decimal(0.2);
        assert_eq!(to_f64(sum_dec), 0.3);
    }

    #[test]
    fn test_to_decimal_nan_becomes_zero() {
        assert_eq!(to_decimal(f64::NAN), Decimal::ZERO);
        assert_eq!(to_decimal(f64::INFINITY), Decimal::ZERO);
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(10.0, 2), 20.0);
        assert_eq!(line_total(10.99, 3), 32.97);
        assert_eq!(line_total(0.1, 3), 0.3);
    }

    #[test]
    fn test_compute_totals_default_tax() {
        let totals = compute_totals(20.0, 0.0, 0.10);
        assert_eq!(totals.total, 20.0);
        assert_eq!(totals.tax_amount, 2.0);
        assert_eq!(totals.final_amount, 22.0);

        let totals = compute_totals(100.0, 10.0, 0.10);
        assert_eq!(totals.tax_amount, 9.0);
        assert_eq!(totals.final_amount, 99.0);
    }

    #[test]
    fn test_compute_totals_is_deterministic() {
        let a = compute_totals(33.33, 3.33, 0.075);
        let b = compute_totals(33.33, 3.33, 0.075);
        assert_eq!(a, b);
        let recombined = to_decimal(a.total) - to_decimal(a.discount_amount) + to_decimal(a.tax_amount);
        assert_eq!(to_f64(recombined), a.final_amount);
    }

    #[test]
    fn test_discount_clamped_to_total() {
        let totals = compute_totals(10.0, 25.0, 0.10);
        assert_eq!(totals.discount_amount, 10.0);
        assert_eq!(totals.tax_amount, 0.0);
        assert_eq!(totals.final_amount, 0.0);
    }

    #[test]
    fn test_settle_totals_explicit_tax() {
        let totals = settle_totals(20.0, 0.0, 2.0);
        assert_eq!(totals.final_amount, 22.0);
        let totals = settle_totals(20.0, 5.0, 0.0);
        assert_eq!(totals.final_amount, 15.0);
    }

    #[test]
    fn test_is_payment_sufficient() {
        assert!(is_payment_sufficient(22.0, 22.0));
        assert!(is_payment_sufficient(22.01, 22.0));
        assert!(!is_payment_sufficient(21.99, 22.0));
        assert!(!is_payment_sufficient(21.98, 22.0));
        assert!(!is_payment_sufficient(15.0, 22.0));
    }

    #[test]
    fn test_change_due() {
        assert_eq!(change_due(50.0, 22.0), 28.0);
        assert_eq!(change_due(22.0, 22.0), 0.0);
        assert_eq!(change_due(21.99, 22.0), 0.0);
    }

    #[test]
    fn test_equal_shares_round_up() {
        assert_eq!(equal_shares(100.0, 3), vec![33.34, 33.34, 33.34]);
        assert_eq!(equal_shares(22.0, 2), vec![11.0, 11.0]);
        assert!(equal_shares(10.0, 0).is_empty());
    }

    #[test]
    fn test_discount_amount() {
        assert_eq!(discount_amount(DiscountKind::Percentage, 10.0, 80.0), Ok(8.0));
        assert_eq!(discount_amount(DiscountKind::Fixed, 5.5, 80.0), Ok(5.5));
        assert!(discount_amount(DiscountKind::Percentage, 101.0, 80.0).is_err());
        assert!(discount_amount(DiscountKind::Fixed, 81.0, 80.0).is_err());
        assert!(discount_amount(DiscountKind::Fixed, -1.0, 80.0).is_err());
        assert!(discount_amount(DiscountKind::Fixed, f64::NAN, 80.0).is_err());
    }
}
