use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::types::{Money, Percent, Rate};

const PERCENT: Decimal = dec!(100);
const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Convert an annual percentage (8.5) to a monthly decimal rate.
pub fn annual_percent_to_monthly_rate(annual: Percent) -> Rate {
    annual / MONTHS_PER_YEAR / PERCENT
}

/// Convert a monthly percentage (0.75) to a monthly decimal rate.
pub fn monthly_percent_to_rate(monthly: Percent) -> Rate {
    monthly / PERCENT
}

/// Compute (1 + r)^n by repeated squaring, so the cost is O(log n) even for
/// tenures far past the schedule bound.
///
/// Returns `None` if the factor leaves the representable Decimal range.
pub fn compound(rate: Rate, n: u32) -> Option<Decimal> {
    Decimal::ONE.checked_add(rate)?.checked_powu(u64::from(n))
}

/// Level installment that retires `principal` over `n` periods at `rate`.
///
/// Evaluated as `P·r / (1 − (1+r)^−n)`, which equals the textbook
/// `P·r·(1+r)^n / ((1+r)^n − 1)`. When `(1+r)^n` overflows the payment
/// collapses to the interest-only limit `P·r`. Zero rate is straight-line.
/// Returns `None` for `n == 0` or when the payment itself is not
/// representable.
pub fn level_payment(principal: Money, rate: Rate, n: u32) -> Option<Money> {
    if n == 0 {
        return None;
    }
    if rate.is_zero() {
        return Some(principal / Decimal::from(n));
    }

    let interest_only = principal.checked_mul(rate)?;
    match compound(rate, n) {
        Some(factor) => {
            let discount = Decimal::ONE - Decimal::ONE / factor;
            if discount.is_zero() {
                Some(principal / Decimal::from(n))
            } else {
                interest_only.checked_div(discount)
            }
        }
        None => Some(interest_only),
    }
}
