//! Decimal arithmetic that never panics.
//!
//! `Decimal`'s operators panic once a result leaves the 96-bit range.
//! Every amount the totals engine derives goes through [`Arith`], which
//! saturates at `Decimal::MAX` / `Decimal::MIN` instead and remembers
//! that it had to.

use rust_decimal::Decimal;

#[derive(Debug, Default)]
pub(crate) struct Arith {
    overflowed: bool,
}

impl Arith {
    /// True once any operation saturated or divided by zero.
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    pub fn add(&mut self, a: Decimal, b: Decimal) -> Decimal {
        a.checked_add(b).unwrap_or_else(|| {
            self.overflowed = true;
            a.saturating_add(b)
        })
    }

    pub fn sub(&mut self, a: Decimal, b: Decimal) -> Decimal {
        a.checked_sub(b).unwrap_or_else(|| {
            self.overflowed = true;
            a.saturating_sub(b)
        })
    }

    pub fn mul(&mut self, a: Decimal, b: Decimal) -> Decimal {
        a.checked_mul(b).unwrap_or_else(|| {
            self.overflowed = true;
            a.saturating_mul(b)
        })
    }

    /// Division by zero yields zero and counts as an overflow.
    pub fn div(&mut self, a: Decimal, b: Decimal) -> Decimal {
        a.checked_div(b).unwrap_or_else(|| {
            self.overflowed = true;
            if b.is_zero() || a.is_zero() {
                Decimal::ZERO
            } else if a.is_sign_negative() == b.is_sign_negative() {
                Decimal::MAX
            } else {
                Decimal::MIN
            }
        })
    }

    pub fn sum(&mut self, values: impl IntoIterator<Item = Decimal>) -> Decimal {
        values
            .into_iter()
            .fold(Decimal::ZERO, |acc, value| self.add(acc, value))
    }
}
