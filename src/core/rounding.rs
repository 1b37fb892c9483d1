//! Per-field decimal precision for totals computation.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Precision used when neither a field entry nor a matrix default exists.
pub const DEFAULT_DECIMALS: u32 = 8;

/// Field paths understood by the totals engine.
pub mod fields {
    /// Line net amount and its price × quantity base.
    pub const LINE_NET_AMOUNT: &str = "line/netAmount";
    /// Effective amount of each line-level allowance/charge.
    pub const LINE_ALLOWANCE_CHARGE_AMOUNT: &str = "line/allowanceChargeAmount";
    /// BT-106: Sum of line net amounts.
    pub const INVOICE_NET_AMOUNT: &str = "invoice/netAmount";
    /// BT-107/BT-108 and each document-level allowance/charge.
    pub const INVOICE_ALLOWANCES_CHARGES_AMOUNT: &str = "invoice/allowancesChargesAmount";
    /// BT-116: Taxable amount per VAT group.
    pub const INVOICE_TAXABLE_AMOUNT: &str = "invoice/taxableAmount";
    /// BT-117: Tax amount per VAT group.
    pub const INVOICE_TAX_AMOUNT: &str = "invoice/taxAmount";
    /// BT-110: Total VAT amount.
    pub const INVOICE_VAT_AMOUNT: &str = "invoice/vatAmount";
    /// BT-109
    pub const INVOICE_TAX_EXCLUSIVE_AMOUNT: &str = "invoice/taxExclusiveAmount";
    /// BT-112
    pub const INVOICE_TAX_INCLUSIVE_AMOUNT: &str = "invoice/taxInclusiveAmount";
    /// BT-113
    pub const INVOICE_PAID_AMOUNT: &str = "invoice/paidAmount";
    /// BT-114
    pub const INVOICE_ROUNDING_AMOUNT: &str = "invoice/roundingAmount";
    /// BT-115
    pub const INVOICE_PAYABLE_AMOUNT: &str = "invoice/payableAmount";
}

/// Maps a field path to the number of decimal places it is rounded to.
///
/// Lookup order: the exact field entry, then the matrix default stored
/// under the empty key `""`, then [`DEFAULT_DECIMALS`].
///
/// ```
/// use einvoice::core::RoundingMatrix;
///
/// let matrix = RoundingMatrix::new()
///     .with_default(2)
///     .with_field("invoice/taxAmount", 3);
/// assert_eq!(matrix.decimals("invoice/taxAmount"), 3);
/// assert_eq!(matrix.decimals("line/netAmount"), 2);
/// assert_eq!(RoundingMatrix::new().decimals("line/netAmount"), 8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoundingMatrix {
    entries: BTreeMap<String, u32>,
}

impl RoundingMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the matrix-wide default precision.
    pub fn with_default(self, decimals: u32) -> Self {
        self.with_field("", decimals)
    }

    /// Set the precision for one field path.
    pub fn with_field(mut self, field: impl Into<String>, decimals: u32) -> Self {
        self.entries.insert(field.into(), decimals);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, decimals: u32) -> &mut Self {
        self.entries.insert(field.into(), decimals);
        self
    }

    pub fn remove(&mut self, field: &str) -> Option<u32> {
        self.entries.remove(field)
    }

    /// Resolved precision for `field`.
    pub fn decimals(&self, field: &str) -> u32 {
        self.entries
            .get(field)
            .or_else(|| self.entries.get(""))
            .copied()
            .unwrap_or(DEFAULT_DECIMALS)
    }

    /// Round `value` to the precision resolved for `field`.
    pub fn round(&self, value: Decimal, field: &str) -> Decimal {
        round_half_up(value, self.decimals(field))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Round a Decimal to `dp` decimal places using half-up (commercial rounding).
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}
