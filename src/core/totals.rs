use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::arith::Arith;
use super::error::InvoiceError;
use super::invoice::Invoice;
use super::rounding::fields;
use super::types::{AllowanceChargeHolder, AllowanceOrCharge, TaxCategory};

/// BG-22: Document totals, derived from an [`Invoice`].
///
/// A snapshot: computed fresh by [`Invoice::totals`] and never updated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    /// BT-5
    pub currency: String,
    /// BT-106: Sum of line net amounts.
    pub net_amount: Decimal,
    /// BT-107: Sum of document-level allowances.
    pub allowances_amount: Decimal,
    /// BT-108: Sum of document-level charges.
    pub charges_amount: Decimal,
    /// BT-110: Total VAT amount.
    pub vat_amount: Decimal,
    /// BT-109: net - allowances + charges.
    pub tax_exclusive_amount: Decimal,
    /// BT-112: tax exclusive + VAT.
    pub tax_inclusive_amount: Decimal,
    /// BT-113
    pub paid_amount: Decimal,
    /// BT-114
    pub rounding_amount: Decimal,
    /// BT-115: tax inclusive - paid + rounding.
    pub payable_amount: Decimal,
    /// BG-23: One entry per (category, rate), in first-seen order.
    pub vat_breakdown: Vec<VatBreakdown>,
}

/// BG-23: VAT breakdown per category/rate combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VatBreakdown {
    /// BT-118
    pub category: TaxCategory,
    /// BT-119; `None` for groups not subject to VAT.
    pub rate: Option<Decimal>,
    /// BT-121: Exemption reason code (VATEX).
    pub exemption_reason_code: Option<String>,
    /// BT-120
    pub exemption_reason: Option<String>,
    /// BT-116
    pub taxable_amount: Decimal,
    /// BT-117
    pub tax_amount: Decimal,
}

/// VAT attributes a contributor (line or allowance/charge) brings to its group.
struct Contribution<'a> {
    category: TaxCategory,
    rate: Option<Decimal>,
    exemption_reason_code: Option<&'a str>,
    exemption_reason: Option<&'a str>,
}

impl<'a> From<&'a AllowanceOrCharge> for Contribution<'a> {
    fn from(item: &'a AllowanceOrCharge) -> Self {
        Self {
            category: item.vat_category(),
            rate: item.vat_rate(),
            exemption_reason_code: item.vat_exemption_reason_code(),
            exemption_reason: item.vat_exemption_reason(),
        }
    }
}

/// Groups keyed by `(category, rate)` kept in first-seen order.
///
/// `rate == None` is its own group, distinct from `Some(0)`.
#[derive(Default)]
struct VatMap {
    groups: Vec<VatBreakdown>,
}

impl VatMap {
    fn add(&mut self, contribution: Contribution<'_>, amount: Decimal, arith: &mut Arith) {
        let existing = self
            .groups
            .iter_mut()
            .find(|g| g.category == contribution.category && g.rate == contribution.rate);
        match existing {
            // First contributor's exemption wins; later values are ignored.
            Some(group) => group.taxable_amount = arith.add(group.taxable_amount, amount),
            None => self.groups.push(VatBreakdown {
                category: contribution.category,
                rate: contribution.rate,
                exemption_reason_code: contribution.exemption_reason_code.map(String::from),
                exemption_reason: contribution.exemption_reason.map(String::from),
                taxable_amount: amount,
                tax_amount: Decimal::ZERO,
            }),
        }
    }
}

impl InvoiceTotals {
    /// Run the totals engine over `invoice`.
    ///
    /// Never fails: unset optional fields (e.g. a line without price)
    /// contribute zero. Completeness is checked by the writer and the
    /// rule registry. Amounts beyond the `Decimal` range saturate; use
    /// [`try_from_invoice`](Self::try_from_invoice) to detect that.
    pub fn from_invoice(invoice: &Invoice) -> Self {
        Self::compute(invoice, &mut Arith::default())
    }

    /// Like [`from_invoice`](Self::from_invoice), but fails with a range
    /// error when an intermediate amount does not fit a `Decimal`.
    pub fn try_from_invoice(invoice: &Invoice) -> Result<Self, InvoiceError> {
        let mut arith = Arith::default();
        let totals = Self::compute(invoice, &mut arith);
        if arith.overflowed() {
            return Err(InvoiceError::Range(
                "invoice amounts exceed the representable decimal range".into(),
            ));
        }
        Ok(totals)
    }

    fn compute(invoice: &Invoice, arith: &mut Arith) -> Self {
        let matrix = invoice.rounding_matrix();
        let mut vat_map = VatMap::default();

        // Lines
        let mut net_amount = Decimal::ZERO;
        for line in invoice.lines() {
            let line_net = line.net_amount_in(matrix, arith).unwrap_or(Decimal::ZERO);
            net_amount = arith.add(net_amount, line_net);
            vat_map.add(
                Contribution {
                    category: line.vat_category(),
                    rate: line.vat_rate(),
                    exemption_reason_code: line.vat_exemption_reason_code(),
                    exemption_reason: line.vat_exemption_reason(),
                },
                line_net,
                arith,
            );
        }
        let net_amount = matrix.round(net_amount, fields::INVOICE_NET_AMOUNT);

        // Document-level allowances reduce the taxable base
        let mut allowances_amount = Decimal::ZERO;
        for allowance in invoice.allowances() {
            let amount = document_level_amount_in(invoice, allowance, net_amount, arith);
            allowances_amount = arith.add(allowances_amount, amount);
            vat_map.add(allowance.into(), -amount, arith);
        }
        let allowances_amount = matrix.round(
            allowances_amount,
            fields::INVOICE_ALLOWANCES_CHARGES_AMOUNT,
        );

        // Document-level charges increase the taxable base
        let mut charges_amount = Decimal::ZERO;
        for charge in invoice.charges() {
            let amount = document_level_amount_in(invoice, charge, net_amount, arith);
            charges_amount = arith.add(charges_amount, amount);
            vat_map.add(charge.into(), amount, arith);
        }
        let charges_amount =
            matrix.round(charges_amount, fields::INVOICE_ALLOWANCES_CHARGES_AMOUNT);

        let mut vat_amount = Decimal::ZERO;
        for group in &mut vat_map.groups {
            group.taxable_amount = matrix.round(group.taxable_amount, fields::INVOICE_TAXABLE_AMOUNT);
            let rate = group.rate.unwrap_or(Decimal::ZERO);
            let scaled = arith.mul(group.taxable_amount, rate);
            group.tax_amount = matrix.round(
                arith.div(scaled, Decimal::ONE_HUNDRED),
                fields::INVOICE_TAX_AMOUNT,
            );
            vat_amount = arith.add(vat_amount, group.tax_amount);
        }
        let vat_amount = matrix.round(vat_amount, fields::INVOICE_VAT_AMOUNT);

        let tax_exclusive_amount = arith.sub(net_amount, allowances_amount);
        let tax_exclusive_amount = matrix.round(
            arith.add(tax_exclusive_amount, charges_amount),
            fields::INVOICE_TAX_EXCLUSIVE_AMOUNT,
        );
        let tax_inclusive_amount = matrix.round(
            arith.add(tax_exclusive_amount, vat_amount),
            fields::INVOICE_TAX_INCLUSIVE_AMOUNT,
        );
        let paid_amount = matrix.round(invoice.paid_amount(), fields::INVOICE_PAID_AMOUNT);
        let rounding_amount =
            matrix.round(invoice.rounding_amount(), fields::INVOICE_ROUNDING_AMOUNT);
        let payable_amount = arith.sub(tax_inclusive_amount, paid_amount);
        let payable_amount = matrix.round(
            arith.add(payable_amount, rounding_amount),
            fields::INVOICE_PAYABLE_AMOUNT,
        );

        Self {
            currency: invoice.currency().to_string(),
            net_amount,
            allowances_amount,
            charges_amount,
            vat_amount,
            tax_exclusive_amount,
            tax_inclusive_amount,
            paid_amount,
            rounding_amount,
            payable_amount,
            vat_breakdown: vat_map.groups,
        }
    }
}

/// Effective amount of a document-level allowance/charge, applied to the
/// line-summed net amount.
pub fn document_level_amount(invoice: &Invoice, item: &AllowanceOrCharge, net_amount: Decimal) -> Decimal {
    document_level_amount_in(invoice, item, net_amount, &mut Arith::default())
}

fn document_level_amount_in(
    invoice: &Invoice,
    item: &AllowanceOrCharge,
    net_amount: Decimal,
    arith: &mut Arith,
) -> Decimal {
    invoice.round(
        item.effective_amount_in(net_amount, arith),
        fields::INVOICE_ALLOWANCES_CHARGES_AMOUNT,
    )
}
