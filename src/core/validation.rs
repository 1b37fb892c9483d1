use rust_decimal::Decimal;
use tracing::debug;

use super::arith::Arith;
use super::codes::CodeList;
use super::error::ValidationError;
use super::invoice::Invoice;
use super::line::InvoiceLine;
use super::party::Party;
use super::registry::PresetRegistry;
use super::types::*;

/// A named predicate over an invoice.
///
/// `check` returns `None` when the invoice satisfies the rule and a
/// human-readable message otherwise.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub id: &'static str,
    pub check: fn(&Invoice) -> Option<String>,
}

impl Rule {
    pub const fn new(id: &'static str, check: fn(&Invoice) -> Option<String>) -> Self {
        Self { id, check }
    }

    /// Evaluate the rule, wrapping a failure into a [`ValidationError`].
    pub fn evaluate(&self, invoice: &Invoice) -> Option<ValidationError> {
        (self.check)(invoice).map(|message| ValidationError::new(self.id, message))
    }
}

/// Validate `invoice` against the base EN 16931 rules, then against the
/// rules of the preset registered for its specification identifier.
///
/// Stops at the first failing rule.
pub fn validate(invoice: &Invoice, registry: &PresetRegistry) -> Result<(), ValidationError> {
    match rules_for(invoice, registry)
        .iter()
        .find_map(|rule| rule.evaluate(invoice))
    {
        Some(err) => {
            debug!(number = invoice.number(), rule = %err.rule, "invoice failed validation");
            Err(err)
        }
        None => Ok(()),
    }
}

/// Like [`validate`] but returns every failure instead of the first one.
pub fn validate_all(invoice: &Invoice, registry: &PresetRegistry) -> Vec<ValidationError> {
    let errors: Vec<_> = rules_for(invoice, registry)
        .iter()
        .filter_map(|rule| rule.evaluate(invoice))
        .collect();
    debug!(
        number = invoice.number(),
        specification = invoice.specification(),
        failures = errors.len(),
        "validated invoice"
    );
    errors
}

fn rules_for(invoice: &Invoice, registry: &PresetRegistry) -> Vec<Rule> {
    let mut rules = en16931_rules();
    if let Some(preset) = registry.get(invoice.specification()) {
        rules.extend(preset.rules());
    }
    rules
}

/// Base EN 16931 rule set, evaluated for every specification.
///
/// BR-4 (type code) and BR-22 (line quantity) are not listed: the model
/// cannot represent an invoice without them.
pub fn en16931_rules() -> Vec<Rule> {
    vec![
        Rule::new("BR-1", br_1),
        Rule::new("BR-2", br_2),
        Rule::new("BR-3", br_3),
        Rule::new("BR-5", br_5),
        Rule::new("BR-6", br_6),
        Rule::new("BR-7", br_7),
        Rule::new("BR-8", br_8),
        Rule::new("BR-9", br_9),
        Rule::new("BR-10", br_10),
        Rule::new("BR-11", br_11),
        Rule::new("BR-16", br_16),
        Rule::new("BR-17", br_17),
        Rule::new("BR-21", br_21),
        Rule::new("BR-23", br_23),
        Rule::new("BR-24", br_24),
        Rule::new("BR-25", br_25),
        Rule::new("BR-26", br_26),
        Rule::new("BR-27", br_27),
        Rule::new("BR-33", br_33),
        Rule::new("BR-38", br_38),
        Rule::new("BR-42", br_42),
        Rule::new("BR-44", br_44),
        Rule::new("BR-CO-10", br_co_10),
        Rule::new("BR-CO-13", br_co_13),
        Rule::new("BR-CO-15", br_co_15),
        Rule::new("BR-CO-25", br_co_25),
        Rule::new("BR-CL-3", br_cl_3),
        Rule::new("BR-CL-14", br_cl_14),
        Rule::new("BR-S-5", br_s_5),
        Rule::new("BR-Z-5", br_z_5),
        Rule::new("BR-E-5", br_e_5),
        Rule::new("BR-E-10", br_e_10),
        Rule::new("BR-O-5", br_o_5),
    ]
}

pub(crate) fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

fn party_name(party: Option<&Party>) -> Option<&str> {
    party.and_then(|p| p.name.as_deref())
}

/// First line (1-based position) matching `pred`, formatted into a message.
fn first_line(
    invoice: &Invoice,
    pred: impl Fn(&InvoiceLine) -> bool,
    message: &str,
) -> Option<String> {
    invoice
        .lines()
        .iter()
        .position(pred)
        .map(|i| format!("line {}: {message}", i + 1))
}

fn lacks_reason(item: &AllowanceOrCharge) -> bool {
    is_blank(item.reason()) && is_blank(item.reason_code())
}

fn br_1(inv: &Invoice) -> Option<String> {
    is_blank(Some(inv.specification()))
        .then(|| "an invoice shall have a specification identifier (BT-24)".into())
}

fn br_2(inv: &Invoice) -> Option<String> {
    is_blank(inv.number()).then(|| "an invoice shall have an invoice number (BT-1)".into())
}

fn br_3(inv: &Invoice) -> Option<String> {
    inv.issue_date()
        .is_none()
        .then(|| "an invoice shall have an issue date (BT-2)".into())
}

fn br_5(inv: &Invoice) -> Option<String> {
    is_blank(Some(inv.currency()))
        .then(|| "an invoice shall have a currency code (BT-5)".into())
}

fn br_6(inv: &Invoice) -> Option<String> {
    is_blank(party_name(inv.seller())).then(|| "an invoice shall contain the seller name (BT-27)".into())
}

fn br_7(inv: &Invoice) -> Option<String> {
    is_blank(party_name(inv.buyer())).then(|| "an invoice shall contain the buyer name (BT-44)".into())
}

fn br_8(inv: &Invoice) -> Option<String> {
    inv.seller()
        .is_none_or(|p| p.address.is_empty())
        .then(|| "an invoice shall contain the seller postal address (BG-5)".into())
}

fn br_9(inv: &Invoice) -> Option<String> {
    is_blank(inv.seller().and_then(Party::country_code))
        .then(|| "the seller postal address shall contain a country code (BT-40)".into())
}

fn br_10(inv: &Invoice) -> Option<String> {
    inv.buyer()
        .is_none_or(|p| p.address.is_empty())
        .then(|| "an invoice shall contain the buyer postal address (BG-8)".into())
}

fn br_11(inv: &Invoice) -> Option<String> {
    is_blank(inv.buyer().and_then(Party::country_code))
        .then(|| "the buyer postal address shall contain a country code (BT-55)".into())
}

fn br_16(inv: &Invoice) -> Option<String> {
    inv.lines()
        .is_empty()
        .then(|| "an invoice shall have at least one invoice line (BG-25)".into())
}

fn br_17(inv: &Invoice) -> Option<String> {
    inv.distinct_payee()
        .is_some_and(|p| is_blank(p.name.as_deref()))
        .then(|| "the payee name (BT-59) shall be provided when the payee differs from the seller".into())
}

// Lines without an explicit id are numbered by position on export.
fn br_21(inv: &Invoice) -> Option<String> {
    first_line(
        inv,
        |l| l.id().is_some_and(|id| id.trim().is_empty()),
        "invoice line identifier (BT-126) must not be blank",
    )
}

fn br_23(inv: &Invoice) -> Option<String> {
    first_line(
        inv,
        |l| l.unit().trim().is_empty(),
        "invoiced quantity unit of measure code (BT-130) is missing",
    )
}

fn br_24(inv: &Invoice) -> Option<String> {
    first_line(
        inv,
        |l| l.price().is_none(),
        "invoice line net amount (BT-131) cannot be computed without a price",
    )
}

fn br_25(inv: &Invoice) -> Option<String> {
    first_line(inv, |l| is_blank(l.name()), "item name (BT-153) is missing")
}

fn br_26(inv: &Invoice) -> Option<String> {
    first_line(inv, |l| l.price().is_none(), "item net price (BT-146) is missing")
}

fn br_27(inv: &Invoice) -> Option<String> {
    first_line(
        inv,
        |l| l.price().is_some_and(|p| p < Decimal::ZERO),
        "item net price (BT-146) shall not be negative",
    )
}

fn br_33(inv: &Invoice) -> Option<String> {
    inv.allowances()
        .iter()
        .any(lacks_reason)
        .then(|| "each document level allowance shall have a reason (BT-97) or reason code (BT-98)".into())
}

fn br_38(inv: &Invoice) -> Option<String> {
    inv.charges()
        .iter()
        .any(lacks_reason)
        .then(|| "each document level charge shall have a reason (BT-104) or reason code (BT-105)".into())
}

fn br_42(inv: &Invoice) -> Option<String> {
    first_line(
        inv,
        |l| l.allowances().iter().any(lacks_reason),
        "each line allowance shall have a reason (BT-139) or reason code (BT-140)",
    )
}

fn br_44(inv: &Invoice) -> Option<String> {
    first_line(
        inv,
        |l| l.charges().iter().any(lacks_reason),
        "each line charge shall have a reason (BT-144) or reason code (BT-145)",
    )
}

fn br_co_10(inv: &Invoice) -> Option<String> {
    let totals = match inv.try_totals() {
        Ok(totals) => totals,
        Err(e) => return Some(e.to_string()),
    };
    let matrix = inv.rounding_matrix();
    let mut arith = Arith::default();
    let nets: Vec<Decimal> = inv
        .lines()
        .iter()
        .filter_map(|l| l.net_amount_in(matrix, &mut arith))
        .collect();
    let sum = arith.sum(nets);
    (totals.net_amount != sum).then(|| {
        format!(
            "sum of invoice line net amounts (BT-106) is {}, lines add up to {sum}",
            totals.net_amount
        )
    })
}

fn br_co_13(inv: &Invoice) -> Option<String> {
    let t = inv.try_totals().ok()?;
    let expected = t
        .net_amount
        .checked_sub(t.allowances_amount)
        .and_then(|v| v.checked_add(t.charges_amount))?;
    (t.tax_exclusive_amount != expected).then(|| {
        format!(
            "total without VAT (BT-109) is {}, expected {expected}",
            t.tax_exclusive_amount
        )
    })
}

fn br_co_15(inv: &Invoice) -> Option<String> {
    let t = inv.try_totals().ok()?;
    let expected = t.tax_exclusive_amount.checked_add(t.vat_amount)?;
    (t.tax_inclusive_amount != expected).then(|| {
        format!(
            "total with VAT (BT-112) is {}, expected {expected}",
            t.tax_inclusive_amount
        )
    })
}

fn br_co_25(inv: &Invoice) -> Option<String> {
    let has_terms = inv.payment().is_some_and(|p| !is_blank(p.terms.as_deref()));
    (inv.totals().payable_amount > Decimal::ZERO && inv.due_date().is_none() && !has_terms).then(
        || "a positive amount due (BT-115) requires a due date (BT-9) or payment terms (BT-20)".into(),
    )
}

fn br_cl_3(inv: &Invoice) -> Option<String> {
    (!CodeList::Currency.contains(inv.currency()))
        .then(|| format!("currency code '{}' is not an ISO 4217 code", inv.currency()))
}

fn br_cl_14(inv: &Invoice) -> Option<String> {
    [inv.seller(), inv.buyer(), inv.payee()]
        .into_iter()
        .flatten()
        .filter_map(Party::country_code)
        .find(|code| !CodeList::Country.contains(code))
        .map(|code| format!("country code '{code}' is not an ISO 3166-1 alpha-2 code"))
}

fn br_s_5(inv: &Invoice) -> Option<String> {
    first_line(
        inv,
        |l| {
            l.vat_category() == TaxCategory::StandardRate
                && l.vat_rate().is_none_or(|r| r <= Decimal::ZERO)
        },
        "standard rated lines shall have a VAT rate greater than zero (BT-152)",
    )
}

fn br_z_5(inv: &Invoice) -> Option<String> {
    first_line(
        inv,
        |l| l.vat_category() == TaxCategory::ZeroRated && l.vat_rate() != Some(Decimal::ZERO),
        "zero rated lines shall have a VAT rate of 0 (BT-152)",
    )
}

fn br_e_5(inv: &Invoice) -> Option<String> {
    first_line(
        inv,
        |l| l.vat_category() == TaxCategory::Exempt && l.vat_rate() != Some(Decimal::ZERO),
        "exempt lines shall have a VAT rate of 0 (BT-152)",
    )
}

fn br_e_10(inv: &Invoice) -> Option<String> {
    inv.totals()
        .vat_breakdown
        .iter()
        .any(|b| {
            b.category == TaxCategory::Exempt
                && is_blank(b.exemption_reason.as_deref())
                && is_blank(b.exemption_reason_code.as_deref())
        })
        .then(|| {
            "an exempt VAT breakdown shall have an exemption reason (BT-120) or reason code (BT-121)"
                .into()
        })
}

fn br_o_5(inv: &Invoice) -> Option<String> {
    first_line(
        inv,
        |l| l.vat_category() == TaxCategory::NotSubjectToVat && l.vat_rate().is_some(),
        "lines not subject to VAT shall not contain a VAT rate (BT-152)",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Address, InvoiceLine, RoundingMatrix};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn party(name: &str, country: &str) -> Party {
        let mut p = Party::new();
        p.name = Some(name.into());
        let mut address = Address::new();
        address.set_country_code(Some(country.into()));
        p.address = address;
        p
    }

    fn valid_invoice() -> Invoice {
        let mut inv = Invoice::new();
        inv.set_number(Some("INV-1".into()))
            .set_issue_date(NaiveDate::from_ymd_opt(2024, 3, 1))
            .set_due_date(NaiveDate::from_ymd_opt(2024, 3, 31))
            .set_seller(Some(party("Seller SL", "ES")))
            .set_buyer(Some(party("Buyer SA", "FR")));
        let mut line = InvoiceLine::new();
        line.set_name(Some("Widget".into()))
            .set_price(Some(dec!(10)))
            .set_vat_rate(Some(dec!(21)))
            .unwrap();
        inv.add_line(line);
        inv
    }

    fn first_failure(inv: &Invoice) -> Option<&'static str> {
        en16931_rules()
            .into_iter()
            .find(|r| (r.check)(inv).is_some())
            .map(|r| r.id)
    }

    #[test]
    fn valid_invoice_passes_base_rules() {
        assert_eq!(first_failure(&valid_invoice()), None);
    }

    #[test]
    fn missing_number_fails_br_2() {
        let mut inv = valid_invoice();
        inv.set_number(None);
        assert_eq!(first_failure(&inv), Some("BR-2"));
    }

    #[test]
    fn zero_rated_line_with_rate() {
        let mut inv = valid_invoice();
        inv.lines_mut()[0].set_vat_category(TaxCategory::ZeroRated);
        assert_eq!(first_failure(&inv), Some("BR-Z-5"));
    }

    #[test]
    fn not_subject_line_with_zero_rate() {
        let mut inv = valid_invoice();
        inv.lines_mut()[0]
            .set_vat_category(TaxCategory::NotSubjectToVat)
            .set_vat_rate(Some(Decimal::ZERO))
            .unwrap();
        assert_eq!(first_failure(&inv), Some("BR-O-5"));
    }

    #[test]
    fn exempt_breakdown_needs_reason() {
        let mut inv = valid_invoice();
        inv.lines_mut()[0]
            .set_vat_category(TaxCategory::Exempt)
            .set_vat_rate(Some(Decimal::ZERO))
            .unwrap();
        assert_eq!(first_failure(&inv), Some("BR-E-10"));
        inv.lines_mut()[0].set_vat_exemption_reason(Some("Article 132".into()));
        assert_eq!(first_failure(&inv), None);
    }

    #[test]
    fn coarse_net_rounding_breaks_line_sum() {
        let mut inv = valid_invoice();
        inv.lines_mut()[0].set_price(Some(dec!(10.25)));
        inv.set_rounding_matrix(RoundingMatrix::new().with_field("invoice/netAmount", 0));
        assert_eq!(first_failure(&inv), Some("BR-CO-10"));
    }

    #[test]
    fn overflowing_amounts_fail_line_sum_rule() {
        let mut inv = valid_invoice();
        inv.lines_mut()[0]
            .set_price(Some(Decimal::MAX))
            .set_quantity(dec!(2));
        assert_eq!(first_failure(&inv), Some("BR-CO-10"));
        // Remaining rules still evaluate without panicking
        assert!(!validate_all(&inv, &PresetRegistry::new()).is_empty());
    }

    #[test]
    fn payable_without_due_date_or_terms() {
        let mut inv = valid_invoice();
        inv.set_due_date(None);
        assert_eq!(first_failure(&inv), Some("BR-CO-25"));
        inv.set_payment(Some(Payment {
            terms: Some("30 days net".into()),
            ..Default::default()
        }));
        assert_eq!(first_failure(&inv), None);
    }

    #[test]
    fn unknown_country_code() {
        let mut inv = valid_invoice();
        if let Some(buyer) = inv.buyer_mut() {
            buyer.address.set_country_code(Some("XX".into()));
        }
        assert_eq!(first_failure(&inv), Some("BR-CL-14"));
    }

    #[test]
    fn failure_message_names_line() {
        let mut inv = valid_invoice();
        inv.add_line(InvoiceLine::new());
        let err = Rule::new("BR-25", br_25).evaluate(&inv).unwrap();
        assert_eq!(err.rule, "BR-25");
        assert!(err.message.starts_with("line 2:"));
    }
}
