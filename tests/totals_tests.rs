use chrono::NaiveDate;
use einvoice::core::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn party(name: &str, country: &str) -> Party {
    PartyBuilder::new(name, AddressBuilder::new("City", "1000", country).build().unwrap())
        .vat_number(format!("{country}123456789"))
        .build()
}

fn line(quantity: Decimal, price: Decimal, category: TaxCategory, rate: Option<Decimal>) -> InvoiceLine {
    InvoiceLineBuilder::new("Item", quantity, "C62", price)
        .vat(category, rate)
        .build()
        .unwrap()
}

fn invoice_with(lines: Vec<InvoiceLine>) -> Invoice {
    let mut builder = InvoiceBuilder::new("T-1", date(2024, 1, 1))
        .due_date(date(2024, 1, 31))
        .seller(party("Seller", "ES"))
        .buyer(party("Buyer", "PT"));
    for l in lines {
        builder = builder.add_line(l);
    }
    builder.build()
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn single_standard_rated_line() {
    let inv = invoice_with(vec![line(dec!(1), dec!(100), TaxCategory::StandardRate, Some(dec!(21)))]);
    let t = inv.totals();

    assert_eq!(t.currency, "EUR");
    assert_eq!(t.net_amount, dec!(100));
    assert_eq!(t.allowances_amount, dec!(0));
    assert_eq!(t.charges_amount, dec!(0));
    assert_eq!(t.tax_exclusive_amount, dec!(100));
    assert_eq!(t.vat_amount, dec!(21));
    assert_eq!(t.tax_inclusive_amount, dec!(121));
    assert_eq!(t.payable_amount, dec!(121));
    assert_eq!(
        t.vat_breakdown,
        vec![VatBreakdown {
            category: TaxCategory::StandardRate,
            rate: Some(dec!(21)),
            exemption_reason_code: None,
            exemption_reason: None,
            taxable_amount: dec!(100),
            tax_amount: dec!(21),
        }]
    );
}

#[test]
fn three_decimal_precision_scenario() {
    let mut inv = invoice_with(vec![line(
        dec!(0.25),
        dec!(26935.78),
        TaxCategory::StandardRate,
        Some(dec!(19)),
    )]);
    inv.set_rounding_matrix(RoundingMatrix::new().with_default(3));
    let t = inv.totals();

    assert_eq!(t.net_amount, dec!(6733.945));
    assert_eq!(t.tax_exclusive_amount, dec!(6733.945));
    assert_eq!(t.vat_amount, dec!(1279.45));
    assert_eq!(t.tax_inclusive_amount, dec!(8013.395));
}

#[test]
fn percentage_document_allowance() {
    let mut inv = invoice_with(vec![line(dec!(1), dec!(100), TaxCategory::StandardRate, Some(dec!(21)))]);
    inv.add_allowance(
        AllowanceChargeBuilder::percentage(dec!(5))
            .reason("Discount")
            .vat(TaxCategory::StandardRate, dec!(21))
            .build()
            .unwrap(),
    );
    let t = inv.totals();

    assert_eq!(t.allowances_amount, dec!(5));
    assert_eq!(t.tax_exclusive_amount, dec!(95));
    assert_eq!(t.vat_breakdown.len(), 1);
    assert_eq!(t.vat_breakdown[0].taxable_amount, dec!(95));
    assert_eq!(t.vat_breakdown[0].tax_amount, dec!(19.95));
}

#[test]
fn line_allowances_and_charges_change_line_net() {
    let mut l = line(dec!(4), dec!(25), TaxCategory::StandardRate, Some(dec!(10)));
    l.add_allowance(AllowanceOrCharge::percentage(dec!(10)));
    l.add_charge(AllowanceOrCharge::fixed(dec!(3.5)));
    let inv = invoice_with(vec![l]);

    // 100 - 10 + 3.5
    assert_eq!(inv.totals().net_amount, dec!(93.5));
    assert_eq!(inv.totals().vat_amount, dec!(9.35));
}

#[test]
fn base_quantity_divides_price() {
    let mut l = line(dec!(250), dec!(12), TaxCategory::StandardRate, Some(dec!(21)));
    l.set_base_quantity(dec!(100)).unwrap();
    let inv = invoice_with(vec![l]);
    assert_eq!(inv.totals().net_amount, dec!(30));
}

#[test]
fn breakdown_keeps_first_seen_order_across_lines_and_charges() {
    let mut inv = invoice_with(vec![
        line(dec!(1), dec!(10), TaxCategory::StandardRate, Some(dec!(21))),
        line(dec!(1), dec!(20), TaxCategory::StandardRate, Some(dec!(10))),
        line(dec!(1), dec!(30), TaxCategory::StandardRate, Some(dec!(21))),
    ]);
    inv.add_charge(
        AllowanceChargeBuilder::fixed(dec!(5))
            .reason("Packing")
            .vat(TaxCategory::StandardRate, dec!(4))
            .build()
            .unwrap(),
    );
    let t = inv.totals();

    let keys: Vec<_> = t.vat_breakdown.iter().map(|b| (b.category, b.rate)).collect();
    assert_eq!(
        keys,
        vec![
            (TaxCategory::StandardRate, Some(dec!(21))),
            (TaxCategory::StandardRate, Some(dec!(10))),
            (TaxCategory::StandardRate, Some(dec!(4))),
        ]
    );
    assert_eq!(t.vat_breakdown[0].taxable_amount, dec!(40));
    assert_eq!(t.vat_breakdown[2].taxable_amount, dec!(5));
    assert_eq!(t.charges_amount, dec!(5));
}

#[test]
fn missing_rate_is_its_own_group() {
    let inv = invoice_with(vec![
        line(dec!(1), dec!(10), TaxCategory::NotSubjectToVat, None),
        line(dec!(1), dec!(10), TaxCategory::NotSubjectToVat, Some(dec!(0))),
    ]);
    let t = inv.totals();
    assert_eq!(t.vat_breakdown.len(), 2);
    assert_eq!(t.vat_breakdown[0].rate, None);
    assert_eq!(t.vat_breakdown[1].rate, Some(dec!(0)));
    assert_eq!(t.vat_amount, dec!(0));
}

#[test]
fn first_exemption_reason_wins() {
    let mut first = line(dec!(1), dec!(10), TaxCategory::Exempt, Some(dec!(0)));
    first.set_vat_exemption_reason(Some("Medical".into()));
    let mut second = line(dec!(1), dec!(10), TaxCategory::Exempt, Some(dec!(0)));
    second.set_vat_exemption_reason(Some("Financial".into()));
    let inv = invoice_with(vec![first, second]);

    let t = inv.totals();
    assert_eq!(t.vat_breakdown.len(), 1);
    assert_eq!(t.vat_breakdown[0].exemption_reason.as_deref(), Some("Medical"));
    assert_eq!(t.vat_breakdown[0].taxable_amount, dec!(20));
}

#[test]
fn paid_and_rounding_amounts_adjust_payable() {
    let mut inv = invoice_with(vec![line(dec!(1), dec!(99.99), TaxCategory::StandardRate, Some(dec!(21)))]);
    inv.set_rounding_matrix(RoundingMatrix::new().with_default(2));
    inv.set_paid_amount(dec!(20)).set_rounding_amount(dec!(-0.01));
    let t = inv.totals();

    // 99.99 * 1.21 = 120.9879 -> VAT 21.00
    assert_eq!(t.vat_amount, dec!(21.00));
    assert_eq!(t.tax_inclusive_amount, dec!(120.99));
    assert_eq!(t.payable_amount, dec!(100.98));
}

#[test]
fn unset_price_contributes_zero() {
    let mut l = line(dec!(3), dec!(1), TaxCategory::StandardRate, Some(dec!(21)));
    l.set_price(None);
    let inv = invoice_with(vec![l, line(dec!(1), dec!(10), TaxCategory::StandardRate, Some(dec!(21)))]);
    assert_eq!(inv.totals().net_amount, dec!(10));
}

#[test]
fn empty_invoice_has_zero_totals() {
    let t = Invoice::new().totals();
    assert_eq!(t.net_amount, Decimal::ZERO);
    assert_eq!(t.payable_amount, Decimal::ZERO);
    assert!(t.vat_breakdown.is_empty());
}

// ---------------------------------------------------------------------------
// Rounding matrix
// ---------------------------------------------------------------------------

#[test]
fn matrix_precedence() {
    let matrix = RoundingMatrix::new()
        .with_default(2)
        .with_field("invoice/taxAmount", 4);
    assert_eq!(matrix.decimals("invoice/taxAmount"), 4);
    assert_eq!(matrix.decimals("invoice/netAmount"), 2);
    assert_eq!(RoundingMatrix::new().decimals("invoice/netAmount"), DEFAULT_DECIMALS);
    assert_eq!(DEFAULT_DECIMALS, 8);
}

#[test]
fn matrix_precedence_drives_totals() {
    // Identical inputs; only the matrix setup differs
    let lines = || vec![line(dec!(1), dec!(10.01), TaxCategory::StandardRate, Some(dec!(19.5)))];

    let mut field_entry = invoice_with(lines());
    field_entry.set_rounding_matrix(
        RoundingMatrix::new()
            .with_default(2)
            .with_field("invoice/taxAmount", 3),
    );
    let mut matrix_default = invoice_with(lines());
    matrix_default.set_rounding_matrix(RoundingMatrix::new().with_default(2));
    let fallback = invoice_with(lines());
    assert!(fallback.rounding_matrix().is_empty());

    let field_entry = field_entry.totals();
    let matrix_default = matrix_default.totals();
    let fallback = fallback.totals();

    assert_eq!(field_entry.vat_breakdown[0].tax_amount, dec!(1.952));
    assert_eq!(matrix_default.vat_breakdown[0].tax_amount, dec!(1.95));
    assert_eq!(fallback.vat_breakdown[0].tax_amount, dec!(1.95195));

    // invoice/vatAmount has no entry of its own in the first matrix
    assert_eq!(field_entry.vat_amount, dec!(1.95));
    assert_eq!(matrix_default.vat_amount, dec!(1.95));
    assert_eq!(fallback.vat_amount, dec!(1.95195));
    assert_eq!(fallback.tax_inclusive_amount, dec!(11.96195));
}

#[test]
fn field_override_changes_group_tax() {
    let mut inv = invoice_with(vec![line(dec!(1), dec!(10.01), TaxCategory::StandardRate, Some(dec!(19)))]);
    inv.set_rounding_matrix(RoundingMatrix::new().with_default(2));
    assert_eq!(inv.totals().vat_breakdown[0].tax_amount, dec!(1.90));

    inv.set_rounding_matrix(
        RoundingMatrix::new()
            .with_default(2)
            .with_field("invoice/taxAmount", 4),
    );
    assert_eq!(inv.totals().vat_breakdown[0].tax_amount, dec!(1.9019));
}

#[test]
fn rounding_is_half_away_from_zero() {
    assert_eq!(round_half_up(dec!(2.345), 2), dec!(2.35));
    assert_eq!(round_half_up(dec!(-2.345), 2), dec!(-2.35));
    assert_eq!(round_half_up(dec!(2.344), 2), dec!(2.34));

    let inv = Invoice::new();
    assert_eq!(inv.round(dec!(0.123456785), "line/netAmount"), dec!(0.12345679));
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

#[test]
fn out_of_range_allowance_removal_leaves_list_unchanged() {
    let mut inv = invoice_with(vec![line(dec!(1), dec!(100), TaxCategory::StandardRate, Some(dec!(21)))]);
    inv.add_allowance(AllowanceOrCharge::fixed(dec!(1)));
    inv.add_allowance(AllowanceOrCharge::fixed(dec!(2)));

    let err = inv.remove_allowance(2).unwrap_err();
    assert!(matches!(err, InvoiceError::Range(_)));
    assert_eq!(inv.allowances().len(), 2);

    let removed = inv.remove_allowance(0).unwrap();
    assert_eq!(removed.amount(), dec!(1));
    assert_eq!(inv.allowances()[0].amount(), dec!(2));
}

#[test]
fn out_of_range_removals_report_range_errors() {
    let mut inv = invoice_with(vec![line(dec!(1), dec!(1), TaxCategory::StandardRate, Some(dec!(21)))]);
    assert!(matches!(inv.remove_line(1), Err(InvoiceError::Range(_))));
    assert!(matches!(inv.remove_note(0), Err(InvoiceError::Range(_))));
    assert!(matches!(inv.remove_charge(0), Err(InvoiceError::Range(_))));
    assert!(matches!(inv.remove_preceding_invoice(0), Err(InvoiceError::Range(_))));
    assert!(matches!(
        inv.lines_mut()[0].remove_allowance(0),
        Err(InvoiceError::Range(_))
    ));
    assert_eq!(inv.lines().len(), 1);
}

#[test]
fn invalid_values_are_rejected_at_the_setter() {
    let mut l = InvoiceLine::new();
    assert!(matches!(l.set_base_quantity(dec!(0)), Err(InvoiceError::Range(_))));
    assert!(matches!(l.set_vat_rate(Some(dec!(-1))), Err(InvoiceError::Range(_))));
    assert_eq!(l.base_quantity(), dec!(1));
    assert_eq!(l.vat_rate(), None);

    let too_many = AddressBuilder::new("Bucharest", "010011", "RO")
        .line("a")
        .line("b")
        .line("c")
        .line("d")
        .build();
    assert!(matches!(too_many, Err(InvoiceError::Range(_))));
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[test]
fn invoice_survives_json_round_trip() {
    let mut inv = invoice_with(vec![line(dec!(2.5), dec!(19.99), TaxCategory::StandardRate, Some(dec!(21)))]);
    inv.set_rounding_matrix(RoundingMatrix::new().with_default(2).with_field("invoice/taxAmount", 3));
    inv.add_allowance(AllowanceOrCharge::percentage(dec!(2.5)));

    let json = serde_json::to_string(&inv).unwrap();
    let back: Invoice = serde_json::from_str(&json).unwrap();
    assert_eq!(back, inv);
    assert_eq!(back.totals(), inv.totals());
    // Decimals are persisted as strings, never floats
    assert!(json.contains("\"19.99\""));
}

#[test]
fn json_rejects_non_positive_base_quantity() {
    let l = line(dec!(2), dec!(5), TaxCategory::StandardRate, Some(dec!(21)));
    let json = serde_json::to_string(&l).unwrap();
    assert!(json.contains("\"base_quantity\":\"1\""));

    let zero = json.replace("\"base_quantity\":\"1\"", "\"base_quantity\":\"0\"");
    let err = serde_json::from_str::<InvoiceLine>(&zero).unwrap_err();
    assert!(err.to_string().contains("base quantity"), "{err}");

    let negative = json.replace("\"base_quantity\":\"1\"", "\"base_quantity\":\"-2\"");
    assert!(serde_json::from_str::<InvoiceLine>(&negative).is_err());
}

#[test]
fn json_rejects_negative_vat_rate() {
    let inv = invoice_with(vec![line(dec!(1), dec!(10), TaxCategory::StandardRate, Some(dec!(21)))]);
    let json = serde_json::to_string(&inv).unwrap();
    assert!(json.contains("\"vat_rate\":\"21\""));
    let negative = json.replace("\"vat_rate\":\"21\"", "\"vat_rate\":\"-21\"");
    let err = serde_json::from_str::<Invoice>(&negative).unwrap_err();
    assert!(err.to_string().contains("VAT rate"), "{err}");

    let mut charge = AllowanceOrCharge::fixed(dec!(5));
    charge.set_vat_rate(Some(dec!(10))).unwrap();
    let json = serde_json::to_string(&charge)
        .unwrap()
        .replace("\"vat_rate\":\"10\"", "\"vat_rate\":\"-10\"");
    assert!(serde_json::from_str::<AllowanceOrCharge>(&json).is_err());
}

#[test]
fn json_rejects_more_than_three_address_lines() {
    let address = |lines: &[&str]| {
        serde_json::json!({
            "lines": lines,
            "city": "Berlin",
            "postal_code": "10115",
            "subdivision": null,
            "country_code": "DE",
        })
    };
    let ok: Address = serde_json::from_value(address(&["a", "b", "c"])).unwrap();
    assert_eq!(ok.lines().len(), MAX_ADDRESS_LINES);

    let err = serde_json::from_value::<Address>(address(&["a", "b", "c", "d", "e"])).unwrap_err();
    assert!(err.to_string().contains("at most 3 lines"), "{err}");
}
