//! XRechnung 3.0 (German CIUS, BR-DE-*).

use crate::core::*;

/// XRechnung 3.0 specification identifier (BT-24).
pub const XRECHNUNG_SPECIFICATION: &str =
    "urn:cen.eu:en16931:2017#compliant#urn:xeinkauf.de:kosit:xrechnung_3.0";

#[derive(Debug, Default, Clone, Copy)]
pub struct XRechnungPreset;

impl Preset for XRechnungPreset {
    fn specification(&self) -> &str {
        XRECHNUNG_SPECIFICATION
    }

    fn setup_invoice(&self, invoice: &mut Invoice) {
        invoice.set_business_process(Some(super::PEPPOL_PROFILE_ID.to_string()));
        super::two_decimal_setup(invoice);
    }

    fn rules(&self) -> Vec<Rule> {
        vec![
            Rule::new("BR-DE-1", br_de_1),
            Rule::new("BR-DE-2", br_de_2),
            Rule::new("BR-DE-3", br_de_3),
            Rule::new("BR-DE-4", br_de_4),
            Rule::new("BR-DE-5", br_de_5),
            Rule::new("BR-DE-6", br_de_6),
            Rule::new("BR-DE-7", br_de_7),
            Rule::new("BR-DE-15", br_de_15),
            Rule::new("BR-DE-16", br_de_16),
        ]
    }
}

fn seller_contact(inv: &Invoice) -> Option<&Contact> {
    inv.seller().map(|s| &s.contact)
}

// BR-DE-1: Payment instructions (BG-16) must be provided
fn br_de_1(inv: &Invoice) -> Option<String> {
    inv.payment()
        .is_none_or(|p| !p.has_means())
        .then(|| "XRechnung requires payment instructions (BG-16)".into())
}

// BR-DE-2: Seller contact (BG-6) must be present
fn br_de_2(inv: &Invoice) -> Option<String> {
    seller_contact(inv)
        .is_none_or(Contact::is_empty)
        .then(|| "XRechnung requires seller contact information (BG-6)".into())
}

// BR-DE-3: Seller city (BT-37)
fn br_de_3(inv: &Invoice) -> Option<String> {
    is_blank(inv.seller().and_then(|s| s.address.city()))
        .then(|| "XRechnung requires the seller city (BT-37)".into())
}

// BR-DE-4: Seller post code (BT-38)
fn br_de_4(inv: &Invoice) -> Option<String> {
    is_blank(inv.seller().and_then(|s| s.address.postal_code()))
        .then(|| "XRechnung requires the seller post code (BT-38)".into())
}

// BR-DE-5: Seller contact name (BT-41)
fn br_de_5(inv: &Invoice) -> Option<String> {
    is_blank(seller_contact(inv).and_then(|c| c.name.as_deref()))
        .then(|| "XRechnung requires seller contact name (BT-41)".into())
}

// BR-DE-6: Seller contact telephone (BT-42)
fn br_de_6(inv: &Invoice) -> Option<String> {
    is_blank(seller_contact(inv).and_then(|c| c.phone.as_deref()))
        .then(|| "XRechnung requires seller contact telephone (BT-42)".into())
}

// BR-DE-7: Seller contact email (BT-43)
fn br_de_7(inv: &Invoice) -> Option<String> {
    is_blank(seller_contact(inv).and_then(|c| c.email.as_deref()))
        .then(|| "XRechnung requires seller contact email (BT-43)".into())
}

// BR-DE-15: Buyer reference (BT-10 / Leitweg-ID) must be provided
fn br_de_15(inv: &Invoice) -> Option<String> {
    is_blank(inv.buyer_reference())
        .then(|| "XRechnung requires buyer reference / Leitweg-ID (BT-10)".into())
}

// BR-DE-16: Seller VAT ID (BT-31) or tax number (BT-32) for taxed supplies
fn br_de_16(inv: &Invoice) -> Option<String> {
    let taxed = inv
        .lines()
        .iter()
        .any(|l| l.vat_category() != TaxCategory::NotSubjectToVat);
    let identified = inv
        .seller()
        .is_some_and(|s| !is_blank(s.vat_number.as_deref()) || s.tax_registration_id.is_some());
    (taxed && !identified)
        .then(|| "XRechnung requires seller VAT ID (BT-31) or tax number (BT-32)".into())
}
