//! CIUS-RO (Romanian e-Factura, BR-RO-*).

use crate::core::*;

/// CIUS-RO specification identifier (BT-24).
pub const CIUS_RO_SPECIFICATION: &str =
    "urn:cen.eu:en16931:2017#compliant#urn:efactura.mfinante.ro:CIUS-RO:1.0.1";

#[derive(Debug, Default, Clone, Copy)]
pub struct CiusRoPreset;

impl Preset for CiusRoPreset {
    fn specification(&self) -> &str {
        CIUS_RO_SPECIFICATION
    }

    fn setup_invoice(&self, invoice: &mut Invoice) {
        super::two_decimal_setup(invoice);
    }

    fn rules(&self) -> Vec<Rule> {
        vec![
            Rule::new("BR-RO-010", br_ro_010),
            Rule::new("BR-RO-020", br_ro_020),
            Rule::new("BR-RO-100", br_ro_100),
        ]
    }
}

// BR-RO-010: Invoice number must contain at least one digit
fn br_ro_010(inv: &Invoice) -> Option<String> {
    let number = inv.number().unwrap_or_default();
    (!number.chars().any(|c| c.is_ascii_digit()))
        .then(|| format!("invoice number (BT-1) {number:?} must contain at least one digit"))
}

// BR-RO-020: Restricted set of invoice type codes
fn br_ro_020(inv: &Invoice) -> Option<String> {
    let code = inv.type_code().code();
    (!matches!(code, 380 | 384 | 389 | 751))
        .then(|| format!("invoice type code (BT-3) {code} must be one of 380, 384, 389, 751"))
}

// BR-RO-100: Romanian addresses need an ISO 3166-2:RO subdivision
fn br_ro_100(inv: &Invoice) -> Option<String> {
    [inv.seller(), inv.buyer()]
        .into_iter()
        .flatten()
        .filter(|p| p.country_code() == Some("RO"))
        .find(|p| !p.address.subdivision().is_some_and(|s| s.starts_with("RO-")))
        .map(|_| "a Romanian address requires a country subdivision (BT-39 / BT-54) such as RO-B".into())
}
