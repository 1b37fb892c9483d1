//! NLCIUS (Dutch CIUS, BR-NL-*).

use crate::core::*;

/// NLCIUS specification identifier (BT-24).
pub const NLCIUS_SPECIFICATION: &str =
    "urn:cen.eu:en16931:2017#compliant#urn:fdc:nen.nl:nlcius:v1.0";

/// KvK (Chamber of Commerce) and OIN (government) identifier schemes.
const DUTCH_LEGAL_SCHEMES: [&str; 2] = ["0106", "0190"];

#[derive(Debug, Default, Clone, Copy)]
pub struct NlciusPreset;

impl Preset for NlciusPreset {
    fn specification(&self) -> &str {
        NLCIUS_SPECIFICATION
    }

    fn setup_invoice(&self, invoice: &mut Invoice) {
        super::two_decimal_setup(invoice);
    }

    fn rules(&self) -> Vec<Rule> {
        vec![
            Rule::new("BR-NL-1", br_nl_1),
            Rule::new("BR-NL-3", br_nl_3),
            Rule::new("BR-NL-4", br_nl_4),
        ]
    }
}

fn is_dutch(party: &Party) -> bool {
    party.country_code() == Some("NL")
}

fn has_full_address(party: &Party) -> bool {
    !party.address.lines().is_empty()
        && !is_blank(party.address.city())
        && !is_blank(party.address.postal_code())
}

// BR-NL-1: Dutch seller needs a KvK or OIN legal registration id
fn br_nl_1(inv: &Invoice) -> Option<String> {
    let seller = inv.seller().filter(|s| is_dutch(s))?;
    let registered = seller
        .company_id
        .as_ref()
        .and_then(Identifier::scheme)
        .is_some_and(|scheme| DUTCH_LEGAL_SCHEMES.contains(&scheme));
    (!registered).then(|| {
        "a Dutch seller requires a legal registration id (BT-30) with scheme 0106 or 0190".into()
    })
}

// BR-NL-3: Dutch seller address needs street, city and post code
fn br_nl_3(inv: &Invoice) -> Option<String> {
    inv.seller()
        .filter(|s| is_dutch(s) && !has_full_address(s))
        .map(|_| "a Dutch seller address requires street name, city and post code".into())
}

// BR-NL-4: Dutch buyer address needs street, city and post code
fn br_nl_4(inv: &Invoice) -> Option<String> {
    inv.buyer()
        .filter(|b| is_dutch(b) && !has_full_address(b))
        .map(|_| "a Dutch buyer address requires street name, city and post code".into())
}
