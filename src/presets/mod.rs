//! Shipped specification presets and the default registry.
//!
//! Each preset is a CIUS (or the plain EN 16931 core) identified by its
//! BT-24 specification id. Presets set up new and imported invoices
//! (business process, rounding matrix) and add rules on top of the base
//! EN 16931 rule set.
//!
//! ```
//! use einvoice::core::*;
//! use einvoice::presets::{self, PEPPOL_SPECIFICATION};
//!
//! let registry = presets::default_registry();
//! let invoice = registry.new_invoice(PEPPOL_SPECIFICATION).unwrap();
//! assert_eq!(invoice.rounding_matrix().decimals("invoice/taxAmount"), 2);
//! ```

mod cius_ro;
mod nlcius;
mod peppol;
mod xrechnung;

pub use cius_ro::{CIUS_RO_SPECIFICATION, CiusRoPreset};
pub use nlcius::{NLCIUS_SPECIFICATION, NlciusPreset};
pub use peppol::{PEPPOL_PROFILE_ID, PEPPOL_SPECIFICATION, PeppolPreset, is_known_eas_code};
pub use xrechnung::{XRECHNUNG_SPECIFICATION, XRechnungPreset};

use crate::core::{EN16931_SPECIFICATION, Invoice, Preset, PresetRegistry, RoundingMatrix, Rule};

/// The plain EN 16931 core invoice: base rules only, default matrix.
#[derive(Debug, Default, Clone, Copy)]
pub struct En16931Preset;

impl Preset for En16931Preset {
    fn specification(&self) -> &str {
        EN16931_SPECIFICATION
    }

    fn rules(&self) -> Vec<Rule> {
        Vec::new()
    }
}

/// Registry with every shipped preset registered.
pub fn default_registry() -> PresetRegistry {
    let mut registry = PresetRegistry::new();
    registry
        .register(En16931Preset)
        .register(PeppolPreset)
        .register(XRechnungPreset)
        .register(NlciusPreset)
        .register(CiusRoPreset);
    registry
}

/// Two decimals everywhere, the precision CIUS documents are exchanged at.
pub(crate) fn two_decimal_setup(invoice: &mut Invoice) {
    invoice.set_rounding_matrix(RoundingMatrix::new().with_default(2));
}
