//! UBL 2.1 Invoice generation and parsing.
//!
//! The writer and reader share the element names and constants defined
//! here; for documents produced by [`to_ubl_xml`] the reader maps every
//! element back to the same business term, so
//! `to_ubl_xml(&from_ubl_xml(xml, &registry)?)` reproduces `xml`.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use einvoice::core::*;
//! use einvoice::ubl;
//! use rust_decimal_macros::dec;
//!
//! let invoice = InvoiceBuilder::new("INV-7", NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
//!     .seller(PartyBuilder::new("ACME BV", AddressBuilder::new("Amsterdam", "1011 AB", "NL").build()?)
//!         .vat_number("NL123456789B01").build())
//!     .buyer(PartyBuilder::new("Customer GmbH", AddressBuilder::new("Berlin", "10115", "DE").build()?).build())
//!     .add_line(InvoiceLineBuilder::new("Consulting", dec!(4), "HUR", dec!(120))
//!         .vat(TaxCategory::StandardRate, dec!(21)).build()?)
//!     .build();
//!
//! let registry = PresetRegistry::new();
//! let xml = ubl::to_ubl_xml(&invoice)?;
//! let parsed = ubl::from_ubl_xml(&xml, &registry)?;
//! assert_eq!(parsed.totals(), invoice.totals());
//! assert_eq!(ubl::to_ubl_xml(&parsed)?, xml);
//! # Ok::<(), InvoiceError>(())
//! ```

mod reader;
mod writer;
pub(crate) mod xml_utils;

pub use reader::from_ubl_xml;
pub use writer::to_ubl_xml;
pub use xml_utils::format_decimal;

/// Tax scheme id used for VAT in `cac:TaxScheme/cbc:ID`.
pub const VAT_SCHEME: &str = "VAT";

/// Order reference ID written when only a sales order reference exists.
pub const NO_ORDER_ID: &str = "NA";

/// UBL 2.1 namespace URIs.
pub mod ns {
    pub const INVOICE: &str = "urn:oasis:names:specification:ubl:schema:xsd:Invoice-2";
    pub const CAC: &str =
        "urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2";
    pub const CBC: &str = "urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2";
}
