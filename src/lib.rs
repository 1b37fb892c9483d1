//! # einvoice
//!
//! EN 16931 electronic invoicing: a semantic document model, a totals
//! engine with configurable rounding, a UBL 2.1 writer and reader, and a
//! rule registry with presets for Peppol BIS 3.0 and national CIUS
//! (XRechnung, NLCIUS, CIUS-RO).
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//! Rounding is half away from zero at the precision the invoice's
//! [`RoundingMatrix`](core::RoundingMatrix) assigns to each field.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use einvoice::core::*;
//! use rust_decimal_macros::dec;
//!
//! let invoice = InvoiceBuilder::new("INV-2024-001", NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
//!     .due_date(NaiveDate::from_ymd_opt(2024, 7, 15).unwrap())
//!     .seller(PartyBuilder::new("ACME BV", AddressBuilder::new("Amsterdam", "1011 AB", "NL").build()?)
//!         .vat_number("NL123456789B01").build())
//!     .buyer(PartyBuilder::new("Customer GmbH", AddressBuilder::new("Berlin", "10115", "DE").build()?).build())
//!     .add_line(InvoiceLineBuilder::new("Consulting", dec!(10), "HUR", dec!(150))
//!         .vat(TaxCategory::StandardRate, dec!(21)).build()?)
//!     .build();
//!
//! let registry = PresetRegistry::new();
//! assert!(validate(&invoice, &registry).is_ok());
//! assert_eq!(invoice.totals().payable_amount, dec!(1815));
//! # Ok::<(), InvoiceError>(())
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Document model, totals, rounding matrix, rule registry, EN 16931 rules |
//! | `ubl` | UBL 2.1 Invoice generation & parsing |
//! | `presets` | EN 16931, Peppol BIS 3.0, XRechnung 3.0, NLCIUS, CIUS-RO presets |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "ubl")]
pub mod ubl;

#[cfg(feature = "presets")]
pub mod presets;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
