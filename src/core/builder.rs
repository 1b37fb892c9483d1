use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::InvoiceError;
use super::invoice::Invoice;
use super::line::InvoiceLine;
use super::party::{Address, Contact, Party};
use super::rounding::RoundingMatrix;
use super::types::*;

/// Builder for constructing invoices.
///
/// ```
/// use einvoice::core::*;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let invoice = InvoiceBuilder::new("F-2024-001", NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
///     .seller(PartyBuilder::new("Seller SL", AddressBuilder::new("Madrid", "28001", "ES").build()?)
///         .vat_number("ESB12345678")
///         .build())
///     .buyer(PartyBuilder::new("Buyer SA", AddressBuilder::new("Lyon", "69001", "FR").build()?)
///         .build())
///     .add_line(InvoiceLineBuilder::new("Consulting", dec!(10), "HUR", dec!(150.00))
///         .vat(TaxCategory::StandardRate, dec!(21))
///         .build()?)
///     .build();
/// assert_eq!(invoice.totals().tax_inclusive_amount, dec!(1815));
/// # Ok::<(), InvoiceError>(())
/// ```
pub struct InvoiceBuilder {
    invoice: Invoice,
}

impl InvoiceBuilder {
    pub fn new(number: impl Into<String>, issue_date: NaiveDate) -> Self {
        let mut invoice = Invoice::new();
        invoice
            .set_number(Some(number.into()))
            .set_issue_date(Some(issue_date));
        Self { invoice }
    }

    /// Start from an invoice prepared elsewhere, e.g. by
    /// [`PresetRegistry::new_invoice`](super::PresetRegistry::new_invoice).
    pub fn from_invoice(invoice: Invoice) -> Self {
        Self { invoice }
    }

    pub fn specification(mut self, specification: impl Into<String>) -> Self {
        self.invoice.set_specification(specification);
        self
    }

    pub fn business_process(mut self, process: impl Into<String>) -> Self {
        self.invoice.set_business_process(Some(process.into()));
        self
    }

    pub fn due_date(mut self, date: NaiveDate) -> Self {
        self.invoice.set_due_date(Some(date));
        self
    }

    pub fn tax_point_date(mut self, date: NaiveDate) -> Self {
        self.invoice.set_tax_point_date(Some(date));
        self
    }

    pub fn type_code(mut self, code: InvoiceTypeCode) -> Self {
        self.invoice.set_type_code(code);
        self
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.invoice.set_currency(code);
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.invoice.add_note(note);
        self
    }

    pub fn buyer_reference(mut self, reference: impl Into<String>) -> Self {
        self.invoice.set_buyer_reference(Some(reference.into()));
        self
    }

    pub fn buyer_accounting_reference(mut self, reference: impl Into<String>) -> Self {
        self.invoice
            .set_buyer_accounting_reference(Some(reference.into()));
        self
    }

    pub fn purchase_order_reference(mut self, reference: impl Into<String>) -> Self {
        self.invoice
            .set_purchase_order_reference(Some(reference.into()));
        self
    }

    pub fn sales_order_reference(mut self, reference: impl Into<String>) -> Self {
        self.invoice.set_sales_order_reference(Some(reference.into()));
        self
    }

    pub fn contract_reference(mut self, reference: impl Into<String>) -> Self {
        self.invoice.set_contract_reference(Some(reference.into()));
        self
    }

    pub fn invoicing_period(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.invoice.set_invoicing_period(Some(Period {
            start: Some(start),
            end: Some(end),
        }));
        self
    }

    pub fn preceding_invoice(mut self, number: impl Into<String>, issue_date: Option<NaiveDate>) -> Self {
        self.invoice.add_preceding_invoice(InvoiceReference {
            value: number.into(),
            issue_date,
        });
        self
    }

    pub fn seller(mut self, party: Party) -> Self {
        self.invoice.set_seller(Some(party));
        self
    }

    pub fn buyer(mut self, party: Party) -> Self {
        self.invoice.set_buyer(Some(party));
        self
    }

    pub fn payee(mut self, party: Party) -> Self {
        self.invoice.set_payee(Some(party));
        self
    }

    pub fn delivery(mut self, delivery: Delivery) -> Self {
        self.invoice.set_delivery(Some(delivery));
        self
    }

    pub fn payment(mut self, payment: Payment) -> Self {
        self.invoice.set_payment(Some(payment));
        self
    }

    pub fn add_line(mut self, line: InvoiceLine) -> Self {
        self.invoice.add_line(line);
        self
    }

    pub fn add_allowance(mut self, allowance: AllowanceOrCharge) -> Self {
        self.invoice.add_allowance(allowance);
        self
    }

    pub fn add_charge(mut self, charge: AllowanceOrCharge) -> Self {
        self.invoice.add_charge(charge);
        self
    }

    pub fn paid_amount(mut self, amount: Decimal) -> Self {
        self.invoice.set_paid_amount(amount);
        self
    }

    pub fn rounding_amount(mut self, amount: Decimal) -> Self {
        self.invoice.set_rounding_amount(amount);
        self
    }

    pub fn rounding_matrix(mut self, matrix: RoundingMatrix) -> Self {
        self.invoice.set_rounding_matrix(matrix);
        self
    }

    /// Finish the invoice. Completeness is not checked here; use
    /// [`validate`](super::validate) or export it.
    pub fn build(self) -> Invoice {
        self.invoice
    }
}

/// Builder for a [`Party`] (seller, buyer or payee).
pub struct PartyBuilder {
    party: Party,
}

impl PartyBuilder {
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        Self {
            party: Party {
                name: Some(name.into()),
                address,
                ..Default::default()
            },
        }
    }

    pub fn trading_name(mut self, name: impl Into<String>) -> Self {
        self.party.trading_name = Some(name.into());
        self
    }

    /// BT-29: Additional identifier; repeatable.
    pub fn identifier(mut self, id: Identifier) -> Self {
        self.party.identifiers.push(id);
        self
    }

    pub fn company_id(mut self, id: Identifier) -> Self {
        self.party.company_id = Some(id);
        self
    }

    pub fn vat_number(mut self, vat_number: impl Into<String>) -> Self {
        self.party.vat_number = Some(vat_number.into());
        self
    }

    /// BT-32: the scheme is the tax scheme id (e.g. "FC" for a German
    /// Steuernummer).
    pub fn tax_registration_id(mut self, value: impl Into<String>, scheme: impl Into<String>) -> Self {
        self.party.tax_registration_id = Some(Identifier::with_scheme(value, scheme));
        self
    }

    pub fn legal_information(mut self, info: impl Into<String>) -> Self {
        self.party.legal_information = Some(info.into());
        self
    }

    pub fn electronic_address(mut self, scheme: impl Into<String>, value: impl Into<String>) -> Self {
        self.party.electronic_address = Some(Identifier::with_scheme(value, scheme));
        self
    }

    pub fn contact(
        mut self,
        name: Option<String>,
        phone: Option<String>,
        email: Option<String>,
    ) -> Self {
        self.party.contact = Contact { name, phone, email };
        self
    }

    pub fn build(self) -> Party {
        self.party
    }
}

/// Builder for an [`Address`].
pub struct AddressBuilder {
    lines: Vec<String>,
    address: Address,
}

impl AddressBuilder {
    pub fn new(
        city: impl Into<String>,
        postal_code: impl Into<String>,
        country_code: impl Into<String>,
    ) -> Self {
        let mut address = Address::new();
        address
            .set_city(Some(city.into()))
            .set_postal_code(Some(postal_code.into()))
            .set_country_code(Some(country_code.into()));
        Self {
            lines: Vec::new(),
            address,
        }
    }

    /// Append an address line (street first).
    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    pub fn subdivision(mut self, subdivision: impl Into<String>) -> Self {
        self.address.set_subdivision(Some(subdivision.into()));
        self
    }

    /// Fails with a range error when more than 3 lines were given.
    pub fn build(mut self) -> Result<Address, InvoiceError> {
        self.address.set_lines(self.lines)?;
        Ok(self.address)
    }
}

/// Builder for an [`InvoiceLine`].
pub struct InvoiceLineBuilder {
    line: InvoiceLine,
    base_quantity: Option<Decimal>,
    vat_rate: Option<Decimal>,
}

impl InvoiceLineBuilder {
    pub fn new(name: impl Into<String>, quantity: Decimal, unit: impl Into<String>, price: Decimal) -> Self {
        let mut line = InvoiceLine::new();
        line.set_name(Some(name.into()))
            .set_quantity(quantity)
            .set_unit(unit)
            .set_price(Some(price));
        Self {
            line,
            base_quantity: None,
            vat_rate: None,
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.line.set_id(Some(id.into()));
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.line.set_note(Some(note.into()));
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.line.set_description(Some(description.into()));
        self
    }

    pub fn base_quantity(mut self, base_quantity: Decimal) -> Self {
        self.base_quantity = Some(base_quantity);
        self
    }

    /// VAT category and rate; pass `None` for lines not subject to VAT.
    pub fn vat(mut self, category: TaxCategory, rate: impl Into<Option<Decimal>>) -> Self {
        self.line.set_vat_category(category);
        self.vat_rate = rate.into();
        self
    }

    pub fn exemption(mut self, code: Option<String>, reason: Option<String>) -> Self {
        self.line
            .set_vat_exemption_reason_code(code)
            .set_vat_exemption_reason(reason);
        self
    }

    pub fn seller_identifier(mut self, id: impl Into<String>) -> Self {
        self.line.set_seller_identifier(Some(id.into()));
        self
    }

    pub fn buyer_identifier(mut self, id: impl Into<String>) -> Self {
        self.line.set_buyer_identifier(Some(id.into()));
        self
    }

    pub fn standard_identifier(mut self, value: impl Into<String>, scheme: impl Into<String>) -> Self {
        self.line
            .set_standard_identifier(Some(Identifier::with_scheme(value, scheme)));
        self
    }

    pub fn classification(mut self, value: impl Into<String>, list_id: impl Into<String>) -> Self {
        self.line
            .add_classification_identifier(Identifier::with_scheme(value, list_id));
        self
    }

    pub fn origin_country(mut self, country: impl Into<String>) -> Self {
        self.line.set_origin_country(Some(country.into()));
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.line.add_attribute(name, value);
        self
    }

    pub fn period(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.line.set_period(Some(Period {
            start: Some(start),
            end: Some(end),
        }));
        self
    }

    pub fn buyer_accounting_reference(mut self, reference: impl Into<String>) -> Self {
        self.line
            .set_buyer_accounting_reference(Some(reference.into()));
        self
    }

    pub fn add_allowance(mut self, allowance: AllowanceOrCharge) -> Self {
        self.line.add_allowance(allowance);
        self
    }

    pub fn add_charge(mut self, charge: AllowanceOrCharge) -> Self {
        self.line.add_charge(charge);
        self
    }

    /// Fails with a range error on a non-positive base quantity or a
    /// negative VAT rate.
    pub fn build(mut self) -> Result<InvoiceLine, InvoiceError> {
        if let Some(base_quantity) = self.base_quantity {
            self.line.set_base_quantity(base_quantity)?;
        }
        self.line.set_vat_rate(self.vat_rate)?;
        Ok(self.line)
    }
}

/// Builder for an [`AllowanceOrCharge`] at either level.
pub struct AllowanceChargeBuilder {
    item: AllowanceOrCharge,
    vat_rate: Option<Decimal>,
}

impl AllowanceChargeBuilder {
    pub fn fixed(amount: Decimal) -> Self {
        Self {
            item: AllowanceOrCharge::fixed(amount),
            vat_rate: None,
        }
    }

    pub fn percentage(percent: Decimal) -> Self {
        Self {
            item: AllowanceOrCharge::percentage(percent),
            vat_rate: None,
        }
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.item.set_reason(Some(reason.into()));
        self
    }

    /// UNTDID 5189 (allowances) or 7161 (charges).
    pub fn reason_code(mut self, code: impl Into<String>) -> Self {
        self.item.set_reason_code(Some(code.into()));
        self
    }

    pub fn vat(mut self, category: TaxCategory, rate: impl Into<Option<Decimal>>) -> Self {
        self.item.set_vat_category(category);
        self.vat_rate = rate.into();
        self
    }

    pub fn exemption(mut self, code: Option<String>, reason: Option<String>) -> Self {
        self.item
            .set_vat_exemption_reason_code(code)
            .set_vat_exemption_reason(reason);
        self
    }

    pub fn build(mut self) -> Result<AllowanceOrCharge, InvoiceError> {
        self.item.set_vat_rate(self.vat_rate)?;
        Ok(self.item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn address_with_four_lines_is_rejected() {
        let result = AddressBuilder::new("Bucharest", "010011", "RO")
            .line("a")
            .line("b")
            .line("c")
            .line("d")
            .build();
        assert!(matches!(result, Err(InvoiceError::Range(_))));
    }

    #[test]
    fn line_builder_checks_base_quantity() {
        let result = InvoiceLineBuilder::new("Bolt", dec!(1), "C62", dec!(1))
            .base_quantity(Decimal::ZERO)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn allowance_builder_rejects_negative_rate() {
        let result = AllowanceChargeBuilder::fixed(dec!(5))
            .reason("Discount")
            .vat(TaxCategory::StandardRate, dec!(-1))
            .build();
        assert!(matches!(result, Err(InvoiceError::Range(_))));
    }

    #[test]
    fn not_subject_to_vat_line_has_no_rate() {
        let line = InvoiceLineBuilder::new("Fee", dec!(1), "C62", dec!(20))
            .vat(TaxCategory::NotSubjectToVat, None)
            .build()
            .unwrap();
        assert_eq!(line.vat_rate(), None);
        assert_eq!(line.vat_category(), TaxCategory::NotSubjectToVat);
    }
}
