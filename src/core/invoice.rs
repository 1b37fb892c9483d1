use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::{InvoiceError, index_out_of_range};
use super::line::InvoiceLine;
use super::party::Party;
use super::rounding::RoundingMatrix;
use super::totals::InvoiceTotals;
use super::types::*;

/// Specification identifier (BT-24) of the plain EN 16931 core invoice.
pub const EN16931_SPECIFICATION: &str = "urn:cen.eu:en16931:2017";

/// BG-0: Invoice: the top-level document.
///
/// Owns all nested entities. Fields are reached through accessors so that
/// invariants (address lines, base quantities, VAT rates, collection
/// bounds) are enforced at the call that would break them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    specification: String,
    business_process: Option<String>,
    number: Option<String>,
    type_code: InvoiceTypeCode,
    currency: String,
    issue_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
    tax_point_date: Option<NaiveDate>,
    notes: Vec<String>,
    buyer_accounting_reference: Option<String>,
    buyer_reference: Option<String>,
    purchase_order_reference: Option<String>,
    sales_order_reference: Option<String>,
    contract_reference: Option<String>,
    invoicing_period: Option<Period>,
    preceding_invoices: Vec<InvoiceReference>,
    paid_amount: Decimal,
    rounding_amount: Decimal,
    seller: Option<Party>,
    buyer: Option<Party>,
    payee: Option<Party>,
    delivery: Option<Delivery>,
    payment: Option<Payment>,
    lines: Vec<InvoiceLine>,
    allowances: Vec<AllowanceOrCharge>,
    charges: Vec<AllowanceOrCharge>,
    rounding_matrix: RoundingMatrix,
}

impl Default for Invoice {
    fn default() -> Self {
        Self {
            specification: EN16931_SPECIFICATION.to_string(),
            business_process: None,
            number: None,
            type_code: InvoiceTypeCode::Invoice,
            currency: "EUR".to_string(),
            issue_date: None,
            due_date: None,
            tax_point_date: None,
            notes: Vec::new(),
            buyer_accounting_reference: None,
            buyer_reference: None,
            purchase_order_reference: None,
            sales_order_reference: None,
            contract_reference: None,
            invoicing_period: None,
            preceding_invoices: Vec::new(),
            paid_amount: Decimal::ZERO,
            rounding_amount: Decimal::ZERO,
            seller: None,
            buyer: None,
            payee: None,
            delivery: None,
            payment: None,
            lines: Vec::new(),
            allowances: Vec::new(),
            charges: Vec::new(),
            rounding_matrix: RoundingMatrix::new(),
        }
    }
}

impl Invoice {
    /// Empty EN 16931 invoice (type 380, EUR).
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the totals snapshot for the current state of the invoice.
    pub fn totals(&self) -> InvoiceTotals {
        InvoiceTotals::from_invoice(self)
    }

    /// Totals, or a range error when an amount overflows `Decimal`.
    pub fn try_totals(&self) -> Result<InvoiceTotals, InvoiceError> {
        InvoiceTotals::try_from_invoice(self)
    }

    /// Round `value` with this invoice's matrix entry for `field`.
    pub fn round(&self, value: Decimal, field: &str) -> Decimal {
        self.rounding_matrix.round(value, field)
    }

    /// BT-24: Specification identifier; selects the preset/rule set.
    pub fn specification(&self) -> &str {
        &self.specification
    }

    pub fn set_specification(&mut self, specification: impl Into<String>) -> &mut Self {
        self.specification = specification.into();
        self
    }

    /// BT-23: Business process type.
    pub fn business_process(&self) -> Option<&str> {
        self.business_process.as_deref()
    }

    pub fn set_business_process(&mut self, process: Option<String>) -> &mut Self {
        self.business_process = process;
        self
    }

    /// BT-1
    pub fn number(&self) -> Option<&str> {
        self.number.as_deref()
    }

    pub fn set_number(&mut self, number: Option<String>) -> &mut Self {
        self.number = number;
        self
    }

    /// BT-3
    pub fn type_code(&self) -> InvoiceTypeCode {
        self.type_code
    }

    pub fn set_type_code(&mut self, code: InvoiceTypeCode) -> &mut Self {
        self.type_code = code;
        self
    }

    /// BT-5: ISO 4217 currency code.
    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn set_currency(&mut self, currency: impl Into<String>) -> &mut Self {
        self.currency = currency.into();
        self
    }

    /// BT-2
    pub fn issue_date(&self) -> Option<NaiveDate> {
        self.issue_date
    }

    pub fn set_issue_date(&mut self, date: Option<NaiveDate>) -> &mut Self {
        self.issue_date = date;
        self
    }

    /// BT-9
    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    pub fn set_due_date(&mut self, date: Option<NaiveDate>) -> &mut Self {
        self.due_date = date;
        self
    }

    /// BT-7
    pub fn tax_point_date(&self) -> Option<NaiveDate> {
        self.tax_point_date
    }

    pub fn set_tax_point_date(&mut self, date: Option<NaiveDate>) -> &mut Self {
        self.tax_point_date = date;
        self
    }

    /// BT-22
    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn add_note(&mut self, note: impl Into<String>) -> &mut Self {
        self.notes.push(note.into());
        self
    }

    pub fn remove_note(&mut self, index: usize) -> Result<String, InvoiceError> {
        if index >= self.notes.len() {
            return Err(index_out_of_range("note", index, self.notes.len()));
        }
        Ok(self.notes.remove(index))
    }

    /// BT-19
    pub fn buyer_accounting_reference(&self) -> Option<&str> {
        self.buyer_accounting_reference.as_deref()
    }

    pub fn set_buyer_accounting_reference(&mut self, reference: Option<String>) -> &mut Self {
        self.buyer_accounting_reference = reference;
        self
    }

    /// BT-10
    pub fn buyer_reference(&self) -> Option<&str> {
        self.buyer_reference.as_deref()
    }

    pub fn set_buyer_reference(&mut self, reference: Option<String>) -> &mut Self {
        self.buyer_reference = reference;
        self
    }

    /// BT-13
    pub fn purchase_order_reference(&self) -> Option<&str> {
        self.purchase_order_reference.as_deref()
    }

    pub fn set_purchase_order_reference(&mut self, reference: Option<String>) -> &mut Self {
        self.purchase_order_reference = reference;
        self
    }

    /// BT-14
    pub fn sales_order_reference(&self) -> Option<&str> {
        self.sales_order_reference.as_deref()
    }

    pub fn set_sales_order_reference(&mut self, reference: Option<String>) -> &mut Self {
        self.sales_order_reference = reference;
        self
    }

    /// BT-12
    pub fn contract_reference(&self) -> Option<&str> {
        self.contract_reference.as_deref()
    }

    pub fn set_contract_reference(&mut self, reference: Option<String>) -> &mut Self {
        self.contract_reference = reference;
        self
    }

    /// BG-14
    pub fn invoicing_period(&self) -> Option<&Period> {
        self.invoicing_period.as_ref()
    }

    pub fn set_invoicing_period(&mut self, period: Option<Period>) -> &mut Self {
        self.invoicing_period = period;
        self
    }

    /// BG-3
    pub fn preceding_invoices(&self) -> &[InvoiceReference] {
        &self.preceding_invoices
    }

    pub fn add_preceding_invoice(&mut self, reference: InvoiceReference) -> &mut Self {
        self.preceding_invoices.push(reference);
        self
    }

    pub fn remove_preceding_invoice(
        &mut self,
        index: usize,
    ) -> Result<InvoiceReference, InvoiceError> {
        if index >= self.preceding_invoices.len() {
            return Err(index_out_of_range(
                "preceding invoice",
                index,
                self.preceding_invoices.len(),
            ));
        }
        Ok(self.preceding_invoices.remove(index))
    }

    /// BT-113
    pub fn paid_amount(&self) -> Decimal {
        self.paid_amount
    }

    pub fn set_paid_amount(&mut self, amount: Decimal) -> &mut Self {
        self.paid_amount = amount;
        self
    }

    /// BT-114
    pub fn rounding_amount(&self) -> Decimal {
        self.rounding_amount
    }

    pub fn set_rounding_amount(&mut self, amount: Decimal) -> &mut Self {
        self.rounding_amount = amount;
        self
    }

    /// BG-4
    pub fn seller(&self) -> Option<&Party> {
        self.seller.as_ref()
    }

    pub fn seller_mut(&mut self) -> Option<&mut Party> {
        self.seller.as_mut()
    }

    pub fn set_seller(&mut self, party: Option<Party>) -> &mut Self {
        self.seller = party;
        self
    }

    /// BG-7
    pub fn buyer(&self) -> Option<&Party> {
        self.buyer.as_ref()
    }

    pub fn buyer_mut(&mut self) -> Option<&mut Party> {
        self.buyer.as_mut()
    }

    pub fn set_buyer(&mut self, party: Option<Party>) -> &mut Self {
        self.buyer = party;
        self
    }

    /// BG-10
    pub fn payee(&self) -> Option<&Party> {
        self.payee.as_ref()
    }

    pub fn set_payee(&mut self, party: Option<Party>) -> &mut Self {
        self.payee = party;
        self
    }

    /// Payee party that must be emitted: present and not the seller itself.
    pub fn distinct_payee(&self) -> Option<&Party> {
        self.payee
            .as_ref()
            .filter(|payee| self.seller.as_ref() != Some(*payee))
    }

    /// BG-13
    pub fn delivery(&self) -> Option<&Delivery> {
        self.delivery.as_ref()
    }

    pub fn set_delivery(&mut self, delivery: Option<Delivery>) -> &mut Self {
        self.delivery = delivery;
        self
    }

    /// BG-16 / BT-20
    pub fn payment(&self) -> Option<&Payment> {
        self.payment.as_ref()
    }

    pub fn set_payment(&mut self, payment: Option<Payment>) -> &mut Self {
        self.payment = payment;
        self
    }

    /// BG-25
    pub fn lines(&self) -> &[InvoiceLine] {
        &self.lines
    }

    pub fn lines_mut(&mut self) -> &mut [InvoiceLine] {
        &mut self.lines
    }

    pub fn add_line(&mut self, line: InvoiceLine) -> &mut Self {
        self.lines.push(line);
        self
    }

    pub fn remove_line(&mut self, index: usize) -> Result<InvoiceLine, InvoiceError> {
        if index >= self.lines.len() {
            return Err(index_out_of_range("line", index, self.lines.len()));
        }
        Ok(self.lines.remove(index))
    }

    pub fn rounding_matrix(&self) -> &RoundingMatrix {
        &self.rounding_matrix
    }

    pub fn set_rounding_matrix(&mut self, matrix: RoundingMatrix) -> &mut Self {
        self.rounding_matrix = matrix;
        self
    }
}

impl AllowanceChargeHolder for Invoice {
    fn allowances(&self) -> &[AllowanceOrCharge] {
        &self.allowances
    }

    fn charges(&self) -> &[AllowanceOrCharge] {
        &self.charges
    }

    fn add_allowance(&mut self, allowance: AllowanceOrCharge) {
        self.allowances.push(allowance);
    }

    fn add_charge(&mut self, charge: AllowanceOrCharge) {
        self.charges.push(charge);
    }

    fn remove_allowance(&mut self, index: usize) -> Result<AllowanceOrCharge, InvoiceError> {
        if index >= self.allowances.len() {
            return Err(index_out_of_range("allowance", index, self.allowances.len()));
        }
        Ok(self.allowances.remove(index))
    }

    fn remove_charge(&mut self, index: usize) -> Result<AllowanceOrCharge, InvoiceError> {
        if index >= self.charges.len() {
            return Err(index_out_of_range("charge", index, self.charges.len()));
        }
        Ok(self.charges.remove(index))
    }
}
