use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, de};

use super::arith::Arith;
use super::error::{InvoiceError, index_out_of_range};
use super::rounding::{RoundingMatrix, fields};
use super::types::*;

/// BG-25: Invoice line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    id: Option<String>,
    note: Option<String>,
    name: Option<String>,
    description: Option<String>,
    buyer_accounting_reference: Option<String>,
    period: Option<Period>,
    quantity: Decimal,
    unit: String,
    price: Option<Decimal>,
    #[serde(deserialize_with = "deserialize_base_quantity")]
    base_quantity: Decimal,
    vat_category: TaxCategory,
    #[serde(default, deserialize_with = "deserialize_vat_rate")]
    vat_rate: Option<Decimal>,
    vat_exemption_reason_code: Option<String>,
    vat_exemption_reason: Option<String>,
    seller_identifier: Option<String>,
    buyer_identifier: Option<String>,
    standard_identifier: Option<Identifier>,
    classification_identifiers: Vec<Identifier>,
    origin_country: Option<String>,
    attributes: Vec<ItemAttribute>,
    allowances: Vec<AllowanceOrCharge>,
    charges: Vec<AllowanceOrCharge>,
}

impl Default for InvoiceLine {
    fn default() -> Self {
        Self {
            id: None,
            note: None,
            name: None,
            description: None,
            buyer_accounting_reference: None,
            period: None,
            quantity: Decimal::ONE,
            unit: "C62".to_string(),
            price: None,
            base_quantity: Decimal::ONE,
            vat_category: TaxCategory::StandardRate,
            vat_rate: None,
            vat_exemption_reason_code: None,
            vat_exemption_reason: None,
            seller_identifier: None,
            buyer_identifier: None,
            standard_identifier: None,
            classification_identifiers: Vec::new(),
            origin_country: None,
            attributes: Vec::new(),
            allowances: Vec::new(),
            charges: Vec::new(),
        }
    }
}

impl InvoiceLine {
    /// Empty line: quantity 1, unit "C62", base quantity 1, category S,
    /// no price and no VAT rate.
    pub fn new() -> Self {
        Self::default()
    }

    /// BT-126
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: Option<String>) -> &mut Self {
        self.id = id;
        self
    }

    /// BT-127
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn set_note(&mut self, note: Option<String>) -> &mut Self {
        self.note = note;
        self
    }

    /// BT-153: Item name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<String>) -> &mut Self {
        self.name = name;
        self
    }

    /// BT-154: Item description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: Option<String>) -> &mut Self {
        self.description = description;
        self
    }

    /// BT-133: Buyer accounting reference.
    pub fn buyer_accounting_reference(&self) -> Option<&str> {
        self.buyer_accounting_reference.as_deref()
    }

    pub fn set_buyer_accounting_reference(&mut self, reference: Option<String>) -> &mut Self {
        self.buyer_accounting_reference = reference;
        self
    }

    /// BG-26
    pub fn period(&self) -> Option<&Period> {
        self.period.as_ref()
    }

    pub fn set_period(&mut self, period: Option<Period>) -> &mut Self {
        self.period = period;
        self
    }

    /// BT-129
    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn set_quantity(&mut self, quantity: Decimal) -> &mut Self {
        self.quantity = quantity;
        self
    }

    /// BT-130: Unit of measure (UN/ECE Rec 20).
    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn set_unit(&mut self, unit: impl Into<String>) -> &mut Self {
        self.unit = unit.into();
        self
    }

    /// BT-146: Item net price.
    pub fn price(&self) -> Option<Decimal> {
        self.price
    }

    pub fn set_price(&mut self, price: Option<Decimal>) -> &mut Self {
        self.price = price;
        self
    }

    /// BT-149: Price base quantity.
    pub fn base_quantity(&self) -> Decimal {
        self.base_quantity
    }

    /// Set the price base quantity; it must be strictly positive.
    pub fn set_base_quantity(&mut self, base_quantity: Decimal) -> Result<&mut Self, InvoiceError> {
        check_base_quantity(base_quantity)?;
        self.base_quantity = base_quantity;
        Ok(self)
    }

    /// BT-151
    pub fn vat_category(&self) -> TaxCategory {
        self.vat_category
    }

    pub fn set_vat_category(&mut self, category: TaxCategory) -> &mut Self {
        self.vat_category = category;
        self
    }

    /// BT-152; `None` means not subject to VAT.
    pub fn vat_rate(&self) -> Option<Decimal> {
        self.vat_rate
    }

    pub fn set_vat_rate(&mut self, rate: Option<Decimal>) -> Result<&mut Self, InvoiceError> {
        check_vat_rate(rate)?;
        self.vat_rate = rate;
        Ok(self)
    }

    /// BT-121 for the group this line contributes to.
    pub fn vat_exemption_reason_code(&self) -> Option<&str> {
        self.vat_exemption_reason_code.as_deref()
    }

    pub fn set_vat_exemption_reason_code(&mut self, code: Option<String>) -> &mut Self {
        self.vat_exemption_reason_code = code;
        self
    }

    /// BT-120 for the group this line contributes to.
    pub fn vat_exemption_reason(&self) -> Option<&str> {
        self.vat_exemption_reason.as_deref()
    }

    pub fn set_vat_exemption_reason(&mut self, reason: Option<String>) -> &mut Self {
        self.vat_exemption_reason = reason;
        self
    }

    /// BT-155
    pub fn seller_identifier(&self) -> Option<&str> {
        self.seller_identifier.as_deref()
    }

    pub fn set_seller_identifier(&mut self, id: Option<String>) -> &mut Self {
        self.seller_identifier = id;
        self
    }

    /// BT-156
    pub fn buyer_identifier(&self) -> Option<&str> {
        self.buyer_identifier.as_deref()
    }

    pub fn set_buyer_identifier(&mut self, id: Option<String>) -> &mut Self {
        self.buyer_identifier = id;
        self
    }

    /// BT-157: Standard identifier (e.g. GTIN with scheme "0160").
    pub fn standard_identifier(&self) -> Option<&Identifier> {
        self.standard_identifier.as_ref()
    }

    pub fn set_standard_identifier(&mut self, id: Option<Identifier>) -> &mut Self {
        self.standard_identifier = id;
        self
    }

    /// BT-158: Classification identifiers; the scheme is the list id.
    pub fn classification_identifiers(&self) -> &[Identifier] {
        &self.classification_identifiers
    }

    pub fn add_classification_identifier(&mut self, id: Identifier) -> &mut Self {
        self.classification_identifiers.push(id);
        self
    }

    pub fn remove_classification_identifier(
        &mut self,
        index: usize,
    ) -> Result<Identifier, InvoiceError> {
        if index >= self.classification_identifiers.len() {
            return Err(index_out_of_range(
                "classification identifier",
                index,
                self.classification_identifiers.len(),
            ));
        }
        Ok(self.classification_identifiers.remove(index))
    }

    /// BT-159
    pub fn origin_country(&self) -> Option<&str> {
        self.origin_country.as_deref()
    }

    pub fn set_origin_country(&mut self, country: Option<String>) -> &mut Self {
        self.origin_country = country;
        self
    }

    /// BG-32
    pub fn attributes(&self) -> &[ItemAttribute] {
        &self.attributes
    }

    pub fn add_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.attributes.push(ItemAttribute {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn remove_attribute(&mut self, index: usize) -> Result<ItemAttribute, InvoiceError> {
        if index >= self.attributes.len() {
            return Err(index_out_of_range("attribute", index, self.attributes.len()));
        }
        Ok(self.attributes.remove(index))
    }

    /// Price × quantity / base quantity, before line allowances/charges.
    ///
    /// `None` when the price is unset.
    pub fn base_amount(&self, matrix: &RoundingMatrix) -> Option<Decimal> {
        self.base_amount_in(matrix, &mut Arith::default())
    }

    /// Sum of the effective line allowance amounts for a given base.
    pub fn allowances_amount(&self, base: Decimal, matrix: &RoundingMatrix) -> Decimal {
        sum_effective(&self.allowances, base, matrix, &mut Arith::default())
    }

    /// Sum of the effective line charge amounts for a given base.
    pub fn charges_amount(&self, base: Decimal, matrix: &RoundingMatrix) -> Decimal {
        sum_effective(&self.charges, base, matrix, &mut Arith::default())
    }

    /// BT-131: Line net amount, or `None` when the price is unset.
    pub fn net_amount(&self, matrix: &RoundingMatrix) -> Option<Decimal> {
        self.net_amount_in(matrix, &mut Arith::default())
    }

    pub(crate) fn base_amount_in(&self, matrix: &RoundingMatrix, arith: &mut Arith) -> Option<Decimal> {
        let price = self.price?;
        let unit_price = arith.div(price, self.base_quantity);
        Some(matrix.round(
            arith.mul(unit_price, self.quantity),
            fields::LINE_NET_AMOUNT,
        ))
    }

    pub(crate) fn net_amount_in(&self, matrix: &RoundingMatrix, arith: &mut Arith) -> Option<Decimal> {
        let base = self.base_amount_in(matrix, arith)?;
        let allowances = sum_effective(&self.allowances, base, matrix, arith);
        let charges = sum_effective(&self.charges, base, matrix, arith);
        let net = arith.sub(base, allowances);
        let net = arith.add(net, charges);
        Some(matrix.round(net, fields::LINE_NET_AMOUNT))
    }
}

fn check_base_quantity(base_quantity: Decimal) -> Result<(), InvoiceError> {
    if base_quantity <= Decimal::ZERO {
        return Err(InvoiceError::Range(format!(
            "base quantity must be greater than zero, got {base_quantity}"
        )));
    }
    Ok(())
}

fn deserialize_base_quantity<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let base_quantity = <Decimal as Deserialize>::deserialize(deserializer)?;
    check_base_quantity(base_quantity).map_err(de::Error::custom)?;
    Ok(base_quantity)
}

fn sum_effective(
    items: &[AllowanceOrCharge],
    base: Decimal,
    matrix: &RoundingMatrix,
    arith: &mut Arith,
) -> Decimal {
    let amounts: Vec<Decimal> = items
        .iter()
        .map(|item| {
            matrix.round(
                item.effective_amount_in(base, arith),
                fields::LINE_ALLOWANCE_CHARGE_AMOUNT,
            )
        })
        .collect();
    arith.sum(amounts)
}

impl AllowanceChargeHolder for InvoiceLine {
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
