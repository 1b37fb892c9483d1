use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, de};

use super::arith::Arith;
use super::error::InvoiceError;

/// Identifier with an optional scheme (e.g. a GLN with scheme "0088").
///
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    value: String,
    scheme: Option<String>,
}

impl Identifier {
    /// Identifier without a scheme.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            scheme: None,
        }
    }

    /// Identifier qualified by a scheme code.
    pub fn with_scheme(value: impl Into<String>, scheme: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            scheme: Some(scheme.into()),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }
}

/// UNTDID 5305: VAT category codes used by EN 16931.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaxCategory {
    /// S: Standard rate.
    #[default]
    StandardRate,
    /// Z: Zero rated goods.
    ZeroRated,
    /// E: Exempt from tax.
    Exempt,
    /// AE: VAT reverse charge.
    ReverseCharge,
    /// K: Intra-community supply.
    IntraCommunitySupply,
    /// G: Free export item, tax not charged.
    Export,
    /// O: Services outside scope of tax.
    NotSubjectToVat,
    /// L: Canary Islands general indirect tax (IGIC).
    CanaryIslands,
    /// M: Tax for production, services and importation in Ceuta and Melilla (IPSI).
    CeutaMelilla,
    /// B: Transferred VAT (Italian split payment).
    SplitPayment,
}

impl TaxCategory {
    /// UNTDID 5305 code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::StandardRate => "S",
            Self::ZeroRated => "Z",
            Self::Exempt => "E",
            Self::ReverseCharge => "AE",
            Self::IntraCommunitySupply => "K",
            Self::Export => "G",
            Self::NotSubjectToVat => "O",
            Self::CanaryIslands => "L",
            Self::CeutaMelilla => "M",
            Self::SplitPayment => "B",
        }
    }

    /// Parse from UNTDID 5305 code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "S" => Some(Self::StandardRate),
            "Z" => Some(Self::ZeroRated),
            "E" => Some(Self::Exempt),
            "AE" => Some(Self::ReverseCharge),
            "K" => Some(Self::IntraCommunitySupply),
            "G" => Some(Self::Export),
            "O" => Some(Self::NotSubjectToVat),
            "L" => Some(Self::CanaryIslands),
            "M" => Some(Self::CeutaMelilla),
            "B" => Some(Self::SplitPayment),
            _ => None,
        }
    }

    /// Category tag used in EN 16931 rule identifiers (`BR-{tag}-nn`).
    pub fn rule_tag(&self) -> &'static str {
        match self {
            Self::IntraCommunitySupply => "IC",
            Self::CanaryIslands => "IG",
            Self::CeutaMelilla => "IP",
            other => other.code(),
        }
    }
}

/// UNTDID 1001: Invoice type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InvoiceTypeCode {
    /// 380: Commercial invoice.
    #[default]
    Invoice,
    /// 381: Credit note.
    CreditNote,
    /// 384: Corrected invoice.
    Corrected,
    /// 386: Prepayment invoice.
    Prepayment,
    /// 389: Self-billed invoice.
    SelfBilled,
    /// 326: Partial invoice.
    Partial,
    /// 751: Invoice information for accounting purposes.
    AccountingInformation,
    /// Other code value.
    Other(u16),
}

impl InvoiceTypeCode {
    /// UNTDID 1001 numeric code.
    pub fn code(&self) -> u16 {
        match self {
            Self::Invoice => 380,
            Self::CreditNote => 381,
            Self::Corrected => 384,
            Self::Prepayment => 386,
            Self::SelfBilled => 389,
            Self::Partial => 326,
            Self::AccountingInformation => 751,
            Self::Other(c) => *c,
        }
    }

    pub fn from_code(code: u16) -> Self {
        match code {
            380 => Self::Invoice,
            381 => Self::CreditNote,
            384 => Self::Corrected,
            386 => Self::Prepayment,
            389 => Self::SelfBilled,
            326 => Self::Partial,
            751 => Self::AccountingInformation,
            c => Self::Other(c),
        }
    }
}

/// Document-level or line-level allowance/charge.
///
/// Whether an instance is an allowance or a charge is decided by the
/// collection it is stored in.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AllowanceOrCharge {
    reason_code: Option<String>,
    reason: Option<String>,
    amount: Decimal,
    is_percentage: bool,
    vat_category: TaxCategory,
    #[serde(default, deserialize_with = "deserialize_vat_rate")]
    vat_rate: Option<Decimal>,
    vat_exemption_reason_code: Option<String>,
    vat_exemption_reason: Option<String>,
}

impl AllowanceOrCharge {
    /// Fixed-amount allowance/charge.
    pub fn fixed(amount: Decimal) -> Self {
        Self {
            amount,
            ..Default::default()
        }
    }

    /// Percentage allowance/charge; `percent` is applied to the base
    /// amount of the level it is attached to.
    pub fn percentage(percent: Decimal) -> Self {
        Self {
            amount: percent,
            is_percentage: true,
            ..Default::default()
        }
    }

    pub fn reason_code(&self) -> Option<&str> {
        self.reason_code.as_deref()
    }

    pub fn set_reason_code(&mut self, code: Option<String>) -> &mut Self {
        self.reason_code = code;
        self
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn set_reason(&mut self, reason: Option<String>) -> &mut Self {
        self.reason = reason;
        self
    }

    /// Fixed amount, or the percentage when [`is_percentage`](Self::is_percentage).
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn set_amount(&mut self, amount: Decimal) -> &mut Self {
        self.amount = amount;
        self
    }

    pub fn is_percentage(&self) -> bool {
        self.is_percentage
    }

    pub fn set_is_percentage(&mut self, is_percentage: bool) -> &mut Self {
        self.is_percentage = is_percentage;
        self
    }

    pub fn vat_category(&self) -> TaxCategory {
        self.vat_category
    }

    pub fn set_vat_category(&mut self, category: TaxCategory) -> &mut Self {
        self.vat_category = category;
        self
    }

    /// VAT rate; `None` means not subject to VAT.
    pub fn vat_rate(&self) -> Option<Decimal> {
        self.vat_rate
    }

    pub fn set_vat_rate(&mut self, rate: Option<Decimal>) -> Result<&mut Self, InvoiceError> {
        check_vat_rate(rate)?;
        self.vat_rate = rate;
        Ok(self)
    }

    pub fn vat_exemption_reason_code(&self) -> Option<&str> {
        self.vat_exemption_reason_code.as_deref()
    }

    pub fn set_vat_exemption_reason_code(&mut self, code: Option<String>) -> &mut Self {
        self.vat_exemption_reason_code = code;
        self
    }

    pub fn vat_exemption_reason(&self) -> Option<&str> {
        self.vat_exemption_reason.as_deref()
    }

    pub fn set_vat_exemption_reason(&mut self, reason: Option<String>) -> &mut Self {
        self.vat_exemption_reason = reason;
        self
    }

    /// Amount this item adds or removes, given the base it applies to.
    ///
    /// Unrounded; callers round with the matrix entry of their level.
    pub fn effective_amount(&self, base_amount: Decimal) -> Decimal {
        self.effective_amount_in(base_amount, &mut Arith::default())
    }

    pub(crate) fn effective_amount_in(&self, base_amount: Decimal, arith: &mut Arith) -> Decimal {
        if self.is_percentage {
            let scaled = arith.mul(base_amount, self.amount);
            arith.div(scaled, Decimal::ONE_HUNDRED)
        } else {
            self.amount
        }
    }
}

pub(crate) fn check_vat_rate(rate: Option<Decimal>) -> Result<(), InvoiceError> {
    match rate {
        Some(r) if r.is_sign_negative() && !r.is_zero() => Err(InvoiceError::Range(format!(
            "VAT rate must not be negative, got {r}"
        ))),
        _ => Ok(()),
    }
}

/// Deserialize a VAT rate through [`check_vat_rate`].
pub(crate) fn deserialize_vat_rate<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let rate = Option::<Decimal>::deserialize(deserializer)?;
    check_vat_rate(rate).map_err(de::Error::custom)?;
    Ok(rate)
}

/// Capability shared by the two levels allowances and charges attach to.
///
/// Implemented by [`Invoice`](super::Invoice) (BG-20/BG-21) and
/// [`InvoiceLine`](super::InvoiceLine) (BG-27/BG-28). Callers pick the
/// level explicitly by choosing the receiver.
pub trait AllowanceChargeHolder {
    fn allowances(&self) -> &[AllowanceOrCharge];
    fn charges(&self) -> &[AllowanceOrCharge];
    fn add_allowance(&mut self, allowance: AllowanceOrCharge);
    fn add_charge(&mut self, charge: AllowanceOrCharge);
    /// Remove and return the allowance at `index`; the list is left
    /// untouched on a range error.
    fn remove_allowance(&mut self, index: usize) -> Result<AllowanceOrCharge, InvoiceError>;
    /// Remove and return the charge at `index`.
    fn remove_charge(&mut self, index: usize) -> Result<AllowanceOrCharge, InvoiceError>;
}

/// BG-14 / BG-26: Invoicing period.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Period {
    /// BT-73 / BT-134: Start date.
    pub start: Option<NaiveDate>,
    /// BT-74 / BT-135: End date.
    pub end: Option<NaiveDate>,
}

/// BG-3: Reference to a preceding invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceReference {
    /// BT-25: Preceding invoice number.
    pub value: String,
    /// BT-26: Preceding invoice issue date.
    pub issue_date: Option<NaiveDate>,
}

/// BG-32: Item attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAttribute {
    /// BT-160
    pub name: String,
    /// BT-161
    pub value: String,
}

/// BG-16 and BT-20: Payment instructions and terms.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Payment {
    /// BT-81: Payment means type code (UNTDID 4461).
    pub means_code: Option<PaymentMeansCode>,
    /// BT-82: Payment means text.
    pub means_text: Option<String>,
    /// BT-83: Remittance information.
    pub remittance_info: Option<String>,
    /// BT-20: Payment terms free text.
    pub terms: Option<String>,
    /// BG-17: Credit transfer.
    pub credit_transfer: Option<CreditTransfer>,
    /// BG-18: Payment card.
    pub card: Option<CardPayment>,
    /// BG-19: Direct debit.
    pub direct_debit: Option<DirectDebit>,
}

impl Payment {
    /// Whether anything beyond the payment terms is set, i.e. whether a
    /// `PaymentMeans` block is needed.
    pub fn has_means(&self) -> bool {
        self.means_code.is_some()
            || self.means_text.is_some()
            || self.remittance_info.is_some()
            || self.credit_transfer.is_some()
            || self.card.is_some()
            || self.direct_debit.is_some()
    }
}

/// BG-17: Credit transfer / bank account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditTransfer {
    /// BT-84: Account identifier (IBAN).
    pub account_id: String,
    /// BT-85: Account name.
    pub account_name: Option<String>,
    /// BT-86: Service provider identifier (BIC).
    pub provider: Option<String>,
}

/// BG-18: Payment card information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPayment {
    /// BT-87: Primary account number (last digits only).
    pub account_number: String,
    /// Card network (e.g. "VISA"); mandatory in UBL.
    pub network: String,
    /// BT-88: Card holder name.
    pub holder_name: Option<String>,
}

/// BG-19: Direct debit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectDebit {
    /// BT-89: Mandate reference identifier.
    pub mandate_id: Option<String>,
    /// BT-91: Debited account identifier.
    pub debited_account_id: Option<String>,
}

/// UNTDID 4461: Common payment means codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMeansCode {
    /// 10: Cash.
    Cash,
    /// 30: Credit transfer.
    CreditTransfer,
    /// 42: Payment to bank account.
    PaymentToBankAccount,
    /// 48: Bank card.
    BankCard,
    /// 49: Direct debit.
    DirectDebit,
    /// 57: Standing agreement.
    StandingAgreement,
    /// 58: SEPA credit transfer.
    SepaCreditTransfer,
    /// 59: SEPA direct debit.
    SepaDirectDebit,
    /// Other code value.
    Other(u16),
}

impl PaymentMeansCode {
    pub fn code(&self) -> u16 {
        match self {
            Self::Cash => 10,
            Self::CreditTransfer => 30,
            Self::PaymentToBankAccount => 42,
            Self::BankCard => 48,
            Self::DirectDebit => 49,
            Self::StandingAgreement => 57,
            Self::SepaCreditTransfer => 58,
            Self::SepaDirectDebit => 59,
            Self::Other(c) => *c,
        }
    }

    /// Parse from UNTDID 4461 numeric code.
    pub fn from_code(code: u16) -> Self {
        match code {
            10 => Self::Cash,
            30 => Self::CreditTransfer,
            42 => Self::PaymentToBankAccount,
            48 => Self::BankCard,
            49 => Self::DirectDebit,
            57 => Self::StandingAgreement,
            58 => Self::SepaCreditTransfer,
            59 => Self::SepaDirectDebit,
            c => Self::Other(c),
        }
    }
}

/// BG-13: Delivery information.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Delivery {
    /// BT-70: Deliver-to party name.
    pub name: Option<String>,
    /// BT-72: Actual delivery date.
    pub date: Option<NaiveDate>,
    /// BT-71: Deliver-to location identifier.
    pub location_id: Option<Identifier>,
    /// BG-15: Deliver-to address.
    pub address: Option<super::Address>,
}
