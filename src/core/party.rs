use serde::{Deserialize, Deserializer, Serialize, de};

use super::error::InvoiceError;
use super::types::Identifier;

/// Maximum number of free-text address lines (BT-35, BT-36, BT-162).
pub const MAX_ADDRESS_LINES: usize = 3;

/// BG-5 / BG-8 / BG-15: Postal address.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, deserialize_with = "deserialize_lines")]
    lines: Vec<String>,
    city: Option<String>,
    postal_code: Option<String>,
    subdivision: Option<String>,
    country_code: Option<String>,
}

impl Address {
    pub fn new() -> Self {
        Self::default()
    }

    /// Address lines in order: street, additional street, third line.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Replace all address lines. More than 3 lines is a range error and
    /// leaves the address unchanged.
    pub fn set_lines(&mut self, lines: Vec<String>) -> Result<&mut Self, InvoiceError> {
        check_line_count(&lines)?;
        self.lines = lines;
        Ok(self)
    }

    /// Append one address line.
    pub fn add_line(&mut self, line: impl Into<String>) -> Result<&mut Self, InvoiceError> {
        if self.lines.len() >= MAX_ADDRESS_LINES {
            return Err(InvoiceError::Range(format!(
                "an address holds at most {MAX_ADDRESS_LINES} lines"
            )));
        }
        self.lines.push(line.into());
        Ok(self)
    }

    /// BT-37 / BT-52 / BT-77
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    pub fn set_city(&mut self, city: Option<String>) -> &mut Self {
        self.city = city;
        self
    }

    /// BT-38 / BT-53 / BT-78
    pub fn postal_code(&self) -> Option<&str> {
        self.postal_code.as_deref()
    }

    pub fn set_postal_code(&mut self, postal_code: Option<String>) -> &mut Self {
        self.postal_code = postal_code;
        self
    }

    /// BT-39 / BT-54 / BT-79
    pub fn subdivision(&self) -> Option<&str> {
        self.subdivision.as_deref()
    }

    pub fn set_subdivision(&mut self, subdivision: Option<String>) -> &mut Self {
        self.subdivision = subdivision;
        self
    }

    /// BT-40 / BT-55 / BT-80: ISO 3166-1 alpha-2 country code.
    pub fn country_code(&self) -> Option<&str> {
        self.country_code.as_deref()
    }

    pub fn set_country_code(&mut self, country_code: Option<String>) -> &mut Self {
        self.country_code = country_code;
        self
    }

    /// True when no address field is set.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
            && self.city.is_none()
            && self.postal_code.is_none()
            && self.subdivision.is_none()
            && self.country_code.is_none()
    }
}

fn check_line_count(lines: &[String]) -> Result<(), InvoiceError> {
    if lines.len() > MAX_ADDRESS_LINES {
        return Err(InvoiceError::Range(format!(
            "an address holds at most {MAX_ADDRESS_LINES} lines, got {}",
            lines.len()
        )));
    }
    Ok(())
}

fn deserialize_lines<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let lines = Vec::<String>::deserialize(deserializer)?;
    check_line_count(&lines).map_err(de::Error::custom)?;
    Ok(lines)
}

/// BG-6 / BG-9: Contact information.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Contact {
    /// BT-41 / BT-56: Contact point name.
    pub name: Option<String>,
    /// BT-42 / BT-57: Telephone.
    pub phone: Option<String>,
    /// BT-43 / BT-58: Email.
    pub email: Option<String>,
}

impl Contact {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.email.is_none()
    }
}

/// BG-4 / BG-7 / BG-10: Party (seller, buyer or payee).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Party {
    /// BT-27 / BT-44 / BT-59: Legal name.
    pub name: Option<String>,
    /// BT-28 / BT-45: Trading name.
    pub trading_name: Option<String>,
    /// BT-29 / BT-46 / BT-60: Additional party identifiers.
    pub identifiers: Vec<Identifier>,
    /// BT-30 / BT-47 / BT-61: Legal registration identifier.
    pub company_id: Option<Identifier>,
    /// BT-31 / BT-48: VAT identifier (e.g. "ES12345678Z").
    pub vat_number: Option<String>,
    /// BT-32: Tax registration identifier; the scheme is the tax scheme id.
    pub tax_registration_id: Option<Identifier>,
    /// BT-33: Additional legal information.
    pub legal_information: Option<String>,
    /// BT-34 / BT-49: Electronic address.
    pub electronic_address: Option<Identifier>,
    /// BG-5 / BG-8: Postal address.
    pub address: Address,
    /// BG-6 / BG-9: Contact information.
    pub contact: Contact,
}

impl Party {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for `address.country_code()`.
    pub fn country_code(&self) -> Option<&str> {
        self.address.country_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_lines_stores_lines_as_given() {
        let mut address = Address::new();
        address
            .set_lines(vec!["".into(), "Planta 2".into()])
            .unwrap();
        assert_eq!(address.lines(), ["", "Planta 2"]);
    }

    #[test]
    fn fourth_line_is_rejected() {
        let mut address = Address::new();
        address
            .set_lines(vec!["a".into(), "b".into(), "c".into()])
            .unwrap();
        assert!(matches!(address.add_line("d"), Err(InvoiceError::Range(_))));
        assert!(address.set_lines(vec!["x".into(); 4]).is_err());
        assert_eq!(address.lines(), ["a", "b", "c"]);
    }
}
