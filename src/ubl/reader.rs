use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{debug, warn};

use super::xml_utils::{XmlNode, parse_tree};
use super::{NO_ORDER_ID, VAT_SCHEME};
use crate::core::*;

type ParseResult<T> = Result<T, InvoiceError>;

/// Parse a UBL 2.1 Invoice document.
///
/// The preset registered for the document's CustomizationID (if any) is
/// applied before the remaining fields are read, so its rounding matrix
/// governs totals computed on the result.
pub fn from_ubl_xml(xml: &str, registry: &PresetRegistry) -> Result<Invoice, InvoiceError> {
    let root = parse_tree(xml)?;
    if root.name != "Invoice" {
        return Err(InvoiceError::Parse(format!(
            "expected an Invoice document, found <{}>",
            root.name
        )));
    }

    let mut invoice = Invoice::new();
    if let Some(spec) = root.text_at(&["CustomizationID"]) {
        invoice.set_specification(spec);
    }
    match registry.get(invoice.specification()) {
        Some(preset) => preset.setup_invoice(&mut invoice),
        None => warn!(
            specification = invoice.specification(),
            "no preset registered for specification, using defaults"
        ),
    }

    read_header(&root, &mut invoice)?;

    if let Some(node) = root.find(&["AccountingSupplierParty", "Party"]) {
        invoice.set_seller(Some(read_party(node, false)?));
    }
    if let Some(node) = root.find(&["AccountingCustomerParty", "Party"]) {
        invoice.set_buyer(Some(read_party(node, false)?));
    }
    if let Some(node) = root.child("PayeeParty") {
        invoice.set_payee(Some(read_party(node, true)?));
    }
    if let Some(node) = root.child("Delivery") {
        invoice.set_delivery(Some(read_delivery(node)?));
    }
    invoice.set_payment(read_payment(&root)?);

    for node in root.children("AllowanceCharge") {
        let (is_charge, item) = read_allowance_charge(node, true)?;
        if is_charge {
            invoice.add_charge(item);
        } else {
            invoice.add_allowance(item);
        }
    }

    if let Some(totals) = root.child("LegalMonetaryTotal") {
        if let Some(paid) = decimal_at(totals, &["PrepaidAmount"])? {
            invoice.set_paid_amount(paid);
        }
        if let Some(rounding) = decimal_at(totals, &["PayableRoundingAmount"])? {
            invoice.set_rounding_amount(rounding);
        }
    }

    for node in root.children("InvoiceLine") {
        invoice.add_line(read_line(node)?);
    }

    debug!(
        number = invoice.number(),
        specification = invoice.specification(),
        lines = invoice.lines().len(),
        "imported UBL invoice"
    );
    Ok(invoice)
}

fn read_header(root: &XmlNode, invoice: &mut Invoice) -> ParseResult<()> {
    if let Some(profile) = root.string_at(&["ProfileID"]) {
        invoice.set_business_process(Some(profile));
    }
    invoice.set_number(root.string_at(&["ID"]));
    invoice.set_issue_date(date_at(root, &["IssueDate"])?);
    invoice.set_due_date(date_at(root, &["DueDate"])?);
    if let Some(code) = root.text_at(&["InvoiceTypeCode"]) {
        let code = code
            .trim()
            .parse::<u16>()
            .map_err(|_| InvoiceError::Parse(format!("invalid invoice type code '{code}'")))?;
        invoice.set_type_code(InvoiceTypeCode::from_code(code));
    }
    for note in root.children("Note") {
        invoice.add_note(note.text.clone());
    }
    invoice.set_tax_point_date(date_at(root, &["TaxPointDate"])?);
    if let Some(currency) = root.text_at(&["DocumentCurrencyCode"]) {
        invoice.set_currency(currency);
    }
    invoice.set_buyer_accounting_reference(root.string_at(&["AccountingCost"]));
    invoice.set_buyer_reference(root.string_at(&["BuyerReference"]));
    if let Some(node) = root.child("InvoicePeriod") {
        invoice.set_invoicing_period(Some(read_period(node)?));
    }

    if let Some(order) = root.child("OrderReference") {
        let sales_order = order.string_at(&["SalesOrderID"]);
        let purchase_order = order
            .string_at(&["ID"])
            .filter(|id| !(id == NO_ORDER_ID && sales_order.is_some()));
        invoice
            .set_purchase_order_reference(purchase_order)
            .set_sales_order_reference(sales_order);
    }

    for node in root.children("BillingReference") {
        if let Some(doc) = node.child("InvoiceDocumentReference") {
            invoice.add_preceding_invoice(InvoiceReference {
                value: doc.string_at(&["ID"]).unwrap_or_default(),
                issue_date: date_at(doc, &["IssueDate"])?,
            });
        }
    }

    invoice.set_contract_reference(root.string_at(&["ContractDocumentReference", "ID"]));
    Ok(())
}

fn read_party(node: &XmlNode, is_payee: bool) -> ParseResult<Party> {
    let mut party = Party::new();

    party.electronic_address = node.child("EndpointID").map(|n| identifier(n, "schemeID"));
    party.identifiers = node
        .children("PartyIdentification")
        .filter_map(|p| p.child("ID"))
        .map(|n| identifier(n, "schemeID"))
        .collect();

    let party_name = node.string_at(&["PartyName", "Name"]);
    if is_payee {
        party.name = party_name;
    } else {
        party.trading_name = party_name;
    }

    if let Some(address) = node.child("PostalAddress") {
        party.address = read_address(address)?;
    }

    for scheme in node.children("PartyTaxScheme") {
        let company_id = scheme.string_at(&["CompanyID"]).unwrap_or_default();
        match scheme.text_at(&["TaxScheme", "ID"]) {
            Some(VAT_SCHEME) => party.vat_number = Some(company_id),
            Some(other) => party.tax_registration_id = Some(Identifier::with_scheme(company_id, other)),
            None => party.tax_registration_id = Some(Identifier::new(company_id)),
        }
    }

    if let Some(legal) = node.child("PartyLegalEntity") {
        if !is_payee {
            party.name = legal.string_at(&["RegistrationName"]);
            party.legal_information = legal.string_at(&["CompanyLegalForm"]);
        }
        party.company_id = legal.child("CompanyID").map(|n| identifier(n, "schemeID"));
    }

    if let Some(contact) = node.child("Contact") {
        party.contact = Contact {
            name: contact.string_at(&["Name"]),
            phone: contact.string_at(&["Telephone"]),
            email: contact.string_at(&["ElectronicMail"]),
        };
    }

    Ok(party)
}

/// Address lines are compacted: [StreetName, AdditionalStreetName,
/// AddressLine/Line...] keeping only the nodes that exist, in order. An
/// address with only an AdditionalStreetName therefore reads back with
/// that value as its first line.
fn read_address(node: &XmlNode) -> ParseResult<Address> {
    let mut lines: Vec<String> = Vec::new();
    lines.extend(node.string_at(&["StreetName"]));
    lines.extend(node.string_at(&["AdditionalStreetName"]));
    lines.extend(
        node.children("AddressLine")
            .filter_map(|l| l.string_at(&["Line"])),
    );

    let mut address = Address::new();
    address
        .set_lines(lines)
        .map_err(|e| InvoiceError::Parse(e.to_string()))?
        .set_city(node.string_at(&["CityName"]))
        .set_postal_code(node.string_at(&["PostalZone"]))
        .set_subdivision(node.string_at(&["CountrySubentity"]))
        .set_country_code(node.string_at(&["Country", "IdentificationCode"]));
    Ok(address)
}

fn read_period(node: &XmlNode) -> ParseResult<Period> {
    Ok(Period {
        start: date_at(node, &["StartDate"])?,
        end: date_at(node, &["EndDate"])?,
    })
}

fn read_delivery(node: &XmlNode) -> ParseResult<Delivery> {
    let location = node.child("DeliveryLocation");
    Ok(Delivery {
        name: node.string_at(&["DeliveryParty", "PartyName", "Name"]),
        date: date_at(node, &["ActualDeliveryDate"])?,
        location_id: location
            .and_then(|l| l.child("ID"))
            .map(|n| identifier(n, "schemeID")),
        address: location
            .and_then(|l| l.child("Address"))
            .map(read_address)
            .transpose()?,
    })
}

fn read_payment(root: &XmlNode) -> ParseResult<Option<Payment>> {
    let means = root.child("PaymentMeans");
    let terms = root.string_at(&["PaymentTerms", "Note"]);
    let Some(means) = means else {
        return Ok(terms.map(|terms| Payment {
            terms: Some(terms),
            ..Default::default()
        }));
    };

    let mut payment = Payment {
        terms,
        ..Default::default()
    };
    if let Some(code) = means.child("PaymentMeansCode") {
        let value = code
            .text
            .trim()
            .parse::<u16>()
            .map_err(|_| InvoiceError::Parse(format!("invalid payment means code '{}'", code.text)))?;
        payment.means_code = Some(PaymentMeansCode::from_code(value));
        payment.means_text = code.attr("name").map(String::from);
    }
    payment.remittance_info = means.string_at(&["PaymentID"]);
    payment.card = means.child("CardAccount").map(|card| CardPayment {
        account_number: card.string_at(&["PrimaryAccountNumberID"]).unwrap_or_default(),
        network: card.string_at(&["NetworkID"]).unwrap_or_default(),
        holder_name: card.string_at(&["HolderName"]),
    });
    payment.credit_transfer = means.child("PayeeFinancialAccount").map(|account| CreditTransfer {
        account_id: account.string_at(&["ID"]).unwrap_or_default(),
        account_name: account.string_at(&["Name"]),
        provider: account.string_at(&["FinancialInstitutionBranch", "ID"]),
    });
    payment.direct_debit = means.child("PaymentMandate").map(|mandate| DirectDebit {
        mandate_id: mandate.string_at(&["ID"]),
        debited_account_id: mandate.string_at(&["PayerFinancialAccount", "ID"]),
    });
    Ok(Some(payment))
}

/// Returns `(is_charge, item)`.
fn read_allowance_charge(node: &XmlNode, with_tax_category: bool) -> ParseResult<(bool, AllowanceOrCharge)> {
    let is_charge = match node.text_at(&["ChargeIndicator"]).map(str::trim) {
        Some("true") => true,
        Some("false") => false,
        other => {
            return Err(InvoiceError::Parse(format!(
                "invalid allowance/charge indicator {other:?}"
            )));
        }
    };

    // The multiplier wins over the computed amount for percentages
    let mut item = match (
        decimal_at(node, &["MultiplierFactorNumeric"])?,
        decimal_at(node, &["Amount"])?,
    ) {
        (Some(percent), _) => AllowanceOrCharge::percentage(percent),
        (None, Some(amount)) => AllowanceOrCharge::fixed(amount),
        (None, None) => {
            return Err(InvoiceError::Parse(
                "allowance/charge without amount or multiplier".into(),
            ));
        }
    };
    item.set_reason_code(node.string_at(&["AllowanceChargeReasonCode"]))
        .set_reason(node.string_at(&["AllowanceChargeReason"]));

    if with_tax_category {
        if let Some(tax) = node.child("TaxCategory") {
            let vat = read_tax_category(tax)?;
            item.set_vat_category(vat.category)
                .set_vat_exemption_reason_code(vat.exemption_code)
                .set_vat_exemption_reason(vat.exemption_reason)
                .set_vat_rate(vat.rate)
                .map_err(|e| InvoiceError::Parse(e.to_string()))?;
        }
    }
    Ok((is_charge, item))
}

struct TaxCategoryNode {
    category: TaxCategory,
    rate: Option<Decimal>,
    exemption_code: Option<String>,
    exemption_reason: Option<String>,
}

fn read_tax_category(node: &XmlNode) -> ParseResult<TaxCategoryNode> {
    let category = match node.text_at(&["ID"]).map(str::trim) {
        Some(code) => TaxCategory::from_code(code)
            .ok_or_else(|| InvoiceError::Parse(format!("unknown VAT category code '{code}'")))?,
        None => TaxCategory::default(),
    };
    Ok(TaxCategoryNode {
        category,
        rate: decimal_at(node, &["Percent"])?,
        exemption_code: node.string_at(&["TaxExemptionReasonCode"]),
        exemption_reason: node.string_at(&["TaxExemptionReason"]),
    })
}

fn read_line(node: &XmlNode) -> ParseResult<InvoiceLine> {
    let mut line = InvoiceLine::new();
    line.set_id(node.string_at(&["ID"]))
        .set_note(node.string_at(&["Note"]))
        .set_buyer_accounting_reference(node.string_at(&["AccountingCost"]));

    if let Some(quantity) = node.child("InvoicedQuantity") {
        line.set_quantity(parse_decimal(&quantity.text)?);
        if let Some(unit) = quantity.attr("unitCode") {
            line.set_unit(unit);
        }
    }
    if let Some(period) = node.child("InvoicePeriod") {
        line.set_period(Some(read_period(period)?));
    }

    for ac in node.children("AllowanceCharge") {
        let (is_charge, item) = read_allowance_charge(ac, false)?;
        if is_charge {
            line.add_charge(item);
        } else {
            line.add_allowance(item);
        }
    }

    if let Some(item) = node.child("Item") {
        line.set_description(item.string_at(&["Description"]))
            .set_name(item.string_at(&["Name"]))
            .set_buyer_identifier(item.string_at(&["BuyersItemIdentification", "ID"]))
            .set_seller_identifier(item.string_at(&["SellersItemIdentification", "ID"]))
            .set_standard_identifier(
                item.find(&["StandardItemIdentification", "ID"])
                    .map(|n| identifier(n, "schemeID")),
            )
            .set_origin_country(item.string_at(&["OriginCountry", "IdentificationCode"]));

        for class in item.children("CommodityClassification") {
            if let Some(code) = class.child("ItemClassificationCode") {
                line.add_classification_identifier(identifier(code, "listID"));
            }
        }

        if let Some(tax) = item.child("ClassifiedTaxCategory") {
            let vat = read_tax_category(tax)?;
            line.set_vat_category(vat.category)
                .set_vat_exemption_reason_code(vat.exemption_code)
                .set_vat_exemption_reason(vat.exemption_reason)
                .set_vat_rate(vat.rate)
                .map_err(|e| InvoiceError::Parse(e.to_string()))?;
        }

        for property in item.children("AdditionalItemProperty") {
            line.add_attribute(
                property.string_at(&["Name"]).unwrap_or_default(),
                property.string_at(&["Value"]).unwrap_or_default(),
            );
        }
    }

    if let Some(price) = node.child("Price") {
        line.set_price(decimal_at(price, &["PriceAmount"])?);
        if let Some(base_quantity) = decimal_at(price, &["BaseQuantity"])? {
            line.set_base_quantity(base_quantity)
                .map_err(|e| InvoiceError::Parse(e.to_string()))?;
        }
    }

    Ok(line)
}

fn identifier(node: &XmlNode, scheme_attr: &str) -> Identifier {
    match node.attr(scheme_attr) {
        Some(scheme) => Identifier::with_scheme(node.text.clone(), scheme),
        None => Identifier::new(node.text.clone()),
    }
}

fn parse_decimal(text: &str) -> ParseResult<Decimal> {
    Decimal::from_str(text.trim())
        .map_err(|_| InvoiceError::Parse(format!("invalid decimal value '{text}'")))
}

fn decimal_at(node: &XmlNode, path: &[&str]) -> ParseResult<Option<Decimal>> {
    node.text_at(path).map(parse_decimal).transpose()
}

fn date_at(node: &XmlNode, path: &[&str]) -> ParseResult<Option<NaiveDate>> {
    node.text_at(path)
        .map(|text| {
            NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
                .map_err(|_| InvoiceError::Parse(format!("invalid date '{text}'")))
        })
        .transpose()
}
