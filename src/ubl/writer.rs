use rust_decimal::Decimal;
use tracing::debug;

use super::ns;
use super::xml_utils::{XmlWriter, format_decimal};
use crate::core::rounding::fields;
use crate::core::*;

type WriteResult = Result<(), InvoiceError>;

/// Generate a UBL 2.1 Invoice document.
///
/// Totals are recomputed from the model. Fails with
/// [`InvoiceError::Export`] naming the violated business rule when a
/// field the document cannot do without is missing, and with
/// [`InvoiceError::Range`] when its amounts overflow `Decimal`; nothing
/// is emitted in either case.
pub fn to_ubl_xml(invoice: &Invoice) -> Result<String, InvoiceError> {
    let totals = invoice.try_totals()?;
    check_exportable(invoice, &totals)?;

    let currency = invoice.currency();
    let mut w = XmlWriter::new()?;

    w.start_element_with_attrs(
        "ubl:Invoice",
        &[
            ("xmlns:ubl", ns::INVOICE),
            ("xmlns:cac", ns::CAC),
            ("xmlns:cbc", ns::CBC),
        ],
    )?;

    // BT-24 / BT-23
    w.text_element("cbc:CustomizationID", invoice.specification())?;
    w.opt_text_element("cbc:ProfileID", invoice.business_process())?;
    w.opt_text_element("cbc:ID", invoice.number())?;
    if let Some(date) = invoice.issue_date() {
        w.text_element("cbc:IssueDate", &date.to_string())?;
    }
    if let Some(date) = invoice.due_date() {
        w.text_element("cbc:DueDate", &date.to_string())?;
    }
    w.text_element("cbc:InvoiceTypeCode", &invoice.type_code().code().to_string())?;
    for note in invoice.notes() {
        w.text_element("cbc:Note", note)?;
    }
    if let Some(date) = invoice.tax_point_date() {
        w.text_element("cbc:TaxPointDate", &date.to_string())?;
    }
    w.text_element("cbc:DocumentCurrencyCode", currency)?;
    w.opt_text_element("cbc:AccountingCost", invoice.buyer_accounting_reference())?;
    w.opt_text_element("cbc:BuyerReference", invoice.buyer_reference())?;

    if let Some(period) = invoice.invoicing_period() {
        write_period(&mut w, period)?;
    }

    // BT-13 / BT-14; UBL requires an order ID, "NA" when only the sales order is known
    if invoice.purchase_order_reference().is_some() || invoice.sales_order_reference().is_some() {
        w.start_element("cac:OrderReference")?;
        w.text_element(
            "cbc:ID",
            invoice.purchase_order_reference().unwrap_or(super::NO_ORDER_ID),
        )?;
        w.opt_text_element("cbc:SalesOrderID", invoice.sales_order_reference())?;
        w.end_element("cac:OrderReference")?;
    }

    for reference in invoice.preceding_invoices() {
        w.start_element("cac:BillingReference")?;
        w.start_element("cac:InvoiceDocumentReference")?;
        w.text_element("cbc:ID", &reference.value)?;
        if let Some(date) = reference.issue_date {
            w.text_element("cbc:IssueDate", &date.to_string())?;
        }
        w.end_element("cac:InvoiceDocumentReference")?;
        w.end_element("cac:BillingReference")?;
    }

    if let Some(contract) = invoice.contract_reference() {
        w.start_element("cac:ContractDocumentReference")?;
        w.text_element("cbc:ID", contract)?;
        w.end_element("cac:ContractDocumentReference")?;
    }

    if let Some(seller) = invoice.seller() {
        w.start_element("cac:AccountingSupplierParty")?;
        write_party(&mut w, seller, PartyRole::Trade)?;
        w.end_element("cac:AccountingSupplierParty")?;
    }
    if let Some(buyer) = invoice.buyer() {
        w.start_element("cac:AccountingCustomerParty")?;
        write_party(&mut w, buyer, PartyRole::Trade)?;
        w.end_element("cac:AccountingCustomerParty")?;
    }
    if let Some(payee) = invoice.distinct_payee() {
        write_party(&mut w, payee, PartyRole::Payee)?;
    }

    if let Some(delivery) = invoice.delivery() {
        write_delivery(&mut w, delivery)?;
    }

    if let Some(payment) = invoice.payment() {
        write_payment(&mut w, payment)?;
    }

    // BG-20 / BG-21
    for allowance in invoice.allowances() {
        let amount = document_level_amount(invoice, allowance, totals.net_amount);
        write_allowance_charge(&mut w, allowance, false, amount, totals.net_amount, currency, true)?;
    }
    for charge in invoice.charges() {
        let amount = document_level_amount(invoice, charge, totals.net_amount);
        write_allowance_charge(&mut w, charge, true, amount, totals.net_amount, currency, true)?;
    }

    write_tax_total(&mut w, &totals)?;
    write_monetary_total(&mut w, invoice, &totals)?;

    for (i, line) in invoice.lines().iter().enumerate() {
        write_line(&mut w, invoice, line, i, currency)?;
    }

    w.end_element("ubl:Invoice")?;

    debug!(
        number = invoice.number(),
        specification = invoice.specification(),
        lines = invoice.lines().len(),
        "exported UBL invoice"
    );
    w.into_string()
}

fn lacks_reason(item: &AllowanceOrCharge) -> bool {
    is_blank(item.reason()) && is_blank(item.reason_code())
}

/// Fields the document cannot be emitted without, in the order they are
/// reported.
fn check_exportable(invoice: &Invoice, totals: &InvoiceTotals) -> WriteResult {
    if is_blank(invoice.number()) {
        return Err(InvoiceError::export("BR-2", "missing invoice number"));
    }
    if invoice.issue_date().is_none() {
        return Err(InvoiceError::export("BR-3", "missing issue date"));
    }

    let seller = invoice
        .seller()
        .filter(|s| !is_blank(s.name.as_deref()))
        .ok_or_else(|| InvoiceError::export("BR-6", "missing seller name"))?;
    if is_blank(seller.country_code()) {
        return Err(InvoiceError::export("BR-9", "missing seller country"));
    }
    if is_blank(seller.vat_number.as_deref()) && seller.tax_registration_id.is_none() {
        if let Some(group) = totals
            .vat_breakdown
            .iter()
            .find(|g| g.category != TaxCategory::NotSubjectToVat)
        {
            return Err(InvoiceError::export(
                format!("BR-{}-2", group.category.rule_tag()),
                format!(
                    "missing seller VAT identifier for VAT category {}",
                    group.category.code()
                ),
            ));
        }
    }

    let buyer = invoice
        .buyer()
        .filter(|b| !is_blank(b.name.as_deref()))
        .ok_or_else(|| InvoiceError::export("BR-7", "missing buyer name"))?;
    if is_blank(buyer.country_code()) {
        return Err(InvoiceError::export("BR-11", "missing buyer country"));
    }

    if invoice.lines().is_empty() {
        return Err(InvoiceError::export("BR-16", "invoice has no lines"));
    }
    if invoice
        .distinct_payee()
        .is_some_and(|p| is_blank(p.name.as_deref()))
    {
        return Err(InvoiceError::export("BR-17", "missing payee name"));
    }

    for (i, line) in invoice.lines().iter().enumerate() {
        let n = i + 1;
        if is_blank(line.name()) {
            return Err(InvoiceError::export("BR-25", format!("line {n}: missing item name")));
        }
        if line.price().is_none() {
            return Err(InvoiceError::export(
                "BR-24",
                format!("line {n}: missing net amount (no price)"),
            ));
        }
    }

    if invoice.allowances().iter().any(lacks_reason) {
        return Err(InvoiceError::export("BR-33", "document allowance without reason or reason code"));
    }
    if invoice.charges().iter().any(lacks_reason) {
        return Err(InvoiceError::export("BR-38", "document charge without reason or reason code"));
    }
    for (i, line) in invoice.lines().iter().enumerate() {
        if line.allowances().iter().any(lacks_reason) {
            return Err(InvoiceError::export(
                "BR-42",
                format!("line {}: allowance without reason or reason code", i + 1),
            ));
        }
        if line.charges().iter().any(lacks_reason) {
            return Err(InvoiceError::export(
                "BR-44",
                format!("line {}: charge without reason or reason code", i + 1),
            ));
        }
    }

    if let Some(payment) = invoice.payment() {
        if payment.has_means() && payment.means_code.is_none() {
            return Err(InvoiceError::export("BR-49", "missing payment means type code"));
        }
    }

    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum PartyRole {
    /// Seller or buyer: `cac:Party` wrapper, legal name as RegistrationName.
    Trade,
    /// `cac:PayeeParty`: the name goes to PartyName.
    Payee,
}

fn write_party(w: &mut XmlWriter, party: &Party, role: PartyRole) -> WriteResult {
    let wrapper = match role {
        PartyRole::Trade => "cac:Party",
        PartyRole::Payee => "cac:PayeeParty",
    };
    w.start_element(wrapper)?;

    // BT-34 / BT-49
    if let Some(endpoint) = &party.electronic_address {
        w.scheme_element("cbc:EndpointID", "schemeID", endpoint.value(), endpoint.scheme())?;
    }

    // BT-29 / BT-46 / BT-60
    for id in &party.identifiers {
        w.start_element("cac:PartyIdentification")?;
        w.scheme_element("cbc:ID", "schemeID", id.value(), id.scheme())?;
        w.end_element("cac:PartyIdentification")?;
    }

    let party_name = match role {
        PartyRole::Trade => party.trading_name.as_deref(),
        PartyRole::Payee => party.name.as_deref(),
    };
    if let Some(name) = party_name {
        w.start_element("cac:PartyName")?;
        w.text_element("cbc:Name", name)?;
        w.end_element("cac:PartyName")?;
    }

    if !party.address.is_empty() {
        write_address(w, &party.address, "cac:PostalAddress")?;
    }

    // BT-31 / BT-48
    if let Some(vat) = &party.vat_number {
        w.start_element("cac:PartyTaxScheme")?;
        w.text_element("cbc:CompanyID", vat)?;
        w.start_element("cac:TaxScheme")?;
        w.text_element("cbc:ID", super::VAT_SCHEME)?;
        w.end_element("cac:TaxScheme")?;
        w.end_element("cac:PartyTaxScheme")?;
    }

    // BT-32
    if let Some(reg) = &party.tax_registration_id {
        w.start_element("cac:PartyTaxScheme")?;
        w.text_element("cbc:CompanyID", reg.value())?;
        match reg.scheme() {
            Some(scheme) => {
                w.start_element("cac:TaxScheme")?;
                w.text_element("cbc:ID", scheme)?;
                w.end_element("cac:TaxScheme")?;
            }
            None => {
                w.empty_element("cac:TaxScheme")?;
            }
        }
        w.end_element("cac:PartyTaxScheme")?;
    }

    let registration_name = match role {
        PartyRole::Trade => party.name.as_deref(),
        PartyRole::Payee => None,
    };
    let legal_information = match role {
        PartyRole::Trade => party.legal_information.as_deref(),
        PartyRole::Payee => None,
    };
    if registration_name.is_some() || party.company_id.is_some() || legal_information.is_some() {
        w.start_element("cac:PartyLegalEntity")?;
        w.opt_text_element("cbc:RegistrationName", registration_name)?;
        if let Some(company_id) = &party.company_id {
            w.scheme_element("cbc:CompanyID", "schemeID", company_id.value(), company_id.scheme())?;
        }
        w.opt_text_element("cbc:CompanyLegalForm", legal_information)?;
        w.end_element("cac:PartyLegalEntity")?;
    }

    if role == PartyRole::Trade && !party.contact.is_empty() {
        w.start_element("cac:Contact")?;
        w.opt_text_element("cbc:Name", party.contact.name.as_deref())?;
        w.opt_text_element("cbc:Telephone", party.contact.phone.as_deref())?;
        w.opt_text_element("cbc:ElectronicMail", party.contact.email.as_deref())?;
        w.end_element("cac:Contact")?;
    }

    w.end_element(wrapper)?;
    Ok(())
}

/// Address lines map to StreetName, AdditionalStreetName and
/// AddressLine/Line in that order.
fn write_address(w: &mut XmlWriter, address: &Address, wrapper: &str) -> WriteResult {
    let lines = address.lines();
    w.start_element(wrapper)?;
    w.opt_text_element("cbc:StreetName", lines.first().map(String::as_str))?;
    w.opt_text_element("cbc:AdditionalStreetName", lines.get(1).map(String::as_str))?;
    w.opt_text_element("cbc:CityName", address.city())?;
    w.opt_text_element("cbc:PostalZone", address.postal_code())?;
    w.opt_text_element("cbc:CountrySubentity", address.subdivision())?;
    if let Some(line) = lines.get(2) {
        w.start_element("cac:AddressLine")?;
        w.text_element("cbc:Line", line)?;
        w.end_element("cac:AddressLine")?;
    }
    if let Some(country) = address.country_code() {
        w.start_element("cac:Country")?;
        w.text_element("cbc:IdentificationCode", country)?;
        w.end_element("cac:Country")?;
    }
    w.end_element(wrapper)?;
    Ok(())
}

fn write_period(w: &mut XmlWriter, period: &Period) -> WriteResult {
    w.start_element("cac:InvoicePeriod")?;
    if let Some(start) = period.start {
        w.text_element("cbc:StartDate", &start.to_string())?;
    }
    if let Some(end) = period.end {
        w.text_element("cbc:EndDate", &end.to_string())?;
    }
    w.end_element("cac:InvoicePeriod")?;
    Ok(())
}

fn write_delivery(w: &mut XmlWriter, delivery: &Delivery) -> WriteResult {
    w.start_element("cac:Delivery")?;
    if let Some(date) = delivery.date {
        w.text_element("cbc:ActualDeliveryDate", &date.to_string())?;
    }
    if delivery.location_id.is_some() || delivery.address.is_some() {
        w.start_element("cac:DeliveryLocation")?;
        if let Some(id) = &delivery.location_id {
            w.scheme_element("cbc:ID", "schemeID", id.value(), id.scheme())?;
        }
        if let Some(address) = &delivery.address {
            write_address(w, address, "cac:Address")?;
        }
        w.end_element("cac:DeliveryLocation")?;
    }
    if let Some(name) = &delivery.name {
        w.start_element("cac:DeliveryParty")?;
        w.start_element("cac:PartyName")?;
        w.text_element("cbc:Name", name)?;
        w.end_element("cac:PartyName")?;
        w.end_element("cac:DeliveryParty")?;
    }
    w.end_element("cac:Delivery")?;
    Ok(())
}

fn write_payment(w: &mut XmlWriter, payment: &Payment) -> WriteResult {
    if let Some(code) = payment.means_code {
        w.start_element("cac:PaymentMeans")?;
        let code = code.code().to_string();
        match &payment.means_text {
            Some(text) => w.text_element_with_attrs("cbc:PaymentMeansCode", &code, &[("name", text)])?,
            None => w.text_element("cbc:PaymentMeansCode", &code)?,
        };
        w.opt_text_element("cbc:PaymentID", payment.remittance_info.as_deref())?;

        if let Some(card) = &payment.card {
            w.start_element("cac:CardAccount")?;
            w.text_element("cbc:PrimaryAccountNumberID", &card.account_number)?;
            w.text_element("cbc:NetworkID", &card.network)?;
            w.opt_text_element("cbc:HolderName", card.holder_name.as_deref())?;
            w.end_element("cac:CardAccount")?;
        }

        if let Some(transfer) = &payment.credit_transfer {
            w.start_element("cac:PayeeFinancialAccount")?;
            w.text_element("cbc:ID", &transfer.account_id)?;
            w.opt_text_element("cbc:Name", transfer.account_name.as_deref())?;
            if let Some(provider) = &transfer.provider {
                w.start_element("cac:FinancialInstitutionBranch")?;
                w.text_element("cbc:ID", provider)?;
                w.end_element("cac:FinancialInstitutionBranch")?;
            }
            w.end_element("cac:PayeeFinancialAccount")?;
        }

        if let Some(debit) = &payment.direct_debit {
            w.start_element("cac:PaymentMandate")?;
            w.opt_text_element("cbc:ID", debit.mandate_id.as_deref())?;
            if let Some(account) = &debit.debited_account_id {
                w.start_element("cac:PayerFinancialAccount")?;
                w.text_element("cbc:ID", account)?;
                w.end_element("cac:PayerFinancialAccount")?;
            }
            w.end_element("cac:PaymentMandate")?;
        }

        w.end_element("cac:PaymentMeans")?;
    }

    if let Some(terms) = &payment.terms {
        w.start_element("cac:PaymentTerms")?;
        w.text_element("cbc:Note", terms)?;
        w.end_element("cac:PaymentTerms")?;
    }
    Ok(())
}

fn write_tax_category(
    w: &mut XmlWriter,
    wrapper: &str,
    category: TaxCategory,
    rate: Option<Decimal>,
    exemption_code: Option<&str>,
    exemption_reason: Option<&str>,
) -> WriteResult {
    w.start_element(wrapper)?;
    w.text_element("cbc:ID", category.code())?;
    if let Some(rate) = rate {
        w.text_element("cbc:Percent", &format_decimal(rate))?;
    }
    w.opt_text_element("cbc:TaxExemptionReasonCode", exemption_code)?;
    w.opt_text_element("cbc:TaxExemptionReason", exemption_reason)?;
    w.start_element("cac:TaxScheme")?;
    w.text_element("cbc:ID", super::VAT_SCHEME)?;
    w.end_element("cac:TaxScheme")?;
    w.end_element(wrapper)?;
    Ok(())
}

fn write_allowance_charge(
    w: &mut XmlWriter,
    item: &AllowanceOrCharge,
    is_charge: bool,
    amount: Decimal,
    base_amount: Decimal,
    currency: &str,
    with_tax_category: bool,
) -> WriteResult {
    w.start_element("cac:AllowanceCharge")?;
    w.text_element("cbc:ChargeIndicator", if is_charge { "true" } else { "false" })?;
    w.opt_text_element("cbc:AllowanceChargeReasonCode", item.reason_code())?;
    w.opt_text_element("cbc:AllowanceChargeReason", item.reason())?;
    if item.is_percentage() {
        w.text_element("cbc:MultiplierFactorNumeric", &format_decimal(item.amount()))?;
    }
    w.amount_element("cbc:Amount", amount, currency)?;
    if item.is_percentage() {
        w.amount_element("cbc:BaseAmount", base_amount, currency)?;
    }
    if with_tax_category {
        write_tax_category(
            w,
            "cac:TaxCategory",
            item.vat_category(),
            item.vat_rate(),
            item.vat_exemption_reason_code(),
            item.vat_exemption_reason(),
        )?;
    }
    w.end_element("cac:AllowanceCharge")?;
    Ok(())
}

fn write_tax_total(w: &mut XmlWriter, totals: &InvoiceTotals) -> WriteResult {
    let currency = totals.currency.as_str();
    w.start_element("cac:TaxTotal")?;
    w.amount_element("cbc:TaxAmount", totals.vat_amount, currency)?;
    for group in &totals.vat_breakdown {
        w.start_element("cac:TaxSubtotal")?;
        w.amount_element("cbc:TaxableAmount", group.taxable_amount, currency)?;
        w.amount_element("cbc:TaxAmount", group.tax_amount, currency)?;
        write_tax_category(
            w,
            "cac:TaxCategory",
            group.category,
            group.rate,
            group.exemption_reason_code.as_deref(),
            group.exemption_reason.as_deref(),
        )?;
        w.end_element("cac:TaxSubtotal")?;
    }
    w.end_element("cac:TaxTotal")?;
    Ok(())
}

/// BG-22. Allowance/charge totals only when the invoice has any;
/// prepaid and rounding amounts only when non-zero.
fn write_monetary_total(w: &mut XmlWriter, invoice: &Invoice, totals: &InvoiceTotals) -> WriteResult {
    let currency = totals.currency.as_str();
    w.start_element("cac:LegalMonetaryTotal")?;
    w.amount_element("cbc:LineExtensionAmount", totals.net_amount, currency)?;
    w.amount_element("cbc:TaxExclusiveAmount", totals.tax_exclusive_amount, currency)?;
    w.amount_element("cbc:TaxInclusiveAmount", totals.tax_inclusive_amount, currency)?;
    if !invoice.allowances().is_empty() {
        w.amount_element("cbc:AllowanceTotalAmount", totals.allowances_amount, currency)?;
    }
    if !invoice.charges().is_empty() {
        w.amount_element("cbc:ChargeTotalAmount", totals.charges_amount, currency)?;
    }
    if !totals.paid_amount.is_zero() {
        w.amount_element("cbc:PrepaidAmount", totals.paid_amount, currency)?;
    }
    if !totals.rounding_amount.is_zero() {
        w.amount_element("cbc:PayableRoundingAmount", totals.rounding_amount, currency)?;
    }
    w.amount_element("cbc:PayableAmount", totals.payable_amount, currency)?;
    w.end_element("cac:LegalMonetaryTotal")?;
    Ok(())
}

fn write_line(
    w: &mut XmlWriter,
    invoice: &Invoice,
    line: &InvoiceLine,
    index: usize,
    currency: &str,
) -> WriteResult {
    let matrix = invoice.rounding_matrix();
    // Checked by check_exportable: every line has a price
    let base = line.base_amount(matrix).unwrap_or(Decimal::ZERO);
    let net = line.net_amount(matrix).unwrap_or(Decimal::ZERO);

    w.start_element("cac:InvoiceLine")?;
    match line.id() {
        Some(id) => w.text_element("cbc:ID", id)?,
        None => w.text_element("cbc:ID", &(index + 1).to_string())?,
    };
    w.opt_text_element("cbc:Note", line.note())?;
    w.quantity_element("cbc:InvoicedQuantity", line.quantity(), line.unit())?;
    w.amount_element("cbc:LineExtensionAmount", net, currency)?;
    w.opt_text_element("cbc:AccountingCost", line.buyer_accounting_reference())?;
    if let Some(period) = line.period() {
        write_period(w, period)?;
    }

    // BG-27 / BG-28
    for allowance in line.allowances() {
        let amount = matrix.round(allowance.effective_amount(base), fields::LINE_ALLOWANCE_CHARGE_AMOUNT);
        write_allowance_charge(w, allowance, false, amount, base, currency, false)?;
    }
    for charge in line.charges() {
        let amount = matrix.round(charge.effective_amount(base), fields::LINE_ALLOWANCE_CHARGE_AMOUNT);
        write_allowance_charge(w, charge, true, amount, base, currency, false)?;
    }

    // BG-31: Item
    w.start_element("cac:Item")?;
    w.opt_text_element("cbc:Description", line.description())?;
    w.opt_text_element("cbc:Name", line.name())?;
    if let Some(id) = line.buyer_identifier() {
        w.start_element("cac:BuyersItemIdentification")?;
        w.text_element("cbc:ID", id)?;
        w.end_element("cac:BuyersItemIdentification")?;
    }
    if let Some(id) = line.seller_identifier() {
        w.start_element("cac:SellersItemIdentification")?;
        w.text_element("cbc:ID", id)?;
        w.end_element("cac:SellersItemIdentification")?;
    }
    if let Some(id) = line.standard_identifier() {
        w.start_element("cac:StandardItemIdentification")?;
        w.scheme_element("cbc:ID", "schemeID", id.value(), id.scheme())?;
        w.end_element("cac:StandardItemIdentification")?;
    }
    if let Some(country) = line.origin_country() {
        w.start_element("cac:OriginCountry")?;
        w.text_element("cbc:IdentificationCode", country)?;
        w.end_element("cac:OriginCountry")?;
    }
    for class in line.classification_identifiers() {
        w.start_element("cac:CommodityClassification")?;
        w.scheme_element("cbc:ItemClassificationCode", "listID", class.value(), class.scheme())?;
        w.end_element("cac:CommodityClassification")?;
    }
    write_tax_category(
        w,
        "cac:ClassifiedTaxCategory",
        line.vat_category(),
        line.vat_rate(),
        line.vat_exemption_reason_code(),
        line.vat_exemption_reason(),
    )?;
    for attribute in line.attributes() {
        w.start_element("cac:AdditionalItemProperty")?;
        w.text_element("cbc:Name", &attribute.name)?;
        w.text_element("cbc:Value", &attribute.value)?;
        w.end_element("cac:AdditionalItemProperty")?;
    }
    w.end_element("cac:Item")?;

    // BG-29: Price
    w.start_element("cac:Price")?;
    w.amount_element("cbc:PriceAmount", line.price().unwrap_or(Decimal::ZERO), currency)?;
    if line.base_quantity() != Decimal::ONE {
        w.quantity_element("cbc:BaseQuantity", line.base_quantity(), line.unit())?;
    }
    w.end_element("cac:Price")?;

    w.end_element("cac:InvoiceLine")?;
    Ok(())
}
