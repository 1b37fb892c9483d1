//! Peppol BIS Billing 3.0 (PEPPOL-EN16931-Rxxx).
//!
//! These rules are stricter than base EN 16931.

use crate::core::*;

/// Peppol BIS Billing 3.0 customization identifier (BT-24).
pub const PEPPOL_SPECIFICATION: &str =
    "urn:cen.eu:en16931:2017#compliant#urn:fdc:peppol.eu:2017:poacc:billing:3.0";

/// Peppol BIS Billing 3.0 profile identifier (BT-23).
pub const PEPPOL_PROFILE_ID: &str = "urn:fdc:peppol.eu:2017:poacc:billing:01:1.0";

#[derive(Debug, Default, Clone, Copy)]
pub struct PeppolPreset;

impl Preset for PeppolPreset {
    fn specification(&self) -> &str {
        PEPPOL_SPECIFICATION
    }

    fn setup_invoice(&self, invoice: &mut Invoice) {
        invoice.set_business_process(Some(PEPPOL_PROFILE_ID.to_string()));
        super::two_decimal_setup(invoice);
    }

    fn rules(&self) -> Vec<Rule> {
        vec![
            Rule::new("PEPPOL-EN16931-R001", r001),
            Rule::new("PEPPOL-EN16931-R003", r003),
            Rule::new("PEPPOL-EN16931-R010", r010),
            Rule::new("PEPPOL-EN16931-R020", r020),
            Rule::new("PEPPOL-EN16931-CL008", cl008),
        ]
    }
}

// R001: Business process MUST be provided
fn r001(inv: &Invoice) -> Option<String> {
    is_blank(inv.business_process())
        .then(|| "business process (BT-23 / ProfileID) must be provided".into())
}

// R003: Buyer reference OR purchase order reference must be present
fn r003(inv: &Invoice) -> Option<String> {
    (is_blank(inv.buyer_reference()) && is_blank(inv.purchase_order_reference()))
        .then(|| "a buyer reference (BT-10) or purchase order reference (BT-13) is required".into())
}

// R010: Buyer electronic address must be provided
fn r010(inv: &Invoice) -> Option<String> {
    inv.buyer()
        .is_none_or(|b| b.electronic_address.is_none())
        .then(|| "buyer electronic address (BT-49 / EndpointID) is required".into())
}

// R020: Seller electronic address must be provided
fn r020(inv: &Invoice) -> Option<String> {
    inv.seller()
        .is_none_or(|s| s.electronic_address.is_none())
        .then(|| "seller electronic address (BT-34 / EndpointID) is required".into())
}

// CL008: Electronic address scheme must be from the EAS code list
fn cl008(inv: &Invoice) -> Option<String> {
    [inv.seller(), inv.buyer()]
        .into_iter()
        .flatten()
        .filter_map(|p| p.electronic_address.as_ref())
        .find(|address| !address.scheme().is_some_and(is_known_eas_code))
        .map(|address| {
            format!(
                "electronic address scheme {:?} is not in the EAS code list",
                address.scheme().unwrap_or_default()
            )
        })
}

/// Whether `code` is an Electronic Address Scheme (EAS) code accepted for
/// a Peppol EndpointID.
pub fn is_known_eas_code(code: &str) -> bool {
    EAS_CODES.binary_search(&code).is_ok()
}

/// EAS codes (sorted for binary search).
static EAS_CODES: &[&str] = &[
    "0002", // System Information et Repertoire des Entreprise et des Etablissements (SIRENE)
    "0007", // Organisationsnummer (Swedish legal entities)
    "0009", // SIRET-CODE
    "0037", // LY-tunnus (Finnish OVT)
    "0060", // DUNS number
    "0088", // GS1 GLN
    "0096", // DANISH CHAMBER OF COMMERCE Scheme
    "0097", // FTI - Ediforum Italia
    "0106", // Dutch KvK
    "0130", // Directorates of the European Commission
    "0135", // SIA Object Identifiers
    "0142", // SECETI Object Identifiers
    "0151", // Australian Business Number
    "0183", // Swiss Unique Business Identification Number (UIDB)
    "0184", // DIGSTORG
    "0188", // Corporate Number of The Social Security and Tax Number System
    "0190", // Dutch OIN
    "0191", // Centre of Registers and Information Systems of the Ministry of Justice
    "0192", // Enhetsregisteret ved Bronnoysundregisterne
    "0193", // UBL.BE party identifier
    "0195", // Singapore UEN identifier
    "0196", // Kennitala - Iceland legal id for individuals and legal entities
    "0198", // ERSTORG
    "0199", // Legal Entity Identifier (LEI)
    "0200", // Legal entity code (Lithuania)
    "0201", // Codice Univoco Unita Organizzativa iPA
    "0202", // Indirizzo di Posta Elettronica Certificata
    "0204", // Leitweg-ID
    "0208", // Numero d'entreprise / ondernemingsnummer / Unternehmensnummer
    "0209", // GS1 identification keys
    "0210", // Codice Fiscale
    "0211", // Partita IVA
    "0212", // Finnish Organization Identifier
    "0213", // Finnish Organization Value Add Tax Identifier
    "0215", // Net service ID
    "0216", // OVTcode
    "0218", // Unified registration number (Latvia)
    "0221", // The registered number of the qualified invoice issuer (Japan)
    "0230", // National e-Invoicing Framework (Malaysia)
    "9901", // Danish Ministry of the Interior and Health
    "9910", // Hungary VAT number
    "9913", // Business Registers Network
    "9914", // Osterreichische Umsatzsteuer-Identifikationsnummer
    "9915", // Osterreichisches Verwaltungs bzw. Organisationskennzeichen
    "9918", // SOCIETY FOR WORLDWIDE INTERBANK FINANCIAL, TELECOMMUNICATION S.W.I.F.T
    "9919", // Kennziffer des Unternehmensregisters
    "9920", // Agencia Espanola de Administracion Tributaria
    "9922", // Andorra VAT number
    "9923", // Albania VAT number
    "9924", // Bosnia and Herzegovina VAT number
    "9925", // Belgium VAT number
    "9926", // Bulgaria VAT number
    "9927", // Switzerland VAT number
    "9928", // Cyprus VAT number
    "9929", // Czech Republic VAT number
    "9930", // Germany VAT number
    "9931", // Estonia VAT number
    "9932", // United Kingdom VAT number
    "9933", // Greece VAT number
    "9934", // Croatia VAT number
    "9935", // Ireland VAT number
    "9936", // Liechtenstein VAT number
    "9937", // Lithuania VAT number
    "9938", // Luxemburg VAT number
    "9939", // Latvia VAT number
    "9940", // Monaco VAT number
    "9941", // Montenegro VAT number
    "9942", // Macedonia, the former Yugoslav Republic of VAT number
    "9943", // Malta VAT number
    "9944", // Netherlands VAT number
    "9945", // Poland VAT number
    "9946", // Portugal VAT number
    "9947", // Romania VAT number
    "9948", // Serbia VAT number
    "9949", // Slovenia VAT number
    "9950", // Slovakia VAT number
    "9951", // San Marino VAT number
    "9952", // Turkey VAT number
    "9953", // Holy See (Vatican City State) VAT number
    "9957", // French VAT number
    "9959", // Employer Identification Number (EIN, USA)
];
