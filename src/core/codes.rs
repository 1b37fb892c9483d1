//! Code lists referenced by EN 16931 business rules.
//!
//! Each list is kept sorted so lookups are a binary search.

/// A code list an EN 16931 field value is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeList {
    /// ISO 3166-1 alpha-2 (BR-CL-14).
    Country,
    /// ISO 4217 (BR-CL-3).
    Currency,
    /// UNTDID 5189 allowance reasons (BR-CL-19).
    AllowanceReason,
    /// UNTDID 7161 charge reasons (BR-CL-20).
    ChargeReason,
}

impl CodeList {
    pub fn codes(self) -> &'static [&'static str] {
        match self {
            Self::Country => COUNTRY_CODES,
            Self::Currency => CURRENCY_CODES,
            Self::AllowanceReason => ALLOWANCE_REASON_CODES,
            Self::ChargeReason => CHARGE_REASON_CODES,
        }
    }

    /// Whether `code` is a member of this list. Case-sensitive.
    pub fn contains(self, code: &str) -> bool {
        self.codes().binary_search(&code).is_ok()
    }
}

static COUNTRY_CODES: &[&str] = &[
    "AD", "AE", "AF", "AG", "AI", "AL", "AM", "AO", "AQ", "AR", "AS", "AT", "AU", "AW", "AX", "AZ",
    "BA", "BB", "BD", "BE", "BF", "BG", "BH", "BI", "BJ", "BL", "BM", "BN", "BO", "BQ", "BR", "BS",
    "BT", "BV", "BW", "BY", "BZ", "CA", "CC", "CD", "CF", "CG", "CH", "CI", "CK", "CL", "CM", "CN",
    "CO", "CR", "CU", "CV", "CW", "CX", "CY", "CZ", "DE", "DJ", "DK", "DM", "DO", "DZ", "EC", "EE",
    "EG", "EH", "ER", "ES", "ET", "FI", "FJ", "FK", "FM", "FO", "FR", "GA", "GB", "GD", "GE", "GF",
    "GG", "GH", "GI", "GL", "GM", "GN", "GP", "GQ", "GR", "GS", "GT", "GU", "GW", "GY", "HK", "HM",
    "HN", "HR", "HT", "HU", "ID", "IE", "IL", "IM", "IN", "IO", "IQ", "IR", "IS", "IT", "JE", "JM",
    "JO", "JP", "KE", "KG", "KH", "KI", "KM", "KN", "KP", "KR", "KW", "KY", "KZ", "LA", "LB", "LC",
    "LI", "LK", "LR", "LS", "LT", "LU", "LV", "LY", "MA", "MC", "MD", "ME", "MF", "MG", "MH", "MK",
    "ML", "MM", "MN", "MO", "MP", "MQ", "MR", "MS", "MT", "MU", "MV", "MW", "MX", "MY", "MZ", "NA",
    "NC", "NE", "NF", "NG", "NI", "NL", "NO", "NP", "NR", "NU", "NZ", "OM", "PA", "PE", "PF", "PG",
    "PH", "PK", "PL", "PM", "PN", "PR", "PS", "PT", "PW", "PY", "QA", "RE", "RO", "RS", "RU", "RW",
    "SA", "SB", "SC", "SD", "SE", "SG", "SH", "SI", "SJ", "SK", "SL", "SM", "SN", "SO", "SR", "SS",
    "ST", "SV", "SX", "SY", "SZ", "TC", "TD", "TF", "TG", "TH", "TJ", "TK", "TL", "TM", "TN", "TO",
    "TR", "TT", "TV", "TW", "TZ", "UA", "UG", "UM", "US", "UY", "UZ", "VA", "VC", "VE", "VG", "VI",
    "VN", "VU", "WF", "WS", "YE", "YT", "ZA", "ZM", "ZW",
];

static CURRENCY_CODES: &[&str] = &[
    "AED", "AFN", "ALL", "AMD", "ANG", "AOA", "ARS", "AUD", "AWG", "AZN", "BAM", "BBD", "BDT", "BGN",
    "BHD", "BIF", "BMD", "BND", "BOB", "BRL", "BSD", "BTN", "BWP", "BYN", "BZD", "CAD", "CDF", "CHF",
    "CLP", "CNY", "COP", "CRC", "CUP", "CVE", "CZK", "DJF", "DKK", "DOP", "DZD", "EGP", "ERN", "ETB",
    "EUR", "FJD", "FKP", "GBP", "GEL", "GHS", "GIP", "GMD", "GNF", "GTQ", "GYD", "HKD", "HNL", "HTG",
    "HUF", "IDR", "ILS", "INR", "IQD", "IRR", "ISK", "JMD", "JOD", "JPY", "KES", "KGS", "KHR", "KMF",
    "KPW", "KRW", "KWD", "KYD", "KZT", "LAK", "LBP", "LKR", "LRD", "LSL", "LYD", "MAD", "MDL", "MGA",
    "MKD", "MMK", "MNT", "MOP", "MRU", "MUR", "MVR", "MWK", "MXN", "MYR", "MZN", "NAD", "NGN", "NIO",
    "NOK", "NPR", "NZD", "OMR", "PAB", "PEN", "PGK", "PHP", "PKR", "PLN", "PYG", "QAR", "RON", "RSD",
    "RUB", "RWF", "SAR", "SBD", "SCR", "SDG", "SEK", "SGD", "SHP", "SLE", "SOS", "SRD", "SSP", "STN",
    "SVC", "SYP", "SZL", "THB", "TJS", "TMT", "TND", "TOP", "TRY", "TTD", "TWD", "TZS", "UAH", "UGX",
    "USD", "UYU", "UZS", "VES", "VND", "VUV", "WST", "XAF", "XCD", "XOF", "XPF", "YER", "ZAR", "ZMW",
    "ZWL",
];

// Byte order, so "100" sorts before "41".
static ALLOWANCE_REASON_CODES: &[&str] = &[
    "100", "102", "103", "104", "105", "41", "42", "60", "62", "63", "64", "65",
    "66", "67", "68", "70", "71", "88", "95",
];

static CHARGE_REASON_CODES: &[&str] = &[
    "AA", "AAA", "AAC", "AAD", "AAE", "AAF", "ABK", "ABL", "ADR", "ADT", "AEW", "FC",
    "FI", "FL", "LA", "PC", "TS",
];

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [CodeList; 4] = [
        CodeList::Country,
        CodeList::Currency,
        CodeList::AllowanceReason,
        CodeList::ChargeReason,
    ];

    #[test]
    fn lists_are_sorted() {
        for list in ALL {
            for pair in list.codes().windows(2) {
                assert!(pair[0] < pair[1], "{list:?}: {} >= {}", pair[0], pair[1]);
            }
        }
    }

    #[test]
    fn lookups() {
        assert!(CodeList::Country.contains("RO"));
        assert!(!CodeList::Country.contains("XX"));
        assert!(!CodeList::Country.contains("de"));
        assert!(CodeList::Currency.contains("EUR"));
        assert!(CodeList::Currency.contains("RON"));
        assert!(!CodeList::Currency.contains("EURO"));
        assert!(CodeList::AllowanceReason.contains("95"));
        assert!(!CodeList::AllowanceReason.contains("FC"));
        assert!(CodeList::ChargeReason.contains("FC"));
        assert!(!CodeList::ChargeReason.contains(""));
    }
}
