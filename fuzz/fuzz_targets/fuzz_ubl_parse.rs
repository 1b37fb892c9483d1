#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let registry = einvoice::presets::default_registry();
        if let Ok(invoice) = einvoice::ubl::from_ubl_xml(s, &registry) {
            // Totals and validation must not panic on whatever was read.
            let _ = invoice.totals();
            let _ = einvoice::validate_all(&invoice, &registry);
        }
    }
});
