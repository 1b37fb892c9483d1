#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let registry = einvoice::presets::default_registry();
        // Parse → serialize → parse must not panic at any step.
        if let Ok(invoice) = einvoice::ubl::from_ubl_xml(s, &registry) {
            if let Ok(xml) = einvoice::ubl::to_ubl_xml(&invoice) {
                let _ = einvoice::ubl::from_ubl_xml(&xml, &registry);
            }
        }
    }
});
