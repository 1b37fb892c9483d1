use super::invoice::Invoice;
use super::validation::Rule;

/// A specification (CIUS/extension of EN 16931) with its own setup and
/// rules.
pub trait Preset: Send + Sync {
    /// BT-24 value identifying this preset.
    fn specification(&self) -> &str;

    /// Adjust a fresh or freshly imported invoice (business process,
    /// rounding matrix, ...). Called after the specification id is set.
    fn setup_invoice(&self, _invoice: &mut Invoice) {}

    /// Rules evaluated after the base EN 16931 rules.
    fn rules(&self) -> Vec<Rule>;
}

/// Specification id → preset lookup.
///
/// Built once by the caller (see `presets::default_registry`) and passed
/// by reference to the reader and to validation. Holds no interior
/// mutability, so a shared reference can cross threads.
#[derive(Default)]
pub struct PresetRegistry {
    presets: Vec<Box<dyn Preset>>,
}

impl PresetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a preset, replacing any preset with the same specification id.
    pub fn register(&mut self, preset: impl Preset + 'static) -> &mut Self {
        let preset: Box<dyn Preset> = Box::new(preset);
        match self
            .presets
            .iter_mut()
            .find(|p| p.specification() == preset.specification())
        {
            Some(slot) => *slot = preset,
            None => self.presets.push(preset),
        }
        self
    }

    pub fn get(&self, specification: &str) -> Option<&dyn Preset> {
        self.presets
            .iter()
            .find(|p| p.specification() == specification)
            .map(|p| p.as_ref())
    }

    pub fn contains(&self, specification: &str) -> bool {
        self.get(specification).is_some()
    }

    /// Registered specification ids, in registration order.
    pub fn specifications(&self) -> Vec<&str> {
        self.presets.iter().map(|p| p.specification()).collect()
    }

    /// Empty invoice set up for `specification`, or `None` if no preset
    /// is registered for it.
    pub fn new_invoice(&self, specification: &str) -> Option<Invoice> {
        let preset = self.get(specification)?;
        let mut invoice = Invoice::new();
        invoice.set_specification(specification);
        preset.setup_invoice(&mut invoice);
        Some(invoice)
    }
}

impl std::fmt::Debug for PresetRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresetRegistry")
            .field("specifications", &self.specifications())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RoundingMatrix;

    struct Dummy(&'static str, u32);

    impl Preset for Dummy {
        fn specification(&self) -> &str {
            self.0
        }

        fn setup_invoice(&self, invoice: &mut Invoice) {
            invoice.set_rounding_matrix(RoundingMatrix::new().with_default(self.1));
        }

        fn rules(&self) -> Vec<Rule> {
            Vec::new()
        }
    }

    #[test]
    fn register_replaces_same_specification() {
        let mut registry = PresetRegistry::new();
        registry.register(Dummy("urn:a", 2)).register(Dummy("urn:b", 2));
        registry.register(Dummy("urn:a", 4));
        assert_eq!(registry.specifications(), vec!["urn:a", "urn:b"]);
        let invoice = registry.new_invoice("urn:a").unwrap();
        assert_eq!(invoice.specification(), "urn:a");
        assert_eq!(invoice.rounding_matrix().decimals("line/netAmount"), 4);
    }

    #[test]
    fn unknown_specification() {
        let registry = PresetRegistry::new();
        assert!(!registry.contains("urn:x"));
        assert!(registry.new_invoice("urn:x").is_none());
    }
}
