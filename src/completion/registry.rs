//! Provider registry
//!
//! Keeps the registered providers in registration order, which is also the
//! order their groups appear in the popup, plus the subset that takes part in
//! interactive (typing-triggered) completion.

use std::sync::Arc;

use super::provider::{CompletionProvider, ProviderId};
use crate::error::{RegistryError, Result};

/// A provider together with the id the registry gave it
#[derive(Clone)]
pub struct RegisteredProvider {
    pub id: ProviderId,
    pub provider: Arc<dyn CompletionProvider>,
}

/// Ordered set of providers bound to one engine
#[derive(Default)]
pub struct ProviderRegistry {
    entries: Vec<RegisteredProvider>,
    interactive: Vec<ProviderId>,
    next_id: u64,
}

fn same_provider(a: &Arc<dyn CompletionProvider>, b: &Arc<dyn CompletionProvider>) -> bool {
    // Compare data pointers only; vtable pointers may differ across codegen units.
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `provider`
    ///
    /// # Returns
    /// * `Result<ProviderId>` - Id of the new entry, or
    ///   `ProviderAlreadyRegistered` when this instance is already bound
    pub fn add(&mut self, provider: Arc<dyn CompletionProvider>) -> Result<ProviderId> {
        if self.find(&provider).is_some() {
            return Err(RegistryError::ProviderAlreadyRegistered(provider.name().to_string()).into());
        }

        self.next_id += 1;
        let id = ProviderId(self.next_id);

        if provider.is_interactive() {
            self.interactive.push(id);
        }
        self.entries.push(RegisteredProvider { id, provider });

        Ok(id)
    }

    /// Unregister the provider with `id`
    pub fn remove(&mut self, id: ProviderId) -> Result<Arc<dyn CompletionProvider>> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or(RegistryError::ProviderNotRegistered(id))?;

        self.interactive.retain(|other| *other != id);
        Ok(self.entries.remove(index).provider)
    }

    /// Id of `provider` if this instance is registered
    pub fn find(&self, provider: &Arc<dyn CompletionProvider>) -> Option<ProviderId> {
        self.entries
            .iter()
            .find(|entry| same_provider(&entry.provider, provider))
            .map(|entry| entry.id)
    }

    pub fn get(&self, id: ProviderId) -> Option<&Arc<dyn CompletionProvider>> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| &entry.provider)
    }

    pub fn contains(&self, id: ProviderId) -> bool {
        self.position(id).is_some()
    }

    /// Registration index of `id`
    pub fn position(&self, id: ProviderId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    /// All provider ids in registration order
    pub fn ids(&self) -> Vec<ProviderId> {
        self.entries.iter().map(|entry| entry.id).collect()
    }

    /// Interactive provider ids in registration order
    pub fn interactive_ids(&self) -> &[ProviderId] {
        &self.interactive
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredProvider> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sort `ids` by registration order, dropping unknown ids and duplicates
    pub fn in_registry_order(&self, ids: &[ProviderId]) -> Vec<ProviderId> {
        self.entries
            .iter()
            .map(|entry| entry.id)
            .filter(|id| ids.contains(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::context::CompletionContext;
    use crate::completion::sink::ProposalSink;
    use crate::error::CompletionError;

    struct NamedProvider {
        name: &'static str,
        interactive: bool,
    }

    impl CompletionProvider for NamedProvider {
        fn name(&self) -> &str {
            self.name
        }

        fn populate(&self, _context: &CompletionContext, sink: ProposalSink) {
            sink.finish();
        }

        fn is_interactive(&self) -> bool {
            self.interactive
        }
    }

    fn provider(name: &'static str, interactive: bool) -> Arc<dyn CompletionProvider> {
        Arc::new(NamedProvider { name, interactive })
    }

    #[test]
    fn test_add_keeps_registration_order() {
        let mut registry = ProviderRegistry::new();
        let a = registry.add(provider("a", false)).unwrap();
        let b = registry.add(provider("b", true)).unwrap();

        assert_eq!(registry.ids(), vec![a, b]);
        assert_eq!(registry.interactive_ids(), &[b]);
        assert_eq!(registry.position(b), Some(1));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_add_same_instance_twice_fails() {
        let mut registry = ProviderRegistry::new();
        let words = provider("words", true);

        registry.add(words.clone()).unwrap();
        let err = registry.add(words).unwrap_err();

        assert!(matches!(
            err,
            CompletionError::Registry(RegistryError::ProviderAlreadyRegistered(ref name)) if name == "words"
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_equal_but_distinct_instances_are_allowed() {
        let mut registry = ProviderRegistry::new();
        registry.add(provider("words", false)).unwrap();
        registry.add(provider("words", false)).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_remove() {
        let mut registry = ProviderRegistry::new();
        let a = registry.add(provider("a", true)).unwrap();

        let removed = registry.remove(a).unwrap();
        assert_eq!(removed.name(), "a");
        assert!(registry.is_empty());
        assert!(registry.interactive_ids().is_empty());
    }

    #[test]
    fn test_remove_unknown_fails() {
        let mut registry = ProviderRegistry::new();
        let err = registry.remove(ProviderId(42)).err().unwrap();
        assert!(matches!(
            err,
            CompletionError::Registry(RegistryError::ProviderNotRegistered(ProviderId(42)))
        ));
    }

    #[test]
    fn test_in_registry_order() {
        let mut registry = ProviderRegistry::new();
        let a = registry.add(provider("a", false)).unwrap();
        let b = registry.add(provider("b", false)).unwrap();
        let c = registry.add(provider("c", false)).unwrap();

        assert_eq!(
            registry.in_registry_order(&[c, ProviderId(99), a, c]),
            vec![a, c]
        );
        assert_eq!(registry.in_registry_order(&[b]), vec![b]);
    }

    #[test]
    fn test_find_by_instance() {
        let mut registry = ProviderRegistry::new();
        let words = provider("words", false);
        let id = registry.add(words.clone()).unwrap();

        assert_eq!(registry.find(&words), Some(id));
        assert_eq!(registry.find(&provider("words", false)), None);
    }
}
