//! Operation identifier → service-layer call.
//!
//! The table is built once from configuration (or [`BindingTable::builtin`])
//! and checked against the operations of the document before anything is
//! rendered. Lookups never fail: an identifier without an entry resolves to
//! [`HandlerBody::Stub`].

use crate::config::BindingPolicy;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::Deserialize;

/// One service function bound to an operation identifier
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Binding {
    pub operation_id: String,
    /// Import path of the module defining the function
    pub module: String,
    pub function: String,
}

impl Binding {
    pub fn new(operation_id: &str, module: &str, function: &str) -> Self {
        Self {
            operation_id: operation_id.to_string(),
            module: module.to_string(),
            function: function.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindingTable {
    entries: IndexMap<String, Binding>,
}

impl BindingTable {
    /// Build a table, rejecting an identifier that is bound twice
    pub fn new(bindings: Vec<Binding>) -> Result<Self> {
        let mut entries = IndexMap::with_capacity(bindings.len());
        for binding in bindings {
            if entries.contains_key(&binding.operation_id) {
                return Err(Error::Config(format!(
                    "operation `{}` is bound more than once",
                    binding.operation_id
                )));
            }
            entries.insert(binding.operation_id.clone(), binding);
        }
        Ok(Self { entries })
    }

    /// The service implementations shipped with the application skeleton
    pub fn builtin() -> Self {
        let entries = [
            Binding::new(
                "get_weather",
                "app.services.external.get_weather_impl",
                "get_weather_impl",
            ),
            Binding::new(
                "get_random_quote",
                "app.services.external.get_random_quote_impl",
                "get_random_quote_impl",
            ),
        ]
        .into_iter()
        .map(|b| (b.operation_id.clone(), b))
        .collect();
        Self { entries }
    }

    pub fn get(&self, operation_id: &str) -> Option<&Binding> {
        self.entries.get(operation_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check the table against the operation identifiers of a document.
    ///
    /// Unbound identifiers fail the run under [`BindingPolicy::Strict`] and are
    /// logged under [`BindingPolicy::Lenient`]. Bindings for identifiers the
    /// document does not declare are always logged.
    pub fn validate<'a>(
        &self,
        operation_ids: impl IntoIterator<Item = &'a str>,
        policy: BindingPolicy,
    ) -> Result<()> {
        let ids: Vec<&str> = operation_ids.into_iter().collect();

        for bound in self.entries.keys() {
            if !ids.contains(&bound.as_str()) {
                warn!("Binding for `{}` matches no operation in the schema", bound);
            }
        }

        let unbound: Vec<String> = ids
            .iter()
            .filter(|id| !self.entries.contains_key(**id))
            .map(|id| id.to_string())
            .collect();
        if unbound.is_empty() {
            return Ok(());
        }
        match policy {
            BindingPolicy::Strict => Err(Error::UnboundOperations(unbound)),
            BindingPolicy::Lenient => {
                for id in &unbound {
                    warn!("No service binding for `{}`; emitting a not-implemented stub", id);
                }
                Ok(())
            }
        }
    }
}

/// What a generated handler does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerBody {
    /// Await the bound service function
    Delegate {
        binding: Binding,
        /// Whether the handler's request parameter is passed on
        pass_request: bool,
    },
    /// Always signal "not implemented"
    Stub,
}

/// Resolves handler bodies against a [`BindingTable`]
#[derive(Debug, Clone, Copy)]
pub struct ServiceBindingResolver<'a> {
    table: &'a BindingTable,
}

impl<'a> ServiceBindingResolver<'a> {
    pub fn new(table: &'a BindingTable) -> Self {
        Self { table }
    }

    pub fn resolve(&self, operation_id: &str, has_request: bool) -> HandlerBody {
        match self.table.get(operation_id) {
            Some(binding) => {
                debug!("Binding {} to {}.{}", operation_id, binding.module, binding.function);
                HandlerBody::Delegate {
                    binding: binding.clone(),
                    pass_request: has_request,
                }
            }
            None => HandlerBody::Stub,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmapped_identifier_resolves_to_stub() {
        let table = BindingTable::builtin();
        let resolver = ServiceBindingResolver::new(&table);
        assert_eq!(resolver.resolve("foo_bar", true), HandlerBody::Stub);
    }

    #[test]
    fn test_bound_identifier_delegates() {
        let table = BindingTable::builtin();
        let resolver = ServiceBindingResolver::new(&table);

        match resolver.resolve("get_weather", true) {
            HandlerBody::Delegate { binding, pass_request } => {
                assert_eq!(binding.function, "get_weather_impl");
                assert!(pass_request);
            }
            HandlerBody::Stub => panic!("get_weather should be bound"),
        }
        assert!(matches!(
            resolver.resolve("get_random_quote", false),
            HandlerBody::Delegate { pass_request: false, .. }
        ));
    }

    #[test]
    fn test_duplicate_binding_is_rejected() {
        let result = BindingTable::new(vec![
            Binding::new("a", "m", "f"),
            Binding::new("a", "m", "g"),
        ]);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_strict_policy_lists_unbound_operations() {
        let table = BindingTable::new(vec![Binding::new("a", "m", "f")]).unwrap();
        match table.validate(["a", "b", "c"], BindingPolicy::Strict) {
            Err(Error::UnboundOperations(ids)) => assert_eq!(ids, vec!["b", "c"]),
            other => panic!("expected unbound operations, got {other:?}"),
        }
        assert!(table.validate(["a", "b"], BindingPolicy::Lenient).is_ok());
        assert!(table.validate(["a"], BindingPolicy::Strict).is_ok());
    }
}
