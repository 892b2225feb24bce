//! Filter type and instance registration.
//!
//! Stands in for class loading and component discovery: the host registers
//! type descriptors (resolved by name) and filter instances (discovered as
//! candidates). `FilterRegistry` serves both roles.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::filter::GatewayFilter;

/// What is known about a named filter type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterTypeInfo {
    pub name: String,
    /// Declares the `GatewayFilter` capability.
    pub implements_filter: bool,
    /// Cannot be instantiated.
    pub is_abstract: bool,
}

impl FilterTypeInfo {
    /// A concrete type implementing the filter capability.
    pub fn concrete(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            implements_filter: true,
            is_abstract: false,
        }
    }

    /// A filter type with no instantiable form.
    pub fn abstract_filter(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            implements_filter: true,
            is_abstract: true,
        }
    }

    /// A known type that is not a filter.
    pub fn unrelated(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            implements_filter: false,
            is_abstract: false,
        }
    }
}

/// A runtime object offering the filter capability.
#[derive(Clone)]
pub struct FilterCandidate {
    pub type_name: String,
    pub filter: Arc<dyn GatewayFilter>,
}

impl fmt::Debug for FilterCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterCandidate")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Resolves a fully-qualified type name.
pub trait ClassResolver {
    fn resolve(&self, name: &str) -> Option<FilterTypeInfo>;
}

/// Enumerates every registered filter instance.
pub trait FilterContainer {
    fn find_all(&self) -> Vec<FilterCandidate>;
}

/// Explicit registry of filter types and instances.
#[derive(Default)]
pub struct FilterRegistry {
    types: HashMap<String, FilterTypeInfo>,
    candidates: Vec<FilterCandidate>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a type resolvable by name. Replaces an earlier descriptor.
    pub fn register_type(&mut self, info: FilterTypeInfo) -> &mut Self {
        self.types.insert(info.name.clone(), info);
        self
    }

    /// Register a filter instance.
    ///
    /// Its type becomes resolvable as a concrete filter unless a descriptor
    /// for that name was registered already.
    pub fn register_filter(
        &mut self,
        type_name: impl Into<String>,
        filter: Arc<dyn GatewayFilter>,
    ) -> &mut Self {
        let type_name = type_name.into();
        self.types
            .entry(type_name.clone())
            .or_insert_with(|| FilterTypeInfo::concrete(type_name.clone()));
        tracing::debug!(type_name = %type_name, "Filter instance registered");
        self.candidates.push(FilterCandidate { type_name, filter });
        self
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }
}

impl ClassResolver for FilterRegistry {
    fn resolve(&self, name: &str) -> Option<FilterTypeInfo> {
        self.types.get(name).cloned()
    }
}

impl FilterContainer for FilterRegistry {
    fn find_all(&self) -> Vec<FilterCandidate> {
        self.candidates.clone()
    }
}
