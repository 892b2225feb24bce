//! Filter admission.
//!
//! # Responsibilities
//! - Decide whether zero or one filter runs for the process lifetime
//! - Reject ambiguous setups (more than one registered filter)
//! - Reject configured types that are not instantiable filters
//!
//! # Outcomes
//! ```text
//! name blank                      → Disabled(Blank)
//! 0 candidates                    → Disabled(NoCandidates)
//! ≥2 candidates                   → Err(Ambiguous)
//! 1 candidate, name unresolved    → Disabled(Unresolved)
//! 1 candidate, not a filter       → Err(InvalidType(MissingCapability))
//! 1 candidate, abstract           → Err(InvalidType(Abstract))
//! 1 candidate, valid              → Admitted
//! ```

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::filter::registry::{ClassResolver, FilterContainer};
use crate::filter::GatewayFilter;

/// Why filtering is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisableReason {
    /// No filter name configured.
    Blank,
    /// A name is configured but nothing offering the capability is registered.
    NoCandidates,
    /// The configured name does not resolve to a known type.
    Unresolved,
}

impl fmt::Display for DisableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisableReason::Blank => f.write_str("no filter configured"),
            DisableReason::NoCandidates => f.write_str("no filter implementation registered"),
            DisableReason::Unresolved => f.write_str("filter type could not be resolved"),
        }
    }
}

/// Why a resolved type cannot be admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidTypeReason {
    MissingCapability,
    Abstract,
}

impl fmt::Display for InvalidTypeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidTypeReason::MissingCapability => f.write_str("does not implement GatewayFilter"),
            InvalidTypeReason::Abstract => f.write_str("is abstract; GatewayFilter requires a concrete type"),
        }
    }
}

/// Fatal filter configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("filter '{class_name}': {count} GatewayFilter implementations registered ({}), at most one is allowed", .candidates.join(", "))]
    Ambiguous {
        class_name: String,
        count: usize,
        candidates: Vec<String>,
    },

    #[error("filter '{class_name}' {reason}")]
    InvalidType {
        class_name: String,
        reason: InvalidTypeReason,
    },
}

/// Startup decision about the request filter.
#[derive(Clone)]
pub enum FilterAdmission {
    Disabled {
        reason: DisableReason,
    },
    /// `class_name` is the configured name; `type_name` is the registered
    /// instance that actually runs. They differ only when a lone candidate
    /// was admitted under another name.
    Admitted {
        class_name: String,
        type_name: String,
        filter: Arc<dyn GatewayFilter>,
    },
}

impl FilterAdmission {
    pub fn enabled(&self) -> bool {
        matches!(self, FilterAdmission::Admitted { .. })
    }

    pub fn admitted_class_name(&self) -> Option<&str> {
        match self {
            FilterAdmission::Admitted { class_name, .. } => Some(class_name.as_str()),
            FilterAdmission::Disabled { .. } => None,
        }
    }

    /// Type name of the running filter instance.
    pub fn admitted_type_name(&self) -> Option<&str> {
        match self {
            FilterAdmission::Admitted { type_name, .. } => Some(type_name.as_str()),
            FilterAdmission::Disabled { .. } => None,
        }
    }

    pub fn filter(&self) -> Option<Arc<dyn GatewayFilter>> {
        match self {
            FilterAdmission::Admitted { filter, .. } => Some(filter.clone()),
            FilterAdmission::Disabled { .. } => None,
        }
    }

    pub fn disable_reason(&self) -> Option<DisableReason> {
        match self {
            FilterAdmission::Disabled { reason } => Some(*reason),
            FilterAdmission::Admitted { .. } => None,
        }
    }
}

impl fmt::Debug for FilterAdmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterAdmission::Disabled { reason } => {
                f.debug_struct("Disabled").field("reason", reason).finish()
            }
            FilterAdmission::Admitted {
                class_name,
                type_name,
                ..
            } => f
                .debug_struct("Admitted")
                .field("class_name", class_name)
                .field("type_name", type_name)
                .finish_non_exhaustive(),
        }
    }
}

fn disabled(reason: DisableReason) -> FilterAdmission {
    FilterAdmission::Disabled { reason }
}

/// Decide which filter, if any, intercepts every request.
pub fn validate_filter(
    filter_class_name: Option<&str>,
    resolver: &dyn ClassResolver,
    container: &dyn FilterContainer,
) -> Result<FilterAdmission, FilterError> {
    let Some(class_name) = filter_class_name.map(str::trim).filter(|s| !s.is_empty()) else {
        tracing::info!("Request filter disabled: no filter configured");
        return Ok(disabled(DisableReason::Blank));
    };

    tracing::info!(filter = %class_name, "Validating request filter");
    let mut candidates = container.find_all();

    match candidates.len() {
        0 => {
            tracing::info!(
                filter = %class_name,
                "Request filter disabled: no GatewayFilter implementation registered"
            );
            Ok(disabled(DisableReason::NoCandidates))
        }
        1 => {
            let candidate = candidates.remove(0);
            tracing::info!(
                filter = %class_name,
                candidate = %candidate.type_name,
                "Found one GatewayFilter implementation"
            );

            let Some(info) = resolver.resolve(class_name) else {
                tracing::warn!(
                    filter = %class_name,
                    "Request filter disabled: type not found"
                );
                return Ok(disabled(DisableReason::Unresolved));
            };

            let reason = if !info.implements_filter {
                Some(InvalidTypeReason::MissingCapability)
            } else if info.is_abstract {
                Some(InvalidTypeReason::Abstract)
            } else {
                None
            };
            if let Some(reason) = reason {
                tracing::error!(filter = %class_name, reason = %reason, "Request filter rejected");
                return Err(FilterError::InvalidType {
                    class_name: class_name.to_string(),
                    reason,
                });
            }

            if candidate.type_name != class_name {
                tracing::warn!(
                    filter = %class_name,
                    candidate = %candidate.type_name,
                    "Registered filter type differs from configured name; admitting the registered instance"
                );
            }

            tracing::info!(
                filter = %class_name,
                instance = %candidate.type_name,
                "Request filter admitted"
            );
            Ok(FilterAdmission::Admitted {
                class_name: class_name.to_string(),
                type_name: candidate.type_name,
                filter: candidate.filter,
            })
        }
        count => {
            let names: Vec<String> = candidates.into_iter().map(|c| c.type_name).collect();
            tracing::error!(
                filter = %class_name,
                count,
                candidates = ?names,
                "Multiple GatewayFilter implementations registered"
            );
            Err(FilterError::Ambiguous {
                class_name: class_name.to_string(),
                count,
                candidates: names,
            })
        }
    }
}
