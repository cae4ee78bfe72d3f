//! # Auth-Aware Fault Policy
//!
//! Turns a raw [`ApiResponse`] into either a validated value or a fault, before anything
//! is committed to the cache.

use crate::core::error::{Result, SyncError};
use crate::core::service::ApiResponse;
use crate::sync::registry::{ResourceDescriptor, ResourceValue};

/// What an unauthenticated (401) response means for a resource.
///
/// Declared explicitly on every descriptor, there is no default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPolicy {
    /// Logged out is a valid empty state: commit the resource's absence value as fresh
    Soft,
    /// Logged out is a failure: commit an HTTP 401 fault
    Hard,
}

/// Resolve a response for `descriptor` into the outcome the cache store commits.
///
/// Order matters: the 401 check runs before the generic status check and before
/// validation, so a soft resource never reports an error for a logged-out session.
pub fn resolve(descriptor: &ResourceDescriptor, response: ApiResponse) -> Result<ResourceValue> {
    if response.is_unauthenticated() {
        return match descriptor.auth {
            AuthPolicy::Soft => {
                tracing::debug!(resource = descriptor.name, "Unauthenticated, committing absence value");
                Ok(ResourceValue::absent(descriptor.key))
            }
            AuthPolicy::Hard => Err(SyncError::Http {
                status: 401,
                message: response.error_message(),
            }),
        };
    }

    if !response.is_success() {
        return Err(SyncError::Http {
            status: response.status,
            message: response.error_message(),
        });
    }

    descriptor.validate(response.body)
}
