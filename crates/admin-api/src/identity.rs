//! Request identity, as asserted by the fronting auth proxy.
//!
//! Authentication itself is out of scope: a trusted proxy terminates the
//! session and forwards the caller's identity in headers. This extractor
//! parses them; webhook routes skip it and authenticate by signature.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;

/// The caller's role within their organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Customer,
}

/// An authenticated caller: organization, user, role, and (for customers)
/// the business type driving which records they work with.
#[derive(Debug, Clone)]
pub struct Identity {
    pub organization_id: String,
    pub user_id: String,
    pub role: Role,
    /// `RESTAURANT` or `HOTEL` for customers.
    pub customer_type: Option<String>,
}

impl Identity {
    /// Whether the caller is an organization admin.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Reject non-admin callers.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "this operation requires an admin role".to_string(),
            ))
        }
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| -> Option<String> {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
        };

        let organization_id = header("x-org-id")
            .ok_or_else(|| ApiError::Unauthorized("missing x-org-id header".to_string()))?;
        let user_id = header("x-user-id")
            .ok_or_else(|| ApiError::Unauthorized("missing x-user-id header".to_string()))?;
        let role = match header("x-role").as_deref() {
            Some("ADMIN") => Role::Admin,
            Some("CUSTOMER") => Role::Customer,
            Some(other) => {
                return Err(ApiError::Unauthorized(format!("unknown role: {other}")))
            }
            None => return Err(ApiError::Unauthorized("missing x-role header".to_string())),
        };
        let customer_type = header("x-customer-type");

        Ok(Identity {
            organization_id,
            user_id,
            role,
            customer_type,
        })
    }
}
