//! Audit context - who is saving, for which tenant, under which correlation id

use std::future::Future;
use uuid::Uuid;

/// Identity snapshot consumed once per save
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditContext {
    /// Current user, written to `created_by`/`modified_by`/`deleted_by`
    pub user_id: Option<Uuid>,
    /// Current tenant, stamped on newly inserted tenant-scoped entities
    pub tenant_id: Option<Uuid>,
    /// Correlation id copied onto every change header
    pub correlation_id: Option<String>,
    /// User fields are only populated for authenticated callers
    pub is_authenticated: bool,
}

impl AuditContext {
    /// Unauthenticated context with no identifiers
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Authenticated context for a user
    pub fn authenticated(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            is_authenticated: true,
            ..Self::default()
        }
    }

    pub fn with_tenant(mut self, tenant_id: Uuid) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// User id to stamp on audit fields, `None` unless authenticated
    pub fn acting_user(&self) -> Option<Uuid> {
        if self.is_authenticated {
            self.user_id
        } else {
            None
        }
    }
}

/// Supplies the audit context for a save
///
/// Called synchronously once per save; implementations should read from an
/// already established request context rather than perform I/O.
pub trait AuditContextProvider: Send + Sync {
    fn current(&self) -> AuditContext;
}

/// A fixed context is its own provider
impl AuditContextProvider for AuditContext {
    fn current(&self) -> AuditContext {
        self.clone()
    }
}

tokio::task_local! {
    static REQUEST_AUDIT_CONTEXT: AuditContext;
}

/// Provider backed by a tokio task-local, set per request with [`ScopedAuditContext::scope`]
///
/// Outside of a scope the anonymous context is returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopedAuditContext;

impl ScopedAuditContext {
    /// Run `fut` with `context` as the current audit context
    pub async fn scope<F>(context: AuditContext, fut: F) -> F::Output
    where
        F: Future,
    {
        REQUEST_AUDIT_CONTEXT.scope(context, fut).await
    }
}

impl AuditContextProvider for ScopedAuditContext {
    fn current(&self) -> AuditContext {
        REQUEST_AUDIT_CONTEXT
            .try_with(|context| context.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acting_user_requires_authentication() {
        let user = Uuid::new_v4();
        assert_eq!(AuditContext::authenticated(user).acting_user(), Some(user));

        let unauthenticated = AuditContext {
            user_id: Some(user),
            ..AuditContext::anonymous()
        };
        assert_eq!(unauthenticated.acting_user(), None);
    }

    #[tokio::test]
    async fn scoped_context_is_visible_inside_scope_only() {
        let provider = ScopedAuditContext;
        let tenant = Uuid::new_v4();
        let context = AuditContext::authenticated(Uuid::new_v4())
            .with_tenant(tenant)
            .with_correlation_id("req-42");

        let inside = ScopedAuditContext::scope(context.clone(), async { provider.current() }).await;
        assert_eq!(inside, context);
        assert_eq!(provider.current(), AuditContext::anonymous());
    }
}
