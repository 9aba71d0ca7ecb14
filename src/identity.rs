use uuid::Uuid;

/// Supplies the id of the signed-in user, or `None` when nobody is signed in.
pub trait IdentityProvider: Send + Sync {
    fn current_user_id(&self) -> Option<Uuid>;
}

/// Identity fixed at construction, used by the command-line front end and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticIdentity(Option<Uuid>);

impl StaticIdentity {
    pub fn signed_in(user_id: Uuid) -> Self {
        Self(Some(user_id))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user_id(&self) -> Option<Uuid> {
        self.0
    }
}
