use nilecart_auth::Role;
use nilecart_core::UserId;

/// Principal context for a request (authenticated identity + role).
///
/// Inserted by the auth middleware; present for all domain routes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    user_id: UserId,
    role: Role,
}

impl PrincipalContext {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
