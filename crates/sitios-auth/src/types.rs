use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role reported by the external identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Federation staff; bypasses ownership filters
    Admin,
    /// Regular account (club, committee or partner representative)
    Member,
}

/// The acting identity attached to an authenticated request.
///
/// All core operations take the principal's id explicitly; nothing reads
/// ambient request state below the handler layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Principal {
    pub user_id: i32,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Owner filter for store operations: admins see everything.
    pub fn owner_filter(&self) -> Option<i32> {
        if self.is_admin() {
            None
        } else {
            Some(self.user_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_bypasses_owner_filter() {
        let admin = Principal {
            user_id: 1,
            role: Role::Admin,
        };
        let member = Principal {
            user_id: 7,
            role: Role::Member,
        };

        assert_eq!(admin.owner_filter(), None);
        assert_eq!(member.owner_filter(), Some(7));
    }
}
