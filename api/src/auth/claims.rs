use serde::{Deserialize, Serialize};

/// Verified identity supplied by the upstream login flow. The server treats
/// it as opaque: `sub` is the user id, `org_id` the tenant every query is
/// filtered by, and `role` is either `admin` or `actor`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: i64,
    pub role: String,
    pub org_id: i64,
    pub exp: usize,
}

#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }

    pub fn is_actor(&self) -> bool {
        self.role == "actor"
    }
}
