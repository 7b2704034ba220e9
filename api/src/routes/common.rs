//! Response models and helpers shared across route groups.

use serde::{Deserialize, Serialize};
use validator::ValidationErrors;

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<db::models::user::Model> for UserResponse {
    fn from(user: db::models::user::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role.to_string(),
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShowResponse {
    pub id: i64,
    pub organization_id: i64,
    pub date: String,
    pub show_time: String,
    pub active_at: Option<String>,
    pub locked_at: Option<String>,
    pub sign_in_token: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<db::models::show::Model> for ShowResponse {
    fn from(show: db::models::show::Model) -> Self {
        Self {
            id: show.id,
            organization_id: show.organization_id,
            date: show.date.format("%Y-%m-%d").to_string(),
            show_time: show.show_time,
            active_at: show.active_at.map(|t| t.to_rfc3339()),
            locked_at: show.locked_at.map(|t| t.to_rfc3339()),
            sign_in_token: show.sign_in_token,
            created_at: show.created_at.to_rfc3339(),
            updated_at: show.updated_at.to_rfc3339(),
        }
    }
}

/// Flattens `validator` output into the single short message the error
/// envelope carries. The first failing field wins.
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    for (_field, field_errors) in errors.field_errors() {
        if let Some(e) = field_errors.first() {
            if let Some(msg) = &e.message {
                return msg.to_string();
            }
        }
    }
    "Invalid input".to_string()
}
