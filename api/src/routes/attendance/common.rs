use serde::{Deserialize, Serialize};

use db::models::attendance::Status;

#[derive(Debug, Deserialize)]
pub struct SetAttendanceRequest {
    pub user_id: i64,
    pub show_id: i64,
    pub status: Status,
}

#[derive(Debug, Deserialize)]
pub struct BulkMarkRequest {
    pub show_id: i64,
    pub user_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AttendanceQuery {
    pub show_id: Option<i64>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct BulkMarkResponse {
    pub count: u64,
}

impl Default for BulkMarkResponse {
    fn default() -> Self {
        Self { count: 0 }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceUserBrief {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceShowBrief {
    pub id: i64,
    pub date: String,
    pub show_time: String,
}

#[derive(Debug, Serialize)]
pub struct AttendanceResponse {
    pub user_id: i64,
    pub show_id: i64,
    pub status: String,
    pub signed_in_at: Option<String>,
    pub marked_by_user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AttendanceUserBrief>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show: Option<AttendanceShowBrief>,
}

impl From<db::models::attendance::Model> for AttendanceResponse {
    fn from(m: db::models::attendance::Model) -> Self {
        Self {
            user_id: m.user_id,
            show_id: m.show_id,
            status: m.status.to_string(),
            signed_in_at: m.signed_in_at.map(|t| t.to_rfc3339()),
            marked_by_user_id: m.marked_by_user_id,
            user: None,
            show: None,
        }
    }
}
