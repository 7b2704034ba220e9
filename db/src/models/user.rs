use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Represents a member of an organization in the `users` table.
///
/// Identity (id, role, organization) is issued upstream and arrives in JWT
/// claims; this table is the roster the scheduling and attendance views read.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub organization_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Role within an organization.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "actor")]
    Actor,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::OrganizationId",
        to = "super::organization::Column::Id"
    )]
    Organization,
    #[sea_orm(has_many = "super::attendance::Entity")]
    Attendance,
}

impl Related<super::organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organization.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl Related<super::attendance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attendance.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DatabaseConnection,
        email: &str,
        first_name: &str,
        last_name: &str,
        role: Role,
        organization_id: i64,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();
        ActiveModel {
            email: Set(email.to_string()),
            first_name: Set(first_name.to_string()),
            last_name: Set(last_name.to_string()),
            role: Set(role),
            organization_id: Set(organization_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    /// Looks up a user inside one organization. Cross-tenant ids resolve to
    /// `None`, indistinguishable from a missing row.
    pub async fn find_in_org(
        db: &DatabaseConnection,
        id: i64,
        organization_id: i64,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find()
            .filter(Column::Id.eq(id))
            .filter(Column::OrganizationId.eq(organization_id))
            .one(db)
            .await
    }

    /// The organization roster, optionally narrowed to one role, ordered for
    /// display (last name, then first name).
    pub async fn roster(
        db: &DatabaseConnection,
        organization_id: i64,
        role: Option<Role>,
    ) -> Result<Vec<Self>, DbErr> {
        let mut sel = Entity::find().filter(Column::OrganizationId.eq(organization_id));
        if let Some(r) = role {
            sel = sel.filter(Column::Role.eq(r));
        }
        sel.order_by_asc(Column::LastName)
            .order_by_asc(Column::FirstName)
            .all(db)
            .await
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
