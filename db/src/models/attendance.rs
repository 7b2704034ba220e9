use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::user::Role;

/// Per-(actor, show) status record. Absence of a row means "unset", which is
/// distinct from every explicit status. Last writer wins; no history.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "attendance")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub show_id: i64,
    pub status: Status,
    pub signed_in_at: Option<DateTime<Utc>>,
    /// NULL marks a self-service sign-in; admin writes record the admin's id.
    pub marked_by_user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

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
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "attendance_status")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Status {
    #[sea_orm(string_value = "signed_in")]
    SignedIn,
    #[sea_orm(string_value = "absent")]
    Absent,
    #[sea_orm(string_value = "vacation")]
    Vacation,
    #[sea_orm(string_value = "personal_day")]
    PersonalDay,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::show::Entity",
        from = "Column::ShowId",
        to = "super::show::Column::Id"
    )]
    Show,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl Related<super::show::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Show.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn find_pair(
        db: &DatabaseConnection,
        user_id: i64,
        show_id: i64,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find_by_id((user_id, show_id)).one(db).await
    }

    /// Upsert by `(user_id, show_id)`. Every write recomputes
    /// `signed_in_at`: `now` when the status is `signed_in`, NULL otherwise.
    pub async fn set_status(
        db: &DatabaseConnection,
        user_id: i64,
        show_id: i64,
        status: Status,
        marked_by: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<Self, DbErr> {
        let signed_in_at = (status == Status::SignedIn).then_some(now);

        match Self::find_pair(db, user_id, show_id).await? {
            Some(existing) => {
                let mut am: ActiveModel = existing.into();
                am.status = Set(status);
                am.signed_in_at = Set(signed_in_at);
                am.marked_by_user_id = Set(marked_by);
                am.updated_at = Set(now);
                am.update(db).await
            }
            None => {
                ActiveModel {
                    user_id: Set(user_id),
                    show_id: Set(show_id),
                    status: Set(status),
                    signed_in_at: Set(signed_in_at),
                    marked_by_user_id: Set(marked_by),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(db)
                .await
            }
        }
    }

    /// Creates the self-service row. The caller has already checked that no
    /// row exists for the pair; `marked_by_user_id` stays NULL so the write
    /// remains distinguishable from an admin mark.
    pub async fn create_self_signed(
        db: &DatabaseConnection,
        user_id: i64,
        show_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Self, DbErr> {
        ActiveModel {
            user_id: Set(user_id),
            show_id: Set(show_id),
            status: Set(Status::SignedIn),
            signed_in_at: Set(Some(now)),
            marked_by_user_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
    }

    /// Deletes the record for the pair. Returns whether a row existed.
    pub async fn clear(
        db: &DatabaseConnection,
        user_id: i64,
        show_id: i64,
    ) -> Result<bool, DbErr> {
        let res = Entity::delete_by_id((user_id, show_id)).exec(db).await?;
        Ok(res.rows_affected > 0)
    }

    /// Manual reconciliation after a connectivity gap: marks each valid
    /// same-org actor as signed in. Ids that are unknown, cross-tenant, or
    /// not actors are dropped silently; the batch never fails on them.
    /// Rows are written strictly sequentially.
    pub async fn bulk_mark(
        db: &DatabaseConnection,
        organization_id: i64,
        show_id: i64,
        user_ids: &[i64],
        marked_by: i64,
        now: DateTime<Utc>,
    ) -> Result<u64, DbErr> {
        let valid: Vec<i64> = super::user::Entity::find()
            .filter(super::user::Column::Id.is_in(user_ids.to_vec()))
            .filter(super::user::Column::OrganizationId.eq(organization_id))
            .filter(super::user::Column::Role.eq(Role::Actor))
            .all(db)
            .await?
            .into_iter()
            .map(|u| u.id)
            .collect();

        let mut count = 0u64;
        for user_id in user_ids.iter().copied().filter(|id| valid.contains(id)) {
            Self::set_status(db, user_id, show_id, Status::SignedIn, Some(marked_by), now)
                .await?;
            count += 1;
        }
        Ok(count)
    }

    /// Org-scoped listing joined through both parents, optionally narrowed
    /// by show and/or user.
    pub async fn list_in_org(
        db: &DatabaseConnection,
        organization_id: i64,
        show_id: Option<i64>,
        user_id: Option<i64>,
    ) -> Result<Vec<Self>, DbErr> {
        let mut sel = Entity::find()
            .join(JoinType::InnerJoin, Relation::User.def())
            .join(JoinType::InnerJoin, Relation::Show.def())
            .filter(super::user::Column::OrganizationId.eq(organization_id))
            .filter(super::show::Column::OrganizationId.eq(organization_id));
        if let Some(s) = show_id {
            sel = sel.filter(Column::ShowId.eq(s));
        }
        if let Some(u) = user_id {
            sel = sel.filter(Column::UserId.eq(u));
        }
        sel.all(db).await
    }
}
