use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait, Value,
};
use uuid::Uuid;

/// One scheduled performance belonging to one organization.
///
/// Lifecycle: created scheduled (`active_at` and `locked_at` both NULL),
/// opened for sign-in by `activate` (`active_at` set), permanently shut by
/// `close_sign_in` (`locked_at` set, `active_at` cleared). The sign-in token
/// rotates on both transitions, so a captured QR image cannot be replayed
/// into a later show or keep working after closing.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "shows")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub organization_id: i64,
    pub date: Date,
    /// Zero-padded `HH:mm` text; stored as text to avoid timezone arithmetic.
    pub show_time: String,
    pub active_at: Option<DateTime<Utc>>,
    pub locked_at: Option<DateTime<Utc>>,
    pub sign_in_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
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

/// Failures of the show lifecycle state machine.
#[derive(Debug, thiserror::Error)]
pub enum ShowError {
    #[error("Show not found")]
    NotFound,
    #[error("Closed shows cannot re-open sign-in")]
    Closed,
    #[error("Only the next upcoming show can be opened for sign-in")]
    NotNextUpcoming,
    #[error("Only the current active show can be closed")]
    NotActive,
    #[error(transparent)]
    Db(#[from] DbErr),
}

impl Model {
    pub async fn create(
        db: &DatabaseConnection,
        organization_id: i64,
        date: NaiveDate,
        show_time: &str,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();
        ActiveModel {
            organization_id: Set(organization_id),
            date: Set(date),
            show_time: Set(show_time.to_string()),
            active_at: Set(None),
            locked_at: Set(None),
            sign_in_token: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
    }

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

    /// Global token lookup. Tokens are unique across organizations, so this
    /// precedes any tenant check in the sign-in protocol.
    pub async fn find_by_token(
        db: &DatabaseConnection,
        token: &str,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find()
            .filter(Column::SignInToken.eq(token))
            .one(db)
            .await
    }

    /// The show currently open for sign-in, if any.
    pub async fn find_active(
        db: &DatabaseConnection,
        organization_id: i64,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find()
            .filter(Column::OrganizationId.eq(organization_id))
            .filter(Column::ActiveAt.is_not_null())
            .order_by_desc(Column::ActiveAt)
            .one(db)
            .await
    }

    pub async fn find_by_org_date_time(
        db: &DatabaseConnection,
        organization_id: i64,
        date: NaiveDate,
        show_time: &str,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find()
            .filter(Column::OrganizationId.eq(organization_id))
            .filter(Column::Date.eq(date))
            .filter(Column::ShowTime.eq(show_time))
            .one(db)
            .await
    }

    /// Org shows ordered by `(date, show_time)`, optionally bounded by a
    /// date range (inclusive on both ends).
    pub async fn list_in_org(
        db: &DatabaseConnection,
        organization_id: i64,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Self>, DbErr> {
        let mut sel = Entity::find().filter(Column::OrganizationId.eq(organization_id));
        if let Some(s) = start {
            sel = sel.filter(Column::Date.gte(s));
        }
        if let Some(e) = end {
            sel = sel.filter(Column::Date.lte(e));
        }
        sel.order_by_asc(Column::Date)
            .order_by_asc(Column::ShowTime)
            .all(db)
            .await
    }

    /// Combined naive timestamp of the performance, or `None` when the
    /// stored time text does not parse.
    pub fn scheduled_at(&self) -> Option<NaiveDateTime> {
        let time = NaiveTime::parse_from_str(&self.show_time, "%H:%M").ok()?;
        Some(self.date.and_time(time))
    }

    /// The earliest non-active, non-locked org show whose combined timestamp
    /// is at or after `now`. Ties on the same date break by `show_time`
    /// text order, which the `HH:mm` zero-padding makes chronological.
    pub async fn next_upcoming(
        db: &DatabaseConnection,
        organization_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, DbErr> {
        let candidates = Entity::find()
            .filter(Column::OrganizationId.eq(organization_id))
            .filter(Column::LockedAt.is_null())
            .filter(Column::ActiveAt.is_null())
            .order_by_asc(Column::Date)
            .order_by_asc(Column::ShowTime)
            .all(db)
            .await?;

        let now = now.naive_utc();
        Ok(candidates
            .into_iter()
            .find(|s| s.scheduled_at().is_some_and(|when| when >= now)))
    }

    /// Opens a show for self-service sign-in.
    ///
    /// Only the next upcoming show may be opened, so an admin cannot skip
    /// ahead in the schedule. The clear-then-set runs in one transaction:
    /// that transaction is the single concurrency mechanism keeping at most
    /// one show active per organization across server instances.
    pub async fn activate(
        db: &DatabaseConnection,
        id: i64,
        organization_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Self, ShowError> {
        let show = Self::find_in_org(db, id, organization_id)
            .await?
            .ok_or(ShowError::NotFound)?;
        if show.locked_at.is_some() {
            return Err(ShowError::Closed);
        }

        match Self::next_upcoming(db, organization_id, now).await? {
            Some(next) if next.id == id => {}
            _ => return Err(ShowError::NotNextUpcoming),
        }

        let txn = db.begin().await?;

        Entity::update_many()
            .filter(Column::OrganizationId.eq(organization_id))
            .filter(Column::Id.ne(id))
            .col_expr(Column::ActiveAt, Expr::value(Value::ChronoDateTimeUtc(None)))
            .exec(&txn)
            .await?;

        let mut am: ActiveModel = show.into();
        am.active_at = Set(Some(now));
        am.locked_at = Set(None);
        am.sign_in_token = Set(Some(Uuid::new_v4().to_string()));
        am.updated_at = Set(now);
        let updated = am.update(&txn).await?;

        txn.commit().await?;
        Ok(updated)
    }

    /// Permanently shuts the sign-in window of the currently active show.
    /// Rotates the token again so the printed QR dies with the window.
    pub async fn close_sign_in(
        db: &DatabaseConnection,
        id: i64,
        organization_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Self, ShowError> {
        let show = Self::find_in_org(db, id, organization_id)
            .await?
            .ok_or(ShowError::NotFound)?;
        if show.active_at.is_none() {
            return Err(ShowError::NotActive);
        }

        let mut am: ActiveModel = show.into();
        am.locked_at = Set(Some(now));
        am.active_at = Set(None);
        am.sign_in_token = Set(Some(Uuid::new_v4().to_string()));
        am.updated_at = Set(now);
        Ok(am.update(db).await?)
    }

    pub async fn edit(
        db: &DatabaseConnection,
        id: i64,
        organization_id: i64,
        date: Option<NaiveDate>,
        show_time: Option<String>,
    ) -> Result<Self, ShowError> {
        let show = Self::find_in_org(db, id, organization_id)
            .await?
            .ok_or(ShowError::NotFound)?;

        let mut am: ActiveModel = show.into();
        if let Some(d) = date {
            am.date = Set(d);
        }
        if let Some(t) = show_time {
            am.show_time = Set(t);
        }
        am.updated_at = Set(Utc::now());
        Ok(am.update(db).await?)
    }

    pub async fn delete_in_org(
        db: &DatabaseConnection,
        id: i64,
        organization_id: i64,
    ) -> Result<(), ShowError> {
        let show = Self::find_in_org(db, id, organization_id)
            .await?
            .ok_or(ShowError::NotFound)?;
        Entity::delete_by_id(show.id).exec(db).await?;
        Ok(())
    }

    /// Inline garbage collection, run at the top of listing queries rather
    /// than from any background job. Deletes org shows whose scheduled time
    /// passed more than `grace_hours` ago and that have zero attendance
    /// rows; shows with any attendance are retained indefinitely.
    pub async fn delete_expired_without_attendance(
        db: &DatabaseConnection,
        organization_id: i64,
        now: DateTime<Utc>,
        grace_hours: i64,
    ) -> Result<u64, DbErr> {
        let cutoff = now.naive_utc() - Duration::hours(grace_hours);

        let stale = Entity::find()
            .filter(Column::OrganizationId.eq(organization_id))
            .filter(Column::Date.lte(cutoff.date()))
            .all(db)
            .await?;

        let mut removed = 0u64;
        for show in stale {
            let Some(when) = show.scheduled_at() else {
                continue;
            };
            if when > cutoff {
                continue;
            }
            let attended = super::attendance::Entity::find()
                .filter(super::attendance::Column::ShowId.eq(show.id))
                .count(db)
                .await?;
            if attended > 0 {
                continue;
            }
            Entity::delete_by_id(show.id).exec(db).await?;
            removed += 1;
        }

        if removed > 0 {
            tracing::info!(organization_id, removed, "swept expired shows");
        }
        Ok(removed)
    }
}
