use chrono::{DateTime, Utc};
use contracts::domain::booking::{Booking, BookingFeedback, BookingStatus};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, Statement,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub service_id: String,
    pub service_title: String,
    pub consumer_id: String,
    pub consumer_name: Option<String>,
    pub consumer_email: String,
    pub contact_number: Option<String>,
    pub provider_id: String,
    pub scheduled_at: DateTime<Utc>,
    pub status: String,
    pub special_instructions: Option<String>,
    pub notes: Option<String>,
    pub feedback_rating: Option<i32>,
    pub feedback_comment: Option<String>,
    pub feedback_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Booking {
    fn from(m: Model) -> Self {
        let feedback = match (m.feedback_rating, m.feedback_at) {
            (Some(rating), Some(created_at)) => Some(BookingFeedback {
                rating,
                comment: m.feedback_comment.clone(),
                created_at,
            }),
            _ => None,
        };
        Booking {
            id: m.id,
            service_id: m.service_id,
            service_title: m.service_title,
            consumer_id: m.consumer_id,
            consumer_name: m.consumer_name,
            consumer_email: m.consumer_email,
            contact_number: m.contact_number,
            provider_id: m.provider_id,
            scheduled_at: m.scheduled_at,
            // Rows only ever hold canonical status strings; fall back to
            // pending rather than dropping the record.
            status: BookingStatus::parse(&m.status).unwrap_or(BookingStatus::Pending),
            special_instructions: m.special_instructions,
            notes: m.notes,
            feedback,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

pub async fn insert(conn: &DatabaseConnection, booking: &Booking) -> anyhow::Result<()> {
    let active = ActiveModel {
        id: Set(booking.id.clone()),
        service_id: Set(booking.service_id.clone()),
        service_title: Set(booking.service_title.clone()),
        consumer_id: Set(booking.consumer_id.clone()),
        consumer_name: Set(booking.consumer_name.clone()),
        consumer_email: Set(booking.consumer_email.clone()),
        contact_number: Set(booking.contact_number.clone()),
        provider_id: Set(booking.provider_id.clone()),
        scheduled_at: Set(booking.scheduled_at),
        status: Set(booking.status.as_str().to_string()),
        special_instructions: Set(booking.special_instructions.clone()),
        notes: Set(booking.notes.clone()),
        feedback_rating: Set(booking.feedback.as_ref().map(|f| f.rating)),
        feedback_comment: Set(booking.feedback.as_ref().and_then(|f| f.comment.clone())),
        feedback_at: Set(booking.feedback.as_ref().map(|f| f.created_at)),
        created_at: Set(booking.created_at),
        updated_at: Set(booking.updated_at),
    };
    active.insert(conn).await?;
    Ok(())
}

pub async fn find_by_id(conn: &DatabaseConnection, id: &str) -> anyhow::Result<Option<Booking>> {
    let result = Entity::find_by_id(id.to_string()).one(conn).await?;
    Ok(result.map(Into::into))
}

/// Conditional status write. Returns the number of rows changed.
pub async fn update_status(
    conn: &DatabaseConnection,
    id: &str,
    status: BookingStatus,
    now: DateTime<Utc>,
) -> anyhow::Result<u64> {
    let result = Entity::update_many()
        .col_expr(Column::Status, Expr::value(status.as_str()))
        .col_expr(Column::UpdatedAt, Expr::value(Some(now)))
        .filter(Column::Id.eq(id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// Attach (or overwrite) the feedback sub-record.
pub async fn set_feedback(
    conn: &DatabaseConnection,
    id: &str,
    rating: i32,
    comment: Option<String>,
    now: DateTime<Utc>,
) -> anyhow::Result<u64> {
    let result = Entity::update_many()
        .col_expr(Column::FeedbackRating, Expr::value(Some(rating)))
        .col_expr(Column::FeedbackComment, Expr::value(comment))
        .col_expr(Column::FeedbackAt, Expr::value(Some(now)))
        .filter(Column::Id.eq(id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

pub async fn list_by_consumer_id(
    conn: &DatabaseConnection,
    consumer_id: &str,
) -> anyhow::Result<Vec<Booking>> {
    let items = Entity::find()
        .filter(Column::ConsumerId.eq(consumer_id))
        .order_by_desc(Column::CreatedAt)
        .all(conn)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn list_by_consumer_email(
    conn: &DatabaseConnection,
    email: &str,
) -> anyhow::Result<Vec<Booking>> {
    let items = Entity::find()
        .filter(Column::ConsumerEmail.eq(email))
        .order_by_desc(Column::CreatedAt)
        .all(conn)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

/// One page of a provider's bookings plus the unpaginated total.
pub async fn list_by_provider(
    conn: &DatabaseConnection,
    provider_id: &str,
    skip: u64,
    limit: u64,
) -> anyhow::Result<(Vec<Booking>, u64)> {
    let total = Entity::find()
        .filter(Column::ProviderId.eq(provider_id))
        .count(conn)
        .await?;

    let items: Vec<Booking> = Entity::find()
        .filter(Column::ProviderId.eq(provider_id))
        .order_by_desc(Column::CreatedAt)
        .offset(skip)
        .limit(limit)
        .all(conn)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok((items, total))
}

/// Bulk auto-completion: every pending/confirmed booking whose scheduled
/// time is strictly before `cutoff` becomes completed in a single statement.
pub async fn complete_overdue(
    conn: &DatabaseConnection,
    cutoff: DateTime<Utc>,
) -> anyhow::Result<u64> {
    let result = Entity::update_many()
        .col_expr(
            Column::Status,
            Expr::value(BookingStatus::Completed.as_str()),
        )
        .col_expr(Column::UpdatedAt, Expr::value(Some(cutoff)))
        .filter(Column::Status.is_in([
            BookingStatus::Pending.as_str(),
            BookingStatus::Confirmed.as_str(),
        ]))
        .filter(Column::ScheduledAt.lt(cutoff))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// Rating aggregate over a provider's completed bookings with feedback.
/// Returns `None` when there are none.
pub async fn provider_rating_stats(
    conn: &DatabaseConnection,
    provider_id: &str,
) -> anyhow::Result<Option<(f64, i64)>> {
    let result = conn
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT AVG(feedback_rating) AS average_rating, COUNT(*) AS rating_count \
             FROM bookings \
             WHERE provider_id = ? AND status = 'completed' AND feedback_rating IS NOT NULL",
            [provider_id.into()],
        ))
        .await?;

    match result {
        Some(row) => {
            let average: Option<f64> = row.try_get("", "average_rating")?;
            let count: i64 = row.try_get("", "rating_count")?;
            Ok(average.map(|avg| (avg, count)))
        }
        None => Ok(None),
    }
}
