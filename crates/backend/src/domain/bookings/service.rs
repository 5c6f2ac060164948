use chrono::{DateTime, Utc};
use contracts::domain::booking::{
    Booking, BookingStatus, BookingSummary, CreateBookingRequest, PagedBookings, Pagination,
    ServiceView,
};
use sea_orm::DatabaseConnection;

use super::repository;
use crate::domain::services::repository as services_repository;
use crate::shared::error::ApiError;

/// Outcome of a status write: a real change or a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusUpdate {
    Updated,
    NoChange,
}

/// Create a booking against an existing service, snapshotting the service
/// title and provider onto the new record.
pub async fn create(
    conn: &DatabaseConnection,
    consumer_id: &str,
    request: CreateBookingRequest,
) -> Result<Booking, ApiError> {
    let service_id = match request.service.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => return Err(ApiError::MissingField("service")),
    };
    let client_email = match request.client_email.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => return Err(ApiError::MissingField("client_email")),
    };
    let booking_date = match request.booking_date.as_deref() {
        Some(s) if !s.is_empty() => s,
        _ => return Err(ApiError::MissingField("booking_date")),
    };
    let scheduled_at = DateTime::parse_from_rfc3339(booking_date)
        .map_err(|_| ApiError::InvalidInput("Invalid booking date format".into()))?
        .with_timezone(&Utc);

    let service = services_repository::get_by_id(conn, &service_id)
        .await?
        .ok_or(ApiError::NotFound("Service"))?;

    let booking = Booking {
        id: uuid::Uuid::new_v4().to_string(),
        service_id,
        service_title: service.title,
        consumer_id: consumer_id.to_string(),
        consumer_name: request.client_name,
        consumer_email: client_email,
        contact_number: request.contact_number,
        provider_id: service.created_by,
        scheduled_at,
        status: BookingStatus::Pending,
        special_instructions: request.special_instructions,
        notes: request.notes,
        feedback: None,
        created_at: Utc::now(),
        updated_at: None,
    };

    repository::insert(conn, &booking).await?;
    Ok(booking)
}

/// Who may request which status.
///
/// Providers may request any of the four values, including moves out of
/// terminal states; consumers may only cancel. Everyone else is rejected.
pub fn authorize_transition(
    consumer_id: &str,
    provider_id: &str,
    principal: &str,
    requested: BookingStatus,
) -> Result<(), ApiError> {
    let is_provider = provider_id == principal;
    let is_consumer = consumer_id == principal;

    if !is_provider && !is_consumer {
        return Err(ApiError::Forbidden(
            "You don't have permission to update this booking".into(),
        ));
    }
    if is_consumer && !is_provider && requested != BookingStatus::Cancelled {
        return Err(ApiError::Forbidden(
            "Consumers can only cancel bookings".into(),
        ));
    }
    Ok(())
}

/// Move a booking to `requested_status` on behalf of `principal`.
pub async fn transition_status(
    conn: &DatabaseConnection,
    booking_id: &str,
    requested_status: &str,
    principal: &str,
) -> Result<StatusUpdate, ApiError> {
    let requested = BookingStatus::parse(requested_status)
        .ok_or_else(|| ApiError::InvalidInput("Invalid status value".into()))?;

    let booking = repository::find_by_id(conn, booking_id)
        .await?
        .ok_or(ApiError::NotFound("Booking"))?;

    authorize_transition(&booking.consumer_id, &booking.provider_id, principal, requested)?;

    if booking.status == requested {
        return Ok(StatusUpdate::NoChange);
    }

    let changed = repository::update_status(conn, booking_id, requested, Utc::now()).await?;
    if changed == 0 {
        // Row disappeared between read and write; treat as a no-op.
        return Ok(StatusUpdate::NoChange);
    }
    Ok(StatusUpdate::Updated)
}

/// Attach consumer feedback to a completed booking and refresh the
/// provider's rating aggregate.
pub async fn add_feedback(
    conn: &DatabaseConnection,
    booking_id: &str,
    principal: &str,
    rating: Option<i32>,
    comment: Option<String>,
) -> Result<(), ApiError> {
    let rating = match rating {
        Some(r) if (1..=5).contains(&r) => r,
        _ => {
            return Err(ApiError::InvalidInput(
                "Rating must be an integer between 1 and 5".into(),
            ))
        }
    };

    let booking = repository::find_by_id(conn, booking_id)
        .await?
        .ok_or(ApiError::NotFound("Booking"))?;

    if booking.consumer_id != principal {
        return Err(ApiError::Forbidden(
            "Only the consumer can leave feedback".into(),
        ));
    }
    if booking.status != BookingStatus::Completed {
        return Err(ApiError::InvalidState(
            "Feedback can only be provided for completed bookings".into(),
        ));
    }

    repository::set_feedback(conn, booking_id, rating, comment, Utc::now()).await?;

    // Best-effort: the aggregate is derived data and must never fail the
    // feedback submission itself.
    if let Err(e) = recompute_provider_rating(conn, &booking.provider_id).await {
        tracing::error!(
            "Failed to update rating for provider {}: {:#}",
            booking.provider_id,
            e
        );
    }

    Ok(())
}

/// Recompute the provider's rating aggregate from scratch. Idempotent.
pub async fn recompute_provider_rating(
    conn: &DatabaseConnection,
    provider_id: &str,
) -> anyhow::Result<()> {
    if let Some((average, count)) = repository::provider_rating_stats(conn, provider_id).await? {
        let rounded = (average * 10.0).round() / 10.0;
        crate::system::users::repository::set_provider_rating(conn, provider_id, rounded, count)
            .await?;
    }
    Ok(())
}

/// Consumer booking history, newest first. An email override replaces the
/// identity filter for callers without an authenticated id.
pub async fn list_for_consumer(
    conn: &DatabaseConnection,
    consumer_id: &str,
    client_email: Option<&str>,
) -> Result<Vec<BookingSummary>, ApiError> {
    let bookings = match client_email {
        Some(email) => repository::list_by_consumer_email(conn, email).await?,
        None => repository::list_by_consumer_id(conn, consumer_id).await?,
    };

    let mut summaries = Vec::with_capacity(bookings.len());
    for booking in bookings {
        let service = services_repository::get_by_id(conn, &booking.service_id).await?;

        let title = if booking.service_title.is_empty() {
            service
                .as_ref()
                .map(|s| s.title.clone())
                .unwrap_or_else(|| "Unknown Service".to_string())
        } else {
            booking.service_title.clone()
        };

        summaries.push(BookingSummary {
            id: booking.id,
            consumer_id: booking.consumer_id,
            scheduled_at: booking.scheduled_at,
            status: booking.status,
            service: ServiceView {
                id: booking.service_id,
                title,
                description: service
                    .as_ref()
                    .map(|s| s.description.clone())
                    .unwrap_or_default(),
                price: service.as_ref().map(|s| s.price).unwrap_or_default(),
            },
        });
    }

    Ok(summaries)
}

/// Pagination metadata for a 1-indexed page.
pub fn paginate(total: u64, page: u64, per_page: u64) -> Pagination {
    let pages = if per_page == 0 {
        0
    } else {
        (total + per_page - 1) / per_page
    };
    Pagination {
        total,
        page,
        per_page,
        pages,
    }
}

/// Provider booking history, newest first, paginated.
pub async fn list_for_provider(
    conn: &DatabaseConnection,
    provider_id: &str,
    page: u64,
    per_page: u64,
) -> Result<PagedBookings, ApiError> {
    // Query parameters are untrusted; keep the offset math from overflowing
    // and the offset itself within what sqlite accepts.
    let page = page.max(1);
    let per_page = per_page.clamp(1, 100);
    let skip = (page - 1)
        .saturating_mul(per_page)
        .min(i64::MAX as u64);

    let (bookings, total) = repository::list_by_provider(conn, provider_id, skip, per_page).await?;

    Ok(PagedBookings {
        bookings,
        pagination: paginate(total, page, per_page),
    })
}

/// Fetch one booking, visible only to its consumer or provider.
pub async fn get_by_id(
    conn: &DatabaseConnection,
    booking_id: &str,
    principal: &str,
) -> Result<Booking, ApiError> {
    let booking = repository::find_by_id(conn, booking_id)
        .await?
        .ok_or(ApiError::NotFound("Booking"))?;

    if booking.consumer_id != principal && booking.provider_id != principal {
        return Err(ApiError::Forbidden(
            "You don't have permission to view this booking".into(),
        ));
    }
    Ok(booking)
}

/// One sweep pass: auto-complete every overdue pending/confirmed booking.
pub async fn sweep_once(conn: &DatabaseConnection) -> Result<u64, ApiError> {
    let count = repository::complete_overdue(conn, Utc::now()).await?;
    if count > 0 {
        tracing::info!("Auto-completed {count} overdue bookings");
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use contracts::domain::geo::GeoPoint;
    use contracts::domain::service_listing::ServiceListing;
    use contracts::system::users::{ProviderDetails, User, UserRole};

    use crate::shared::data::db::connect_in_memory;
    use crate::system::users::repository as users_repository;

    const PROVIDER: &str = "provider-1";
    const CONSUMER: &str = "consumer-1";

    async fn seed_service(conn: &DatabaseConnection, id: &str) {
        let listing = ServiceListing {
            id: id.to_string(),
            title: "Garden cleanup".into(),
            description: "Full garden tidy".into(),
            price: 80.0,
            provider_name: "Pat".into(),
            provider_contact: Some("555-0000".into()),
            provider_email: "pat@example.com".into(),
            created_by: PROVIDER.to_string(),
            location: GeoPoint::new(50.0, 8.0),
            created_at: Utc::now(),
        };
        services_repository::insert(conn, &listing).await.unwrap();
    }

    async fn seed_provider_user(conn: &DatabaseConnection) {
        let user = User {
            id: PROVIDER.to_string(),
            name: Some("Pat".into()),
            email: "pat@example.com".into(),
            role: UserRole::Provider,
            contact_no: None,
            address: None,
            provider_details: Some(ProviderDetails::default()),
            created_at: Utc::now(),
            updated_at: None,
        };
        users_repository::create_with_password(conn, &user, "irrelevant-hash")
            .await
            .unwrap();
    }

    fn booking_fixture(id: &str, status: BookingStatus, offset_secs: i64) -> Booking {
        let base = Utc::now();
        Booking {
            id: id.to_string(),
            service_id: "svc-1".into(),
            service_title: "Garden cleanup".into(),
            consumer_id: CONSUMER.to_string(),
            consumer_name: Some("Casey".into()),
            consumer_email: "casey@example.com".into(),
            contact_number: Some("555-1111".into()),
            provider_id: PROVIDER.to_string(),
            scheduled_at: base + Duration::hours(1),
            status,
            special_instructions: None,
            notes: None,
            feedback: None,
            created_at: base + Duration::seconds(offset_secs),
            updated_at: None,
        }
    }

    #[test]
    fn transition_permissions() {
        // stranger: never allowed
        assert!(matches!(
            authorize_transition(CONSUMER, PROVIDER, "someone-else", BookingStatus::Cancelled),
            Err(ApiError::Forbidden(_))
        ));
        // consumer: only cancel
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Completed,
        ] {
            assert!(matches!(
                authorize_transition(CONSUMER, PROVIDER, CONSUMER, status),
                Err(ApiError::Forbidden(_))
            ));
        }
        assert!(authorize_transition(CONSUMER, PROVIDER, CONSUMER, BookingStatus::Cancelled).is_ok());
        // provider: anything
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ] {
            assert!(authorize_transition(CONSUMER, PROVIDER, PROVIDER, status).is_ok());
        }
    }

    #[test]
    fn pagination_metadata() {
        let p = paginate(5, 2, 2);
        assert_eq!(p.total, 5);
        assert_eq!(p.page, 2);
        assert_eq!(p.per_page, 2);
        assert_eq!(p.pages, 3);

        assert_eq!(paginate(0, 1, 10).pages, 0);
        assert_eq!(paginate(10, 1, 10).pages, 1);
        assert_eq!(paginate(11, 1, 10).pages, 2);
    }

    #[tokio::test]
    async fn create_requires_fields_and_existing_service() {
        let conn = connect_in_memory().await.unwrap();
        seed_service(&conn, "svc-1").await;

        let valid = CreateBookingRequest {
            service: Some("svc-1".into()),
            client_name: Some("Casey".into()),
            client_email: Some("casey@example.com".into()),
            booking_date: Some("2030-05-01T10:00:00Z".into()),
            contact_number: Some("555-1111".into()),
            special_instructions: None,
            notes: None,
        };

        let booking = create(&conn, CONSUMER, valid.clone()).await.unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.provider_id, PROVIDER);
        assert_eq!(booking.service_title, "Garden cleanup");
        assert!(booking.feedback.is_none());

        let mut missing_email = valid.clone();
        missing_email.client_email = None;
        assert!(matches!(
            create(&conn, CONSUMER, missing_email).await,
            Err(ApiError::MissingField("client_email"))
        ));

        let mut bad_date = valid.clone();
        bad_date.booking_date = Some("next tuesday".into());
        assert!(matches!(
            create(&conn, CONSUMER, bad_date).await,
            Err(ApiError::InvalidInput(_))
        ));

        let mut unknown_service = valid;
        unknown_service.service = Some("svc-missing".into());
        assert!(matches!(
            create(&conn, CONSUMER, unknown_service).await,
            Err(ApiError::NotFound("Service"))
        ));
    }

    #[tokio::test]
    async fn consumer_cancel_succeeds_from_any_status() {
        let conn = connect_in_memory().await.unwrap();
        for (i, status) in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Completed,
        ]
        .into_iter()
        .enumerate()
        {
            let id = format!("b-{i}");
            repository::insert(&conn, &booking_fixture(&id, status, i as i64))
                .await
                .unwrap();

            let outcome = transition_status(&conn, &id, "cancelled", CONSUMER)
                .await
                .unwrap();
            assert_eq!(outcome, StatusUpdate::Updated);

            let after = repository::find_by_id(&conn, &id).await.unwrap().unwrap();
            assert_eq!(after.status, BookingStatus::Cancelled);
            assert!(after.updated_at.is_some());
        }
    }

    #[tokio::test]
    async fn consumer_cannot_confirm_or_complete() {
        let conn = connect_in_memory().await.unwrap();
        repository::insert(&conn, &booking_fixture("b-1", BookingStatus::Pending, 0))
            .await
            .unwrap();

        for requested in ["pending", "confirmed", "completed"] {
            assert!(matches!(
                transition_status(&conn, "b-1", requested, CONSUMER).await,
                Err(ApiError::Forbidden(_))
            ));
        }
        // nothing was written
        let after = repository::find_by_id(&conn, "b-1").await.unwrap().unwrap();
        assert_eq!(after.status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn provider_may_reopen_a_completed_booking() {
        let conn = connect_in_memory().await.unwrap();
        repository::insert(&conn, &booking_fixture("b-1", BookingStatus::Completed, 0))
            .await
            .unwrap();

        let outcome = transition_status(&conn, "b-1", "pending", PROVIDER)
            .await
            .unwrap();
        assert_eq!(outcome, StatusUpdate::Updated);
        let after = repository::find_by_id(&conn, "b-1").await.unwrap().unwrap();
        assert_eq!(after.status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn same_status_reports_no_change() {
        let conn = connect_in_memory().await.unwrap();
        repository::insert(&conn, &booking_fixture("b-1", BookingStatus::Confirmed, 0))
            .await
            .unwrap();

        let outcome = transition_status(&conn, "b-1", "confirmed", PROVIDER)
            .await
            .unwrap();
        assert_eq!(outcome, StatusUpdate::NoChange);
    }

    #[tokio::test]
    async fn transition_errors() {
        let conn = connect_in_memory().await.unwrap();
        assert!(matches!(
            transition_status(&conn, "nope", "cancelled", CONSUMER).await,
            Err(ApiError::NotFound("Booking"))
        ));

        repository::insert(&conn, &booking_fixture("b-1", BookingStatus::Pending, 0))
            .await
            .unwrap();
        assert!(matches!(
            transition_status(&conn, "b-1", "archived", PROVIDER).await,
            Err(ApiError::InvalidInput(_))
        ));
        assert!(matches!(
            transition_status(&conn, "b-1", "cancelled", "someone-else").await,
            Err(ApiError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn feedback_validation() {
        let conn = connect_in_memory().await.unwrap();
        repository::insert(&conn, &booking_fixture("b-1", BookingStatus::Completed, 0))
            .await
            .unwrap();
        repository::insert(&conn, &booking_fixture("b-2", BookingStatus::Pending, 1))
            .await
            .unwrap();

        for rating in [Some(0), Some(6), None] {
            assert!(matches!(
                add_feedback(&conn, "b-1", CONSUMER, rating, None).await,
                Err(ApiError::InvalidInput(_))
            ));
        }
        assert!(matches!(
            add_feedback(&conn, "b-1", PROVIDER, Some(3), None).await,
            Err(ApiError::Forbidden(_))
        ));
        assert!(matches!(
            add_feedback(&conn, "b-2", CONSUMER, Some(3), None).await,
            Err(ApiError::InvalidState(_))
        ));

        add_feedback(&conn, "b-1", CONSUMER, Some(3), Some("fine".into()))
            .await
            .unwrap();
        let after = repository::find_by_id(&conn, "b-1").await.unwrap().unwrap();
        let feedback = after.feedback.unwrap();
        assert_eq!(feedback.rating, 3);
        assert_eq!(feedback.comment.as_deref(), Some("fine"));
    }

    #[tokio::test]
    async fn rating_aggregate_follows_feedback() {
        let conn = connect_in_memory().await.unwrap();
        seed_provider_user(&conn).await;

        repository::insert(&conn, &booking_fixture("b-1", BookingStatus::Completed, 0))
            .await
            .unwrap();
        repository::insert(&conn, &booking_fixture("b-2", BookingStatus::Completed, 1))
            .await
            .unwrap();

        add_feedback(&conn, "b-1", CONSUMER, Some(4), None).await.unwrap();
        let user = users_repository::get_by_id(&conn, PROVIDER)
            .await
            .unwrap()
            .unwrap();
        let details = user.provider_details.unwrap();
        assert_eq!(details.average_rating, Some(4.0));
        assert_eq!(details.rating_count, Some(1));

        add_feedback(&conn, "b-2", CONSUMER, Some(2), None).await.unwrap();
        let user = users_repository::get_by_id(&conn, PROVIDER)
            .await
            .unwrap()
            .unwrap();
        let details = user.provider_details.unwrap();
        assert_eq!(details.average_rating, Some(3.0));
        assert_eq!(details.rating_count, Some(2));
    }

    #[tokio::test]
    async fn repeated_feedback_overwrites_and_keeps_count() {
        let conn = connect_in_memory().await.unwrap();
        seed_provider_user(&conn).await;
        repository::insert(&conn, &booking_fixture("b-1", BookingStatus::Completed, 0))
            .await
            .unwrap();

        add_feedback(&conn, "b-1", CONSUMER, Some(5), None).await.unwrap();
        add_feedback(&conn, "b-1", CONSUMER, Some(1), None).await.unwrap();

        let user = users_repository::get_by_id(&conn, PROVIDER)
            .await
            .unwrap()
            .unwrap();
        let details = user.provider_details.unwrap();
        assert_eq!(details.average_rating, Some(1.0));
        assert_eq!(details.rating_count, Some(1));
    }

    #[tokio::test]
    async fn sweep_completes_only_overdue_open_bookings() {
        let conn = connect_in_memory().await.unwrap();
        let past = Utc::now() - Duration::hours(3);
        let future = Utc::now() + Duration::hours(3);

        let mut overdue_pending = booking_fixture("b-1", BookingStatus::Pending, 0);
        overdue_pending.scheduled_at = past;
        let mut overdue_confirmed = booking_fixture("b-2", BookingStatus::Confirmed, 1);
        overdue_confirmed.scheduled_at = past;
        let mut overdue_cancelled = booking_fixture("b-3", BookingStatus::Cancelled, 2);
        overdue_cancelled.scheduled_at = past;
        let mut upcoming_pending = booking_fixture("b-4", BookingStatus::Pending, 3);
        upcoming_pending.scheduled_at = future;

        for b in [
            &overdue_pending,
            &overdue_confirmed,
            &overdue_cancelled,
            &upcoming_pending,
        ] {
            repository::insert(&conn, b).await.unwrap();
        }

        let count = sweep_once(&conn).await.unwrap();
        assert_eq!(count, 2);

        let status_of = |id: &'static str| {
            let conn = conn.clone();
            async move {
                repository::find_by_id(&conn, id)
                    .await
                    .unwrap()
                    .unwrap()
                    .status
            }
        };
        assert_eq!(status_of("b-1").await, BookingStatus::Completed);
        assert_eq!(status_of("b-2").await, BookingStatus::Completed);
        assert_eq!(status_of("b-3").await, BookingStatus::Cancelled);
        assert_eq!(status_of("b-4").await, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn sweep_is_idempotent() {
        let conn = connect_in_memory().await.unwrap();
        let mut overdue = booking_fixture("b-1", BookingStatus::Pending, 0);
        overdue.scheduled_at = Utc::now() - Duration::hours(5);
        repository::insert(&conn, &overdue).await.unwrap();

        assert_eq!(sweep_once(&conn).await.unwrap(), 1);
        assert_eq!(sweep_once(&conn).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn consumer_history_is_newest_first() {
        let conn = connect_in_memory().await.unwrap();
        seed_service(&conn, "svc-1").await;

        for i in 0..4 {
            repository::insert(
                &conn,
                &booking_fixture(&format!("b-{i}"), BookingStatus::Pending, i * 60),
            )
            .await
            .unwrap();
        }

        let summaries = list_for_consumer(&conn, CONSUMER, None).await.unwrap();
        let ids: Vec<&str> = summaries.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["b-3", "b-2", "b-1", "b-0"]);

        // summaries embed the service view with the snapshot title
        assert_eq!(summaries[0].service.title, "Garden cleanup");
        assert_eq!(summaries[0].service.description, "Full garden tidy");
        assert_eq!(summaries[0].service.price, 80.0);
    }

    #[tokio::test]
    async fn consumer_history_by_email_override() {
        let conn = connect_in_memory().await.unwrap();
        seed_service(&conn, "svc-1").await;
        repository::insert(&conn, &booking_fixture("b-1", BookingStatus::Pending, 0))
            .await
            .unwrap();

        let by_email = list_for_consumer(&conn, "ignored-identity", Some("casey@example.com"))
            .await
            .unwrap();
        assert_eq!(by_email.len(), 1);

        let wrong_email = list_for_consumer(&conn, CONSUMER, Some("other@example.com"))
            .await
            .unwrap();
        assert!(wrong_email.is_empty());
    }

    #[tokio::test]
    async fn provider_history_pagination() {
        let conn = connect_in_memory().await.unwrap();
        for i in 0..5 {
            repository::insert(
                &conn,
                &booking_fixture(&format!("b-{i}"), BookingStatus::Pending, i * 60),
            )
            .await
            .unwrap();
        }

        let page = list_for_provider(&conn, PROVIDER, 2, 2).await.unwrap();
        assert_eq!(page.pagination.total, 5);
        assert_eq!(page.pagination.page, 2);
        assert_eq!(page.pagination.per_page, 2);
        assert_eq!(page.pagination.pages, 3);

        // newest first overall, so page 2 holds the 3rd and 4th newest
        let ids: Vec<&str> = page.bookings.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["b-2", "b-1"]);
    }

    #[tokio::test]
    async fn provider_pagination_survives_extreme_parameters() {
        let conn = connect_in_memory().await.unwrap();
        repository::insert(&conn, &booking_fixture("b-0", BookingStatus::Pending, 0))
            .await
            .unwrap();

        let page = list_for_provider(&conn, PROVIDER, u64::MAX, u64::MAX)
            .await
            .unwrap();
        assert!(page.bookings.is_empty());
        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.pagination.per_page, 100);

        // oversized per_page is clamped, not rejected
        let page = list_for_provider(&conn, PROVIDER, 1, 10_000).await.unwrap();
        assert_eq!(page.bookings.len(), 1);
        assert_eq!(page.pagination.pages, 1);
    }

    #[tokio::test]
    async fn sweep_stamps_updates_with_the_cutoff_instant() {
        let conn = connect_in_memory().await.unwrap();
        let mut booking = booking_fixture("b-1", BookingStatus::Pending, 0);
        booking.scheduled_at = Utc::now() - Duration::hours(2);
        repository::insert(&conn, &booking).await.unwrap();

        let cutoff = Utc::now();
        let swept = repository::complete_overdue(&conn, cutoff).await.unwrap();
        assert_eq!(swept, 1);

        // the row carries the same instant the predicate was evaluated at
        let updated = repository::find_by_id(&conn, "b-1").await.unwrap().unwrap();
        assert_eq!(
            updated.updated_at.map(|t| t.timestamp_micros()),
            Some(cutoff.timestamp_micros())
        );
    }

    #[tokio::test]
    async fn get_by_id_enforces_visibility() {
        let conn = connect_in_memory().await.unwrap();
        repository::insert(&conn, &booking_fixture("b-1", BookingStatus::Pending, 0))
            .await
            .unwrap();

        assert!(get_by_id(&conn, "b-1", CONSUMER).await.is_ok());
        assert!(get_by_id(&conn, "b-1", PROVIDER).await.is_ok());
        assert!(matches!(
            get_by_id(&conn, "b-1", "someone-else").await,
            Err(ApiError::Forbidden(_))
        ));
        assert!(matches!(
            get_by_id(&conn, "b-2", CONSUMER).await,
            Err(ApiError::NotFound("Booking"))
        ));
    }
}
