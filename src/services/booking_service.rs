// src/services/booking_service.rs

use std::collections::HashSet;

use chrono::{Months, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        BookingRepository, CatalogRepository, ClassRepository, CustomerRepository,
        TeamRepository,
    },
    models::{
        availability::WeeklyAvailability,
        booking::{
            validate_schedule, AvailableSlots, BookingDetail, BookingFilter, BookingListQuery,
            BookingState, BookingTarget, CalendarQuery, CreateBookingPayload, SlotQuery,
            UpdateBookingPayload,
        },
        tenancy::Membership,
    },
    services::{
        availability::{find_available_slots, format_slots},
        notification::{self, notify_quietly, ReminderDetails, SharedNotifier},
    },
};

const DATE_FORMAT: &str = "%Y-%m-%d";

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| AppError::field(field, "Invalid date format. Use YYYY-MM-DD."))
}

/// Primeiro e último dia de "June 2025".
pub fn parse_month(value: &str) -> Result<(NaiveDate, NaiveDate), AppError> {
    let invalid = || {
        AppError::field(
            "month",
            "Invalid month format. Use 'Month YYYY' (e.g. 'June 2025').",
        )
    };
    let first = NaiveDate::parse_from_str(&format!("1 {}", value.trim()), "%d %B %Y")
        .map_err(|_| invalid())?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(invalid)?;
    Ok((first, last))
}

/// Aplica os filtros de calendário (mês, semana, dia, estado) ao filtro base.
pub fn apply_calendar_query(filter: &mut BookingFilter, query: &CalendarQuery) -> Result<(), AppError> {
    if let Some(month) = query.month.as_deref() {
        let (first, last) = parse_month(month)?;
        filter.date_from = Some(first);
        filter.date_to = Some(last);
    }

    match (query.week_start.as_deref(), query.week_end.as_deref()) {
        (Some(start), Some(end)) => {
            let start = parse_date("week_start", start)?;
            let end = parse_date("week_end", end)?;
            if end < start {
                return Err(AppError::field("week_end", "week_end must not be before week_start."));
            }
            filter.date_from = Some(start);
            filter.date_to = Some(end);
        }
        (None, None) => {}
        _ => {
            return Err(AppError::non_field(
                "Both week_start and week_end are required to filter by week.",
            ));
        }
    }

    if let Some(day) = query.day.as_deref() {
        filter.date = Some(parse_date("day", day)?);
    }

    if let Some(status) = query.status.as_deref() {
        let state = BookingState::parse(status).ok_or_else(|| {
            AppError::field(
                "status",
                "Invalid status. Use confirmed, it_arrived, paid, missing or cancel.",
            )
        })?;
        filter.state = Some(state);
    }

    Ok(())
}

/// "a,b,c" -> ids na ordem recebida; repetidos são recusados.
pub fn parse_service_ids(value: &str) -> Result<Vec<Uuid>, AppError> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for part in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let id = Uuid::parse_str(part)
            .map_err(|_| AppError::field("service_ids", format!("Invalid service id: {}", part)))?;
        if !seen.insert(id) {
            return Err(AppError::field("service_ids", format!("Duplicate service id: {}", id)));
        }
        ids.push(id);
    }
    if ids.is_empty() {
        return Err(AppError::field("service_ids", "At least one service id is required."));
    }
    Ok(ids)
}

/// Filtro base conforme o papel: admin tudo, profissional só as suas, resto nada.
fn scoped_filter(member: &Membership) -> Option<BookingFilter> {
    if member.is_admin() {
        Some(BookingFilter::default())
    } else if member.is_professional() {
        Some(BookingFilter {
            professional_id: Some(member.user_id),
            ..Default::default()
        })
    } else {
        None
    }
}

fn ensure_owner(member: &Membership, professional_id: Uuid) -> Result<(), AppError> {
    if member.is_admin() || (member.is_professional() && member.user_id == professional_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You do not have permission to manage this reservation.".to_string(),
        ))
    }
}

#[derive(Clone)]
pub struct BookingService {
    booking_repo: BookingRepository,
    team_repo: TeamRepository,
    customer_repo: CustomerRepository,
    class_repo: ClassRepository,
    catalog_repo: CatalogRepository,
    pool: PgPool,
    notifier: SharedNotifier,
}

impl BookingService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        booking_repo: BookingRepository,
        team_repo: TeamRepository,
        customer_repo: CustomerRepository,
        class_repo: ClassRepository,
        catalog_repo: CatalogRepository,
        pool: PgPool,
        notifier: SharedNotifier,
    ) -> Self {
        Self {
            booking_repo,
            team_repo,
            customer_repo,
            class_repo,
            catalog_repo,
            pool,
            notifier,
        }
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        member: &Membership,
        query: &BookingListQuery,
    ) -> Result<Vec<BookingDetail>, AppError> {
        let Some(mut filter) = scoped_filter(member) else {
            return Ok(Vec::new());
        };

        if member.is_admin() {
            filter.professional_id = query.professional;
        }
        filter.date = query.date;
        filter.class_id = query.class_id;
        filter.services = query.services.clone();
        filter.room_equipment = query.room_equipment.clone();

        self.booking_repo.search(tenant_id, &filter).await
    }

    pub async fn calendar(
        &self,
        tenant_id: Uuid,
        member: &Membership,
        query: &CalendarQuery,
    ) -> Result<Vec<BookingDetail>, AppError> {
        let Some(mut filter) = scoped_filter(member) else {
            return Ok(Vec::new());
        };
        apply_calendar_query(&mut filter, query)?;
        self.booking_repo.search(tenant_id, &filter).await
    }

    pub async fn get(&self, tenant_id: Uuid, member: &Membership, id: Uuid) -> Result<BookingDetail, AppError> {
        let detail = self.find_detail(tenant_id, id).await?;
        ensure_owner(member, detail.booking.professional_id)?;
        Ok(detail)
    }

    pub async fn create(
        &self,
        tenant_id: Uuid,
        member: &Membership,
        payload: &CreateBookingPayload,
    ) -> Result<BookingDetail, AppError> {
        let target = BookingTarget::from_ids(payload.customer_id, payload.class_id)?;
        validate_schedule(
            payload.date,
            payload.start_time,
            payload.end_time,
            Utc::now().date_naive(),
        )?;

        // Profissional reserva para si; admin escolhe o profissional
        let professional_id = if member.is_professional() {
            member.user_id
        } else if member.is_admin() {
            let id = payload.professional_id.ok_or_else(|| {
                AppError::field("professional_id", "This field is required.")
            })?;
            self.ensure_professional(tenant_id, id).await?;
            id
        } else {
            return Err(AppError::Forbidden(
                "Only admins and professionals can create reservations.".to_string(),
            ));
        };

        self.ensure_target_exists(tenant_id, target).await?;

        let mut tx = self.pool.begin().await?;

        if member.is_professional()
            && !self
                .team_repo
                .consume_hour(&mut *tx, tenant_id, professional_id)
                .await?
        {
            return Err(AppError::non_field(
                "You do not have enough remaining hours to create a reservation.",
            ));
        }

        let booking = self
            .booking_repo
            .create(&mut *tx, tenant_id, professional_id, target, payload)
            .await?;

        tx.commit().await?;

        tracing::info!("📆 Reserva {} criada para {}", booking.id, professional_id);

        let detail = self.find_detail(tenant_id, booking.id).await?;
        self.notify_change(&detail, "created").await;
        Ok(detail)
    }

    pub async fn update(
        &self,
        tenant_id: Uuid,
        member: &Membership,
        id: Uuid,
        payload: &UpdateBookingPayload,
    ) -> Result<BookingDetail, AppError> {
        let mut booking = self
            .booking_repo
            .find_by_id(&self.pool, tenant_id, id)
            .await?
            .ok_or(AppError::NotFound("Reservation"))?;
        ensure_owner(member, booking.professional_id)?;

        if payload.customer_id.is_some() && payload.class_id.is_some() {
            BookingTarget::from_ids(payload.customer_id, payload.class_id)?;
        }
        if let Some(professional_id) = payload.professional_id {
            if professional_id != booking.professional_id {
                if !member.is_admin() {
                    return Err(AppError::Forbidden(
                        "Only admins can reassign a reservation.".to_string(),
                    ));
                }
                self.ensure_professional(tenant_id, professional_id).await?;
            }
        }

        booking.apply_update(payload);

        // A data só é revalidada quando vem no pedido
        validate_schedule(
            payload.date,
            booking.start_time,
            booking.end_time,
            Utc::now().date_naive(),
        )?;
        let target = BookingTarget::from_ids(booking.customer_id, booking.class_id)?;
        self.ensure_target_exists(tenant_id, target).await?;

        self.booking_repo.save(&booking).await?;

        let detail = self.find_detail(tenant_id, id).await?;
        self.notify_change(&detail, "updated").await;
        Ok(detail)
    }

    pub async fn delete(&self, tenant_id: Uuid, member: &Membership, id: Uuid) -> Result<(), AppError> {
        let booking = self
            .booking_repo
            .find_by_id(&self.pool, tenant_id, id)
            .await?
            .ok_or(AppError::NotFound("Reservation"))?;
        ensure_owner(member, booking.professional_id)?;

        self.booking_repo.delete(tenant_id, id).await?;
        tracing::info!("🗑️ Reserva {} removida", id);
        Ok(())
    }

    /// approve -> confirmed, reject -> cancel
    pub async fn set_state(
        &self,
        tenant_id: Uuid,
        member: &Membership,
        id: Uuid,
        state: BookingState,
    ) -> Result<BookingDetail, AppError> {
        let booking = self
            .booking_repo
            .find_by_id(&self.pool, tenant_id, id)
            .await?
            .ok_or(AppError::NotFound("Reservation"))?;
        ensure_owner(member, booking.professional_id)?;

        self.booking_repo.set_state(tenant_id, id, state).await?;

        let detail = self.find_detail(tenant_id, id).await?;
        let action = match state {
            BookingState::Cancel => "cancelled",
            _ => "confirmed",
        };
        self.notify_change(&detail, action).await;
        Ok(detail)
    }

    pub async fn available_slots(&self, tenant_id: Uuid, query: &SlotQuery) -> Result<AvailableSlots, AppError> {
        let professional_id = query
            .professional_id
            .ok_or_else(|| AppError::field("professional_id", "This query parameter is required."))?;
        let date = query
            .date
            .as_deref()
            .ok_or_else(|| AppError::field("date", "This query parameter is required."))
            .and_then(|d| parse_date("date", d))?;
        let service_ids = query
            .service_ids
            .as_deref()
            .ok_or_else(|| AppError::field("service_ids", "This query parameter is required."))
            .and_then(parse_service_ids)?;

        if !self
            .team_repo
            .is_professional(&self.pool, tenant_id, professional_id)
            .await?
        {
            return Err(AppError::NotFound("Professional"));
        }

        let services = self.catalog_repo.find_services(tenant_id, &service_ids).await?;
        if services.len() != service_ids.len() {
            return Err(AppError::field(
                "service_ids",
                "One or more services were not found.",
            ));
        }
        let total_duration: i32 = services.iter().map(|s| s.duration).sum();

        let rows = self
            .team_repo
            .get_availability(&self.pool, tenant_id, professional_id)
            .await?;
        let availability = WeeklyAvailability::from_rows(rows);
        let booked = self
            .booking_repo
            .booked_ranges(tenant_id, professional_id, date)
            .await?;

        let slots = find_available_slots(&availability, date, total_duration as i64, &booked);

        Ok(AvailableSlots {
            professional_id,
            date,
            total_duration,
            available_slots: format_slots(&slots),
        })
    }

    /// Lembretes das reservas confirmadas de `date`, em todos os tenants.
    /// Retorna quantas reservas foram processadas.
    pub async fn send_reminders(&self, date: NaiveDate) -> Result<usize, AppError> {
        let rows = self.booking_repo.confirmed_on(date).await?;
        tracing::info!("⏰ {} reservas confirmadas para {}", rows.len(), date);

        for row in &rows {
            let professional = ReminderDetails {
                recipient_name: &row.professional_name,
                professional_name: &row.professional_name,
                title: row.title.as_deref(),
                date: row.date,
                start: row.start_time,
                end: row.end_time,
            };
            notify_quietly(
                self.notifier.as_ref(),
                notification::booking_reminder(&row.professional_email, &professional),
            )
            .await;

            if let (Some(name), Some(email)) = (&row.customer_name, &row.customer_email) {
                let customer = ReminderDetails {
                    recipient_name: name,
                    ..professional
                };
                notify_quietly(
                    self.notifier.as_ref(),
                    notification::booking_reminder(email, &customer),
                )
                .await;
            }
        }

        Ok(rows.len())
    }

    async fn find_detail(&self, tenant_id: Uuid, id: Uuid) -> Result<BookingDetail, AppError> {
        self.booking_repo
            .find_detail(tenant_id, id)
            .await?
            .ok_or(AppError::NotFound("Reservation"))
    }

    async fn ensure_professional(&self, tenant_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        if self
            .team_repo
            .is_professional(&self.pool, tenant_id, user_id)
            .await?
        {
            Ok(())
        } else {
            Err(AppError::field(
                "professional_id",
                "The selected user is not a professional of this tenant.",
            ))
        }
    }

    async fn ensure_target_exists(&self, tenant_id: Uuid, target: BookingTarget) -> Result<(), AppError> {
        match target {
            BookingTarget::Customer(id) => {
                self.customer_repo
                    .find_by_id(&self.pool, tenant_id, id)
                    .await?
                    .ok_or_else(|| AppError::field("customer_id", "Invalid client."))?;
            }
            BookingTarget::Class(id) => {
                self.class_repo
                    .find_by_id(&self.pool, tenant_id, id)
                    .await?
                    .ok_or_else(|| AppError::field("class_id", "Invalid class."))?;
            }
        }
        Ok(())
    }

    async fn notify_change(&self, detail: &BookingDetail, action: &str) {
        let booking = &detail.booking;
        let recipients = detail
            .professional_details
            .iter()
            .chain(detail.customer_details.iter());

        for person in recipients {
            let message = notification::booking_changed(
                &person.email,
                action,
                booking.date,
                booking.start_time,
                booking.end_time,
            );
            notify_quietly(self.notifier.as_ref(), message).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::Role;
    use rust_decimal::Decimal;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn member(role: Role) -> Membership {
        Membership {
            tenant_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            role,
            is_active: true,
            remaining_hours: Decimal::ZERO,
            joined_at: Utc::now(),
        }
    }

    fn field_of(err: AppError) -> String {
        match err {
            AppError::FieldErrors(map) => map.into_keys().next().unwrap_or_default(),
            other => panic!("erro inesperado: {:?}", other),
        }
    }

    #[test]
    fn month_covers_whole_month() {
        assert_eq!(parse_month("June 2025").unwrap(), (d(2025, 6, 1), d(2025, 6, 30)));
        assert_eq!(parse_month("February 2024").unwrap(), (d(2024, 2, 1), d(2024, 2, 29)));
        assert_eq!(parse_month("December 2025").unwrap().1, d(2025, 12, 31));
    }

    #[test]
    fn invalid_month_is_a_field_error() {
        assert_eq!(field_of(parse_month("2025-06").unwrap_err()), "month");
        assert_eq!(field_of(parse_month("Junho 2025").unwrap_err()), "month");
    }

    #[test]
    fn week_range_requires_both_bounds() {
        let mut filter = BookingFilter::default();
        let query = CalendarQuery {
            week_start: Some("2025-06-02".into()),
            ..Default::default()
        };
        assert!(apply_calendar_query(&mut filter, &query).is_err());

        let query = CalendarQuery {
            week_start: Some("2025-06-02".into()),
            week_end: Some("2025-06-08".into()),
            ..Default::default()
        };
        apply_calendar_query(&mut filter, &query).unwrap();
        assert_eq!(filter.date_from, Some(d(2025, 6, 2)));
        assert_eq!(filter.date_to, Some(d(2025, 6, 8)));
    }

    #[test]
    fn day_and_status_are_parsed() {
        let mut filter = BookingFilter::default();
        let query = CalendarQuery {
            day: Some("2025-06-10".into()),
            status: Some("paid".into()),
            ..Default::default()
        };
        apply_calendar_query(&mut filter, &query).unwrap();
        assert_eq!(filter.date, Some(d(2025, 6, 10)));
        assert_eq!(filter.state, Some(BookingState::Paid));
    }

    #[test]
    fn bad_day_or_status_is_rejected() {
        let mut filter = BookingFilter::default();
        let query = CalendarQuery {
            day: Some("10/06/2025".into()),
            ..Default::default()
        };
        assert_eq!(field_of(apply_calendar_query(&mut filter, &query).unwrap_err()), "day");

        let query = CalendarQuery {
            status: Some("done".into()),
            ..Default::default()
        };
        assert_eq!(field_of(apply_calendar_query(&mut filter, &query).unwrap_err()), "status");
    }

    #[test]
    fn repeated_service_id_is_rejected() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(parse_service_ids(&format!("{a}, {b}")).unwrap(), vec![a, b]);

        let err = parse_service_ids(&format!("{a}, {b},{a}")).unwrap_err();
        assert_eq!(field_of(err), "service_ids");
    }

    #[test]
    fn malformed_service_ids_are_rejected() {
        assert_eq!(field_of(parse_service_ids("abc").unwrap_err()), "service_ids");
        assert_eq!(field_of(parse_service_ids(" , ").unwrap_err()), "service_ids");
    }

    #[test]
    fn listing_scope_follows_role() {
        let admin = member(Role::Admin);
        assert_eq!(scoped_filter(&admin).unwrap().professional_id, None);

        let professional = member(Role::Professional);
        assert_eq!(
            scoped_filter(&professional).unwrap().professional_id,
            Some(professional.user_id)
        );

        assert!(scoped_filter(&member(Role::Collaborator)).is_none());
    }

    #[test]
    fn only_admin_or_owner_manages_booking() {
        let professional = member(Role::Professional);
        assert!(ensure_owner(&professional, professional.user_id).is_ok());
        assert!(matches!(
            ensure_owner(&professional, Uuid::new_v4()),
            Err(AppError::Forbidden(_))
        ));
        assert!(ensure_owner(&member(Role::Admin), Uuid::new_v4()).is_ok());
        assert!(ensure_owner(&member(Role::Collaborator), Uuid::new_v4()).is_err());
    }
}
