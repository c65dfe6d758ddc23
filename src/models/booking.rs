// src/models/booking.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::common::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "booking_state", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingState {
    Confirmed,
    ItArrived,
    Paid,
    Missing,
    Cancel,
}

impl BookingState {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "confirmed" => Some(Self::Confirmed),
            "it_arrived" => Some(Self::ItArrived),
            "paid" => Some(Self::Paid),
            "missing" => Some(Self::Missing),
            "cancel" => Some(Self::Cancel),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Confirmed => "Confirmed",
            Self::ItArrived => "It arrived",
            Self::Paid => "Paid",
            Self::Missing => "Missing",
            Self::Cancel => "Cancel",
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub professional_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub class_id: Option<Uuid>,
    pub title: Option<String>,
    pub coupon: Option<String>,
    pub services: Option<String>,
    pub room_equipment: Option<String>,
    pub date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, example = "10:00:00")]
    pub start_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>, example = "11:00:00")]
    pub end_time: Option<NaiveTime>,
    pub internal_notes: Option<String>,
    pub treatment_record_marking: bool,
    pub state: BookingState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Aplica a edição. Indicar aula limpa o cliente e vice-versa.
    pub fn apply_update(&mut self, payload: &UpdateBookingPayload) {
        if let Some(class_id) = payload.class_id {
            self.class_id = Some(class_id);
            self.customer_id = None;
        } else if let Some(customer_id) = payload.customer_id {
            self.customer_id = Some(customer_id);
            self.class_id = None;
        }
        if let Some(professional_id) = payload.professional_id {
            self.professional_id = professional_id;
        }
        if payload.title.is_some() {
            self.title = payload.title.clone();
        }
        if payload.coupon.is_some() {
            self.coupon = payload.coupon.clone();
        }
        if payload.services.is_some() {
            self.services = payload.services.clone();
        }
        if payload.room_equipment.is_some() {
            self.room_equipment = payload.room_equipment.clone();
        }
        if payload.date.is_some() {
            self.date = payload.date;
        }
        if payload.start_time.is_some() {
            self.start_time = payload.start_time;
        }
        if payload.end_time.is_some() {
            self.end_time = payload.end_time;
        }
        if payload.internal_notes.is_some() {
            self.internal_notes = payload.internal_notes.clone();
        }
        if let Some(marking) = payload.treatment_record_marking {
            self.treatment_record_marking = marking;
        }
        if let Some(state) = payload.state {
            self.state = state;
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonSummary {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassSummary {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetail {
    #[serde(flatten)]
    pub booking: Booking,
    pub professional_details: Option<PersonSummary>,
    pub customer_details: Option<PersonSummary>,
    pub class_details: Option<ClassSummary>,
}

/// Alvo de uma reserva: cliente individual ou aula, nunca os dois.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingTarget {
    Customer(Uuid),
    Class(Uuid),
}

impl BookingTarget {
    pub fn from_ids(customer_id: Option<Uuid>, class_id: Option<Uuid>) -> Result<Self, AppError> {
        match (customer_id, class_id) {
            (Some(_), Some(_)) => Err(AppError::field(
                "class_id",
                "Cannot book both a class and a customer. Choose one.",
            )),
            (None, None) => Err(AppError::field(
                "class_id",
                "Either a class or a customer must be provided.",
            )),
            (Some(customer), None) => Ok(Self::Customer(customer)),
            (None, Some(class)) => Ok(Self::Class(class)),
        }
    }

    pub fn customer_id(&self) -> Option<Uuid> {
        match self {
            Self::Customer(id) => Some(*id),
            Self::Class(_) => None,
        }
    }

    pub fn class_id(&self) -> Option<Uuid> {
        match self {
            Self::Class(id) => Some(*id),
            Self::Customer(_) => None,
        }
    }
}

/// Regras de data/hora comuns à criação e à edição.
pub fn validate_schedule(
    date: Option<NaiveDate>,
    start_time: Option<NaiveTime>,
    end_time: Option<NaiveTime>,
    today: NaiveDate,
) -> Result<(), AppError> {
    if let Some(date) = date {
        if date < today {
            return Err(AppError::field("date", "Booking date cannot be in the past."));
        }
    }
    if let (Some(start), Some(end)) = (start_time, end_time) {
        if start >= end {
            return Err(AppError::field("end_time", "End time must be after start time."));
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingPayload {
    /// Obrigatório quando quem reserva é admin
    pub professional_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub class_id: Option<Uuid>,
    pub title: Option<String>,
    pub coupon: Option<String>,
    pub services: Option<String>,
    pub room_equipment: Option<String>,
    pub date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, example = "10:00")]
    pub start_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>, example = "11:00")]
    pub end_time: Option<NaiveTime>,
    pub internal_notes: Option<String>,
    #[serde(default)]
    pub treatment_record_marking: bool,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingPayload {
    pub professional_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub class_id: Option<Uuid>,
    pub title: Option<String>,
    pub coupon: Option<String>,
    pub services: Option<String>,
    pub room_equipment: Option<String>,
    pub date: Option<NaiveDate>,
    #[schema(value_type = Option<String>)]
    pub start_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>)]
    pub end_time: Option<NaiveTime>,
    pub internal_notes: Option<String>,
    pub treatment_record_marking: Option<bool>,
    pub state: Option<BookingState>,
}

/// Critérios de busca de reservas já resolvidos (papel, filtros, calendário).
#[derive(Debug, Default, Clone)]
pub struct BookingFilter {
    pub professional_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub class_id: Option<Uuid>,
    pub services: Option<String>,
    pub room_equipment: Option<String>,
    pub state: Option<BookingState>,
}

/// Reserva de amanhã com os contactos para o lembrete.
#[derive(Debug, Clone, FromRow)]
pub struct ReminderRow {
    pub booking_id: Uuid,
    pub tenant_id: Uuid,
    pub title: Option<String>,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub professional_name: String,
    pub professional_email: String,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
}

// Filtros simples de GET /api/reservations
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookingListQuery {
    pub date: Option<NaiveDate>,
    pub professional: Option<Uuid>,
    pub class_id: Option<Uuid>,
    pub services: Option<String>,
    pub room_equipment: Option<String>,
}

// Filtros de calendário de GET /api/reservations/filter_reservations
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CalendarQuery {
    /// "June 2025"
    pub month: Option<String>,
    pub week_start: Option<String>,
    pub week_end: Option<String>,
    pub day: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SlotQuery {
    pub professional_id: Option<Uuid>,
    pub date: Option<String>,
    /// Lista separada por vírgulas
    pub service_ids: Option<String>,
}

/// Janela livre na agenda, formatada como HH:MM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Slot {
    #[schema(example = "09:00")]
    pub start: String,
    #[schema(example = "10:00")]
    pub end: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSlots {
    pub professional_id: Uuid,
    pub date: NaiveDate,
    pub total_duration: i32,
    pub available_slots: Vec<Slot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn both_class_and_customer_is_rejected() {
        let err = BookingTarget::from_ids(Some(Uuid::new_v4()), Some(Uuid::new_v4())).unwrap_err();
        assert!(matches!(err, AppError::FieldErrors(ref m) if m.contains_key("class_id")));
    }

    #[test]
    fn missing_target_is_rejected() {
        assert!(BookingTarget::from_ids(None, None).is_err());
    }

    #[test]
    fn single_target_is_accepted() {
        let customer = Uuid::new_v4();
        let target = BookingTarget::from_ids(Some(customer), None).unwrap();
        assert_eq!(target.customer_id(), Some(customer));
        assert_eq!(target.class_id(), None);
    }

    #[test]
    fn past_date_is_rejected() {
        let today = d(2025, 6, 10);
        let err = validate_schedule(Some(d(2025, 6, 9)), None, None, today).unwrap_err();
        assert!(matches!(err, AppError::FieldErrors(ref m) if m.contains_key("date")));

        assert!(validate_schedule(Some(today), None, None, today).is_ok());
    }

    #[test]
    fn end_must_follow_start() {
        let today = d(2025, 6, 10);
        assert!(validate_schedule(None, Some(t(10, 0)), Some(t(10, 0)), today).is_err());
        assert!(validate_schedule(None, Some(t(10, 0)), Some(t(11, 0)), today).is_ok());
        assert!(validate_schedule(None, Some(t(10, 0)), None, today).is_ok());
    }

    fn booking() -> Booking {
        Booking {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            professional_id: Uuid::new_v4(),
            customer_id: Some(Uuid::new_v4()),
            class_id: None,
            title: Some("Massagem".into()),
            coupon: None,
            services: None,
            room_equipment: None,
            date: Some(d(2025, 6, 10)),
            start_time: Some(t(10, 0)),
            end_time: Some(t(11, 0)),
            internal_notes: None,
            treatment_record_marking: false,
            state: BookingState::Confirmed,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn setting_class_clears_customer() {
        let mut b = booking();
        let class_id = Uuid::new_v4();
        b.apply_update(&UpdateBookingPayload {
            class_id: Some(class_id),
            ..Default::default()
        });
        assert_eq!(b.class_id, Some(class_id));
        assert_eq!(b.customer_id, None);
    }

    #[test]
    fn partial_update_keeps_other_fields() {
        let mut b = booking();
        b.apply_update(&UpdateBookingPayload {
            end_time: Some(t(11, 30)),
            ..Default::default()
        });
        assert_eq!(b.start_time, Some(t(10, 0)));
        assert_eq!(b.end_time, Some(t(11, 30)));
        assert_eq!(b.title.as_deref(), Some("Massagem"));
        assert!(b.customer_id.is_some());
    }

    #[test]
    fn state_parses_wire_names() {
        assert_eq!(BookingState::parse("it_arrived"), Some(BookingState::ItArrived));
        assert_eq!(BookingState::parse("cancelled"), None);
    }
}
