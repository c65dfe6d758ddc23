// src/models/availability.rs

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::common::error::AppError;

// Linha de weekly_availability (0 = segunda ... 6 = domingo)
#[derive(Debug, Clone, FromRow)]
pub struct AvailabilityRow {
    pub weekday: i16,
    pub enabled: bool,
    pub start_time: Option<NaiveTime>,
    pub break_from: Option<NaiveTime>,
    pub break_to: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

// Expediente de um único dia da semana
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DaySchedule {
    #[serde(default)]
    pub enabled: bool,
    #[schema(value_type = Option<String>, example = "09:00:00")]
    pub start: Option<NaiveTime>,
    #[schema(value_type = Option<String>, example = "13:00:00")]
    pub break_from: Option<NaiveTime>,
    #[schema(value_type = Option<String>, example = "14:00:00")]
    pub break_to: Option<NaiveTime>,
    #[schema(value_type = Option<String>, example = "18:00:00")]
    pub end: Option<NaiveTime>,
}

impl DaySchedule {
    /// Janela de trabalho do dia, se o dia estiver ativo e completo.
    pub fn working_window(&self) -> Option<(NaiveTime, NaiveTime)> {
        if !self.enabled {
            return None;
        }
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }

    /// O intervalo só conta quando os dois limites existem.
    pub fn break_window(&self) -> Option<(NaiveTime, NaiveTime)> {
        match (self.break_from, self.break_to) {
            (Some(from), Some(to)) => Some((from, to)),
            _ => None,
        }
    }

    fn validate(&self, day: &str) -> Result<(), AppError> {
        if self.break_from.is_some() != self.break_to.is_some() {
            return Err(AppError::field(
                day,
                "Break start and end must be given together.",
            ));
        }
        if let Some((from, to)) = self.break_window() {
            if from >= to {
                return Err(AppError::field(day, "Break start must be before break end."));
            }
        }

        if !self.enabled {
            return Ok(());
        }

        let (start, end) = match (self.start, self.end) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                return Err(AppError::field(
                    day,
                    "Start and end times are required for an enabled day.",
                ));
            }
        };
        if start >= end {
            return Err(AppError::field(day, "Start time must be before end time."));
        }
        if let Some((from, to)) = self.break_window() {
            if from < start || to > end {
                return Err(AppError::field(day, "Break must lie within working hours."));
            }
        }
        Ok(())
    }
}

/// Disponibilidade semanal de um profissional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WeeklyAvailability {
    #[serde(default)]
    pub monday: DaySchedule,
    #[serde(default)]
    pub tuesday: DaySchedule,
    #[serde(default)]
    pub wednesday: DaySchedule,
    #[serde(default)]
    pub thursday: DaySchedule,
    #[serde(default)]
    pub friday: DaySchedule,
    #[serde(default)]
    pub saturday: DaySchedule,
    #[serde(default)]
    pub sunday: DaySchedule,
}

const DAY_NAMES: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

impl WeeklyAvailability {
    pub fn day(&self, weekday: usize) -> &DaySchedule {
        match weekday {
            0 => &self.monday,
            1 => &self.tuesday,
            2 => &self.wednesday,
            3 => &self.thursday,
            4 => &self.friday,
            5 => &self.saturday,
            _ => &self.sunday,
        }
    }

    fn day_mut(&mut self, weekday: usize) -> &mut DaySchedule {
        match weekday {
            0 => &mut self.monday,
            1 => &mut self.tuesday,
            2 => &mut self.wednesday,
            3 => &mut self.thursday,
            4 => &mut self.friday,
            5 => &mut self.saturday,
            _ => &mut self.sunday,
        }
    }

    /// Expediente aplicável a uma data (segunda = 0).
    pub fn for_date(&self, date: NaiveDate) -> &DaySchedule {
        self.day(date.weekday().num_days_from_monday() as usize)
    }

    /// Dias sem linha no banco ficam desativados.
    pub fn from_rows(rows: Vec<AvailabilityRow>) -> Self {
        let mut weekly = WeeklyAvailability::default();
        for row in rows {
            if !(0..7).contains(&row.weekday) {
                continue;
            }
            *weekly.day_mut(row.weekday as usize) = DaySchedule {
                enabled: row.enabled,
                start: row.start_time,
                break_from: row.break_from,
                break_to: row.break_to,
                end: row.end_time,
            };
        }
        weekly
    }

    /// (weekday, expediente) na ordem de segunda a domingo.
    pub fn days(&self) -> impl Iterator<Item = (i16, &DaySchedule)> {
        (0..7).map(move |i| (i as i16, self.day(i)))
    }

    pub fn validate(&self) -> Result<(), AppError> {
        for (i, name) in DAY_NAMES.iter().enumerate() {
            self.day(i).validate(name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn open_day() -> DaySchedule {
        DaySchedule {
            enabled: true,
            start: Some(t(9, 0)),
            break_from: Some(t(13, 0)),
            break_to: Some(t(14, 0)),
            end: Some(t(18, 0)),
        }
    }

    #[test]
    fn missing_rows_are_disabled_days() {
        let weekly = WeeklyAvailability::from_rows(vec![AvailabilityRow {
            weekday: 2,
            enabled: true,
            start_time: Some(t(9, 0)),
            break_from: None,
            break_to: None,
            end_time: Some(t(17, 0)),
        }]);

        assert!(weekly.wednesday.enabled);
        assert!(!weekly.monday.enabled);
        assert_eq!(weekly.days().count(), 7);
    }

    #[test]
    fn for_date_maps_monday_to_zero() {
        let mut weekly = WeeklyAvailability::default();
        weekly.monday = open_day();

        // 2025-06-02 é uma segunda-feira
        let monday = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        assert!(weekly.for_date(monday).enabled);
        assert!(!weekly.for_date(monday.succ_opt().unwrap()).enabled);
    }

    #[test]
    fn enabled_day_needs_start_before_end() {
        let mut weekly = WeeklyAvailability::default();
        weekly.friday = DaySchedule {
            enabled: true,
            start: Some(t(18, 0)),
            end: Some(t(9, 0)),
            ..Default::default()
        };
        assert!(weekly.validate().is_err());

        weekly.friday.start = None;
        assert!(weekly.validate().is_err());
    }

    #[test]
    fn break_must_be_complete_and_inside_the_day() {
        let mut weekly = WeeklyAvailability::default();
        weekly.monday = open_day();
        assert!(weekly.validate().is_ok());

        weekly.monday.break_to = None;
        assert!(weekly.validate().is_err());

        weekly.monday = open_day();
        weekly.monday.break_to = Some(t(19, 0));
        assert!(weekly.validate().is_err());
    }

    #[test]
    fn disabled_day_ignores_missing_hours() {
        let weekly = WeeklyAvailability::default();
        assert!(weekly.validate().is_ok());
        assert_eq!(weekly.sunday.working_window(), None);
    }
}
