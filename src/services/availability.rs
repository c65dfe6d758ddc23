// src/services/availability.rs

use chrono::{Duration, NaiveDate, NaiveTime};

use crate::models::{availability::WeeklyAvailability, booking::Slot};

/// Passo entre candidatos, em minutos.
pub const SLOT_STEP_MINUTES: i64 = 15;

fn overlaps(start: NaiveTime, end: NaiveTime, other: (NaiveTime, NaiveTime)) -> bool {
    start < other.1 && end > other.0
}

/// Janelas livres de `duration_minutes` para o profissional na data.
///
/// O cursor parte do início do expediente e avança de 15 em 15 minutos
/// enquanto `cursor + duração <= fim`. Candidatos que cruzam o intervalo
/// ou uma reserva existente são descartados.
pub fn find_available_slots(
    availability: &WeeklyAvailability,
    date: NaiveDate,
    duration_minutes: i64,
    booked: &[(NaiveTime, NaiveTime)],
) -> Vec<(NaiveTime, NaiveTime)> {
    let day = availability.for_date(date);
    let Some((day_start, day_end)) = day.working_window() else {
        return Vec::new();
    };
    if duration_minutes <= 0 {
        return Vec::new();
    }

    let duration = Duration::minutes(duration_minutes);
    let step = Duration::minutes(SLOT_STEP_MINUTES);
    let break_window = day.break_window();

    // Trabalha em datetimes para não dar a volta à meia-noite
    let mut cursor = date.and_time(day_start);
    let end_of_day = date.and_time(day_end);
    let mut slots = Vec::new();

    while cursor + duration <= end_of_day {
        let candidate_start = cursor.time();
        let candidate_end = (cursor + duration).time();

        let hits_break = break_window
            .map(|window| overlaps(candidate_start, candidate_end, window))
            .unwrap_or(false);
        let hits_booking = booked
            .iter()
            .any(|range| overlaps(candidate_start, candidate_end, *range));

        if !hits_break && !hits_booking {
            slots.push((candidate_start, candidate_end));
        }
        cursor += step;
    }

    slots
}

pub fn format_slots(slots: &[(NaiveTime, NaiveTime)]) -> Vec<Slot> {
    slots
        .iter()
        .map(|(start, end)| Slot {
            start: start.format("%H:%M").to_string(),
            end: end.format("%H:%M").to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::availability::DaySchedule;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    // 2025-06-02 é segunda-feira
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    fn weekly_with_monday(day: DaySchedule) -> WeeklyAvailability {
        WeeklyAvailability {
            monday: day,
            ..Default::default()
        }
    }

    fn morning() -> DaySchedule {
        DaySchedule {
            enabled: true,
            start: Some(t(9, 0)),
            break_from: None,
            break_to: None,
            end: Some(t(11, 0)),
        }
    }

    #[test]
    fn disabled_day_has_no_slots() {
        let mut day = morning();
        day.enabled = false;
        let slots = find_available_slots(&weekly_with_monday(day), monday(), 30, &[]);
        assert!(slots.is_empty());
    }

    #[test]
    fn missing_end_has_no_slots() {
        let mut day = morning();
        day.end = None;
        let slots = find_available_slots(&weekly_with_monday(day), monday(), 30, &[]);
        assert!(slots.is_empty());
    }

    #[test]
    fn steps_every_fifteen_minutes_until_end() {
        let slots = find_available_slots(&weekly_with_monday(morning()), monday(), 60, &[]);
        let starts: Vec<_> = slots.iter().map(|(s, _)| *s).collect();
        assert_eq!(starts, vec![t(9, 0), t(9, 15), t(9, 30), t(9, 45), t(10, 0)]);
        assert_eq!(slots.last().map(|(_, e)| *e), Some(t(11, 0)));
    }

    #[test]
    fn excludes_break_window() {
        let mut day = morning();
        day.break_from = Some(t(10, 0));
        day.break_to = Some(t(10, 30));
        let slots = find_available_slots(&weekly_with_monday(day), monday(), 30, &[]);

        for (start, end) in &slots {
            assert!(!(*start < t(10, 30) && *end > t(10, 0)), "{start}-{end} cruza o intervalo");
        }
        assert!(slots.contains(&(t(9, 30), t(10, 0))));
        assert!(slots.contains(&(t(10, 30), t(11, 0))));
    }

    #[test]
    fn half_defined_break_is_ignored() {
        let mut day = morning();
        day.break_from = Some(t(10, 0));
        let slots = find_available_slots(&weekly_with_monday(day), monday(), 30, &[]);
        assert!(slots.contains(&(t(10, 0), t(10, 30))));
    }

    #[test]
    fn excludes_windows_overlapping_bookings() {
        let booked = [(t(9, 30), t(10, 0))];
        let slots = find_available_slots(&weekly_with_monday(morning()), monday(), 30, &booked);
        let starts: Vec<_> = slots.iter().map(|(s, _)| *s).collect();

        assert_eq!(starts, vec![t(9, 0), t(10, 0), t(10, 15), t(10, 30)]);
    }

    #[test]
    fn touching_booking_does_not_block() {
        let booked = [(t(10, 0), t(11, 0))];
        let slots = find_available_slots(&weekly_with_monday(morning()), monday(), 60, &booked);
        assert_eq!(slots, vec![(t(9, 0), t(10, 0))]);
    }

    #[test]
    fn duration_longer_than_day_yields_nothing() {
        let slots = find_available_slots(&weekly_with_monday(morning()), monday(), 180, &[]);
        assert!(slots.is_empty());
    }

    #[test]
    fn slots_render_as_hours_and_minutes() {
        let rendered = format_slots(&[(t(9, 0), t(9, 45))]);
        assert_eq!(
            rendered,
            vec![Slot {
                start: "09:00".into(),
                end: "09:45".into()
            }]
        );
    }
}
