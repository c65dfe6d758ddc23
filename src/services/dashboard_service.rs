// src/services/dashboard_service.rs

use std::collections::HashMap;

use chrono::{Days, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::DashboardRepository,
    models::dashboard::{DailyCount, DashboardAnalytics, JoinedSeries},
};

const WINDOWS: [u64; 3] = [7, 30, 90];

/// Série diária de `days` dias terminando em `today`, com zeros nos dias sem registo.
pub fn zero_fill(counts: &[(NaiveDate, i64)], today: NaiveDate, days: u64) -> Vec<DailyCount> {
    let by_day: HashMap<NaiveDate, i64> = counts.iter().copied().collect();

    (0..days)
        .rev()
        .filter_map(|offset| today.checked_sub_days(Days::new(offset)))
        .map(|date| DailyCount {
            date,
            count: by_day.get(&date).copied().unwrap_or(0),
        })
        .collect()
}

/// Cortes das reservas confirmadas: hoje menos 7, 30 e 90 dias, sem limite superior.
pub fn confirmed_cutoffs(today: NaiveDate) -> [NaiveDate; 3] {
    WINDOWS.map(|days| today.checked_sub_days(Days::new(days)).unwrap_or(today))
}

/// As três janelas (7/30/90) a partir das contagens dos últimos 90 dias.
pub fn joined_series(counts: &[(NaiveDate, i64)], today: NaiveDate) -> JoinedSeries {
    let [week, month, quarter] = WINDOWS;
    JoinedSeries {
        last_7_days: zero_fill(counts, today, week),
        last_30_days: zero_fill(counts, today, month),
        last_90_days: zero_fill(counts, today, quarter),
    }
}

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    pool: PgPool,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn analytics(&self, tenant_id: Uuid) -> Result<DashboardAnalytics, AppError> {
        let today = Utc::now().date_naive();
        let since = today
            .checked_sub_days(Days::new(WINDOWS[2] - 1))
            .unwrap_or(today);

        let (bookings, total_clients, total_professionals) =
            self.repo
                .get_totals(&self.pool, tenant_id, confirmed_cutoffs(today))
                .await?;

        let professionals = self
            .repo
            .professionals_joined_since(&self.pool, tenant_id, since)
            .await?;
        let clients = self
            .repo
            .clients_joined_since(&self.pool, tenant_id, since)
            .await?;

        Ok(DashboardAnalytics {
            bookings,
            total_clients,
            total_professionals,
            professionals_joined: joined_series(&professionals, today),
            clients_joined: joined_series(&clients, today),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn missing_days_are_zero_and_oldest_first() {
        let today = d(2025, 6, 10);
        let series = zero_fill(&[(d(2025, 6, 8), 2), (d(2025, 6, 10), 1)], today, 7);

        assert_eq!(series.len(), 7);
        assert_eq!(series[0].date, d(2025, 6, 4));
        assert_eq!(series[6].date, today);
        let counts: Vec<i64> = series.iter().map(|p| p.count).collect();
        assert_eq!(counts, vec![0, 0, 0, 0, 2, 0, 1]);
    }

    #[test]
    fn counts_outside_window_are_ignored() {
        let today = d(2025, 6, 10);
        let series = zero_fill(&[(d(2025, 5, 1), 5)], today, 7);
        assert!(series.iter().all(|p| p.count == 0));
    }

    #[test]
    fn confirmed_windows_start_full_days_back() {
        let [week, month, quarter] = confirmed_cutoffs(d(2025, 6, 10));
        assert_eq!(week, d(2025, 6, 3));
        assert_eq!(month, d(2025, 5, 11));
        assert_eq!(quarter, d(2025, 3, 12));
    }

    #[test]
    fn windows_have_expected_lengths() {
        let series = joined_series(&[], d(2025, 3, 1));
        assert_eq!(series.last_7_days.len(), 7);
        assert_eq!(series.last_30_days.len(), 30);
        assert_eq!(series.last_90_days.len(), 90);
        assert_eq!(series.last_30_days[0].date, d(2025, 1, 31));
    }
}
