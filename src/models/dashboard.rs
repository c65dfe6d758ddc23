// src/models/dashboard.rs

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

// 1. Contadores do topo
#[derive(Debug, Default, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingTotals {
    pub total_reservations: i64,
    pub confirmed_reservations: i64,
    pub cancelled_reservations: i64,
    pub confirmed_last_7_days: i64,
    pub confirmed_last_30_days: i64,
    pub confirmed_last_90_days: i64,
}

// 2. Ponto de um gráfico diário
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}

// 3. Séries de adesões (profissionais ou clientes) por janela
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinedSeries {
    pub last_7_days: Vec<DailyCount>,
    pub last_30_days: Vec<DailyCount>,
    pub last_90_days: Vec<DailyCount>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardAnalytics {
    #[serde(flatten)]
    pub bookings: BookingTotals,
    pub total_clients: i64,
    pub total_professionals: i64,
    pub professionals_joined: JoinedSeries,
    pub clients_joined: JoinedSeries,
}
