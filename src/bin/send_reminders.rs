// src/bin/send_reminders.rs
//
// Envia os lembretes das reservas confirmadas de amanhã.
// Pensado para correr uma vez por dia (cron).

use anyhow::Context;
use chrono::{Days, Utc};
use tracing_subscriber::EnvFilter;

use studio_backend::config::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let app_state = AppState::new()
        .await
        .context("Falha ao inicializar o estado da aplicação")?;

    let tomorrow = Utc::now()
        .date_naive()
        .checked_add_days(Days::new(1))
        .context("Data fora do intervalo suportado")?;

    let sent = app_state
        .booking_service
        .send_reminders(tomorrow)
        .await
        .context("Falha ao enviar os lembretes")?;

    tracing::info!("📨 {} lembretes processados para {}", sent, tomorrow);
    Ok(())
}
