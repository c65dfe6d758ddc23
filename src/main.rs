//src/main.rs

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use studio_backend::{build_router, config::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG manda; sem ele, info
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .context("Falha ao inicializar o estado da aplicação")?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados")?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let addr = app_state.config.server_addr.clone();
    let app = build_router(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Falha ao iniciar o listener TCP em {}", addr))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    tracing::info!("📚 Documentação em http://{}/swagger-ui", addr);

    axum::serve(listener, app).await.context("Erro no servidor Axum")?;
    Ok(())
}
