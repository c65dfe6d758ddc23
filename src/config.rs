// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        BookingRepository, CatalogRepository, ClassRepository, CustomerRepository,
        DashboardRepository, RoomRepository, SubscriptionRepository, TeamRepository,
        TenantRepository, UserRepository,
    },
    services::{
        auth::AuthService,
        booking_service::BookingService,
        catalog_service::CatalogService,
        class_service::ClassService,
        customer_service::CustomerService,
        dashboard_service::DashboardService,
        ifthenpay::IfThenPayClient,
        notification::{LogNotifier, SharedNotifier},
        room_service::RoomService,
        subscription_service::SubscriptionService,
        team_service::TeamService,
        tenancy_service::TenantService,
    },
};

// Credenciais e modo do gateway IfThenPay
#[derive(Debug, Clone)]
pub struct IfThenPayConfig {
    pub mb_key: Option<String>,
    pub mbway_key: Option<String>,
    pub ccard_key: Option<String>,
    pub sandbox: bool,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub database_max_connections: u32,
    /// URL pública desta API, usada nos retornos do cartão de crédito
    pub public_base_url: String,
    /// Para onde as páginas de retorno do pagamento mandam o utilizador
    pub frontend_url: String,
    pub ifthenpay: IfThenPayConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        // Variáveis vazias contam como ausentes
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or_default = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let database_url = get("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = get("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let database_max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(v) => v
                .parse()
                .with_context(|| format!("DATABASE_MAX_CONNECTIONS inválido: {}", v))?,
            None => 5,
        };

        let sandbox = get("IFTHENPAY_SANDBOX_MODE")
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(true);

        Ok(Self {
            database_url,
            jwt_secret,
            server_addr: or_default("SERVER_ADDR", "0.0.0.0:3000"),
            database_max_connections,
            public_base_url: or_default("PUBLIC_BASE_URL", "http://localhost:3000"),
            frontend_url: or_default("FRONTEND_URL", "/"),
            ifthenpay: IfThenPayConfig {
                mb_key: get("IFTHENPAY_MB_KEY"),
                mbway_key: get("IFTHENPAY_MBWAY_KEY"),
                ccard_key: get("IFTHENPAY_CCARD_KEY"),
                sandbox,
                base_url: or_default("IFTHENPAY_BASE_URL", "https://api.ifthenpay.com"),
            },
        })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub notifier: SharedNotifier,
    pub auth_service: AuthService,
    pub tenant_service: TenantService,
    pub team_service: TeamService,
    pub customer_service: CustomerService,
    pub catalog_service: CatalogService,
    pub room_service: RoomService,
    pub class_service: ClassService,
    pub booking_service: BookingService,
    pub subscription_service: SubscriptionService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = Config::from_env()?;

        let db_pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Self::from_pool(db_pool, config)
    }

    /// Monta o gráfico de dependências sobre um pool já criado.
    pub fn from_pool(db_pool: PgPool, config: Config) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        let notifier: SharedNotifier = Arc::new(LogNotifier);

        // --- Repositórios ---
        let user_repo = UserRepository::new(db_pool.clone());
        let tenant_repo = TenantRepository::new(db_pool.clone());
        let team_repo = TeamRepository::new(db_pool.clone());
        let customer_repo = CustomerRepository::new(db_pool.clone());
        let catalog_repo = CatalogRepository::new(db_pool.clone());
        let room_repo = RoomRepository::new(db_pool.clone());
        let class_repo = ClassRepository::new(db_pool.clone());
        let booking_repo = BookingRepository::new(db_pool.clone());
        let subscription_repo = SubscriptionRepository::new(db_pool.clone());

        // --- Serviços ---
        let auth_service = AuthService::new(
            user_repo.clone(),
            config.jwt_secret.clone(),
            db_pool.clone(),
        );
        let tenant_service = TenantService::new(tenant_repo.clone(), db_pool.clone());
        let team_service = TeamService::new(
            team_repo.clone(),
            user_repo.clone(),
            tenant_repo,
            db_pool.clone(),
        );
        let customer_service =
            CustomerService::new(customer_repo.clone(), team_repo.clone(), db_pool.clone());
        let catalog_service =
            CatalogService::new(catalog_repo.clone(), team_repo.clone(), db_pool.clone());
        let room_service = RoomService::new(room_repo);
        let class_service = ClassService::new(
            class_repo.clone(),
            customer_repo.clone(),
            team_repo.clone(),
            db_pool.clone(),
        );
        let booking_service = BookingService::new(
            booking_repo,
            team_repo.clone(),
            customer_repo,
            class_repo,
            catalog_repo,
            db_pool.clone(),
            notifier.clone(),
        );
        let gateway = IfThenPayClient::new(config.ifthenpay.clone())?;
        let subscription_service = SubscriptionService::new(
            subscription_repo,
            team_repo,
            user_repo,
            gateway,
            db_pool.clone(),
            notifier.clone(),
            config.clone(),
        );
        let dashboard_service = DashboardService::new(DashboardRepository::new(), db_pool.clone());

        Ok(Self {
            db_pool,
            config,
            notifier,
            auth_service,
            tenant_service,
            team_service,
            customer_service,
            catalog_service,
            room_service,
            class_service,
            booking_service,
            subscription_service,
            dashboard_service,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_vars_are_missing() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/studio"),
            ("JWT_SECRET", "segredo"),
        ]))
        .unwrap();

        assert_eq!(config.server_addr, "0.0.0.0:3000");
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.frontend_url, "/");
        assert!(config.ifthenpay.sandbox);
        assert_eq!(config.ifthenpay.base_url, "https://api.ifthenpay.com");
        assert_eq!(config.ifthenpay.mbway_key, None);
    }

    #[test]
    fn missing_required_var_fails() {
        let result = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://x")]));
        assert!(result.is_err());
    }

    #[test]
    fn sandbox_can_be_disabled_and_empty_keys_are_ignored() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("IFTHENPAY_SANDBOX_MODE", "False"),
            ("IFTHENPAY_MB_KEY", ""),
            ("IFTHENPAY_CCARD_KEY", "CC-1"),
        ]))
        .unwrap();

        assert!(!config.ifthenpay.sandbox);
        assert_eq!(config.ifthenpay.mb_key, None);
        assert_eq!(config.ifthenpay.ccard_key.as_deref(), Some("CC-1"));
    }
}
