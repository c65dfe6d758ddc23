// src/lib.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::auth::{auth_guard, tenant_guard};

/// Monta todas as rotas da API sobre o estado já construído.
pub fn build_router(app_state: AppState) -> Router {
    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Rotas de usuário (só login)
    let user_routes = Router::new()
        .route(
            "/me",
            get(handlers::auth::get_me)
                .put(handlers::auth::update_me)
                .delete(handlers::auth::delete_me),
        )
        .route("/me/tenants", get(handlers::auth::get_my_tenants))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let tenancy_routes = Router::new()
        .route(
            "/",
            post(handlers::tenancy::create_tenant).get(handlers::tenancy::list_my_tenants),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // --- Rotas de um estabelecimento (x-tenant-id) ---
    let team_routes = Router::new()
        .route(
            "/",
            get(handlers::team::list_members).post(handlers::team::create_member),
        )
        .route(
            "/{user_id}",
            get(handlers::team::get_member)
                .put(handlers::team::update_member)
                .delete(handlers::team::remove_member),
        )
        .route("/{user_id}/approve", post(handlers::team::approve_member))
        .route("/{user_id}/cancel", post(handlers::team::cancel_member))
        .route(
            "/{user_id}/timeslots",
            get(handlers::team::get_timeslots).put(handlers::team::update_timeslots),
        );

    let customer_routes = Router::new()
        .route(
            "/",
            get(handlers::customers::list_customers).post(handlers::customers::create_customer),
        )
        .route(
            "/by_professional",
            get(handlers::customers::customers_by_professional),
        )
        .route(
            "/{id}",
            get(handlers::customers::get_customer)
                .put(handlers::customers::update_customer)
                .delete(handlers::customers::delete_customer),
        );

    let service_routes = Router::new()
        .route(
            "/",
            get(handlers::catalog::list_services).post(handlers::catalog::create_service),
        )
        .route(
            "/{id}",
            get(handlers::catalog::get_service)
                .put(handlers::catalog::update_service)
                .delete(handlers::catalog::delete_service),
        );

    let category_routes = Router::new()
        .route(
            "/",
            get(handlers::catalog::list_categories).post(handlers::catalog::create_category),
        )
        .route(
            "/{id}",
            get(handlers::catalog::get_category)
                .put(handlers::catalog::update_category)
                .delete(handlers::catalog::delete_category),
        );

    let room_routes = Router::new()
        .route(
            "/",
            get(handlers::rooms::list_rooms).post(handlers::rooms::create_room),
        )
        .route(
            "/{id}",
            get(handlers::rooms::get_room)
                .put(handlers::rooms::update_room)
                .delete(handlers::rooms::delete_room),
        )
        .route("/{id}/toggle_status", post(handlers::rooms::toggle_room_status));

    let class_routes = Router::new()
        .route(
            "/",
            get(handlers::classes::list_classes).post(handlers::classes::create_class),
        )
        .route(
            "/by_professional",
            get(handlers::classes::classes_by_professional),
        )
        .route(
            "/{id}",
            get(handlers::classes::get_class)
                .put(handlers::classes::update_class)
                .delete(handlers::classes::delete_class),
        )
        .route("/{id}/toggle_status", post(handlers::classes::toggle_class_status));

    let booking_routes = Router::new()
        .route(
            "/",
            get(handlers::bookings::list_bookings).post(handlers::bookings::create_booking),
        )
        .route(
            "/filter_reservations",
            get(handlers::bookings::filter_bookings),
        )
        .route("/available_slots", get(handlers::bookings::available_slots))
        .route(
            "/{id}",
            get(handlers::bookings::get_booking)
                .put(handlers::bookings::update_booking)
                .delete(handlers::bookings::delete_booking),
        )
        .route("/{id}/approve", post(handlers::bookings::approve_booking))
        .route("/{id}/reject", post(handlers::bookings::reject_booking));

    let subscription_routes = Router::new()
        .route(
            "/packs",
            get(handlers::subscriptions::list_packs).post(handlers::subscriptions::create_pack),
        )
        .route(
            "/packs/{id}",
            get(handlers::subscriptions::get_pack)
                .put(handlers::subscriptions::update_pack)
                .delete(handlers::subscriptions::delete_pack),
        )
        .route("/subscribe", post(handlers::subscriptions::subscribe))
        .route("/orders", get(handlers::subscriptions::list_orders))
        .route("/orders/{id}", get(handlers::subscriptions::get_order))
        .route(
            "/orders/{id}/mbway_status",
            get(handlers::subscriptions::check_mbway_status),
        );

    let dashboard_routes =
        Router::new().route("/analytics", get(handlers::dashboard::get_analytics));

    // Aplica o middleware de Auth + Tenancy em tudo
    let tenant_routes = Router::new()
        .nest("/team", team_routes)
        .nest("/clients", customer_routes)
        .nest("/services", service_routes)
        .nest("/categories", category_routes)
        .nest("/rooms", room_routes)
        .nest("/classes", class_routes)
        .nest("/reservations", booking_routes)
        .nest("/subscriptions", subscription_routes)
        .nest("/dashboard", dashboard_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            tenant_guard,
        ));

    // Retornos do IfThenPay: sem autenticação, GET ou POST
    let callback_routes = Router::new()
        .route(
            "/ifthenpay",
            get(handlers::subscriptions::ifthenpay_callback_get)
                .post(handlers::subscriptions::ifthenpay_callback_post),
        )
        .route(
            "/creditcard/success",
            get(handlers::subscriptions::creditcard_success_get)
                .post(handlers::subscriptions::creditcard_success_post),
        )
        .route(
            "/creditcard/error",
            get(handlers::subscriptions::creditcard_error_get)
                .post(handlers::subscriptions::creditcard_error_post),
        )
        .route(
            "/creditcard/cancel",
            get(handlers::subscriptions::creditcard_cancel_get)
                .post(handlers::subscriptions::creditcard_cancel_post),
        );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/tenants", tenancy_routes)
        .nest("/api/subscriptions/callback", callback_routes)
        .nest("/api", tenant_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}
