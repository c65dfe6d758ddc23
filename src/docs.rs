// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::update_me,
        handlers::auth::delete_me,
        handlers::auth::get_my_tenants,

        // --- Tenancy ---
        handlers::tenancy::create_tenant,
        handlers::tenancy::list_my_tenants,

        // --- Team ---
        handlers::team::list_members,
        handlers::team::create_member,
        handlers::team::get_member,
        handlers::team::update_member,
        handlers::team::remove_member,
        handlers::team::approve_member,
        handlers::team::cancel_member,
        handlers::team::get_timeslots,
        handlers::team::update_timeslots,

        // --- Clients ---
        handlers::customers::list_customers,
        handlers::customers::customers_by_professional,
        handlers::customers::create_customer,
        handlers::customers::get_customer,
        handlers::customers::update_customer,
        handlers::customers::delete_customer,

        // --- Catalog ---
        handlers::catalog::list_services,
        handlers::catalog::create_service,
        handlers::catalog::get_service,
        handlers::catalog::update_service,
        handlers::catalog::delete_service,
        handlers::catalog::list_categories,
        handlers::catalog::create_category,
        handlers::catalog::get_category,
        handlers::catalog::update_category,
        handlers::catalog::delete_category,

        // --- Rooms ---
        handlers::rooms::list_rooms,
        handlers::rooms::create_room,
        handlers::rooms::get_room,
        handlers::rooms::update_room,
        handlers::rooms::toggle_room_status,
        handlers::rooms::delete_room,

        // --- Classes ---
        handlers::classes::list_classes,
        handlers::classes::classes_by_professional,
        handlers::classes::create_class,
        handlers::classes::get_class,
        handlers::classes::update_class,
        handlers::classes::toggle_class_status,
        handlers::classes::delete_class,

        // --- Reservations ---
        handlers::bookings::list_bookings,
        handlers::bookings::filter_bookings,
        handlers::bookings::available_slots,
        handlers::bookings::get_booking,
        handlers::bookings::create_booking,
        handlers::bookings::update_booking,
        handlers::bookings::delete_booking,
        handlers::bookings::approve_booking,
        handlers::bookings::reject_booking,

        // --- Subscriptions ---
        handlers::subscriptions::list_packs,
        handlers::subscriptions::get_pack,
        handlers::subscriptions::create_pack,
        handlers::subscriptions::update_pack,
        handlers::subscriptions::delete_pack,
        handlers::subscriptions::subscribe,
        handlers::subscriptions::list_orders,
        handlers::subscriptions::get_order,
        handlers::subscriptions::check_mbway_status,

        // --- Payment callbacks ---
        handlers::subscriptions::ifthenpay_callback_get,
        handlers::subscriptions::ifthenpay_callback_post,
        handlers::subscriptions::creditcard_success_get,
        handlers::subscriptions::creditcard_error_get,
        handlers::subscriptions::creditcard_cancel_get,

        // --- Dashboard ---
        handlers::dashboard::get_analytics,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::UpdateProfilePayload,

            // --- Tenancy ---
            models::tenancy::Tenant,
            models::tenancy::Membership,
            models::tenancy::UserTenant,
            handlers::tenancy::CreateTenantPayload,

            // --- Team ---
            models::team::TeamMember,
            models::team::TeamMemberDetail,
            models::team::MembershipFields,
            models::team::CreateMemberPayload,
            models::team::UpdateMemberPayload,
            models::availability::DaySchedule,
            models::availability::WeeklyAvailability,

            // --- Clients ---
            models::customer::Customer,
            models::customer::CustomerDetail,
            models::customer::CreateCustomerPayload,
            models::customer::UpdateCustomerPayload,

            // --- Catalog ---
            models::catalog::Category,
            models::catalog::CategoryDetail,
            models::catalog::CategoryPayload,
            models::catalog::Service,
            models::catalog::ServiceDetail,
            models::catalog::CreateServicePayload,
            models::catalog::UpdateServicePayload,

            // --- Rooms / Classes ---
            models::room::Room,
            models::room::ResourceActions,
            models::room::RoomView,
            models::room::CreateRoomPayload,
            models::room::UpdateRoomPayload,
            models::class::Class,
            models::class::ClassDetail,
            models::class::CreateClassPayload,
            models::class::UpdateClassPayload,

            // --- Reservations ---
            models::booking::BookingState,
            models::booking::Booking,
            models::booking::PersonSummary,
            models::booking::ClassSummary,
            models::booking::BookingDetail,
            models::booking::CreateBookingPayload,
            models::booking::UpdateBookingPayload,
            models::booking::Slot,
            models::booking::AvailableSlots,

            // --- Subscriptions ---
            models::subscription::Pack,
            models::subscription::CreatePackPayload,
            models::subscription::UpdatePackPayload,
            models::subscription::PaymentMethod,
            models::subscription::PaymentStatus,
            models::subscription::Order,
            models::subscription::SubscriptionHistory,
            models::subscription::SubscribePayload,
            models::subscription::SubscribeResponse,
            models::subscription::MbwayStatusResponse,

            // --- Dashboard ---
            models::dashboard::BookingTotals,
            models::dashboard::DailyCount,
            models::dashboard::JoinedSeries,
            models::dashboard::DashboardAnalytics,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário e Perfil"),
        (name = "Tenancy", description = "Gestão de Estabelecimentos e Acesso"),
        (name = "Team", description = "Equipa: admins, profissionais e disponibilidade"),
        (name = "Clients", description = "Clientes do estabelecimento"),
        (name = "Catalog", description = "Serviços e Categorias"),
        (name = "Rooms", description = "Salas"),
        (name = "Classes", description = "Aulas de grupo"),
        (name = "Reservations", description = "Reservas, calendário e horários livres"),
        (name = "Subscriptions", description = "Pacotes de horas e encomendas"),
        (name = "Payment callbacks", description = "Retornos públicos do IfThenPay"),
        (name = "Dashboard", description = "Indicadores do estabelecimento"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_booking_and_payment_routes() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        assert!(paths.contains_key("/api/reservations/available_slots"));
        assert!(paths.contains_key("/api/subscriptions/callback/ifthenpay"));
        assert!(paths.contains_key("/api/dashboard/analytics"));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
    }
}
