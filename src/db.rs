pub mod booking_repo;
pub use booking_repo::BookingRepository;
pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod class_repo;
pub use class_repo::ClassRepository;
pub mod customer_repo;
pub use customer_repo::CustomerRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
pub mod room_repo;
pub use room_repo::RoomRepository;
pub mod subscription_repo;
pub use subscription_repo::SubscriptionRepository;
pub mod team_repo;
pub use team_repo::TeamRepository;
pub mod tenancy_repo;
pub use tenancy_repo::TenantRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
