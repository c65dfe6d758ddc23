pub mod auth;
pub mod availability;
pub mod booking_service;
pub mod catalog_service;
pub mod class_service;
pub mod customer_service;
pub mod dashboard_service;
pub mod ifthenpay;
pub mod notification;
pub mod room_service;
pub mod subscription_service;
pub mod team_service;
pub mod tenancy_service;
