pub mod auth;
pub mod bookings;
pub mod catalog;
pub mod classes;
pub mod customers;
pub mod dashboard;
pub mod rooms;
pub mod subscriptions;
pub mod team;
pub mod tenancy;
