pub mod auth;
pub mod availability;
pub mod booking;
pub mod catalog;
pub mod class;
pub mod customer;
pub mod dashboard;
pub mod room;
pub mod subscription;
pub mod team;
pub mod tenancy;
