pub mod adapters;
pub mod api;
pub mod application;
pub mod auth;
pub mod config;
pub mod domain;
pub mod ports;
