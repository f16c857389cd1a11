//! Driver Safety - administración de seguridad de flota
//!
//! API REST (axum + sqlx), store del cliente, agregaciones del dashboard
//! y view-models de las pantallas de administración.

pub mod analysis;
pub mod client;
pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod server;
pub mod state;
pub mod store;
pub mod utils;
pub mod views;
