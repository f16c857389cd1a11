//! Middleware del sistema
//! 
//! CORS para el dashboard.

pub mod cors;

pub use cors::*;
