//! Agregaciones del dashboard y del scorecard
//!
//! Funciones puras sobre el snapshot en memoria. No hacen I/O.

pub mod dashboard;
pub mod scorecard;

pub use dashboard::*;
pub use scorecard::*;
