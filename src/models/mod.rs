//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! a las tablas del store de la flota.

pub mod auth;
pub mod backup;
pub mod fuel_log;
pub mod maintenance;
pub mod outcome;
pub mod vehicle;
