//! Windowgate - Sliding-Window-Log Admission Control
//!
//! This crate implements an admission-control decision engine for request
//! pipelines. For each inbound request it decides, from the recent request
//! history of a derived client key, whether the request may proceed or must
//! be rejected as rate-limit-exceeded. The window is a log of individual
//! request timestamps held in an ordered time-series store, giving exact
//! sliding-window semantics rather than fixed-bucket approximations.

pub mod clock;
pub mod config;
pub mod error;
pub mod ratelimit;
pub mod store;
