//! Proctrack - a process tracking server that logs a timestamp for every live process on a fixed period.

// ============================================================================
// Core Infrastructure
// ============================================================================

pub mod build_info;
pub mod config;
pub mod store;

// ============================================================================
// Server & HTTP
// ============================================================================

pub mod api;
pub mod handlers;
pub mod server;

// ============================================================================
// Domain
// ============================================================================

pub mod process;
pub mod scheduler;
