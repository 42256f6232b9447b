// HealthJournal Domain
// This crate contains the blood pressure analysis engine for the HealthJournal application

// Analysis configuration
pub mod config;

// Services that implement business logic
pub mod services;

// Domain entities
pub mod entities;

// Health checks and system status
pub mod health;

// Testing utilities - only available with mock feature
#[cfg(feature = "mock")]
pub mod testing;
