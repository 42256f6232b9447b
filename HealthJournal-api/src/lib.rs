// HealthJournal-api lib.rs
//
// HTTP surface for the analysis engine: routes, handlers, error bodies and
// the OpenAPI document.

pub mod api;
pub mod entities;
pub mod openapi;
