// Public entities for the HealthJournal API
// Analysis inputs and reports come from the domain crate; only the error body lives here

pub mod common;
