// Domain layer - Plain data types and their invariants
pub mod history;
pub mod service;
pub mod snapshot;
pub mod telemetry;
