// Application layer - Feed simulation use cases
pub mod feed_runtime;
pub mod feed_simulator;
pub mod sample_generator;
