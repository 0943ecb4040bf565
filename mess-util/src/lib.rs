//! Utilities shared by the sweep runner and the graphs binary

// Modules
pub mod logger;
