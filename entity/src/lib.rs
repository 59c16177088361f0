//! Persisted record shapes.

pub mod employees;
