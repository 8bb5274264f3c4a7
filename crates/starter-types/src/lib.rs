//! starter-types: shared values and ports for the starter service

pub mod domain;
pub mod ports;
