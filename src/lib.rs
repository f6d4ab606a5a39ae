pub mod common;
pub mod config;
pub mod routes;

pub mod operators;
pub mod readings;
pub mod stations;

#[cfg(test)]
pub mod test_helpers;
