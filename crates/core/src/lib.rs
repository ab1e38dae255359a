pub mod analysis;
pub mod application;
pub mod domain;
pub mod enrich;
pub mod error;
pub mod parser;
pub mod ports;
pub mod timestamp;
