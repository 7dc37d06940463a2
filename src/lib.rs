pub mod aggregate;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod report;
pub mod resolve;
pub mod util;
