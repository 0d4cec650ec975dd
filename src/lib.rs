pub mod cli;
pub mod commands;
pub mod exec;
pub mod report;
pub mod utils;
