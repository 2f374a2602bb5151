// ABOUTME: Library surface of gt: SSH config resolution, transfer classification and launching
// ABOUTME: The binary in main.rs wires these modules to the command line

pub mod app;
pub mod cli;
pub mod config;
pub mod listing;
pub mod ssh;
