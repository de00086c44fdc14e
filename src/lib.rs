pub mod cli;
pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod host;
pub mod state_machine;
pub mod storage;
pub mod wakeup;
