pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod state;
pub mod views;
