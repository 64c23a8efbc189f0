pub mod config;
pub mod error;
pub mod format;
pub mod packet;
pub mod state;
pub mod stats;
pub mod status;
