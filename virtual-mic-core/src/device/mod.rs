pub mod context;
pub mod endpoint;
