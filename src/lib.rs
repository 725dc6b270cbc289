pub mod app;
pub mod constants;
pub mod errors;
pub mod falcon;
pub mod managers;
pub mod mcp;
pub mod services;
pub mod utils;
