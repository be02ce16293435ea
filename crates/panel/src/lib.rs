// Domain-driven module structure for the server panel.

// Core infrastructure
pub mod client;
pub mod conf;
pub mod docker;
pub mod parser;
pub mod state;

// Domain modules
pub mod archive;
pub mod command;
pub mod console;
pub mod health;
pub mod notify;
pub mod runtime;
pub mod source;
