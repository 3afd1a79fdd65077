pub mod about;
pub mod command;
pub mod error;
pub mod host;
pub mod models;
pub mod panel;
pub mod script;
pub mod tm_database;
