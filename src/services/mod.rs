pub mod auth;
pub mod queue;
