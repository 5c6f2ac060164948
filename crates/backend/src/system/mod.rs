pub mod auth;
pub mod handlers;
pub mod sweeper;
pub mod users;
