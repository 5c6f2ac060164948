pub mod booking;
pub mod chat;
pub mod geo;
pub mod service_listing;
