pub mod agent;
pub mod bookings;
pub mod services;
