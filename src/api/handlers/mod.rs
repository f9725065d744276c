pub mod health;
pub mod availability;
pub mod selection;
pub mod reservation;
pub mod booking;
