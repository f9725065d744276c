pub mod working_hours;
pub mod availability;
pub mod reservation;
pub mod alternatives;
