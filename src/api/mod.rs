pub mod router;
pub mod handlers;
pub mod dtos;
