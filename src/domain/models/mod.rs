pub mod resource;
pub mod service_offering;
pub mod booking;
pub mod selection;
