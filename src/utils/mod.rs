pub mod handler;
pub mod response;
pub mod table;
pub mod validation;
