pub mod connect;
pub mod info;
pub mod swap;
