pub mod greeting;
pub mod transfer;
