pub mod common;
pub mod tre;
