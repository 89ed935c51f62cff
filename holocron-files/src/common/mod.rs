pub mod iff;
pub mod reader;
pub mod types;
pub mod writer;
