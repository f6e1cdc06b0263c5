pub mod runtime;
pub mod ticker;
