pub mod produce;
pub mod queries;
