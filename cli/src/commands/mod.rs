pub mod create;
pub mod estimate;
