pub mod job;
pub mod roast;
