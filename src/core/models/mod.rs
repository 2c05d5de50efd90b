pub mod outcome;
pub mod usage;
