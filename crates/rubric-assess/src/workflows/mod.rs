pub mod assessment;
pub mod scoresheet;
