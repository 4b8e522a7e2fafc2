pub mod intake;
pub mod underwriting;
