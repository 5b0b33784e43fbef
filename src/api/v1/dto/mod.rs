pub mod orders;
pub mod profile;
