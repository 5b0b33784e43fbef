pub mod health;
pub mod menu;
pub mod orders;
pub mod profile;
