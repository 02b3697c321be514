pub mod health;
pub mod purchase;
pub mod resources;
