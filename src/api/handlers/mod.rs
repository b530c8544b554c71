pub mod health;
pub mod pictures;
