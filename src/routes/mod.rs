pub mod admin;
pub mod applications;
pub mod health;
pub mod interviews;
