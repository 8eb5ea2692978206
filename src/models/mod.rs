pub mod activity;
pub mod application;
pub mod interview;
