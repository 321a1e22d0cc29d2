pub mod customers;
pub mod health;
pub mod pdf;
pub mod quotations;
