// Customers module

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Customer, CustomerRequest};
pub use repositories::{CustomerRepository, MySqlCustomerRepository};
pub use services::CustomerService;
