mod customer;

pub use customer::{Customer, CustomerRequest};
