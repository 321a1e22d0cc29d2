pub mod pdf_controller;

pub use pdf_controller::configure;
