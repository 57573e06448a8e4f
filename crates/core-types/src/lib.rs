pub mod entities;
pub mod person;

// Re-export the core types to provide a clean public API.
pub use entities::{Category, City, Country, Customer, Employee, Product, Sale};
pub use person::PersonName;
