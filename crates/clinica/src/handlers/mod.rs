pub mod admin;
pub mod consultas;
pub mod error;
pub mod health;

pub use error::AppError;
