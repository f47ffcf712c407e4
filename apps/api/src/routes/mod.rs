//! Route modules, one per resource.

pub mod auth;
pub mod cart;
pub mod categories;
pub mod health;
pub mod orders;
pub mod payments;
pub mod products;
pub mod profile;
pub mod users;
