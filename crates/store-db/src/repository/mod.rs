//! # Repository Module
//!
//! One repository per aggregate. Each repository owns a clone of the
//! connection pool and exposes async methods returning `DbResult` (plain
//! persistence) or `StoreResult` (operations that also enforce business
//! rules, like checkout and settlement).

pub mod cart;
pub mod category;
pub mod order;
pub mod payment;
pub mod product;
pub mod user;
