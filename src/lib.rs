//! Till
//!
//! Till is a point-of-sale dashboard client: product catalog management, a cart and checkout
//! flow, sales history and dashboard statistics, all backed by a remote HTTP API.

pub mod app;
pub mod backend;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod notifications;
pub mod observability;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod reporting;
pub mod sales;
pub mod views;
