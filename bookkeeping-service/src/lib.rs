//! Bookkeeping Service - Double-entry ledger, invoicing, and financial reports.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;
