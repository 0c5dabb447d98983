// src/lib.rs — Library root for LUMIÈRE

pub mod account;
pub mod cart;
pub mod catalog;
pub mod cli;
pub mod infra;
pub mod navigation;
pub mod provider;
pub mod stylist;
