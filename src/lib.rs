// src/lib.rs

//! Forum Client Library

pub mod content;
pub mod dom;
pub mod error;
pub mod models;
pub mod pages;
pub mod services;
pub mod storage;
pub mod utils;
pub mod views;
