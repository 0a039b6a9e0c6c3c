pub mod auth;
pub mod calendar;
pub mod config;
pub mod crypto;
pub mod error;
pub mod models;
pub mod routes;
pub mod service;
pub mod store;
pub mod tags;
pub mod timestamp;
pub mod validation;
pub mod view;
