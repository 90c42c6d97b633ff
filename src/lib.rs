pub mod config;
pub mod db;
pub mod error;
pub mod i18n;
pub mod mail;
pub mod routes;
pub mod service;
pub mod translation;
