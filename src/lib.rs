pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod flows;
pub mod handlers;
pub mod platform;
pub mod signup;
pub mod ui;
pub mod web;
