pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod mentions;
pub mod plugins;
pub mod seed;
pub mod services;
pub mod storage;
pub mod utils;
