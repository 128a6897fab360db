pub mod config;
pub mod constants;
pub mod controller;
pub mod env;
pub mod geo;
pub mod map;
pub mod paths;
pub mod viewport;
