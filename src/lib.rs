pub mod client;
pub mod config;
pub mod controller;
pub mod derive;
pub mod http_client;
pub mod normalize;
pub mod observer;
pub mod provider;
pub mod record;
pub mod resources;
pub mod state;
pub mod views;
