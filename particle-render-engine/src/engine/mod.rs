pub mod assets;
pub mod camera;
pub mod config;
pub mod core;
pub mod data;
pub mod error;
pub mod loading;
pub mod particles;
pub mod render;
