pub mod app;
pub mod audio;
pub mod clipboard;
pub mod config;
pub mod contact;
pub mod content;
pub mod logging;
pub mod model;
pub mod player;
pub mod projects;
pub mod relay;
pub mod storage;
pub mod theme;
pub mod ui;
