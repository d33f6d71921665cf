pub mod db;
pub mod display;
pub mod sample;
pub mod settings;
pub mod watcher;
