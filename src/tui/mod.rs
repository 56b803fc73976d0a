//! Terminal front end: audio capture, the live view and the headless path writer

pub mod app;
pub mod audio;
pub mod cli;
pub mod error;
pub mod state;
pub mod ui;
