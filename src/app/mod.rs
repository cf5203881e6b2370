//! Application orchestration: terminal host for the story engine, event
//! loop plumbing and input handling.

pub mod camera;
pub mod document;
pub mod event;
pub mod handler;
pub mod map_runtime;
pub mod map_view;
pub mod settings;
pub mod state;
