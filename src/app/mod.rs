//! The session layer a front-end drives: shared state, commands, background
//! tasks and the events they emit.

pub mod commands;
pub mod events;
pub mod helpers;
pub mod proxy;
pub mod state;
pub mod tasks;
pub mod view_model;
