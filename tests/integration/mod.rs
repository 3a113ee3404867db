//! Integration tests driving the client facade against a scripted in-process
//! supervisor listening on a real Unix socket.

pub mod helpers;
pub mod items;
pub mod status_query;
