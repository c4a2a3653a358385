//! Terminal front end: player, story checker and logging

pub mod check;
pub mod logger;
pub mod play;
