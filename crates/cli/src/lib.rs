//! rolecheck CLI internals

pub mod commands;
pub mod interactive;
