//! Utilities shared by the Parlor packages.

pub mod logger;
pub mod time;
