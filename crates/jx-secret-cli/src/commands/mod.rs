//! CLI commands

pub mod postrender;
