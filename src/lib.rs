#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod dump;
pub mod engine;
pub mod input;
pub mod layout;
pub mod measure;
pub mod reflow;
pub mod tree;

#[cfg(feature = "cli")]
pub use cli::run;
