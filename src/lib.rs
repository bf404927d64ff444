pub mod build;
pub mod config;
pub mod error;
pub mod inspect;
pub mod preamble;
pub mod process;
pub mod resolve;
pub mod rewrite;
pub mod syntax;
