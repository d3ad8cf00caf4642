mod config;
mod token;

pub use config::*;
pub use token::*;
