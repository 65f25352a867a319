mod client;
mod token;

pub use client::*;
pub use token::*;
