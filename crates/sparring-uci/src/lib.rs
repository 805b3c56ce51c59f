//! UCI protocol front end for sparring.

pub mod command;
pub mod engine;
pub mod error;

pub use command::{GoParams, UciOption};
pub use engine::UciEngine;
pub use error::UciError;
