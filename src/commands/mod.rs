pub mod handle_command;
pub mod keygen_command;
pub mod sign_command;

pub use self::{handle_command::*, keygen_command::*, sign_command::*};
