mod meta;
mod util;

pub use meta::{CallLabel, Inheritance, MutationNature, TredMeta, TredRepo};
pub use util::{handle_error_and_exit, Result};
