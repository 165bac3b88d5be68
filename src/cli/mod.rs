pub mod commands;
pub mod ui;
pub mod util;

pub use util::{CommandContext, load_case, load_submission, read_credential};
