//! Describe Command
//!
//! Prints the canned description an attachment would contribute.
//!
//! Usage:
//!   dxassist describe chest-xray-01.jpg image/jpeg

use crate::cli::ui::Output;
use crate::imaging::{self, Attachment};
use crate::types::Result;

pub fn run(file_name: &str, mime_type: &str) -> Result<()> {
    let output = Output::new();
    let attachment = Attachment::new(file_name, mime_type);

    if !attachment.is_accepted() {
        output.warning(&format!(
            "{} is not an accepted attachment and would be left out of the prompt",
            attachment
        ));
    }
    println!("{}", imaging::describe(file_name, mime_type));
    Ok(())
}
