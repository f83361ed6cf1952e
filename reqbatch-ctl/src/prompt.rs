//! Interactive requisition group menu.

use std::io::{self, BufRead, Write};

use reqbatch_shared::models::{GroupSelection, EXIT_OPTION, REQUISITION_GROUPS};

/// Show the group menu until the operator picks a valid option.
///
/// End of input counts as choosing to exit.
pub(crate) fn select_group<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> io::Result<GroupSelection> {
    loop {
        writeln!(output, "Select the requisition group:")?;
        for group in &REQUISITION_GROUPS {
            writeln!(output, "  {}) {}", group.option, group)?;
        }
        writeln!(output, "  {EXIT_OPTION}) Exit")?;
        write!(output, "> ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(GroupSelection::Exit);
        }
        match GroupSelection::from_option(&line) {
            Some(selection) => return Ok(selection),
            None => writeln!(output, "Invalid option '{}', try again.", line.trim())?,
        }
    }
}
