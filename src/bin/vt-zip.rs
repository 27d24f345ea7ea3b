//! Zip verticals together
//!
//! Intended for "zipping" together verticals of the same corpus, e.g. one with
//! tags and one with lemmas. Structures and the first positional attribute
//! (which is included only once) are taken from the first vertical provided.

// argument parsing
#[macro_use]
extern crate clap;
// logging
#[macro_use]
extern crate log;

use std::io::{self, Write};
use vertical::cli;
use vertical::errors::*;
use vertical::zip::zip_verticals;

pub fn main() {
    // Main can't return a Result, and the ? operator needs the enclosing function to return Result
    inner_main().expect("Could not recover. Exiting.");
}
pub fn inner_main() -> Result<()> {
    let args = app_from_crate!()
        .args_from_usage(
            "-v, --verbose... 'increase logging level'
             -q, --quiet... 'decrease logging level'
             [files]... 'verticals to zip, plain or gzipped; stdin if none or -'",
        )
        .get_matches();
    cli::init_logging(args.occurrences_of("verbose"), args.occurrences_of("quiet"));

    let files = cli::files_or_stdin(args.values_of("files"));
    info!("Zipping the following vertical files: {:?}", files);
    let inputs = files
        .iter()
        .map(|&file| cli::open_or_stdin(file))
        .collect::<Result<Vec<_>>>()?;

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let lines = zip_verticals(inputs, &mut out)?;
    out.flush()?;
    info!("Done, {} lines.", lines);
    Ok(())
}
