//! Count the positions of one or more verticals
//!
//! Each file gets its own reader, and the files are scanned in parallel. The
//! scan checks the whole file, so a malformed vertical fails here too.

// argument parsing
#[macro_use]
extern crate clap;
// logging
#[macro_use]
extern crate log;

use rayon::prelude::*;
use std::sync::Arc;
use vertical::cli;
use vertical::errors::*;
use vertical::Corpus;

pub fn main() {
    // Main can't return a Result, and the ? operator needs the enclosing function to return Result
    inner_main().expect("Could not recover. Exiting.");
}
pub fn inner_main() -> Result<()> {
    let args = app_from_crate!()
        .args_from_usage(
            "-p, --profile=[PROFILE] 'built-in corpus profile: basic, syn2015, shuffled-syn2015'
             -f, --fields=[FIELDS] 'comma-separated positional attributes, instead of a profile'
             -v, --verbose... 'increase logging level'
             -q, --quiet... 'decrease logging level'
             <files>... 'verticals to count, plain or gzipped'",
        )
        .get_matches();
    cli::init_logging(args.occurrences_of("verbose"), args.occurrences_of("quiet"));

    let profile = Arc::new(cli::profile_from_args(
        args.value_of("profile"),
        args.value_of("fields"),
    )?);
    let files: Vec<&str> = args.values_of("files").unwrap().collect();
    info!("Counting positions of {} verticals as {:?}", files.len(), profile);

    let counts = files
        .par_iter()
        .map(|file| {
            let corpus = Corpus::new(file, profile.clone())?;
            corpus
                .positions()?
                .try_fold(0u64, |n, position| position.map(|_| n + 1))
        })
        .collect::<Result<Vec<u64>>>()?;

    for (file, count) in files.iter().zip(counts.iter()) {
        println!("{}\t{}", count, file);
    }
    if files.len() > 1 {
        println!("{}\ttotal", counts.iter().sum::<u64>());
    }
    Ok(())
}
