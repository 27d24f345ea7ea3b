//! `wc -c` on steroids
//!
//! Count extended grapheme clusters and print their frequency distribution:
//! count, cluster, and its code points.

// argument parsing
#[macro_use]
extern crate clap;
// logging
#[macro_use]
extern crate log;

use std::io::BufRead;
use vertical::cli;
use vertical::errors::*;
use vertical::farm::new_farm;
use vertical::graphemes::{
    code_points, count_graphemes, denormalized, most_common, printable, NormalizationForm,
};

pub fn main() {
    // Main can't return a Result, and the ? operator needs the enclosing function to return Result
    inner_main().expect("Could not recover. Exiting.");
}
pub fn inner_main() -> Result<()> {
    let args = app_from_crate!()
        .args_from_usage(
            "--expected-normalization=[FORM] 'warn about clusters not in this form: NFC, NFD, NFKC or NFKD'
             --lower 'convert to lowercase before counting'
             -v, --verbose... 'increase logging level'
             -q, --quiet... 'decrease logging level'
             [files]... 'files to process; stdin if none or -'",
        )
        .get_matches();
    cli::init_logging(args.occurrences_of("verbose"), args.occurrences_of("quiet"));

    let lower = args.is_present("lower");
    let expected = match args.value_of("expected-normalization") {
        Some(form) => Some(form.parse::<NormalizationForm>()?),
        None => None,
    };
    let files = cli::files_or_stdin(args.values_of("files"));

    let mut counts = new_farm();
    info!("Aggregating counts of extended grapheme clusters in {:?}", files);
    for file in files {
        let mut input = cli::open_or_stdin(file)?;
        let mut line = String::new();
        while input.read_line(&mut line)? > 0 {
            count_graphemes(&line, lower, &mut counts);
            line.clear();
        }
    }

    if let Some(form) = expected {
        info!("Checking normalization of identified extended grapheme clusters.");
        for (cluster, normalized) in denormalized(&counts, form) {
            warn!(
                "Expected {:?} according to {:?}, got {:?} instead!",
                normalized, form, cluster
            );
        }
    }

    for (cluster, count) in most_common(&counts) {
        println!("{}\t{}\t{}", count, printable(cluster), code_points(cluster));
    }
    Ok(())
}
