//! Frequency distribution of matching positions
//!
//! Scans a vertical once, keeps the positions matching every `--match`
//! condition and counts them under the `--count` key. Prints one row per key:
//! the key columns, absolute frequency, instances per million and average
//! reduced frequency, most frequent first.
//!
//! ```text
//! vt-freq --profile syn2015 -m 'tag:pos=N' -m 'doc.genre=fiction' -c lemma syn2015.vert.gz
//! ```

// argument parsing
#[macro_use]
extern crate clap;
// logging
#[macro_use]
extern crate log;

use clap::Arg;
use vertical::cli;
use vertical::errors::*;
use vertical::query::{KeySpec, Query};
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
             -c, --count=[KEYS] 'comma-separated attributes to count by (default: word)'
             --report=[N] 'log progress every N positions'
             --limit=[N] 'print at most N rows'
             -v, --verbose... 'increase logging level'
             -q, --quiet... 'decrease logging level'
             <file> 'vertical to search, plain or gzipped'",
        )
        .arg(
            Arg::with_name("match")
                .short("m")
                .long("match")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .value_name("COND")
                .help("attr=regex, attr!=regex, struct.attr=regex or attr:slot=regex; all must hold"),
        )
        .get_matches();
    cli::init_logging(args.occurrences_of("verbose"), args.occurrences_of("quiet"));

    let profile = cli::profile_from_args(args.value_of("profile"), args.value_of("fields"))?;
    let query = Query::parse(args.values_of("match").into_iter().flatten(), &profile)?;
    let keys = KeySpec::parse(args.value_of("count").unwrap_or("word"), &profile)?;
    let report = if args.is_present("report") {
        value_t!(args, "report", u64).unwrap_or_else(|e| e.exit())
    } else {
        0
    };
    let limit = if args.is_present("limit") {
        value_t!(args, "limit", usize).unwrap_or_else(|e| e.exit())
    } else {
        usize::max_value()
    };

    info!(
        "Searching with {} conditions, counting by {:?}",
        query.conditions().len(),
        args.value_of("count").unwrap_or("word")
    );
    let corpus = Corpus::new(args.value_of("file").unwrap(), profile)?.report_every(report);
    let index = corpus.search(|p, c| query.matches(p, c), |p, c| keys.key(p, c))?;
    info!(
        "{} distinct keys among {} positions",
        index.len(),
        index.size()
    );

    for (key, ordinals) in index.most_common().into_iter().take(limit) {
        println!(
            "{}\t{}\t{:.2}\t{:.2}",
            key.join("\t"),
            ordinals.len(),
            vertical::ipm(ordinals, index.size())?,
            vertical::arf(ordinals, index.size())?
        );
    }
    Ok(())
}
