//! Shared plumbing for the binaries
use crate::errors::*;
use crate::profile::CorpusProfile;
use crate::reader::{open_input, Compression};
use log::LevelFilter;
use std::io::{self, BufRead, BufReader};

const LEVELS: [LevelFilter; 6] = [
    LevelFilter::Off,
    LevelFilter::Error,
    LevelFilter::Warn,
    LevelFilter::Info,
    LevelFilter::Debug,
    LevelFilter::Trace,
];

/// Level after `-v` and `-q` flags, starting from warnings
pub fn log_level(verbose: u64, quiet: u64) -> LevelFilter {
    let index = (2 + verbose as i64 - quiet as i64).max(0).min(5);
    LEVELS[index as usize]
}

/// Start env_logger; `RUST_LOG` still wins over the flags
pub fn init_logging(verbose: u64, quiet: u64) {
    env_logger::Builder::new()
        .filter_level(log_level(verbose, quiet))
        .parse_default_env()
        .init();
}

/// A built-in profile by name, or an ad hoc one from comma-separated column names
pub fn profile_from_args(profile: Option<&str>, fields: Option<&str>) -> Result<CorpusProfile> {
    match (profile, fields) {
        (Some(_), Some(_)) => Err(Error::Query(
            "Give either a profile or a list of fields, not both".into(),
        )),
        (_, Some(fields)) => CorpusProfile::new("custom", fields.split(',').map(str::trim)),
        (Some(name), None) => CorpusProfile::from_name(name),
        (None, None) => Ok(CorpusProfile::basic()),
    }
}

/// The file arguments, or just stdin (`-`) when there are none
pub fn files_or_stdin<'a, I: IntoIterator<Item = &'a str>>(files: Option<I>) -> Vec<&'a str> {
    let files: Vec<&str> = files.into_iter().flatten().collect();
    if files.is_empty() {
        vec!["-"]
    } else {
        files
    }
}

/// Open a file argument; `-` reads stdin
pub fn open_or_stdin(file: &str) -> Result<Box<dyn BufRead + Send>> {
    if file == "-" {
        Ok(Box::new(BufReader::new(io::stdin())))
    } else {
        open_input(file, Compression::Auto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_shift_the_level() {
        assert_eq!(log_level(0, 0), LevelFilter::Warn);
        assert_eq!(log_level(1, 0), LevelFilter::Info);
        assert_eq!(log_level(9, 0), LevelFilter::Trace);
        assert_eq!(log_level(0, 9), LevelFilter::Off);
        assert_eq!(log_level(2, 1), LevelFilter::Info);
    }

    #[test]
    fn profiles_from_flags() {
        assert_eq!(profile_from_args(None, None).unwrap().name(), "basic");
        assert_eq!(
            profile_from_args(Some("syn2015"), None).unwrap().fields().len(),
            14
        );
        assert_eq!(
            profile_from_args(None, Some("word, lemma")).unwrap().fields(),
            &["word", "lemma"]
        );
        assert!(profile_from_args(Some("basic"), Some("word")).is_err());
        assert!(profile_from_args(Some("nope"), None).is_err());
    }

    #[test]
    fn no_files_means_stdin() {
        assert_eq!(files_or_stdin(None::<Vec<&str>>), vec!["-"]);
        assert_eq!(files_or_stdin(Some(vec![])), vec!["-"]);
        assert_eq!(files_or_stdin(Some(vec!["a.vert", "-"])), vec!["a.vert", "-"]);
    }
}
