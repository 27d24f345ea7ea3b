//! Streaming reader and frequency engine for corpora in the vertical format
//!
//! A vertical has one token per line, tab-separated positional attributes, and
//! structure tags such as `<doc id="1">` ... `</doc>` on lines of their own.
//! [`Corpus`] scans such a file (gzipped or not) lazily, [`Positions`] gives
//! every token together with the structures open around it, and the search
//! methods build a [`FrequencyIndex`] from which ipm and ARF follow.

#[macro_use]
extern crate log;

pub mod cli;
pub mod corpus;
pub mod errors;
pub mod farm;
pub mod graphemes;
pub mod profile;
pub mod query;
pub mod reader;
pub mod search;
pub mod stats;
pub mod tag;
pub mod zip;

pub use crate::corpus::{Corpus, Position, Positions, Progress, StructuralContext};
pub use crate::errors::{Error, FormatError, FormatErrorKind, Result};
pub use crate::profile::{CorpusProfile, Value};
pub use crate::reader::{Compression, Event, Structure, VerticalReader};
pub use crate::search::{FrequencyIndex, Stats};
pub use crate::stats::{arf, ipm};
