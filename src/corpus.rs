//! Positions and their structural context
//!
//! [`Positions`] pulls events from a [`VerticalReader`] and hands out one
//! [`Position`] at a time. The structures open at that position are available
//! from [`Positions::context`] until the next call to `next()`.
use crate::errors::*;
use crate::profile::{CorpusProfile, PositionalTag, Value};
use crate::reader::{open_input, Compression, Event, Structure, VerticalReader};
use std::collections::BTreeMap;
use std::io::{self, BufRead};
use std::ops::Index;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// One token with its positional attributes
#[derive(Debug, Clone)]
pub struct Position {
    values: Vec<Value>,
    profile: Arc<CorpusProfile>,
}

impl Position {
    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.profile
            .field_index(attribute)
            .and_then(|i| self.values.get(i))
    }

    /// Raw text of an attribute
    pub fn str(&self, attribute: &str) -> Option<&str> {
        self.get(attribute).map(Value::as_str)
    }

    /// An attribute parsed into a positional tag by the profile
    pub fn tag(&self, attribute: &str) -> Option<&PositionalTag> {
        self.get(attribute).and_then(Value::as_tag)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Names of the attributes, in column order
    pub fn fields(&self) -> &[String] {
        self.profile.fields()
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values && self.profile.fields() == other.profile.fields()
    }
}

impl Index<usize> for Position {
    type Output = Value;

    fn index(&self, column: usize) -> &Value {
        &self.values[column]
    }
}

/// Read-only view of the structures open at the current position
///
/// It borrows the reader's stack, so it can't outlive the step it came from.
/// Use [`StructuralContext::to_map`] to keep a copy.
#[derive(Debug, Clone, Copy)]
pub struct StructuralContext<'a> {
    stack: &'a [Structure],
}

impl<'a> StructuralContext<'a> {
    pub fn new(stack: &'a [Structure]) -> Self {
        StructuralContext { stack }
    }

    /// The innermost open structure with this name
    pub fn get(&self, name: &str) -> Option<&'a Structure> {
        self.stack.iter().rev().find(|s| s.name() == name)
    }

    /// `context.attribute("doc", "id")`
    pub fn attribute(&self, structure: &str, attribute: &str) -> Option<&'a str> {
        self.get(structure).and_then(|s| s.get(attribute))
    }

    pub fn is_open(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Open structures, outermost first
    pub fn structures(&self) -> &'a [Structure] {
        self.stack
    }

    /// Owned snapshot: structure name to attributes
    ///
    /// Inner structures shadow outer ones of the same name. Structures
    /// without attributes are open but contribute no entry.
    pub fn to_map(&self) -> BTreeMap<String, BTreeMap<String, String>> {
        let mut map = BTreeMap::new();
        for structure in self.stack {
            map.insert(structure.name().to_string(), structure.attributes().clone());
        }
        map.retain(|_, attributes| !attributes.is_empty());
        map
    }
}

/// Handed to progress callbacks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub positions: u64,
    pub elapsed: Duration,
}

type Predicate<'a> = Box<dyn Fn(&Position, &StructuralContext) -> bool + 'a>;
type Hook<'a> = Box<dyn FnMut(&Position, &StructuralContext) + 'a>;
type ProgressCallback<'a> = Box<dyn FnMut(&Progress) + 'a>;

/// Single-pass iterator over the positions of a vertical
pub struct Positions<'a, R> {
    reader: VerticalReader<R>,
    profile: Arc<CorpusProfile>,
    scanned: u64,
    /// Set when the first position is pulled
    started: Option<Instant>,
    failed: bool,
    progress: Option<(u64, ProgressCallback<'a>)>,
    ignore: Option<Predicate<'a>>,
    hook: Option<Hook<'a>>,
}

impl<'a, R: BufRead> Positions<'a, R> {
    pub fn from_reader<P: Into<Arc<CorpusProfile>>>(input: R, profile: P) -> Self {
        let profile = profile.into();
        Positions {
            reader: VerticalReader::new(input, profile.clone()),
            profile,
            scanned: 0,
            started: None,
            failed: false,
            progress: None,
            ignore: None,
            hook: None,
        }
    }

    /// Call `callback` every `interval` positions. An interval of 0 turns reporting off.
    pub fn on_progress<F>(mut self, interval: u64, callback: F) -> Self
    where
        F: FnMut(&Progress) + 'a,
    {
        self.progress = if interval > 0 {
            let callback: ProgressCallback<'a> = Box::new(callback);
            Some((interval, callback))
        } else {
            None
        };
        self
    }

    /// Skip positions for which `predicate` holds. They aren't counted either.
    pub fn ignore<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Position, &StructuralContext) -> bool + 'a,
    {
        let predicate: Predicate<'a> = Box::new(predicate);
        self.ignore = Some(predicate);
        self
    }

    /// Run `hook` at every position, ignored ones included
    pub fn hook<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&Position, &StructuralContext) + 'a,
    {
        let hook: Hook<'a> = Box::new(hook);
        self.hook = Some(hook);
        self
    }

    /// Structures open at the position last returned by `next()`
    pub fn context(&self) -> StructuralContext {
        StructuralContext::new(self.reader.stack())
    }

    /// Positions yielded so far
    pub fn scanned(&self) -> u64 {
        self.scanned
    }

    /// Time since the first `next()`; zero before the scan begins
    pub fn elapsed(&self) -> Duration {
        self.started.map_or(Duration::from_secs(0), |t| t.elapsed())
    }

    pub fn profile(&self) -> &Arc<CorpusProfile> {
        &self.profile
    }

    fn build(&self, fields: Vec<String>) -> Result<Position> {
        let mut values = Vec::with_capacity(fields.len());
        for (i, raw) in fields.into_iter().enumerate() {
            let value = self.profile.parse_owned(i, raw).map_err(|reason| {
                self.reader.format_error(FormatErrorKind::FieldValue {
                    field: self.profile.fields()[i].clone(),
                    reason,
                })
            })?;
            values.push(value);
        }
        Ok(Position {
            values,
            profile: self.profile.clone(),
        })
    }
}

impl<'a, R: BufRead> Iterator for Positions<'a, R> {
    type Item = Result<Position>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let started = *self.started.get_or_insert_with(Instant::now);
        loop {
            let fields = match self.reader.next()? {
                Ok(Event::Position(fields)) => fields,
                Ok(_) => continue,
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            };
            let position = match self.build(fields) {
                Ok(position) => position,
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            };

            let context = StructuralContext::new(self.reader.stack());
            if let Some(ref mut hook) = self.hook {
                hook(&position, &context);
            }
            if let Some(ref ignore) = self.ignore {
                if ignore(&position, &context) {
                    continue;
                }
            }

            self.scanned += 1;
            if let Some((interval, ref mut callback)) = self.progress {
                if self.scanned % interval == 0 {
                    callback(&Progress {
                        positions: self.scanned,
                        elapsed: started.elapsed(),
                    });
                }
            }
            return Some(Ok(position));
        }
    }
}

/// A vertical on disk, described once and scanned as many times as needed
#[derive(Debug, Clone)]
pub struct Corpus {
    path: PathBuf,
    profile: Arc<CorpusProfile>,
    compression: Compression,
    report: Option<u64>,
}

impl Corpus {
    pub fn new<P: AsRef<Path>, C: Into<Arc<CorpusProfile>>>(path: P, profile: C) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Vertical {} does not exist or is not a file", path.display()),
            )
            .into());
        }
        Ok(Corpus {
            path: path.to_path_buf(),
            profile: profile.into(),
            compression: Compression::Auto,
            report: None,
        })
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Log progress every `interval` positions of each scan; 0 turns it off
    pub fn report_every(mut self, interval: u64) -> Self {
        self.report = if interval > 0 { Some(interval) } else { None };
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn profile(&self) -> &Arc<CorpusProfile> {
        &self.profile
    }

    /// Open a fresh scan over the file
    pub fn positions<'a>(&self) -> Result<Positions<'a, Box<dyn BufRead + Send>>> {
        let input = open_input(&self.path, self.compression)?;
        info!(
            "Scanning {} as {}",
            self.path.display(),
            self.profile.name()
        );
        let positions = Positions::from_reader(input, self.profile.clone());
        Ok(match self.report {
            Some(interval) => positions.on_progress(interval, log_progress),
            None => positions,
        })
    }
}

fn log_progress(progress: &Progress) {
    info!(
        "Processed {} positions in {:.1}s.",
        progress.positions,
        progress.elapsed.as_secs_f64()
    );
}
