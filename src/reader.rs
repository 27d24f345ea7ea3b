//! Vertical stream reader
//!
//! Turns the lines of a vertical into open, close and position events while
//! keeping the stack of currently open structures. Nothing is read ahead
//! beyond the buffered reader, so verticals of any length can be streamed.
use crate::errors::*;
use crate::profile::CorpusProfile;
use crate::tag::{parse_tag, Tag, TagError};
use flate2::bufread::MultiGzDecoder;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const BUFFER_SIZE: usize = 1 << 16;

/// How to decode a vertical file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Gunzip if the name ends in `.gz` or the file starts with the gzip magic bytes
    Auto,
    Gzip,
    None,
}

impl Default for Compression {
    fn default() -> Self {
        Compression::Auto
    }
}

/// Open a (possibly gzipped) vertical for reading
pub fn open_input<P: AsRef<Path>>(
    path: P,
    compression: Compression,
) -> Result<Box<dyn BufRead + Send>> {
    let path = path.as_ref();
    let mut buffered = BufReader::with_capacity(BUFFER_SIZE, File::open(path)?);
    let gzip = match compression {
        Compression::Gzip => true,
        Compression::None => false,
        Compression::Auto => {
            path.extension().map_or(false, |ext| ext == "gz")
                || buffered.fill_buf()?.starts_with(&GZIP_MAGIC)
        }
    };
    if gzip {
        debug!("Reading {} as gzip", path.display());
        Ok(Box::new(BufReader::with_capacity(
            BUFFER_SIZE,
            MultiGzDecoder::new(buffered),
        )))
    } else {
        debug!("Reading {} as plain text", path.display());
        Ok(Box::new(buffered))
    }
}

/// An open structure: `<doc id="1">` up to its `</doc>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Structure {
    name: String,
    attributes: BTreeMap<String, String>,
    line: u64,
}

impl Structure {
    fn from_tag(name: &str, attributes: &[(&str, &str)], line: u64) -> Self {
        Structure {
            name: name.to_string(),
            attributes: attributes
                .iter()
                .map(|&(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            line,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.attributes.get(attribute).map(|v| v.as_str())
    }

    /// Line of the opening tag
    pub fn line(&self) -> u64 {
        self.line
    }
}

/// Renders the opening tag
impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        for (key, value) in &self.attributes {
            write!(f, " {}=\"{}\"", key, value)?;
        }
        write!(f, ">")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Open(Structure),
    Close(String),
    /// `<lb/>` and the like; never enters the stack
    SelfClosing(Structure),
    /// The raw tab-separated fields, already checked against the schema
    Position(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    /// Nothing is open (also the initial state)
    Start,
    InsideStructure,
    AtPosition,
    End,
    Error,
}

/// Lazy, single-pass event stream over a vertical
///
/// Build a new reader to scan again. A reader is driven through `&mut`, so one
/// instance can't be shared between threads; give each thread its own.
pub struct VerticalReader<R> {
    input: R,
    profile: Arc<CorpusProfile>,
    stack: Vec<Structure>,
    line: String,
    line_number: u64,
    state: ReaderState,
}

impl VerticalReader<Box<dyn BufRead + Send>> {
    pub fn open<P: AsRef<Path>>(
        path: P,
        profile: Arc<CorpusProfile>,
        compression: Compression,
    ) -> Result<Self> {
        Ok(VerticalReader::new(open_input(path, compression)?, profile))
    }
}

impl<R: BufRead> VerticalReader<R> {
    pub fn new(input: R, profile: Arc<CorpusProfile>) -> Self {
        VerticalReader {
            input,
            profile,
            stack: vec![],
            line: String::new(),
            line_number: 0,
            state: ReaderState::Start,
        }
    }

    /// Currently open structures, outermost first
    pub fn stack(&self) -> &[Structure] {
        &self.stack
    }

    /// Number of lines read so far, i.e. the 1-based number of the current line
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    pub fn state(&self) -> ReaderState {
        self.state
    }

    pub fn profile(&self) -> &Arc<CorpusProfile> {
        &self.profile
    }

    /// A format error about the line just read
    pub(crate) fn format_error(&self, kind: FormatErrorKind) -> Error {
        Error::Format(FormatError::new(self.line_number, self.line.clone(), kind))
    }

    fn read_event(&mut self) -> Result<Option<Event>> {
        self.line.clear();
        if self.input.read_line(&mut self.line)? == 0 {
            return self.finish();
        }
        self.line_number += 1;
        // Padding spaces are insignificant on tags and positions alike
        let padding = |c: char| c == ' ' || c == '\n' || c == '\r';
        let end = self.line.trim_end_matches(padding).len();
        self.line.truncate(end);
        let start = self.line.len() - self.line.trim_start_matches(padding).len();
        self.line.replace_range(..start, "");

        if self.line.starts_with('<') && !self.line.contains('\t') {
            self.tag_event().map(Some)
        } else {
            self.position_event().map(Some)
        }
    }

    fn tag_event(&mut self) -> Result<Event> {
        let (event, pushed) = {
            let tag = parse_tag(&self.line).map_err(|e| {
                self.format_error(match e {
                    TagError::Malformed => FormatErrorKind::MalformedTag,
                    TagError::MalformedAttributes => FormatErrorKind::MalformedAttributes,
                })
            })?;
            if let Tag::Open { .. } | Tag::SelfClosing { .. } = tag {
                if !self.profile.knows_structure(tag.name()) {
                    return Err(self.format_error(FormatErrorKind::UnknownStructure(
                        tag.name().to_string(),
                    )));
                }
            }
            match tag {
                Tag::Open { name, attributes } => {
                    let structure = Structure::from_tag(name, &attributes, self.line_number);
                    (Event::Open(structure.clone()), Some(structure))
                }
                Tag::SelfClosing { name, attributes } => (
                    Event::SelfClosing(Structure::from_tag(name, &attributes, self.line_number)),
                    None,
                ),
                Tag::Close { name } => {
                    match self.stack.last() {
                        Some(top) if top.name == name => {}
                        top => {
                            return Err(self.format_error(FormatErrorKind::UnbalancedClose {
                                expected: top.map(|s| s.name.clone()),
                                found: name.to_string(),
                            }))
                        }
                    }
                    (Event::Close(name.to_string()), None)
                }
            }
        };

        match event {
            Event::Close(_) => {
                self.stack.pop();
            }
            _ => {
                if let Some(structure) = pushed {
                    self.stack.push(structure);
                }
            }
        }
        self.state = if self.stack.is_empty() {
            ReaderState::Start
        } else {
            ReaderState::InsideStructure
        };
        Ok(event)
    }

    fn position_event(&mut self) -> Result<Event> {
        let expected = self.profile.fields().len();
        let found = self.line.split('\t').count();
        if found != expected {
            return Err(self.format_error(FormatErrorKind::FieldCount { expected, found }));
        }
        self.state = ReaderState::AtPosition;
        Ok(Event::Position(
            self.line.split('\t').map(String::from).collect(),
        ))
    }

    fn finish(&mut self) -> Result<Option<Event>> {
        if let Some(unclosed) = self.stack.last() {
            return Err(Error::Format(FormatError::new(
                unclosed.line,
                unclosed.to_string(),
                FormatErrorKind::UnclosedStructure(unclosed.name.clone()),
            )));
        }
        debug!("Vertical exhausted after {} lines", self.line_number);
        self.state = ReaderState::End;
        Ok(None)
    }
}

impl<R: BufRead> Iterator for VerticalReader<R> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            ReaderState::End | ReaderState::Error => return None,
            _ => {}
        }
        match self.read_event() {
            Ok(Some(event)) => Some(Ok(event)),
            Ok(None) => None,
            Err(err) => {
                self.state = ReaderState::Error;
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(text: &str) -> VerticalReader<Cursor<Vec<u8>>> {
        VerticalReader::new(
            Cursor::new(text.as_bytes().to_vec()),
            Arc::new(CorpusProfile::basic()),
        )
    }

    fn first_error(text: &str) -> FormatError {
        reader(text)
            .filter_map(|event| event.err())
            .next()
            .and_then(|err| err.format().cloned())
            .expect("expected a format error")
    }

    #[test]
    fn events_in_order() {
        let events: Vec<Event> = reader("<doc id=\"1\">\n<lb/>\nw\tl\tt\r\n</doc>\n")
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(events.len(), 4);
        match events[0] {
            Event::Open(ref s) => {
                assert_eq!(s.name(), "doc");
                assert_eq!(s.get("id"), Some("1"));
                assert_eq!(s.line(), 1);
            }
            ref other => panic!("unexpected {:?}", other),
        }
        match events[1] {
            Event::SelfClosing(ref s) => assert_eq!(s.name(), "lb"),
            ref other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            events[2],
            Event::Position(vec!["w".into(), "l".into(), "t".into()])
        );
        assert_eq!(events[3], Event::Close("doc".into()));
    }

    #[test]
    fn stack_and_states() {
        let mut r = reader("<doc>\n<s>\nw\tl\tt\n</s>\n</doc>\n");
        assert_eq!(r.state(), ReaderState::Start);
        r.next();
        r.next();
        assert_eq!(r.state(), ReaderState::InsideStructure);
        assert_eq!(
            r.stack().iter().map(|s| s.name()).collect::<Vec<_>>(),
            vec!["doc", "s"]
        );
        r.next();
        assert_eq!(r.state(), ReaderState::AtPosition);
        assert_eq!(r.stack().len(), 2);
        r.next();
        r.next();
        assert_eq!(r.state(), ReaderState::Start);
        assert!(r.next().is_none());
        assert_eq!(r.state(), ReaderState::End);
        assert!(r.next().is_none());
    }

    #[test]
    fn mismatched_close() {
        let err = first_error("<p>\n</s>\n");
        assert_eq!(err.line, 2);
        assert_eq!(err.content, "</s>");
        assert_eq!(
            err.kind,
            FormatErrorKind::UnbalancedClose {
                expected: Some("p".into()),
                found: "s".into()
            }
        );
    }

    #[test]
    fn close_with_nothing_open() {
        let err = first_error("w\tl\tt\n</s>\n");
        assert_eq!(err.line, 2);
        assert_eq!(
            err.kind,
            FormatErrorKind::UnbalancedClose {
                expected: None,
                found: "s".into()
            }
        );
    }

    #[test]
    fn wrong_field_count() {
        let err = first_error("w1\tl1\n");
        assert_eq!(err.line, 1);
        assert_eq!(err.content, "w1\tl1");
        assert_eq!(
            err.kind,
            FormatErrorKind::FieldCount {
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn unclosed_at_end() {
        let err = first_error("<doc id=\"x\">\n<s>\nw\tl\tt\n</s>\n");
        assert_eq!(err.line, 1);
        assert_eq!(err.kind, FormatErrorKind::UnclosedStructure("doc".into()));
        assert_eq!(err.content, "<doc id=\"x\">");
    }

    #[test]
    fn malformed_tags_are_distinct() {
        assert_eq!(first_error("<doc\n").kind, FormatErrorKind::MalformedTag);
        assert_eq!(
            first_error("<doc id=1>\n").kind,
            FormatErrorKind::MalformedAttributes
        );
    }

    #[test]
    fn surrounding_spaces_are_stripped() {
        let events: Vec<Event> = reader("<doc id=\"1\"> \r\nw\tl\tt \n </doc>\n")
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(events.len(), 3);
        match events[0] {
            Event::Open(ref s) => assert_eq!(s.get("id"), Some("1")),
            ref other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            events[1],
            Event::Position(vec!["w".into(), "l".into(), "t".into()])
        );
        assert_eq!(events[2], Event::Close("doc".into()));
    }

    #[test]
    fn a_lone_bracket_token_is_a_position() {
        let events: Vec<Event> = reader("<\t<\tZ\n").collect::<Result<_>>().unwrap();
        assert_eq!(
            events,
            vec![Event::Position(vec!["<".into(), "<".into(), "Z".into()])]
        );
    }

    #[test]
    fn unknown_structures_with_a_declared_list() {
        let profile = CorpusProfile::basic().with_structures(vec!["doc"]);
        let mut r = VerticalReader::new(Cursor::new(b"<doc>\n<x>\n".to_vec()), Arc::new(profile));
        assert!(r.next().unwrap().is_ok());
        let err = r.next().unwrap().unwrap_err();
        assert_eq!(
            err.format().unwrap().kind,
            FormatErrorKind::UnknownStructure("x".into())
        );
        assert_eq!(r.state(), ReaderState::Error);
        assert!(r.next().is_none());
    }
}
