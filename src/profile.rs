//! Corpus profiles: what the columns of a vertical mean
//!
//! A profile is declared once per corpus type. It names the tab-separated
//! positional attributes in order, optionally lists the structures the corpus
//! may contain, and optionally attaches a parser to some of the columns.
use crate::errors::*;
use std::fmt;
use std::result;
use std::sync::Arc;

/// Turns the raw text of one column into a value. Errors are a human readable reason.
pub type FieldParser = Arc<dyn Fn(&str) -> result::Result<Value, String> + Send + Sync>;

/// Slot names of the 16-character positional tags used by SYN2015
pub const UTKL_TAG_SLOTS: [&str; 16] = [
    "pos", "sub", "gen", "num", "case", "pgen", "pnum", "pers", "tense", "grad", "neg", "act",
    "p13", "p14", "var", "asp",
];

/// The value of one positional attribute
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Text(String),
    Tag(PositionalTag),
}

impl Value {
    /// The text as it appeared in the vertical
    pub fn as_str(&self) -> &str {
        match *self {
            Value::Text(ref text) => text,
            Value::Tag(ref tag) => tag.as_str(),
        }
    }

    pub fn as_tag(&self) -> Option<&PositionalTag> {
        match *self {
            Value::Tag(ref tag) => Some(tag),
            Value::Text(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A morphological tag where every character is one named category
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PositionalTag {
    raw: String,
    slots: Arc<Vec<String>>,
}

impl PositionalTag {
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The character in the named slot, e.g. `tag.get("case")`
    pub fn get(&self, slot: &str) -> Option<char> {
        let index = self.slots.iter().position(|s| s == slot)?;
        self.raw.chars().nth(index)
    }

    pub fn slots(&self) -> &[String] {
        &self.slots
    }
}

fn slot_names(slots: &[&str]) -> Arc<Vec<String>> {
    Arc::new(slots.iter().map(|s| s.to_string()).collect())
}

/// A parser for fixed-width positional tags with the given slot names
pub fn positional_tag(slots: &[&str]) -> FieldParser {
    tag_parser(slot_names(slots))
}

fn tag_parser(slots: Arc<Vec<String>>) -> FieldParser {
    Arc::new(move |raw: &str| {
        let width = raw.chars().count();
        if width != slots.len() {
            return Err(format!(
                "expected a {}-character positional tag, got {} characters",
                slots.len(),
                width
            ));
        }
        Ok(Value::Tag(PositionalTag {
            raw: raw.to_string(),
            slots: slots.clone(),
        }))
    })
}

/// Schema of one kind of vertical
#[derive(Clone)]
pub struct CorpusProfile {
    name: String,
    fields: Vec<String>,
    structures: Option<Vec<String>>,
    parsers: Vec<Option<FieldParser>>,
    tag_slots: Vec<Option<Arc<Vec<String>>>>,
}

impl CorpusProfile {
    /// A profile with plain text columns and any structure names allowed
    pub fn new<N, I, S>(name: N, fields: I) -> Result<Self>
    where
        N: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if fields.is_empty() {
            return Err(Error::Other(
                "A corpus profile needs at least one positional attribute".into(),
            ));
        }
        for (i, field) in fields.iter().enumerate() {
            if field.is_empty() || fields[..i].contains(field) {
                return Err(Error::Other(format!(
                    "Positional attribute names must be non-empty and unique, got {:?}",
                    fields
                )));
            }
        }
        Ok(CorpusProfile {
            name: name.into(),
            parsers: vec![None; fields.len()],
            tag_slots: vec![None; fields.len()],
            fields,
            structures: None,
        })
    }

    /// Only accept these structure names; any other tag is a format error
    pub fn with_structures<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.structures = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Parse the named column with `parser` instead of keeping it as text
    ///
    /// The column's tag slots are unknown afterwards; use `with_tag` for
    /// positional tags that queries should be able to address.
    pub fn with_parser(mut self, field: &str, parser: FieldParser) -> Result<Self> {
        let index = self.require_field(field)?;
        self.parsers[index] = Some(parser);
        self.tag_slots[index] = None;
        Ok(self)
    }

    /// Parse the named column as a positional tag with these slot names
    pub fn with_tag(mut self, field: &str, slots: &[&str]) -> Result<Self> {
        let index = self.require_field(field)?;
        let slots = slot_names(slots);
        self.parsers[index] = Some(tag_parser(slots.clone()));
        self.tag_slots[index] = Some(slots);
        Ok(self)
    }

    fn require_field(&self, field: &str) -> Result<usize> {
        self.field_index(field).ok_or_else(|| {
            Error::Other(format!(
                "Profile {:?} has no positional attribute {:?}",
                self.name, field
            ))
        })
    }

    /// `word`, `lemma`, `tag`
    pub fn basic() -> Self {
        CorpusProfile {
            name: "basic".into(),
            fields: vec!["word".into(), "lemma".into(), "tag".into()],
            structures: None,
            parsers: vec![None, None, None],
            tag_slots: vec![None, None, None],
        }
    }

    /// The SYN2015 corpus of Czech, with the tag column parsed into slots
    pub fn syn2015() -> Self {
        let fields = [
            "word", "lemma", "tag", "proc", "afun", "parent", "eparent", "prep", "p_lemma",
            "p_tag", "p_afun", "ep_lemma", "ep_tag", "ep_afun",
        ];
        let slots = slot_names(&UTKL_TAG_SLOTS);
        let mut parsers: Vec<Option<FieldParser>> = vec![None; fields.len()];
        let mut tag_slots = vec![None; fields.len()];
        parsers[2] = Some(tag_parser(slots.clone()));
        tag_slots[2] = Some(slots);
        CorpusProfile {
            name: "syn2015".into(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            structures: Some(
                ["doc", "text", "p", "s", "hi", "lb"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            ),
            parsers,
            tag_slots,
        }
    }

    /// SYN2015 shuffled into `<block>`s
    pub fn shuffled_syn2015() -> Self {
        let mut profile = CorpusProfile::syn2015();
        profile.name = "shuffled-syn2015".into();
        if let Some(ref mut structures) = profile.structures {
            structures.insert(0, "block".into());
        }
        profile
    }

    /// Look up one of the built-in profiles
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "basic" => Ok(CorpusProfile::basic()),
            "syn2015" => Ok(CorpusProfile::syn2015()),
            "shuffled-syn2015" => Ok(CorpusProfile::shuffled_syn2015()),
            other => Err(Error::Query(format!(
                "Unknown corpus profile {:?}, expected one of basic, syn2015, shuffled-syn2015",
                other
            ))),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn field_index(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == field)
    }

    pub fn structures(&self) -> Option<&[String]> {
        self.structures.as_ref().map(|s| s.as_slice())
    }

    pub fn knows_structure(&self, name: &str) -> bool {
        match self.structures {
            Some(ref names) => names.iter().any(|n| n == name),
            None => true,
        }
    }

    /// Slot names of column `index`, if it was declared a positional tag
    pub fn tag_slots(&self, index: usize) -> Option<&[String]> {
        match self.tag_slots.get(index) {
            Some(&Some(ref slots)) => Some(slots.as_slice()),
            _ => None,
        }
    }

    /// Turn the raw text of column `index` into a value
    pub fn parse_field(&self, index: usize, raw: &str) -> result::Result<Value, String> {
        match self.parsers.get(index) {
            Some(&Some(ref parser)) => parser(raw),
            _ => Ok(Value::Text(raw.to_string())),
        }
    }

    /// Like `parse_field`, but reuses the string for plain text columns
    pub fn parse_owned(&self, index: usize, raw: String) -> result::Result<Value, String> {
        match self.parsers.get(index) {
            Some(&Some(ref parser)) => parser(&raw),
            _ => Ok(Value::Text(raw)),
        }
    }
}

impl fmt::Debug for CorpusProfile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let parsed: Vec<&str> = self
            .fields
            .iter()
            .zip(self.parsers.iter())
            .filter(|&(_, p)| p.is_some())
            .map(|(field, _)| field.as_str())
            .collect();
        f.debug_struct("CorpusProfile")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("structures", &self.structures)
            .field("parsed", &parsed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_profiles() {
        assert_eq!(CorpusProfile::basic().fields(), &["word", "lemma", "tag"]);
        let syn = CorpusProfile::syn2015();
        assert_eq!(syn.fields().len(), 14);
        assert_eq!(syn.field_index("p_tag"), Some(9));
        assert!(syn.knows_structure("doc"));
        assert!(!syn.knows_structure("block"));
        assert!(CorpusProfile::shuffled_syn2015().knows_structure("block"));
        assert!(CorpusProfile::basic().knows_structure("anything"));
        assert!(CorpusProfile::from_name("nope").is_err());
    }

    #[test]
    fn syn2015_tag_is_positional() {
        let syn = CorpusProfile::syn2015();
        let value = syn.parse_field(2, "NNFS1-----A-----").unwrap();
        let tag = value.as_tag().unwrap();
        assert_eq!(tag.get("pos"), Some('N'));
        assert_eq!(tag.get("gen"), Some('F'));
        assert_eq!(tag.get("case"), Some('1'));
        assert_eq!(tag.get("neg"), Some('A'));
        assert_eq!(tag.get("nonsense"), None);
        assert_eq!(value.as_str(), "NNFS1-----A-----");

        assert!(syn.parse_field(2, "NN").is_err());
        assert_eq!(syn.parse_field(1, "pes").unwrap(), Value::Text("pes".into()));
    }

    #[test]
    fn custom_profile_validation() {
        assert!(CorpusProfile::new("x", Vec::<String>::new()).is_err());
        assert!(CorpusProfile::new("x", vec!["word", "word"]).is_err());
        let profile = CorpusProfile::new("x", vec!["word", "tag"]).unwrap();
        assert!(profile.clone().with_parser("lemma", positional_tag(&["a"])).is_err());
        let profile = profile.with_parser("tag", positional_tag(&["a", "b"])).unwrap();
        assert_eq!(
            profile.parse_field(1, "XY").unwrap().as_tag().unwrap().get("b"),
            Some('Y')
        );
        assert_eq!(profile.tag_slots(1), None);
    }

    #[test]
    fn declared_tag_slots() {
        let syn = CorpusProfile::syn2015();
        assert_eq!(syn.tag_slots(2).map(|s| s.len()), Some(16));
        assert_eq!(syn.tag_slots(1), None);
        assert_eq!(CorpusProfile::basic().tag_slots(2), None);

        let profile = CorpusProfile::new("x", vec!["word", "tag"])
            .unwrap()
            .with_tag("tag", &["pos", "case"])
            .unwrap();
        assert_eq!(profile.tag_slots(1), Some(&["pos".to_string(), "case".to_string()][..]));
        assert_eq!(
            profile.parse_field(1, "N1").unwrap().as_tag().unwrap().get("case"),
            Some('1')
        );
        assert!(profile.with_tag("lemma", &["a"]).is_err());
    }
}
