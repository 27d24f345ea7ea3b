//! Textual match and count expressions, for the command line
//!
//! - `lemma=pes` matches positions whose lemma is exactly `pes`. The right
//!   side is a regex and has to match the whole value.
//! - `tag!=N.*` negates.
//! - `doc.genre=fiction` tests an attribute of the innermost open `<doc>`.
//! - `tag:case=1` tests one slot of a positional tag.
//!
//! Keys are built from a comma-separated list of the same references,
//! e.g. `lemma,tag:pos,doc.year`.
use crate::corpus::{Position, StructuralContext};
use crate::errors::*;
use crate::profile::CorpusProfile;
use regex::Regex;

/// What an expression refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Column index and name
    Positional(usize, String),
    /// A slot of a positional tag column
    Slot { column: usize, slot: String },
    Structural { structure: String, attribute: String },
}

impl Target {
    pub fn parse(reference: &str, profile: &CorpusProfile) -> Result<Self> {
        let reference = reference.trim();
        if let Some(dot) = reference.find('.') {
            let (structure, attribute) = (&reference[..dot], &reference[dot + 1..]);
            if structure.is_empty() || attribute.is_empty() {
                return Err(Error::Query(format!(
                    "Expected structure.attribute, got {:?}",
                    reference
                )));
            }
            return Ok(Target::Structural {
                structure: structure.to_string(),
                attribute: attribute.to_string(),
            });
        }
        let (field, slot) = match reference.find(':') {
            Some(colon) => (&reference[..colon], Some(&reference[colon + 1..])),
            None => (reference, None),
        };
        let column = profile.field_index(field).ok_or_else(|| {
            Error::Query(format!(
                "{:?} is not a positional attribute of {}, expected one of {:?}",
                field,
                profile.name(),
                profile.fields()
            ))
        })?;
        Ok(match slot {
            Some(slot) => {
                let slots = profile.tag_slots(column).ok_or_else(|| {
                    Error::Query(format!(
                        "{:?} is not a positional tag in {}, so {:?} has no slots",
                        field,
                        profile.name(),
                        reference
                    ))
                })?;
                if !slots.iter().any(|s| s == slot) {
                    return Err(Error::Query(format!(
                        "{:?} is not a slot of {:?}, expected one of {:?}",
                        slot, field, slots
                    )));
                }
                Target::Slot {
                    column,
                    slot: slot.to_string(),
                }
            }
            None => Target::Positional(column, field.to_string()),
        })
    }

    /// The referenced value, if present at this position
    pub fn value<'p>(
        &self,
        position: &'p Position,
        context: &StructuralContext<'p>,
    ) -> Option<Value<'p>> {
        match *self {
            Target::Positional(column, _) => {
                position.values().get(column).map(|v| Value::Str(v.as_str()))
            }
            Target::Slot { column, ref slot } => position
                .values()
                .get(column)
                .and_then(|v| v.as_tag())
                .and_then(|tag| tag.get(slot))
                .map(Value::Char),
            Target::Structural {
                ref structure,
                ref attribute,
            } => context.attribute(structure, attribute).map(Value::Str),
        }
    }
}

/// A borrowed value, or one character of a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value<'p> {
    Str(&'p str),
    Char(char),
}

impl<'p> Value<'p> {
    fn is_match(&self, regex: &Regex) -> bool {
        match *self {
            Value::Str(text) => regex.is_match(text),
            Value::Char(c) => regex.is_match(c.encode_utf8(&mut [0; 4])),
        }
    }

    fn to_owned_string(&self) -> String {
        match *self {
            Value::Str(text) => text.to_string(),
            Value::Char(c) => c.to_string(),
        }
    }
}

/// `target=regex` or `target!=regex`
#[derive(Debug, Clone)]
pub struct Condition {
    target: Target,
    regex: Regex,
    negated: bool,
}

impl Condition {
    pub fn parse(expression: &str, profile: &CorpusProfile) -> Result<Self> {
        let eq = expression.find('=').ok_or_else(|| {
            Error::Query(format!(
                "Expected attribute=regex or attribute!=regex, got {:?}",
                expression
            ))
        })?;
        let negated = expression[..eq].ends_with('!');
        let reference = if negated {
            &expression[..eq - 1]
        } else {
            &expression[..eq]
        };
        let pattern = &expression[eq + 1..];
        Ok(Condition {
            target: Target::parse(reference, profile)?,
            regex: Regex::new(&format!("^(?:{})$", pattern))?,
            negated,
        })
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// A missing value never matches `=` and always matches `!=`
    pub fn matches(&self, position: &Position, context: &StructuralContext) -> bool {
        let hit = self
            .target
            .value(position, context)
            .map_or(false, |v| v.is_match(&self.regex));
        hit != self.negated
    }
}

/// All conditions must hold; no conditions match everything
#[derive(Debug, Clone, Default)]
pub struct Query {
    conditions: Vec<Condition>,
}

impl Query {
    pub fn parse<I, S>(expressions: I, profile: &CorpusProfile) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let conditions = expressions
            .into_iter()
            .map(|e| Condition::parse(e.as_ref(), profile))
            .collect::<Result<Vec<_>>>()?;
        Ok(Query { conditions })
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn matches(&self, position: &Position, context: &StructuralContext) -> bool {
        self.conditions.iter().all(|c| c.matches(position, context))
    }
}

/// Which values make up the key a position is counted under
#[derive(Debug, Clone)]
pub struct KeySpec {
    targets: Vec<Target>,
}

impl KeySpec {
    pub fn parse(spec: &str, profile: &CorpusProfile) -> Result<Self> {
        let targets = spec
            .split(',')
            .filter(|r| !r.trim().is_empty())
            .map(|r| Target::parse(r, profile))
            .collect::<Result<Vec<_>>>()?;
        if targets.is_empty() {
            return Err(Error::Query(format!("Empty key specification {:?}", spec)));
        }
        Ok(KeySpec { targets })
    }

    /// Missing values become empty strings
    pub fn key(&self, position: &Position, context: &StructuralContext) -> Vec<String> {
        self.targets
            .iter()
            .map(|t| {
                t.value(position, context)
                    .map(|v| v.to_owned_string())
                    .unwrap_or_default()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Positions;
    use std::io::Cursor;

    /// Runs `check` at every position of a small SYN2015-like vertical
    fn with_positions<F: FnMut(&Position, &StructuralContext)>(mut check: F) {
        let tag = "NNMS1-----A-----";
        let text = format!(
            "<doc id=\"1\" genre=\"fiction\">\n\
             <s>\n\
             pes\tpes\t{}\t-\t-\t-\t-\t-\t-\t-\t-\t-\t-\t-\n\
             </s>\n\
             </doc>\n\
             <doc id=\"2\">\n\
             kočky\tkočka\tNNFP1-----A-----\t-\t-\t-\t-\t-\t-\t-\t-\t-\t-\t-\n\
             </doc>\n",
            tag
        );
        let mut scan = Positions::from_reader(
            Cursor::new(text.into_bytes()),
            CorpusProfile::syn2015(),
        );
        while let Some(position) = scan.next() {
            check(&position.unwrap(), &scan.context());
        }
    }

    #[test]
    fn conditions() {
        let profile = CorpusProfile::syn2015();
        let lemma = Condition::parse("lemma=pes", &profile).unwrap();
        let prefix = Condition::parse("lemma=ko.*", &profile).unwrap();
        let partial = Condition::parse("lemma=p", &profile).unwrap();
        let not_fiction = Condition::parse("doc.genre!=fiction", &profile).unwrap();
        let plural = Condition::parse("tag:num=P", &profile).unwrap();
        let mut results = vec![];
        with_positions(|p, c| {
            results.push((
                lemma.matches(p, c),
                prefix.matches(p, c),
                partial.matches(p, c),
                not_fiction.matches(p, c),
                plural.matches(p, c),
            ))
        });
        assert_eq!(
            results,
            vec![
                (true, false, false, false, false),
                (false, true, false, true, true)
            ]
        );
    }

    #[test]
    fn queries_are_conjunctions() {
        let profile = CorpusProfile::syn2015();
        let query = Query::parse(vec!["tag:pos=N", "doc.id=2"], &profile).unwrap();
        let everything = Query::parse(Vec::<String>::new(), &profile).unwrap();
        let mut hits = vec![];
        with_positions(|p, c| hits.push((query.matches(p, c), everything.matches(p, c))));
        assert_eq!(hits, vec![(false, true), (true, true)]);
    }

    #[test]
    fn keys() {
        let profile = CorpusProfile::syn2015();
        let spec = KeySpec::parse("lemma, tag:gen ,doc.genre", &profile).unwrap();
        let mut keys = vec![];
        with_positions(|p, c| keys.push(spec.key(p, c)));
        assert_eq!(
            keys,
            vec![
                vec!["pes".to_string(), "M".to_string(), "fiction".to_string()],
                vec!["kočka".to_string(), "F".to_string(), String::new()],
            ]
        );
    }

    #[test]
    fn bad_expressions() {
        let profile = CorpusProfile::basic();
        assert!(Condition::parse("lemma", &profile).is_err());
        assert!(Condition::parse("colour=red", &profile).is_err());
        assert!(Condition::parse("lemma=(", &profile).is_err());
        assert!(Condition::parse("doc.=x", &profile).is_err());
        assert!(KeySpec::parse(" , ", &profile).is_err());
        assert!(KeySpec::parse("lemma,nope", &profile).is_err());
    }

    #[test]
    fn slots_need_a_declared_tag() {
        let basic = CorpusProfile::basic();
        match Condition::parse("tag:pos=N", &basic) {
            Err(Error::Query(_)) => {}
            other => panic!("unexpected {:?}", other.map(|c| c.target().clone())),
        }
        assert!(KeySpec::parse("lemma,tag:pos", &basic).is_err());

        let syn = CorpusProfile::syn2015();
        assert!(Condition::parse("tag:colour=N", &syn).is_err());
        assert!(Condition::parse("lemma:pos=N", &syn).is_err());
        assert_eq!(
            Condition::parse("tag:case=1", &syn).unwrap().target(),
            &Target::Slot {
                column: 2,
                slot: "case".into()
            }
        );
    }
}
