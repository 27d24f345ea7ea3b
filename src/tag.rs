//! Structure tag parser
//!
//! Handles the three tag shapes found in verticals:
//! `<doc id="1" year="2015">`, `</doc>` and `<lb/>`.
use nom::{
    bytes::complete::{is_not, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{all_consuming, map, opt},
    multi::many0,
    sequence::{delimited, preceded, separated_pair, terminated, tuple},
    IResult,
};

/// One parsed tag line, borrowing from the line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag<'a> {
    Open {
        name: &'a str,
        attributes: Vec<(&'a str, &'a str)>,
    },
    Close {
        name: &'a str,
    },
    SelfClosing {
        name: &'a str,
        attributes: Vec<(&'a str, &'a str)>,
    },
}

impl<'a> Tag<'a> {
    pub fn name(&self) -> &'a str {
        match *self {
            Tag::Open { name, .. } | Tag::Close { name } | Tag::SelfClosing { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagError {
    /// Not shaped like a tag at all
    Malformed,
    /// The name was fine, the attribute list wasn't
    MalformedAttributes,
}

fn open_bracket(input: &str) -> IResult<&str, char> {
    terminated(char('<'), multispace0)(input)
}

fn slash(input: &str) -> IResult<&str, Option<char>> {
    opt(terminated(char('/'), multispace0))(input)
}

fn name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || "_-.:".contains(c))(input)
}

fn attribute_key(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && !"=\"/>".contains(c))(input)
}

fn attribute_value(input: &str) -> IResult<&str, &str> {
    delimited(
        char('"'),
        map(opt(is_not("\"")), |value: Option<&str>| value.unwrap_or("")),
        char('"'),
    )(input)
}

fn attributes(input: &str) -> IResult<&str, Vec<(&str, &str)>> {
    many0(preceded(
        multispace1,
        separated_pair(attribute_key, char('='), attribute_value),
    ))(input)
}

fn close_end(input: &str) -> IResult<&str, char> {
    all_consuming(preceded(multispace0, char('>')))(input)
}

/// Whitespace, an optional self-closing slash, and `>`
fn open_end(input: &str) -> IResult<&str, Option<char>> {
    all_consuming(terminated(
        preceded(multispace0, opt(char('/'))),
        tuple((multispace0, char('>'))),
    ))(input)
}

/// Parse a whole tag line (without its line terminator)
pub fn parse_tag(line: &str) -> Result<Tag, TagError> {
    let (rest, _) = open_bracket(line).map_err(|_| TagError::Malformed)?;
    let (rest, closing) = slash(rest).map_err(|_| TagError::Malformed)?;
    let (rest, name) = name(rest).map_err(|_| TagError::Malformed)?;

    if closing.is_some() {
        close_end(rest).map_err(|_| TagError::Malformed)?;
        return Ok(Tag::Close { name });
    }

    let (rest, attributes) = attributes(rest).map_err(|_| TagError::MalformedAttributes)?;
    match open_end(rest) {
        Ok((_, Some(_))) => Ok(Tag::SelfClosing { name, attributes }),
        Ok((_, None)) => Ok(Tag::Open { name, attributes }),
        Err(_) => {
            let leftover = rest.trim_start();
            if leftover.is_empty() || leftover.starts_with('>') {
                Err(TagError::Malformed)
            } else {
                Err(TagError::MalformedAttributes)
            }
        }
    }
}
