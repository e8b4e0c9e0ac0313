use serde_json::{Map, Value};

use crate::models::{ParsedAttributes, RawMovieRecord};

/// Crew job that identifies the director entry
const DIRECTOR_JOB: &str = "Director";

/// Reasons an attribute list could not be read
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("malformed attribute list: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("entry {index} has no string `{field}` field")]
    MissingField { index: usize, field: &'static str },
}

type Entry = Map<String, Value>;

fn parse_list(raw: &str) -> Result<Vec<Entry>, ParseError> {
    Ok(serde_json::from_str::<Vec<Entry>>(raw)?)
}

fn string_field<'a>(entry: &'a Entry, index: usize, field: &'static str) -> Result<&'a str, ParseError> {
    entry
        .get(field)
        .and_then(Value::as_str)
        .ok_or(ParseError::MissingField { index, field })
}

/// Collapses a multi-word name into one token ("Science Fiction" -> "ScienceFiction")
fn squash_whitespace(name: &str) -> String {
    name.split_whitespace().collect()
}

/// Extracts the `name` of every entry, failing the whole list on the first bad entry.
pub fn try_parse_entities(raw: &str) -> Result<Vec<String>, ParseError> {
    parse_list(raw)?
        .iter()
        .enumerate()
        .map(|(index, entry)| string_field(entry, index, "name").map(squash_whitespace))
        .filter(|name| !matches!(name, Ok(n) if n.is_empty()))
        .collect()
}

/// Extracts the director's name: the first entry, in list order, whose job is
/// "Director". Entries after the match are not inspected.
pub fn try_parse_director(raw: &str) -> Result<Vec<String>, ParseError> {
    for (index, entry) in parse_list(raw)?.iter().enumerate() {
        if string_field(entry, index, "job")? == DIRECTOR_JOB {
            let name = squash_whitespace(string_field(entry, index, "name")?);
            return Ok(if name.is_empty() { vec![] } else { vec![name] });
        }
    }
    Ok(vec![])
}

/// Best-effort variant of [`try_parse_entities`]: any parse failure yields an
/// empty sequence so one bad row never fails a corpus build.
pub fn parse_entities(raw: &str) -> Vec<String> {
    try_parse_entities(raw).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Discarding unparseable attribute list");
        Vec::new()
    })
}

/// Best-effort variant of [`try_parse_director`]
pub fn parse_director(raw: &str) -> Vec<String> {
    try_parse_director(raw).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Discarding unparseable crew list");
        Vec::new()
    })
}

impl ParsedAttributes {
    /// Parses every attribute list of a record, optionally keeping only the
    /// first `max_cast_members` cast entries.
    pub fn from_record(record: &RawMovieRecord, max_cast_members: Option<usize>) -> Self {
        let mut cast = parse_entities(&record.cast);
        if let Some(limit) = max_cast_members {
            cast.truncate(limit);
        }

        Self {
            genres: parse_entities(&record.genres),
            keywords: parse_entities(&record.keywords),
            cast,
            director: parse_director(&record.crew),
        }
    }
}
