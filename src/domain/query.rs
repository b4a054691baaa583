//! Tree query: search term or URL, with an optional `#N` table selector.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::error::{DomainError, DomainResult};

fn selector_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?P<term>.+?)#(?P<index>\d+)$").expect("valid regex"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeQuery {
    /// Search term or absolute URL
    pub term: String,
    /// 1-based position of the wanted clade table
    pub index: Option<usize>,
}

impl TreeQuery {
    /// Parse `Felidae`, `Felidae#2` or `https://…/wiki/Felidae#2`.
    pub fn parse(input: &str) -> DomainResult<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(DomainError::InvalidSelector("empty search term".into()));
        }

        let Some(caps) = selector_regex().captures(input) else {
            return Ok(Self {
                term: input.to_string(),
                index: None,
            });
        };

        let index: usize = caps["index"]
            .parse()
            .map_err(|_| DomainError::InvalidSelector(input.to_string()))?;
        if index == 0 {
            return Err(DomainError::InvalidSelector(format!(
                "{input}: tree positions start at 1"
            )));
        }
        Ok(Self {
            term: caps["term"].trim().to_string(),
            index: Some(index),
        })
    }
}
