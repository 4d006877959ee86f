//! Parser for the whitespace-delimited structure description.
//!
//! # Format
//!
//! ```text
//! <numNodes>
//! (<nodeId> <F|N>)*
//! <numEnds>
//! (<nodeId1> <df1> <unused> <moment1> <nodeId2> <df2> <unused> <moment2>)*
//! ```
//!
//! `F` marks a fixed support, `N` a free joint. Each end record declares
//! one member. The unused fields must still be numbers. Line breaks carry
//! no meaning; any whitespace separates tokens.

use std::io;
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use hardy_core::{BuildError, NodeId, ParseError};

use crate::builder::{EndSpec, MemberSpec, NodeSpec};
use crate::structure::Structure;

/// Errors from loading a structure file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The text is not a valid structure description.
    #[error("malformed input: {0}")]
    Parse(#[from] ParseError),
    /// The description parsed but does not form a valid structure.
    #[error("invalid structure: {0}")]
    Build(#[from] BuildError),
}

/// Parse a description into node and member specs without building.
///
/// # Errors
///
/// [`ParseError`] on the first token that does not fit the format.
pub fn parse_specs(input: &str) -> Result<(Vec<NodeSpec>, Vec<MemberSpec>), ParseError> {
    let mut tokens = Tokens::new(input);

    let node_count = tokens.count("node count")?;
    let mut nodes = Vec::with_capacity(node_count.min(1 << 20));
    for _ in 0..node_count {
        let id = tokens.node_id("node id")?;
        let fixed = tokens.fixity()?;
        nodes.push(NodeSpec { id, fixed });
    }

    let member_count = tokens.count("end record count")?;
    let mut members = Vec::with_capacity(member_count.min(1 << 20));
    for _ in 0..member_count {
        let near = tokens.end_spec()?;
        let far = tokens.end_spec()?;
        members.push(MemberSpec::new(near, far));
    }

    tokens.finish()?;
    debug!(
        nodes = nodes.len(),
        members = members.len(),
        "parsed structure description"
    );
    Ok((nodes, members))
}

/// Parse and build a structure from its text description.
///
/// # Errors
///
/// [`LoadError::Parse`] for format errors, [`LoadError::Build`] for
/// unknown node ids and other construction failures.
pub fn parse_structure(input: &str) -> Result<Structure, LoadError> {
    let (nodes, members) = parse_specs(input)?;
    Ok(Structure::build(&nodes, &members)?)
}

/// Read, parse, and build a structure from a file.
///
/// # Errors
///
/// See [`parse_structure`]; additionally [`LoadError::Io`] if the file
/// cannot be read.
pub fn load_structure(path: impl AsRef<Path>) -> Result<Structure, LoadError> {
    let text = std::fs::read_to_string(path)?;
    parse_structure(&text)
}

/// Positioned token stream over the input.
struct Tokens<'a> {
    inner: std::iter::Enumerate<std::str::SplitWhitespace<'a>>,
    position: usize,
}

impl<'a> Tokens<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            inner: input.split_whitespace().enumerate(),
            position: 0,
        }
    }

    fn next(&mut self, expected: &'static str) -> Result<(usize, &'a str), ParseError> {
        match self.inner.next() {
            Some((pos, tok)) => {
                self.position = pos + 1;
                Ok((pos, tok))
            }
            None => Err(ParseError::UnexpectedEof {
                position: self.position,
                expected,
            }),
        }
    }

    fn count(&mut self, expected: &'static str) -> Result<usize, ParseError> {
        let (position, token) = self.next(expected)?;
        token.parse::<usize>().map_err(|_| ParseError::Malformed {
            position,
            token: token.to_string(),
            reason: format!("expected {expected} (non-negative integer)"),
        })
    }

    fn node_id(&mut self, expected: &'static str) -> Result<NodeId, ParseError> {
        let (position, token) = self.next(expected)?;
        token
            .parse::<u32>()
            .map(NodeId)
            .map_err(|_| ParseError::Malformed {
                position,
                token: token.to_string(),
                reason: format!("expected {expected} (non-negative integer)"),
            })
    }

    fn number(&mut self, expected: &'static str) -> Result<f64, ParseError> {
        let (position, token) = self.next(expected)?;
        token.parse::<f64>().map_err(|_| ParseError::Malformed {
            position,
            token: token.to_string(),
            reason: format!("expected {expected} (number)"),
        })
    }

    fn fixity(&mut self) -> Result<bool, ParseError> {
        let (position, token) = self.next("node fixity")?;
        match token {
            "F" => Ok(true),
            "N" => Ok(false),
            _ => Err(ParseError::Malformed {
                position,
                token: token.to_string(),
                reason: "expected node fixity 'F' or 'N'".to_string(),
            }),
        }
    }

    fn end_spec(&mut self) -> Result<EndSpec, ParseError> {
        let node = self.node_id("end node id")?;
        let df = self.number("distribution factor")?;
        self.number("unused end field")?;
        let moment = self.number("fixed-end moment")?;
        Ok(EndSpec { node, df, moment })
    }

    fn finish(mut self) -> Result<(), ParseError> {
        match self.inner.next() {
            None => Ok(()),
            Some((position, token)) => Err(ParseError::TrailingInput {
                position,
                token: token.to_string(),
            }),
        }
    }
}
