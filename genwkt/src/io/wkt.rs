//! Structure of WKT coordinate reference system descriptions.
//!
//! The grammar handled is the generic WKT shape: `KEYWORD[arg, ...]` (or
//! parentheses) where arguments are quoted strings, numbers, bare keywords
//! such as `EAST`, or nested nodes. Interpreting the CRS is left to PROJ;
//! the tree is only used to split a compound CRS into its parts.

use std::fmt;

use crate::crs::{GeoidModel, ResolvedCrs};
use crate::error::{GeoError, Result};

const PROJECTED: [&str; 2] = ["PROJCS", "PROJCRS"];
const COMPOUND: [&str; 2] = ["COMPD_CS", "COMPOUNDCRS"];
const VERTICAL: [&str; 2] = ["VERT_CS", "VERTCRS"];

/// One argument of a WKT node.
#[derive(Debug, Clone, PartialEq)]
pub enum WktValue {
    Node(WktNode),
    Text(String),
    Number(f64),
    Keyword(String),
}

/// A `KEYWORD[...]` element.
#[derive(Debug, Clone, PartialEq)]
pub struct WktNode {
    pub keyword: String,
    pub args: Vec<WktValue>,
}

impl WktNode {
    /// First direct child node with the given keyword (case-insensitive).
    pub fn child(&self, keyword: &str) -> Option<&WktNode> {
        self.children().find(|n| n.keyword.eq_ignore_ascii_case(keyword))
    }

    pub fn children(&self) -> impl Iterator<Item = &WktNode> {
        self.args.iter().filter_map(|a| match a {
            WktValue::Node(n) => Some(n),
            _ => None,
        })
    }

    /// Leading quoted name argument.
    pub fn name(&self) -> Option<&str> {
        match self.args.first() {
            Some(WktValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// The `index`-th numeric argument.
    pub fn number(&self, index: usize) -> Option<f64> {
        self.args
            .iter()
            .filter_map(|a| match a {
                WktValue::Number(v) => Some(*v),
                _ => None,
            })
            .nth(index)
    }

    /// First direct child whose keyword is one of `keywords`.
    pub fn child_of(&self, keywords: &[&str]) -> Option<&WktNode> {
        self.children()
            .find(|n| keywords.iter().any(|k| n.keyword.eq_ignore_ascii_case(k)))
    }

    fn is_one_of(&self, keywords: &[&str]) -> bool {
        keywords.iter().any(|k| self.keyword.eq_ignore_ascii_case(k))
    }

    /// True when any quoted string in this subtree contains `needle`.
    fn mentions(&self, needle: &str) -> bool {
        let needle = needle.to_ascii_lowercase();
        self.args.iter().any(|a| match a {
            WktValue::Text(s) => s.to_ascii_lowercase().contains(&needle),
            WktValue::Node(n) => n.mentions(&needle),
            _ => false,
        })
    }
}

impl fmt::Display for WktValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WktValue::Node(n) => write!(f, "{}", n),
            WktValue::Text(s) => write!(f, "\"{}\"", s.replace('"', "\"\"")),
            WktValue::Number(v) => write!(f, "{}", v),
            WktValue::Keyword(k) => f.write_str(k),
        }
    }
}

/// Compact single-line WKT, always with square brackets.
impl fmt::Display for WktNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", self.keyword)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", arg)?;
        }
        f.write_str("]")
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, msg: &str) -> GeoError {
        GeoError::Definition(format!("{} at offset {}", msg, self.pos))
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }

    fn keyword(&mut self) -> Result<String> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        if start == self.pos {
            return Err(self.error("expected keyword"));
        }
        Ok(self.src[start..self.pos].to_string())
    }

    fn node_or_keyword(&mut self) -> Result<WktValue> {
        let keyword = self.keyword()?;
        self.skip_ws();
        let close = match self.peek() {
            Some('[') => ']',
            Some('(') => ')',
            _ => return Ok(WktValue::Keyword(keyword)),
        };
        self.pos += 1;
        let mut args = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some(c) if c == close => {
                    self.pos += 1;
                    break;
                }
                None => return Err(self.error("unterminated node")),
                _ => {}
            }
            args.push(self.value()?);
            self.skip_ws();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(c) if c == close => {}
                Some(_) => return Err(self.error("expected ',' or closing bracket")),
                None => return Err(self.error("unterminated node")),
            }
        }
        Ok(WktValue::Node(WktNode { keyword, args }))
    }

    fn value(&mut self) -> Result<WktValue> {
        match self.peek() {
            Some('"') => self.text(),
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => self.number(),
            Some(c) if c.is_ascii_alphabetic() => self.node_or_keyword(),
            _ => Err(self.error("unexpected character")),
        }
    }

    fn text(&mut self) -> Result<WktValue> {
        self.pos += 1;
        let mut out = String::new();
        loop {
            let c = self.peek().ok_or_else(|| self.error("unterminated string"))?;
            self.pos += c.len_utf8();
            if c == '"' {
                // doubled quote is an escaped quote
                if self.peek() == Some('"') {
                    self.pos += 1;
                    out.push('"');
                } else {
                    return Ok(WktValue::Text(out));
                }
            } else {
                out.push(c);
            }
        }
    }

    fn number(&mut self) -> Result<WktValue> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E') {
                self.pos += 1;
            } else {
                break;
            }
        }
        self.src[start..self.pos]
            .parse::<f64>()
            .map(WktValue::Number)
            .map_err(|_| self.error("malformed number"))
    }
}

/// Parses WKT text into its node tree.
pub fn parse_wkt(text: &str) -> Result<WktNode> {
    let mut parser = Parser { src: text, pos: 0 };
    parser.skip_ws();
    let root = match parser.node_or_keyword()? {
        WktValue::Node(node) => node,
        _ => return Err(parser.error("expected a bracketed WKT element")),
    };
    parser.skip_ws();
    if parser.pos != text.len() {
        return Err(parser.error("trailing characters after WKT"));
    }
    Ok(root)
}

/// Splits a projected, optionally compound, CRS into the projected part
/// and the description of its vertical part.
///
/// Compound CRSs are recognised as using a geoid model when their vertical
/// component mentions it by name.
pub fn resolve_wkt(text: &str) -> Result<ResolvedCrs> {
    let root = parse_wkt(text)?;
    if root.is_one_of(&PROJECTED) {
        return Ok(ResolvedCrs {
            name: root.name().unwrap_or("unknown").to_string(),
            horizontal: text.trim().to_string(),
            vertical: None,
            geoid: None,
        });
    }
    if !root.is_one_of(&COMPOUND) {
        return Err(GeoError::Definition(format!(
            "unsupported CRS type {}, expected a projected or compound CRS",
            root.keyword
        )));
    }
    let projected = root.child_of(&PROJECTED).ok_or_else(|| {
        GeoError::Definition(format!("{} without a projected CRS", root.keyword))
    })?;
    let vertical = root.child_of(&VERTICAL);
    let geoid = vertical
        .filter(|v| v.mentions(GeoidModel::Egm2008.name()))
        .map(|_| GeoidModel::Egm2008);
    log::debug!(
        "compound CRS '{}' with vertical part {:?}, geoid {:?}",
        root.name().unwrap_or(""),
        vertical.and_then(WktNode::name),
        geoid
    );
    Ok(ResolvedCrs {
        name: projected.name().unwrap_or("unknown").to_string(),
        horizontal: projected.to_string(),
        vertical: vertical.map(|v| v.name().unwrap_or("unknown").to_string()),
        geoid,
    })
}
