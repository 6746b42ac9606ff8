//! Template parsing.
//!
//! Parsing runs in two passes: the source is split into text runs and
//! `{{ ... }}` tags, then the tags are assembled into a tree of blocks.

use std::vec::IntoIter;

use super::{Result, TemplateError};

/// Argument of a translation tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// `name="text"`
    Literal(String),
    /// `name=path`, resolved at render time.
    Path(String),
}

/// A node in the template tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal markup.
    Text(String),
    /// `{{path}}`, HTML escaped on output.
    Variable(String),
    /// `{{t "key" name=path}}`
    Translation { key: String, args: Vec<(String, Arg)> },
    /// `{{#if path}}...{{else}}...{{/if}}`
    If {
        condition: String,
        then_branch: Vec<Node>,
        else_branch: Vec<Node>,
    },
    /// `{{#unless path}}...{{/unless}}`
    Unless { condition: String, body: Vec<Node> },
    /// `{{#each path}}` or `{{#each path as name}}`
    Each {
        list: String,
        alias: Option<String>,
        body: Vec<Node>,
    },
}

#[derive(Debug)]
enum Token<'a> {
    Text(&'a str),
    Tag(&'a str),
}

/// Parse a template source into nodes.
pub fn parse(source: &str) -> Result<Vec<Node>> {
    let mut tokens = tokenize(source)?.into_iter();
    Ok(parse_until(&mut tokens, &[])?.0)
}

fn tokenize(source: &str) -> Result<Vec<Token<'_>>> {
    let mut tokens = Vec::new();
    let mut rest = source;

    while let Some(open) = rest.find("{{") {
        if open > 0 {
            tokens.push(Token::Text(&rest[..open]));
        }
        let after = &rest[open + 2..];
        let close = after.find("}}").ok_or_else(|| {
            let offset = source.len() - rest.len() + open;
            TemplateError::Parse(format!("unclosed tag at byte {offset}"))
        })?;
        tokens.push(Token::Tag(after[..close].trim()));
        rest = &after[close + 2..];
    }
    if !rest.is_empty() {
        tokens.push(Token::Text(rest));
    }
    Ok(tokens)
}

/// Collect nodes until one of `terminators` (or the end of input when
/// `terminators` is empty). Returns the tag that stopped the run.
fn parse_until(
    tokens: &mut IntoIter<Token<'_>>,
    terminators: &[&str],
) -> Result<(Vec<Node>, Option<String>)> {
    let mut nodes = Vec::new();

    while let Some(token) = tokens.next() {
        let tag = match token {
            Token::Text(text) => {
                nodes.push(Node::Text(text.to_string()));
                continue;
            }
            Token::Tag(tag) => tag,
        };

        if terminators.contains(&tag) {
            return Ok((nodes, Some(tag.to_string())));
        }
        if tag == "else" || tag.starts_with('/') {
            return Err(TemplateError::Parse(format!("unexpected {{{{{tag}}}}}")));
        }

        let node = if let Some(block) = tag.strip_prefix('#') {
            parse_block(tokens, block)?
        } else if let Some(args) = tag.strip_prefix("t ") {
            parse_translation(args)?
        } else {
            Node::Variable(path(tag)?)
        };
        nodes.push(node);
    }

    match terminators.last() {
        None => Ok((nodes, None)),
        Some(closing) => Err(TemplateError::Parse(format!(
            "missing {{{{{closing}}}}}"
        ))),
    }
}

fn parse_block(tokens: &mut IntoIter<Token<'_>>, header: &str) -> Result<Node> {
    let mut words = header.split_whitespace();
    let kind = words.next().unwrap_or_default();
    let target = path(words.next().unwrap_or_default())?;

    match kind {
        "if" => {
            no_more(words, header)?;
            let (then_branch, end) = parse_until(tokens, &["else", "/if"])?;
            let else_branch = if end.as_deref() == Some("else") {
                parse_until(tokens, &["/if"])?.0
            } else {
                Vec::new()
            };
            Ok(Node::If {
                condition: target,
                then_branch,
                else_branch,
            })
        }
        "unless" => {
            no_more(words, header)?;
            let (body, _) = parse_until(tokens, &["/unless"])?;
            Ok(Node::Unless {
                condition: target,
                body,
            })
        }
        "each" => {
            let alias = match (words.next(), words.next()) {
                (None, _) => None,
                (Some("as"), Some(name)) => Some(path(name)?),
                _ => return Err(TemplateError::Parse(format!("bad block {{{{#{header}}}}}"))),
            };
            no_more(words, header)?;
            let (body, _) = parse_until(tokens, &["/each"])?;
            Ok(Node::Each {
                list: target,
                alias,
                body,
            })
        }
        _ => Err(TemplateError::Parse(format!("unknown block #{kind}"))),
    }
}

fn no_more<'a>(mut words: impl Iterator<Item = &'a str>, header: &str) -> Result<()> {
    match words.next() {
        None => Ok(()),
        Some(_) => Err(TemplateError::Parse(format!("bad block {{{{#{header}}}}}"))),
    }
}

/// `"key" name=path name="text"`
fn parse_translation(args: &str) -> Result<Node> {
    let (key, mut rest) = quoted(args.trim_start())?;
    let mut parsed = Vec::new();

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        let (name, value) = rest
            .split_once('=')
            .ok_or_else(|| TemplateError::Parse(format!("bad translation argument: {rest}")))?;
        let name = path(name.trim())?;

        let value = value.trim_start();
        let arg = if value.starts_with('"') {
            let (literal, after) = quoted(value)?;
            rest = after;
            Arg::Literal(literal)
        } else {
            let end = value.find(char::is_whitespace).unwrap_or(value.len());
            rest = &value[end..];
            Arg::Path(path(&value[..end])?)
        };
        parsed.push((name, arg));
    }

    Ok(Node::Translation { key, args: parsed })
}

/// Split a leading `"..."` off `input`.
fn quoted(input: &str) -> Result<(String, &str)> {
    let body = input
        .strip_prefix('"')
        .ok_or_else(|| TemplateError::Parse(format!("expected a quoted string: {input}")))?;
    let end = body
        .find('"')
        .ok_or_else(|| TemplateError::Parse("unterminated string".to_string()))?;
    Ok((body[..end].to_string(), &body[end + 1..]))
}

/// A dotted variable path such as `app.status_label`.
fn path(candidate: &str) -> Result<String> {
    let valid = !candidate.is_empty()
        && candidate.split('.').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        });
    if valid {
        Ok(candidate.to_string())
    } else {
        Err(TemplateError::Parse(format!("bad path '{candidate}'")))
    }
}
