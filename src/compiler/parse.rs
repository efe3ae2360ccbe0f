//! Line-based parser for `.vc` class sources.
//!
//! Grammar, one declaration per line:
//!
//! ```text
//! class <Name>
//! field <name>: <Type>
//! method <name>(<param>: <Type>, ...) -> <Type>:
//!     return [<literal>]
//! ```
//!
//! Blank lines and `#` comments are ignored. A `method` line must be
//! followed by exactly one indented `return` line.

use thiserror::Error;

use super::ast::{ClassDecl, FieldDecl, MethodDecl, ReturnStmt, TypeAnnotation};

/// A parse failure with the 1-based source line it occurred on.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl ParseError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Parse a full `.vc` source into a [`ClassDecl`].
pub fn parse(source: &str) -> Result<ClassDecl, ParseError> {
    let mut lines = source
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l))
        .filter(|(_, l)| {
            let t = l.trim();
            !t.is_empty() && !t.starts_with('#')
        })
        .peekable();

    let (line_no, first) = lines
        .next()
        .ok_or_else(|| ParseError::new(1, "empty source: expected a class declaration"))?;
    let class_name = parse_class_line(line_no, first.trim())?;

    let mut fields = Vec::new();
    let mut methods = Vec::new();

    while let Some((line_no, line)) = lines.next() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("field ") {
            fields.push(parse_field(line_no, rest)?);
        } else if let Some(rest) = trimmed.strip_prefix("method ") {
            let (name, params, ret) = parse_method_signature(line_no, rest)?;
            let (body_line_no, body_line) = lines.next().ok_or_else(|| {
                ParseError::new(line_no, format!("method '{}' has no body", name))
            })?;
            if !body_line.starts_with([' ', '\t']) {
                return Err(ParseError::new(
                    body_line_no,
                    format!("method '{}' body must be an indented 'return' line", name),
                ));
            }
            let body = parse_return(body_line_no, body_line.trim())?;
            methods.push(MethodDecl {
                name,
                params,
                ret,
                body,
            });
        } else if trimmed.starts_with("class ") {
            return Err(ParseError::new(
                line_no,
                "only one class declaration is allowed per source file",
            ));
        } else {
            return Err(ParseError::new(
                line_no,
                format!("expected 'field' or 'method', found '{}'", trimmed),
            ));
        }
    }

    Ok(ClassDecl {
        name: class_name,
        fields,
        methods,
    })
}

fn parse_class_line(line_no: usize, line: &str) -> Result<String, ParseError> {
    let name = line
        .strip_prefix("class ")
        .ok_or_else(|| ParseError::new(line_no, "source must start with 'class <Name>'"))?
        .trim();
    parse_ident(line_no, name)
}

fn parse_field(line_no: usize, rest: &str) -> Result<FieldDecl, ParseError> {
    let (name, ty) = rest
        .split_once(':')
        .ok_or_else(|| ParseError::new(line_no, "expected 'field <name>: <Type>'"))?;
    Ok(FieldDecl {
        name: parse_ident(line_no, name.trim())?,
        ty: parse_type(line_no, ty.trim())?,
    })
}

fn parse_method_signature(
    line_no: usize,
    rest: &str,
) -> Result<(String, Vec<(String, TypeAnnotation)>, TypeAnnotation), ParseError> {
    let rest = rest
        .strip_suffix(':')
        .ok_or_else(|| ParseError::new(line_no, "method signature must end with ':'"))?;
    let (head, ret) = rest
        .split_once("->")
        .ok_or_else(|| ParseError::new(line_no, "method signature must declare '-> <Type>'"))?;
    let ret = parse_type(line_no, ret.trim())?;

    let head = head.trim();
    let open = head
        .find('(')
        .ok_or_else(|| ParseError::new(line_no, "expected '(' in method signature"))?;
    let close = head
        .rfind(')')
        .ok_or_else(|| ParseError::new(line_no, "expected ')' in method signature"))?;
    if close < open {
        return Err(ParseError::new(line_no, "mismatched parentheses"));
    }

    let name = parse_ident(line_no, head[..open].trim())?;
    let mut params = Vec::new();
    let param_list = head[open + 1..close].trim();
    if !param_list.is_empty() {
        for part in param_list.split(',') {
            let (pname, pty) = part.split_once(':').ok_or_else(|| {
                ParseError::new(line_no, "expected '<name>: <Type>' parameter")
            })?;
            params.push((
                parse_ident(line_no, pname.trim())?,
                parse_type(line_no, pty.trim())?,
            ));
        }
    }

    Ok((name, params, ret))
}

fn parse_return(line_no: usize, line: &str) -> Result<ReturnStmt, ParseError> {
    let rest = line
        .strip_prefix("return")
        .ok_or_else(|| ParseError::new(line_no, "method body must be a 'return' statement"))?
        .trim();

    if rest.is_empty() {
        return Ok(ReturnStmt::Unit);
    }
    if rest == "true" {
        return Ok(ReturnStmt::Bool(true));
    }
    if rest == "false" {
        return Ok(ReturnStmt::Bool(false));
    }
    if let Some(inner) = rest.strip_prefix('"') {
        let inner = inner
            .strip_suffix('"')
            .ok_or_else(|| ParseError::new(line_no, "unterminated string literal"))?;
        return Ok(ReturnStmt::Str(inner.to_string()));
    }
    rest.parse::<i64>()
        .map(ReturnStmt::Int)
        .map_err(|_| ParseError::new(line_no, format!("invalid return literal '{}'", rest)))
}

fn parse_type(line_no: usize, text: &str) -> Result<TypeAnnotation, ParseError> {
    match text {
        "Unit" => Ok(TypeAnnotation::Unit),
        "Int" => Ok(TypeAnnotation::Int),
        "Bool" => Ok(TypeAnnotation::Bool),
        "Str" => Ok(TypeAnnotation::Str),
        other => Ok(TypeAnnotation::Named(parse_ident(line_no, other)?)),
    }
}

fn parse_ident(line_no: usize, text: &str) -> Result<String, ParseError> {
    let valid = !text.is_empty()
        && !text.starts_with(|c: char| c.is_ascii_digit())
        && text.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(text.to_string())
    } else {
        Err(ParseError::new(
            line_no,
            format!("invalid identifier '{}'", text),
        ))
    }
}
