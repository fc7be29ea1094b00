//! Field templates such as `"{index}/{max} eta {eta_td}"`.
//!
//! A placeholder is `{name}` or `{name:spec}` where `spec` is an optional
//! alignment (`<` or `>`), an optional width and an optional `.precision`.
//! `{{` and `}}` produce literal braces. Names are resolved through
//! [`Snapshot::lookup`], so unknown or absent fields render empty.

use std::fmt::Write as _;
use std::str::FromStr;

use tally_core::Snapshot;

/// Errors raised while compiling a template.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("unterminated placeholder starting at byte {0}")]
    Unterminated(usize),

    #[error("invalid format spec `{0}`")]
    InvalidSpec(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Spec {
    align: Option<Align>,
    width: usize,
    precision: Option<usize>,
}

impl Spec {
    fn parse(s: &str) -> Result<Self, TemplateError> {
        let invalid = || TemplateError::InvalidSpec(s.to_string());
        let mut spec = Spec::default();
        let mut rest = s;

        if let Some(r) = rest.strip_prefix('<') {
            spec.align = Some(Align::Left);
            rest = r;
        } else if let Some(r) = rest.strip_prefix('>') {
            spec.align = Some(Align::Right);
            rest = r;
        }

        let (width, precision) = match rest.split_once('.') {
            Some((w, p)) => (w, Some(p)),
            None => (rest, None),
        };
        if !width.is_empty() {
            spec.width = width.parse().map_err(|_| invalid())?;
        }
        if let Some(p) = precision {
            spec.precision = Some(p.parse().map_err(|_| invalid())?);
        }
        Ok(spec)
    }

    fn apply(self, body: &str, out: &mut String) {
        let pad = self.width.saturating_sub(console::measure_text_width(body));
        // Right-aligned unless asked otherwise.
        match self.align.unwrap_or(Align::Right) {
            Align::Left => {
                out.push_str(body);
                out.extend(std::iter::repeat(' ').take(pad));
            }
            Align::Right => {
                out.extend(std::iter::repeat(' ').take(pad));
                out.push_str(body);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Field { key: String, spec: Spec },
}

/// A compiled field template.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Compile `source`.
    pub fn compile(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            match c {
                '{' if chars.peek().map(|&(_, n)| n) == Some('{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek().map(|&(_, n)| n) == Some('}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut body = String::new();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        body.push(c);
                    }
                    if !closed {
                        return Err(TemplateError::Unterminated(pos));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    let (key, spec) = match body.split_once(':') {
                        Some((key, spec)) => (key, Spec::parse(spec)?),
                        None => (body.as_str(), Spec::default()),
                    };
                    segments.push(Segment::Field {
                        key: key.trim().to_string(),
                        spec,
                    });
                }
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { segments })
    }

    /// Names referenced by placeholders, in order of appearance.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Field { key, .. } => Some(key.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Render against `snapshot`.
    #[must_use]
    pub fn render(&self, snapshot: &Snapshot) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field { key, spec } => {
                    let mut body = String::new();
                    if let Some(value) = snapshot.lookup(key) {
                        let _ = match spec.precision {
                            Some(p) => write!(body, "{value:.p$}"),
                            None => write!(body, "{value}"),
                        };
                    }
                    spec.apply(&body, &mut out);
                }
            }
        }
        out
    }
}

impl FromStr for Template {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}
