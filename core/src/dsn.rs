//! Connection-string templates.
//!
//! A template is literal text with named placeholders such as
//! `postgres://{username}:{password}@{host}:{port}/{database}`. `{{` and `}}`
//! stand for literal braces.

use thiserror::Error;

use crate::profiles::ConnectionProfile;

/// Names a template may refer to.
pub const PLACEHOLDERS: [&str; 6] = ["username", "password", "host", "port", "database", "schema"];

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{reason} at offset {offset}")]
pub struct TemplateError {
    pub offset: usize,
    pub reason: String,
}

#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

fn segments(template: &str) -> Result<Vec<Segment<'_>>, TemplateError> {
    let mut segments = Vec::new();
    let mut rest = template;

    while !rest.is_empty() {
        let Some(pos) = rest.find(['{', '}']) else {
            segments.push(Segment::Literal(rest));
            break;
        };
        if pos > 0 {
            segments.push(Segment::Literal(&rest[..pos]));
        }
        let tail = &rest[pos..];
        let offset = template.len() - tail.len();

        if tail.starts_with("{{") {
            segments.push(Segment::Literal("{"));
            rest = &tail[2..];
        } else if tail.starts_with("}}") {
            segments.push(Segment::Literal("}"));
            rest = &tail[2..];
        } else if tail.starts_with('}') {
            return Err(TemplateError {
                offset,
                reason: "unmatched '}'".into(),
            });
        } else {
            let Some(end) = tail.find('}') else {
                return Err(TemplateError {
                    offset,
                    reason: "unterminated placeholder".into(),
                });
            };
            let name = &tail[1..end];
            if !PLACEHOLDERS.contains(&name) {
                return Err(TemplateError {
                    offset,
                    reason: format!("unknown placeholder '{{{name}}}'"),
                });
            }
            segments.push(Segment::Placeholder(name));
            rest = &tail[end + 1..];
        }
    }

    Ok(segments)
}

/// Checks that `template` is well formed and only uses known placeholders.
pub fn check(template: &str) -> Result<(), TemplateError> {
    segments(template).map(|_| ())
}

/// Fills the placeholders of `template` from `profile`. Values are inserted
/// as typed; a missing schema renders as an empty string.
pub fn render(template: &str, profile: &ConnectionProfile) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len() + 32);
    for segment in segments(template)? {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Placeholder(name) => out.push_str(match name {
                "username" => profile.username.as_str(),
                "password" => profile.password.as_str(),
                "host" => profile.host.as_str(),
                "port" => profile.port.as_str(),
                "database" => profile.database.as_str(),
                _ => profile.schema_or_empty(),
            }),
        }
    }
    Ok(out)
}
