use crate::error::{Error, Result, TokenError};
use crate::shape::{ShapeKind, ShapeSpec};

pub const MAX_SHAPES_PER_CODE: usize = 5;

const TOKEN_SEPARATOR: char = '&';
const FIELD_SEPARATOR: char = '-';

/// Every token in order, either as a validated shape or as the error that
/// rejected it.
#[derive(Debug, Default)]
pub struct Batch {
    entries: Vec<std::result::Result<ShapeSpec, TokenError>>,
}

impl Batch {
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    fn shapes(&self) -> impl Iterator<Item = &ShapeSpec> {
        self.entries.iter().filter_map(|entry| entry.as_ref().ok())
    }

    #[cfg(test)]
    fn errors(&self) -> impl Iterator<Item = &TokenError> {
        self.entries.iter().filter_map(|entry| entry.as_ref().err())
    }

    pub fn into_entries(self) -> Vec<std::result::Result<ShapeSpec, TokenError>> {
        self.entries
    }
}

/// Splits `S-<side>`, `T-<a>-<b>-<c>` and `C-<diameter>` tokens joined by `&`.
///
/// Only an over-long batch fails as a whole. Each malformed or invalid token is
/// kept in the batch as a [`TokenError`] so the remaining tokens still run.
pub fn parse(raw: &str) -> Result<Batch> {
    let tokens: Vec<&str> = raw.trim().split(TOKEN_SEPARATOR).collect();
    if tokens.len() > MAX_SHAPES_PER_CODE {
        return Err(Error::TooManyShapes {
            count: tokens.len(),
            max: MAX_SHAPES_PER_CODE,
        });
    }

    let entries = tokens
        .into_iter()
        .enumerate()
        .map(|(i, token)| {
            parse_token(token).map_err(|error| TokenError {
                index: i + 1,
                token: token.trim().to_string(),
                error,
            })
        })
        .collect();

    Ok(Batch { entries })
}

pub fn parse_token(token: &str) -> Result<ShapeSpec> {
    let token = token.trim();
    let mut fields = token.split(FIELD_SEPARATOR);
    let letter = fields.next().unwrap_or_default();
    let values: Vec<&str> = fields.collect();

    let (kind, expected) = match letter.to_ascii_uppercase().as_str() {
        "S" => (ShapeKind::Square, 1),
        "T" => (ShapeKind::Triangle, 3),
        "C" => (ShapeKind::Circle, 1),
        _ => {
            return Err(Error::MalformedToken {
                token: token.to_string(),
                reason: "unknown shape type",
            });
        }
    };

    if values.len() != expected {
        return Err(Error::MalformedToken {
            token: token.to_string(),
            reason: match kind {
                ShapeKind::Triangle => "a triangle needs three side lengths",
                ShapeKind::Square => "a square needs one side length",
                ShapeKind::Circle => "a circle needs one diameter",
            },
        });
    }

    let numbers = values
        .iter()
        .map(|field| parse_number(field))
        .collect::<Result<Vec<i64>>>()?;

    match (kind, numbers.as_slice()) {
        (ShapeKind::Square, [side]) => ShapeSpec::square(*side),
        (ShapeKind::Triangle, [a, b, c]) => ShapeSpec::triangle(*a, *b, *c),
        (ShapeKind::Circle, [diameter]) => ShapeSpec::circle(*diameter),
        _ => Err(Error::MalformedToken {
            token: token.to_string(),
            reason: "wrong number of fields",
        }),
    }
}

fn parse_number(field: &str) -> Result<i64> {
    field
        .trim()
        .parse::<i64>()
        .map_err(|_| Error::InvalidNumber(field.to_string()))
}
