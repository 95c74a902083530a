use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

const VERSION: &str = "1";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is not a page token issued by this server")]
    Malformed,

    #[error("token was issued for a different search")]
    ScopeMismatch,

    #[error("token range [{start}, {end}) does not match the requested range")]
    RangeMismatch { start: u64, end: u64 },

    #[error("token does not apply to this kind of request")]
    WrongShape,
}

/// Decoded position of a paginated search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    /// First page.
    Start,
    /// Index into the candidate source, plus a fingerprint of the filters
    /// that produced it.
    Index { offset: u64, scope: u32 },
    /// Byte offset inside the half-open range `[start, end)`.
    Range { offset: u64, start: u64, end: u64 },
}

impl Cursor {
    pub fn encode(&self) -> String {
        let raw = match self {
            Cursor::Start => return String::new(),
            Cursor::Index { offset, scope } => format!("{VERSION}.i.{offset}.{scope:08x}"),
            Cursor::Range { offset, start, end } => {
                format!("{VERSION}.r.{offset}.{start}.{end}")
            }
        };
        URL_SAFE_NO_PAD.encode(raw)
    }

    pub fn decode(token: &str) -> Result<Self, TokenError> {
        if token.is_empty() {
            return Ok(Cursor::Start);
        }
        let raw = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| TokenError::Malformed)?;
        let raw = String::from_utf8(raw).map_err(|_| TokenError::Malformed)?;

        let fields: Vec<&str> = raw.split('.').collect();
        let cursor = match fields.as_slice() {
            [VERSION, "i", offset, scope] => Cursor::Index {
                offset: parse_u64(offset)?,
                scope: u32::from_str_radix(scope, 16).map_err(|_| TokenError::Malformed)?,
            },
            [VERSION, "r", offset, start, end] => Cursor::Range {
                offset: parse_u64(offset)?,
                start: parse_u64(start)?,
                end: parse_u64(end)?,
            },
            _ => return Err(TokenError::Malformed),
        };

        // Only canonical encodings are accepted (no leading zeros, signs, case
        // variants).
        if cursor.encode() != token {
            return Err(TokenError::Malformed);
        }
        Ok(cursor)
    }
}

fn parse_u64(field: &str) -> Result<u64, TokenError> {
    field.parse().map_err(|_| TokenError::Malformed)
}

/// Fingerprint of the parameters that define one logical search.
///
/// Page size and the page token itself are deliberately excluded: a client
/// may change its page size between pages.
#[derive(Debug, Clone)]
pub struct SearchScope {
    hasher: crc32fast::Hasher,
}

impl SearchScope {
    pub fn new(endpoint: &str) -> Self {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(endpoint.as_bytes());
        Self { hasher }
    }

    pub fn with(mut self, field: impl AsRef<str>) -> Self {
        // Length-prefixed so ("ab", "c") and ("a", "bc") differ.
        let field = field.as_ref().as_bytes();
        self.hasher.update(&(field.len() as u64).to_le_bytes());
        self.hasher.update(field);
        self
    }

    pub fn with_all<I, S>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        fields.into_iter().fold(self, |scope, f| scope.with(f))
    }

    pub fn fingerprint(&self) -> u32 {
        self.hasher.clone().finalize()
    }
}
