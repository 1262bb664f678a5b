//! Query-string parsing into the option set the executor consumes.
//!
//! Only parameters starting with `$` are reserved. Everything else rides
//! along in the URL untouched, so page-link rewriting keeps foreign
//! parameters byte for byte intact.

use crate::error::QueryError;

/// The reserved query options, decoded out of a request URL.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// The URL the options were read from, unmodified.
    pub url: String,
    /// Raw `$filter` expression text, still unparsed.
    pub filter: Option<String>,
    /// Raw `$orderby` clause list, still unparsed.
    pub order_by: Option<String>,
    /// Page size cap. Absent means the page runs to the end.
    pub top: Option<usize>,
    /// Rows to drop before the page starts.
    pub skip: usize,
    /// Navigation paths to expand, comma-split.
    pub expand: Vec<String>,
}

impl QueryOptions {
    /// Reads the `$`-parameters out of a request URL. Unrecognized
    /// parameters are left alone; they only matter for paging links,
    /// which operate on the stored URL.
    pub fn from_url(url: &str) -> Result<QueryOptions, QueryError> {
        let mut options = QueryOptions {
            url: url.to_string(),
            ..QueryOptions::default()
        };
        let query = match url.split_once('?') {
            Some((_, query)) => query,
            None => return Ok(options),
        };
        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (raw_key, raw_value) = match pair.split_once('=') {
                Some((key, value)) => (key, value),
                None => (pair, ""),
            };
            let key = percent_decode(raw_key);
            let value = percent_decode(raw_value);
            match key.as_str() {
                "$filter" => options.filter = Some(value),
                "$orderby" => options.order_by = Some(value),
                "$top" => options.top = Some(parse_count("$top", &value)?),
                "$skip" => options.skip = parse_count("$skip", &value)?,
                "$expand" => {
                    options.expand = value
                        .split(',')
                        .map(str::trim)
                        .filter(|path| !path.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                _ => {}
            }
        }
        Ok(options)
    }
}

fn parse_count(name: &str, value: &str) -> Result<usize, QueryError> {
    value
        .parse::<usize>()
        .map_err(|_| QueryError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
        })
}

/// Decodes percent escapes and form-style `+` as space. Stray or truncated
/// escapes pass through literally instead of failing the whole query.
pub(crate) fn percent_decode(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                match (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi * 16 + lo);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_digit(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}
