//! Dotted-path field extraction from decoded messages
//!
//! A [`Path`] such as `Ubx.Nav.RelPosNed.i_tow` names a nested field of a
//! [`Message`]. Segments are keys when applied to a mapping and base-10
//! indices when applied to a sequence.
//!
//! # Example
//!
//! ```
//! use gps_socket::path::{self, Path};
//! use serde_json::json;
//!
//! let msg = json!({"xs": [10, 20, 30], "a": {"b": 1}});
//! let paths = Path::parse_list("xs.1,a.c,a.b");
//!
//! let fields: Vec<_> = path::filter(&msg, &paths)
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(fields, vec![("xs.1".to_string(), &json!(20)), ("a.b".to_string(), &json!(1))]);
//! ```

use crate::{Result, error::GpsSocketError, protocol::Message};

/// An ordered sequence of key/index segments naming a nested field
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// Separator between segments in the textual form of a path
    pub const SEPARATOR: char = '.';

    /// Creates a path from its segments
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Path {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Splits a dotted string into a path
    ///
    /// Every `.` separates two segments. An empty string yields a path with
    /// a single empty segment.
    pub fn parse(s: &str) -> Self {
        Path::new(s.split(Self::SEPARATOR))
    }

    /// Parses a comma-separated list of dotted paths, skipping blank entries
    pub fn parse_list(s: &str) -> Vec<Path> {
        s.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(Path::parse)
            .collect()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// A path without segments resolves to the message itself
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl core::fmt::Display for Path {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", Self::SEPARATOR)?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl core::str::FromStr for Path {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        Ok(Path::parse(s))
    }
}

impl From<&str> for Path {
    fn from(s: &str) -> Self {
        Path::parse(s)
    }
}

impl From<Vec<String>> for Path {
    fn from(segments: Vec<String>) -> Self {
        Path { segments }
    }
}

fn kind_of(value: &Message) -> &'static str {
    match value {
        Message::Null => "null",
        Message::Bool(_) => "a boolean",
        Message::Number(_) => "a number",
        Message::String(_) => "a string",
        Message::Array(_) => "a sequence",
        Message::Object(_) => "a mapping",
    }
}

/// Resolves `path` against `message`
///
/// # Returns
/// * `Ok(Some(value))` - The value at the end of the path, of any shape
/// * `Ok(None)` - A mapping along the way lacks the requested key
///
/// # Errors
/// * `PathIndex` - A sequence was indexed out of bounds
/// * `PathType` - A sequence was given a non-numeric segment, or a scalar
///   was reached before the path ended
pub fn lookup<'m>(message: &'m Message, path: &Path) -> Result<Option<&'m Message>> {
    let mut current = message;

    for segment in path.segments() {
        current = match current {
            Message::Object(map) => match map.get(segment) {
                Some(value) => value,
                None => return Ok(None),
            },
            Message::Array(items) => {
                let index: usize = segment.parse().map_err(|_| GpsSocketError::PathType {
                    path: path.to_string(),
                    segment: segment.clone(),
                    found: kind_of(current),
                })?;
                items.get(index).ok_or_else(|| GpsSocketError::PathIndex {
                    path: path.to_string(),
                    index,
                    len: items.len(),
                })?
            }
            scalar => {
                return Err(GpsSocketError::PathType {
                    path: path.to_string(),
                    segment: segment.clone(),
                    found: kind_of(scalar),
                });
            }
        };
    }

    Ok(Some(current))
}

/// Lazily resolves every path in `paths` against `message`, in order
///
/// Absent fields are skipped. Each present field is paired with its path
/// joined by `.`. See [`Filter`].
pub fn filter<'m, 'p, I>(message: &'m Message, paths: I) -> Filter<'m, I::IntoIter>
where
    I: IntoIterator<Item = &'p Path>,
{
    Filter {
        message,
        paths: paths.into_iter(),
        failed: false,
    }
}

/// Iterator returned by [`filter`]
///
/// Every path is resolved from the message root, independently of the
/// others. The first lookup error is yielded once, after which the iterator
/// is exhausted.
#[derive(Debug, Clone)]
pub struct Filter<'m, I> {
    message: &'m Message,
    paths: I,
    failed: bool,
}

impl<'m, 'p, I> Iterator for Filter<'m, I>
where
    I: Iterator<Item = &'p Path>,
{
    type Item = Result<(String, &'m Message)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        for path in self.paths.by_ref() {
            match lookup(self.message, path) {
                Ok(Some(value)) => return Some(Ok((path.to_string(), value))),
                Ok(None) => continue,
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            }
        }
        None
    }
}

impl<'m, 'p, I> core::iter::FusedIterator for Filter<'m, I> where I: Iterator<Item = &'p Path> {}
