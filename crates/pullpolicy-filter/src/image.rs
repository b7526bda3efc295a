//! Container image references
//!
//! Splits references such as `registry:5000/team/app:1.2@sha256:abc` into
//! name, tag and digest, and matches them against rule names.

use std::fmt::{self, Display, Formatter};

/// Parsed image reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageRef<'a> {
    /// Everything before the tag or digest, registry host included
    pub name: &'a str,
    /// Text after `:`
    pub tag: Option<&'a str>,
    /// Text after `@`
    pub digest: Option<&'a str>,
}

impl<'a> ImageRef<'a> {
    /// Split a reference into name, tag and digest
    ///
    /// Delimiters are searched after the first `/` only, so the port of a
    /// registry host stays part of the name.
    ///
    /// # Examples
    /// ```
    /// # use pullpolicy_filter::ImageRef;
    /// let image = ImageRef::parse("localhost:5000/nginx:1.14.2");
    /// assert_eq!(image.name, "localhost:5000/nginx");
    /// assert_eq!(image.tag, Some("1.14.2"));
    /// ```
    #[must_use]
    pub fn parse(reference: &'a str) -> Self {
        let offset = match reference.find('/') {
            Some(slash) if slash > 0 => slash,
            _ => 0,
        };
        let search = &reference[offset..];
        let colon = search.find(':').map(|i| i + offset);
        let at = search.find('@').map(|i| i + offset);

        match (colon, at) {
            (None, None) => Self {
                name: reference,
                tag: None,
                digest: None,
            },
            (Some(colon), None) => Self {
                name: &reference[..colon],
                tag: Some(&reference[colon + 1..]),
                digest: None,
            },
            (Some(colon), Some(at)) if colon < at => Self {
                name: &reference[..colon],
                tag: Some(&reference[colon + 1..at]),
                digest: Some(&reference[at + 1..]),
            },
            // `@` first: the colon belongs to the digest algorithm
            (_, Some(at)) => Self {
                name: &reference[..at],
                tag: None,
                digest: Some(&reference[at + 1..]),
            },
        }
    }
}

impl Display for ImageRef<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)?;
        if let Some(tag) = self.tag {
            write!(f, ":{tag}")?;
        }
        if let Some(digest) = self.digest {
            write!(f, "@{digest}")?;
        }
        Ok(())
    }
}

/// Check whether the image `value` is named `pattern`
///
/// Tag and digest are ignored: `nginx:1.14.2`, `nginx@sha256:..` and
/// `nginx` all match `nginx`.
#[inline]
#[must_use]
pub fn matches(value: &str, pattern: &str) -> bool {
    ImageRef::parse(value).name == pattern
}
