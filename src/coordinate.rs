//! Package coordinate parsing.
//!
//! ```text
//! coordinate := id "," version [ "," framework-moniker ]
//! framework-moniker := <any string, may itself contain commas; joined back with "," after split>
//! ```

use std::fmt;

/// A `(id, version, framework?)` triple parsed from a caller-supplied
/// reference string by splitting on commas. Splitting is unconditional; a
/// framework moniker that itself contains commas (e.g.
/// `.NETStandard,Version=v2.0`-shaped tokens from the original NuGet-style
/// domain this crate's package references were modeled on) is reassembled by
/// rejoining every field after the second with `,`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageCoordinate {
    pub id: String,
    pub version: String,
    pub framework: Option<String>,
}

impl PackageCoordinate {
    /// Parses a coordinate string. Returns `None` when fewer than two
    /// comma-separated fields are present (malformed).
    pub fn parse(raw: &str) -> Option<Self> {
        let mut fields = raw.split(',');
        let id = fields.next()?;
        let version = fields.next()?;
        let rest: Vec<&str> = fields.collect();
        let framework = if rest.is_empty() { None } else { Some(rest.join(",")) };
        Some(Self { id: id.to_string(), version: version.to_string(), framework })
    }

    /// The framework moniker, treating an empty string the same as absent.
    pub fn framework(&self) -> Option<&str> {
        self.framework.as_deref().filter(|f| !f.is_empty())
    }

    pub fn coordinate_string(&self) -> String {
        match self.framework() {
            Some(f) => format!("{},{},{}", self.id, self.version, f),
            None => format!("{},{}", self.id, self.version),
        }
    }

    /// Parses [`Self::version`] as a semantic version, if it happens to be
    /// one. A coordinate's version field is an opaque string as far as
    /// resolution is concerned (exact match against what the source
    /// publishes); this is only used for diagnostics.
    pub fn parsed_version(&self) -> Option<semver::Version> {
        semver::Version::parse(&self.version).ok()
    }
}

impl fmt::Display for PackageCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.coordinate_string())
    }
}
