//! Gem version numbers, parsed and ordered the way RubyGems orders them.
//!
//! A version is a dot-separated list of segments. Segments are either
//! numeric or alphabetic; an alphabetic segment anywhere marks the version
//! as a prerelease, and prereleases sort before the release they lead up to
//! (`1.0.0.rc1 < 1.0.0`). A `-` separator is shorthand for a `pre` segment,
//! so `1.2.3-1` parses as `1.2.3.pre.1`.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    #[error("Malformed version number string {version}")]
    Malformed { version: String },
    #[error("Invalid segment in version: {segment}")]
    InvalidSegment { segment: String },
    #[error("Version cannot contain newlines: {version}")]
    ContainsNewlines { version: String },
    #[error("Version cannot contain consecutive dots: {version}")]
    ConsecutiveDots { version: String },
    #[error("Version cannot be pure alphabetic: {version}")]
    PureAlphabetic { version: String },
}

/// One dot-separated piece of a version number.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    Number(u32),
    Text(String),
}

impl Segment {
    pub fn is_zero(&self) -> bool {
        matches!(self, Self::Number(0))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Segment::Number(n) => write!(f, "{n}"),
            Segment::Text(s) => write!(f, "{s}"),
        }
    }
}

/// A parsed gem version. Keeps the normalized source string alongside its
/// segments, so `Display` round-trips what the lockfile said.
#[derive(Debug, Clone, Eq)]
pub struct Version {
    version: String,
    segments: Vec<Segment>,
}

impl Version {
    pub fn new(version: impl AsRef<str>) -> Result<Self, VersionError> {
        let normalized = normalize(version.as_ref())?;
        let segments = split_segments(&normalized)?;
        Ok(Self {
            version: normalized,
            segments,
        })
    }

    /// The normalized version string, e.g. `"1.2.3"`.
    pub fn as_str(&self) -> &str {
        &self.version
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Any textual segment makes the whole version a prerelease.
    pub fn is_prerelease(&self) -> bool {
        self.segments.iter().any(Segment::is_text)
    }

    /// Segments with trailing zeros removed, used for equality and ordering
    /// so that `1.0` == `1.0.0`. Zeros are trimmed independently from the
    /// release part and the prerelease tail: `1.0.0.a.1.0` -> `1.a.1`.
    fn canonical_segments(&self) -> Vec<Segment> {
        let split = self
            .segments
            .iter()
            .position(Segment::is_text)
            .unwrap_or(self.segments.len());
        let (release, prerelease) = self.segments.split_at(split);

        let mut canonical = trim_trailing_zeros(release);
        canonical.extend(trim_trailing_zeros(prerelease));
        canonical
    }
}

fn trim_trailing_zeros(segments: &[Segment]) -> Vec<Segment> {
    let keep = segments
        .iter()
        .rposition(|s| !s.is_zero())
        .map(|last| last + 1)
        .unwrap_or(segments.len().min(1));
    segments[..keep].to_vec()
}

fn normalize(version: &str) -> Result<String, VersionError> {
    match version.trim() {
        "" => Ok("0".into()),
        v if v.lines().count() > 1 => Err(VersionError::ContainsNewlines { version: v.into() }),
        v if v.contains("..") => Err(VersionError::ConsecutiveDots { version: v.into() }),
        v if v.chars().all(|c| c.is_alphabetic()) => {
            Err(VersionError::PureAlphabetic { version: v.into() })
        }
        v if v.ends_with('.') || v.contains(' ') => {
            Err(VersionError::Malformed { version: v.into() })
        }
        v => Ok(v.into()),
    }
}

fn split_segments(version: &str) -> Result<Vec<Segment>, VersionError> {
    let mut segments = Vec::new();
    let mut current = String::new();

    for ch in version.chars() {
        match ch {
            '.' => flush_segment(&mut current, &mut segments)?,
            '-' => {
                // A dash separates the prerelease tail: 1.2.3-1 == 1.2.3.pre.1
                flush_segment(&mut current, &mut segments)?;
                segments.push(Segment::Text("pre".to_string()));
            }
            _ => current.push(ch),
        }
    }
    flush_segment(&mut current, &mut segments)?;

    if segments.is_empty() {
        segments.push(Segment::Number(0));
    }
    Ok(segments)
}

fn flush_segment(current: &mut String, segments: &mut Vec<Segment>) -> Result<(), VersionError> {
    if current.is_empty() {
        return Ok(());
    }
    let segment = if let Ok(num) = current.parse::<u32>() {
        Segment::Number(num)
    } else if current.chars().all(|c| c.is_alphanumeric()) {
        Segment::Text(current.clone())
    } else {
        return Err(VersionError::InvalidSegment {
            segment: current.clone(),
        });
    };
    segments.push(segment);
    current.clear();
    Ok(())
}

impl Default for Version {
    fn default() -> Self {
        Version {
            version: "0".to_string(),
            segments: vec![Segment::Number(0)],
        }
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_segments() == other.canonical_segments()
    }
}

impl std::hash::Hash for Version {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.canonical_segments().hash(state);
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.version)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;

        let lhs = self.canonical_segments();
        let rhs = other.canonical_segments();
        let zero = Segment::Number(0);

        for i in 0..lhs.len().max(rhs.len()) {
            let a = lhs.get(i).unwrap_or(&zero);
            let b = rhs.get(i).unwrap_or(&zero);

            let ordering = match (a, b) {
                (Segment::Number(a), Segment::Number(b)) => a.cmp(b),
                // Text sorts before numbers: 1.0.a < 1.0.0
                (Segment::Number(_), Segment::Text(_)) => Ordering::Greater,
                (Segment::Text(_), Segment::Number(_)) => Ordering::Less,
                (Segment::Text(a), Segment::Text(b)) => cmp_text(a, b),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

/// Compare textual segments piecewise so that `a10 > a9`.
fn cmp_text(a: &str, b: &str) -> std::cmp::Ordering {
    use std::cmp::Ordering;

    let a_parts = split_runs(a);
    let b_parts = split_runs(b);

    for (a_part, b_part) in a_parts.iter().zip(b_parts.iter()) {
        let ordering = match (a_part.parse::<u32>(), b_part.parse::<u32>()) {
            (Ok(a_num), Ok(b_num)) => a_num.cmp(&b_num),
            _ => a_part.as_str().cmp(b_part.as_str()),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    a_parts.len().cmp(&b_parts.len())
}

/// Split into alternating digit and non-digit runs: "rc10" -> ["rc", "10"].
fn split_runs(s: &str) -> Vec<String> {
    let mut parts: Vec<String> = Vec::new();
    let mut last_was_digit = None;

    for ch in s.chars() {
        let is_digit = ch.is_ascii_digit();
        match parts.last_mut() {
            Some(part) if last_was_digit == Some(is_digit) => part.push(ch),
            _ => parts.push(ch.to_string()),
        }
        last_was_digit = Some(is_digit);
    }
    parts
}

impl std::str::FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, VersionError> {
        Version::new(s)
    }
}
