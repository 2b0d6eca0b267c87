//! A tolerant, single-pass Gemfile.lock scanner.
//!
//! The outer loop walks the file line by line and dispatches on section
//! headers (`GEM`, `GIT`, `PATH`, `PLUGIN SOURCE`, `PLATFORMS`,
//! `DEPENDENCIES`, `RUBY VERSION`, `BUNDLED WITH`, `CHECKSUMS`). Each section
//! consumes lines until the next header and returns the resume position, so
//! there is no backtracking and no lookahead beyond "is this line a header".
//!
//! Lines that match no known shape are skipped rather than rejected:
//! lockfiles grow new sections over time and partial parseability should not
//! block the rest of the pipeline. `parse` is total over any input string.

use winnow::{
    ModalResult, Parser,
    combinator::{delimited, opt, preceded},
    token::{rest, take_while},
};

use crate::datatypes::*;

/// Parse lockfile text into a [`Lockfile`]. Never fails; unrecognized lines
/// are dropped and absent sections come back as empty collections.
pub fn parse(text: &str) -> Lockfile<'_> {
    let lines: Vec<&str> = text
        .lines()
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();

    let mut lockfile = Lockfile::default();
    let mut i = 0;

    while i < lines.len() {
        match header(lines[i]) {
            Some(Header::Source(kind)) => {
                let (source, next) = scan_source(kind, &lines, i + 1);
                lockfile.sources.push(source);
                i = next;
            }
            Some(Header::Platforms) => {
                let (platforms, next) = scan_platforms(&lines, i + 1);
                lockfile.platforms = platforms;
                i = next;
            }
            Some(Header::Dependencies) => {
                let (dependencies, next) = scan_dependencies(&lines, i + 1);
                lockfile.dependencies = dependencies;
                i = next;
            }
            Some(Header::RubyVersion) => {
                let (value, next) = scan_value_line(&lines, i + 1);
                lockfile.ruby_version = value.map(ruby_version_value);
                i = next;
            }
            Some(Header::BundledWith) => {
                let (value, next) = scan_value_line(&lines, i + 1);
                lockfile.bundled_with = value;
                i = next;
            }
            Some(Header::Checksums) => {
                // Recognized only to be skipped; checksums feed nothing here.
                i = skip_section(&lines, i + 1);
            }
            None => i += 1,
        }
    }

    lockfile
}

enum Header {
    Source(SourceKind),
    Platforms,
    Dependencies,
    RubyVersion,
    BundledWith,
    Checksums,
}

fn header(line: &str) -> Option<Header> {
    match line {
        "GIT" => Some(Header::Source(SourceKind::Git)),
        "GEM" => Some(Header::Source(SourceKind::Rubygems)),
        "PATH" => Some(Header::Source(SourceKind::Path)),
        "PLUGIN SOURCE" => Some(Header::Source(SourceKind::Plugin)),
        "PLATFORMS" => Some(Header::Platforms),
        "DEPENDENCIES" => Some(Header::Dependencies),
        "RUBY VERSION" => Some(Header::RubyVersion),
        "BUNDLED WITH" => Some(Header::BundledWith),
        "CHECKSUMS" => Some(Header::Checksums),
        _ => None,
    }
}

fn scan_source<'i>(kind: SourceKind, lines: &[&'i str], start: usize) -> (Source<'i>, usize) {
    let mut source = Source::new(kind);
    let mut i = start;

    while i < lines.len() && header(lines[i]).is_none() {
        let line = lines[i];

        if line == "  specs:" {
            let (specs, next) = scan_specs(lines, i + 1);
            source.specs = specs;
            i = next;
            continue;
        }

        if let Ok(remote) = remote_line.parse(line) {
            source.remote = Some(remote);
        } else if let Ok(revision) = revision_line.parse(line) {
            source.revision = Some(revision);
        } else if let Ok((key, value)) = option_line.parse(line) {
            source.options.push((key, value));
        }
        i += 1;
    }

    (source, i)
}

fn scan_specs<'i>(lines: &[&'i str], start: usize) -> (Vec<Spec<'i>>, usize) {
    let mut specs = Vec::new();
    let mut i = start;

    while i < lines.len() {
        let Ok((name, raw)) = spec_line.parse(lines[i]) else {
            break;
        };
        i += 1;

        let mut dependencies = Vec::new();
        while i < lines.len() {
            let Ok(dep) = nested_dependency_line.parse(lines[i]) else {
                break;
            };
            dependencies.push(dep);
            i += 1;
        }

        let (version, platform) = split_platform(raw);
        specs.push(Spec {
            name,
            raw,
            version,
            platform,
            dependencies,
        });
    }

    (specs, i)
}

fn scan_platforms<'i>(lines: &[&'i str], start: usize) -> (Vec<&'i str>, usize) {
    let mut platforms = Vec::new();
    let mut i = start;

    while i < lines.len() && header(lines[i]).is_none() {
        match lines[i].strip_prefix("  ").filter(|rest| !rest.is_empty()) {
            Some(platform) => platforms.push(platform),
            None => break,
        }
        i += 1;
    }

    (platforms, i)
}

fn scan_dependencies<'i>(lines: &[&'i str], start: usize) -> (Vec<Dependency<'i>>, usize) {
    let mut dependencies = Vec::new();
    let mut i = start;

    while i < lines.len() {
        let Ok(dep) = top_dependency_line.parse(lines[i]) else {
            break;
        };
        dependencies.push(dep);
        i += 1;
    }

    (dependencies, i)
}

/// RUBY VERSION and BUNDLED WITH both carry a single three-space-indented
/// value line.
fn scan_value_line<'i>(lines: &[&'i str], start: usize) -> (Option<&'i str>, usize) {
    match lines
        .get(start)
        .and_then(|line| line.strip_prefix("   "))
        .filter(|value| !value.is_empty())
    {
        Some(value) => (Some(value), start + 1),
        None => (None, start),
    }
}

fn skip_section(lines: &[&str], start: usize) -> usize {
    let mut i = start;
    while i < lines.len() && header(lines[i]).is_none() {
        i += 1;
    }
    i
}

// Line shapes. Each parser is run with `Parser::parse`, which only succeeds
// when the whole line is consumed, so a near-miss falls through to the
// tolerant skip path instead of being half-read.

fn gem_name<'i>(i: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| {
        c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/')
    })
    .parse_next(i)
}

fn constraint<'i>(i: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| c != ')').parse_next(i)
}

/// `    name (version)` — a resolved gem under `specs:`.
fn spec_line<'i>(i: &mut &'i str) -> ModalResult<(&'i str, &'i str)> {
    let name = preceded("    ", gem_name).parse_next(i)?;
    let raw = delimited(" (", constraint, ")").parse_next(i)?;
    Ok((name, raw))
}

/// `      name (requirement)` — a spec's own dependency, one level deeper.
fn nested_dependency_line<'i>(i: &mut &'i str) -> ModalResult<Dependency<'i>> {
    let name = preceded("      ", gem_name).parse_next(i)?;
    let requirement = opt(delimited(" (", constraint, ")")).parse_next(i)?;
    Ok(Dependency {
        name,
        requirement,
        pinned: false,
    })
}

/// `  name (requirement)!` — a direct dependency of the project.
fn top_dependency_line<'i>(i: &mut &'i str) -> ModalResult<Dependency<'i>> {
    let name = preceded("  ", gem_name).parse_next(i)?;
    let requirement = opt(delimited(" (", constraint, ")")).parse_next(i)?;
    let pinned = opt('!').parse_next(i)?;
    Ok(Dependency {
        name,
        requirement,
        pinned: pinned.is_some(),
    })
}

fn remote_line<'i>(i: &mut &'i str) -> ModalResult<&'i str> {
    preceded("  remote: ", rest).parse_next(i)
}

fn revision_line<'i>(i: &mut &'i str) -> ModalResult<&'i str> {
    preceded("  revision: ", rest).parse_next(i)
}

/// Any other `  key: value` pair inside a source block (branch, tag, ...).
fn option_line<'i>(i: &mut &'i str) -> ModalResult<(&'i str, &'i str)> {
    let key = preceded("  ", take_while(1.., |c: char| c.is_ascii_alphabetic())).parse_next(i)?;
    let value = preceded(": ", rest).parse_next(i)?;
    Ok((key, value))
}

/// Decompose a spec's version token on its trailing platform suffix.
///
/// A platform is a trailing `[a-z0-9_-]+` run introduced by a hyphen; the
/// leftmost qualifying hyphen wins, which yields the longest platform match
/// (`1.17.2-x86_64-linux` -> `1.17.2` + `x86_64-linux`). Suffixes containing
/// a dot, like the prerelease in `1.2.3-beta.2`, never qualify.
fn split_platform(raw: &str) -> (&str, &str) {
    for (idx, _) in raw.match_indices('-') {
        if idx == 0 {
            continue;
        }
        let suffix = &raw[idx + 1..];
        let qualifies = !suffix.is_empty()
            && suffix
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
        if qualifies {
            return (&raw[..idx], suffix);
        }
    }
    (raw, "ruby")
}

/// The RUBY VERSION value looks like `ruby 2.7.2p137 (truffleruby 25.0.0)`.
fn ruby_version_value(value: &str) -> RubyVersion<'_> {
    let mut words = value.split_whitespace();
    let first = words.next().unwrap_or(value);
    let token = words.next().unwrap_or(first);
    let engine = words.next().map(|word| word.trim_matches(['(', ')']));

    let (version, patchlevel) = split_patchlevel(token);
    RubyVersion {
        version,
        patchlevel,
        engine,
    }
}

/// Split `2.7.2p137` into `2.7.2` and `137`. The suffix only counts when the
/// `p` is followed by nothing but digits.
fn split_patchlevel(token: &str) -> (&str, Option<&str>) {
    if let Some(idx) = token.find('p') {
        let digits = &token[idx + 1..];
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            return (&token[..idx], Some(digits));
        }
    }
    (token, None)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_spec_line() {
        let (name, raw) = spec_line.parse("    erubi (1.13.1)").unwrap();
        assert_eq!(name, "erubi");
        assert_eq!(raw, "1.13.1");

        // A nested dependency line is indented too deep to be a spec.
        assert!(spec_line.parse("      rack (~> 3)").is_err());
        // Trailing garbage means no match at all.
        assert!(spec_line.parse("    erubi (1.13.1) oops").is_err());
    }

    #[test]
    fn test_nested_dependency_line() {
        for (input, name, requirement) in [
            ("      prism (~> 1.0)", "prism", Some("~> 1.0")),
            ("      sorbet-runtime", "sorbet-runtime", None),
            (
                "      nokogiri (>= 1.15.7, != 1.16.7)",
                "nokogiri",
                Some(">= 1.15.7, != 1.16.7"),
            ),
        ] {
            let dep = nested_dependency_line.parse(input).unwrap();
            assert_eq!(dep.name, name);
            assert_eq!(dep.requirement, requirement);
        }
    }

    #[test]
    fn test_top_dependency_line() {
        let dep = top_dependency_line.parse("  rails (= 7.0.0)").unwrap();
        assert_eq!(dep.name, "rails");
        assert_eq!(dep.requirement, Some("= 7.0.0"));
        assert!(!dep.pinned);

        let dep = top_dependency_line.parse("  cloudflare (~> 4.4)!").unwrap();
        assert!(dep.pinned);

        let dep = top_dependency_line.parse("  rake").unwrap();
        assert_eq!(dep.requirement, None);
    }

    #[test]
    fn test_option_lines() {
        assert_eq!(
            remote_line.parse("  remote: https://rubygems.org/").unwrap(),
            "https://rubygems.org/"
        );
        assert_eq!(
            revision_line
                .parse("  revision: 2ba3c5d21f5e891df97a3b7c03e56d7d19bf15a2")
                .unwrap(),
            "2ba3c5d21f5e891df97a3b7c03e56d7d19bf15a2"
        );
        assert_eq!(
            option_line.parse("  branch: main").unwrap(),
            ("branch", "main")
        );
        // The specs marker is not an option.
        assert!(option_line.parse("  specs:").is_err());
    }

    #[test]
    fn test_split_platform() {
        assert_eq!(split_platform("1.17.2"), ("1.17.2", "ruby"));
        assert_eq!(
            split_platform("1.17.2-x86_64-linux"),
            ("1.17.2", "x86_64-linux")
        );
        assert_eq!(
            split_platform("0.5.11725-universal-darwin"),
            ("0.5.11725", "universal-darwin")
        );
        // Dotted prerelease tails are versions, not platforms.
        assert_eq!(split_platform("1.2.3-beta.2"), ("1.2.3-beta.2", "ruby"));
        // But a bare trailing word is treated as a platform tag.
        assert_eq!(split_platform("1.0.0-java"), ("1.0.0", "java"));
    }

    #[test]
    fn test_ruby_version_value() {
        let ruby = ruby_version_value("ruby 2.7.2p137");
        assert_eq!(ruby.version, "2.7.2");
        assert_eq!(ruby.patchlevel, Some("137"));
        assert_eq!(ruby.engine, None);

        let ruby = ruby_version_value("ruby 3.2.2 (truffleruby 25.0.0)");
        assert_eq!(ruby.version, "3.2.2");
        assert_eq!(ruby.patchlevel, None);
        assert_eq!(ruby.engine, Some("truffleruby"));

        let ruby = ruby_version_value("ruby 4.0.0");
        assert_eq!(ruby.version, "4.0.0");
        assert_eq!(ruby.patchlevel, None);
    }
}
