//! The parsed lockfile model. Most types borrow from the input text, so they
//! carry a lifetime 'i, short for 'input. Nothing here is mutated after the
//! parser hands it out.

/// A fully parsed Gemfile.lock.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Lockfile<'i> {
    /// Every source block in the order it appeared. A gem may be listed under
    /// more than one source; the first match wins for host resolution.
    pub sources: Vec<Source<'i>>,

    /// Platform triples this lockfile was resolved for.
    pub platforms: Vec<&'i str>,

    /// The direct dependencies declared by the consuming project. These names
    /// define what "direct" means downstream.
    pub dependencies: Vec<Dependency<'i>>,

    /// Which Ruby this lockfile was built with, if recorded.
    pub ruby_version: Option<RubyVersion<'i>>,

    /// Which Bundler version wrote this lockfile, if recorded.
    pub bundled_with: Option<&'i str>,
}

impl<'i> Lockfile<'i> {
    /// Resolve a gem name to its spec and the source that provides it.
    /// Sources are searched in file order, first match wins.
    pub fn find_spec(&self, name: &str) -> Option<(&Source<'i>, &Spec<'i>)> {
        self.sources.iter().find_map(|source| {
            source
                .specs
                .iter()
                .find(|spec| spec.name == name)
                .map(|spec| (source, spec))
        })
    }

    /// The names of all direct dependencies, in declaration order.
    pub fn direct_dependency_names(&self) -> Vec<&'i str> {
        self.dependencies.iter().map(|dep| dep.name).collect()
    }
}

/// Where a block of specs came from.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SourceKind {
    /// A git repository pinned to a revision.
    Git,
    /// A local filesystem path.
    Path,
    /// A RubyGems server. The only kind with a comparable remote registry.
    Rubygems,
    /// A Bundler plugin source.
    Plugin,
}

/// One GIT/GEM/PATH/PLUGIN SOURCE block.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Source<'i> {
    pub kind: SourceKind,
    /// Origin URL or path. Plugin sources may not have one.
    pub remote: Option<&'i str>,
    /// Commit pin, git sources only.
    pub revision: Option<&'i str>,
    /// Remaining `key: value` lines (branch, tag, ref, glob, ...), carried
    /// through untouched.
    pub options: Vec<(&'i str, &'i str)>,
    /// All gems resolved under this source.
    pub specs: Vec<Spec<'i>>,
}

impl<'i> Source<'i> {
    pub fn new(kind: SourceKind) -> Self {
        Source {
            kind,
            remote: None,
            revision: None,
            options: Vec::new(),
            specs: Vec::new(),
        }
    }
}

/// One resolved gem within a source.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Spec<'i> {
    pub name: &'i str,
    /// The literal version token as written, platform suffix included.
    pub raw: &'i str,
    /// The version with any platform suffix stripped.
    pub version: &'i str,
    /// The extracted platform tag, or "ruby" when the token had no suffix.
    pub platform: &'i str,
    /// The gem's own requirements. Retained for completeness; the analyzer
    /// only scores direct dependencies.
    pub dependencies: Vec<Dependency<'i>>,
}

/// A gem name with an optional, uninterpreted constraint string.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Dependency<'i> {
    pub name: &'i str,
    pub requirement: Option<&'i str>,
    /// The trailing `!` marking a dependency pinned to a non-default source.
    /// Accepted syntactically, never interpreted.
    pub pinned: bool,
}

/// The RUBY VERSION line, split into its pieces.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RubyVersion<'i> {
    pub version: &'i str,
    /// The digits after an embedded `p` suffix, e.g. `137` in `2.7.2p137`.
    pub patchlevel: Option<&'i str>,
    pub engine: Option<&'i str>,
}
