use pretty_assertions::assert_eq;

use crate::datatypes::*;
use crate::parse;

const BASIC: &str = "\
GEM
  remote: https://rubygems.org/
  specs:
    erubi (1.13.1)
    rails (7.0.0)
      erubi (>= 1.11)
    sorbet-static (0.5.11725-x86_64-linux)

PLATFORMS
  ruby
  x86_64-linux

DEPENDENCIES
  rails (~> 7.0)
  sorbet-static

RUBY VERSION
   ruby 2.7.2p137

BUNDLED WITH
   2.4.22
";

#[test]
fn test_parse_basic_lockfile() {
    let lockfile = parse(BASIC);

    assert_eq!(lockfile.sources.len(), 1);
    let source = &lockfile.sources[0];
    assert_eq!(source.kind, SourceKind::Rubygems);
    assert_eq!(source.remote, Some("https://rubygems.org/"));
    assert_eq!(source.revision, None);

    assert_eq!(source.specs.len(), 3);
    let rails = &source.specs[1];
    assert_eq!(rails.name, "rails");
    assert_eq!(rails.version, "7.0.0");
    assert_eq!(rails.platform, "ruby");
    assert_eq!(rails.dependencies.len(), 1);
    assert_eq!(rails.dependencies[0].name, "erubi");
    assert_eq!(rails.dependencies[0].requirement, Some(">= 1.11"));

    let sorbet = &source.specs[2];
    assert_eq!(sorbet.raw, "0.5.11725-x86_64-linux");
    assert_eq!(sorbet.version, "0.5.11725");
    assert_eq!(sorbet.platform, "x86_64-linux");

    assert_eq!(lockfile.platforms, vec!["ruby", "x86_64-linux"]);
    assert_eq!(
        lockfile.direct_dependency_names(),
        vec!["rails", "sorbet-static"]
    );

    let ruby = lockfile.ruby_version.unwrap();
    assert_eq!(ruby.version, "2.7.2");
    assert_eq!(ruby.patchlevel, Some("137"));
    assert_eq!(lockfile.bundled_with, Some("2.4.22"));
}

#[test]
fn test_parse_is_idempotent() {
    assert_eq!(parse(BASIC), parse(BASIC));
}

#[test]
fn test_parse_empty_input() {
    let lockfile = parse("");
    assert_eq!(lockfile, Lockfile::default());
}

#[test]
fn test_parse_git_and_path_sources() {
    let input = "\
GIT
  remote: https://github.com/oldmoe/litestack.git
  revision: e598e1b1f0d46f45df1e2c6213ff9b136b63d9bf
  branch: main
  specs:
    litestack (0.4.5)
      erubi (~> 1)
      oj (~> 3)

PATH
  remote: pathgem
  specs:
    pathgem (0.1.0)

DEPENDENCIES
  litestack!
  pathgem!
";
    let lockfile = parse(input);

    assert_eq!(lockfile.sources.len(), 2);
    let git = &lockfile.sources[0];
    assert_eq!(git.kind, SourceKind::Git);
    assert_eq!(git.remote, Some("https://github.com/oldmoe/litestack.git"));
    assert_eq!(
        git.revision,
        Some("e598e1b1f0d46f45df1e2c6213ff9b136b63d9bf")
    );
    assert_eq!(git.options, vec![("branch", "main")]);
    assert_eq!(git.specs[0].dependencies.len(), 2);

    let path = &lockfile.sources[1];
    assert_eq!(path.kind, SourceKind::Path);
    assert_eq!(path.remote, Some("pathgem"));

    assert!(lockfile.dependencies.iter().all(|dep| dep.pinned));
}

#[test]
fn test_find_spec_prefers_first_source() {
    let input = "\
GIT
  remote: https://github.com/rails/rails.git
  revision: abcabcabcabcabcabcabcabcabcabcabcabcabca
  specs:
    rails (7.1.0)

GEM
  remote: https://rubygems.org/
  specs:
    rails (7.0.0)

DEPENDENCIES
  rails
";
    let lockfile = parse(input);
    let (source, spec) = lockfile.find_spec("rails").unwrap();
    assert_eq!(source.kind, SourceKind::Git);
    assert_eq!(spec.version, "7.1.0");
    assert!(lockfile.find_spec("nope").is_none());
}

#[test]
fn test_checksums_are_skipped() {
    let input = "\
GEM
  remote: https://rubygems.org/
  specs:
    rake (13.0.6)

CHECKSUMS
  rake (13.0.6) sha256=5ce4bf5037b4196c24ac62834d8db1ce175470391026bd9e557d669beeb19097

DEPENDENCIES
  rake
";
    let lockfile = parse(input);
    assert_eq!(lockfile.sources[0].specs.len(), 1);
    assert_eq!(lockfile.dependencies.len(), 1);
}

#[test]
fn test_unrecognized_lines_are_skipped() {
    let input = "\
NOT A REAL SECTION
  something: else

GEM
  remote: https://rubygems.org/
  specs:
    rake (13.0.6)
!!! garbage in the middle
DEPENDENCIES
  rake
";
    let lockfile = parse(input);
    assert_eq!(lockfile.sources.len(), 1);
    assert_eq!(lockfile.sources[0].specs.len(), 1);
    assert_eq!(lockfile.dependencies.len(), 1);
}

#[test]
fn test_plugin_source() {
    let input = "\
PLUGIN SOURCE
  plugin: my-source
  specs:
    secretgem (1.0.0)

DEPENDENCIES
  secretgem!
";
    let lockfile = parse(input);
    let plugin = &lockfile.sources[0];
    assert_eq!(plugin.kind, SourceKind::Plugin);
    assert_eq!(plugin.remote, None);
    assert_eq!(plugin.options, vec![("plugin", "my-source")]);
    assert_eq!(plugin.specs[0].name, "secretgem");
}

#[test]
fn test_platform_suffix_round_trip() {
    for (version, platform) in [
        ("1.17.2", "x86_64-linux"),
        ("0.5.11725", "universal-darwin"),
        ("1.18.10", "arm-linux-gnu"),
    ] {
        let input = format!(
            "GEM\n  remote: https://rubygems.org/\n  specs:\n    somegem ({version}-{platform})\n"
        );
        let lockfile = parse(&input);
        let spec = &lockfile.sources[0].specs[0];
        assert_eq!(spec.version, version);
        assert_eq!(spec.platform, platform);
    }

    // No suffix: raw and version coincide and the platform is "ruby".
    let lockfile = parse("GEM\n  remote: https://rubygems.org/\n  specs:\n    somegem (1.2.3)\n");
    let spec = &lockfile.sources[0].specs[0];
    assert_eq!(spec.raw, spec.version);
    assert_eq!(spec.platform, "ruby");
}

#[cfg(feature = "serde")]
#[test]
fn test_model_serializes_to_json() {
    let lockfile = parse(BASIC);
    let json = serde_json::to_value(&lockfile).unwrap();

    assert_eq!(json["sources"][0]["kind"], "Rubygems");
    assert_eq!(json["sources"][0]["remote"], "https://rubygems.org/");
    assert_eq!(json["sources"][0]["specs"][1]["name"], "rails");
    assert_eq!(json["platforms"], serde_json::json!(["ruby", "x86_64-linux"]));
    assert_eq!(json["bundled_with"], "2.4.22");
}

#[test]
fn test_crlf_input() {
    let input = "GEM\r\n  remote: https://rubygems.org/\r\n  specs:\r\n    rake (13.0.6)\r\n\r\nDEPENDENCIES\r\n  rake\r\n";
    let lockfile = parse(input);
    assert_eq!(lockfile.sources[0].specs[0].name, "rake");
    assert_eq!(lockfile.dependencies[0].name, "rake");
}
