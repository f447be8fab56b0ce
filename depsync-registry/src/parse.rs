use camino::{Utf8Path, Utf8PathBuf};
use depsync_types::PackageDescriptor;
use fs_err as fs;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

// Both patterns follow the descriptor layout emitted by the build interpreter:
// a `package:` line, and a comment carrying the exact create command.
static PACKAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^package: (\S*)").expect("valid package regex"));
static CREATE_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"cipd create --pkg-def cipd\.yaml -tag (\S*)").expect("valid tag regex")
});

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("invalid cipd.yaml format: {path} (missing {missing})")]
    Invalid {
        path: Utf8PathBuf,
        missing: &'static str,
    },

    #[error("read descriptor {path}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("descriptor {path} is outside registry root {root}")]
    OutsideRoot { path: Utf8PathBuf, root: Utf8PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDescriptor {
    pub name: String,
    pub tag: String,
}

/// Extract the package name and tag from descriptor text.
///
/// When a field appears more than once the last occurrence wins. `path` is
/// only used for error reporting.
pub fn parse_descriptor(
    path: &Utf8Path,
    contents: &str,
) -> Result<ParsedDescriptor, DescriptorError> {
    let mut name = None;
    let mut tag = None;

    for line in contents.lines() {
        if let Some(caps) = PACKAGE_RE.captures(line) {
            name = Some(caps[1].to_string());
        }
        if let Some(caps) = CREATE_TAG_RE.captures(line) {
            tag = Some(caps[1].to_string());
        }
    }

    let invalid = |missing| DescriptorError::Invalid {
        path: path.to_path_buf(),
        missing,
    };
    let name = name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| invalid("package name"))?;
    let tag = tag
        .filter(|t| !t.is_empty())
        .ok_or_else(|| invalid("package tag"))?;

    Ok(ParsedDescriptor { name, tag })
}

/// Read one descriptor file and express its package directory relative to `root`.
pub fn read_descriptor(
    root: &Utf8Path,
    file: &Utf8Path,
) -> Result<PackageDescriptor, DescriptorError> {
    let contents = fs::read_to_string(file).map_err(|source| DescriptorError::Io {
        path: file.to_path_buf(),
        source,
    })?;
    let parsed = parse_descriptor(file, &contents)?;

    let package_dir = file.parent().unwrap_or(file);
    let rel = package_dir
        .strip_prefix(root)
        .map_err(|_| DescriptorError::OutsideRoot {
            path: file.to_path_buf(),
            root: root.to_path_buf(),
        })?;

    Ok(PackageDescriptor::new(rel, parsed.name, parsed.tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GUAVA: &str = "\
# To create CIPD package run the following command.
# cipd create --pkg-def cipd.yaml -tag version:31.0-jre-cr0
package: chromium/third_party/android_deps/libs/com_google_guava_guava
description: \"Guava: Google Core Libraries for Java\"
data:
- file: guava-31.0-jre.jar
";

    fn p() -> &'static Utf8Path {
        Utf8Path::new("libs/guava/cipd.yaml")
    }

    #[test]
    fn parses_name_and_tag() {
        let parsed = parse_descriptor(p(), GUAVA).expect("parse");
        assert_eq!(
            parsed.name,
            "chromium/third_party/android_deps/libs/com_google_guava_guava"
        );
        assert_eq!(parsed.tag, "version:31.0-jre-cr0");
    }

    #[test]
    fn package_line_must_start_the_line() {
        let text = "  package: indented\n# cipd create --pkg-def cipd.yaml -tag 1\n";
        let err = parse_descriptor(p(), text).expect_err("indented package is not a match");
        assert!(err.to_string().contains("missing package name"));
    }

    #[test]
    fn missing_tag_names_the_file() {
        let text = "package: foo\n";
        let err = parse_descriptor(p(), text).expect_err("missing tag");
        let msg = err.to_string();
        assert!(msg.contains("libs/guava/cipd.yaml"), "{msg}");
        assert!(msg.contains("missing package tag"), "{msg}");
    }

    #[test]
    fn empty_values_are_rejected() {
        let text = "package: \n# cipd create --pkg-def cipd.yaml -tag 1\n";
        assert!(matches!(
            parse_descriptor(p(), text),
            Err(DescriptorError::Invalid { missing: "package name", .. })
        ));
    }

    #[test]
    fn last_occurrence_wins() {
        let text = "\
package: first
# cipd create --pkg-def cipd.yaml -tag 1
package: second
# cipd create --pkg-def cipd.yaml -tag 2
";
        let parsed = parse_descriptor(p(), text).expect("parse");
        assert_eq!(parsed.name, "second");
        assert_eq!(parsed.tag, "2");
    }
}
