//! Module metadata: the binary `Info` entry and the `build.txt` fallback.

use serde::Serialize;

use super::reader::ByteReader;
use super::ArchiveError;

/// Dependencies declared by a module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModuleDependencies {
    /// Must be loaded for the module to load.
    pub hard: Vec<String>,
    /// Used when present.
    pub optional: Vec<String>,
}

/// What follows a tag in the `Info` stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    List,
    Str,
    Byte,
    Flag,
}

fn field_kind(tag: &str) -> FieldKind {
    match tag {
        "modReferences" | "weakReferences" | "sortAfter" | "sortBefore" | "dllReferences" => FieldKind::List,
        "author" | "version" | "displayName" | "homepage" | "description" | "eacPath"
        | "buildVersion" | "modSource" => FieldKind::Str,
        "side" => FieldKind::Byte,
        _ => FieldKind::Flag,
    }
}

/// `Name@1.2` → `Name`
fn strip_version(reference: String) -> String {
    match reference.split_once('@') {
        Some((name, _)) => name.to_string(),
        None => reference,
    }
}

/// Decode the tagged `Info` stream. An empty tag or the end of data stops it.
pub fn parse_info(data: &[u8]) -> Result<ModuleDependencies, ArchiveError> {
    let mut reader = ByteReader::new(data);
    let mut deps = ModuleDependencies::default();

    while !reader.is_at_end() {
        let tag = reader.read_string()?;
        if tag.is_empty() {
            break;
        }
        match field_kind(&tag) {
            FieldKind::List => {
                let items = reader.read_string_list()?;
                match tag.as_str() {
                    "modReferences" => deps.hard = items.into_iter().map(strip_version).collect(),
                    "weakReferences" => deps.optional = items.into_iter().map(strip_version).collect(),
                    _ => {}
                }
            }
            FieldKind::Str => {
                reader.read_string()?;
            }
            FieldKind::Byte => {
                reader.read_u8()?;
            }
            FieldKind::Flag => {}
        }
    }

    Ok(deps)
}

/// Hard dependencies from a `build.txt` (`modReferences = A, B`).
///
/// Only the first `modReferences` line counts. Entries are taken verbatim.
pub fn parse_build_txt(data: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(data);
    text.lines()
        .map(str::trim)
        .find(|line| line.starts_with("modReferences") && line.contains('='))
        .and_then(|line| line.split_once('='))
        .map(|(_, value)| {
            value
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::reader::write_string;

    fn info(fields: &[&str]) -> Vec<u8> {
        let mut out = Vec::new();
        for field in fields {
            write_string(&mut out, field);
        }
        out
    }

    // ── Info ────────────────────────────────────────────────────

    #[test]
    fn test_hard_and_optional_references() {
        let data = info(&[
            "modReferences", "Foo@1.2.3", "Bar", "",
            "weakReferences", "Baz@0.1", "",
            "",
        ]);
        let deps = parse_info(&data).unwrap();
        assert_eq!(deps.hard, vec!["Foo", "Bar"]);
        assert_eq!(deps.optional, vec!["Baz"]);
    }

    #[test]
    fn test_skips_other_fields() {
        let mut data = info(&["author", "someone", "hideCode", "side"]);
        data.push(2);
        data.extend(info(&["sortAfter", "X", "", "version", "1.0", "modReferences", "Core", ""]));
        let deps = parse_info(&data).unwrap();
        assert_eq!(deps.hard, vec!["Core"]);
        assert!(deps.optional.is_empty());
    }

    #[test]
    fn test_stops_at_end_without_terminator() {
        let deps = parse_info(&info(&["modReferences", "Core", ""])).unwrap();
        assert_eq!(deps.hard, vec!["Core"]);
    }

    #[test]
    fn test_empty_tag_ends_stream() {
        let deps = parse_info(&info(&["", "modReferences", "Ignored", ""])).unwrap();
        assert!(deps.hard.is_empty());
    }

    #[test]
    fn test_truncated_list_is_an_error() {
        let mut data = info(&["modReferences", "Core"]);
        data.push(9);
        assert!(parse_info(&data).is_err());
    }

    // ── build.txt ───────────────────────────────────────────────

    #[test]
    fn test_build_txt_first_match() {
        let text = b"displayName = Demo\n  modReferences = A, B@1.0 ,, C\nmodReferences = D\n";
        assert_eq!(parse_build_txt(text), vec!["A", "B@1.0", "C"]);
    }

    #[test]
    fn test_build_txt_without_references() {
        assert!(parse_build_txt(b"author = me\nmodReferences\n").is_empty());
    }
}
