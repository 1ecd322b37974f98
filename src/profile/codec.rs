//! Profile text format
//!
//! Profiles are JSON objects with three string fields and four string
//! arrays, pretty-printed one package per line:
//!
//! ```text
//! {
//!   "distro": "arch",
//!   "package_manager": "paru",
//!   "arch": "x86_64",
//!   "native": [
//!     "htop",
//!     "git"
//!   ],
//!   "flatpak": [],
//!   "appimage": [],
//!   "dotfiles": []
//! }
//! ```
//!
//! Parsing never fails. Well-formed documents go through serde; anything
//! else falls back to a line scanner that recovers each section on its
//! own, so a corrupted `flatpak` array does not cost the `native` one.

use super::ProfileDocument;
use serde::{Deserialize, Serialize};

const SECTIONS: [&str; 4] = ["native", "flatpak", "appimage", "dotfiles"];

#[derive(Debug, Serialize)]
struct WireOut<'a> {
    distro: &'a str,
    package_manager: &'a str,
    arch: &'a str,
    native: &'a [String],
    flatpak: &'a [String],
    appimage: &'a [String],
    dotfiles: &'a [String],
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireIn {
    distro: String,
    package_manager: String,
    arch: String,
    native: Option<Vec<String>>,
    flatpak: Option<Vec<String>>,
    appimage: Option<Vec<String>>,
    dotfiles: Option<Vec<String>>,
}

/// Serialize with a fixed key order and a trailing newline
pub fn serialize(doc: &ProfileDocument) -> Result<String, serde_json::Error> {
    let wire = WireOut {
        distro: &doc.system_distro,
        package_manager: &doc.system_package_manager,
        arch: &doc.system_arch,
        native: &doc.native_packages,
        flatpak: &doc.flatpak_packages,
        appimage: &doc.appimage_packages,
        dotfiles: &doc.dotfiles,
    };
    let mut text = serde_json::to_string_pretty(&wire)?;
    text.push('\n');
    Ok(text)
}

/// Parse profile bytes, degrading missing or broken sections to empty
pub fn parse(bytes: &[u8]) -> ProfileDocument {
    let text = String::from_utf8_lossy(bytes);

    match serde_json::from_str::<WireIn>(&text) {
        Ok(wire) => from_wire(wire),
        Err(e) => {
            log::warn!("profile is not valid JSON ({}), scanning sections line by line", e);
            scan(&text)
        }
    }
}

fn from_wire(wire: WireIn) -> ProfileDocument {
    let section = |name: &str, value: Option<Vec<String>>| {
        value.unwrap_or_else(|| {
            log::warn!("profile has no '{}' section, treating it as empty", name);
            Vec::new()
        })
    };

    ProfileDocument {
        native_packages: section(SECTIONS[0], wire.native),
        flatpak_packages: section(SECTIONS[1], wire.flatpak),
        appimage_packages: section(SECTIONS[2], wire.appimage),
        dotfiles: section(SECTIONS[3], wire.dotfiles),
        system_distro: wire.distro,
        system_package_manager: wire.package_manager,
        system_arch: wire.arch,
    }
}

fn scan(text: &str) -> ProfileDocument {
    let [native, flatpak, appimage, dotfiles] = SECTIONS.map(|name| {
        scan_array(text, name).unwrap_or_else(|| {
            log::warn!("could not locate '{}' section in profile, treating it as empty", name);
            Vec::new()
        })
    });

    ProfileDocument {
        system_distro: scan_string(text, "distro").unwrap_or_default(),
        system_package_manager: scan_string(text, "package_manager").unwrap_or_default(),
        system_arch: scan_string(text, "arch").unwrap_or_default(),
        native_packages: native,
        flatpak_packages: flatpak,
        appimage_packages: appimage,
        dotfiles,
    }
}

/// Text following `"key":`, with leading whitespace trimmed
fn after_key<'t>(text: &'t str, key: &str) -> Option<&'t str> {
    let marker = format!("\"{}\"", key);
    text.match_indices(&marker).find_map(|(pos, _)| {
        text[pos + marker.len()..]
            .trim_start()
            .strip_prefix(':')
            .map(str::trim_start)
    })
}

fn scan_string(text: &str, key: &str) -> Option<String> {
    let rest = after_key(text, key)?.strip_prefix('"')?;
    let end = rest.find(|c: char| c == '"' || c == '\n')?;
    Some(rest[..end].to_string())
}

/// Entries of `"key": [`, one per line up to a line opening with `]`
///
/// An unclosed section, or one that runs into the next key, is `None`.
fn scan_array(text: &str, key: &str) -> Option<Vec<String>> {
    let rest = after_key(text, key)?.strip_prefix('[')?;
    let (first, body) = rest.split_once('\n').unwrap_or((rest, ""));

    let first = first.trim();
    if let Some(inline) = first.strip_suffix(',').unwrap_or(first).strip_suffix(']') {
        return Some(inline_items(inline));
    }

    let mut names: Vec<String> = entry(first).into_iter().collect();
    for line in body.lines() {
        let line = line.trim();
        if line.starts_with(']') {
            return Some(names);
        }
        if is_key_line(line) {
            return None;
        }
        names.extend(entry(line));
    }
    None
}

/// One entry line, with at most one trailing separator
fn entry(line: &str) -> Option<String> {
    quoted(line.strip_suffix(',').unwrap_or(line))
}

/// Quoted names of an array written on a single line
fn inline_items(inline: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = inline;
    while let Some(start) = rest.find('"') {
        let tail = &rest[start + 1..];
        let Some(end) = tail.find('"') else {
            break;
        };
        names.push(tail[..end].to_string());
        rest = &tail[end + 1..];
    }
    names
}

fn is_key_line(line: &str) -> bool {
    line.strip_prefix('"')
        .and_then(|rest| rest.split_once('"'))
        .is_some_and(|(_, tail)| tail.trim_start().starts_with(':'))
}

/// `"name"` with surrounding whitespace; anything else is not a package
fn quoted(fragment: &str) -> Option<String> {
    let inner = fragment.trim().strip_prefix('"')?.strip_suffix('"')?;
    (!inner.contains('"')).then(|| inner.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> ProfileDocument {
        ProfileDocument {
            system_distro: "arch".into(),
            system_package_manager: "paru".into(),
            system_arch: "x86_64".into(),
            native_packages: strings(&["htop", "git", "htop"]),
            flatpak_packages: strings(&["org.mozilla.firefox"]),
            appimage_packages: strings(&["Obsidian-1.5.3.AppImage"]),
            dotfiles: strings(&[".bashrc", ".config/nvim"]),
        }
    }

    #[test]
    fn test_round_trip() {
        let doc = sample();
        assert_eq!(parse(serialize(&doc).unwrap().as_bytes()), doc);

        let empty = ProfileDocument::default();
        assert_eq!(parse(serialize(&empty).unwrap().as_bytes()), empty);
    }

    #[test]
    fn test_serialize_layout() {
        let text = serialize(&sample()).unwrap();
        let expected = r#"{
  "distro": "arch",
  "package_manager": "paru",
  "arch": "x86_64",
  "native": [
    "htop",
    "git",
    "htop"
  ],
  "flatpak": [
    "org.mozilla.firefox"
  ],
  "appimage": [
    "Obsidian-1.5.3.AppImage"
  ],
  "dotfiles": [
    ".bashrc",
    ".config/nvim"
  ]
}
"#;
        assert_eq!(text, expected);
    }

    #[test]
    fn test_missing_flatpak_section() {
        let text = r#"{
  "distro": "debian",
  "native": [
    "htop",
    "git"
  ],
  "appimage": [
    "Krita.AppImage"
  ]
}"#;
        let doc = parse(text.as_bytes());
        assert!(doc.flatpak_packages.is_empty());
        assert!(doc.dotfiles.is_empty());

        let counts = doc.counts();
        assert_eq!(counts.native, 2);
        assert_eq!(counts.flatpak, 0);
        assert_eq!(counts.appimage, 1);
    }

    #[test]
    fn test_corrupted_document_recovers_sections() {
        // trailing commas make this invalid JSON, and flatpak is never closed
        let text = r#"{
  "distro": "ubuntu",
  "package_manager": "apt",
  "native": [
    "htop",
    "git",
  ],
  "appimage": ["Krita.AppImage", "Obsidian.AppImage"],
  "flatpak": [
    "org.gimp.GIMP",
"#;
        let doc = parse(text.as_bytes());
        assert_eq!(doc.system_distro, "ubuntu");
        assert_eq!(doc.system_package_manager, "apt");
        assert_eq!(doc.system_arch, "");
        assert_eq!(doc.native_packages, strings(&["htop", "git"]));
        assert_eq!(
            doc.appimage_packages,
            strings(&["Krita.AppImage", "Obsidian.AppImage"])
        );
        assert!(doc.flatpak_packages.is_empty());
        assert!(doc.dotfiles.is_empty());
    }

    #[test]
    fn test_scanner_skips_non_string_lines() {
        let text = "\"native\": [\n  \"vim\",\n  42,\n  garbage\n  \"bad\"quote\",\n  \"nano\"\n]";
        let doc = parse(text.as_bytes());
        assert_eq!(doc.native_packages, strings(&["vim", "nano"]));
    }

    #[test]
    fn test_key_text_inside_values_is_ignored() {
        let text = "\"native\": [\"flatpak\", \"curl\",]\n\"flatpak\": [\"org.gnome.Maps\"]";
        let doc = parse(text.as_bytes());
        assert_eq!(doc.native_packages, strings(&["flatpak", "curl"]));
        assert_eq!(doc.flatpak_packages, strings(&["org.gnome.Maps"]));
    }

    #[test]
    fn test_scanner_keeps_commas_and_brackets_in_names() {
        // trailing commas force the line scanner
        let text = r#"{
  "native": [
    "foo,bar",
    "git",
  ],
  "flatpak": ["org.a,b", "x]y",],
  "dotfiles": [
    ".config/a]b",
    ".bashrc"
  ]
}"#;
        let doc = parse(text.as_bytes());
        assert_eq!(doc.native_packages, strings(&["foo,bar", "git"]));
        assert_eq!(doc.flatpak_packages, strings(&["org.a,b", "x]y"]));
        assert_eq!(doc.dotfiles, strings(&[".config/a]b", ".bashrc"]));
    }

    #[test]
    fn test_scanner_section_running_into_next_key_is_empty() {
        let text = "\"native\": [\n  \"htop\",\n\"flatpak\": [\n  \"org.gimp.GIMP\"\n],";
        let doc = parse(text.as_bytes());
        assert!(doc.native_packages.is_empty());
        assert_eq!(doc.flatpak_packages, strings(&["org.gimp.GIMP"]));
    }

    #[test]
    fn test_escaped_names_survive_structured_path() {
        let mut doc = sample();
        doc.native_packages = strings(&["odd\"name"]);
        assert_eq!(parse(serialize(&doc).unwrap().as_bytes()), doc);
    }

    #[test]
    fn test_garbage_input() {
        assert_eq!(parse(b"\xff\xfe not a profile"), ProfileDocument::default());
        assert_eq!(parse(b""), ProfileDocument::default());
    }
}
