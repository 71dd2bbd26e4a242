use std::collections::BTreeMap;
use std::path::Path;

use crate::Archive;

const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";
const CODEGEN_VENDOR: &str = "Binis Belev";
const CODEGEN_JAR_MARKER: &str = "code-generator";

/// Main attributes of a `META-INF/MANIFEST.MF`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JarManifest {
    attributes: BTreeMap<String, String>,
}

impl JarManifest {
    /// Parses the main section; continuation lines (leading space) are joined
    /// onto the previous attribute.
    pub fn parse(text: &str) -> Self {
        let mut attributes: BTreeMap<String, String> = BTreeMap::new();
        let mut last: Option<String> = None;
        for line in text.lines() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                break;
            }
            if let Some(rest) = line.strip_prefix(' ') {
                if let Some(value) = last.as_ref().and_then(|key| attributes.get_mut(key)) {
                    value.push_str(rest);
                }
                continue;
            }
            if let Some((key, value)) = line.split_once(':') {
                let key = key.trim().to_string();
                attributes.insert(key.clone(), value.trim().to_string());
                last = Some(key);
            }
        }
        Self { attributes }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Extracts the first dotted version number from a jar file name
/// (`code-generator-1.2.13.jar` → `1.2.13`). Returns an empty string when the
/// name has no digits.
pub fn version_from_jar_name(file_name: &str) -> String {
    let mut version = String::new();
    let mut dot_seen = false;
    for c in file_name.chars() {
        if c.is_ascii_digit() {
            if dot_seen {
                version.push('.');
                dot_seen = false;
            }
            version.push(c);
        } else if !version.is_empty() {
            if !dot_seen && c == '.' {
                dot_seen = true;
            } else {
                break;
            }
        }
    }
    version
}

/// Whether `path` is one of the generator's own jars: named like
/// `code-generator*.jar` and built by the generator's vendor.
pub fn is_codegen_archive(path: &Path) -> bool {
    let is_jar = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jar"));
    let named = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem.contains(CODEGEN_JAR_MARKER));
    if !is_jar || !named {
        return false;
    }

    match Archive::new(path).read_to_string(MANIFEST_PATH) {
        Ok(Some(text)) => JarManifest::parse(&text)
            .get("Implementation-Vendor")
            .is_some_and(|vendor| vendor.trim() == CODEGEN_VENDOR),
        Ok(None) => false,
        Err(err) => {
            tracing::debug!(path = %path.display(), err = %err, "failed to read jar manifest");
            false
        }
    }
}

/// The generator version used by a project, read from the first matching
/// classpath archive that carries a version in its name.
pub fn codegen_version<'a>(archives: impl IntoIterator<Item = &'a Path>) -> Option<String> {
    archives
        .into_iter()
        .filter(|path| is_codegen_archive(path))
        .filter_map(|path| path.file_name()?.to_str().map(version_from_jar_name))
        .find(|version| !version.is_empty())
}
