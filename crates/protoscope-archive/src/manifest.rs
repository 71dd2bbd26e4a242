/// What a manifest line declares an annotation to be.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ManifestEntryKind {
    /// A generation template.
    Template,
    /// Any other kind the generator ships (validation, config, ...).
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ManifestEntry {
    pub name: String,
    pub kind: ManifestEntryKind,
}

impl ManifestEntry {
    pub fn is_template(&self) -> bool {
        self.kind == ManifestEntryKind::Template
    }
}

/// Parses the generator's annotation manifest.
///
/// One `<kind>:<qualified name>` record per line. Blank lines and `#`
/// comments are skipped, as are lines without a kind or a name.
pub fn parse_annotations_manifest(text: &str) -> Vec<ManifestEntry> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let (kind, name) = line.split_once(':')?;
            let (kind, name) = (kind.trim(), name.trim());
            if kind.is_empty() || name.is_empty() {
                return None;
            }
            let kind = if kind.eq_ignore_ascii_case("template") {
                ManifestEntryKind::Template
            } else {
                ManifestEntryKind::Other(kind.to_ascii_lowercase())
            };
            Some(ManifestEntry {
                name: name.to_string(),
                kind,
            })
        })
        .collect()
}
