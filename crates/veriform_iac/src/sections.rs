//! Artifact section parsing.
//!
//! Generated artifacts multiplex several providers' code into one text
//! using `# SECTION <PROVIDER_ID>` delimiter lines. This module splits such
//! an artifact into an ordered provider-to-code mapping. Parsing never
//! fails: a marker-less artifact collapses into a single implicit section.

/// Delimiter prefix introducing a provider-scoped block.
const SECTION_MARKER: &str = "# SECTION ";

/// Key used when an artifact carries no section markers.
pub const FALLBACK_KEY: &str = "all";

/// Ordered mapping of provider key to code segment.
///
/// Keys are lower-cased and trimmed; order is first appearance in the
/// artifact. A repeated key overwrites its segment in place, keeping the
/// original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderSections {
    entries: Vec<(String, String)>,
}

impl ProviderSections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a segment, overwriting any existing segment under the key.
    pub fn insert(&mut self, key: impl Into<String>, code: impl Into<String>) {
        let key = key.into();
        let code = code.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = code,
            None => self.entries.push((key, code)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, code)| code.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, c)| (k.as_str(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Re-join the sections into one consolidated artifact.
    ///
    /// A lone fallback section is returned as-is; named sections get their
    /// marker lines back (upper-cased ids).
    pub fn consolidated(&self) -> String {
        if self.len() == 1 {
            if let Some(code) = self.get(FALLBACK_KEY) {
                return code.to_string();
            }
        }
        self.entries
            .iter()
            .map(|(key, code)| {
                format!("{}{}\n{}\n", SECTION_MARKER, key.to_uppercase(), code)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Split a raw artifact into provider sections.
///
/// Line scan with a current-provider cursor: a marker line flushes the
/// accumulated buffer and opens a new section; other lines accumulate
/// verbatim (blank lines included) while a provider is active. Text before
/// the first marker is preamble, not a section. A non-empty artifact with
/// no markers lands under [`FALLBACK_KEY`].
pub fn parse_sections(artifact: &str) -> ProviderSections {
    let mut sections = ProviderSections::new();
    let mut current: Option<String> = None;
    let mut buffer = String::new();

    for line in artifact.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix(SECTION_MARKER) {
            if let Some(provider) = current.take() {
                if !buffer.trim().is_empty() {
                    sections.insert(provider, buffer.trim().to_string());
                }
            }
            buffer.clear();
            current = Some(rest.trim().to_lowercase());
        } else if current.is_some() {
            buffer.push_str(line);
            buffer.push('\n');
        }
        // Lines before the first marker are discarded.
    }

    if let Some(provider) = current {
        if !buffer.trim().is_empty() {
            sections.insert(provider, buffer.trim().to_string());
        }
    }

    if sections.is_empty() && !artifact.trim().is_empty() {
        sections.insert(FALLBACK_KEY, artifact.trim().to_string());
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_multiple_sections() {
        let artifact = "# SECTION AWS\nresource \"aws_instance\" \"a\" {}\n\
                        # SECTION AZURE\nresource \"azurerm_vm\" \"b\" {}\n\
                        # SECTION GCP\nresource \"google_compute_instance\" \"c\" {}\n";
        let sections = parse_sections(artifact);

        assert_eq!(sections.len(), 3);
        let keys: Vec<&str> = sections.keys().collect();
        assert_eq!(keys, vec!["aws", "azure", "gcp"]);
        assert_eq!(sections.get("aws"), Some("resource \"aws_instance\" \"a\" {}"));
        assert_eq!(sections.get("gcp"), Some("resource \"google_compute_instance\" \"c\" {}"));
    }

    #[test]
    fn test_bodies_keep_interior_blank_lines() {
        let artifact = "# SECTION AWS\nline one\n\nline two\n";
        let sections = parse_sections(artifact);

        assert_eq!(sections.get("aws"), Some("line one\n\nline two"));
    }

    #[test]
    fn test_no_marker_fallback() {
        let sections = parse_sections("  resource \"aws_vpc\" \"main\" {}  \n");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections.get(FALLBACK_KEY), Some("resource \"aws_vpc\" \"main\" {}"));
    }

    #[test]
    fn test_empty_input_yields_empty_map() {
        assert!(parse_sections("").is_empty());
        assert!(parse_sections("   \n  \n").is_empty());
    }

    #[test]
    fn test_preamble_discarded() {
        let artifact = "generated by tool v1\n# SECTION AWS\ncode\n";
        let sections = parse_sections(artifact);

        assert_eq!(sections.len(), 1);
        assert_eq!(sections.get("aws"), Some("code"));
    }

    #[test]
    fn test_duplicate_marker_overwrites() {
        let artifact = "# SECTION AWS\nfirst body\n# SECTION AWS\nsecond body\n";
        let sections = parse_sections(artifact);

        assert_eq!(sections.len(), 1);
        assert_eq!(sections.get("aws"), Some("second body"));
    }

    #[test]
    fn test_duplicate_marker_keeps_first_position() {
        let artifact = "# SECTION AWS\na\n# SECTION GCP\ng\n# SECTION AWS\nz\n";
        let sections = parse_sections(artifact);

        let keys: Vec<&str> = sections.keys().collect();
        assert_eq!(keys, vec!["aws", "gcp"]);
        assert_eq!(sections.get("aws"), Some("z"));
    }

    #[test]
    fn test_marker_keys_normalized() {
        let artifact = "  # SECTION   OpenStack  \ncode\n";
        let sections = parse_sections(artifact);

        assert_eq!(sections.get("openstack"), Some("code"));
    }

    #[test]
    fn test_marker_with_empty_body_dropped() {
        let artifact = "# SECTION AWS\n\n# SECTION GCP\ncode\n";
        let sections = parse_sections(artifact);

        assert_eq!(sections.len(), 1);
        assert_eq!(sections.get("gcp"), Some("code"));
    }

    #[test]
    fn test_consolidated_single_fallback() {
        let sections = parse_sections("just code\n");
        assert_eq!(sections.consolidated(), "just code");
    }

    #[test]
    fn test_consolidated_named_sections_reparse() {
        let artifact = "# SECTION AWS\naws code\n# SECTION GCP\ngcp code\n";
        let sections = parse_sections(artifact);
        let reparsed = parse_sections(&sections.consolidated());

        assert_eq!(sections, reparsed);
    }
}
