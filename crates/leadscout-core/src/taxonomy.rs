//! Industry taxonomy, search locations, and keyword synonyms.
//!
//! Loaded once from a YAML file and treated as immutable configuration. The
//! synonym table is handed to the expansion controller rather than being
//! baked into it.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ConfigError;

/// Immutable lookup from a primary industry keyword to its alternative terms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordSynonyms(HashMap<String, Vec<String>>);

impl KeywordSynonyms {
    #[must_use]
    pub fn new(map: HashMap<String, Vec<String>>) -> Self {
        Self(map)
    }

    /// Returns the keyword followed by its known synonyms, in table order.
    ///
    /// The primary keyword always comes first. Repeated terms and terms equal
    /// to the primary keyword are dropped. A keyword with no entry expands to
    /// itself only.
    #[must_use]
    pub fn expand(&self, keyword: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        seen.insert(keyword.to_owned());
        out.push(keyword.to_owned());
        if let Some(alternatives) = self.0.get(keyword) {
            for alt in alternatives {
                if seen.insert(alt.clone()) {
                    out.push(alt.clone());
                }
            }
        }
        out
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Category name to industry keywords, in the order the file lists them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Categories(Vec<(String, Vec<String>)>);

impl Categories {
    #[allow(clippy::iter_without_into_iter)]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(name, industries)| (name.as_str(), industries.as_slice()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Categories {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, industries) in &self.0 {
            map.serialize_entry(name, industries)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Categories {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CategoriesVisitor;

        impl<'de> Visitor<'de> for CategoriesVisitor {
            type Value = Categories;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of category name to industry keywords")
            }

            fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Categories, M::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, Vec<String>>()? {
                    entries.push(entry);
                }
                Ok(Categories(entries))
            }
        }

        deserializer.deserialize_map(CategoriesVisitor)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Taxonomy {
    /// Appended to every free-text location query, e.g. `"Northern Ireland"`.
    #[serde(default)]
    pub region: Option<String>,
    pub locations: Vec<String>,
    pub categories: Categories,
    #[serde(default)]
    pub synonyms: KeywordSynonyms,
}

impl Taxonomy {
    /// Industry keywords for a category name, matched case-insensitively.
    #[must_use]
    pub fn industries_in(&self, category: &str) -> Option<&[String]> {
        self.categories
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(category))
            .map(|(_, industries)| industries)
    }
}

/// Load and validate the taxonomy from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_taxonomy(path: &Path) -> Result<Taxonomy, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::TaxonomyFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_taxonomy(&content)
}

/// Parse and validate a taxonomy document held in memory.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_taxonomy(content: &str) -> Result<Taxonomy, ConfigError> {
    let taxonomy: Taxonomy = serde_yaml::from_str(content)?;
    validate_taxonomy(&taxonomy)?;
    Ok(taxonomy)
}

fn validate_taxonomy(taxonomy: &Taxonomy) -> Result<(), ConfigError> {
    let mut seen_locations = HashSet::new();
    for location in &taxonomy.locations {
        if location.trim().is_empty() {
            return Err(ConfigError::Validation(
                "location names must be non-empty".to_string(),
            ));
        }
        if !seen_locations.insert(location.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate location: '{location}'"
            )));
        }
    }

    let mut seen_categories = HashSet::new();
    for (category, industries) in taxonomy.categories.iter() {
        if !seen_categories.insert(category.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate category: '{category}'"
            )));
        }
        if industries.is_empty() {
            return Err(ConfigError::Validation(format!(
                "category '{category}' has no industries"
            )));
        }
        if industries.iter().any(|i| i.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "category '{category}' contains an empty industry keyword"
            )));
        }
    }

    for (keyword, alternatives) in &taxonomy.synonyms.0 {
        if alternatives.iter().any(|a| a.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "synonyms for '{keyword}' contain an empty term"
            )));
        }
        if alternatives.iter().any(|a| a == keyword) {
            return Err(ConfigError::Validation(format!(
                "synonyms for '{keyword}' list the keyword itself"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r"
region: Northern Ireland
locations: [Belfast, Omagh]
categories:
  Fitness & Recreation: [gym, boxing_gym]
  Hospitality & Food: [restaurant, cafe]
synonyms:
  boxing_gym: [boxing club, kickboxing gym]
  gym: [fitness centre, gym, fitness centre]
";

    fn synonyms(pairs: &[(&str, &[&str])]) -> KeywordSynonyms {
        KeywordSynonyms::new(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_owned(), v.iter().map(|s| (*s).to_owned()).collect()))
                .collect(),
        )
    }

    #[test]
    fn expand_puts_primary_keyword_first() {
        let table = synonyms(&[("boxing_gym", &["boxing club", "kickboxing gym"])]);
        assert_eq!(
            table.expand("boxing_gym"),
            vec!["boxing_gym", "boxing club", "kickboxing gym"]
        );
    }

    #[test]
    fn expand_without_entry_returns_keyword_only() {
        let table = synonyms(&[("gym", &["fitness centre"])]);
        assert_eq!(table.expand("restaurant"), vec!["restaurant"]);
    }

    #[test]
    fn expand_drops_repeats() {
        let table = synonyms(&[("gym", &["fitness centre", "fitness centre"])]);
        assert_eq!(table.expand("gym"), vec!["gym", "fitness centre"]);
    }

    #[test]
    fn rejects_synonym_listing_itself() {
        let err = parse_taxonomy(SAMPLE).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("'gym'")));
    }

    #[test]
    fn parses_valid_taxonomy() {
        let doc = SAMPLE.replace("[fitness centre, gym, fitness centre]", "[fitness centre]");
        let taxonomy = parse_taxonomy(&doc).unwrap();
        assert_eq!(taxonomy.region.as_deref(), Some("Northern Ireland"));
        assert_eq!(taxonomy.locations, vec!["Belfast", "Omagh"]);
        assert_eq!(
            taxonomy.industries_in("fitness & recreation"),
            Some(&["gym".to_owned(), "boxing_gym".to_owned()][..])
        );
        assert_eq!(taxonomy.synonyms.len(), 2);
    }

    #[test]
    fn rejects_duplicate_location_case_insensitively() {
        let doc = "locations: [Belfast, belfast]\ncategories:\n  Food: [cafe]\n";
        let err = parse_taxonomy(doc).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("duplicate location")));
    }

    #[test]
    fn categories_keep_file_order() {
        let doc = "locations: [Belfast]\ncategories:\n  Retail: [florist]\n  Automotive: [garage]\n  Marketing: [printer]\n";
        let taxonomy = parse_taxonomy(doc).unwrap();
        let names: Vec<&str> = taxonomy.categories.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["Retail", "Automotive", "Marketing"]);

        let rendered = serde_yaml::to_string(&taxonomy.categories).unwrap();
        let retail = rendered.find("Retail").unwrap();
        let automotive = rendered.find("Automotive").unwrap();
        assert!(retail < automotive, "{rendered}");
    }

    #[test]
    fn rejects_duplicate_category_case_insensitively() {
        let doc = "locations: [Belfast]\ncategories:\n  Food: [cafe]\n  food: [bakery]\n";
        let err = parse_taxonomy(doc).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("duplicate category")));
    }

    #[test]
    fn rejects_empty_category() {
        let doc = "locations: [Belfast]\ncategories:\n  Food: []\n";
        let err = parse_taxonomy(doc).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("no industries")));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_taxonomy(Path::new("/nonexistent/taxonomy.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::TaxonomyFileIo { .. }));
    }
}
