/*!
 * Sensitivity Classification
 * Case-insensitive substring matching of resolved paths against a pattern set
 */

use std::path::Path;

/// Result of classifying a single path
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SensitivityVerdict {
    pub is_sensitive: bool,
    /// First pattern that matched, for diagnostics only
    pub matched_pattern: Option<String>,
}

impl SensitivityVerdict {
    fn matched(pattern: &str) -> Self {
        Self {
            is_sensitive: true,
            matched_pattern: Some(pattern.to_string()),
        }
    }
}

/// Stateless classifier over an ordered, lower-cased pattern set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensitivityClassifier {
    patterns: Vec<String>,
}

impl SensitivityClassifier {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.as_ref().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn classify(&self, path: &Path) -> SensitivityVerdict {
        self.classify_str(&path.to_string_lossy())
    }

    pub fn classify_str(&self, path: &str) -> SensitivityVerdict {
        let lowered = path.to_lowercase();
        self.patterns
            .iter()
            .find(|pattern| lowered.contains(pattern.as_str()))
            .map(|pattern| SensitivityVerdict::matched(pattern))
            .unwrap_or_default()
    }

    pub fn is_sensitive(&self, path: &Path) -> bool {
        self.classify(path).is_sensitive
    }
}
