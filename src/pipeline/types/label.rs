use crate::config::LabelSettings;
use crate::error::LabelError;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// An expression label such as `happy` or `surprise`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Upper-cased form used on the HUD.
    pub fn display_name(&self) -> String {
        self.0.to_uppercase()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Label {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[derive(Deserialize)]
struct LabelMetadata {
    labels: Vec<String>,
}

/// The ordered set of labels the classifier can produce. Index `i` of the
/// classifier output is label `i` here.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelUniverse {
    labels: IndexSet<Label>,
}

impl LabelUniverse {
    pub fn from_labels<I, S>(labels: I) -> Result<Self, LabelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = IndexSet::new();
        for name in labels {
            let label = Label::new(name);
            if !set.insert(label.clone()) {
                return Err(LabelError::Duplicate(label.0));
            }
        }
        if set.is_empty() {
            return Err(LabelError::Empty);
        }
        Ok(Self { labels: set })
    }

    /// Reads classifier metadata of the form `{"labels": ["angry", ...]}`.
    pub fn from_metadata_file(path: &Path) -> Result<Self, LabelError> {
        let source_err = |message: String| LabelError::Source {
            path: path.to_path_buf(),
            message,
        };
        let contents = std::fs::read_to_string(path).map_err(|e| source_err(e.to_string()))?;
        let metadata: LabelMetadata =
            serde_json::from_str(&contents).map_err(|e| source_err(e.to_string()))?;
        Self::from_labels(metadata.labels)
    }

    /// One label per class sub-directory of a training dataset, sorted by name.
    pub fn from_dataset_dir(path: &Path) -> Result<Self, LabelError> {
        let source_err = |message: String| LabelError::Source {
            path: path.to_path_buf(),
            message,
        };
        let mut names = Vec::new();
        for entry in std::fs::read_dir(path).map_err(|e| source_err(e.to_string()))? {
            let entry = entry.map_err(|e| source_err(e.to_string()))?;
            let is_dir = entry
                .file_type()
                .map_err(|e| source_err(e.to_string()))?
                .is_dir();
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_dir && !name.starts_with('.') {
                names.push(name);
            }
        }
        names.sort();
        Self::from_labels(names)
    }

    pub fn from_settings(settings: &LabelSettings) -> Result<Self, LabelError> {
        if !settings.labels.is_empty() {
            return Self::from_labels(settings.labels.iter().cloned());
        }
        if let Some(path) = &settings.labels_file {
            return Self::from_metadata_file(path);
        }
        if let Some(path) = &settings.dataset_dir {
            return Self::from_dataset_dir(path);
        }
        Err(LabelError::NoSource)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Label> {
        self.labels.get_index(index)
    }

    pub fn index_of(&self, label: &Label) -> Option<usize> {
        self.labels.get_index_of(label)
    }

    pub fn contains(&self, label: &Label) -> bool {
        self.labels.contains(label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }

    /// Checks the universe against the classifier's output contract: same
    /// size, and the same order when the classifier publishes its labels.
    pub fn check_output_space(
        &self,
        output_size: usize,
        output_labels: Option<&[String]>,
    ) -> Result<(), LabelError> {
        if output_size != self.len() {
            return Err(LabelError::OutputSizeMismatch {
                universe: self.len(),
                classifier: output_size,
            });
        }
        if let Some(names) = output_labels {
            if names.len() != self.len() {
                return Err(LabelError::OutputSizeMismatch {
                    universe: self.len(),
                    classifier: names.len(),
                });
            }
            for (index, (expected, found)) in self.labels.iter().zip(names).enumerate() {
                if expected.as_str() != found {
                    return Err(LabelError::OrderMismatch {
                        index,
                        expected: expected.0.clone(),
                        found: found.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn ensure_rounds(&self, rounds: usize) -> Result<(), LabelError> {
        if rounds > self.len() {
            return Err(LabelError::NotEnoughLabels {
                rounds,
                available: self.len(),
            });
        }
        Ok(())
    }
}
