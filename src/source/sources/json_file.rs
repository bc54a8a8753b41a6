use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::documents::STROKES_FIELD;
use crate::data::Sample;
use crate::errors::PartitionError;
use crate::source::SampleSource;
use crate::types::SourceId;

/// Source reading one JSON document from disk.
///
/// Accepted shapes: a top-level array of sample objects, or an object whose
/// `strokes` field holds that array (a missing field means no samples).
#[derive(Clone, Debug)]
pub struct JsonFileSource {
    id: SourceId,
    path: PathBuf,
}

impl JsonFileSource {
    /// Source for `path`; the id defaults to the path as displayed.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            id: path.display().to_string(),
            path,
        }
    }

    /// Override the identifier used in logs and reports.
    pub fn with_id(mut self, id: impl Into<SourceId>) -> Self {
        self.id = id.into();
        self
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SampleSource for JsonFileSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn load(&self) -> Result<Vec<Sample>, PartitionError> {
        if !self.path.exists() {
            return Err(PartitionError::SourceUnavailable {
                source_id: self.id.clone(),
                reason: "file not found".into(),
            });
        }
        let raw = fs::read(&self.path).map_err(|err| PartitionError::SourceUnavailable {
            source_id: self.id.clone(),
            reason: err.to_string(),
        })?;
        let document: Value =
            serde_json::from_slice(&raw).map_err(|err| malformed(&self.id, err.to_string()))?;
        samples_from_document(&self.id, document)
    }
}

/// Extract the sample list from a parsed document.
///
/// The whole document is validated before anything is returned, so a
/// malformed source never contributes a partial list.
pub fn samples_from_document(
    source_id: &str,
    document: Value,
) -> Result<Vec<Sample>, PartitionError> {
    let items = match document {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.get_mut(STROKES_FIELD).map(Value::take) {
            None => Vec::new(),
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(malformed(
                    source_id,
                    format!(
                        "'{STROKES_FIELD}' must be an array, found {}",
                        value_kind(&other)
                    ),
                ));
            }
        },
        other => {
            return Err(malformed(
                source_id,
                format!(
                    "top-level document must be an array or object, found {}",
                    value_kind(&other)
                ),
            ));
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            if item.is_object() {
                Ok(Sample::new(item))
            } else {
                Err(malformed(
                    source_id,
                    format!("sample {idx} must be an object, found {}", value_kind(&item)),
                ))
            }
        })
        .collect()
}

fn malformed(source_id: &str, details: String) -> PartitionError {
    PartitionError::SourceMalformed {
        source_id: source_id.to_string(),
        details,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn bare_array_and_keyed_document_are_both_accepted() {
        let bare = samples_from_document("a", json!([{"label": "o"}, {"label": "w"}])).unwrap();
        assert_eq!(bare.len(), 2);

        let keyed =
            samples_from_document("b", json!({"version": 2, "strokes": [{"label": "n"}]}))
                .unwrap();
        assert_eq!(keyed.len(), 1);
        assert_eq!(keyed[0].raw_label(), Some("n"));
    }

    #[test]
    fn keyed_document_without_strokes_is_empty() {
        let samples = samples_from_document("c", json!({"meta": "nothing here"})).unwrap();
        assert!(samples.is_empty());
    }

    #[test]
    fn wrong_shapes_are_malformed() {
        let scalar = samples_from_document("d", json!(42)).unwrap_err();
        assert!(matches!(
            scalar,
            PartitionError::SourceMalformed { ref details, .. } if details.contains("a number")
        ));

        let strokes = samples_from_document("e", json!({"strokes": "oops"})).unwrap_err();
        assert!(matches!(
            strokes,
            PartitionError::SourceMalformed { ref details, .. } if details.contains("'strokes'")
        ));

        let element = samples_from_document("f", json!([{"label": "o"}, 7])).unwrap_err();
        assert!(matches!(
            element,
            PartitionError::SourceMalformed { ref details, .. } if details.contains("sample 1")
        ));
    }

    #[test]
    fn missing_file_is_unavailable() {
        let dir = tempdir().unwrap();
        let source = JsonFileSource::new(dir.path().join("absent.json"));
        let err = source.load().unwrap_err();
        assert!(matches!(err, PartitionError::SourceUnavailable { .. }));
        assert!(err.is_source_failure());
    }

    #[test]
    fn unparseable_file_is_malformed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, b"{\"strokes\": [").unwrap();
        let source = JsonFileSource::new(&path).with_id("broken");
        assert_eq!(source.id(), "broken");
        assert_eq!(source.path(), path.as_path());
        let err = source.load().unwrap_err();
        assert!(matches!(
            err,
            PartitionError::SourceMalformed { ref source_id, .. } if source_id == "broken"
        ));
    }

    #[test]
    fn file_samples_load_in_document_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("strokes.json");
        fs::write(
            &path,
            r#"{"strokes":[{"label":"o","id":0},{"label":"N","id":1},{"label":"w","id":2}]}"#,
        )
        .unwrap();
        let samples = JsonFileSource::new(&path).load().unwrap();
        let ids: Vec<_> = samples
            .iter()
            .map(|sample| sample.payload()["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }
}
