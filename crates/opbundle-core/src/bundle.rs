//! Bundle definition and loading

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::archive;
use crate::error::{CoreError, Result};

/// Kind of the bundle descriptor document
pub const CSV_KIND: &str = "ClusterServiceVersion";

/// Kind of CustomResourceDefinition documents
pub const CRD_KIND: &str = "CustomResourceDefinition";

/// Subdirectory holding the manifests in the standard bundle layout
pub const MANIFESTS_DIR: &str = "manifests";

/// The subset of Kubernetes object metadata the validators care about
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub namespace: Option<String>,

    /// Annotations; values must be YAML strings (`null` reads as empty)
    #[serde(default, deserialize_with = "string_map")]
    pub annotations: BTreeMap<String, String>,

    #[serde(default, deserialize_with = "string_map")]
    pub labels: BTreeMap<String, String>,
}

/// The bundle descriptor (ClusterServiceVersion)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterServiceVersion {
    pub api_version: String,

    pub kind: String,

    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: serde_yaml::Value,
}

impl ClusterServiceVersion {
    /// CSV name (metadata.name)
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Operator version from `spec.version`
    pub fn version(&self) -> Option<&str> {
        self.spec.get("version").and_then(|v| v.as_str())
    }

    /// Minimum Kubernetes version from `spec.minKubeVersion`
    pub fn min_kube_version(&self) -> Option<&str> {
        self.spec.get("minKubeVersion").and_then(|v| v.as_str())
    }
}

/// An unstructured Kubernetes manifest shipped in a bundle
#[derive(Debug, Clone)]
pub struct Object {
    /// apiVersion (`group/version` or `version` for the core group)
    pub api_version: String,

    pub kind: String,

    pub metadata: ObjectMeta,

    /// Full document
    pub content: serde_yaml::Value,

    /// File the document was read from (relative to the bundle root)
    pub source: Option<PathBuf>,
}

impl Object {
    /// Object name (metadata.name)
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Check if this object is a CustomResourceDefinition
    pub fn is_crd(&self) -> bool {
        self.kind == CRD_KIND
    }
}

/// Header fields shared by every manifest document
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypeHeader {
    #[serde(default)]
    api_version: String,
    #[serde(default)]
    kind: String,
    #[serde(default)]
    metadata: ObjectMeta,
}

/// An operator bundle: one ClusterServiceVersion plus the objects it ships
#[derive(Debug, Clone, Default)]
pub struct Bundle {
    /// Bundle name (the CSV name, or the source name when there is no CSV)
    pub name: String,

    /// Bundle descriptor
    pub csv: Option<ClusterServiceVersion>,

    /// Every manifest except the CSV
    pub objects: Vec<Object>,
}

impl Bundle {
    /// Load a bundle from a directory or a `.tar.gz` archive
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(CoreError::BundleNotFound {
                path: path.display().to_string(),
            });
        }

        if path.is_file() && archive::is_archive(path) {
            Self::from_archive(path)
        } else if path.is_dir() {
            Self::from_dir(path)
        } else {
            Err(CoreError::InvalidBundle {
                message: format!(
                    "{} is neither a bundle directory nor a .tar.gz archive",
                    path.display()
                ),
            })
        }
    }

    /// Load a bundle from a directory
    ///
    /// Uses `<dir>/manifests` when present, otherwise `dir` itself.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let root = dir.as_ref();
        let manifests_dir = {
            let candidate = root.join(MANIFESTS_DIR);
            if candidate.is_dir() {
                candidate
            } else {
                root.to_path_buf()
            }
        };

        let mut documents = Vec::new();
        for file_path in manifest_files(&manifests_dir)? {
            let content = std::fs::read_to_string(&file_path)?;
            let relative = file_path
                .strip_prefix(root)
                .unwrap_or(&file_path)
                .to_path_buf();
            documents.push((relative, content));
        }

        let fallback_name = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| root.display().to_string());

        Self::from_documents(fallback_name, documents)
    }

    /// Load a bundle from a gzipped tarball
    pub fn from_archive<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let documents = archive::read_manifest_documents(path)?;
        let fallback_name = archive::archive_stem(path);

        Self::from_documents(fallback_name, documents)
    }

    /// Build a bundle from `(source, content)` pairs
    ///
    /// `.json` sources are parsed as JSON, everything else as (multi-document) YAML.
    pub fn from_documents<I, P>(fallback_name: impl Into<String>, documents: I) -> Result<Self>
    where
        I: IntoIterator<Item = (P, String)>,
        P: Into<PathBuf>,
    {
        let mut csv: Option<ClusterServiceVersion> = None;
        let mut objects = Vec::new();

        for (source, content) in documents {
            let source = source.into();

            for value in parse_documents(&source, &content)? {
                let header: TypeHeader = decode(&source, value.clone())?;
                if header.kind.is_empty() {
                    tracing::debug!("Skipping document without kind in {}", source.display());
                    continue;
                }

                if header.kind == CSV_KIND {
                    if let Some(existing) = &csv {
                        return Err(CoreError::InvalidBundle {
                            message: format!(
                                "more than one ClusterServiceVersion found ({} and {})",
                                existing.name(),
                                header.metadata.name
                            ),
                        });
                    }
                    csv = Some(decode(&source, value)?);
                    continue;
                }

                objects.push(Object {
                    api_version: header.api_version,
                    kind: header.kind,
                    metadata: header.metadata,
                    content: value,
                    source: Some(source.clone()),
                });
            }
        }

        let name = match &csv {
            Some(csv) if !csv.name().is_empty() => csv.name().to_string(),
            _ => fallback_name.into(),
        };

        tracing::debug!(
            bundle = %name,
            has_csv = csv.is_some(),
            objects = objects.len(),
            "Loaded bundle"
        );

        Ok(Self { name, csv, objects })
    }

    /// Object counts per kind, sorted by kind
    pub fn kind_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for object in &self.objects {
            *counts.entry(object.kind.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

/// Check if a path has a manifest file extension
pub(crate) fn is_manifest_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| matches!(ext.as_str(), "yaml" | "yml" | "json"))
}

/// Manifest files below a directory, sorted for deterministic ordering
///
/// Any directory that cannot be walked fails the load.
fn manifest_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(dir) {
        let path = entry.map_err(|e| CoreError::Io(e.into()))?.into_path();
        if path.is_file() && is_manifest_file(&path) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Deserialize a typed view of a document, naming the file on failure
fn decode<T: DeserializeOwned>(source: &Path, value: serde_yaml::Value) -> Result<T> {
    serde_yaml::from_value(value).map_err(|e| CoreError::InvalidBundle {
        message: format!("{}: {}", source.display(), e),
    })
}

/// Parse a file's content into one value per non-empty document
fn parse_documents(source: &Path, content: &str) -> Result<Vec<serde_yaml::Value>> {
    let is_json = source
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        let json: serde_json::Value = serde_json::from_str(content)?;
        return Ok(vec![serde_yaml::to_value(json)?]);
    }

    let mut values = Vec::new();
    for document in serde_yaml::Deserializer::from_str(content) {
        let value = serde_yaml::Value::deserialize(document)?;
        if !value.is_null() {
            values.push(value);
        }
    }
    Ok(values)
}

/// Deserialize a string map, rejecting non-string values by key
///
/// YAML reads `1.30` as the float 1.3, so numbers cannot be turned back
/// into the text that was written.
fn string_map<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, serde_yaml::Value>> = Option::deserialize(deserializer)?;

    raw.unwrap_or_default()
        .into_iter()
        .map(|(key, value)| match value {
            serde_yaml::Value::String(s) => Ok((key, s)),
            serde_yaml::Value::Null => Ok((key, String::new())),
            other => Err(D::Error::custom(format!(
                "value of `{}` must be a string, found {}; quote it",
                key,
                value_kind(&other)
            ))),
        })
        .collect()
}

fn value_kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Bool(_) => "a boolean",
        serde_yaml::Value::Number(_) => "a number",
        serde_yaml::Value::Sequence(_) => "a sequence",
        serde_yaml::Value::Mapping(_) => "a mapping",
        _ => "a non-string value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const CSV: &str = r#"
apiVersion: operators.coreos.com/v1alpha1
kind: ClusterServiceVersion
metadata:
  name: memcached-operator.v0.0.1
  annotations:
    operators.operatorframework.io/maxKubeVersion: 1.21.0
spec:
  version: 0.0.1
  minKubeVersion: 1.16.0
"#;

    const CRD_V1BETA1: &str = r#"
apiVersion: apiextensions.k8s.io/v1beta1
kind: CustomResourceDefinition
metadata:
  name: memcacheds.cache.example.com
"#;

    const SERVICE: &str = r#"
apiVersion: v1
kind: Service
metadata:
  name: memcached-operator-metrics
"#;

    fn write_bundle(with_manifests_dir: bool) -> TempDir {
        let dir = TempDir::new().unwrap();
        let manifests = if with_manifests_dir {
            dir.path().join("manifests")
        } else {
            dir.path().to_path_buf()
        };
        fs::create_dir_all(&manifests).unwrap();
        fs::write(manifests.join("memcached.clusterserviceversion.yaml"), CSV).unwrap();
        fs::write(manifests.join("cache.example.com_memcacheds.yaml"), CRD_V1BETA1).unwrap();
        fs::write(manifests.join("metrics-service.yaml"), SERVICE).unwrap();
        fs::write(manifests.join("README.md"), "not a manifest").unwrap();
        dir
    }

    #[test]
    fn test_load_standard_layout() {
        let dir = write_bundle(true);
        fs::create_dir_all(dir.path().join("metadata")).unwrap();
        fs::write(
            dir.path().join("metadata/annotations.yaml"),
            "annotations:\n  operators.operatorframework.io.bundle.package.v1: memcached\n",
        )
        .unwrap();

        let bundle = Bundle::load(dir.path()).unwrap();

        assert_eq!(bundle.name, "memcached-operator.v0.0.1");
        assert_eq!(bundle.objects.len(), 2);
        assert_eq!(bundle.objects.iter().filter(|o| o.is_crd()).count(), 1);
    }

    #[test]
    fn test_load_flat_layout() {
        let dir = write_bundle(false);
        let bundle = Bundle::load(dir.path()).unwrap();

        assert!(bundle.csv.is_some());
        assert_eq!(bundle.objects.len(), 2);
    }

    #[test]
    fn test_load_missing_path() {
        let err = Bundle::load("/nonexistent/bundle/path").unwrap_err();
        assert!(matches!(err, CoreError::BundleNotFound { .. }));
    }

    #[test]
    fn test_csv_accessors() {
        let bundle = Bundle::from_documents("b", vec![("csv.yaml", CSV.to_string())]).unwrap();
        let csv = bundle.csv.as_ref().unwrap();

        assert_eq!(
            csv.metadata.annotations["operators.operatorframework.io/maxKubeVersion"],
            "1.21.0"
        );
        assert_eq!(csv.version(), Some("0.0.1"));
        assert_eq!(csv.min_kube_version(), Some("1.16.0"));
        assert!(!csv.metadata.annotations.contains_key("missing"));
    }

    #[test]
    fn test_multi_document_file() {
        let content = format!("{}\n---\n{}\n---\n# trailing comment only\n", CRD_V1BETA1, SERVICE);
        let bundle = Bundle::from_documents("multi", vec![("all.yaml", content)]).unwrap();

        assert_eq!(bundle.name, "multi");
        assert!(bundle.csv.is_none());
        assert_eq!(bundle.objects.len(), 2);
        assert_eq!(bundle.objects[0].name(), "memcacheds.cache.example.com");
        assert_eq!(bundle.objects[1].kind, "Service");
        assert_eq!(bundle.objects[1].source, Some(PathBuf::from("all.yaml")));
    }

    #[test]
    fn test_json_manifest() {
        let json = r#"{"apiVersion":"v1","kind":"ConfigMap","metadata":{"name":"settings"}}"#;
        let bundle = Bundle::from_documents("json", vec![("cm.json", json.to_string())]).unwrap();

        assert_eq!(bundle.objects.len(), 1);
        assert_eq!(bundle.objects[0].kind, "ConfigMap");
        assert_eq!(bundle.objects[0].name(), "settings");
    }

    #[test]
    fn test_documents_without_kind_are_skipped() {
        let content = "annotations:\n  foo: bar\n".to_string();
        let bundle = Bundle::from_documents("x", vec![("annotations.yaml", content)]).unwrap();
        assert!(bundle.objects.is_empty());
    }

    #[test]
    fn test_duplicate_csv_rejected() {
        let err = Bundle::from_documents(
            "dup",
            vec![("a.yaml", CSV.to_string()), ("b.yaml", CSV.to_string())],
        )
        .unwrap_err();

        assert!(matches!(err, CoreError::InvalidBundle { .. }));
        assert!(err.to_string().contains("more than one ClusterServiceVersion"));
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let err = Bundle::from_documents("bad", vec![("bad.yaml", "kind: [unclosed".to_string())])
            .unwrap_err();
        assert!(matches!(err, CoreError::YamlParse(_)));
    }

    fn csv_with_annotation(value: &str) -> String {
        format!(
            "apiVersion: operators.coreos.com/v1alpha1\n\
             kind: ClusterServiceVersion\n\
             metadata:\n  name: annotated\n  annotations:\n    \
             operators.operatorframework.io/maxKubeVersion: {}\n",
            value
        )
    }

    #[test]
    fn test_annotation_strings_kept_verbatim() {
        let cases = [
            ("\"1.30\"", "1.30"),
            ("'1.20.0'", "1.20.0"),
            ("v1.21", "v1.21"),
            ("", ""),
        ];

        for (written, expected) in cases {
            let documents = vec![("csv.yaml", csv_with_annotation(written))];
            let bundle = Bundle::from_documents("c", documents).unwrap();
            let csv = bundle.csv.unwrap();
            assert_eq!(
                csv.metadata.annotations["operators.operatorframework.io/maxKubeVersion"],
                expected,
                "annotation written as {}",
                written
            );
        }
    }

    #[test]
    fn test_unquoted_number_annotation_rejected() {
        for written in ["1.30", "1.21", "2", "true"] {
            let err = Bundle::from_documents("c", vec![("csv.yaml", csv_with_annotation(written))])
                .unwrap_err();

            assert!(
                matches!(err, CoreError::InvalidBundle { .. }),
                "{} should be rejected",
                written
            );
            let message = err.to_string();
            assert!(message.contains("csv.yaml"));
            assert!(message.contains("operators.operatorframework.io/maxKubeVersion"));
            assert!(message.contains("must be a string"));
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_fails_load() {
        use std::os::unix::fs::PermissionsExt;

        let dir = write_bundle(true);
        let locked = dir.path().join("manifests/crds");
        fs::create_dir_all(&locked).unwrap();
        fs::write(locked.join("crd.yaml"), CRD_V1BETA1).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits do not apply to root
        let readable = fs::read_dir(&locked).is_ok();
        let result = Bundle::load(dir.path());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        if !readable {
            assert!(matches!(result, Err(CoreError::Io(_))));
        }
    }

    #[test]
    fn test_kind_counts() {
        let content = format!("{}\n---\n{}\n---\n{}", SERVICE, CRD_V1BETA1, SERVICE);
        let bundle = Bundle::from_documents("counts", vec![("all.yaml", content)]).unwrap();
        let counts = bundle.kind_counts();

        assert_eq!(counts.get("Service"), Some(&2));
        assert_eq!(counts.get("CustomResourceDefinition"), Some(&1));
        assert_eq!(
            counts.keys().copied().collect::<Vec<_>>(),
            vec!["CustomResourceDefinition", "Service"]
        );
    }
}
