//! Collector: list descriptor files, fetch them in parallel, sort them into
//! the class and enum buckets of a [`Docs`].

pub mod github;
pub mod local;

use crate::model::{Class, Docs, EnumValue};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Extension of descriptor files.
const DESCRIPTOR_EXTENSION: &str = ".json";

/// Paths starting with this marker are never read.
const EXCLUDE_PREFIX: &str = "_";

/// The single file holding every enum.
const ENUMS_PATH: &str = "Enums.json";

const CLASSES_PREFIX: &str = "Classes";
const STATIC_CLASSES_PREFIX: &str = "StaticClasses";
const STRUCTS_PREFIX: &str = "Structs";

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("failed to list repository tree: {0}")]
    Listing(String),

    #[error("failed to fetch {path}: {message}")]
    Fetch { path: String, message: String },

    #[error("failed to decode {path}: {message}")]
    Decode { path: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Blob,
    Tree,
}

/// One entry of a recursive repository listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: String,
    pub kind: EntryKind,
}

impl TreeEntry {
    pub fn blob(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Blob,
        }
    }
}

/// Somewhere descriptor files can be listed and read from.
pub trait Source: Sync {
    /// Every entry below the root, recursively.
    fn list(&self) -> Result<Vec<TreeEntry>, CollectError>;

    /// Decoded text of the file at `path`, or `None` when the source has no
    /// content for it.
    fn fetch(&self, path: &str) -> Result<Option<String>, CollectError>;
}

/// Where a descriptor file ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Enums,
    Class { static_class: bool },
}

/// Decide what a path holds, or `None` when it is not a descriptor we read.
pub fn route(path: &str) -> Option<Route> {
    if !path.ends_with(DESCRIPTOR_EXTENSION) || path.starts_with(EXCLUDE_PREFIX) {
        return None;
    }
    if path == ENUMS_PATH {
        return Some(Route::Enums);
    }
    if path.starts_with(STATIC_CLASSES_PREFIX) {
        Some(Route::Class { static_class: true })
    } else if path.starts_with(CLASSES_PREFIX) || path.starts_with(STRUCTS_PREFIX) {
        Some(Route::Class {
            static_class: false,
        })
    } else {
        None
    }
}

/// A decoded descriptor file.
#[derive(Debug)]
enum Descriptor {
    Enums(Vec<(String, Vec<EnumValue>)>),
    Class(Class),
}

/// List, fetch and decode every descriptor reachable from `source`.
///
/// Fetches run in parallel; the first failure aborts the whole collection.
/// Results are applied in listing order, so a later file declaring the same
/// class name replaces an earlier one.
pub fn collect(source: &dyn Source) -> Result<Docs, CollectError> {
    let targets: Vec<(String, Route)> = source
        .list()?
        .into_iter()
        .filter(|entry| entry.kind == EntryKind::Blob)
        .filter_map(|entry| {
            let route = route(&entry.path)?;
            Some((entry.path, route))
        })
        .collect();

    debug!(count = targets.len(), "descriptor files selected");

    let descriptors = targets
        .par_iter()
        .map(|(path, route)| {
            info!("Processing {}...", path);
            match source.fetch(path)? {
                Some(text) => decode(path, *route, &text).map(|d| Some((path.as_str(), d))),
                None => {
                    debug!(path = %path, "no content, skipping");
                    Ok(None)
                }
            }
        })
        .collect::<Result<Vec<_>, CollectError>>()?;

    let mut docs = Docs::default();
    for (path, descriptor) in descriptors.into_iter().flatten() {
        match descriptor {
            Descriptor::Enums(enums) => {
                if !docs.enums.is_empty() {
                    warn!(path, "enum descriptor read more than once, replacing");
                }
                docs.enums = enums;
            }
            Descriptor::Class(class) => {
                let name = class.name.clone();
                if docs.insert_class(class) {
                    warn!(path, class = %name, "duplicate class name, later descriptor wins");
                }
            }
        }
    }

    Ok(docs)
}

fn decode(path: &str, route: Route, text: &str) -> Result<Descriptor, CollectError> {
    let decode_err = |e: serde_json::Error| CollectError::Decode {
        path: path.to_string(),
        message: e.to_string(),
    };

    match route {
        Route::Enums => {
            // preserve_order keeps the enums in declaration order
            let raw: serde_json::Map<String, serde_json::Value> =
                serde_json::from_str(text).map_err(decode_err)?;
            let enums = raw
                .into_iter()
                .map(|(name, values)| {
                    serde_json::from_value::<Vec<EnumValue>>(values).map(|v| (name, v))
                })
                .collect::<Result<Vec<_>, _>>()
                .map_err(decode_err)?;
            Ok(Descriptor::Enums(enums))
        }
        Route::Class { static_class } => {
            let mut class: Class = serde_json::from_str(text).map_err(decode_err)?;
            class.static_class = static_class;
            Ok(Descriptor::Class(class))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    /// In-memory source; a `None` value makes the fetch fail.
    struct MemorySource {
        entries: Vec<TreeEntry>,
        files: HashMap<String, Option<String>>,
        /// Listed paths the source has no content for.
        empty: HashSet<String>,
    }

    impl MemorySource {
        fn new(files: &[(&str, Option<&str>)]) -> Self {
            Self {
                entries: files.iter().map(|(p, _)| TreeEntry::blob(*p)).collect(),
                files: files
                    .iter()
                    .map(|(p, c)| (p.to_string(), c.map(str::to_string)))
                    .collect(),
                empty: HashSet::new(),
            }
        }

        fn with_empty(mut self, path: &str) -> Self {
            self.entries.push(TreeEntry::blob(path));
            self.empty.insert(path.to_string());
            self
        }
    }

    impl Source for MemorySource {
        fn list(&self) -> Result<Vec<TreeEntry>, CollectError> {
            Ok(self.entries.clone())
        }

        fn fetch(&self, path: &str) -> Result<Option<String>, CollectError> {
            if self.empty.contains(path) {
                return Ok(None);
            }
            match self.files.get(path) {
                Some(Some(text)) => Ok(Some(text.clone())),
                _ => Err(CollectError::Fetch {
                    path: path.to_string(),
                    message: "404 Not Found".to_string(),
                }),
            }
        }
    }

    #[test]
    fn route_table() {
        assert_eq!(route("Enums.json"), Some(Route::Enums));
        assert_eq!(
            route("Classes/Character.json"),
            Some(Route::Class { static_class: false })
        );
        assert_eq!(
            route("StaticClasses/Server.json"),
            Some(Route::Class { static_class: true })
        );
        assert_eq!(
            route("Structs/Vector.json"),
            Some(Route::Class { static_class: false })
        );
        assert_eq!(route("_Template/Class.json"), None);
        assert_eq!(route("_Enums.json"), None);
        assert_eq!(route("package.json"), None);
        assert_eq!(route("Classes/README.md"), None);
        assert_eq!(route("Other/Enums.json"), None);
    }

    #[test]
    fn collects_classes_and_enums() {
        let source = MemorySource::new(&[
            ("Classes/Prop.json", Some(r#"{"name": "Prop"}"#)),
            ("StaticClasses/Server.json", Some(r#"{"name": "Server"}"#)),
            ("Structs/Vector.json", Some(r#"{"name": "Vector", "authority": "client"}"#)),
            (
                "Enums.json",
                Some(r#"{"Color": [{"key": "Red", "value": 0}], "Axis": []}"#),
            ),
        ]);

        let docs = collect(&source).unwrap();

        let names: Vec<_> = docs.classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Prop", "Server", "Vector"]);
        assert!(!docs.class("Prop").unwrap().static_class);
        assert!(docs.class("Server").unwrap().static_class);
        assert_eq!(
            docs.class("Vector").unwrap().authority,
            crate::model::Authority::ClientOnly
        );

        let enum_names: Vec<_> = docs.enums.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(enum_names, ["Color", "Axis"]);
        assert_eq!(docs.enums[0].1[0].key, "Red");
    }

    #[test]
    fn excluded_and_unrouted_files_are_not_fetched() {
        // `None` content would fail the fetch if it were attempted
        let source = MemorySource::new(&[
            ("_Template/Class.json", None),
            ("package.json", None),
            ("Classes/Prop.json", Some(r#"{"name": "Prop"}"#)),
        ]);

        let docs = collect(&source).unwrap();
        assert_eq!(docs.classes.len(), 1);
    }

    #[test]
    fn tree_entries_are_skipped() {
        let source = MemorySource {
            entries: vec![TreeEntry {
                path: "Classes.json".to_string(),
                kind: EntryKind::Tree,
            }],
            files: HashMap::new(),
            empty: HashSet::new(),
        };
        let docs = collect(&source).unwrap();
        assert!(docs.classes.is_empty());
    }

    #[test]
    fn files_without_content_are_skipped() {
        let source = MemorySource::new(&[
            ("Classes/A.json", Some(r#"{"name": "A"}"#)),
            ("Enums.json", Some(r#"{"Color": []}"#)),
        ])
        .with_empty("Classes/Empty.json")
        .with_empty("Structs/Empty.json");

        let docs = collect(&source).unwrap();

        let names: Vec<_> = docs.classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["A"]);
        assert_eq!(docs.enums.len(), 1);
    }

    #[test]
    fn fetch_failure_aborts() {
        let source = MemorySource::new(&[
            ("Classes/Prop.json", Some(r#"{"name": "Prop"}"#)),
            ("Classes/Broken.json", None),
        ]);
        let err = collect(&source).unwrap_err();
        assert!(matches!(err, CollectError::Fetch { ref path, .. } if path == "Classes/Broken.json"));
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let source = MemorySource::new(&[("Classes/Prop.json", Some("{ not json"))]);
        let err = collect(&source).unwrap_err();
        assert!(matches!(err, CollectError::Decode { .. }));
        assert!(err.to_string().contains("Classes/Prop.json"));
    }

    #[test]
    fn later_duplicate_class_wins() {
        let source = MemorySource::new(&[
            ("Classes/A.json", Some(r#"{"name": "Dup", "description": "first"}"#)),
            ("Structs/B.json", Some(r#"{"name": "Dup", "description": "second"}"#)),
        ]);
        let docs = collect(&source).unwrap();
        assert_eq!(docs.classes.len(), 1);
        assert_eq!(docs.classes[0].doc.docstring(), "second");
    }
}
