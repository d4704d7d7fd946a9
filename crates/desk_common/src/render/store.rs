//! Resource area for persisted artifacts.
//!
//! Layout: `<root>/<section>/<artifact>.svg`. Files written are listed in
//! `<root>/.desk-artifacts` and removed at the start of the next run; nothing
//! else under the root is touched. Concurrent runs need distinct roots.

use super::scene::Scene;
use super::svg::to_svg;
use crate::error::{DeskError, Result};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// A rendered image waiting to be composed
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub section: String,
    pub name: String,
    pub scene: Scene,
    pub path: PathBuf,
}

/// One block of the output document
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactSection {
    /// Directory name under the resource root
    pub name: String,
    /// Heading printed on the section's pages
    pub title: String,
    /// Placed together on the first page
    pub charts: Vec<Artifact>,
    /// One page each
    pub tables: Vec<Artifact>,
}

impl ArtifactSection {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            charts: Vec::new(),
            tables: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty() && self.tables.is_empty()
    }

    pub fn artifact_names(&self) -> Vec<&str> {
        self.charts
            .iter()
            .chain(self.tables.iter())
            .map(|a| a.name.as_str())
            .collect()
    }
}

/// Directory-safe form of a section label
pub fn section_dir(label: &str) -> String {
    label
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Manifest of files written by the store, relative to the root
pub const MANIFEST: &str = ".desk-artifacts";

pub struct ArtifactStore {
    root: PathBuf,
    /// Section label -> directory name, unique per run
    sections: RefCell<BTreeMap<String, String>>,
}

impl ArtifactStore {
    /// Open the resource area and remove the artifacts a previous run recorded
    ///
    /// Only files listed in the manifest are deleted; anything else under
    /// `root` is left alone.
    pub fn prepare(root: &Path) -> Result<Self> {
        fs::create_dir_all(root).map_err(|e| DeskError::write(root, e))?;
        let manifest = root.join(MANIFEST);

        let mut removed = 0;
        if manifest.exists() {
            let listed = fs::read_to_string(&manifest).map_err(|e| DeskError::read(&manifest, e))?;
            for rel in listed.lines().map(str::trim).filter(|l| !l.is_empty()) {
                let rel = Path::new(rel);
                if !rel.components().all(|c| matches!(c, Component::Normal(_))) {
                    continue;
                }
                let path = root.join(rel);
                match fs::remove_file(&path) {
                    Ok(()) => removed += 1,
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => return Err(DeskError::write(&path, e)),
                }
                if let Some(parent) = path.parent().filter(|p| *p != root) {
                    // fails while the directory still holds other files
                    let _ = fs::remove_dir(parent);
                }
            }
        }
        fs::write(&manifest, "").map_err(|e| DeskError::write(&manifest, e))?;
        debug!("Removed {} artifacts of the previous run under {}", removed, root.display());

        Ok(Self {
            root: root.to_path_buf(),
            sections: RefCell::new(BTreeMap::new()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for a section label; labels that sanitize alike get a numeric suffix
    pub fn section_dir_for(&self, label: &str) -> String {
        let mut sections = self.sections.borrow_mut();
        if let Some(dir) = sections.get(label) {
            return dir.clone();
        }
        let base = section_dir(label);
        let mut candidate = base.clone();
        let mut n = 2;
        while sections.values().any(|d| *d == candidate) {
            candidate = format!("{}_{}", base, n);
            n += 1;
        }
        sections.insert(label.to_string(), candidate.clone());
        candidate
    }

    /// Write a scene as SVG under its section and hand it back as an artifact
    pub fn persist(&self, section: &str, name: &str, scene: Scene) -> Result<Artifact> {
        let dir_name = self.section_dir_for(section);
        let dir = self.root.join(&dir_name);
        fs::create_dir_all(&dir).map_err(|e| DeskError::write(&dir, e))?;
        let file_name = format!("{}.svg", name);
        let path = dir.join(&file_name);
        fs::write(&path, to_svg(&scene)).map_err(|e| DeskError::write(&path, e))?;
        self.record(&format!("{}/{}", dir_name, file_name))?;
        debug!("The graph {} has been saved as {}", name, path.display());
        Ok(Artifact {
            section: section.to_string(),
            name: name.to_string(),
            scene,
            path,
        })
    }

    fn record(&self, rel: &str) -> Result<()> {
        let manifest = self.root.join(MANIFEST);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&manifest)
            .map_err(|e| DeskError::write(&manifest, e))?;
        writeln!(file, "{}", rel).map_err(|e| DeskError::write(&manifest, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_clears_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("resources");

        let first = ArtifactStore::prepare(&root).unwrap();
        first.persist("High", "statusPie", Scene::new(10.0, 10.0)).unwrap();
        first.persist("High", "typesPie", Scene::new(10.0, 10.0)).unwrap();
        assert!(root.join("High").join("typesPie.svg").exists());

        let store = ArtifactStore::prepare(&root).unwrap();
        assert!(!root.join("High").exists());

        let artifact = store.persist("High", "statusPie", Scene::new(10.0, 10.0)).unwrap();
        assert_eq!(artifact.path, root.join("High").join("statusPie.svg"));
        assert!(fs::read_to_string(&artifact.path).unwrap().starts_with("<svg"));
    }

    #[test]
    fn test_prepare_leaves_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("export.csv"), "issue key\nACME-1\n").unwrap();
        fs::create_dir_all(root.join("notes")).unwrap();
        fs::write(root.join("notes").join("todo.txt"), "x").unwrap();
        fs::write(root.join("notes").join("sketch.svg"), "<svg/>").unwrap();

        let store = ArtifactStore::prepare(root).unwrap();
        store.persist("notes", "statusPie", Scene::new(10.0, 10.0)).unwrap();
        ArtifactStore::prepare(root).unwrap();

        assert!(root.join("export.csv").exists());
        assert!(root.join("notes").join("todo.txt").exists());
        assert!(root.join("notes").join("sketch.svg").exists());
        assert!(!root.join("notes").join("statusPie.svg").exists());
    }

    #[test]
    fn test_manifest_ignores_paths_outside_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("resources");
        fs::create_dir_all(&root).unwrap();
        fs::write(dir.path().join("keep.txt"), "x").unwrap();
        fs::write(root.join(MANIFEST), "../keep.txt\n").unwrap();

        ArtifactStore::prepare(&root).unwrap();
        assert!(dir.path().join("keep.txt").exists());
    }

    #[test]
    fn test_colliding_labels_get_distinct_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::prepare(dir.path()).unwrap();
        let a = store.persist("P1 / Critical", "statusPie", Scene::new(10.0, 10.0)).unwrap();
        let b = store.persist("P1_/_Critical", "statusPie", Scene::new(10.0, 10.0)).unwrap();
        assert_ne!(a.path, b.path);
        assert!(a.path.exists() && b.path.exists());
        assert_eq!(store.section_dir_for("P1_/_Critical"), "P1___Critical_2");
        assert_eq!(store.section_dir_for("P1 / Critical"), "P1___Critical");
    }

    #[test]
    fn test_section_dir_sanitizes() {
        assert_eq!(section_dir("P1 / Critical"), "P1___Critical");
        assert_eq!(section_dir("general"), "general");
    }
}
