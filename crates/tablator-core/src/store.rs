//! Table lookup, parsing, and caching.
//!
//! Every table lives in its own file in the data directory, named
//! `<table-name>.json`, `<table-name>.yaml` or `<table-name>.yml`. Tables are
//! loaded the first time they are referenced, validated once, and kept for
//! the lifetime of the store.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, trace};

use crate::error::{TableError, TableResult};
use crate::table::{Format, Table};

/// Loads table definitions from a data directory and caches them by name.
#[derive(Debug)]
pub struct TableStore {
    data_dir: PathBuf,
    names: Option<BTreeSet<String>>,
    cache: HashMap<String, Rc<Table>>,
}

impl TableStore {
    /// Open a store on an existing directory.
    pub fn open(dir: impl AsRef<Path>) -> TableResult<Self> {
        let mut store = Self {
            data_dir: PathBuf::new(),
            names: None,
            cache: HashMap::new(),
        };
        store.set_data_dir(dir)?;
        Ok(store)
    }

    /// Point the store at another directory.
    ///
    /// The path is canonicalized, so relative paths keep working after the
    /// process changes its working directory. Cached names and tables from
    /// the previous directory are dropped.
    pub fn set_data_dir(&mut self, dir: impl AsRef<Path>) -> TableResult<()> {
        let dir = dir.as_ref();
        trace!(dir = %dir.display(), "set_data_dir");
        let canonical = fs::canonicalize(dir)
            .ok()
            .filter(|p| p.is_dir())
            .ok_or_else(|| TableError::DirectoryNotFound(dir.to_path_buf()))?;
        debug!(dir = %canonical.display(), "using data directory");
        self.data_dir = canonical;
        self.names = None;
        self.cache.clear();
        Ok(())
    }

    /// The canonical data directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Names of all tables in the data directory.
    ///
    /// The directory is scanned once; later calls reuse the result.
    pub fn list_tables(&mut self) -> TableResult<&BTreeSet<String>> {
        let names = match self.names.take() {
            Some(names) => names,
            None => scan_names(&self.data_dir)?,
        };
        Ok(&*self.names.insert(names))
    }

    /// Whether a definition file exists for `name`.
    pub fn is_table(&mut self, name: &str) -> TableResult<bool> {
        Ok(self.list_tables()?.contains(name))
    }

    /// Whether `name` has already been loaded.
    pub fn is_cached(&self, name: &str) -> bool {
        self.cache.contains_key(name)
    }

    /// Load, validate, and cache the table called `name`.
    pub fn load(&mut self, name: &str) -> TableResult<Rc<Table>> {
        if let Some(table) = self.cache.get(name) {
            debug!(table = name, "cache hit");
            return Ok(Rc::clone(table));
        }

        let (path, format) = self
            .locate(name)
            .ok_or_else(|| TableError::TableNotFound(name.to_string()))?;
        let text = fs::read_to_string(&path).map_err(|source| TableError::Io {
            path: path.clone(),
            source,
        })?;
        let table = Rc::new(format.parse(&text, &path.display().to_string())?.into_table()?);

        debug!(table = name, path = %path.display(), "loaded");
        self.cache.insert(name.to_string(), Rc::clone(&table));
        Ok(table)
    }

    /// The display name of the table stored as `name`.
    pub fn table_title(&mut self, name: &str) -> TableResult<String> {
        Ok(self.load(name)?.name().to_string())
    }

    /// Find the definition file for `name`, trying extensions in priority order.
    fn locate(&self, name: &str) -> Option<(PathBuf, Format)> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return None;
        }
        Format::EXTENSIONS.iter().find_map(|(ext, format)| {
            let path = self.data_dir.join(format!("{name}.{ext}"));
            path.is_file().then_some((path, *format))
        })
    }
}

fn scan_names(dir: &Path) -> TableResult<BTreeSet<String>> {
    trace!(dir = %dir.display(), "scanning for tables");
    let entries = fs::read_dir(dir).map_err(|source| TableError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let names = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .and_then(Format::from_extension)
                .is_some()
        })
        .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_string))
        .collect();
    Ok(names)
}
