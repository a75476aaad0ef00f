//! SO(5)⊃SO(3) Clebsch–Gordan coefficients read from a directory tree.
//!
//! Coefficients are grouped into one file per `(v1, v2, α2, L2, v3)`:
//!
//! ```text
//! <root>/v2=<v2>/SO5CG_<v1>_<v2>-<α2>-<L2>_<v3>[.gz|.xz]
//! ```
//!
//! Each nonblank line holds `<value> <α1> <L1> <α3> <L3>`.
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use fnv::FnvHashMap;
use super::error::{Error, Result};
use super::guards::{require_nonnegint, require_posint};
use super::io::{find_compressed, open_compressed};
use super::spherical::so5_mult;
use super::utils::triangle;

/// Key of an SO(5)⊃SO(3) coefficient
/// `(v1 α1 L1; v2 α2 L2 ‖ v3 α3 L3)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct So5CgKey {
    pub v1: i32,
    pub a1: i32,
    pub l1: i32,
    pub v2: i32,
    pub a2: i32,
    pub l2: i32,
    pub v3: i32,
    pub a3: i32,
    pub l3: i32,
}

impl So5CgKey {
    fn validate(&self) -> Result<()> {
        let labels = [
            ("v1", "alpha1", "L1", self.v1, self.a1, self.l1),
            ("v2", "alpha2", "L2", self.v2, self.a2, self.l2),
            ("v3", "alpha3", "L3", self.v3, self.a3, self.l3),
        ];
        for &(vn, an, ln, v, a, l) in &labels {
            require_nonnegint(vn, v)?;
            require_posint(an, a)?;
            require_nonnegint(ln, l)?;
            if a > so5_mult(v, l) {
                return Err(Error::value(
                    an, format!("{} (v = {}, L = {})", a, v, l),
                    "exceeds the multiplicity of L in seniority v"));
            }
        }
        Ok(())
    }

    /// Whether the coefficient can be nonzero.
    pub fn selection_rules(&self) -> bool {
        triangle(self.l1, self.l2, self.l3)
            && triangle(self.v1, self.v2, self.v3)
            && (self.v1 + self.v2 + self.v3) % 2 == 0
    }

    fn file_key(&self) -> FileKey {
        FileKey {
            v1: self.v1,
            v2: self.v2,
            a2: self.a2,
            l2: self.l2,
            v3: self.v3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct FileKey {
    v1: i32,
    v2: i32,
    a2: i32,
    l2: i32,
    v3: i32,
}

impl FileKey {
    fn path(&self, root: &Path) -> PathBuf {
        root.join(format!("v2={}", self.v2))
            .join(format!("SO5CG_{}_{}-{}-{}_{}",
                          self.v1, self.v2, self.a2, self.l2, self.v3))
    }
}

/// Coefficients of one file, keyed by `(α1, L1, α3, L3)`.
type Table = FnvHashMap<(i32, i32, i32, i32), f64>;

fn parse_table(path: &Path) -> Result<Table> {
    let io_err = |err| Error::Io { path: path.to_owned(), err };
    let reader = open_compressed(path).map_err(io_err)?;
    let mut table = Table::default();
    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(io_err)?;
        if line.trim().is_empty() {
            continue;
        }
        let parse_err = |msg: String| Error::Parse {
            path: path.to_owned(),
            line: i + 1,
            msg,
        };
        let caps = re!(r"^\s*(\S+)\s+(\d+)\s+(\d+)\s+(\d+)\s+(\d+)\s*$")
            .captures(&line)
            .ok_or_else(|| parse_err(format!("expected 5 fields: {:?}",
                                             line)))?;
        let value: f64 = caps[1].parse()
            .map_err(|e| parse_err(format!("{}: {:?}", e, &caps[1])))?;
        let mut labels = [0i32; 4];
        for (k, label) in labels.iter_mut().enumerate() {
            *label = caps[k + 2].parse()
                .map_err(|e| parse_err(format!("{}: {:?}", e, &caps[k + 2])))?;
        }
        table.insert((labels[0], labels[1], labels[2], labels[3]), value);
    }
    Ok(table)
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Lazily loaded, append-only cache of coefficient files under `root`.
#[derive(Debug)]
pub struct So5CgStore {
    root: PathBuf,
    tables: Mutex<FnvHashMap<FileKey, Arc<Table>>>,
}

impl So5CgStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            tables: Default::default(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of files looked up so far (including absent ones).
    pub fn loaded_files(&self) -> usize {
        lock(&self.tables).len()
    }

    /// Look up a coefficient.  Keys that violate the selection rules are
    /// zero without touching the disk, as are keys absent from the store.
    pub fn get(&self, key: &So5CgKey) -> Result<f64> {
        key.validate()?;
        if !key.selection_rules() {
            return Ok(0.0);
        }
        let table = self.table(key.file_key())?;
        Ok(table.get(&(key.a1, key.l1, key.a3, key.l3))
           .cloned()
           .unwrap_or(0.0))
    }

    fn table(&self, fk: FileKey) -> Result<Arc<Table>> {
        let mut tables = lock(&self.tables);
        if let Some(t) = tables.get(&fk) {
            return Ok(t.clone());
        }
        let path = fk.path(&self.root);
        let table = match find_compressed(&path) {
            Some(found) => {
                let t = parse_table(&found)?;
                debug!("loaded {} SO(5) CG coefficients from {}",
                       t.len(), found.display());
                t
            }
            None => {
                debug!("no SO(5) CG file at {}", path.display());
                Table::default()
            }
        };
        let table = Arc::new(table);
        tables.insert(fk, table.clone());
        Ok(table)
    }
}

lazy_static! {
    static ref STORES: Mutex<FnvHashMap<PathBuf, Arc<So5CgStore>>> =
        Default::default();
}

/// Process-wide store for the given root directory.
pub fn shared<P: AsRef<Path>>(root: P) -> Arc<So5CgStore> {
    let root = root.as_ref();
    lock(&STORES)
        .entry(root.to_owned())
        .or_insert_with(|| Arc::new(So5CgStore::new(root)))
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::error::ErrorKind;

    fn key(v1: i32, a1: i32, l1: i32, v2: i32, a2: i32, l2: i32,
           v3: i32, a3: i32, l3: i32) -> So5CgKey {
        So5CgKey { v1, a1, l1, v2, a2, l2, v3, a3, l3 }
    }

    #[test]
    fn test_path_layout() {
        let fk = key(3, 1, 0, 3, 1, 0, 0, 1, 0).file_key();
        assert_eq!(fk.path(Path::new("root")),
                   Path::new("root/v2=3/SO5CG_3_3-1-0_0"));
    }

    #[test]
    fn test_selection_rules_skip_disk() {
        let store = So5CgStore::new("no/such/dir");
        // L triangle fails
        assert_eq!(store.get(&key(3, 1, 6, 1, 1, 2, 2, 1, 2)).unwrap(), 0.0);
        // odd v sum
        assert_eq!(store.get(&key(1, 1, 2, 1, 1, 2, 1, 1, 2)).unwrap(), 0.0);
        assert_eq!(store.loaded_files(), 0);
        // allowed but absent
        assert_eq!(store.get(&key(1, 1, 2, 1, 1, 2, 2, 1, 2)).unwrap(), 0.0);
        assert_eq!(store.loaded_files(), 1);
    }

    #[test]
    fn test_validation() {
        let store = So5CgStore::new("no/such/dir");
        let kind = |k: So5CgKey| store.get(&k).unwrap_err().kind();
        assert_eq!(kind(key(-1, 1, 0, 1, 1, 2, 1, 1, 2)), ErrorKind::Value);
        assert_eq!(kind(key(0, 0, 0, 1, 1, 2, 1, 1, 2)), ErrorKind::Value);
        // L = 1 does not occur in v = 1
        assert_eq!(kind(key(1, 1, 1, 1, 1, 2, 0, 1, 0)), ErrorKind::Value);
        // v = 3, L = 0 occurs once
        assert_eq!(kind(key(3, 2, 0, 1, 1, 2, 2, 1, 2)), ErrorKind::Value);
    }

    #[test]
    fn test_shared() {
        let a = shared("data/so5cg-test");
        let b = shared("data/so5cg-test");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &shared("data/so5cg-gz")));
    }
}
