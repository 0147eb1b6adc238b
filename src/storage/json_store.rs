//! Persistence bridge.
//!
//! The whole fixture store is written as one JSON document after every
//! mutation and read back once at startup. The document maps entity names
//! to arrays of flattened rows (foreign keys as `<field>_id`, never as
//! attached objects), so it stays readable and diffable on disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::db::{resolver, Database, Row};
use crate::error::{BackofficeError, Result};
use crate::schema::LOAD_ORDER;

const BACKOFFICE_DIR: &str = ".backoffice";
const STATE_FILE: &str = "state.json";

/// On-disk layout: entity name → flattened rows.
pub type StateDump = BTreeMap<String, Vec<Row>>;

pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    /// Initialize a new backoffice project
    pub fn init(root: &Path) -> Result<Self> {
        let dir = root.join(BACKOFFICE_DIR);

        if dir.exists() {
            return Err(BackofficeError::AlreadyInitialized);
        }

        fs::create_dir_all(&dir)?;

        Ok(Self {
            path: dir.join(STATE_FILE),
        })
    }

    /// Open an existing backoffice project
    pub fn open(root: &Path) -> Result<Self> {
        let path = root.join(BACKOFFICE_DIR).join(STATE_FILE);

        if !path.parent().is_some_and(Path::exists) {
            return Err(BackofficeError::NotInitialized);
        }

        Ok(Self { path })
    }

    /// Get the backoffice directory path
    pub fn backoffice_dir(&self) -> &Path {
        // The path is always built as <dir>/state.json.
        self.path.parent().unwrap_or(Path::new(BACKOFFICE_DIR))
    }

    /// Serialize every table, flattened, into the single state document.
    pub fn save(&self, db: &Database) -> Result<()> {
        let mut dump = StateDump::new();
        for kind in LOAD_ORDER {
            let rows: Vec<Row> = db
                .all(kind)
                .iter()
                .map(|row| resolver::to_flat(kind, row))
                .collect();
            dump.insert(kind.as_str().to_string(), rows);
        }

        let bytes = serde_json::to_vec_pretty(&dump)?;
        fs::write(&self.path, bytes)?;
        Ok(())
    }

    /// Read back the state document.
    ///
    /// `None` means "no prior state": the file is missing, or it holds
    /// something that does not parse. Corruption is logged and the file
    /// removed so the caller can fall back to seeding; it never surfaces as
    /// an error.
    pub fn load(&self) -> Option<StateDump> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return None,
        };

        match serde_json::from_slice::<StateDump>(&bytes) {
            Ok(dump) => Some(dump),
            Err(err) => {
                warn!(path = %self.path.display(), %err, "discarding unreadable state file");
                let _ = fs::remove_file(&self.path);
                None
            }
        }
    }

    /// Delete the persisted state so the next startup reseeds.
    pub fn reset(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        info!("persisted state removed");
        Ok(())
    }
}

/// Replay a dump into the store in schema load order, resolving relations
/// as rows arrive. A reference whose target no longer exists is dropped by
/// the resolver rather than recreated dangling.
pub fn restore(db: &mut Database, dump: &StateDump) {
    for kind in LOAD_ORDER {
        let Some(rows) = dump.get(kind.as_str()) else {
            continue;
        };
        for flat in rows {
            resolver::insert_flat(db, kind, flat);
        }
    }
}
