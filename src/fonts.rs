//! Font database shared by renderers.

use std::fmt;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use resvg::usvg::fontdb::{Database, Family, Query};
use tracing::{debug, warn};

use crate::error::{CoverError, Result};

static SYSTEM_FONTS: OnceLock<FontLibrary> = OnceLock::new();

/// A cheaply clonable, read-only font database.
///
/// Cloning shares the underlying database; adding fonts to a clone copies it
/// first, so libraries handed to other renderers are never mutated.
#[derive(Clone)]
pub struct FontLibrary {
    db: Arc<Database>,
}

impl FontLibrary {
    /// A library with no fonts. Text measures approximately and draws nothing.
    pub fn empty() -> Self {
        Self {
            db: Arc::new(Database::new()),
        }
    }

    /// The system fonts, loaded once per process.
    pub fn system() -> Self {
        SYSTEM_FONTS
            .get_or_init(|| {
                let mut db = Database::new();
                db.load_system_fonts();
                if db.len() == 0 {
                    warn!("no system fonts found; cover text will not be drawn");
                } else {
                    debug!(faces = db.len(), "loaded system fonts");
                }
                let mut library = Self { db: Arc::new(db) };
                library.ensure_generic_families();
                library
            })
            .clone()
    }

    /// Wraps an existing font database.
    pub fn from_database(db: Database) -> Self {
        let mut library = Self { db: Arc::new(db) };
        library.ensure_generic_families();
        library
    }

    /// Adds a font from raw TrueType/OpenType data.
    pub fn with_font_data(mut self, data: Vec<u8>) -> Self {
        Arc::make_mut(&mut self.db).load_font_data(data);
        self.ensure_generic_families();
        self
    }

    /// Adds a font from a file.
    pub fn with_font_file(self, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| CoverError::Font {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded font file");
        Ok(self.with_font_data(data))
    }

    /// Number of font faces available.
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// Returns true if no faces are loaded.
    pub fn is_empty(&self) -> bool {
        self.face_count() == 0
    }

    /// Returns the shared database.
    pub fn database(&self) -> Arc<Database> {
        Arc::clone(&self.db)
    }

    /// Points the generic `serif` and `sans-serif` families at an installed
    /// face when the configured defaults are missing.
    fn ensure_generic_families(&mut self) {
        let fallback = match self.db.faces().next() {
            Some(face) => match face.families.first() {
                Some((name, _)) => name.clone(),
                None => return,
            },
            None => return,
        };

        for serif in [true, false] {
            let families = [if serif { Family::Serif } else { Family::SansSerif }];
            let query = Query {
                families: &families,
                ..Query::default()
            };
            if self.db.query(&query).is_some() {
                continue;
            }
            let db = Arc::make_mut(&mut self.db);
            if serif {
                db.set_serif_family(fallback.clone());
            } else {
                db.set_sans_serif_family(fallback.clone());
            }
            debug!(family = %fallback, serif, "using fallback font for generic family");
        }
    }
}

impl Default for FontLibrary {
    fn default() -> Self {
        Self::system()
    }
}

impl fmt::Debug for FontLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontLibrary")
            .field("faces", &self.face_count())
            .finish()
    }
}
