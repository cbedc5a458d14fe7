//! Category catalog.
//!
//! A static list of trivia category names plus, per category, a pool of
//! prompt images. Catalogs are built once per process and shared read-only
//! by every board.

mod images;

pub use images::ImageRotation;

use rustc_hash::FxHashMap;

use crate::core::GameRng;

/// Categories used when no image folders are discovered.
pub const FALLBACK_CATEGORIES: [&str; 10] = [
    "Technology",
    "HBCU Mascots",
    "Black Movies",
    "Black Athletes",
    "Musical Instruments",
    "Black History",
    "Famous Divine 9",
    "African Geography",
    "Thanksgiving",
    "Black Music Artists",
];

/// Directory segment that precedes the category folder in image paths.
pub const IMAGE_ROOT: &str = "categoryImages";

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "webp", "avif"];

/// Category names and their image pools.
///
/// ## Example
///
/// ```
/// use tile_duel::catalog::CategoryCatalog;
///
/// let catalog = CategoryCatalog::from_image_paths([
///     "assets/categoryImages/Planets/mars.png",
///     "assets/categoryImages/Planets/venus.jpg",
///     "assets/categoryImages/Rivers/nile.webp",
/// ]);
/// assert_eq!(catalog.names(), &["Planets".to_string(), "Rivers".to_string()]);
/// assert_eq!(catalog.images("Planets").len(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct CategoryCatalog {
    names: Vec<String>,
    images: FxHashMap<String, Vec<String>>,
}

impl Default for CategoryCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CategoryCatalog {
    /// The built-in categories, without images.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(FALLBACK_CATEGORIES)
    }

    /// A catalog with the given names and empty image pools.
    ///
    /// Duplicate names are dropped. An empty list yields the built-in set.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut catalog = Self { names: Vec::new(), images: FxHashMap::default() };
        for name in names {
            catalog.add_category(name.into());
        }
        if catalog.names.is_empty() {
            return Self::builtin();
        }
        catalog
    }

    /// Build a catalog from image paths of the form
    /// `.../categoryImages/<Category>/<file>.<ext>`.
    ///
    /// Categories keep the order in which they are first seen. Paths outside
    /// the image root or with other extensions are ignored. If nothing is
    /// discovered, the built-in categories are used.
    pub fn from_image_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut catalog = Self { names: Vec::new(), images: FxHashMap::default() };

        for path in paths {
            let path = path.as_ref();
            let Some((category, file)) = split_image_path(path) else {
                continue;
            };
            catalog.add_category(category.to_string());
            if let Some(pool) = catalog.images.get_mut(category) {
                if !file.is_empty() {
                    pool.push(path.to_string());
                }
            }
        }

        if catalog.names.is_empty() {
            return Self::builtin();
        }
        catalog
    }

    fn add_category(&mut self, name: String) {
        if !self.images.contains_key(&name) {
            self.images.insert(name.clone(), Vec::new());
            self.names.push(name);
        }
    }

    /// All category names in catalog order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of categories. Never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Check whether a category exists.
    #[must_use]
    pub fn contains(&self, category: &str) -> bool {
        self.images.contains_key(category)
    }

    /// Image pool for a category (empty for unknown categories).
    #[must_use]
    pub fn images(&self, category: &str) -> &[String] {
        self.images.get(category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The names in a random order, used to deal home categories.
    pub fn shuffled(&self, rng: &mut GameRng) -> Vec<String> {
        let mut names = self.names.clone();
        rng.shuffle(&mut names);
        names
    }

    /// Draw a category uniformly from the catalog minus `exclude`.
    ///
    /// When every category is excluded the draw falls back to the full
    /// catalog so a round can always be played.
    pub fn pick_excluding(&self, rng: &mut GameRng, exclude: &[String]) -> String {
        let pool: Vec<&String> = self.names.iter().filter(|n| !exclude.contains(n)).collect();
        if let Some(pick) = rng.choose(&pool) {
            return (*pick).clone();
        }
        rng.choose(&self.names)
            .cloned()
            .unwrap_or_else(|| FALLBACK_CATEGORIES[0].to_string())
    }
}

/// Split a path into (category, file name) if it sits under the image root
/// and has a known image extension.
fn split_image_path(path: &str) -> Option<(&str, &str)> {
    let parts: Vec<&str> = path.split('/').collect();
    let root = parts.iter().position(|p| *p == IMAGE_ROOT)?;
    let category = *parts.get(root + 1)?;
    let file = *parts.last()?;
    if category.is_empty() || parts.len() < root + 3 {
        return None;
    }
    let extension = file.rsplit_once('.')?.1.to_ascii_lowercase();
    IMAGE_EXTENSIONS
        .contains(&extension.as_str())
        .then_some((category, file))
}
