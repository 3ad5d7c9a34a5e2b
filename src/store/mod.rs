pub mod sqlite;

use crate::app::Result;

pub use sqlite::SqlitePreferenceStore;

/// Key under which the selected news-site filter is stored.
pub const SELECTED_PREFERENCE_KEY: &str = "selected_preference";

/// Local key/value persistence.
///
/// Missing keys read as `""`, `false` and `-1` respectively.
pub trait PreferenceStore {
    fn get_string(&self, key: &str) -> Result<String>;
    fn set_string(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;

    fn get_bool(&self, key: &str) -> Result<bool>;
    fn set_bool(&self, key: &str, value: bool) -> Result<()>;

    fn get_int(&self, key: &str) -> Result<i64>;
    fn set_int(&self, key: &str, value: i64) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

/// Typed access to the values the app keeps between runs.
pub struct Preferences<'a, S: PreferenceStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: PreferenceStore + ?Sized> Preferences<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// The selected news site, or `""` when no filter is set.
    pub fn selected(&self) -> Result<String> {
        self.store.get_string(SELECTED_PREFERENCE_KEY)
    }

    pub fn set_selected(&self, site: &str) -> Result<()> {
        self.store.set_string(SELECTED_PREFERENCE_KEY, site)
    }

    pub fn clear_all(&self) -> Result<()> {
        self.store.clear()
    }
}
