use super::custom::CustomSymptomTable;
use super::IntakeError;
use crate::catalog;
use crate::models::{SymptomCategory, SymptomDescriptor};

/// What a toggle did to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
}

/// Ordered set of chosen symptoms, unique by key.
///
/// Iteration order is insertion order; prompt rendering depends on it.
#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    entries: Vec<SymptomDescriptor>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove `key` if selected, otherwise add it from the catalog.
    ///
    /// Callers only pass keys taken from the catalog; a miss is reported as
    /// `UnknownSymptom` and leaves the selection unchanged.
    pub fn toggle(&mut self, key: &str, category: SymptomCategory) -> Result<Toggle, IntakeError> {
        if self.remove(key) {
            return Ok(Toggle::Removed);
        }

        let entry = catalog::lookup(category, key).ok_or_else(|| IntakeError::UnknownSymptom {
            category,
            key: key.to_string(),
        })?;
        self.entries.push(entry.to_descriptor(category));
        Ok(Toggle::Added)
    }

    /// Toggle a previously built custom symptom, re-adding it from `table`.
    pub fn toggle_custom(
        &mut self,
        key: &str,
        table: &CustomSymptomTable,
    ) -> Result<Toggle, IntakeError> {
        if self.remove(key) {
            return Ok(Toggle::Removed);
        }

        let symptom = table.get(key).ok_or_else(|| IntakeError::UnknownSymptom {
            category: SymptomCategory::Custom,
            key: key.to_string(),
        })?;
        self.entries.push(symptom.clone());
        Ok(Toggle::Added)
    }

    /// Append a freshly built custom symptom. A colliding key is ignored.
    pub fn add_custom(&mut self, descriptor: SymptomDescriptor) -> bool {
        if self.contains(&descriptor.key) {
            tracing::warn!(key = %descriptor.key, "Ignoring custom symptom with duplicate key");
            return false;
        }
        self.entries.push(descriptor);
        true
    }

    /// Remove by key. Returns whether anything was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|s| s.key != key);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|s| s.key == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymptomDescriptor> {
        self.entries.iter()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|s| s.key.as_str()).collect()
    }

    pub fn as_slice(&self) -> &[SymptomDescriptor] {
        &self.entries
    }
}
