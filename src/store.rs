use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// The sheets of the workspace. Each one is an independent append-only table
/// of JSON rows with no cross-sheet integrity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sheet {
    Videos,
    Interactions,
    Responses,
    Users,
    Classes,
    Enrollments,
    Assignments,
}

impl Sheet {
    pub fn name(self) -> &'static str {
        match self {
            Sheet::Videos => "Videos",
            Sheet::Interactions => "Interactions",
            Sheet::Responses => "Responses",
            Sheet::Users => "Users",
            Sheet::Classes => "Classes",
            Sheet::Enrollments => "Enrollments",
            Sheet::Assignments => "Assignments",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend failed: {0}")]
    Backend(#[from] rusqlite::Error),
    #[error("stored row is not usable JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Spreadsheet-shaped row store. Rows keep insertion order within a sheet;
/// `retain` exists only for the replace mode of interaction saves.
pub trait SheetStore {
    fn append(&mut self, sheet: Sheet, row: Value) -> Result<(), StoreError>;

    fn scan(&self, sheet: Sheet) -> Result<Vec<Value>, StoreError>;

    /// Drops every row for which `keep` returns false; returns how many were
    /// dropped.
    fn retain(
        &mut self,
        sheet: Sheet,
        keep: &mut dyn FnMut(&Value) -> bool,
    ) -> Result<usize, StoreError>;

    fn find_by(
        &self,
        sheet: Sheet,
        pred: &mut dyn FnMut(&Value) -> bool,
    ) -> Result<Option<Value>, StoreError> {
        Ok(self.scan(sheet)?.into_iter().find(|row| pred(row)))
    }
}

pub fn append_row<T: Serialize>(
    store: &mut dyn SheetStore,
    sheet: Sheet,
    row: &T,
) -> Result<(), StoreError> {
    store.append(sheet, serde_json::to_value(row)?)
}

pub fn scan_as<T: DeserializeOwned>(
    store: &dyn SheetStore,
    sheet: Sheet,
) -> Result<Vec<T>, StoreError> {
    store
        .scan(sheet)?
        .into_iter()
        .map(|row| serde_json::from_value(row).map_err(StoreError::from))
        .collect()
}

/// In-memory backend for ephemeral workspaces and tests.
#[derive(Debug, Default)]
pub struct MemStore {
    sheets: HashMap<Sheet, Vec<Value>>,
}

impl SheetStore for MemStore {
    fn append(&mut self, sheet: Sheet, row: Value) -> Result<(), StoreError> {
        self.sheets.entry(sheet).or_default().push(row);
        Ok(())
    }

    fn scan(&self, sheet: Sheet) -> Result<Vec<Value>, StoreError> {
        Ok(self.sheets.get(&sheet).cloned().unwrap_or_default())
    }

    fn retain(
        &mut self,
        sheet: Sheet,
        keep: &mut dyn FnMut(&Value) -> bool,
    ) -> Result<usize, StoreError> {
        let rows = self.sheets.entry(sheet).or_default();
        let before = rows.len();
        rows.retain(|row| keep(row));
        Ok(before - rows.len())
    }
}
