use std::path::Path;

use rusqlite::Connection;
use serde_json::Value;

use crate::store::{Sheet, SheetStore, StoreError};

/// Workspace-file backend. The whole workspace is one generic `rows` table
/// (sheet name + JSON body) appended in arrival order, mirroring the
/// spreadsheet it stands in for.
pub struct SqliteStore {
    conn: Connection,
}

pub fn open_store(workspace: &Path) -> anyhow::Result<SqliteStore> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join("lessons.sqlite3");
    let conn = Connection::open(db_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS rows(
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            sheet TEXT NOT NULL,
            body TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_rows_sheet ON rows(sheet, seq)",
        [],
    )?;

    Ok(SqliteStore { conn })
}

impl SheetStore for SqliteStore {
    fn append(&mut self, sheet: Sheet, row: Value) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO rows(sheet, body) VALUES(?, ?)",
            (sheet.name(), row.to_string()),
        )?;
        Ok(())
    }

    fn scan(&self, sheet: Sheet) -> Result<Vec<Value>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT body FROM rows WHERE sheet = ? ORDER BY seq")?;
        let bodies = stmt
            .query_map([sheet.name()], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        bodies
            .iter()
            .map(|body| serde_json::from_str(body).map_err(StoreError::from))
            .collect()
    }

    fn retain(
        &mut self,
        sheet: Sheet,
        keep: &mut dyn FnMut(&Value) -> bool,
    ) -> Result<usize, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT seq, body FROM rows WHERE sheet = ? ORDER BY seq")?;
        let rows = stmt
            .query_map([sheet.name()], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);

        let mut doomed = Vec::new();
        for (seq, body) in rows {
            let value: Value = serde_json::from_str(&body)?;
            if !keep(&value) {
                doomed.push(seq);
            }
        }
        for seq in &doomed {
            self.conn.execute("DELETE FROM rows WHERE seq = ?", [seq])?;
        }
        Ok(doomed.len())
    }
}
