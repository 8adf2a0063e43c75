use chrono::Utc;
use rusqlite::params;

use super::*;

impl CrmDb {
    // =========================================================================
    // Notes
    // =========================================================================

    /// Insert a new note. A supplied owner id must reference an existing row;
    /// the exactly-one-owner rule is convention and is not enforced here.
    pub fn create_note(&self, note: NewNote) -> Result<DbNote, DbError> {
        let content = note.content.trim();
        if content.is_empty() {
            return Err(DbError::InvalidInput("note content is required".to_string()));
        }
        if let Some(contact_id) = note.contact_id {
            if !self.row_exists("contacts", contact_id)? {
                return Err(DbError::InvalidInput(format!(
                    "contact {contact_id} does not exist"
                )));
            }
        }
        if let Some(company_id) = note.company_id {
            if !self.row_exists("companies", company_id)? {
                return Err(DbError::InvalidInput(format!(
                    "company {company_id} does not exist"
                )));
            }
        }

        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO notes (contact_id, company_id, content, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![note.contact_id, note.company_id, content, now],
        )?;

        Ok(DbNote {
            id: self.conn.last_insert_rowid(),
            contact_id: note.contact_id,
            company_id: note.company_id,
            content: content.to_string(),
            created_at: now,
        })
    }

    /// Get the notes attached to a contact, most recent first.
    pub fn get_notes_by_contact(&self, contact_id: i64) -> Result<Vec<DbNote>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, contact_id, company_id, content, created_at
             FROM notes WHERE contact_id = ?1
             ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt.query_map([contact_id], Self::map_note_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Get the notes attached to a company, most recent first.
    pub fn get_notes_by_company(&self, company_id: i64) -> Result<Vec<DbNote>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, contact_id, company_id, content, created_at
             FROM notes WHERE company_id = ?1
             ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt.query_map([company_id], Self::map_note_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Delete a single note.
    pub fn delete_note(&self, id: i64) -> Result<(), DbError> {
        let rows = self.conn.execute("DELETE FROM notes WHERE id = ?1", [id])?;
        if rows == 0 {
            return Err(DbError::NotFound { entity: "note", id });
        }
        Ok(())
    }

    /// Helper: map a row to `DbNote`.
    fn map_note_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbNote> {
        Ok(DbNote {
            id: row.get(0)?,
            contact_id: row.get(1)?,
            company_id: row.get(2)?,
            content: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::test_db;
    use super::*;

    fn contact(db: &CrmDb, first: &str) -> DbContact {
        db.create_contact(NewContact {
            first_name: first.to_string(),
            last_name: "Tester".to_string(),
            ..Default::default()
        })
        .expect("contact")
    }

    #[test]
    fn test_note_lists_are_scoped_to_owner() {
        let db = test_db();

        let jane = contact(&db, "Jane");
        let john = contact(&db, "John");

        db.create_note(NewNote {
            contact_id: Some(jane.id),
            content: "Loves espresso".to_string(),
            ..Default::default()
        })
        .expect("note");

        let janes = db.get_notes_by_contact(jane.id).expect("notes");
        assert_eq!(janes.len(), 1);
        assert_eq!(janes[0].content, "Loves espresso");

        assert!(db.get_notes_by_contact(john.id).expect("notes").is_empty());
    }

    #[test]
    fn test_notes_most_recent_first() {
        let db = test_db();
        let jane = contact(&db, "Jane");

        for content in ["first", "second", "third"] {
            db.create_note(NewNote {
                contact_id: Some(jane.id),
                content: content.to_string(),
                ..Default::default()
            })
            .expect("note");
        }

        let notes = db.get_notes_by_contact(jane.id).expect("notes");
        let contents: Vec<&str> = notes.iter().map(|n| n.content.as_str()).collect();
        assert_eq!(contents, vec!["third", "second", "first"]);
    }

    #[test]
    fn test_create_rejects_blank_content() {
        let db = test_db();
        let jane = contact(&db, "Jane");

        let err = db
            .create_note(NewNote {
                contact_id: Some(jane.id),
                content: "  \n".to_string(),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidInput(_)));
    }

    #[test]
    fn test_create_rejects_dangling_owner() {
        let db = test_db();

        let err = db
            .create_note(NewNote {
                contact_id: Some(404),
                content: "orphan".to_string(),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidInput(_)));

        let err = db
            .create_note(NewNote {
                company_id: Some(404),
                content: "orphan".to_string(),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidInput(_)));
    }

    #[test]
    fn test_delete_note() {
        let db = test_db();
        let jane = contact(&db, "Jane");

        let note = db
            .create_note(NewNote {
                contact_id: Some(jane.id),
                content: "temporary".to_string(),
                ..Default::default()
            })
            .expect("note");

        db.delete_note(note.id).expect("delete");
        assert!(db.get_notes_by_contact(jane.id).expect("notes").is_empty());

        let err = db.delete_note(note.id).unwrap_err();
        assert!(matches!(err, DbError::NotFound { entity: "note", .. }));
    }
}
