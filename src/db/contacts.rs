use chrono::Utc;
use rusqlite::{params, params_from_iter, ToSql};

use super::*;

impl CrmDb {
    // =========================================================================
    // Contacts
    // =========================================================================

    /// Insert a new contact. The id and both timestamps are system-assigned.
    /// Returns the inserted row.
    pub fn create_contact(&self, contact: NewContact) -> Result<DbContact, DbError> {
        let first_name = contact.first_name.trim();
        if first_name.is_empty() {
            return Err(DbError::InvalidInput("first name is required".to_string()));
        }
        let last_name = contact.last_name.trim();
        if last_name.is_empty() {
            return Err(DbError::InvalidInput("last name is required".to_string()));
        }
        if let Some(company_id) = contact.company_id {
            if !self.row_exists("companies", company_id)? {
                return Err(DbError::InvalidInput(format!(
                    "company {company_id} does not exist"
                )));
            }
        }

        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO contacts (first_name, last_name, email, phone, company_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                first_name,
                last_name,
                contact.email,
                contact.phone,
                contact.company_id,
                now,
                now,
            ],
        )?;

        Ok(DbContact {
            id: self.conn.last_insert_rowid(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: contact.email,
            phone: contact.phone,
            company_id: contact.company_id,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Get a contact by id.
    pub fn get_contact(&self, id: i64) -> Result<Option<DbContact>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, first_name, last_name, email, phone, company_id, created_at, updated_at
             FROM contacts WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map([id], Self::map_contact_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Get all contacts, most recently created first. No pagination and no
    /// filtering; the presentation layer filters the full list client-side.
    pub fn get_contacts(&self) -> Result<Vec<DbContact>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, first_name, last_name, email, phone, company_id, created_at, updated_at
             FROM contacts ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt.query_map([], Self::map_contact_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Partially update a contact. Only the fields present in the patch change;
    /// `updated_at` is always refreshed, even for an empty patch. Returns the
    /// row after the update, or `NotFound` if the id does not exist.
    pub fn update_contact(&self, id: i64, patch: ContactPatch) -> Result<DbContact, DbError> {
        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(ref first_name) = patch.first_name {
            let first_name = first_name.trim();
            if first_name.is_empty() {
                return Err(DbError::InvalidInput("first name is required".to_string()));
            }
            sets.push("first_name = ?");
            values.push(Box::new(first_name.to_string()));
        }
        if let Some(ref last_name) = patch.last_name {
            let last_name = last_name.trim();
            if last_name.is_empty() {
                return Err(DbError::InvalidInput("last name is required".to_string()));
            }
            sets.push("last_name = ?");
            values.push(Box::new(last_name.to_string()));
        }
        if let Some(ref email) = patch.email {
            sets.push("email = ?");
            values.push(Box::new(email.clone()));
        }
        if let Some(ref phone) = patch.phone {
            sets.push("phone = ?");
            values.push(Box::new(phone.clone()));
        }
        if let Some(company_id) = patch.company_id {
            if let Some(company_id) = company_id {
                if !self.row_exists("companies", company_id)? {
                    return Err(DbError::InvalidInput(format!(
                        "company {company_id} does not exist"
                    )));
                }
            }
            sets.push("company_id = ?");
            values.push(Box::new(company_id));
        }

        sets.push("updated_at = ?");
        values.push(Box::new(Utc::now().to_rfc3339()));
        values.push(Box::new(id));

        let sql = format!("UPDATE contacts SET {} WHERE id = ?", sets.join(", "));
        let rows = self
            .conn
            .execute(&sql, params_from_iter(values.iter().map(|v| v.as_ref())))?;
        if rows == 0 {
            return Err(DbError::NotFound {
                entity: "contact",
                id,
            });
        }

        self.get_contact(id)?.ok_or(DbError::NotFound {
            entity: "contact",
            id,
        })
    }

    /// Delete a contact and every note attached to it, atomically.
    pub fn delete_contact(&self, id: i64) -> Result<(), DbError> {
        self.with_transaction(|tx| {
            tx.conn
                .execute("DELETE FROM notes WHERE contact_id = ?1", [id])?;
            let rows = tx.conn.execute("DELETE FROM contacts WHERE id = ?1", [id])?;
            if rows == 0 {
                return Err(DbError::NotFound {
                    entity: "contact",
                    id,
                });
            }
            Ok(())
        })
    }

    /// Helper: map a row to `DbContact`.
    fn map_contact_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbContact> {
        Ok(DbContact {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            email: row.get(3)?,
            phone: row.get(4)?,
            company_id: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::test_db;
    use super::*;

    fn sample_contact(first: &str, last: &str) -> NewContact {
        NewContact {
            first_name: first.to_string(),
            last_name: last.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_and_list_contact() {
        let db = test_db();

        let jane = db
            .create_contact(NewContact {
                email: Some("jane@acme.test".to_string()),
                ..sample_contact("Jane", "Doe")
            })
            .expect("create");
        assert!(jane.id > 0);
        assert_eq!(jane.created_at, jane.updated_at);

        let all = db.get_contacts().expect("list");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].first_name, "Jane");
        assert_eq!(all[0].email.as_deref(), Some("jane@acme.test"));
    }

    #[test]
    fn test_ids_are_unique_and_monotonic() {
        let db = test_db();

        let a = db.create_contact(sample_contact("Ada", "Lovelace")).expect("create");
        let b = db.create_contact(sample_contact("Grace", "Hopper")).expect("create");
        assert!(b.id > a.id);

        // Most recent first; ids never collide even within the same instant
        let all = db.get_contacts().expect("list");
        assert_eq!(all[0].id, b.id);
        assert_eq!(all[1].id, a.id);
    }

    #[test]
    fn test_create_rejects_blank_names() {
        let db = test_db();

        let err = db.create_contact(sample_contact("  ", "Doe")).unwrap_err();
        assert!(matches!(err, DbError::InvalidInput(_)));

        let err = db.create_contact(sample_contact("Jane", "")).unwrap_err();
        assert!(matches!(err, DbError::InvalidInput(_)));

        assert!(db.get_contacts().expect("list").is_empty());
    }

    #[test]
    fn test_create_rejects_missing_company() {
        let db = test_db();

        let err = db
            .create_contact(NewContact {
                company_id: Some(999),
                ..sample_contact("Jane", "Doe")
            })
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidInput(_)));
    }

    #[test]
    fn test_partial_update_leaves_other_fields_alone() {
        let db = test_db();

        let jane = db
            .create_contact(NewContact {
                email: Some("jane@acme.test".to_string()),
                phone: Some("555-0100".to_string()),
                ..sample_contact("Jane", "Doe")
            })
            .expect("create");

        let updated = db
            .update_contact(
                jane.id,
                ContactPatch {
                    email: Some(Some("jane.doe@acme.test".to_string())),
                    ..Default::default()
                },
            )
            .expect("update");

        assert_eq!(updated.first_name, "Jane");
        assert_eq!(updated.last_name, "Doe");
        assert_eq!(updated.phone.as_deref(), Some("555-0100"));
        assert_eq!(updated.email.as_deref(), Some("jane.doe@acme.test"));
        assert!(
            updated.updated_at > jane.updated_at,
            "updated_at should advance"
        );
        assert_eq!(updated.created_at, jane.created_at);
    }

    #[test]
    fn test_update_can_clear_nullable_fields() {
        let db = test_db();

        let acme = db
            .create_company(NewCompany {
                name: "Acme".to_string(),
                ..Default::default()
            })
            .expect("create company");
        let jane = db
            .create_contact(NewContact {
                email: Some("jane@acme.test".to_string()),
                company_id: Some(acme.id),
                ..sample_contact("Jane", "Doe")
            })
            .expect("create");

        let updated = db
            .update_contact(
                jane.id,
                ContactPatch {
                    email: Some(None),
                    company_id: Some(None),
                    ..Default::default()
                },
            )
            .expect("update");
        assert_eq!(updated.email, None);
        assert_eq!(updated.company_id, None);
    }

    #[test]
    fn test_empty_patch_still_touches_updated_at() {
        let db = test_db();

        let jane = db.create_contact(sample_contact("Jane", "Doe")).expect("create");
        let updated = db
            .update_contact(jane.id, ContactPatch::default())
            .expect("empty patch should succeed");
        assert!(updated.updated_at > jane.updated_at);
    }

    #[test]
    fn test_update_missing_id_is_not_found() {
        let db = test_db();

        let err = db.update_contact(42, ContactPatch::default()).unwrap_err();
        assert!(matches!(
            err,
            DbError::NotFound {
                entity: "contact",
                id: 42
            }
        ));
    }

    #[test]
    fn test_delete_contact_cascades_to_notes() {
        let db = test_db();

        let jane = db.create_contact(sample_contact("Jane", "Doe")).expect("create");
        let other = db.create_contact(sample_contact("John", "Smith")).expect("create");

        db.create_note(NewNote {
            contact_id: Some(jane.id),
            content: "Met at the conference".to_string(),
            ..Default::default()
        })
        .expect("note 1");
        db.create_note(NewNote {
            contact_id: Some(other.id),
            content: "Prefers email".to_string(),
            ..Default::default()
        })
        .expect("note 2");

        db.delete_contact(jane.id).expect("delete");

        assert!(db.get_contact(jane.id).expect("get").is_none());
        assert!(db
            .get_notes_by_contact(jane.id)
            .expect("notes")
            .is_empty());
        // Unrelated contact and its notes untouched
        assert_eq!(db.get_notes_by_contact(other.id).expect("notes").len(), 1);
    }

    #[test]
    fn test_delete_missing_id_is_not_found() {
        let db = test_db();
        let err = db.delete_contact(7).unwrap_err();
        assert!(matches!(
            err,
            DbError::NotFound {
                entity: "contact",
                id: 7
            }
        ));
    }
}
