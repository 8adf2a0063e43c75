use chrono::Utc;
use rusqlite::{params, params_from_iter, ToSql};

use super::*;

impl CrmDb {
    // =========================================================================
    // Companies
    // =========================================================================

    /// Insert a new company. Returns the inserted row.
    pub fn create_company(&self, company: NewCompany) -> Result<DbCompany, DbError> {
        let name = company.name.trim();
        if name.is_empty() {
            return Err(DbError::InvalidInput("company name is required".to_string()));
        }

        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO companies (name, industry, website, phone, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                name,
                company.industry,
                company.website,
                company.phone,
                now,
                now,
            ],
        )?;

        Ok(DbCompany {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            industry: company.industry,
            website: company.website,
            phone: company.phone,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Get a company by id.
    pub fn get_company(&self, id: i64) -> Result<Option<DbCompany>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, industry, website, phone, created_at, updated_at
             FROM companies WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map([id], Self::map_company_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Get all companies, most recently created first.
    pub fn get_companies(&self) -> Result<Vec<DbCompany>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, industry, website, phone, created_at, updated_at
             FROM companies ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt.query_map([], Self::map_company_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Partially update a company. Same contract as `update_contact`.
    pub fn update_company(&self, id: i64, patch: CompanyPatch) -> Result<DbCompany, DbError> {
        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(ref name) = patch.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(DbError::InvalidInput("company name is required".to_string()));
            }
            sets.push("name = ?");
            values.push(Box::new(name.to_string()));
        }
        if let Some(ref industry) = patch.industry {
            sets.push("industry = ?");
            values.push(Box::new(industry.clone()));
        }
        if let Some(ref website) = patch.website {
            sets.push("website = ?");
            values.push(Box::new(website.clone()));
        }
        if let Some(ref phone) = patch.phone {
            sets.push("phone = ?");
            values.push(Box::new(phone.clone()));
        }

        sets.push("updated_at = ?");
        values.push(Box::new(Utc::now().to_rfc3339()));
        values.push(Box::new(id));

        let sql = format!("UPDATE companies SET {} WHERE id = ?", sets.join(", "));
        let rows = self
            .conn
            .execute(&sql, params_from_iter(values.iter().map(|v| v.as_ref())))?;
        if rows == 0 {
            return Err(DbError::NotFound {
                entity: "company",
                id,
            });
        }

        self.get_company(id)?.ok_or(DbError::NotFound {
            entity: "company",
            id,
        })
    }

    /// Delete a company atomically: its notes are deleted and every contact
    /// referencing it is detached (`company_id` cleared); contacts outlive
    /// their company.
    pub fn delete_company(&self, id: i64) -> Result<(), DbError> {
        self.with_transaction(|tx| {
            tx.conn
                .execute("DELETE FROM notes WHERE company_id = ?1", [id])?;
            tx.conn.execute(
                "UPDATE contacts SET company_id = NULL WHERE company_id = ?1",
                [id],
            )?;
            let rows = tx
                .conn
                .execute("DELETE FROM companies WHERE id = ?1", [id])?;
            if rows == 0 {
                return Err(DbError::NotFound {
                    entity: "company",
                    id,
                });
            }
            Ok(())
        })
    }

    /// Helper: map a row to `DbCompany`.
    fn map_company_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbCompany> {
        Ok(DbCompany {
            id: row.get(0)?,
            name: row.get(1)?,
            industry: row.get(2)?,
            website: row.get(3)?,
            phone: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}
