//! Category reference data.
//!
//! Categories are created administratively and never mutated by the store.

use chrono::Utc;
use ph_core::{CategoryId, Error, Result};
use rusqlite::{Connection, OptionalExtension};

use crate::models::Category;
use crate::{is_unique_violation, map_sqlite_error};

const COLS: &str = "id, name, created_at";

/// Create a new category. The name is trimmed before it is stored.
pub fn create_category(conn: &Connection, name: &str) -> Result<Category> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::invalid_input("category name must not be empty"));
    }

    let id = CategoryId::new();
    let created_at = Utc::now();

    conn.execute(
        "INSERT INTO categories (id, name, created_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![id.to_string(), name, created_at.to_rfc3339()],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            Error::Conflict(format!("Category '{name}' already exists"))
        } else {
            map_sqlite_error(e)
        }
    })?;

    Ok(Category {
        id,
        name: name.to_string(),
        created_at,
    })
}

/// Get a category by ID.
pub fn get_category(conn: &Connection, id: CategoryId) -> Result<Option<Category>> {
    let q = format!("SELECT {COLS} FROM categories WHERE id = ?1");
    conn.query_row(&q, [id.to_string()], Category::from_row)
        .optional()
        .map_err(map_sqlite_error)
}

/// Get a category by its exact name.
pub fn get_category_by_name(conn: &Connection, name: &str) -> Result<Option<Category>> {
    let q = format!("SELECT {COLS} FROM categories WHERE name = ?1");
    conn.query_row(&q, [name.trim()], Category::from_row)
        .optional()
        .map_err(map_sqlite_error)
}

/// List all categories ordered by name.
pub fn list_categories(conn: &Connection) -> Result<Vec<Category>> {
    let q = format!("SELECT {COLS} FROM categories ORDER BY name, id");
    let mut stmt = conn.prepare(&q).map_err(map_sqlite_error)?;
    let rows = stmt
        .query_map([], Category::from_row)
        .map_err(map_sqlite_error)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(map_sqlite_error)?;
    Ok(rows)
}

/// Whether a category with this ID exists.
pub fn category_exists(conn: &Connection, id: CategoryId) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?1)",
        [id.to_string()],
        |row| row.get(0),
    )
    .map_err(map_sqlite_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;

    #[test]
    fn create_and_get() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let cat = create_category(&conn, "  Portraits ").unwrap();
        assert_eq!(cat.name, "Portraits");

        let found = get_category(&conn, cat.id).unwrap().unwrap();
        assert_eq!(found, cat);
        let by_name = get_category_by_name(&conn, "Portraits").unwrap().unwrap();
        assert_eq!(by_name.id, cat.id);
    }

    #[test]
    fn duplicate_name_conflicts() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        create_category(&conn, "Weddings").unwrap();
        let err = create_category(&conn, "Weddings").unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[test]
    fn blank_name_rejected() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let err = create_category(&conn, "   ").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn list_is_sorted_by_name() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        create_category(&conn, "Wildlife").unwrap();
        create_category(&conn, "Architecture").unwrap();
        create_category(&conn, "Macro").unwrap();

        let names: Vec<_> = list_categories(&conn)
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Architecture", "Macro", "Wildlife"]);
    }

    #[test]
    fn exists() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let cat = create_category(&conn, "Street").unwrap();
        assert!(category_exists(&conn, cat.id).unwrap());
        assert!(!category_exists(&conn, CategoryId::new()).unwrap());
        assert!(get_category(&conn, CategoryId::new()).unwrap().is_none());
    }
}
