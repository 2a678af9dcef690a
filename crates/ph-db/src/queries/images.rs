//! Image metadata and payload chunk operations.
//!
//! An image row records ownership, category, and total length. The payload
//! bytes live in `image_chunks`, ordered by `seq`, each no larger than the
//! store's chunk size. Callers write the row and its chunks inside one
//! transaction so a failed upload leaves nothing behind.

use chrono::Utc;
use ph_core::{CategoryId, Error, ImageId, Result, UserId};
use rusqlite::{Connection, OptionalExtension};

use crate::models::{Image, ImageRef, Owner};
use crate::{is_foreign_key_violation, map_sqlite_error};

const COLS: &str = "id, owner_id, category_id, byte_len, created_at";

/// Insert an image row with a zero length. Chunks are appended separately.
pub fn create_image(conn: &Connection, owner_id: UserId, category_id: CategoryId) -> Result<Image> {
    let id = ImageId::new();
    let created_at = Utc::now();

    conn.execute(
        "INSERT INTO images (id, owner_id, category_id, byte_len, created_at)
         VALUES (?1, ?2, ?3, 0, ?4)",
        rusqlite::params![
            id.to_string(),
            owner_id.to_string(),
            category_id.to_string(),
            created_at.to_rfc3339(),
        ],
    )
    .map_err(|e| {
        if is_foreign_key_violation(&e) {
            Error::reference("owner or category", format!("{owner_id}/{category_id}"))
        } else {
            map_sqlite_error(e)
        }
    })?;

    Ok(Image {
        id,
        owner_id,
        category_id,
        byte_len: 0,
        created_at,
    })
}

/// Append one payload chunk at position `seq`.
pub fn append_chunk(conn: &Connection, image_id: ImageId, seq: u64, data: &[u8]) -> Result<()> {
    conn.execute(
        "INSERT INTO image_chunks (image_id, seq, data) VALUES (?1, ?2, ?3)",
        rusqlite::params![image_id.to_string(), seq, data],
    )
    .map_err(map_sqlite_error)?;
    Ok(())
}

/// Record the total payload length once all chunks are written.
pub fn set_byte_len(conn: &Connection, image_id: ImageId, byte_len: u64) -> Result<()> {
    let len = i64::try_from(byte_len)
        .map_err(|_| Error::invalid_input(format!("payload of {byte_len} bytes is too large")))?;

    let n = conn
        .execute(
            "UPDATE images SET byte_len = ?1 WHERE id = ?2",
            rusqlite::params![len, image_id.to_string()],
        )
        .map_err(map_sqlite_error)?;

    if n == 0 {
        return Err(Error::not_found("image", image_id));
    }
    Ok(())
}

/// Get image metadata by ID.
pub fn get_image(conn: &Connection, id: ImageId) -> Result<Option<Image>> {
    let q = format!("SELECT {COLS} FROM images WHERE id = ?1");
    conn.query_row(&q, [id.to_string()], Image::from_row)
        .optional()
        .map_err(map_sqlite_error)
}

/// Read the full payload of an image, reassembling its chunks in order.
///
/// Returns `Ok(None)` when no image has this ID.
pub fn read_payload(conn: &Connection, id: ImageId) -> Result<Option<Vec<u8>>> {
    let Some(image) = get_image(conn, id)? else {
        return Ok(None);
    };

    let expected = usize::try_from(image.byte_len).map_err(|_| {
        Error::Internal(format!(
            "image {id} is {} bytes, too large for this platform",
            image.byte_len
        ))
    })?;

    let mut payload = Vec::with_capacity(expected);
    let mut stmt = conn
        .prepare("SELECT data FROM image_chunks WHERE image_id = ?1 ORDER BY seq")
        .map_err(map_sqlite_error)?;
    let mut rows = stmt.query([id.to_string()]).map_err(map_sqlite_error)?;

    while let Some(row) = rows.next().map_err(map_sqlite_error)? {
        let chunk = row
            .get_ref(0)
            .map_err(map_sqlite_error)?
            .as_blob()
            .map_err(Error::database)?;
        payload.extend_from_slice(chunk);
    }

    if payload.len() != expected {
        return Err(Error::Internal(format!(
            "image {id} payload is {} bytes, expected {expected}",
            payload.len()
        )));
    }

    Ok(Some(payload))
}

/// Read at most `len` leading bytes of an image's payload.
///
/// Only the first bytes of each chunk are fetched, so the cost does not grow
/// with the payload size. Returns `Ok(None)` when no image has this ID.
pub fn read_prefix(conn: &Connection, id: ImageId, len: usize) -> Result<Option<Vec<u8>>> {
    if get_image(conn, id)?.is_none() {
        return Ok(None);
    }

    let mut prefix = Vec::with_capacity(len);
    if len == 0 {
        return Ok(Some(prefix));
    }

    let take = i64::try_from(len).unwrap_or(i64::MAX);
    let mut stmt = conn
        .prepare("SELECT substr(data, 1, ?2) FROM image_chunks WHERE image_id = ?1 ORDER BY seq")
        .map_err(map_sqlite_error)?;
    let mut rows = stmt
        .query(rusqlite::params![id.to_string(), take])
        .map_err(map_sqlite_error)?;

    while prefix.len() < len {
        let Some(row) = rows.next().map_err(map_sqlite_error)? else {
            break;
        };
        let head = row
            .get_ref(0)
            .map_err(map_sqlite_error)?
            .as_blob()
            .map_err(Error::database)?;
        let remaining = len - prefix.len();
        prefix.extend_from_slice(&head[..head.len().min(remaining)]);
    }

    Ok(Some(prefix))
}

/// List images in a category, optionally restricted to one owner.
///
/// Rows come back in insertion order, which is stable for a given store state.
pub fn list_images_by_category(
    conn: &Connection,
    category_id: CategoryId,
    owner_id: Option<UserId>,
) -> Result<Vec<ImageRef>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, owner_id FROM images
             WHERE category_id = ?1 AND (?2 IS NULL OR owner_id = ?2)
             ORDER BY rowid",
        )
        .map_err(map_sqlite_error)?;

    let rows = stmt
        .query_map(
            rusqlite::params![category_id.to_string(), owner_id.map(|o| o.to_string())],
            ImageRef::from_row,
        )
        .map_err(map_sqlite_error)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(map_sqlite_error)?;
    Ok(rows)
}

/// Users with at least one image in the category, ordered by username.
pub fn list_owners_in_category(conn: &Connection, category_id: CategoryId) -> Result<Vec<Owner>> {
    let mut stmt = conn
        .prepare(
            "SELECT DISTINCT u.id, u.username
             FROM users u
             JOIN images i ON i.owner_id = u.id
             WHERE i.category_id = ?1
             ORDER BY u.username",
        )
        .map_err(map_sqlite_error)?;

    let rows = stmt
        .query_map([category_id.to_string()], Owner::from_row)
        .map_err(map_sqlite_error)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(map_sqlite_error)?;
    Ok(rows)
}

/// Total number of stored images.
pub fn count_images(conn: &Connection) -> Result<u64> {
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM images", [], |row| row.get(0))
        .map_err(map_sqlite_error)?;
    Ok(n.max(0) as u64)
}
