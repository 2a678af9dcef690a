//! Content store: durable image payloads keyed by owner and category.
//!
//! [`ContentStore`] wraps a connection pool and writes each payload as a
//! sequence of chunks inside a single IMMEDIATE transaction. A failed upload
//! rolls back completely, so readers never observe a half-written image.

use std::io::Read;

use bytes::Bytes;
use ph_core::config::StoreConfig;
use ph_core::{CategoryId, Config, Error, ImageId, Result, UserId};
use ph_db::map_sqlite_error;
use ph_db::models::{Category, Image, ImageRef};
use ph_db::pool::{get_conn, init_pool, DbPool};
use ph_db::queries::{categories, images, users};
use rusqlite::{Connection, TransactionBehavior};

/// Handle to the image store. Cloning is cheap; clones share the pool.
#[derive(Clone)]
pub struct ContentStore {
    pool: DbPool,
    chunk_size: usize,
}

impl ContentStore {
    /// Wrap an existing pool.
    ///
    /// Fails with [`Error::Config`] if the configured chunk size is unusable.
    pub fn new(pool: DbPool, config: &StoreConfig) -> Result<Self> {
        Ok(Self {
            pool,
            chunk_size: config.checked_chunk_size()?,
        })
    }

    /// Open the database named in `config`, running migrations, and wrap it.
    pub fn open(config: &Config) -> Result<Self> {
        let pool = init_pool(&config.database)?;
        Self::new(pool, &config.store)
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Persist `payload` under the given owner and category.
    ///
    /// Returns the freshly assigned image id. Fails with
    /// [`Error::InvalidInput`] for an empty payload and [`Error::Reference`]
    /// when the owner or category does not exist.
    pub fn put(&self, payload: &[u8], owner_id: UserId, category_id: CategoryId) -> Result<ImageId> {
        if payload.is_empty() {
            return Err(Error::invalid_input("image payload is empty"));
        }

        self.insert_with(owner_id, category_id, |conn, image_id| {
            for (seq, chunk) in payload.chunks(self.chunk_size).enumerate() {
                images::append_chunk(conn, image_id, seq as u64, chunk)?;
            }
            Ok(payload.len() as u64)
        })
    }

    /// Streaming form of [`put`](Self::put).
    ///
    /// Reads `reader` to the end, writing one chunk at a time so memory use
    /// stays bounded by the chunk size. An empty stream is rejected before
    /// the database is touched.
    pub fn put_reader<R: Read>(
        &self,
        mut reader: R,
        owner_id: UserId,
        category_id: CategoryId,
    ) -> Result<ImageId> {
        let mut buf = Vec::new();
        if next_chunk(&mut reader, self.chunk_size, &mut buf)? == 0 {
            return Err(Error::invalid_input("image payload is empty"));
        }

        self.insert_with(owner_id, category_id, |conn, image_id| {
            let mut seq = 0u64;
            let mut total = 0u64;
            loop {
                images::append_chunk(conn, image_id, seq, &buf)?;
                seq += 1;
                total += buf.len() as u64;

                if next_chunk(&mut reader, self.chunk_size, &mut buf)? == 0 {
                    break;
                }
            }
            Ok(total)
        })
    }

    /// Shared write path: validate references, create the row, let
    /// `write_payload` append chunks, record the length and commit.
    fn insert_with<F>(&self, owner_id: UserId, category_id: CategoryId, write_payload: F) -> Result<ImageId>
    where
        F: FnOnce(&Connection, ImageId) -> Result<u64>,
    {
        let mut conn = get_conn(&self.pool)?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(map_sqlite_error)?;

        if !users::user_exists(&tx, owner_id)? {
            return Err(Error::reference("user", owner_id));
        }
        if !categories::category_exists(&tx, category_id)? {
            return Err(Error::reference("category", category_id));
        }

        let image = images::create_image(&tx, owner_id, category_id)?;
        let byte_len = write_payload(&tx, image.id)?;
        images::set_byte_len(&tx, image.id, byte_len)?;
        tx.commit().map_err(map_sqlite_error)?;

        tracing::info!(
            image_id = %image.id,
            owner_id = %owner_id,
            category_id = %category_id,
            byte_len,
            "Stored image"
        );
        Ok(image.id)
    }

    /// Return the exact bytes stored for `image_id`.
    pub fn get(&self, image_id: ImageId) -> Result<Bytes> {
        let conn = get_conn(&self.pool)?;
        let payload =
            images::read_payload(&conn, image_id)?.ok_or_else(|| Error::not_found("image", image_id))?;

        tracing::debug!(image_id = %image_id, byte_len = payload.len(), "Loaded image");
        Ok(Bytes::from(payload))
    }

    /// Return at most `len` leading bytes of the payload.
    pub fn peek(&self, image_id: ImageId, len: usize) -> Result<Vec<u8>> {
        let conn = get_conn(&self.pool)?;
        images::read_prefix(&conn, image_id, len)?.ok_or_else(|| Error::not_found("image", image_id))
    }

    /// Image metadata without the payload.
    pub fn metadata(&self, image_id: ImageId) -> Result<Image> {
        let conn = get_conn(&self.pool)?;
        images::get_image(&conn, image_id)?.ok_or_else(|| Error::not_found("image", image_id))
    }

    /// Images in a category, optionally restricted to one owner.
    ///
    /// An unknown category yields an empty list rather than an error.
    pub fn list_by_category(
        &self,
        category_id: CategoryId,
        owner_id: Option<UserId>,
    ) -> Result<Vec<ImageRef>> {
        let conn = get_conn(&self.pool)?;
        images::list_images_by_category(&conn, category_id, owner_id)
    }

    /// Every category, ordered by name.
    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let conn = get_conn(&self.pool)?;
        categories::list_categories(&conn)
    }
}

/// Refill `buf` with up to `chunk_size` bytes from `reader`.
fn next_chunk<R: Read>(reader: &mut R, chunk_size: usize, buf: &mut Vec<u8>) -> Result<usize> {
    buf.clear();
    let n = reader.by_ref().take(chunk_size as u64).read_to_end(buf)?;
    Ok(n)
}
