use std::{collections::HashSet, sync::Arc};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::{
    models::{MovieId, MovieSummary},
    storage::{LocalStorage, StorageError},
};

/// Storage key holding the serialized watchlist.
pub const WATCHLIST_KEY: &str = "watchlist";

/// Immutable view of the watchlist handed to readers and subscribers.
pub type Snapshot = Arc<Vec<MovieSummary>>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("watchlist storage: {0}")]
    Storage(#[from] StorageError),
    #[error("watchlist encoding: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Ordered, id-unique list of saved movies mirrored into a [`LocalStorage`] record.
///
/// Every effective mutation publishes a new snapshot to subscribers and then
/// rewrites the whole record. If that write fails the error is returned but the
/// in-memory change stands; the record catches up on the next successful write.
pub struct WatchlistStore<S> {
    storage: S,
    movies: Snapshot,
    tx: watch::Sender<Snapshot>,
}

impl<S: LocalStorage> WatchlistStore<S> {
    /// Loads the persisted watchlist. An unreadable value is logged and treated as empty.
    pub async fn hydrate(storage: S) -> Result<Self, StoreError> {
        let movies = match storage.get_item(WATCHLIST_KEY).await? {
            Some(raw) if !raw.trim().is_empty() => decode(&raw),
            _ => Vec::new(),
        };
        debug!(count = movies.len(), "hydrated watchlist");

        let movies = Arc::new(movies);
        let (tx, _) = watch::channel(movies.clone());
        Ok(Self { storage, movies, tx })
    }

    /// Appends `movie` unless an entry with the same id exists. Returns whether it was added.
    pub async fn add(&mut self, movie: MovieSummary) -> Result<bool, StoreError> {
        if self.contains(movie.id) {
            debug!(movie_id = movie.id, "already in watchlist");
            return Ok(false);
        }

        debug!(movie_id = movie.id, title = %movie.title, "adding to watchlist");
        Arc::make_mut(&mut self.movies).push(movie);
        self.sync().await?;
        Ok(true)
    }

    /// Removes the entry with `movie_id`. Returns whether anything was removed.
    pub async fn remove(&mut self, movie_id: MovieId) -> Result<bool, StoreError> {
        let Some(pos) = self.movies.iter().position(|m| m.id == movie_id) else {
            debug!(movie_id, "not in watchlist");
            return Ok(false);
        };

        debug!(movie_id, "removing from watchlist");
        Arc::make_mut(&mut self.movies).remove(pos);
        self.sync().await?;
        Ok(true)
    }

    /// Empties the watchlist with a single write. Returns how many entries were dropped.
    pub async fn clear(&mut self) -> Result<usize, StoreError> {
        let count = self.movies.len();
        if count == 0 {
            return Ok(0);
        }

        debug!(count, "clearing watchlist");
        self.movies = Arc::new(Vec::new());
        self.sync().await?;
        Ok(count)
    }

    pub fn contains(&self, movie_id: MovieId) -> bool {
        self.movies.iter().any(|m| m.id == movie_id)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.movies.clone()
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Receives a fresh snapshot after every effective mutation.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.tx.subscribe()
    }

    async fn sync(&self) -> Result<(), StoreError> {
        self.tx.send_replace(self.movies.clone());

        let raw = serde_json::to_string(self.movies.as_slice())?;
        self.storage.set_item(WATCHLIST_KEY, &raw).await?;
        Ok(())
    }

    #[cfg(test)]
    fn storage(&self) -> &S {
        &self.storage
    }
}

fn decode(raw: &str) -> Vec<MovieSummary> {
    let movies: Vec<MovieSummary> = match serde_json::from_str(raw) {
        Ok(movies) => movies,
        Err(err) => {
            warn!(error = %err, "persisted watchlist is unreadable, starting empty");
            return Vec::new();
        },
    };

    let mut seen = HashSet::new();
    let total = movies.len();
    let movies: Vec<_> = movies.into_iter().filter(|m| seen.insert(m.id)).collect();
    if movies.len() != total {
        warn!(dropped = total - movies.len(), "persisted watchlist had duplicate ids");
    }
    movies
}
