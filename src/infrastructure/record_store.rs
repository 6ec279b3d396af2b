// Record Store - the canonical post collection plus the active view
//
// All state sits behind one RwLock. Every mutation bumps the generation and
// enqueues its snapshot while the write lock is still held.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::filter_pipeline::{filter_refs, parse_timestamp};
use crate::core::{generate_series, metrics, FieldResolver, Metrics, ResolveContext};
use crate::error::AppResult;
use crate::infrastructure::cache::SeriesCache;
use crate::infrastructure::id_generator::PostIdGenerator;
use crate::infrastructure::persistence::{PersistenceWriter, SnapshotStore};
use crate::models::schema::{columns_from_post, merge_columns};
use crate::models::{ChartSpec, ColumnSchema, DateRange, FilterPredicate, Post, RawRow, Series, ViewState, ViewUpdate};

/// Construction options for a record store
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub resolver: FieldResolver,
    pub node_id: u16,
    pub series_cache_capacity: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            resolver: FieldResolver::default(),
            node_id: 0,
            series_cache_capacity: 64,
        }
    }
}

/// Outcome of one ingestion batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    pub batch_id: Uuid,
    pub inserted: usize,
    pub total: usize,
    /// Supplied ids that collided and were replaced
    pub reassigned_ids: usize,
    pub new_columns: usize,
}

#[derive(Debug, Default)]
struct StoreState {
    posts: Vec<Post>,
    ids: HashSet<String>,
    columns: Vec<ColumnSchema>,
    view: ViewState,
    generation: u64,
}

impl StoreState {
    /// Give `post` an id that is unique in the store. Returns true when a
    /// supplied id had to be replaced.
    fn claim_id(&mut self, post: &mut Post, ids: &PostIdGenerator) -> bool {
        let collided = !post.id.is_empty() && self.ids.contains(&post.id);
        if post.id.is_empty() || collided {
            let mut fresh = ids.next_id();
            while self.ids.contains(&fresh) {
                fresh = ids.next_id();
            }
            post.id = fresh;
        }
        self.ids.insert(post.id.clone());
        collided
    }
}

#[derive(Clone)]
pub struct RecordStore {
    state: Arc<RwLock<StoreState>>,
    resolver: Arc<FieldResolver>,
    ids: Arc<PostIdGenerator>,
    writer: PersistenceWriter,
    series_cache: Arc<Mutex<SeriesCache>>,
}

impl RecordStore {
    /// Load the last snapshot and start the persistence writer.
    /// A snapshot that fails to load leaves the store empty.
    pub async fn open(snapshots: Arc<dyn SnapshotStore>, options: StoreOptions) -> AppResult<Self> {
        let ids = PostIdGenerator::new(options.node_id)?;

        let mut state = StoreState::default();
        match snapshots.load_posts().await {
            Ok(posts) => {
                for mut post in posts {
                    state.claim_id(&mut post, &ids);
                    state.posts.push(post);
                }
            }
            Err(e) => warn!("Failed to load posts snapshot, starting empty: error={}", e),
        }
        match snapshots.load_view().await {
            Ok(Some(view)) => state.view = view,
            Ok(None) => {}
            Err(e) => warn!("Failed to load view snapshot, starting with empty view: error={}", e),
        }
        if let Some(first) = state.posts.first() {
            state.columns = columns_from_post(first);
        }
        info!(
            "Record store opened: posts={} columns={} predicates={}",
            state.posts.len(),
            state.columns.len(),
            state.view.predicates.len()
        );

        Ok(Self {
            state: Arc::new(RwLock::new(state)),
            resolver: Arc::new(options.resolver),
            ids: Arc::new(ids),
            writer: PersistenceWriter::spawn(snapshots),
            series_cache: Arc::new(Mutex::new(SeriesCache::new(options.series_cache_capacity))),
        })
    }

    // ========================================================================
    // Collection mutations
    // ========================================================================

    /// Resolve and append a batch of raw rows
    pub async fn ingest(&self, rows: Vec<RawRow>) -> IngestReport {
        let ingested_at = Utc::now();
        let batch_id = Uuid::new_v4();

        let mut state = self.state.write().await;
        let mut reassigned_ids = 0;
        for (position, row) in rows.iter().enumerate() {
            let mut post = self.resolver.resolve(row, &ResolveContext::new(position, ingested_at));
            if state.claim_id(&mut post, &self.ids) {
                reassigned_ids += 1;
            }
            state.posts.push(post);
        }
        let new_columns = merge_columns(&mut state.columns, &rows);
        state.generation += 1;
        self.writer.save_posts(state.posts.clone());

        let report = IngestReport {
            batch_id,
            inserted: rows.len(),
            total: state.posts.len(),
            reassigned_ids,
            new_columns,
        };
        info!(
            "Ingested batch: batch_id={} inserted={} total={} reassigned_ids={}",
            report.batch_id, report.inserted, report.total, report.reassigned_ids
        );
        report
    }

    /// Swap the whole collection for `posts`
    pub async fn replace(&self, posts: Vec<Post>) -> usize {
        let mut state = self.state.write().await;
        state.posts.clear();
        state.ids.clear();
        for mut post in posts {
            state.claim_id(&mut post, &self.ids);
            state.posts.push(post);
        }
        state.columns = state.posts.first().map(columns_from_post).unwrap_or_default();
        state.generation += 1;
        self.writer.save_posts(state.posts.clone());
        info!("Replaced collection: total={}", state.posts.len());
        state.posts.len()
    }

    /// Drop every post and column, and reset selections and predicates
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        let dropped = state.posts.len();
        state.posts.clear();
        state.ids.clear();
        state.columns.clear();
        state.view.clear_filters();
        state.generation += 1;
        self.writer.save_posts(Vec::new());
        self.writer.save_view(state.view.clone());
        info!("Cleared collection: dropped={}", dropped);
    }

    // ========================================================================
    // View mutations
    // ========================================================================

    async fn mutate_view<F>(&self, change: F) -> ViewState
    where
        F: FnOnce(&mut ViewState),
    {
        let mut state = self.state.write().await;
        change(&mut state.view);
        state.generation += 1;
        self.writer.save_view(state.view.clone());
        state.view.clone()
    }

    pub async fn set_view(&self, update: ViewUpdate) -> ViewState {
        self.mutate_view(|view| view.apply(update)).await
    }

    pub async fn set_platforms(&self, platforms: Vec<String>) -> ViewState {
        self.mutate_view(|view| view.selected_platforms = platforms.into_iter().collect())
            .await
    }

    pub async fn set_sentiments(&self, sentiments: Vec<String>) -> ViewState {
        self.mutate_view(|view| view.selected_sentiments = sentiments.into_iter().collect())
            .await
    }

    pub async fn set_date_range(&self, range: DateRange) -> ViewState {
        self.mutate_view(|view| view.date_range = range).await
    }

    pub async fn add_predicate(&self, predicate: FilterPredicate) -> ViewState {
        self.mutate_view(|view| view.predicates.push(predicate)).await
    }

    /// Out-of-range indexes leave the view unchanged
    pub async fn remove_predicate(&self, index: usize) -> ViewState {
        self.mutate_view(|view| {
            if index < view.predicates.len() {
                view.predicates.remove(index);
            } else {
                debug!("No predicate to remove: index={} len={}", index, view.predicates.len());
            }
        })
        .await
    }

    pub async fn clear_predicates(&self) -> ViewState {
        self.mutate_view(|view| view.predicates.clear()).await
    }

    /// Predicates plus platform and sentiment selections
    pub async fn clear_filters(&self) -> ViewState {
        self.mutate_view(ViewState::clear_filters).await
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub async fn posts(&self) -> Vec<Post> {
        self.state.read().await.posts.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.posts.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn columns(&self) -> Vec<ColumnSchema> {
        self.state.read().await.columns.clone()
    }

    pub async fn view(&self) -> ViewState {
        self.state.read().await.view.clone()
    }

    pub async fn generation(&self) -> u64 {
        self.state.read().await.generation
    }

    pub async fn filtered_posts(&self) -> Vec<Post> {
        let state = self.state.read().await;
        filter_refs(&state.posts, &state.view, Utc::now())
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn metrics(&self) -> Metrics {
        let state = self.state.read().await;
        metrics(filter_refs(&state.posts, &state.view, Utc::now()))
    }

    /// Series over the filtered posts, cached per store generation.
    /// A date window over unparsable timestamps depends on the clock, so
    /// those series are always recomputed.
    pub async fn generate_series(&self, spec: &ChartSpec) -> Series {
        let state = self.state.read().await;
        if state.view.date_range.bounds().is_some()
            && state.posts.iter().any(|p| parse_timestamp(&p.created_at).is_none())
        {
            debug!("Series cache bypassed: clock-dependent date window");
            return generate_series(filter_refs(&state.posts, &state.view, Utc::now()), spec);
        }

        let key = (state.generation, spec.clone());
        let mut cache = self.series_cache.lock().await;
        if let Some(series) = cache.get(&key) {
            debug!("Series cache hit: generation={} group_field={}", key.0, spec.group_field);
            return series.clone();
        }

        let series = generate_series(filter_refs(&state.posts, &state.view, Utc::now()), spec);
        cache.insert(key, series.clone());
        series
    }

    /// Wait until every queued snapshot has been written
    pub async fn flush(&self) {
        self.writer.flush().await;
    }
}
