// Persistence writer - background task that applies snapshot saves in order
//
// Saves are enqueued from inside the record store's write lock, so the channel
// order is the mutation order. Failures are logged and dropped.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use super::SnapshotStore;
use crate::models::{Post, ViewState};

enum Command {
    SavePosts(Vec<Post>),
    SaveView(ViewState),
    Flush(oneshot::Sender<()>),
}

#[derive(Clone)]
pub struct PersistenceWriter {
    tx: mpsc::UnboundedSender<Command>,
}

impl PersistenceWriter {
    /// Spawn the writer task on the current tokio runtime
    pub fn spawn(store: Arc<dyn SnapshotStore>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Command>();

        tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                match command {
                    Command::SavePosts(posts) => match store.save_posts(&posts).await {
                        Ok(()) => debug!("Persisted posts: count={}", posts.len()),
                        Err(e) => warn!("Failed to persist posts: count={} error={}", posts.len(), e),
                    },
                    Command::SaveView(view) => match store.save_view(&view).await {
                        Ok(()) => debug!("Persisted view: predicates={}", view.predicates.len()),
                        Err(e) => warn!("Failed to persist view: error={}", e),
                    },
                    Command::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
            debug!("Persistence writer stopped");
        });

        Self { tx }
    }

    pub fn save_posts(&self, posts: Vec<Post>) {
        if self.tx.send(Command::SavePosts(posts)).is_err() {
            warn!("Persistence writer is gone; posts snapshot dropped");
        }
    }

    pub fn save_view(&self, view: ViewState) {
        if self.tx.send(Command::SaveView(view)).is_err() {
            warn!("Persistence writer is gone; view snapshot dropped");
        }
    }

    /// Resolves once every save queued before this call has been attempted
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Command::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }
}
