//! JSON query server with live snapshot reload

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tower_http::trace::TraceLayer;

use crate::cache::RenderCache;
use crate::content::search::{all_tags, filter_by_tag, search};
use crate::content::{Post, Repository, TagCount};
use crate::Blog;

/// Server state
pub struct ServerState {
    blog: Blog,
    /// Current snapshot; replaced whole on reload, never edited
    repo: RwLock<Arc<Repository>>,
    cache: RenderCache,
}

impl ServerState {
    pub fn new(blog: Blog, repo: Repository) -> Self {
        Self {
            blog,
            repo: RwLock::new(Arc::new(repo)),
            cache: RenderCache::new(),
        }
    }

    /// The snapshot requests should read from
    pub fn snapshot(&self) -> Arc<Repository> {
        self.repo
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Load a new snapshot and swap it in; the old one stays on failure
    pub fn reload(&self) -> Result<usize> {
        let renderer = self.snapshot().renderer().clone();
        let repo =
            Repository::load_with_renderer(&self.blog.source(), &self.blog.config, renderer)?;
        let count = repo.len();
        self.cache.retain_posts_of(&repo);
        *self.repo.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(repo);
        Ok(count)
    }
}

/// Build the API router
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/api/posts", get(list_posts))
        .route("/api/posts/:slug", get(get_post))
        .route("/api/slugs", get(list_slugs))
        .route("/api/search", get(search_posts))
        .route("/api/recent", get(recent_posts))
        .route("/api/tags", get(list_tags))
        .route("/api/tags/trending", get(trending_tags))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the query server
pub async fn start(blog: &Blog, ip: &str, port: u16, watch: bool) -> Result<()> {
    let repo = blog.load()?;
    let state = Arc::new(ServerState::new(blog.clone(), repo));
    let app = router(state.clone());

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}/api/posts", ip, port);
    if watch {
        println!("Watching {} for changes...", blog.content_dir.display());
        let state = state.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_reload(state) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Rebuild the snapshot whenever the content directory changes
fn watch_and_reload(state: Arc<ServerState>) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Create debouncer to avoid multiple rapid rebuilds
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;
    debouncer
        .watcher()
        .watch(&state.blog.content_dir, RecursiveMode::NonRecursive)?;
    tracing::debug!("Watching: {:?}", state.blog.content_dir);

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant = events.iter().any(|e| {
                    e.path
                        .extension()
                        .map(|ext| ext == "md")
                        .unwrap_or(false)
                });
                if !relevant {
                    continue;
                }

                match state.reload() {
                    Ok(count) => tracing::info!("Content changed, reloaded {} posts", count),
                    Err(e) => {
                        tracing::error!("Reload failed, keeping previous snapshot: {}", e)
                    }
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// A single post, with the render error when its body could not be rendered
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    #[serde(flatten)]
    pub post: Post,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render_error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub tag: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecentParams {
    pub n: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TrendingParams {
    pub window: Option<i64>,
}

async fn list_posts(State(state): State<Arc<ServerState>>) -> Json<Vec<Post>> {
    Json(state.snapshot().get_all().to_vec())
}

async fn list_slugs(State(state): State<Arc<ServerState>>) -> Json<Vec<String>> {
    Json(state.snapshot().list_slugs().to_vec())
}

async fn get_post(State(state): State<Arc<ServerState>>, Path(slug): Path<String>) -> Response {
    let repo = state.snapshot();

    // Highlighting is CPU bound; keep it off the async workers
    let rendered = {
        let state = state.clone();
        let repo = repo.clone();
        let slug = slug.clone();
        tokio::task::spawn_blocking(move || state.cache.get_with_html(&repo, &slug)).await
    };
    let rendered = match rendered {
        Ok(rendered) => rendered,
        Err(e) => {
            tracing::error!("Render task failed for {}: {}", slug, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: "render task failed".to_string(),
                }),
            )
                .into_response();
        }
    };

    match rendered {
        Ok(Some(post)) => Json(PostResponse {
            post,
            render_error: None,
        })
        .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorBody {
                error: format!("Post not found: {}", slug),
            }),
        )
            .into_response(),
        // The post exists; serve its metadata without a body
        Err(e) => match repo.get_by_slug(&slug) {
            Some(post) => Json(PostResponse {
                post: post.clone(),
                render_error: Some(e.to_string()),
            })
            .into_response(),
            None => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: e.to_string(),
                }),
            )
                .into_response(),
        },
    }
}

async fn search_posts(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<Post>> {
    let repo = state.snapshot();
    let tagged = filter_by_tag(repo.get_all(), &params.tag);
    Json(search(tagged, &params.q).into_iter().cloned().collect())
}

async fn recent_posts(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<RecentParams>,
) -> Json<Vec<Post>> {
    Json(state.snapshot().get_recent(params.n).to_vec())
}

async fn list_tags(State(state): State<Arc<ServerState>>) -> Json<Vec<String>> {
    Json(all_tags(state.snapshot().get_all()))
}

async fn trending_tags(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<TrendingParams>,
) -> Json<Vec<TagCount>> {
    Json(state.snapshot().get_trending_tags(params.window))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::markdown::FailingRenderer;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Arc<ServerState>) {
        let dir = TempDir::new().unwrap();
        let posts = dir.path().join("content/posts");
        fs::create_dir_all(&posts).unwrap();
        fs::write(
            posts.join("rust-async.md"),
            "---\ntitle: Async Rust\ndate: 2024-02-01\ntags: [rust, async]\n---\n![Executor](exec.png)\n",
        )
        .unwrap();
        fs::write(
            posts.join("go-channels.md"),
            "---\ntitle: Go Channels\ndate: 2024-01-05\ntags: [go]\n---\nCSP.\n",
        )
        .unwrap();

        let blog = Blog::new(dir.path()).unwrap();
        let repo = blog.load().unwrap();
        (dir, Arc::new(ServerState::new(blog, repo)))
    }

    #[tokio::test]
    async fn test_list_and_recent() {
        let (_dir, state) = setup();
        let Json(posts) = list_posts(State(state.clone())).await;
        let slugs: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["rust-async", "go-channels"]);

        let Json(recent) = recent_posts(State(state.clone()), Query(RecentParams { n: Some(-1) })).await;
        assert!(recent.is_empty());

        let Json(slugs) = list_slugs(State(state)).await;
        assert_eq!(slugs, vec!["go-channels", "rust-async"]);
    }

    #[tokio::test]
    async fn test_get_post() {
        let (_dir, state) = setup();
        let response = get_post(State(state.clone()), Path("rust-async".to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = get_post(State(state), Path("missing".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_get_post_bodies() {
        let (_dir, state) = setup();
        let response = get_post(State(state.clone()), Path("rust-async".to_string())).await;
        let json = body_json(response).await;
        assert_eq!(json["title"], "Async Rust");
        assert!(json["htmlContent"]
            .as_str()
            .unwrap()
            .contains("<figcaption class=\"image-caption\">Executor</figcaption>"));
        assert!(json.get("renderError").is_none());

        let response = get_post(State(state), Path("missing".to_string())).await;
        let json = body_json(response).await;
        assert_eq!(json["error"], "Post not found: missing");
    }

    #[tokio::test]
    async fn test_render_failure_serves_metadata() {
        let (dir, _) = setup();
        let blog = Blog::new(dir.path()).unwrap();
        let repo = Repository::load_with_renderer(
            &blog.source(),
            &blog.config,
            Arc::new(FailingRenderer),
        )
        .unwrap();
        let state = Arc::new(ServerState::new(blog, repo));

        let response = get_post(State(state.clone()), Path("go-channels".to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["slug"], "go-channels");
        assert_eq!(json["title"], "Go Channels");
        assert!(json.get("htmlContent").is_none());
        assert!(json["renderError"]
            .as_str()
            .unwrap()
            .contains("highlight stage"));

        let response = get_post(State(state), Path("missing".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_reload_evicts_removed_posts() {
        let (dir, state) = setup();
        get_post(State(state.clone()), Path("go-channels".to_string())).await;
        get_post(State(state.clone()), Path("rust-async".to_string())).await;
        assert_eq!(state.cache.len(), 2);

        fs::remove_file(dir.path().join("content/posts/go-channels.md")).unwrap();
        assert_eq!(state.reload().unwrap(), 1);
        assert_eq!(state.cache.len(), 1);
    }

    #[tokio::test]
    async fn test_search_and_tags() {
        let (_dir, state) = setup();
        let Json(found) = search_posts(
            State(state.clone()),
            Query(SearchParams {
                q: "csp".to_string(),
                tag: String::new(),
            }),
        )
        .await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].slug, "go-channels");

        let Json(found) = search_posts(
            State(state.clone()),
            Query(SearchParams {
                q: String::new(),
                tag: "RUST".to_string(),
            }),
        )
        .await;
        assert_eq!(found.len(), 1);

        let Json(trending) =
            trending_tags(State(state.clone()), Query(TrendingParams { window: Some(1) })).await;
        assert_eq!(trending.len(), 2);
        assert_eq!(trending[0].tag, "rust");

        let Json(tags) = list_tags(State(state)).await;
        assert_eq!(tags, vec!["async", "go", "rust"]);
    }

    #[tokio::test]
    async fn test_reload_swaps_snapshot() {
        let (dir, state) = setup();
        let before = state.snapshot();

        fs::write(
            dir.path().join("content/posts/wasm.md"),
            "---\ntitle: Wasm\ndate: 2024-03-01\n---\nNew.\n",
        )
        .unwrap();
        assert_eq!(state.reload().unwrap(), 3);

        assert_eq!(before.len(), 2);
        assert_eq!(state.snapshot().get_all()[0].slug, "wasm");
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_snapshot() {
        let (dir, state) = setup();
        fs::remove_dir_all(dir.path().join("content/posts")).unwrap();
        assert!(state.reload().is_err());
        assert_eq!(state.snapshot().len(), 2);
    }

    #[test]
    fn test_post_response_shape() {
        let post = Post::from_document("p", "---\ntitle: P\n---\nx", &Default::default());
        let json = serde_json::to_value(PostResponse {
            post,
            render_error: Some("boom".to_string()),
        })
        .unwrap();
        assert_eq!(json["slug"], "p");
        assert_eq!(json["renderError"], "boom");
        assert!(json.get("htmlContent").is_none());
    }
}
