use std::{
    convert::Infallible,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::{Form, OriginalUri, Path, Query, State},
    http::{StatusCode, Uri, header},
    response::{
        Html, IntoResponse, Redirect, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::Stream;
use serde::Deserialize;
use tokio_stream::{StreamExt, wrappers::WatchStream};
use tracing::{info, warn};

use crate::{
    AppState,
    categories,
    error::AppResult,
    models::{MovieId, MovieSummary},
    templates::{self, Section},
};

const POSTER_SVG: &str = include_str!("../static/placeholder-poster.svg");
const BACKDROP_SVG: &str = include_str!("../static/placeholder-backdrop.svg");
const PROFILE_SVG: &str = include_str!("../static/placeholder-profile.svg");

pub async fn index(State(state): State<Arc<AppState>>, OriginalUri(uri): OriginalUri) -> Html<String> {
    let result = state.tmdb.popular_movies().await;
    let saved = state.watchlist.lock().await.snapshot();

    let (movies, error) = match result {
        Ok(movies) => (movies, None),
        Err(err) => {
            warn!(error = %err, "failed to fetch popular movies");
            (Vec::new(), Some("Failed to fetch popular movies. Please try again later."))
        },
    };

    let section = Section { title: Some("Popular Movies"), movies: &movies, error };
    Html(templates::home_page(&section, pick_hero(&movies), &saved, return_path(&uri)))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<SearchQuery>,
) -> Html<String> {
    const SEARCH_FAILED: &str = "An error occurred while searching. Please try again.";
    let query = params.q.trim();

    let (movies, people, movies_error, people_error) = if query.is_empty() {
        (Vec::new(), Vec::new(), None, None)
    } else {
        let (movies, people) =
            futures::join!(state.tmdb.search_movies(query), state.tmdb.search_people(query));

        let (movies, movies_error) = match movies {
            Ok(page) => (page.results, None),
            Err(err) => {
                warn!(query = %query, error = %err, "movie search failed");
                (Vec::new(), Some(SEARCH_FAILED))
            },
        };
        let (people, people_error) = match people {
            Ok(page) => (page.results, None),
            Err(err) => {
                warn!(query = %query, error = %err, "person search failed");
                (Vec::new(), Some(SEARCH_FAILED))
            },
        };
        (movies, people, movies_error, people_error)
    };

    let saved = state.watchlist.lock().await.snapshot();
    let section = Section { title: None, movies: &movies, error: movies_error };
    Html(templates::search_page(query, &section, &people, people_error, &saved, return_path(&uri)))
}

pub async fn categories(State(state): State<Arc<AppState>>) -> Html<String> {
    let count = state.watchlist.lock().await.len();
    Html(templates::categories_page(count))
}

pub async fn category(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    Path(slug): Path<String>,
) -> Html<String> {
    let result = state.tmdb.movies_by_category(&slug).await;
    let saved = state.watchlist.lock().await.snapshot();

    let (movies, error) = match result {
        Ok(movies) => (movies, None),
        Err(err) => {
            warn!(slug = %slug, error = %err, "failed to fetch category");
            (Vec::new(), Some("Failed to fetch movies. Please try again later."))
        },
    };

    let section = Section { title: None, movies: &movies, error };
    Html(templates::category_page(
        categories::title_for_slug(&slug),
        &section,
        &saved,
        return_path(&uri),
    ))
}

pub async fn movie(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let Ok(id) = id.parse::<MovieId>() else {
        return Ok((StatusCode::NOT_FOUND, Html(templates::not_found_page())).into_response());
    };

    let detail = state.tmdb.movie_details(id).await?;
    let saved = state.watchlist.lock().await.snapshot();
    Ok(Html(templates::movie_page(&detail, &saved, return_path(&uri))).into_response())
}

pub async fn watchlist(State(state): State<Arc<AppState>>) -> Html<String> {
    let saved = state.watchlist.lock().await.snapshot();
    Html(templates::watchlist_page(&saved))
}

#[derive(Debug, Deserialize)]
pub struct AddForm {
    movie: String,
    #[serde(default)]
    return_to: String,
}

pub async fn add_to_watchlist(
    State(state): State<Arc<AppState>>,
    Form(form): Form<AddForm>,
) -> AppResult<Response> {
    let movie: MovieSummary = match serde_json::from_str(&form.movie) {
        Ok(movie) => movie,
        Err(err) => {
            warn!(error = %err, "rejected malformed watchlist payload");
            let body = templates::error_page("That movie could not be saved.", &err.to_string());
            return Ok((StatusCode::BAD_REQUEST, Html(body)).into_response());
        },
    };

    let movie_id = movie.id;
    if state.watchlist.lock().await.add(movie).await? {
        info!(movie_id, "added to watchlist");
    }
    Ok(Redirect::to(safe_return(&form.return_to)).into_response())
}

#[derive(Debug, Deserialize)]
pub struct RemoveForm {
    id: MovieId,
    #[serde(default)]
    return_to: String,
}

pub async fn remove_from_watchlist(
    State(state): State<Arc<AppState>>,
    Form(form): Form<RemoveForm>,
) -> AppResult<Redirect> {
    if state.watchlist.lock().await.remove(form.id).await? {
        info!(movie_id = form.id, "removed from watchlist");
    }
    Ok(Redirect::to(safe_return(&form.return_to)))
}

pub async fn clear_watchlist(State(state): State<Arc<AppState>>) -> AppResult<Redirect> {
    let cleared = state.watchlist.lock().await.clear().await?;
    info!(cleared, "cleared watchlist");
    Ok(Redirect::to("/watchlist"))
}

/// Streams the watchlist size, starting with the current value.
pub async fn watchlist_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.watchlist.lock().await.subscribe();
    let stream = WatchStream::new(rx)
        .map(|movies| Ok(Event::default().data(movies.len().to_string())));
    Sse::new(stream).keep_alive(KeepAlive::default())
}

pub async fn static_file(Path(name): Path<String>) -> Response {
    let body = match name.as_str() {
        "placeholder-poster.svg" => POSTER_SVG,
        "placeholder-backdrop.svg" => BACKDROP_SVG,
        "placeholder-profile.svg" => PROFILE_SVG,
        _ => return StatusCode::NOT_FOUND.into_response(),
    };
    (
        [(header::CONTENT_TYPE, "image/svg+xml"), (header::CACHE_CONTROL, "public, max-age=86400")],
        body,
    )
        .into_response()
}

fn return_path(uri: &Uri) -> &str {
    uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/")
}

/// Only local paths are allowed as redirect targets. Browsers drop tabs and
/// newlines from URLs, so anything but visible ASCII is refused outright.
fn safe_return(target: &str) -> &str {
    let mut bytes = target.bytes();
    let local = bytes.next() == Some(b'/')
        && !matches!(bytes.next(), Some(b'/' | b'\\'))
        && target.bytes().all(|b| b.is_ascii_graphic());
    if local { target } else { "/" }
}

/// Random pick among the first five movies for the hero section.
fn pick_hero(movies: &[MovieSummary]) -> Option<&MovieSummary> {
    let candidates = &movies[..movies.len().min(5)];
    if candidates.is_empty() {
        return None;
    }
    let nanos =
        SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.subsec_nanos() as usize).unwrap_or(0);
    candidates.get(nanos % candidates.len())
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, header::CONTENT_TYPE},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::{
        db,
        models::sample_movie,
        storage::SqliteStorage,
        tmdb::{Credentials, TmdbClient},
        watchlist::WatchlistStore,
    };

    async fn test_app() -> (Router, Arc<AppState>) {
        let db = db::connect_and_migrate("sqlite::memory:").await.unwrap();
        let watchlist = WatchlistStore::hydrate(SqliteStorage::new(db)).await.unwrap();
        let tmdb = TmdbClient::new(
            reqwest::Client::new(),
            Credentials::Missing,
            "http://127.0.0.1:9".to_string(),
            "en-US".to_string(),
            4,
        );
        let state = Arc::new(AppState::new(tmdb, watchlist));
        (crate::app(state.clone()), state)
    }

    async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
        let resp = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn post_form(app: &Router, uri: &str, body: String) -> Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    fn add_body(movie: &MovieSummary, return_to: &str) -> String {
        let json = serde_json::to_string(movie).unwrap();
        format!(
            "movie={}&return_to={}",
            urlencoding::encode(&json),
            urlencoding::encode(return_to)
        )
    }

    fn location(resp: &Response) -> &str {
        resp.headers().get(header::LOCATION).unwrap().to_str().unwrap()
    }

    #[tokio::test]
    async fn empty_watchlist_page() {
        let (app, _) = test_app().await;

        let (status, body) = get(&app, "/watchlist").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Your watchlist is empty"));
    }

    #[tokio::test]
    async fn add_then_remove_through_forms() {
        let (app, state) = test_app().await;
        let movie = sample_movie(42, "Answer");

        let resp = post_form(&app, "/watchlist/add", add_body(&movie, "/watchlist")).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/watchlist");
        assert!(state.watchlist.lock().await.contains(42));

        let (_, body) = get(&app, "/watchlist").await;
        assert!(body.contains("Answer"));
        assert!(body.contains("/watchlist/clear"));

        let resp = post_form(&app, "/watchlist/remove", "id=42&return_to=%2Fmovie%2F42".to_string()).await;
        assert_eq!(location(&resp), "/movie/42");
        assert!(!state.watchlist.lock().await.contains(42));
    }

    #[tokio::test]
    async fn repeated_add_keeps_one_entry() {
        let (app, state) = test_app().await;
        let movie = sample_movie(7, "Seven");

        post_form(&app, "/watchlist/add", add_body(&movie, "/")).await;
        post_form(&app, "/watchlist/add", add_body(&movie, "/")).await;

        assert_eq!(state.watchlist.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn watchlist_survives_rehydration_from_the_same_database() {
        let db = db::connect_and_migrate("sqlite::memory:").await.unwrap();
        let mut store = WatchlistStore::hydrate(SqliteStorage::new(db.clone())).await.unwrap();
        store.add(sample_movie(1, "Test Movie")).await.unwrap();
        store.add(sample_movie(2, "Second")).await.unwrap();
        store.remove(1).await.unwrap();

        let reloaded = WatchlistStore::hydrate(SqliteStorage::new(db)).await.unwrap();

        assert_eq!(reloaded.snapshot(), store.snapshot());
    }

    #[tokio::test]
    async fn clear_empties_the_watchlist() {
        let (app, state) = test_app().await;
        for id in [1, 2] {
            post_form(&app, "/watchlist/add", add_body(&sample_movie(id, "Any"), "/")).await;
        }

        let resp = post_form(&app, "/watchlist/clear", String::new()).await;

        assert_eq!(location(&resp), "/watchlist");
        assert!(state.watchlist.lock().await.is_empty());
    }

    #[tokio::test]
    async fn malformed_payload_is_rejected() {
        let (app, state) = test_app().await;

        let resp = post_form(&app, "/watchlist/add", "movie=%7Bnope&return_to=%2F".to_string()).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(state.watchlist.lock().await.is_empty());
    }

    #[tokio::test]
    async fn external_return_targets_redirect_home() {
        let (app, _) = test_app().await;

        for target in ["https://evil.example", "//evil.example", "", "/\t/evil.example", "/\r\nx"] {
            let resp = post_form(&app, "/watchlist/add", add_body(&sample_movie(1, "x"), target)).await;
            assert_eq!(resp.status(), StatusCode::SEE_OTHER);
            assert_eq!(location(&resp), "/");
        }

        let resp =
            post_form(&app, "/watchlist/remove", "id=1&return_to=%2F%09%2Fevil.example".to_string()).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/");
    }

    #[tokio::test]
    async fn gateway_failure_renders_inline_error() {
        let (app, _) = test_app().await;

        let (status, body) = get(&app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Failed to fetch popular movies. Please try again later."));

        let (status, body) = get(&app, "/category/feel-good").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Feel Good Movies"));
        assert!(body.contains("Failed to fetch movies."));

        let (_, body) = get(&app, "/search?q=matrix").await;
        assert!(body.contains("An error occurred while searching."));
    }

    #[tokio::test]
    async fn movie_page_errors() {
        let (app, _) = test_app().await;

        let (status, body) = get(&app, "/movie/not-a-number").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Movie not found"));

        let (status, _) = get(&app, "/movie/550").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn empty_search_skips_the_catalog() {
        let (app, _) = test_app().await;

        let (status, body) = get(&app, "/search?q=%20").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("No results found"));
        assert!(!body.contains("An error occurred"));
    }

    #[tokio::test]
    async fn categories_index_lists_all_moods() {
        let (app, _) = test_app().await;

        let (_, body) = get(&app, "/categories").await;

        for slug in ["feel-good", "action-fix", "mind-benders"] {
            assert!(body.contains(&format!("/category/{slug}")));
        }
    }

    #[tokio::test]
    async fn placeholders_are_served() {
        let (app, _) = test_app().await;

        let resp = app
            .clone()
            .oneshot(
                Request::builder().uri("/static/placeholder-poster.svg").body(Body::empty()).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(CONTENT_TYPE).unwrap(), "image/svg+xml");

        let (status, _) = get(&app, "/static/secrets.txt").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn events_endpoint_is_an_sse_stream() {
        let (app, _) = test_app().await;

        let resp = app
            .clone()
            .oneshot(Request::builder().uri("/watchlist/events").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(CONTENT_TYPE).unwrap(), "text/event-stream");
    }

    #[test]
    fn safe_return_only_allows_local_paths() {
        assert_eq!(safe_return("/search?q=a"), "/search?q=a");
        assert_eq!(safe_return("/\\evil"), "/");
        assert_eq!(safe_return("movie/1"), "/");
        assert_eq!(safe_return("/\t/evil.example"), "/");
        assert_eq!(safe_return("/\n/evil.example"), "/");
        assert_eq!(safe_return("/ok\r\nSet-Cookie: x"), "/");
        assert_eq!(safe_return("/café"), "/");
        assert_eq!(safe_return("/"), "/");
    }

    #[test]
    fn hero_comes_from_the_first_five() {
        let movies: Vec<_> = (1..=8).map(|id| sample_movie(id, "m")).collect();
        let hero = pick_hero(&movies).unwrap();
        assert!((1..=5).contains(&hero.id));
        assert!(pick_hero(&[]).is_none());
    }
}
