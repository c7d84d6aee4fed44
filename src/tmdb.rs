use std::{num::NonZeroU32, sync::Arc};

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    categories::Category,
    models::{MovieDetail, MovieId, MovieSummary, Person, SearchResults},
};

const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

pub const POSTER_PLACEHOLDER: &str = "/static/placeholder-poster.svg";
pub const BACKDROP_PLACEHOLDER: &str = "/static/placeholder-backdrop.svg";
pub const PROFILE_PLACEHOLDER: &str = "/static/placeholder-profile.svg";

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("TMDB credentials are not configured")]
    MissingCredentials,
    #[error("movie {0} not found")]
    NotFound(MovieId),
    #[error("TMDB request failed: {0}")]
    Http(#[from] reqwest::Error),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Clone, Debug)]
pub enum Credentials {
    AccessToken(String),
    ApiKey(String),
    Missing,
}

impl Credentials {
    /// A v4 read access token wins over a v3 api key when both are set.
    pub fn from_parts(access_token: &str, api_key: &str) -> Self {
        if !access_token.trim().is_empty() {
            Credentials::AccessToken(access_token.trim().to_string())
        } else if !api_key.trim().is_empty() {
            Credentials::ApiKey(api_key.trim().to_string())
        } else {
            Credentials::Missing
        }
    }
}

pub struct TmdbClient {
    client: reqwest::Client,
    credentials: Credentials,
    base_url: String,
    language: String,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl TmdbClient {
    pub fn new(
        client: reqwest::Client,
        credentials: Credentials,
        base_url: String,
        language: String,
        rps: u32,
    ) -> Self {
        if matches!(credentials, Credentials::Missing) {
            tracing::warn!("no TMDB_ACCESS_TOKEN or TMDB_API_KEY provided, catalog pages will fail");
        }

        let rps = NonZeroU32::new(rps).unwrap_or(NonZeroU32::MIN);
        let limiter = Arc::new(RateLimiter::direct(Quota::per_second(rps)));
        Self { client, credentials, base_url, language, limiter }
    }

    pub async fn popular_movies(&self) -> GatewayResult<Vec<MovieSummary>> {
        let page: SearchResults<MovieSummary> = self.get("/movie/popular", &[]).await?;
        debug!(count = page.results.len(), "fetched popular movies");
        Ok(page.results)
    }

    /// Unknown slugs fall back to the popular list.
    pub async fn movies_by_category(&self, slug: &str) -> GatewayResult<Vec<MovieSummary>> {
        let Some(category) = Category::from_slug(slug) else {
            debug!(slug = %slug, "unknown category, using popular movies");
            return self.popular_movies().await;
        };

        let page: SearchResults<MovieSummary> =
            self.get("/discover/movie", &category.discover_params()).await?;
        debug!(slug = %slug, count = page.results.len(), "fetched category movies");
        Ok(page.results)
    }

    pub async fn search_movies(&self, query: &str) -> GatewayResult<SearchResults<MovieSummary>> {
        let results: SearchResults<MovieSummary> =
            self.get("/search/movie", &search_params(query)).await?;
        debug!(query = %query, total = results.total_results, "searched movies");
        Ok(results)
    }

    pub async fn search_people(&self, query: &str) -> GatewayResult<SearchResults<Person>> {
        let results: SearchResults<Person> =
            self.get("/search/person", &search_params(query)).await?;
        debug!(query = %query, total = results.total_results, "searched people");
        Ok(results)
    }

    pub async fn movie_details(&self, id: MovieId) -> GatewayResult<MovieDetail> {
        let resp = self
            .send(
                &format!("/movie/{id}"),
                &[("append_to_response", "videos,credits,similar".to_string())],
            )
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound(id));
        }

        let detail: MovieDetail = resp.error_for_status()?.json().await?;
        debug!(movie_id = id, title = %detail.title, "fetched movie details");
        Ok(detail)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> GatewayResult<T> {
        let resp = self.send(path, params).await?;
        Ok(resp.error_for_status()?.json().await?)
    }

    async fn send(&self, path: &str, params: &[(&str, String)]) -> GatewayResult<reqwest::Response> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let req = self.client.get(url).query(&[("language", self.language.as_str())]);
        let req = match &self.credentials {
            Credentials::AccessToken(token) => req.bearer_auth(token),
            Credentials::ApiKey(key) => req.query(&[("api_key", key.as_str())]),
            Credentials::Missing => return Err(GatewayError::MissingCredentials),
        };

        self.limiter.until_ready().await;
        debug!(path = %path, "TMDB request");
        Ok(req.query(params).send().await?)
    }
}

fn search_params(query: &str) -> [(&'static str, String); 2] {
    [("query", query.to_string()), ("include_adult", "false".to_string())]
}

fn image_url(path: Option<&str>, size: &str, placeholder: &str) -> String {
    match path.filter(|p| !p.is_empty()) {
        Some(path) => format!("{IMAGE_BASE_URL}/{size}{path}"),
        None => placeholder.to_string(),
    }
}

pub fn poster_url(path: Option<&str>) -> String {
    image_url(path, "w500", POSTER_PLACEHOLDER)
}

pub fn backdrop_url(path: Option<&str>) -> String {
    image_url(path, "original", BACKDROP_PLACEHOLDER)
}

pub fn profile_url(path: Option<&str>) -> String {
    image_url(path, "w185", PROFILE_PLACEHOLDER)
}
