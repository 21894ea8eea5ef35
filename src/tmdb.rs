use crate::models::{Genre, MovieListing, Page, TvListing};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::env;

const TMDB_BASE: &str = "https://api.themoviedb.org/3";

/// Grid sort orders offered by the UI. The upstream `sort_by` value differs
/// per media kind because movies and TV name their date and title fields
/// differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Popularity,
    Rating,
    Newest,
    Alphabetical,
}

impl SortKey {
    pub fn movie_param(self) -> &'static str {
        match self {
            SortKey::Popularity => "popularity.desc",
            SortKey::Rating => "vote_average.desc",
            SortKey::Newest => "release_date.desc",
            SortKey::Alphabetical => "title.asc",
        }
    }

    pub fn tv_param(self) -> &'static str {
        match self {
            SortKey::Popularity => "popularity.desc",
            SortKey::Rating => "vote_average.desc",
            SortKey::Newest => "first_air_date.desc",
            SortKey::Alphabetical => "name.asc",
        }
    }
}

/// Pagination, sort and filter parameters forwarded to the catalog API.
/// Pagination and ranking are entirely owned upstream; this side only
/// shapes the request.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct DiscoverFilter {
    pub page: u32,
    pub sort: SortKey,
    pub genre: Option<i32>,
    pub year: Option<i32>,
    pub min_rating: Option<f32>,
}

impl Default for DiscoverFilter {
    fn default() -> Self {
        Self {
            page: 1,
            sort: SortKey::default(),
            genre: None,
            year: None,
            min_rating: None,
        }
    }
}

/// The consumed catalog boundary: an opaque request/response seam, kept as a
/// trait so tests can substitute a fake.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn discover_movies(&self, filter: &DiscoverFilter) -> Result<Page<MovieListing>>;
    async fn discover_tv(&self, filter: &DiscoverFilter) -> Result<Page<TvListing>>;
    async fn search_movies(&self, query: &str, page: u32) -> Result<Page<MovieListing>>;
    async fn search_tv(&self, query: &str, page: u32) -> Result<Page<TvListing>>;
    async fn movie_genres(&self) -> Result<Vec<Genre>>;
    async fn tv_genres(&self) -> Result<Vec<Genre>>;
}

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    api_key: String,
}

impl TmdbClient {
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("TMDB_API_KEY").context("TMDB_API_KEY not set")?;
        Ok(Self {
            client: Client::new(),
            api_key,
        })
    }

    fn discover_url(&self, kind: &str, filter: &DiscoverFilter) -> String {
        let sort = if kind == "movie" {
            filter.sort.movie_param()
        } else {
            filter.sort.tv_param()
        };
        let mut url = format!(
            "{TMDB_BASE}/discover/{kind}?api_key={}&page={}&sort_by={sort}",
            self.api_key, filter.page
        );
        if let Some(genre) = filter.genre {
            url.push_str(&format!("&with_genres={genre}"));
        }
        if let Some(year) = filter.year {
            let param = if kind == "movie" {
                "primary_release_year"
            } else {
                "first_air_date_year"
            };
            url.push_str(&format!("&{param}={year}"));
        }
        if let Some(min) = filter.min_rating {
            url.push_str(&format!("&vote_average.gte={min}"));
        }
        url
    }

    fn search_url(&self, kind: &str, query: &str, page: u32) -> String {
        format!(
            "{TMDB_BASE}/search/{kind}?api_key={}&query={}&page={page}",
            self.api_key,
            urlencoding::encode(query)
        )
    }

    async fn genre_list(&self, kind: &str) -> Result<Vec<Genre>> {
        #[derive(Deserialize)]
        struct GenreList {
            genres: Vec<Genre>,
        }

        let url = format!("{TMDB_BASE}/genre/{kind}/list?api_key={}", self.api_key);
        let data: GenreList = self.get_json(&url).await?;
        Ok(data.genres)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T> {
        let res = self
            .client
            .get(url)
            .send()
            .await
            .context("request failed")?;
        let status = res.status();
        let text = res.text().await.context("reading body failed")?;
        if !status.is_success() {
            return Err(anyhow!("{} -> {}", url, text));
        }
        let parsed: T = serde_json::from_str(&text).context("JSON parse failed")?;
        Ok(parsed)
    }
}

#[async_trait]
impl CatalogApi for TmdbClient {
    async fn discover_movies(&self, filter: &DiscoverFilter) -> Result<Page<MovieListing>> {
        self.get_json(&self.discover_url("movie", filter)).await
    }

    async fn discover_tv(&self, filter: &DiscoverFilter) -> Result<Page<TvListing>> {
        self.get_json(&self.discover_url("tv", filter)).await
    }

    async fn search_movies(&self, query: &str, page: u32) -> Result<Page<MovieListing>> {
        self.get_json(&self.search_url("movie", query, page)).await
    }

    async fn search_tv(&self, query: &str, page: u32) -> Result<Page<TvListing>> {
        self.get_json(&self.search_url("tv", query, page)).await
    }

    async fn movie_genres(&self) -> Result<Vec<Genre>> {
        self.genre_list("movie").await
    }

    async fn tv_genres(&self) -> Result<Vec<Genre>> {
        self.genre_list("tv").await
    }
}
