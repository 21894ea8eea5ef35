use serde::{Deserialize, Serialize};

/// Grid posters are served at w500; the player backdrop wants w1920.
pub const POSTER_BASE: &str = "https://image.tmdb.org/t/p/w500";
pub const BACKDROP_BASE: &str = "https://image.tmdb.org/t/p/w1920";

/// Discriminates a movie entry from a TV entry. Always set by the caller
/// before insertion; the store never infers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

/// One page of catalog results as the upstream API ships it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub page: u32,
    pub results: Vec<T>,
    pub total_pages: u32,
    pub total_results: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

/// Raw movie record from the catalog API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieListing {
    pub id: i32,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f32,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
    #[serde(default)]
    pub popularity: f32,
    #[serde(default)]
    pub original_language: String,
}

/// Raw TV record. Same shape as a movie except for the `name` and
/// `first_air_date` field names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TvListing {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: f32,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
    #[serde(default)]
    pub popularity: f32,
    #[serde(default)]
    pub original_language: String,
}

/// Tagged union over the two catalog kinds. This is the normalization
/// boundary: callers submit either kind and it collapses into one canonical
/// [`FavoriteItem`] so the store never carries both naming conventions.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "media_type", rename_all = "lowercase")]
pub enum CatalogListing {
    Movie(MovieListing),
    Tv(TvListing),
}

/// Canonical favorites entry. `id` is the sole dedup key.
///
/// The aliases accept slot data written with the raw TV field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteItem {
    pub id: i32,
    pub media_type: MediaType,
    #[serde(alias = "name")]
    pub title: String,
    #[serde(default)]
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    #[serde(default, alias = "first_air_date")]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f32,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
}

impl From<CatalogListing> for FavoriteItem {
    fn from(listing: CatalogListing) -> Self {
        match listing {
            CatalogListing::Movie(movie) => FavoriteItem {
                id: movie.id,
                media_type: MediaType::Movie,
                title: movie.title,
                overview: movie.overview,
                poster_path: movie.poster_path,
                backdrop_path: movie.backdrop_path,
                release_date: movie.release_date,
                vote_average: movie.vote_average,
                genre_ids: movie.genre_ids,
            },
            CatalogListing::Tv(show) => FavoriteItem {
                id: show.id,
                media_type: MediaType::Tv,
                title: show.name,
                overview: show.overview,
                poster_path: show.poster_path,
                backdrop_path: show.backdrop_path,
                release_date: show.first_air_date,
                vote_average: show.vote_average,
                genre_ids: show.genre_ids,
            },
        }
    }
}
