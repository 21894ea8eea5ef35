pub mod app;
pub mod favorites;
pub mod models;
pub mod notify;
pub mod storage;
pub mod tmdb;
