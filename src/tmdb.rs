use crate::error::{CatalogError, CatalogResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Client};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const TMDB_BASE: &str = "https://api.themoviedb.org/3";
const LANGUAGE: &str = "en-US";

/// Read access to the TMDB catalog. The bearer token is passed on every call.
#[async_trait]
pub trait TmdbApi: Send + Sync {
    async fn search_movies(&self, token: &str, query: &str) -> CatalogResult<Vec<MovieSummary>>;
    async fn search_people(&self, token: &str, query: &str) -> CatalogResult<Vec<PersonSummary>>;
    async fn movie_details(&self, token: &str, id: i64) -> CatalogResult<MovieDetails>;
    async fn movie_credits(&self, token: &str, id: i64) -> CatalogResult<Credits>;
    async fn person_details(&self, token: &str, id: i64) -> CatalogResult<PersonDetails>;
    async fn person_credits(&self, token: &str, id: i64) -> CatalogResult<Credits>;
}

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    base: String,
    include_adult: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovieSummary {
    pub id: i64,
    pub title: String,
    pub original_title: String,
    pub poster_path: Option<String>,
    pub popularity: f64,
    pub release_date: Option<String>,
}

impl MovieSummary {
    /// Original-language title, or the localized one when TMDB has none.
    pub fn display_title(&self) -> &str {
        if self.original_title.is_empty() {
            &self.title
        } else {
            &self.original_title
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    #[serde(flatten)]
    pub summary: MovieSummary,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub runtime: Option<i64>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub revenue: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonSummary {
    pub id: i64,
    pub name: String,
    pub profile_path: Option<String>,
    pub popularity: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonDetails {
    pub id: i64,
    pub name: String,
    pub profile_path: Option<String>,
    pub birthday: Option<String>,
    pub deathday: Option<String>,
    pub biography: Option<String>,
    pub known_for_department: Option<String>,
    pub homepage: Option<String>,
    pub place_of_birth: Option<String>,
}

/// One edge between a movie and a person, seen from either side.
///
/// For a movie's cast `id` is the person and `release_date` is always `None`;
/// for a person's filmography `id` is the movie.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CastCredit {
    pub id: i64,
    pub name: String,
    pub image_path: Option<String>,
    pub release_date: Option<String>,
    pub popularity: f64,
    pub character: Option<String>,
}

/// Credits of one entity, with the entity's own id echoed back by TMDB.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Credits {
    pub id: i64,
    pub cast: Vec<CastCredit>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct MovieCreditsResponse {
    #[serde(default)]
    id: i64,
    #[serde(default)]
    cast: Vec<MovieCastMember>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MovieCastMember {
    id: i64,
    name: String,
    profile_path: Option<String>,
    popularity: f64,
    character: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PersonCreditsResponse {
    #[serde(default)]
    id: i64,
    #[serde(default)]
    cast: Vec<PersonMovieCredit>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PersonMovieCredit {
    id: i64,
    title: String,
    original_title: String,
    poster_path: Option<String>,
    release_date: Option<String>,
    popularity: f64,
    character: Option<String>,
}

impl From<MovieCastMember> for CastCredit {
    fn from(member: MovieCastMember) -> Self {
        Self {
            id: member.id,
            name: member.name,
            image_path: member.profile_path,
            release_date: None,
            popularity: member.popularity,
            character: member.character,
        }
    }
}

impl From<PersonMovieCredit> for CastCredit {
    fn from(credit: PersonMovieCredit) -> Self {
        let name = if credit.original_title.is_empty() {
            credit.title
        } else {
            credit.original_title
        };
        Self {
            id: credit.id,
            name,
            image_path: credit.poster_path,
            release_date: credit.release_date,
            popularity: credit.popularity,
            character: credit.character,
        }
    }
}

impl TmdbClient {
    pub fn new(base: impl Into<String>, include_adult: bool) -> Result<Self> {
        let user_agent = format!("blunt/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(20))
            .user_agent(user_agent)
            .build()
            .context("Failed to build TMDB HTTP client")?;
        Ok(Self {
            client,
            base: base.into().trim_end_matches('/').to_string(),
            include_adult,
        })
    }

    fn search_query(&self, query: &str) -> String {
        format!(
            "query={}&include_adult={}&language={LANGUAGE}&page=1",
            urlencoding::encode(query),
            self.include_adult
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
        query: &str,
    ) -> CatalogResult<T> {
        if token.trim().is_empty() {
            return Err(CatalogError::MissingCredential);
        }
        let url = format!("{}{path}?{query}", self.base);
        debug!(path, "TMDB request");

        let res = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .send()
            .await
            .map_err(|source| CatalogError::Transport {
                url: url.clone(),
                source,
            })?;
        let status = res.status();
        let text = res.text().await.map_err(|source| CatalogError::Transport {
            url: url.clone(),
            source,
        })?;
        if !status.is_success() {
            return Err(CatalogError::Status {
                url,
                status,
                body: text,
            });
        }
        serde_json::from_str(&text).map_err(|source| CatalogError::Decode { url, source })
    }
}

#[async_trait]
impl TmdbApi for TmdbClient {
    async fn search_movies(&self, token: &str, query: &str) -> CatalogResult<Vec<MovieSummary>> {
        let data: SearchResponse<MovieSummary> = self
            .get_json(token, "/search/movie", &self.search_query(query))
            .await?;
        Ok(data.results)
    }

    async fn search_people(&self, token: &str, query: &str) -> CatalogResult<Vec<PersonSummary>> {
        let data: SearchResponse<PersonSummary> = self
            .get_json(token, "/search/person", &self.search_query(query))
            .await?;
        Ok(data.results)
    }

    async fn movie_details(&self, token: &str, id: i64) -> CatalogResult<MovieDetails> {
        self.get_json(token, &format!("/movie/{id}"), &format!("language={LANGUAGE}"))
            .await
    }

    async fn movie_credits(&self, token: &str, id: i64) -> CatalogResult<Credits> {
        let data: MovieCreditsResponse = self
            .get_json(
                token,
                &format!("/movie/{id}/credits"),
                &format!("language={LANGUAGE}"),
            )
            .await?;
        Ok(Credits {
            id: data.id,
            cast: data.cast.into_iter().map(CastCredit::from).collect(),
        })
    }

    async fn person_details(&self, token: &str, id: i64) -> CatalogResult<PersonDetails> {
        self.get_json(token, &format!("/person/{id}"), &format!("language={LANGUAGE}"))
            .await
    }

    async fn person_credits(&self, token: &str, id: i64) -> CatalogResult<Credits> {
        let data: PersonCreditsResponse = self
            .get_json(
                token,
                &format!("/person/{id}/movie_credits"),
                &format!("language={LANGUAGE}"),
            )
            .await?;
        Ok(Credits {
            id: data.id,
            cast: data.cast.into_iter().map(CastCredit::from).collect(),
        })
    }
}

pub fn parse_tmdb_id(input: &str) -> Option<i64> {
    if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
        return input.parse().ok();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_tmdb_id_only_for_digits() {
        assert_eq!(parse_tmdb_id("603"), Some(603));
        assert_eq!(parse_tmdb_id("tt0133093"), None);
        assert_eq!(parse_tmdb_id("-1"), None);
        assert_eq!(parse_tmdb_id(""), None);
    }

    #[test]
    fn movie_details_flatten_summary_fields() {
        let value = json!({
            "id": 603,
            "title": "The Matrix",
            "original_title": "The Matrix",
            "poster_path": null,
            "popularity": 83.5,
            "release_date": "1999-03-30",
            "tagline": null,
            "runtime": 136,
            "original_language": "en",
            "overview": "A hacker learns the truth.",
            "revenue": 463517383,
            "genres": [{ "id": 28, "name": "Action" }]
        });
        let details: MovieDetails = serde_json::from_value(value).expect("details deserialize");
        assert_eq!(details.summary.id, 603);
        assert_eq!(details.summary.poster_path, None);
        assert_eq!(details.summary.release_date.as_deref(), Some("1999-03-30"));
        assert_eq!(details.tagline, None);
        assert_eq!(details.runtime, Some(136));
        assert_eq!(details.revenue, 463517383);
    }

    #[test]
    fn movie_details_tolerate_null_text_fields() {
        let value = json!({
            "id": 1,
            "title": "Untitled",
            "original_title": "Untitled",
            "original_language": null,
            "overview": null,
            "runtime": null,
            "revenue": 0
        });
        let details: MovieDetails = serde_json::from_value(value).expect("details deserialize");
        assert_eq!(details.original_language, None);
        assert_eq!(details.overview, None);
        assert_eq!(details.runtime, None);
    }

    #[test]
    fn movie_cast_members_become_credits_without_dates() {
        let value = json!({
            "id": 603,
            "cast": [
                { "id": 6384, "name": "Keanu Reeves", "profile_path": "/k.jpg", "popularity": 40.1, "character": "Neo" },
                { "id": 2975, "name": "Laurence Fishburne", "profile_path": null, "popularity": 20.0 }
            ],
            "crew": []
        });
        let data: MovieCreditsResponse = serde_json::from_value(value).expect("credits deserialize");
        let cast: Vec<CastCredit> = data.cast.into_iter().map(CastCredit::from).collect();
        assert_eq!(data.id, 603);
        assert_eq!(cast[0].name, "Keanu Reeves");
        assert_eq!(cast[0].image_path.as_deref(), Some("/k.jpg"));
        assert_eq!(cast[0].character.as_deref(), Some("Neo"));
        assert_eq!(cast[1].image_path, None);
        assert!(cast.iter().all(|c| c.release_date.is_none()));
    }

    #[test]
    fn person_credits_prefer_original_title() {
        let value = json!({
            "id": 6384,
            "cast": [
                { "id": 1, "title": "Localized", "original_title": "Original", "poster_path": "/p.jpg", "release_date": "2003-05-15", "popularity": 5.0 },
                { "id": 2, "title": "Only Title", "release_date": "" }
            ]
        });
        let data: PersonCreditsResponse = serde_json::from_value(value).expect("credits deserialize");
        let cast: Vec<CastCredit> = data.cast.into_iter().map(CastCredit::from).collect();
        assert_eq!(cast[0].name, "Original");
        assert_eq!(cast[0].image_path.as_deref(), Some("/p.jpg"));
        assert_eq!(cast[1].name, "Only Title");
        assert_eq!(cast[1].release_date.as_deref(), Some(""));
        assert_eq!(cast[1].popularity, 0.0);
    }

    #[test]
    fn search_results_default_to_empty() {
        let data: SearchResponse<PersonSummary> =
            serde_json::from_value(json!({ "page": 1 })).expect("search deserialize");
        assert!(data.results.is_empty());
    }

    #[test]
    fn person_hits_ignore_fields_rows_do_not_show() {
        let data: SearchResponse<PersonSummary> = serde_json::from_value(json!({
            "results": [{
                "id": 6384,
                "name": "Keanu Reeves",
                "profile_path": "/keanu.jpg",
                "popularity": 55.0,
                "known_for_department": "Acting",
                "known_for": [{ "id": 603 }]
            }]
        }))
        .expect("search deserialize");
        assert_eq!(
            data.results,
            vec![PersonSummary {
                id: 6384,
                name: "Keanu Reeves".to_string(),
                profile_path: Some("/keanu.jpg".to_string()),
                popularity: 55.0,
            }]
        );
    }
}
