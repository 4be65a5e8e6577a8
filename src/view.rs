//! Ordering and selection rules that turn catalog records into page models.

use crate::present::{non_empty, resolve_image_path, resolve_year};
use crate::tmdb::{CastCredit, Credits, MovieDetails, MovieSummary, PersonDetails, PersonSummary};
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Reverse;

pub const GRAPH_CHILDREN: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResultRow {
    pub href: String,
    pub image_path: String,
    pub name: String,
    pub year: String,
    pub popularity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphKind {
    Movie,
    Person,
}

impl GraphKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GraphKind::Movie => "movie",
            GraphKind::Person => "person",
        }
    }

    /// Movies link to people and people link to movies.
    pub fn other(&self) -> GraphKind {
        match self {
            GraphKind::Movie => GraphKind::Person,
            GraphKind::Person => GraphKind::Movie,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: i64,
    pub image_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Graph {
    pub kind: GraphKind,
    pub parent: GraphNode,
    pub children: Vec<GraphNode>,
}

/// Children of one expanded graph node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubGraph {
    pub parent_id: i64,
    pub child_kind: GraphKind,
    pub children: Vec<GraphNode>,
}

/// Merges movie and people hits into one list, most popular first.
///
/// The sort is stable, so rows with equal popularity stay in first-seen
/// order: movies in API order, then people in API order.
pub fn merge_search_results(
    movies: &[MovieSummary],
    people: &[PersonSummary],
    empty_year_label: &str,
) -> Vec<SearchResultRow> {
    let mut rows: Vec<SearchResultRow> = Vec::with_capacity(movies.len() + people.len());
    rows.extend(movies.iter().map(|m| SearchResultRow {
        href: format!("/movie/{}", m.id),
        image_path: resolve_image_path(m.poster_path.as_deref()),
        name: m.display_title().to_string(),
        year: resolve_year(m.release_date.as_deref(), empty_year_label),
        popularity: m.popularity,
    }));
    rows.extend(people.iter().map(|p| SearchResultRow {
        href: format!("/castMember/{}", p.id),
        image_path: resolve_image_path(p.profile_path.as_deref()),
        name: p.name.clone(),
        year: String::new(),
        popularity: p.popularity,
    }));
    rows.sort_by(|a, b| b.popularity.total_cmp(&a.popularity));
    rows
}

/// Dated credits only, most recent first.
///
/// A credit whose date does not parse is a fixed separator: nothing moves
/// across it, and each run of parseable credits between separators is
/// sorted on its own.
pub fn filmography(cast: Vec<CastCredit>) -> Vec<CastCredit> {
    let mut dated: Vec<CastCredit> = cast
        .into_iter()
        .filter(|c| non_empty(c.release_date.as_deref()).is_some())
        .collect();
    for run in dated.split_mut(|c| release_day(c).is_none()) {
        run.sort_by_cached_key(|c| Reverse(release_day(c)));
    }
    dated
}

fn release_day(credit: &CastCredit) -> Option<NaiveDate> {
    credit
        .release_date
        .as_deref()
        .and_then(|d| d.parse::<NaiveDate>().ok())
}

/// The `limit` most popular credits, never more than the input holds.
pub fn top_credits(mut cast: Vec<CastCredit>, limit: usize) -> Vec<CastCredit> {
    cast.sort_by(|a, b| b.popularity.total_cmp(&a.popularity));
    cast.truncate(limit);
    cast
}

fn graph_children(cast: Vec<CastCredit>) -> Vec<GraphNode> {
    top_credits(cast, GRAPH_CHILDREN)
        .into_iter()
        .map(|c| GraphNode {
            id: c.id,
            image_path: resolve_image_path(c.image_path.as_deref()),
        })
        .collect()
}

pub fn movie_graph(movie: &MovieDetails, credits: Credits) -> Graph {
    Graph {
        kind: GraphKind::Movie,
        parent: GraphNode {
            id: movie.summary.id,
            image_path: resolve_image_path(movie.summary.poster_path.as_deref()),
        },
        children: graph_children(credits.cast),
    }
}

pub fn person_graph(person: &PersonDetails, credits: Credits) -> Graph {
    Graph {
        kind: GraphKind::Person,
        parent: GraphNode {
            id: person.id,
            image_path: resolve_image_path(person.profile_path.as_deref()),
        },
        children: graph_children(credits.cast),
    }
}

pub fn movie_sub_graph(credits: Credits) -> SubGraph {
    SubGraph {
        parent_id: credits.id,
        child_kind: GraphKind::Person,
        children: graph_children(credits.cast),
    }
}

pub fn person_sub_graph(credits: Credits) -> SubGraph {
    SubGraph {
        parent_id: credits.id,
        child_kind: GraphKind::Movie,
        children: graph_children(credits.cast),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::present::PLACEHOLDER_IMAGE;

    fn movie(id: i64, popularity: f64, release_date: &str) -> MovieSummary {
        MovieSummary {
            id,
            title: format!("Movie {id}"),
            original_title: format!("Movie {id}"),
            poster_path: Some(format!("/m{id}.jpg")),
            popularity,
            release_date: Some(release_date.to_string()),
        }
    }

    fn person(id: i64, popularity: f64) -> PersonSummary {
        PersonSummary {
            id,
            name: format!("Person {id}"),
            profile_path: None,
            popularity,
        }
    }

    fn credit(id: i64, popularity: f64, release_date: Option<&str>) -> CastCredit {
        CastCredit {
            id,
            name: format!("Credit {id}"),
            image_path: None,
            release_date: release_date.map(str::to_string),
            popularity,
            character: None,
        }
    }

    fn ids(cast: &[CastCredit]) -> Vec<i64> {
        cast.iter().map(|c| c.id).collect()
    }

    #[test]
    fn merged_rows_are_sorted_by_popularity() {
        let movies = vec![movie(1, 3.0, "2001-01-01"), movie(2, 9.5, ""), movie(3, 0.5, "1980-07-04")];
        let people = vec![person(10, 7.25), person(11, 1.0), person(12, 12.0)];
        let rows = merge_search_results(&movies, &people, "unknown");

        assert_eq!(rows.len(), 6);
        assert!(rows.windows(2).all(|w| w[0].popularity > w[1].popularity));
        assert_eq!(rows[0].href, "/castMember/12");
        assert_eq!(rows[1].href, "/movie/2");
        assert_eq!(rows[1].year, "unknown");
    }

    #[test]
    fn rows_carry_resolved_display_fields() {
        let rows = merge_search_results(&[movie(5, 2.0, "2020-05-01")], &[person(6, 1.0)], "");
        assert_eq!(rows[0].name, "Movie 5");
        assert_eq!(rows[0].year, "2020");
        assert!(rows[0].image_path.ends_with("/m5.jpg"));
        assert_eq!(rows[1].name, "Person 6");
        assert_eq!(rows[1].year, "");
        assert_eq!(rows[1].image_path, PLACEHOLDER_IMAGE);
    }

    #[test]
    fn equal_popularity_keeps_first_seen_order() {
        let rows = merge_search_results(
            &[movie(1, 4.0, ""), movie(2, 4.0, "")],
            &[person(3, 4.0)],
            "unknown",
        );
        let hrefs: Vec<&str> = rows.iter().map(|r| r.href.as_str()).collect();
        assert_eq!(hrefs, vec!["/movie/1", "/movie/2", "/castMember/3"]);
    }

    #[test]
    fn filmography_drops_undated_and_orders_newest_first() {
        let cast = vec![
            credit(1, 1.0, Some("2001-06-01")),
            credit(2, 1.0, Some("")),
            credit(3, 1.0, Some("2019-12-24")),
            credit(4, 1.0, None),
            credit(5, 1.0, Some("1995-02-10")),
            credit(6, 1.0, Some("2010-08-30")),
        ];
        let sorted = filmography(cast);
        assert_eq!(ids(&sorted), vec![3, 6, 1, 5]);
        assert!(sorted
            .iter()
            .all(|c| c.release_date.as_deref().is_some_and(|d| !d.is_empty())));
    }

    #[test]
    fn filmography_leaves_unparseable_dates_in_place() {
        let cast = vec![
            credit(1, 1.0, Some("1990-01-01")),
            credit(2, 1.0, Some("sometime")),
            credit(3, 1.0, Some("2020-01-01")),
            credit(4, 1.0, Some("2005-01-01")),
        ];
        assert_eq!(ids(&filmography(cast)), vec![1, 2, 3, 4]);
    }

    #[test]
    fn filmography_sorts_each_run_between_unparseable_dates() {
        let cast = vec![
            credit(1, 1.0, Some("1990-01-01")),
            credit(2, 1.0, Some("2000-01-01")),
            credit(3, 1.0, Some("not-a-date")),
            credit(4, 1.0, Some("2005-01-01")),
            credit(5, 1.0, Some("2020-01-01")),
        ];
        assert_eq!(ids(&filmography(cast)), vec![2, 1, 3, 5, 4]);
    }

    #[test]
    fn filmography_is_stable_for_equal_dates() {
        let cast = vec![
            credit(1, 1.0, Some("2000-01-01")),
            credit(2, 1.0, Some("2000-01-01")),
            credit(3, 1.0, Some("2010-01-01")),
        ];
        assert_eq!(ids(&filmography(cast)), vec![3, 1, 2]);
    }

    #[test]
    fn top_credits_takes_most_popular_five() {
        let cast: Vec<CastCredit> = (1..=8).map(|i| credit(i, (i * 10) as f64, None)).collect();
        assert_eq!(ids(&top_credits(cast, GRAPH_CHILDREN)), vec![8, 7, 6, 5, 4]);
    }

    #[test]
    fn short_inputs_yield_every_credit() {
        let cast = vec![credit(1, 1.0, None), credit(2, 9.0, None), credit(3, 4.0, None)];
        assert_eq!(ids(&top_credits(cast, GRAPH_CHILDREN)), vec![2, 3, 1]);
        assert!(top_credits(Vec::new(), GRAPH_CHILDREN).is_empty());
    }

    #[test]
    fn person_graph_links_to_movies() {
        let person = PersonDetails {
            id: 42,
            name: "Someone".to_string(),
            profile_path: Some("/face.jpg".to_string()),
            ..Default::default()
        };
        let credits = Credits {
            id: 42,
            cast: vec![credit(7, 2.0, Some("2000-01-01")), credit(8, 3.0, None)],
        };
        let graph = person_graph(&person, credits);
        assert_eq!(graph.kind, GraphKind::Person);
        assert_eq!(graph.parent.id, 42);
        assert!(graph.parent.image_path.ends_with("/face.jpg"));
        assert_eq!(graph.children.iter().map(|c| c.id).collect::<Vec<_>>(), vec![8, 7]);
        assert!(graph.children.iter().all(|c| c.image_path == PLACEHOLDER_IMAGE));
    }

    #[test]
    fn sub_graphs_echo_parent_and_flip_kind() {
        let credits = Credits {
            id: 603,
            cast: (1..=7).map(|i| credit(i, i as f64, None)).collect(),
        };
        let sub = movie_sub_graph(credits.clone());
        assert_eq!(sub.parent_id, 603);
        assert_eq!(sub.child_kind, GraphKind::Person);
        assert_eq!(sub.children.len(), 5);
        assert_eq!(person_sub_graph(credits).child_kind, GraphKind::Movie);
    }
}
