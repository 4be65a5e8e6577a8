//! Run one catalog lookup and print the resulting view model as JSON.
//! Usage:
//!   cargo run --bin catalog_probe -- search <query>
//!   cargo run --bin catalog_probe -- movie <tmdb_id>
//!   cargo run --bin catalog_probe -- person <tmdb_id>
//!   cargo run --bin catalog_probe -- graph <movie|person> <tmdb_id>
//! Reads the same TMDB_TOKEN / config.yaml settings as the server (.env supported).

use anyhow::{anyhow, Context, Result};
use blunt::config::Config;
use blunt::tmdb::{TmdbApi, TmdbClient};
use blunt::view::{self, GraphKind};
use dotenvy::dotenv;
use serde_json::json;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Command {
    Search,
    Movie,
    Person,
    Graph,
}

impl FromStr for Command {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "search" => Ok(Command::Search),
            "movie" => Ok(Command::Movie),
            "person" => Ok(Command::Person),
            "graph" => Ok(Command::Graph),
            _ => Err(anyhow!("command must be 'search', 'movie', 'person' or 'graph'")),
        }
    }
}

fn parse_id(arg: Option<&String>) -> Result<i64> {
    arg.ok_or_else(|| anyhow!("missing tmdb_id"))?
        .parse()
        .context("tmdb_id must be an integer")
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: cargo run --bin catalog_probe -- search <query>");
        eprintln!("       cargo run --bin catalog_probe -- movie|person <tmdb_id>");
        eprintln!("       cargo run --bin catalog_probe -- graph movie|person <tmdb_id>");
        std::process::exit(1);
    }

    let command = Command::from_str(&args[1])?;
    let config = Config::load()?;
    let client = TmdbClient::new(config.api_base.clone(), config.include_adult)?;
    let token = config.token.as_str();
    let labels = &config.year_labels;

    let output = match command {
        Command::Search => {
            let query = args[2..].join(" ");
            let (movies, people) = tokio::try_join!(
                client.search_movies(token, &query),
                client.search_people(token, &query),
            )?;
            json!(view::merge_search_results(&movies, &people, &labels.search))
        }
        Command::Movie => {
            let id = parse_id(args.get(2))?;
            let (details, credits) = tokio::try_join!(
                client.movie_details(token, id),
                client.movie_credits(token, id),
            )?;
            json!({ "movie": details, "cast": credits.cast })
        }
        Command::Person => {
            let id = parse_id(args.get(2))?;
            let (details, credits) = tokio::try_join!(
                client.person_details(token, id),
                client.person_credits(token, id),
            )?;
            json!({ "person": details, "filmography": view::filmography(credits.cast) })
        }
        Command::Graph => {
            let kind = match args[2].to_lowercase().as_str() {
                "movie" => GraphKind::Movie,
                "person" => GraphKind::Person,
                other => return Err(anyhow!("graph kind must be 'movie' or 'person', got '{}'", other)),
            };
            let id = parse_id(args.get(3))?;
            let graph = match kind {
                GraphKind::Movie => {
                    let (details, credits) = tokio::try_join!(
                        client.movie_details(token, id),
                        client.movie_credits(token, id),
                    )?;
                    view::movie_graph(&details, credits)
                }
                GraphKind::Person => {
                    let (details, credits) = tokio::try_join!(
                        client.person_details(token, id),
                        client.person_credits(token, id),
                    )?;
                    view::person_graph(&details, credits)
                }
            };
            json!(graph)
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
