//! Movie review command line entry point.
//!
//! # Responsibility
//! - Parse one subcommand and issue the matching review procedure call.
//! - Print the response as JSON on stdout.
//!
//! # Invariants
//! - The app is stopped on every path after a successful start.
//! - Failures exit non-zero with the status message on stderr.

mod app;
mod config;

use app::{App, AppResult};
use clap::{Parser, Subcommand};
use config::AppConfig;
use moviereview_rpc::{
    CreateRequest, DeleteRequest, GetAllRequest, GetAverageRatingRequest, GetByMovieRequest,
    GetByUserRequest, GetRequest, UpdateRequest,
};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "moviereview")]
#[command(about = "Store and query movie reviews", version)]
struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a review
    Create {
        #[arg(long)]
        user: String,

        #[arg(long)]
        movie: String,

        /// Rating from 1 to 5
        #[arg(long)]
        rating: i32,

        #[arg(long)]
        comment: String,
    },

    /// Show one active review
    Get { id: String },

    /// List active reviews, newest first
    List {
        #[arg(long, conflicts_with = "movie")]
        user: Option<String>,

        #[arg(long, conflicts_with = "user")]
        movie: Option<String>,
    },

    /// Change rating and/or comment of a review
    Update {
        id: String,

        #[arg(long)]
        rating: Option<i32>,

        #[arg(long)]
        comment: Option<String>,
    },

    /// Soft delete a review
    Delete { id: String },

    /// Average rating of a movie's active reviews
    Average { movie: String },
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let app = match App::start(&cli.config) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let outcome = run(&app, cli.command);
    let stopped = app.stop();

    match outcome.and_then(|output| stopped.map(|()| output)) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(app: &App, command: Commands) -> AppResult<String> {
    let handler = app.handler()?;
    let output = match command {
        Commands::Create {
            user,
            movie,
            rating,
            comment,
        } => serde_json::to_string_pretty(&handler.create(CreateRequest {
            user_id: user,
            movie_id: movie,
            rating,
            comment,
        })?)?,
        Commands::Get { id } => serde_json::to_string_pretty(&handler.get(GetRequest { id })?)?,
        Commands::List { user, movie } => {
            let response = match (user, movie) {
                (Some(user_id), _) => handler.get_by_user(GetByUserRequest { user_id })?,
                (None, Some(movie_id)) => handler.get_by_movie(GetByMovieRequest { movie_id })?,
                (None, None) => handler.get_all(GetAllRequest {})?,
            };
            serde_json::to_string_pretty(&response)?
        }
        Commands::Update {
            id,
            rating,
            comment,
        } => serde_json::to_string_pretty(&handler.update(UpdateRequest {
            id,
            rating,
            comment,
            is_deleted: None,
        })?)?,
        Commands::Delete { id } => {
            serde_json::to_string_pretty(&handler.delete(DeleteRequest { id })?)?
        }
        Commands::Average { movie } => {
            serde_json::to_string_pretty(&handler.get_average_rating(GetAverageRatingRequest {
                movie_id: movie,
            })?)?
        }
    };
    Ok(output)
}
