use anyhow::Result;
use clap::Parser;

mod agent;
mod api;
mod cli;
mod config;
mod llm;
mod outlet;
mod prompts;
mod retrieval;
mod search;
mod solver;
mod tools;
mod types;
mod utils;
mod verify;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();
    let question = args.question.clone();
    let file = args.file.clone();
    let config = args.into_config();

    match question {
        Some(question) => solver::runner::solve_single(&config, question, file).await,
        None => solver::runner::launch(&config).await,
    }
}
