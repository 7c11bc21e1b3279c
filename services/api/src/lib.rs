mod cli;
mod infra;
mod preview;
mod routes;
mod server;

use job_catalog::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
