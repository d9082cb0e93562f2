mod cli;
mod console;
mod infra;
mod routes;
mod server;

use dorm_lottery::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
