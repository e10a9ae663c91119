mod cli;
mod infra;
mod records;
mod routes;
mod server;
#[cfg(test)]
mod test_support;

use praktijk::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
