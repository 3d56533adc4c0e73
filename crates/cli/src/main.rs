use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    affinity_cli::run().await
}
