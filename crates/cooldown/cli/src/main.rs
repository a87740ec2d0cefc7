use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match cooldown_cli::run().await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
