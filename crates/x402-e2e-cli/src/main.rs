#[tokio::main]
async fn main() {
    match x402_e2e_cli::run().await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("Error: failed to initialize logging: {err}");
            std::process::exit(1);
        }
    }
}
