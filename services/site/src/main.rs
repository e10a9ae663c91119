#[tokio::main]
async fn main() {
    if let Err(err) = praktijk_site::run().await {
        eprintln!("praktijk-site: {err}");
        std::process::exit(1);
    }
}
