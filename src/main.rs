#[tokio::main]
async fn main() {
    referral::start_server().await;
}
