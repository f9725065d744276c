#[tokio::main]
async fn main() {
    reservation_engine::run().await;
}
