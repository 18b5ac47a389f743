//! Pagefolio Backend - binary entry point
//! Delegates to the library for all app logic.

#[tokio::main]
async fn main() {
    pagefolio_backend::run().await;
}
