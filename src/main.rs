#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    todolist::start_server().await
}
