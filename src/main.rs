use anyhow::Result;

use listling::config::Config;
use listling::sync::SyncService;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    listling::logger::init(&config.logging)?;

    // Check if the API key is set
    if std::env::var(&config.api.api_key_env).is_err() {
        eprintln!("❌ Error: {} environment variable not set", config.api.api_key_env);
        eprintln!("\n💡 To use this app:");
        eprintln!("1. Create an account on the todolist service and copy your API key");
        eprintln!("2. Set it as environment variable: export {}=your_key_here", config.api.api_key_env);
        eprintln!("3. Run the app again to see your actual data!");
        return Ok(());
    }

    let service = SyncService::from_config(&config)?;
    service.fetch_todolists().await?;

    for entry in service.todolists().await {
        service.fetch_tasks(entry.id()).await?;
        let tasks = service.tasks_for(entry.id()).await.unwrap_or_default();
        println!("{} ({} tasks)", entry.todolist.title, tasks.len());
        for task in tasks {
            println!("  - {}", task.title);
        }
    }

    Ok(())
}
