//! `chatrelay chat` — Interactive or single-message chat mode.

use chatrelay_config::AppConfig;

pub async fn run(
    message: Option<String>,
    user: String,
    name: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Check for API key early — give a clear error
    if config.api_key.is_none() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    OPENROUTER_API_KEY=sk-or-v1-...   (recommended)");
        eprintln!("    OPENAI_API_KEY=sk-...             (for OpenAI direct)");
        eprintln!("    CHATRELAY_API_KEY=sk-...          (generic)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        eprintln!("  Get an OpenRouter key at: https://openrouter.ai/keys");
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let (pipeline, _store) = super::build_pipeline(&config).await?;

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Thinking...");
        let response = pipeline.handle(&user, &name, &msg).await;
        eprint!("\r              \r");
        println!("{response}");
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  chatrelay — interactive mode");
    println!();
    println!("  Model:   {}", config.model);
    println!("  Store:   {}", config.store.database);
    println!("  User:    {user} ({name})");
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let stdin = std::io::stdin();
    loop {
        print!("  You > ");
        use std::io::Write;
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" {
            break;
        }

        eprint!("  ...");
        let response = pipeline.handle(&user, &name, line).await;
        eprint!("\r     \r");
        println!();
        for out in response.lines() {
            println!("  Bot > {out}");
        }
        println!();
    }

    println!();
    println!("  Goodbye!");
    println!();

    Ok(())
}
