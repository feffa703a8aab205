//! Environment file generator for Fundboard
//!
//! Writes a `.env` with every variable the API server reads and a random
//! session token mapped to the founder account.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use clap::Parser;
use rand::RngCore;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output file path
    #[arg(short, long, default_value = ".env")]
    output: PathBuf,

    /// Force overwrite if file exists
    #[arg(short, long)]
    force: bool,

    /// User id the generated session token signs in as
    #[arg(short, long, default_value = "founder")]
    user: String,

    /// MongoDB connection string
    #[arg(long, default_value = "mongodb://localhost:27017")]
    mongodb_url: String,

    /// Gemini model
    #[arg(long, default_value = "gemini-1.5-flash")]
    model: String,

    /// Print the generated token (only for local testing)
    #[arg(long)]
    show_token: bool,
}

/// Random token safe to embed in `token=user` pairs (no `=`, `,`, `+` or `/`)
fn generate_token(length: usize) -> String {
    let mut bytes = vec![0u8; length];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(&bytes)
}

fn generate_env_content(cli: &Cli, token: &str) -> String {
    format!(
        "# ========================================\n\
         # Fundboard - Environment Configuration\n\
         # ========================================\n\
         # Generated: {}\n\
         #\n\
         # This file contains secrets. Never commit it to version control.\n\
         \n\
         # Gemini\n\
         GEMINI_API_KEY=\n\
         GEMINI_MODEL={}\n\
         # GEMINI_BASE_URL=https://generativelanguage.googleapis.com/v1beta\n\
         \n\
         # MongoDB\n\
         MONGODB_URL={}\n\
         MONGODB_DATABASE=fundboard\n\
         \n\
         # Server\n\
         FUNDBOARD_HOST=127.0.0.1\n\
         FUNDBOARD_PORT=3000\n\
         FUNDBOARD_ENABLE_CORS=true\n\
         FUNDBOARD_MAX_UPLOAD_BYTES=26214400\n\
         \n\
         # Sessions (comma-separated token=user_id pairs)\n\
         FUNDBOARD_API_TOKENS={}={}\n\
         \n\
         # Profile editor\n\
         FUNDBOARD_AUTOSAVE_DEBOUNCE_MS=1000\n\
         FUNDBOARD_PERSIST_AFTER_EXTRACTION=true\n\
         \n\
         # Logging\n\
         FUNDBOARD_LOG_LEVEL=info\n\
         # RUST_LOG=info,fundboard_core=debug\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        cli.model,
        cli.mongodb_url,
        token,
        cli.user,
    )
}

fn main() {
    let cli = Cli::parse();

    if cli.output.exists() && !cli.force {
        eprintln!("Error: File {:?} already exists!", cli.output);
        eprintln!("   Use --force to overwrite");
        std::process::exit(1);
    }

    if cli.user.contains([',', '=']) || cli.user.trim().is_empty() {
        eprintln!("Error: --user must be non-empty and free of ',' and '='");
        std::process::exit(1);
    }

    println!("Fundboard configuration generator");
    println!();

    let token = generate_token(32);
    if cli.show_token {
        println!("WARNING: showing token (DO NOT use in production)");
        println!("   Session token for {}: {}", cli.user, token);
    } else {
        println!("Generated session token for {} (32 bytes, base64url)", cli.user);
    }

    let content = generate_env_content(&cli, &token);
    if let Err(e) = fs::write(&cli.output, content) {
        eprintln!("Failed to write file: {}", e);
        std::process::exit(1);
    }
    println!("Configuration written to: {:?}", cli.output);

    // Set secure permissions (Unix only)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = fs::Permissions::from_mode(0o600);
        if let Err(e) = fs::set_permissions(&cli.output, perms) {
            eprintln!("Warning: Could not set file permissions: {}", e);
        } else {
            println!("Set file permissions to 600 (owner only)");
        }
    }

    println!();
    println!("Next steps:");
    println!("   1. Add GEMINI_API_KEY to {:?}", cli.output);
    println!("   2. Start MongoDB and check MONGODB_URL");
    println!("   3. cargo run -p run-fundboard");
}
