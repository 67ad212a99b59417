use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use textscene_assets::paths::{FONT_PATH, MATCAP_COUNT, matcap_path, resolve};
use textscene_assets::{FontLoader, LoadStatus, TextureLoader};
use textscene_common::TextureKey;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for textscene")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks: fmt, clippy, tests, deny, doc
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates
    Clippy,
    /// Run all tests
    Test,
    /// Run cargo deny check
    Deny,
    /// Build rustdoc for the workspace
    Doc,
    /// Build the entire workspace
    Build,
    /// Check that the font and every matcap under an asset root load
    Assets {
        #[arg(long, default_value = "static")]
        root: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            run_fmt()?;
            run_clippy()?;
            run_tests()?;
            run_deny()?;
            run_doc()?;
        }
        Commands::Fmt => run_fmt()?,
        Commands::Clippy => run_clippy()?,
        Commands::Test => run_tests()?,
        Commands::Deny => run_deny()?,
        Commands::Doc => run_doc()?,
        Commands::Build => run_build()?,
        Commands::Assets { root } => check_assets(&root)?,
    }

    Ok(())
}

fn run_fmt() -> Result<()> {
    println!("==> Running cargo fmt --check");
    let status = Command::new("cargo")
        .args(["fmt", "--all", "--", "--check"])
        .status()?;
    if !status.success() {
        anyhow::bail!("cargo fmt check failed");
    }
    Ok(())
}

fn run_clippy() -> Result<()> {
    println!("==> Running cargo clippy");
    let status = Command::new("cargo")
        .args([
            "clippy",
            "--workspace",
            "--all-targets",
            "--",
            "-D",
            "warnings",
        ])
        .status()?;
    if !status.success() {
        anyhow::bail!("cargo clippy failed");
    }
    Ok(())
}

fn run_tests() -> Result<()> {
    println!("==> Running cargo test");
    let status = Command::new("cargo")
        .args(["test", "--workspace"])
        .status()?;
    if !status.success() {
        anyhow::bail!("cargo test failed");
    }
    Ok(())
}

fn run_deny() -> Result<()> {
    println!("==> Running cargo deny check (licenses bans sources)");
    let status = Command::new("cargo")
        .args(["deny", "check", "licenses", "bans", "sources"])
        .status()?;
    if !status.success() {
        anyhow::bail!("cargo deny check failed");
    }
    Ok(())
}

fn run_doc() -> Result<()> {
    println!("==> Running cargo doc");
    let status = Command::new("cargo")
        .args(["doc", "--workspace", "--no-deps"])
        .status()?;
    if !status.success() {
        anyhow::bail!("cargo doc failed");
    }
    Ok(())
}

fn run_build() -> Result<()> {
    println!("==> Running cargo build");
    let status = Command::new("cargo")
        .args(["build", "--workspace"])
        .status()?;
    if !status.success() {
        anyhow::bail!("cargo build failed");
    }
    Ok(())
}

fn check_assets(root: &Path) -> Result<()> {
    println!("==> Checking assets under {}", root.display());
    let mut failures = 0;

    let font_path = resolve(root, FONT_PATH);
    match FontLoader::new().load(&font_path).wait() {
        Ok(font) => println!("  font: {} glyphs", font.glyph_count()),
        Err(e) => {
            println!("  font {}: {e}", font_path.display());
            failures += 1;
        }
    }

    let mut textures = TextureLoader::new();
    for key in 1..=MATCAP_COUNT {
        textures.load(TextureKey(key), resolve(root, &matcap_path(key)));
    }
    while textures.pending_count() > 0 {
        textures.poll();
        std::thread::sleep(Duration::from_millis(10));
    }
    for (key, entry) in textures.iter() {
        match (&entry.status, &entry.image) {
            (LoadStatus::Loaded, Some(image)) => {
                println!("  matcap {}: {}x{}", key.0, image.width(), image.height());
            }
            (status, _) => {
                println!("  matcap {} ({}): {status}", key.0, entry.path.display());
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} asset(s) failed to load");
    }
    Ok(())
}
