use clap::Parser;
use placepress::db::HttpExecutor;
use placepress::{output, site};
use std::path::PathBuf;

/// Query endpoint used when no argument is given.
const DEFAULT_DATABASE_URL: &str = "http://localhost:8686/query";

/// The content tree is always written here, relative to the working
/// directory; the downstream site compiler is configured to read it.
const OUTPUT_ROOT: &str = "content";

#[derive(Parser)]
#[command(name = "placepress")]
#[command(about = "Generate a static-site content tree from the directory database")]
#[command(long_about = "\
Generate a static-site content tree from the directory database

Reads categories, listings, and tags from an HTTP SQL endpoint and writes a
Zola-style content tree. The previous tree is deleted and rebuilt in full on
every run.

Output structure:

  content/
  ├── _index.md                    # Index: categories, samples, tags
  ├── c/
  │   └── food/
  │       ├── _index.md            # Category page
  │       └── joes-diner/
  │           └── 7/
  │               └── index.md     # Listing page (id segment keeps
  │                                #   colliding slugs apart)
  └── t/
      └── lunch/
          └── index.md             # Tag page

A query that fails is logged and rendered as its empty state; only a
filesystem failure aborts the run.")]
#[command(version)]
struct Cli {
    /// Query endpoint of the directory database
    #[arg(default_value = DEFAULT_DATABASE_URL)]
    database_url: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let output_root = PathBuf::from(OUTPUT_ROOT);

    println!(
        "==> Regenerating {} from {}",
        output_root.display(),
        cli.database_url
    );
    let db = HttpExecutor::new(&cli.database_url)?;
    let summary = site::regenerate(&db, &output_root)?;
    output::print_summary(&summary);

    Ok(())
}
