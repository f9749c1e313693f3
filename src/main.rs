use clap::{Parser, Subcommand};
use docweave::{config, generate, load, output, translations, version, watch};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "docweave")]
#[command(about = "Route generation for versioned, translated documentation sites")]
#[command(long_about = "\
Route generation for versioned, translated documentation sites

Your site directory is the data source. Markdown files become docs, blog
posts and pages; sidebars order them; versions and languages get their own
scopes.

Site structure:

  site/
  ├── config.toml                        # Site config (required)
  ├── sidebars.json                      # {sidebar: {category: [doc id]}}
  ├── docs/                              # Current docs (version \"next\")
  │   ├── hello.md
  │   └── foo/bar.md
  ├── versions.json                      # [\"1.0.0\", ...], newest first
  ├── versioned_docs/version-1.0.0/      # Frozen docs of 1.0.0
  ├── versioned_sidebars/version-1.0.0-sidebars.json
  ├── languages.json                     # [{\"tag\": \"en\", ...}], default first
  ├── translated_docs/ja/                # Japanese copies of docs
  ├── i18n/ja.json                       # String catalog of ja
  ├── blog/2019-05-30-welcome.md         # YYYY-MM-DD-name posts
  └── src/pages/index.js                 # Standalone pages

Generated artifacts land in .docweave/, redirect pages in build/.

Run 'docweave gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Site directory
    #[arg(long, default_value = ".", global = true)]
    site_dir: PathBuf,

    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load the site, write generated artifacts and redirect pages
    Build,
    /// Build once, then rebuild on every change
    Start,
    /// Load the site without writing anything
    Check,
    /// Freeze the current docs as a new version
    #[command(name = "docs:version")]
    DocsVersion {
        /// Version label, e.g. 1.0.0
        label: String,
        /// Docs plugin to version
        #[arg(long, default_value = config::DEFAULT_PLUGIN_ID)]
        plugin_id: String,
    },
    /// Extract translatable strings into the default language catalog
    WriteTranslations,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build => {
            println!("==> Loading {}", cli.site_dir.display());
            init_thread_pool(&config::load_config(&cli.site_dir)?.processing);
            let site = load::load_site(&cli.site_dir)?;
            output::print_load_output(&site);
            let manifest = generate::write_generated(&site)?;
            output::print_generate_output(&manifest);
            site.post_build()?;
            println!("==> Build complete: {}", site.out_dir().display());
        }
        Command::Start => {
            println!("==> Loading {}", cli.site_dir.display());
            init_thread_pool(&config::load_config(&cli.site_dir)?.processing);
            let site = load::load_site(&cli.site_dir)?;
            output::print_load_output(&site);
            output::print_generate_output(&generate::write_generated(&site)?);
            println!("==> Watching for changes (Ctrl-C to stop)");
            watch::Watcher::start(&site, |manifest| {
                output::print_generate_output(manifest);
            })?
            .wait();
        }
        Command::Check => {
            println!("==> Checking {}", cli.site_dir.display());
            init_thread_pool(&config::load_config(&cli.site_dir)?.processing);
            let site = load::load_site(&cli.site_dir)?;
            output::print_load_output(&site);
            println!("==> Site is valid");
        }
        Command::DocsVersion { label, plugin_id } => {
            let created = version::docs_version(&cli.site_dir, &label, &plugin_id)?;
            output::print_version_output(&created);
        }
        Command::WriteTranslations => {
            let written = translations::write_translations(&cli.site_dir)?;
            output::print_translations_output(&written);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the global subscriber: `debug` with `--verbose`, else `RUST_LOG` or `info`.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. Config can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
    {
        tracing::warn!(threads, error = %e, "Could not configure thread pool");
    }
}
