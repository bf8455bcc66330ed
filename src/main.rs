use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use loanui::behaviors::mask::MaskStyle;
use loanui::config::PageConfig;
use loanui::dom::markup::to_markup;
use loanui::fixture::PageSpec;
use loanui::session::{Script, Session};

#[derive(Parser, Debug)]
#[command(name = "loanui")]
#[command(version = "0.1.0")]
#[command(about = "Run the loan desk page behaviors against a page description")]
struct Args {
    /// Page description (TOML element tree)
    page: Option<PathBuf>,

    /// Steps to replay after the page loads
    #[arg(short, long)]
    session: Option<PathBuf>,

    /// Config file (defaults to ~/.config/loanui/page.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the final page markup
    #[arg(short, long)]
    dump: bool,

    /// Format a value with the CPF mask and exit
    #[arg(long, value_name = "VALUE")]
    mask: Option<String>,

    /// Use the digits-only mask with --mask
    #[arg(long, requires = "mask")]
    digits_only: bool,

    /// Print the default configuration as TOML
    #[arg(long)]
    print_config: bool,

    /// Write the default configuration to the config path
    #[arg(long)]
    write_config: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    // Handle one-shot commands
    if let Some(value) = &args.mask {
        let style = if args.digits_only { MaskStyle::DigitsOnly } else { MaskStyle::Cpf };
        println!("{}", style.apply(value));
        return Ok(());
    }

    if args.print_config {
        print!("{}", PageConfig::default().to_toml()?);
        return Ok(());
    }

    if args.write_config {
        return write_config(args.config.as_deref());
    }

    let Some(page) = &args.page else {
        anyhow::bail!("No page description given (see --help)");
    };

    let config = PageConfig::load(args.config.as_deref());
    run_page(page, args.session.as_deref(), config, args.dump)
}

fn write_config(path: Option<&Path>) -> Result<()> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => PageConfig::config_path()?,
    };
    PageConfig::default().save(&path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn run_page(page: &Path, session: Option<&Path>, config: PageConfig, dump: bool) -> Result<()> {
    let doc = PageSpec::load(page)
        .with_context(|| format!("Failed to load page {}", page.display()))?
        .build()?;

    let (mut runner, report) = Session::start(doc, config);
    tracing::info!(
        "Installed {} behaviors, skipped {}",
        report.installed.len(),
        report.skipped.len()
    );

    let loaded = serde_json::json!({
        "step": 0,
        "action": "load",
        "installed": report.installed.iter().map(|(b, _)| *b).collect::<Vec<_>>(),
        "skipped": report.skipped,
        "feedback": report.feedback,
        "icons": report.icons,
        "state": runner.state(),
    });
    println!("{}", serde_json::to_string(&loaded)?);

    if let Some(path) = session {
        let script = Script::load(path)
            .with_context(|| format!("Failed to load session {}", path.display()))?;
        for step in &script.steps {
            let outcome = runner.run(step)?;
            println!("{}", serde_json::to_string(&outcome)?);
        }
    }

    if dump {
        let doc = runner.page().doc();
        println!("{}", to_markup(doc, doc.root()));
    }
    Ok(())
}
