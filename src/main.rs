use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use allroads::config::AppConfig;
use allroads::models::FeatureDraft;
use allroads::render::{self, RenderOptions};
use allroads::session::Session;
use allroads::store::{Change, Direction, FeatureRef, QuarterRef, Roadmap, Template};

#[derive(Parser)]
#[command(name = "allroads")]
#[command(about = "Build and edit quarterly software-development roadmaps")]
struct Cli {
    /// Roadmap file (defaults to the configured file)
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Answer yes to every confirmation
    #[arg(short, long, global = true)]
    yes: bool,

    /// Disable ANSI styling
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new roadmap: the current quarter and the next three
    New {
        /// Start with no quarters at all
        #[arg(long)]
        empty: bool,
    },
    /// Show the roadmap
    Show,
    /// Append the quarter after the last one
    AddQuarter,
    /// Remove the last quarter and its features
    RemoveQuarter,
    /// Remove all quarters and features
    Clear,
    /// Add a feature to a quarter (Q<n>-<year> or 1-based position)
    Add {
        quarter: QuarterRef,
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Color as #RRGGBB
        #[arg(short, long)]
        color: Option<String>,
    },
    /// Edit a feature (id or Q<n>-<year>:<slot>)
    Edit {
        feature: FeatureRef,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        color: Option<String>,
    },
    /// Delete a feature
    Delete { feature: FeatureRef },
    /// Toggle a feature's completion
    Toggle { feature: FeatureRef },
    /// Move a feature up, or to the end of the previous quarter
    Up { feature: FeatureRef },
    /// Move a feature down, or to the start of the next quarter
    Down { feature: FeatureRef },
    /// Replace the roadmap with a template (web, mobile, api)
    Template { kind: Template },
    /// Write the roadmap to another file
    SaveAs { path: PathBuf },
    /// Show or change settings
    Config {
        /// Roadmap file used when --file is not given
        #[arg(long)]
        default_file: Option<PathBuf>,
        #[arg(long)]
        styled: Option<bool>,
        #[arg(long)]
        descriptions: Option<bool>,
    },
}

/// Initialize tracing on stderr so stdout carries only the board.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "allroads=warn".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Ask a yes/no question on the terminal. Without a terminal only `--yes`
/// counts as consent.
fn confirm(prompt: &str, assume_yes: bool) -> anyhow::Result<bool> {
    let interactive = io::stdin().is_terminal();
    confirm_with(
        prompt,
        assume_yes,
        interactive,
        &mut io::stdin().lock(),
        &mut io::stdout(),
    )
}

fn confirm_with(
    prompt: &str,
    assume_yes: bool,
    interactive: bool,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> anyhow::Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    if !interactive {
        tracing::warn!("{} (not confirmed; pass --yes)", prompt);
        return Ok(false);
    }

    write!(output, "{} [y/N] ", prompt)?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "Yes"))
}

fn open_session(path: &Path) -> anyhow::Result<Session> {
    Session::open(path).with_context(|| {
        format!(
            "Failed to open {} (create it with `allroads new`)",
            path.display()
        )
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = AppConfig::load();
    let path = match cli.file.clone() {
        Some(path) => path,
        None => config.roadmap_path()?,
    };
    let options = RenderOptions {
        styled: config.styled_output && !cli.plain && io::stdout().is_terminal(),
        descriptions: config.show_descriptions,
    };

    let command = cli.command.unwrap_or(Commands::Show);

    // Commands that do not edit an existing roadmap.
    match command {
        Commands::New { empty } => {
            if path.exists() && !confirm("Clear current roadmap and start new?", cli.yes)? {
                return Ok(());
            }
            let mut session = if empty {
                Session::with_roadmap(Roadmap::new())
            } else {
                Session::new_at(Local::now().date_naive())?
            };
            let saved = session.save_as(&path)?;
            println!("New roadmap created: {}", saved.display());
            print!("{}", render::render_roadmap(session.roadmap(), options));
            return Ok(());
        }
        Commands::Show => {
            let session = open_session(&path)?;
            print!("{}", render::render_roadmap(session.roadmap(), options));
            return Ok(());
        }
        Commands::SaveAs { path: target } => {
            let mut session = open_session(&path)?;
            let saved = session.save_as(&target)?;
            println!("Saved: {}", saved.display());
            return Ok(());
        }
        Commands::Config {
            default_file,
            styled,
            descriptions,
        } => {
            let changed = default_file.is_some() || styled.is_some() || descriptions.is_some();
            if let Some(file) = default_file {
                config.default_file = Some(file);
            }
            if let Some(styled) = styled {
                config.styled_output = styled;
            }
            if let Some(descriptions) = descriptions {
                config.show_descriptions = descriptions;
            }
            if changed {
                config.save()?;
            }
            println!("{}", serde_json::to_string_pretty(&config)?);
            return Ok(());
        }
        _ => {}
    }

    let mut session = open_session(&path)?;
    let roadmap = session.roadmap_mut();

    let change = match command {
        Commands::AddQuarter => roadmap.add_quarter()?,
        Commands::RemoveQuarter => roadmap.remove_quarter(),
        Commands::Clear => {
            if !confirm(
                "This will remove all quarters and features. Continue?",
                cli.yes,
            )? {
                return Ok(());
            }
            roadmap.clear()
        }
        Commands::Add {
            quarter,
            title,
            description,
            color,
        } => {
            let index = roadmap.quarter_index(quarter)?;
            let draft = FeatureDraft {
                title,
                description,
                color,
            };
            roadmap.add_feature(index, &draft)?
        }
        Commands::Edit {
            feature,
            title,
            description,
            color,
        } => {
            let key = roadmap.resolve(&feature)?;
            let current = roadmap
                .feature(key)
                .with_context(|| format!("Feature {} disappeared", key))?;
            let draft = FeatureDraft::editing(current, title, description, color);
            roadmap.edit_feature(key, &draft)?
        }
        Commands::Delete { feature } => {
            let key = roadmap.resolve(&feature)?;
            let title = roadmap
                .feature(key)
                .map(|f| f.title.clone())
                .unwrap_or_default();
            if !confirm(&format!("Delete '{}'?", title), cli.yes)? {
                return Ok(());
            }
            roadmap.delete_feature(key)?
        }
        Commands::Toggle { feature } => {
            let key = roadmap.resolve(&feature)?;
            roadmap.toggle_completed(key)?
        }
        Commands::Up { feature } => {
            let key = roadmap.resolve(&feature)?;
            roadmap.move_feature(key, Direction::Up)?
        }
        Commands::Down { feature } => {
            let key = roadmap.resolve(&feature)?;
            roadmap.move_feature(key, Direction::Down)?
        }
        Commands::Template { kind } => {
            if !roadmap.is_empty()
                && !confirm("This will replace current roadmap. Continue?", cli.yes)?
            {
                return Ok(());
            }
            roadmap.load_template(kind)?
        }
        Commands::New { .. }
        | Commands::Show
        | Commands::SaveAs { .. }
        | Commands::Config { .. } => unreachable!("handled above"),
    };

    if !change.is_unchanged() {
        session.save()?;
    }
    report(&change);
    print!("{}", render::render_roadmap(session.roadmap(), options));

    Ok(())
}

fn report(change: &Change) {
    tracing::debug!(?change, "Applied command");
    println!("{}", change);
    println!();
}
