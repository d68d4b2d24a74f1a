//! Operator CLI for the folio content store.
//!
//! # Responsibility
//! - Expose the admin editor (add/delete/upload/display mode) on a terminal.
//! - Print collections the way content sections would read them.
//! - Watch slots for changes made by other processes.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use folio_core::db::open_db;
use folio_core::{
    data_uri_media_type, distinct_techs, init_logging, CollectionKind, ContentRepository,
    DeleteOutcome, DisplayMode, Editor, FolioConfig, ImageTarget, KeyValueStore, ModelType,
    ProfileImage, Project3DEntry, ProjectEntry, ProjectFilter, SlotWatcher, SqliteKvStore,
    TechFilter,
};
use log::info;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Parser)]
#[command(name = "folio", version, about = "Manage portfolio content")]
struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the slot database path
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Override the absolute log directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Editor passphrase; prompted when omitted
    #[arg(long, global = true)]
    passphrase: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List projects, optionally filtered
    List(ListArgs),
    /// Add a 2D project
    AddProject(AddProjectArgs),
    /// Add a 3D showcase project
    Add3d(Add3dArgs),
    /// Delete an entry by id
    Delete(DeleteArgs),
    /// Upload the profile image
    ProfileImage { file: PathBuf },
    /// Set the display mode
    DisplayMode { mode: ModeArg },
    /// Print slot changes as they happen
    Watch {
        /// Stop after this many poll intervals
        #[arg(long)]
        ticks: Option<u64>,
    },
}

#[derive(Debug, clap::Args)]
struct ListArgs {
    /// Case-insensitive search over title, description and tags
    #[arg(long)]
    search: Option<String>,
    /// Exact technology tag
    #[arg(long)]
    tech: Option<String>,
}

#[derive(Debug, clap::Args)]
struct AddProjectArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    description: String,
    /// Comma-separated technologies
    #[arg(long, default_value = "")]
    tech: String,
    /// Cover image file
    #[arg(long)]
    image: Option<PathBuf>,
    #[arg(long, default_value = "")]
    link: String,
}

#[derive(Debug, clap::Args)]
struct Add3dArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    description: String,
    #[arg(long, default_value = "box")]
    model: String,
    #[arg(long, default_value = "#697184")]
    color: String,
    #[arg(long, default_value = "")]
    link: String,
}

#[derive(Debug, clap::Args)]
struct DeleteArgs {
    #[arg(long, value_enum)]
    collection: CollectionArg,
    #[arg(long)]
    id: i64,
    /// Skip the confirmation prompt
    #[arg(long)]
    yes: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CollectionArg {
    Projects,
    #[value(name = "3d")]
    ThreeD,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Light,
    Dark,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = FolioConfig::load_or_default(cli.config.as_deref())?;
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(log_dir) = &cli.log_dir {
        config.log_dir = Some(log_dir.clone());
    }
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir)?;
    }

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;
    let store = SqliteKvStore::with_quota(&conn, config.quota_bytes)?;
    let repo = ContentRepository::with_seeds(store, config.seed_source());
    info!("event=cli_start module=cli status=ok command={:?}", cli.cmd);

    match cli.cmd {
        Command::List(args) => list(&repo, &args),
        Command::Watch { ticks } => watch(&repo, &config, ticks),
        command => {
            let passphrase = match cli.passphrase {
                Some(passphrase) => passphrase,
                None => read_line("Admin passphrase: ")?,
            };
            let mut editor = config.admin_gate().unlock(&passphrase, &repo)?;
            edit(&mut editor, command)
        }
    }
}

fn edit<S: KeyValueStore>(editor: &mut Editor<'_, S>, command: Command) -> Result<()> {
    match command {
        Command::AddProject(args) => {
            if let Some(image) = &args.image {
                editor.upload_image(image, ImageTarget::ProjectDraft)?;
            }
            let draft = editor.project_draft_mut();
            draft.title = args.title;
            draft.description = args.description;
            draft.tech = args.tech;
            draft.link = args.link;
            let entry = editor.add_project()?;
            println!("Project added successfully! id={}", entry.id);
        }
        Command::Add3d(args) => {
            let model_type = ModelType::parse(&args.model).ok_or_else(|| {
                anyhow!(
                    "unknown model `{}`; expected box|sphere|torus|octahedron",
                    args.model
                )
            })?;
            let draft = editor.project_3d_draft_mut();
            draft.title = args.title;
            draft.description = args.description;
            draft.model_type = model_type;
            draft.color = args.color;
            draft.link = args.link;
            let entry = editor.add_project_3d()?;
            println!("3D project added successfully! id={}", entry.id);
        }
        Command::Delete(args) => {
            let kind = match args.collection {
                CollectionArg::Projects => CollectionKind::Projects,
                CollectionArg::ThreeD => CollectionKind::Projects3D,
            };
            let outcome = if args.yes {
                editor.delete_entry(kind, args.id, &mut |_: &str| true)?
            } else {
                editor.delete_entry(kind, args.id, &mut confirm_on_stdin)?
            };
            match outcome {
                DeleteOutcome::Deleted => println!("Deleted {}.", args.id),
                DeleteOutcome::Cancelled => println!("Kept {}.", args.id),
                DeleteOutcome::NotFound => println!("No entry with id {}.", args.id),
            }
        }
        Command::ProfileImage { file } => {
            editor.upload_image(&file, ImageTarget::Profile)?;
            println!("Profile image uploaded!");
        }
        Command::DisplayMode { mode } => {
            let mode = match mode {
                ModeArg::Light => DisplayMode::Light,
                ModeArg::Dark => DisplayMode::Dark,
            };
            editor.set_display_mode(mode)?;
            println!("Display mode set to {mode:?}.");
        }
        Command::List(_) | Command::Watch { .. } => bail!("not an editor command"),
    }
    Ok(())
}

fn list<S: KeyValueStore>(repo: &ContentRepository<S>, args: &ListArgs) -> Result<()> {
    let projects = repo.load_projects();
    let filter = ProjectFilter {
        query: args.search.clone().unwrap_or_default(),
        tech: args
            .tech
            .clone()
            .map(TechFilter::Tag)
            .unwrap_or(TechFilter::All),
    };

    println!("Projects (tags: {})", distinct_techs(&projects).join(", "));
    let hits = filter.apply(&projects);
    if hits.is_empty() {
        println!("  No projects found matching your criteria.");
    }
    for project in hits {
        print_project(project);
    }

    println!("3D projects");
    for project in repo.load_3d_projects() {
        print_project_3d(&project);
    }

    println!("Profile image: {}", describe_image(repo.load_profile_image()));
    println!("Display mode: {:?}", repo.load_display_mode());
    Ok(())
}

fn watch<S: KeyValueStore>(
    repo: &ContentRepository<S>,
    config: &FolioConfig,
    ticks: Option<u64>,
) -> Result<()> {
    let interval = config.poll_interval();
    let now = Instant::now();
    let mut projects: SlotWatcher<Vec<ProjectEntry>> = SlotWatcher::mount(repo, interval, now);
    let mut projects_3d: SlotWatcher<Vec<Project3DEntry>> =
        SlotWatcher::mount(repo, interval, now);
    let mut profile: SlotWatcher<Option<ProfileImage>> = SlotWatcher::mount(repo, interval, now);
    let mut mode: SlotWatcher<DisplayMode> = SlotWatcher::mount(repo, interval, now);

    let mut remaining = ticks;
    loop {
        if remaining == Some(0) {
            return Ok(());
        }
        std::thread::sleep(interval);
        repo.pump();

        let now = Instant::now();
        if projects.tick(repo, now) {
            println!("projects: {} entries", projects.value().len());
        }
        if projects_3d.tick(repo, now) {
            println!("3d projects: {} entries", projects_3d.value().len());
        }
        if profile.tick(repo, now) {
            println!("profile image: {}", describe_image(profile.value().clone()));
        }
        if mode.tick(repo, now) {
            println!("display mode: {:?}", mode.value());
        }
        remaining = remaining.map(|left| left - 1);
    }
}

fn print_project(project: &ProjectEntry) {
    println!("  [{}] {} - {}", project.id, project.title, project.description);
    if !project.tech.is_empty() {
        println!("      tech: {}", project.tech.join(", "));
    }
    if let Some(link) = project.link_url() {
        println!("      link: {link}");
    }
}

fn print_project_3d(project: &Project3DEntry) {
    println!(
        "  [{}] {} ({} {}) - {}",
        project.id, project.title, project.model_type, project.color, project.description
    );
    if let Some(link) = project.link_url() {
        println!("      link: {link}");
    }
}

fn describe_image(image: Option<ProfileImage>) -> String {
    match image {
        Some(image) => match data_uri_media_type(image.as_str()) {
            Some(media) => format!("{media}, {} bytes", image.as_str().len()),
            None => image.into_inner(),
        },
        None => "none".to_string(),
    }
}

fn confirm_on_stdin(message: &str) -> bool {
    match read_line(&format!("{message} [y/N] ")) {
        Ok(answer) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

fn read_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
