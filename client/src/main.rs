//! Job board CLI
//!
//! Browses the job board from the terminal: filtered, paged listings,
//! job details, saved jobs and applications.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use client::{
    AddressBar, ApplicationForm, BrowseSession, ClientError, DetailView, FilterConfig, FilterSync,
    HttpTransport, JobTransport, ListView, MemoryAddress, ResumeFile, SavedJobsStore,
    SessionEvent, SimulatedTransport, load_detail,
};
use common::{DEFAULT_LIMIT, Job};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "jobboard")]
#[command(version)]
#[command(about = "Browse and apply to remote jobs")]
struct Cli {
    /// Base URL of the job board server
    #[arg(long, env = "JOBBOARD_SERVER", default_value = "http://127.0.0.1:3000")]
    server: String,

    /// Serve jobs from a local JSON corpus instead of the server
    #[arg(long, env = "JOBBOARD_CORPUS")]
    corpus: Option<PathBuf>,

    /// Directory holding the saved-jobs store
    #[arg(long, env = "JOBBOARD_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List jobs matching the filters
    List(ListArgs),

    /// Show a single job
    Show { id: String },

    /// Save or unsave a job
    Save { id: String },

    /// List saved jobs
    Saved,

    /// Apply to a job
    Apply(ApplyArgs),
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Shareable filter address, e.g. "?search=rust&location=remote"
    #[arg(long, default_value = "")]
    query: String,

    /// Text to find in title or company
    #[arg(long)]
    search: Option<String>,

    #[arg(long)]
    location: Option<String>,

    #[arg(long)]
    min_salary: Option<u64>,

    #[arg(long)]
    max_salary: Option<u64>,

    /// Jobs per page
    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    limit: u32,

    /// Stop after this many pages
    #[arg(long, default_value_t = 1)]
    pages: u32,
}

#[derive(Args, Debug)]
struct ApplyArgs {
    id: String,

    #[arg(long)]
    name: String,

    #[arg(long)]
    email: String,

    /// PDF or DOCX résumé, at most 5MB
    #[arg(long)]
    resume: PathBuf,

    #[arg(long)]
    cover_letter: String,
}

fn transport(cli: &Cli) -> Result<Arc<dyn JobTransport>> {
    Ok(match &cli.corpus {
        Some(path) => Arc::new(
            SimulatedTransport::from_file(path)
                .with_context(|| format!("failed to load corpus {}", path.display()))?,
        ),
        None => Arc::new(HttpTransport::new(&cli.server)?),
    })
}

fn print_job(job: &Job, saved: bool) {
    let marker = if saved { "*" } else { " " };
    println!(
        "{marker} [{}] {} at {} | {} | {} | posted {}",
        job.id,
        job.title,
        job.company,
        job.location,
        job.salary_range(),
        job.posted_ago(Utc::now()),
    );
}

async fn list(cli: &Cli, args: &ListArgs, store: &mut SavedJobsStore) -> Result<()> {
    let address = Arc::new(MemoryAddress::new(&args.query));
    let mut filters = FilterSync::new(address.clone(), FilterConfig::default());

    let mut criteria = filters.current().criteria;
    if let Some(search) = &args.search {
        criteria.search = search.clone();
    }
    if let Some(location) = &args.location {
        criteria.location = location.clone();
    }
    if let Some(min) = args.min_salary {
        criteria.min_salary = min;
    }
    if let Some(max) = args.max_salary {
        criteria.max_salary = max;
    }
    filters.set_criteria(criteria);

    let mut session = BrowseSession::new(transport(cli)?, filters.subscribe(), args.limit)?;
    session.start();

    // the sentinel sits right under an empty list, so it starts out visible
    let (visibility, mut sensor) = mpsc::channel(1);
    visibility.send(true).await?;

    let mut loaded = 0;
    while loaded < args.pages && !session.is_exhausted() {
        match session.step(&mut sensor).await {
            SessionEvent::PageLoaded { .. } => loaded += 1,
            SessionEvent::PageFailed { reason, .. } => bail!("query failed: {reason}"),
            SessionEvent::Closed => break,
            _ => {}
        }
    }

    match session.view() {
        ListView::Jobs {
            jobs,
            total_items,
            error,
            ..
        } => {
            for job in jobs {
                print_job(job, store.is_saved(&job.id));
            }
            println!(
                "\nshowing {} of {} jobs",
                jobs.len(),
                total_items
            );
            if let Some(reason) = error {
                eprintln!("Error: {reason}");
            }
        }
        ListView::Empty => println!("No jobs found matching your criteria"),
        ListView::Error(reason) => bail!("Error: {reason}"),
        ListView::Loading => {}
    }
    println!("share: ?{}", address.query());

    store.set_jobs(session.jobs().to_vec())?;
    Ok(())
}

async fn show(cli: &Cli, id: &str, store: &SavedJobsStore) -> Result<()> {
    let transport = transport(cli)?;
    match load_detail(transport.as_ref(), id).await? {
        DetailView::Loaded(job) => {
            println!("{} ({})", job.title, job.company_initials());
            println!("{}", job.company);
            println!("{} | {} | posted {}", job.location, job.salary_range(), job.posted_ago(Utc::now()));
            println!("{}", job.company_website);
            if store.is_saved(&job.id) {
                println!("saved");
            }
            println!("\nAbout the Role\n\n{}", job.description);
        }
        DetailView::NotFound(id) => bail!("job {id} not found"),
    }
    Ok(())
}

async fn apply(cli: &Cli, args: &ApplyArgs) -> Result<()> {
    let mut form = ApplicationForm::new(&args.id);
    form.set_full_name(&args.name);
    form.set_email(&args.email);
    form.set_resume(Some(ResumeFile::from_path(&args.resume).with_context(|| {
        format!("failed to read résumé {}", args.resume.display())
    })?));
    form.set_cover_letter(&args.cover_letter);

    if !form.can_submit() {
        for error in form.errors() {
            eprintln!("{error}");
        }
        bail!("application is not valid");
    }

    match form.submit(transport(cli)?.as_ref()).await {
        Ok(receipt) => {
            println!("Application submitted successfully! ({})", receipt.id);
            Ok(())
        }
        Err(ClientError::Validation(errors)) => {
            for error in errors {
                eprintln!("{error}");
            }
            bail!("application was rejected");
        }
        Err(err) => Err(err).context("Error submitting form!"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut store = SavedJobsStore::open(&cli.data_dir)
        .with_context(|| format!("failed to open store in {}", cli.data_dir.display()))?;

    match &cli.command {
        Commands::List(args) => list(&cli, args, &mut store).await?,
        Commands::Show { id } => show(&cli, id, &store).await?,
        Commands::Save { id } => {
            if store.toggle(id)? {
                println!("saved {id}");
            } else {
                println!("removed {id} from saved jobs");
            }
        }
        Commands::Saved => {
            for id in store.saved() {
                match store.jobs().iter().find(|job| &job.id == id) {
                    Some(job) => print_job(job, true),
                    None => println!("* [{id}]"),
                }
            }
        }
        Commands::Apply(args) => apply(&cli, args).await?,
    }

    Ok(())
}
