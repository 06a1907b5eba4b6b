//! AlumTrace - Alumni Record Tracing
//!
//! Command-line client: find your alumni record, claim it, sign in and
//! read announcements.

use alumtrace::api::{AccountService, AlumniDirectory, HttpApi, UserRole};
use alumtrace::claim::{ClaimFlow, ClaimOutcome, ConfirmOutcome};
use alumtrace::config::Config;
use alumtrace::consent::{ConsentGate, ConsentOutcome, CONSENT_NOTICE};
use alumtrace::core::CandidateRecord;
use alumtrace::error::TraceError;
use alumtrace::locator::{OutcomeKind, RecordLocator, SearchDebouncer};
use alumtrace::login::{LoginFlow, LoginOutcome};
use alumtrace::posts::{render_detail, summary_line, PostBoard};
use alumtrace::selection::{SelectionHandler, SelectionResult};
use alumtrace::session::{session_path, Session, SessionManager};
use alumtrace::utils::{suggest, ScoringConfig};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Wrong answers allowed at the verification step
const VERIFY_ATTEMPTS: usize = 3;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search the alumni directory by name and/or graduation year
    Search {
        /// Full or partial name
        #[arg(default_value = "")]
        name: String,
        #[arg(short, long, default_value = "")]
        year: String,
    },
    /// Find your record and set up a username and password for it
    Claim {
        #[arg(default_value = "")]
        name: String,
        #[arg(short, long, default_value = "")]
        year: String,
    },
    /// Sign in
    Login {
        username: Option<String>,
        /// alumni, admin or program_head
        #[arg(short, long, default_value = "alumni")]
        role: UserRole,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Answer the data privacy notice for the signed-in user
    Consent,
    /// List announcements, or show one by id
    Posts { id: Option<u64> },
    /// Show who is signed in
    Whoami,
}

/// Everything the commands need, built once from the config
struct App {
    config: Config,
    api: Arc<HttpApi>,
    sessions: Arc<SessionManager>,
}

impl App {
    fn new(config: Config) -> Result<Self> {
        let api = Arc::new(HttpApi::new(&config)?);
        let sessions = Arc::new(SessionManager::persistent(session_path()));
        Ok(Self {
            config,
            api,
            sessions,
        })
    }

    fn debouncer(&self) -> SearchDebouncer {
        let scoring = ScoringConfig {
            year_weight: self.config.year_weight,
        };
        let locator = RecordLocator::new(self.api.clone(), scoring);
        SearchDebouncer::new(
            Arc::new(locator),
            Duration::from_millis(self.config.debounce_ms),
        )
    }

    fn accounts(&self) -> Arc<dyn AccountService> {
        self.api.clone()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load()?;

    // Setup logging. RUST_LOG wins over both flags.
    let level = if args.verbose {
        "debug".to_string()
    } else {
        config.log_level.to_lowercase()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    debug!("🎓 AlumTrace v{} using {}", env!("CARGO_PKG_VERSION"), config.api_base());
    let app = App::new(config)?;

    match args.command {
        Command::Search { name, year } => cmd_search(&app, name, year).await,
        Command::Claim { name, year } => cmd_claim(&app, name, year).await,
        Command::Login { username, role } => cmd_login(&app, username, role).await,
        Command::Logout => {
            app.sessions.logout().await?;
            println!("Signed out.");
            Ok(())
        }
        Command::Consent => cmd_consent(&app).await,
        Command::Posts { id } => cmd_posts(&app, id).await,
        Command::Whoami => cmd_whoami(&app).await,
    }
}

/// Print a prompt and read one trimmed line from stdin
fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn prompt_yes(label: &str) -> Result<bool> {
    let answer = prompt(&format!("{} [y/N] ", label))?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Ask for name and year when neither came on the command line
fn search_terms(name: String, year: String) -> Result<(String, String)> {
    if !name.trim().is_empty() || !year.trim().is_empty() {
        return Ok((name, year));
    }
    let name = prompt("Name: ")?;
    let year = prompt("Graduation year (optional): ")?;
    Ok((name, year))
}

/// Run a search and report it. `None` when there is nothing to pick from.
async fn locate(app: &App, name: &str, year: &str) -> Result<Option<Vec<CandidateRecord>>> {
    let debouncer = app.debouncer();
    let Some(result) = debouncer.search_now(name, year).await else {
        return Ok(None);
    };

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(TraceError::Validation(msg)) => {
            println!("{}", msg);
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    println!("{}", outcome.status);
    if let Some(message) = &outcome.message {
        println!("{}", message);
    }
    match outcome.kind {
        OutcomeKind::Matches => Ok(Some(outcome.results)),
        OutcomeKind::NoMatches | OutcomeKind::Failed => Ok(None),
    }
}

async fn cmd_search(app: &App, name: String, year: String) -> Result<()> {
    let (name, year) = search_terms(name, year)?;
    let Some(results) = locate(app, &name, &year).await? else {
        return Ok(());
    };

    let mut handler = SelectionHandler::new(app.config.page_size);
    handler.set_items(results);
    loop {
        for line in handler.page_lines() {
            println!("{}", line);
        }
        if handler.handle_command("next") != SelectionResult::NextPage {
            break;
        }
    }
    println!("Run `alumtrace claim` to claim your record.");
    Ok(())
}

/// Let the user page through results and pick one
fn pick_record(page_size: usize, results: Vec<CandidateRecord>) -> Result<Option<CandidateRecord>> {
    let mut handler = SelectionHandler::new(page_size);
    handler.set_items(results);

    loop {
        for line in handler.page_lines() {
            println!("{}", line);
        }
        let input = prompt("Pick a number, 'next', 'prev' or 'cancel': ")?;
        match handler.handle_command(&input) {
            SelectionResult::Selected(record, _) => return Ok(Some(record)),
            SelectionResult::Cancelled => return Ok(None),
            SelectionResult::NextPage | SelectionResult::PreviousPage | SelectionResult::ShowOptions => {}
            SelectionResult::NotRecognized => println!("Not recognized: '{}'", input.trim()),
        }
    }
}

async fn cmd_claim(app: &App, name: String, year: String) -> Result<()> {
    let (name, year) = search_terms(name, year)?;
    let Some(results) = locate(app, &name, &year).await? else {
        return Ok(());
    };
    let Some(record) = pick_record(app.config.page_size, results)? else {
        println!("Cancelled.");
        return Ok(());
    };

    let mut flow = ClaimFlow::new(app.accounts(), app.sessions.clone());
    flow.select(record.clone());

    let is_me = prompt_yes(&format!("Is this you: {}?", record.full_name))?;
    match flow.confirm(is_me)? {
        ConfirmOutcome::Verify => {}
        ConfirmOutcome::Cancelled => {
            println!("Okay. Search again with a different spelling or year.");
            return Ok(());
        }
        ConfirmOutcome::AccountExists => {
            println!(
                "This alumni record already has credentials on file. \
                 Sign in with `alumtrace login` instead."
            );
            return Ok(());
        }
    }

    let programs = match app.api.programs().await {
        Ok(programs) => programs,
        Err(e) => {
            warn!("Could not load program list: {}", e);
            Vec::new()
        }
    };

    let mut verified = false;
    for _ in 0..VERIFY_ATTEMPTS {
        let course = prompt("Program/course: ")?;
        let hints = suggest(&programs, &course, 5);
        if !hints.is_empty() && !hints.iter().any(|h| h.eq_ignore_ascii_case(course.trim())) {
            println!("Known programs: {}", hints.join(", "));
        }
        let grad_year = prompt("Year graduated: ")?;

        match flow.verify(&course, &grad_year) {
            Ok(()) => {
                verified = true;
                break;
            }
            Err(TraceError::Validation(msg)) => println!("{}", msg),
            Err(e) => return Err(e.into()),
        }
    }
    if !verified {
        flow.cancel();
        println!("Too many failed attempts.");
        return Ok(());
    }
    println!("Verification successful. Choose your login details.");

    let outcome = loop {
        let username = prompt("Username: ")?;
        let password = prompt("Password: ")?;
        let confirm = prompt("Confirm password: ")?;
        match flow.submit(&username, &password, &confirm).await {
            Ok(outcome) => break outcome,
            Err(TraceError::Validation(msg)) => println!("{}", msg),
            Err(e) => {
                println!("{}", e.user_message());
                return Ok(());
            }
        }
    };

    match outcome {
        ClaimOutcome::SignedIn(session) => {
            println!("Account created. Signed in as {}.", session.display_name());
            if session.needs_consent() {
                answer_consent(app, session).await?;
            }
        }
        ClaimOutcome::LoginRequired { prefill_username } => {
            println!(
                "Account created successfully. Please login to continue: \
                 alumtrace login {}",
                prefill_username
            );
        }
    }
    Ok(())
}

async fn cmd_login(app: &App, username: Option<String>, role: UserRole) -> Result<()> {
    let username = match username {
        Some(u) => u,
        None => prompt("Username: ")?,
    };
    let password = prompt("Password: ")?;

    let flow = LoginFlow::new(app.accounts(), app.sessions.clone());
    match flow.login(&username, &password, role).await {
        Ok(LoginOutcome::SignedIn(session)) => {
            println!("Signed in as {} ({}).", session.display_name(), session.role);
        }
        Ok(LoginOutcome::ConsentRequired(session)) => answer_consent(app, session).await?,
        Err(e) => println!("{}", e.user_message()),
    }
    Ok(())
}

/// Show the privacy notice and record the answer
async fn answer_consent(app: &App, session: Session) -> Result<()> {
    println!("\n{}\n", CONSENT_NOTICE);
    let accept = prompt_yes("I agree")?;

    let gate = ConsentGate::new(app.accounts(), app.sessions.clone());
    match gate.answer(session, accept).await {
        Ok(ConsentOutcome::Accepted(session)) => {
            println!("Thank you. Signed in as {}.", session.display_name());
        }
        Ok(ConsentOutcome::Declined(message)) => {
            app.sessions.logout().await?;
            println!("{}", message);
        }
        Err(e) => println!("{}", e.user_message()),
    }
    Ok(())
}

async fn cmd_consent(app: &App) -> Result<()> {
    match app.sessions.current().await {
        Some(session) if session.needs_consent() => answer_consent(app, session).await,
        Some(session) => {
            println!("No consent needed for {}.", session.display_name());
            Ok(())
        }
        None => {
            println!("Not signed in.");
            Ok(())
        }
    }
}

async fn cmd_posts(app: &App, id: Option<u64>) -> Result<()> {
    let board = PostBoard::new(app.api.clone());
    let result = match id {
        Some(id) => board.show(id).await.map(|post| println!("{}", render_detail(&post))),
        None => board.latest().await.map(|posts| {
            if posts.is_empty() {
                println!("No announcements yet.");
            }
            for post in &posts {
                println!("{}", summary_line(post));
            }
        }),
    };
    if let Err(e) = result {
        println!("{}", e.user_message());
    }
    Ok(())
}

async fn cmd_whoami(app: &App) -> Result<()> {
    let Some(session) = app.sessions.current().await else {
        println!("Not signed in.");
        return Ok(());
    };

    let now = chrono::Utc::now();
    let token = match (&session.token, session.token_expires_at) {
        (Some(_), Some(expires)) if session.is_token_valid(now) => {
            format!("token valid until {}", expires.format("%Y-%m-%d %H:%M UTC"))
        }
        (Some(_), _) => "token expired".to_string(),
        (None, _) => "no token".to_string(),
    };
    info!("👤 Session loaded from {}", session_path().display());
    println!("{} ({}), {}", session.display_name(), session.role, token);
    if session.needs_consent() {
        println!("Privacy consent pending: run `alumtrace consent`.");
    }
    Ok(())
}
