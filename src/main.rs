use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use dra::access::{Department, DepartmentSelection, Project, Role, join_departments, visible_departments};
use dra::error::ErrorCode;
use dra::llm::LlmClient;
use dra::llm::types::LlmError;
use dra::render::{View, render_message};
use dra::retrieval::MockRetriever;
use dra::services::answer::AnswerService;
use dra::services::session::{ChatSession, ConnectPolicy, SessionError, SubmitError};

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("LLM setup failed [{code}]: {0}", code = .0.error_code())]
    Llm(#[from] LlmError),
    #[error("[{code}] {0}", code = .0.error_code())]
    Session(#[from] SessionError),
    #[error("[{code}] {0}", code = .0.error_code())]
    Submit(#[from] SubmitError),
    #[error("stdin read failed: {0}")]
    Stdin(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "dra", about = "Role-scoped project assistant")]
struct Cli {
    #[arg(long, env = "DRA_ROLE", default_value = "Employee")]
    role: Role,

    /// Departments to search (repeat or comma-separate). Defaults to Legal, Approvals, Title.
    #[arg(long = "department", short = 'd', value_delimiter = ',')]
    departments: Vec<Department>,

    #[arg(long, env = "DRA_PROJECT", default_value = "iHeart")]
    project: Project,

    /// Print structured answers as JSON instead of narrative text.
    #[arg(long)]
    json: bool,

    /// Ask a single question and exit.
    #[arg(long, short = 'q')]
    question: Option<String>,

    #[arg(long, env = "DRA_CONNECT_ATTEMPTS", default_value_t = 3)]
    connect_attempts: u32,
}

/// One line of interactive input.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Question(String),
    Role(Role),
    Toggle(Department),
    View(View),
    Status,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Input::Question(line.to_string());
    };
    let (name, arg) = command.split_once(' ').unwrap_or((command, ""));
    match name {
        "role" => arg
            .parse()
            .map_or_else(|e: dra::access::ParseError| Input::Invalid(e.to_string()), Input::Role),
        "dept" | "department" => arg
            .parse()
            .map_or_else(|e: dra::access::ParseError| Input::Invalid(e.to_string()), Input::Toggle),
        "view" => arg.parse().map_or_else(Input::Invalid, Input::View),
        "status" => Input::Status,
        "help" => Input::Help,
        "quit" | "exit" => Input::Quit,
        other => Input::Invalid(format!("unknown command: /{other}")),
    }
}

const HELP: &str = "Commands:
  /role <Admin|Board|Employee|Customer>  switch role
  /dept <Legal|Approvals|Title|Finance>  toggle a department
  /view <narrative|json>                 answer display
  /status                                show role, departments, connection
  /quit                                  leave
Anything else is sent as a question.";

fn status_line(session: &ChatSession, project: Project) -> String {
    format!(
        "project: {project} | role: {} | searching in: {} | available: {} | {}",
        session.role(),
        if session.selection().is_empty() {
            "(none selected)".to_string()
        } else {
            join_departments(session.selection().departments())
        },
        join_departments(&visible_departments(session.role())),
        session.connection().as_str(),
    )
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Fail fast before any session state exists.
    let llm = LlmClient::from_env()?;
    tracing::info!(model = llm.model(), "LLM client initialized");

    let retriever = Arc::new(MockRetriever::new(cli.project));
    let service = AnswerService::new(Arc::new(llm), retriever.clone()).with_project(cli.project);

    let selection = if cli.departments.is_empty() {
        DepartmentSelection::default()
    } else {
        DepartmentSelection::from_departments(cli.departments.iter().copied())
    };
    let mut session = ChatSession::new(cli.role, selection);
    let policy = ConnectPolicy { max_attempts: cli.connect_attempts.max(1), ..ConnectPolicy::default() };
    session.connect(retriever.as_ref(), policy).await?;

    let mut view = if cli.json { View::Json } else { View::Narrative };

    if let Some(question) = cli.question {
        return ask(&mut session, &service, &question, view).await;
    }

    eprintln!("{}", status_line(&session, service.project()));
    eprintln!("Type /help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_input(&line) {
            Input::Question(text) => {
                if let Err(e) = ask(&mut session, &service, &text, view).await {
                    eprintln!("error: {e}");
                }
            }
            Input::Role(role) => {
                session.set_role(role);
                eprintln!("{}", status_line(&session, service.project()));
            }
            Input::Toggle(dept) => match session.toggle_department(dept) {
                Ok(_) => eprintln!("{}", status_line(&session, service.project())),
                Err(e) => eprintln!("error: {}", CliError::from(e)),
            },
            Input::View(next) => view = next,
            Input::Status => eprintln!("{}", status_line(&session, service.project())),
            Input::Help => eprintln!("{HELP}"),
            Input::Quit => break,
            Input::Empty => {}
            Input::Invalid(msg) => eprintln!("error: {msg}"),
        }
    }
    Ok(())
}

async fn ask(session: &mut ChatSession, service: &AnswerService, text: &str, view: View) -> Result<(), CliError> {
    let id = session.submit(service, text).await?;
    if let Some(message) = session.messages().iter().find(|m| m.id == id) {
        println!("{}", render_message(message, view));
    }
    Ok(())
}
