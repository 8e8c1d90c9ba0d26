use std::time::Duration;

use clap::Parser;

use termcbt::api::{ExamApi, HttpExamApi};
use termcbt::cli::Cli;
use termcbt::config::Config;
use termcbt::loader::SessionLoader;
use termcbt::model::{answer_is_empty, AttemptStatus};
use termcbt::net::{self, NetJob};
use termcbt::session::App;
use termcbt::timer::format_duration;
use termcbt::{logging, tui};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let cli = Cli::parse();

    // File logging first, so every later step can trace. The guard flushes
    // the log on drop.
    let _log_guard = logging::init(&cli.log_level)?;

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(server) = &cli.server {
        config.api_base_url = server.trim().to_string();
    }
    if let Some(token) = &cli.token {
        config.token = token.trim().to_string();
    }
    config.validate()?;

    let api = HttpExamApi::new(
        &config.api_base_url,
        &config.token,
        &config.school_id,
        Duration::from_secs(config.request_timeout_secs),
    )
    .map_err(|e| format!("Cannot build HTTP client: {}", e))?;

    let mut loader = SessionLoader::new(api);

    // Resolve the attempt: resume an existing one, or start one for a paper
    let attempt_id = if let Some(paper_id) = &cli.paper {
        if config.school_id.is_empty() {
            return Err("Starting an attempt needs school_id in config.yaml.".to_string());
        }
        let bundle = loader
            .api()
            .start_attempt(paper_id)
            .map_err(|e| format!("Cannot start attempt: {}", e))?;
        let seed = loader
            .prime(bundle)
            .map_err(|e| format!("Cannot open attempt: {}", e))?;
        let id = seed.attempt.id.clone();
        eprintln!("Started attempt {}", id);
        id
    } else if let Some(id) = &cli.attempt_id {
        id.clone()
    } else {
        return Err("Provide an attempt id or --paper <exam-paper-id>. See --help.".to_string());
    };

    if cli.status {
        return print_status(&mut loader, &attempt_id);
    }

    let autosave = Duration::from_secs(config.autosave_interval_secs);
    let app = App::new(attempt_id.clone(), autosave);

    let (job_tx, net_rx) = net::spawn_worker(loader);
    job_tx
        .send(NetJob::FetchAttempt { attempt_id })
        .map_err(|e| format!("Cannot queue initial load: {}", e))?;

    tui::run_tui(app, job_tx, net_rx)
}

/// One-screen summary of an attempt without entering the TUI.
fn print_status(loader: &mut SessionLoader<HttpExamApi>, attempt_id: &str) -> Result<(), String> {
    let seed = loader
        .load(attempt_id)
        .map_err(|e| format!("Cannot load attempt: {}", e))?;

    let answered = seed
        .attempt
        .responses
        .iter()
        .filter(|r| !answer_is_empty(&r.answer))
        .count();
    let status = match seed.attempt.status {
        AttemptStatus::InProgress => "in progress",
        AttemptStatus::Submitted => "submitted",
    };

    println!("Attempt:    {}", seed.attempt.id);
    println!("Subject:    {}", seed.paper.subject.name);
    println!("Status:     {}", status);
    println!(
        "Answered:   {} of {} questions",
        answered, seed.paper.total_questions
    );
    println!(
        "Started:    {}",
        seed.attempt.start_time.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "Deadline:   {}",
        seed.deadline.format("%Y-%m-%d %H:%M:%S UTC")
    );

    if seed.attempt.status == AttemptStatus::InProgress {
        let remaining = seed
            .deadline
            .signed_duration_since(chrono::Utc::now())
            .num_seconds();
        if remaining > 0 {
            println!("Remaining:  {}", format_duration(remaining));
        } else {
            println!("Remaining:  expired");
        }
    }

    Ok(())
}
