use std::io::{self, BufRead, Write};

use clap::Parser;
use minidb::{Config, Output, Session, session::ReplayReport};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = Config::parse();
    let mut session = Session::new(config.key_type);
    info!(key_type = ?session.database().key_type(), "session started");

    if let Some(script) = config.script {
        match session.execute(minidb::ast::Command::ReadFrom(script)) {
            Ok(output) => print_output(&output),
            Err(e) => eprintln!("{e}"),
        }
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("minidb> ");
        // a failed flush only affects the prompt
        let _ = io::stdout().flush();

        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                eprintln!("{e}");
                break;
            }
            None => break,
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line {
            ".exit" => break,
            ".tables" => {
                for name in session.database().list_tables() {
                    println!("{name}");
                }
                continue;
            }
            _ => {}
        }

        match session.run(line) {
            Ok(output) => print_output(&output),
            Err(e) => eprintln!("{e}"),
        }
    }
}

fn print_output(output: &Output) {
    match output {
        Output::Created(table) => println!("created table {table}"),
        Output::Inserted { table, replaced } => {
            let verb = if *replaced { "replaced" } else { "inserted" };
            println!("{verb} 1 record in {table}");
        }
        Output::Rows(result) => {
            print!("{result}");
            println!("({} rows)", result.rows.len());
        }
        Output::Deleted { table, count } => println!("deleted {count} records from {table}"),
        Output::Saved { path, lines } => println!("saved {lines} commands to {}", path.display()),
        Output::Replayed(report) => print_report(report),
    }
}

fn print_report(report: &ReplayReport) {
    for result in &report.results {
        print!("{result}");
        println!();
    }
    for failure in &report.failures {
        println!(
            "{}:{}: {}\n    {}",
            failure.path.display(),
            failure.line_number,
            failure.error,
            failure.line
        );
    }
    println!(
        "replayed {} commands from {} ({} failed)",
        report.executed,
        report.path.display(),
        report.failures.len()
    );
}
