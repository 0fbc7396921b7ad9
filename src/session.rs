use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::{
    ast::Command,
    database::{Database, QueryResult},
    error::{Error, Result},
    key::KeyType,
    parser, persistence,
};

/// How deep `READ_FROM` commands may nest inside replayed files.
pub const MAX_REPLAY_DEPTH: usize = 8;

/// What a successfully executed command produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Created(String),
    Inserted { table: String, replaced: bool },
    Rows(QueryResult),
    Deleted { table: String, count: usize },
    Saved { path: PathBuf, lines: usize },
    Replayed(ReplayReport),
}

/// Outcome of a `READ_FROM`: failing lines are collected, not fatal.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayReport {
    pub path: PathBuf,
    /// Number of lines that executed successfully.
    pub executed: usize,
    /// Failures in this file and in any file it replayed in turn.
    pub failures: Vec<LineFailure>,
    /// Result sets of the `SELECT` lines, in file order.
    pub results: Vec<QueryResult>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineFailure {
    pub path: PathBuf,
    /// 1-based line number in `path`.
    pub line_number: usize,
    pub line: String,
    pub error: Error,
}

/// A database plus the log of commands that changed or read it.
///
/// This is the entry point for text commands: each line is parsed, executed
/// against the owned [Database] and, on success, recorded in the history
/// that `SAVE_AS` writes out.
///
/// # Example
/// ```
/// # use minidb::{Session, key::KeyType, session::Output};
/// let mut session = Session::new(KeyType::Int);
/// session.run("CREATE Users KEY Id FIELDS Name:STRING").unwrap();
/// session.run(r#"INSERT Id=1, Name="Ann" INTO Users"#).unwrap();
///
/// let Output::Rows(result) = session.run("SELECT Name FROM Users WHERE Id = 1").unwrap() else {
///     panic!("expected rows");
/// };
/// assert_eq!(result.rows.len(), 1);
/// assert_eq!(session.history().len(), 3);
/// ```
#[derive(Debug)]
pub struct Session {
    database: Database,
    history: Vec<String>,
    /// Current `READ_FROM` nesting level.
    depth: usize,
}

impl Session {
    pub fn new(key_type: KeyType) -> Self {
        Self {
            database: Database::new(key_type),
            history: Vec::new(),
            depth: 0,
        }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Canonical text of every successfully executed command, oldest first.
    /// `SAVE_AS` and `READ_FROM` are not recorded; the commands a replay runs are.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Parses and executes one command line.
    ///
    /// A failing line leaves both the database and the history untouched.
    pub fn run(&mut self, line: &str) -> Result<Output> {
        let command = parser::parse(line)?;
        debug!(%command, "parsed command");
        self.execute(command)
    }

    /// Executes an already parsed command.
    pub fn execute(&mut self, command: Command) -> Result<Output> {
        let entry = match &command {
            Command::SaveAs(_) | Command::ReadFrom(_) => None,
            other => Some(other.to_string()),
        };

        let output = match command {
            Command::CreateTable(create) => {
                let name = create.name.clone();
                self.database.create(create)?;
                Output::Created(name)
            }
            Command::InsertInto(insert) => {
                let table = insert.table.clone();
                let replaced = self.database.insert(insert)?;
                Output::Inserted { table, replaced }
            }
            Command::Select(select) => Output::Rows(self.database.select(&select)?),
            Command::Delete(delete) => {
                let table = delete.table.clone();
                let count = self.database.delete(delete)?;
                Output::Deleted { table, count }
            }
            Command::SaveAs(path) => self.save(path)?,
            Command::ReadFrom(path) => Output::Replayed(self.replay(&path)?),
        };

        if let Some(entry) = entry {
            self.history.push(entry);
        }
        Ok(output)
    }

    fn save(&self, path: PathBuf) -> Result<Output> {
        persistence::save_lines(&path, &self.history)?;
        info!(path = %path.display(), lines = self.history.len(), "saved history");
        Ok(Output::Saved {
            path,
            lines: self.history.len(),
        })
    }

    /// Runs every line of `path` in order, continuing past failures.
    fn replay(&mut self, path: &Path) -> Result<ReplayReport> {
        if self.depth >= MAX_REPLAY_DEPTH {
            return Err(Error::ReplayDepthExceeded(MAX_REPLAY_DEPTH));
        }
        let lines = persistence::load_lines(path)?;

        let mut report = ReplayReport {
            path: path.to_path_buf(),
            executed: 0,
            failures: Vec::new(),
            results: Vec::new(),
        };

        self.depth += 1;
        for (line_number, line) in lines {
            match self.run(&line) {
                Ok(output) => {
                    report.executed += 1;
                    match output {
                        Output::Rows(result) => report.results.push(result),
                        Output::Replayed(nested) => {
                            report.results.extend(nested.results);
                            report.failures.extend(nested.failures);
                        }
                        _ => {}
                    }
                }
                Err(error) => {
                    warn!(path = %path.display(), line_number, %error, "replayed line failed");
                    report.failures.push(LineFailure {
                        path: path.to_path_buf(),
                        line_number,
                        line,
                        error,
                    });
                }
            }
        }
        self.depth -= 1;

        info!(
            path = %path.display(),
            executed = report.executed,
            failed = report.failures.len(),
            "replayed file"
        );
        Ok(report)
    }
}
