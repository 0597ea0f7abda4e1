/*!
 * Interactive command shell over one control session
 */

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::app::StreamingApp;
use crate::cli_style::{app_table, Theme};
use crate::error::{ApexError, Result};
use crate::session::ApexSession;

const PROMPT: &str = "apex> ";

const HELP: &str = "\
Commands:
  new <name>            create a streaming application
  folder <name> <dir>   read input from <dir>
  print <name>          print the stream output
  launch <name>         launch the DAG
  appid <name>          show the application id
  find <app-id>         look up an application by id
  kill <app-id>         kill an application by id
  killall               kill every launched application
  list                  show all applications
  prune                 forget killed applications
  help                  show this text
  quit                  leave the shell";

/// One parsed shell line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    New(String),
    Folder { name: String, dir: String },
    Print(String),
    Launch(String),
    AppId(String),
    Find(String),
    Kill(String),
    KillAll,
    List,
    Prune,
    Help,
    Quit,
}

impl Command {
    /// Parse a line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        if verb.starts_with('#') {
            return Ok(None);
        }

        let args: Vec<&str> = words.collect();
        let arity = |n: usize, usage: &str| -> Result<()> {
            if args.len() == n {
                Ok(())
            } else {
                Err(ApexError::InvalidCommand(format!("usage: {}", usage)))
            }
        };

        let command = match verb {
            "new" => {
                arity(1, "new <name>")?;
                Command::New(args[0].to_string())
            }
            "folder" => {
                arity(2, "folder <name> <dir>")?;
                Command::Folder {
                    name: args[0].to_string(),
                    dir: args[1].to_string(),
                }
            }
            "print" => {
                arity(1, "print <name>")?;
                Command::Print(args[0].to_string())
            }
            "launch" => {
                arity(1, "launch <name>")?;
                Command::Launch(args[0].to_string())
            }
            "appid" => {
                arity(1, "appid <name>")?;
                Command::AppId(args[0].to_string())
            }
            "find" => {
                arity(1, "find <app-id>")?;
                Command::Find(args[0].to_string())
            }
            "kill" => {
                arity(1, "kill <app-id>")?;
                Command::Kill(args[0].to_string())
            }
            "killall" => {
                arity(0, "killall")?;
                Command::KillAll
            }
            "list" | "ls" => {
                arity(0, "list")?;
                Command::List
            }
            "prune" => {
                arity(0, "prune")?;
                Command::Prune
            }
            "help" | "?" => {
                arity(0, "help")?;
                Command::Help
            }
            "quit" | "exit" => {
                arity(0, "quit")?;
                Command::Quit
            }
            other => {
                return Err(ApexError::InvalidCommand(format!(
                    "unknown command '{}' (try 'help')",
                    other
                )))
            }
        };
        Ok(Some(command))
    }
}

/// Whether the shell keeps reading after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Shell state: the session plus a name index of the apps created here
pub struct Shell<'a> {
    session: &'a ApexSession,
    by_name: HashMap<String, Arc<StreamingApp>>,
}

impl<'a> Shell<'a> {
    pub fn new(session: &'a ApexSession) -> Self {
        Self {
            session,
            by_name: HashMap::new(),
        }
    }

    fn app(&self, name: &str) -> Result<&Arc<StreamingApp>> {
        self.by_name
            .get(name)
            .ok_or_else(|| ApexError::InvalidCommand(format!("no application named '{}'", name)))
    }

    /// Run one command, writing its output to `out`
    pub async fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> Result<Flow> {
        debug!("shell: {:?}", command);

        match command {
            Command::New(name) => {
                if self.by_name.contains_key(&name) {
                    return Err(ApexError::InvalidCommand(format!(
                        "application '{}' already exists",
                        name
                    )));
                }
                let app = self.session.new_app(&name).await?;
                self.by_name.insert(name.clone(), app);
                writeln!(out, "Created {}", name)?;
            }
            Command::Folder { name, dir } => {
                self.app(&name)?.from_folder(&dir).await?;
                writeln!(out, "{}: reading from {}", name, dir)?;
            }
            Command::Print(name) => {
                self.app(&name)?.print_stream().await?;
                writeln!(out, "{}: printing enabled", name)?;
            }
            Command::Launch(name) => {
                let app = self.app(&name)?;
                let app_id = app.launch_dag().await?;
                writeln!(out, "AppID: {} started.", app_id)?;
            }
            Command::AppId(name) => {
                writeln!(out, "{}", self.app(&name)?.app_id()?)?;
            }
            Command::Find(app_id) => match self.session.get_app(&app_id).await {
                Some(app) => {
                    let phase = app.phase();
                    writeln!(out, "{} -> {} ({})", app_id, app.name(), phase)?;
                }
                None => writeln!(out, "App Not Found")?,
            },
            Command::Kill(app_id) => {
                self.session.kill_app(&app_id).await?;
                writeln!(out, "AppID: {} killed.", app_id)?;
            }
            Command::KillAll => {
                let killed = self.session.registry().kill_all().await?;
                writeln!(out, "Killed {} application(s)", killed)?;
            }
            Command::List => {
                let mut rows = Vec::new();
                for app in self.session.registry().list().await {
                    let app_id = app.app_id().ok().map(str::to_string);
                    rows.push((app.name().to_string(), app.phase(), app_id));
                }
                if rows.is_empty() {
                    writeln!(out, "{}", Theme::muted("No applications"))?;
                } else {
                    writeln!(out, "{}", app_table(&rows))?;
                }
            }
            Command::Prune => {
                let removed = self.session.registry().remove_killed().await;
                let live = self.session.registry().list().await;
                self.by_name
                    .retain(|_, app| live.iter().any(|l| Arc::ptr_eq(l, app)));
                writeln!(out, "Removed {} killed application(s)", removed)?;
            }
            Command::Help => writeln!(out, "{}", HELP)?,
            Command::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    /// Read commands from `input` until EOF or `quit`.
    ///
    /// Command failures are reported on `out` and the loop continues; only
    /// I/O errors end it.
    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();
        loop {
            write!(out, "{}", PROMPT)?;
            out.flush()?;

            let Some(line) = lines.next_line().await? else {
                writeln!(out)?;
                return Ok(());
            };

            let outcome = match Command::parse(&line) {
                Ok(Some(command)) => self.execute(command, out).await,
                Ok(None) => Ok(Flow::Continue),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => return Ok(()),
                Err(ApexError::Io(e)) => return Err(ApexError::Io(e)),
                Err(e) => {
                    debug!(category = %e.category(), "shell command failed: {}", e);
                    writeln!(out, "{} {}", Theme::error("error:"), e)?;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apex_core_interface::mock::MockEngine;

    fn session(engine: &MockEngine) -> ApexSession {
        ApexSession::new(Arc::new(engine.clone()))
    }

    async fn run_script(session: &ApexSession, script: &str) -> String {
        let mut shell = Shell::new(session);
        let mut out = Vec::new();
        shell.run(script.as_bytes(), &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse("new job1").unwrap(),
            Some(Command::New("job1".to_string()))
        );
        assert_eq!(
            Command::parse("  folder job1   /data/in ").unwrap(),
            Some(Command::Folder {
                name: "job1".to_string(),
                dir: "/data/in".to_string()
            })
        );
        assert_eq!(Command::parse("ls").unwrap(), Some(Command::List));
        assert_eq!(Command::parse("exit").unwrap(), Some(Command::Quit));
    }

    #[test]
    fn test_parse_blank_and_comment_lines() {
        assert_eq!(Command::parse("").unwrap(), None);
        assert_eq!(Command::parse("   ").unwrap(), None);
        assert_eq!(Command::parse("# launch later").unwrap(), None);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Command::parse("launch"),
            Err(ApexError::InvalidCommand(_))
        ));
        assert!(matches!(
            Command::parse("folder job1"),
            Err(ApexError::InvalidCommand(_))
        ));
        assert!(matches!(
            Command::parse("deploy job1"),
            Err(ApexError::InvalidCommand(_))
        ));
    }

    #[test]
    fn test_argumentless_commands_reject_arguments() {
        for line in ["list all", "ls -l", "prune now", "help kill", "quit now", "killall x"] {
            assert!(
                matches!(Command::parse(line), Err(ApexError::InvalidCommand(_))),
                "accepted '{}'",
                line
            );
        }
        assert_eq!(Command::parse("prune").unwrap(), Some(Command::Prune));
    }

    #[tokio::test]
    async fn test_prune_with_argument_prunes_nothing() {
        let engine = MockEngine::new();
        let session = session(&engine);

        let output = run_script(&session, "new job1\nlaunch job1\nkillall\nprune now\n").await;

        assert!(output.contains("usage: prune"));
        assert!(!output.contains("Removed"));
        assert_eq!(session.registry().len().await, 1);
    }

    #[tokio::test]
    async fn test_full_lifecycle_script() {
        let engine = MockEngine::new().with_app_ids(["APP-42"]);
        let session = session(&engine);

        let output = run_script(
            &session,
            "new job1\nfolder job1 /data/in\nprint job1\nlaunch job1\nappid job1\nkill APP-42\nquit\n",
        )
        .await;

        assert!(output.contains("Created job1"));
        assert!(output.contains("AppID: APP-42 started."));
        assert!(output.contains("AppID: APP-42 killed."));
        assert_eq!(engine.contexts()[0].kill_count(), 1);
    }

    #[tokio::test]
    async fn test_errors_do_not_stop_the_shell() {
        let engine = MockEngine::new().with_app_ids(["APP-1"]);
        let session = session(&engine);

        let output = run_script(
            &session,
            "bogus\nappid job1\nnew job1\nappid job1\nkill missing\nnew job1\nlaunch job1\n",
        )
        .await;

        assert!(output.contains("unknown command 'bogus'"));
        assert!(output.contains("no application named 'job1'"));
        assert!(output.contains("has not been launched"));
        assert!(output.contains("App not found: missing"));
        assert!(output.contains("already exists"));
        assert!(output.contains("AppID: APP-1 started."));
        assert_eq!(session.registry().len().await, 1);
    }

    #[tokio::test]
    async fn test_find_reports_not_found() {
        let engine = MockEngine::new();
        let session = session(&engine);

        let output = run_script(&session, "find nothing\n").await;
        assert!(output.contains("App Not Found"));
    }

    #[tokio::test]
    async fn test_prune_frees_names() {
        let engine = MockEngine::new();
        let session = session(&engine);

        let output = run_script(
            &session,
            "new job1\nlaunch job1\nkillall\nprune\nnew job1\nlist\n",
        )
        .await;

        assert!(output.contains("Killed 1 application(s)"));
        assert!(output.contains("Removed 1 killed application(s)"));
        assert_eq!(output.matches("Created job1").count(), 2);
        assert_eq!(session.registry().len().await, 1);
    }

    #[tokio::test]
    async fn test_eof_ends_shell() {
        let engine = MockEngine::new();
        let session = session(&engine);
        let output = run_script(&session, "help").await;
        assert!(output.contains("launch <name>"));
    }
}
