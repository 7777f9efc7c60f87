use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, bail};
use citycast_core::{Config, Dispatcher, Event, Session, TracingSink};
use clap::{Parser, Subcommand};
use inquire::{CustomType, InquireError, Select, Text};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "citycast", version, about = "Find a place and summarize its hourly forecast")]
pub struct Cli {
    /// Read and write this config file instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List places matching a name.
    Search {
        /// Free-text place name, e.g. "Lima".
        query: String,
    },

    /// Pick a place and show its forecast summary.
    Show {
        /// Free-text place name.
        query: String,

        /// 1-based position in the suggestion list; prompts when omitted and ambiguous.
        #[arg(long)]
        pick: Option<usize>,
    },

    /// Search and pick repeatedly until an empty query.
    Interactive,

    /// Edit settings interactively.
    Configure {
        /// Print the config path and current settings instead of prompting.
        #[arg(long)]
        show: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = self.load_config()?;

        match &self.command {
            Command::Search { query } => {
                let dispatcher = dispatcher(&config)?;
                let mut session = Session::new();
                drive(&mut session, &dispatcher, Event::QueryChanged(query.clone())).await?;

                let lines = session.suggestions().map(render::outcome_lines).unwrap_or_default();
                if lines.is_empty() {
                    println!("Nothing to search for.");
                } else {
                    print_lines(&lines);
                }
            }
            Command::Show { query, pick } => {
                let dispatcher = dispatcher(&config)?;
                let mut session = Session::new();
                drive(&mut session, &dispatcher, Event::QueryChanged(query.clone())).await?;

                let Some(index) = choose(&session, *pick)? else {
                    return Ok(());
                };
                drive(&mut session, &dispatcher, Event::Select(index)).await?;
                print_selection(&session);
            }
            Command::Interactive => interactive(&config).await?,
            Command::Configure { show } => {
                let path = self.config_path()?;
                if *show {
                    println!("# {}", path.display());
                    print!("{}", config.to_toml()?);
                } else {
                    let updated = prompt_config(config)?;
                    updated.save_to(&path)?;
                    println!("Saved configuration to {}", path.display());
                }
            }
        }

        Ok(())
    }

    fn config_path(&self) -> anyhow::Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => Config::config_file_path(),
        }
    }

    fn load_config(&self) -> anyhow::Result<Config> {
        let path = self.config_path()?;
        tracing::debug!(path = %path.display(), exists = path.exists(), "loading config");
        Config::load_from(&path)
    }
}

fn dispatcher(config: &Config) -> anyhow::Result<Dispatcher> {
    Dispatcher::from_config(config, Arc::new(TracingSink))
}

/// Feed one event to the session and run the command it triggers.
async fn drive(session: &mut Session, dispatcher: &Dispatcher, event: Event) -> anyhow::Result<()> {
    if let Some(command) = session.handle(event)? {
        let completion = dispatcher.execute(command).await;
        session.complete(completion);
    }
    Ok(())
}

/// Index of the candidate to select, or `None` when there is nothing to pick.
fn choose(session: &Session, pick: Option<usize>) -> anyhow::Result<Option<usize>> {
    let candidates = session.candidates();
    if candidates.is_empty() {
        if let Some(outcome) = session.suggestions() {
            print_lines(&render::outcome_lines(outcome));
        }
        return Ok(None);
    }

    if let Some(pick) = pick {
        if pick == 0 || pick > candidates.len() {
            bail!("--pick must be between 1 and {}", candidates.len());
        }
        return Ok(Some(pick - 1));
    }

    if candidates.len() == 1 {
        return Ok(Some(0));
    }

    let labels = candidates.iter().map(|c| c.label()).collect::<Vec<_>>();
    match Select::new("Pick a place:", labels).raw_prompt() {
        Ok(choice) => Ok(Some(choice.index)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e).context("Failed to read selection"),
    }
}

async fn interactive(config: &Config) -> anyhow::Result<()> {
    let dispatcher = dispatcher(config)?;
    let mut session = Session::new();

    loop {
        let text = Text::new("City:")
            .with_help_message("leave empty to quit")
            .prompt()
            .context("Failed to read query")?;

        // Start every prompt from a cleared field so retyping a failed query searches again.
        drive(&mut session, &dispatcher, Event::QueryChanged(String::new())).await?;
        if text.is_empty() {
            break;
        }
        drive(&mut session, &dispatcher, Event::QueryChanged(text)).await?;

        let Some(index) = choose(&session, None)? else {
            continue;
        };
        drive(&mut session, &dispatcher, Event::Select(index)).await?;
        print_selection(&session);
    }

    Ok(())
}

fn prompt_config(mut config: Config) -> anyhow::Result<Config> {
    config.geocoding.url = Text::new("Geocoding URL:")
        .with_default(&config.geocoding.url)
        .prompt()
        .context("Failed to read geocoding URL")?;

    let limit = Text::new("Max suggestions (empty for provider default):")
        .with_default(&config.geocoding.limit.map(|l| l.to_string()).unwrap_or_default())
        .prompt()
        .context("Failed to read suggestion limit")?;
    config.geocoding.limit = match limit.trim() {
        "" => None,
        value => Some(value.parse().with_context(|| format!("Invalid suggestion limit: {value}"))?),
    };

    let language = Text::new("Language for place names (empty for provider default):")
        .with_default(config.geocoding.language.as_deref().unwrap_or_default())
        .prompt()
        .context("Failed to read language")?;
    config.geocoding.language = Some(language.trim().to_string()).filter(|l| !l.is_empty());

    config.forecast.url = Text::new("Forecast URL:")
        .with_default(&config.forecast.url)
        .prompt()
        .context("Failed to read forecast URL")?;

    config.forecast.days = CustomType::<u8>::new("Forecast days:")
        .with_default(config.forecast.days)
        .prompt()
        .context("Failed to read forecast days")?;

    config.http.timeout_secs = CustomType::<u64>::new("Request timeout (seconds):")
        .with_default(config.http.timeout_secs)
        .prompt()
        .context("Failed to read timeout")?;

    config.search.min_query_len = CustomType::<usize>::new("Minimum query length:")
        .with_default(config.search.min_query_len)
        .prompt()
        .context("Failed to read minimum query length")?;

    Ok(config)
}

fn print_selection(session: &Session) {
    if let Some(selection) = session.selection() {
        print_lines(&render::selection_lines(&selection.candidate, session.summary()));
    }
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use citycast_core::{Candidate, Completion, ErrorKind, SearchOutcome, session};

    fn place(id: u64, name: &str) -> Candidate {
        Candidate {
            id,
            name: name.into(),
            country: "Peru".into(),
            admin1: None,
            latitude: -12.05,
            longitude: -77.04,
        }
    }

    fn session_with(outcome: SearchOutcome) -> Session {
        let mut s = Session::new();
        let Some(session::Command::Search(ticket)) =
            s.handle(Event::QueryChanged("Li".into())).expect("event")
        else {
            panic!("query change must issue a search");
        };
        assert!(s.complete(Completion::Suggestions { ticket, outcome }));
        s
    }

    #[test]
    fn pick_is_one_based() {
        let s = session_with(SearchOutcome::Found(vec![place(1, "Lima"), place(2, "Limassol")]));

        assert_eq!(choose(&s, Some(1)).expect("valid pick"), Some(0));
        assert_eq!(choose(&s, Some(2)).expect("valid pick"), Some(1));
    }

    #[test]
    fn pick_zero_and_out_of_range_are_rejected() {
        let s = session_with(SearchOutcome::Found(vec![place(1, "Lima"), place(2, "Limassol")]));

        let err = choose(&s, Some(0)).unwrap_err();
        assert!(err.to_string().contains("between 1 and 2"));
        assert!(choose(&s, Some(3)).is_err());
    }

    #[test]
    fn single_candidate_is_chosen_without_prompting() {
        let s = session_with(SearchOutcome::Found(vec![place(1, "Lima")]));

        assert_eq!(choose(&s, None).expect("single candidate"), Some(0));
    }

    #[test]
    fn nothing_to_choose_after_no_results_or_failure() {
        for outcome in [SearchOutcome::NoResults, SearchOutcome::Failed(ErrorKind::Transport)] {
            let s = session_with(outcome);

            assert_eq!(choose(&s, None).expect("no candidates"), None);
            assert_eq!(choose(&s, Some(1)).expect("no candidates"), None);
        }
    }

    #[test]
    fn chosen_index_selects_in_session() {
        let mut s = session_with(SearchOutcome::Found(vec![place(1, "Lima"), place(2, "Limassol")]));

        let index = choose(&s, Some(2)).expect("valid pick").expect("an index");
        let command = s.handle(Event::Select(index)).expect("select");

        assert!(matches!(command, Some(session::Command::Forecast(t)) if t.candidate.name == "Limassol"));
        assert!(s.candidates().is_empty());
    }
}
