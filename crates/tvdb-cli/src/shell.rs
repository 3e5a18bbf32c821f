//! Line-oriented interactive shell.

use std::io::{BufRead, Write};

use anyhow::{Context, Result, bail};
use tvdb_api::LocalTvdbApi;
use tvdb_api::types::SeasonType;

use crate::render;

/// Prompt printed before each command.
const PROMPT: &str = "tvdb> ";

/// Help text listing the shell commands.
const HELP: &[&str] = &[
    "Available commands:",
    "  search <query>                       Search series, movies and people",
    "  series <id>                          Show a series",
    "  episodes <id> [page] [season-type]   List a page of episodes",
    "  episode <id>                         Show an episode",
    "  seasons <id>                         List the seasons of a series",
    "  movie <id>                           Show a movie",
    "  person <id>                          Show a person",
    "  artwork <id>                         Show an artwork item",
    "  help                                 Show this help",
    "  quit | exit                          Leave the shell",
];

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// `search <query>`.
    Search(String),
    /// `series <id>`.
    Series(u64),
    /// `episodes <id> [page] [season-type]`.
    Episodes {
        /// Series ID.
        id: u64,
        /// Page number.
        page: u32,
        /// Episode ordering.
        season_type: SeasonType,
    },
    /// `episode <id>`.
    Episode(u64),
    /// `seasons <id>`.
    Seasons(u64),
    /// `movie <id>`.
    Movie(u64),
    /// `person <id>`.
    Person(u64),
    /// `artwork <id>`.
    Artwork(u64),
    /// `help`.
    Help,
    /// `quit` or `exit`.
    Quit,
    /// Blank line.
    Empty,
}

fn parse_id(arg: Option<&str>, command: &str) -> Result<u64> {
    let Some(arg) = arg else {
        bail!("usage: {command} <id>");
    };
    arg.parse()
        .with_context(|| format!("invalid ID {arg:?}: expected a number"))
}

impl ShellCommand {
    /// Parses one input line. The command word is case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown command, a missing argument, or an
    /// argument that does not parse.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(w, r)| (w, r.trim()));
        let mut args = rest.split_whitespace();

        let command = match word.to_ascii_lowercase().as_str() {
            "" => Self::Empty,
            "search" => {
                if rest.is_empty() {
                    bail!("usage: search <query>");
                }
                Self::Search(String::from(rest))
            }
            "series" => Self::Series(parse_id(args.next(), "series")?),
            "episodes" => {
                let id = parse_id(args.next(), "episodes")?;
                let page = match args.next() {
                    Some(p) => p
                        .parse()
                        .with_context(|| format!("invalid page {p:?}: expected a number"))?,
                    None => 0,
                };
                let season_type = args.next().unwrap_or_default().parse()?;
                Self::Episodes {
                    id,
                    page,
                    season_type,
                }
            }
            "episode" => Self::Episode(parse_id(args.next(), "episode")?),
            "seasons" => Self::Seasons(parse_id(args.next(), "seasons")?),
            "movie" => Self::Movie(parse_id(args.next(), "movie")?),
            "person" => Self::Person(parse_id(args.next(), "person")?),
            "artwork" => Self::Artwork(parse_id(args.next(), "artwork")?),
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => bail!("unknown command: {other} (type `help` for a list)"),
        };
        Ok(command)
    }
}

/// Runs one command against `api` and returns the lines to print.
///
/// # Errors
///
/// Returns the API error with the command name as context.
pub async fn dispatch<A: LocalTvdbApi>(api: &A, command: &ShellCommand) -> Result<Vec<String>> {
    let lines = match command {
        ShellCommand::Search(query) => {
            render::search_lines(&api.search(query).await.context("error performing search")?)
        }
        ShellCommand::Series(id) => {
            render::series_lines(&api.series(*id).await.context("error getting series")?)
        }
        ShellCommand::Episodes {
            id,
            page,
            season_type,
        } => render::episodes_lines(
            &api.series_episodes(*id, *season_type, *page)
                .await
                .context("error getting episodes")?,
        ),
        ShellCommand::Episode(id) => {
            render::episode_lines(&api.episode(*id).await.context("error getting episode")?)
        }
        ShellCommand::Seasons(id) => render::seasons_lines(
            &api.series_seasons(*id)
                .await
                .context("error getting seasons")?,
        ),
        ShellCommand::Movie(id) => {
            render::movie_lines(&api.movie(*id).await.context("error getting movie")?)
        }
        ShellCommand::Person(id) => {
            render::person_lines(&api.person(*id).await.context("error getting person")?)
        }
        ShellCommand::Artwork(id) => {
            render::artwork_lines(&api.artwork(*id).await.context("error getting artwork")?)
        }
        ShellCommand::Help => HELP.iter().map(|l| String::from(*l)).collect(),
        ShellCommand::Quit | ShellCommand::Empty => Vec::new(),
    };
    Ok(lines)
}

/// Reads commands from `input` until EOF or `quit`, writing results and
/// errors to `output`. Bad input and failed requests do not end the loop.
///
/// # Errors
///
/// Returns an error only if reading `input` or writing `output` fails.
pub async fn run_shell<A, R, W>(api: &A, mut input: R, mut output: W) -> Result<()>
where
    A: LocalTvdbApi,
    R: BufRead,
    W: Write,
{
    writeln!(output, "TVDB shell. Type `help` for commands.")?;

    let mut line = String::new();
    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line).context("error reading input")? == 0 {
            writeln!(output)?;
            break;
        }

        let command = match ShellCommand::parse(&line) {
            Ok(ShellCommand::Quit) => break,
            Ok(command) => command,
            Err(e) => {
                writeln!(output, "{e:#}")?;
                continue;
            }
        };

        match dispatch(api, &command).await {
            Ok(lines) => {
                for l in lines {
                    writeln!(output, "{l}")?;
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "Shell command failed");
                writeln!(output, "{e:#}")?;
            }
        }
    }

    Ok(())
}
