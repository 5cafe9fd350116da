use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};
use clap::{Parser, Subcommand};
use comic_studio::{ComicOptions, DirectorySink, DownloadSink, Session, SessionState};
use gemini_image::{GeminiClient, GeminiConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

#[derive(Parser)]
#[command(name = "comic-studio")]
#[command(about = "Generate, edit, and turn images into four-panel comics with Gemini")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one image, apply edits in order, and save it
    Image {
        /// Text prompt for the first image
        #[arg(short, long)]
        prompt: String,

        /// Follow-up edit prompts, applied in order
        #[arg(short, long)]
        edit: Vec<String>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Generate an image, apply edits, and expand it into a four-panel comic
    Comic {
        /// Text prompt for the first image
        #[arg(short, long)]
        prompt: String,

        /// Follow-up edit prompts, applied before the comic is built
        #[arg(short, long)]
        edit: Vec<String>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Who the story is about
        #[arg(long)]
        protagonist: Option<String>,
    },

    /// Line-oriented session reading commands from stdin
    Interactive {
        /// Output directory for downloads
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },
}

const HELP: &str = "\
commands:
  generate <prompt>   create a new image (only from a fresh session)
  edit <prompt>       refine the current image
  comic               turn the current image into a four-panel comic
  download            save the current image or comic
  start-over          discard everything and begin again
  state               show what the session is displaying
  help                show this list
  quit                exit";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt().with_max_level(level).init();

    let config = GeminiConfig::from_env().context("Gemini is not configured")?;
    let client = GeminiClient::new(config);

    match cli.command {
        Commands::Image {
            prompt,
            edit,
            out_dir,
        } => image_command(client, prompt, edit, out_dir).await,
        Commands::Comic {
            prompt,
            edit,
            out_dir,
            protagonist,
        } => comic_command(client, prompt, edit, out_dir, protagonist).await,
        Commands::Interactive { out_dir } => interactive_command(client, out_dir).await,
    }
}

fn new_session(client: GeminiClient, options: ComicOptions) -> Session<GeminiClient> {
    Session::new(client)
        .with_options(options)
        .with_observer(|state| {
            if let SessionState::Loading { message } = state {
                info!("{}", message);
            }
        })
}

async fn prepare_image(
    session: &mut Session<GeminiClient>,
    prompt: &str,
    edits: &[String],
) -> Result<()> {
    session.generate(prompt).await?;
    for (i, edit) in edits.iter().enumerate() {
        info!("Applying edit {} of {}: {}", i + 1, edits.len(), edit);
        session.edit(edit).await?;
    }
    Ok(())
}

async fn image_command(
    client: GeminiClient,
    prompt: String,
    edits: Vec<String>,
    out_dir: PathBuf,
) -> Result<()> {
    let mut session = new_session(client, ComicOptions::default());
    prepare_image(&mut session, &prompt, &edits).await?;

    let mut sink = DirectorySink::new(out_dir);
    let path = session.download_image(&mut sink)?;
    println!("Saved {}", path.display());
    Ok(())
}

async fn comic_command(
    client: GeminiClient,
    prompt: String,
    edits: Vec<String>,
    out_dir: PathBuf,
    protagonist: Option<String>,
) -> Result<()> {
    let mut options = ComicOptions::default();
    if let Some(protagonist) = protagonist {
        options = options.with_protagonist(protagonist);
    }

    let mut session = new_session(client, options);
    prepare_image(&mut session, &prompt, &edits).await?;
    session.create_comic().await?;

    let mut sink = DirectorySink::new(out_dir);
    let comic = session
        .state()
        .comic()
        .cloned()
        .context("comic finished without panels")?;
    for (i, panel) in comic.iter().enumerate() {
        let filename = format!("panel-{}.{}", i + 1, panel.file_extension());
        let path = sink
            .save(&filename, panel.bytes())
            .with_context(|| format!("Could not save {}", filename))?;
        println!("Saved {}", path.display());
    }

    let path = session.download(&mut sink).await?;
    println!("Saved {}", path.display());
    Ok(())
}

async fn interactive_command(client: GeminiClient, out_dir: PathBuf) -> Result<()> {
    let mut session = new_session(client, ComicOptions::default());
    let mut sink = DirectorySink::new(out_dir);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", HELP);
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (command, argument) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "quit" | "exit" => break,
            "help" => println!("{}", HELP),
            "state" => println!("{}", describe(session.state())),
            "start-over" => {
                session.start_over();
                println!("{}", describe(session.state()));
            }
            _ => {
                if let Err(e) = run_action(&mut session, &mut sink, command, argument).await {
                    println!("{:#}", e);
                }
                println!("{}", describe(session.state()));
            }
        }
    }
    Ok(())
}

async fn run_action(
    session: &mut Session<GeminiClient>,
    sink: &mut DirectorySink,
    command: &str,
    argument: &str,
) -> Result<()> {
    match command {
        "generate" | "edit" if argument.is_empty() => bail!("usage: {} <prompt>", command),
        "generate" => session.generate(argument).await?,
        "edit" => session.edit(argument).await?,
        "comic" => session.create_comic().await?,
        "download" => {
            let path = if session.state().comic().is_some() {
                session.download(sink).await?
            } else {
                session.download_image(sink)?
            };
            println!("Saved {}", path.display());
        }
        other => bail!("unknown command '{}', try 'help'", other),
    }
    Ok(())
}

fn describe(state: &SessionState) -> String {
    match state {
        SessionState::Idle => "[idle] enter 'generate <prompt>' to begin".to_string(),
        SessionState::Loading { message } => format!("[loading] {}", message),
        SessionState::ImageReady(image) => format!(
            "[image] {} ({} bytes)",
            image.media_type(),
            image.bytes().len()
        ),
        SessionState::ComicReady(comic) => {
            format!("[comic] {} panels ready to download", comic.panels().len())
        }
        SessionState::Failed { message } => {
            format!("[failed] {}\nenter 'start-over' to try again", message)
        }
    }
}
