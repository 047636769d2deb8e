//! # EduGPT CLI
//!
//! Terminal front end for the same services the API exposes.
//!
//! Usage:
//!   edugpt material <topic> [--languages ur,fr]
//!   edugpt assignment <topic>
//!   edugpt quiz <topic>
//!   edugpt flashcards <file>
//!   edugpt translate --language fr <text>...
//!   edugpt progress [--complete <topic>]
//!   edugpt chat <topic>

use anyhow::Context;
use clap::{Parser, Subcommand};
use edugpt_api::{config::Config, state::AppState};
use edugpt_core::{
    curriculum::syllabus_task, llm_client::OpenAICompatibleClient, prompts::Prompts,
    translation::GoogleTranslator,
};
use std::{
    io::Write,
    path::PathBuf,
    sync::Arc,
    time::Duration,
};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "edugpt")]
#[command(author, version, about = "EduGPT - course material and an AI instructor in your terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a syllabus, an assignment and a quiz
    Material {
        #[arg(required = true)]
        topic: Vec<String>,

        /// Also print the syllabus translated into these languages
        #[arg(short, long, value_delimiter = ',')]
        languages: Vec<String>,
    },
    /// Generate an assignment
    Assignment {
        #[arg(required = true)]
        topic: Vec<String>,
    },
    /// Generate a quiz
    Quiz {
        #[arg(required = true)]
        topic: Vec<String>,
    },
    /// Generate flashcards from a text file
    Flashcards {
        file: PathBuf,
    },
    /// Translate text
    Translate {
        /// Target language code (default: ur)
        #[arg(short, long)]
        language: Option<String>,

        /// Words are joined with spaces and translated as one text
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Show progress, optionally marking a topic as completed first
    Progress {
        #[arg(short, long)]
        complete: Option<String>,
    },
    /// Negotiate a syllabus for a topic, then chat with the instructor
    Chat {
        #[arg(required = true)]
        topic: Vec<String>,
    },
}

async fn type_out(text: &str, delay: Duration) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout();
    for ch in text.chars() {
        write!(stdout, "{ch}")?;
        stdout.flush()?;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
    writeln!(stdout)?;
    Ok(())
}

async fn run_chat(state: &AppState, topic: &str) -> anyhow::Result<()> {
    let task = syllabus_task(topic);
    println!("Negotiating a syllabus for \"{topic}\"...");
    let syllabus = state
        .curriculum_service
        .generate_syllabus(topic, &task)
        .await?;
    println!("\n{syllabus}\n");
    state.session.lock().await.seed(syllabus, task);

    println!("Type your message, or \"exit\" to quit.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\nYou: ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        let reply = {
            let mut session = state.session.lock().await;
            session.human_step(line);
            session.instructor_step().await
        };
        match reply {
            Ok(reply) => {
                print!("Instructor: ");
                type_out(&reply, state.typing_delay).await?;
            }
            Err(e) => eprintln!("Instructor unavailable: {e}"),
        }
    }

    let lecture = state.session.lock().await.lecture();
    if !lecture.is_empty() {
        println!("\n--- FLASHCARDS ---\n");
        println!("{}", state.content.lecture_flashcards(&lecture).await);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();

    let prompts = match &config.prompts_path {
        Some(path) => Prompts::load_dir(path)
            .with_context(|| format!("Failed to load prompts from {}", path.display()))?,
        None => Prompts::default(),
    };
    let llm_client = OpenAICompatibleClient::from_config(&config.llm_config())
        .context("Failed to create the LLM client")?;
    let state = AppState::new(
        &config,
        Arc::new(llm_client),
        Arc::new(GoogleTranslator::new(config.translate_api_base.clone())),
        Arc::new(prompts),
    );

    match cli.command {
        Commands::Material { topic, languages } => {
            let topic = topic.join(" ");
            let syllabus = state
                .curriculum_service
                .generate_syllabus(&topic, &syllabus_task(&topic))
                .await?;
            println!("--- SYLLABUS ---\n\n{syllabus}\n");
            println!("--- ASSIGNMENT ---\n\n{}\n", state.content.assignment(&topic).await?);
            println!("--- QUIZ ---\n\n{}", state.content.quiz(&topic).await?);

            if !languages.is_empty() {
                let languages: Vec<&str> = languages.iter().map(String::as_str).collect();
                let translated = state
                    .translator
                    .translate_output(syllabus.as_str(), &languages)
                    .await;
                for (language, text) in translated {
                    println!("\n--- SYLLABUS ({language}) ---\n\n{text}");
                }
            }
        }
        Commands::Assignment { topic } => {
            println!("{}", state.content.assignment(&topic.join(" ")).await?);
        }
        Commands::Quiz { topic } => {
            println!("{}", state.content.quiz(&topic.join(" ")).await?);
        }
        Commands::Flashcards { file } => {
            let content = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            println!("{}", state.content.flashcards_or_warning(&content).await);
        }
        Commands::Translate { language, text } => {
            let translated = state
                .translator
                .translate_text(&text.join(" "), language.as_deref())
                .await;
            println!("{translated}");
        }
        Commands::Progress { complete } => {
            if let Some(topic) = complete {
                state.progress.mark_completed(topic.trim()).await?;
            }
            let progress = state.progress.get_all().await?;
            if progress.is_empty() {
                println!("No progress recorded yet.");
            }
            for (topic, status) in progress {
                println!("{topic}: {status}");
            }
        }
        Commands::Chat { topic } => run_chat(&state, &topic.join(" ")).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_words_form_one_text() {
        let cli = Cli::try_parse_from(["edugpt", "translate", "-l", "fr", "Hello", "world"]).unwrap();
        match cli.command {
            Commands::Translate { language, text } => {
                assert_eq!(language.as_deref(), Some("fr"));
                assert_eq!(text.join(" "), "Hello world");
            }
            _ => panic!("Expected the translate subcommand"),
        }
    }

    #[test]
    fn test_material_languages_are_comma_separated() {
        let cli =
            Cli::try_parse_from(["edugpt", "material", "Linear", "Algebra", "-l", "ur,fr"]).unwrap();
        match cli.command {
            Commands::Material { topic, languages } => {
                assert_eq!(topic.join(" "), "Linear Algebra");
                assert_eq!(languages, ["ur", "fr"]);
            }
            _ => panic!("Expected the material subcommand"),
        }
    }
}
