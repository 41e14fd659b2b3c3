use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use ntu_coursetake::model::{BASE_URLS, ResultKind, Stage2ListItem};
use ntu_coursetake::validate::check_course_selection;
use ntu_coursetake::{AddDropClient, ReqwestClient, Result, ResultsClient, Stage2Client};

/// Drives the NTU course registration system from the command line.
#[derive(Parser, Debug)]
#[command(name = "ntu-coursetake", version, about)]
struct Cli {
    /// Registration host
    #[arg(
        long,
        default_value = BASE_URLS[0],
        value_parser = clap::builder::PossibleValuesParser::new(BASE_URLS),
    )]
    base_url: String,

    #[arg(long, env = "NTU_USERNAME")]
    username: String,

    #[arg(long, env = "NTU_PASSWORD", hide_env_values = true)]
    password: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add/drop period
    AddDrop {
        #[command(subcommand)]
        action: AddDropCommands,
    },

    /// Stage-2 preregistration
    Stage2 {
        #[command(subcommand)]
        action: Stage2Commands,
    },

    /// Preregistration results
    Results {
        #[command(subcommand)]
        action: ResultsCommands,

        /// Preregistration round
        #[arg(long, global = true, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=2))]
        kind: u8,
    },
}

#[derive(Subcommand, Debug)]
enum AddDropCommands {
    /// Print the current course selection
    List,
    Add {
        serial_number: String,
    },
    Delete {
        serial_number: String,
    },
}

#[derive(Subcommand, Debug)]
enum Stage2Commands {
    /// Print the registered courses
    List,
    /// Check the registered courses for duplicate serial numbers or priorities
    Check,
    Add {
        serial_number: String,
        priority: i64,
    },
    Delete {
        serial_number: String,
    },
}

#[derive(Subcommand, Debug)]
enum ResultsCommands {
    /// Courses assigned in the round
    Summary,
    /// Operations recorded during the round
    Log,
    /// Courses that were not assigned, with the reason
    Failed,
}

fn print_records<T: Serialize>(records: impl IntoIterator<Item = Result<T>>) -> Result<()> {
    for record in records {
        println!("{}", serde_json::to_string(&record?)?);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let (username, password) = (cli.username, cli.password);
    let http_client = ReqwestClient::new(&cli.base_url)?;

    match cli.command {
        Commands::AddDrop { action } => {
            let mut client = AddDropClient::new(http_client);
            client.login(&username, &password).await?;
            match action {
                AddDropCommands::List => print_records(client.list_courses().await?)?,
                AddDropCommands::Add { serial_number } => {
                    client.add_course(&serial_number).await?
                }
                AddDropCommands::Delete { serial_number } => {
                    client.delete_course(&serial_number).await?
                }
            }
        }
        Commands::Stage2 { action } => {
            let mut client = Stage2Client::new(http_client);
            client.login(&username, &password).await?;
            match action {
                Stage2Commands::List => print_records(client.list_courses().await?)?,
                Stage2Commands::Check => {
                    let items = client
                        .list_courses()
                        .await?
                        .collect::<Result<Vec<Stage2ListItem>>>()?;
                    check_course_selection(&items)?;
                    tracing::info!(courses = items.len(), "course selection is consistent");
                }
                Stage2Commands::Add {
                    serial_number,
                    priority,
                } => client.add_course(&serial_number, priority).await?,
                Stage2Commands::Delete { serial_number } => {
                    client.delete_course(&serial_number).await?
                }
            }
        }
        Commands::Results { action, kind } => {
            let kind = match kind {
                1 => ResultKind::PreregistrationStage1,
                _ => ResultKind::PreregistrationStage2,
            };
            let client = ResultsClient::new(http_client);
            client.login(&username, &password).await?;
            match action {
                ResultsCommands::Summary => print_records(client.get_result(kind).await?)?,
                ResultsCommands::Log => print_records(client.get_operation_log(kind).await?)?,
                ResultsCommands::Failed => {
                    print_records(client.get_failed_courses(kind).await?)?
                }
            }
        }
    }

    Ok(())
}
