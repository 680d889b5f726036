use clap::Parser;
use mailgun_bulk_validate::{Config, Error, MailgunClient, ValidationWorkflow};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "mailgun-bulk-validate",
    version,
    about = "Validate emails using the Mailgun bulk validation API"
)]
struct Cli {
    #[arg(
        short = 't',
        long,
        help = "Input file containing emails (one per line)"
    )]
    input_file: PathBuf,

    #[arg(
        short = 'o',
        long,
        default_value = "validated-emails.txt",
        help = "Output file for valid emails"
    )]
    output_file: PathBuf,

    #[arg(
        long,
        env = "MAILGUN_API_KEY",
        hide_env_values = true,
        default_value = "",
        hide_default_value = true,
        help = "Mailgun private API key"
    )]
    api_key: String,
}

#[tokio::main]
async fn main() {
    // a missing .env file is fine
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("mailgun_bulk_validate=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let workflow = match Config::new(cli.api_key)
        .and_then(ValidationWorkflow::<MailgunClient>::new)
    {
        Ok(workflow) => workflow,
        Err(e) => {
            eprintln!("{}", failure_message(&e));
            return;
        }
    };

    println!("Mailgun Bulk Email Validation Tool");
    println!("{}", "-".repeat(40));

    match workflow.run(&cli.input_file, &cli.output_file).await {
        Ok(summary) => {
            println!();
            println!("{}", summary.render(&cli.output_file));
        }
        Err(e) => eprintln!("{}", failure_message(&e)),
    }
}

/// Error line for stderr, with a hint when the run never reached the service
fn failure_message(err: &Error) -> String {
    match err {
        Error::Config { key, .. } if key.as_deref() == Some("api_key") => {
            format!("Error: {err}. Set MAILGUN_API_KEY or pass --api-key.")
        }
        _ if err.is_local() => format!("Error: {err}. Nothing was sent to Mailgun."),
        _ => format!("Error: {err}"),
    }
}
