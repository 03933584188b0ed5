use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{load_settings, ActionOutcome, ClientError, ClientHandle, MarriageClient};
use lifecycle::{available_actions, Action, CertificateAttachment, CertificateDocument, NextStep};
use shared::{
    domain::{
        Actor, Application, ApplicationId, ApplicationStatus, MeetingId, MeetingStatus, Role,
        UserId,
    },
    protocol::{MeetingDraft, MeetingPatch},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Review and manage marriage applications")]
struct Cli {
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[arg(long, global = true)]
    token: Option<String>,
    #[arg(long, global = true)]
    actor_id: Option<String>,
    #[arg(long, global = true, value_parser = parse_role)]
    actor_role: Option<Role>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show an application with the actions open to the current actor.
    Show { id: String },
    List {
        #[arg(long, value_parser = parse_status)]
        status: Option<ApplicationStatus>,
    },
    Officiants,
    Assign { id: String, officiant_id: String },
    Reassign { id: String, officiant_id: String },
    AddMeeting {
        id: String,
        #[arg(long)]
        date: String,
        #[arg(long)]
        time: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        notes: Option<String>,
    },
    UpdateMeeting {
        id: String,
        meeting_id: String,
        #[arg(long, value_parser = parse_meeting_status)]
        status: Option<MeetingStatus>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        completed_notes: Option<String>,
    },
    /// Generate a certificate number, or upload a signed file with `--file`.
    IssueCertificate {
        id: String,
        #[arg(long)]
        number: String,
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        mime_type: Option<String>,
    },
    RegenerateCertificate {
        id: String,
        #[arg(long)]
        number: String,
    },
    Complete {
        id: String,
        #[arg(long)]
        notes: Option<String>,
    },
    Cancel {
        id: String,
        #[arg(long)]
        reason: String,
    },
    Feedback { id: String, comment: String },
    /// Print the data the certificate renderer needs, as JSON.
    Certificate { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings()?;
    if let Some(url) = cli.api_url {
        settings.api_base_url = client_core::config::normalize_base_url(&url)?;
    }
    if cli.token.is_some() {
        settings.api_token = cli.token;
    }
    if cli.actor_id.is_some() {
        settings.actor_id = cli.actor_id;
    }
    if cli.actor_role.is_some() {
        settings.actor_role = cli.actor_role;
    }

    let actor = settings.actor()?;
    let client = MarriageClient::from_settings(&settings, actor)?;
    run(&client, cli.command).await
}

async fn run(client: &impl ClientHandle, command: Command) -> Result<()> {
    match command {
        Command::Show { id } => {
            let application = fetch(client, &id).await?;
            print_application(&application, client.actor());
        }
        Command::List { status } => {
            let applications = client
                .list_applications(status)
                .await
                .map_err(client_failure)?;
            for application in &applications {
                println!(
                    "{}\t{}\t{}\t{} & {}",
                    application.id,
                    application.kind.label(),
                    application.status.label(),
                    application.partner_one.name,
                    application.partner_two.name
                );
            }
        }
        Command::Officiants => {
            let officiants = client
                .list_officiants()
                .await
                .map_err(client_failure)?;
            for officiant in officiants {
                println!(
                    "{}\t{}\t{} yrs\t{}",
                    officiant.id,
                    officiant.name,
                    officiant.years_of_experience,
                    officiant.institution
                );
            }
        }
        Command::Certificate { id } => {
            let application = fetch(client, &id).await?;
            let officiants = client
                .list_officiants()
                .await
                .map_err(client_failure)?;
            let document = CertificateDocument::from_application(&application, &officiants)?;
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        mutation => {
            let (id, action) = into_action(mutation).await?;
            let application = fetch(client, &id).await?;
            let outcome = client
                .perform(&application, action)
                .await
                .map_err(client_failure)?;
            print_outcome(&outcome);
        }
    }
    Ok(())
}

async fn into_action(command: Command) -> Result<(String, Action)> {
    let pair = match command {
        Command::Assign { id, officiant_id } => (
            id,
            Action::AssignOfficiant {
                officiant_id: UserId::new(officiant_id),
            },
        ),
        Command::Reassign { id, officiant_id } => (
            id,
            Action::ReassignOfficiant {
                officiant_id: UserId::new(officiant_id),
            },
        ),
        Command::AddMeeting {
            id,
            date,
            time,
            location,
            notes,
        } => (
            id,
            Action::AddMeeting(MeetingDraft {
                date,
                time,
                location,
                notes,
            }),
        ),
        Command::UpdateMeeting {
            id,
            meeting_id,
            status,
            date,
            time,
            location,
            notes,
            completed_notes,
        } => (
            id,
            Action::UpdateMeeting {
                meeting_id: MeetingId::new(meeting_id),
                patch: MeetingPatch {
                    status,
                    date,
                    time,
                    location,
                    notes,
                    completed_notes,
                },
            },
        ),
        Command::IssueCertificate {
            id,
            number,
            file,
            mime_type,
        } => {
            let attachment = match file {
                Some(path) => Some(read_attachment(&path, mime_type).await?),
                None => None,
            };
            (id, Action::IssueCertificate { number, attachment })
        }
        Command::RegenerateCertificate { id, number } => {
            (id, Action::RegenerateCertificate { number })
        }
        Command::Complete { id, notes } => (id, Action::Complete { notes }),
        Command::Cancel { id, reason } => (id, Action::Cancel { reason }),
        Command::Feedback { id, comment } => (id, Action::AddFeedback { comment }),
        other => return Err(anyhow!("{other:?} is not a mutation")),
    };
    Ok(pair)
}

async fn read_attachment(
    path: &Path,
    mime_type: Option<String>,
) -> Result<CertificateAttachment> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read certificate file {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("{} has no file name", path.display()))?;
    let mime_type =
        mime_type.or_else(|| mime_guess::from_path(path).first_raw().map(str::to_string));
    Ok(CertificateAttachment {
        filename,
        mime_type,
        bytes,
    })
}

/// Keeps the short user-facing message on top and the client error as its cause.
fn client_failure(err: ClientError) -> anyhow::Error {
    let message = err.user_message();
    anyhow::Error::new(err).context(message)
}

async fn fetch(client: &impl ClientHandle, id: &str) -> Result<Application> {
    client
        .fetch_application(&ApplicationId::new(id))
        .await
        .map_err(client_failure)
        .with_context(|| format!("failed to load application {id}"))
}

fn print_application(application: &Application, actor: &Actor) {
    println!("{} ({})", application.id, application.kind.label());
    println!("  status:    {}", application.status.label());
    println!(
        "  couple:    {} & {}",
        application.partner_one.name, application.partner_two.name
    );
    match &application.assigned_officiant {
        Some(officiant) => println!("  officiant: {officiant}"),
        None => println!("  officiant: (unassigned)"),
    }
    if let Some(meeting) = application.first_meeting() {
        println!(
            "  first meeting: {} {} at {} ({:?})",
            meeting.date, meeting.time, meeting.location, meeting.status
        );
    }
    if let Some(certificate) = &application.certificate {
        println!(
            "  certificate: {} issued {}",
            certificate.number, certificate.issued_date
        );
    }
    println!("  messages:  {}", application.feedback_thread.len());
    println!("  next step: {}", NextStep::for_actor(application, actor).describe());

    let actions = available_actions(application, actor);
    if actions.is_empty() {
        println!("  actions:   none");
    } else {
        let labels: Vec<&str> = actions.iter().map(|kind| kind.label()).collect();
        println!("  actions:   {}", labels.join(", "));
    }
}

fn print_outcome(outcome: &ActionOutcome) {
    println!(
        "{} is now {}",
        outcome.application.id,
        outcome.application.status.label()
    );
    for advisory in &outcome.advisories {
        println!("warning: {advisory}");
    }
}

fn parse_role(raw: &str) -> Result<Role, String> {
    Role::parse(raw).ok_or_else(|| format!("unknown role '{raw}'"))
}

fn parse_status(raw: &str) -> Result<ApplicationStatus, String> {
    ApplicationStatus::parse(raw).ok_or_else(|| format!("unknown status '{raw}'"))
}

fn parse_meeting_status(raw: &str) -> Result<MeetingStatus, String> {
    MeetingStatus::parse(raw).ok_or_else(|| format!("unknown meeting status '{raw}'"))
}
