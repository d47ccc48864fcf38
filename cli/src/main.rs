//! Portal CLI client - manage invitations and review deliverables

mod client;
mod messages;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use crate::client::PortalClient;
use crate::messages::{
    Deliverable, Invitation, InvitationStatus, IssueInvitation, IssuedInvitation, ResendInvitation,
};

#[derive(Parser)]
#[command(name = "portal-cli")]
#[command(about = "Command line client for the portal server")]
#[command(version)]
struct Cli {
    /// Server URL
    #[arg(short, long, env = "PORTAL_URL", default_value = "http://localhost:3000")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage invitations
    #[command(subcommand)]
    Invites(InviteCommand),

    /// Review project deliverables
    #[command(subcommand)]
    Deliverables(DeliverableCommand),
}

#[derive(Subcommand)]
enum InviteCommand {
    /// List invitations
    List {
        #[arg(long)]
        space: Option<String>,

        /// pending, accepted, expired or revoked
        #[arg(long, value_parser = parse_status)]
        status: Option<InvitationStatus>,
    },

    /// Issue a new invitation and print its magic link
    Issue {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        role: String,

        /// internal, client or vendor
        #[arg(long)]
        space: String,

        /// Link lifetime in minutes
        #[arg(long)]
        expires_in: Option<i64>,

        #[arg(long)]
        account: Option<Uuid>,

        #[arg(long)]
        vendor: Option<Uuid>,

        #[arg(long)]
        vendor_contact: Option<Uuid>,

        /// Email the link to the invitee
        #[arg(long)]
        send_email: bool,
    },

    /// Revoke a pending invitation
    Revoke { id: Uuid },

    /// Issue a fresh link for a pending invitation
    Resend {
        id: Uuid,

        #[arg(long)]
        expires_in: Option<i64>,

        #[arg(long)]
        send_email: bool,
    },

    /// Delete an invitation
    Delete { id: Uuid },

    /// Redeem a magic-link token
    Redeem {
        token: String,

        #[arg(short = 'n', long)]
        name: Option<String>,
    },
}

#[derive(Subcommand)]
enum DeliverableCommand {
    /// List deliverables of a project
    List {
        #[arg(short, long)]
        project: Uuid,
    },

    /// Approve a submitted deliverable
    Approve {
        #[arg(short, long)]
        project: Uuid,

        id: Uuid,
    },

    /// Send a submitted deliverable back with a comment
    Revise {
        #[arg(short, long)]
        project: Uuid,

        id: Uuid,

        #[arg(short, long)]
        comment: String,
    },
}

fn parse_status(s: &str) -> std::result::Result<InvitationStatus, String> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|_| format!("unknown invitation status: {}", s))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portal_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    let client = PortalClient::new(&cli.server)?;

    match cli.command {
        Commands::Invites(command) => run_invites(&client, command).await,
        Commands::Deliverables(command) => run_deliverables(&client, command).await,
    }
}

async fn run_invites(client: &PortalClient, command: InviteCommand) -> Result<()> {
    match command {
        InviteCommand::List { space, status } => {
            let invitations = client.list_invitations(space.as_deref(), status).await?;
            if invitations.is_empty() {
                println!("No invitations found.");
            } else {
                println!("Invitations:");
                println!("{:─<60}", "");
                for invitation in &invitations {
                    print_invitation(invitation);
                }
            }
        }
        InviteCommand::Issue {
            email,
            role,
            space,
            expires_in,
            account,
            vendor,
            vendor_contact,
            send_email,
        } => {
            let issued = client
                .issue_invitation(&IssueInvitation {
                    email,
                    role,
                    space,
                    expires_in_minutes: expires_in,
                    account_id: account,
                    vendor_id: vendor,
                    vendor_contact_id: vendor_contact,
                    send_email,
                })
                .await?;
            print_issued(&issued);
        }
        InviteCommand::Revoke { id } => {
            let invitation = client.revoke_invitation(id).await?;
            println!("Invitation {} is {}", invitation.id, invitation.status);
        }
        InviteCommand::Resend {
            id,
            expires_in,
            send_email,
        } => {
            let issued = client
                .resend_invitation(
                    id,
                    &ResendInvitation {
                        expires_in_minutes: expires_in,
                        send_email,
                    },
                )
                .await?;
            print_issued(&issued);
        }
        InviteCommand::Delete { id } => {
            client.delete_invitation(id).await?;
            println!("Deleted invitation {}", id);
        }
        InviteCommand::Redeem { token, name } => {
            let redeemed = client.redeem_invitation(&token, name).await?;
            println!(
                "Welcome {} ({} in {}), user id {}",
                redeemed.user.email, redeemed.user.role, redeemed.user.space, redeemed.user.id
            );
        }
    }

    Ok(())
}

async fn run_deliverables(client: &PortalClient, command: DeliverableCommand) -> Result<()> {
    match command {
        DeliverableCommand::List { project } => {
            let deliverables = client.list_deliverables(project).await?;
            if deliverables.is_empty() {
                println!("No deliverables for project {}.", project);
            } else {
                for deliverable in &deliverables {
                    print_deliverable(deliverable);
                }
            }
        }
        DeliverableCommand::Approve { project, id } => {
            let deliverable = client.approve_deliverable(project, id).await?;
            print_deliverable(&deliverable);
        }
        DeliverableCommand::Revise {
            project,
            id,
            comment,
        } => {
            let deliverable = client.request_revision(project, id, &comment).await?;
            print_deliverable(&deliverable);
        }
    }

    Ok(())
}

fn print_invitation(invitation: &Invitation) {
    println!(
        "  {} - {} as {} ({}) [{}] expires {}",
        invitation.id,
        invitation.email,
        invitation.role,
        invitation.space,
        invitation.display_status,
        invitation.expires_at.format("%Y-%m-%d %H:%M")
    );
}

fn print_issued(issued: &IssuedInvitation) {
    print_invitation(&issued.invitation);
    println!("  link: {}", issued.link);
    if issued.email_sent {
        println!("  email sent to {}", issued.invitation.email);
    }
}

fn print_deliverable(deliverable: &Deliverable) {
    println!(
        "  #{} {} {} ({}) [{}] {}",
        deliverable.deliverable_number,
        deliverable.version,
        deliverable.title,
        deliverable.deliverable_type,
        deliverable.status,
        deliverable.id
    );
    if let Some(url) = &deliverable.url {
        println!("      {}", url);
    }
    if let Some(comment) = &deliverable.client_comment {
        println!("      comment: {}", comment);
    }
}
