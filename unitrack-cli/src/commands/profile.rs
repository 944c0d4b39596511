//! Profile commands

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use unitrack_core::{NewProfile, ProfileUpdate, Role};
use uuid::Uuid;

use super::{nullable, print_json, AppContext};

#[derive(Parser, Debug)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommands,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Create a profile for an existing identity
    Create(CreateArgs),
    /// Show a profile together with its role-specific details
    Get {
        user_id: Uuid,
    },
    /// Look a profile up by email
    Find {
        #[arg(long)]
        email: String,
    },
    /// List profiles holding a role
    List {
        /// student, parent or teacher
        #[arg(long)]
        role: Role,
    },
    /// Change selected columns of a profile
    Update(UpdateArgs),
    /// Delete a profile and everything that hangs off it
    Delete {
        user_id: Uuid,
    },
}

#[derive(Parser, Debug)]
pub struct CreateArgs {
    pub user_id: Uuid,

    /// student, parent or teacher
    #[arg(long)]
    pub role: Role,

    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,
}

#[derive(Parser, Debug)]
pub struct UpdateArgs {
    pub user_id: Uuid,

    /// New role. Existing links and specialization rows are left as they are.
    #[arg(long)]
    pub role: Option<Role>,

    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    /// Set a column to NULL (repeatable)
    #[arg(long, value_enum)]
    pub clear: Vec<ClearableColumn>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearableColumn {
    FirstName,
    LastName,
    Email,
}

pub async fn run_profile(ctx: &AppContext, args: ProfileArgs) -> Result<()> {
    let store = ctx.open_store().await?;
    let repo = store.profiles();

    match args.command {
        ProfileCommands::Create(args) => {
            let mut new =
                NewProfile::new(args.user_id, args.role).with_name(args.first_name, args.last_name);
            if let Some(email) = args.email {
                new = new.with_email(email);
            }
            let created = repo
                .create(&new)
                .await
                .with_context(|| format!("Failed to create profile {}", args.user_id))?;
            print_json(&created)?;
        }
        ProfileCommands::Get { user_id } => {
            print_json(&repo.get_role_profile(user_id).await?)?;
        }
        ProfileCommands::Find { email } => match repo.get_by_email(&email).await? {
            Some(profile) => print_json(&profile)?,
            None => bail!("No profile with email {email}"),
        },
        ProfileCommands::List { role } => {
            print_json(&repo.by_role(role).await?)?;
        }
        ProfileCommands::Update(args) => {
            let user_id = args.user_id;
            let update = build_update(args)?;
            let updated = repo
                .update(user_id, &update)
                .await
                .with_context(|| format!("Failed to update profile {user_id}"))?;
            print_json(&updated)?;
        }
        ProfileCommands::Delete { user_id } => {
            repo.delete(user_id).await?;
            print_json(&json!({ "deleted": user_id }))?;
        }
    }

    store.close().await;
    Ok(())
}

fn build_update(args: UpdateArgs) -> Result<ProfileUpdate> {
    let cleared = |column| args.clear.contains(&column);
    Ok(ProfileUpdate {
        role: args.role,
        first_name: nullable(args.first_name, cleared(ClearableColumn::FirstName))?,
        last_name: nullable(args.last_name, cleared(ClearableColumn::LastName))?,
        email: nullable(args.email, cleared(ClearableColumn::Email))?,
    })
}
