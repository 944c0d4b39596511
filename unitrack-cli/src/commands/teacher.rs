//! Teacher profiles

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use unitrack_core::teacher::DEFAULT_MAX_ADVISEES;
use unitrack_core::{NewTeacherProfile, TeacherProfileUpdate};
use uuid::Uuid;

use super::{nullable, print_json, AppContext};

#[derive(Parser, Debug)]
pub struct TeacherArgs {
    #[command(subcommand)]
    pub command: TeacherCommands,
}

#[derive(Subcommand, Debug)]
pub enum TeacherCommands {
    /// Attach teaching details to a profile
    Create(CreateArgs),
    /// Show a teacher's details
    Get {
        user_id: Uuid,
    },
    /// List teachers covering a subject
    List {
        #[arg(long)]
        subject: String,
    },
    /// Change selected columns of a teacher's details
    Update(UpdateArgs),
    /// Remove teaching details (the profile stays)
    Delete {
        user_id: Uuid,
    },
}

#[derive(Parser, Debug)]
pub struct CreateArgs {
    pub user_id: Uuid,

    /// Subject taught (repeatable)
    #[arg(long = "subject")]
    pub subjects: Vec<String>,

    #[arg(long)]
    pub organization: Option<String>,

    /// IANA zone name, e.g. Europe/Berlin
    #[arg(long)]
    pub timezone: Option<String>,

    #[arg(long)]
    pub bio: Option<String>,

    #[arg(long, default_value_t = DEFAULT_MAX_ADVISEES)]
    pub max_advisees: i32,
}

#[derive(Parser, Debug)]
pub struct UpdateArgs {
    pub user_id: Uuid,

    /// Replace the subject list (repeatable)
    #[arg(long = "subject")]
    pub subjects: Vec<String>,

    #[arg(long)]
    pub organization: Option<String>,

    #[arg(long)]
    pub timezone: Option<String>,

    #[arg(long)]
    pub bio: Option<String>,

    #[arg(long)]
    pub max_advisees: Option<i32>,

    /// Set a column to NULL (repeatable)
    #[arg(long, value_enum)]
    pub clear: Vec<ClearableColumn>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearableColumn {
    Subjects,
    Organization,
    Timezone,
    Bio,
}

pub async fn run_teacher(ctx: &AppContext, args: TeacherArgs) -> Result<()> {
    let store = ctx.open_store().await?;
    let repo = store.teachers();

    match args.command {
        TeacherCommands::Create(args) => {
            let user_id = args.user_id;
            let teacher = NewTeacherProfile {
                subjects: (!args.subjects.is_empty()).then_some(args.subjects),
                organization: args.organization,
                timezone: args.timezone,
                bio: args.bio,
                max_advisees: args.max_advisees,
                ..NewTeacherProfile::new(user_id)
            };
            let created = repo
                .create(&teacher)
                .await
                .with_context(|| format!("Failed to create teacher details for {user_id}"))?;
            print_json(&created)?;
        }
        TeacherCommands::Get { user_id } => {
            print_json(&repo.get(user_id).await?)?;
        }
        TeacherCommands::List { subject } => {
            print_json(&repo.by_subject(&subject).await?)?;
        }
        TeacherCommands::Update(args) => {
            let user_id = args.user_id;
            let update = build_update(args)?;
            let updated = repo
                .update(user_id, &update)
                .await
                .with_context(|| format!("Failed to update teacher details for {user_id}"))?;
            print_json(&updated)?;
        }
        TeacherCommands::Delete { user_id } => {
            repo.delete(user_id).await?;
            print_json(&json!({ "deleted": user_id }))?;
        }
    }

    store.close().await;
    Ok(())
}

fn build_update(args: UpdateArgs) -> Result<TeacherProfileUpdate> {
    let cleared = |column| args.clear.contains(&column);
    let subjects = (!args.subjects.is_empty()).then_some(args.subjects);
    Ok(TeacherProfileUpdate {
        subjects: nullable(subjects, cleared(ClearableColumn::Subjects))?,
        organization: nullable(args.organization, cleared(ClearableColumn::Organization))?,
        timezone: nullable(args.timezone, cleared(ClearableColumn::Timezone))?,
        bio: nullable(args.bio, cleared(ClearableColumn::Bio))?,
        max_advisees: args.max_advisees,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_only_touches_given_columns() {
        let update = build_update(UpdateArgs {
            user_id: Uuid::nil(),
            subjects: vec!["Chemistry".into(), "Biology".into()],
            organization: None,
            timezone: None,
            bio: None,
            max_advisees: Some(12),
            clear: vec![ClearableColumn::Bio],
        })
        .unwrap();

        assert_eq!(
            update.subjects,
            Some(Some(vec!["Chemistry".to_string(), "Biology".to_string()]))
        );
        assert_eq!(update.organization, None);
        assert_eq!(update.bio, Some(None));
        assert_eq!(update.max_advisees, Some(12));
    }
}
