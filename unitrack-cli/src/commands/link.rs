//! Parent/student and teacher/student links

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use unitrack_db::Store;
use uuid::Uuid;

use super::{print_json, AppContext};

#[derive(Parser, Debug)]
pub struct LinkArgs {
    #[command(subcommand)]
    pub kind: LinkKindCommand,
}

#[derive(Subcommand, Debug)]
pub enum LinkKindCommand {
    /// Parent to student links
    Parent(LinkActionArgs),
    /// Teacher to student links
    Teacher(LinkActionArgs),
}

#[derive(Args, Debug)]
pub struct LinkActionArgs {
    #[command(subcommand)]
    pub action: LinkAction,
}

#[derive(Subcommand, Debug)]
pub enum LinkAction {
    /// Link an adult profile to a student
    Add(Pair),
    /// Move an existing link to a new pair
    Replace {
        #[command(flatten)]
        current: Pair,

        #[arg(long)]
        new_owner: Uuid,

        #[arg(long)]
        new_student: Uuid,
    },
    /// Remove a link
    Remove(Pair),
    /// Exit non-zero unless the pair is linked
    Exists(Pair),
    /// List links for one side
    List(ListArgs),
}

#[derive(Args, Debug)]
pub struct Pair {
    /// Parent or teacher user id
    #[arg(long)]
    pub owner: Uuid,

    #[arg(long)]
    pub student: Uuid,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct ListArgs {
    #[arg(long)]
    pub owner: Option<Uuid>,

    #[arg(long)]
    pub student: Option<Uuid>,
}

pub async fn run_link(ctx: &AppContext, args: LinkArgs) -> Result<()> {
    let store = ctx.open_store().await?;

    let result = match args.kind {
        LinkKindCommand::Parent(args) => run_parent(&store, args.action).await,
        LinkKindCommand::Teacher(args) => run_teacher(&store, args.action).await,
    };

    store.close().await;
    result
}

async fn run_parent(store: &Store, action: LinkAction) -> Result<()> {
    let repo = store.parent_links();
    match action {
        LinkAction::Add(pair) => {
            let link = repo
                .create(pair.owner, pair.student)
                .await
                .context("Failed to link parent")?;
            print_json(&link)?;
        }
        LinkAction::Replace {
            current,
            new_owner,
            new_student,
        } => {
            let link = repo
                .replace((current.owner, current.student), new_owner, new_student)
                .await
                .context("Failed to replace parent link")?;
            print_json(&link)?;
        }
        LinkAction::Remove(pair) => {
            let removed = repo.delete(pair.owner, pair.student).await?;
            print_json(&json!({ "removed": removed }))?;
        }
        LinkAction::Exists(pair) => {
            report_exists(repo.exists(pair.owner, pair.student).await?)?;
        }
        LinkAction::List(list) => {
            let links = match (list.owner, list.student) {
                (Some(parent), _) => repo.by_parent(parent).await?,
                (None, Some(student)) => repo.by_student(student).await?,
                (None, None) => bail!("Pass --owner or --student"),
            };
            print_json(&links)?;
        }
    }
    Ok(())
}

async fn run_teacher(store: &Store, action: LinkAction) -> Result<()> {
    let repo = store.teacher_links();
    match action {
        LinkAction::Add(pair) => {
            let link = repo
                .create(pair.owner, pair.student)
                .await
                .context("Failed to link teacher")?;
            print_json(&link)?;
        }
        LinkAction::Replace {
            current,
            new_owner,
            new_student,
        } => {
            let link = repo
                .replace((current.owner, current.student), new_owner, new_student)
                .await
                .context("Failed to replace teacher link")?;
            print_json(&link)?;
        }
        LinkAction::Remove(pair) => {
            let removed = repo.delete(pair.owner, pair.student).await?;
            print_json(&json!({ "removed": removed }))?;
        }
        LinkAction::Exists(pair) => {
            report_exists(repo.exists(pair.owner, pair.student).await?)?;
        }
        LinkAction::List(list) => {
            let links = match (list.owner, list.student) {
                (Some(teacher), _) => repo.by_teacher(teacher).await?,
                (None, Some(student)) => repo.by_student(student).await?,
                (None, None) => bail!("Pass --owner or --student"),
            };
            print_json(&links)?;
        }
    }
    Ok(())
}

fn report_exists(exists: bool) -> Result<()> {
    print_json(&json!({ "exists": exists }))?;
    if !exists {
        bail!("Link not found");
    }
    Ok(())
}
