//! Student academic records

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use unitrack_core::{StudentProfile, StudentProfileUpdate};
use uuid::Uuid;

use super::{nullable, print_json, AppContext};

#[derive(Parser, Debug)]
pub struct StudentArgs {
    #[command(subcommand)]
    pub command: StudentCommands,
}

#[derive(Subcommand, Debug)]
pub enum StudentCommands {
    /// Attach an academic record to a profile
    Create(RecordArgs),
    /// Show a student's academic record
    Get {
        user_id: Uuid,
    },
    /// List students graduating in a given year
    List {
        #[arg(long)]
        graduation_year: i32,
    },
    /// Change selected columns of an academic record
    Update(UpdateArgs),
    /// Remove an academic record (the profile stays)
    Delete {
        user_id: Uuid,
    },
}

#[derive(Parser, Debug)]
pub struct RecordArgs {
    pub user_id: Uuid,

    #[arg(long)]
    pub graduation_year: Option<i32>,

    /// 0.00 to 9.99
    #[arg(long)]
    pub gpa: Option<f64>,

    /// 400 to 1600
    #[arg(long)]
    pub sat: Option<i32>,

    /// 1 to 36
    #[arg(long)]
    pub act: Option<i32>,

    /// Country the student is applying to (repeatable)
    #[arg(long = "target-country")]
    pub target_countries: Vec<String>,

    /// Intended major (repeatable)
    #[arg(long = "major")]
    pub majors: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub record: RecordArgs,

    /// Set a column to NULL (repeatable)
    #[arg(long, value_enum)]
    pub clear: Vec<ClearableColumn>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearableColumn {
    GraduationYear,
    Gpa,
    Sat,
    Act,
    TargetCountries,
    Majors,
}

pub async fn run_student(ctx: &AppContext, args: StudentArgs) -> Result<()> {
    let store = ctx.open_store().await?;
    let repo = store.students();

    match args.command {
        StudentCommands::Create(args) => {
            let user_id = args.user_id;
            let created = repo
                .create(&to_record(args))
                .await
                .with_context(|| format!("Failed to create academic record for {user_id}"))?;
            print_json(&created)?;
        }
        StudentCommands::Get { user_id } => {
            print_json(&repo.get(user_id).await?)?;
        }
        StudentCommands::List { graduation_year } => {
            print_json(&repo.by_graduation_year(graduation_year).await?)?;
        }
        StudentCommands::Update(args) => {
            let user_id = args.record.user_id;
            let update = build_update(args)?;
            let updated = repo
                .update(user_id, &update)
                .await
                .with_context(|| format!("Failed to update academic record for {user_id}"))?;
            print_json(&updated)?;
        }
        StudentCommands::Delete { user_id } => {
            repo.delete(user_id).await?;
            print_json(&json!({ "deleted": user_id }))?;
        }
    }

    store.close().await;
    Ok(())
}

fn to_record(args: RecordArgs) -> StudentProfile {
    StudentProfile {
        graduation_year: args.graduation_year,
        gpa: args.gpa,
        sat_score: args.sat,
        act_score: args.act,
        target_countries: non_empty(args.target_countries),
        intended_majors: non_empty(args.majors),
        ..StudentProfile::new(args.user_id)
    }
}

fn build_update(args: UpdateArgs) -> Result<StudentProfileUpdate> {
    let cleared = |column| args.clear.contains(&column);
    let record = args.record;
    Ok(StudentProfileUpdate {
        graduation_year: nullable(record.graduation_year, cleared(ClearableColumn::GraduationYear))?,
        gpa: nullable(record.gpa, cleared(ClearableColumn::Gpa))?,
        sat_score: nullable(record.sat, cleared(ClearableColumn::Sat))?,
        act_score: nullable(record.act, cleared(ClearableColumn::Act))?,
        target_countries: nullable(
            non_empty(record.target_countries),
            cleared(ClearableColumn::TargetCountries),
        )?,
        intended_majors: nullable(non_empty(record.majors), cleared(ClearableColumn::Majors))?,
    })
}

fn non_empty(values: Vec<String>) -> Option<Vec<String>> {
    (!values.is_empty()).then_some(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> RecordArgs {
        RecordArgs {
            user_id: Uuid::nil(),
            graduation_year: None,
            gpa: None,
            sat: None,
            act: None,
            target_countries: Vec::new(),
            majors: Vec::new(),
        }
    }

    #[test]
    fn empty_lists_stay_null() {
        let mut args = record();
        args.gpa = Some(3.8);
        args.majors = vec!["Physics".into()];

        let student = to_record(args);
        assert_eq!(student.gpa, Some(3.8));
        assert_eq!(student.target_countries, None);
        assert_eq!(student.intended_majors, Some(vec!["Physics".to_string()]));
    }

    #[test]
    fn update_clears_lists() {
        let mut args = record();
        args.sat = Some(1450);
        let update = build_update(UpdateArgs {
            record: args,
            clear: vec![ClearableColumn::TargetCountries],
        })
        .unwrap();

        assert_eq!(update.sat_score, Some(Some(1450)));
        assert_eq!(update.target_countries, Some(None));
        assert_eq!(update.intended_majors, None);
        assert_eq!(update.gpa, None);
    }
}
