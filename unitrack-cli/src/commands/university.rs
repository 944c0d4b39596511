//! University commands

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use unitrack_core::hipo;
use unitrack_core::{
    CountryCode, NewUniversity, Pagination, SortOrder, UniversityFilter, UniversitySort,
    UniversityUpdate,
};
use unitrack_db::import_records;
use uuid::Uuid;

use super::{nullable, print_json, AppContext};
use crate::ui;

#[derive(Parser, Debug)]
pub struct UniversityArgs {
    #[command(subcommand)]
    pub command: UniversityCommands,
}

#[derive(Subcommand, Debug)]
pub enum UniversityCommands {
    /// Add a university
    Add(AddArgs),
    /// Show a university by id
    Get {
        id: Uuid,
    },
    /// Look a university up by domain, or by name within a country
    Find(FindArgs),
    /// Case-insensitive name search
    Search(SearchArgs),
    /// Paginated listing with optional filters
    List(ListArgs),
    /// Change selected columns of a university
    Update(UpdateArgs),
    /// Delete a university
    Delete {
        id: Uuid,
    },
    /// Countries with at least one university
    Countries,
    /// Import a Hipo Labs JSON file (array of university records)
    Import(ImportArgs),
}

#[derive(Parser, Debug)]
pub struct AddArgs {
    #[arg(long)]
    pub name: String,

    /// Two-letter country code
    #[arg(long)]
    pub country: String,

    #[arg(long)]
    pub domain: Option<String>,

    #[arg(long)]
    pub website: Option<String>,

    #[arg(long)]
    pub state: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    /// Alternative name (repeatable)
    #[arg(long = "alias")]
    pub aliases: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct FindArgs {
    #[arg(long, conflicts_with_all = ["name", "country"])]
    pub domain: Option<String>,

    #[arg(long, requires = "country")]
    pub name: Option<String>,

    #[arg(long, requires = "name")]
    pub country: Option<String>,
}

#[derive(Parser, Debug)]
pub struct SearchArgs {
    pub term: String,

    #[arg(long)]
    pub country: Option<String>,

    /// Maximum number of results
    #[arg(long, default_value_t = 10)]
    pub limit: u32,
}

#[derive(Parser, Debug)]
pub struct ListArgs {
    #[arg(long)]
    pub country: Option<String>,

    #[arg(long)]
    pub search: Option<String>,

    /// name, country_code or created_at
    #[arg(long, default_value = "name")]
    pub sort: UniversitySort,

    /// asc or desc
    #[arg(long, default_value = "asc")]
    pub order: SortOrder,

    #[arg(long, default_value_t = 1)]
    pub page: u32,

    #[arg(long, default_value_t = unitrack_core::pagination::DEFAULT_PER_PAGE)]
    pub per_page: u32,
}

#[derive(Parser, Debug)]
pub struct UpdateArgs {
    pub id: Uuid,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub country: Option<String>,

    #[arg(long)]
    pub domain: Option<String>,

    #[arg(long)]
    pub website: Option<String>,

    #[arg(long)]
    pub state: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    /// Replace the alias list (repeatable)
    #[arg(long = "alias")]
    pub aliases: Vec<String>,

    /// Set a nullable column to NULL (repeatable)
    #[arg(long, value_enum)]
    pub clear: Vec<ClearableColumn>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearableColumn {
    Domain,
    Website,
    State,
    City,
    Aliases,
}

#[derive(Parser, Debug)]
pub struct ImportArgs {
    /// Path to a JSON array of Hipo Labs records
    pub file: PathBuf,
}

pub async fn run_university(ctx: &AppContext, args: UniversityArgs) -> Result<()> {
    let store = ctx.open_store().await?;
    let repo = store.universities();

    match args.command {
        UniversityCommands::Add(args) => {
            let mut new = NewUniversity::new(&args.name, &args.country)?
                .with_location(args.state, args.city);
            if let Some(domain) = args.domain {
                new = new.with_domain(domain);
            }
            if let Some(website) = args.website {
                new = new.with_website(website);
            }
            new.aliases = args.aliases;
            let created = repo.create(&new).await.context("Failed to add university")?;
            print_json(&created)?;
        }
        UniversityCommands::Get { id } => {
            print_json(&repo.get(id).await?)?;
        }
        UniversityCommands::Find(args) => {
            let found = match (args.domain, args.name, args.country) {
                (Some(domain), _, _) => repo.get_by_domain(&domain).await?,
                (None, Some(name), Some(country)) => {
                    let country = CountryCode::new(&country)?;
                    repo.get_by_name_and_country(&name, &country).await?
                }
                _ => bail!("Pass --domain, or --name together with --country"),
            };
            match found {
                Some(university) => print_json(&university)?,
                None => bail!("No matching university"),
            }
        }
        UniversityCommands::Search(args) => {
            let country = args.country.as_deref().map(CountryCode::new).transpose()?;
            let hits = repo.search(&args.term, country.as_ref(), args.limit).await?;
            print_json(&hits)?;
        }
        UniversityCommands::List(args) => {
            let filter = UniversityFilter {
                search: args.search,
                country_code: args.country.as_deref().map(CountryCode::new).transpose()?,
                sort: args.sort,
                order: args.order,
            };
            let page = repo
                .list(&filter, Pagination::new(args.page, args.per_page))
                .await?;
            print_json(&json!({
                "items": page.items,
                "total": page.total,
                "page": page.page,
                "per_page": page.per_page,
                "pages": page.pages(),
            }))?;
        }
        UniversityCommands::Update(args) => {
            let id = args.id;
            let update = build_update(args)?;
            let updated = repo
                .update(id, &update)
                .await
                .with_context(|| format!("Failed to update university {id}"))?;
            print_json(&updated)?;
        }
        UniversityCommands::Delete { id } => {
            repo.delete(id).await?;
            print_json(&json!({ "deleted": id }))?;
        }
        UniversityCommands::Countries => {
            print_json(&repo.countries().await?)?;
        }
        UniversityCommands::Import(args) => {
            let file = File::open(&args.file)
                .with_context(|| format!("Failed to open {}", args.file.display()))?;
            let records = hipo::read_records(BufReader::new(file))
                .with_context(|| format!("Failed to parse {}", args.file.display()))?;

            let pb = ui::progress_bar(records.len() as u64, "Importing universities");
            let summary = import_records(&repo, &records, |_| {
                if let Some(pb) = &pb {
                    pb.inc(1);
                }
            })
            .await;
            ui::finish_success(
                pb,
                format!("{} upserted, {} skipped, {} failed", summary.upserted, summary.skipped, summary.failed),
            );
            print_json(&summary)?;
        }
    }

    store.close().await;
    Ok(())
}

fn build_update(args: UpdateArgs) -> Result<UniversityUpdate> {
    let cleared = |column| args.clear.contains(&column);

    let mut update = UniversityUpdate {
        name: args.name,
        country_code: args.country.as_deref().map(CountryCode::new).transpose()?,
        ..Default::default()
    };

    update.domain = nullable(args.domain, cleared(ClearableColumn::Domain))?;
    update.website = nullable(args.website, cleared(ClearableColumn::Website))?;
    update.state_province = nullable(args.state, cleared(ClearableColumn::State))?;
    update.city = nullable(args.city, cleared(ClearableColumn::City))?;

    if cleared(ClearableColumn::Aliases) {
        if !args.aliases.is_empty() {
            bail!("--alias and --clear aliases are mutually exclusive");
        }
        update.aliases = Some(Vec::new());
    } else if !args.aliases.is_empty() {
        update.aliases = Some(args.aliases);
    }

    Ok(update)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update_args() -> UpdateArgs {
        UpdateArgs {
            id: Uuid::nil(),
            name: None,
            country: None,
            domain: None,
            website: None,
            state: None,
            city: None,
            aliases: Vec::new(),
            clear: Vec::new(),
        }
    }

    #[test]
    fn empty_update_touches_nothing() {
        assert!(build_update(update_args()).unwrap().is_empty());
    }

    #[test]
    fn clear_and_set() {
        let mut args = update_args();
        args.city = Some("Boston".into());
        args.clear = vec![ClearableColumn::Domain];
        args.country = Some("us".into());

        let update = build_update(args).unwrap();
        assert_eq!(update.city, Some(Some("Boston".into())));
        assert_eq!(update.domain, Some(None));
        assert_eq!(update.country_code.unwrap().as_str(), "US");
        assert_eq!(update.website, None);
    }

    #[test]
    fn set_and_clear_conflict() {
        let mut args = update_args();
        args.website = Some("https://example.edu".into());
        args.clear = vec![ClearableColumn::Website];
        assert!(build_update(args).is_err());
    }
}
