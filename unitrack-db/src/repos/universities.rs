//! University repository
//!
//! - create: plain INSERT, the unique domain index rejects duplicates
//! - list: single query with COUNT(*) OVER() for the total
//! - update: partial, always touches the row so `updated_at` moves
//! - upsert: lookup + write inside one transaction

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::types::Json;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, instrument};
use unitrack_core::{
    CountryCode, CountryCount, NewUniversity, Paginated, Pagination, SortOrder, University,
    UniversityFilter, UniversitySort, UniversitySummary, UniversityUpdate,
};
use uuid::Uuid;

use super::{json_column, parse_uuids, uuid_column};
use crate::error::{Result, StoreError};
use crate::escape::{contains_pattern, fold_name};

const COLUMNS: &str = "id, name, country_code, state_province, city, website, domain, \
                       aliases, external_ids, apply_portals, created_at, updated_at";

/// What `upsert` did with the incoming record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

pub struct UniversityRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UniversityRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a university with a fresh id.
    #[instrument(skip(self, new), fields(name = %new.name))]
    pub async fn create(&self, new: &NewUniversity) -> Result<University> {
        new.validate()?;
        let mut conn = self.pool.acquire().await?;
        insert_row(&mut conn, new).await
    }

    pub async fn get(&self, id: Uuid) -> Result<University> {
        self.find(id)
            .await?
            .ok_or_else(|| StoreError::not_found("university", id))
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<University>> {
        let mut conn = self.pool.acquire().await?;
        fetch_row(&mut conn, id).await
    }

    /// Lookup by web domain, ignoring case.
    pub async fn get_by_domain(&self, domain: &str) -> Result<Option<University>> {
        let mut conn = self.pool.acquire().await?;
        find_by_domain(&mut conn, domain.trim()).await
    }

    /// Lookup by case-insensitive name within a country.
    pub async fn get_by_name_and_country(
        &self,
        name: &str,
        country_code: &CountryCode,
    ) -> Result<Option<University>> {
        let mut conn = self.pool.acquire().await?;
        find_by_name_and_country(&mut conn, name.trim(), country_code).await
    }

    /// Summaries keyed by id. Unknown ids are left out of the map.
    pub async fn get_many(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, UniversitySummary>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT id, name, country_code, domain FROM universities WHERE id IN (");
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(id.to_string());
        }
        separated.push_unseparated(")");

        let rows = qb.build().fetch_all(self.pool).await?;
        rows.iter()
            .map(|row| {
                let summary = UniversitySummary {
                    id: uuid_column(row, "id")?,
                    name: row.try_get("name")?,
                    country_code: row.try_get("country_code")?,
                    domain: row.try_get("domain")?,
                };
                Ok((summary.id, summary))
            })
            .collect()
    }

    /// Every id, in id order.
    pub async fn list_ids(&self) -> Result<Vec<Uuid>> {
        let rows = sqlx::query("SELECT id FROM universities ORDER BY id")
            .fetch_all(self.pool)
            .await?;
        parse_uuids(&rows, "id")
    }

    pub async fn by_country(&self, country_code: &CountryCode) -> Result<Vec<University>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM universities WHERE country_code = ? \
             ORDER BY name COLLATE NOCASE, id"
        ))
        .bind(country_code.as_str())
        .fetch_all(self.pool)
        .await?;
        rows.iter().map(university_from_row).collect()
    }

    /// All universities with a non-blank name, by name.
    pub async fn list_all(&self) -> Result<Vec<University>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM universities WHERE trim(name) <> '' \
             ORDER BY name COLLATE NOCASE, id"
        ))
        .fetch_all(self.pool)
        .await?;
        rows.iter().map(university_from_row).collect()
    }

    /// One page of universities matching `filter`.
    #[instrument(skip(self, filter))]
    pub async fn list(
        &self,
        filter: &UniversityFilter,
        page: Pagination,
    ) -> Result<Paginated<University>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {COLUMNS}, COUNT(*) OVER() AS total FROM universities"
        ));
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY ");
        qb.push(order_clause(filter.sort, filter.order));
        qb.push(" LIMIT ").push_bind(page.limit());
        qb.push(" OFFSET ").push_bind(page.offset());

        let rows = qb.build().fetch_all(self.pool).await?;
        let total = match rows.first() {
            Some(row) => row.try_get::<i64, _>("total")?,
            // Past the last page the window total is lost with the rows.
            None if page.offset() > 0 => self.count(filter).await?,
            None => 0,
        };
        let items = rows
            .iter()
            .map(university_from_row)
            .collect::<Result<Vec<_>>>()?;

        Ok(Paginated {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    async fn count(&self, filter: &UniversityFilter) -> Result<i64> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM universities");
        push_filter(&mut qb, filter);
        let row = qb.build().fetch_one(self.pool).await?;
        Ok(row.try_get(0)?)
    }

    /// Case-insensitive substring match on the name.
    pub async fn search(
        &self,
        term: &str,
        country_code: Option<&CountryCode>,
        limit: u32,
    ) -> Result<Vec<University>> {
        let filter = UniversityFilter {
            search: Some(term.to_owned()),
            country_code: country_code.cloned(),
            ..Default::default()
        };
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {COLUMNS} FROM universities"));
        push_filter(&mut qb, &filter);
        qb.push(" ORDER BY name COLLATE NOCASE, id LIMIT ")
            .push_bind(i64::from(limit));

        let rows = qb.build().fetch_all(self.pool).await?;
        rows.iter().map(university_from_row).collect()
    }

    /// Countries that have at least one university, with counts.
    pub async fn countries(&self) -> Result<Vec<CountryCount>> {
        let rows = sqlx::query(
            r#"
            SELECT country_code, COUNT(*) AS universities
            FROM universities
            GROUP BY country_code
            ORDER BY country_code
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(CountryCount {
                    country_code: row.try_get("country_code")?,
                    universities: row.try_get("universities")?,
                })
            })
            .collect()
    }

    /// Apply a partial update and return the stored row.
    #[instrument(skip(self, update))]
    pub async fn update(&self, id: Uuid, update: &UniversityUpdate) -> Result<University> {
        update.validate()?;
        let mut conn = self.pool.acquire().await?;
        if !update_row(&mut conn, id, update).await? {
            return Err(StoreError::not_found("university", id));
        }
        fetch_row(&mut conn, id)
            .await?
            .ok_or_else(|| StoreError::not_found("university", id))
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM universities WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("university", id));
        }
        debug!(%id, "university deleted");
        Ok(())
    }

    /// Insert, or overwrite the row that already represents this university.
    ///
    /// A record with a domain matches only the row holding that domain.
    /// Without a domain it matches by case-insensitive name within the
    /// country.
    #[instrument(skip(self, new), fields(name = %new.name))]
    pub async fn upsert(&self, new: &NewUniversity) -> Result<(University, UpsertOutcome)> {
        new.validate()?;
        let mut tx = self.pool.begin().await?;

        let existing = match &new.domain {
            Some(domain) => find_by_domain(&mut tx, domain).await?,
            None => find_by_name_and_country(&mut tx, &new.name, &new.country_code).await?,
        };

        let (stored, outcome) = match existing {
            Some(current) => {
                update_row(&mut tx, current.id, &UniversityUpdate::from(new)).await?;
                let stored = fetch_row(&mut tx, current.id)
                    .await?
                    .ok_or_else(|| StoreError::not_found("university", current.id))?;
                (stored, UpsertOutcome::Updated)
            }
            None => (insert_row(&mut tx, new).await?, UpsertOutcome::Inserted),
        };

        tx.commit().await?;
        debug!(id = %stored.id, ?outcome, "university upserted");
        Ok((stored, outcome))
    }
}

async fn insert_row(conn: &mut SqliteConnection, new: &NewUniversity) -> Result<University> {
    let row = sqlx::query(&format!(
        r#"
        INSERT INTO universities (
            id, name, search_name, country_code, state_province, city, website,
            domain, aliases, external_ids, apply_portals
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4().to_string())
    .bind(&new.name)
    .bind(fold_name(&new.name))
    .bind(new.country_code.as_str())
    .bind(&new.state_province)
    .bind(&new.city)
    .bind(&new.website)
    .bind(&new.domain)
    .bind(Json(new.aliases.clone()))
    .bind(Json(new.external_ids.clone()))
    .bind(Json(new.apply_portals.clone()))
    .fetch_one(&mut *conn)
    .await?;

    university_from_row(&row)
}

async fn fetch_row(conn: &mut SqliteConnection, id: Uuid) -> Result<Option<University>> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM universities WHERE id = ?"))
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await?;
    row.as_ref().map(university_from_row).transpose()
}

async fn find_by_domain(conn: &mut SqliteConnection, domain: &str) -> Result<Option<University>> {
    // The column is COLLATE NOCASE, so `=` ignores case.
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM universities WHERE domain = ?"))
        .bind(domain)
        .fetch_optional(&mut *conn)
        .await?;
    row.as_ref().map(university_from_row).transpose()
}

async fn find_by_name_and_country(
    conn: &mut SqliteConnection,
    name: &str,
    country_code: &CountryCode,
) -> Result<Option<University>> {
    let row = sqlx::query(&format!(
        "SELECT {COLUMNS} FROM universities \
         WHERE search_name = ? AND country_code = ? \
         ORDER BY created_at, id LIMIT 1"
    ))
    .bind(fold_name(name))
    .bind(country_code.as_str())
    .fetch_optional(&mut *conn)
    .await?;
    row.as_ref().map(university_from_row).transpose()
}

/// Returns false when no row has `id`.
async fn update_row(
    conn: &mut SqliteConnection,
    id: Uuid,
    update: &UniversityUpdate,
) -> Result<bool> {
    // `SET id = id` keeps the statement valid for an empty update and still
    // fires the updated_at trigger.
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE universities SET id = id");

    if let Some(name) = &update.name {
        qb.push(", name = ").push_bind(name.trim().to_owned());
        qb.push(", search_name = ").push_bind(fold_name(name));
    }
    if let Some(code) = &update.country_code {
        qb.push(", country_code = ").push_bind(code.as_str().to_owned());
    }
    if let Some(value) = &update.state_province {
        qb.push(", state_province = ").push_bind(value.clone());
    }
    if let Some(value) = &update.city {
        qb.push(", city = ").push_bind(value.clone());
    }
    if let Some(value) = &update.website {
        qb.push(", website = ").push_bind(value.clone());
    }
    if let Some(value) = &update.domain {
        qb.push(", domain = ").push_bind(value.clone());
    }
    if let Some(aliases) = &update.aliases {
        qb.push(", aliases = ").push_bind(Json(aliases.clone()));
    }
    if let Some(ids) = &update.external_ids {
        qb.push(", external_ids = ").push_bind(Json(ids.clone()));
    }
    if let Some(portals) = &update.apply_portals {
        qb.push(", apply_portals = ").push_bind(Json(portals.clone()));
    }
    qb.push(" WHERE id = ").push_bind(id.to_string());

    let result = qb.build().execute(&mut *conn).await?;
    Ok(result.rows_affected() > 0)
}

fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &UniversityFilter) {
    let mut prefix = " WHERE ";
    if let Some(code) = &filter.country_code {
        qb.push(prefix)
            .push("country_code = ")
            .push_bind(code.as_str().to_owned());
        prefix = " AND ";
    }
    if let Some(term) = filter.search.as_deref().filter(|t| !t.trim().is_empty()) {
        qb.push(prefix)
            .push("search_name LIKE ")
            .push_bind(contains_pattern(term))
            .push(" ESCAPE '\\'");
    }
}

fn order_clause(sort: UniversitySort, order: SortOrder) -> &'static str {
    match (sort, order) {
        (UniversitySort::Name, SortOrder::Asc) => "name COLLATE NOCASE ASC, id ASC",
        (UniversitySort::Name, SortOrder::Desc) => "name COLLATE NOCASE DESC, id DESC",
        (UniversitySort::CountryCode, SortOrder::Asc) => {
            "country_code ASC, name COLLATE NOCASE ASC, id ASC"
        }
        (UniversitySort::CountryCode, SortOrder::Desc) => {
            "country_code DESC, name COLLATE NOCASE DESC, id DESC"
        }
        (UniversitySort::CreatedAt, SortOrder::Asc) => "created_at ASC, id ASC",
        (UniversitySort::CreatedAt, SortOrder::Desc) => "created_at DESC, id DESC",
    }
}

fn university_from_row(row: &SqliteRow) -> Result<University> {
    Ok(University {
        id: uuid_column(row, "id")?,
        name: row.try_get("name")?,
        country_code: row.try_get("country_code")?,
        state_province: row.try_get("state_province")?,
        city: row.try_get("city")?,
        website: row.try_get("website")?,
        domain: row.try_get("domain")?,
        aliases: json_column::<Vec<String>>(row, "aliases")?,
        external_ids: json_column::<Map<String, Value>>(row, "external_ids")?,
        apply_portals: json_column::<Vec<Value>>(row, "apply_portals")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_clause_is_stable() {
        for sort in [
            UniversitySort::Name,
            UniversitySort::CountryCode,
            UniversitySort::CreatedAt,
        ] {
            for order in [SortOrder::Asc, SortOrder::Desc] {
                assert!(order_clause(sort, order).contains("id "));
            }
        }
    }

    #[test]
    fn filter_sql_shape() {
        let filter = UniversityFilter {
            search: Some("tech".into()),
            country_code: Some(CountryCode::new("US").unwrap()),
            ..Default::default()
        };
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT 1 FROM universities");
        push_filter(&mut qb, &filter);
        assert_eq!(
            qb.sql(),
            "SELECT 1 FROM universities WHERE country_code = ? AND search_name LIKE ? ESCAPE '\\'"
        );
    }

    #[test]
    fn blank_search_adds_no_predicate() {
        let filter = UniversityFilter {
            search: Some("   ".into()),
            ..Default::default()
        };
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT 1 FROM universities");
        push_filter(&mut qb, &filter);
        assert_eq!(qb.sql(), "SELECT 1 FROM universities");
    }
}
