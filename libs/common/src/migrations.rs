//! Linear schema migrations
//!
//! A [`MigrationChain`] is a singly-linked list of revisions: every
//! migration names its predecessor, exactly one (the root) has none, and no
//! two migrations share a predecessor. The [`Migrator`] walks that chain
//! against PostgreSQL, recording the current revision in a one-row
//! bookkeeping table so that re-running an upgrade only applies what is
//! missing.

use std::collections::{HashMap, HashSet};

use sqlx::PgPool;
use tracing::info;

use crate::error::{DatabaseError, DatabaseResult};

/// Bookkeeping table holding the current revision
pub const VERSION_TABLE: &str = "schema_version";

/// A single schema revision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    /// Revision identifier
    pub revision: &'static str,
    /// Revision this one applies on top of, `None` for the root
    pub down_revision: Option<&'static str>,
    /// Human readable summary
    pub description: &'static str,
    /// Statements applied when upgrading, in order
    pub upgrade: &'static [&'static str],
    /// Statements reverting `upgrade`, in order
    pub downgrade: &'static [&'static str],
}

/// Validated, ordered chain of migrations (root first)
#[derive(Debug, Clone)]
pub struct MigrationChain {
    migrations: Vec<Migration>,
}

impl MigrationChain {
    /// Validate `migrations` and order them from root to head
    pub fn new(migrations: Vec<Migration>) -> DatabaseResult<Self> {
        let mut seen = HashSet::new();
        for migration in &migrations {
            if !seen.insert(migration.revision) {
                return Err(chain_error(format!(
                    "duplicate revision {}",
                    migration.revision
                )));
            }
        }

        let roots: Vec<&Migration> = migrations
            .iter()
            .filter(|m| m.down_revision.is_none())
            .collect();
        let root = match roots.as_slice() {
            [root] => **root,
            [] => return Err(chain_error("chain has no root revision")),
            _ => return Err(chain_error("chain has more than one root revision")),
        };

        let mut children: HashMap<&str, Migration> = HashMap::new();
        for migration in &migrations {
            let Some(parent) = migration.down_revision else {
                continue;
            };
            if !seen.contains(parent) {
                return Err(chain_error(format!(
                    "revision {} points to unknown revision {}",
                    migration.revision, parent
                )));
            }
            if let Some(sibling) = children.insert(parent, *migration) {
                return Err(chain_error(format!(
                    "revisions {} and {} both follow {}",
                    sibling.revision, migration.revision, parent
                )));
            }
        }

        let mut ordered = vec![root];
        let mut cursor = root.revision;
        while let Some(next) = children.get(cursor) {
            ordered.push(*next);
            cursor = next.revision;
        }

        if ordered.len() != migrations.len() {
            return Err(chain_error(
                "chain contains revisions unreachable from the root",
            ));
        }

        Ok(Self {
            migrations: ordered,
        })
    }

    /// Migrations from root to head
    pub fn migrations(&self) -> &[Migration] {
        &self.migrations
    }

    /// Latest revision
    pub fn head(&self) -> &Migration {
        // `new` rejects empty chains.
        &self.migrations[self.migrations.len() - 1]
    }

    fn position(&self, revision: &str) -> DatabaseResult<usize> {
        self.migrations
            .iter()
            .position(|m| m.revision == revision)
            .ok_or_else(|| DatabaseError::UnknownRevision(revision.to_string()))
    }

    /// Migrations to apply, in order, to go from `current` to `target`
    pub fn upgrade_plan(
        &self,
        current: Option<&str>,
        target: &str,
    ) -> DatabaseResult<Vec<&Migration>> {
        let start = match current {
            Some(revision) => self.position(revision)? + 1,
            None => 0,
        };
        let end = self.position(target)?;

        if start > end + 1 {
            return Err(DatabaseError::InvalidTarget(format!(
                "{target} is older than the current revision; downgrade instead"
            )));
        }

        Ok(self.migrations[start..=end].iter().collect())
    }

    /// Migrations to revert, newest first, to go from `current` back to
    /// `target` (`None` meaning an empty schema)
    pub fn downgrade_plan(
        &self,
        current: Option<&str>,
        target: Option<&str>,
    ) -> DatabaseResult<Vec<&Migration>> {
        let Some(current) = current else {
            return match target {
                None => Ok(Vec::new()),
                Some(target) => Err(DatabaseError::InvalidTarget(format!(
                    "cannot downgrade an empty schema to {target}"
                ))),
            };
        };

        let end = self.position(current)?;
        let start = match target {
            Some(revision) => self.position(revision)? + 1,
            None => 0,
        };

        if start > end + 1 {
            return Err(DatabaseError::InvalidTarget(format!(
                "{} is newer than the current revision; upgrade instead",
                target.unwrap_or("base")
            )));
        }

        Ok(self.migrations[start..=end].iter().rev().collect())
    }
}

fn chain_error(message: impl Into<String>) -> DatabaseError {
    DatabaseError::InvalidChain(message.into())
}

/// Applies a [`MigrationChain`] to a database
#[derive(Clone)]
pub struct Migrator {
    pool: PgPool,
    chain: MigrationChain,
}

impl Migrator {
    /// Create a migrator for `chain` over `pool`
    pub fn new(pool: PgPool, chain: MigrationChain) -> Self {
        Self { pool, chain }
    }

    /// The chain this migrator applies
    pub fn chain(&self) -> &MigrationChain {
        &self.chain
    }

    async fn ensure_version_table(&self) -> DatabaseResult<()> {
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {VERSION_TABLE} (version_num VARCHAR(32) PRIMARY KEY)"
        ))
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;
        Ok(())
    }

    /// Revision currently recorded in the database, `None` if nothing is applied
    pub async fn current_revision(&self) -> DatabaseResult<Option<String>> {
        self.ensure_version_table().await?;

        sqlx::query_scalar(&format!("SELECT version_num FROM {VERSION_TABLE}"))
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    /// Apply every pending migration
    pub async fn upgrade_to_head(&self) -> DatabaseResult<Vec<&'static str>> {
        let head = self.chain.head().revision;
        self.upgrade_to(head).await
    }

    /// Apply pending migrations up to and including `target`
    pub async fn upgrade_to(&self, target: &str) -> DatabaseResult<Vec<&'static str>> {
        let current = self.current_revision().await?;
        let plan = self.chain.upgrade_plan(current.as_deref(), target)?;

        if plan.is_empty() {
            info!("Schema already at revision {}", target);
        }

        let mut applied = Vec::with_capacity(plan.len());
        for migration in plan {
            info!(
                "Upgrading {} -> {}: {}",
                migration.down_revision.unwrap_or("base"),
                migration.revision,
                migration.description
            );
            self.run_step(migration.upgrade, Some(migration.revision))
                .await?;
            applied.push(migration.revision);
        }

        Ok(applied)
    }

    /// Revert migrations until `target` is current (`None` reverts everything)
    pub async fn downgrade_to(&self, target: Option<&str>) -> DatabaseResult<Vec<&'static str>> {
        let current = self.current_revision().await?;
        let plan = self.chain.downgrade_plan(current.as_deref(), target)?;

        let mut reverted = Vec::with_capacity(plan.len());
        for migration in plan {
            info!(
                "Downgrading {} -> {}",
                migration.revision,
                migration.down_revision.unwrap_or("base")
            );
            self.run_step(migration.downgrade, migration.down_revision)
                .await?;
            reverted.push(migration.revision);
        }

        Ok(reverted)
    }

    /// Run `statements` and record `revision` in one transaction
    async fn run_step(
        &self,
        statements: &[&str],
        revision: Option<&str>,
    ) -> DatabaseResult<()> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::Query)?;

        for statement in statements {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(DatabaseError::Query)?;
        }

        sqlx::query(&format!("DELETE FROM {VERSION_TABLE}"))
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::Query)?;

        if let Some(revision) = revision {
            sqlx::query(&format!(
                "INSERT INTO {VERSION_TABLE} (version_num) VALUES ($1)"
            ))
            .bind(revision)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::Query)?;
        }

        tx.commit().await.map_err(DatabaseError::Query)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(revision: &'static str, down_revision: Option<&'static str>) -> Migration {
        Migration {
            revision,
            down_revision,
            description: "test step",
            upgrade: &[],
            downgrade: &[],
        }
    }

    fn revisions(plan: &[&Migration]) -> Vec<&'static str> {
        plan.iter().map(|m| m.revision).collect()
    }

    fn sample_chain() -> MigrationChain {
        // Deliberately out of order; `new` sorts by predecessor links.
        MigrationChain::new(vec![
            step("003", Some("002")),
            step("001", None),
            step("004", Some("003")),
            step("002", Some("001")),
        ])
        .unwrap()
    }

    #[test]
    fn test_chain_is_ordered_from_root_to_head() {
        let chain = sample_chain();
        let order: Vec<_> = chain.migrations().iter().map(|m| m.revision).collect();
        assert_eq!(order, vec!["001", "002", "003", "004"]);
        assert_eq!(chain.head().revision, "004");
    }

    #[test]
    fn test_chain_rejects_multiple_roots() {
        let err = MigrationChain::new(vec![step("001", None), step("002", None)]).unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidChain(_)));
    }

    #[test]
    fn test_chain_rejects_empty_input() {
        assert!(MigrationChain::new(Vec::new()).is_err());
    }

    #[test]
    fn test_chain_rejects_branches() {
        let result = MigrationChain::new(vec![
            step("001", None),
            step("002a", Some("001")),
            step("002b", Some("001")),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_chain_rejects_unknown_predecessor_and_duplicates() {
        assert!(MigrationChain::new(vec![step("001", None), step("002", Some("999"))]).is_err());
        assert!(MigrationChain::new(vec![step("001", None), step("001", None)]).is_err());
    }

    #[test]
    fn test_chain_rejects_detached_cycle() {
        let result = MigrationChain::new(vec![
            step("001", None),
            step("a", Some("b")),
            step("b", Some("a")),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_upgrade_plan_from_empty_schema() {
        let chain = sample_chain();
        let plan = chain.upgrade_plan(None, "004").unwrap();
        assert_eq!(revisions(&plan), vec!["001", "002", "003", "004"]);
    }

    #[test]
    fn test_upgrade_plan_only_contains_pending_revisions() {
        let chain = sample_chain();
        let plan = chain.upgrade_plan(Some("002"), "004").unwrap();
        assert_eq!(revisions(&plan), vec!["003", "004"]);

        let plan = chain.upgrade_plan(Some("004"), "004").unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_upgrade_plan_refuses_to_go_backwards() {
        let chain = sample_chain();
        assert!(chain.upgrade_plan(Some("004"), "002").is_err());
        assert!(chain.upgrade_plan(Some("unknown"), "004").is_err());
    }

    #[test]
    fn test_downgrade_plan_reverts_newest_first() {
        let chain = sample_chain();
        let plan = chain.downgrade_plan(Some("004"), Some("002")).unwrap();
        assert_eq!(revisions(&plan), vec!["004", "003"]);

        let plan = chain.downgrade_plan(Some("002"), None).unwrap();
        assert_eq!(revisions(&plan), vec!["002", "001"]);
    }

    #[test]
    fn test_downgrade_plan_edge_cases() {
        let chain = sample_chain();
        assert!(chain.downgrade_plan(None, None).unwrap().is_empty());
        assert!(chain.downgrade_plan(None, Some("001")).is_err());
        assert!(chain.downgrade_plan(Some("002"), Some("003")).is_err());
        assert!(
            chain
                .downgrade_plan(Some("003"), Some("003"))
                .unwrap()
                .is_empty()
        );
    }
}
