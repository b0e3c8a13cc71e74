//! Revision history of the `users` / `slogans` schema

use common::{
    error::DatabaseResult,
    migrations::{Migration, MigrationChain},
};

/// Value written into `users.password` for rows that predate revision 004.
///
/// It is not a PHC string, so password verification always fails for those
/// accounts until their password is reset.
pub const LOCKED_PASSWORD: &str = "!locked";

const CREATE_USERS: Migration = Migration {
    revision: "001",
    down_revision: None,
    description: "create users table",
    upgrade: &[r#"
        CREATE TABLE users (
            id SERIAL PRIMARY KEY,
            username VARCHAR(80) NOT NULL,
            email VARCHAR(120) NOT NULL,
            CONSTRAINT users_username_key UNIQUE (username),
            CONSTRAINT users_email_key UNIQUE (email)
        )
        "#],
    downgrade: &["DROP TABLE users"],
};

const CREATE_SLOGANS: Migration = Migration {
    revision: "002",
    down_revision: Some("001"),
    description: "create slogans table",
    upgrade: &[
        r#"
        CREATE TABLE slogans (
            id SERIAL PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            slogan TEXT NOT NULL
        )
        "#,
        "CREATE INDEX idx_slogans_user_id ON slogans (user_id)",
    ],
    downgrade: &["DROP INDEX idx_slogans_user_id", "DROP TABLE slogans"],
};

const ADD_PET_COLUMNS: Migration = Migration {
    revision: "003",
    down_revision: Some("002"),
    description: "add pet_name and pet_species to users",
    upgrade: &[
        "ALTER TABLE users ADD COLUMN pet_name VARCHAR(50)",
        "ALTER TABLE users ADD COLUMN pet_species VARCHAR(50)",
    ],
    downgrade: &[
        "ALTER TABLE users DROP COLUMN pet_species",
        "ALTER TABLE users DROP COLUMN pet_name",
    ],
};

const ADD_PASSWORD_AND_TIMESTAMPS: Migration = Migration {
    revision: "004",
    down_revision: Some("003"),
    description: "add password and created_at timestamps",
    upgrade: &[
        "ALTER TABLE users ADD COLUMN password VARCHAR(255)",
        "UPDATE users SET password = '!locked' WHERE password IS NULL",
        "ALTER TABLE users ALTER COLUMN password SET NOT NULL",
        "ALTER TABLE users ADD COLUMN created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()",
        "ALTER TABLE slogans ADD COLUMN created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()",
    ],
    downgrade: &[
        "ALTER TABLE slogans DROP COLUMN created_at",
        "ALTER TABLE users DROP COLUMN created_at",
        "ALTER TABLE users DROP COLUMN password",
    ],
};

/// The full migration chain, root first
pub fn chain() -> DatabaseResult<MigrationChain> {
    MigrationChain::new(vec![
        CREATE_USERS,
        CREATE_SLOGANS,
        ADD_PET_COLUMNS,
        ADD_PASSWORD_AND_TIMESTAMPS,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_is_linear_and_ends_at_004() {
        let chain = chain().unwrap();
        let revisions: Vec<_> = chain.migrations().iter().map(|m| m.revision).collect();
        assert_eq!(revisions, vec!["001", "002", "003", "004"]);
        assert_eq!(chain.head().revision, "004");
    }

    #[test]
    fn test_every_step_can_be_reverted() {
        let chain = chain().unwrap();
        for migration in chain.migrations() {
            assert!(!migration.upgrade.is_empty(), "{}", migration.revision);
            assert!(!migration.downgrade.is_empty(), "{}", migration.revision);
        }
    }

    #[test]
    fn test_password_backfill_uses_locked_sentinel() {
        let backfill = ADD_PASSWORD_AND_TIMESTAMPS
            .upgrade
            .iter()
            .find(|sql| sql.starts_with("UPDATE users"))
            .unwrap();
        assert!(backfill.contains(&format!("'{LOCKED_PASSWORD}'")));
        // The column only becomes required after the backfill.
        let backfill_at = ADD_PASSWORD_AND_TIMESTAMPS
            .upgrade
            .iter()
            .position(|sql| sql.starts_with("UPDATE users"))
            .unwrap();
        let not_null_at = ADD_PASSWORD_AND_TIMESTAMPS
            .upgrade
            .iter()
            .position(|sql| sql.contains("SET NOT NULL"))
            .unwrap();
        assert!(backfill_at < not_null_at);
    }
}
