use rusqlite::{Connection, Row, params};
use thiserror::Error;

use crate::domain::models::{EnergyReportRecord, NewEnergyReportRecord, NewUserRecord, UserRecord};

pub const LATEST_SCHEMA_VERSION: u32 = 1;

const MIGRATIONS: &[(u32, &str)] = &[(
    1,
    r#"
CREATE TABLE IF NOT EXISTS user_table (
    user_id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_name TEXT NOT NULL,
    password TEXT NOT NULL,
    role TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS energy_reports (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    meter_no INTEGER,
    machine_name TEXT,
    reading_date TEXT NOT NULL,
    energy_kwh REAL NOT NULL,
    power_kw REAL NOT NULL,
    power_factor REAL
);

CREATE INDEX IF NOT EXISTS idx_energy_reports_reading_date
ON energy_reports (reading_date);
"#,
)];

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database operation failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("unsupported schema version {current}; latest supported is {latest}")]
    UnsupportedSchemaVersion { current: u32, latest: u32 },
}

pub fn open_connection(path: &str) -> Result<Connection, DbError> {
    Connection::open(path).map_err(DbError::from)
}

pub fn run_migrations(connection: &mut Connection) -> Result<(), DbError> {
    let current_version = schema_version(connection)?;

    if current_version > LATEST_SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            current: current_version,
            latest: LATEST_SCHEMA_VERSION,
        });
    }

    let transaction = connection.transaction()?;

    for (version, sql) in MIGRATIONS {
        if *version > current_version {
            transaction.execute_batch(sql)?;
            transaction.pragma_update(None, "user_version", version)?;
        }
    }

    transaction.commit()?;

    Ok(())
}

pub fn schema_version(connection: &Connection) -> Result<u32, DbError> {
    let version = connection.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(version)
}

pub fn liveness_check(connection: &Connection) -> Result<i64, DbError> {
    let ok = connection.query_row("SELECT 1 AS ok", [], |row| row.get(0))?;
    Ok(ok)
}

/// Exact-match credential lookup. The password column is compared as
/// stored; no hashing is applied at this layer.
pub fn find_user_by_credentials(
    connection: &Connection,
    user_name: &str,
    password: &str,
) -> Result<Option<UserRecord>, DbError> {
    let mut statement = connection.prepare(
        "SELECT user_id, user_name, password, role
         FROM user_table
         WHERE user_name = ?1 AND password = ?2
         LIMIT 1",
    )?;

    let mut rows = statement.query(params![user_name, password])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(UserRecord {
            user_id: row.get(0)?,
            user_name: row.get(1)?,
            password: row.get(2)?,
            role: row.get(3)?,
        }));
    }

    Ok(None)
}

pub fn insert_user(connection: &Connection, new_user: &NewUserRecord) -> Result<i64, DbError> {
    connection.execute(
        "INSERT INTO user_table (user_name, password, role) VALUES (?1, ?2, ?3)",
        params![new_user.user_name, new_user.password, new_user.role],
    )?;

    Ok(connection.last_insert_rowid())
}

pub fn insert_report(
    connection: &Connection,
    new_report: &NewEnergyReportRecord,
) -> Result<i64, DbError> {
    connection.execute(
        "INSERT INTO energy_reports (meter_no, machine_name, reading_date, energy_kwh, power_kw, power_factor)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            new_report.meter_no,
            new_report.machine_name,
            new_report.reading_date,
            new_report.energy_kwh,
            new_report.power_kw,
            new_report.power_factor,
        ],
    )?;

    Ok(connection.last_insert_rowid())
}

pub fn list_reports_oldest_first(
    connection: &Connection,
) -> Result<Vec<EnergyReportRecord>, DbError> {
    list_reports(connection, "ASC")
}

pub fn list_reports_newest_first(
    connection: &Connection,
) -> Result<Vec<EnergyReportRecord>, DbError> {
    list_reports(connection, "DESC")
}

fn list_reports(connection: &Connection, order: &str) -> Result<Vec<EnergyReportRecord>, DbError> {
    let mut statement = connection.prepare(&format!(
        "SELECT id, meter_no, machine_name, reading_date, energy_kwh, power_kw, power_factor
         FROM energy_reports
         ORDER BY reading_date {order}, id {order}"
    ))?;

    let rows = statement.query_map([], map_report_row)?;

    let mut reports = Vec::new();
    for row in rows {
        reports.push(row?);
    }

    Ok(reports)
}

fn map_report_row(row: &Row<'_>) -> rusqlite::Result<EnergyReportRecord> {
    Ok(EnergyReportRecord {
        id: row.get(0)?,
        meter_no: row.get(1)?,
        machine_name: row.get(2)?,
        reading_date: row.get(3)?,
        energy_kwh: row.get(4)?,
        power_kw: row.get(5)?,
        power_factor: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::domain::models::{NewEnergyReportRecord, NewUserRecord};

    use super::{
        LATEST_SCHEMA_VERSION, find_user_by_credentials, insert_report, insert_user,
        list_reports_newest_first, list_reports_oldest_first, liveness_check, open_connection,
        run_migrations, schema_version,
    };

    fn temp_db_path(name: &str) -> PathBuf {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join(name);
        std::mem::forget(dir);
        path
    }

    fn open_migrated(name: &str) -> rusqlite::Connection {
        let db_path = temp_db_path(name);
        let mut connection =
            open_connection(db_path.to_string_lossy().as_ref()).expect("db connection should open");
        run_migrations(&mut connection).expect("migrations should succeed");
        connection
    }

    fn sample_report(
        meter_no: Option<i64>,
        machine_name: Option<&str>,
        reading_date: &str,
    ) -> NewEnergyReportRecord {
        NewEnergyReportRecord {
            meter_no,
            machine_name: machine_name.map(ToString::to_string),
            reading_date: reading_date.to_string(),
            energy_kwh: 10.5,
            power_kw: 3.2,
            power_factor: Some(0.95),
        }
    }

    #[test]
    fn migrates_fresh_database_to_latest_version() {
        let connection = open_migrated("fresh.sqlite");

        let version = schema_version(&connection).expect("schema version should be queryable");
        assert_eq!(version, LATEST_SCHEMA_VERSION);

        for table in ["user_table", "energy_reports"] {
            let exists: i64 = connection
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |row| row.get(0),
                )
                .expect("table check should work");
            assert_eq!(exists, 1, "{table} should exist");
        }
    }

    #[test]
    fn migrations_are_idempotent() {
        let db_path = temp_db_path("idempotent.sqlite");
        let mut connection =
            open_connection(db_path.to_string_lossy().as_ref()).expect("db connection should open");

        run_migrations(&mut connection).expect("first migration run should succeed");
        run_migrations(&mut connection).expect("second migration run should succeed");

        let version = schema_version(&connection).expect("schema version should be queryable");
        assert_eq!(version, LATEST_SCHEMA_VERSION);
    }

    #[test]
    fn liveness_check_returns_one() {
        let connection = open_migrated("liveness.sqlite");
        assert_eq!(liveness_check(&connection).expect("query should succeed"), 1);
    }

    #[test]
    fn credential_lookup_requires_exact_match_on_both_fields() {
        let connection = open_migrated("credentials.sqlite");
        let user_id = insert_user(
            &connection,
            &NewUserRecord {
                user_name: "operator".to_string(),
                password: "pass123".to_string(),
                role: "admin".to_string(),
            },
        )
        .expect("insert should succeed");

        let found = find_user_by_credentials(&connection, "operator", "pass123")
            .expect("query should succeed")
            .expect("user should be found");
        assert_eq!(found.user_id, user_id);
        assert_eq!(found.role, "admin");

        let wrong_password = find_user_by_credentials(&connection, "operator", "PASS123")
            .expect("query should succeed");
        assert_eq!(wrong_password, None);

        let wrong_name =
            find_user_by_credentials(&connection, "Operator", "pass123").expect("query should succeed");
        assert_eq!(wrong_name, None);
    }

    #[test]
    fn lists_reports_in_both_reading_date_orders() {
        let connection = open_migrated("ordering.sqlite");

        for (meter, date) in [
            (Some(2), "2026-03-02T10:00:00Z"),
            (Some(1), "2026-03-01T10:00:00Z"),
            (Some(3), "2026-03-03T10:00:00Z"),
        ] {
            insert_report(&connection, &sample_report(meter, Some("Pump"), date))
                .expect("insert should succeed");
        }

        let ascending = list_reports_oldest_first(&connection).expect("query should succeed");
        assert_eq!(
            ascending.iter().map(|row| row.meter_no).collect::<Vec<_>>(),
            vec![Some(1), Some(2), Some(3)]
        );

        let descending = list_reports_newest_first(&connection).expect("query should succeed");
        assert_eq!(
            descending.iter().map(|row| row.meter_no).collect::<Vec<_>>(),
            vec![Some(3), Some(2), Some(1)]
        );
    }

    #[test]
    fn report_rows_round_trip_nullable_columns() {
        let connection = open_migrated("nullable.sqlite");

        insert_report(
            &connection,
            &NewEnergyReportRecord {
                meter_no: None,
                machine_name: None,
                reading_date: "2026-03-01T10:00:00Z".to_string(),
                energy_kwh: 0.0,
                power_kw: 0.0,
                power_factor: None,
            },
        )
        .expect("insert should succeed");

        let rows = list_reports_oldest_first(&connection).expect("query should succeed");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].meter_no, None);
        assert_eq!(rows[0].machine_name, None);
        assert_eq!(rows[0].power_factor, None);
    }
}
