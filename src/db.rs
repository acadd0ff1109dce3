use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::path::PathBuf;

use crate::intake::IntakeApplication;
use crate::models::{Application, ApplicationStatus, RoleType, Sprint, SprintStatus};

pub struct Database {
    conn: Connection,
    path: PathBuf,
}

impl Database {
    pub fn open() -> Result<Self> {
        let path = Self::default_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&path)?;
        Ok(Self { conn, path })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn,
            path: PathBuf::from(":memory:"),
        };
        db.init()?;
        Ok(db)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn default_path() -> Result<PathBuf> {
        // Use XDG data directory or fallback
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "pursuit") {
            Ok(proj_dirs.data_dir().join("pursuit.db"))
        } else {
            // Fallback to current directory
            Ok(PathBuf::from("pursuit.db"))
        }
    }

    pub fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS applications (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                company TEXT NOT NULL,
                role TEXT,
                status TEXT NOT NULL DEFAULT 'applied' CHECK (status IN ('applied', 'shortlisted', 'interview', 'offer', 'rejected')),
                notes TEXT,
                applied_on TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS sprints (
                id TEXT PRIMARY KEY,
                application_id INTEGER NOT NULL REFERENCES applications(id),
                interview_date TEXT NOT NULL,
                role_type TEXT NOT NULL,
                total_days INTEGER NOT NULL,
                status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'completed', 'expired')),
                daily_plans TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX IF NOT EXISTS idx_applications_status ON applications(status);
            CREATE INDEX IF NOT EXISTS idx_sprints_application ON sprints(application_id);
            "#,
        )?;
        Ok(())
    }

    pub fn ensure_initialized(&self) -> Result<()> {
        let tables: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='applications'",
            [],
            |row| row.get(0),
        )?;
        if tables == 0 {
            return Err(anyhow!(
                "Database not initialized. Run 'pursuit init' first."
            ));
        }
        Ok(())
    }

    // --- Application operations ---

    pub fn create_application(&self, app: &IntakeApplication) -> Result<i64> {
        let status = app.status.unwrap_or(ApplicationStatus::Applied);
        self.conn.execute(
            "INSERT INTO applications (company, role, status, notes, applied_on)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                app.company,
                app.role,
                status.as_str(),
                app.notes,
                app.applied_on.map(|d| d.to_string()),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn list_applications(&self, status: Option<ApplicationStatus>) -> Result<Vec<Application>> {
        let mut sql = String::from(
            "SELECT id, company, role, status, notes, applied_on, created_at, updated_at
             FROM applications",
        );
        if status.is_some() {
            sql.push_str(" WHERE status = ?1");
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = if let Some(s) = status {
            stmt.query_map([s.as_str()], Self::row_to_application)?
        } else {
            stmt.query_map([], Self::row_to_application)?
        };

        rows.collect::<Result<Vec<_>, _>>()
            .context("Failed to list applications")
    }

    pub fn get_application(&self, id: i64) -> Result<Option<Application>> {
        let result = self.conn.query_row(
            "SELECT id, company, role, status, notes, applied_on, created_at, updated_at
             FROM applications WHERE id = ?1",
            [id],
            Self::row_to_application,
        );
        match result {
            Ok(app) => Ok(Some(app)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set_application_status(&self, id: i64, status: ApplicationStatus) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE applications SET status = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![status.as_str(), id],
        )?;
        if changed == 0 {
            return Err(anyhow!("Application #{} not found", id));
        }
        Ok(())
    }

    /// Count of applications per pipeline column, in board order.
    pub fn board_counts(&self) -> Result<Vec<(ApplicationStatus, i64)>> {
        let mut counts = Vec::new();
        for status in ApplicationStatus::ALL {
            let count: i64 = self.conn.query_row(
                "SELECT COUNT(*) FROM applications WHERE status = ?1",
                [status.as_str()],
                |row| row.get(0),
            )?;
            counts.push((status, count));
        }
        Ok(counts)
    }

    fn row_to_application(row: &rusqlite::Row) -> rusqlite::Result<Application> {
        let status: String = row.get(3)?;
        let applied_on: Option<String> = row.get(5)?;
        Ok(Application {
            id: row.get(0)?,
            company: row.get(1)?,
            role: row.get(2)?,
            // guarded by the CHECK constraint
            status: ApplicationStatus::parse(&status).unwrap_or(ApplicationStatus::Applied),
            notes: row.get(4)?,
            applied_on: applied_on.and_then(|d| d.parse().ok()),
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    // --- Sprint operations ---

    /// Persist a sprint, replacing any existing sprint for the same
    /// application. Daily plans are stored as a JSON column.
    pub fn replace_sprint(&self, sprint: &Sprint) -> Result<()> {
        let plans = serde_json::to_string(&sprint.daily_plans)
            .context("Failed to serialize daily plans")?;
        self.conn.execute(
            "DELETE FROM sprints WHERE application_id = ?1 AND id != ?2",
            params![sprint.application_id, sprint.id],
        )?;
        self.conn.execute(
            "INSERT OR REPLACE INTO sprints
             (id, application_id, interview_date, role_type, total_days, status, daily_plans, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                sprint.id,
                sprint.application_id,
                sprint.interview_date.to_string(),
                sprint.role_type.as_str(),
                sprint.total_days,
                sprint.status.as_str(),
                plans,
                sprint.created_at,
            ],
        )?;
        Ok(())
    }

    pub fn get_sprint_for_application(&self, application_id: i64) -> Result<Option<Sprint>> {
        let result = self.conn.query_row(
            "SELECT id, application_id, interview_date, role_type, total_days, status, daily_plans, created_at
             FROM sprints WHERE application_id = ?1",
            [application_id],
            Self::row_to_sprint_raw,
        );
        match result {
            Ok(raw) => Ok(Some(Self::sprint_from_raw(raw)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_sprints(&self) -> Result<Vec<Sprint>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, application_id, interview_date, role_type, total_days, status, daily_plans, created_at
             FROM sprints ORDER BY interview_date",
        )?;
        let raws = stmt
            .query_map([], Self::row_to_sprint_raw)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list sprints")?;
        raws.into_iter().map(Self::sprint_from_raw).collect()
    }

    // Fetch primitives in the row closure; JSON and date decoding happen
    // outside where anyhow context is available.
    #[allow(clippy::type_complexity)]
    fn row_to_sprint_raw(
        row: &rusqlite::Row,
    ) -> rusqlite::Result<(String, i64, String, String, u32, String, String, String)> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
            row.get(7)?,
        ))
    }

    fn sprint_from_raw(
        raw: (String, i64, String, String, u32, String, String, String),
    ) -> Result<Sprint> {
        let (id, application_id, interview_date, role_type, total_days, status, plans, created_at) = raw;
        Ok(Sprint {
            id,
            application_id,
            interview_date: interview_date
                .parse::<NaiveDate>()
                .with_context(|| format!("Bad interview date: {}", interview_date))?,
            role_type: RoleType::parse(&role_type)
                .ok_or_else(|| anyhow!("Bad role type: {}", role_type))?,
            total_days,
            status: SprintStatus::parse(&status)
                .ok_or_else(|| anyhow!("Bad sprint status: {}", status))?,
            daily_plans: serde_json::from_str(&plans)
                .context("Failed to decode daily plans")?,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprint::{generate_sprint, toggle_task};
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 3).unwrap()
    }

    fn intake(company: &str) -> IntakeApplication {
        IntakeApplication {
            company: company.to_string(),
            role: Some("SDET".to_string()),
            status: None,
            notes: Some("HR said 12 LPA budget".to_string()),
            applied_on: Some(today()),
        }
    }

    #[test]
    fn test_application_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let id = db.create_application(&intake("Zee5")).unwrap();

        let app = db.get_application(id).unwrap().unwrap();
        assert_eq!(app.company, "Zee5");
        assert_eq!(app.role.as_deref(), Some("SDET"));
        assert_eq!(app.status, ApplicationStatus::Applied);
        assert_eq!(app.applied_on, Some(today()));

        assert!(db.get_application(id + 1).unwrap().is_none());
    }

    #[test]
    fn test_status_move_and_board_counts() {
        let db = Database::open_in_memory().unwrap();
        let a = db.create_application(&intake("Zee5")).unwrap();
        let _b = db.create_application(&intake("Google")).unwrap();

        db.set_application_status(a, ApplicationStatus::Interview).unwrap();
        assert!(db.set_application_status(999, ApplicationStatus::Offer).is_err());

        let counts = db.board_counts().unwrap();
        assert_eq!(counts[0], (ApplicationStatus::Applied, 1));
        assert_eq!(counts[2], (ApplicationStatus::Interview, 1));

        let interviewing = db.list_applications(Some(ApplicationStatus::Interview)).unwrap();
        assert_eq!(interviewing.len(), 1);
        assert_eq!(interviewing[0].company, "Zee5");
    }

    #[test]
    fn test_sprint_round_trip_preserves_structure() {
        let db = Database::open_in_memory().unwrap();
        let app_id = db.create_application(&intake("Zee5")).unwrap();

        let mut sprint = generate_sprint(app_id, today() + Duration::days(5), RoleType::Sdet, today());
        let task_id = sprint.daily_plans[0].blocks[0].tasks[0].id.clone();
        toggle_task(&mut sprint, &task_id);
        db.replace_sprint(&sprint).unwrap();

        let loaded = db.get_sprint_for_application(app_id).unwrap().unwrap();
        assert_eq!(loaded.id, sprint.id);
        assert_eq!(loaded.total_days, sprint.total_days);
        assert_eq!(loaded.role_type, RoleType::Sdet);
        assert_eq!(loaded.daily_plans.len(), sprint.daily_plans.len());
        assert!(loaded.daily_plans[0].blocks[0].tasks[0].completed);
        assert_eq!(
            loaded.daily_plans[0].blocks[0].tasks[0].description,
            sprint.daily_plans[0].blocks[0].tasks[0].description
        );
    }

    #[test]
    fn test_restarting_a_sprint_replaces_the_old_one() {
        let db = Database::open_in_memory().unwrap();
        let app_id = db.create_application(&intake("Zee5")).unwrap();

        let first = generate_sprint(app_id, today() + Duration::days(5), RoleType::Sdet, today());
        db.replace_sprint(&first).unwrap();
        let second = generate_sprint(app_id, today() + Duration::days(9), RoleType::Sdet, today());
        db.replace_sprint(&second).unwrap();

        let sprints = db.list_sprints().unwrap();
        assert_eq!(sprints.len(), 1);
        assert_eq!(sprints[0].id, second.id);
    }
}
