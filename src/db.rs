use anyhow::Context;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

pub const DB_FILE_NAME: &str = "performance_tracker.db";

const GRADE_COLUMNS: &str = "id, student_name, email, class, division, roll_number, subject, score";

/// A grade row as the caller supplies it. The store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGradeRecord {
    pub student_name: String,
    pub email: Option<String>,
    pub class: String,
    pub division: String,
    pub roll_number: Option<String>,
    pub subject: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradeRecord {
    pub id: i64,
    pub student_name: String,
    pub email: Option<String>,
    pub class: String,
    pub division: String,
    pub roll_number: Option<String>,
    pub subject: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubjectAverage {
    pub subject: String,
    pub average: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryStats {
    pub total_records: i64,
    pub overall_average: f64,
    pub unique_students: i64,
}

pub struct Store {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Store {
    /// Opens (creating if needed) the grade table inside `workspace`.
    pub fn open(workspace: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(workspace)
            .with_context(|| format!("failed to create workspace {}", workspace.display()))?;
        let db_path = workspace.join(DB_FILE_NAME);
        let conn = Connection::open(&db_path).context("failed to open sqlite db")?;
        let store = Self {
            conn,
            path: Some(db_path),
        };
        store.initialize()?;
        tracing::info!(path = %workspace.display(), "grade store opened");
        Ok(store)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory sqlite db")?;
        let store = Self { conn, path: None };
        store.initialize()?;
        Ok(store)
    }

    #[cfg(test)]
    pub fn execute_batch(&self, sql: &str) -> anyhow::Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn initialize(&self) -> anyhow::Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS grades(
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                student_name TEXT NOT NULL,
                email TEXT,
                class TEXT NOT NULL,
                division TEXT NOT NULL,
                roll_number TEXT,
                subject TEXT NOT NULL,
                score REAL NOT NULL
            )",
            [],
        )?;
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_grades_subject ON grades(subject)",
            [],
        )?;
        Ok(())
    }

    /// Appends one record. The score range is the caller's contract and is not
    /// checked here.
    pub fn insert(&self, rec: &NewGradeRecord) -> anyhow::Result<GradeRecord> {
        self.conn
            .execute(
                "INSERT INTO grades(student_name, email, class, division, roll_number, subject, score)
                 VALUES(?, ?, ?, ?, ?, ?, ?)",
                (
                    &rec.student_name,
                    &rec.email,
                    &rec.class,
                    &rec.division,
                    &rec.roll_number,
                    &rec.subject,
                    rec.score,
                ),
            )
            .context("failed to insert grade record")?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, subject = %rec.subject, "grade record inserted");

        Ok(GradeRecord {
            id,
            student_name: rec.student_name.clone(),
            email: rec.email.clone(),
            class: rec.class.clone(),
            division: rec.division.clone(),
            roll_number: rec.roll_number.clone(),
            subject: rec.subject.clone(),
            score: rec.score,
        })
    }

    pub fn list_all(&self) -> anyhow::Result<Vec<GradeRecord>> {
        let sql = format!("SELECT {GRADE_COLUMNS} FROM grades ORDER BY id DESC");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(GradeRecord {
                    id: row.get(0)?,
                    student_name: row.get(1)?,
                    email: row.get(2)?,
                    // Tables created by the older desktop app allow NULL class/division.
                    class: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    division: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                    roll_number: row.get(5)?,
                    subject: row.get(6)?,
                    score: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("failed to read grade records")?;
        Ok(rows)
    }

    /// Case-insensitive infix match on the student name. An empty needle
    /// matches everything.
    pub fn list_matching(&self, name_substring: &str) -> anyhow::Result<Vec<GradeRecord>> {
        let all = self.list_all()?;
        if name_substring.is_empty() {
            return Ok(all);
        }
        let needle = name_substring.to_lowercase();
        Ok(all
            .into_iter()
            .filter(|r| r.student_name.to_lowercase().contains(&needle))
            .collect())
    }

    pub fn average_score_by_subject(&self) -> anyhow::Result<Vec<SubjectAverage>> {
        let mut stmt = self.conn.prepare(
            "SELECT subject, AVG(score)
             FROM grades
             GROUP BY subject
             ORDER BY subject",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(SubjectAverage {
                    subject: row.get(0)?,
                    average: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("failed to read subject averages")?;
        Ok(rows)
    }

    pub fn summary_statistics(&self) -> anyhow::Result<SummaryStats> {
        let (total_records, overall_average, unique_students) = self
            .conn
            .query_row(
                "SELECT COUNT(id), AVG(score), COUNT(DISTINCT student_name) FROM grades",
                [],
                |r| {
                    Ok((
                        r.get::<_, i64>(0)?,
                        r.get::<_, Option<f64>>(1)?,
                        r.get::<_, i64>(2)?,
                    ))
                },
            )
            .context("failed to read summary statistics")?;
        Ok(SummaryStats {
            total_records,
            overall_average: overall_average.unwrap_or(0.0),
            unique_students,
        })
    }

    /// Releases the connection. Taking `self` makes a second close impossible.
    pub fn close(self) -> anyhow::Result<()> {
        let path = self.path;
        self.conn
            .close()
            .map_err(|(_, e)| e)
            .context("failed to close sqlite db")?;
        if let Some(p) = path {
            tracing::info!(path = %p.display(), "grade store closed");
        }
        Ok(())
    }
}
