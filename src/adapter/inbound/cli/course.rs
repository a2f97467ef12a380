//! Handlers for the `course` command group.

use serde_json::json;
use tabled::Tabled;

use crate::adapter::inbound::cli::output;
use crate::app::App;
use crate::config::Config;
use crate::domain::CourseRoster;
use crate::error::Result;

#[derive(Tabled)]
struct CourseRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Seats")]
    seats: i32,
    #[tabled(rename = "Teachers")]
    teachers: String,
    #[tabled(rename = "Students")]
    students: usize,
}

impl From<&CourseRoster> for CourseRow {
    fn from(roster: &CourseRoster) -> Self {
        Self {
            id: roster.course.id.to_string(),
            name: roster.course.name.clone(),
            time: roster.course.schedule.clone(),
            seats: roster.course.capacity,
            teachers: roster.teacher_names(),
            students: roster.students.len(),
        }
    }
}

/// Execute `course list`.
pub fn list(config: &Config) -> Result<()> {
    let app = App::open(config)?;
    let rosters = app.registry.rosters()?;

    if output::is_json() {
        output::json_output(json!({ "command": "course.list", "courses": rosters }));
        return Ok(());
    }
    if rosters.is_empty() {
        output::note("No courses yet");
        return Ok(());
    }
    let rows: Vec<CourseRow> = rosters.iter().map(CourseRow::from).collect();
    output::table(&rows);
    Ok(())
}
