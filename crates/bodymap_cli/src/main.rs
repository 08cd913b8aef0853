//! CLI entry point for local checks and scheduled runs.
//!
//! # Responsibility
//! - Verify `bodymap_core` linkage (`ping`, `version`).
//! - Run the daily map generation against a database file (`daily`).
//!
//! The database path comes from the second argument, then
//! `BODYMAP_DB_PATH`, then `<tmp>/bodymap.sqlite3`.

use bodymap_core::db::open_db;
use bodymap_core::{MapLifecycleService, SqliteStores, UserLocks};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

const USAGE: &str = "usage: bodymap_cli [ping|version|daily [db-path]]";

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        None | Some("ping") => {
            println!("bodymap_core ping={}", bodymap_core::ping());
            ExitCode::SUCCESS
        }
        Some("version") => {
            println!("bodymap_core version={}", bodymap_core::core_version());
            ExitCode::SUCCESS
        }
        Some("daily") => match run_daily(resolve_db_path(args.next())) {
            Ok(()) => ExitCode::SUCCESS,
            Err(message) => {
                eprintln!("daily generation failed: {message}");
                ExitCode::FAILURE
            }
        },
        Some(_) => {
            eprintln!("{USAGE}");
            ExitCode::from(2)
        }
    }
}

fn run_daily(db_path: PathBuf) -> Result<(), String> {
    let conn = open_db(&db_path).map_err(|err| err.to_string())?;
    let stores = SqliteStores::try_new(&conn).map_err(|err| err.to_string())?;
    let lifecycle = MapLifecycleService::new(stores, Arc::new(UserLocks::new()));
    let summary = lifecycle
        .trigger_daily_map_generation()
        .map_err(|err| err.to_string())?;

    println!(
        "daily generation users={} generated={} failed={}",
        summary.total(),
        summary.generated.len(),
        summary.failed.len()
    );
    for failure in &summary.failed {
        println!(
            "  failed user={} code={} message={}",
            failure.user,
            failure.kind.code(),
            failure.message
        );
    }
    Ok(())
}

fn resolve_db_path(arg: Option<String>) -> PathBuf {
    arg.or_else(|| std::env::var("BODYMAP_DB_PATH").ok())
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("bodymap.sqlite3"))
}
