//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use depscope::ApiResponse;
use tempfile::TempDir;

/// Files and edges of a small Python backend.
///
/// `backend` and `backend/routes` import each other; `backend/services` is
/// only imported.
pub fn backend_response() -> ApiResponse {
    ApiResponse::from_pairs(
        &[
            "backend/main.py",
            "backend/routes/auth.py",
            "backend/services/db.py",
        ],
        &[
            ("backend/routes/auth.py", "backend/services/db.py"),
            ("backend/main.py", "backend/routes/auth.py"),
            ("backend/routes/auth.py", "backend/main.py"),
        ],
    )
}

/// Two components with no edges between them, in different directories.
pub fn disconnected_response() -> ApiResponse {
    ApiResponse::from_pairs(
        &[
            "web/app.ts",
            "web/router.ts",
            "web/view.ts",
            "api/server.rs",
            "api/handlers.rs",
            "api/db.rs",
        ],
        &[
            ("web/app.ts", "web/router.ts"),
            ("web/router.ts", "web/view.ts"),
            ("api/server.rs", "api/handlers.rs"),
            ("api/handlers.rs", "api/db.rs"),
        ],
    )
}

/// Write `json` to `graph.json` in a fresh temp directory.
pub fn write_input(json: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("graph.json");
    std::fs::write(&path, json).expect("write input");
    (dir, path)
}

/// The backend graph as camelCase JSON, the way the crawler emits it.
pub const BACKEND_JSON: &str = r#"{
  "nodes": [
    {"id": "backend/main.py", "label": "main.py", "language": "python", "importCount": 1},
    {"id": "backend/routes/auth.py", "label": "auth.py", "language": "python", "importCount": 2},
    {"id": "backend/services/db.py", "label": "db.py", "language": "python", "importCount": 0}
  ],
  "edges": [
    {"source": "backend/routes/auth.py", "target": "backend/services/db.py"},
    {"source": "backend/main.py", "target": "backend/routes/auth.py"},
    {"source": "backend/routes/auth.py", "target": "backend/main.py"}
  ],
  "totalFiles": 3,
  "totalDependencies": 3
}"#;

/// Run the depscope binary with `args`.
pub fn run_depscope(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_depscope"))
        .args(args)
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute depscope binary")
}

/// Run with a path argument spliced in after the subcommand.
pub fn run_on(command: &str, input: &Path, rest: &[&str]) -> Output {
    let input = input.to_string_lossy();
    let mut args = vec![command, input.as_ref()];
    args.extend_from_slice(rest);
    run_depscope(&args)
}
