//! Dependency structure matrix tests.

use depscope::{
    ApiResponse, Config, DepScope, Error, build_directory_matrix, build_file_matrix,
};
use rstest::rstest;

mod common;
use common::backend_response;

#[test]
fn backend_routes_cycle_is_detected() {
    let dsm = build_directory_matrix(&backend_response());

    assert_eq!(
        dsm.directories,
        vec!["backend", "backend/routes", "backend/services"]
    );
    let backend = dsm.index_of("backend").unwrap();
    let routes = dsm.index_of("backend/routes").unwrap();
    let services = dsm.index_of("backend/services").unwrap();

    assert_eq!(dsm.cycles, vec![(backend, routes)]);
    assert!(!dsm.is_cycle(routes, services));
    assert!(!dsm.is_cycle(backend, services));
    assert_eq!(dsm.matrix[routes][services], 1);
    assert_eq!(dsm.matrix[services][routes], 0);
    assert_eq!(dsm.total_cycles, 1);
}

#[test]
fn mutual_pair_counts_both_directions() {
    let dsm = build_directory_matrix(&backend_response());

    // main -> auth and auth -> main are two directional dependencies
    assert_eq!(dsm.total_deps, 3);
    assert_eq!(dsm.intra_deps(), 0);
}

#[rstest]
#[case::inside_only("src", vec!["src/a.ts", "src/b.ts"], vec![vec![0, 1], vec![0, 0]])]
#[case::nested("src/lib", vec!["src/lib/c.ts"], vec![vec![0]])]
fn drill_down_keeps_only_internal_edges(
    #[case] directory: &str,
    #[case] files: Vec<&str>,
    #[case] matrix: Vec<Vec<u32>>,
) {
    let response = ApiResponse::from_pairs(
        &["src/a.ts", "src/b.ts", "src/lib/c.ts", "test/a.test.ts"],
        &[
            ("src/a.ts", "src/b.ts"),
            ("src/b.ts", "src/lib/c.ts"),
            ("src/lib/c.ts", "src/a.ts"),
            ("test/a.test.ts", "src/a.ts"),
        ],
    );

    let fm = build_file_matrix(&response, directory);

    assert_eq!(fm.files, files);
    assert_eq!(fm.matrix, matrix);
    assert!(fm.cycles.is_empty());
}

#[test]
fn matrices_are_deterministic() {
    let mut shuffled = backend_response();
    shuffled.nodes.reverse();
    shuffled.edges.reverse();

    assert_eq!(
        build_directory_matrix(&backend_response()),
        build_directory_matrix(&shuffled)
    );
    assert_eq!(
        build_file_matrix(&backend_response(), "backend"),
        build_file_matrix(&shuffled, "backend")
    );
}

#[test]
fn drill_down_into_unknown_directory_errors() {
    let scope = DepScope::new(Config::default()).unwrap();

    let err = scope.file_matrix(&backend_response(), "frontend").unwrap_err();

    assert!(matches!(err, Error::UnknownDirectory(ref d) if d == "frontend"));
    assert_eq!(err.to_string(), "unknown directory: frontend");
}

#[test]
fn cell_activation_maps_back_to_files() {
    let fm = build_file_matrix(&backend_response(), "backend/routes");

    assert_eq!(fm.file_at(0), Some("backend/routes/auth.py"));
    assert_eq!(fm.file_at(1), None);
}
