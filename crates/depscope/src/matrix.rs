//! Dependency Structure Matrices.
//!
//! Both matrices are computed from the raw [`ApiResponse`] alone, independent
//! of the derived graph. Cell `matrix[i][j]` counts raw edges whose source maps
//! to entity `i` and whose target maps to entity `j`. Every raw edge counts,
//! including duplicates and self-imports (which land on the diagonal).
//!
//! A pair `(i, j)` with `i < j` is a cycle when both `matrix[i][j]` and
//! `matrix[j][i]` are positive. Longer cycles are not detected.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

use crate::graph::directory_of;
use crate::types::ApiResponse;

/// Directory-level dependency matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryMatrix {
    /// Directories in sorted order; row and column labels.
    pub directories: Vec<String>,
    /// Edge counts by (source directory, target directory).
    pub matrix: Vec<Vec<u32>>,
    /// Files per directory.
    pub file_counts: Vec<u32>,
    /// Mutually dependent directory pairs, `i < j`.
    pub cycles: Vec<(usize, usize)>,
    /// Sum of off-diagonal cells.
    pub total_deps: u64,
    /// Number of cycle pairs.
    pub total_cycles: usize,
}

impl DirectoryMatrix {
    /// Number of directories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.directories.len()
    }

    /// Whether the matrix has no directories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
    }

    /// Row index of a directory.
    #[must_use]
    pub fn index_of(&self, directory: &str) -> Option<usize> {
        self.directories
            .binary_search_by(|d| d.as_str().cmp(directory))
            .ok()
    }

    /// Sum of the diagonal: edges between files of the same directory.
    #[must_use]
    pub fn intra_deps(&self) -> u64 {
        self.matrix
            .iter()
            .enumerate()
            .map(|(i, row)| u64::from(row[i]))
            .sum()
    }

    /// Whether directories `i` and `j` depend on each other.
    #[must_use]
    pub fn is_cycle(&self, i: usize, j: usize) -> bool {
        let pair = (i.min(j), i.max(j));
        i != j && self.cycles.binary_search(&pair).is_ok()
    }
}

/// File-level dependency matrix for one directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileMatrix {
    /// Directory the files belong to.
    pub directory: String,
    /// File paths in sorted order.
    pub files: Vec<String>,
    /// Edge counts by (source file, target file).
    pub matrix: Vec<Vec<u32>>,
    /// Mutually dependent file pairs, `i < j`.
    pub cycles: Vec<(usize, usize)>,
}

impl FileMatrix {
    /// File path at a row index, for cell activation.
    #[must_use]
    pub fn file_at(&self, index: usize) -> Option<&str> {
        self.files.get(index).map(String::as_str)
    }

    /// Number of files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the directory has no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Pairs `(i, j)`, `i < j`, where both directions have edges.
///
/// The diagonal is never a cycle. Output is sorted.
#[must_use]
pub fn find_cycles(matrix: &[Vec<u32>]) -> Vec<(usize, usize)> {
    let n = matrix.len();
    let mut cycles = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            if matrix[i][j] > 0 && matrix[j][i] > 0 {
                cycles.push((i, j));
            }
        }
    }
    cycles
}

/// Count edges into a square matrix using an entity index per file.
fn fill_matrix(response: &ApiResponse, index: &HashMap<&str, usize>, n: usize) -> Vec<Vec<u32>> {
    let mut matrix = vec![vec![0u32; n]; n];
    let mut skipped = 0usize;
    for edge in &response.edges {
        match (index.get(edge.source.as_str()), index.get(edge.target.as_str())) {
            (Some(&i), Some(&j)) => matrix[i][j] += 1,
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!(skipped, "Edges outside the matrix ignored");
    }
    matrix
}

/// Build the directory-level matrix.
#[must_use]
pub fn build_directory_matrix(response: &ApiResponse) -> DirectoryMatrix {
    let mut files_by_dir: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for node in &response.nodes {
        files_by_dir
            .entry(directory_of(&node.id))
            .or_default()
            .insert(node.id.as_str());
    }

    let directories: Vec<String> = files_by_dir.keys().map(|d| (*d).to_string()).collect();
    #[allow(clippy::cast_possible_truncation)]
    let file_counts = files_by_dir.values().map(|f| f.len() as u32).collect();
    let file_index: HashMap<&str, usize> = files_by_dir
        .values()
        .enumerate()
        .flat_map(|(i, files)| files.iter().map(move |f| (*f, i)))
        .collect();

    let matrix = fill_matrix(response, &file_index, directories.len());
    let cycles = find_cycles(&matrix);
    let total_deps = matrix
        .iter()
        .enumerate()
        .flat_map(|(i, row)| {
            row.iter()
                .enumerate()
                .filter(move |(j, _)| *j != i)
                .map(|(_, &count)| u64::from(count))
        })
        .sum();

    debug!(
        directories = directories.len(),
        total_deps,
        cycles = cycles.len(),
        "Built directory matrix"
    );
    DirectoryMatrix {
        total_cycles: cycles.len(),
        directories,
        matrix,
        file_counts,
        cycles,
        total_deps,
    }
}

/// Build the file-level matrix for files directly inside `directory`.
///
/// Edges with either endpoint outside the directory are excluded. An unknown
/// directory yields an empty matrix.
#[must_use]
pub fn build_file_matrix(response: &ApiResponse, directory: &str) -> FileMatrix {
    let files: Vec<String> = response
        .nodes
        .iter()
        .filter(|node| directory_of(&node.id) == directory)
        .map(|node| node.id.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();

    let index: HashMap<&str, usize> = files
        .iter()
        .enumerate()
        .map(|(i, f)| (f.as_str(), i))
        .collect();
    let matrix = fill_matrix(response, &index, files.len());
    let cycles = find_cycles(&matrix);

    FileMatrix {
        directory: directory.to_string(),
        files,
        matrix,
        cycles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn scenario() -> ApiResponse {
        ApiResponse::from_pairs(
            &["backend/main.py", "backend/routes/auth.py", "backend/services/db.py"],
            &[
                ("backend/routes/auth.py", "backend/services/db.py"),
                ("backend/main.py", "backend/routes/auth.py"),
                ("backend/routes/auth.py", "backend/main.py"),
            ],
        )
    }

    #[test]
    fn directory_matrix_detects_cross_directory_cycle() {
        let dsm = build_directory_matrix(&scenario());

        assert_eq!(
            dsm.directories,
            vec!["backend", "backend/routes", "backend/services"]
        );
        assert_eq!(dsm.matrix, vec![vec![0, 1, 0], vec![1, 0, 1], vec![0, 0, 0]]);
        assert_eq!(dsm.cycles, vec![(0, 1)]);
        assert_eq!(dsm.total_cycles, 1);
        assert_eq!(dsm.total_deps, 3);
        assert_eq!(dsm.file_counts, vec![1, 1, 1]);
        assert!(dsm.is_cycle(1, 0));
        assert!(!dsm.is_cycle(1, 2));
    }

    #[test]
    fn diagonal_is_never_a_cycle() {
        let response = ApiResponse::from_pairs(
            &["src/a.ts", "src/b.ts"],
            &[("src/a.ts", "src/b.ts"), ("src/b.ts", "src/a.ts")],
        );

        let dsm = build_directory_matrix(&response);

        assert_eq!(dsm.matrix, vec![vec![2]]);
        assert!(dsm.cycles.is_empty());
        assert_eq!(dsm.total_deps, 0);
        assert_eq!(dsm.intra_deps(), 2);
    }

    #[test]
    fn duplicates_and_self_imports_are_counted() {
        let response = ApiResponse::from_pairs(
            &["a/x.ts", "b/y.ts"],
            &[("a/x.ts", "b/y.ts"), ("a/x.ts", "b/y.ts"), ("a/x.ts", "a/x.ts")],
        );

        let dsm = build_directory_matrix(&response);

        assert_eq!(dsm.matrix, vec![vec![1, 2], vec![0, 0]]);
        assert_eq!(dsm.total_deps, 2);
    }

    #[test]
    fn dangling_edges_are_ignored() {
        let response = ApiResponse::from_pairs(&["a/x.ts"], &[("a/x.ts", "ext/lib.ts")]);

        let dsm = build_directory_matrix(&response);

        assert_eq!(dsm.directories, vec!["a"]);
        assert_eq!(dsm.matrix, vec![vec![0]]);
    }

    #[test]
    fn root_files_use_dot_directory() {
        let response =
            ApiResponse::from_pairs(&["main.rs", "src/lib.rs"], &[("main.rs", "src/lib.rs")]);

        let dsm = build_directory_matrix(&response);

        assert_eq!(dsm.directories, vec![".", "src"]);
        assert_eq!(dsm.index_of("."), Some(0));
        assert_eq!(dsm.index_of("missing"), None);
    }

    #[test]
    fn file_matrix_excludes_edges_leaving_directory() {
        let response = ApiResponse::from_pairs(
            &["src/b.ts", "src/a.ts", "src/sub/c.ts", "lib/d.ts"],
            &[
                ("src/a.ts", "src/b.ts"),
                ("src/b.ts", "src/a.ts"),
                ("src/a.ts", "lib/d.ts"),
                ("src/sub/c.ts", "src/a.ts"),
            ],
        );

        let fm = build_file_matrix(&response, "src");

        assert_eq!(fm.files, vec!["src/a.ts", "src/b.ts"]);
        assert_eq!(fm.matrix, vec![vec![0, 1], vec![1, 0]]);
        assert_eq!(fm.cycles, vec![(0, 1)]);
        assert_eq!(fm.file_at(1), Some("src/b.ts"));
        assert_eq!(fm.file_at(2), None);
    }

    #[test]
    fn file_matrix_for_unknown_directory_is_empty() {
        let fm = build_file_matrix(&scenario(), "frontend");

        assert!(fm.is_empty());
        assert!(fm.matrix.is_empty());
        assert_eq!(fm.directory, "frontend");
    }

    #[rstest]
    #[case::empty(vec![], vec![])]
    #[case::one_way(vec![vec![0, 3], vec![0, 0]], vec![])]
    #[case::mutual(vec![vec![5, 1], vec![2, 7]], vec![(0, 1)])]
    #[case::two_pairs(
        vec![vec![0, 1, 1], vec![1, 0, 0], vec![1, 0, 0]],
        vec![(0, 1), (0, 2)]
    )]
    fn cycles_need_both_directions(
        #[case] matrix: Vec<Vec<u32>>,
        #[case] expected: Vec<(usize, usize)>,
    ) {
        assert_eq!(find_cycles(&matrix), expected);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(build_directory_matrix(&scenario())).unwrap();

        assert_eq!(json["totalDeps"], 3);
        assert_eq!(json["totalCycles"], 1);
        assert_eq!(json["fileCounts"][0], 1);
        assert_eq!(json["cycles"][0], serde_json::json!([0, 1]));
    }
}
