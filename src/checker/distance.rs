//! Levenshtein distance with the full dynamic-programming cost matrix.
//!
//! The matrix is kept rather than collapsed to two rows: front ends render it
//! to show how a suggestion was scored.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// Cost table between every prefix of a word (rows) and every prefix of a
/// comparison word (columns).
///
/// Row `i` column `j` holds the edit distance between the first `i`
/// characters of the word and the first `j` characters of the comparison,
/// so `matrix[0][j] == j` and `matrix[i][0] == i`. There are no mutators;
/// consumers get it read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistanceMatrix {
    rows: Vec<Vec<usize>>,
}

impl DistanceMatrix {
    /// `(rows, columns)`, i.e. `(len(word) + 1, len(comparison) + 1)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows.len(), self.rows.first().map_or(0, Vec::len))
    }

    pub fn get(&self, row: usize, col: usize) -> Option<usize> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn rows(&self) -> &[Vec<usize>] {
        &self.rows
    }

    /// The bottom-right cell: the distance between the two full words.
    pub fn distance(&self) -> usize {
        self.rows
            .last()
            .and_then(|row| row.last())
            .copied()
            .unwrap_or(0)
    }
}

impl Index<(usize, usize)> for DistanceMatrix {
    type Output = usize;

    fn index(&self, (row, col): (usize, usize)) -> &usize {
        &self.rows[row][col]
    }
}

/// Calculate the Levenshtein distance between two words along with the
/// cost matrix that produced it. Insertion, deletion and substitution all
/// cost 1; characters are compared as Unicode scalar values.
pub fn levenshtein(a: &str, b: &str) -> (usize, DistanceMatrix) {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    let mut matrix = vec![vec![0; b_len + 1]; a_len + 1];

    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for (j, item) in matrix[0].iter_mut().enumerate() {
        *item = j;
    }

    for (i, a_char) in a_chars.iter().enumerate() {
        for (j, b_char) in b_chars.iter().enumerate() {
            matrix[i + 1][j + 1] = if a_char == b_char {
                matrix[i][j]
            } else {
                1 + matrix[i][j + 1] // deletion
                    .min(matrix[i + 1][j]) // insertion
                    .min(matrix[i][j]) // substitution
            };
        }
    }

    let distance = matrix[a_len][b_len];
    (distance, DistanceMatrix { rows: matrix })
}

/// Scalar distance only.
pub fn distance(a: &str, b: &str) -> usize {
    levenshtein(a, b).0
}

/// One step of an edit script turning the word into the comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp {
    Keep { ch: char },
    Substitute { from: char, to: char },
    Insert { ch: char },
    Delete { ch: char },
}

impl EditOp {
    /// Whether this step costs anything.
    pub fn is_edit(&self) -> bool {
        !matches!(self, EditOp::Keep { .. })
    }

    /// Cell reached after taking this step from `(row, col)`.
    pub fn advance(&self, (row, col): (usize, usize)) -> (usize, usize) {
        match self {
            EditOp::Keep { .. } | EditOp::Substitute { .. } => (row + 1, col + 1),
            EditOp::Insert { .. } => (row, col + 1),
            EditOp::Delete { .. } => (row + 1, col),
        }
    }
}

impl fmt::Display for EditOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditOp::Keep { ch } => write!(f, "keep '{}'", ch),
            EditOp::Substitute { from, to } => write!(f, "substitute '{}' → '{}'", from, to),
            EditOp::Insert { ch } => write!(f, "insert '{}'", ch),
            EditOp::Delete { ch } => write!(f, "delete '{}'", ch),
        }
    }
}

/// Recover one optimal edit script from a matrix built by [`levenshtein`].
///
/// Walks back from the bottom-right cell. On ties a diagonal step (keep or
/// substitute) wins over a deletion, and a deletion over an insertion. The
/// number of non-keep steps equals the distance. Returns an empty script if
/// `matrix` does not have the shape of `a` against `b`.
pub fn edit_path(a: &str, b: &str, matrix: &DistanceMatrix) -> Vec<EditOp> {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if matrix.dimensions() != (a_chars.len() + 1, b_chars.len() + 1) {
        return Vec::new();
    }

    let mut ops = Vec::with_capacity(a_chars.len().max(b_chars.len()));
    let (mut i, mut j) = (a_chars.len(), b_chars.len());

    while i > 0 || j > 0 {
        let current = matrix[(i, j)];

        if i > 0 && j > 0 {
            let (from, to) = (a_chars[i - 1], b_chars[j - 1]);
            let diagonal = matrix[(i - 1, j - 1)];

            if from == to && current == diagonal {
                ops.push(EditOp::Keep { ch: from });
                i -= 1;
                j -= 1;
                continue;
            }
            if current == diagonal + 1 {
                ops.push(EditOp::Substitute { from, to });
                i -= 1;
                j -= 1;
                continue;
            }
        }

        if i > 0 && (j == 0 || current == matrix[(i - 1, j)] + 1) {
            ops.push(EditOp::Delete { ch: a_chars[i - 1] });
            i -= 1;
        } else {
            ops.push(EditOp::Insert { ch: b_chars[j - 1] });
            j -= 1;
        }
    }

    ops.reverse();
    ops
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORDS: &[&str] = &[
        "", "a", "qick", "quick", "quack", "kitten", "sitting", "sunday", "saturday", "flaw",
        "lawn", "café", "cafe",
    ];

    #[test]
    fn test_known_distances() {
        assert_eq!(distance("qick", "quick"), 1);
        assert_eq!(distance("kitten", "sitting"), 3);
        assert_eq!(distance("sunday", "saturday"), 3);
        assert_eq!(distance("flaw", "lawn"), 2);
        assert_eq!(distance("hello", "world"), 4);
        assert_eq!(distance("", "abc"), 3);
        assert_eq!(distance("abc", ""), 3);
        assert_eq!(distance("café", "cafe"), 1);
    }

    #[test]
    fn test_identity_and_symmetry() {
        for a in WORDS {
            assert_eq!(distance(a, a), 0, "d({a:?}, {a:?})");
            for b in WORDS {
                assert_eq!(distance(a, b), distance(b, a), "d({a:?}, {b:?})");
            }
        }
    }

    #[test]
    fn test_triangle_inequality() {
        for a in WORDS {
            for b in WORDS {
                for c in WORDS {
                    assert!(distance(a, c) <= distance(a, b) + distance(b, c));
                }
            }
        }
    }

    #[test]
    fn test_matrix_shape_and_base_cases() {
        let (d, matrix) = levenshtein("qick", "quick");
        assert_eq!(matrix.dimensions(), (5, 6));
        assert_eq!(matrix.rows()[0], vec![0, 1, 2, 3, 4, 5]);
        for i in 0..5 {
            assert_eq!(matrix[(i, 0)], i);
        }
        assert_eq!(matrix.distance(), d);
        assert_eq!(matrix.get(4, 5), Some(1));
        assert_eq!(matrix.get(5, 0), None);
    }

    #[test]
    fn test_empty_words_matrix() {
        let (d, matrix) = levenshtein("", "");
        assert_eq!(d, 0);
        assert_eq!(matrix.dimensions(), (1, 1));
        assert_eq!(matrix.rows(), &[vec![0]]);
    }

    #[test]
    fn test_matrix_serializes_as_nested_arrays() {
        let (_, matrix) = levenshtein("ab", "b");
        let json = serde_json::to_string(&matrix).unwrap();
        assert_eq!(json, "[[0,1],[1,1],[2,1]]");
    }

    #[test]
    fn test_edit_path_insert() {
        let (_, matrix) = levenshtein("qick", "quick");
        let path = edit_path("qick", "quick", &matrix);
        assert_eq!(
            path,
            vec![
                EditOp::Keep { ch: 'q' },
                EditOp::Insert { ch: 'u' },
                EditOp::Keep { ch: 'i' },
                EditOp::Keep { ch: 'c' },
                EditOp::Keep { ch: 'k' },
            ]
        );
    }

    #[test]
    fn test_edit_path_cost_matches_distance() {
        for a in WORDS {
            for b in WORDS {
                let (d, matrix) = levenshtein(a, b);
                let path = edit_path(a, b, &matrix);
                assert_eq!(path.iter().filter(|op| op.is_edit()).count(), d, "{a:?} -> {b:?}");

                let end = path.iter().fold((0, 0), |cell, op| op.advance(cell));
                assert_eq!(end, (a.chars().count(), b.chars().count()));
            }
        }
    }

    #[test]
    fn test_edit_path_rejects_foreign_matrix() {
        let (_, matrix) = levenshtein("abc", "abd");
        assert!(edit_path("qick", "quick", &matrix).is_empty());
    }
}
