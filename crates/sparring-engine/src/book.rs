//! Opening book keyed by the game's SAN history.

use std::collections::HashMap;

/// Built-in repertoire. Keys are the moves played so far in SAN, joined by
/// single spaces; the empty key holds first-move candidates.
#[rustfmt::skip]
pub const DEFAULT_BOOK: &[(&str, &[&str])] = &[
    ("", &["e4", "d4", "Nf3", "c4"]),

    ("e4", &["e5", "c5", "e6", "c6"]),
    ("e4 e5", &["Nf3"]),
    ("e4 e5 Nf3", &["Nc6", "Nf6"]),
    ("e4 e5 Nf3 Nc6", &["Bb5", "Bc4", "d4"]),
    ("e4 e5 Nf3 Nc6 Bb5", &["a6", "Nf6"]),
    ("e4 e5 Nf3 Nc6 Bc4", &["Bc5", "Nf6"]),
    ("e4 e5 Nf3 Nf6", &["Nxe5"]),
    ("e4 c5", &["Nf3", "Nc3"]),
    ("e4 c5 Nf3", &["d6", "Nc6", "e6"]),
    ("e4 e6", &["d4"]),
    ("e4 e6 d4", &["d5"]),
    ("e4 c6", &["d4"]),
    ("e4 c6 d4", &["d5"]),

    ("d4", &["d5", "Nf6"]),
    ("d4 d5", &["c4", "Nf3"]),
    ("d4 d5 c4", &["e6", "c6", "dxc4"]),
    ("d4 Nf6", &["c4", "Nf3"]),
    ("d4 Nf6 c4", &["e6", "g6"]),
    ("d4 Nf6 c4 e6", &["Nc3", "Nf3"]),
    ("d4 Nf6 c4 g6", &["Nc3"]),

    ("Nf3", &["d5", "Nf6", "c5"]),
    ("Nf3 d5", &["d4", "g3"]),
    ("Nf3 Nf6", &["c4", "g3"]),

    ("c4", &["e5", "Nf6", "c5"]),
    ("c4 e5", &["Nc3"]),
    ("c4 Nf6", &["Nc3", "g3"]),
];

/// Candidate replies for known move sequences.
///
/// Only exact sequences hit; transpositions into a known line are not
/// recognised.
#[derive(Debug, Clone)]
pub struct OpeningBook {
    entries: HashMap<String, Vec<String>>,
}

impl OpeningBook {
    /// Build a book from `(history, candidates)` pairs.
    pub fn from_entries<K, C, M>(entries: impl IntoIterator<Item = (K, C)>) -> Self
    where
        K: Into<String>,
        C: IntoIterator<Item = M>,
        M: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(key, moves)| (key.into(), moves.into_iter().map(Into::into).collect()))
            .collect();
        Self { entries }
    }

    /// A book with no entries.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Candidates after the given SAN history.
    pub fn lookup(&self, history: &[String]) -> Option<&[String]> {
        self.entries
            .get(&history.join(" "))
            .map(Vec::as_slice)
            .filter(|moves| !moves.is_empty())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for OpeningBook {
    fn default() -> Self {
        Self::from_entries(
            DEFAULT_BOOK
                .iter()
                .map(|&(key, moves)| (key, moves.iter().copied())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparring_core::Position;

    fn history(moves: &[&str]) -> Vec<String> {
        moves.iter().map(|m| m.to_string()).collect()
    }

    #[test]
    fn empty_history_gives_first_moves() {
        let book = OpeningBook::default();
        let first = book.lookup(&[]).unwrap();
        assert!(first.contains(&"e4".to_string()));
    }

    #[test]
    fn exact_sequence_only() {
        let book = OpeningBook::from_entries([("e4", ["e5"])]);
        assert_eq!(book.lookup(&history(&["e4"])), Some(&["e5".to_string()][..]));
        assert_eq!(book.lookup(&history(&["d4"])), None);
        assert_eq!(book.lookup(&history(&["e4", "e5"])), None);
    }

    #[test]
    fn every_default_line_is_playable() {
        for &(key, moves) in DEFAULT_BOOK {
            let mut pos = Position::new();
            for san in key.split_whitespace() {
                pos.play_san(san)
                    .unwrap_or_else(|err| panic!("line `{key}`: {err}"));
            }
            for reply in moves {
                let mut probe = pos.clone();
                probe
                    .play_san(reply)
                    .unwrap_or_else(|err| panic!("reply `{reply}` after `{key}`: {err}"));
            }
        }
    }
}
