//! Resolution of textual merge-conflict markers.
//!
//! Mapping files pulled from long-lived branches regularly arrive with
//! unresolved conflict markers. Sending those to the transformation service
//! wastes the call, so conflicts are collapsed to one side first.

use crate::config::ConflictStrategy;

const START_MARKER: &str = "<<<<<<< HEAD";
const SEPARATOR_MARKER: &str = "=======";
const END_MARKER: &str = ">>>>>>>";

/// Result of running conflict resolution over file content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Content with every conflict block collapsed to one side
    pub content: String,
    /// Whether at least one conflict block was found and collapsed
    pub was_conflicted: bool,
}

/// Resolves textual merge-conflict markers in `content` according to
/// `strategy`.
///
/// The scan is a single forward pass over lines with two states, outside and
/// inside a conflict block, plus a flag tracking whether the currently
/// scanned side is the one being kept. Lines outside a block, and lines
/// inside a block while its side is selected, survive in their original
/// order; marker lines are always dropped.
///
/// A start marker without a matching end marker keeps the scan inside the
/// block to the end of the file, so the selection in force at that point
/// applies to the remainder.
#[must_use]
pub fn resolve(content: &str, strategy: ConflictStrategy) -> Resolution {
    // Cheap gate before the line scan: a file without both markers cannot
    // contain a block.
    if !content.contains(START_MARKER) || !content.contains(SEPARATOR_MARKER) {
        return Resolution {
            content: content.to_string(),
            was_conflicted: false,
        };
    }

    let mut kept: Vec<&str> = Vec::new();
    let mut in_block = false;
    let mut selected = false;
    let mut found_block = false;

    // split('\n') rather than lines(): the final newline (or its absence)
    // must survive the rejoin untouched.
    for line in content.split('\n') {
        if !in_block && line.starts_with(START_MARKER) {
            in_block = true;
            found_block = true;
            selected = strategy == ConflictStrategy::Ours;
            continue;
        }

        if in_block && line.starts_with(SEPARATOR_MARKER) {
            selected = strategy == ConflictStrategy::Theirs;
            continue;
        }

        if in_block && line.starts_with(END_MARKER) {
            in_block = false;
            selected = false;
            continue;
        }

        if !in_block || selected {
            kept.push(line);
        }
    }

    if !found_block {
        // Markers were present as substrings but never as line prefixes.
        return Resolution {
            content: content.to_string(),
            was_conflicted: false,
        };
    }

    Resolution {
        content: kept.join("\n"),
        was_conflicted: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFLICTED: &str = "a\n<<<<<<< HEAD\nmine\n=======\ntheirs\n>>>>>>>\nb";

    #[test]
    fn test_no_markers_unchanged() {
        let content = "SELECT *\nFROM users\nWHERE id = 1\n";
        let result = resolve(content, ConflictStrategy::Ours);

        assert_eq!(result.content, content);
        assert!(!result.was_conflicted);
    }

    #[test]
    fn test_resolve_ours() {
        let result = resolve(CONFLICTED, ConflictStrategy::Ours);

        assert_eq!(result.content, "a\nmine\nb");
        assert!(result.was_conflicted);
    }

    #[test]
    fn test_resolve_theirs() {
        let result = resolve(CONFLICTED, ConflictStrategy::Theirs);

        assert_eq!(result.content, "a\ntheirs\nb");
        assert!(result.was_conflicted);
    }

    #[test]
    fn test_end_marker_with_branch_name() {
        let content = "a\n<<<<<<< HEAD\nmine\n=======\ntheirs\n>>>>>>> feature/cleanup\nb";
        let result = resolve(content, ConflictStrategy::Theirs);

        assert_eq!(result.content, "a\ntheirs\nb");
    }

    #[test]
    fn test_multiple_blocks() {
        let content = "\
start
<<<<<<< HEAD
one-ours
=======
one-theirs
>>>>>>>
middle
<<<<<<< HEAD
two-ours
=======
two-theirs
>>>>>>>
end";
        let result = resolve(content, ConflictStrategy::Ours);

        assert_eq!(result.content, "start\none-ours\nmiddle\ntwo-ours\nend");
        assert!(result.was_conflicted);
    }

    #[test]
    fn test_unterminated_block_runs_to_eof() {
        // No end marker: the block extends to the end of the file, and the
        // side selected at the separator applies to everything after it.
        let content = "a\n<<<<<<< HEAD\nmine\n=======\ntheirs\ntail";

        let ours = resolve(content, ConflictStrategy::Ours);
        assert_eq!(ours.content, "a\nmine");
        assert!(ours.was_conflicted);

        let theirs = resolve(content, ConflictStrategy::Theirs);
        assert_eq!(theirs.content, "a\ntheirs\ntail");
        assert!(theirs.was_conflicted);
    }

    #[test]
    fn test_markers_not_at_line_start_are_content() {
        let content = "a <<<<<<< HEAD embedded\nb ======= embedded\n";
        let result = resolve(content, ConflictStrategy::Ours);

        assert_eq!(result.content, content);
        assert!(!result.was_conflicted);
    }

    #[test]
    fn test_trailing_newline_preserved() {
        let content = "a\n<<<<<<< HEAD\nmine\n=======\ntheirs\n>>>>>>>\nb\n";
        let result = resolve(content, ConflictStrategy::Ours);

        assert_eq!(result.content, "a\nmine\nb\n");
    }

    #[test]
    fn test_separator_without_start_is_content() {
        // A line of equals signs is common in fixed-width comments; without a
        // start marker nothing is touched.
        let content = "-- ======= section =======\nSELECT 1\n";
        let result = resolve(content, ConflictStrategy::Theirs);

        assert_eq!(result.content, content);
        assert!(!result.was_conflicted);
    }
}
