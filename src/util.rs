//! Provides miscellaneous utilities

use std::cmp::max;
use std::iter::repeat;

/// Returns the longest common prefix of a set of strings.
///
/// If no common prefix exists, `None` is returned.
pub fn longest_common_prefix<'a, I>(iter: I) -> Option<&'a str>
        where I: IntoIterator<Item=&'a str> {
    let mut iter = iter.into_iter();

    let mut pfx = iter.next()?;

    for s in iter {
        let end = pfx.char_indices().zip(s.chars())
            .take_while(|&((_, a), b)| a == b)
            .last()
            .map(|((idx, ch), _)| idx + ch.len_utf8());

        match end {
            Some(end) => pfx = &pfx[..end],
            None => return None
        }
    }

    Some(pfx)
}

/// Arranges items into rows of equally spaced columns fitting `width`.
///
/// Items are placed down each column in turn, or across each row when
/// `horizontal` is `true`. Trailing spaces are trimmed from each row.
pub fn format_columns<S: AsRef<str>>(items: &[S], width: usize, horizontal: bool)
        -> Vec<String> {
    if items.is_empty() {
        return Vec::new();
    }

    let col_width = items.iter()
        .map(|s| s.as_ref().chars().count())
        .max().unwrap_or(0) + 2;
    let n_cols = max(1, width / col_width);
    let n_rows = (items.len() + n_cols - 1) / n_cols;

    let mut rows = Vec::with_capacity(n_rows);

    for row in 0..n_rows {
        let mut line = String::new();

        for col in 0..n_cols {
            let idx = if horizontal {
                row * n_cols + col
            } else {
                col * n_rows + row
            };

            let item = match items.get(idx) {
                Some(item) => item.as_ref(),
                None => break
            };

            line.push_str(item);
            line.extend(repeat(' ').take(col_width - item.chars().count()));
        }

        line.truncate(line.trim_end().len());
        rows.push(line);
    }

    rows
}

#[cfg(test)]
mod test {
    use super::{format_columns, longest_common_prefix};

    #[test]
    fn test_common_prefix() {
        assert_eq!(longest_common_prefix(["foo", "bar"].iter().cloned()), None);
        assert_eq!(longest_common_prefix(["foo", "foobar"].iter().cloned()), Some("foo"));
        assert_eq!(longest_common_prefix(["foobar", "foo"].iter().cloned()), Some("foo"));
        assert_eq!(longest_common_prefix(["alpha", "alpaca", "alto"].iter().cloned()), Some("al"));
        assert_eq!(longest_common_prefix(["list"].iter().cloned()), Some("list"));
        assert_eq!(longest_common_prefix(Vec::<&str>::new()), None);
        assert_eq!(longest_common_prefix(["añejo", "año"].iter().cloned()), Some("añ"));
    }

    #[test]
    fn test_format_columns() {
        let items = ["a", "bb", "ccc", "dd", "e"];

        assert_eq!(format_columns(&items, 80, false), ["a    bb   ccc  dd   e"]);
        assert_eq!(format_columns(&items, 10, false), ["a    dd", "bb   e", "ccc"]);
        assert_eq!(format_columns(&items, 10, true), ["a    bb", "ccc  dd", "e"]);
        assert_eq!(format_columns(&items, 2, false).len(), 5);
        assert!(format_columns::<&str>(&[], 80, false).is_empty());
    }
}
