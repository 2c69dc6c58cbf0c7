use thiserror::Error;

/// Reasons a `--pages` value is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageRangeError {
    #[error("invalid page number: '{0}'")]
    InvalidNumber(String),
    #[error("page 0 is invalid (pages start at 1)")]
    PageZero,
    #[error("page {page} exceeds document page count ({page_count})")]
    OutOfRange { page: usize, page_count: usize },
    #[error("range {start}-{end} is reversed")]
    Reversed { start: usize, end: usize },
}

fn parse_page(raw: &str, page_count: usize) -> Result<usize, PageRangeError> {
    let page: usize = raw
        .trim()
        .parse()
        .map_err(|_| PageRangeError::InvalidNumber(raw.trim().to_string()))?;
    if page == 0 {
        return Err(PageRangeError::PageZero);
    }
    if page > page_count {
        return Err(PageRangeError::OutOfRange { page, page_count });
    }
    Ok(page)
}

/// Parse a page range string like "1,3-5" into a sorted list of 0-indexed page numbers.
///
/// Input is 1-indexed (user-facing). Output is 0-indexed (internal).
pub fn parse_page_range(input: &str, page_count: usize) -> Result<Vec<usize>, PageRangeError> {
    let mut pages = Vec::new();

    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        if let Some((start, end)) = part.split_once('-') {
            let start = parse_page(start, page_count)?;
            let end = parse_page(end, page_count)?;
            if start > end {
                return Err(PageRangeError::Reversed { start, end });
            }
            pages.extend((start..=end).map(|p| p - 1));
        } else {
            pages.push(parse_page(part, page_count)? - 1);
        }
    }

    pages.sort_unstable();
    pages.dedup();
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_page() {
        assert_eq!(parse_page_range("1", 5).unwrap(), vec![0]);
        assert_eq!(parse_page_range("3", 5).unwrap(), vec![2]);
    }

    #[test]
    fn page_range() {
        assert_eq!(parse_page_range("2-4", 5).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn mixed() {
        assert_eq!(
            parse_page_range("1-3,7,10-12", 12).unwrap(),
            vec![0, 1, 2, 6, 9, 10, 11]
        );
    }

    #[test]
    fn page_zero_invalid() {
        assert_eq!(parse_page_range("0", 5).unwrap_err(), PageRangeError::PageZero);
    }

    #[test]
    fn page_exceeds_count() {
        let err = parse_page_range("6", 5).unwrap_err();
        assert_eq!(err.to_string(), "page 6 exceeds document page count (5)");
    }

    #[test]
    fn reversed_range() {
        assert_eq!(
            parse_page_range("4-2", 5).unwrap_err(),
            PageRangeError::Reversed { start: 4, end: 2 }
        );
    }

    #[test]
    fn not_a_number() {
        let err = parse_page_range("1,x", 5).unwrap_err();
        assert_eq!(err.to_string(), "invalid page number: 'x'");
    }

    #[test]
    fn duplicates_removed() {
        assert_eq!(parse_page_range("1,1,2", 5).unwrap(), vec![0, 1]);
    }

    #[test]
    fn whitespace_tolerance() {
        assert_eq!(
            parse_page_range(" 1 , 3 - 5 ", 5).unwrap(),
            vec![0, 2, 3, 4]
        );
    }
}
