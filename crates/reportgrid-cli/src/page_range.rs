/// Parse a page list like "1,3-5" into sorted, deduplicated adjusted page
/// numbers.
///
/// Numbers count from the first page after the preamble. `counted` is the
/// number of such pages in the document; anything beyond it is rejected.
pub fn parse_page_numbers(input: &str, counted: usize) -> Result<Vec<u32>, String> {
    let mut pages = Vec::new();

    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        let (start, end) = match part.split_once('-') {
            Some((start, end)) => (parse_one(start)?, parse_one(end)?),
            None => {
                let page = parse_one(part)?;
                (page, page)
            }
        };
        if start > end {
            return Err(format!("invalid page range: '{part}'"));
        }
        for page in [start, end] {
            if page as usize > counted {
                return Err(format!(
                    "page {page} exceeds counted page count ({counted})"
                ));
            }
        }
        pages.extend(start..=end);
    }

    pages.sort_unstable();
    pages.dedup();
    Ok(pages)
}

fn parse_one(text: &str) -> Result<u32, String> {
    let page: u32 = text
        .trim()
        .parse()
        .map_err(|_| format!("invalid page number: '{}'", text.trim()))?;
    if page == 0 {
        return Err("page 0 is invalid (pages start at 1)".to_string());
    }
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_page() {
        assert_eq!(parse_page_numbers("1", 5).unwrap(), vec![1]);
        assert_eq!(parse_page_numbers("3", 5).unwrap(), vec![3]);
    }

    #[test]
    fn mixed_ranges() {
        assert_eq!(
            parse_page_numbers("1-3,7,10-12", 12).unwrap(),
            vec![1, 2, 3, 7, 10, 11, 12]
        );
    }

    #[test]
    fn page_zero_invalid() {
        let err = parse_page_numbers("0", 5).unwrap_err();
        assert!(err.contains("invalid"));
    }

    #[test]
    fn page_exceeds_count() {
        let err = parse_page_numbers("6", 5).unwrap_err();
        assert!(err.contains("exceeds"));
    }

    #[test]
    fn reversed_range_rejected() {
        assert!(parse_page_numbers("4-2", 5).is_err());
    }

    #[test]
    fn whitespace_and_duplicates() {
        assert_eq!(parse_page_numbers(" 1 , 3 - 4 ,1", 5).unwrap(), vec![1, 3, 4]);
    }
}
