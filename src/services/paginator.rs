//! # 페이지네이션 계산
//!
//! 세션 이력, 관리 화면 문제 목록 등 모든 목록 API가 같은 규칙으로 페이지를 나눕니다.
//!
//! ```text
//! total_pages = ceil(total / page_size)   (total이 0이면 0)
//! skip        = (current_page - 1) * page_size
//! ```
//!
//! 마지막 페이지를 넘는 페이지를 요청해도 마지막 페이지로 고치지 않습니다.
//! 그 경우 결과는 그냥 빈 목록입니다.

/// 모든 목록 API의 한 페이지 크기
pub const PAGE_SIZE: i64 = 10;

/// SQL `LIMIT ? OFFSET ?`에 그대로 넣을 수 있는 페이지 정보
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub skip: i64,
    pub take: i64,
    pub current_page: i64,
    pub total_pages: i64,
}

/// 쿼리 문자열의 `page` 값을 페이지 번호로 바꿉니다.
///
/// 앞쪽 숫자만 읽으므로 `"2abc"`, `"2.5"`는 2입니다.
/// 숫자로 시작하지 않거나 1 미만이면 1.
pub fn parse_page(raw: Option<&str>) -> i64 {
    let Some(raw) = raw.map(str::trim) else {
        return 1;
    };
    let unsigned = raw.strip_prefix('+').unwrap_or(raw);
    let digits_end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());

    match unsigned[..digits_end].parse::<i64>() {
        Ok(page) if page >= 1 => page,
        // 자릿수가 너무 많아 i64를 넘는 경우
        Err(_) if digits_end > 0 => i64::MAX,
        _ => 1,
    }
}

/// `page_size`가 1 미만이면 1로 취급합니다.
pub fn paginate(total_count: i64, page_size: i64, requested_page: Option<&str>) -> Pagination {
    let page_size = page_size.max(1);
    let current_page = parse_page(requested_page);
    let total_pages = if total_count <= 0 {
        0
    } else {
        (total_count + page_size - 1) / page_size
    };

    Pagination {
        skip: (current_page - 1).saturating_mul(page_size),
        take: page_size,
        current_page,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_has_zero_pages() {
        for page in [None, Some("1"), Some("7"), Some("-2")] {
            assert_eq!(paginate(0, PAGE_SIZE, page).total_pages, 0);
        }
    }

    #[test]
    fn third_page_of_twenty_five() {
        let page = paginate(25, 10, Some("3"));
        assert_eq!(
            page,
            Pagination {
                skip: 20,
                take: 10,
                current_page: 3,
                total_pages: 3
            }
        );
    }

    #[test]
    fn invalid_page_is_normalized_to_first() {
        for raw in [Some("-1"), Some("0"), Some("abc"), Some(""), None] {
            let page = paginate(25, 10, raw);
            assert_eq!(page.current_page, 1, "{raw:?}");
            assert_eq!(page.skip, 0);
        }
    }

    #[test]
    fn page_is_read_from_leading_digits() {
        for (raw, expected) in [("2abc", 2), ("2.5", 2), (" 3 ", 3), ("+4", 4), ("-2", 1), ("x2", 1)] {
            assert_eq!(parse_page(Some(raw)), expected, "{raw}");
        }
        assert_eq!(parse_page(Some("99999999999999999999")), i64::MAX);
    }

    #[test]
    fn zero_page_size_does_not_panic() {
        let page = paginate(5, 0, Some("2"));
        assert_eq!((page.skip, page.take, page.total_pages), (1, 1, 5));
    }

    #[test]
    fn page_past_the_end_is_not_clamped() {
        let page = paginate(15, 10, Some("9"));
        assert_eq!(page.current_page, 9);
        assert_eq!(page.skip, 80);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn second_page_of_fifteen() {
        let page = paginate(15, PAGE_SIZE, Some("2"));
        assert_eq!((page.skip, page.take, page.total_pages), (10, 10, 2));
    }
}
