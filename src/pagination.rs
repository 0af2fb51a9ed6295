//! Page/limit/sort handling shared by every list endpoint.

use serde::Serialize;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;
pub const DEFAULT_SORT: &str = "id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    /// Anything other than `desc` sorts ascending.
    pub fn parse(s: Option<&str>) -> Self {
        match s.map(str::to_ascii_lowercase).as_deref() {
            Some("desc") => Direction::Desc,
            _ => Direction::Asc,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageParams {
    pub page: i64,
    pub limit: i64,
    /// Always one of the whitelisted columns, safe to interpolate.
    pub sort: &'static str,
    pub direction: Direction,
}

impl PageParams {
    pub fn new(
        page: Option<i64>,
        limit: Option<i64>,
        sort: Option<&str>,
        direction: Option<&str>,
        sortable: &[&'static str],
    ) -> Self {
        let sort = sort
            .and_then(|requested| sortable.iter().copied().find(|col| *col == requested))
            .unwrap_or(DEFAULT_SORT);

        PageParams {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            sort,
            direction: Direction::parse(direction),
        }
    }

    /// Rows to skip. Saturates, so an absurd `page` just yields an empty page.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// `ORDER BY` body, with `id` as a tiebreaker so pages never overlap.
    pub fn order_by(&self, qualifier: Option<&str>) -> String {
        let prefix = qualifier.map(|q| format!("{q}.")).unwrap_or_default();
        let dir = self.direction.as_sql();
        if self.sort == DEFAULT_SORT {
            format!("{prefix}id {dir}")
        } else {
            format!("{prefix}{} {dir}, {prefix}id {dir}", self.sort)
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PageMeta {
    pub page: i64,
    pub pages: i64,
    pub limit: i64,
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub meta: PageMeta,
    pub data: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(params: &PageParams, total: i64, data: Vec<T>) -> Self {
        Page {
            meta: PageMeta {
                page: params.page,
                pages: page_count(total, params.limit),
                limit: params.limit,
                total,
            },
            data,
        }
    }
}

/// Number of the last page; an empty result still has one page.
pub fn page_count(total: i64, limit: i64) -> i64 {
    ((total + limit - 1) / limit).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SORTABLE: &[&str] = &["id", "created_at", "actor"];

    #[test]
    fn defaults() {
        let p = PageParams::new(None, None, None, None, SORTABLE);
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, DEFAULT_LIMIT);
        assert_eq!(p.sort, "id");
        assert_eq!(p.direction, Direction::Asc);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn second_page_of_five() {
        let p = PageParams::new(Some(2), Some(5), None, None, SORTABLE);
        assert_eq!(p.offset(), 5);
        assert_eq!(page_count(15, p.limit), 3);
    }

    #[test]
    fn huge_page_saturates_offset() {
        let p = PageParams::new(Some(i64::MAX), Some(MAX_LIMIT), None, None, SORTABLE);
        assert_eq!(p.page, i64::MAX);
        assert_eq!(p.offset(), i64::MAX);
    }

    #[test]
    fn clamps_page_and_limit() {
        let p = PageParams::new(Some(0), Some(1000), None, None, SORTABLE);
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, MAX_LIMIT);

        let p = PageParams::new(Some(-3), Some(0), None, None, SORTABLE);
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, 1);
    }

    #[test]
    fn unknown_sort_column_falls_back_to_id() {
        let p = PageParams::new(None, None, Some("password; DROP TABLE posts"), None, SORTABLE);
        assert_eq!(p.sort, "id");
    }

    #[test]
    fn direction_parsing() {
        assert_eq!(Direction::parse(Some("desc")), Direction::Desc);
        assert_eq!(Direction::parse(Some("DESC")), Direction::Desc);
        assert_eq!(Direction::parse(Some("sideways")), Direction::Asc);
        assert_eq!(Direction::parse(None), Direction::Asc);
    }

    #[test]
    fn order_by_adds_id_tiebreaker() {
        let p = PageParams::new(None, None, Some("actor"), Some("desc"), SORTABLE);
        assert_eq!(p.order_by(None), "actor DESC, id DESC");
        assert_eq!(p.order_by(Some("l")), "l.actor DESC, l.id DESC");

        let p = PageParams::new(None, None, None, None, SORTABLE);
        assert_eq!(p.order_by(Some("p")), "p.id ASC");
    }

    #[test]
    fn page_count_rounds_up_and_never_hits_zero() {
        assert_eq!(page_count(0, 10), 1);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
    }

    #[test]
    fn page_serializes_meta_and_data() {
        let p = PageParams::new(Some(2), Some(5), None, None, SORTABLE);
        let page = Page::new(&p, 15, vec![1, 2, 3, 4, 5]);
        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "meta": { "page": 2, "pages": 3, "limit": 5, "total": 15 },
                "data": [1, 2, 3, 4, 5],
            })
        );
    }
}
