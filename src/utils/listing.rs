use chrono::{Duration, NaiveDate};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// Inclusive lookback of the trailing-window listing mode, in days.
pub const TRAILING_WINDOW_DAYS: i64 = 14;

/// Hard cap on a single page.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Raw listing parameters as they arrive on the query string.
///
/// Numeric fields are typed, so a malformed value (`page=abc`) is rejected
/// at the extractor boundary instead of reaching the query layer.
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListingParams {
    /// Zero-based page index
    #[schema(example = 0)]
    pub page: Option<i64>,
    /// Items per page
    #[serde(rename = "pageSize")]
    #[schema(example = 10)]
    pub page_size: Option<i64>,
    /// Restrict to the trailing two weeks and return all matches unpaginated
    #[serde(rename = "twoWeeks")]
    pub two_weeks: Option<bool>,
    /// Name substring filter
    #[schema(example = "Ayşe")]
    pub q: Option<String>,
    /// Sort column: one of date, name, giris, cikis, izin
    #[serde(rename = "sortBy")]
    #[schema(example = "date")]
    pub sort_by: Option<String>,
    /// Sort direction: "asc", anything else means descending
    #[serde(rename = "sortDir")]
    #[schema(example = "desc")]
    pub sort_dir: Option<String>,
}

/// Allow-listed sort columns. Anything else falls back to [`SortField::Date`],
/// so caller input never reaches the ORDER BY clause as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Date,
    Name,
    CheckIn,
    CheckOut,
    OnLeave,
}

impl SortField {
    pub fn parse_or_default(raw: &str) -> Self {
        match raw.trim() {
            "date" => Self::Date,
            "name" => Self::Name,
            "giris" => Self::CheckIn,
            "cikis" => Self::CheckOut,
            "izin" => Self::OnLeave,
            _ => Self::Date,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Name => "name",
            Self::CheckIn => "giris",
            Self::CheckOut => "cikis",
            Self::OnLeave => "izin",
        }
    }
}

/// Sort direction. Only the exact string `"asc"` sorts ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn parse_or_default(raw: &str) -> Self {
        if raw.trim() == "asc" {
            Self::Asc
        } else {
            Self::Desc
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Which of the three mutually exclusive listing shapes was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingMode {
    /// Everything dated on or after `since`, unpaginated.
    TrailingWindow { since: NaiveDate },
    /// One page window; the response also carries the filter-wide count.
    Page { limit: i64, offset: i64 },
    /// Every matching record.
    Full,
}

/// Typed value for a positional `?` bind.
#[derive(Debug, Clone)]
pub enum FilterBind {
    Date(NaiveDate),
    Text(String),
}

/// A validated listing query, safe to turn into SQL.
#[derive(Debug)]
pub struct Listing {
    pub mode: ListingMode,
    pub name_filter: Option<String>,
    pub sort_field: SortField,
    pub sort_dir: SortDir,
}

impl Listing {
    /// Normalize raw parameters. Unrecognized sort input degrades to
    /// date/descending; it is never an error. `twoWeeks` wins over
    /// pagination, pagination requires both `page` and `pageSize`.
    pub fn build(params: &ListingParams, today: NaiveDate) -> Self {
        let sort_field =
            SortField::parse_or_default(params.sort_by.as_deref().unwrap_or("date"));
        let sort_dir = SortDir::parse_or_default(params.sort_dir.as_deref().unwrap_or("desc"));

        let name_filter = params
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_owned);

        let mode = if params.two_weeks == Some(true) {
            ListingMode::TrailingWindow {
                since: today - Duration::days(TRAILING_WINDOW_DAYS),
            }
        } else if let (Some(page), Some(size)) = (params.page, params.page_size) {
            let limit = size.clamp(1, MAX_PAGE_SIZE);
            ListingMode::Page {
                limit,
                offset: page.max(0) * limit,
            }
        } else {
            ListingMode::Full
        };

        Listing {
            mode,
            name_filter,
            sort_field,
            sort_dir,
        }
    }

    /// WHERE clause plus its positional binds, in bind order.
    pub fn filter_sql(&self) -> (String, Vec<FilterBind>) {
        let mut sql = String::from(" WHERE 1=1");
        let mut binds = Vec::new();

        if let ListingMode::TrailingWindow { since } = self.mode {
            sql.push_str(" AND date >= ?");
            binds.push(FilterBind::Date(since));
        }

        if let Some(q) = &self.name_filter {
            sql.push_str(" AND name LIKE ?");
            binds.push(FilterBind::Text(format!("%{}%", q)));
        }

        (sql, binds)
    }

    /// ORDER BY clause. Column and direction come from the enums only.
    pub fn order_sql(&self) -> String {
        format!(
            " ORDER BY {} {}",
            self.sort_field.column(),
            self.sort_dir.as_sql()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 6).unwrap()
    }

    // -- sort normalization --

    #[test]
    fn sort_field_accepts_allow_listed_columns() {
        assert_eq!(SortField::parse_or_default("date"), SortField::Date);
        assert_eq!(SortField::parse_or_default("name"), SortField::Name);
        assert_eq!(SortField::parse_or_default("giris"), SortField::CheckIn);
        assert_eq!(SortField::parse_or_default("cikis"), SortField::CheckOut);
        assert_eq!(SortField::parse_or_default("izin"), SortField::OnLeave);
    }

    #[test]
    fn sort_field_falls_back_to_date() {
        assert_eq!(SortField::parse_or_default("id"), SortField::Date);
        assert_eq!(SortField::parse_or_default(""), SortField::Date);
        assert_eq!(
            SortField::parse_or_default("name; DROP TABLE attendance"),
            SortField::Date
        );
    }

    #[test]
    fn sort_dir_is_desc_unless_exactly_asc() {
        assert_eq!(SortDir::parse_or_default("asc"), SortDir::Asc);
        assert_eq!(SortDir::parse_or_default("ASC"), SortDir::Desc);
        assert_eq!(SortDir::parse_or_default("ascending"), SortDir::Desc);
        assert_eq!(SortDir::parse_or_default("desc"), SortDir::Desc);
        assert_eq!(SortDir::parse_or_default(""), SortDir::Desc);
    }

    #[test]
    fn unrecognized_sort_never_reaches_order_by() {
        let listing = Listing::build(
            &ListingParams {
                sort_by: Some("izin) OR 1=1 --".into()),
                sort_dir: Some("'; --".into()),
                ..Default::default()
            },
            today(),
        );
        assert_eq!(listing.order_sql(), " ORDER BY date DESC");
    }

    // -- mode selection --

    #[test]
    fn defaults_to_full_listing() {
        let listing = Listing::build(&ListingParams::default(), today());
        assert_eq!(listing.mode, ListingMode::Full);
        assert_eq!(listing.sort_field, SortField::Date);
        assert_eq!(listing.sort_dir, SortDir::Desc);
    }

    #[test]
    fn page_requires_both_index_and_size() {
        let only_page = ListingParams {
            page: Some(2),
            ..Default::default()
        };
        assert_eq!(Listing::build(&only_page, today()).mode, ListingMode::Full);

        let only_size = ListingParams {
            page_size: Some(10),
            ..Default::default()
        };
        assert_eq!(Listing::build(&only_size, today()).mode, ListingMode::Full);
    }

    #[test]
    fn page_offset_is_index_times_size() {
        let params = ListingParams {
            page: Some(3),
            page_size: Some(10),
            ..Default::default()
        };
        assert_eq!(
            Listing::build(&params, today()).mode,
            ListingMode::Page {
                limit: 10,
                offset: 30
            }
        );
    }

    #[test]
    fn page_size_is_clamped() {
        let params = ListingParams {
            page: Some(0),
            page_size: Some(100_000),
            ..Default::default()
        };
        assert_eq!(
            Listing::build(&params, today()).mode,
            ListingMode::Page {
                limit: MAX_PAGE_SIZE,
                offset: 0
            }
        );

        let params = ListingParams {
            page: Some(-5),
            page_size: Some(0),
            ..Default::default()
        };
        assert_eq!(
            Listing::build(&params, today()).mode,
            ListingMode::Page {
                limit: 1,
                offset: 0
            }
        );
    }

    #[test]
    fn two_weeks_wins_over_pagination() {
        let params = ListingParams {
            page: Some(1),
            page_size: Some(10),
            two_weeks: Some(true),
            ..Default::default()
        };
        let listing = Listing::build(&params, today());
        assert_eq!(
            listing.mode,
            ListingMode::TrailingWindow {
                since: NaiveDate::from_ymd_opt(2026, 7, 23).unwrap()
            }
        );
    }

    #[test]
    fn two_weeks_false_does_not_select_trailing_window() {
        let params = ListingParams {
            two_weeks: Some(false),
            ..Default::default()
        };
        assert_eq!(Listing::build(&params, today()).mode, ListingMode::Full);
    }

    // -- filter assembly --

    #[test]
    fn blank_query_applies_no_name_filter() {
        let params = ListingParams {
            q: Some("   ".into()),
            ..Default::default()
        };
        let (sql, binds) = Listing::build(&params, today()).filter_sql();
        assert_eq!(sql, " WHERE 1=1");
        assert!(binds.is_empty());
    }

    #[test]
    fn name_filter_is_trimmed_substring_match() {
        let params = ListingParams {
            q: Some("  Ayşe ".into()),
            ..Default::default()
        };
        let (sql, binds) = Listing::build(&params, today()).filter_sql();
        assert_eq!(sql, " WHERE 1=1 AND name LIKE ?");
        assert!(matches!(&binds[0], FilterBind::Text(t) if t == "%Ayşe%"));
    }

    #[test]
    fn trailing_window_binds_inclusive_cutoff() {
        let params = ListingParams {
            two_weeks: Some(true),
            q: Some("Ali".into()),
            ..Default::default()
        };
        let (sql, binds) = Listing::build(&params, today()).filter_sql();
        assert_eq!(sql, " WHERE 1=1 AND date >= ? AND name LIKE ?");
        // A record dated exactly 14 days ago satisfies `date >= since`;
        // one dated 15 days ago does not.
        let since = NaiveDate::from_ymd_opt(2026, 7, 23).unwrap();
        assert!(matches!(&binds[0], FilterBind::Date(d) if *d == since));
        assert!(matches!(&binds[1], FilterBind::Text(t) if t == "%Ali%"));
    }

    #[test]
    fn order_sql_uses_requested_column_and_direction() {
        let params = ListingParams {
            sort_by: Some("giris".into()),
            sort_dir: Some("asc".into()),
            ..Default::default()
        };
        let listing = Listing::build(&params, today());
        assert_eq!(listing.order_sql(), " ORDER BY giris ASC");
    }
}
