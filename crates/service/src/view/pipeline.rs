use std::cmp::Ordering;

use serde::Serialize;

use models::Record;

use super::pagination::Pagination;
use super::query::{AuthFilter, Filters, SortDirection, SortKey, SortSpec, ViewState};

/// One rendered page of the working dataset.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ViewPage {
    pub rows: Vec<Record>,
    /// Rows left after search and filters.
    pub total: usize,
    pub page: usize,
    pub page_count: usize,
    /// 1-based index of the first visible row, 0 when nothing matches.
    pub range_start: usize,
    /// 1-based index of the last visible row, 0 when nothing matches.
    pub range_end: usize,
}

impl ViewPage {
    /// Line shown above the table, e.g. `Showing 1–10 of 1,425`.
    pub fn summary(&self) -> String {
        if self.total == 0 {
            return "No results".to_string();
        }
        format!("Showing {}–{} of {}", self.range_start, self.range_end, group_thousands(self.total))
    }

    /// Page numbers for the pager, current page ± `radius`.
    pub fn page_window(&self, radius: usize) -> Vec<usize> {
        Pagination { page: self.page, per_page: 1 }.window(self.page_count, radius).collect()
    }
}

/// Search, filter and sort the dataset; the pre-pagination result.
pub fn working_set(dataset: &[Record], state: &ViewState) -> Vec<Record> {
    let query = state.search.trim().to_lowercase();
    let mut rows: Vec<Record> = dataset
        .iter()
        .filter(|r| matches_search(r, &query))
        .filter(|r| matches_filters(r, &state.filters))
        .cloned()
        .collect();
    sort_rows(&mut rows, state.sort);
    rows
}

/// Derive the visible page. The page in `state` is clamped in place.
pub fn derive_view(dataset: &[Record], state: &mut ViewState) -> ViewPage {
    paginate(working_set(dataset, state), state)
}

/// Slice an already filtered and sorted set, clamping `state.page`.
pub fn paginate(rows: Vec<Record>, state: &mut ViewState) -> ViewPage {
    let total = rows.len();
    let pager = Pagination { page: state.page, per_page: state.per_page }.clamp(total);
    state.page = pager.page;
    let (start, end) = pager.bounds(total);
    let visible: Vec<Record> = rows.into_iter().skip(start).take(end - start).collect();
    ViewPage {
        rows: visible,
        total,
        page: pager.page,
        page_count: Pagination::page_count(total, pager.per_page),
        range_start: if total == 0 { 0 } else { start + 1 },
        range_end: end,
    }
}

/// Distinct non-empty categories in collation order.
pub fn categories(dataset: &[Record]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for cat in dataset.iter().filter_map(|r| r.category.as_deref()).filter(|c| !c.is_empty()) {
        if !out.iter().any(|c| c == cat) {
            out.push(cat.to_string());
        }
    }
    out.sort_by(|a, b| collate(a, b));
    out
}

fn matches_search(record: &Record, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    [&record.api, &record.description, &record.category]
        .into_iter()
        .any(|v| v.as_deref().unwrap_or("").to_lowercase().contains(query))
}

fn matches_filters(record: &Record, filters: &Filters) -> bool {
    if let Some(category) = filters.category.as_deref().filter(|c| !c.is_empty()) {
        if record.category.as_deref() != Some(category) {
            return false;
        }
    }
    if let Some(https) = filters.https.as_deref().filter(|h| !h.is_empty()) {
        if record.https_label() != https {
            return false;
        }
    }
    if let Some(auth) = filters.auth {
        let value = record.auth.as_deref().unwrap_or("").to_lowercase();
        let keep = match auth {
            AuthFilter::None => value.is_empty(),
            AuthFilter::ApiKey => value.contains("api"),
            AuthFilter::OAuth => value.contains("oauth"),
        };
        if !keep {
            return false;
        }
    }
    true
}

fn sort_rows(rows: &mut [Record], sort: SortSpec) {
    // slice::sort_by is stable, so ties keep dataset order in both directions
    rows.sort_by(|a, b| {
        let ord = compare_by(a, b, sort.key);
        match sort.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

fn compare_by(a: &Record, b: &Record, key: SortKey) -> Ordering {
    let text = |r: &Record| -> String {
        match key {
            SortKey::Api => r.api.clone(),
            SortKey::Description => r.description.clone(),
            SortKey::Category => r.category.clone(),
            SortKey::Auth => r.auth.clone(),
            SortKey::Cors => r.cors.clone(),
            SortKey::Link => r.link.clone(),
            SortKey::Https => None,
        }
        .unwrap_or_default()
    };
    match key {
        // unknown < false < true
        SortKey::Https => a.https.cmp(&b.https),
        _ => collate(&text(a), &text(b)),
    }
}

/// Case- and accent-insensitive comparison at base-letter strength.
pub fn collate(a: &str, b: &str) -> Ordering {
    a.chars().flat_map(fold).cmp(b.chars().flat_map(fold))
}

fn fold(c: char) -> std::char::ToLowercase {
    let base = match c {
        'À'..='Å' | 'à'..='å' | 'Ā' | 'ā' => 'a',
        'Ç' | 'ç' | 'Ć' | 'ć' | 'Č' | 'č' => 'c',
        'È'..='Ë' | 'è'..='ë' | 'Ē' | 'ē' | 'Ę' | 'ę' | 'Ě' | 'ě' => 'e',
        'Ì'..='Ï' | 'ì'..='ï' | 'Ī' | 'ī' => 'i',
        'Ñ' | 'ñ' | 'Ń' | 'ń' => 'n',
        'Ò'..='Ö' | 'Ø' | 'ò'..='ö' | 'ø' | 'Ō' | 'ō' => 'o',
        'Ù'..='Ü' | 'ù'..='ü' | 'Ū' | 'ū' => 'u',
        'Ý' | 'ý' | 'ÿ' => 'y',
        'Š' | 'š' | 'Ś' | 'ś' => 's',
        'Ž' | 'ž' | 'Ź' | 'ź' | 'Ż' | 'ż' => 'z',
        other => other,
    };
    base.to_lowercase()
}

fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::query::PageNav;
    use pretty_assertions::assert_eq;

    fn rec(api: &str, category: &str, https: Option<bool>, auth: Option<&str>) -> Record {
        Record {
            id: Some(format!("{api}::")),
            api: Some(api.into()),
            description: Some(format!("{api} description")),
            category: Some(category.into()),
            https,
            auth: auth.map(Into::into),
            ..Default::default()
        }
    }

    fn numbered(n: usize) -> Vec<Record> {
        (0..n).map(|i| rec(&format!("Api{i:02}"), "Cat", Some(true), None)).collect()
    }

    fn apis(rows: &[Record]) -> Vec<&str> {
        rows.iter().map(|r| r.api.as_deref().unwrap_or("")).collect()
    }

    #[test]
    fn first_page_of_twenty_five_rows() {
        let mut state = ViewState::new(10);
        let page = derive_view(&numbered(25), &mut state);
        assert_eq!(page.rows.len(), 10);
        assert_eq!(page.page_count, 3);
        assert_eq!(page.summary(), "Showing 1–10 of 25");
        assert_eq!(apis(&page.rows)[0], "Api00");
    }

    #[test]
    fn page_is_clamped_in_state_and_last_lands_on_final_page() {
        let data = numbered(23);
        let mut state = ViewState::new(10);
        state.page = 5;
        let page = derive_view(&data, &mut state);
        assert_eq!(page.page_count, 3);
        assert_eq!(state.page, 3);
        assert_eq!(page.rows.len(), 3);
        assert_eq!(page.summary(), "Showing 21–23 of 23");

        state.page = 1;
        let pages = Pagination::page_count(working_set(&data, &state).len(), state.per_page);
        state.page = Pagination { page: state.page, per_page: state.per_page }.navigate(PageNav::Last, pages);
        assert_eq!(state.page, 3);
    }

    #[test]
    fn search_is_trimmed_case_insensitive_over_three_fields() {
        let data = vec![
            rec("Weather", "Science", Some(true), None),
            rec("Cats", "Animals", Some(true), None),
            rec("Dogs", "animals", Some(false), None),
        ];
        let mut state = ViewState::default();
        state.search = "  ANIMAL ".into();
        assert_eq!(apis(&working_set(&data, &state)), vec!["Cats", "Dogs"]);

        state.search = "weather desc".into();
        assert_eq!(apis(&working_set(&data, &state)), vec!["Weather"]);

        state.search = "   ".into();
        assert_eq!(working_set(&data, &state).len(), 3);
    }

    #[test]
    fn filters_intersect() {
        let data = vec![
            rec("A", "Animals", Some(true), Some("apiKey")),
            rec("B", "Animals", Some(false), Some("OAuth")),
            rec("C", "Animals", Some(true), Some("")),
            rec("D", "Books", Some(true), None),
            rec("E", "animals", None, None),
        ];
        let mut state = ViewState::default();
        state.filters.category = Some("Animals".into());
        assert_eq!(apis(&working_set(&data, &state)), vec!["A", "B", "C"]);

        state.filters.https = Some("true".into());
        assert_eq!(apis(&working_set(&data, &state)), vec!["A", "C"]);

        state.filters = Filters { auth: Some(AuthFilter::None), ..Default::default() };
        assert_eq!(apis(&working_set(&data, &state)), vec!["C", "D", "E"]);
        state.filters.auth = Some(AuthFilter::ApiKey);
        assert_eq!(apis(&working_set(&data, &state)), vec!["A"]);
        state.filters.auth = Some(AuthFilter::OAuth);
        assert_eq!(apis(&working_set(&data, &state)), vec!["B"]);

        state.filters = Filters { https: Some("false".into()), ..Default::default() };
        assert_eq!(apis(&working_set(&data, &state)), vec!["B"]);
    }

    #[test]
    fn boolean_sort_unknown_then_false_then_true() {
        let data = vec![
            rec("T1", "c", Some(true), None),
            rec("F1", "c", Some(false), None),
            rec("T2", "c", Some(true), None),
            rec("F2", "c", None, None),
        ];
        let mut state = ViewState::default();
        state.sort = SortSpec { key: SortKey::Https, direction: SortDirection::Asc };
        assert_eq!(apis(&working_set(&data, &state)), vec!["F2", "F1", "T1", "T2"]);
        state.sort.direction = SortDirection::Desc;
        assert_eq!(apis(&working_set(&data, &state)), vec!["T1", "T2", "F1", "F2"]);
    }

    #[test]
    fn text_sort_ignores_case_and_accents_and_is_stable() {
        let mut data = vec![
            rec("beta", "x", None, None),
            rec("Alpha", "x", None, None),
            rec("Éclair", "x", None, None),
            rec("alpha", "y", None, None),
        ];
        data.push(Record { id: Some("blank".into()), ..Default::default() });
        let mut state = ViewState::default();
        let sorted = working_set(&data, &state);
        assert_eq!(apis(&sorted), vec!["", "Alpha", "alpha", "beta", "Éclair"]);

        state.sort.direction = SortDirection::Desc;
        let sorted = working_set(&data, &state);
        assert_eq!(apis(&sorted), vec!["Éclair", "beta", "Alpha", "alpha", ""]);
    }

    #[test]
    fn empty_result_has_one_page_and_no_results_summary() {
        let mut state = ViewState::default();
        state.search = "nothing matches".into();
        state.page = 4;
        let page = derive_view(&numbered(5), &mut state);
        assert_eq!(page.total, 0);
        assert_eq!(page.page_count, 1);
        assert_eq!(state.page, 1);
        assert_eq!((page.range_start, page.range_end), (0, 0));
        assert_eq!(page.summary(), "No results");
    }

    #[test]
    fn summary_groups_thousands_and_window_is_clamped() {
        let mut state = ViewState::new(10);
        state.page = 2;
        let page = derive_view(&numbered(1425), &mut state);
        assert_eq!(page.summary(), "Showing 11–20 of 1,425");
        assert_eq!(page.page_window(2), vec![1, 2, 3, 4]);
        assert_eq!(group_thousands(1_234_567), "1,234,567");
        assert_eq!(group_thousands(999), "999");
    }

    #[test]
    fn categories_are_distinct_and_sorted() {
        let data = vec![
            rec("A", "Books", None, None),
            rec("B", "animals", None, None),
            rec("C", "Books", None, None),
            rec("D", "", None, None),
        ];
        assert_eq!(categories(&data), vec!["animals".to_string(), "Books".to_string()]);
    }
}
