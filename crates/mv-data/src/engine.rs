//! In-memory query evaluation
//!
//! Records are JSON objects. Values that read as numbers (CSV cells are
//! strings) compare numerically and sort before every other value; the rest
//! compare as text.

use std::cmp::Ordering;

use serde_json::{Map, Value};

use mv_core::{Filter, Query, SortOrder};

/// A single dataset record
pub type Record = Map<String, Value>;

/// Result of evaluating a query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutcome {
    /// Number of records matching before paging
    pub total: usize,
    /// The requested page
    pub hits: Vec<Record>,
}

/// Filter, sort and page `records`
pub fn execute(records: &[Record], query: &Query) -> QueryOutcome {
    let terms: Vec<String> = query
        .q
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();

    let mut matched: Vec<&Record> = records
        .iter()
        .filter(|record| matches_text(record, &terms))
        .filter(|record| query.filters.iter().all(|filter| matches_filter(record, filter)))
        .collect();

    for spec in query.sort.iter().rev() {
        matched.sort_by(|a, b| {
            let ordering = compare_values(
                a.get(&spec.field).unwrap_or(&Value::Null),
                b.get(&spec.field).unwrap_or(&Value::Null),
            );
            match spec.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
    }

    let total = matched.len();
    let hits = matched
        .into_iter()
        .skip(query.from)
        .take(query.size)
        .cloned()
        .collect();

    QueryOutcome { total, hits }
}

fn matches_text(record: &Record, terms: &[String]) -> bool {
    if terms.is_empty() {
        return true;
    }
    let haystack: Vec<String> = record.values().map(|v| display(v).to_lowercase()).collect();
    terms
        .iter()
        .all(|term| haystack.iter().any(|value| value.contains(term.as_str())))
}

fn matches_filter(record: &Record, filter: &Filter) -> bool {
    match filter {
        Filter::Term { field, term } => record
            .get(field)
            .is_some_and(|value| compare_values(value, term) == Ordering::Equal),
        Filter::Range { field, start, stop } => {
            let Some(value) = record.get(field) else {
                return false;
            };
            let above = start
                .as_ref()
                .map_or(true, |start| compare_values(value, start) != Ordering::Less);
            let below = stop
                .as_ref()
                .map_or(true, |stop| compare_values(value, stop) != Ordering::Greater);
            above && below
        }
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => display(a).cmp(&display(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mv_core::SortSpec;
    use serde_json::json;

    fn records() -> Vec<Record> {
        [
            json!({"city": "Paris", "country": "FR", "population": "2100000"}),
            json!({"city": "Lyon", "country": "FR", "population": "513000"}),
            json!({"city": "Berlin", "country": "DE", "population": "3600000"}),
            json!({"city": "Hamburg", "country": "DE", "population": "1800000"}),
        ]
        .into_iter()
        .filter_map(|v| v.as_object().cloned())
        .collect()
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let outcome = execute(&records(), &Query::default());
        assert_eq!(outcome.total, 4);
        assert_eq!(outcome.hits.len(), 4);
    }

    #[test]
    fn test_text_search_is_case_insensitive() {
        let query = Query { q: "PAR".into(), ..Query::default() };
        let outcome = execute(&records(), &query);
        assert_eq!(outcome.total, 1);
        assert_eq!(outcome.hits[0]["city"], json!("Paris"));
    }

    #[test]
    fn test_term_and_range_filters() {
        let query = Query {
            filters: vec![
                Filter::Term { field: "country".into(), term: json!("DE") },
                Filter::Range { field: "population".into(), start: Some(json!(2_000_000)), stop: None },
            ],
            ..Query::default()
        };
        let outcome = execute(&records(), &query);
        assert_eq!(outcome.total, 1);
        assert_eq!(outcome.hits[0]["city"], json!("Berlin"));
    }

    #[test]
    fn test_sort_numeric_and_page() {
        let query = Query {
            sort: vec![SortSpec { field: "population".into(), order: SortOrder::Desc }],
            from: 1,
            size: 2,
            ..Query::default()
        };
        let outcome = execute(&records(), &query);
        assert_eq!(outcome.total, 4);
        let cities: Vec<_> = outcome.hits.iter().map(|r| r["city"].clone()).collect();
        assert_eq!(cities, vec![json!("Paris"), json!("Hamburg")]);
    }

    #[test]
    fn test_mixed_cells_sort_numbers_before_text() {
        let rows: Vec<Record> = [json!("10"), json!("1a"), json!("2"), json!("NaN"), json!(3), json!("b"), json!(null)]
            .into_iter()
            .map(|value| {
                let mut record = Record::new();
                record.insert("v".into(), value);
                record
            })
            .collect();
        let query = Query {
            sort: vec![SortSpec { field: "v".into(), order: SortOrder::Asc }],
            ..Query::default()
        };

        let sorted: Vec<_> = execute(&rows, &query).hits.iter().map(|r| r["v"].clone()).collect();
        assert_eq!(
            sorted,
            vec![json!("2"), json!(3), json!("10"), json!("NaN"), json!(null), json!("1a"), json!("b")]
        );

        for a in &sorted {
            for b in &sorted {
                assert_eq!(compare_values(a, b), compare_values(b, a).reverse());
            }
        }
    }
}
