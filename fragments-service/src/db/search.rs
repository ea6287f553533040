//! Compiles a [`SearchQuery`] into a parameterized WHERE clause.

use fragments_types::{Criterion, DateFilter, Fragment, SearchQuery, TagMatch};
use rusqlite::params_from_iter;
use rusqlite::types::Value;

use super::fragments::{row_to_fragment, FRAGMENT_COLUMNS};
use super::{format_date, Db};
use crate::error::StoreResult;

impl Db {
    /// Fragments matching every criterion, newest first. The null query
    /// matches nothing.
    pub fn search_fragments(&self, query: &SearchQuery) -> StoreResult<Vec<Fragment>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let (clause, params) = where_clause(query);
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM fragments WHERE {} ORDER BY id DESC",
            FRAGMENT_COLUMNS, clause
        ))?;
        let fragments = stmt
            .query_map(params_from_iter(params), row_to_fragment)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(fragments)
    }
}

fn where_clause(query: &SearchQuery) -> (String, Vec<Value>) {
    let mut params = Vec::new();
    let clauses: Vec<String> = query
        .criteria()
        .iter()
        .map(|criterion| criterion_sql(criterion, &mut params))
        .collect();
    (clauses.join(" AND "), params)
}

fn criterion_sql(criterion: &Criterion, params: &mut Vec<Value>) -> String {
    match criterion {
        Criterion::TextContains(needle) => {
            params.push(Value::Text(needle.clone()));
            "instr(ulower(text), ulower(?)) > 0".to_string()
        }
        Criterion::Tags { tags, mode } => {
            let joiner = match mode {
                TagMatch::All => " AND ",
                TagMatch::Any => " OR ",
            };
            let tests: Vec<&str> = tags
                .iter()
                .map(|tag| {
                    params.push(Value::Text(tag.clone()));
                    "EXISTS (SELECT 1 FROM json_each(fragments.tags) WHERE json_each.value = ?)"
                })
                .collect();
            format!("({})", tests.join(joiner))
        }
        Criterion::Date(filter) => match *filter {
            DateFilter::On(date) => {
                params.push(Value::Text(format_date(date)));
                "date = ?".to_string()
            }
            DateFilter::OnOrBefore(date) => {
                params.push(Value::Text(format_date(date)));
                "date <= ?".to_string()
            }
            DateFilter::OnOrAfter(date) => {
                params.push(Value::Text(format_date(date)));
                "date >= ?".to_string()
            }
            DateFilter::Between { from, to } => {
                params.push(Value::Text(format_date(from)));
                params.push(Value::Text(format_date(to)));
                "date BETWEEN ? AND ?".to_string()
            }
        },
    }
}
