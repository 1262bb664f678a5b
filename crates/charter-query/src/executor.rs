//! Compilation and execution of a whole query against an in-memory
//! collection.
//!
//! The pipeline is parse, bind, filter, order, page. The first failing
//! stage aborts the query; a page is never built from partial work.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use charter_ast::{print, SortDirection};
use charter_binder::{
    bind_order_by, bind_predicate, compare_key_values, evaluate_key, evaluate_predicate,
    normalize_key, BoundExpr, BoundOrdering,
};
use charter_schema::{resolve_path, Entity, ResourceDef, SchemaSet, Value};

use crate::error::QueryError;
use crate::options::QueryOptions;
use crate::result::QueryResult;

/// A compiled query, ready to run against any collection of its root
/// resource.
#[derive(Debug, Clone)]
pub struct QueryPlan {
    pub predicate: Option<BoundExpr>,
    pub ordering: Vec<BoundOrdering>,
    pub skip: usize,
    pub top: Option<usize>,
    /// Carried through to the result page for link rewriting.
    pub url: String,
    pub debug_info: BTreeMap<String, String>,
}

/// Parses and binds the reserved options into an executable plan.
pub fn compile_query(
    schema: &SchemaSet,
    root: &ResourceDef,
    options: &QueryOptions,
) -> Result<QueryPlan, QueryError> {
    let mut debug_info = BTreeMap::new();

    let predicate = match options.filter.as_deref() {
        Some(text) => {
            let node = charter_parser::parse_filter(text)?;
            debug_info.insert("filter".to_string(), print(&node));
            Some(bind_predicate(schema, root, &node)?)
        }
        None => None,
    };

    let ordering = match options.order_by.as_deref() {
        Some(text) => {
            let clauses = charter_parser::parse_order_by(text)?;
            let rendered: Vec<String> = clauses
                .iter()
                .map(|(node, direction)| {
                    let word = match direction {
                        SortDirection::Ascending => "asc",
                        SortDirection::Descending => "desc",
                    };
                    format!("{} {}", print(node), word)
                })
                .collect();
            debug_info.insert("orderby".to_string(), rendered.join(", "));
            bind_order_by(schema, root, &clauses)?
        }
        None => Vec::new(),
    };

    if !options.expand.is_empty() {
        let mut resolved = Vec::with_capacity(options.expand.len());
        for path in &options.expand {
            resolved.push(resolve_path(schema, root, path)?.internal_path());
        }
        debug_info.insert("expand".to_string(), resolved.join(","));
    }

    tracing::debug!(
        resource = %root.name,
        filter = options.filter.as_deref().unwrap_or(""),
        order_by = options.order_by.as_deref().unwrap_or(""),
        top = ?options.top,
        skip = options.skip,
        "compiled query plan"
    );

    Ok(QueryPlan {
        predicate,
        ordering,
        skip: options.skip,
        top: options.top,
        url: options.url.clone(),
        debug_info,
    })
}

/// Runs a compiled plan over a collection and builds the result page.
pub fn execute<E>(
    schema: &SchemaSet,
    plan: &QueryPlan,
    items: &[E],
) -> Result<QueryResult<E>, QueryError>
where
    E: Entity + Clone,
{
    let mut matched: Vec<&E> = Vec::new();
    match &plan.predicate {
        Some(predicate) => {
            for item in items {
                if evaluate_predicate(schema, predicate, item)? {
                    matched.push(item);
                }
            }
        }
        None => matched.extend(items.iter()),
    }
    let total_count = matched.len();
    tracing::debug!(
        scanned = items.len(),
        matched = total_count,
        "filtered collection"
    );

    // Sort keys are evaluated and normalized once per item up front, so
    // the comparator below cannot fail mid-sort.
    if !plan.ordering.is_empty() {
        let mut keyed: Vec<(Vec<Value>, &E)> = Vec::with_capacity(matched.len());
        for &item in &matched {
            let mut keys = Vec::with_capacity(plan.ordering.len());
            for ordering in &plan.ordering {
                let raw = evaluate_key(schema, &ordering.key, item)?;
                keys.push(normalize_key(&ordering.kind, raw)?);
            }
            keyed.push((keys, item));
        }
        // Stable sort keeps the incoming order for ties.
        keyed.sort_by(|(left, _), (right, _)| {
            for (i, ordering) in plan.ordering.iter().enumerate() {
                let cmp = compare_key_values(&ordering.kind, &left[i], &right[i])
                    .unwrap_or(Ordering::Equal);
                let cmp = match ordering.direction {
                    SortDirection::Ascending => cmp,
                    SortDirection::Descending => cmp.reverse(),
                };
                if cmp != Ordering::Equal {
                    return cmp;
                }
            }
            Ordering::Equal
        });
        matched = keyed.into_iter().map(|(_, item)| item).collect();
    }

    // Requested skips past the end clamp to an empty window at the total.
    let start = plan.skip.min(total_count);
    let end = match plan.top {
        Some(top) => start.saturating_add(top).min(total_count),
        None => total_count,
    };
    let page: Vec<E> = matched[start..end].iter().map(|item| (*item).clone()).collect();
    tracing::debug!(
        skip = start,
        returned = page.len(),
        total = total_count,
        "built result page"
    );

    Ok(QueryResult::new(page, start, total_count, plan.url.clone())?
        .with_debug_info(plan.debug_info.clone()))
}

/// The whole pipeline in one call: URL to result page.
pub fn run_query<E>(
    schema: &SchemaSet,
    root: &ResourceDef,
    url: &str,
    items: &[E],
) -> Result<QueryResult<E>, QueryError>
where
    E: Entity + Clone,
{
    let options = QueryOptions::from_url(url)?;
    let plan = compile_query(schema, root, &options)?;
    execute(schema, &plan, items)
}
