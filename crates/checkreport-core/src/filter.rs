//! Status and checker filters.
//!
//! A filter expression is a comma-separated list of terms applied left to
//! right. `name` or `+name` adds, `-name` removes, and `*` stands for every
//! choice, so `*,-nullity` selects every checker but the nullity one.

use std::collections::BTreeSet;

use checkreport_types::{Checker, Status};

use crate::error::FilterError;

pub const DEFAULT_STATUS_FILTER: &str = "error,warning,unreachable";
pub const DEFAULT_ANALYSES_FILTER: &str = "*";

fn parse_selection<T: Copy + Ord>(
    filter: &'static str,
    expression: &str,
    every: &[T],
    lookup: impl Fn(&str) -> Option<T>,
    expected: impl Fn() -> String,
) -> Result<BTreeSet<T>, FilterError> {
    let mut selected = BTreeSet::new();
    for term in expression.split(',') {
        let term = term.trim();
        let (remove, name) = match term.strip_prefix('-') {
            Some(rest) => (true, rest.trim()),
            None => (false, term.strip_prefix('+').unwrap_or(term).trim()),
        };
        if name.is_empty() {
            continue;
        }

        let members: Vec<T> = if name == "*" {
            every.to_vec()
        } else {
            match lookup(name) {
                Some(v) => vec![v],
                None => {
                    return Err(FilterError::UnknownChoice {
                        filter,
                        choice: name.to_string(),
                        expected: expected(),
                    })
                }
            }
        };

        for member in members {
            if remove {
                selected.remove(&member);
            } else {
                selected.insert(member);
            }
        }
    }
    Ok(selected)
}

/// Statuses a report displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusFilter(BTreeSet<Status>);

impl StatusFilter {
    pub fn parse(expression: &str) -> Result<Self, FilterError> {
        parse_selection("status", expression, Status::ALL, Status::parse, || {
            let mut names: Vec<&str> = Status::ALL.iter().map(|s| s.as_str()).collect();
            names.push(Status::Ok.label());
            names.join(", ")
        })
        .map(Self)
    }

    pub fn all() -> Self {
        Self(Status::ALL.iter().copied().collect())
    }

    pub fn contains(&self, status: Status) -> bool {
        self.0.contains(&status)
    }
}

impl Default for StatusFilter {
    fn default() -> Self {
        Self(BTreeSet::from([
            Status::Error,
            Status::Warning,
            Status::Unreachable,
        ]))
    }
}

/// Checkers whose checks a report displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckerFilter(BTreeSet<Checker>);

impl CheckerFilter {
    pub fn parse(expression: &str) -> Result<Self, FilterError> {
        let lookup = |name: &str| Checker::ALL.iter().copied().find(|c| c.short_name() == name);
        parse_selection("analysis", expression, Checker::ALL, lookup, || {
            let names: Vec<&str> = Checker::ALL.iter().map(|c| c.short_name()).collect();
            names.join(", ")
        })
        .map(Self)
    }

    pub fn all() -> Self {
        Self(Checker::ALL.iter().copied().collect())
    }

    pub fn contains(&self, checker: Checker) -> bool {
        self.0.contains(&checker)
    }
}

impl Default for CheckerFilter {
    fn default() -> Self {
        Self::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_status_filter_matches_default_expression() {
        assert_eq!(
            StatusFilter::parse(DEFAULT_STATUS_FILTER).unwrap(),
            StatusFilter::default()
        );
    }

    #[test]
    fn star_minus_removes_one_checker() {
        let filter = CheckerFilter::parse("*,-nullity").unwrap();
        assert!(!filter.contains(Checker::NullPointerDereference));
        assert!(filter.contains(Checker::DeadCode));
        assert!(filter.contains(Checker::BufferOverflow));
    }

    #[test]
    fn terms_apply_left_to_right() {
        let filter = StatusFilter::parse("-error, +warning, error").unwrap();
        assert!(filter.contains(Status::Error));
        assert!(filter.contains(Status::Warning));
        assert!(!filter.contains(Status::Ok));

        let filter = StatusFilter::parse("error,*,-error").unwrap();
        assert!(!filter.contains(Status::Error));
        assert!(filter.contains(Status::Ok));
    }

    #[test]
    fn safe_selects_ok() {
        let filter = StatusFilter::parse("safe").unwrap();
        assert!(filter.contains(Status::Ok));
        assert!(!filter.contains(Status::Error));
    }

    #[test]
    fn status_names_resolve_like_status_parse() {
        for status in Status::ALL {
            let filter = StatusFilter::parse(status.as_str()).unwrap();
            assert!(filter.contains(*status));
            assert_eq!(filter, StatusFilter::parse(status.label()).unwrap());
        }
        let err = StatusFilter::parse("fatal").unwrap_err();
        insta::assert_snapshot!(
            err.to_string(),
            @"unknown status 'fatal' (expected one of: ok, warning, error, unreachable, safe)"
        );
    }

    #[test]
    fn empty_terms_are_skipped() {
        let filter = CheckerFilter::parse("dca,,").unwrap();
        assert!(filter.contains(Checker::DeadCode));
        assert!(!filter.contains(Checker::Soundness));
    }

    #[test]
    fn unknown_choice_is_an_error() {
        let err = CheckerFilter::parse("boa,bogus").unwrap_err();
        let FilterError::UnknownChoice { choice, .. } = &err;
        assert_eq!(choice, "bogus");
        assert!(err.to_string().starts_with("unknown analysis 'bogus'"));
    }
}
