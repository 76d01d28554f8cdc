use super::error::ListError;
use super::types::{CompareOp, FilterPredicate, ListParams, SortKey, CONTROL_KEYS};

pub const DEFAULT_PAGE: i64 = 1;

/// Parse a raw query string into typed listing parameters.
///
/// Keys are partitioned into the fixed control-key set (exact, case-sensitive
/// match) and filter keys. A filter key is either a bare field name (equality)
/// or `field[op]` with one of the comparison operators. Anything else in
/// bracket position is rejected rather than handed to the storage engine.
pub fn parse(raw_query: &str) -> Result<ListParams, ListError> {
    let mut params = ListParams {
        select: None,
        sort: vec![],
        page: DEFAULT_PAGE,
        limit: crate::config::CONFIG.listing.default_limit,
        filters: vec![],
    };

    for (key, value) in url::form_urlencoded::parse(raw_query.as_bytes()) {
        let key = key.as_ref();
        if CONTROL_KEYS.contains(&key) {
            apply_control(&mut params, key, value.as_ref());
        } else {
            params.filters.push(parse_filter(key, value.as_ref())?);
        }
    }

    // Cap limit from config
    if let Some(max_limit) = crate::config::CONFIG.listing.max_limit {
        if params.limit > max_limit {
            if crate::config::CONFIG.listing.debug_logging {
                tracing::warn!("Limit {} exceeds max {}, capping to max", params.limit, max_limit);
            }
            params.limit = max_limit;
        }
    }

    Ok(params)
}

fn apply_control(params: &mut ListParams, key: &str, value: &str) {
    match key {
        "select" => {
            let fields: Vec<String> = value
                .split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string)
                .collect();
            params.select = Some(fields);
        }
        "sort" => {
            params.sort = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| match s.strip_prefix('-') {
                    Some(column) => SortKey { column: column.to_string(), descending: true },
                    None => SortKey { column: s.to_string(), descending: false },
                })
                .collect();
        }
        "page" => {
            params.page = value
                .parse::<i64>()
                .ok()
                .filter(|p| *p >= 1)
                .unwrap_or(DEFAULT_PAGE);
        }
        "limit" => {
            params.limit = value
                .parse::<i64>()
                .ok()
                .filter(|l| *l >= 1)
                .unwrap_or(crate::config::CONFIG.listing.default_limit);
        }
        _ => unreachable!("control keys are matched against CONTROL_KEYS"),
    }
}

fn parse_filter(key: &str, value: &str) -> Result<FilterPredicate, ListError> {
    let (field, op) = match key.find('[') {
        None => (key, CompareOp::Eq),
        Some(open) => {
            let Some(suffix) = key[open + 1..].strip_suffix(']') else {
                return Err(ListError::InvalidFilter(key.to_string()));
            };
            let op = CompareOp::from_suffix(suffix)
                .ok_or_else(|| ListError::InvalidFilter(key.to_string()))?;
            (&key[..open], op)
        }
    };

    if field.is_empty() {
        return Err(ListError::InvalidFilter(key.to_string()));
    }

    Ok(FilterPredicate { field: field.to_string(), op, value: value.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partitions_control_and_filter_keys() {
        let params = parse("select=name,email&sort=-rating,name&page=2&limit=10&housing=true").unwrap();
        assert_eq!(params.select, Some(vec!["name".to_string(), "email".to_string()]));
        assert_eq!(params.page, 2);
        assert_eq!(params.limit, 10);
        assert_eq!(params.filters.len(), 1);
        assert_eq!(params.filters[0].field, "housing");
        assert_eq!(params.filters[0].op, CompareOp::Eq);
    }

    #[test]
    fn control_keys_are_case_sensitive() {
        // "Select" is not a control key, so it becomes an equality filter
        let params = parse("Select=name").unwrap();
        assert!(params.select.is_none());
        assert_eq!(params.filters.len(), 1);
        assert_eq!(params.filters[0].field, "Select");
    }

    #[test]
    fn sort_keys_parse_direction() {
        let params = parse("sort=-rating,name").unwrap();
        assert_eq!(
            params.sort,
            vec![
                SortKey { column: "rating".to_string(), descending: true },
                SortKey { column: "name".to_string(), descending: false },
            ]
        );
    }

    #[test]
    fn operator_suffixes_parse() {
        let params = parse("rating%5Bgte%5D=5&tuition%5Blt%5D=10000&careers%5Bin%5D=Business").unwrap();
        assert_eq!(params.filters[0].op, CompareOp::Gte);
        assert_eq!(params.filters[1].op, CompareOp::Lt);
        assert_eq!(params.filters[2].op, CompareOp::In);
    }

    #[test]
    fn defaults_page_one_limit_twenty_five() {
        let params = parse("").unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 25);
        assert!(params.sort.is_empty());
        assert!(params.select.is_none());
    }

    #[test]
    fn bad_page_and_limit_fall_back_to_defaults() {
        let params = parse("page=abc&limit=0").unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 25);

        let params = parse("page=0&limit=-3").unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 25);
    }

    #[test]
    fn start_index_is_zero_based_offset() {
        let params = parse("page=3&limit=10").unwrap();
        assert_eq!(params.start_index(), 20);
    }

    #[test]
    fn unknown_bracket_operator_is_rejected() {
        let err = parse("rating%5Bregex%5D=x").unwrap_err();
        assert!(matches!(err, ListError::InvalidFilter(key) if key == "rating[regex]"));
    }

    #[test]
    fn unterminated_bracket_is_rejected() {
        let err = parse("rating%5Bgte=5").unwrap_err();
        assert!(matches!(err, ListError::InvalidFilter(_)));
    }

    #[test]
    fn empty_field_name_is_rejected() {
        assert!(parse("%5Bgte%5D=5").is_err());
    }
}
