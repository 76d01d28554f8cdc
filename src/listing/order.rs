use super::types::{Collection, SortKey};

/// Default ordering when the caller supplies no usable sort keys: newest
/// records first.
const DEFAULT_ORDER: &str = "ORDER BY \"created_at\" DESC";

/// Build the ORDER BY clause. Sort keys naming columns the collection does
/// not expose are dropped, like a sort on a field no document carries.
pub fn clause(sort: &[SortKey], collection: &Collection) -> String {
    let parts: Vec<String> = sort
        .iter()
        .filter(|key| collection.columns.contains(&key.column.as_str()))
        .map(|key| {
            let direction = if key.descending { "DESC" } else { "ASC" };
            format!("\"{}\" {}", key.column, direction)
        })
        .collect();

    if parts.is_empty() {
        DEFAULT_ORDER.to_string()
    } else {
        format!("ORDER BY {}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLLECTION: Collection = Collection {
        table: "bootcamps",
        columns: &["id", "name", "rating", "created_at"],
    };

    fn key(column: &str, descending: bool) -> SortKey {
        SortKey { column: column.to_string(), descending }
    }

    #[test]
    fn multi_key_ordering() {
        let sql = clause(&[key("rating", true), key("name", false)], &COLLECTION);
        assert_eq!(sql, "ORDER BY \"rating\" DESC, \"name\" ASC");
    }

    #[test]
    fn empty_sort_defaults_to_created_at_desc() {
        assert_eq!(clause(&[], &COLLECTION), "ORDER BY \"created_at\" DESC");
    }

    #[test]
    fn unknown_columns_are_dropped() {
        let sql = clause(&[key("nonsense", false), key("name", false)], &COLLECTION);
        assert_eq!(sql, "ORDER BY \"name\" ASC");
    }

    #[test]
    fn all_unknown_columns_fall_back_to_default() {
        assert_eq!(clause(&[key("nonsense", true)], &COLLECTION), "ORDER BY \"created_at\" DESC");
    }
}
