use serde::Serialize;
use serde_json::Value;

/// Reserved query-string keys consumed by the listing machinery itself.
/// Everything else is treated as a filter predicate.
pub const CONTROL_KEYS: &[&str] = &["select", "sort", "page", "limit"];

/// A listable table plus the columns the API is allowed to return.
///
/// The column list doubles as the default projection, so columns that must
/// never leave the database (password hashes, reset tokens) are simply not
/// listed here.
#[derive(Debug, Clone, Copy)]
pub struct Collection {
    pub table: &'static str,
    pub columns: &'static [&'static str],
}

/// Relation expansion: which related records to inline into each result
/// document, optionally narrowed to a field projection.
#[derive(Debug, Clone, Copy)]
pub struct Expand {
    pub relation: Relation,
    pub select: Option<&'static [&'static str]>,
}

#[derive(Debug, Clone, Copy)]
pub enum Relation {
    /// Foreign key on this collection pointing at one parent record.
    /// `course.bootcamp_id -> bootcamps.id`, attached as `name`.
    BelongsTo {
        name: &'static str,
        target: &'static Collection,
        fk_column: &'static str,
    },
    /// Foreign key on the target pointing back at this collection.
    /// `courses.bootcamp_id -> bootcamps.id`, attached as an array.
    HasMany {
        name: &'static str,
        target: &'static Collection,
        fk_column: &'static str,
    },
}

impl Expand {
    pub fn relation(relation: Relation) -> Self {
        Self { relation, select: None }
    }

    pub fn with_select(relation: Relation, select: &'static [&'static str]) -> Self {
        Self { relation, select: Some(select) }
    }
}

/// Parsed listing parameters: the typed form of the raw query string.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub select: Option<Vec<String>>,
    pub sort: Vec<SortKey>,
    pub page: i64,
    pub limit: i64,
    pub filters: Vec<FilterPredicate>,
}

impl ListParams {
    pub fn start_index(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub column: String,
    pub descending: bool,
}

/// A single field comparison from the query string: `rating[gte]=5`,
/// `housing=true`, `careers[in]=Business,UI/UX`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterPredicate {
    pub field: String,
    pub op: CompareOp,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl CompareOp {
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Some(match suffix {
            "gt" => CompareOp::Gt,
            "gte" => CompareOp::Gte,
            "lt" => CompareOp::Lt,
            "lte" => CompareOp::Lte,
            "in" => CompareOp::In,
            _ => return None,
        })
    }

    pub fn to_sql(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::In => "IN",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct PageRef {
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageRef>,
}

/// The standardized listing response wrapper. `count` always equals
/// `data.len()`, never the total match count.
#[derive(Debug, Clone, Serialize)]
pub struct ListEnvelope {
    pub success: bool,
    pub count: usize,
    pub pagination: Pagination,
    pub data: Vec<Value>,
}

impl Pagination {
    /// Cursor links around the current page. `total` is the unconditional
    /// collection count, matching what the count query produces.
    pub fn around(page: i64, limit: i64, total: i64) -> Self {
        let mut pagination = Pagination::default();
        if page * limit < total {
            pagination.next = Some(PageRef { page: page + 1, limit });
        }
        if page > 1 {
            pagination.prev = Some(PageRef { page: page - 1, limit });
        }
        pagination
    }
}
