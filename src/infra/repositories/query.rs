//! Query descriptors handed to repositories by callers.
//!
//! None of these are interpreted by the repository itself: a [`Predicate`]
//! is a SeaORM condition tree that goes straight to the query builder,
//! an [`OrderBy`] names a column, and [`Includes`] names relations the
//! entity knows how to load.

use sea_orm::sea_query::{IntoCondition, SimpleExpr};
use sea_orm::{Condition, Order, Value};
use uuid::Uuid;

/// Primary key of an entity, integer or UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Int(i64),
    Guid(Uuid),
}

impl EntityKey {
    pub fn into_value(self) -> Value {
        match self {
            EntityKey::Int(id) => Value::from(id),
            EntityKey::Guid(id) => Value::from(id),
        }
    }
}

impl From<i32> for EntityKey {
    fn from(id: i32) -> Self {
        EntityKey::Int(id.into())
    }
}

impl From<i64> for EntityKey {
    fn from(id: i64) -> Self {
        EntityKey::Int(id)
    }
}

impl From<Uuid> for EntityKey {
    fn from(id: Uuid) -> Self {
        EntityKey::Guid(id)
    }
}

impl std::fmt::Display for EntityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKey::Int(id) => write!(f, "{}", id),
            EntityKey::Guid(id) => write!(f, "{}", id),
        }
    }
}

/// Composable row filter.
///
/// ```ignore
/// use sea_orm::ColumnTrait;
/// let active_in_org = Predicate::from(segment::Column::OrganizationId.eq(7))
///     .and(segment::Column::Code.starts_with("YTH"));
/// ```
#[derive(Debug, Clone)]
pub struct Predicate(Condition);

impl Predicate {
    /// Matches every row. Identity element of [`Predicate::and`].
    pub fn all() -> Self {
        Self(Condition::all())
    }

    pub fn and(self, other: impl Into<Predicate>) -> Self {
        Self(Condition::all().add(self.0).add(other.into().0))
    }

    pub fn or(self, other: impl Into<Predicate>) -> Self {
        Self(Condition::any().add(self.0).add(other.into().0))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self(self.0.not())
    }
}

impl Default for Predicate {
    fn default() -> Self {
        Self::all()
    }
}

impl From<Condition> for Predicate {
    fn from(condition: Condition) -> Self {
        Self(condition)
    }
}

impl From<SimpleExpr> for Predicate {
    fn from(expr: SimpleExpr) -> Self {
        Self(expr.into_condition())
    }
}

impl IntoCondition for Predicate {
    fn into_condition(self) -> Condition {
        self.0
    }
}

/// Sort direction. Closed two-value enumeration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl From<Direction> for Order {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Ascending => Order::Asc,
            Direction::Descending => Order::Desc,
        }
    }
}

/// Ordering selector: a column plus a direction.
#[derive(Debug, Clone, Copy)]
pub struct OrderBy<C> {
    pub column: C,
    pub direction: Direction,
}

impl<C> OrderBy<C> {
    pub fn new(column: C, direction: Direction) -> Self {
        Self { column, direction }
    }

    pub fn asc(column: C) -> Self {
        Self::new(column, Direction::Ascending)
    }

    pub fn desc(column: C) -> Self {
        Self::new(column, Direction::Descending)
    }
}

/// Ordered, de-duplicated set of relation names to eager-load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Includes(Vec<String>);

impl Includes {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with(mut self, relation: impl Into<String>) -> Self {
        let relation = relation.into();
        if !self.0.contains(&relation) {
            self.0.push(relation);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Includes {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        iter.into_iter().fold(Includes::none(), Includes::with)
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for Includes {
    fn from(relations: [S; N]) -> Self {
        relations.into_iter().collect()
    }
}
