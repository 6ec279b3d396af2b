// Domain models - canonical posts, raw import rows, view state, chart specs

pub mod chart;
pub mod post;
pub mod raw;
pub mod schema;
pub mod view;

pub use chart::{ChartKind, ChartSpec, GroupedPoint, Reducer, Series, SharePoint, CHART_PALETTE};
pub use post::{Post, Sentiment};
pub use raw::{RawRow, RawValue};
pub use schema::{ColumnSchema, ValueType};
pub use view::{Combinator, DateRange, FilterOperator, FilterPredicate, Operand, ViewState, ViewUpdate};
