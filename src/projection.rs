//! Sorting and filtering of the orders table.
//!
//! The projection is a pure function of the order list and the current
//! [`ViewState`]. The view state travels in the query string, so every
//! header click or filter change is a fresh request that projects again.

use std::cmp::Ordering;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::models::{Order, OrderStatus};

/// Order attribute the table can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Id,
    CustomerName,
    PizzaType,
    Quantity,
    OrderDate,
    Status,
}

impl SortField {
    /// Table columns, left to right
    pub const ALL: [SortField; 6] = [
        Self::Id,
        Self::CustomerName,
        Self::PizzaType,
        Self::Quantity,
        Self::OrderDate,
        Self::Status,
    ];

    /// Attribute name, as used in query strings and JSON
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::CustomerName => "customerName",
            Self::PizzaType => "pizzaType",
            Self::Quantity => "quantity",
            Self::OrderDate => "orderDate",
            Self::Status => "status",
        }
    }

    /// Column heading
    pub fn label(&self) -> &'static str {
        match self {
            Self::Id => "Order ID",
            Self::CustomerName => "Customer Name",
            Self::PizzaType => "Pizza Type",
            Self::Quantity => "Quantity",
            Self::OrderDate => "Order Date",
            Self::Status => "Status",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Ascending),
            "desc" => Some(Self::Descending),
            _ => None,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

/// Status filter: a single status, or everything
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum StatusFilter {
    #[default]
    All,
    Only(OrderStatus),
}

impl StatusFilter {
    /// `All` followed by each status, in select-box order
    pub fn options() -> impl Iterator<Item = StatusFilter> {
        std::iter::once(Self::All).chain(OrderStatus::ALL.into_iter().map(Self::Only))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Only(status) => status.as_str(),
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "All" => Some(Self::All),
            other => OrderStatus::parse(other).map(Self::Only),
        }
    }

    pub fn matches(&self, status: OrderStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == status,
        }
    }
}

impl From<StatusFilter> for String {
    fn from(filter: StatusFilter) -> Self {
        filter.as_str().to_string()
    }
}

impl TryFrom<String> for StatusFilter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("unknown status filter: {}", value))
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-page sort and filter selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub sort_field: Option<SortField>,
    pub sort_direction: SortDirection,
    pub status_filter: StatusFilter,
}

impl ViewState {
    /// Apply a column header click.
    ///
    /// Clicking the active column flips the direction; clicking any other
    /// column makes it active and resets the direction to ascending.
    pub fn toggle_sort(&mut self, field: SortField) {
        if self.sort_field == Some(field) {
            self.sort_direction = self.sort_direction.flipped();
        } else {
            self.sort_field = Some(field);
            self.sort_direction = SortDirection::Ascending;
        }
    }

    /// The state a click on `field` would produce
    pub fn with_sort_toggled(&self, field: SortField) -> Self {
        let mut next = *self;
        next.toggle_sort(field);
        next
    }

    pub fn with_filter(&self, status_filter: StatusFilter) -> Self {
        Self {
            status_filter,
            ..*self
        }
    }

    /// Read the state from query parameters (`sort`, `dir`, `status`).
    ///
    /// Unknown values fall back to the default for that parameter.
    pub fn from_query<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut state = Self::default();
        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                "sort" => state.sort_field = SortField::parse(value),
                "dir" => state.sort_direction = SortDirection::parse(value).unwrap_or_default(),
                "status" => state.status_filter = StatusFilter::parse(value).unwrap_or_default(),
                _ => {}
            }
        }
        state
    }

    /// Canonical query string for this state, without the leading `?`.
    ///
    /// Defaults are omitted, so the initial state encodes to an empty string.
    pub fn to_query(&self) -> String {
        let mut params = Vec::new();
        if let Some(field) = self.sort_field {
            params.push(format!("sort={}", field.as_str()));
            if self.sort_direction != SortDirection::Ascending {
                params.push(format!("dir={}", self.sort_direction.as_str()));
            }
        }
        if self.status_filter != StatusFilter::All {
            params.push(format!(
                "status={}",
                urlencoding::encode(self.status_filter.as_str())
            ));
        }
        params.join("&")
    }
}

/// Number of orders per status, plus the total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCounts {
    all: usize,
    by_status: [usize; 5],
}

impl StatusCounts {
    pub fn tally(orders: &[Order]) -> Self {
        let mut counts = Self::default();
        for order in orders {
            counts.all += 1;
            counts.by_status[order.status.index()] += 1;
        }
        counts
    }

    pub fn get(&self, filter: StatusFilter) -> usize {
        match filter {
            StatusFilter::All => self.all,
            StatusFilter::Only(status) => self.by_status[status.index()],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatusFilter, usize)> + '_ {
        StatusFilter::options().map(move |filter| (filter, self.get(filter)))
    }
}

impl Serialize for StatusCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(OrderStatus::ALL.len() + 1))?;
        for (filter, count) in self.iter() {
            map.serialize_entry(filter.as_str(), &count)?;
        }
        map.end()
    }
}

/// What the orders table shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub visible: Vec<Order>,
    /// Counts over the whole collection, independent of the active filter
    pub counts: StatusCounts,
}

/// Filter, then stably sort, the orders for display.
pub fn project(orders: &[Order], state: &ViewState) -> Projection {
    let counts = StatusCounts::tally(orders);

    let mut visible: Vec<Order> = orders
        .iter()
        .filter(|order| state.status_filter.matches(order.status))
        .cloned()
        .collect();

    if let Some(field) = state.sort_field {
        // sort_by is stable; reversing the comparator keeps ties in input order
        visible.sort_by(|a, b| state.sort_direction.apply(compare_by(field, a, b)));
    }

    Projection { visible, counts }
}

fn compare_by(field: SortField, a: &Order, b: &Order) -> Ordering {
    match field {
        SortField::Quantity => a.quantity.cmp(&b.quantity),
        SortField::OrderDate => compare_dates(a, b),
        SortField::Id => compare_text(&a.id, &b.id),
        SortField::CustomerName => compare_text(&a.customer_name, &b.customer_name),
        SortField::PizzaType => compare_text(&a.pizza_type, &b.pizza_type),
        SortField::Status => compare_text(a.status.as_str(), b.status.as_str()),
    }
}

/// Chronological; unparseable dates sort after every valid one.
fn compare_dates(a: &Order, b: &Order) -> Ordering {
    match (a.placed_at(), b.placed_at()) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Case-insensitive text order: base letters first, accents break ties.
fn compare_text(a: &str, b: &str) -> Ordering {
    let base = |s: &str| -> String {
        s.nfd()
            .filter(|c| !is_combining_mark(*c))
            .flat_map(char::to_lowercase)
            .collect()
    };
    let accented = |s: &str| -> String { s.nfd().flat_map(char::to_lowercase).collect() };

    base(a)
        .cmp(&base(b))
        .then_with(|| accented(a).cmp(&accented(b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{OrderSource, SeedOrders};

    fn order(id: &str, name: &str, quantity: u32, date: &str, status: OrderStatus) -> Order {
        Order {
            id: id.into(),
            customer_name: name.into(),
            pizza_type: "Margherita".into(),
            quantity,
            order_date: date.into(),
            status,
        }
    }

    fn ids(projection: &Projection) -> Vec<&str> {
        projection.visible.iter().map(|o| o.id.as_str()).collect()
    }

    fn sorted(field: SortField, direction: SortDirection) -> ViewState {
        ViewState {
            sort_field: Some(field),
            sort_direction: direction,
            status_filter: StatusFilter::All,
        }
    }

    #[test]
    fn sorts_quantity_numerically() {
        let orders = vec![
            order("A", "Ann", 2, "2023-05-15 10:00", OrderStatus::Pending),
            order("B", "Bob", 1, "2023-05-16 10:00", OrderStatus::Pending),
        ];

        let projection = project(&orders, &sorted(SortField::Quantity, SortDirection::Ascending));
        assert_eq!(ids(&projection), ["B", "A"]);

        let projection = project(&orders, &sorted(SortField::Quantity, SortDirection::Descending));
        assert_eq!(ids(&projection), ["A", "B"]);
    }

    #[test]
    fn quantity_is_not_compared_as_text() {
        let orders = vec![
            order("A", "Ann", 10, "2023-05-15 10:00", OrderStatus::Pending),
            order("B", "Bob", 9, "2023-05-15 10:00", OrderStatus::Pending),
        ];

        let projection = project(&orders, &sorted(SortField::Quantity, SortDirection::Ascending));
        assert_eq!(ids(&projection), ["B", "A"]);
    }

    #[test]
    fn no_sort_field_keeps_collection_order() {
        let seed = SeedOrders::new();
        let state = ViewState {
            sort_direction: SortDirection::Descending,
            ..ViewState::default()
        };

        let projection = project(seed.orders(), &state);
        assert_eq!(projection.visible, seed.orders());
    }

    #[test]
    fn filter_delivered_over_seed() {
        let seed = SeedOrders::new();
        let state = ViewState::default().with_filter(StatusFilter::Only(OrderStatus::Delivered));

        let projection = project(seed.orders(), &state);
        assert_eq!(ids(&projection), ["PZA001", "PZA006", "PZA010"]);
        assert_eq!(projection.counts.get(StatusFilter::All), 12);
    }

    #[test]
    fn every_visible_order_matches_the_filter() {
        let seed = SeedOrders::new();
        for status in OrderStatus::ALL {
            let filter = StatusFilter::Only(status);
            let projection = project(seed.orders(), &ViewState::default().with_filter(filter));

            assert!(projection.visible.iter().all(|o| o.status == status));
            assert_eq!(projection.visible.len(), projection.counts.get(filter));
        }
    }

    #[test]
    fn counts_ignore_the_active_filter() {
        let seed = SeedOrders::new();
        let unfiltered = project(seed.orders(), &ViewState::default()).counts;

        for filter in StatusFilter::options() {
            let counts = project(seed.orders(), &ViewState::default().with_filter(filter)).counts;
            assert_eq!(counts, unfiltered);
        }

        assert_eq!(unfiltered.get(StatusFilter::Only(OrderStatus::OutForDelivery)), 2);
        assert_eq!(unfiltered.get(StatusFilter::Only(OrderStatus::Cancelled)), 1);
    }

    #[test]
    fn ties_keep_input_order_in_both_directions() {
        let seed = SeedOrders::new();

        // quantities: 1 -> 002,004,006,008,010,012 and 2 -> 001,005,007,011
        let asc = project(seed.orders(), &sorted(SortField::Quantity, SortDirection::Ascending));
        assert_eq!(
            ids(&asc),
            [
                "PZA002", "PZA004", "PZA006", "PZA008", "PZA010", "PZA012", "PZA001", "PZA005",
                "PZA007", "PZA011", "PZA003", "PZA009"
            ]
        );

        let desc = project(seed.orders(), &sorted(SortField::Quantity, SortDirection::Descending));
        assert_eq!(
            ids(&desc),
            [
                "PZA003", "PZA009", "PZA001", "PZA005", "PZA007", "PZA011", "PZA002", "PZA004",
                "PZA006", "PZA008", "PZA010", "PZA012"
            ]
        );
    }

    #[test]
    fn status_ties_are_stable() {
        let seed = SeedOrders::new();
        let desc = project(seed.orders(), &sorted(SortField::Status, SortDirection::Descending));

        // Preparing > Pending > Out for Delivery > Delivered > Cancelled
        assert_eq!(
            ids(&desc),
            [
                "PZA002", "PZA007", "PZA011", "PZA003", "PZA008", "PZA012", "PZA004", "PZA009",
                "PZA001", "PZA006", "PZA010", "PZA005"
            ]
        );
    }

    #[test]
    fn sorts_dates_chronologically() {
        let orders = vec![
            order("A", "Ann", 1, "2023-05-16 09:00", OrderStatus::Pending),
            order("B", "Bob", 1, "2023-05-15 23:59", OrderStatus::Pending),
            order("C", "Cat", 1, "2023-05-15T08:00", OrderStatus::Pending),
        ];

        let projection = project(&orders, &sorted(SortField::OrderDate, SortDirection::Ascending));
        assert_eq!(ids(&projection), ["C", "B", "A"]);
    }

    #[test]
    fn unparseable_dates_sort_last_ascending() {
        let orders = vec![
            order("A", "Ann", 1, "not a date", OrderStatus::Pending),
            order("B", "Bob", 1, "2023-05-15 10:00", OrderStatus::Pending),
        ];

        let projection = project(&orders, &sorted(SortField::OrderDate, SortDirection::Ascending));
        assert_eq!(ids(&projection), ["B", "A"]);
    }

    #[test]
    fn text_sort_ignores_case() {
        let orders = vec![
            order("A", "bob", 1, "2023-05-15 10:00", OrderStatus::Pending),
            order("B", "Alice", 1, "2023-05-15 10:00", OrderStatus::Pending),
            order("C", "BOB", 1, "2023-05-15 10:00", OrderStatus::Pending),
            order("D", "carol", 1, "2023-05-15 10:00", OrderStatus::Pending),
        ];

        let asc = project(&orders, &sorted(SortField::CustomerName, SortDirection::Ascending));
        assert_eq!(ids(&asc), ["B", "A", "C", "D"]);

        let desc = project(&orders, &sorted(SortField::CustomerName, SortDirection::Descending));
        assert_eq!(ids(&desc), ["D", "A", "C", "B"]);
    }

    #[test]
    fn text_sort_orders_accented_letters_by_base_letter() {
        let orders = vec![
            order("A", "Zoe", 1, "2023-05-15 10:00", OrderStatus::Pending),
            order("B", "Émile", 1, "2023-05-15 10:00", OrderStatus::Pending),
            order("C", "Emma", 1, "2023-05-15 10:00", OrderStatus::Pending),
            order("D", "emile", 1, "2023-05-15 10:00", OrderStatus::Pending),
        ];

        let asc = project(&orders, &sorted(SortField::CustomerName, SortDirection::Ascending));
        assert_eq!(ids(&asc), ["D", "B", "C", "A"]);

        assert_eq!(compare_text("Émile", "émile"), Ordering::Equal);
        assert_eq!(compare_text("Émile", "Zoe"), Ordering::Less);
    }

    #[test]
    fn filters_before_sorting() {
        let seed = SeedOrders::new();
        let state = ViewState {
            sort_field: Some(SortField::CustomerName),
            sort_direction: SortDirection::Ascending,
            status_filter: StatusFilter::Only(OrderStatus::Pending),
        };

        let projection = project(seed.orders(), &state);
        // Jennifer Taylor, Patricia Garcia, Robert Johnson
        assert_eq!(ids(&projection), ["PZA008", "PZA012", "PZA003"]);
    }

    #[test]
    fn projecting_twice_gives_the_same_result() {
        let seed = SeedOrders::new();
        let state = sorted(SortField::PizzaType, SortDirection::Descending);

        assert_eq!(project(seed.orders(), &state), project(seed.orders(), &state));
    }

    #[test]
    fn empty_filter_result_is_not_an_error() {
        let orders = vec![order("A", "Ann", 1, "2023-05-15 10:00", OrderStatus::Pending)];
        let state = ViewState::default().with_filter(StatusFilter::Only(OrderStatus::Cancelled));

        let projection = project(&orders, &state);
        assert!(projection.visible.is_empty());
        assert_eq!(projection.counts.get(StatusFilter::All), 1);
    }

    #[test]
    fn clicking_active_column_flips_direction() {
        let mut state = ViewState::default();

        state.toggle_sort(SortField::Quantity);
        assert_eq!(state.sort_field, Some(SortField::Quantity));
        assert_eq!(state.sort_direction, SortDirection::Ascending);

        state.toggle_sort(SortField::Quantity);
        assert_eq!(state.sort_field, Some(SortField::Quantity));
        assert_eq!(state.sort_direction, SortDirection::Descending);

        state.toggle_sort(SortField::Quantity);
        assert_eq!(state.sort_direction, SortDirection::Ascending);
    }

    #[test]
    fn clicking_another_column_resets_direction() {
        let mut state = sorted(SortField::Quantity, SortDirection::Descending);

        state.toggle_sort(SortField::CustomerName);
        assert_eq!(state.sort_field, Some(SortField::CustomerName));
        assert_eq!(state.sort_direction, SortDirection::Ascending);
    }

    #[test]
    fn toggling_keeps_the_filter() {
        let state = ViewState::default().with_filter(StatusFilter::Only(OrderStatus::Pending));
        let next = state.with_sort_toggled(SortField::Id);

        assert_eq!(next.status_filter, StatusFilter::Only(OrderStatus::Pending));
    }

    #[test]
    fn reads_state_from_query() {
        let state = ViewState::from_query([
            ("sort", "orderDate"),
            ("dir", "desc"),
            ("status", "Out for Delivery"),
        ]);

        assert_eq!(state.sort_field, Some(SortField::OrderDate));
        assert_eq!(state.sort_direction, SortDirection::Descending);
        assert_eq!(state.status_filter, StatusFilter::Only(OrderStatus::OutForDelivery));
    }

    #[test]
    fn unknown_query_values_fall_back_to_defaults() {
        let state = ViewState::from_query([
            ("sort", "price"),
            ("dir", "sideways"),
            ("status", "Lost"),
            ("page", "2"),
        ]);

        assert_eq!(state, ViewState::default());
    }

    #[test]
    fn query_round_trip() {
        let state = ViewState {
            sort_field: Some(SortField::PizzaType),
            sort_direction: SortDirection::Descending,
            status_filter: StatusFilter::Only(OrderStatus::OutForDelivery),
        };

        let query = state.to_query();
        assert_eq!(query, "sort=pizzaType&dir=desc&status=Out%20for%20Delivery");

        let decoded = query.split('&').filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            Some((key.to_string(), urlencoding::decode(value).ok()?.into_owned()))
        });
        assert_eq!(ViewState::from_query(decoded), state);
    }

    #[test]
    fn default_state_has_empty_query() {
        assert_eq!(ViewState::default().to_query(), "");
    }

    #[test]
    fn counts_serialize_as_a_keyed_map() {
        let counts = StatusCounts::tally(SeedOrders::new().orders());
        let value = serde_json::to_value(counts).unwrap();

        assert_eq!(value["All"], 12);
        assert_eq!(value["Delivered"], 3);
        assert_eq!(value["Out for Delivery"], 2);
    }

    #[test]
    fn view_state_json_shape() {
        let state = sorted(SortField::CustomerName, SortDirection::Descending)
            .with_filter(StatusFilter::Only(OrderStatus::Pending));
        let value = serde_json::to_value(state).unwrap();

        assert_eq!(value["sortField"], "customerName");
        assert_eq!(value["sortDirection"], "desc");
        assert_eq!(value["statusFilter"], "Pending");
    }
}
