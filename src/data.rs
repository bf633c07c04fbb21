use crate::models::{Order, OrderStatus};

/// Read-only source of orders handed to the projection.
pub trait OrderSource {
    fn orders(&self) -> &[Order];
}

/// The fixed order list the dashboard ships with.
#[derive(Debug, Clone)]
pub struct SeedOrders {
    orders: Vec<Order>,
}

impl SeedOrders {
    pub fn new() -> Self {
        let orders = SEED
            .iter()
            .map(|&(id, customer_name, pizza_type, quantity, order_date, status)| Order {
                id: id.to_string(),
                customer_name: customer_name.to_string(),
                pizza_type: pizza_type.to_string(),
                quantity,
                order_date: order_date.to_string(),
                status,
            })
            .collect();

        Self { orders }
    }
}

impl Default for SeedOrders {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderSource for SeedOrders {
    fn orders(&self) -> &[Order] {
        &self.orders
    }
}

impl OrderSource for Vec<Order> {
    fn orders(&self) -> &[Order] {
        self
    }
}

type SeedRow = (&'static str, &'static str, &'static str, u32, &'static str, OrderStatus);

const SEED: [SeedRow; 12] = [
    ("PZA001", "John Doe", "Margherita", 2, "2023-05-15 14:30", OrderStatus::Delivered),
    ("PZA002", "Jane Smith", "Pepperoni", 1, "2023-05-15 15:45", OrderStatus::Preparing),
    ("PZA003", "Robert Johnson", "Veggie Supreme", 3, "2023-05-15 16:20", OrderStatus::Pending),
    ("PZA004", "Emily Davis", "Hawaiian", 1, "2023-05-15 17:10", OrderStatus::OutForDelivery),
    ("PZA005", "Michael Wilson", "BBQ Chicken", 2, "2023-05-15 18:05", OrderStatus::Cancelled),
    ("PZA006", "Sarah Brown", "Meat Lovers", 1, "2023-05-16 12:15", OrderStatus::Delivered),
    ("PZA007", "David Miller", "Buffalo Chicken", 2, "2023-05-16 13:30", OrderStatus::Preparing),
    ("PZA008", "Jennifer Taylor", "Cheese", 1, "2023-05-16 14:45", OrderStatus::Pending),
    ("PZA009", "Thomas Anderson", "Supreme", 3, "2023-05-16 15:20", OrderStatus::OutForDelivery),
    ("PZA010", "Lisa White", "Mushroom", 1, "2023-05-16 16:10", OrderStatus::Delivered),
    ("PZA011", "James Martin", "Spinach & Feta", 2, "2023-05-16 17:05", OrderStatus::Preparing),
    ("PZA012", "Patricia Garcia", "Veggie", 1, "2023-05-17 11:30", OrderStatus::Pending),
];
