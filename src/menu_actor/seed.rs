use rust_decimal::Decimal;

use crate::domain::{Category, MenuItemCreate};

/// The menu a fresh shop starts with.
pub fn default_menu() -> Vec<MenuItemCreate> {
    let hot = [
        ("Americano", 39, "Espresso with hot water"),
        ("Cappuccino", 59, "Espresso, steamed milk and foam"),
        ("Caramel Macchiato", 69, "Vanilla, milk, espresso and caramel drizzle"),
        ("Latte", 55, "Espresso with steamed milk"),
        ("Mocha", 65, "Espresso, chocolate and steamed milk"),
    ];
    let cold = [
        ("Iced Americano", 45, "Espresso over ice"),
        ("Iced Caramel Latte", 75, "Caramel, milk and espresso over ice"),
        ("Iced Latte", 59, "Espresso and cold milk over ice"),
        ("Iced Mocha", 69, "Chocolate, milk and espresso over ice"),
        ("Cold Brew", 79, "Steeped for eighteen hours"),
    ];

    hot.into_iter()
        .map(|item| (item, Category::Hot))
        .chain(cold.into_iter().map(|item| (item, Category::Cold)))
        .map(|((name, price, description), category)| {
            MenuItemCreate::new(name, Decimal::from(price), category).describe(description)
        })
        .collect()
}
