//! The categories a user can pick from and the icons used to display them.

/// A category offered when creating a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    /// A short, stable identifier.
    pub id: &'static str,
    /// The name stored on the transaction.
    pub name: &'static str,
    /// The name of the icon shown next to the category.
    pub icon: &'static str,
}

/// The categories offered when creating a transaction.
pub const CATEGORIES: &[Category] = &[
    Category {
        id: "food",
        name: "Food & Drinks",
        icon: "fast-food",
    },
    Category {
        id: "transport",
        name: "Transportation",
        icon: "car",
    },
    Category {
        id: "shopping",
        name: "Shopping",
        icon: "cart",
    },
    Category {
        id: "income",
        name: "Income",
        icon: "cash",
    },
    Category {
        id: "entertainment",
        name: "Entertainment",
        icon: "film",
    },
    Category {
        id: "bills",
        name: "Bills",
        icon: "receipt",
    },
    Category {
        id: "other",
        name: "Other",
        icon: "ellipsis-horizontal",
    },
];

/// The icon for categories that are not in the lookup table.
pub const DEFAULT_CATEGORY_ICON: &str = "pricetag-outline";

/// Get the icon to display for a transaction in `category`.
///
/// Category names are matched exactly. Transactions may carry any category
/// text, so unknown names fall back to [DEFAULT_CATEGORY_ICON].
pub fn category_icon(category: &str) -> &'static str {
    match category {
        "Food & Drinks" => "fast-food",
        "Transportation" => "car",
        "Entertainment" => "film",
        "Bills" => "receipt",
        "Income" => "cash",
        "Shopping" => "cart",
        "Health" => "heart",
        "Education" => "school",
        "Travel" => "airplane",
        "Home" => "home",
        "Personal" => "person",
        "Other" => "pricetag",
        _ => DEFAULT_CATEGORY_ICON,
    }
}
