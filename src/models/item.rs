//! Categories and line items extracted from a procurement plan.

use serde::{Deserialize, Serialize};

/// A named grouping established by a category-marker row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    /// CPV code of the marker row, if it carried a valid one
    pub code: Option<String>,
}

/// One priced procurement entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Name of the enclosing category
    pub category: String,

    /// Ordinal number from the first column
    #[serde(rename = "lp")]
    pub ordinal: u32,

    /// CPV code, inherited from the category when the row has none
    pub code: String,

    /// Item description
    pub name: String,

    /// Net price in PLN, two decimals
    #[serde(with = "blank_price")]
    pub price_pln: Option<String>,

    /// Net price in EUR, two decimals
    #[serde(with = "blank_price")]
    pub price_eur: Option<String>,
}

/// A contiguous run of items sharing a category, as written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub category: String,
    pub products: Vec<LineItem>,
}

/// Group items into contiguous category runs, keeping source order.
pub fn group_by_category(items: &[LineItem]) -> Vec<CategoryGroup> {
    let mut groups: Vec<CategoryGroup> = Vec::new();

    for item in items {
        match groups.last_mut() {
            Some(group) if group.category == item.category => group.products.push(item.clone()),
            _ => groups.push(CategoryGroup {
                category: item.category.clone(),
                products: vec![item.clone()],
            }),
        }
    }

    groups
}

/// Flatten groups back into the item sequence.
pub fn flatten_groups(groups: Vec<CategoryGroup>) -> Vec<LineItem> {
    groups.into_iter().flat_map(|g| g.products).collect()
}

/// Absent prices are written as `""`.
mod blank_price {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok((!raw.is_empty()).then_some(raw))
    }
}
